//! Criterion benchmarks for the `fig-kiwi` archive container.
//!
//! Run with:
//! ```bash
//! cargo bench --package figclip-core --bench archive_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use figclip_core::archive::{parse_archive, write_archive, FIG_KIWI_VERSION};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Two blocks sized like a copied frame: small schema, larger message.
fn make_blocks(message_len: usize) -> Vec<Vec<u8>> {
    vec![vec![0x5A; 4 * 1024], vec![0xA5; message_len]]
}

const MESSAGE_SIZES: &[usize] = &[1024, 64 * 1024, 1024 * 1024];

/// Benchmarks `write_archive` for increasing message block sizes.
fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_archive");
    for &size in MESSAGE_SIZES {
        let blocks = make_blocks(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("message_bytes", size), &blocks, |b, blocks| {
            b.iter(|| write_archive(black_box(FIG_KIWI_VERSION), black_box(blocks)))
        });
    }
    group.finish();
}

/// Benchmarks `parse_archive` on pre-written archives.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_archive");
    for &size in MESSAGE_SIZES {
        let bytes = write_archive(FIG_KIWI_VERSION, &make_blocks(size));
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("message_bytes", size), &bytes, |b, bytes| {
            b.iter(|| parse_archive(black_box(bytes)).expect("parse must succeed"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_write, bench_parse);
criterion_main!(benches);
