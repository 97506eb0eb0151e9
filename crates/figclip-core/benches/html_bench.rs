//! Criterion benchmarks for the HTML wrapper and the full message pipeline.
//!
//! Run with:
//! ```bash
//! cargo bench --package figclip-core --bench html_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use figclip_core::{
    decode_html, encode_html, ClipboardCodec, ClipboardMessage, OpaqueSchemaCodec,
};
use serde_json::json;

fn bench_html(c: &mut Criterion) {
    let meta = json!({ "fileKey": "AbC123", "pasteID": 1234, "dataType": "scene" });
    let payload = vec![0x42; 256 * 1024];
    let html = encode_html(&meta, &payload);

    let mut group = c.benchmark_group("html_wrapper");
    group.bench_function("encode_256KiB", |b| {
        b.iter(|| encode_html(black_box(&meta), black_box(&payload)))
    });
    group.bench_function("decode_256KiB", |b| {
        b.iter(|| decode_html(black_box(&html)).expect("decode must succeed"))
    });
    group.finish();
}

/// Full read/write including raw deflate of both blocks.
fn bench_message_roundtrip(c: &mut Criterion) {
    let codec = ClipboardCodec::new(OpaqueSchemaCodec);
    let msg = ClipboardMessage::new(
        json!({ "pasteID": 1 }),
        b"message NodeChange { uint guid = 1; string name = 2; }".repeat(64),
        (0..64 * 1024).map(|i| (i % 251) as u8).collect::<Vec<u8>>(),
    );

    c.bench_function("message_write_read", |b| {
        b.iter(|| {
            let html = codec.write_message(black_box(&msg)).unwrap();
            codec.read_message(black_box(&html)).unwrap()
        })
    });
}

criterion_group!(benches, bench_html, bench_message_roundtrip);
criterion_main!(benches);
