//! Benchmark – `bytestream::ByteBuffer` pattern search and rewriting
#![allow(missing_docs)]

use std::time::Duration;

use bytestream::{ByteBuffer, SearchWindow, SignedEnvelope};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// A deterministic document of `objects` PDF-style indirect objects, each
/// carrying a short stream body.
fn make_document(objects: usize) -> ByteBuffer {
    let mut bytes = Vec::new();
    for i in 0..objects {
        bytes.extend_from_slice(format!("{i} 0 obj\n<< /Length 16 >>\nstream\n").as_bytes());
        bytes.extend(std::iter::repeat_n(b'a' + (i % 26) as u8, 16));
        bytes.extend_from_slice(b"\nendstream\nendobj\n");
    }
    ByteBuffer::from(bytes)
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_search");
    group.measurement_time(Duration::from_secs(5));

    for objects in [100usize, 1_000, 10_000] {
        let doc = make_document(objects);

        group.bench_with_input(BenchmarkId::new("find_all_pattern_in", objects), &doc, |b, doc| {
            b.iter(|| black_box(doc.find_all_pattern_in(b"endobj", SearchWindow::default())).len());
        });

        group.bench_with_input(BenchmarkId::new("find_all_in", objects), &doc, |b, doc| {
            b.iter(|| {
                black_box(doc.find_all_in(&[&b"obj"[..], b"stream", b"<<"], SearchWindow::default()))
                    .len()
            });
        });

        group.bench_with_input(
            BenchmarkId::new("find_paired_patterns", objects),
            &doc,
            |b, doc| {
                b.iter(|| {
                    black_box(doc.find_paired_patterns(b"stream", b"endstream", SearchWindow::default()))
                        .len()
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("replace_pattern", objects), &doc, |b, doc| {
            b.iter(|| {
                let mut doc = doc.clone();
                black_box(doc.replace_pattern(b"obj", b"object", SearchWindow::default()));
            });
        });
    }
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let envelope = SignedEnvelope::new(vec![0x42; 4_096], vec![0x24; 256]);
    let bytes = envelope.encode().unwrap();

    c.bench_function("envelope_encode", |b| {
        b.iter(|| black_box(envelope.encode().unwrap()).len());
    });
    c.bench_function("envelope_decode", |b| {
        b.iter(|| black_box(SignedEnvelope::decode(&bytes).unwrap()).data.len());
    });
}

criterion_group!(benches, bench_search, bench_envelope);
criterion_main!(benches);
