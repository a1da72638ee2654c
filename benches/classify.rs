//! Benchmarks for the inbound message path.
//!
//! Measures decode-plus-classify latency for the message shapes that
//! dominate live traffic: camera frames, speed/angle reports, and video
//! chunks. The whole path sits between the socket and the watch channels,
//! so it runs once per inbound frame.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use roverlink::media::VideoAssembler;
use roverlink::protocol::decode;
use std::hint::black_box;

fn frame_message(jpeg_len: usize) -> String {
    let payload = BASE64.encode(vec![0xAB; jpeg_len]);
    format!(r#"{{"ok":true,"streaming":true,"frame":"{payload}"}}"#)
}

fn bench_classify(c: &mut Criterion) {
    let speed = r#"{"ok":true,"motorspeed":-12.5,"direction":"backward"}"#;
    let angle = r#"{"ok":true,"motorangle":30,"direction":"right","straightening":false}"#;
    let ignored = r#"{"ok":true,"somethingUnknown":42}"#;

    c.bench_function("classify/speed_report", |b| {
        b.iter(|| decode(black_box(speed)).unwrap())
    });
    c.bench_function("classify/angle_report", |b| {
        b.iter(|| decode(black_box(angle)).unwrap())
    });
    c.bench_function("classify/unmatched_shape", |b| {
        b.iter(|| decode(black_box(ignored)).unwrap())
    });

    let mut group = c.benchmark_group("classify/camera_frame");
    for jpeg_len in [4 * 1024, 32 * 1024, 128 * 1024] {
        let message = frame_message(jpeg_len);
        group.bench_with_input(BenchmarkId::from_parameter(jpeg_len), &message, |b, message| {
            b.iter(|| decode(black_box(message)).unwrap())
        });
    }
    group.finish();
}

fn bench_video_reassembly(c: &mut Criterion) {
    let chunk = BASE64.encode(vec![0xCD; 16 * 1024]);

    c.bench_function("video/assemble_64_chunks", |b| {
        b.iter(|| {
            let mut assembler = VideoAssembler::new();
            for _ in 0..64 {
                assembler.append_base64(black_box(&chunk)).unwrap();
            }
            black_box(assembler.finalize())
        })
    });
}

criterion_group!(benches, bench_classify, bench_video_reassembly);
criterion_main!(benches);
