use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use delayed_mirror::buffer::DelayBuffer;
use delayed_mirror::capture::Frame;
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_micros(33_333);

/// Buffer holding `count` frames captured at 30 fps.
fn filled(count: u32, width: u32, height: u32) -> DelayBuffer<Frame> {
    let mut buffer = DelayBuffer::default();
    for i in 0..count {
        let pixels = vec![0u8; (width * height) as usize];
        buffer.enqueue(Frame::gray(pixels, width, height, i as u64), FRAME_INTERVAL * i);
    }
    buffer
}

fn bench_enqueue(c: &mut Criterion) {
    c.bench_function("enqueue_small_frame", |b| {
        let mut buffer = DelayBuffer::default();
        let mut i = 0u32;
        b.iter(|| {
            buffer.enqueue(Frame::gray(vec![0; 64], 8, 8, i as u64), FRAME_INTERVAL * i);
            i = i.wrapping_add(1);
            if buffer.len() > 1024 {
                buffer.clear();
            }
        })
    });
}

fn bench_release(c: &mut Criterion) {
    // Steady state: one frame due per tick
    c.bench_function("release_steady_state", |b| {
        b.iter_batched(
            || filled(90, 8, 8),
            |mut buffer| {
                let now = FRAME_INTERVAL * 90;
                black_box(buffer.release_ready(now, Duration::from_secs(3)))
            },
            BatchSize::SmallInput,
        )
    });

    // Delay shortened from 60s to 0: the whole queue is scanned at once
    c.bench_function("release_catch_up_1800", |b| {
        b.iter_batched(
            || filled(1800, 8, 8),
            |mut buffer| {
                let now = FRAME_INTERVAL * 1800;
                black_box(buffer.release_ready(now, Duration::ZERO).into_latest())
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_enqueue, bench_release);
criterion_main!(benches);
