// benches/benchmarks.rs -- Per-stage and full-pipeline benchmarks.
//
// Synthetic benchmarks (always run):
//   cargo bench
//
// With a recorded sequence (directory containing images.txt):
//   REPLAY_ROOT=/path/to/sequence cargo bench
//
// The sequence benchmark preloads up to 50 frames and runs both pipeline
// strategies over them.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use replay_features::brief::BriefPattern;
use replay_features::fast::FastDetector;
use replay_features::gaussian::{smooth, smooth_into, GaussianKernel};
use replay_features::harris::HarrisDetector;
use replay_features::playback::{load_luma, PlaybackFrameProvider};
use replay_features::tracker::FeatureTracker;
use replay_features::{DetectionStrategy, FeaturePipeline, Frame};

use std::env;
use std::path::PathBuf;

// ============================================================
// Helpers
// ============================================================

/// Synthetic textured frame: a ramp plus bright rectangles.
fn make_scene(w: usize, h: usize, dx: usize, dy: usize) -> Frame {
    let mut frame = Frame::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let base = (((x + dx) * 200 / w) + ((y + dy) * 55 / h)) as u8;
            frame.set(x, y, base);
        }
    }
    for rect in 0..6 {
        let rx = (50 + rect * 100 + dx) % w;
        let ry = (40 + (rect % 3) * 120 + dy) % h;
        let bright = 180u8.wrapping_add(rect as u8 * 10);
        for y in ry..(ry + 60).min(h) {
            for x in rx..(rx + 80).min(w) {
                frame.set(x, y, bright);
            }
        }
    }
    frame
}

fn fast_pipeline() -> FeaturePipeline {
    FeaturePipeline::fast_with_tracking(
        GaussianKernel::default(),
        FastDetector::default(),
        BriefPattern::from_seed(1),
    )
}

// ============================================================
// Per-stage benchmarks
// ============================================================

fn bench_smooth(c: &mut Criterion) {
    let frame = make_scene(752, 480, 0, 0);
    let mut scratch = Vec::new();
    let mut output = Vec::new();

    let mut group = c.benchmark_group("smooth");
    for &(sigma, size) in &[(0.5f32, 9usize), (1.0, 5), (2.0, 13)] {
        let kernel = GaussianKernel::new(sigma, size);
        group.bench_function(BenchmarkId::new("752x480", format!("s{sigma}_k{size}")), |b| {
            b.iter(|| smooth_into(frame.as_slice(), 752, 480, &kernel, &mut scratch, &mut output))
        });
    }
    group.finish();
}

fn bench_harris(c: &mut Criterion) {
    let smoothed = smooth(&make_scene(752, 480, 0, 0), &GaussianKernel::default());
    let det = HarrisDetector::default();
    let mut out = Vec::new();

    let mut group = c.benchmark_group("harris");
    group.bench_function("detect_752x480", |b| {
        b.iter(|| det.detect_into(smoothed.as_slice(), 752, 480, &mut out))
    });
    group.finish();
}

fn bench_fast(c: &mut Criterion) {
    let frame = make_scene(752, 480, 0, 0);
    let smoothed = smooth(&frame, &GaussianKernel::default());
    let pattern = BriefPattern::from_seed(7);

    let mut group = c.benchmark_group("fast");
    for &max in &[100usize, 10_000] {
        let det = FastDetector::new(9, 20, max);
        group.bench_function(BenchmarkId::new("detect_752x480", max), |b| {
            b.iter(|| det.detect(&frame))
        });
        group.bench_function(BenchmarkId::new("detect_described_752x480", max), |b| {
            b.iter(|| det.detect_described(&frame, &smoothed, &pattern))
        });
    }
    group.finish();
}

fn bench_tracker(c: &mut Criterion) {
    let frame = make_scene(752, 480, 0, 0);
    let smoothed = smooth(&frame, &GaussianKernel::default());
    let pattern = BriefPattern::from_seed(7);
    let described = FastDetector::new(9, 20, 500).detect_described(&frame, &smoothed, &pattern);

    let mut group = c.benchmark_group("tracker");
    group.bench_function(format!("update_{}feat", described.len()), |b| {
        let mut tracker = FeatureTracker::new();
        tracker.update(&described);
        b.iter(|| tracker.update(&described).len())
    });
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let frames: Vec<Frame> = (0..10).map(|i| make_scene(752, 480, i * 2, i)).collect();

    let mut group = c.benchmark_group("pipeline");
    for strategy in [DetectionStrategy::HarrisOnly, DetectionStrategy::FastWithTracking] {
        group.bench_function(format!("{strategy:?}_752x480_10frames"), |b| {
            b.iter(|| {
                let mut pipeline = match strategy {
                    DetectionStrategy::HarrisOnly => FeaturePipeline::default(),
                    DetectionStrategy::FastWithTracking => fast_pipeline(),
                };
                for frame in &frames {
                    pipeline.process(&mut frame.clone());
                }
            })
        });
    }
    group.finish();
}

// ============================================================
// Recorded sequence (optional, needs REPLAY_ROOT env var)
// ============================================================

fn bench_sequence(c: &mut Criterion) {
    let root = match env::var("REPLAY_ROOT") {
        Ok(p) => PathBuf::from(p),
        Err(_) => {
            eprintln!("REPLAY_ROOT not set, skipping sequence benchmark.");
            eprintln!("Set it to run: REPLAY_ROOT=/path/to/sequence cargo bench");
            return;
        }
    };

    let provider = match PlaybackFrameProvider::open(&root, false) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("cannot open {}: {e}", root.display());
            return;
        }
    };

    // Preload frames into memory to bench processing only, not I/O.
    let frames: Vec<Frame> = provider
        .entries()
        .iter()
        .take(50)
        .map(|e| load_luma(&e.path).unwrap_or_else(|err| panic!("{err}")))
        .collect();
    eprintln!(
        "sequence benchmark ready: {}x{}, {} frames",
        frames[0].width(),
        frames[0].height(),
        frames.len()
    );

    let mut group = c.benchmark_group("sequence");
    group.sample_size(10);

    group.bench_function(format!("harris_{}frames", frames.len()), |b| {
        b.iter(|| {
            let mut pipeline = FeaturePipeline::default();
            for frame in &frames {
                pipeline.process(&mut frame.clone());
            }
        })
    });
    group.bench_function(format!("fast_tracking_{}frames", frames.len()), |b| {
        b.iter(|| {
            let mut pipeline = fast_pipeline();
            for frame in &frames {
                pipeline.process(&mut frame.clone());
            }
        })
    });
    group.finish();
}

// ============================================================
// Register
// ============================================================

criterion_group!(
    benches,
    bench_smooth,
    bench_harris,
    bench_fast,
    bench_tracker,
    bench_pipeline,
    bench_sequence,
);
criterion_main!(benches);
