// tests/test_pipeline.rs — End-to-end tests: smoothing, detection, tracking
// and overlay through `FeaturePipeline`.

use replay_features::brief::BriefPattern;
use replay_features::config::PipelineConfig;
use replay_features::fast::FastDetector;
use replay_features::gaussian::GaussianKernel;
use replay_features::pipeline::{DetectionStrategy, FeaturePipeline, OVERLAY_VALUE};
use replay_features::tracker::STABLE_AFTER;
use replay_features::Frame;

fn make_quadrants(size: usize, split: usize, lo: u8, hi: u8) -> Frame {
    let mut frame = Frame::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let bright = (x >= split) == (y >= split);
            frame.set(x, y, if bright { hi } else { lo });
        }
    }
    frame
}

fn make_rectangle_scene() -> Frame {
    let mut frame = Frame::filled(40, 40, 20);
    for y in 12..28 {
        for x in 12..28 {
            frame.set(x, y, 200);
        }
    }
    frame
}

fn overlay_pixels(frame: &Frame) -> Vec<(usize, usize)> {
    frame
        .pixels()
        .filter(|&(_, _, v)| v == OVERLAY_VALUE)
        .map(|(x, y, _)| (x, y))
        .collect()
}

fn fast_pipeline(seed: u64) -> FeaturePipeline {
    FeaturePipeline::fast_with_tracking(
        GaussianKernel::default(),
        FastDetector::default(),
        BriefPattern::from_seed(seed),
    )
}

// ===== Harris strategy =====

#[test]
fn flat_frame_gets_no_overlay() {
    let mut pipeline = FeaturePipeline::default();
    let mut frame = Frame::filled(16, 16, 128);
    let stats = pipeline.process(&mut frame);
    assert_eq!(stats.candidates, 0);
    assert!(overlay_pixels(&frame).is_empty());
    assert_eq!(frame, Frame::filled(16, 16, 128));
}

#[test]
fn quadrant_junction_is_highlighted() {
    for &(lo, hi) in &[(20u8, 230u8), (40, 200)] {
        let mut pipeline = FeaturePipeline::default();
        let mut frame = make_quadrants(16, 8, lo, hi);
        pipeline.process(&mut frame);
        let hits = overlay_pixels(&frame);
        assert!(
            hits.iter().any(|&(x, y)| x.abs_diff(8) <= 1 && y.abs_diff(8) <= 1),
            "lo={lo} hi={hi}: overlay {hits:?}"
        );
    }
}

#[test]
fn harris_overlay_matches_candidates() {
    let mut pipeline = FeaturePipeline::default();
    let mut frame = make_quadrants(16, 8, 20, 230);
    let stats = pipeline.process(&mut frame);
    let hits = overlay_pixels(&frame);
    assert_eq!(stats.overlaid, hits.len());
    let corners: Vec<_> = pipeline.corners().iter().map(|c| (c.x, c.y)).collect();
    assert_eq!(corners, hits);
    assert_eq!(stats.stable, 0);
    assert_eq!(stats.matched, 0);
}

#[test]
fn smoothed_buffer_is_exposed() {
    let mut pipeline = FeaturePipeline::default();
    let mut frame = make_quadrants(32, 16, 20, 230);
    pipeline.process(&mut frame);
    assert_eq!(pipeline.smoothed().len(), 1024);
    // Where the whole 9×9 footprint is inside one quadrant the smoothed
    // image equals the input.
    assert_eq!(pipeline.smoothed()[8 * 32 + 8], 230);
    assert_eq!(pipeline.smoothed()[8 * 32 + 24], 20);
}

// ===== FAST + tracking strategy =====

#[test]
fn static_scene_becomes_stable_after_six_frames() {
    let scene = make_rectangle_scene();
    let mut pipeline = fast_pipeline(42);

    for n in 1..=(STABLE_AFTER as u64 + 1) {
        let mut frame = scene.clone();
        let stats = pipeline.process(&mut frame);
        assert!(stats.candidates > 0);
        if n <= STABLE_AFTER as u64 {
            assert_eq!(stats.stable, 0, "frame {n}");
            assert_eq!(frame, scene, "frame {n} should be untouched");
        } else {
            assert_eq!(stats.stable, stats.candidates);
            assert_eq!(overlay_pixels(&frame).len(), stats.overlaid);
            assert!(stats.overlaid > 0);
        }
        if n > 1 {
            assert_eq!(stats.matched, stats.candidates);
        }
    }
    assert!(pipeline.tracked().iter().all(|f| f.persistence == 6));
}

#[test]
fn scene_change_resets_persistence() {
    let scene = make_rectangle_scene();
    let mut pipeline = fast_pipeline(7);
    for _ in 0..8 {
        pipeline.process(&mut scene.clone());
    }
    assert!(pipeline.tracked().iter().all(|f| f.is_stable()));

    // One featureless frame empties the history.
    let stats = pipeline.process(&mut Frame::filled(40, 40, 20));
    assert_eq!(stats.candidates, 0);
    assert!(pipeline.tracked().is_empty());

    let stats = pipeline.process(&mut scene.clone());
    assert!(stats.candidates > 0);
    assert_eq!(stats.matched, 0);
    assert_eq!(stats.stable, 0);
    assert!(pipeline.tracked().iter().all(|f| f.persistence == 1));
}

#[test]
fn reset_forgets_history() {
    let scene = make_rectangle_scene();
    let mut pipeline = fast_pipeline(3);
    for _ in 0..6 {
        pipeline.process(&mut scene.clone());
    }
    pipeline.reset();
    let stats = pipeline.process(&mut scene.clone());
    assert_eq!(stats.matched, 0);
    assert_eq!(stats.frame_index, 0);
    assert!(pipeline.tracked().iter().all(|f| f.persistence == 1));
}

// ===== Configuration =====

#[test]
fn pipeline_from_yaml() {
    let config = PipelineConfig::from_yaml_str(
        "strategy: fast_with_tracking\ngaussian: { sigma: 1.0, size: 5 }\nfast: { threshold: 30, seed: 1 }\n",
    )
    .unwrap();
    let pipeline = FeaturePipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.strategy(), DetectionStrategy::FastWithTracking);
    assert_eq!(pipeline.kernel().len(), 5);
    assert_eq!(pipeline.kernel().sigma, 1.0);
}

#[test]
fn invalid_config_is_rejected_before_building() {
    let mut config = PipelineConfig::default();
    config.gaussian.size = 4;
    assert!(FeaturePipeline::from_config(&config).is_err());
}
