// pipeline.rs — Per-frame feature pipeline.
//
// Called once per replayed frame:
//
//   1. Smooth the frame into a persistent buffer (σ = 0.5, 9 taps by default)
//   2. Run the detection strategy chosen at construction:
//        HarrisOnly:       Harris on the smoothed image, every candidate
//                          is highlighted
//        FastWithTracking: segment test on the raw frame, descriptors from
//                          the smoothed image, descriptor matching against
//                          the previous frame; only stable features are
//                          highlighted
//   3. Overlay: set highlighted pixels of the input frame to 255
//
// The smoothing buffers, the tracker's previous-frame list and the
// descriptor pattern are the only state that outlives a call.

use serde::{Deserialize, Serialize};

use crate::brief::BriefPattern;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fast::{Corner, DescribedCorner, FastDetector};
use crate::frame::Frame;
use crate::gaussian::{smooth_into, GaussianKernel};
use crate::harris::HarrisDetector;
use crate::tracker::{FeatureTracker, TrackedFeature};

/// Intensity written over highlighted features.
pub const OVERLAY_VALUE: u8 = 255;

/// Which detector drives the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStrategy {
    #[default]
    HarrisOnly,
    FastWithTracking,
}

/// Counters for one processed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames processed before this one.
    pub frame_index: u64,
    /// Corners reported by the detector (described ones only for FAST).
    pub candidates: usize,
    /// Features matched against the previous frame. Always 0 for Harris.
    pub matched: usize,
    /// Features past the stability threshold. Always 0 for Harris.
    pub stable: usize,
    /// Pixels set to `OVERLAY_VALUE`.
    pub overlaid: usize,
}

/// FAST + descriptor + tracker state.
#[derive(Debug)]
struct FastTracking {
    detector: FastDetector,
    pattern: BriefPattern,
    tracker: FeatureTracker,
    described: Vec<DescribedCorner>,
}

#[derive(Debug)]
enum Stage {
    Harris {
        detector: HarrisDetector,
        corners: Vec<Corner>,
    },
    FastTracking(Box<FastTracking>),
}

/// Smoothing plus detection plus overlay, reusing its buffers across frames.
#[derive(Debug)]
pub struct FeaturePipeline {
    kernel: GaussianKernel,
    scratch: Vec<u8>,
    smoothed: Vec<u8>,
    stage: Stage,
    frames: u64,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::harris(GaussianKernel::default(), HarrisDetector::default())
    }
}

impl FeaturePipeline {
    /// Harris-only pipeline.
    pub fn harris(kernel: GaussianKernel, detector: HarrisDetector) -> Self {
        Self::with_stage(
            kernel,
            Stage::Harris {
                detector,
                corners: Vec::new(),
            },
        )
    }

    /// FAST pipeline with descriptor tracking. `pattern` is used for every
    /// descriptor this pipeline computes.
    pub fn fast_with_tracking(kernel: GaussianKernel, detector: FastDetector, pattern: BriefPattern) -> Self {
        Self::with_stage(
            kernel,
            Stage::FastTracking(Box::new(FastTracking {
                detector,
                pattern,
                tracker: FeatureTracker::new(),
                described: Vec::new(),
            })),
        )
    }

    /// Default pipeline for a strategy; the descriptor pattern (if any) is
    /// seeded from the clock.
    pub fn new(strategy: DetectionStrategy) -> Self {
        match strategy {
            DetectionStrategy::HarrisOnly => Self::default(),
            DetectionStrategy::FastWithTracking => Self::fast_with_tracking(
                GaussianKernel::default(),
                FastDetector::default(),
                BriefPattern::from_clock(),
            ),
        }
    }

    /// Build from a configuration, validating it first.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let kernel = GaussianKernel::new(config.gaussian.sigma, config.gaussian.size);

        let pipeline = match config.strategy {
            DetectionStrategy::HarrisOnly => {
                let detector = match config.harris.threshold {
                    Some(t) => HarrisDetector::with_threshold(t),
                    None => HarrisDetector::default(),
                };
                Self::harris(kernel, detector)
            }
            DetectionStrategy::FastWithTracking => {
                let f = &config.fast;
                let pattern = match f.seed {
                    Some(seed) => BriefPattern::from_seed(seed),
                    None => BriefPattern::from_clock(),
                };
                Self::fast_with_tracking(
                    kernel,
                    FastDetector::new(f.segment_size, f.threshold, f.max_features),
                    pattern,
                )
            }
        };
        log::info!("pipeline: {:?}, σ = {}", config.strategy, config.gaussian.sigma);
        Ok(pipeline)
    }

    fn with_stage(kernel: GaussianKernel, stage: Stage) -> Self {
        FeaturePipeline {
            kernel,
            scratch: Vec::new(),
            smoothed: Vec::new(),
            stage,
            frames: 0,
        }
    }

    pub fn strategy(&self) -> DetectionStrategy {
        match self.stage {
            Stage::Harris { .. } => DetectionStrategy::HarrisOnly,
            Stage::FastTracking(_) => DetectionStrategy::FastWithTracking,
        }
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    /// Smoothed copy of the most recent frame.
    pub fn smoothed(&self) -> &[u8] {
        &self.smoothed
    }

    /// Harris corners from the most recent frame. Empty for FAST.
    pub fn corners(&self) -> &[Corner] {
        match &self.stage {
            Stage::Harris { corners, .. } => corners.as_slice(),
            Stage::FastTracking(_) => &[],
        }
    }

    /// Tracked features from the most recent frame. Empty for Harris.
    pub fn tracked(&self) -> &[TrackedFeature] {
        match &self.stage {
            Stage::Harris { .. } => &[],
            Stage::FastTracking(ft) => ft.tracker.previous(),
        }
    }

    /// Descriptor pattern, if the strategy uses one.
    pub fn pattern(&self) -> Option<&BriefPattern> {
        match &self.stage {
            Stage::Harris { .. } => None,
            Stage::FastTracking(ft) => Some(&ft.pattern),
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Drop tracking history. Buffers and the descriptor pattern are kept.
    pub fn reset(&mut self) {
        if let Stage::FastTracking(ft) = &mut self.stage {
            ft.tracker.reset();
        }
        self.frames = 0;
    }

    /// Run the pipeline on `frame` and overlay the result into it.
    pub fn process(&mut self, frame: &mut Frame) -> FrameStats {
        let (w, h) = (frame.width(), frame.height());
        smooth_into(
            frame.as_slice(),
            w,
            h,
            &self.kernel,
            &mut self.scratch,
            &mut self.smoothed,
        );

        let mut stats = FrameStats {
            frame_index: self.frames,
            ..Default::default()
        };

        match &mut self.stage {
            Stage::Harris { detector, corners } => {
                detector.detect_into(&self.smoothed, w, h, corners);
                stats.candidates = corners.len();
                for c in corners.iter() {
                    frame.set(c.x, c.y, OVERLAY_VALUE);
                }
                stats.overlaid = corners.len();
            }
            Stage::FastTracking(ft) => {
                let FastTracking {
                    detector,
                    pattern,
                    tracker,
                    described,
                } = &mut **ft;
                detector.detect_described_into(frame.as_slice(), &self.smoothed, w, h, pattern, described);
                stats.candidates = described.len();

                tracker.update(described);
                stats.matched = tracker.matched();
                for f in tracker.previous().iter().filter(|f| f.is_stable()) {
                    frame.set(f.x, f.y, OVERLAY_VALUE);
                    stats.stable += 1;
                }
                stats.overlaid = stats.stable;
            }
        }

        self.frames += 1;
        log::debug!(
            "frame {}: {} candidates, {} matched, {} stable, {} overlaid",
            stats.frame_index,
            stats.candidates,
            stats.matched,
            stats.stable,
            stats.overlaid
        );
        stats
    }
}
