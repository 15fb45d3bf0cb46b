// tracker.rs — Frame-to-frame association of described features.
//
// Each described feature of the current frame is compared against the
// previous frame's features in order. The first previous feature whose
// descriptor is within `MATCH_DISTANCE` bits is its match, and the feature
// inherits that feature's persistence + 1. Unmatched features start at 1.
// Positions play no part in matching.
//
// After association the current list becomes the previous list for the next
// frame; the two buffers are swapped rather than reallocated.

use crate::brief::Descriptor;
use crate::fast::DescribedCorner;

/// Matches need a Hamming distance strictly below this.
pub const MATCH_DISTANCE: u32 = 5;
/// A feature is stable once its persistence exceeds this.
pub const STABLE_AFTER: u32 = 5;

/// A described feature with its consecutive-frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedFeature {
    pub x: usize,
    pub y: usize,
    pub descriptor: Descriptor,
    /// Number of consecutive frames this feature has been matched in,
    /// including the current one. Always ≥ 1.
    pub persistence: u32,
}

impl TrackedFeature {
    #[inline]
    pub fn is_stable(&self) -> bool {
        self.persistence > STABLE_AFTER
    }
}

/// Descriptor-matching tracker holding one frame of history.
#[derive(Debug, Default)]
pub struct FeatureTracker {
    previous: Vec<TrackedFeature>,
    current: Vec<TrackedFeature>,
    matched: usize,
}

impl FeatureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate this frame's features with the previous frame's and return
    /// them with updated persistence counts, in input order.
    pub fn update(&mut self, detections: &[DescribedCorner]) -> &[TrackedFeature] {
        self.current.clear();
        self.matched = 0;

        for det in detections {
            let persistence = match self
                .previous
                .iter()
                .find(|prev| prev.descriptor.hamming_distance(&det.descriptor) < MATCH_DISTANCE)
            {
                Some(prev) => {
                    self.matched += 1;
                    prev.persistence + 1
                }
                None => 1,
            };
            self.current.push(TrackedFeature {
                x: det.corner.x,
                y: det.corner.y,
                descriptor: det.descriptor,
                persistence,
            });
        }

        std::mem::swap(&mut self.previous, &mut self.current);
        log::trace!(
            "tracker: {} features, {} matched",
            self.previous.len(),
            self.matched
        );
        &self.previous
    }

    /// Features from the most recent `update`.
    pub fn previous(&self) -> &[TrackedFeature] {
        &self.previous
    }

    /// How many features the most recent `update` matched.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.current.clear();
        self.matched = 0;
    }
}
