// fast.rs — Segment-test corner detector (FAST-style).
//
// For each pixel p with a 3 px margin, walk the 16 samples of the radius-3
// Bresenham circle once, in order. Per polarity, remember the index of the
// last sample that failed the test and the score accumulated since then:
//
//   brighter: I > I_p + t      dark: I < I_p - t
//   score    += |I - I_p| - t
//
// The pixel is accepted the moment either run length (i - last_fail)
// reaches `segment_size`. The score is that run's score and the walk stops
// there. Runs that would only complete by wrapping from sample 15 back to
// sample 0 are not detected; this is a single pass, not classical FAST.
//
// Scanning is raster order and stops once `max_features` corners are
// collected, so the output is not sorted by score and the bottom of the
// image can go unexamined on busy frames.

use crate::brief::{BriefPattern, Descriptor};
use crate::frame::Frame;

/// Bresenham circle of radius 3: 16 (dx, dy) offsets, clockwise from
/// 12 o'clock.
pub const CIRCLE_OFFSETS: [(isize, isize); 16] = [
    ( 0, -3), ( 1, -3), ( 2, -2), ( 3, -1),
    ( 3,  0), ( 3,  1), ( 2,  2), ( 1,  3),
    ( 0,  3), (-1,  3), (-2,  2), (-3,  1),
    (-3,  0), (-3, -1), (-2, -2), (-1, -3),
];

/// Circle radius, and so the minimum distance from every edge.
pub const FAST_MARGIN: usize = 3;

/// A corner candidate at integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub x: usize,
    pub y: usize,
    /// Detector-specific strength: the Harris response, or the segment-test
    /// run score.
    pub score: i64,
}

/// A segment-test corner together with its binary descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescribedCorner {
    pub corner: Corner,
    pub descriptor: Descriptor,
}

/// Run the segment test on one pixel's circle.
///
/// Returns the run score if `segment_size` consecutive samples (without
/// wrap-around) are all brighter or all darker than `center` by more than
/// `threshold`.
#[inline]
pub fn segment_test(center: u8, circle: &[u8; 16], threshold: u8, segment_size: usize) -> Option<i32> {
    debug_assert!(
        (1..=16).contains(&segment_size),
        "segment_size must be 1..=16 (got {segment_size})"
    );
    let ip = center as i32;
    let t = threshold as i32;

    let mut last_non_bright: i32 = -1;
    let mut last_non_dark: i32 = -1;
    let mut bright_score = 0i32;
    let mut dark_score = 0i32;
    let n = segment_size as i32;

    for (i, &sample) in circle.iter().enumerate() {
        let i = i as i32;
        let v = sample as i32;

        if v > ip + t {
            bright_score += (v - ip) - t;
        } else {
            last_non_bright = i;
            bright_score = 0;
        }

        if v < ip - t {
            dark_score += (ip - v) - t;
        } else {
            last_non_dark = i;
            dark_score = 0;
        }

        if i - last_non_bright == n {
            return Some(bright_score);
        }
        if i - last_non_dark == n {
            return Some(dark_score);
        }
    }
    None
}

/// Segment-test detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastDetector {
    segment_size: usize,
    threshold: u8,
    max_features: usize,
}

impl Default for FastDetector {
    fn default() -> Self {
        FastDetector {
            segment_size: 9,
            threshold: 20,
            max_features: 100,
        }
    }
}

impl FastDetector {
    /// # Panics
    /// Panics if `segment_size` is not in 1..=16.
    pub fn new(segment_size: usize, threshold: u8, max_features: usize) -> Self {
        assert!(
            (1..=16).contains(&segment_size),
            "segment_size must be 1..=16 (got {segment_size})"
        );
        FastDetector {
            segment_size,
            threshold,
            max_features,
        }
    }

    /// Consecutive circle samples required. 9 and 12 are typical.
    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Intensity tolerance around the center pixel.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Stop scanning after this many corners.
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Segment-test score at (x, y), if it is a corner.
    ///
    /// (x, y) must be at least `FAST_MARGIN` from every edge.
    #[inline]
    pub fn score_at(&self, image: &[u8], width: usize, x: usize, y: usize) -> Option<i32> {
        let center = image[y * width + x];
        let mut circle = [0u8; 16];
        for (slot, &(dx, dy)) in circle.iter_mut().zip(CIRCLE_OFFSETS.iter()) {
            let sx = (x as isize + dx) as usize;
            let sy = (y as isize + dy) as usize;
            *slot = image[sy * width + sx];
        }
        segment_test(center, &circle, self.threshold, self.segment_size)
    }

    /// Detect corners in a frame, up to `max_features`.
    pub fn detect(&self, frame: &Frame) -> Vec<Corner> {
        let mut corners = Vec::new();
        self.scan(frame.as_slice(), frame.width(), frame.height(), |corner| {
            corners.push(corner);
            corners.len()
        });
        corners
    }

    /// Detect corners in `source` and describe them from `smoothed`.
    ///
    /// Corners inside the descriptor border are discarded outright and do
    /// not count toward `max_features`.
    ///
    /// # Panics
    /// Panics if the two frames differ in size.
    pub fn detect_described(
        &self,
        source: &Frame,
        smoothed: &Frame,
        pattern: &BriefPattern,
    ) -> Vec<DescribedCorner> {
        assert_eq!(
            (source.width(), source.height()),
            (smoothed.width(), smoothed.height()),
            "source and smoothed frames must have the same size",
        );
        let mut out = Vec::new();
        self.detect_described_into(
            source.as_slice(),
            smoothed.as_slice(),
            source.width(),
            source.height(),
            pattern,
            &mut out,
        );
        out
    }

    /// Slice form of `detect_described`, writing into `out` (cleared first).
    pub fn detect_described_into(
        &self,
        source: &[u8],
        smoothed: &[u8],
        width: usize,
        height: usize,
        pattern: &BriefPattern,
        out: &mut Vec<DescribedCorner>,
    ) {
        assert_eq!(smoothed.len(), source.len(), "smoothed buffer size mismatch");
        out.clear();
        self.scan(source, width, height, |corner| {
            if let Some(descriptor) = pattern.describe(smoothed, width, height, corner.x, corner.y) {
                out.push(DescribedCorner { corner, descriptor });
            }
            out.len()
        });
    }

    /// Raster scan calling `accept` for every corner. `accept` returns the
    /// number of corners kept so far; scanning stops at `max_features`.
    fn scan<F>(&self, image: &[u8], width: usize, height: usize, mut accept: F)
    where
        F: FnMut(Corner) -> usize,
    {
        assert_eq!(
            image.len(),
            width * height,
            "image length ({}) must equal width * height ({})",
            image.len(),
            width * height,
        );
        if self.max_features == 0 || width <= 2 * FAST_MARGIN || height <= 2 * FAST_MARGIN {
            return;
        }

        for y in FAST_MARGIN..(height - FAST_MARGIN) {
            for x in FAST_MARGIN..(width - FAST_MARGIN) {
                if let Some(score) = self.score_at(image, width, x, y) {
                    let kept = accept(Corner { x, y, score: score as i64 });
                    if kept >= self.max_features {
                        return;
                    }
                }
            }
        }
    }
}
