// brief.rs — 128-bit binary descriptors from random intensity comparisons.
//
// Each bit compares the smoothed intensity at two offsets around the
// feature: bit i = 1 iff I(p + a_i) < I(p + b_i). The 128 offset pairs form
// a `BriefPattern`, drawn once from a seeded RNG and then reused for every
// descriptor the pattern computes. Two descriptors are only comparable if
// they come from the same pattern.
//
// Offsets lie in [-8, 8) on both axes, so a feature needs an 8 px margin on
// every side to be described.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::frame::Frame;

/// Number of comparison bits per descriptor.
pub const DESCRIPTOR_BITS: usize = 128;
/// Minimum distance from every edge for a describable feature.
pub const DESCRIPTOR_MARGIN: usize = 8;

/// 128-bit descriptor stored as two words. Bit i lives in word i / 64 at
/// position i % 64.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Descriptor(pub [u64; 2]);

impl Descriptor {
    /// Number of differing bits, in [0, 128].
    #[inline]
    pub fn hamming_distance(&self, other: &Descriptor) -> u32 {
        hamming_distance(self, other)
    }

    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        (self.0[i / 64] >> (i % 64)) & 1 == 1
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Descriptor({:016x}{:016x})", self.0[1], self.0[0])
    }
}

/// popcount(a0 ^ b0) + popcount(a1 ^ b1).
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    (a.0[0] ^ b.0[0]).count_ones() + (a.0[1] ^ b.0[1]).count_ones()
}

/// One comparison: offsets (dx, dy) of the two sampled pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPair {
    pub a: (i8, i8),
    pub b: (i8, i8),
}

/// Fixed table of 128 offset pairs.
#[derive(Clone, PartialEq, Eq)]
pub struct BriefPattern {
    pairs: [OffsetPair; DESCRIPTOR_BITS],
    seed: u64,
}

impl BriefPattern {
    /// Draw a pattern from a deterministic seed.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut draw = || -> (i8, i8) {
            let dx = rng.gen_range(-8i8..8);
            let dy = rng.gen_range(-8i8..8);
            (dx, dy)
        };

        let mut pairs = [OffsetPair { a: (0, 0), b: (0, 0) }; DESCRIPTOR_BITS];
        for pair in pairs.iter_mut() {
            let a = draw();
            let b = draw();
            *pair = OffsetPair { a, b };
        }
        BriefPattern { pairs, seed }
    }

    /// Draw a pattern seeded from the wall clock. Descriptors are then only
    /// reproducible within one process.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ (d.subsec_nanos() as u64) << 32)
            .unwrap_or(0);
        log::debug!("descriptor pattern seeded from clock: {seed:#x}");
        Self::from_seed(seed)
    }

    /// Seed the pattern was drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn pairs(&self) -> &[OffsetPair; DESCRIPTOR_BITS] {
        &self.pairs
    }

    /// Whether (x, y) keeps every offset inside a `width × height` image.
    #[inline]
    pub fn in_bounds(x: usize, y: usize, width: usize, height: usize) -> bool {
        x >= DESCRIPTOR_MARGIN
            && y >= DESCRIPTOR_MARGIN
            && x + DESCRIPTOR_MARGIN < width
            && y + DESCRIPTOR_MARGIN < height
    }

    /// Describe the feature at (x, y) of a smoothed image, or `None` if it
    /// is inside the 8 px border.
    pub fn describe(
        &self,
        smoothed: &[u8],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
    ) -> Option<Descriptor> {
        if !Self::in_bounds(x, y, width, height) {
            return None;
        }
        debug_assert_eq!(smoothed.len(), width * height);

        let sample = |(dx, dy): (i8, i8)| -> u8 {
            let sx = (x as isize + dx as isize) as usize;
            let sy = (y as isize + dy as isize) as usize;
            smoothed[sy * width + sx]
        };

        let mut words = [0u64; 2];
        for (i, pair) in self.pairs.iter().enumerate() {
            if sample(pair.a) < sample(pair.b) {
                words[i / 64] |= 1 << (i % 64);
            }
        }
        Some(Descriptor(words))
    }

    /// `describe` on a frame.
    pub fn describe_frame(&self, smoothed: &Frame, x: usize, y: usize) -> Option<Descriptor> {
        self.describe(smoothed.as_slice(), smoothed.width(), smoothed.height(), x, y)
    }
}

impl fmt::Debug for BriefPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BriefPattern")
            .field("seed", &self.seed)
            .field("pairs", &self.pairs.len())
            .finish()
    }
}
