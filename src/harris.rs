// harris.rs — Harris corner detector over an integer structure tensor.
//
// For each candidate pixel p:
//   1. For every q in the 3×3 window around p, take Sobel gradients at q.
//   2. Accumulate M = Σ [Ix², IxIy; IxIy, Iy²] in i64.
//   3. R = det(M) - k·trace(M)²
//   4. Keep p iff |R| > threshold.
//
// Gradients arrive as raw `convolve` output: a negative gradient is its u32
// two's complement pattern, widened to i64 without sign extension. Products
// of those values overflow i64, so the tensor uses wrapping arithmetic and
// the response is only meaningful as a magnitude. The default threshold,
// i64::MAX / 1000, is calibrated against exactly that arithmetic; on a flat
// region every gradient is 0 and so is R.
//
// There is no non-maximum suppression: adjacent pixels around one physical
// corner are all reported, in raster order.

use crate::fast::Corner;
use crate::frame::Frame;
use crate::gradient::sobel_at;

/// Half-size of the tensor window (3×3).
pub const WINDOW_HALF: usize = 1;
/// Harris sensitivity constant.
pub const HARRIS_K: f32 = 0.03;
/// Default magnitude cutoff for |R|.
pub const DEFAULT_THRESHOLD: i64 = i64::MAX / 1000;

/// 2×2 structure tensor, row-major: [[m00, m01], [m10, m11]].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureTensor {
    pub m00: i64,
    pub m01: i64,
    pub m10: i64,
    pub m11: i64,
}

impl StructureTensor {
    #[inline]
    pub fn det(&self) -> i64 {
        self.m00
            .wrapping_mul(self.m11)
            .wrapping_sub(self.m01.wrapping_mul(self.m10))
    }

    #[inline]
    pub fn trace(&self) -> i64 {
        self.m00.wrapping_add(self.m11)
    }

    /// R = det - k·trace², with trace² formed in i64 and the rest in f32.
    /// Out-of-range results saturate to i64::MIN / i64::MAX.
    #[inline]
    pub fn response(&self, k: f32) -> i64 {
        let trace = self.trace();
        let trace_sq = trace.wrapping_mul(trace);
        (self.det() as f32 - k * trace_sq as f32) as i64
    }
}

/// Harris corner detector with a fixed 3×3 window.
#[derive(Debug, Clone)]
pub struct HarrisDetector {
    /// Sensitivity constant in R = det - k·trace².
    pub k: f32,
    /// Accept a pixel iff |R| is strictly greater than this.
    pub threshold: i64,
}

impl Default for HarrisDetector {
    fn default() -> Self {
        HarrisDetector {
            k: HARRIS_K,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl HarrisDetector {
    /// Detector with the default k and a custom magnitude cutoff.
    pub fn with_threshold(threshold: i64) -> Self {
        HarrisDetector {
            threshold,
            ..Default::default()
        }
    }

    /// Distance from each edge to the first evaluated pixel.
    #[inline]
    pub fn margin(&self) -> usize {
        WINDOW_HALF + 1
    }

    /// Structure tensor for the window centered at (x, y).
    ///
    /// (x, y) must be at least `margin()` pixels from every edge.
    pub fn structure_tensor(&self, image: &[u8], stride: usize, x: usize, y: usize) -> StructureTensor {
        let mut m = StructureTensor::default();
        for qy in (y - WINDOW_HALF)..=(y + WINDOW_HALF) {
            for qx in (x - WINDOW_HALF)..=(x + WINDOW_HALF) {
                let (gx, gy) = sobel_at(image, stride, qx, qy);
                let ix = gx as i64;
                let iy = gy as i64;
                let ixy = ix.wrapping_mul(iy);
                m.m00 = m.m00.wrapping_add(ix.wrapping_mul(ix));
                m.m01 = m.m01.wrapping_add(ixy);
                m.m10 = m.m10.wrapping_add(ixy);
                m.m11 = m.m11.wrapping_add(iy.wrapping_mul(iy));
            }
        }
        m
    }

    /// Corner response at (x, y).
    #[inline]
    pub fn response_at(&self, image: &[u8], stride: usize, x: usize, y: usize) -> i64 {
        self.structure_tensor(image, stride, x, y).response(self.k)
    }

    /// Detect corners in a luminance frame (normally the smoothed one).
    pub fn detect(&self, frame: &Frame) -> Vec<Corner> {
        let mut corners = Vec::new();
        self.detect_into(frame.as_slice(), frame.width(), frame.height(), &mut corners);
        corners
    }

    /// Detect corners into `out`, which is cleared first.
    ///
    /// Pixels are visited in raster order over the rectangle inset by
    /// `margin()` on every side. Frames too small to have such a rectangle
    /// produce no corners.
    pub fn detect_into(&self, image: &[u8], width: usize, height: usize, out: &mut Vec<Corner>) {
        assert_eq!(
            image.len(),
            width * height,
            "image length ({}) must equal width * height ({})",
            image.len(),
            width * height,
        );
        out.clear();

        let border = self.margin();
        if width <= 2 * border || height <= 2 * border {
            return;
        }

        let threshold = self.threshold.unsigned_abs();
        for y in border..(height - border) {
            for x in border..(width - border) {
                let r = self.response_at(image, width, x, y);
                if r.unsigned_abs() > threshold {
                    out.push(Corner { x, y, score: r });
                }
            }
        }
    }
}
