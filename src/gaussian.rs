// gaussian.rs — Gaussian kernel generation and separable smoothing.
//
// The kernel keeps the raw density samples and a separate normalization
// scale (1 / Σ weights) instead of normalizing in place. Smoothing divides
// each pass's result by Σ weights, taken in f64, and works on deviations
// from the center sample:
//
//   out = center + Σ w·(tap − center) / Σ w,  truncated to u8
//
// which equals Σ w·tap / Σ w but leaves a flat neighborhood at exactly its
// input value for every σ and size.
//
// BORDER HANDLING: none. Taps are addressed on the flat, unpadded buffer:
//   horizontal pass: index y * w + x + (i - half)
//   vertical pass:   index (y + i - half) * w + x
// Near the left/right edges the horizontal pass mixes in the neighboring
// row. Taps before the first byte or after the last byte of the buffer read
// that first or last byte. Pixels within half a kernel of any edge are
// therefore unreliable, and the detectors keep their own margins.

use crate::convolution::flat_weighted_deviation;
use crate::frame::Frame;

/// Sampled 1D Gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    /// Standard deviation the kernel was built with.
    pub sigma: f32,
    /// 1 / Σ values. Multiply a weighted sum by this to normalize it.
    pub scale: f32,
    /// Unnormalized density samples, centered at index `(len - 1) / 2`.
    pub values: Vec<f32>,
}

impl GaussianKernel {
    /// Sample a Gaussian density with standard deviation `sigma` at `size`
    /// integer offsets centered on the middle tap.
    ///
    /// # Panics
    /// Panics if `sigma <= 0` or `size` is even or zero.
    pub fn new(sigma: f32, size: usize) -> Self {
        assert!(sigma > 0.0, "sigma must be positive (got {sigma})");
        assert!(size % 2 == 1, "kernel size must be odd (got {size})");

        let center = (size - 1) as f32 / 2.0;
        let norm = (2.0 * std::f32::consts::PI).sqrt() * sigma;
        let two_sigma_sq = 2.0 * (sigma * sigma);

        let mut values = Vec::with_capacity(size);
        let mut sum = 0.0f32;
        for i in 0..size {
            let x = i as f32 - center;
            let v = (-(x * x) / two_sigma_sq).exp() / norm;
            values.push(v);
            sum += v;
        }

        GaussianKernel {
            sigma,
            scale: 1.0 / sum,
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Half-width of the kernel (taps on each side of the center).
    #[inline]
    pub fn half(&self) -> usize {
        self.values.len() / 2
    }

    /// Σ values, accumulated in f64.
    pub fn total(&self) -> f64 {
        self.values.iter().map(|&v| v as f64).sum()
    }
}

impl Default for GaussianKernel {
    /// σ = 0.5 over 9 taps, the smoothing used for every replayed frame.
    fn default() -> Self {
        GaussianKernel::new(0.5, 9)
    }
}

/// Two-pass separable blur of `input` into `output`, using `scratch` for the
/// horizontal result.
///
/// `scratch` and `output` are resized to `width * height`; passing the same
/// buffers every frame avoids reallocating.
///
/// # Panics
/// Panics if `input.len() != width * height` or the kernel is empty.
pub fn smooth_into(
    input: &[u8],
    width: usize,
    height: usize,
    kernel: &GaussianKernel,
    scratch: &mut Vec<u8>,
    output: &mut Vec<u8>,
) {
    assert_eq!(
        input.len(),
        width * height,
        "input length ({}) must equal width * height ({})",
        input.len(),
        width * height,
    );
    assert!(!kernel.is_empty(), "kernel must not be empty");

    scratch.resize(input.len(), 0);
    output.resize(input.len(), 0);
    if input.is_empty() {
        return;
    }

    let values = &kernel.values;
    let total = kernel.total();

    // Horizontal pass.
    for i in 0..input.len() {
        scratch[i] = normalized(input[i], flat_weighted_deviation(input, i, 1, values), total);
    }

    // Vertical pass.
    for i in 0..scratch.len() {
        output[i] = normalized(scratch[i], flat_weighted_deviation(scratch, i, width, values), total);
    }
}

/// Weighted mean from a center sample and its weighted deviation, truncated.
#[inline]
fn normalized(center: u8, deviation: f64, total: f64) -> u8 {
    (center as f64 + deviation / total) as u8
}

/// Convenience wrapper: smooth a frame into a newly allocated frame.
pub fn smooth(frame: &Frame, kernel: &GaussianKernel) -> Frame {
    let mut scratch = Vec::new();
    let mut output = Vec::new();
    smooth_into(
        frame.as_slice(),
        frame.width(),
        frame.height(),
        kernel,
        &mut scratch,
        &mut output,
    );
    Frame::from_vec(frame.width(), frame.height(), output)
}
