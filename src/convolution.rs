// convolution.rs — Point-wise weighted neighborhood sums.
//
// Everything above this module (smoothing, Sobel gradients) evaluates a small
// kernel centered on one pixel at a time. There is no whole-image pass here
// and no border policy: the caller decides which pixels it evaluates and is
// responsible for keeping the kernel footprint inside the buffer. The flat
// 1D helper only clamps to the ends of the buffer.
//
// Accumulation is in f64 over f32 weights and u8 samples. Each product is
// exact in f64, so the only rounding is in the running sum.

/// Weighted sum of the `rows × cols` footprint centered at (x, y).
///
/// `kernel` is row-major with `rows * cols` weights. The footprint spans
/// `x - cols/2 ..= x + cols/2` and `y - rows/2 ..= y + rows/2`; both
/// dimensions are expected to be odd.
///
/// The footprint must lie inside `image` (indexed with `stride` elements
/// per row). There is no clamping; a footprint outside the slice panics.
#[inline]
pub fn weighted_sum(
    image: &[u8],
    stride: usize,
    x: usize,
    y: usize,
    kernel: &[f32],
    rows: usize,
    cols: usize,
) -> f64 {
    debug_assert_eq!(kernel.len(), rows * cols, "kernel must hold rows * cols weights");
    let top = y - rows / 2;
    let left = x - cols / 2;

    let mut acc = 0.0f64;
    for ky in 0..rows {
        let base = (top + ky) * stride + left;
        let taps = &image[base..base + cols];
        let weights = &kernel[ky * cols..(ky + 1) * cols];
        for (&w, &p) in weights.iter().zip(taps) {
            acc += w as f64 * p as f64;
        }
    }
    acc
}

/// Weighted sum truncated toward zero and returned as `u32`.
///
/// Negative sums keep their two's complement bit pattern, so a gradient of
/// -5 comes back as `u32::MAX - 4`. The Harris detector depends on this.
#[inline]
pub fn convolve(
    image: &[u8],
    stride: usize,
    x: usize,
    y: usize,
    kernel: &[f32],
    rows: usize,
    cols: usize,
) -> u32 {
    weighted_sum(image, stride, x, y, kernel, rows, cols) as i64 as u32
}

/// 1D weighted sum over a flat buffer, taps `step` elements apart, of each
/// tap's difference from the sample at `center`.
///
/// Tap `i` reads `center + (i - kernel.len()/2) * step`. Indices are taken
/// on the flat buffer, so a horizontal tap past the end of a row reads the
/// start of the next one. Indices before the first or past the last element
/// read that first or last element.
///
/// On a flat neighborhood every difference is zero, so the result is exactly
/// 0.0 whatever the weights. `buffer[center] + deviation / Σ kernel` is the
/// normalized weighted mean without the rounding of `Σ w·p / Σ w`.
pub fn flat_weighted_deviation(buffer: &[u8], center: usize, step: usize, kernel: &[f32]) -> f64 {
    assert!(!buffer.is_empty(), "buffer must not be empty");
    let half = (kernel.len() / 2) as isize;
    let last = (buffer.len() - 1) as isize;
    let origin = buffer[center] as f64;

    let mut acc = 0.0f64;
    for (i, &w) in kernel.iter().enumerate() {
        let idx = center as isize + (i as isize - half) * step as isize;
        acc += w as f64 * (buffer[idx.clamp(0, last) as usize] as f64 - origin);
    }
    acc
}
