// gradient.rs — 3×3 Sobel gradients evaluated at a single pixel.
//
//   SOBEL_X = [ 1  0 -1 ]      SOBEL_Y = [  1  2  1 ]
//             [ 2  0 -2 ]                [  0  0  0 ]
//             [ 1  0 -1 ]                [ -1 -2 -1 ]
//
// Sign convention: Ix is positive when intensity *decreases* to the right,
// Iy is positive when intensity decreases downward. The values come back
// through `convolve`, so negative gradients arrive as their u32 two's
// complement pattern. `as i32` recovers the signed value.

use crate::convolution::convolve;

pub const SOBEL_X: [f32; 9] = [
    1.0, 0.0, -1.0,
    2.0, 0.0, -2.0,
    1.0, 0.0, -1.0,
];

pub const SOBEL_Y: [f32; 9] = [
    1.0, 2.0, 1.0,
    0.0, 0.0, 0.0,
    -1.0, -2.0, -1.0,
];

/// Sobel (Ix, Iy) at (x, y), as raw `convolve` results.
///
/// (x, y) must be at least one pixel away from every edge.
#[inline]
pub fn sobel_at(image: &[u8], stride: usize, x: usize, y: usize) -> (u32, u32) {
    (
        convolve(image, stride, x, y, &SOBEL_X, 3, 3),
        convolve(image, stride, x, y, &SOBEL_Y, 3, 3),
    )
}
