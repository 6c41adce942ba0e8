//! Bilinear interpolation over an RGBA pixel buffer.

use image::{Rgba, RgbaImage};

/// Sample an RGBA buffer at a fractional coordinate using bilinear interpolation.
///
/// The four neighbors `(x0, y0)`, `(x0+1, y0)`, `(x0, y0+1)` and `(x0+1, y0+1)`
/// are each clamped into the buffer before lookup, so edge pixels are replicated
/// beyond the border. Each channel is interpolated independently and rounded
/// half-up. At integer coordinates the stored pixel comes back unchanged.
///
/// Coordinates must not be NaN. The buffer must be at least 1x1.
pub fn sample(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (width, height) = src.dimensions();
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    let fx = x.floor();
    let fy = y.floor();
    let tx = x - fx;
    let ty = y - fy;

    let x0 = fx as i64;
    let y0 = fy as i64;
    let cx0 = x0.clamp(0, max_x) as u32;
    let cx1 = (x0 + 1).clamp(0, max_x) as u32;
    let cy0 = y0.clamp(0, max_y) as u32;
    let cy1 = (y0 + 1).clamp(0, max_y) as u32;

    let c00 = src.get_pixel(cx0, cy0).0;
    let c10 = src.get_pixel(cx1, cy0).0;
    let c01 = src.get_pixel(cx0, cy1).0;
    let c11 = src.get_pixel(cx1, cy1).0;

    let mut out = [0u8; 4];
    for (i, channel) in out.iter_mut().enumerate() {
        let top = c00[i] as f64 * (1.0 - tx) + c10[i] as f64 * tx;
        let bottom = c01[i] as f64 * (1.0 - tx) + c11[i] as f64 * tx;
        *channel = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }

    Rgba(out)
}
