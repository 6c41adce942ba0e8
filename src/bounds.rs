//! Natural-extent discovery and canvas fitting for target projections.
//!
//! A projection's natural bounds are the bounding box of its output at scale 1,
//! translate (0, 0). Projection families don't share a common analytic extent.
//! Each one declares sampling points that bracket it instead, see
//! [`ProjectionKind::sampling_points`](crate::projection::ProjectionKind::sampling_points).

use crate::error::{ReprojectError, Result};
use crate::logger;
use crate::math::{Bounds, LonLat, PixelCoord};
use crate::projection::Projection;

/// Compute the natural (unit-scale) bounding box of `projection`.
///
/// Resets the projection to scale 1, translate (0, 0), forward-projects every
/// sampling point, and keeps the finite results. Fails with
/// [`ReprojectError::InvalidBounds`] unless at least two points survive and
/// the resulting box has strictly positive width and height.
pub fn discover(projection: &mut dyn Projection, sampling_points: &[LonLat]) -> Result<Bounds> {
    projection.set_scale(1.0);
    projection.set_translate(PixelCoord::new(0.0, 0.0));

    let mut bounds: Option<Bounds> = None;
    let mut survivors = 0usize;

    for &point in sampling_points {
        let Some(p) = projection.forward(point) else {
            continue;
        };
        if !p.is_finite() {
            continue;
        }
        survivors += 1;
        match bounds.as_mut() {
            Some(b) => b.extend(p),
            None => bounds = Some(Bounds::from_point(p)),
        }
    }

    let invalid = |reason: String| ReprojectError::InvalidBounds {
        projection: projection.name().to_string(),
        reason,
    };

    let bounds = match bounds {
        Some(b) if survivors >= 2 => b,
        _ => {
            return Err(invalid(format!(
                "only {survivors} of {} sampling points projected to finite values",
                sampling_points.len()
            )))
        }
    };

    if !(bounds.width() > 0.0) || !(bounds.height() > 0.0) {
        return Err(invalid(format!(
            "degenerate extent {}x{}",
            bounds.width(),
            bounds.height()
        )));
    }

    logger::debug(&format!(
        "Natural bounds for {}: x [{:.6}, {:.6}], y [{:.6}, {:.6}]",
        projection.name(),
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y
    ));

    Ok(bounds)
}

/// Scale `projection` so its natural box spans `width` pixels horizontally,
/// and translate it so the scaled box is centered in a `width`×`height` canvas.
///
/// Returns the scale that was applied.
pub fn fit(projection: &mut dyn Projection, natural: &Bounds, width: u32, height: u32) -> f64 {
    let scale = width as f64 / natural.width();
    let center = natural.center();
    projection.set_scale(scale);
    projection.set_translate(PixelCoord::new(
        width as f64 / 2.0 - scale * center.x,
        height as f64 / 2.0 - scale * center.y,
    ));
    scale
}

/// Rounding slack so an aspect ratio that is integral up to float noise
/// doesn't gain an extra row.
const HEIGHT_EPSILON: f64 = 1e-6;

/// Destination height that keeps the natural aspect ratio at the given width.
pub fn fitted_height(natural: &Bounds, width: u32) -> u32 {
    let exact = natural.height() * (width as f64 / natural.width());
    ((exact - HEIGHT_EPSILON).ceil() as u32).max(1)
}
