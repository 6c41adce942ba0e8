//! Map projection capabilities.
//!
//! The reprojection engine only ever talks to a [`Projection`]: forward and
//! inverse mapping between [`LonLat`] and [`PixelCoord`], plus mutable scale and
//! translate. The raw math for each family lives in its own submodule and works
//! on a unit sphere in radians, with y pointing north. [`Scaled`] adapts any
//! [`RawProjection`] to screen space (y pointing down) and degrees.

use std::f64::consts::{PI, TAU};

use crate::math::{LonLat, PixelCoord};

pub mod azimuthal;
pub mod catalog;
pub mod cylindrical;
pub mod interrupted;
pub mod pseudocylindrical;

pub use catalog::ProjectionKind;

/// A configurable map projection, treated as a black box by the engine.
pub trait Projection: Send + Sync {
    /// Human-readable projection name, used in errors and logs.
    fn name(&self) -> &str;

    /// Geographic → screen. `None` where the projection is undefined or clipped.
    fn forward(&self, p: LonLat) -> Option<PixelCoord>;

    /// Screen → geographic. `None` outside the projection's domain.
    fn invert(&self, p: PixelCoord) -> Option<LonLat>;

    /// Whether [`invert`](Self::invert) is implemented at all.
    fn is_invertible(&self) -> bool {
        true
    }

    fn scale(&self) -> f64;
    fn set_scale(&mut self, scale: f64);
    fn translate(&self) -> PixelCoord;
    fn set_translate(&mut self, translate: PixelCoord);
}

/// Unit-sphere projection math: (λ, φ) in radians ↔ (x, y) with y up.
pub trait RawProjection: Send + Sync {
    fn name(&self) -> &'static str;

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)>;

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    fn invertible(&self) -> bool {
        true
    }
}

/// Slack allowed past ±π before a longitude is wrapped, so ±180° survive the
/// degree-to-radian conversion unchanged.
const ANTIMERIDIAN_EPSILON: f64 = 1e-12;

/// Wrap a longitude in radians into [-π, π].
pub fn normalize_lambda(lambda: f64) -> f64 {
    if lambda.abs() > PI + ANTIMERIDIAN_EPSILON {
        lambda - (lambda / TAU).round() * TAU
    } else {
        lambda
    }
}

/// Screen-space adapter over a [`RawProjection`].
///
/// `forward` maps `(λ, φ)` to `(tx + k·x, ty - k·y)`. Longitudes are wrapped into
/// [-180, 180] first, so inverting a point past the antimeridian and projecting
/// it again lands somewhere else.
#[derive(Debug, Clone)]
pub struct Scaled<R> {
    raw: R,
    scale: f64,
    translate: PixelCoord,
}

impl<R: RawProjection> Scaled<R> {
    /// Wraps `raw` at scale 1, translate (0, 0).
    pub fn new(raw: R) -> Self {
        Self {
            raw,
            scale: 1.0,
            translate: PixelCoord::new(0.0, 0.0),
        }
    }
}

impl<R: RawProjection> Projection for Scaled<R> {
    fn name(&self) -> &str {
        self.raw.name()
    }

    fn forward(&self, p: LonLat) -> Option<PixelCoord> {
        let lambda = normalize_lambda(p.lon.to_radians());
        let (x, y) = self.raw.project(lambda, p.lat.to_radians())?;
        let out = PixelCoord::new(
            self.translate.x + self.scale * x,
            self.translate.y - self.scale * y,
        );
        out.is_finite().then_some(out)
    }

    fn invert(&self, p: PixelCoord) -> Option<LonLat> {
        let x = (p.x - self.translate.x) / self.scale;
        let y = (self.translate.y - p.y) / self.scale;
        let (lambda, phi) = self.raw.unproject(x, y)?;
        if !(lambda.is_finite() && phi.is_finite()) {
            return None;
        }
        Some(LonLat::new(lambda.to_degrees(), phi.to_degrees()))
    }

    fn is_invertible(&self) -> bool {
        self.raw.invertible()
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn translate(&self) -> PixelCoord {
        self.translate
    }

    fn set_translate(&mut self, translate: PixelCoord) {
        self.translate = translate;
    }
}

/// A target projection together with the data needed to fit it to a canvas.
pub struct ProjectionConfig {
    /// The projection capability. Its scale/translate are overwritten by the engine.
    pub projection: Box<dyn Projection>,
    /// Points whose forward projections bracket the projection's natural extent.
    pub sampling_points: Vec<LonLat>,
    /// Longitude (degrees) by which source sampling is re-centered.
    pub lon_offset: f64,
}

impl ProjectionConfig {
    pub fn new(projection: Box<dyn Projection>, sampling_points: Vec<LonLat>) -> Self {
        Self {
            projection,
            sampling_points,
            lon_offset: 0.0,
        }
    }

    pub fn with_lon_offset(mut self, degrees: f64) -> Self {
        self.lon_offset = degrees;
        self
    }
}

impl std::fmt::Debug for ProjectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionConfig")
            .field("projection", &self.projection.name())
            .field("sampling_points", &self.sampling_points.len())
            .field("lon_offset", &self.lon_offset)
            .finish()
    }
}

/// The four cardinal extremes, which bound most pole-aligned projections.
pub fn cardinal_points() -> Vec<LonLat> {
    vec![
        LonLat::new(-180.0, 0.0),
        LonLat::new(180.0, 0.0),
        LonLat::new(0.0, 90.0),
        LonLat::new(0.0, -90.0),
    ]
}

/// Shared inverse for azimuthal-style projections: recover (λ, φ) from the
/// planar point and its angular distance `c` from the center.
pub(crate) fn azimuthal_invert(x: f64, y: f64, c: f64) -> (f64, f64) {
    let rho = x.hypot(y);
    if rho == 0.0 {
        return (0.0, 0.0);
    }
    let (sin_c, cos_c) = c.sin_cos();
    let lambda = (x * sin_c).atan2(rho * cos_c);
    let phi = (y * sin_c / rho).clamp(-1.0, 1.0).asin();
    (lambda, phi)
}
