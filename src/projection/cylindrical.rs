//! Cylindrical projections: Mercator and plate carrée.
//!
//! Mercator:
//!   forward: x = λ, y = ln(tan(π/4 + φ/2))
//!   inverse: λ = x, φ = 2·atan(exp(y)) - π/2
//!
//! Equirectangular:
//!   forward: x = λ, y = φ

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::RawProjection;

/// Latitude (degrees) at which spherical Mercator becomes a square: atan(sinh(π)).
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Spherical Mercator. Undefined at the poles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mercator;

impl RawProjection for Mercator {
    fn name(&self) -> &'static str {
        "mercator"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        if phi.abs() >= FRAC_PI_2 {
            return None;
        }
        let y = (FRAC_PI_4 + phi / 2.0).tan().ln();
        y.is_finite().then_some((lambda, y))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some((x, 2.0 * y.exp().atan() - FRAC_PI_2))
    }
}

/// Plate carrée: longitude and latitude used directly as planar coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl RawProjection for Equirectangular {
    fn name(&self) -> &'static str {
        "equirectangular"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        Some((lambda, phi))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if y.abs() > FRAC_PI_2 {
            return None;
        }
        Some((x, y))
    }
}
