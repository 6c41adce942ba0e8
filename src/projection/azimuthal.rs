//! Azimuthal projections centered on (0°, 0°).
//!
//! All four share the same structure: with `c` the angular distance from the
//! center, `cos c = cos φ · cos λ`, a point is placed at radius `r(c)` along its
//! azimuth, so `x = k·cos φ·sin λ`, `y = k·sin φ` with `k = r(c) / sin c`.

use std::f64::consts::PI;

use super::{azimuthal_invert, RawProjection};

/// Below this, the angular distance is treated as zero.
const CENTER_EPSILON: f64 = 1e-12;

fn cos_distance(lambda: f64, phi: f64) -> f64 {
    (phi.cos() * lambda.cos()).clamp(-1.0, 1.0)
}

/// Orthographic: the globe as seen from infinitely far away. Only the near
/// hemisphere is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orthographic;

impl RawProjection for Orthographic {
    fn name(&self) -> &'static str {
        "orthographic"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        if cos_distance(lambda, phi) < 0.0 {
            return None;
        }
        Some((phi.cos() * lambda.sin(), phi.sin()))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho > 1.0 {
            return None;
        }
        Some(azimuthal_invert(x, y, rho.asin()))
    }
}

/// Stereographic, clipped to the near hemisphere so the extent stays finite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stereographic;

impl RawProjection for Stereographic {
    fn name(&self) -> &'static str {
        "stereographic"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let cos_c = cos_distance(lambda, phi);
        if cos_c < 0.0 {
            return None;
        }
        let k = 1.0 / (1.0 + cos_c);
        Some((k * phi.cos() * lambda.sin(), k * phi.sin()))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let c = 2.0 * x.hypot(y).atan();
        Some(azimuthal_invert(x, y, c))
    }
}

/// Azimuthal equidistant: distance from the center is preserved. The whole
/// sphere maps to a disc of radius π; the antipode itself is undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzimuthalEquidistant;

impl RawProjection for AzimuthalEquidistant {
    fn name(&self) -> &'static str {
        "azimuthal-equidistant"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let c = cos_distance(lambda, phi).acos();
        let sin_c = c.sin();
        let k = if c < CENTER_EPSILON {
            1.0
        } else if sin_c.abs() < CENTER_EPSILON {
            return None;
        } else {
            c / sin_c
        };
        Some((k * phi.cos() * lambda.sin(), k * phi.sin()))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho > PI {
            return None;
        }
        Some(azimuthal_invert(x, y, rho))
    }
}

/// Lambert azimuthal equal-area: the whole sphere maps to a disc of radius 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct LambertAzimuthalEqualArea;

impl RawProjection for LambertAzimuthalEqualArea {
    fn name(&self) -> &'static str {
        "lambert-azimuthal-equal-area"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let denom = 1.0 + cos_distance(lambda, phi);
        if denom < CENTER_EPSILON {
            return None;
        }
        let k = (2.0 / denom).sqrt();
        Some((k * phi.cos() * lambda.sin(), k * phi.sin()))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho > 2.0 {
            return None;
        }
        Some(azimuthal_invert(x, y, 2.0 * (rho / 2.0).asin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const NEAR_SIDE: &[(f64, f64)] = &[(0.0, 0.0), (10.0, 45.0), (-60.0, 20.0), (80.0, -5.0)];

    fn assert_roundtrip(proj: &dyn RawProjection, cases: &[(f64, f64)]) {
        for &(lon, lat) in cases {
            let (lambda, phi) = (lon.to_radians(), lat.to_radians());
            let (x, y) = proj.project(lambda, phi).unwrap();
            let (l2, p2) = proj.unproject(x, y).unwrap();
            assert_relative_eq!(l2, lambda, epsilon = 1e-9);
            assert_relative_eq!(p2, phi, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_orthographic_hides_far_side() {
        assert!(Orthographic.project(PI, 0.0).is_none());
        assert!(Orthographic.project(2.0, 0.0).is_none());
        assert!(Orthographic.unproject(0.8, 0.8).is_none());
        assert_roundtrip(&Orthographic, NEAR_SIDE);
    }

    #[test]
    fn test_orthographic_horizon() {
        let (x, y) = Orthographic.project(FRAC_PI_2, 0.0).unwrap();
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stereographic_roundtrip() {
        assert_roundtrip(&Stereographic, NEAR_SIDE);
        let (x, _) = Stereographic.project(FRAC_PI_2, 0.0).unwrap();
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_azimuthal_equidistant_roundtrip() {
        let mut cases = NEAR_SIDE.to_vec();
        cases.extend_from_slice(&[(150.0, 10.0), (-120.0, -60.0)]);
        assert_roundtrip(&AzimuthalEquidistant, &cases);
    }

    #[test]
    fn test_azimuthal_equidistant_preserves_distance() {
        let (x, y) = AzimuthalEquidistant.project(0.0, 1.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
        assert!(AzimuthalEquidistant.project(PI, 0.0).is_none());
    }

    #[test]
    fn test_lambert_roundtrip_and_antipode() {
        let mut cases = NEAR_SIDE.to_vec();
        cases.extend_from_slice(&[(150.0, 10.0), (-120.0, -60.0)]);
        assert_roundtrip(&LambertAzimuthalEqualArea, &cases);
        assert!(LambertAzimuthalEqualArea.project(PI, 0.0).is_none());
        assert!(LambertAzimuthalEqualArea.unproject(2.5, 0.0).is_none());
    }
}
