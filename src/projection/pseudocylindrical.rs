//! Pseudocylindrical projections.
//!
//! Sinusoidal:
//!   forward: x = λ·cos(φ), y = φ
//!   inverse: λ = x/cos(φ), φ = y
//!
//! Mollweide (auxiliary angle θ with 2θ + sin 2θ = π·sin φ):
//!   forward: x = (2√2/π)·λ·cos θ, y = √2·sin θ
//!
//! Equal Earth (Šavrič, Patterson & Jenny 2018), polynomial in the
//! parametric latitude θ = asin(√3/2 · sin φ).

use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use super::RawProjection;

const NEWTON_ITERATIONS: usize = 25;
const NEWTON_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct Sinusoidal;

impl RawProjection for Sinusoidal {
    fn name(&self) -> &'static str {
        "sinusoidal"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        Some((lambda * phi.cos(), phi))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if y.abs() > FRAC_PI_2 {
            return None;
        }
        let cos_phi = y.cos();
        if cos_phi.abs() < 1e-15 {
            // Longitude is undefined at the poles
            return Some((0.0, y));
        }
        Some((x / cos_phi, y))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mollweide;

impl Mollweide {
    /// Solve 2θ + sin 2θ = π·sin φ for θ.
    fn auxiliary_angle(phi: f64) -> f64 {
        if (phi.abs() - FRAC_PI_2).abs() < NEWTON_EPSILON {
            return phi;
        }
        let target = PI * phi.sin();
        let mut theta = phi;
        for _ in 0..NEWTON_ITERATIONS {
            let f = 2.0 * theta + (2.0 * theta).sin() - target;
            let df = 2.0 + 2.0 * (2.0 * theta).cos();
            if df.abs() < NEWTON_EPSILON {
                break;
            }
            let delta = f / df;
            theta -= delta;
            if delta.abs() < NEWTON_EPSILON {
                break;
            }
        }
        theta
    }
}

impl RawProjection for Mollweide {
    fn name(&self) -> &'static str {
        "mollweide"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let theta = Self::auxiliary_angle(phi);
        Some((2.0 * SQRT_2 / PI * lambda * theta.cos(), SQRT_2 * theta.sin()))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let s = y / SQRT_2;
        if s.abs() > 1.0 {
            return None;
        }
        let theta = s.asin();
        let phi = ((2.0 * theta + (2.0 * theta).sin()) / PI).clamp(-1.0, 1.0).asin();
        let cos_theta = theta.cos();
        if cos_theta.abs() < 1e-15 {
            return Some((0.0, phi));
        }
        Some((PI * x / (2.0 * SQRT_2 * cos_theta), phi))
    }
}

const EE_A1: f64 = 1.340264;
const EE_A2: f64 = -0.081106;
const EE_A3: f64 = 0.000893;
const EE_A4: f64 = 0.003796;
const EE_M: f64 = 0.866_025_403_784_438_6; // √3 / 2

#[derive(Debug, Clone, Copy, Default)]
pub struct EqualEarth;

impl EqualEarth {
    fn y_of(theta: f64) -> f64 {
        let t2 = theta * theta;
        let t6 = t2 * t2 * t2;
        theta * (EE_A1 + EE_A2 * t2 + t6 * (EE_A3 + EE_A4 * t2))
    }

    fn dy_of(theta: f64) -> f64 {
        let t2 = theta * theta;
        let t6 = t2 * t2 * t2;
        EE_A1 + 3.0 * EE_A2 * t2 + t6 * (7.0 * EE_A3 + 9.0 * EE_A4 * t2)
    }
}

impl RawProjection for EqualEarth {
    fn name(&self) -> &'static str {
        "equal-earth"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let theta = (EE_M * phi.sin()).asin();
        Some((
            lambda * theta.cos() / (EE_M * Self::dy_of(theta)),
            Self::y_of(theta),
        ))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut theta = y;
        for _ in 0..NEWTON_ITERATIONS {
            let delta = (Self::y_of(theta) - y) / Self::dy_of(theta);
            theta -= delta;
            if delta.abs() < NEWTON_EPSILON {
                break;
            }
        }
        let sin_phi = theta.sin() / EE_M;
        if sin_phi.abs() > 1.0 {
            return None;
        }
        Some((EE_M * x * Self::dy_of(theta) / theta.cos(), sin_phi.asin()))
    }
}
