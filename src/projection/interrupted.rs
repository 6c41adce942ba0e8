//! Interrupted sinusoidal projection with Goode-style lobes.
//!
//! Each hemisphere is split into lobes, and each lobe is a sinusoidal
//! projection around its own central meridian. Between the lobes are gaps
//! that map to nothing. Along a lobe edge, the inverse of a point in a gap
//! must be rejected, or content from the neighboring lobe would be drawn twice.

use std::f64::consts::FRAC_PI_2;

use super::RawProjection;

const EDGE_EPSILON: f64 = 1e-9;

/// A lobe: longitude range `[west, east]` drawn around `center` (degrees).
#[derive(Debug, Clone, Copy)]
struct Lobe {
    west: f64,
    center: f64,
    east: f64,
}

impl Lobe {
    const fn new(west: f64, center: f64, east: f64) -> Self {
        Self { west, center, east }
    }

    fn contains_lambda(&self, lambda: f64) -> bool {
        let lon = lambda.to_degrees();
        lon >= self.west - EDGE_EPSILON && lon <= self.east + EDGE_EPSILON
    }

    /// Planar x-range covered by this lobe at the given latitude.
    fn x_range(&self, phi: f64) -> (f64, f64) {
        let c = self.center.to_radians();
        let cos_phi = phi.cos();
        (
            c + (self.west.to_radians() - c) * cos_phi,
            c + (self.east.to_radians() - c) * cos_phi,
        )
    }
}

const NORTH: [Lobe; 2] = [Lobe::new(-180.0, -100.0, -40.0), Lobe::new(-40.0, 30.0, 180.0)];

const SOUTH: [Lobe; 4] = [
    Lobe::new(-180.0, -160.0, -100.0),
    Lobe::new(-100.0, -60.0, -20.0),
    Lobe::new(-20.0, 20.0, 80.0),
    Lobe::new(80.0, 140.0, 180.0),
];

/// Lobe-tip and equator points that bracket the interrupted outline.
pub fn sampling_points() -> Vec<crate::math::LonLat> {
    use crate::math::LonLat;
    let mut points = vec![LonLat::new(-180.0, 0.0), LonLat::new(180.0, 0.0)];
    points.extend(NORTH.iter().map(|l| LonLat::new(l.center, 90.0)));
    points.extend(SOUTH.iter().map(|l| LonLat::new(l.center, -90.0)));
    points
}

fn lobes(phi: f64) -> &'static [Lobe] {
    if phi >= 0.0 {
        &NORTH
    } else {
        &SOUTH
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptedSinusoidal;

impl RawProjection for InterruptedSinusoidal {
    fn name(&self) -> &'static str {
        "interrupted-sinusoidal"
    }

    fn project(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let lobe = lobes(phi).iter().find(|l| l.contains_lambda(lambda))?;
        let c = lobe.center.to_radians();
        Some((c + (lambda - c) * phi.cos(), phi))
    }

    fn unproject(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if y.abs() > FRAC_PI_2 {
            return None;
        }
        let lobe = lobes(y).iter().find(|l| {
            let (lo, hi) = l.x_range(y);
            x >= lo - EDGE_EPSILON && x <= hi + EDGE_EPSILON
        })?;
        let c = lobe.center.to_radians();
        let cos_phi = y.cos();
        if cos_phi.abs() < 1e-15 {
            return Some((c, y));
        }
        Some((c + (x - c) / cos_phi, y))
    }
}
