//! Coordinate types and planar bounding boxes.
//!
//! Geographic and pixel coordinates are kept in distinct types so a
//! longitude/latitude pair can never be handed to a function expecting
//! image-plane coordinates (or the reverse).

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    /// Longitude in degrees, nominally within [-180, 180].
    pub lon: f64,
    /// Latitude in degrees, nominally within [-90, 90].
    pub lat: f64,
}

impl LonLat {
    /// Creates a new geographic coordinate.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Planar coordinate in image-pixel space. Fractional values are allowed
/// and nothing is bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCoord {
    pub x: f64,
    pub y: f64,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns true if `other` lies within `tolerance` of `self` on both axes.
    pub fn approx_eq(&self, other: PixelCoord, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

/// Axis-aligned box in a projection's planar coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates a box from explicit extremes.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Creates a degenerate box around a single point.
    pub fn from_point(p: PixelCoord) -> Self {
        Self::new(p.x, p.x, p.y, p.y)
    }

    /// Grows the box so it contains `p`.
    pub fn extend(&mut self, p: PixelCoord) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> PixelCoord {
        PixelCoord::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_dimensions() {
        let b = Bounds::new(-2.0, 2.0, -1.0, 0.5);
        assert!((b.width() - 4.0).abs() < 1e-10);
        assert!((b.height() - 1.5).abs() < 1e-10);
        let c = b.center();
        assert!((c.x - 0.0).abs() < 1e-10);
        assert!((c.y - (-0.25)).abs() < 1e-10);
    }

    #[test]
    fn test_bounds_extend() {
        let mut b = Bounds::from_point(PixelCoord::new(1.0, 1.0));
        assert_eq!(b.width(), 0.0);
        b.extend(PixelCoord::new(-3.0, 4.0));
        b.extend(PixelCoord::new(0.0, -2.0));
        assert_eq!(b, Bounds::new(-3.0, 1.0, -2.0, 4.0));
    }

    #[test]
    fn test_pixel_approx_eq() {
        let p = PixelCoord::new(10.0, 20.0);
        assert!(p.approx_eq(PixelCoord::new(10.0005, 19.9995), 1e-3));
        assert!(!p.approx_eq(PixelCoord::new(10.002, 20.0), 1e-3));
        assert!(!p.approx_eq(PixelCoord::new(10.0, 20.002), 1e-3));
    }

    #[test]
    fn test_pixel_is_finite() {
        assert!(PixelCoord::new(0.0, -1.0).is_finite());
        assert!(!PixelCoord::new(f64::INFINITY, 0.0).is_finite());
        assert!(!PixelCoord::new(0.0, f64::NAN).is_finite());
    }
}
