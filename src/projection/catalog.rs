//! Static table of the built-in target projections.
//!
//! Each entry pairs a projection capability with the sampling points that
//! bracket its natural extent and the longitude offset applied to the source.

use std::fmt;

use super::azimuthal::{AzimuthalEquidistant, LambertAzimuthalEqualArea, Orthographic, Stereographic};
use super::cylindrical::{Equirectangular, Mercator, MERCATOR_MAX_LAT};
use super::interrupted::{self, InterruptedSinusoidal};
use super::pseudocylindrical::{EqualEarth, Mollweide, Sinusoidal};
use super::{cardinal_points, Projection, ProjectionConfig, Scaled};
use crate::math::LonLat;

/// Built-in target projections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ProjectionKind {
    Mercator,
    Equirectangular,
    Sinusoidal,
    Mollweide,
    EqualEarth,
    Orthographic,
    Stereographic,
    AzimuthalEquidistant,
    LambertAzimuthalEqualArea,
    InterruptedSinusoidal,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 10] = [
        Self::Mercator,
        Self::Equirectangular,
        Self::Sinusoidal,
        Self::Mollweide,
        Self::EqualEarth,
        Self::Orthographic,
        Self::Stereographic,
        Self::AzimuthalEquidistant,
        Self::LambertAzimuthalEqualArea,
        Self::InterruptedSinusoidal,
    ];

    /// Stable kebab-case name, matching the CLI value.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mercator => "mercator",
            Self::Equirectangular => "equirectangular",
            Self::Sinusoidal => "sinusoidal",
            Self::Mollweide => "mollweide",
            Self::EqualEarth => "equal-earth",
            Self::Orthographic => "orthographic",
            Self::Stereographic => "stereographic",
            Self::AzimuthalEquidistant => "azimuthal-equidistant",
            Self::LambertAzimuthalEqualArea => "lambert-azimuthal-equal-area",
            Self::InterruptedSinusoidal => "interrupted-sinusoidal",
        }
    }

    /// Build a fresh capability for this projection at unit scale.
    pub fn projection(&self) -> Box<dyn Projection> {
        match self {
            Self::Mercator => Box::new(Scaled::new(Mercator)),
            Self::Equirectangular => Box::new(Scaled::new(Equirectangular)),
            Self::Sinusoidal => Box::new(Scaled::new(Sinusoidal)),
            Self::Mollweide => Box::new(Scaled::new(Mollweide)),
            Self::EqualEarth => Box::new(Scaled::new(EqualEarth)),
            Self::Orthographic => Box::new(Scaled::new(Orthographic)),
            Self::Stereographic => Box::new(Scaled::new(Stereographic)),
            Self::AzimuthalEquidistant => Box::new(Scaled::new(AzimuthalEquidistant)),
            Self::LambertAzimuthalEqualArea => Box::new(Scaled::new(LambertAzimuthalEqualArea)),
            Self::InterruptedSinusoidal => Box::new(Scaled::new(InterruptedSinusoidal)),
        }
    }

    /// Points whose forward projections bracket the natural extent.
    ///
    /// Pole-aligned projections are bounded by the cardinal extremes. The
    /// hemisphere azimuthals are bounded by their horizon. The whole-sphere
    /// azimuthals need points just short of the antipode, which is singular.
    pub fn sampling_points(&self) -> Vec<LonLat> {
        match self {
            Self::Mercator => vec![
                LonLat::new(-180.0, MERCATOR_MAX_LAT),
                LonLat::new(180.0, MERCATOR_MAX_LAT),
                LonLat::new(-180.0, -MERCATOR_MAX_LAT),
                LonLat::new(180.0, -MERCATOR_MAX_LAT),
            ],
            Self::Equirectangular | Self::Sinusoidal | Self::Mollweide | Self::EqualEarth => {
                cardinal_points()
            }
            Self::Orthographic | Self::Stereographic => vec![
                LonLat::new(-90.0, 0.0),
                LonLat::new(90.0, 0.0),
                LonLat::new(0.0, 90.0),
                LonLat::new(0.0, -90.0),
            ],
            Self::AzimuthalEquidistant | Self::LambertAzimuthalEqualArea => vec![
                LonLat::new(-179.999, 0.0),
                LonLat::new(179.999, 0.0),
                LonLat::new(180.0, 0.001),
                LonLat::new(180.0, -0.001),
            ],
            Self::InterruptedSinusoidal => interrupted::sampling_points(),
        }
    }

    /// Default longitude offset (degrees) for re-centering the source.
    pub fn lon_offset(&self) -> f64 {
        0.0
    }

    /// Assemble the full configuration consumed by the reprojection engine.
    pub fn config(&self) -> ProjectionConfig {
        ProjectionConfig::new(self.projection(), self.sampling_points())
            .with_lon_offset(self.lon_offset())
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
