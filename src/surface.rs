//! Raster surfaces for the destination image.

use std::path::Path;

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};

use crate::error::{ReprojectError, Result};

/// Largest width or height a destination surface may have.
pub const MAX_DIMENSION: u32 = 20000;

/// Creates destination pixel buffers and exports them as displayable frames.
pub trait SurfaceFactory {
    /// The displayable form of a frame.
    type Surface;

    /// Create a blank destination buffer filled with `fill`.
    fn blank(&self, width: u32, height: u32, fill: Rgba<u8>) -> Result<RgbaImage>;

    /// Snapshot the current destination buffer as a displayable surface.
    fn materialize(&self, pixels: &RgbaImage) -> Result<Self::Surface>;
}

/// In-memory surfaces backed by `image::RgbaImage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterSurfaces;

impl SurfaceFactory for RasterSurfaces {
    type Surface = RgbaImage;

    fn blank(&self, width: u32, height: u32, fill: Rgba<u8>) -> Result<RgbaImage> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ReprojectError::ImageTooLarge {
                width,
                height,
                max: MAX_DIMENSION,
            });
        }
        if width == 0 || height == 0 {
            return Err(ReprojectError::Surface(format!(
                "cannot create a {width}x{height} surface"
            )));
        }
        Ok(ImageBuffer::from_pixel(width, height, fill))
    }

    fn materialize(&self, pixels: &RgbaImage) -> Result<RgbaImage> {
        Ok(pixels.clone())
    }
}

/// Decode an image file into RGBA pixels.
pub fn load(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(ReprojectError::FileNotFound(path.display().to_string()));
    }
    Ok(image::open(path)?.to_rgba8())
}

/// Write `pixels` as a PNG, creating missing parent directories.
pub fn save_png(pixels: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    pixels.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
