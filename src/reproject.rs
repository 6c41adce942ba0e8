//! Inverse-mapping reprojection of a Mercator raster into a target projection.
//!
//! For each destination pixel: invert through the target projection, check that
//! the point projects back onto itself, forward-project through a reference
//! Mercator laid over the source image, and sample the source bilinearly.
//!
//! The pixel loop is an explicit cursor exposed as an [`Iterator`] of
//! [`Frame`]s. Each call to `next` resumes at the saved row and runs until the
//! yield interval has elapsed (checked at row boundaries) or the image is done.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{Rgba, RgbaImage};

use crate::bounds;
use crate::error::{ReprojectError, Result};
use crate::logger;
use crate::math::PixelCoord;
use crate::projection::cylindrical::Mercator;
use crate::projection::{Projection, ProjectionConfig, Scaled};
use crate::resample;
use crate::surface::SurfaceFactory;

/// Maximum per-axis distance (in destination pixels) between a pixel and its
/// inverse-then-forward image before it is treated as a wrapped duplicate.
pub const ROUND_TRIP_TOLERANCE: f64 = 1e-3;

/// Minimum wall-clock time between two intermediate frames.
pub const DEFAULT_YIELD_INTERVAL: Duration = Duration::from_secs(1);

/// Tunables for a reprojection run.
#[derive(Debug, Clone, Copy)]
pub struct ReprojectOptions {
    pub round_trip_tolerance: f64,
    pub yield_interval: Duration,
    /// Fill for destination pixels that receive no sample.
    pub background: Rgba<u8>,
}

impl Default for ReprojectOptions {
    fn default() -> Self {
        Self {
            round_trip_tolerance: ROUND_TRIP_TOLERANCE,
            yield_interval: DEFAULT_YIELD_INTERVAL,
            background: Rgba([0, 0, 0, 0]),
        }
    }
}

/// Cooperative cancellation flag shared between a run and whoever may abort it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A snapshot of the destination image part-way through (or at the end of) a run.
#[derive(Debug, Clone)]
pub struct Frame<S> {
    pub surface: S,
    pub pixels_done: u64,
    pub total_pixels: u64,
}

impl<S> Frame<S> {
    /// Fraction of destination pixels computed so far, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.total_pixels == 0 {
            return 1.0;
        }
        self.pixels_done as f64 / self.total_pixels as f64
    }

    pub fn is_complete(&self) -> bool {
        self.pixels_done == self.total_pixels
    }
}

/// A single reprojection run. Not resumable once dropped.
pub struct Reprojection<F: SurfaceFactory> {
    source: RgbaImage,
    target: Box<dyn Projection>,
    reference: Scaled<Mercator>,
    factory: F,
    token: CancelToken,
    options: ReprojectOptions,
    dest: RgbaImage,
    row: u32,
    last_yield: Instant,
    finished: bool,
}

impl<F: SurfaceFactory> std::fmt::Debug for Reprojection<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojection")
            .field("target", &self.target.name())
            .field("source", &self.source.dimensions())
            .field("dest", &self.dest.dimensions())
            .field("row", &self.row)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<F: SurfaceFactory> Reprojection<F> {
    /// Validate the inputs and set up both projections.
    ///
    /// All precondition failures surface here, before any pixel is computed:
    /// a non-invertible target, degenerate natural bounds, an empty source, or
    /// a destination surface that cannot be created.
    pub fn new(
        source: RgbaImage,
        config: ProjectionConfig,
        factory: F,
        token: CancelToken,
        options: ReprojectOptions,
    ) -> Result<Self> {
        let ProjectionConfig {
            projection: mut target,
            sampling_points,
            lon_offset,
        } = config;

        if !target.is_invertible() {
            return Err(ReprojectError::NonInvertible(target.name().to_string()));
        }

        let (src_width, src_height) = source.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(ReprojectError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        let natural = bounds::discover(target.as_mut(), &sampling_points)?;
        let dest_width = src_width;
        let dest_height = bounds::fitted_height(&natural, dest_width);
        let dest = factory.blank(dest_width, dest_height, options.background)?;
        let scale = bounds::fit(target.as_mut(), &natural, dest_width, dest_height);

        let reference = source_mercator(src_width, src_height, lon_offset);

        logger::debug(&format!(
            "Reprojecting {}x{} -> {}x{} ({}, scale {:.4}, offset {}°)",
            src_width,
            src_height,
            dest_width,
            dest_height,
            target.name(),
            scale,
            lon_offset
        ));

        Ok(Self {
            source,
            target,
            reference,
            factory,
            token,
            options,
            dest,
            row: 0,
            last_yield: Instant::now(),
            finished: false,
        })
    }

    /// Destination dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dest.dimensions()
    }

    pub fn total_pixels(&self) -> u64 {
        let (w, h) = self.dest.dimensions();
        w as u64 * h as u64
    }

    pub fn pixels_done(&self) -> u64 {
        self.row as u64 * self.dest.width() as u64
    }

    pub fn is_complete(&self) -> bool {
        self.row >= self.dest.height()
    }

    /// Compute one destination pixel, or leave it as background.
    fn resample_pixel(&mut self, x: u32, y: u32) {
        let here = PixelCoord::new(x as f64, y as f64);

        let Some(lonlat) = self.target.invert(here) else {
            return;
        };

        // Points in a duplicated or wrapped region don't project back onto themselves
        match self.target.forward(lonlat) {
            Some(back) if back.approx_eq(here, self.options.round_trip_tolerance) => {}
            _ => return,
        }

        let Some(src) = self.reference.forward(lonlat) else {
            return;
        };

        let src_width = self.source.width() as f64;
        let mut sx = src.x;
        if sx < 0.0 {
            sx += src_width;
        } else if sx >= src_width {
            sx -= src_width;
        }

        let pixel = resample::sample(&self.source, sx, src.y);
        self.dest.put_pixel(x, y, pixel);
    }

    fn frame(&self) -> Result<Frame<F::Surface>> {
        Ok(Frame {
            surface: self.factory.materialize(&self.dest)?,
            pixels_done: self.pixels_done(),
            total_pixels: self.total_pixels(),
        })
    }
}

impl<F: SurfaceFactory> Iterator for Reprojection<F> {
    type Item = Result<Frame<F::Surface>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let (width, height) = self.dest.dimensions();
        while self.row < height {
            for x in 0..width {
                if self.token.is_cancelled() {
                    self.finished = true;
                    return None;
                }
                self.resample_pixel(x, self.row);
            }
            self.row += 1;

            if self.row < height && self.last_yield.elapsed() >= self.options.yield_interval {
                self.last_yield = Instant::now();
                let frame = self.frame();
                if frame.is_err() {
                    self.finished = true;
                }
                return Some(frame);
            }
        }

        self.finished = true;
        Some(self.frame())
    }
}

/// Reference Mercator spanning the source image: the full 360° of longitude
/// covers the image width, centered and shifted by `lon_offset` degrees.
fn source_mercator(width: u32, height: u32, lon_offset: f64) -> Scaled<Mercator> {
    let mut reference = Scaled::new(Mercator);
    let offset_px = lon_offset * width as f64 / 360.0;
    reference.set_scale(width as f64 / TAU);
    reference.set_translate(PixelCoord::new(
        width as f64 / 2.0 + offset_px,
        height as f64 / 2.0,
    ));
    reference
}
