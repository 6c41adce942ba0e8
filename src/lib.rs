//! Reprojection of Web Mercator rasters into other map projections.
//!
//! [`manager::OperationManager`] starts and drives conversions of shared
//! images. [`reproject::Reprojection`] is the pixel engine underneath it.

pub mod bounds;
pub mod cli;
pub mod error;
pub mod logger;
pub mod manager;
pub mod math;
pub mod operation;
pub mod progress;
pub mod projection;
pub mod reproject;
pub mod resample;
pub mod surface;

pub use error::{OperationError, ReprojectError, Result};
