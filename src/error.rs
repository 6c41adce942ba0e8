use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReprojectError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid bounds for projection '{projection}': {reason}")]
    InvalidBounds { projection: String, reason: String },

    #[error("Projection '{0}' has no inverse and cannot be used as a target")]
    NonInvertible(String),

    #[error("Source image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image dimensions too large: {width}x{height} pixels (max: {max})")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("Invalid color format: {0}")]
    InvalidColor(String),

    #[error("Longitude offset must be within [-180, 180], got: {0}")]
    InvalidOffset(f64),

    #[error("Round-trip tolerance must be positive, got: {0}")]
    InvalidTolerance(f64),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

pub type Result<T> = std::result::Result<T, ReprojectError>;

/// Contract violations reported by the per-image operation manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("A reprojection is already in progress for this image")]
    AlreadyInProgress,

    #[error("Operation is not in progress (state: {0})")]
    NotInProgress(String),

    #[error("Image has no completed conversion to revert")]
    NothingToRevert,
}
