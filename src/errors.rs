//! Centralized error handling for airs_l3_maps
//!
//! Every failure surfaces to the caller immediately. Variants carry the
//! file, field, bounding box or site that failed so the driver can print a
//! message that names it.

use std::fmt;
use std::path::PathBuf;

/// Main error type for grid loading, extraction and rendering
#[derive(Debug)]
pub enum AirsError {
    /// NetCDF/HDF library errors (unreadable or corrupt input)
    NetCDFError(netcdf::Error),

    /// Input file could not be located
    FileNotFound { path: PathBuf, searched: Vec<PathBuf> },

    /// Requested field is absent from the file
    VariableNotFound { var: String },

    /// Field exists but is not a usable 2D grid
    InvalidShape { var: String, message: String },

    /// Coordinate and data arrays disagree in shape
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Bounding box or bin window matched zero cells
    EmptySelection { what: String },

    /// Site name not present in the site table
    UnknownSite { name: String },

    /// Rejected argument value
    InvalidArgument { message: String },

    /// I/O operation errors
    IoError(std::io::Error),

    /// Image encoding errors
    ImageError(image::ImageError),

    /// Coastline shapefile errors
    CoastlineError(String),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Generic error
    Generic(String),
}

impl fmt::Display for AirsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirsError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            AirsError::FileNotFound { path, searched } => {
                write!(f, "Input file '{}' not found", path.display())?;
                if !searched.is_empty() {
                    let tried: Vec<String> =
                        searched.iter().map(|p| p.display().to_string()).collect();
                    write!(f, " (searched: {})", tried.join(", "))?;
                }
                Ok(())
            }
            AirsError::VariableNotFound { var } => write!(f, "Field '{}' not found in file", var),
            AirsError::InvalidShape { var, message } => {
                write!(f, "Field '{}' has an unusable shape: {}", var, message)
            }
            AirsError::ShapeMismatch { expected, found } => write!(
                f,
                "Grid shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            AirsError::EmptySelection { what } => write!(f, "No data in {}", what),
            AirsError::UnknownSite { name } => write!(f, "Unknown site '{}'", name),
            AirsError::InvalidArgument { message } => write!(f, "Invalid argument: {}", message),
            AirsError::IoError(e) => write!(f, "I/O error: {}", e),
            AirsError::ImageError(e) => write!(f, "Image error: {}", e),
            AirsError::CoastlineError(msg) => write!(f, "Coastline error: {}", msg),
            AirsError::ArrayError(e) => write!(f, "Array error: {}", e),
            AirsError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AirsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AirsError::NetCDFError(e) => Some(e),
            AirsError::IoError(e) => Some(e),
            AirsError::ImageError(e) => Some(e),
            AirsError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for AirsError {
    fn from(error: netcdf::Error) -> Self {
        AirsError::NetCDFError(error)
    }
}

impl From<std::io::Error> for AirsError {
    fn from(error: std::io::Error) -> Self {
        AirsError::IoError(error)
    }
}

impl From<image::ImageError> for AirsError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(e) => AirsError::IoError(e),
            other => AirsError::ImageError(other),
        }
    }
}

impl From<shapefile::Error> for AirsError {
    fn from(error: shapefile::Error) -> Self {
        AirsError::CoastlineError(error.to_string())
    }
}

impl From<ndarray::ShapeError> for AirsError {
    fn from(error: ndarray::ShapeError) -> Self {
        AirsError::ArrayError(error)
    }
}

impl From<String> for AirsError {
    fn from(error: String) -> Self {
        AirsError::Generic(error)
    }
}

impl From<&str> for AirsError {
    fn from(error: &str) -> Self {
        AirsError::Generic(error.to_string())
    }
}

/// Result type alias for airs_l3_maps operations
pub type Result<T> = std::result::Result<T, AirsError>;
