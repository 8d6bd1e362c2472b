//! Error types for regridding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building grids or regridding fields.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Degenerate grid or coordinate axis (zero points, non-positive extent).
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The source file does not hold exactly the number of values the
    /// configured shape requires.
    #[error(
        "field size mismatch for variable {variable} at time {timestamp}: \
         {path:?} has {actual_bytes} bytes, shape {shape} needs {expected_bytes}"
    )]
    ShapeMismatch {
        variable: String,
        timestamp: u64,
        path: PathBuf,
        shape: String,
        expected_bytes: u64,
        actual_bytes: u64,
    },

    /// An index map points outside the field it is applied to.
    #[error("index map for axis {axis} reaches index {index}, but source axis has {len} points")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    /// Reading or writing a field file failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A variable failed during a batch run.
    #[error("variable {variable} failed: {source}")]
    Variable {
        variable: String,
        #[source]
        source: Box<RegridError>,
    },
}

impl RegridError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the variable name to an error raised while processing it.
    pub fn for_variable(self, variable: impl Into<String>) -> Self {
        Self::Variable {
            variable: variable.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_yaml::Error> for RegridError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for regridding operations.
pub type Result<T> = std::result::Result<T, RegridError>;
