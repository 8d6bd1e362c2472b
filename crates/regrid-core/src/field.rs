//! Raw binary field files.
//!
//! Fields are stored headerless as native-endian `f32`, row-major with axis
//! order `(level, y, x)` or `(y, x)`. Files are named
//! `{variable}.{timestamp:07}`. The shape is never stored, so every read is
//! checked against the byte length the caller's shape implies.

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RegridError, Result};

/// Bytes per stored value.
pub const VALUE_SIZE: usize = std::mem::size_of::<f32>();

/// Shape of a 2D or 3D field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldShape {
    /// Vertical levels, `None` for 2D fields.
    pub levels: Option<usize>,
    pub ny: usize,
    pub nx: usize,
}

impl FieldShape {
    pub fn two_d(ny: usize, nx: usize) -> Self {
        Self {
            levels: None,
            ny,
            nx,
        }
    }

    pub fn three_d(levels: usize, ny: usize, nx: usize) -> Self {
        Self {
            levels: Some(levels),
            ny,
            nx,
        }
    }

    /// Number of `(y, x)` slabs; 1 for 2D fields.
    pub fn slabs(&self) -> usize {
        self.levels.unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.slabs() * self.ny * self.nx
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> u64 {
        (self.len() * VALUE_SIZE) as u64
    }

    /// Same level structure with a new horizontal size.
    pub fn with_horizontal(&self, ny: usize, nx: usize) -> Self {
        Self {
            levels: self.levels,
            ny,
            nx,
        }
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.levels {
            Some(levels) => write!(f, "({}, {}, {})", levels, self.ny, self.nx),
            None => write!(f, "({}, {})", self.ny, self.nx),
        }
    }
}

/// A field held in memory with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    shape: FieldShape,
    data: Vec<f32>,
}

impl Field {
    /// Wrap `data`, which must hold exactly `shape.len()` values.
    pub fn new(shape: FieldShape, data: Vec<f32>) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(RegridError::config(format!(
                "field data has {} values, shape {} needs {}",
                data.len(),
                shape,
                shape.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: FieldShape) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.len()],
        }
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at `(level, j, i)`; `level` is ignored for 2D fields.
    pub fn get(&self, level: usize, j: usize, i: usize) -> Option<f32> {
        let level = if self.shape.levels.is_some() { level } else { 0 };
        if level >= self.shape.slabs() || j >= self.shape.ny || i >= self.shape.nx {
            return None;
        }
        self.data
            .get((level * self.shape.ny + j) * self.shape.nx + i)
            .copied()
    }

    /// Read a field of the given shape from `path`.
    ///
    /// `variable` and `timestamp` are only used for error context.
    pub fn read_raw(
        path: &Path,
        shape: FieldShape,
        variable: &str,
        timestamp: u64,
    ) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| RegridError::io(path, e))?;
        let actual_bytes = file
            .metadata()
            .map_err(|e| RegridError::io(path, e))?
            .len();

        if actual_bytes != shape.byte_len() {
            return Err(RegridError::ShapeMismatch {
                variable: variable.to_string(),
                timestamp,
                path: path.to_path_buf(),
                shape: shape.to_string(),
                expected_bytes: shape.byte_len(),
                actual_bytes,
            });
        }

        let mut data = vec![0.0f32; shape.len()];
        file.read_exact(bytemuck::cast_slice_mut(&mut data))
            .map_err(|e| RegridError::io(path, e))?;

        debug!(path = %path.display(), shape = %shape, "Read field");
        Ok(Self { shape, data })
    }

    /// Write the field to `path`.
    ///
    /// Data goes to a temporary file in the same directory which is then
    /// renamed over `path`, so readers never see a partial file.
    pub fn write_raw(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RegridError::io(dir, e))?;
        tmp.write_all(bytemuck::cast_slice(&self.data))
            .map_err(|e| RegridError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| RegridError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| RegridError::io(path, e.error))?;

        debug!(path = %path.display(), shape = %self.shape, "Wrote field");
        Ok(())
    }
}

/// Path of `variable` at `timestamp` inside `dir`.
pub fn field_path(dir: &Path, variable: &str, timestamp: u64) -> PathBuf {
    dir.join(field_file_name(variable, timestamp))
}

/// `{variable}.{timestamp:07}`
pub fn field_file_name(variable: &str, timestamp: u64) -> String {
    format!("{variable}.{timestamp:07}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_field_file_name() {
        assert_eq!(field_file_name("thl", 4320), "thl.0004320");
        assert_eq!(field_file_name("u", 0), "u.0000000");
        assert_eq!(field_file_name("qt_bot", 12345678), "qt_bot.12345678");
        assert_eq!(
            field_path(Path::new("test_400m"), "w", 7),
            PathBuf::from("test_400m/w.0000007")
        );
    }

    #[test]
    fn test_shape_sizes() {
        let shape = FieldShape::three_d(4, 3, 2);
        assert_eq!(shape.len(), 24);
        assert_eq!(shape.byte_len(), 96);
        assert_eq!(shape.to_string(), "(4, 3, 2)");

        let shape = FieldShape::two_d(3, 2);
        assert_eq!(shape.len(), 6);
        assert_eq!(shape.slabs(), 1);
        assert_eq!(shape.to_string(), "(3, 2)");
        assert_eq!(shape.with_horizontal(5, 7), FieldShape::two_d(5, 7));
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Field::new(FieldShape::two_d(2, 2), vec![1.0; 3]).is_err());
        assert!(Field::new(FieldShape::two_d(2, 2), vec![1.0; 4]).is_ok());
    }

    #[test]
    fn test_get_indexing() {
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let field = Field::new(FieldShape::three_d(2, 3, 4), data).unwrap();
        assert_eq!(field.get(0, 0, 0), Some(0.0));
        assert_eq!(field.get(0, 1, 2), Some(6.0));
        assert_eq!(field.get(1, 2, 3), Some(23.0));
        assert_eq!(field.get(2, 0, 0), None);
        assert_eq!(field.get(0, 3, 0), None);
    }

    #[test]
    fn test_write_then_read_matches_raw_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thl.0000000");
        let shape = FieldShape::three_d(2, 2, 3);
        let data: Vec<f32> = (0..12).map(|v| v as f32 * 0.5 - 1.0).collect();

        Field::new(shape, data.clone()).unwrap().write_raw(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[4..8], &(-0.5f32).to_ne_bytes());

        let field = Field::read_raw(&path, shape, "thl", 0).unwrap();
        assert_eq!(field.data(), data.as_slice());
    }

    #[test]
    fn test_read_shape_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("qt.0004320");
        std::fs::write(&path, vec![0u8; 40]).unwrap();

        let err = Field::read_raw(&path, FieldShape::two_d(3, 4), "qt", 4320).unwrap_err();
        match err {
            RegridError::ShapeMismatch {
                variable,
                timestamp,
                expected_bytes,
                actual_bytes,
                ..
            } => {
                assert_eq!(variable, "qt");
                assert_eq!(timestamp, 4320);
                assert_eq!(expected_bytes, 48);
                assert_eq!(actual_bytes, 40);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Field::read_raw(&dir.path().join("u.0000000"), FieldShape::two_d(1, 1), "u", 0)
            .unwrap_err();
        assert!(matches!(err, RegridError::Io { .. }));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("obuk.0000000");
        std::fs::write(&path, b"stale contents that are longer").unwrap();

        Field::zeros(FieldShape::two_d(1, 2)).write_raw(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0u8; 8]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
