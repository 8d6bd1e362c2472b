//! Raw field files in scratch directories.
//!
//! Writes and reads headerless native-endian `f32` files named
//! `{variable}.{timestamp:07}` without going through the crate under test.

use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes `data` as `{dir}/{variable}.{timestamp:07}`, creating `dir`.
///
/// # Returns
///
/// The path of the written file.
pub fn write_field_file(dir: &Path, variable: &str, timestamp: u64, data: &[f32]) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create field directory");
    let path = dir.join(format!("{variable}.{timestamp:07}"));
    let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_ne_bytes()).collect();
    std::fs::write(&path, bytes).expect("Failed to write field file");
    path
}

/// Reads a raw `f32` file written by the regridder.
pub fn read_field_file(path: &Path) -> Vec<f32> {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("Failed to read field file {:?}: {}", path, e));
    assert_eq!(
        bytes.len() % 4,
        0,
        "field file {:?} is not a whole number of f32 values",
        path
    );
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_test_dir() {
        let dir = temp_test_dir();
        assert!(dir.path().exists());
        // Dir is cleaned up when dropped
    }

    #[test]
    fn test_field_file_roundtrip() {
        let dir = temp_test_dir();
        let data = vec![1.5f32, -2.0, 3.25];
        let path = write_field_file(&dir.path().join("test_400m"), "thl", 4320, &data);
        assert!(path.ends_with("test_400m/thl.0004320"));
        assert_eq!(read_field_file(&path), data);
    }
}
