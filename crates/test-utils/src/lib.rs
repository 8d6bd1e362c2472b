//! Shared test utilities for the regrid workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Analytic field generators
//! - Raw field files on disk in scratch directories
//! - Grid fixtures for typical refinement cases
//! - Bit-exact field assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, create_analytic_field, write_field_file};
//! ```

pub mod files;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use files::*;
pub use generators::*;

/// Macro asserting two `f32` slices are identical bit for bit.
///
/// Reports the first differing flat index, which is easier to map back to
/// `(level, j, i)` than a full slice dump.
#[macro_export]
macro_rules! assert_fields_identical {
    ($left:expr, $right:expr) => {{
        let left: &[f32] = $left;
        let right: &[f32] = $right;
        assert_eq!(left.len(), right.len(), "field lengths differ");
        if let Some(idx) = left
            .iter()
            .zip(right.iter())
            .position(|(a, b)| a.to_bits() != b.to_bits())
        {
            panic!(
                "fields differ at flat index {}: left `{:?}`, right `{:?}`",
                idx, left[idx], right[idx]
            );
        }
    }};
}
