//! Nearest-neighbour horizontal regridding of LES restart fields.
//!
//! Takes the raw binary fields of a finished run and puts them on a
//! different horizontal grid, so a finer run can be started from a coarser
//! one. Only the horizontal axes change; the vertical levels are copied as
//! they are.
//!
//! # Architecture
//!
//! ```text
//! RegridConfig
//!      │
//!      ▼
//! FieldDriver
//!      │
//!      ├─► Grid (input, output): center + edge coordinates per axis
//!      │
//!      ├─► RegridPlan: nearest-neighbour IndexMap per (axis, stagger)
//!      │
//!      └─► per variable (VariableTable lookup for staggering)
//!               │
//!               ├─► Field::read_raw   {path_in}/{var}.{time_in:07}
//!               ├─► interpolate       out[.., j, i] = in[.., nn_y[j], nn_x[i]]
//!               └─► Field::write_raw  {path_out}/{var}.{time_out:07}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use regrid_core::{FieldDriver, RegridConfig};
//!
//! let config = RegridConfig::from_yaml_file("regrid.yaml")?;
//! let driver = FieldDriver::new(&config)?;
//! let summary = driver.run(&config.variables)?;
//! assert!(summary.is_complete());
//! # Ok::<(), regrid_core::RegridError>(())
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod grid;
pub mod kernel;
pub mod nearest;
pub mod staggering;

// Re-export commonly used types at crate root
pub use config::{ErrorPolicy, RegridConfig, SystemProfile};
pub use driver::{FieldDriver, RunSummary, VariableFailure, VariableReport};
pub use error::{RegridError, Result};
pub use field::{field_file_name, field_path, Field, FieldShape};
pub use grid::{Grid, GridSpec};
pub use kernel::{interpolate, interpolate_nn};
pub use nearest::{nearest_indices, IndexMap, RegridPlan};
pub use staggering::{Axis, FieldKind, Stagger, Staggering, VariableSpec, VariableTable};
