//! Per-variable regridding driver.
//!
//! ```text
//! RegridConfig
//!      │
//!      ▼
//! FieldDriver::new ──► Grid (in/out) ──► RegridPlan (x/y × center/edge)
//!      │
//!      ▼
//! for each VariableSpec:
//!      read  {path_in}/{name}.{time_in:07}
//!      gather with the maps for its staggering
//!      write {path_out}/{name}.{time_out:07}
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{ErrorPolicy, RegridConfig};
use crate::error::{RegridError, Result};
use crate::field::{field_path, Field};
use crate::grid::Grid;
use crate::kernel::interpolate;
use crate::nearest::RegridPlan;
use crate::staggering::{VariableSpec, VariableTable};

/// Outcome of one successfully regridded variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableReport {
    pub variable: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub shape_in: String,
    pub shape_out: String,
    pub elapsed_ms: u64,
}

/// A variable that failed under [`ErrorPolicy::SkipAndContinue`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableFailure {
    pub variable: String,
    pub error: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub time_in: u64,
    pub time_out: u64,
    pub succeeded: Vec<VariableReport>,
    pub failed: Vec<VariableFailure>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Regrids variables between two fixed grids.
///
/// Holds only immutable state, so `regrid_variable` may be called from
/// several threads at once for different variables.
#[derive(Debug)]
pub struct FieldDriver {
    grid_in: Grid,
    grid_out: Grid,
    plan: RegridPlan,
    input_dir: PathBuf,
    output_dir: PathBuf,
    time_in: u64,
    time_out: u64,
    error_policy: ErrorPolicy,
    parallel_variables: bool,
    create_output_dir: bool,
}

impl FieldDriver {
    /// Build both grids and their index maps from a validated config.
    pub fn new(config: &RegridConfig) -> Result<Self> {
        config.validate()?;

        let grid_in = config.grid_in.build()?;
        let grid_out = config.grid_out.build()?;

        let start = Instant::now();
        let plan = RegridPlan::new(&grid_in, &grid_out)?;
        info!(
            grid_in = %format!("{}x{}x{}", grid_in.count_x(), grid_in.count_y(), grid_in.count_levels()),
            grid_out = %format!("{}x{}x{}", grid_out.count_x(), grid_out.count_y(), grid_out.count_levels()),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built regrid plan"
        );

        Ok(Self {
            grid_in,
            grid_out,
            plan,
            input_dir: config.input_dir()?,
            output_dir: config.output_dir()?,
            time_in: config.time_in,
            time_out: config.time_out,
            error_policy: config.error_policy,
            parallel_variables: config.parallel_variables,
            create_output_dir: config.create_output_dir,
        })
    }

    pub fn grid_in(&self) -> &Grid {
        &self.grid_in
    }

    pub fn grid_out(&self) -> &Grid {
        &self.grid_out
    }

    pub fn plan(&self) -> &RegridPlan {
        &self.plan
    }

    pub fn input_path(&self, variable: &str) -> PathBuf {
        field_path(&self.input_dir, variable, self.time_in)
    }

    pub fn output_path(&self, variable: &str) -> PathBuf {
        field_path(&self.output_dir, variable, self.time_out)
    }

    /// Read, regrid and write a single variable.
    pub fn regrid_variable(&self, var: &VariableSpec) -> Result<VariableReport> {
        let start = Instant::now();
        let input = self.input_path(&var.name);
        let output = self.output_path(&var.name);

        let shape = self.grid_in.field_shape(var.kind);
        let field_in = Field::read_raw(&input, shape, &var.name, self.time_in)?;

        let (nn_x, nn_y) = self.plan.maps(var.staggering);
        let field_out = interpolate(&field_in, nn_x, nn_y)?;
        debug_assert_eq!(field_out.shape(), self.grid_out.field_shape(var.kind));

        field_out.write_raw(&output)?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            variable = %var.name,
            stagger_x = %var.staggering.x,
            stagger_y = %var.staggering.y,
            shape_in = %field_in.shape(),
            shape_out = %field_out.shape(),
            elapsed_ms,
            "Regridded field"
        );

        Ok(VariableReport {
            variable: var.name.clone(),
            input,
            output,
            shape_in: field_in.shape().to_string(),
            shape_out: field_out.shape().to_string(),
            elapsed_ms,
        })
    }

    /// Regrid every variable in `table` under the configured error policy.
    pub fn run(&self, table: &VariableTable) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();

        if self.create_output_dir {
            ensure_dir(&self.output_dir)?;
        }

        info!(
            variables = table.len(),
            time_in = self.time_in,
            time_out = self.time_out,
            input_dir = %self.input_dir.display(),
            output_dir = %self.output_dir.display(),
            parallel = self.parallel_variables,
            policy = %self.error_policy,
            "Starting regrid run"
        );

        let (succeeded, failed) = match (self.error_policy, self.parallel_variables) {
            (ErrorPolicy::Abort, false) => {
                let reports = table
                    .iter()
                    .map(|var| self.regrid_or_tag(var))
                    .collect::<Result<Vec<_>>>()?;
                (reports, Vec::new())
            }
            (ErrorPolicy::Abort, true) => {
                let reports = table
                    .as_slice()
                    .par_iter()
                    .map(|var| self.regrid_or_tag(var))
                    .collect::<Result<Vec<_>>>()?;
                (reports, Vec::new())
            }
            (ErrorPolicy::SkipAndContinue, parallel) => {
                let results: Vec<_> = if parallel {
                    table
                        .as_slice()
                        .par_iter()
                        .map(|var| (var, self.regrid_variable(var)))
                        .collect()
                } else {
                    table
                        .iter()
                        .map(|var| (var, self.regrid_variable(var)))
                        .collect()
                };
                partition_results(results)
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            succeeded = succeeded.len(),
            failed = failed.len(),
            elapsed_ms,
            "Interpolations finished"
        );

        Ok(RunSummary {
            started_at,
            elapsed_ms,
            time_in: self.time_in,
            time_out: self.time_out,
            succeeded,
            failed,
        })
    }

    fn regrid_or_tag(&self, var: &VariableSpec) -> Result<VariableReport> {
        self.regrid_variable(var).map_err(|e| {
            error!(variable = %var.name, error = %e, "Regridding failed, aborting run");
            e.for_variable(&var.name)
        })
    }
}

fn partition_results(
    results: Vec<(&VariableSpec, Result<VariableReport>)>,
) -> (Vec<VariableReport>, Vec<VariableFailure>) {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for (var, result) in results {
        match result {
            Ok(report) => succeeded.push(report),
            Err(e) => {
                warn!(variable = %var.name, error = %e, "Skipping variable");
                failed.push(VariableFailure {
                    variable: var.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    (succeeded, failed)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| RegridError::io(dir, e))
}
