//! Regridder configuration loading.
//!
//! Precedence, lowest first: built-in defaults or the YAML file, then
//! `REGRID_*` environment variables, then command-line flags.

use anyhow::{Context, Result};
use tracing::info;

use regrid_core::{ErrorPolicy, RegridConfig};

use crate::Args;

/// Resolve the run configuration from file, environment and flags.
pub fn load(args: &Args) -> Result<RegridConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration file");
            RegridConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => RegridConfig::default(),
    };

    config.apply_env();
    apply_args(&mut config, args);
    Ok(config)
}

fn apply_args(config: &mut RegridConfig, args: &Args) {
    if let Some(system) = &args.system {
        config.system = Some(system.clone());
    }
    if let Some(path) = &args.path_in {
        config.path_in = path.clone();
    }
    if let Some(path) = &args.path_out {
        config.path_out = path.clone();
    }
    if let Some(t) = args.time_in {
        config.time_in = t;
    }
    if let Some(t) = args.time_out {
        config.time_out = t;
    }
    if let Some(n) = args.threads {
        config.threads = n;
    }
    if args.skip_failed {
        config.error_policy = ErrorPolicy::SkipAndContinue;
    }
    if args.parallel_variables {
        config.parallel_variables = true;
    }
}
