//! Configuration for a regridding run.
//!
//! A run is fully described by [`RegridConfig`]: the two grids, where fields
//! are read from and written to, the timestamps, the variable table and the
//! failure policy. Configs are loaded from YAML and then overridden from the
//! environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RegridError, Result};
use crate::grid::GridSpec;
use crate::staggering::VariableTable;

/// Configuration for one regridding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegridConfig {
    /// Grid the source fields live on.
    pub grid_in: GridSpec,

    /// Grid to write the fields on.
    pub grid_out: GridSpec,

    /// Directory holding the source fields.
    pub path_in: PathBuf,

    /// Directory receiving the regridded fields.
    pub path_out: PathBuf,

    /// Timestamp of the source files (already scaled by the I/O time precision).
    pub time_in: u64,

    /// Timestamp given to the output files.
    pub time_out: u64,

    /// Name of a built-in system profile; relative paths resolve against its
    /// work directory.
    #[serde(default)]
    pub system: Option<String>,

    /// What to do when a variable fails.
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Regrid independent variables concurrently.
    #[serde(default)]
    pub parallel_variables: bool,

    /// Worker threads for the rayon pool (0 = rayon default).
    #[serde(default)]
    pub threads: usize,

    /// Create `path_out` if it does not exist.
    #[serde(default = "default_true")]
    pub create_output_dir: bool,

    /// Variables to regrid and their staggering.
    #[serde(default = "VariableTable::restart_fields")]
    pub variables: VariableTable,
}

fn default_true() -> bool {
    true
}

impl Default for RegridConfig {
    /// 400 m to 200 m refinement of a 25.6 km test domain.
    fn default() -> Self {
        Self {
            grid_in: GridSpec {
                xsize: 25_600.0,
                ysize: 25_600.0,
                itot: 64,
                jtot: 64,
                ktot: 128,
            },
            grid_out: GridSpec {
                xsize: 25_600.0,
                ysize: 25_600.0,
                itot: 128,
                jtot: 128,
                ktot: 128,
            },
            path_in: PathBuf::from("test_400m"),
            path_out: PathBuf::from("test_200m"),
            time_in: 4320,
            time_out: 0,
            system: None,
            error_policy: ErrorPolicy::Abort,
            parallel_variables: false,
            threads: 0,
            create_output_dir: true,
            variables: VariableTable::restart_fields(),
        }
    }
}

impl RegridConfig {
    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| RegridError::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Override fields from `REGRID_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("REGRID_PATH_IN") {
            self.path_in = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("REGRID_PATH_OUT") {
            self.path_out = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("REGRID_TIME_IN") {
            match val.parse() {
                Ok(t) => self.time_in = t,
                Err(_) => warn!(value = %val, "Ignoring invalid REGRID_TIME_IN"),
            }
        }

        if let Ok(val) = std::env::var("REGRID_TIME_OUT") {
            match val.parse() {
                Ok(t) => self.time_out = t,
                Err(_) => warn!(value = %val, "Ignoring invalid REGRID_TIME_OUT"),
            }
        }

        if let Ok(val) = std::env::var("REGRID_SYSTEM") {
            self.system = Some(val);
        }

        if let Ok(val) = std::env::var("REGRID_ERROR_POLICY") {
            match ErrorPolicy::from_str(&val) {
                Some(policy) => self.error_policy = policy,
                None => warn!(value = %val, "Ignoring invalid REGRID_ERROR_POLICY"),
            }
        }

        if let Ok(val) = std::env::var("REGRID_PARALLEL_VARIABLES") {
            self.parallel_variables = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("REGRID_THREADS") {
            match val.parse() {
                Ok(n) => self.threads = n,
                Err(_) => warn!(value = %val, "Ignoring invalid REGRID_THREADS"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let grid_in = self.grid_in.build()?;
        let grid_out = self.grid_out.build()?;

        if grid_in.count_levels() != grid_out.count_levels() {
            return Err(RegridError::config(format!(
                "vertical levels differ ({} in, {} out); only horizontal regridding is supported",
                grid_in.count_levels(),
                grid_out.count_levels()
            )));
        }

        if self.variables.is_empty() {
            return Err(RegridError::config("no variables to regrid"));
        }
        self.variables.validate()?;

        self.profile()?;

        if self.input_dir()? == self.output_dir()? && self.time_in == self.time_out {
            return Err(RegridError::config(format!(
                "input and output resolve to the same files ({:?}, time {})",
                self.input_dir()?,
                self.time_in
            )));
        }

        Ok(())
    }

    /// The selected system profile, if any.
    pub fn profile(&self) -> Result<Option<SystemProfile>> {
        match &self.system {
            None => Ok(None),
            Some(name) => SystemProfile::builtin(name).map(Some).ok_or_else(|| {
                RegridError::config(format!(
                    "unknown system '{name}' (known: {})",
                    SystemProfile::NAMES.join(", ")
                ))
            }),
        }
    }

    pub fn input_dir(&self) -> Result<PathBuf> {
        self.resolve_dir(&self.path_in)
    }

    pub fn output_dir(&self) -> Result<PathBuf> {
        self.resolve_dir(&self.path_out)
    }

    fn resolve_dir(&self, dir: &Path) -> Result<PathBuf> {
        Ok(match self.profile()? {
            Some(profile) if dir.is_relative() => profile.work_dir.join(dir),
            _ => dir.to_path_buf(),
        })
    }
}

/// Policy for a variable that fails to regrid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the batch at the first failure.
    #[default]
    Abort,
    /// Record the failure and carry on with the remaining variables.
    SkipAndContinue,
}

impl ErrorPolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "abort" => Some(Self::Abort),
            "skip" | "skip_and_continue" | "continue" => Some(Self::SkipAndContinue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::SkipAndContinue => "skip_and_continue",
        }
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// System profiles
// ============================================================================

/// A deployment environment: where the model and its data live, and which
/// scheduler project/partition jobs go to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemProfile {
    pub name: String,
    pub project: Option<String>,
    pub partition: Option<String>,
    /// Radiation gas-optics coefficient directory.
    pub gpt_path: PathBuf,
    pub model_path: PathBuf,
    pub model_bin: PathBuf,
    pub work_dir: PathBuf,
}

impl SystemProfile {
    pub const NAMES: [&'static str; 4] = ["eddy", "snellius", "ecmwf", "lumi"];

    /// Look up a built-in profile by name (case-insensitive).
    pub fn builtin(name: &str) -> Option<Self> {
        let profile = match name.to_lowercase().as_str() {
            "eddy" => Self::new(
                "eddy",
                None,
                None,
                "/home/bart/meteo/models/coefficients_veerman/",
                "/home/bart/meteo/models/microhh/",
                "/home/bart/meteo/models/microhh/build_sp_cpumpi/microhh",
                "test",
            ),
            "snellius" => Self::new(
                "snellius",
                None,
                Some("rome"),
                "/gpfs/work3/0/lesmodels/team_bart/coefficients_veerman",
                "/home/bstratum/meteo/models/microhh",
                "/home/bstratum/meteo/models/microhh/build_sp_cpumpi/microhh",
                "/scratch-shared/bstratum/mock_walker_test",
            ),
            "ecmwf" => Self::new(
                "ecmwf",
                None,
                Some("par"),
                "/home/nkbs/meteo/models/coefficients_veerman",
                "/home/nkbs/meteo/models/microhh",
                "/home/nkbs/meteo/models/microhh/build_sp_dpfft_cpumpi/microhh",
                "/scratch/nkbs/mock_walker_xl_400m",
            ),
            "lumi" => Self::new(
                "lumi",
                Some("project_465002576"),
                Some("small"),
                "/users/stratumv/meteo/models/coefficients_veerman",
                "/users/stratumv/meteo/models/microhh",
                "/users/stratumv/meteo/models/microhh/build_spdp_cpumpi/microhh",
                "/scratch/project_465002576/mock_walker_io",
            ),
            _ => return None,
        };
        Some(profile)
    }

    fn new(
        name: &str,
        project: Option<&str>,
        partition: Option<&str>,
        gpt_path: &str,
        model_path: &str,
        model_bin: &str,
        work_dir: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            project: project.map(str::to_string),
            partition: partition.map(str::to_string),
            gpt_path: PathBuf::from(gpt_path),
            model_path: PathBuf::from(model_path),
            model_bin: PathBuf::from(model_bin),
            work_dir: PathBuf::from(work_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegridConfig::default();
        assert_eq!(config.grid_in.itot, 64);
        assert_eq!(config.grid_out.itot, 128);
        assert_eq!(config.time_in, 4320);
        assert_eq!(config.time_out, 0);
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert!(!config.parallel_variables);
        assert_eq!(config.variables.len(), 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RegridConfig::default();
        config.grid_out.ktot = 64;
        assert!(config.validate().is_err());

        config = RegridConfig::default();
        config.grid_in.itot = 0;
        assert!(matches!(config.validate(), Err(RegridError::InvalidGrid(_))));

        config = RegridConfig::default();
        config.path_out = config.path_in.clone();
        config.time_out = config.time_in;
        assert!(config.validate().is_err());

        config = RegridConfig::default();
        config.system = Some("cray".to_string());
        assert!(config.validate().is_err());

        config = RegridConfig::default();
        config.variables = VariableTable::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_minimal_uses_defaults() {
        let yaml = r#"
grid_in: { xsize: 25600, ysize: 25600, itot: 64, jtot: 64, ktot: 128 }
grid_out: { xsize: 25600, ysize: 25600, itot: 128, jtot: 128, ktot: 128 }
path_in: test_400m
path_out: test_200m
time_in: 4320
time_out: 0
"#;
        let config = RegridConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.grid_in.xsize, 25_600.0);
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert!(config.create_output_dir);
        assert_eq!(config.variables, VariableTable::restart_fields());
    }

    #[test]
    fn test_yaml_full() {
        let yaml = r#"
grid_in: { xsize: 6144000, ysize: 409600, itot: 15360, jtot: 1024, ktot: 128 }
grid_out: { xsize: 6144000, ysize: 409600, itot: 30720, jtot: 2048, ktot: 128 }
path_in: run_400m
path_out: run_200m
time_in: 4320
time_out: 0
system: lumi
error_policy: skip_and_continue
parallel_variables: true
threads: 16
variables:
  - name: u
    kind: 3d
    x: edge
  - name: thl_bot
    kind: 2d
"#;
        let config = RegridConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::SkipAndContinue);
        assert!(config.parallel_variables);
        assert_eq!(config.threads, 16);
        assert_eq!(config.variables.len(), 2);
        assert_eq!(
            config.input_dir().unwrap(),
            PathBuf::from("/scratch/project_465002576/mock_walker_io/run_400m")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absolute_paths_ignore_work_dir() {
        let config = RegridConfig {
            system: Some("snellius".to_string()),
            path_in: PathBuf::from("/data/in"),
            ..RegridConfig::default()
        };
        assert_eq!(config.input_dir().unwrap(), PathBuf::from("/data/in"));
        assert_eq!(
            config.output_dir().unwrap(),
            PathBuf::from("/scratch-shared/bstratum/mock_walker_test/test_200m")
        );
    }

    #[test]
    fn test_system_profiles() {
        for name in SystemProfile::NAMES {
            let profile = SystemProfile::builtin(name).unwrap();
            assert_eq!(profile.name, name);
        }
        let lumi = SystemProfile::builtin("LUMI").unwrap();
        assert_eq!(lumi.project.as_deref(), Some("project_465002576"));
        assert_eq!(lumi.partition.as_deref(), Some("small"));
        assert!(SystemProfile::builtin("eddy").unwrap().partition.is_none());
        assert!(SystemProfile::builtin("unknown").is_none());
    }

    #[test]
    fn test_error_policy_from_str() {
        assert_eq!(ErrorPolicy::from_str("abort"), Some(ErrorPolicy::Abort));
        assert_eq!(ErrorPolicy::from_str("SKIP"), Some(ErrorPolicy::SkipAndContinue));
        assert_eq!(
            ErrorPolicy::from_str("skip_and_continue"),
            Some(ErrorPolicy::SkipAndContinue)
        );
        assert_eq!(ErrorPolicy::from_str("retry"), None);
    }

    const ENV_VARS: [&str; 8] = [
        "REGRID_PATH_IN",
        "REGRID_PATH_OUT",
        "REGRID_TIME_IN",
        "REGRID_TIME_OUT",
        "REGRID_SYSTEM",
        "REGRID_ERROR_POLICY",
        "REGRID_PARALLEL_VARIABLES",
        "REGRID_THREADS",
    ];

    // Single test so no other test in this binary sees the REGRID_* vars.
    #[test]
    fn test_apply_env_overrides() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }

        let mut config = RegridConfig::default();
        config.apply_env();
        assert_eq!(config.path_in, PathBuf::from("test_400m"));
        assert_eq!(config.time_in, 4320);
        assert!(config.system.is_none());

        std::env::set_var("REGRID_PATH_IN", "/data/run_400m");
        std::env::set_var("REGRID_PATH_OUT", "/data/run_200m");
        std::env::set_var("REGRID_TIME_IN", "7200");
        std::env::set_var("REGRID_TIME_OUT", "60");
        std::env::set_var("REGRID_SYSTEM", "lumi");
        std::env::set_var("REGRID_ERROR_POLICY", "skip");
        std::env::set_var("REGRID_PARALLEL_VARIABLES", "TRUE");
        std::env::set_var("REGRID_THREADS", "12");

        let mut config = RegridConfig::default();
        config.apply_env();
        assert_eq!(config.path_in, PathBuf::from("/data/run_400m"));
        assert_eq!(config.path_out, PathBuf::from("/data/run_200m"));
        assert_eq!(config.time_in, 7200);
        assert_eq!(config.time_out, 60);
        assert_eq!(config.system.as_deref(), Some("lumi"));
        assert_eq!(config.error_policy, ErrorPolicy::SkipAndContinue);
        assert!(config.parallel_variables);
        assert_eq!(config.threads, 12);

        std::env::set_var("REGRID_PARALLEL_VARIABLES", "1");
        let mut config = RegridConfig::default();
        config.apply_env();
        assert!(config.parallel_variables);

        std::env::set_var("REGRID_PARALLEL_VARIABLES", "yes");
        let mut config = RegridConfig {
            parallel_variables: true,
            ..RegridConfig::default()
        };
        config.apply_env();
        assert!(!config.parallel_variables);

        // Unparsable values leave the previous setting in place.
        std::env::set_var("REGRID_TIME_IN", "-1");
        std::env::set_var("REGRID_TIME_OUT", "soon");
        std::env::set_var("REGRID_ERROR_POLICY", "retry");
        std::env::set_var("REGRID_THREADS", "many");
        let mut config = RegridConfig {
            error_policy: ErrorPolicy::Abort,
            threads: 4,
            ..RegridConfig::default()
        };
        config.apply_env();
        assert_eq!(config.time_in, 4320);
        assert_eq!(config.time_out, 0);
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert_eq!(config.threads, 4);
        assert_eq!(config.path_in, PathBuf::from("/data/run_400m"));

        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }
}
