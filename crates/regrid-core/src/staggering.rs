//! Variable staggering table.
//!
//! Each prognostic or surface variable lives either at cell centers or at
//! cell faces along x and y. The table below maps variable names to that
//! placement so the driver can pick matching coordinates for both grids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};

/// Horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

/// Position of a variable within a cell along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stagger {
    /// Cell center (full level in x/y).
    #[default]
    Center,
    /// Cell face, half a cell before the center.
    Edge,
}

impl fmt::Display for Stagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => write!(f, "center"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// Dimensionality of a field on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// `[y, x]`, e.g. surface fluxes and Obukhov length.
    #[serde(rename = "2d")]
    TwoD,
    /// `[level, y, x]`.
    #[serde(rename = "3d")]
    ThreeD,
}

/// Staggering along both horizontal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Staggering {
    #[serde(default)]
    pub x: Stagger,
    #[serde(default)]
    pub y: Stagger,
}

impl Staggering {
    pub const CENTER: Self = Self {
        x: Stagger::Center,
        y: Stagger::Center,
    };

    pub fn new(x: Stagger, y: Stagger) -> Self {
        Self { x, y }
    }

    pub fn along(&self, axis: Axis) -> Stagger {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// One entry of the staggering table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(flatten)]
    pub staggering: Staggering,
}

impl VariableSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, staggering: Staggering) -> Self {
        Self {
            name: name.into(),
            kind,
            staggering,
        }
    }

    /// 3D field at cell centers.
    pub fn center_3d(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::ThreeD, Staggering::CENTER)
    }

    /// 2D field at cell centers.
    pub fn center_2d(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::TwoD, Staggering::CENTER)
    }
}

/// Ordered lookup table from variable name to its staggering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableTable {
    variables: Vec<VariableSpec>,
}

impl VariableTable {
    pub fn new(variables: Vec<VariableSpec>) -> Result<Self> {
        let table = Self { variables };
        table.validate()?;
        Ok(table)
    }

    /// Restart fields of a warm-rain/ice LES run.
    ///
    /// `u` sits on x faces, `v` on y faces, the rest at cell centers. The 2D
    /// surface fields (`dudz_mo` and `dvdz_mo` included) are at full levels.
    pub fn restart_fields() -> Self {
        let mut variables = vec![
            VariableSpec::new(
                "u",
                FieldKind::ThreeD,
                Staggering::new(Stagger::Edge, Stagger::Center),
            ),
            VariableSpec::new(
                "v",
                FieldKind::ThreeD,
                Staggering::new(Stagger::Center, Stagger::Edge),
            ),
        ];
        variables.extend(
            ["w", "thl", "qt", "qr", "qs", "qg"]
                .into_iter()
                .map(VariableSpec::center_3d),
        );
        variables.extend(
            ["dbdz_mo", "dudz_mo", "dvdz_mo", "obuk", "qt_bot", "thl_bot"]
                .into_iter()
                .map(VariableSpec::center_2d),
        );
        Self { variables }
    }

    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableSpec> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn as_slice(&self) -> &[VariableSpec] {
        &self.variables
    }

    /// Restrict the table to `names`, keeping table order.
    ///
    /// Every requested name must exist in the table.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        if let Some(missing) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(RegridError::config(format!(
                "unknown variable '{missing}' (known: {})",
                self.variables
                    .iter()
                    .map(|v| v.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(Self {
            variables: self
                .variables
                .iter()
                .filter(|v| names.contains(&v.name))
                .cloned()
                .collect(),
        })
    }

    /// Names must be non-empty and unique; two writers to the same output
    /// file are not allowed.
    pub fn validate(&self) -> Result<()> {
        for (i, var) in self.variables.iter().enumerate() {
            if var.name.is_empty() {
                return Err(RegridError::config("variable name must not be empty"));
            }
            if self.variables[..i].iter().any(|v| v.name == var.name) {
                return Err(RegridError::config(format!(
                    "variable '{}' listed twice",
                    var.name
                )));
            }
        }
        Ok(())
    }
}
