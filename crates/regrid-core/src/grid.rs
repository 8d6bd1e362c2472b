//! Horizontal grid descriptors.
//!
//! A [`Grid`] holds the cell-center and cell-edge coordinates of a
//! rectangular LES domain along x and y. Edges start at zero, centers are
//! shifted by half a cell.

use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};
use crate::field::FieldShape;
use crate::staggering::{Axis, FieldKind, Stagger};

/// Grid dimensions as they appear in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Domain size in x (m).
    pub xsize: f64,
    /// Domain size in y (m).
    pub ysize: f64,
    pub itot: usize,
    pub jtot: usize,
    pub ktot: usize,
}

impl GridSpec {
    pub fn build(&self) -> Result<Grid> {
        Grid::new(self.xsize, self.ysize, self.itot, self.jtot, self.ktot)
    }
}

/// Immutable horizontal grid with both coordinate variants per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: f64,
    height: f64,
    count_x: usize,
    count_y: usize,
    count_levels: usize,
    dx: f64,
    dy: f64,
    x: Vec<f64>,
    xh: Vec<f64>,
    y: Vec<f64>,
    yh: Vec<f64>,
}

impl Grid {
    /// Build a grid of `count_x * count_y` columns over a `width * height`
    /// domain with `count_levels` vertical levels.
    pub fn new(
        width: f64,
        height: f64,
        count_x: usize,
        count_y: usize,
        count_levels: usize,
    ) -> Result<Self> {
        if count_x == 0 || count_y == 0 || count_levels == 0 {
            return Err(RegridError::invalid_grid(format!(
                "point counts must be positive, got {count_x}x{count_y}x{count_levels}"
            )));
        }
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(RegridError::invalid_grid(format!(
                "domain extent must be positive, got {width}x{height}"
            )));
        }

        let dx = width / count_x as f64;
        let dy = height / count_y as f64;

        Ok(Self {
            width,
            height,
            count_x,
            count_y,
            count_levels,
            dx,
            dy,
            x: arange(dx / 2.0, dx, count_x),
            xh: arange(0.0, dx, count_x),
            y: arange(dy / 2.0, dy, count_y),
            yh: arange(0.0, dy, count_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn count_x(&self) -> usize {
        self.count_x
    }

    pub fn count_y(&self) -> usize {
        self.count_y
    }

    pub fn count_levels(&self) -> usize {
        self.count_levels
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Cell-center x coordinates.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Cell-edge x coordinates.
    pub fn xh(&self) -> &[f64] {
        &self.xh
    }

    /// Cell-center y coordinates.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Cell-edge y coordinates.
    pub fn yh(&self) -> &[f64] {
        &self.yh
    }

    /// Coordinates along `axis` for the given staggering.
    pub fn axis(&self, axis: Axis, stagger: Stagger) -> &[f64] {
        match (axis, stagger) {
            (Axis::X, Stagger::Center) => &self.x,
            (Axis::X, Stagger::Edge) => &self.xh,
            (Axis::Y, Stagger::Center) => &self.y,
            (Axis::Y, Stagger::Edge) => &self.yh,
        }
    }

    /// Shape of a field of the given kind on this grid.
    pub fn field_shape(&self, kind: FieldKind) -> FieldShape {
        match kind {
            FieldKind::ThreeD => FieldShape::three_d(self.count_levels, self.count_y, self.count_x),
            FieldKind::TwoD => FieldShape::two_d(self.count_y, self.count_x),
        }
    }
}

/// `start + i * step` for `i in 0..count`, the element formula of a
/// half-open `arange(start, size, step)`.
fn arange(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}
