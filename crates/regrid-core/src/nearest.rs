//! Nearest-neighbour index maps.
//!
//! An [`IndexMap`] stores, for every point of a target axis, the index of
//! the closest point on a source axis. Maps depend only on coordinates, so a
//! [`RegridPlan`] builds them once per (axis, staggering) pair and every
//! field with that staggering reuses them.

use std::ops::Deref;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{RegridError, Result};
use crate::grid::Grid;
use crate::staggering::{Axis, Stagger, Staggering};

/// Source index for each target point along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    indices: Vec<usize>,
    source_len: usize,
}

impl IndexMap {
    /// Length of the source axis the indices point into.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Identity map over an axis of `len` points.
    pub fn identity(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
            source_len: len,
        }
    }
}

impl Deref for IndexMap {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.indices
    }
}

/// Index of the source coordinate closest to `target`.
///
/// Scans in index order and only moves on a strictly smaller distance, so an
/// exact tie resolves to the lower index.
#[inline]
fn argmin_distance(source: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (j, &s) in source.iter().enumerate() {
        let dist = (s - target).abs();
        if dist < best_dist {
            best = j;
            best_dist = dist;
        }
    }
    best
}

/// Nearest-neighbour indices of `target` points into `source`.
///
/// `I[k] = argmin_j |source[j] - target[k]|`, lowest `j` on ties. Axes do
/// not need to be sorted. Both axes must be non-empty.
pub fn nearest_indices(source: &[f64], target: &[f64]) -> Result<IndexMap> {
    if source.is_empty() {
        return Err(RegridError::invalid_grid("source coordinate axis is empty"));
    }
    if target.is_empty() {
        return Err(RegridError::invalid_grid("target coordinate axis is empty"));
    }

    let indices = target
        .par_iter()
        .map(|&t| argmin_distance(source, t))
        .collect();

    Ok(IndexMap {
        indices,
        source_len: source.len(),
    })
}

/// Index maps between one input and one output grid, for every axis and
/// staggering.
#[derive(Debug, Clone)]
pub struct RegridPlan {
    x_center: IndexMap,
    x_edge: IndexMap,
    y_center: IndexMap,
    y_edge: IndexMap,
}

impl RegridPlan {
    /// Build all four maps (x/y, center/edge) from `grid_in` to `grid_out`.
    pub fn new(grid_in: &Grid, grid_out: &Grid) -> Result<Self> {
        let build = |axis: Axis, stagger: Stagger| -> Result<IndexMap> {
            let map = nearest_indices(grid_in.axis(axis, stagger), grid_out.axis(axis, stagger))?;
            debug!(
                axis = axis.as_str(),
                stagger = %stagger,
                source_len = map.source_len(),
                target_len = map.len(),
                "Built nearest-neighbour index map"
            );
            Ok(map)
        };

        Ok(Self {
            x_center: build(Axis::X, Stagger::Center)?,
            x_edge: build(Axis::X, Stagger::Edge)?,
            y_center: build(Axis::Y, Stagger::Center)?,
            y_edge: build(Axis::Y, Stagger::Edge)?,
        })
    }

    /// Map for one axis and staggering.
    pub fn map(&self, axis: Axis, stagger: Stagger) -> &IndexMap {
        match (axis, stagger) {
            (Axis::X, Stagger::Center) => &self.x_center,
            (Axis::X, Stagger::Edge) => &self.x_edge,
            (Axis::Y, Stagger::Center) => &self.y_center,
            (Axis::Y, Stagger::Edge) => &self.y_edge,
        }
    }

    /// `(I_x, I_y)` for a variable with the given staggering.
    pub fn maps(&self, staggering: Staggering) -> (&IndexMap, &IndexMap) {
        (
            self.map(Axis::X, staggering.along(Axis::X)),
            self.map(Axis::Y, staggering.along(Axis::Y)),
        )
    }
}
