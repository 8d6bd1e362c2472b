//! Nearest-neighbour gather kernel.
//!
//! `out[.., j, i] = in[.., nn_y[j], nn_x[i]]`. Every output row reads one
//! input row, so rows are split across the rayon pool with no shared
//! mutable state. The vertical axis is passed through unchanged.

use rayon::prelude::*;

use crate::error::{RegridError, Result};
use crate::field::Field;
use crate::nearest::{nearest_indices, IndexMap};

/// Gather `field` onto the output points described by `nn_x` and `nn_y`.
///
/// The output has `nn_y.len()` rows of `nn_x.len()` values per level, with
/// the same number of levels as the input.
pub fn interpolate(field: &Field, nn_x: &IndexMap, nn_y: &IndexMap) -> Result<Field> {
    let shape_in = field.shape();
    check_in_range("x", nn_x, shape_in.nx)?;
    check_in_range("y", nn_y, shape_in.ny)?;

    let shape_out = shape_in.with_horizontal(nn_y.len(), nn_x.len());
    let mut out = vec![0.0f32; shape_out.len()];

    if shape_out.is_empty() {
        return Field::new(shape_out, out);
    }

    let data_in = field.data();
    let (nx_in, ny_in) = (shape_in.nx, shape_in.ny);
    let (nx_out, ny_out) = (shape_out.nx, shape_out.ny);

    out.par_chunks_mut(nx_out)
        .enumerate()
        .for_each(|(row, out_row)| {
            let level = row / ny_out;
            let j = row % ny_out;
            let src_start = (level * ny_in + nn_y[j]) * nx_in;
            let src_row = &data_in[src_start..src_start + nx_in];
            for (dst, &i) in out_row.iter_mut().zip(nn_x.iter()) {
                *dst = src_row[i];
            }
        });

    Field::new(shape_out, out)
}

/// Build index maps from the given coordinates and gather in one call.
///
/// Recomputes both maps; use a [`crate::RegridPlan`] when regridding many
/// fields between the same grids.
pub fn interpolate_nn(
    field: &Field,
    x_in: &[f64],
    y_in: &[f64],
    x_out: &[f64],
    y_out: &[f64],
) -> Result<Field> {
    let nn_x = nearest_indices(x_in, x_out)?;
    let nn_y = nearest_indices(y_in, y_out)?;
    interpolate(field, &nn_x, &nn_y)
}

fn check_in_range(axis: &'static str, map: &IndexMap, len: usize) -> Result<()> {
    match map.iter().copied().find(|&i| i >= len) {
        Some(index) => Err(RegridError::IndexOutOfRange { axis, index, len }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldShape;
    use crate::grid::Grid;

    fn indices(source_len: usize, idx: &[usize]) -> IndexMap {
        let source: Vec<f64> = (0..source_len).map(|i| i as f64).collect();
        let target: Vec<f64> = idx.iter().map(|&i| i as f64).collect();
        nearest_indices(&source, &target).unwrap()
    }

    #[test]
    fn test_interpolate_2d_gather() {
        #[rustfmt::skip]
        let data = vec![
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
        ];
        let field = Field::new(FieldShape::two_d(2, 3), data).unwrap();
        let nn_x = indices(3, &[2, 0, 0, 1]);
        let nn_y = indices(2, &[1, 1, 0]);

        let out = interpolate(&field, &nn_x, &nn_y).unwrap();
        assert_eq!(out.shape(), FieldShape::two_d(3, 4));
        #[rustfmt::skip]
        let expected: [f32; 12] = [
            6.0, 4.0, 4.0, 5.0,
            6.0, 4.0, 4.0, 5.0,
            3.0, 1.0, 1.0, 2.0,
        ];
        assert_eq!(out.data(), &expected);
    }

    #[test]
    fn test_interpolate_3d_keeps_levels() {
        let shape = FieldShape::three_d(3, 2, 2);
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let field = Field::new(shape, data).unwrap();
        let nn_x = indices(2, &[1, 1, 0]);
        let nn_y = indices(2, &[0]);

        let out = interpolate(&field, &nn_x, &nn_y).unwrap();
        assert_eq!(out.shape(), FieldShape::three_d(3, 1, 3));
        assert_eq!(out.data(), &[1.0, 1.0, 0.0, 5.0, 5.0, 4.0, 9.0, 9.0, 8.0]);
    }

    #[test]
    fn test_identity_regrid_is_unchanged() {
        let grid = Grid::new(6_400.0, 3_200.0, 16, 8, 5).unwrap();
        let shape = FieldShape::three_d(5, 8, 16);
        let data: Vec<f32> = (0..shape.len()).map(|v| (v as f32).sin()).collect();
        let field = Field::new(shape, data).unwrap();

        for (x, y) in [(grid.x(), grid.y()), (grid.xh(), grid.yh())] {
            let out = interpolate_nn(&field, x, y, x, y).unwrap();
            assert_eq!(out, field);
        }
    }

    #[test]
    fn test_shape_law() {
        let field = Field::zeros(FieldShape::three_d(7, 4, 5));
        let nn_x = indices(5, &[0; 11]);
        let nn_y = indices(4, &[3; 9]);
        let out = interpolate(&field, &nn_x, &nn_y).unwrap();
        assert_eq!(out.shape(), FieldShape::three_d(7, 9, 11));
        assert_eq!(out.data().len(), 7 * 9 * 11);

        let field = Field::zeros(FieldShape::two_d(4, 5));
        let out = interpolate(&field, &nn_x, &nn_y).unwrap();
        assert_eq!(out.shape(), FieldShape::two_d(9, 11));
    }

    #[test]
    fn test_out_of_range_map_rejected() {
        let field = Field::zeros(FieldShape::two_d(2, 2));
        let nn_x = indices(4, &[3]);
        let nn_y = indices(2, &[0]);
        let err = interpolate(&field, &nn_x, &nn_y).unwrap_err();
        assert!(matches!(
            err,
            RegridError::IndexOutOfRange {
                axis: "x",
                index: 3,
                len: 2
            }
        ));
    }
}
