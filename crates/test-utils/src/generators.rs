//! Test data generators for synthetic LES fields.
//!
//! These generators create predictable, verifiable fields in the raw
//! `(level, y, x)` row-major layout used on disk.

/// Creates a 3D field whose value encodes its own position.
///
/// Each cell value is calculated as: `i + 1000 * j + 1_000_000 * k`
///
/// After a nearest-neighbour regrid, every output value can be decoded back
/// to the source `(k, j, i)` it came from.
///
/// # Example
///
/// ```
/// use test_utils::create_analytic_field;
///
/// let fld = create_analytic_field(2, 3, 4);
/// assert_eq!(fld.len(), 24);
/// assert_eq!(fld[1], 1.0);           // k=0, j=0, i=1
/// assert_eq!(fld[4], 1000.0);        // k=0, j=1, i=0
/// assert_eq!(fld[12], 1_000_000.0);  // k=1, j=0, i=0
/// ```
pub fn create_analytic_field(levels: usize, ny: usize, nx: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(levels * ny * nx);
    for k in 0..levels {
        for j in 0..ny {
            for i in 0..nx {
                data.push(analytic_value(k, j, i));
            }
        }
    }
    data
}

/// Value stored at `(k, j, i)` by [`create_analytic_field`].
///
/// Exact in `f32` as long as the result stays below 2^24, i.e. for fewer than
/// 16 levels at 1000 x 1000 columns; tests on larger fields should stick to
/// [`create_horizontal_field`].
pub fn analytic_value(k: usize, j: usize, i: usize) -> f32 {
    (i + 1000 * j + 1_000_000 * k) as f32
}

/// Creates a 2D field with `fld[j, i] = i + 1000 * j`.
pub fn create_horizontal_field(ny: usize, nx: usize) -> Vec<f32> {
    create_analytic_field(1, ny, nx)
}

/// Creates a 3D field that repeats `fld[k, j, i] = i + 1000 * j` on every
/// level, exact in `f32` for any level count.
pub fn create_stacked_horizontal_field(levels: usize, ny: usize, nx: usize) -> Vec<f32> {
    let slab = create_horizontal_field(ny, nx);
    let mut data = Vec::with_capacity(levels * slab.len());
    for _ in 0..levels {
        data.extend_from_slice(&slab);
    }
    data
}
