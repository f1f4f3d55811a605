//! Bilinear 2D interpolation on rectangular grids.

use crate::types::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator for 2D grid data.
///
/// The grid is stored as `zs[i][j] = z(xs[i], ys[j])`: `xs` indexes rows,
/// `ys` indexes columns. Both axes must be strictly increasing with at
/// least two points.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::BilinearInterpolator;
///
/// let xs: [f64; 3] = [0.0, 1.0, 2.0];
/// let ys = [0.0, 1.0];
/// let zs = [&[0.0, 1.0][..], &[2.0, 3.0][..], &[4.0, 5.0][..]];
///
/// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
/// assert!((interp.interpolate(0.5, 0.5).unwrap() - 1.5).abs() < 1e-12);
///
/// // Beyond the grid the edge cell is extended linearly.
/// assert!((interp.extrapolate(3.0, 0.0) - 6.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct a bilinear interpolator from grid data.
    ///
    /// # Returns
    ///
    /// * `Err(InterpolationError::InsufficientData)` - Fewer than 2 points on an axis
    /// * `Err(InterpolationError::NonMonotonicData)` - An axis is not strictly increasing
    /// * `Err(InterpolationError::InvalidInput)` - Grid shape does not match the axes,
    ///   or a value is not finite
    pub fn new(xs: &[T], ys: &[T], zs: &[&[T]]) -> Result<Self, InterpolationError> {
        validate_axis(xs)?;
        validate_axis(ys)?;

        if zs.len() != xs.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "Grid rows ({}) must match x-axis length ({})",
                zs.len(),
                xs.len()
            )));
        }
        for (i, row) in zs.iter().enumerate() {
            if row.len() != ys.len() {
                return Err(InterpolationError::InvalidInput(format!(
                    "Grid row {} length ({}) must match y-axis length ({})",
                    i,
                    row.len(),
                    ys.len()
                )));
            }
            if row.iter().any(|z| !z.is_finite()) {
                return Err(InterpolationError::InvalidInput(format!(
                    "Grid row {} contains a non-finite value",
                    i
                )));
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.iter().map(|row| row.to_vec()).collect(),
        })
    }

    /// Interpolate at (x, y) inside the grid.
    ///
    /// # Returns
    ///
    /// * `Err(InterpolationError::OutOfBounds)` - If either coordinate lies outside
    ///   its axis; the error reports the offending coordinate and its axis range
    pub fn interpolate(&self, x: T, y: T) -> Result<T, InterpolationError> {
        check_bounds(x, self.domain_x())?;
        check_bounds(y, self.domain_y())?;
        Ok(self.extrapolate(x, y))
    }

    /// Evaluate the bilinear form of the cell nearest to (x, y).
    ///
    /// Inside the grid this equals [`interpolate`](Self::interpolate).
    /// Outside it, the edge cell's weights leave [0, 1] and the surface
    /// continues linearly along each axis.
    pub fn extrapolate(&self, x: T, y: T) -> T {
        let i = cell_index(&self.xs, x);
        let j = cell_index(&self.ys, y);

        let u = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        let v = (y - self.ys[j]) / (self.ys[j + 1] - self.ys[j]);

        // Nested lerps reproduce a flat cell exactly
        let lower = self.zs[i][j] + u * (self.zs[i + 1][j] - self.zs[i][j]);
        let upper = self.zs[i][j + 1] + u * (self.zs[i + 1][j + 1] - self.zs[i][j + 1]);
        lower + v * (upper - lower)
    }

    /// Return the valid interpolation domain for x.
    #[inline]
    pub fn domain_x(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Return the valid interpolation domain for y.
    #[inline]
    pub fn domain_y(&self) -> (T, T) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }

    /// Returns the x-axis coordinates.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Returns the y-axis coordinates.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Returns the grid values.
    #[inline]
    pub fn zs(&self) -> &[Vec<T>] {
        &self.zs
    }
}

fn validate_axis<T: Float>(axis: &[T]) -> Result<(), InterpolationError> {
    if axis.len() < 2 {
        return Err(InterpolationError::InsufficientData {
            got: axis.len(),
            need: 2,
        });
    }
    if axis.iter().any(|x| !x.is_finite()) {
        return Err(InterpolationError::InvalidInput(
            "Axis contains a non-finite value".to_string(),
        ));
    }
    match axis.windows(2).position(|w| w[1] <= w[0]) {
        Some(index) => Err(InterpolationError::NonMonotonicData { index: index + 1 }),
        None => Ok(()),
    }
}

fn check_bounds<T: Float>(x: T, (min, max): (T, T)) -> Result<(), InterpolationError> {
    if x < min || x > max || x.is_nan() {
        return Err(InterpolationError::OutOfBounds {
            x: x.to_f64().unwrap_or(f64::NAN),
            min: min.to_f64().unwrap_or(f64::NAN),
            max: max.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

/// Lower index of the cell containing `x`, clamped to the first/last cell.
#[inline]
fn cell_index<T: Float>(axis: &[T], x: T) -> usize {
    let pos = axis.partition_point(|&xi| xi <= x);
    pos.saturating_sub(1).min(axis.len() - 2)
}
