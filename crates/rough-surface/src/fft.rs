//! Two-dimensional FFT helpers over `ndarray` matrices.
//!
//! Transforms run along rows first and then along columns. The inverse
//! transform is scaled by `1 / (rows * cols)` so that a forward/inverse pair
//! is the identity.

use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{FftDirection, FftPlanner};

use crate::errors::{Result, SurfaceError};

pub fn fft2(data: &mut Array2<Complex64>) {
    transform(data, FftDirection::Forward);
}

pub fn ifft2(data: &mut Array2<Complex64>) {
    transform(data, FftDirection::Inverse);
    let scale = 1.0 / data.len() as f64;
    data.mapv_inplace(|v| v * scale);
}

fn transform(data: &mut Array2<Complex64>, direction: FftDirection) {
    let (rows, cols) = data.dim();
    let mut planner = FftPlanner::<f64>::new();

    let row_fft = planner.plan_fft(cols, direction);
    let mut buffer = vec![Complex64::new(0.0, 0.0); cols.max(rows)];
    for mut row in data.axis_iter_mut(Axis(0)) {
        let line = &mut buffer[..cols];
        for (slot, value) in line.iter_mut().zip(row.iter()) {
            *slot = *value;
        }
        row_fft.process(line);
        for (value, slot) in row.iter_mut().zip(line.iter()) {
            *value = *slot;
        }
    }

    let col_fft = planner.plan_fft(rows, direction);
    for mut col in data.axis_iter_mut(Axis(1)) {
        let line = &mut buffer[..rows];
        for (slot, value) in line.iter_mut().zip(col.iter()) {
            *slot = *value;
        }
        col_fft.process(line);
        for (value, slot) in col.iter_mut().zip(line.iter()) {
            *value = *slot;
        }
    }
}

/// Circular convolution of two equally shaped real fields.
///
/// Returns the complex result so callers can inspect the imaginary residue.
pub fn circular_convolve(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<Complex64>> {
    if a.dim() != b.dim() {
        return Err(SurfaceError::InvalidInput(format!(
            "cannot convolve a {:?} field with a {:?} kernel",
            a.dim(),
            b.dim()
        )));
    }

    let mut fa = a.mapv(|v| Complex64::new(v, 0.0));
    let mut fb = b.mapv(|v| Complex64::new(v, 0.0));
    fft2(&mut fa);
    fft2(&mut fb);

    fa.zip_mut_with(&fb, |x, y| *x *= *y);
    ifft2(&mut fa);
    Ok(fa)
}
