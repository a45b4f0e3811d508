//! Height-field statistics used for reporting.

use ndarray::Axis;
use serde::Serialize;

use crate::errors::{Result, SurfaceError};
use crate::grid::HeightField;

/// Default bin count for [`height_histogram`].
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Summary statistics of a height field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SurfaceStats {
    pub mean: f64,
    /// RMS height about the mean line (Rq).
    pub rms: f64,
    /// RMS of the raw heights, without removing the mean.
    pub rms_about_zero: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_valley: f64,
    /// Third standardized moment; zero for a flat field.
    pub skewness: f64,
    /// Fourth standardized moment (3 for a Gaussian); zero for a flat field.
    pub kurtosis: f64,
}

impl SurfaceStats {
    pub fn from_heights(heights: &HeightField) -> Self {
        let n = heights.len();
        if n == 0 {
            return Self::default();
        }
        let count = n as f64;

        let mean = heights.sum() / count;
        let (mut m2, mut m3, mut m4, mut sq) = (0.0, 0.0, 0.0, 0.0);
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &h in heights {
            let d = h - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
            sq += h * h;
            min = min.min(h);
            max = max.max(h);
        }
        m2 /= count;
        m3 /= count;
        m4 /= count;

        let (skewness, kurtosis) = if m2 > 0.0 {
            (m3 / m2.powf(1.5), m4 / (m2 * m2))
        } else {
            (0.0, 0.0)
        };

        Self {
            mean,
            rms: m2.sqrt(),
            rms_about_zero: (sq / count).sqrt(),
            min,
            max,
            peak_to_valley: max - min,
            skewness,
            kurtosis,
        }
    }
}

/// Density-normalized height distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` monotonically increasing bin edges.
    pub edges: Vec<f64>,
    /// Probability density per bin; integrates to one over the edges.
    pub density: Vec<f64>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) if !self.density.is_empty() => {
                (last - first) / self.density.len() as f64
            }
            _ => 0.0,
        }
    }
}

/// Bins the heights into `bins` equal-width bins spanning their range.
///
/// A constant field is binned over `[h - 0.5, h + 0.5]`.
pub fn height_histogram(heights: &HeightField, bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(SurfaceError::InvalidParameter(
            "histogram needs at least one bin".to_string(),
        ));
    }
    if heights.is_empty() {
        return Err(SurfaceError::InvalidInput(
            "cannot histogram an empty height field".to_string(),
        ));
    }

    let stats = SurfaceStats::from_heights(heights);
    let (lo, hi) = if stats.peak_to_valley > 0.0 {
        (stats.min, stats.max)
    } else {
        (stats.min - 0.5, stats.max + 0.5)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &h in heights {
        // the top edge belongs to the last bin
        let idx = (((h - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let norm = heights.len() as f64 * width;
    Ok(Histogram {
        edges: (0..=bins).map(|i| lo + width * i as f64).collect(),
        density: counts.into_iter().map(|c| c as f64 / norm).collect(),
    })
}

/// Direction along which [`correlation_length`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Along rows (x varies).
    X,
    /// Along columns (y varies).
    Y,
}

/// Estimates the correlation length along `direction`.
///
/// Every line is mean-subtracted and autocorrelated. The correlations are
/// averaged over all lines and normalized to one at lag zero. The result is
/// the first lag at which this drops below `1/e`, linearly interpolated and
/// multiplied by `spacing`. Returns `None` for a flat field or when the drop
/// does not happen within half the line length.
pub fn correlation_length(heights: &HeightField, spacing: f64, direction: Direction) -> Option<f64> {
    let axis = match direction {
        Direction::X => Axis(1),
        Direction::Y => Axis(0),
    };
    let len = heights.len_of(axis);
    let max_lag = len / 2;
    if max_lag < 1 {
        return None;
    }

    let mut acf = vec![0.0; max_lag + 1];
    let mut line = Vec::with_capacity(len);
    for lane in heights.lanes(axis) {
        let mean = lane.sum() / len as f64;
        line.clear();
        line.extend(lane.iter().map(|h| h - mean));
        for (lag, slot) in acf.iter_mut().enumerate() {
            *slot += line.iter().zip(&line[lag..]).map(|(a, b)| a * b).sum::<f64>();
        }
    }

    let zero = acf[0];
    if zero <= 0.0 {
        return None;
    }
    let threshold = (-1.0f64).exp();
    let normalized: Vec<f64> = acf.iter().map(|v| v / zero).collect();

    normalized.windows(2).enumerate().find_map(|(lag, pair)| {
        let (prev, next) = (pair[0], pair[1]);
        (next < threshold).then(|| {
            let frac = (prev - threshold) / (prev - next);
            (lag as f64 + frac) * spacing
        })
    })
}
