//! Configuration types for surface generation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{
    require_non_negative, require_points, require_positive, Result, SurfaceError,
};

const DEFAULT_SPECTRAL_POINTS: usize = 128;
const DEFAULT_SPECTRAL_LENGTH: f64 = 10.0;
const DEFAULT_RMS_HEIGHT: f64 = 0.001;
const DEFAULT_CORRELATION_LENGTH: f64 = 2.0;

/// Parameters of the double-sum (parametric) method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametricSpec {
    /// Summation bound N; mode indices run over -N..=N.
    pub modes: i32,
    /// Spectral exponent b. Amplitudes fall off as (m² + n²)^(-b/2).
    pub exponent: f64,
    /// Leading multiplier applied to the summed field.
    pub factor: f64,
    /// Samples per axis over [0, 1].
    pub points: usize,
}

impl Default for ParametricSpec {
    fn default() -> Self {
        Self {
            modes: 10,
            exponent: 1.8,
            factor: 0.01,
            points: 101,
        }
    }
}

impl ParametricSpec {
    pub fn new(modes: i32, exponent: f64, factor: f64, points: usize) -> Self {
        Self {
            modes,
            exponent,
            factor,
            points,
        }
    }

    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        if self.modes < 0 {
            return Err(SurfaceError::InvalidParameter(format!(
                "summation bound N must be non-negative, got {}",
                self.modes
            )));
        }
        require_positive("spectral exponent b", self.exponent)?;
        if !self.factor.is_finite() {
            return Err(SurfaceError::InvalidParameter(format!(
                "factor must be finite, got {}",
                self.factor
            )));
        }
        require_points("num_points", self.points)
    }

    /// Number of (m, n) pairs that contribute to the sum.
    pub fn retained_modes(&self) -> usize {
        let side = 2 * self.modes.max(0) as usize;
        side * side
    }
}

/// Parameters of the FFT-correlated Gaussian method.
///
/// The variant decides which normalization constant is applied, so an
/// anisotropic description whose y-values equal its x-values is still anisotropic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpectralSpec {
    Isotropic {
        #[serde(default = "default_points")]
        points: usize,
        #[serde(default = "default_length")]
        length: f64,
        #[serde(default = "default_rms_height")]
        rms_height: f64,
        #[serde(default = "default_correlation_length")]
        correlation_length: f64,
    },
    Anisotropic {
        points_x: usize,
        points_y: usize,
        length_x: f64,
        length_y: f64,
        rms_height: f64,
        correlation_length_x: f64,
        correlation_length_y: f64,
    },
}

fn default_points() -> usize {
    DEFAULT_SPECTRAL_POINTS
}

fn default_length() -> f64 {
    DEFAULT_SPECTRAL_LENGTH
}

fn default_rms_height() -> f64 {
    DEFAULT_RMS_HEIGHT
}

fn default_correlation_length() -> f64 {
    DEFAULT_CORRELATION_LENGTH
}

impl Default for SpectralSpec {
    fn default() -> Self {
        Self::isotropic(
            DEFAULT_SPECTRAL_POINTS,
            DEFAULT_SPECTRAL_LENGTH,
            DEFAULT_RMS_HEIGHT,
            DEFAULT_CORRELATION_LENGTH,
        )
    }
}

impl SpectralSpec {
    pub fn isotropic(points: usize, length: f64, rms_height: f64, correlation_length: f64) -> Self {
        Self::Isotropic {
            points,
            length,
            rms_height,
            correlation_length,
        }
    }

    pub fn anisotropic(
        points_x: usize,
        points_y: usize,
        length_x: f64,
        length_y: f64,
        rms_height: f64,
        correlation_length_x: f64,
        correlation_length_y: f64,
    ) -> Self {
        Self::Anisotropic {
            points_x,
            points_y,
            length_x,
            length_y,
            rms_height,
            correlation_length_x,
            correlation_length_y,
        }
    }

    /// Builds a description from optional y-axis parameters.
    ///
    /// The result is isotropic only when `points_y`, `length_y` and
    /// `correlation_length_y` are all omitted. Any omitted y-value otherwise
    /// falls back to its x counterpart.
    pub fn from_optional(
        points_x: usize,
        points_y: Option<usize>,
        length_x: f64,
        length_y: Option<f64>,
        rms_height: f64,
        correlation_length_x: f64,
        correlation_length_y: Option<f64>,
    ) -> Self {
        match (points_y, length_y, correlation_length_y) {
            (None, None, None) => {
                Self::isotropic(points_x, length_x, rms_height, correlation_length_x)
            }
            _ => Self::anisotropic(
                points_x,
                points_y.unwrap_or(points_x),
                length_x,
                length_y.unwrap_or(length_x),
                rms_height,
                correlation_length_x,
                correlation_length_y.unwrap_or(correlation_length_x),
            ),
        }
    }

    pub fn is_isotropic(&self) -> bool {
        matches!(self, Self::Isotropic { .. })
    }

    pub fn points_x(&self) -> usize {
        match *self {
            Self::Isotropic { points, .. } => points,
            Self::Anisotropic { points_x, .. } => points_x,
        }
    }

    pub fn points_y(&self) -> usize {
        match *self {
            Self::Isotropic { points, .. } => points,
            Self::Anisotropic { points_y, .. } => points_y,
        }
    }

    pub fn length_x(&self) -> f64 {
        match *self {
            Self::Isotropic { length, .. } => length,
            Self::Anisotropic { length_x, .. } => length_x,
        }
    }

    pub fn length_y(&self) -> f64 {
        match *self {
            Self::Isotropic { length, .. } => length,
            Self::Anisotropic { length_y, .. } => length_y,
        }
    }

    pub fn rms_height(&self) -> f64 {
        match *self {
            Self::Isotropic { rms_height, .. } | Self::Anisotropic { rms_height, .. } => rms_height,
        }
    }

    pub fn correlation_length_x(&self) -> f64 {
        match *self {
            Self::Isotropic {
                correlation_length, ..
            } => correlation_length,
            Self::Anisotropic {
                correlation_length_x,
                ..
            } => correlation_length_x,
        }
    }

    pub fn correlation_length_y(&self) -> f64 {
        match *self {
            Self::Isotropic {
                correlation_length, ..
            } => correlation_length,
            Self::Anisotropic {
                correlation_length_y,
                ..
            } => correlation_length_y,
        }
    }

    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        require_points("N_x", self.points_x())?;
        require_points("N_y", self.points_y())?;
        require_positive("rL_x", self.length_x())?;
        require_positive("rL_y", self.length_y())?;
        require_non_negative("RMS height h", self.rms_height())?;
        require_positive("clx", self.correlation_length_x())?;
        require_positive("cly", self.correlation_length_y())
    }
}

/// Which generation method a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Method {
    Parametric(ParametricSpec),
    Spectral(SpectralSpec),
}

impl Default for Method {
    fn default() -> Self {
        Self::Parametric(ParametricSpec::default())
    }
}

/// Where and how to write the STL solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StlOutput {
    pub path: PathBuf,
    #[serde(default = "default_base_thickness")]
    pub base_thickness: f64,
}

pub const DEFAULT_BASE_THICKNESS: f64 = 1.0;

fn default_base_thickness() -> f64 {
    DEFAULT_BASE_THICKNESS
}

/// Configuration for a single `surfgen` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub method: Method,

    /// Fixes the random source. Unset means a fresh entropy-seeded source.
    pub seed: Option<u64>,

    /// Optional STL export of the generated field.
    pub stl: Option<StlOutput>,

    /// Bin count for the reported height distribution.
    pub histogram_bins: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            seed: None,
            stl: None,
            histogram_bins: 50,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON run configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.method {
            Method::Parametric(spec) => spec.validate()?,
            Method::Spectral(spec) => spec.validate()?,
        }
        if let Some(stl) = &self.stl {
            require_positive("base thickness", stl.base_thickness)?;
        }
        if self.histogram_bins == 0 {
            return Err(SurfaceError::InvalidParameter(
                "histogram bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
