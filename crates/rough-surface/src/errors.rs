use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Fails with [`SurfaceError::InvalidParameter`] unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SurfaceError::InvalidParameter(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SurfaceError::InvalidParameter(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}

pub(crate) fn require_points(name: &str, points: usize) -> Result<()> {
    if points >= 2 {
        Ok(())
    } else {
        Err(SurfaceError::InvalidParameter(format!(
            "{name} must be at least 2, got {points}"
        )))
    }
}
