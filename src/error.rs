use thiserror::Error;

/// Requests rejected before any simulation runs.
///
/// An unreachable target is not an error; see [`crate::solver::Solution`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FireError {
    #[error("unknown munition: {0}")]
    UnknownMunition(String),
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: &'static str },
}

impl FireError {
    pub fn invalid(field: &'static str, reason: &'static str) -> Self {
        FireError::InvalidInput { field, reason }
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, FireError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FireError::invalid(field, "must be a finite number"))
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, FireError> {
    let v = ensure_finite(field, value)?;
    if v < 0.0 {
        return Err(FireError::invalid(field, "must not be negative"));
    }
    Ok(v)
}
