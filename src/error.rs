use thiserror::Error;

/// Failures raised by catalog queries and the trilateration solver.
///
/// Every variant is produced before any state is touched, so a failed call
/// leaves the catalog and its graph cache exactly as they were.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("unknown star: {0}")]
    NotFound(String),
    #[error("threshold must be a non-negative number, got {0}")]
    Domain(f64),
    #[error("threshold {threshold} exceeds indexed radius {max}")]
    OutOfRange { threshold: f64, max: f64 },
    #[error("trilateration needs at least 3 samples, got {0}")]
    TooFewSamples(usize),
    #[error("every sample triple is ill-conditioned")]
    IllConditioned,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejects NaN and negative thresholds, then any threshold above `max`.
pub(crate) fn check_threshold(threshold: f64, max: Option<f64>) -> Result<f64> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(Error::Domain(threshold));
    }
    match max {
        Some(max) if threshold > max => Err(Error::OutOfRange { threshold, max }),
        _ => Ok(threshold),
    }
}
