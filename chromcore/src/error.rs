use thiserror::Error;

/// Errors raised by the chromatogram processing core.
///
/// Only `FitFailure` is meant to reach a caller of the worker as a
/// "capability disabled" signal; `DomainEvaluation` is absorbed per sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChromError {
    /// Baseline evaluated outside the span of its control points.
    #[error("value {x} is outside of the baseline domain [{min}, {max}]")]
    DomainEvaluation { x: f64, min: f64, max: f64 },

    /// LOESS smoothing or spline construction failed.
    #[error("baseline fit failed: {0}")]
    FitFailure(String),

    #[error("signal and time axis differ in length ({signal} vs. {time})")]
    LengthMismatch { signal: usize, time: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ChromError>;
