//! Baseline estimation, signal-to-noise evaluation and peak picking for
//! one-dimensional chromatographic intensity traces (TIC).

pub mod algorithm;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod worker;

pub use crate::config::{BaselineDomain, BaselineEstimatorConfig, PeakFinderConfig, SnrStrategy};
pub use crate::data::chromatogram::Chromatogram;
pub use crate::data::peak::{PeakRecord, PeakSet};
pub use crate::error::{ChromError, Result};
pub use crate::worker::{process_batch, PeakFinderResult, PeakFinderWorker};
