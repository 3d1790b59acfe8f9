pub mod baseline;
pub mod boundary;
pub mod extrema;
pub mod integration;
pub mod loess;
pub mod overlap;
pub mod snr;
pub mod spline;
