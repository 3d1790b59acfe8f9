pub mod chromatogram;
pub mod peak;
