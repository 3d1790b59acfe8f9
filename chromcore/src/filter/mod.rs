pub mod chain;
pub mod derivative;
