//! Core types and constants for scanner uncertainty estimation

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
