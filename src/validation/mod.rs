//! Error types

pub mod error;

pub use error::{DomainError, DomainResult, ProcessingError};
