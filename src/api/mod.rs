//! Report output for evaluation results

pub mod formatting;

pub use formatting::{
    render, CsvFormatter, JsonFormatter, OutputFormat, TextFormatter, UncertaintyReport,
};
