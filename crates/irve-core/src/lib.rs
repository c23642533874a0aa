//! Domain layer for the charge-point analysis tool.
//!
//! Record types, the profiling field set, value coercion, month helpers,
//! marker label formatting, settings and the shared error type.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{AnalysisError, Result};
