//! Runtime layer for the charge-point analysis tool.
//!
//! Runs the independent views concurrently on blocking worker tasks.

pub mod orchestrator;

pub use irve_core as core;
pub use irve_data as data;
