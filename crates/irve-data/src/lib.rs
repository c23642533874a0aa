//! Data layer for the charge-point analysis tool.
//!
//! Loads the charge-point and prediction CSV exports into a [`store::RecordStore`],
//! builds the monthly, categorical and map views over it, and assembles them
//! into an analysis report.

pub mod aggregator;
pub mod analysis;
pub mod geo;
pub mod prediction;
pub mod profiler;
pub mod reader;
pub mod store;

pub use irve_core as core;
