//! Batch cleaning and merging of proteomics abundance tables.
//!
//! The cleaning pipeline turns a wide protein-by-sample sheet into one row
//! per (PatientID, Timepoint) sample, saving a CSV after every step. The merge
//! utility outer-joins two such tables, fills gaps in shared protein columns
//! from the second table and summarizes coverage per protein.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod stats;
pub mod table;

// Application use cases and their ports, and the adapters implementing them
pub mod app;
pub mod infra;

pub use config::{CleanerConfig, Config, MergeConfig};
pub use error::{CleanerError, Result};
pub use table::{Column, Table, Value};
