//! spanwrap CLI library
//!
//! Command-line front end for the spanwrap segmentation engine: reads
//! markup from files, glob patterns or stdin, segments it and writes the
//! wrapped markup as HTML or JSON.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
