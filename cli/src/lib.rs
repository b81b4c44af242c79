//! CLI utilities for dronevox applications.
//!
//! Config contexts, directory layout and result output.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{load_config, Config, Context};
pub use output::{print_verbose, Output, OutputFormat};
pub use paths::Paths;
