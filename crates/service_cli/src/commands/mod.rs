//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check_config;
pub mod simulate;
