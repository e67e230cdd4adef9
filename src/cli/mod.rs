//! Command-line interface for the `sagitta` binary.
//!
//! # Module Structure
//!
//! - `args`: clap argument definitions
//! - `commands`: command implementations over a [`crate::manager::CollectionManager`]
//! - `output`: human/JSON output formatting

pub mod args;
pub mod commands;
pub mod output;
