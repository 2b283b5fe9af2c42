//! Command-line front end for sealpack.
//!
//! Shared by the `sealpack` extractor and the `sealpack-pack` packing tool.

pub mod app;
pub mod assets;
pub mod cli;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod prompt;
pub mod signals;
pub mod ui;
