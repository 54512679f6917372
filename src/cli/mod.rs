//! Command Line Interface (CLI) layer for rasterstretch.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the dispatch logic (`runner`) for the `percentiles`, `stretch` and
//! `package` subcommands. It wires user-provided options to the library
//! functionality exposed via `rasterstretch::api`.
//!
//! If you are embedding rasterstretch into another application, prefer the
//! high-level `rasterstretch::api` module over the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
