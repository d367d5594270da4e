//! ndfilter command-line front end
//!
//! Resolves configuration from flags, environment and `ndfilter.toml`,
//! initialises logging, wires stdin/stdout (or files) into a
//! [`FilterPipeline`](ndfilter_pipeline::FilterPipeline) and maps the
//! outcome to a process exit code.

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;

pub use app::{ResolvedConfig, resolve_config, run};
pub use cli::Cli;
pub use error::CliError;
