//! CLI-specific error types and exit code mapping

use ndfilter_core::error::NdfilterError;
use ndfilter_pipeline::FilterPipelineError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// IO error while opening input or output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from ndfilter-core.
    #[error("{0}")]
    Core(#[from] NdfilterError),

    /// Filter pipeline failure.
    #[error("{0}")]
    Pipeline(#[from] FilterPipelineError),

    /// Effective configuration could not be serialised for `--validate`.
    #[error("toml output error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The run was stopped by an interrupt signal.
    #[error("interrupted")]
    Interrupted,
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General error (worker failure)   |
    /// | 2    | Configuration error              |
    /// | 10   | Input or output IO error         |
    /// | 130  | Interrupted                      |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 10,
            Self::Interrupted => 130,
            Self::TomlSerialize(_) => 1,
            Self::Core(err) => match err {
                NdfilterError::Config(_) => 2,
                NdfilterError::Io(_) => 10,
                _ => 1,
            },
            Self::Pipeline(err) => match err {
                FilterPipelineError::Config { .. }
                | FilterPipelineError::FilterSpec(_)
                | FilterPipelineError::FilterLoad { .. }
                | FilterPipelineError::Regex(_) => 2,
                FilterPipelineError::Input(_)
                | FilterPipelineError::Output(_) => 10,
                _ => 1,
            },
        }
    }
}
