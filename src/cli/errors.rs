use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Usage: {usage}")]
    Usage { usage: String },

    #[error(transparent)]
    Library(#[from] rasterstretch::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
