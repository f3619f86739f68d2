use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UntarError {
    #[error("invalid mode `{mode}`")]
    InvalidMode { mode: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
}

/// Error raised by a single extraction unit. Units are never fatal: the
/// orchestrator logs the error, records the outcome, and moves on to the
/// next archive. The variant identifies which pipeline stage failed.
#[derive(Error, Debug)]
pub enum UnitError {
    #[error("error creating target directory {}: {source}", .path.display())]
    CreateDest { path: PathBuf, source: io::Error },

    #[error("error opening source file {}: {source}", .path.display())]
    OpenSource { path: PathBuf, source: io::Error },

    #[error("gzip decompression failed for {}: {source}", .path.display())]
    Gunzip { path: PathBuf, source: io::Error },

    #[error("error untarring {}: {source}", .path.display())]
    Untar { path: PathBuf, source: io::Error },
}

impl UnitError {
    /// Short stage label used in outcome records and reports.
    pub fn stage(&self) -> &'static str {
        match self {
            UnitError::CreateDest { .. } => "create-dest",
            UnitError::OpenSource { .. } => "open-source",
            UnitError::Gunzip { .. } => "gunzip",
            UnitError::Untar { .. } => "untar",
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for UntarError {
    fn user_message(&self) -> String {
        match self {
            UntarError::InvalidMode { mode } => {
                format!("Invalid mode `{}`", mode)
            }
            UntarError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            UntarError::Io(e) => {
                format!("IO operation failed: {}", e)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            UntarError::InvalidMode { .. } => Some(
                "Valid modes are \"tar\" (never decompress) and \"tgz\" (always decompress). Omit the mode to infer handling from each file's extension.".to_string()
            ),
            UntarError::Config { .. } => Some(
                "Check your configuration file syntax, or pass archives directly: untar <archive>... --dest <dir>".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for UntarError {
    fn from(error: toml::de::Error) -> Self {
        UntarError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UntarError>;
