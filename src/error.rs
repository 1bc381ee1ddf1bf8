//! Error types for Dockhand

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockhandError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    LookupError(String),

    #[error("{0}")]
    UsageError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Exit code: {0}")]
    CommandFailed(i32),

    #[error("Exited without valid error code")]
    CommandUnclassified,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DockhandError {
    /// Process exit code for this error. Config schema problems exit 3,
    /// failed lookups and usage mistakes exit 2, external command
    /// failures propagate the external code, everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DockhandError::ConfigError(_) => 3,
            DockhandError::LookupError(_) | DockhandError::UsageError(_) => 2,
            DockhandError::CommandFailed(code) => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DockhandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DockhandError::ConfigError("x".into()).exit_code(), 3);
        assert_eq!(DockhandError::LookupError("x".into()).exit_code(), 2);
        assert_eq!(DockhandError::UsageError("x".into()).exit_code(), 2);
        assert_eq!(DockhandError::CommandFailed(42).exit_code(), 42);
        assert_eq!(DockhandError::CommandUnclassified.exit_code(), 1);
        assert_eq!(DockhandError::InvalidInput("x".into()).exit_code(), 1);
    }
}
