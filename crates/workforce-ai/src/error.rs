use crate::ai::AiError;
use crate::cache::StoreError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workforce::{RepositoryError, TaskImportError};
use std::fmt;

/// Startup and command-line failures. Request-level failures use
/// [`crate::analytics::AnalyticsError`] instead.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Import(TaskImportError),
    Repository(RepositoryError),
    Store(StoreError),
    Ai(AiError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Import(err) => write!(f, "task import failed: {err}"),
            AppError::Repository(err) => write!(f, "workforce repository error: {err}"),
            AppError::Store(err) => write!(f, "cache store error: {err}"),
            AppError::Ai(err) => write!(f, "AI provider error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Ai(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TaskImportError> for AppError {
    fn from(value: TaskImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AiError> for AppError {
    fn from(value: AiError) -> Self {
        Self::Ai(value)
    }
}
