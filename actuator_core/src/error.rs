use thiserror::Error;

/// Why a scripted run ended before its configured duration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    #[error("shutdown requested")]
    Shutdown,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActuatorError {
    #[error("part `{0}` is not attached to an assembly")]
    PartNotConfigured(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("script error: {0}")]
    Script(String),
    #[error("aborted: {0}")]
    Aborted(AbortReason),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing scene handle")]
    MissingScene,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
