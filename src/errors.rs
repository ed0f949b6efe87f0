use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Page engine error: {0}")]
    EngineError(String),

    #[error("Platform-specific error: {0}")]
    PlatformError(String),
}

impl AutomationError {
    /// Whether the error is a cooperative abort rather than a genuine failure.
    /// Cancellations are reported at a lower severity than timeouts or engine
    /// errors, but both stop the run.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AutomationError::Cancelled(_))
    }
}
