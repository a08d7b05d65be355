/// Errors surfaced by a page driver. Codes mirror the in-page agent's error codes.
#[derive(thiserror::Error, Debug, Clone)]
pub enum DriverError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("Element {id} not found")]
    ElementNotFound { id: u32 },

    #[error("Element {id} is stale (removed from DOM)")]
    ElementStale { id: u32 },

    #[error("Element {id} is not interactable: {reason}")]
    ElementNotInteractable { id: u32, reason: String },

    #[error("Option not found: {value}")]
    OptionNotFound { value: String },

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Timeout: {operation}")]
    TimeoutWithContext { operation: String },

    #[error("Unexpected response to '{command}': {got}")]
    UnexpectedResponse { command: String, got: String },

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Agent execution failed: {0}")]
    Agent(String),

    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Serialization(err.to_string())
    }
}

impl DriverError {
    /// Returns the agent error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Navigation(_) => "NAVIGATION_ERROR",
            DriverError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            DriverError::ElementStale { .. } => "ELEMENT_STALE",
            DriverError::ElementNotInteractable { .. } => "ELEMENT_NOT_INTERACTABLE",
            DriverError::OptionNotFound { .. } => "OPTION_NOT_FOUND",
            DriverError::SelectorInvalid { .. } => "SELECTOR_INVALID",
            DriverError::ScriptError(_) => "SCRIPT_ERROR",
            DriverError::TimeoutWithContext { .. } => "TIMEOUT",
            DriverError::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            DriverError::Agent(_) => "AGENT_ERROR",
            DriverError::NotReady => "NOT_READY",
            DriverError::Io(_) => "IO_ERROR",
            DriverError::Serialization(_) => "SERIALIZATION_ERROR",
            DriverError::Other(_) => "INTERNAL_ERROR",
            DriverError::NotSupported(_) => "NOT_SUPPORTED",
        }
    }

    /// Whether the failed handle should simply be re-queried.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            DriverError::ElementStale { .. } | DriverError::ElementNotFound { .. }
        )
    }
}
