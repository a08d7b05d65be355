//! Error Code Mapping
//!
//! Maps in-page agent error codes to `DriverError` variants.

use crate::error::DriverError;
use crate::protocol::{DriverData, DriverResponse};
use serde_json::Value;

/// Maps an agent error code and message to a `DriverError`.
pub fn map_agent_error(code: &str, message: &str, details: Option<&Value>) -> DriverError {
    match code {
        "ELEMENT_NOT_FOUND" => DriverError::ElementNotFound {
            id: extract_id(details),
        },
        "ELEMENT_STALE" => DriverError::ElementStale {
            id: extract_id(details),
        },
        "ELEMENT_NOT_INTERACTABLE" => DriverError::ElementNotInteractable {
            id: extract_id(details),
            reason: message.to_string(),
        },
        "OPTION_NOT_FOUND" => DriverError::OptionNotFound {
            value: extract_str(details, "value"),
        },
        "SELECTOR_INVALID" => DriverError::SelectorInvalid {
            selector: extract_str(details, "selector"),
        },
        "SCRIPT_ERROR" => DriverError::ScriptError(message.to_string()),
        "TIMEOUT" => DriverError::TimeoutWithContext {
            operation: message.to_string(),
        },
        "NAVIGATION_ERROR" => DriverError::Navigation(message.to_string()),
        "UNKNOWN_COMMAND" | "INVALID_REQUEST" => DriverError::Agent(message.to_string()),
        _ => DriverError::Other(format!("[{}] {}", code, message)),
    }
}

/// Unwraps an agent response into its data, mapping error responses.
pub fn into_result(response: DriverResponse) -> Result<DriverData, DriverError> {
    match response {
        DriverResponse::Ok { data } => Ok(data),
        DriverResponse::Error {
            code,
            message,
            details,
        } => Err(map_agent_error(&code, &message, details.as_ref())),
    }
}

fn extract_id(details: Option<&Value>) -> u32 {
    details
        .and_then(|d| d.get("id"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32
}

fn extract_str(details: Option<&Value>, key: &str) -> String {
    details
        .and_then(|d| d.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
