use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a DOM node registered by the in-page agent.
///
/// Handles are only valid until the node leaves the DOM. Every modal step re-renders the form,
/// so callers must re-query instead of holding handles across clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(pub u32);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands understood by the in-page agent (`window.ApplyBot.process`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DriverCommand {
    /// Locate every element matching a CSS selector, in document order.
    Find { selector: String },
    /// Locate every descendant of `parent` matching a CSS selector.
    FindWithin { parent: ElementRef, selector: String },
    Attribute { id: ElementRef, name: String },
    Text { id: ElementRef },
    Value { id: ElementRef },
    Checked { id: ElementRef },
    /// Replace the value of an input and fire `input`/`change`.
    Fill { id: ElementRef, value: String },
    Click { id: ElementRef },
    Select { id: ElementRef, value: String },
    ScrollToBottom { id: ElementRef },
}

impl DriverCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DriverCommand::Find { .. } => "find",
            DriverCommand::FindWithin { .. } => "find_within",
            DriverCommand::Attribute { .. } => "attribute",
            DriverCommand::Text { .. } => "text",
            DriverCommand::Value { .. } => "value",
            DriverCommand::Checked { .. } => "checked",
            DriverCommand::Fill { .. } => "fill",
            DriverCommand::Click { .. } => "click",
            DriverCommand::Select { .. } => "select",
            DriverCommand::ScrollToBottom { .. } => "scroll_to_bottom",
        }
    }
}

/// Payload of a successful agent response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverData {
    Handles { handles: Vec<ElementRef> },
    Text { value: Option<String> },
    Flag { value: bool },
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriverResponse {
    Ok {
        data: DriverData,
    },
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
    },
}
