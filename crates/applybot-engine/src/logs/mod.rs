//! Durable records written while applying: unanswered questions for curation, failures and
//! submitted applications.

pub mod questions;
pub mod store;

pub use questions::QuestionLogger;
pub use store::{JsonArrayFile, JsonLinesFile};

use crate::knowledge::FieldOption;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to access log {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse log {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Kind of input an unanswered question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    Text,
    Number,
    Dropdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionLogEntry {
    pub job_id: String,
    pub question: String,
    pub answer_type: AnswerType,
    /// Always written as `null`; curators fill it in by hand.
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureLogEntry {
    pub job_id: String,
    pub url: String,
    pub error: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessLogEntry {
    pub job_id: String,
    pub url: String,
    pub steps: usize,
    pub timestamp: String,
}

/// RFC 3339 UTC timestamp for log entries.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
