//! Read-only knowledge used to answer application questions.

pub mod options;
pub mod resolver;
pub mod tables;

pub use options::{FieldOption, OptionMatch, match_option};
pub use resolver::{AnswerSource, KnowledgeResolver, Resolved, is_duration_question};
pub use tables::{KnowledgeBase, KnowledgeEntry, KnowledgeError, Profile, TechLexicon};

use serde_json::Value;
use std::fmt;

/// A resolved value for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Bool(bool),
    /// Numeric answers are carried as their decimal string.
    Number(String),
    /// No knowledge. Distinct from a blank answer, which is never produced.
    Null,
}

const TRUE_TERMS: [&str; 4] = ["Yes", "True", "true", "1"];
const FALSE_TERMS: [&str; 4] = ["No", "False", "false", "0"];

impl Answer {
    /// Converts a table value. Blank strings count as no knowledge.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) if !s.trim().is_empty() => Answer::Text(s.trim().to_string()),
            Value::Bool(b) => Answer::Bool(*b),
            Value::Number(n) => Answer::Number(n.to_string()),
            _ => Answer::Null,
        }
    }

    /// Wraps an optional profile string, treating blanks as absent.
    pub fn from_text(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(s) if !s.is_empty() => Answer::Text(s.to_string()),
            _ => Answer::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Answer::Null)
    }

    /// Text typed into a free-text or numeric input.
    pub fn fill_text(&self) -> Option<String> {
        match self {
            Answer::Text(s) | Answer::Number(s) => Some(s.clone()),
            Answer::Bool(true) => Some("Yes".to_string()),
            Answer::Bool(false) => Some("No".to_string()),
            Answer::Null => None,
        }
    }

    /// Terms tried against dropdown and radio options.
    pub fn search_terms(&self) -> Vec<String> {
        match self {
            Answer::Bool(true) => TRUE_TERMS.iter().map(|t| t.to_string()).collect(),
            Answer::Bool(false) => FALSE_TERMS.iter().map(|t| t.to_string()).collect(),
            Answer::Text(s) | Answer::Number(s) => vec![s.clone()],
            Answer::Null => Vec::new(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(s) | Answer::Number(s) => f.write_str(s),
            Answer::Bool(b) => write!(f, "{}", b),
            Answer::Null => f.write_str("null"),
        }
    }
}
