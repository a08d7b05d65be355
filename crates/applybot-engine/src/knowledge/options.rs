use super::Answer;
use serde::{Deserialize, Serialize};

const PLACEHOLDER_TEXT: &str = "select an option";

/// One choice of a dropdown or radio group, in DOM order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub text: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }

    /// The "Select an option" entry a dropdown shows before anything is chosen.
    pub fn is_placeholder(&self) -> bool {
        self.value.trim().is_empty()
            || self.value.trim().eq_ignore_ascii_case(PLACEHOLDER_TEXT)
            || self.text.trim().eq_ignore_ascii_case(PLACEHOLDER_TEXT)
    }
}

/// Whether a dropdown's current value means nothing has been chosen yet.
pub fn is_unselected(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(PLACEHOLDER_TEXT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionMatch<'a> {
    Matched(&'a FieldOption),
    /// An answer exists but no option fits it.
    NoMatch,
}

/// Picks the first option, in DOM order, whose text or value contains any search term of
/// `answer` (case-insensitive). Placeholders never match.
pub fn match_option<'a>(answer: &Answer, options: &'a [FieldOption]) -> OptionMatch<'a> {
    let terms: Vec<String> = answer
        .search_terms()
        .into_iter()
        .map(|t| t.to_lowercase())
        .collect();
    if terms.is_empty() {
        return OptionMatch::NoMatch;
    }

    options
        .iter()
        .filter(|option| !option.is_placeholder())
        .find(|option| {
            let text = option.text.to_lowercase();
            let value = option.value.to_lowercase();
            terms
                .iter()
                .any(|term| text.contains(term.as_str()) || value.contains(term.as_str()))
        })
        .map_or(OptionMatch::NoMatch, OptionMatch::Matched)
}
