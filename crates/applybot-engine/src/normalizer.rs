//! Field label normalization.
//!
//! Captions on the application form frequently render their text twice, once visibly and once
//! for screen readers ("Question? Question?", "Question Question"). A [`Label`] is the caption
//! after whitespace collapsing and duplicate stripping, repeated until nothing changes so that
//! `normalize(normalize(x)) == normalize(x)`.
//!
//! Duplicate detection, in order:
//! 1. exact character half-split (`"AbcAbc"`, `"Abc Abc"` once whitespace is collapsed),
//! 2. exact token half-split (`"How many years How many years"`),
//! 3. question segment fallback: the caption ends with its own first `...?` segment
//!    (`"Phone? (required) Phone?"`).

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static QUESTION_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^?]*\?").expect("question segment pattern is valid")
});

/// A normalized field caption.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Label {
    text: String,
}

impl Label {
    pub fn normalize(raw: &str) -> Self {
        let mut current = collapse_whitespace(raw);
        loop {
            match strip_duplicate(&current) {
                Some(shorter) if shorter != current => current = shorter,
                _ => break,
            }
        }
        Self { text: current }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Lower-cased form used for every comparison.
    pub fn key(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Labels containing a question mark are worth logging when unanswered.
    pub fn is_question(&self) -> bool {
        self.text.contains('?')
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.key().contains(needle)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Shorthand for `Label::normalize(raw).to_string()`.
pub fn normalize(raw: &str) -> String {
    Label::normalize(raw).text
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_duplicate(text: &str) -> Option<String> {
    half_split(text)
        .or_else(|| token_split(text))
        .or_else(|| question_segments(text))
}

fn half_split(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return None;
    }
    // "Abc Abc" has an odd length with the separator in the middle.
    let mid = chars.len() / 2;
    let (first, second) = if chars.len() % 2 == 0 {
        (&chars[..mid], &chars[mid..])
    } else if chars[mid] == ' ' {
        (&chars[..mid], &chars[mid + 1..])
    } else {
        return None;
    };
    if first == second {
        Some(first.iter().collect::<String>().trim().to_string())
    } else {
        None
    }
}

fn token_split(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split(' ').collect();
    if tokens.len() < 2 || tokens.len() % 2 != 0 {
        return None;
    }
    let (first, second) = tokens.split_at(tokens.len() / 2);
    if first == second {
        Some(first.join(" "))
    } else {
        None
    }
}

fn question_segments(text: &str) -> Option<String> {
    let first = QUESTION_SEGMENT.find(text)?.as_str().trim();
    if first.len() > 1 && text.len() > first.len() && text.ends_with(first) {
        Some(first.to_string())
    } else {
        None
    }
}
