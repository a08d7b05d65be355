//! Answer resolution for a single field label.
//!
//! Sources are consulted in a fixed trust order and the first non-null answer wins:
//! curated exact match, curated substring match, applicant profile categories, then the
//! technology-duration heuristic.

use super::tables::{KnowledgeBase, KnowledgeEntry, Profile};
use super::Answer;
use crate::normalizer::Label;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    LegallyAuthorized,
    Phone,
    Email,
    LinkedIn,
    GitHub,
    Website,
    FullName,
    WorkAuthorization,
    Relocation,
    Salary,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSource {
    CuratedExact,
    CuratedPartial,
    DurationTable,
    Profile(ProfileField),
    TechDuration { tech: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub answer: Answer,
    pub source: AnswerSource,
}

/// Category rules in priority order. A rule fires when every token of any one of its groups
/// appears in the label.
const CATEGORY_RULES: &[(ProfileField, &[&[&str]])] = &[
    // Must precede the generic work/author rule, which would otherwise shadow it.
    (ProfileField::LegallyAuthorized, &[&["legally authorized to work"]]),
    (ProfileField::Phone, &[&["phone"], &["mobile"]]),
    (ProfileField::Email, &[&["email"]]),
    (ProfileField::LinkedIn, &[&["linkedin"]]),
    (ProfileField::GitHub, &[&["github"]]),
    (ProfileField::Website, &[&["website"], &["portfolio"]]),
    (ProfileField::FullName, &[&["name"]]),
    (ProfileField::WorkAuthorization, &[&["work", "author"]]),
    (ProfileField::Relocation, &[&["relocat"]]),
    (ProfileField::Salary, &[&["salary"], &["compensation"]]),
    (
        ProfileField::Location,
        &[&["relocating"], &["reside"], &["city"], &["location"]],
    ),
];

/// Labels asking for a duration of experience.
pub fn is_duration_question(label: &Label) -> bool {
    let key = label.key();
    (key.contains("experience") && key.contains("years")) || key.contains("how many years")
}

pub struct KnowledgeResolver {
    kb: KnowledgeBase,
}

impl KnowledgeResolver {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Answer for `label`, or `Answer::Null` when nothing is known.
    pub fn resolve(&self, label: &Label) -> Answer {
        self.lookup(label)
            .map(|r| r.answer)
            .unwrap_or(Answer::Null)
    }

    /// Like [`resolve`](Self::resolve) but reports which source answered.
    pub fn lookup(&self, label: &Label) -> Option<Resolved> {
        if label.is_empty() {
            return None;
        }

        let resolved = match_table(&self.kb.curated, label)
            .or_else(|| category_match(&self.kb.profile, label))
            .or_else(|| self.tech_duration(label));

        match &resolved {
            Some(r) => debug!("Resolved '{}' via {:?}", label, r.source),
            None => debug!("No answer for '{}'", label),
        }
        resolved
    }

    /// Resolution for custom questions: the duration table is consulted before the general
    /// sources.
    pub fn lookup_custom(&self, label: &Label) -> Option<Resolved> {
        if label.is_empty() {
            return None;
        }
        match_table(&self.kb.duration, label)
            .map(|r| Resolved {
                answer: r.answer,
                source: AnswerSource::DurationTable,
            })
            .or_else(|| self.lookup(label))
    }

    fn tech_duration(&self, label: &Label) -> Option<Resolved> {
        if !is_duration_question(label) {
            return None;
        }
        let tech = self.kb.lexicon.find_in(label.as_str())?;
        match self.kb.profile.years_for(tech) {
            Answer::Null => None,
            answer => Some(Resolved {
                answer,
                source: AnswerSource::TechDuration {
                    tech: tech.to_string(),
                },
            }),
        }
    }
}

/// Exact match across the whole table first, then substring in either direction. Entries
/// without an answer are skipped.
fn match_table(entries: &[KnowledgeEntry], label: &Label) -> Option<Resolved> {
    let key = label.key();
    let answered = || {
        entries.iter().filter_map(|entry| {
            let answer = Answer::from_json(&entry.answer);
            if answer.is_null() {
                return None;
            }
            let question = Label::normalize(&entry.question).key();
            (!question.is_empty()).then_some((question, answer))
        })
    };

    if let Some((_, answer)) = answered().find(|(question, _)| *question == key) {
        return Some(Resolved {
            answer,
            source: AnswerSource::CuratedExact,
        });
    }

    answered()
        .find(|(question, _)| key.contains(question.as_str()) || question.contains(key.as_str()))
        .map(|(_, answer)| Resolved {
            answer,
            source: AnswerSource::CuratedPartial,
        })
}

fn category_match(profile: &Profile, label: &Label) -> Option<Resolved> {
    let key = label.key();
    CATEGORY_RULES
        .iter()
        .filter(|(_, groups)| {
            groups
                .iter()
                .any(|tokens| tokens.iter().all(|token| key.contains(token)))
        })
        .find_map(|(field, _)| {
            let answer = profile_value(profile, *field);
            (!answer.is_null()).then(|| Resolved {
                answer,
                source: AnswerSource::Profile(*field),
            })
        })
}

fn profile_value(profile: &Profile, field: ProfileField) -> Answer {
    match field {
        ProfileField::LegallyAuthorized => profile
            .legally_authorized
            .map_or(Answer::Null, Answer::Bool),
        ProfileField::Phone => Answer::from_text(profile.phone.as_deref()),
        ProfileField::Email => Answer::from_text(profile.email.as_deref()),
        ProfileField::LinkedIn => Answer::from_text(profile.linkedin.as_deref()),
        ProfileField::GitHub => Answer::from_text(profile.github.as_deref()),
        ProfileField::Website => Answer::from_text(profile.website.as_deref()),
        ProfileField::FullName => Answer::from_text(profile.full_name.as_deref()),
        ProfileField::WorkAuthorization => Answer::from_text(profile.work_auth.as_deref()),
        ProfileField::Relocation => Answer::from_text(profile.relocation.as_deref()),
        ProfileField::Salary => Answer::from_text(profile.salary_expectation.as_deref()),
        ProfileField::Location => Answer::from_text(profile.location.as_deref()),
    }
}
