use super::Answer;
use crate::config::schema::KnowledgeConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse knowledge file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One curated question and its vetted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    #[serde(default)]
    pub answer: Value,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: Value) -> Self {
        Self {
            question: question.into(),
            answer,
        }
    }
}

/// Canonical technology names and the surface spellings that identify them in a label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechLexicon {
    entries: Vec<(String, Vec<String>)>,
}

#[derive(Deserialize)]
struct RawLexicon {
    #[serde(default)]
    tech: Map<String, Value>,
}

impl TechLexicon {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, aliases)| {
                    let aliases = aliases
                        .into_iter()
                        .map(|a| a.into().to_lowercase())
                        .filter(|a| !a.trim().is_empty())
                        .collect();
                    (name.into(), aliases)
                })
                .collect(),
        }
    }

    /// First technology, in lexicon order, with an alias contained in `text`.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| text.contains(alias.as_str())))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for TechLexicon {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawLexicon::deserialize(deserializer)?;
        let entries = raw.tech.into_iter().map(|(name, aliases)| {
            let aliases = match aliases {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                Value::String(single) => vec![single],
                _ => Vec::new(),
            };
            (name, aliases)
        });
        Ok(TechLexicon::new(entries))
    }
}

/// Applicant facts used by the category rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub work_auth: Option<String>,
    pub legally_authorized: Option<bool>,
    pub relocation: Option<String>,
    pub salary_expectation: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    /// Technology name → years; order follows the file.
    #[serde(default)]
    pub experience_years: Map<String, Value>,
}

impl Profile {
    /// Years of experience recorded for `tech` (name compared case-insensitively).
    pub fn years_for(&self, tech: &str) -> Answer {
        self.experience_years
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tech))
            .map(|(_, years)| match years {
                Value::Number(n) => Answer::Number(n.to_string()),
                Value::String(s) if s.trim().parse::<f64>().is_ok() => {
                    Answer::Number(s.trim().to_string())
                }
                _ => Answer::Null,
            })
            .unwrap_or(Answer::Null)
    }
}

/// Everything the resolver consults, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub curated: Vec<KnowledgeEntry>,
    pub duration: Vec<KnowledgeEntry>,
    pub lexicon: TechLexicon,
    pub profile: Profile,
}

impl KnowledgeBase {
    /// Load every table named in `config`. Missing files load as empty tables.
    pub async fn load(config: &KnowledgeConfig) -> Result<Self, KnowledgeError> {
        let dir = config.dir.as_path();
        let kb = Self {
            curated: load_optional(&dir.join(&config.questions))
                .await?
                .unwrap_or_default(),
            duration: load_optional(&dir.join(&config.duration_questions))
                .await?
                .unwrap_or_default(),
            lexicon: load_optional(&dir.join(&config.keywords))
                .await?
                .unwrap_or_default(),
            profile: load_optional(&dir.join(&config.profile))
                .await?
                .unwrap_or_default(),
        };
        info!(
            "Loaded knowledge from {}: {} curated, {} duration, {} technologies",
            dir.display(),
            kb.curated.len(),
            kb.duration.len(),
            kb.lexicon.len()
        );
        Ok(kb)
    }
}

async fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, KnowledgeError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Knowledge file {} not found, using empty table", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(KnowledgeError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| KnowledgeError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lexicon_keeps_file_order() {
        let lexicon: TechLexicon = serde_json::from_value(json!({
            "tech": {
                "JavaScript": ["javascript", "js"],
                "Java": ["java"]
            }
        }))
        .unwrap();
        assert_eq!(lexicon.find_in("Years of JavaScript?"), Some("JavaScript"));
        assert_eq!(lexicon.find_in("Years of Java?"), Some("Java"));
        assert_eq!(lexicon.find_in("Years of Rust?"), None);
    }

    #[test]
    fn test_profile_years_lookup() {
        let profile: Profile = serde_json::from_value(json!({
            "phone": "555-0100",
            "experienceYears": {"Python": 5, "Go": "2.5", "Cobol": "lots"}
        }))
        .unwrap();
        assert_eq!(profile.phone.as_deref(), Some("555-0100"));
        assert_eq!(profile.years_for("python"), Answer::Number("5".into()));
        assert_eq!(profile.years_for("Go"), Answer::Number("2.5".into()));
        assert_eq!(profile.years_for("Cobol"), Answer::Null);
        assert_eq!(profile.years_for("Rust"), Answer::Null);
    }

    #[tokio::test]
    async fn test_load_missing_files_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = KnowledgeConfig {
            dir: dir.path().to_path_buf(),
            ..KnowledgeConfig::default()
        };
        let kb = KnowledgeBase::load(&config).await.unwrap();
        assert!(kb.curated.is_empty());
        assert!(kb.lexicon.is_empty());
        assert!(kb.profile.phone.is_none());
    }

    #[tokio::test]
    async fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = KnowledgeConfig {
            dir: dir.path().to_path_buf(),
            ..KnowledgeConfig::default()
        };
        std::fs::write(dir.path().join(&config.questions), "not json").unwrap();
        let err = KnowledgeBase::load(&config).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::Parse { .. }));
    }
}
