use super::store::JsonArrayFile;
use super::{AnswerType, LogError, QuestionLogEntry, timestamp};
use crate::context::JobContext;
use crate::knowledge::FieldOption;
use crate::normalizer::Label;
use std::path::PathBuf;
use tracing::{debug, info};

/// Curation file of questions the resolver could not answer.
///
/// Holds at most one entry per normalized question; logging a known question is a no-op.
#[derive(Debug, Clone)]
pub struct QuestionLogger {
    file: JsonArrayFile<QuestionLogEntry>,
}

impl QuestionLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonArrayFile::new(path),
        }
    }

    /// Append `question` unless already present. Returns whether an entry was written.
    pub async fn log(
        &self,
        ctx: &JobContext,
        question: &Label,
        answer_type: AnswerType,
        options: Option<&[FieldOption]>,
    ) -> Result<bool, LogError> {
        if question.is_empty() {
            return Ok(false);
        }

        let mut entries = self.file.load().await?;
        let key = question.key();
        if entries
            .iter()
            .any(|entry| Label::normalize(&entry.question).key() == key)
        {
            debug!("Question already logged: {}", question);
            return Ok(false);
        }

        let options = options.map(|options| {
            options
                .iter()
                .filter(|option| !option.is_placeholder())
                .cloned()
                .collect::<Vec<_>>()
        });

        entries.push(QuestionLogEntry {
            job_id: ctx.job_id.clone(),
            question: question.to_string(),
            answer_type,
            answer: None,
            options,
            timestamp: timestamp(),
        });
        self.file.save(&entries).await?;
        info!("Logged unanswered question ({:?}): {}", answer_type, question);
        Ok(true)
    }

    pub async fn entries(&self) -> Result<Vec<QuestionLogEntry>, LogError> {
        self.file.load().await
    }
}
