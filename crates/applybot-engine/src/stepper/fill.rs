use super::FormStepper;
use super::fields::{Field, FieldKind, FieldOrigin};
use crate::context::JobContext;
use crate::driver::{DriverError, PageDriver, PageExt};
use crate::knowledge::{OptionMatch, is_duration_question, match_option};
use tracing::{debug, warn};

impl FormStepper {
    /// Answer one field from the knowledge base, or route it to the question log.
    pub(super) async fn fill_field<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        ctx: &JobContext,
        field: &Field,
    ) -> Result<(), DriverError> {
        if field.is_prefilled() {
            debug!("Keeping prefilled '{}'", field.label);
            return Ok(());
        }

        let resolved = match field.origin {
            FieldOrigin::Standard => self.resolver.lookup(&field.label),
            FieldOrigin::Custom => self.resolver.lookup_custom(&field.label),
        };
        let Some(resolved) = resolved else {
            self.note_unanswered(ctx, field).await;
            return Ok(());
        };
        debug!("'{}' answered from {:?}", field.label, resolved.source);

        match &field.kind {
            FieldKind::Text | FieldKind::Number => match resolved.answer.fill_text() {
                Some(text) => driver.fill(field.handle, &text).await?,
                None => {
                    self.note_unanswered(ctx, field).await;
                    return Ok(());
                }
            },
            FieldKind::Dropdown { options } => match match_option(&resolved.answer, options) {
                OptionMatch::Matched(option) => {
                    driver.select_option(field.handle, &option.value).await?
                }
                OptionMatch::NoMatch => {
                    self.note_unmatched(ctx, field).await;
                    return Ok(());
                }
            },
            FieldKind::RadioGroup { radios } => {
                let options: Vec<_> = radios.iter().map(|r| r.option.clone()).collect();
                match match_option(&resolved.answer, &options) {
                    OptionMatch::Matched(option) => {
                        let Some(radio) = radios.iter().find(|r| &r.option == option) else {
                            return Ok(());
                        };
                        driver.click(radio.label_handle.unwrap_or(radio.handle)).await?
                    }
                    OptionMatch::NoMatch => {
                        self.note_unmatched(ctx, field).await;
                        return Ok(());
                    }
                }
            }
        }

        self.pacer.after_fill(driver).await;
        Ok(())
    }

    /// No answer known. Only question-shaped and duration labels are worth curating.
    async fn note_unanswered(&self, ctx: &JobContext, field: &Field) {
        if field.label.is_question() || is_duration_question(&field.label) {
            self.record_question(ctx, field).await;
        } else {
            debug!("No answer for '{}'", field.label);
        }
    }

    /// An answer exists but none of the offered choices fit it.
    async fn note_unmatched(&self, ctx: &JobContext, field: &Field) {
        if field.label.is_question() {
            self.record_question(ctx, field).await;
        } else {
            debug!("No option of '{}' matches its answer", field.label);
        }
    }

    async fn record_question(&self, ctx: &JobContext, field: &Field) {
        let options = field.options();
        if let Err(e) = self
            .questions
            .log(ctx, &field.label, field.answer_type(), options.as_deref())
            .await
        {
            warn!("Could not log question '{}': {}", field.label, e);
        }
    }
}
