//! The Easy Apply modal stepper.
//!
//! One [`FormStepper::process_modal`] call drives a single application modal from its first
//! step to submission, a dead end, or a validation failure:
//!
//! ```text
//! AwaitingStep -> FillingStep -> Advancing  -> AwaitingStep
//!                             -> Submitting -> Done
//!                             -> ValidationFailed
//!                             -> Done (no control)
//! ```
//!
//! Every step re-discovers its controls; no element handle survives a step transition.

pub mod fields;
mod fill;

pub use fields::{Field, FieldKind, FieldOrigin, Radio};

use crate::config::ApplyConfig;
use crate::config::schema::{Selectors, StepperConfig};
use crate::context::JobContext;
use crate::driver::{DriverError, PageDriver, PageExt};
use crate::failure::{FailureHandler, FailureReport, RecoveryDecision};
use crate::knowledge::KnowledgeResolver;
use crate::logs::QuestionLogger;
use crate::pacing::Pacer;
use applybot_common::protocol::ElementRef;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fallback message when validation errors are present but carry no text.
const GENERIC_VALIDATION_ERROR: &str = "Form validation failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    AwaitingStep,
    FillingStep,
    Advancing(ElementRef),
    Submitting(ElementRef),
    ValidationFailed(Vec<String>),
    Done(ModalOutcome),
}

/// Position within the current modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepperSession {
    pub step_index: usize,
    pub step_budget: usize,
}

impl StepperSession {
    pub fn new(step_budget: usize) -> Self {
        Self {
            step_index: 0,
            step_budget,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.step_index >= self.step_budget
    }
}

/// Result of filling one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFill {
    Clean,
    ValidationFailed(Vec<String>),
}

/// How a modal ended when it did not fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    Submitted { steps: usize },
    /// No submit, next or review control on the step.
    NoControl { steps: usize },
    /// Only a review control was offered and review is not treated as next.
    StoppedAtReview { steps: usize },
    BudgetExhausted { steps: usize },
}

impl ModalOutcome {
    pub fn steps(&self) -> usize {
        match *self {
            ModalOutcome::Submitted { steps }
            | ModalOutcome::NoControl { steps }
            | ModalOutcome::StoppedAtReview { steps }
            | ModalOutcome::BudgetExhausted { steps } => steps,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, ModalOutcome::Submitted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub step: usize,
    pub messages: Vec<String>,
    pub report: FailureReport,
    pub decision: RecoveryDecision,
}

#[derive(Debug, Error)]
pub enum StepperError {
    #[error("Validation failed on step {}: {}", .0.step, .0.messages.join("; "))]
    Validation(ValidationFailure),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl StepperError {
    /// The recovery decision, for validation failures.
    pub fn decision(&self) -> Option<RecoveryDecision> {
        match self {
            StepperError::Validation(failure) => Some(failure.decision),
            StepperError::Driver(_) => None,
        }
    }
}

/// The control that moves the modal on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Submit(ElementRef),
    Next(ElementRef),
    Review(ElementRef),
}

pub struct FormStepper {
    config: StepperConfig,
    selectors: Selectors,
    resolver: KnowledgeResolver,
    questions: QuestionLogger,
    failures: FailureHandler,
    pacer: Pacer,
}

impl FormStepper {
    pub fn new(
        config: &ApplyConfig,
        resolver: KnowledgeResolver,
        questions: QuestionLogger,
        failures: FailureHandler,
    ) -> Self {
        Self {
            config: config.stepper.clone(),
            selectors: config.selectors.clone(),
            resolver,
            questions,
            failures,
            pacer: Pacer::new(&config.pacing),
        }
    }

    pub fn resolver(&self) -> &KnowledgeResolver {
        &self.resolver
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Drive the open modal until it is submitted, runs out of controls or steps, or fails
    /// validation. Validation failures have already been logged and recovered from when the
    /// error is returned.
    pub async fn process_modal<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<ModalOutcome, StepperError> {
        let ctx = JobContext::capture(driver, &self.selectors).await;
        let mut session = StepperSession::new(self.config.max_steps);
        let mut state = StepState::AwaitingStep;
        info!("Processing application modal for job {}", ctx.job_id);

        loop {
            debug!("Step {}: {:?}", session.step_index, state);
            state = match state {
                StepState::AwaitingStep => {
                    if session.exhausted() {
                        warn!(
                            "Step budget of {} exhausted for job {}",
                            session.step_budget, ctx.job_id
                        );
                        StepState::Done(ModalOutcome::BudgetExhausted {
                            steps: session.step_index,
                        })
                    } else {
                        if session.step_index == 0 {
                            self.uncheck_follow_company(driver).await;
                        }
                        StepState::FillingStep
                    }
                }
                StepState::FillingStep => match self.fill_step(driver, &ctx).await? {
                    StepFill::ValidationFailed(messages) => StepState::ValidationFailed(messages),
                    StepFill::Clean => {
                        let steps = session.step_index + 1;
                        match self.detect_control(driver).await? {
                            Some(Control::Submit(handle)) => StepState::Submitting(handle),
                            Some(Control::Next(handle)) => StepState::Advancing(handle),
                            Some(Control::Review(handle)) if self.config.review_as_next => {
                                StepState::Advancing(handle)
                            }
                            Some(Control::Review(_)) => {
                                StepState::Done(ModalOutcome::StoppedAtReview { steps })
                            }
                            None => {
                                warn!("No way forward on step {} for job {}", steps, ctx.job_id);
                                StepState::Done(ModalOutcome::NoControl { steps })
                            }
                        }
                    }
                },
                StepState::Advancing(handle) => {
                    driver.click(handle).await?;
                    driver.wait(self.config.settle()).await;
                    session.step_index += 1;
                    StepState::AwaitingStep
                }
                StepState::Submitting(handle) => {
                    info!("Submitting application for job {}", ctx.job_id);
                    driver.click(handle).await?;
                    driver.wait(self.config.settle()).await;
                    self.dismiss_confirmation(driver).await;
                    StepState::Done(ModalOutcome::Submitted {
                        steps: session.step_index + 1,
                    })
                }
                StepState::ValidationFailed(messages) => {
                    let error = if messages.is_empty() {
                        GENERIC_VALIDATION_ERROR.to_string()
                    } else {
                        messages.join("; ")
                    };
                    let (report, decision) = self.failures.handle(driver, &error).await;
                    return Err(StepperError::Validation(ValidationFailure {
                        step: session.step_index + 1,
                        messages,
                        report,
                        decision,
                    }));
                }
                StepState::Done(outcome) => {
                    info!("Modal for job {} finished: {:?}", ctx.job_id, outcome);
                    return Ok(outcome);
                }
            };
        }
    }

    /// Fill every empty control on the current step, then report any validation errors shown.
    async fn fill_step<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        ctx: &JobContext,
    ) -> Result<StepFill, DriverError> {
        for field in fields::discover(driver, &self.selectors).await? {
            if let Err(e) = self.fill_field(driver, ctx, &field).await {
                warn!("Could not fill '{}': {}", field.label, e);
            }
        }

        let errors = driver.find_all(&self.selectors.validation_error).await?;
        if errors.is_empty() {
            return Ok(StepFill::Clean);
        }
        let mut messages = Vec::new();
        for handle in errors {
            let text = driver.text(handle).await.unwrap_or_default();
            let text = text.trim();
            if !text.is_empty() {
                messages.push(text.to_string());
            }
        }
        Ok(StepFill::ValidationFailed(messages))
    }

    async fn detect_control<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<Option<Control>, DriverError> {
        if let Some(handle) = driver.find(&self.selectors.submit_button).await? {
            return Ok(Some(Control::Submit(handle)));
        }
        if let Some(handle) = driver.find(&self.selectors.next_button).await? {
            return Ok(Some(Control::Next(handle)));
        }
        Ok(driver
            .find(&self.selectors.review_button)
            .await?
            .map(Control::Review))
    }

    /// Clear the "follow company" checkbox on the first step. Failures are not fatal.
    async fn uncheck_follow_company<D: PageDriver + ?Sized>(&self, driver: &mut D) {
        if let Err(e) = self.try_uncheck_follow_company(driver).await {
            warn!("Could not uncheck follow-company: {}", e);
        }
    }

    async fn try_uncheck_follow_company<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<(), DriverError> {
        let Some(checkbox) = driver.find(&self.selectors.follow_checkbox).await? else {
            return Ok(());
        };
        if !driver.is_checked(checkbox).await? {
            return Ok(());
        }

        // The checkbox itself is visually hidden; its label takes the click.
        let label = match driver.attribute(checkbox, "id").await? {
            Some(id) if !id.is_empty() => driver.find(&Selectors::label_for(&id)).await?,
            _ => None,
        };
        driver.click(label.unwrap_or(checkbox)).await?;
        debug!("Unchecked follow-company");
        Ok(())
    }

    async fn dismiss_confirmation<D: PageDriver + ?Sized>(&self, driver: &mut D) {
        let timeout = Duration::from_millis(self.config.confirmation_timeout_ms);
        match driver
            .wait_for(&self.selectors.confirmation_dismiss, timeout)
            .await
        {
            Ok(Some(handle)) => {
                if let Err(e) = driver.click(handle).await {
                    warn!("Could not dismiss confirmation: {}", e);
                }
            }
            Ok(None) => debug!("No confirmation dialog appeared"),
            Err(e) => warn!("Could not look for confirmation dialog: {}", e),
        }
    }
}
