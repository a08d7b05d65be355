//! Walks the job search results: loads every card, opens each Easy Apply modal and hands it to
//! the [`FormStepper`], then pages on.

use crate::config::ApplyConfig;
use crate::config::schema::{NavigationConfig, Selectors};
use crate::context::JobContext;
use crate::driver::{DriverError, PageDriver, PageExt};
use crate::failure::RecoveryDecision;
use crate::logs::{JsonLinesFile, SuccessLogEntry, timestamp};
use crate::stepper::{FormStepper, ModalOutcome, StepperError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Counts for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub pages: usize,
    pub visited: usize,
    pub applied: usize,
    pub failed: usize,
    /// Cards without an Easy Apply button.
    pub skipped: usize,
    /// Modals left without submitting (no control, review stop, budget).
    pub incomplete: usize,
    pub errors: usize,
    pub aborted: bool,
}

/// What happened to one job card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Applied { steps: usize },
    Skipped,
    Incomplete(ModalOutcome),
    Failed(RecoveryDecision),
    Errored(String),
}

pub struct JobBoard {
    stepper: FormStepper,
    navigation: NavigationConfig,
    settle: Duration,
    selectors: Selectors,
    applied: JsonLinesFile<SuccessLogEntry>,
}

impl JobBoard {
    pub fn new(config: &ApplyConfig, stepper: FormStepper) -> Self {
        Self {
            stepper,
            navigation: config.navigation.clone(),
            settle: config.stepper.settle(),
            selectors: config.selectors.clone(),
            applied: JsonLinesFile::new(config.logs.success_log.clone()),
        }
    }

    /// Apply to every Easy Apply job on the loaded results page and the pages after it.
    pub async fn run<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<BatchReport, NavigationError> {
        let mut report = BatchReport::default();

        while report.pages < self.navigation.max_pages {
            report.pages += 1;
            info!("Processing results page {}", report.pages);
            self.process_page(driver, &mut report).await?;
            if report.aborted {
                warn!("Batch aborted by recovery policy");
                break;
            }
            if report.pages == self.navigation.max_pages {
                break;
            }
            if !self.next_page(driver).await? {
                debug!("No further results pages");
                break;
            }
        }

        info!(
            "Batch finished: {} applied, {} failed, {} skipped, {} incomplete, {} errors over {} pages",
            report.applied,
            report.failed,
            report.skipped,
            report.incomplete,
            report.errors,
            report.pages
        );
        Ok(report)
    }

    async fn process_page<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        report: &mut BatchReport,
    ) -> Result<(), NavigationError> {
        let total = self.load_all_cards(driver).await?;
        info!("Found {} job cards", total);

        for index in 0..total {
            // Clicking a card re-renders the list; handles from the previous pass are stale.
            let cards = driver.find_all(&self.selectors.job_card).await?;
            let Some(card) = cards.get(index).copied() else {
                warn!("Job card {} disappeared from the list", index);
                break;
            };

            report.visited += 1;
            driver.click(card).await?;
            driver
                .wait(Duration::from_millis(self.navigation.card_settle_ms))
                .await;

            match self.apply_to_current(driver).await? {
                JobOutcome::Applied { .. } => report.applied += 1,
                JobOutcome::Skipped => report.skipped += 1,
                JobOutcome::Incomplete(_) => report.incomplete += 1,
                JobOutcome::Errored(_) => report.errors += 1,
                JobOutcome::Failed(decision) => {
                    report.failed += 1;
                    if decision == RecoveryDecision::Abort {
                        report.aborted = true;
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Open the Easy Apply modal of the selected job, if it has one, and drive it.
    pub async fn apply_to_current<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<JobOutcome, NavigationError> {
        let Some(button) = driver
            .find_by_text(&self.selectors.easy_apply_button, &self.selectors.easy_apply_text)
            .await?
        else {
            debug!("No Easy Apply button on this job");
            return Ok(JobOutcome::Skipped);
        };
        let ctx = JobContext::capture(driver, &self.selectors).await;
        driver.click(button).await?;
        driver.wait(self.settle).await;

        match self.stepper.process_modal(driver).await {
            Ok(ModalOutcome::Submitted { steps }) => {
                self.record_success(&ctx, steps).await;
                Ok(JobOutcome::Applied { steps })
            }
            Ok(outcome) => {
                info!("Leaving job {} unsubmitted: {:?}", ctx.job_id, outcome);
                self.discard_modal(driver).await;
                Ok(JobOutcome::Incomplete(outcome))
            }
            Err(StepperError::Validation(failure)) => Ok(JobOutcome::Failed(failure.decision)),
            Err(StepperError::Driver(e)) => {
                warn!("Driver error on job {}: {}", ctx.job_id, e);
                self.discard_modal(driver).await;
                Ok(JobOutcome::Errored(e.to_string()))
            }
        }
    }

    /// Scroll the result list until the card count stops growing. Returns the final count.
    async fn load_all_cards<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<usize, DriverError> {
        let mut count = driver.find_all(&self.selectors.job_list_item).await?.len();
        let Some(list) = driver.find(&self.selectors.job_list).await? else {
            return Ok(driver.find_all(&self.selectors.job_card).await?.len());
        };

        for _ in 0..self.navigation.max_scrolls {
            driver.scroll_to_bottom(list).await?;
            driver
                .wait(Duration::from_millis(self.navigation.scroll_wait_ms))
                .await;
            let loaded = driver.find_all(&self.selectors.job_list_item).await?.len();
            if loaded <= count {
                break;
            }
            count = loaded;
        }
        Ok(driver.find_all(&self.selectors.job_card).await?.len())
    }

    async fn next_page<D: PageDriver + ?Sized>(&self, driver: &mut D) -> Result<bool, DriverError> {
        let Some(next) = driver.find(&self.selectors.next_page).await? else {
            return Ok(false);
        };
        driver.click(next).await?;
        driver.wait(self.settle).await;
        Ok(true)
    }

    /// Close an abandoned modal and discard its draft. Best effort.
    async fn discard_modal<D: PageDriver + ?Sized>(&self, driver: &mut D) {
        if let Err(e) = self.try_discard_modal(driver).await {
            warn!("Could not discard modal: {}", e);
        }
    }

    async fn try_discard_modal<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<(), DriverError> {
        let Some(dismiss) = driver.find(&self.selectors.modal_dismiss).await? else {
            return Ok(());
        };
        driver.click(dismiss).await?;
        driver.wait(self.settle).await;
        if let Some(discard) = driver
            .find_by_text(&self.selectors.dialog_button, &self.selectors.discard_text)
            .await?
        {
            driver.click(discard).await?;
            driver.wait(self.settle).await;
        }
        Ok(())
    }

    async fn record_success(&self, ctx: &JobContext, steps: usize) {
        let entry = SuccessLogEntry {
            job_id: ctx.job_id.clone(),
            url: ctx.url.clone(),
            steps,
            timestamp: timestamp(),
        };
        match self.applied.append(&entry).await {
            Ok(()) => info!("Applied to job {} in {} steps", ctx.job_id, steps),
            Err(e) => warn!(
                "Could not write success log {}: {}",
                self.applied.path().display(),
                e
            ),
        }
    }
}
