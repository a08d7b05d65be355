//! Validation-failure handling: record the failure, leave the modal with progress saved, and
//! ask the configured recovery policy whether the batch should go on.

pub mod recovery;

pub use recovery::{AbortBatch, AutoContinue, RecoveryDecision, RecoveryPolicy, WaitForOperator};

use crate::config::schema::Selectors;
use crate::context::JobContext;
use crate::driver::{DriverError, PageDriver, PageExt};
use crate::logs::{FailureLogEntry, JsonLinesFile, timestamp};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// What went wrong, as handed to the recovery policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub context: JobContext,
    pub error: String,
}

pub struct FailureHandler {
    log: JsonLinesFile<FailureLogEntry>,
    selectors: Selectors,
    policy: Box<dyn RecoveryPolicy>,
    settle: Duration,
}

impl FailureHandler {
    pub fn new(
        log_path: impl Into<PathBuf>,
        selectors: Selectors,
        policy: Box<dyn RecoveryPolicy>,
        settle: Duration,
    ) -> Self {
        Self {
            log: JsonLinesFile::new(log_path),
            selectors,
            policy,
            settle,
        }
    }

    /// Best effort: every internal error is logged and swallowed.
    pub async fn handle<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        error: &str,
    ) -> (FailureReport, RecoveryDecision) {
        let context = JobContext::capture(driver, &self.selectors).await;
        warn!("Application for job {} failed: {}", context.job_id, error);

        let entry = FailureLogEntry {
            job_id: context.job_id.clone(),
            url: context.url.clone(),
            error: error.to_string(),
            timestamp: timestamp(),
        };
        if let Err(e) = self.log.append(&entry).await {
            warn!("Could not write failure log {}: {}", self.log.path().display(), e);
        }

        if let Err(e) = self.dismiss_and_save(driver).await {
            warn!("Recovery after failure did not complete: {}", e);
        }

        let report = FailureReport {
            context,
            error: error.to_string(),
        };
        let decision = self.policy.decide(&report).await;
        info!("Recovery decision for job {}: {:?}", report.context.job_id, decision);
        (report, decision)
    }

    async fn dismiss_and_save<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
    ) -> Result<(), DriverError> {
        let Some(dismiss) = driver.find(&self.selectors.modal_dismiss).await? else {
            warn!("No dismiss control found on the failed modal");
            return Ok(());
        };
        driver.click(dismiss).await?;
        driver.wait(self.settle).await;

        if let Some(save) = driver
            .find_by_text(&self.selectors.dialog_button, &self.selectors.save_text)
            .await?
        {
            info!("Saving partially completed application");
            driver.click(save).await?;
            driver.wait(self.settle).await;
        }
        Ok(())
    }
}
