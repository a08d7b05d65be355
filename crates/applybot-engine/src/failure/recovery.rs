use super::FailureReport;
use crate::config::schema::{RecoveryConfig, RecoveryMode};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryDecision {
    Continue,
    Abort,
}

/// Decides how the batch proceeds after a failed application.
#[async_trait]
pub trait RecoveryPolicy: Send + Sync {
    async fn decide(&self, report: &FailureReport) -> RecoveryDecision;
}

/// Build the policy selected in the config. Operator input comes from stdin.
pub fn from_config(config: &RecoveryConfig) -> Box<dyn RecoveryPolicy> {
    with_input(config, BufReader::new(tokio::io::stdin()))
}

/// Build the policy selected in the config, reading operator answers from `input`.
pub fn with_input<R>(config: &RecoveryConfig, input: R) -> Box<dyn RecoveryPolicy>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    match config.mode {
        RecoveryMode::AutoContinue => Box::new(AutoContinue::new(Duration::from_millis(
            config.delay_ms,
        ))),
        RecoveryMode::WaitForOperator => Box::new(WaitForOperator::new(input)),
        RecoveryMode::Abort => Box::new(AbortBatch),
    }
}

/// Pause, then carry on with the next job.
pub struct AutoContinue {
    delay: Duration,
}

impl AutoContinue {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl RecoveryPolicy for AutoContinue {
    async fn decide(&self, _report: &FailureReport) -> RecoveryDecision {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        RecoveryDecision::Continue
    }
}

/// Block until the operator answers on `input`. An empty line continues; `q`/`quit`/`abort`
/// or end of input stops the batch.
pub struct WaitForOperator<R = BufReader<Stdin>> {
    input: Mutex<R>,
}

impl<R> WaitForOperator<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> RecoveryPolicy for WaitForOperator<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn decide(&self, report: &FailureReport) -> RecoveryDecision {
        info!(
            "Paused after failure on job {} ({}). Press Enter to continue or type 'q' to stop.",
            report.context.job_id, report.error
        );
        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            Ok(0) => RecoveryDecision::Abort,
            Ok(_) => match line.trim().to_ascii_lowercase().as_str() {
                "q" | "quit" | "abort" => RecoveryDecision::Abort,
                _ => RecoveryDecision::Continue,
            },
            Err(e) => {
                warn!("Could not read operator input: {}", e);
                RecoveryDecision::Abort
            }
        }
    }
}

/// Stop the batch at the first failure.
pub struct AbortBatch;

#[async_trait]
impl RecoveryPolicy for AbortBatch {
    async fn decide(&self, _report: &FailureReport) -> RecoveryDecision {
        RecoveryDecision::Abort
    }
}
