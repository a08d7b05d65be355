use applybot_agent::{AGENT_JS, AGENT_PROBE};
use applybot_engine::DriverError;
use applybot_engine::error_mapping::into_result;
use applybot_engine::protocol::{DriverCommand, DriverData, DriverResponse};
use chromiumoxide::Page;
use chromiumoxide::js::EvaluationResult;
use std::time::Duration;

/// Bounds every evaluation; a dialog the handler missed would otherwise hang the page.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum retries for context errors during page navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Whether an error means the page's JS context is gone (navigation in progress).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_raw(page: &Page, expression: &str) -> Result<EvaluationResult, EvalError> {
    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(result)) => Ok(result),
    }
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    evaluate_raw(page, expression)
        .await?
        .into_value::<serde_json::Value>()
        .map_err(|e| EvalError::Other(format!("Failed to get result: {}", e)))
}

/// Load the agent unless the page already has it.
async fn ensure_agent(page: &Page) -> Result<(), EvalError> {
    let loaded = evaluate_with_timeout(page, AGENT_PROBE).await?;
    if loaded.as_bool() != Some(true) {
        tracing::debug!("Injecting page agent");
        evaluate_raw(page, AGENT_JS).await?;
    }
    Ok(())
}

/// Run one command through `window.ApplyBot.process`, re-injecting the agent after any
/// navigation that wiped it.
pub async fn execute_command(
    page: &Page,
    command: &DriverCommand,
) -> Result<DriverData, DriverError> {
    let expression = format!(
        "window.ApplyBot.process({})",
        serde_json::to_string(command)?
    );
    tracing::debug!("Agent command: {}", command.name());

    let mut last_error = None;
    for attempt in 0..MAX_CONTEXT_RETRIES {
        let result = match ensure_agent(page).await {
            Ok(()) => evaluate_with_timeout(page, &expression).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(value) => return into_result(serde_json::from_value::<DriverResponse>(value)?),
            Err(EvalError::Timeout) => {
                return Err(DriverError::TimeoutWithContext {
                    operation: format!("{} (page may be blocked by a dialog)", command.name()),
                });
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during {} (attempt {}/{}), retrying...",
                    command.name(),
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => {
                return Err(DriverError::ScriptError(err_str));
            }
        }
    }

    Err(DriverError::ScriptError(last_error.unwrap_or_else(|| {
        format!("{} failed after {} retries", command.name(), MAX_CONTEXT_RETRIES)
    })))
}
