use crate::webdriver::WebDriverClient;
use applybot_agent::{AGENT_JS, AGENT_PROBE};
use applybot_engine::driver::NavigationResult;
use applybot_engine::error_mapping::into_result;
use applybot_engine::protocol::{DriverCommand, DriverData, DriverResponse};
use applybot_engine::{DriverError, PageDriver};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(200);

const EXEC_SCRIPT: &str = r#"
    const command = arguments[0];
    return window.ApplyBot.process(command);
"#;

/// Any browser reachable through a WebDriver endpoint (chromedriver, geckodriver, ...).
pub struct RemoteDriver {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    capabilities: Option<serde_json::Map<String, serde_json::Value>>,
}

impl RemoteDriver {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            capabilities: None,
        }
    }

    pub fn with_capabilities(
        mut self,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    fn client(&self) -> Result<&WebDriverClient, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }
}

#[async_trait]
impl PageDriver for RemoteDriver {
    async fn launch(&mut self) -> Result<(), DriverError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let client = WebDriverClient::connect(&self.webdriver_url, self.capabilities.clone())
            .await
            .map_err(|e| DriverError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| DriverError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError> {
        let client = &self.client()?.client;
        info!("Navigating to: {}", url);
        client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        self.client()?
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn execute(&mut self, command: DriverCommand) -> Result<DriverData, DriverError> {
        let client = &self.client()?.client;
        let args = serde_json::to_value(&command)?;

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                warn!("Retrying {} (attempt {})...", command.name(), attempt);
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let probe = format!("return {};", AGENT_PROBE);
            let injected = match client.execute(&probe, vec![]).await {
                Ok(value) => value.as_bool().unwrap_or(false),
                Err(_) => false,
            };
            if !injected {
                info!("Injecting page agent...");
                if let Err(e) = client.execute(AGENT_JS, vec![]).await {
                    last_error = Some(DriverError::ScriptError(format!(
                        "Failed to inject agent: {}",
                        e
                    )));
                    continue;
                }
            }

            match client.execute(EXEC_SCRIPT, vec![args.clone()]).await {
                Ok(value) => return decode_result(&command, value),
                Err(e) => {
                    last_error = Some(DriverError::ScriptError(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DriverError::ScriptError(format!("{} failed after retries", command.name()))
        }))
    }
}

/// A click that navigates can tear the context down before the agent answers, leaving a
/// `null` result; that still counts as done.
fn decode_result(
    command: &DriverCommand,
    value: serde_json::Value,
) -> Result<DriverData, DriverError> {
    if value.is_null() {
        return match command {
            DriverCommand::Click { .. } => {
                info!("Agent returned null for click, treating as done");
                Ok(DriverData::Done)
            }
            other => Err(DriverError::UnexpectedResponse {
                command: other.name().to_string(),
                got: "null".into(),
            }),
        };
    }
    into_result(serde_json::from_value::<DriverResponse>(value)?)
}
