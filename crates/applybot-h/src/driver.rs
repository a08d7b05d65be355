use crate::cdp::CdpClient;
use crate::inject::execute_command;
use applybot_engine::driver::NavigationResult;
use applybot_engine::protocol::{DriverCommand, DriverData};
use applybot_engine::{DriverError, PageDriver};
use async_trait::async_trait;
use tracing::info;

/// Chromium over the DevTools protocol.
pub struct HeadlessDriver {
    client: Option<CdpClient>,
    visible: bool,
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::new_with_visibility(false)
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    fn client(&self) -> Result<&CdpClient, DriverError> {
        self.client.as_ref().ok_or(DriverError::NotReady)
    }
}

impl Default for HeadlessDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for HeadlessDriver {
    async fn launch(&mut self) -> Result<(), DriverError> {
        info!("Launching Chromium...");
        let client = CdpClient::launch(self.visible)
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
        let page = &self.client()?.page;
        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        self.client()?
            .page
            .url()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn execute(&mut self, command: DriverCommand) -> Result<DriverData, DriverError> {
        execute_command(&self.client()?.page, &command).await
    }
}
