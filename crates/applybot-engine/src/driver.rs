use applybot_common::protocol::{DriverCommand, DriverData, ElementRef};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub use applybot_common::error::DriverError;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// The PageDriver trait is the unified interface every browser backend implements.
///
/// All page-mutating calls take `&mut self`, so two interactions can never be in flight at the
/// same time against one page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Launch the driver (start browser, connect to WebDriver, etc.)
    async fn launch(&mut self) -> Result<(), DriverError>;

    /// Close the driver and cleanup resources.
    async fn close(&mut self) -> Result<(), DriverError>;

    /// Check if the driver is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, DriverError>;

    /// URL of the page currently loaded.
    async fn current_url(&mut self) -> Result<String, DriverError>;

    /// Execute one command in the in-page agent.
    async fn execute(&mut self, command: DriverCommand) -> Result<DriverData, DriverError>;

    /// Pause between interactions.
    async fn wait(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

const WAIT_FOR_POLL: Duration = Duration::from_millis(250);

/// Typed helpers over [`PageDriver::execute`].
#[async_trait]
pub trait PageExt: PageDriver {
    /// First element matching `selector`, if any.
    async fn find(&mut self, selector: &str) -> Result<Option<ElementRef>, DriverError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// Every element matching `selector`, in document order.
    async fn find_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        let command = DriverCommand::Find {
            selector: selector.to_string(),
        };
        expect_handles(self.execute(command).await?, "find")
    }

    async fn find_within(
        &mut self,
        parent: ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, DriverError> {
        let command = DriverCommand::FindWithin {
            parent,
            selector: selector.to_string(),
        };
        expect_handles(self.execute(command).await?, "find_within")
    }

    /// First element matching `selector` whose text contains `text` (case-insensitive).
    async fn find_by_text(
        &mut self,
        selector: &str,
        text: &str,
    ) -> Result<Option<ElementRef>, DriverError> {
        let needle = text.to_lowercase();
        for handle in self.find_all(selector).await? {
            let content = self.text(handle).await?;
            if content.to_lowercase().contains(&needle) {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    async fn attribute(
        &mut self,
        id: ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let command = DriverCommand::Attribute {
            id,
            name: name.to_string(),
        };
        expect_text(self.execute(command).await?, "attribute")
    }

    /// Text content of an element; missing text reads as empty.
    async fn text(&mut self, id: ElementRef) -> Result<String, DriverError> {
        let data = self.execute(DriverCommand::Text { id }).await?;
        Ok(expect_text(data, "text")?.unwrap_or_default())
    }

    async fn value(&mut self, id: ElementRef) -> Result<String, DriverError> {
        let data = self.execute(DriverCommand::Value { id }).await?;
        Ok(expect_text(data, "value")?.unwrap_or_default())
    }

    async fn is_checked(&mut self, id: ElementRef) -> Result<bool, DriverError> {
        match self.execute(DriverCommand::Checked { id }).await? {
            DriverData::Flag { value } => Ok(value),
            other => Err(unexpected("checked", &other)),
        }
    }

    async fn fill(&mut self, id: ElementRef, value: &str) -> Result<(), DriverError> {
        let command = DriverCommand::Fill {
            id,
            value: value.to_string(),
        };
        self.execute(command).await.map(|_| ())
    }

    async fn click(&mut self, id: ElementRef) -> Result<(), DriverError> {
        self.execute(DriverCommand::Click { id }).await.map(|_| ())
    }

    async fn select_option(&mut self, id: ElementRef, value: &str) -> Result<(), DriverError> {
        let command = DriverCommand::Select {
            id,
            value: value.to_string(),
        };
        self.execute(command).await.map(|_| ())
    }

    async fn scroll_to_bottom(&mut self, id: ElementRef) -> Result<(), DriverError> {
        self.execute(DriverCommand::ScrollToBottom { id })
            .await
            .map(|_| ())
    }

    /// Poll until an element matching `selector` exists or `timeout` elapses.
    async fn wait_for(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<ElementRef>, DriverError> {
        let mut waited = Duration::ZERO;
        loop {
            if let Some(handle) = self.find(selector).await? {
                return Ok(Some(handle));
            }
            if waited >= timeout {
                debug!("Gave up waiting for {} after {:?}", selector, waited);
                return Ok(None);
            }
            let step = WAIT_FOR_POLL.min(timeout - waited);
            self.wait(step).await;
            waited += step;
        }
    }
}

impl<T: PageDriver + ?Sized> PageExt for T {}

fn expect_handles(data: DriverData, command: &str) -> Result<Vec<ElementRef>, DriverError> {
    match data {
        DriverData::Handles { handles } => Ok(handles),
        other => Err(unexpected(command, &other)),
    }
}

fn expect_text(data: DriverData, command: &str) -> Result<Option<String>, DriverError> {
    match data {
        DriverData::Text { value } => Ok(value),
        other => Err(unexpected(command, &other)),
    }
}

fn unexpected(command: &str, data: &DriverData) -> DriverError {
    DriverError::UnexpectedResponse {
        command: command.to_string(),
        got: format!("{:?}", data),
    }
}
