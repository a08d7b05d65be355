use crate::config::schema::Selectors;
use crate::driver::{PageDriver, PageExt};
use tracing::warn;

pub const UNKNOWN_JOB: &str = "unknown";

/// The job a modal session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    pub job_id: String,
    pub url: String,
}

impl JobContext {
    pub fn new(job_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            url: url.into(),
        }
    }

    /// Read the active job card's id and the current URL. Never fails: unreadable parts fall
    /// back to `"unknown"` and an empty URL.
    pub async fn capture<D: PageDriver + ?Sized>(driver: &mut D, selectors: &Selectors) -> Self {
        let job_id = match read_job_id(driver, selectors).await {
            Ok(Some(id)) if !id.trim().is_empty() => id.trim().to_string(),
            Ok(_) => UNKNOWN_JOB.to_string(),
            Err(e) => {
                warn!("Could not read active job id: {}", e);
                UNKNOWN_JOB.to_string()
            }
        };
        let url = match driver.current_url().await {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not read current URL: {}", e);
                String::new()
            }
        };
        Self { job_id, url }
    }
}

async fn read_job_id<D: PageDriver + ?Sized>(
    driver: &mut D,
    selectors: &Selectors,
) -> Result<Option<String>, crate::driver::DriverError> {
    match driver.find(&selectors.active_job_card).await? {
        Some(card) => driver.attribute(card, &selectors.job_id_attribute).await,
        None => Ok(None),
    }
}
