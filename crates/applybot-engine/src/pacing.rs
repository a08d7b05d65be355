use crate::config::schema::PacingConfig;
use crate::driver::PageDriver;
use rand::Rng;
use std::time::Duration;

/// Human-paced delays between field interactions.
#[derive(Debug, Clone)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
    field_settle: Duration,
}

impl Pacer {
    pub fn new(config: &PacingConfig) -> Self {
        let (min_ms, max_ms) = if config.min_ms <= config.max_ms {
            (config.min_ms, config.max_ms)
        } else {
            (config.max_ms, config.min_ms)
        };
        Self {
            min_ms,
            max_ms,
            field_settle: Duration::from_millis(config.field_settle_ms),
        }
    }

    /// Uniformly random delay in `[min_ms, max_ms]`.
    pub fn human_delay(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }

    /// Pause after filling a field.
    pub async fn after_fill<D: PageDriver + ?Sized>(&self, driver: &mut D) {
        let delay = self.field_settle + self.human_delay();
        if !delay.is_zero() {
            driver.wait(delay).await;
        }
    }
}
