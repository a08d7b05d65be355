pub mod config;
pub mod context;
pub mod driver;
pub mod failure;
pub mod knowledge;
pub mod logs;
pub mod navigation;
pub mod normalizer;
pub mod pacing;
pub mod stepper;

pub use applybot_common::error_mapping;
pub use applybot_common::protocol;
pub use driver::{DriverError, PageDriver, PageExt};
pub use normalizer::Label;
