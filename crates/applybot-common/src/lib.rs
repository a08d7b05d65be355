pub mod error;
pub mod error_mapping;
pub mod protocol;

pub use error::DriverError;
pub use protocol::{DriverCommand, DriverData, DriverResponse, ElementRef};
