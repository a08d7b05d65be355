pub mod cdp;
pub mod driver;
pub mod inject;

pub use driver::HeadlessDriver;
