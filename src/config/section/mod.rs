//! Configuration section definitions.

mod log;
mod response;
mod serve;

pub use log::LogConfig;
pub use response::{ContentTypeMode, ResponseConfig};
pub use serve::ServeConfig;
