pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod platform;
pub mod port;
pub mod process;
pub mod report;
pub mod utils;

pub use error::{Error, Result};
pub use report::{PortReport, ProcessDetails, Status};
