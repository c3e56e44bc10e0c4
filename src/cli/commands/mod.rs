//! CLI command implementations.

mod analyze;
mod batch;
mod config;

pub use analyze::cmd_analyze;
pub use batch::cmd_batch;
pub use config::cmd_config;

use super::helpers;
