//! `[log]` section configuration.
//!
//! ```toml
//! [log]
//! verbose = false   # Print debug diagnostics (dropped entries, coalescing)
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Print debug diagnostics.
    pub verbose: bool,
}
