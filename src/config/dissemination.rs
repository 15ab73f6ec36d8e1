use serde::Deserialize;

use crate::BackoffPolicy;
use crate::Error;
use crate::Result;

#[derive(Debug, Deserialize, Clone)]
pub struct DisseminationConfig {
    /// Period of the leadership push timer in milliseconds. Failed
    /// destinations are retried on the next tick, so this is also the retry
    /// cadence.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of independent dissemination instances, each owning a
    /// non-overlapping slice of local partitions.
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Backoff applied between failed startup metadata-pull attempts.
    #[serde(default)]
    pub bootstrap: BackoffPolicy,
}

impl Default for DisseminationConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            shards: default_shards(),
            bootstrap: BackoffPolicy::default(),
        }
    }
}

impl DisseminationConfig {
    /// Validates dissemination configuration consistency
    /// # Errors
    /// Returns `Error::InvalidConfig` if any configuration rules are violated
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(Error::InvalidConfig("interval_ms cannot be 0".into()));
        }
        if self.shards == 0 {
            return Err(Error::InvalidConfig("shards cannot be 0".into()));
        }
        self.bootstrap.validate()?;
        Ok(())
    }
}

fn default_interval_ms() -> u64 {
    3000
}
fn default_shards() -> usize {
    1
}
