//! Configuration management for the dissemination engine.
//!
//! Provides hierarchical configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Main config file
//! 3. Node-specific cluster config
//! 4. `CONFIG_PATH` override
//! 5. Environment variables (highest priority)

mod cluster;
mod dissemination;
mod monitoring;
mod network;
mod retry;
pub use cluster::*;
pub use dissemination::*;
pub use monitoring::*;
pub use network::*;
pub use retry::*;

#[cfg(test)]
mod config_test;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Cluster topology and node identity
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Network communication parameters
    #[serde(default)]
    pub network: NetworkConfig,
    /// Push/pull dissemination parameters
    #[serde(default)]
    pub dissemination: DisseminationConfig,
    /// Metrics and monitoring settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl Settings {
    /// Load configuration from multiple sources with priority:
    /// 1. Base config file (`config/md-engine.toml`, optional)
    /// 2. Node-specific cluster config
    /// 3. `CONFIG_PATH` override
    /// 4. Environment variables (`MD__` prefixed)
    ///
    /// # Arguments
    /// * `cluster_path` - Optional path to node-specific cluster configuration
    pub fn load(cluster_path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder().add_source(File::with_name("config/md-engine").required(false));

        if let Some(custom_cluster) = cluster_path {
            config = config.add_source(File::with_name(custom_cluster).required(true));
        }

        if let Ok(path) = env::var("CONFIG_PATH") {
            config = config.add_source(File::with_name(&path).required(true));
        }

        // Environment variables (highest priority)
        config = config.add_source(
            Environment::with_prefix("MD")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = config.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.cluster.validate()?;
        self.network.validate()?;
        self.dissemination.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}
