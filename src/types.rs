//! Configuration for the pipeline executor

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Configuration for a [`Pipeline`](crate::executor::Pipeline) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of detached branches executing concurrently. Branches
    /// beyond this width are admitted in spawn order as slots free up.
    pub max_concurrent_branches: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_branches: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrently executing branches.
    pub fn with_max_concurrent_branches(mut self, value: usize) -> ConfigResult<Self> {
        if value == 0 {
            return Err(ConfigError::InvalidMaxConcurrentBranches { value });
        }
        self.max_concurrent_branches = value;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_concurrent_branches == 0 {
            return Err(ConfigError::InvalidMaxConcurrentBranches {
                value: self.max_concurrent_branches,
            });
        }
        Ok(())
    }
}
