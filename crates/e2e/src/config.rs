//! Suite configuration file

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::E2eResult;
use crate::fixture::FixtureConfig;
use crate::playwright::PlaywrightConfig;
use crate::runner::RunnerConfig;

/// Everything needed to run the suite, usually loaded from `sauce-e2e.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub fixture: FixtureConfig,
    pub runner: RunnerConfig,
    pub playwright: PlaywrightConfig,
}

impl SuiteConfig {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}
