//! CLI Commands

pub mod check;
pub mod list;
pub mod run;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use saucedemo_e2e::config::SuiteConfig;
use saucedemo_e2e::scenarios::sauce_demo_suite;
use saucedemo_e2e::TestCase;

/// Options selecting the configuration and the cases to work on
#[derive(Args, Debug, Clone)]
pub struct SuiteArgs {
    /// Suite configuration file (TOML); defaults apply when it is missing
    #[arg(short, long, default_value = "sauce-e2e.toml")]
    pub config: PathBuf,

    /// Directory of YAML cases to use instead of the built-in scenarios
    #[arg(long)]
    pub cases: Option<PathBuf>,

    /// Only cases carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Only cases whose name contains this text (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Shop under test
    #[arg(long, env = "SAUCE_E2E_BASE_URL")]
    pub base_url: Option<String>,
}

impl SuiteArgs {
    /// Load the configuration and build the selected cases
    pub fn load(&self) -> Result<(SuiteConfig, Vec<TestCase>)> {
        let config = load_config(&self.config, self.base_url.as_deref())?;

        let cases = match &self.cases {
            Some(dir) => TestCase::load_all(dir)
                .with_context(|| format!("failed to load cases from {}", dir.display()))?,
            None => sauce_demo_suite(&config.fixture),
        };

        Ok((
            config,
            select(cases, self.tag.as_deref(), self.name.as_deref()),
        ))
    }
}

/// Load `path` and apply a base URL override
pub fn load_config(path: &Path, base_url: Option<&str>) -> Result<SuiteConfig> {
    let mut config = SuiteConfig::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    if let Some(url) = base_url {
        config.fixture.base_url = url.to_string();
    }
    Ok(config)
}

fn select(cases: Vec<TestCase>, tag: Option<&str>, name: Option<&str>) -> Vec<TestCase> {
    let tagged = match tag {
        Some(tag) => TestCase::filter_by_tag(&cases, tag),
        None => cases.iter().collect(),
    };
    let name = name.map(str::to_lowercase);
    tagged
        .into_iter()
        .filter(|case| {
            name.as_deref()
                .map_or(true, |n| case.name.to_lowercase().contains(n))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: PathBuf) -> SuiteArgs {
        SuiteArgs {
            config,
            cases: None,
            tag: None,
            name: None,
            base_url: None,
        }
    }

    #[test]
    fn test_builtin_suite_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let (config, cases) = args(dir.path().join("missing.toml")).load().unwrap();
        assert_eq!(config, SuiteConfig::default());
        assert_eq!(cases.len(), 10);
    }

    #[test]
    fn test_filters_by_tag_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut selection = args(dir.path().join("missing.toml"));
        selection.tag = Some("cart".to_string());
        let (_, cases) = selection.load().unwrap();
        assert_eq!(cases.len(), 3);

        selection.name = Some("REMOVING".to_string());
        let (_, cases) = selection.load().unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn test_base_url_override_reaches_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sauce-e2e.toml");
        std::fs::write(&path, "[fixture]\nbase_url = \"http://from-file.local/\"\n").unwrap();

        let (config, cases) = args(path.clone()).load().unwrap();
        assert_eq!(config.fixture.base_url, "http://from-file.local/");
        assert!(cases[0].steps[0].step.label().contains("from-file.local"));

        let mut selection = args(path);
        selection.base_url = Some("http://override.local/".to_string());
        let (config, _) = selection.load().unwrap();
        assert_eq!(config.fixture.base_url, "http://override.local/");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[runner\nconcurrency = ").unwrap();
        assert!(args(path).load().is_err());
    }
}
