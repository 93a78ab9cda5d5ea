//! Check Command

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use saucedemo_e2e::probe::TargetProbe;

use super::load_config;
use crate::output::{print_error, print_success};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Suite configuration file (TOML)
    #[arg(short, long, default_value = "sauce-e2e.toml")]
    pub config: PathBuf,

    /// Shop to check
    #[arg(long, env = "SAUCE_E2E_BASE_URL")]
    pub base_url: Option<String>,

    /// Give up after this many seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

pub async fn execute(args: CheckArgs) -> Result<bool> {
    let config = load_config(&args.config, args.base_url.as_deref())?;
    let url = config.fixture.base_url;
    debug!("Checking {} (timeout {}s)", url, args.timeout_secs);

    let probe = TargetProbe::new(url.as_str()).timeout(Duration::from_secs(args.timeout_secs));
    match probe.wait_reachable().await {
        Ok(attempts) => {
            print_success(&format!("{} is reachable ({} attempt(s))", url, attempts));
            Ok(true)
        }
        Err(e) => {
            print_error(&e.to_string());
            Ok(false)
        }
    }
}
