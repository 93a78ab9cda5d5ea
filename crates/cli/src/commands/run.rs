//! Run Command

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use saucedemo_e2e::playwright::{Browser, PlaywrightFactory};
use saucedemo_e2e::probe::TargetProbe;
use saucedemo_e2e::retry::RetryPolicy;
use saucedemo_e2e::{ScenarioRunner, SuiteResult, TestOutcome, TestResult};

use super::SuiteArgs;
use crate::output::{print_info, print_list, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Cases to run at once, each in its own context
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Fail a case that runs longer than this
    #[arg(long)]
    pub case_timeout_secs: Option<u64>,

    /// Attempts per assertion read before it fails
    #[arg(long)]
    pub read_attempts: Option<u32>,

    /// Directory for test-results.json
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    /// Do not wait for the shop to answer before starting
    #[arg(long)]
    pub skip_preflight: bool,
}

/// One row of the results table
#[derive(Serialize)]
pub struct ResultDisplay {
    pub name: String,
    pub passed: bool,
    pub failed_step: Option<usize>,
    pub kind: Option<String>,
    pub reason: Option<String>,
    pub duration_ms: u64,
}

impl From<&TestResult> for ResultDisplay {
    fn from(result: &TestResult) -> Self {
        let failure = match &result.outcome {
            TestOutcome::Passed => None,
            TestOutcome::Failed(failure) => Some(failure),
        };
        Self {
            name: result.name.clone(),
            passed: failure.is_none(),
            failed_step: failure.and_then(|f| f.step_index),
            kind: failure.map(|f| f.kind.to_string()),
            reason: failure.map(|f| f.reason.clone()),
            duration_ms: result.duration_ms,
        }
    }
}

impl TableDisplay for ResultDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Case", "Passed", "Step", "Failure", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        let failure = match (&self.kind, &self.reason) {
            (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
            _ => String::new(),
        };
        vec![
            self.name.clone(),
            if self.passed { "✓" } else { "✗" }.to_string(),
            self.failed_step.map(|i| i.to_string()).unwrap_or_default(),
            failure,
            format!("{}ms", self.duration_ms),
        ]
    }
}

/// Run the selected cases; `Ok(false)` when any case failed
pub async fn execute(args: RunArgs, format: OutputFormat) -> Result<bool> {
    let (mut config, cases) = args.suite.load()?;
    if cases.is_empty() {
        bail!("no test cases selected");
    }

    if let Some(browser) = args.browser {
        config.playwright.browser = browser;
    }
    if args.headed {
        config.playwright.headless = false;
    }
    if let Some(concurrency) = args.concurrency {
        config.runner.concurrency = concurrency.max(1);
    }
    if let Some(secs) = args.case_timeout_secs {
        config.runner.case_timeout_ms = Some(Duration::from_secs(secs).as_millis() as u64);
    }
    if let Some(attempts) = args.read_attempts {
        config.runner.read_retry = RetryPolicy::with_attempts(attempts);
    }

    if !args.skip_preflight {
        TargetProbe::new(&config.fixture.base_url)
            .wait_reachable()
            .await
            .context("preflight check failed")?;
    }

    let factory = PlaywrightFactory::new(config.playwright.clone())?;
    let runner = ScenarioRunner::with_config(Arc::new(factory), config.runner.clone());
    let suite = runner.run_suite(&cases).await;

    let path = suite
        .write_json(&args.output)
        .with_context(|| format!("failed to write results to {}", args.output.display()))?;

    let rows: Vec<ResultDisplay> = suite.results.iter().map(ResultDisplay::from).collect();
    print_list(&rows, format);
    if format == OutputFormat::Table {
        print_summary(&suite);
        print_info(&format!("Results written to {}", path.display()));
    }

    Ok(suite.all_passed())
}

fn print_summary(suite: &SuiteResult) {
    let passed = format!("{} passed", suite.passed).green();
    let failed = if suite.failed > 0 {
        format!("{} failed", suite.failed).red()
    } else {
        format!("{} failed", suite.failed).normal()
    };
    println!(
        "{}, {} of {} ({} ms)",
        passed, failed, suite.total, suite.duration_ms
    );
}
