//! Scenario runner: executes test cases against fresh page drivers

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::driver::{DriverFactory, PageDriver};
use crate::error::{DriverError, E2eError, E2eResult};
use crate::report::{FailureKind, StepFailure, StepRecord, SuiteResult, TestOutcome, TestResult};
use crate::retry::RetryPolicy;
use crate::spec::{CaseStep, Step, TestCase};

/// Configuration for the scenario runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Cases in flight at once; results keep input order
    pub concurrency: usize,

    /// Deadline for one case, context acquisition excluded
    pub case_timeout_ms: Option<u64>,

    /// Retry applied to assertion reads only
    pub read_retry: RetryPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            case_timeout_ms: None,
            read_retry: RetryPolicy::default(),
        }
    }
}

impl RunnerConfig {
    pub fn case_timeout(&self) -> Option<Duration> {
        self.case_timeout_ms.map(Duration::from_millis)
    }
}

/// Lifecycle of one case execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    NotStarted,
    Running,
    Passed,
    Failed,
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseState::NotStarted => "not_started",
            CaseState::Running => "running",
            CaseState::Passed => "passed",
            CaseState::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl CaseState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CaseState::Passed | CaseState::Failed)
    }

    /// `NotStarted -> Running -> {Passed, Failed}`; terminal states are final
    pub fn transition(self, to: CaseState) -> E2eResult<CaseState> {
        match (self, to) {
            (CaseState::NotStarted, CaseState::Running)
            | (CaseState::Running, CaseState::Passed)
            | (CaseState::Running, CaseState::Failed) => Ok(to),
            _ => Err(E2eError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

/// Failure of a single step, before it is attached to a step index
#[derive(Debug, Clone)]
struct StepError {
    kind: FailureKind,
    reason: String,
}

impl StepError {
    fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Classify a driver error raised by a mutating step
    fn from_action(err: DriverError) -> Self {
        match err {
            DriverError::Navigation { .. } => {
                Self::new(FailureKind::NavigationError, err.to_string())
            }
            DriverError::Protocol(_) | DriverError::Closed => {
                Self::new(FailureKind::ContextError, err.to_string())
            }
            _ => Self::new(FailureKind::ActionError, err.to_string()),
        }
    }

    /// Classify a driver error raised while reading for an assertion
    fn from_read(err: DriverError) -> Self {
        match err {
            DriverError::NotFound { .. } | DriverError::Timeout { .. } => {
                Self::new(FailureKind::ElementNotFound, err.to_string())
            }
            DriverError::Navigation { .. } => {
                Self::new(FailureKind::NavigationError, err.to_string())
            }
            DriverError::NotInteractable { .. } => {
                Self::new(FailureKind::ActionError, err.to_string())
            }
            DriverError::Protocol(_) | DriverError::Closed => {
                Self::new(FailureKind::ContextError, err.to_string())
            }
        }
    }

    fn not_found(selector: &str) -> Self {
        Self::new(
            FailureKind::ElementNotFound,
            format!("no element matches '{}'", selector),
        )
    }

    /// Whether re-reading the page could change the verdict
    fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::ElementNotFound | FailureKind::AssertionMismatch
        )
    }
}

/// Runs test cases, one fresh driver per case
pub struct ScenarioRunner {
    factory: Arc<dyn DriverFactory>,
    config: RunnerConfig,
}

impl ScenarioRunner {
    pub fn new(factory: Arc<dyn DriverFactory>) -> Self {
        Self::with_config(factory, RunnerConfig::default())
    }

    pub fn with_config(factory: Arc<dyn DriverFactory>, config: RunnerConfig) -> Self {
        Self { factory, config }
    }

    /// Run every case and return one result per case, in input order
    pub async fn run_suite(&self, cases: &[TestCase]) -> SuiteResult {
        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let concurrency = self.config.concurrency.max(1);

        info!("Running {} test case(s) with concurrency {}...", cases.len(), concurrency);

        let results: Vec<TestResult> = stream::iter(cases)
            .map(|case| self.run_case(case))
            .buffered(concurrency)
            .collect()
            .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = SuiteResult::from_results(started_at, duration_ms, results);

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        suite
    }

    /// Run a single case in its own browsing context
    pub async fn run_case(&self, case: &TestCase) -> TestResult {
        let start = Instant::now();
        let mut state = CaseState::NotStarted;
        advance(&mut state, CaseState::Running, &case.name);
        debug!("Running test: {}", case.name);

        let mut records = Vec::with_capacity(case.steps.len());

        let outcome = match self.factory.create().await {
            Ok(mut driver) => {
                let outcome = self.drive(driver.as_mut(), case, &mut records).await;
                if let Err(e) = driver.close().await {
                    warn!("Failed to close browser context for '{}': {}", case.name, e);
                }
                outcome
            }
            Err(e) => TestOutcome::Failed(StepFailure {
                step_index: None,
                kind: FailureKind::ContextError,
                reason: format!("could not acquire browser context: {}", e),
            }),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            TestOutcome::Passed => {
                advance(&mut state, CaseState::Passed, &case.name);
                info!("✓ {} ({} ms)", case.name, duration_ms);
            }
            TestOutcome::Failed(failure) => {
                advance(&mut state, CaseState::Failed, &case.name);
                error!("✗ {} - {}", case.name, failure);
            }
        }

        TestResult {
            name: case.name.clone(),
            outcome,
            duration_ms,
            steps: records,
        }
    }

    /// Execute the steps under the optional case deadline
    async fn drive(
        &self,
        driver: &mut dyn PageDriver,
        case: &TestCase,
        records: &mut Vec<StepRecord>,
    ) -> TestOutcome {
        let Some(limit) = self.config.case_timeout() else {
            return execute_steps(driver, case, &self.config.read_retry, records).await;
        };

        let run = execute_steps(driver, case, &self.config.read_retry, records);
        match tokio::time::timeout(limit, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let index = records.len();
                TestOutcome::Failed(StepFailure {
                    step_index: Some(index),
                    kind: FailureKind::Timeout,
                    reason: format!(
                        "case exceeded {} ms while running {}",
                        limit.as_millis(),
                        case.steps
                            .get(index)
                            .map(|s| s.step.label())
                            .unwrap_or_default()
                    ),
                })
            }
        }
    }
}

/// Run `cases` with default configuration
pub async fn run_suite(cases: &[TestCase], factory: Arc<dyn DriverFactory>) -> Vec<TestResult> {
    ScenarioRunner::new(factory).run_suite(cases).await.results
}

fn advance(state: &mut CaseState, to: CaseState, case: &str) {
    match state.transition(to) {
        Ok(next) => *state = next,
        Err(e) => error!("{}: {}", case, e),
    }
}

/// Execute steps strictly in order, stopping at the first failure
async fn execute_steps(
    driver: &mut dyn PageDriver,
    case: &TestCase,
    retry: &RetryPolicy,
    records: &mut Vec<StepRecord>,
) -> TestOutcome {
    for (index, case_step) in case.steps.iter().enumerate() {
        let label = case_step.step.label();
        let start = Instant::now();
        debug!("Executing step {}: {}", index, label);

        let (result, attempts) = execute_step(driver, &case_step.step, retry).await;

        records.push(StepRecord {
            index,
            label,
            success: result.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            attempts,
        });

        if let Err(err) = result {
            return TestOutcome::Failed(StepFailure {
                step_index: Some(index),
                kind: err.kind,
                reason: failure_reason(case_step, err.reason),
            });
        }
    }
    TestOutcome::Passed
}

fn failure_reason(case_step: &CaseStep, reason: String) -> String {
    if case_step.assumes.is_empty() {
        return reason;
    }
    let assumptions = case_step.assumes.join("; ");
    warn!("Failed step depends on external data: {}", assumptions);
    format!("{} (assumes: {})", reason, assumptions)
}

async fn execute_step(
    driver: &mut dyn PageDriver,
    step: &Step,
    retry: &RetryPolicy,
) -> (Result<(), StepError>, u32) {
    match step {
        Step::Navigate { url } => (
            driver
                .goto(url)
                .await
                .map_err(|e| StepError::new(FailureKind::NavigationError, e.to_string())),
            1,
        ),
        Step::Fill { selector, value } => (
            driver.fill(selector, value).await.map_err(StepError::from_action),
            1,
        ),
        Step::Click { selector } => (
            driver.click(selector).await.map_err(StepError::from_action),
            1,
        ),
        Step::SelectOption { selector, value } => (
            driver
                .select_option(selector, value)
                .await
                .map_err(StepError::from_action),
            1,
        ),
        _ => {
            let attempts = retry.attempts();
            let mut attempt = 1;
            loop {
                match check_assertion(driver, step).await {
                    Ok(()) => return (Ok(()), attempt),
                    Err(err) if attempt < attempts && err.is_retryable() => {
                        let delay = retry.backoff(attempt);
                        debug!(
                            "Assertion '{}' not yet satisfied ({}), retrying in {} ms",
                            step.label(),
                            err.reason,
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    Err(err) => return (Err(err), attempt),
                }
            }
        }
    }
}

/// Read the page once and evaluate an assertion step
async fn check_assertion(driver: &mut dyn PageDriver, step: &Step) -> Result<(), StepError> {
    match step {
        Step::AssertEquals { selector, expected } => {
            let text = read_text(driver, selector).await?;
            if text.trim() == expected {
                Ok(())
            } else {
                Err(StepError::new(
                    FailureKind::AssertionMismatch,
                    format!(
                        "text of '{}': expected '{}', found '{}'",
                        selector,
                        expected,
                        text.trim()
                    ),
                ))
            }
        }
        Step::AssertContains { selector, expected } => {
            let text = read_text(driver, selector).await?;
            if text.contains(expected.as_str()) {
                Ok(())
            } else {
                Err(StepError::new(
                    FailureKind::AssertionMismatch,
                    format!(
                        "text of '{}': expected to contain '{}', found '{}'",
                        selector,
                        expected,
                        text.trim()
                    ),
                ))
            }
        }
        Step::AssertExists { selector, expected } => {
            let found = driver.query(selector).await.map_err(StepError::from_read)?;
            match (found.is_some(), *expected) {
                (true, true) | (false, false) => Ok(()),
                (false, true) => Err(StepError::not_found(selector)),
                (true, false) => Err(StepError::new(
                    FailureKind::AssertionMismatch,
                    format!("expected no element to match '{}', found one", selector),
                )),
            }
        }
        Step::AssertCountGreaterThan { selector, threshold } => {
            let count = driver
                .query_all(selector)
                .await
                .map_err(StepError::from_read)?
                .len();
            if count > *threshold {
                Ok(())
            } else {
                Err(StepError::new(
                    FailureKind::AssertionMismatch,
                    format!(
                        "expected more than {} element(s) matching '{}', found {}",
                        threshold, selector, count
                    ),
                ))
            }
        }
        Step::Navigate { .. }
        | Step::Fill { .. }
        | Step::Click { .. }
        | Step::SelectOption { .. } => Ok(()),
    }
}

/// Text of the first element matching `selector`
async fn read_text(driver: &mut dyn PageDriver, selector: &str) -> Result<String, StepError> {
    driver
        .text_content(selector)
        .await
        .map_err(StepError::from_read)?
        .ok_or_else(|| StepError::not_found(selector))
}
