//! Per-case and per-suite results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::E2eResult;

/// Why a case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A fill/click/select target was missing or not interactable
    ActionError,
    /// An assertion's selector matched nothing
    ElementNotFound,
    /// The element was there but did not satisfy the assertion
    AssertionMismatch,
    /// The page failed to load
    NavigationError,
    /// The case exceeded its deadline
    Timeout,
    /// No browsing context could be acquired, or it broke mid-case
    ContextError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ActionError => "action error",
            FailureKind::ElementNotFound => "element not found",
            FailureKind::AssertionMismatch => "assertion mismatch",
            FailureKind::NavigationError => "navigation error",
            FailureKind::Timeout => "timeout",
            FailureKind::ContextError => "context error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// Index of the failing step; `None` when no step was running
    pub step_index: Option<usize>,
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step_index {
            Some(index) => write!(f, "step {}: {}: {}", index, self.kind, self.reason),
            None => write!(f, "{}: {}", self.kind, self.reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed(StepFailure),
}

/// Record of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub label: String,
    pub success: bool,
    pub duration_ms: u64,
    /// Read attempts made; always 1 for actions
    pub attempts: u32,
}

/// Result of running a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub outcome: TestOutcome,
    pub duration_ms: u64,
    pub steps: Vec<StepRecord>,
}

impl TestResult {
    pub fn success(&self) -> bool {
        matches!(self.outcome, TestOutcome::Passed)
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match &self.outcome {
            TestOutcome::Passed => None,
            TestOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Result of running a suite, in case order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl SuiteResult {
    pub fn from_results(
        started_at: DateTime<Utc>,
        duration_ms: u64,
        results: Vec<TestResult>,
    ) -> Self {
        let passed = results.iter().filter(|r| r.success()).count();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write results to `<dir>/test-results.json`
    pub fn write_json(&self, dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join("test-results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
