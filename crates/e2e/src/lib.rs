//! Sauce Demo E2E Scenario Runner
//!
//! This crate provides a Rust-controlled end-to-end suite for the Sauce Demo
//! shop that:
//! - Models test cases as declarative, ordered steps (Rust builders or YAML)
//! - Runs each case against a fresh, isolated browsing context
//! - Drives Playwright through a long-lived bridge process
//! - Reports one pass/fail verdict per case with the failing step
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Scenario Runner (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── run_suite(cases) -> SuiteResult                      │
//! │    └── run_case(case) -> TestResult                         │
//! │          ├── DriverFactory::create() -> PageDriver          │
//! │          ├── steps, fail-fast, optional deadline            │
//! │          └── PageDriver::close() on every exit path         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestCase                                                   │
//! │    ├── name, description, tags                              │
//! │    └── steps: [CaseStep { step, requires, provides, ... }]  │
//! │          ├── navigate { url }                               │
//! │          ├── fill { selector, value }                       │
//! │          ├── click { selector }                             │
//! │          ├── select_option { selector, value }              │
//! │          ├── assert_equals / assert_contains                │
//! │          ├── assert_exists { selector, expected }           │
//! │          └── assert_count_greater_than { selector, n }      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod fixture;
pub mod playwright;
pub mod probe;
pub mod report;
pub mod retry;
pub mod runner;
pub mod scenarios;
pub mod spec;

pub use driver::{DriverFactory, ElementHandle, PageDriver};
pub use error::{DriverError, DriverResult, E2eError, E2eResult};
pub use fixture::FixtureConfig;
pub use report::{FailureKind, StepFailure, SuiteResult, TestOutcome, TestResult};
pub use runner::{run_suite, RunnerConfig, ScenarioRunner};
pub use spec::{CaseStep, Precondition, Step, TestCase};
