//! Error types for the scenario runner

use thiserror::Error;

/// Errors raised by a [`PageDriver`](crate::driver::PageDriver) operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("no element matches '{selector}'")]
    NotFound { selector: String },

    #[error("element '{selector}' is not interactable: {reason}")]
    NotInteractable { selector: String, reason: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout_ms} ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("driver protocol error: {0}")]
    Protocol(String),

    #[error("browser context already closed")]
    Closed,
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Harness-level errors (suite loading, driver setup, reporting)
#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Test case parse error: {0}")]
    SpecParse(String),

    #[error("Duplicate test case name: {0}")]
    DuplicateCase(String),

    #[error("Case '{case}' step {step_index} requires '{precondition}' which no earlier step provides")]
    UnmetPrecondition {
        case: String,
        step_index: usize,
        precondition: String,
    },

    #[error("Target {url} unreachable after {attempts} attempts")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("Invalid case state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
