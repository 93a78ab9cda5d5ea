//! Declarative test case model
//!
//! A [`TestCase`] is an ordered list of [`CaseStep`]s. Each step wraps one
//! [`Step`] (an action or an assertion) together with ordering metadata:
//! the page conditions it needs, the conditions it establishes, and any
//! assumptions it makes about remote data the suite does not control.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete test case, constructed once and never mutated while running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique name within a suite
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<CaseStep>,
}

/// One atomic action or assertion against the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Load a URL
    Navigate { url: String },

    /// Replace the value of an input field
    Fill { selector: String, value: String },

    /// Click an element
    Click { selector: String },

    /// Choose an option of a dropdown by value
    SelectOption { selector: String, value: String },

    /// Trimmed text of the first match equals `expected`
    AssertEquals { selector: String, expected: String },

    /// Text of the first match contains `expected`
    AssertContains { selector: String, expected: String },

    /// Selector matches at least one element (`expected: true`) or none
    AssertExists {
        selector: String,
        #[serde(default = "default_true")]
        expected: bool,
    },

    /// More than `threshold` elements match
    AssertCountGreaterThan { selector: String, threshold: usize },
}

fn default_true() -> bool {
    true
}

/// A named page condition established by one step and needed by a later one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Precondition(String);

impl Precondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Precondition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A step plus its ordering metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStep {
    #[serde(flatten)]
    pub step: Step,

    /// Conditions an earlier step of the same case must provide
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Precondition>,

    /// Conditions this step establishes once it succeeds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Precondition>,

    /// Assumptions about remote data (catalog order, prices) that may drift
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumes: Vec<String>,
}

impl From<Step> for CaseStep {
    fn from(step: Step) -> Self {
        Self {
            step,
            requires: Vec::new(),
            provides: Vec::new(),
            assumes: Vec::new(),
        }
    }
}

impl CaseStep {
    pub fn requires(mut self, condition: impl Into<Precondition>) -> Self {
        self.requires.push(condition.into());
        self
    }

    pub fn provides(mut self, condition: impl Into<Precondition>) -> Self {
        self.provides.push(condition.into());
        self
    }

    pub fn assumes(mut self, assumption: impl Into<String>) -> Self {
        self.assumes.push(assumption.into());
        self
    }
}

impl Step {
    pub fn navigate(url: impl Into<String>) -> Self {
        Step::Navigate { url: url.into() }
    }

    pub fn fill(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Step::Fill {
            selector: selector.into(),
            value: value.into(),
        }
    }

    pub fn click(selector: impl Into<String>) -> Self {
        Step::Click {
            selector: selector.into(),
        }
    }

    pub fn select_option(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Step::SelectOption {
            selector: selector.into(),
            value: value.into(),
        }
    }

    pub fn assert_equals(selector: impl Into<String>, expected: impl Into<String>) -> Self {
        Step::AssertEquals {
            selector: selector.into(),
            expected: expected.into(),
        }
    }

    pub fn assert_contains(selector: impl Into<String>, expected: impl Into<String>) -> Self {
        Step::AssertContains {
            selector: selector.into(),
            expected: expected.into(),
        }
    }

    pub fn assert_exists(selector: impl Into<String>, expected: bool) -> Self {
        Step::AssertExists {
            selector: selector.into(),
            expected,
        }
    }

    pub fn assert_count_greater_than(selector: impl Into<String>, threshold: usize) -> Self {
        Step::AssertCountGreaterThan {
            selector: selector.into(),
            threshold,
        }
    }

    /// Shorthand for `CaseStep::from(step).requires(..)`
    pub fn requires(self, condition: impl Into<Precondition>) -> CaseStep {
        CaseStep::from(self).requires(condition)
    }

    /// Shorthand for `CaseStep::from(step).provides(..)`
    pub fn provides(self, condition: impl Into<Precondition>) -> CaseStep {
        CaseStep::from(self).provides(condition)
    }

    /// Short label for logs and reports
    pub fn label(&self) -> String {
        match self {
            Step::Navigate { url } => format!("navigate:{}", url),
            Step::Fill { selector, .. } => format!("fill:{}", selector),
            Step::Click { selector } => format!("click:{}", selector),
            Step::SelectOption { selector, value } => format!("select:{}={}", selector, value),
            Step::AssertEquals { selector, .. } => format!("assert_equals:{}", selector),
            Step::AssertContains { selector, .. } => format!("assert_contains:{}", selector),
            Step::AssertExists { selector, expected } => {
                format!("assert_exists:{}={}", selector, expected)
            }
            Step::AssertCountGreaterThan { selector, threshold } => {
                format!("assert_count:{}>{}", selector, threshold)
            }
        }
    }
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append a step (plain [`Step`] or annotated [`CaseStep`])
    pub fn step(mut self, step: impl Into<CaseStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Append several plain steps
    pub fn steps(mut self, steps: impl IntoIterator<Item = CaseStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Check that every required condition is provided by an earlier step
    pub fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("test case name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "test case '{}' has no steps",
                self.name
            )));
        }

        let mut established: HashSet<&Precondition> = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(missing) = step.requires.iter().find(|c| !established.contains(c)) {
                return Err(E2eError::UnmetPrecondition {
                    case: self.name.clone(),
                    step_index: index,
                    precondition: missing.to_string(),
                });
            }
            established.extend(step.provides.iter());
        }
        Ok(())
    }

    /// Parse a test case from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let case: Self = serde_yaml::from_str(yaml)?;
        case.validate()?;
        Ok(case)
    }

    /// Parse a test case from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            E2eError::Yaml(inner) => {
                E2eError::SpecParse(format!("{}: {}", path.display(), inner))
            }
            other => other,
        })
    }

    /// Load every `.yaml`/`.yml` case under `dir`, ordered by path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut cases = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            cases.push(Self::from_file(entry.path())?);
        }

        validate_suite(&cases)?;
        Ok(cases)
    }

    /// Filter cases by tag
    pub fn filter_by_tag<'a>(cases: &'a [Self], tag: &str) -> Vec<&'a Self> {
        cases.iter().filter(|c| c.tags.iter().any(|t| t == tag)).collect()
    }
}

/// Validate each case and reject duplicate names
pub fn validate_suite(cases: &[TestCase]) -> E2eResult<()> {
    let mut seen = HashSet::new();
    for case in cases {
        if !seen.insert(case.name.as_str()) {
            return Err(E2eError::DuplicateCase(case.name.clone()));
        }
        case.validate()?;
    }
    Ok(())
}
