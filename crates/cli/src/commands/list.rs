//! List Command

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use saucedemo_e2e::TestCase;

use super::SuiteArgs;
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Case summary display wrapper for serialization
#[derive(Serialize)]
pub struct CaseDisplay {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub steps: usize,
}

impl From<&TestCase> for CaseDisplay {
    fn from(case: &TestCase) -> Self {
        Self {
            name: case.name.clone(),
            description: case.description.clone(),
            tags: case.tags.clone(),
            steps: case.steps.len(),
        }
    }
}

impl TableDisplay for CaseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Tags", "Steps", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.tags.join(", "),
            self.steps.to_string(),
            self.description.clone(),
        ]
    }
}

pub fn execute(args: ListArgs, format: OutputFormat) -> Result<()> {
    let (_, cases) = args.suite.load()?;
    let rows: Vec<CaseDisplay> = cases.iter().map(CaseDisplay::from).collect();
    print_list(&rows, format);
    Ok(())
}
