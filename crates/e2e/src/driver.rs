//! Page driver contract
//!
//! The runner never talks to a browser directly. Every navigation, DOM
//! mutation and DOM query goes through a [`PageDriver`], and every test
//! case gets its own driver from a [`DriverFactory`]. A driver owns exactly
//! one isolated browsing context: cookies, storage and history are never
//! shared between two drivers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverResult;

/// Snapshot of a matched element.
///
/// Handles are descriptive only; they are not live references into the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Position of the element among all matches, in document order
    pub index: usize,

    /// Lower-case tag name
    pub tag_name: String,

    /// Text content at the time of the query
    #[serde(default)]
    pub text: Option<String>,

    /// Whether the element was rendered visibly
    #[serde(default)]
    pub visible: bool,
}

impl ElementHandle {
    pub fn new(index: usize, tag_name: impl Into<String>) -> Self {
        Self {
            index,
            tag_name: tag_name.into(),
            text: None,
            visible: true,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Navigation, mutation and query primitives against one browsing context.
///
/// All operations suspend until the driver considers the page settled. A
/// selector that cannot be resolved within the driver's own timeout yields
/// [`DriverError::NotFound`](crate::error::DriverError::NotFound).
#[async_trait]
pub trait PageDriver: Send {
    /// Load `url` in the page
    async fn goto(&mut self, url: &str) -> DriverResult<()>;

    /// Replace the value of an input
    async fn fill(&mut self, selector: &str, value: &str) -> DriverResult<()>;

    async fn click(&mut self, selector: &str) -> DriverResult<()>;

    /// Choose an `<option>` by value in a `<select>`
    async fn select_option(&mut self, selector: &str, value: &str) -> DriverResult<()>;

    /// Text content of the first match, or `None` when nothing matches
    async fn text_content(&mut self, selector: &str) -> DriverResult<Option<String>>;

    /// Every match in document order
    async fn query_all(&mut self, selector: &str) -> DriverResult<Vec<ElementHandle>>;

    /// First match, if any
    async fn query(&mut self, selector: &str) -> DriverResult<Option<ElementHandle>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// Tear down the browsing context. Called exactly once per driver.
    async fn close(&mut self) -> DriverResult<()>;
}

/// Produces fresh, isolated drivers. Must be callable from concurrent cases.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn create(&self) -> DriverResult<Box<dyn PageDriver>>;
}
