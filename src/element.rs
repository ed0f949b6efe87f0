use std::fmt::Debug;

use tracing::instrument;

use crate::errors::AutomationError;
use crate::ClickResult;

/// Represents an element handle returned by the page-query capability
#[derive(Debug)]
pub struct Element {
    inner: Box<dyn ElementImpl>,
}

/// The trait that engine-specific element handles must implement.
///
/// Actions are fire-and-forget with respect to the page: a successful click
/// says the click was dispatched, not that the page reacted.
pub trait ElementImpl: Send + Sync + Debug {
    fn selector(&self) -> String;
    fn click(&self) -> Result<ClickResult, AutomationError>;
    fn scroll_into_view(&self) -> Result<(), AutomationError>;
    fn text(&self) -> Result<String, AutomationError>;
}

impl Element {
    /// Create a new element from an engine-specific implementation
    pub fn new(impl_: Box<dyn ElementImpl>) -> Self {
        Self { inner: impl_ }
    }

    /// The selector expression this handle was resolved from
    pub fn selector(&self) -> String {
        self.inner.selector()
    }

    /// Click on this element
    #[instrument(level = "debug", skip(self))]
    pub fn click(&self) -> Result<ClickResult, AutomationError> {
        self.inner.click()
    }

    /// Scroll this element into the viewport
    #[instrument(level = "debug", skip(self))]
    pub fn scroll_into_view(&self) -> Result<(), AutomationError> {
        self.inner.scroll_into_view()
    }

    /// Text content of this element, trimmed
    pub fn text(&self) -> Result<String, AutomationError> {
        self.inner.text().map(|t| t.trim().to_string())
    }
}
