//! Repeated table-row automation over a pluggable page engine
//!
//! This crate drives a fixed click sequence (open a row, open its sub-menu,
//! confirm a reset) against a document-like structure, inspired by
//! Playwright's web automation model. The core primitive is a poll-until-found
//! wait with a deadline and cooperative cancellation; element lookup, click
//! dispatch, and native-dialog handling live behind the [`engine::PageEngine`]
//! seam so any host (a remote-controlled browser, a headless DOM, a test
//! double) can supply them.

use std::sync::Arc;

use tracing::instrument;

pub mod driver;
pub mod element;
pub mod engine;
pub mod errors;
pub mod locator;
pub mod selector;
#[cfg(test)]
mod tests;

pub use driver::{Driver, DriverConfig, FailurePolicy, RowSequence, RunOutcome, RunReport};
pub use element::{Element, ElementImpl};
pub use engine::{DialogPolicy, PageEngine};
pub use errors::AutomationError;
pub use locator::{pause, Locator};
pub use selector::{effective_row, LocatorTemplate, Selector};

/// Holds click dispatch details reported by an engine
#[derive(Debug, Clone)]
pub struct ClickResult {
    pub method: String,
    pub coordinates: Option<(f64, f64)>,
    pub details: String,
}

/// The main entry point for page automation
pub struct Page {
    engine: Arc<dyn PageEngine>,
}

impl Page {
    pub fn new(engine: Arc<dyn PageEngine>) -> Self {
        Self { engine }
    }

    #[instrument(skip(self, selector))]
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        let selector = selector.into();
        Locator::new(self.engine.clone(), selector)
    }

    /// Install the process-wide dialog policy on the underlying engine.
    pub fn install_dialog_policy(&self, policy: DialogPolicy) -> Result<(), AutomationError> {
        self.engine.install_dialog_policy(policy)
    }
}

impl Clone for Page {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}
