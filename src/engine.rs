use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::errors::AutomationError;
use crate::selector::Selector;

/// Process-wide handling of native dialogs raised by page actions.
///
/// Installed once per run and active for the process lifetime; there is no
/// uninstall. Both flags default to the auto-accept behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogPolicy {
    /// Answer confirmation dialogs with "accept" instead of prompting.
    pub accept_confirm: bool,
    /// Acknowledge alert dialogs without displaying them.
    pub suppress_alert: bool,
}

impl Default for DialogPolicy {
    fn default() -> Self {
        Self {
            accept_confirm: true,
            suppress_alert: true,
        }
    }
}

/// The common trait that page engines must implement.
///
/// An engine owns the document-like structure being automated: a live browser
/// tab driven over a remote-control protocol, a headless DOM, or a test
/// double. The driver and locators only see this seam.
#[async_trait::async_trait]
pub trait PageEngine: Send + Sync {
    /// Find the first element matching a selector, or `None` if nothing
    /// currently matches. One call is one query; polling is the caller's job.
    async fn query_first(&self, selector: &Selector) -> Result<Option<Element>, AutomationError>;

    /// Install the process-wide dialog policy. Monotonic: once installed the
    /// policy stays active for the rest of the process.
    fn install_dialog_policy(&self, policy: DialogPolicy) -> Result<(), AutomationError>;
}
