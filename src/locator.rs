use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::element::Element;
use crate::engine::PageEngine;
use crate::errors::AutomationError;
use crate::selector::Selector;

// Defaults if none are specified on the locator itself
const DEFAULT_LOCATOR_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A high-level API for waiting on elements matching a selector.
///
/// A locator carries no result state between calls: every `wait` starts a
/// fresh deadline and polls the engine from scratch.
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn PageEngine>,
    selector: Selector,
    timeout: Duration,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl Locator {
    /// Create a new locator with the given selector
    pub(crate) fn new(engine: Arc<dyn PageEngine>, selector: Selector) -> Self {
        Self {
            engine,
            selector,
            timeout: DEFAULT_LOCATOR_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    /// Set a default timeout for waiting operations on this locator instance.
    /// This timeout is used if no specific timeout is passed to `wait`.
    pub fn set_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the cadence at which the engine is polled between misses.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Tie this locator to a cancellation token. The token is checked before
    /// every query and during every sleep slice.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn selector_string(&self) -> String {
        self.selector.to_string()
    }

    /// Wait for an element matching the locator to appear, up to the specified
    /// timeout. If no timeout is provided, uses the locator's default timeout.
    ///
    /// Returns the matched handle immediately on first success. Fails with
    /// `Timeout` once the deadline elapses with no match, or `Cancelled` if
    /// the token fires first. A cancelled wait never resolves successfully.
    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<Element, AutomationError> {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        debug!(
            selector = %self.selector,
            timeout_ms = effective_timeout.as_millis() as u64,
            "waiting for element"
        );

        if let Selector::Invalid(reason) = &self.selector {
            return Err(AutomationError::InvalidSelector(reason.clone()));
        }

        let deadline = Instant::now() + effective_timeout;
        loop {
            // Cancellation is observed before each query, so a pre-cancelled
            // wait issues zero queries.
            if self.cancel.is_cancelled() {
                return Err(AutomationError::Cancelled(format!(
                    "wait for {} aborted",
                    self.selector
                )));
            }

            if let Some(element) = self.engine.query_first(&self.selector).await? {
                debug!(selector = %self.selector, "element found");
                return Ok(element);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AutomationError::Timeout(format!(
                    "Timed out after {effective_timeout:?} waiting for element {}",
                    self.selector
                )));
            }

            // Never oversleep the deadline.
            let slice = self.poll_interval.min(deadline - now);
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(AutomationError::Cancelled(format!(
                        "wait for {} aborted",
                        self.selector
                    )));
                }
                _ = sleep(slice) => {}
            }
        }
    }
}

/// Suspend for `duration`, checking `cancel` at the same cadence the waiter
/// polls at. Resolves once the elapsed time reaches the requested duration;
/// fails with `Cancelled` within one poll slice of the token firing.
pub async fn pause(
    duration: Duration,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> Result<(), AutomationError> {
    let deadline = Instant::now() + duration;
    loop {
        if cancel.is_cancelled() {
            return Err(AutomationError::Cancelled(format!(
                "pause of {duration:?} aborted"
            )));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        let slice = poll_interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(AutomationError::Cancelled(format!(
                    "pause of {duration:?} aborted"
                )));
            }
            _ = sleep(slice) => {}
        }
    }
}
