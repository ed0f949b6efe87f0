//! Scripted in-memory page engine for driver and waiter tests.
//!
//! Elements become visible either up front, after a number of queries, or as
//! a side effect of clicking another element, which is enough to model the
//! row-open / menu-open / confirm flow without a real document.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::element::{Element, ElementImpl};
use crate::engine::{DialogPolicy, PageEngine};
use crate::errors::AutomationError;
use crate::selector::Selector;
use crate::{ClickResult, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Make another selector start matching.
    Reveal(String),
    /// Make a selector stop matching.
    Hide(String),
    /// Raise a confirmation dialog with the given message.
    RaiseConfirm(String),
    /// Raise an alert dialog with the given message.
    RaiseAlert(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Alert,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRecord {
    pub kind: DialogKind,
    pub message: String,
    pub accepted: bool,
}

#[derive(Debug, Default)]
struct MockState {
    visible: HashSet<String>,
    appear_after: HashMap<String, usize>,
    poisoned: HashSet<String>,
    texts: HashMap<String, String>,
    on_click: HashMap<String, Vec<ClickEffect>>,
    queries: Vec<String>,
    clicks: Vec<String>,
    scrolls: Vec<String>,
    policy: Option<DialogPolicy>,
    dialogs: Vec<DialogRecord>,
}

pub struct MockPage {
    state: Arc<Mutex<MockState>>,
}

impl MockPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(MockState::default())),
        })
    }

    pub fn page(self: &Arc<Self>) -> Page {
        Page::new(self.clone())
    }

    pub fn show(&self, selector: &str) {
        self.state
            .lock()
            .unwrap()
            .visible
            .insert(selector.to_string());
    }

    /// Make a selector start matching once it has been queried `n` times.
    pub fn show_after_queries(&self, selector: &str, n: usize) {
        self.state
            .lock()
            .unwrap()
            .appear_after
            .insert(selector.to_string(), n);
    }

    /// Make queries for a selector fail with an engine error.
    pub fn poison(&self, selector: &str) {
        self.state
            .lock()
            .unwrap()
            .poisoned
            .insert(selector.to_string());
    }

    pub fn set_text(&self, selector: &str, text: &str) {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(selector.to_string(), text.to_string());
    }

    pub fn on_click(&self, selector: &str, effects: Vec<ClickEffect>) {
        self.state
            .lock()
            .unwrap()
            .on_click
            .insert(selector.to_string(), effects);
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn queries_for(&self, selector: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .queries
            .iter()
            .filter(|q| q.as_str() == selector)
            .count()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn scrolls(&self) -> Vec<String> {
        self.state.lock().unwrap().scrolls.clone()
    }

    pub fn dialogs(&self) -> Vec<DialogRecord> {
        self.state.lock().unwrap().dialogs.clone()
    }

    pub fn installed_policy(&self) -> Option<DialogPolicy> {
        self.state.lock().unwrap().policy
    }
}

#[async_trait::async_trait]
impl PageEngine for MockPage {
    async fn query_first(&self, selector: &Selector) -> Result<Option<Element>, AutomationError> {
        let expr = selector.to_string();
        let mut state = self.state.lock().unwrap();
        state.queries.push(expr.clone());

        if state.poisoned.contains(&expr) {
            return Err(AutomationError::EngineError(format!(
                "query failed for {expr}"
            )));
        }

        let seen = state.queries.iter().filter(|q| *q == &expr).count();
        let matches = state.visible.contains(&expr)
            || state.appear_after.get(&expr).is_some_and(|n| seen >= *n);
        if matches {
            Ok(Some(Element::new(Box::new(MockElement {
                selector: expr,
                state: self.state.clone(),
            }))))
        } else {
            Ok(None)
        }
    }

    fn install_dialog_policy(&self, policy: DialogPolicy) -> Result<(), AutomationError> {
        self.state.lock().unwrap().policy = Some(policy);
        Ok(())
    }
}

struct MockElement {
    selector: String,
    state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockElement")
            .field("selector", &self.selector)
            .finish()
    }
}

impl ElementImpl for MockElement {
    fn selector(&self) -> String {
        self.selector.clone()
    }

    fn click(&self) -> Result<ClickResult, AutomationError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(self.selector.clone());

        let effects = state.on_click.get(&self.selector).cloned().unwrap_or_default();
        for effect in effects {
            match effect {
                ClickEffect::Reveal(sel) => {
                    state.visible.insert(sel);
                }
                ClickEffect::Hide(sel) => {
                    state.visible.remove(&sel);
                }
                ClickEffect::RaiseConfirm(message) => {
                    let accepted = state.policy.is_some_and(|p| p.accept_confirm);
                    state.dialogs.push(DialogRecord {
                        kind: DialogKind::Confirm,
                        message,
                        accepted,
                    });
                }
                ClickEffect::RaiseAlert(message) => {
                    let accepted = state.policy.is_some_and(|p| p.suppress_alert);
                    state.dialogs.push(DialogRecord {
                        kind: DialogKind::Alert,
                        message,
                        accepted,
                    });
                }
            }
        }

        Ok(ClickResult {
            method: "mock".to_string(),
            coordinates: None,
            details: self.selector.clone(),
        })
    }

    fn scroll_into_view(&self) -> Result<(), AutomationError> {
        self.state
            .lock()
            .unwrap()
            .scrolls
            .push(self.selector.clone());
        Ok(())
    }

    fn text(&self) -> Result<String, AutomationError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .texts
            .get(&self.selector)
            .cloned()
            .unwrap_or_default())
    }
}
