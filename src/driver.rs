use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::engine::DialogPolicy;
use crate::errors::AutomationError;
use crate::locator::{pause, Locator};
use crate::selector::{effective_row, LocatorTemplate, Selector};
use crate::Page;

/// What the driver does after a non-cancellation failure in an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run on the first failed iteration.
    #[default]
    Abort,
    /// Abandon the failed iteration and start the next one.
    SkipIteration,
}

/// Tunable knobs for a run. Durations are carried in milliseconds, which is
/// how they arrive from JSON configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// How many row resets to perform.
    pub iterations: u32,
    /// Pause between actions within an iteration.
    pub step_delay_ms: u64,
    /// Max wait for each locator.
    pub wait_timeout_ms: u64,
    /// Cadence for locator polls and pause slices.
    pub poll_interval_ms: u64,
    /// Initial pause per iteration, allowing a page reload to settle before
    /// the sequence begins.
    pub settle_delay_ms: u64,
    /// Raw 1-based row selection; non-positive, fractional, or missing values
    /// fall back to row 1.
    pub selected_row: Option<f64>,
    pub on_failure: FailurePolicy,
    pub dialog_policy: DialogPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            step_delay_ms: 500,
            wait_timeout_ms: 10_000,
            poll_interval_ms: 200,
            settle_delay_ms: 10_000,
            selected_row: None,
            on_failure: FailurePolicy::Abort,
            dialog_policy: DialogPolicy::default(),
        }
    }
}

impl DriverConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The fixed click sequence of one iteration: the anchor cell that opens a
/// row (and doubles as the reload marker), a menu button inside the selected
/// row, and the confirm link nested under the same row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowSequence {
    pub anchor: Selector,
    pub menu_button: LocatorTemplate,
    pub confirm_link: LocatorTemplate,
}

impl Default for RowSequence {
    fn default() -> Self {
        Self {
            anchor: Selector::from(r#"//table[@id="tTransactions"]/tbody/tr[1]/td[1]"#),
            menu_button: LocatorTemplate::new(
                r#"//*[@class="table m-0 table-striped table-sm text-muted dataTable no-footer"]/tbody/tr[{row}]/td[1]/div/button[2]"#,
            ),
            confirm_link: LocatorTemplate::new(
                r#"//*[@class="table m-0 table-striped table-sm text-muted dataTable no-footer"]/tbody/tr[{row}]/td[1]/div/div/a[2]"#,
            ),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// All requested iterations completed.
    Done,
    /// Cancellation was observed; remaining iterations never ran.
    Aborted,
    /// A timeout or engine failure stopped the run.
    Failed { error: String },
}

/// Summary of a finished run. Only logged and returned; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub requested: u32,
    pub completed: u32,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Settling,
    OpenRow,
    OpenMenu,
    ConfirmReset,
    AcceptDialogs,
    Reloading,
}

/// Sequential driver for repeated row resets.
///
/// One outstanding wait or pause at a time; cancellation is observed at the
/// next poll slice, giving abort latency bounded by one poll interval.
pub struct Driver {
    page: Page,
    config: DriverConfig,
    sequence: RowSequence,
    cancel: CancellationToken,
}

impl Driver {
    pub fn new(page: Page, config: DriverConfig, sequence: RowSequence) -> Self {
        Self {
            page,
            config,
            sequence,
            cancel: CancellationToken::new(),
        }
    }

    /// The token external code can fire to stop the run cooperatively.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Bind cancellation to Ctrl-C for interactive runs.
    pub fn cancel_on_ctrl_c(&self) {
        let token = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping run");
                token.cancel();
            }
        });
    }

    fn locator(&self, selector: Selector) -> Locator {
        self.page
            .locator(selector)
            .set_default_timeout(self.config.wait_timeout())
            .with_poll_interval(self.config.poll_interval())
            .with_cancellation(self.cancel.clone())
    }

    fn enter(&self, iteration: u32, phase: Phase) {
        debug!(iteration, ?phase, "entering phase");
    }

    async fn step_pause(&self) -> Result<(), AutomationError> {
        pause(
            self.config.step_delay(),
            self.config.poll_interval(),
            &self.cancel,
        )
        .await
    }

    /// Run the configured number of iterations, stopping on the first
    /// unrecoverable condition. The dialog policy is installed once before
    /// iteration 1 and stays active for the process lifetime.
    #[instrument(skip(self))]
    pub async fn run(&self) -> RunReport {
        let requested = self.config.iterations;

        if let Err(e) = self.page.install_dialog_policy(self.config.dialog_policy) {
            error!("failed to install dialog policy: {e}");
            return RunReport {
                requested,
                completed: 0,
                outcome: RunOutcome::Failed {
                    error: e.to_string(),
                },
            };
        }

        info!(iterations = requested, "starting run");
        let mut completed = 0;
        for iteration in 1..=requested {
            info!(iteration, total = requested, "iteration starting");
            match self.run_iteration(iteration).await {
                Ok(()) => {
                    completed += 1;
                    info!(iteration, "iteration complete");
                }
                Err(e) if e.is_cancellation() => {
                    info!(iteration, "run aborted: {e}");
                    return RunReport {
                        requested,
                        completed,
                        outcome: RunOutcome::Aborted,
                    };
                }
                Err(e) => {
                    error!(iteration, "iteration failed: {e}");
                    match self.config.on_failure {
                        FailurePolicy::Abort => {
                            return RunReport {
                                requested,
                                completed,
                                outcome: RunOutcome::Failed {
                                    error: e.to_string(),
                                },
                            };
                        }
                        FailurePolicy::SkipIteration => continue,
                    }
                }
            }
        }

        info!(completed, "all iterations done");
        RunReport {
            requested,
            completed,
            outcome: RunOutcome::Done,
        }
    }

    async fn run_iteration(&self, iteration: u32) -> Result<(), AutomationError> {
        let row = effective_row(self.config.selected_row);

        self.enter(iteration, Phase::Settling);
        pause(
            self.config.settle_delay(),
            self.config.poll_interval(),
            &self.cancel,
        )
        .await?;

        self.enter(iteration, Phase::OpenRow);
        let anchor = self.locator(self.sequence.anchor.clone()).wait(None).await?;
        anchor.scroll_into_view()?;
        let cell_text = anchor.text().unwrap_or_default();
        info!(iteration, text = %cell_text, "anchor cell found, clicking");
        anchor.click()?;
        self.step_pause().await?;

        self.enter(iteration, Phase::OpenMenu);
        let menu = self
            .locator(self.sequence.menu_button.resolve(row))
            .wait(None)
            .await?;
        menu.click()?;
        self.step_pause().await?;

        self.enter(iteration, Phase::ConfirmReset);
        let confirm = self
            .locator(self.sequence.confirm_link.resolve(row))
            .wait(None)
            .await?;
        confirm.click()?;
        self.step_pause().await?;

        // No query here: any dialog raised by the confirm click has already
        // been answered by the installed policy.
        self.enter(iteration, Phase::AcceptDialogs);

        self.enter(iteration, Phase::Reloading);
        self.locator(self.sequence.anchor.clone()).wait(None).await?;
        debug!(iteration, "anchor reappeared, ready for next iteration");
        Ok(())
    }
}
