//! Multi-stage progress indicator
//!
//! `Hidden -> Active(percent, message) -> Hidden`. Percent never moves
//! backwards within one run; hiding is deferred by a grace delay so the final
//! message stays readable.

use crate::error::{ClientError, Result};
use crate::ui::{Indicator, RenderInstruction, Renderer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Snapshot of an indicator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub visible: bool,
    /// Always within `0..=100`
    pub percent: u8,
    pub message: String,
}

struct Shared {
    indicator: Indicator,
    renderer: Arc<dyn Renderer>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    state: ProgressState,
    // Bumped by every show(); a deferred hide only applies to its own run.
    run: u64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, state: ProgressState) {
        self.renderer.render(RenderInstruction::Progress {
            indicator: self.indicator,
            state,
        });
    }

    fn hide(&self, only_run: Option<u64>) {
        let hidden = {
            let mut inner = self.lock();
            if only_run.is_some_and(|run| run != inner.run) {
                debug!("{:?} progress restarted, skipping stale hide", self.indicator);
                return;
            }
            if !inner.state.visible {
                return;
            }
            inner.state.visible = false;
            inner.state.clone()
        };
        self.emit(hidden);
    }
}

/// Drives one progress indicator
#[derive(Clone)]
pub struct ProgressReporter {
    shared: Arc<Shared>,
    hide_delay: Duration,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("indicator", &self.shared.indicator)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    pub fn new(indicator: Indicator, renderer: Arc<dyn Renderer>, hide_delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                indicator,
                renderer,
                inner: Mutex::new(Inner::default()),
            }),
            hide_delay,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.shared.lock().state.clone()
    }

    /// Make the indicator visible at 0%, restarting it if already active
    pub fn show(&self) {
        let message = match self.shared.indicator {
            Indicator::Search => "准备搜索...",
            Indicator::Analysis => "准备分析...",
        };

        let state = {
            let mut inner = self.shared.lock();
            inner.run += 1;
            inner.state = ProgressState {
                visible: true,
                percent: 0,
                message: message.to_string(),
            };
            inner.state.clone()
        };
        self.shared.emit(state);
    }

    /// Advance the indicator
    ///
    /// `percent` is clamped to 100. Updating while hidden or moving
    /// backwards is rejected and leaves the state untouched.
    pub fn update(&self, percent: u8, message: impl Into<String>) -> Result<()> {
        let percent = percent.min(100);

        let state = {
            let mut inner = self.shared.lock();
            if !inner.state.visible {
                warn!("{:?} progress updated while hidden", self.shared.indicator);
                return Err(ClientError::ProgressInactive);
            }
            if percent < inner.state.percent {
                warn!(
                    "{:?} progress regression {}% -> {}%",
                    self.shared.indicator, inner.state.percent, percent
                );
                return Err(ClientError::ProgressRegression {
                    from: inner.state.percent,
                    to: percent,
                });
            }
            inner.state.percent = percent;
            inner.state.message = message.into();
            inner.state.clone()
        };
        self.shared.emit(state);
        Ok(())
    }

    /// Advance the indicator, logging instead of failing on misuse
    pub fn tick(&self, percent: u8, message: impl Into<String>) {
        if let Err(e) = self.update(percent, message) {
            debug!("Ignored progress update: {}", e);
        }
    }

    /// Hide immediately; a no-op when already hidden
    pub fn hide(&self) {
        self.shared.hide(None);
    }

    /// Hide once the grace delay has elapsed
    ///
    /// A `show()` in the meantime starts a new run and the pending hide is
    /// dropped.
    pub fn hide_after_delay(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let run = shared.lock().run;
        let delay = self.hide_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.hide(Some(run));
        })
    }
}
