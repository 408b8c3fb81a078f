//! Progress dialog state.
//!
//! [`ProgressPresenter`] owns what the transient overlay shows: title,
//! description, completion, remaining time and an error log. It knows nothing
//! about transport; uploads and folder creation feed it numbers and log lines,
//! and a [`ProgressView`] renders each new snapshot.

use std::rc::Rc;

use crate::speed::{ProgressSample, SpeedEstimator, format_seconds};

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Renders presenter snapshots.
pub trait ProgressView {
    fn render(&self, state: &ProgressState);
}

/// Lifecycle of the dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialogPhase {
    /// No dialog on screen.
    #[default]
    Hidden,
    /// Operation in flight.
    Running,
    /// Operation finished with logged errors; the dialog stays up.
    Failed,
}

/// Everything the overlay displays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressState {
    pub phase: DialogPhase,
    pub title: String,
    /// Name of the item being processed.
    pub description: String,
    /// Completion in `0.0..=1.0`.
    pub fraction: f64,
    /// Whole percent shown next to the bar.
    pub percent: u32,
    /// Formatted remaining time, empty when unknown.
    pub eta: String,
    /// Error lines, oldest first.
    pub log: Vec<String>,
}

/// How [`ProgressPresenter::finish`] left the dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Nothing was logged; the dialog is gone.
    Closed,
    /// Errors were logged; the dialog stays up with its log.
    KeptOpen,
}

pub struct ProgressPresenter {
    state: ProgressState,
    speed: SpeedEstimator,
    view: Box<dyn ProgressView>,
    clock: Rc<dyn Clock>,
    more_than_a_day: String,
}

impl ProgressPresenter {
    /// `more_than_a_day` is the (localized) phrase for very long durations.
    pub fn new(
        view: Box<dyn ProgressView>,
        clock: Rc<dyn Clock>,
        more_than_a_day: impl Into<String>,
    ) -> Self {
        Self {
            state: ProgressState::default(),
            speed: SpeedEstimator::new(),
            view,
            clock,
            more_than_a_day: more_than_a_day.into(),
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.phase != DialogPhase::Hidden
    }

    /// Show a fresh dialog and start a new speed session.
    pub fn open(&mut self, title: &str) {
        self.state = ProgressState {
            phase: DialogPhase::Running,
            title: title.to_string(),
            ..ProgressState::default()
        };
        self.speed.reset();
        self.render();
    }

    /// Report `value` of `total` bytes done while working on `description`.
    ///
    /// The remaining time is re-estimated from the previous update, except
    /// once everything is done: the completing update neither changes the
    /// shown time nor feeds the speed estimate.
    pub fn update(&mut self, description: &str, total: u64, value: u64) {
        let now = self.clock.now_ms();
        let fraction = if total == 0 {
            1.0
        } else {
            (value as f64 / total as f64).clamp(0.0, 1.0)
        };

        self.state.description = description.to_string();
        self.state.fraction = fraction;
        self.state.percent = (fraction * 100.0).floor() as u32;

        let sample = ProgressSample {
            at_ms: now,
            bytes: value,
        };
        if value < total {
            if self.speed.observe(sample).is_some() {
                let eta = self.speed.eta_secs(total - value);
                self.state.eta = format_seconds(eta, &self.more_than_a_day);
            }
        } else {
            // Completion feeds no rate.
            self.speed.record(sample);
        }
        self.render();
    }

    /// Append a line to the error log.
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!(%line, "operation error");
        self.state.log.push(line);
        self.render();
    }

    /// End the operation.
    ///
    /// Without logged errors the dialog disappears. Otherwise the progress
    /// widgets go away, the title becomes `errors_title` and the log stays.
    pub fn finish(&mut self, errors_title: &str) -> FinishOutcome {
        self.state.description.clear();
        self.state.eta.clear();
        if self.state.log.is_empty() {
            self.state.phase = DialogPhase::Hidden;
            self.render();
            FinishOutcome::Closed
        } else {
            self.state.title = errors_title.to_string();
            self.state.phase = DialogPhase::Failed;
            self.render();
            FinishOutcome::KeptOpen
        }
    }

    /// Take down a dialog left open after errors.
    pub fn dismiss(&mut self) {
        self.state = ProgressState::default();
        self.render();
    }

    fn render(&self) {
        self.view.render(&self.state);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    /// Clock advanced by hand.
    #[derive(Default)]
    pub struct ManualClock {
        now: Cell<f64>,
    }

    impl ManualClock {
        pub fn advance(&self, ms: f64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.now.get()
        }
    }

    /// View remembering every rendered snapshot.
    #[derive(Clone, Default)]
    pub struct RecordingView {
        pub frames: Rc<RefCell<Vec<ProgressState>>>,
    }

    impl RecordingView {
        pub fn last(&self) -> ProgressState {
            self.frames.borrow().last().cloned().unwrap_or_default()
        }
    }

    impl ProgressView for RecordingView {
        fn render(&self, state: &ProgressState) {
            self.frames.borrow_mut().push(state.clone());
        }
    }

    pub fn presenter() -> (ProgressPresenter, RecordingView, Rc<ManualClock>) {
        let view = RecordingView::default();
        let clock = Rc::new(ManualClock::default());
        let presenter = ProgressPresenter::new(
            Box::new(view.clone()),
            clock.clone(),
            "More than 1 day",
        );
        (presenter, view, clock)
    }
}
