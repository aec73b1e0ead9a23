//! Sequence configuration — what the host hands to [`Sequencer::start`].
//!
//! [`Sequencer::start`]: crate::sequencer::Sequencer::start

use specter_types::MotionParams;
use std::fmt;
use std::time::Duration;

/// Notification for each phase entry, called with the phase index.
pub type PhaseCallback = Box<dyn FnMut(usize) + Send>;

/// Completion notification, called exactly once with the granted flag.
pub type CompleteCallback = Box<dyn FnOnce(bool) + Send>;

/// The terminal decision for a run: fixed up front, or deferred to the
/// moment the settle delay elapses (e.g. the host checks a server reply
/// that arrived while the theater played).
pub enum FinalOutcome {
    Fixed(bool),
    Deferred(Box<dyn FnOnce() -> bool + Send>),
}

impl FinalOutcome {
    pub(crate) fn decide(self) -> bool {
        match self {
            Self::Fixed(granted) => granted,
            Self::Deferred(f) => f(),
        }
    }
}

impl From<bool> for FinalOutcome {
    fn from(granted: bool) -> Self {
        Self::Fixed(granted)
    }
}

impl fmt::Debug for FinalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(granted) => f.debug_tuple("Fixed").field(granted).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Full description of one run: phase labels, per-phase timing, the final
/// outcome, and the host's callbacks.
pub struct SequenceConfig {
    pub phases: Vec<String>,
    /// One duration per phase. The transition into phase `i` fires at the
    /// prefix sum of the first `i` entries; the last entry is the final
    /// phase's hold before settling begins.
    pub step_durations: Vec<Duration>,
    pub final_outcome: FinalOutcome,
    pub on_phase_change: Option<PhaseCallback>,
    pub on_complete: Option<CompleteCallback>,
    /// Pause after the last phase's hold before the outcome is revealed.
    pub settle_delay: Duration,
    /// Delay from outcome-set until `on_complete` fires.
    pub notify_delay: Duration,
}

impl SequenceConfig {
    /// A sequence with explicit per-phase durations and library defaults for
    /// the settle and notify delays.
    pub fn new<S: Into<String>>(phases: Vec<S>, step_durations: Vec<Duration>) -> Self {
        let defaults = MotionParams::default();
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
            step_durations,
            final_outcome: FinalOutcome::Fixed(true),
            on_phase_change: None,
            on_complete: None,
            settle_delay: defaults.settle_delay(),
            notify_delay: defaults.notify_delay(),
        }
    }

    /// A sequence where every phase takes the same time.
    pub fn uniform<S: Into<String>>(phases: Vec<S>, step: Duration) -> Self {
        let count = phases.len();
        Self::new(phases, vec![step; count])
    }

    pub fn outcome(mut self, outcome: impl Into<FinalOutcome>) -> Self {
        self.final_outcome = outcome.into();
        self
    }

    pub fn on_phase_change(mut self, f: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_phase_change = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(bool) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn settle(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn notify(mut self, delay: Duration) -> Self {
        self.notify_delay = delay;
        self
    }

    /// Apply host-configured settle/notify overrides.
    pub fn with_motion(mut self, params: &MotionParams) -> Self {
        self.settle_delay = params.settle_delay();
        self.notify_delay = params.notify_delay();
        self
    }
}

// Closures make a derived Debug impossible; render everything else.
impl fmt::Debug for SequenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceConfig")
            .field("phases", &self.phases)
            .field("step_durations", &self.step_durations)
            .field("final_outcome", &self.final_outcome)
            .field("settle_delay", &self.settle_delay)
            .field("notify_delay", &self.notify_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_builds_one_duration_per_phase() {
        let config = SequenceConfig::uniform(vec!["A", "B", "C"], Duration::from_millis(700));
        assert_eq!(config.step_durations, vec![Duration::from_millis(700); 3]);
    }

    #[test]
    fn defaults_use_motion_params() {
        let config = SequenceConfig::new(vec!["A"], vec![Duration::ZERO]);
        assert_eq!(config.settle_delay, Duration::from_millis(900));
        assert_eq!(config.notify_delay, Duration::from_millis(1300));
    }

    #[test]
    fn deferred_outcome_decides_lazily() {
        let outcome = FinalOutcome::Deferred(Box::new(|| false));
        assert!(!outcome.decide());
    }
}
