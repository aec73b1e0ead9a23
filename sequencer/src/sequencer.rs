//! The sequencer — connects run state, the timer pool, and host callbacks
//! into the single verification choreography component.

use crate::config::{CompleteCallback, FinalOutcome, PhaseCallback, SequenceConfig};
use crate::run::VerificationRun;
use crate::timers::TimerPool;
use specter_types::Outcome;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Observable state of the sequencer.
///
/// `Settling` spans from the end of the last phase's hold until the
/// completion callback is delivered; the outcome may already be terminal
/// during the tail of it (readable via [`Sequencer::outcome`]). `Resolved`
/// begins exactly when `on_complete` has fired, so a `cancel` any time
/// before that still silences every callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running { phase_index: usize },
    Settling,
    Resolved { outcome: Outcome },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Idle,
    Running,
    Settling,
    Resolved,
}

struct Inner {
    /// Bumped under the lock on every start and cancel. Every timer callback
    /// carries the generation it was scheduled under and bails when it no
    /// longer matches, so a timer that slipped past its abort can never
    /// mutate state from a disposed run.
    generation: u64,
    stage: Stage,
    run: Option<VerificationRun>,
    timers: TimerPool,
    /// The phase callback lives in its own slot, locked only while invoking,
    /// so two timers sharing a deadline on a multi-thread runtime both
    /// deliver their notification instead of one finding the slot empty.
    /// Start and cancel swap in a fresh slot rather than locking this one,
    /// which keeps the state lock and the slot lock un-nested.
    on_phase_change: Arc<Mutex<Option<PhaseCallback>>>,
    on_complete: Option<CompleteCallback>,
    final_outcome: Option<FinalOutcome>,
}

/// Drives phase messages forward on a timer and resolves to a terminal
/// outcome. One run at a time; cheaply cloneable handle.
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct Sequencer {
    inner: Arc<Mutex<Inner>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                stage: Stage::Idle,
                run: None,
                timers: TimerPool::new(),
                on_phase_change: Arc::new(Mutex::new(None)),
                on_complete: None,
                final_outcome: None,
            })),
        }
    }

    /// Begin a fresh run at phase 0 immediately.
    ///
    /// If a run is already in flight its pending timers are discarded first;
    /// no notification from the replaced run can fire afterwards.
    pub fn start(&self, config: SequenceConfig) {
        let arc = Arc::clone(&self.inner);
        let generation = {
            let mut inner = self.inner.lock().unwrap();
            begin_run(&arc, &mut inner, config)
        };
        fire_phase(&self.inner, generation, 0);
    }

    /// The idempotent start guard: a no-op returning `false` while a run is
    /// in flight, otherwise starts and returns `true`.
    pub fn start_if_idle(&self, config: SequenceConfig) -> bool {
        let arc = Arc::clone(&self.inner);
        let generation = {
            let mut inner = self.inner.lock().unwrap();
            if matches!(inner.stage, Stage::Running | Stage::Settling) {
                return false;
            }
            begin_run(&arc, &mut inner, config)
        };
        fire_phase(&self.inner, generation, 0);
        true
    }

    /// Discard every outstanding timer synchronously; no further callback
    /// fires. Safe to call repeatedly, before any `start`, and after natural
    /// completion (no-op on `Idle` and `Resolved`).
    ///
    /// This is the host's explicit teardown path — call it whenever the
    /// hosting view goes away.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.stage {
            Stage::Idle | Stage::Resolved => {}
            Stage::Running | Stage::Settling => {
                inner.timers.cancel_all();
                inner.generation += 1;
                inner.stage = Stage::Idle;
                inner.on_phase_change = Arc::new(Mutex::new(None));
                inner.on_complete = None;
                inner.final_outcome = None;
                // The run itself is kept: the last committed phase index
                // stays readable after cancellation.
                tracing::debug!("verification run cancelled");
            }
        }
    }

    pub fn state(&self) -> SequencerState {
        let inner = self.inner.lock().unwrap();
        match inner.stage {
            Stage::Idle => SequencerState::Idle,
            Stage::Running => SequencerState::Running {
                phase_index: inner
                    .run
                    .as_ref()
                    .map_or(0, VerificationRun::current_phase_index),
            },
            Stage::Settling => SequencerState::Settling,
            Stage::Resolved => SequencerState::Resolved {
                outcome: inner.run.as_ref().map_or(Outcome::Pending, VerificationRun::outcome),
            },
        }
    }

    /// Index of the currently active phase of the latest run, if any.
    pub fn current_phase(&self) -> Option<usize> {
        let inner = self.inner.lock().unwrap();
        inner.run.as_ref().map(VerificationRun::current_phase_index)
    }

    /// Label of the currently active phase of the latest run.
    pub fn phase_label(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .run
            .as_ref()
            .and_then(|run| run.phase_label().map(str::to_owned))
    }

    pub fn outcome(&self) -> Outcome {
        let inner = self.inner.lock().unwrap();
        inner.run.as_ref().map_or(Outcome::Pending, VerificationRun::outcome)
    }

    /// Completed fraction of the latest run's phases as a percentage.
    pub fn progress_percent(&self) -> Option<u8> {
        let inner = self.inner.lock().unwrap();
        inner.run.as_ref().map(VerificationRun::progress_percent)
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.inner.lock().unwrap().stage,
            Stage::Running | Stage::Settling
        )
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a new run and schedule its entire timeline against one shared
/// origin instant. Caller holds the lock.
fn begin_run(arc: &Arc<Mutex<Inner>>, inner: &mut Inner, config: SequenceConfig) -> u64 {
    inner.timers.cancel_all();
    inner.generation += 1;
    let generation = inner.generation;

    let started_at = Instant::now();
    let run = VerificationRun::new(config.phases, config.step_durations, started_at);
    let phase_count = run.phases().len();

    tracing::debug!(phases = phase_count, "verification run started");

    inner.on_phase_change = Arc::new(Mutex::new(config.on_phase_change));
    inner.on_complete = config.on_complete;
    inner.final_outcome = Some(config.final_outcome);
    inner.stage = Stage::Running;

    // One timer per phase boundary, each at its own cumulative offset.
    for index in 1..phase_count {
        let deadline = started_at + run.transition_offset(index);
        let arc = Arc::clone(arc);
        inner
            .timers
            .schedule_at(deadline, move || fire_phase(&arc, generation, index));
    }

    let settle_at = started_at + run.total_phase_time();
    let outcome_at = settle_at + config.settle_delay;
    let complete_at = outcome_at + config.notify_delay;

    {
        let arc = Arc::clone(arc);
        inner
            .timers
            .schedule_at(settle_at, move || enter_settling(&arc, generation));
    }
    {
        let arc = Arc::clone(arc);
        inner
            .timers
            .schedule_at(outcome_at, move || resolve_outcome(&arc, generation));
    }
    {
        let arc = Arc::clone(arc);
        inner
            .timers
            .schedule_at(complete_at, move || deliver_completion(&arc, generation));
    }

    inner.run = Some(run);
    generation
}

fn fire_phase(inner: &Arc<Mutex<Inner>>, generation: u64, index: usize) {
    let slot = {
        let mut guard = inner.lock().unwrap();
        if guard.generation != generation || guard.stage != Stage::Running {
            return;
        }
        let Some(run) = guard.run.as_mut() else {
            return;
        };
        run.advance_to(index);
        tracing::trace!(index, label = run.phase_label().unwrap_or(""), "phase transition");
        Arc::clone(&guard.on_phase_change)
    };

    // Invoked with the state lock released so the host may call back into
    // the sequencer; a start from inside the callback installs a fresh slot,
    // so the new run's phase 0 notification does not self-deadlock.
    if let Some(f) = slot.lock().unwrap().as_mut() {
        f(index);
    };
}

fn enter_settling(inner: &Arc<Mutex<Inner>>, generation: u64) {
    // A zero-duration final hold puts the last phase transition at this same
    // deadline, and timers sharing a deadline fire in no particular order.
    // Commit any pending final transition first so settling never precedes it.
    let pending_final = {
        let guard = inner.lock().unwrap();
        if guard.generation != generation || guard.stage != Stage::Running {
            return;
        }
        guard.run.as_ref().and_then(|run| {
            let last = run.phases().len().saturating_sub(1);
            (run.current_phase_index() < last).then_some(last)
        })
    };
    if let Some(last) = pending_final {
        fire_phase(inner, generation, last);
    }

    let mut guard = inner.lock().unwrap();
    if guard.generation != generation || guard.stage != Stage::Running {
        return;
    }
    guard.stage = Stage::Settling;
    tracing::trace!("settling");
}

fn resolve_outcome(inner: &Arc<Mutex<Inner>>, generation: u64) {
    // Same shared-deadline hazard with a zero settle delay.
    enter_settling(inner, generation);

    let decision = {
        let mut guard = inner.lock().unwrap();
        if guard.generation != generation || guard.stage != Stage::Settling {
            return;
        }
        guard.final_outcome.take()
    };
    let Some(decision) = decision else {
        return;
    };

    // A deferred decision is host code; run it unlocked.
    let granted = decision.decide();

    let mut guard = inner.lock().unwrap();
    if guard.generation != generation || guard.stage != Stage::Settling {
        return;
    }
    if let Some(run) = guard.run.as_mut() {
        run.resolve(granted);
        tracing::debug!(outcome = %run.outcome(), "verification outcome set");
    }
}

fn deliver_completion(inner: &Arc<Mutex<Inner>>, generation: u64) {
    // Same shared-deadline hazard with a zero notify delay.
    resolve_outcome(inner, generation);

    let (callback, granted) = {
        let mut guard = inner.lock().unwrap();
        if guard.generation != generation || guard.stage != Stage::Settling {
            return;
        }
        let Some(granted) = guard.run.as_ref().and_then(|run| run.outcome().granted()) else {
            return;
        };
        guard.stage = Stage::Resolved;
        (guard.on_complete.take(), granted)
    };
    if let Some(f) = callback {
        f(granted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn three_phase() -> SequenceConfig {
        SequenceConfig::uniform(vec!["A", "B", "C"], Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn starts_at_phase_zero() {
        let seq = Sequencer::new();
        seq.start(three_phase());
        assert_eq!(seq.state(), SequencerState::Running { phase_index: 0 });
        assert_eq!(seq.phase_label().as_deref(), Some("A"));
        assert_eq!(seq.outcome(), Outcome::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_start_is_a_noop() {
        let seq = Sequencer::new();
        seq.cancel();
        seq.cancel();
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_reentrant_after_completion() {
        let seq = Sequencer::new();
        seq.start(three_phase());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(
            seq.state(),
            SequencerState::Resolved {
                outcome: Outcome::Granted
            }
        );
        seq.cancel();
        seq.cancel();
        // Resolved is terminal until the next start.
        assert_eq!(
            seq.state(),
            SequencerState::Resolved {
                outcome: Outcome::Granted
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_completion_resets_progress() {
        let seq = Sequencer::new();
        seq.start(three_phase());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seq.outcome(), Outcome::Granted);

        seq.start(three_phase().outcome(false));
        assert_eq!(seq.state(), SequencerState::Running { phase_index: 0 });
        assert_eq!(seq.outcome(), Outcome::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn start_if_idle_guards_a_run_in_flight() {
        let seq = Sequencer::new();
        assert!(seq.start_if_idle(three_phase()));
        assert!(!seq.start_if_idle(three_phase()));

        tokio::time::sleep(Duration::from_millis(150)).await;
        // The original run is untouched by the rejected start.
        assert_eq!(seq.state(), SequencerState::Running { phase_index: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn progress_tracks_phase_index() {
        let seq = Sequencer::new();
        seq.start(three_phase());
        assert_eq!(seq.progress_percent(), Some(0));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(seq.progress_percent(), Some(50));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(seq.progress_percent(), Some(100));
    }
}
