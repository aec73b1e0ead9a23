//! Transient state of one verification run.

use specter_types::Outcome;
use std::time::Duration;
use tokio::time::Instant;

/// The state of a single execution of the sequencer, from `start()` to a
/// terminal outcome or cancellation.
///
/// Mutated only by the sequencer's timer callbacks. The phase index is
/// monotone and never exceeds `phases.len() - 1`; the outcome transitions
/// once, `Pending → Granted` or `Pending → Denied`.
#[derive(Debug)]
pub struct VerificationRun {
    phases: Vec<String>,
    step_durations: Vec<Duration>,
    current_phase_index: usize,
    outcome: Outcome,
    started_at: Instant,
}

impl VerificationRun {
    /// Create a run at phase 0 with a pending outcome.
    ///
    /// `step_durations` is normalized to one entry per phase: missing tail
    /// entries repeat the last provided duration (zero if none was given),
    /// extra entries are ignored.
    pub fn new(phases: Vec<String>, mut step_durations: Vec<Duration>, started_at: Instant) -> Self {
        let fill = step_durations.last().copied().unwrap_or(Duration::ZERO);
        step_durations.resize(phases.len(), fill);
        Self {
            phases,
            step_durations,
            current_phase_index: 0,
            outcome: Outcome::Pending,
            started_at,
        }
    }

    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    pub fn step_durations(&self) -> &[Duration] {
        &self.step_durations
    }

    pub fn current_phase_index(&self) -> usize {
        self.current_phase_index
    }

    /// Label of the currently active phase, if any phases exist.
    pub fn phase_label(&self) -> Option<&str> {
        self.phases.get(self.current_phase_index).map(String::as_str)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Offset from run start at which the transition into phase `index`
    /// fires: the prefix sum of the first `index` step durations.
    pub fn transition_offset(&self, index: usize) -> Duration {
        self.step_durations[..index.min(self.step_durations.len())]
            .iter()
            .sum()
    }

    /// Total display time of all phases (transitions plus the final hold).
    pub fn total_phase_time(&self) -> Duration {
        self.step_durations.iter().sum()
    }

    /// Advance to `index`. Monotone: an index at or below the current one is
    /// ignored, and the index is clamped to the last phase.
    pub(crate) fn advance_to(&mut self, index: usize) {
        let clamped = index.min(self.phases.len().saturating_sub(1));
        if clamped > self.current_phase_index {
            self.current_phase_index = clamped;
        }
    }

    /// Resolve a pending outcome. A terminal outcome never changes.
    pub(crate) fn resolve(&mut self, granted: bool) {
        if self.outcome.is_pending() {
            self.outcome = Outcome::resolved(granted);
        }
    }

    /// Completed fraction of the phase list as a whole percentage, 0 at
    /// phase 0 and 100 at the last phase. This is what the progress-bar
    /// sequences display.
    pub fn progress_percent(&self) -> u8 {
        if self.phases.len() <= 1 {
            return 100;
        }
        let done = self.current_phase_index as f64 / (self.phases.len() - 1) as f64;
        (done * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(durations: &[u64]) -> VerificationRun {
        let phases = (0..durations.len()).map(|i| format!("P{i}")).collect();
        let durations = durations.iter().map(|&ms| Duration::from_millis(ms)).collect();
        VerificationRun::new(phases, durations, Instant::now())
    }

    #[test]
    fn starts_at_phase_zero_pending() {
        let run = run_with(&[100, 100, 100]);
        assert_eq!(run.current_phase_index(), 0);
        assert_eq!(run.outcome(), Outcome::Pending);
        assert_eq!(run.phase_label(), Some("P0"));
    }

    #[test]
    fn transition_offsets_are_prefix_sums() {
        let run = run_with(&[700, 700, 800, 900, 1500]);
        assert_eq!(run.transition_offset(0), Duration::ZERO);
        assert_eq!(run.transition_offset(1), Duration::from_millis(700));
        assert_eq!(run.transition_offset(3), Duration::from_millis(2200));
        assert_eq!(run.transition_offset(4), Duration::from_millis(3100));
        assert_eq!(run.total_phase_time(), Duration::from_millis(4600));
    }

    #[test]
    fn advance_is_monotone_and_clamped() {
        let mut run = run_with(&[100, 100, 100]);
        run.advance_to(2);
        assert_eq!(run.current_phase_index(), 2);
        run.advance_to(1);
        assert_eq!(run.current_phase_index(), 2);
        run.advance_to(99);
        assert_eq!(run.current_phase_index(), 2);
    }

    #[test]
    fn outcome_resolves_once() {
        let mut run = run_with(&[100]);
        run.resolve(false);
        assert_eq!(run.outcome(), Outcome::Denied);
        run.resolve(true);
        assert_eq!(run.outcome(), Outcome::Denied);
    }

    #[test]
    fn durations_normalized_to_phase_count() {
        let phases = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let run = VerificationRun::new(
            phases,
            vec![Duration::from_millis(50)],
            Instant::now(),
        );
        assert_eq!(run.step_durations().len(), 3);
        assert_eq!(run.transition_offset(2), Duration::from_millis(100));
    }

    #[test]
    fn progress_spans_zero_to_hundred() {
        let mut run = run_with(&[200; 11]);
        assert_eq!(run.progress_percent(), 0);
        run.advance_to(5);
        assert_eq!(run.progress_percent(), 50);
        run.advance_to(10);
        assert_eq!(run.progress_percent(), 100);
    }
}
