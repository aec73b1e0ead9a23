//! Preset sequences — the production client's five ad-hoc timer chains,
//! each re-expressed as a configuration of the one sequencer.
//!
//! Timings are carried over from the shipped client unchanged; only the
//! scheduling mechanism differs.

use crate::config::{FinalOutcome, SequenceConfig};
use rand::Rng;
use std::time::Duration;

/// Phase labels of the login/register security checkpoint.
pub const SECURITY_PHASES: [&str; 5] = [
    "INITIALIZING SECURITY PROTOCOL...",
    "SCANNING CREDENTIALS...",
    "VALIDATING USER DATA...",
    "ESTABLISHING SECURE CONNECTION TO DATABASES...",
    "FINGERPRINT AUTHENTICATION...",
];

/// Phase labels of the connection sequence.
pub const CONNECTION_PHASES: [&str; 5] = [
    "CONNECTING TO NODE...",
    "HANDSHAKE...",
    "ENCRYPTING CHANNEL...",
    "INDEXING DATASETS...",
    "READY.",
];

/// Symbol alphabet of the password-slot roulette.
pub const SLOT_SYMBOLS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Security checkpoint: five phases at 700/700/800/900 ms with a 1500 ms
/// hold on the final phase, then the default settle/notify reveal.
///
/// The outcome is the caller's decision — typically deferred until the
/// backend's auth reply is in.
pub fn security_checkpoint(outcome: impl Into<FinalOutcome>) -> SequenceConfig {
    SequenceConfig::new(
        SECURITY_PHASES.to_vec(),
        [700, 700, 800, 900, 1500]
            .into_iter()
            .map(Duration::from_millis)
            .collect(),
    )
    .outcome(outcome)
}

/// Connection sequence: uniform 700 ms steps, completion 400 ms after the
/// final phase's hold, no separate outcome reveal.
pub fn connection_sequence() -> SequenceConfig {
    SequenceConfig::uniform(CONNECTION_PHASES.to_vec(), Duration::from_millis(700))
        .settle(Duration::from_millis(400))
        .notify(Duration::ZERO)
}

/// Fingerprint scan: progress 0 → 100 % in ten 200 ms increments, then a
/// 1000 ms hold before completion.
///
/// Mirrors the click-guarded widget: with nothing selected the scan does not
/// start and `None` is returned. Hosts should start this via
/// `start_if_idle` so a scan in flight is never restarted.
pub fn fingerprint_scan(selected_count: usize) -> Option<SequenceConfig> {
    if selected_count == 0 {
        return None;
    }
    let phases: Vec<String> = (0..=10)
        .map(|step| format!("SCANNING FINGERPRINTS... {}%", step * 10))
        .collect();
    let mut durations = vec![Duration::from_millis(200); 10];
    durations.push(Duration::ZERO); // reaching 100% is the end of the scan
    Some(
        SequenceConfig::new(phases, durations)
            .settle(Duration::from_millis(1000))
            .notify(Duration::ZERO),
    )
}

/// Password slots: a 3000 ms roulette over `slots` positions at 100 ms per
/// tick, landing on `target`, then a 1000 ms hold before completion.
///
/// Every intermediate phase is a fresh random symbol row; the final phase is
/// the aligned target.
pub fn password_slots(slots: usize, target: &str, rng: &mut impl Rng) -> SequenceConfig {
    let mut phases: Vec<String> = (0..29)
        .map(|_| random_symbol_row(slots, rng))
        .collect();
    phases.push(target.to_string());

    SequenceConfig::uniform(phases, Duration::from_millis(100))
        .settle(Duration::from_millis(1000))
        .notify(Duration::ZERO)
}

/// A random row of `slots` symbols from the slot alphabet.
pub fn random_symbol_row(slots: usize, rng: &mut impl Rng) -> String {
    (0..slots)
        .map(|_| SLOT_SYMBOLS[rng.gen_range(0..SLOT_SYMBOLS.len())] as char)
        .collect()
}

/// Circuit puzzle: one 800 ms step per connection path, then a 1000 ms hold
/// before completion.
pub fn circuit_puzzle(connection_count: usize) -> SequenceConfig {
    let phases: Vec<String> = (0..=connection_count)
        .map(|step| format!("CONNECTING... {step}/{connection_count}"))
        .collect();
    let mut durations = vec![Duration::from_millis(800); connection_count];
    durations.push(Duration::ZERO);

    SequenceConfig::new(phases, durations)
        .settle(Duration::from_millis(1000))
        .notify(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn security_checkpoint_carries_production_timings() {
        let config = security_checkpoint(true);
        assert_eq!(config.phases, SECURITY_PHASES);
        let ms: Vec<u64> = config
            .step_durations
            .iter()
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(ms, vec![700, 700, 800, 900, 1500]);
        assert_eq!(config.settle_delay, Duration::from_millis(900));
        assert_eq!(config.notify_delay, Duration::from_millis(1300));
    }

    #[test]
    fn connection_sequence_completes_400ms_after_last_phase() {
        let config = connection_sequence();
        assert_eq!(config.phases.len(), 5);
        assert_eq!(config.settle_delay, Duration::from_millis(400));
        assert_eq!(config.notify_delay, Duration::ZERO);
    }

    #[test]
    fn fingerprint_scan_requires_a_selection() {
        assert!(fingerprint_scan(0).is_none());
        let config = fingerprint_scan(3).expect("selection present");
        assert_eq!(config.phases.len(), 11);
        assert_eq!(config.phases[0], "SCANNING FINGERPRINTS... 0%");
        assert_eq!(config.phases[10], "SCANNING FINGERPRINTS... 100%");
        // 10 increments of 200 ms then the zero hold.
        let total: Duration = config.step_durations.iter().sum();
        assert_eq!(total, Duration::from_millis(2000));
    }

    #[test]
    fn password_slots_spin_for_three_seconds_and_land_on_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = password_slots(6, "K7F2QX", &mut rng);
        assert_eq!(config.phases.len(), 30);
        assert_eq!(config.phases.last().map(String::as_str), Some("K7F2QX"));
        for row in &config.phases[..29] {
            assert_eq!(row.len(), 6);
            assert!(row.bytes().all(|b| SLOT_SYMBOLS.contains(&b)));
        }
        let total: Duration = config.step_durations.iter().sum();
        assert_eq!(total, Duration::from_millis(3000));
    }

    #[test]
    fn circuit_puzzle_steps_once_per_connection() {
        let config = circuit_puzzle(4);
        assert_eq!(config.phases.len(), 5);
        assert_eq!(config.phases[0], "CONNECTING... 0/4");
        assert_eq!(config.phases[4], "CONNECTING... 4/4");
        let total: Duration = config.step_durations.iter().sum();
        assert_eq!(total, Duration::from_millis(3200));
    }
}
