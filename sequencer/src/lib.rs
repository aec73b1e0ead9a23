//! Verification sequencer for the specter client.
//!
//! Drives an ordered list of textual "phase" messages forward on a timer and
//! resolves to a granted/denied outcome after a settle delay, then notifies
//! the host. The production client expressed this five separate times as
//! nested timeouts; here it is one component:
//!
//! 1. **Scheduling**: every phase transition is scheduled at its own
//!    cumulative offset from run start, never chained from the previous
//!    callback, so transitions fire strictly in index order.
//! 2. **Cancellation**: all timer handles for a run live in one owned
//!    [`TimerPool`] and are discarded as a unit. A generation counter guards
//!    every callback, so a timer that slipped past its abort can still never
//!    touch state from a disposed run.
//!
//! The canvas background renderer ([`canvas`]) is purely cosmetic and has no
//! data dependency on the sequencer.

pub mod canvas;
pub mod config;
pub mod presets;
pub mod run;
pub mod sequencer;
pub mod timers;

pub use canvas::{frame_at, CanvasFrame, CanvasLoop};
pub use config::{FinalOutcome, SequenceConfig};
pub use run::VerificationRun;
pub use sequencer::{Sequencer, SequencerState};
pub use timers::TimerPool;
