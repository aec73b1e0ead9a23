//! Motion parameters — the timing constants of the verification theater.
//!
//! Every value here is presentation pacing, not protocol behavior. The
//! defaults reproduce the production client's choreography; hosts may
//! override them (e.g. the console config file).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and rendering parameters shared by the sequencer and the canvas
/// background renderer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MotionParams {
    /// Pause after the last phase before the outcome is revealed (ms).
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Delay from outcome-set until the completion callback fires (ms).
    #[serde(default = "default_notify_ms")]
    pub notify_ms: u64,

    /// Interval between canvas frames (ms). ~60 fps in the original client.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Canvas width in logical units.
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    /// Canvas height in logical units.
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,

    /// Background grid spacing in logical units.
    #[serde(default = "default_grid_step")]
    pub grid_step: f64,

    /// User/environment preference to suppress continuous decorative
    /// animation. When set, free-running renderers never start.
    #[serde(default)]
    pub reduced_motion: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_settle_ms() -> u64 {
    900
}

fn default_notify_ms() -> u64 {
    1300
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_canvas_width() -> f64 {
    800.0
}

fn default_canvas_height() -> f64 {
    220.0
}

fn default_grid_step() -> f64 {
    28.0
}

// ── Impl ───────────────────────────────────────────────────────────────

impl MotionParams {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            notify_ms: default_notify_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            grid_step: default_grid_step(),
            reduced_motion: false,
        }
    }
}
