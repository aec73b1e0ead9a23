//! Canvas background renderer — the pulsing node graph behind the
//! connection sequence.
//!
//! Purely cosmetic and fully independent of the sequencer: stopping the loop
//! or never starting it (reduced motion) changes nothing about phase
//! progression. Frame geometry is pure; the loop only advances a tick and
//! hands frames to the host.

use specter_types::MotionParams;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Ticks per full traversal of the connector line.
const CONNECTOR_PERIOD: u64 = 200;

/// One pulsing node of the background graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasNode {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// One rendered frame: grid spacing, node positions with their pulse radii,
/// and the traveling connector polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasFrame {
    pub tick: u64,
    pub grid_step: f64,
    pub nodes: Vec<CanvasNode>,
    pub connector: Vec<(f64, f64)>,
}

/// Compute the frame for a given tick. Pure; the same tick and parameters
/// always produce the same frame.
pub fn frame_at(tick: u64, params: &MotionParams) -> CanvasFrame {
    let (w, h) = (params.canvas_width, params.canvas_height);
    let anchors = [(w * 0.2, h * 0.5), (w * 0.5, h * 0.3), (w * 0.8, h * 0.5)];

    let nodes = anchors
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let pulse = 0.6 + 0.4 * (tick as f64 * 0.06 + i as f64).sin();
            CanvasNode {
                x,
                y,
                radius: 8.0 + pulse * 3.0,
            }
        })
        .collect();

    // The connector travels from the first node toward the last, bending at
    // the middle node over the first half of its period.
    let progress = (tick % CONNECTOR_PERIOD) as f64 / CONNECTOR_PERIOD as f64;
    let (x0, y0) = anchors[0];
    let (x1, y1) = anchors[1];
    let (x2, y2) = anchors[2];

    let target_x = x0 + (x2 - x0) * progress;
    let target_y = y0 + (y2 - y0) * progress;
    let bend_x = target_x.min(x1);
    let bend_y = y0 + (y1 - y0) * (progress * 2.0).min(1.0);

    let mut connector = vec![(x0, y0), (bend_x, bend_y)];
    if progress > 0.5 {
        connector.push((target_x, target_y));
    }

    CanvasFrame {
        tick,
        grid_step: params.grid_step,
        nodes,
        connector,
    }
}

/// Free-running frame loop.
///
/// While the host reports not-visible the tick does not advance and no frame
/// is emitted — draws pause, logical state elsewhere does not. With reduced
/// motion preferred the loop never starts. Dropping the handle stops it.
pub struct CanvasLoop {
    visible: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl CanvasLoop {
    /// Start emitting frames on the configured interval, or `None` when the
    /// reduced-motion preference is set.
    pub fn start(
        params: MotionParams,
        mut on_frame: impl FnMut(CanvasFrame) + Send + 'static,
    ) -> Option<Self> {
        if params.reduced_motion {
            tracing::debug!("reduced motion preferred, canvas loop not started");
            return None;
        }

        let visible = Arc::new(AtomicBool::new(true));
        let visible_task = Arc::clone(&visible);
        let interval = params.frame_interval();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut tick: u64 = 0;
            loop {
                ticker.tick().await;
                if !visible_task.load(Ordering::Relaxed) {
                    continue;
                }
                on_frame(frame_at(tick, &params));
                tick += 1;
            }
        });

        Some(Self { visible, handle })
    }

    /// Report host visibility. Hidden pauses frame emission and tick
    /// advancement; visible resumes from the same tick.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for CanvasLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
