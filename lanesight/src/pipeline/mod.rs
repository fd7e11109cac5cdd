pub mod convert;

use crate::context::LaneContextStore;
use crate::pipeline::convert::ConversionExecutor;
use crate::scan::scan_lanes;
use crate::source::FrameSource;
use anyhow::{Context, Result};
use lanesight_inference::segment::{decode_heads, resample, RoadSegmentInference};
use lanesight_media::frame::ResizeFrame;
use lanesight_media::{letterbox, LetterboxConfig, Letterboxed};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cadence of the perception loop.
    pub tick: Duration,
    /// Fixed canvas every raw camera frame is resized onto first.
    pub working_canvas: (u32, u32),
    /// Segmentation model input dimensions.
    pub model_input: (u32, u32),
    /// Scan anchor column in mask space; `None` anchors at the center.
    pub ego_column: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            tick: Duration::from_millis(250),
            working_canvas: (640, 360),
            model_input: (640, 640),
            ego_column: None,
        }
    }
}

/// What the overlay renderer receives after a successful tick.
#[derive(Debug, Clone)]
pub struct LaneOverlay {
    pub path: Vec<(u32, u32)>,
    pub ego_lane: u32,
    pub total_lanes: u32,
}

/// The periodic lane perception loop.
///
/// Each tick runs geometry transform, inference, decode, resample and scan
/// strictly in order, then publishes into the shared store. Ticks never
/// overlap: a guard drops any tick that fires while the previous one is
/// still in flight. Stopping cancels the tick mid-hand-off and discards
/// its partial results instead of publishing them.
pub struct LanePipeline {
    shutdown: watch::Sender<bool>,
    worker: task::JoinHandle<()>,
}

impl LanePipeline {
    pub fn spawn(
        config: PipelineConfig,
        source: Box<dyn FrameSource>,
        model: Arc<dyn RoadSegmentInference + Send + Sync>,
        store: Arc<LaneContextStore>,
        overlay: Option<mpsc::Sender<LaneOverlay>>,
    ) -> Result<Self> {
        let (shutdown, signal) = watch::channel(false);
        let worker = Worker {
            config,
            source,
            model,
            store,
            overlay,
            convert: ConversionExecutor::spawn()?,
            guard: TickGuard::new(),
        };
        let worker = tokio::spawn(run_worker(worker, signal));
        info!("lane pipeline started");
        Ok(LanePipeline { shutdown, worker })
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.worker.await {
            warn!("pipeline worker ended abnormally: {error}");
        }
        info!("lane pipeline stopped");
    }
}

struct Worker {
    config: PipelineConfig,
    source: Box<dyn FrameSource>,
    model: Arc<dyn RoadSegmentInference + Send + Sync>,
    store: Arc<LaneContextStore>,
    overlay: Option<mpsc::Sender<LaneOverlay>>,
    convert: ConversionExecutor,
    guard: TickGuard,
}

async fn run_worker(mut worker: Worker, mut signal: watch::Receiver<bool>) {
    let mut ticker = interval(worker.config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = signal.changed() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = signal.changed() => break,
            outcome = run_tick(&mut worker) => {
                if let Err(error) = outcome {
                    warn!("tick skipped: {error:#}");
                }
            }
        }
    }

    worker.convert.shutdown();
}

async fn run_tick(worker: &mut Worker) -> Result<()> {
    let _permit = match worker.guard.try_acquire() {
        Some(permit) => permit,
        None => {
            debug!("previous tick still in flight, dropping this one");
            return Ok(());
        }
    };

    let raw = worker.source.next_frame().context("frame source")?;

    // Pixel-format work is confined to the conversion executor; block on
    // the hand-off before resuming numeric work on this task.
    let canvas = worker.config.working_canvas;
    let letterbox_config = LetterboxConfig {
        target: worker.config.model_input,
        ..LetterboxConfig::default()
    };
    let prepared: Letterboxed = worker
        .convert
        .submit(move || {
            let mut frame = raw;
            frame.resize_to(canvas)?;
            Ok::<_, anyhow::Error>(letterbox(&frame, &letterbox_config)?)
        })
        .await
        .context("conversion executor dropped the request")??;

    let pad_top = prepared.pad_top;
    let pad_bottom = prepared.pad_bottom;

    let model = Arc::clone(&worker.model);
    let heads = task::spawn_blocking(move || model.segment_road(&prepared))
        .await
        .context("inference task aborted")??;

    let (drivable, lane_line) = decode_heads(&heads)?;
    let drivable = resample(&drivable, pad_top, pad_bottom)?;
    let lane_line = resample(&lane_line, pad_top, pad_bottom)?;

    let result = scan_lanes(
        &drivable,
        &lane_line,
        worker.config.ego_column,
        worker.overlay.is_some(),
    );

    worker
        .store
        .update(result.ego_lane as i32, result.total_lanes as i32);
    debug!(
        "lane context updated: lane {} of {}",
        result.ego_lane, result.total_lanes
    );

    if let Some(overlay) = &worker.overlay {
        let payload = LaneOverlay {
            path: result.path,
            ego_lane: result.ego_lane,
            total_lanes: result.total_lanes,
        };
        if overlay.try_send(payload).is_err() {
            debug!("overlay consumer is behind, dropping this frame");
        }
    }

    Ok(())
}

/// Non-reentrant guard around the tick body. Drop-if-busy: a tick that
/// fires while the permit is held is skipped entirely, nothing is queued.
struct TickGuard {
    busy: Arc<AtomicBool>,
}

struct TickPermit {
    busy: Arc<AtomicBool>,
}

impl TickGuard {
    fn new() -> Self {
        TickGuard {
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    fn try_acquire(&self) -> Option<TickPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .ok()
            .map(|_| TickPermit {
                busy: Arc::clone(&self.busy),
            })
    }
}

impl Drop for TickPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_until_released() {
        let guard = TickGuard::new();
        let permit = guard.try_acquire().unwrap();
        assert!(guard.try_acquire().is_none());
        drop(permit);
        assert!(guard.try_acquire().is_some());
    }
}
