#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use lanesight::context::LaneContextStore;
use lanesight::pipeline::{LaneOverlay, LanePipeline, PipelineConfig};
use lanesight::source::ImageDirSource;
use lanesight_inference::segment::RoadSegmentationSession;
use log::{debug, info};
use std::env;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ort=warn")),
        )
        .init();

    let model_path =
        env::var("LANESIGHT_MODEL").unwrap_or_else(|_| "./data/model/road_seg.onnx".to_string());
    let frame_dir = env::var("LANESIGHT_FRAMES").unwrap_or_else(|_| "./data/image".to_string());

    let model = Arc::new(RoadSegmentationSession::new(&model_path)?);
    info!("segmentation model loaded from {model_path}");

    let source = ImageDirSource::open(&frame_dir)?;
    let store = Arc::new(LaneContextStore::new());

    // stand-in overlay consumer; a real renderer would draw the path
    let (overlay_tx, mut overlay_rx) = mpsc::channel::<LaneOverlay>(4);
    let overlay_task = tokio::spawn(async move {
        while let Some(overlay) = overlay_rx.recv().await {
            debug!(
                "overlay frame: {} path sample(s), lane {} of {}",
                overlay.path.len(),
                overlay.ego_lane,
                overlay.total_lanes
            );
        }
    });

    let pipeline = LanePipeline::spawn(
        PipelineConfig::default(),
        Box::new(source),
        model,
        Arc::clone(&store),
        Some(overlay_tx),
    )?;
    info!("lane pipeline running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    pipeline.stop().await;
    overlay_task.abort();

    info!("{}", store.context_line());
    Ok(())
}
