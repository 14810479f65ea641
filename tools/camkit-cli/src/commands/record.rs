//! Record for a fixed duration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use camkit_capture_engine::{set_mute, VideoRecorder};
use camkit_common::config::AppConfig;
use camkit_device_synthetic::SyntheticRecorderFactory;

use super::{session_manager, SessionRequest};

pub async fn run(
    config: &AppConfig,
    request: &SessionRequest,
    output: PathBuf,
    secs: f64,
    muted: bool,
) -> anyhow::Result<()> {
    let duration = recording_duration(secs)?;

    let manager = session_manager(config);
    let session = manager
        .open(request.overrides.as_ref(), request.viewport)
        .await?;
    if muted {
        set_mute(&session, true)?;
    }

    let recorder = VideoRecorder::new(
        Arc::new(SyntheticRecorderFactory::new().generating_chunks()),
        config.recording.clone(),
    );
    let mut recording = recorder.start(&session)?;
    println!("Recording {} for {secs:.1}s...", recording.mime_type());

    tokio::time::sleep(duration).await;
    let result = recording.stop().await;
    manager.close(&session)?;

    let video = result?;
    std::fs::write(&output, &video.bytes)?;
    println!(
        "Saved {} chunks ({} bytes, {:.2}s) to {}",
        video.chunk_count,
        video.bytes.len(),
        video.duration_secs,
        output.display()
    );
    Ok(())
}

fn recording_duration(secs: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("--secs must be a non-negative, representable duration, got {secs}"))
}
