//! Capture a still frame.

use std::path::PathBuf;
use std::sync::Arc;

use camkit_capture_engine::StillCapture;
use camkit_common::config::AppConfig;
use camkit_device_synthetic::{ImageRasterEncoder, PatternFeed};

use super::{session_manager, SessionRequest};

pub async fn run(
    config: &AppConfig,
    request: &SessionRequest,
    output: PathBuf,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let manager = session_manager(config);
    let session = manager
        .open(request.overrides.as_ref(), request.viewport)
        .await?;

    let feed = PatternFeed::new(width, height);
    let capture = StillCapture::new(Arc::new(ImageRasterEncoder::new()), config.photo.clone());
    let result = capture.take_photo(&feed).await;
    manager.close(&session)?;

    let photo = result?;
    std::fs::write(&output, &photo.bytes)?;
    println!(
        "Saved {}x{} {} ({} bytes) to {}",
        photo.width,
        photo.height,
        photo.mime_type,
        photo.bytes.len(),
        output.display()
    );
    Ok(())
}
