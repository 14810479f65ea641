//! Open a session and report what it offers.

use camkit_capture_engine::{light_capability, set_light};
use camkit_common::config::AppConfig;
use camkit_common::error::CamkitError;
use camkit_device_core::{MediaTrack, TrackCapabilities};

use super::{session_manager, SessionRequest};

pub async fn run(
    config: &AppConfig,
    request: &SessionRequest,
    toggle_light: bool,
) -> anyhow::Result<()> {
    let manager = session_manager(config);
    let session = manager
        .open(request.overrides.as_ref(), request.viewport)
        .await?;

    println!("camkit device probe");
    println!("{}", "=".repeat(50));
    println!("Session: {} (opened {})", session.id(), session.opened_at());
    for track in session.tracks()? {
        let caps = TrackCapabilities::from_raw(&track.capabilities());
        println!(
            "[{}] {} ({}) state={:?} enabled={}",
            track.kind(),
            track.label(),
            track.id(),
            track.ready_state(),
            track.is_enabled()
        );
        println!("     capabilities: {}", caps.raw);
    }

    let light = light_capability(&session)?;
    println!();
    println!(
        "Light control: torch={} fillLightMode={}",
        light.torch, light.fill_light
    );

    if toggle_light {
        for on in [true, false] {
            match set_light(&session, on).await {
                Ok(state) => println!("[OK] light {}", if state { "on" } else { "off" }),
                Err(CamkitError::UnsupportedCapability { message }) => {
                    println!("[SKIP] {message}");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    manager.close(&session)?;
    Ok(())
}
