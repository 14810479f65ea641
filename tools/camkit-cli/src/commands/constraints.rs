//! Print the merged capture request.

use camkit_common::config::AppConfig;

use super::{session_manager, SessionRequest};

pub fn run(config: &AppConfig, request: &SessionRequest) -> anyhow::Result<()> {
    let manager = session_manager(config);
    let spec = manager.constraints_for(request.overrides.as_ref(), request.viewport);
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}
