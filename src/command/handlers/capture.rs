//! Capture: take_screenshot

use crate::actions::params::ScreenshotParams;
use crate::command::desktop::Desktop;
use crate::command::resolver::PathResolver;
use crate::core::error::{HandlerError, HandlerResult};

pub async fn take_screenshot(
    desktop: &dyn Desktop,
    resolver: &PathResolver,
    default_name: &str,
    params: &ScreenshotParams,
) -> HandlerResult {
    let filename = params
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(default_name);
    let path = resolver.resolve(filename);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| HandlerError::Capture(e.to_string()))?;
    }

    desktop
        .capture_screen(&path)
        .await
        .map_err(|e| HandlerError::Capture(e.to_string()))?;

    Ok(format!("Screenshot saved to: {}", path.display()))
}
