use std::path::Path;

use serde::de::DeserializeOwned;
use tauri::{plugin::PluginApi, AppHandle, Runtime};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ChooserIntent;
use crate::session::{ChooserHandler, ShareBackend};

/// Initialize the desktop backend (there is no system chooser on desktop).
pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    _api: PluginApi<R, C>,
) -> crate::Result<DesktopBackend> {
    Ok(DesktopBackend)
}

/// Desktop stub.
///
/// The plugin still loads on desktop so apps stay cross-platform, but every
/// share ends in `share_failed`.
#[derive(Debug, Default)]
pub struct DesktopBackend;

impl ShareBackend for DesktopBackend {
    fn expose_file(&self, path: &Path) -> Result<String> {
        Ok(format!("file://{}", path.display()))
    }

    fn register_chooser_callback(&self, _action: &str, _handler: ChooserHandler) -> Result<()> {
        Ok(())
    }

    fn unregister_chooser_callback(&self, _action: &str) {}

    fn start_chooser(&self, intent: &ChooserIntent) -> Result<()> {
        debug!("No share sheet for {} on desktop", intent.mime_type);
        Err(Error::Unsupported(
            "no system share sheet on desktop".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_chooser_is_unsupported() {
        let intent = ChooserIntent {
            title: None,
            subject: None,
            text: Some("hello".into()),
            stream_uri: None,
            mime_type: "text/plain".into(),
            callback_action: "com.example.CHOOSER_TARGET_SELECTED.1".into(),
        };
        let err = DesktopBackend.start_chooser(&intent).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
