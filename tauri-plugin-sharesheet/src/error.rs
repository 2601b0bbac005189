//! Error types for the sharesheet plugin.

use serde::{Deserialize, Serialize};

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a share before the chooser reports an outcome.
///
/// None of these reach the caller of `share`: each one is turned into a
/// `share_failed` event carrying the display message.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", content = "message")]
pub enum Error {
    /// `share` was called before the plugin captured its host.
    #[error("Share host not initialized")]
    NotInitialized,

    /// The attachment path does not point at an existing file.
    #[error("File does not exist: {0}")]
    FileNotFound(String),

    /// The file exists but could not be exposed to other apps.
    #[error("The selected file can't be shared: {0}")]
    FileNotShareable(String),

    /// The native side could not build the chooser or its callback intent.
    #[error("Failed to create chooser intent: {0}")]
    IntentConstruction(String),

    /// The native side could not present the chooser.
    #[error("Failed to start share activity: {0}")]
    ActivityStart(String),

    /// There is no system chooser on this platform.
    #[error("Sharing not supported: {0}")]
    Unsupported(String),

    /// Mobile plugin invocation error.
    #[cfg(mobile)]
    #[error("Plugin invoke error: {0}")]
    PluginInvoke(String),
}

#[cfg(mobile)]
impl From<tauri::plugin::mobile::PluginInvokeError> for Error {
    fn from(err: tauri::plugin::mobile::PluginInvokeError) -> Self {
        Error::PluginInvoke(err.to_string())
    }
}
