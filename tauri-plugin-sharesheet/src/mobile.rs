//! Mobile backend bridging to the native Android/iOS share sheet.
//!
//! - **Android**: Kotlin plugin using `Intent.createChooser`, a FileProvider
//!   and a broadcast receiver for `EXTRA_CHOSEN_COMPONENT`
//! - **iOS**: Swift plugin presenting `UIActivityViewController`

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tauri::{
    ipc::{Channel, InvokeResponseBody},
    plugin::{PluginApi, PluginHandle},
    AppHandle, Runtime,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::*;
use crate::session::{ChooserHandler, ShareBackend};

#[cfg(target_os = "ios")]
tauri::ios_plugin_binding!(init_plugin_sharesheet);

/// Initialize the mobile plugin by registering with the native layer.
pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    api: PluginApi<R, C>,
) -> crate::Result<MobileBackend<R>> {
    #[cfg(target_os = "android")]
    let handle = api.register_android_plugin("app.tauri.sharesheet", "SharesheetPlugin")?;
    #[cfg(target_os = "ios")]
    let handle = api.register_ios_plugin(init_plugin_sharesheet)?;
    Ok(MobileBackend(handle))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExposeFileArgs<'a> {
    path: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterReceiverArgs<'a> {
    action: &'a str,
    on_chosen: Channel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnregisterReceiverArgs {
    action: String,
}

/// Native share sheet reached through the plugin handle.
pub struct MobileBackend<R: Runtime>(PluginHandle<R>);

impl<R: Runtime> ShareBackend for MobileBackend<R> {
    fn expose_file(&self, path: &Path) -> Result<String> {
        let exposed: ExposedFile = self.0.run_mobile_plugin(
            "exposeFile",
            ExposeFileArgs {
                path: &path.to_string_lossy(),
            },
        )?;
        Ok(exposed.uri)
    }

    fn register_chooser_callback(&self, action: &str, handler: ChooserHandler) -> Result<()> {
        let on_chosen = Channel::new(move |body: InvokeResponseBody| {
            // An unreadable payload still means the chooser reported a pick.
            let callback = body.deserialize::<ChooserCallback>().unwrap_or_else(|e| {
                warn!("Error reading chooser callback: {}", e);
                ChooserCallback::default()
            });
            handler(callback);
            Ok(())
        });

        // Kotlin returns JSObject (empty map `{}`), so we deserialize to Value and discard it
        self.0
            .run_mobile_plugin::<serde_json::Value>(
                "registerChooserReceiver",
                RegisterReceiverArgs { action, on_chosen },
            )
            .map(|_| ())
            .map_err(Into::into)
    }

    fn unregister_chooser_callback(&self, action: &str) {
        // Reached from inside the chooser channel callback; must not block it.
        let handle = self.0.clone();
        let args = UnregisterReceiverArgs {
            action: action.to_string(),
        };
        tauri::async_runtime::spawn_blocking(move || {
            if let Err(e) =
                handle.run_mobile_plugin::<serde_json::Value>("unregisterChooserReceiver", args)
            {
                debug!("Unregistering chooser receiver failed: {}", e);
            }
        });
    }

    fn start_chooser(&self, intent: &ChooserIntent) -> Result<()> {
        self.0
            .run_mobile_plugin::<serde_json::Value>("startChooser", intent)
            .map(|_| ())
            .map_err(map_start_error)
    }

    /// `UIActivityViewController` always reports back; Android's chooser
    /// only reports a pick, never a dismissal.
    fn reports_definitive_outcome(&self) -> bool {
        cfg!(target_os = "ios")
    }
}

/// Map native chooser errors to our error type.
///
/// Native code prefixes intent-building failures with `INTENT_ERROR`.
fn map_start_error(err: tauri::plugin::mobile::PluginInvokeError) -> Error {
    let msg = err.to_string();
    if msg.contains("INTENT_ERROR") {
        Error::IntentConstruction(msg)
    } else {
        Error::ActivityStart(msg)
    }
}
