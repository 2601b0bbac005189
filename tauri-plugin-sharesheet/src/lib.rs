use std::sync::Arc;

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, RunEvent, Runtime,
};

pub use models::*;

#[cfg(desktop)]
mod desktop;
#[cfg(mobile)]
mod mobile;

mod commands;
mod config;
mod error;
mod models;
mod outcome;
mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use outcome::{Clock, SystemClock};
pub use session::{ChooserHandler, OutcomeSink, ShareBackend, ShareSession, Sharesheet};

use session::AppEventSink;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the sharesheet APIs.
pub trait SharesheetExt<R: Runtime> {
    fn sharesheet(&self) -> &Sharesheet;
}

impl<R: Runtime, T: Manager<R>> crate::SharesheetExt<R> for T {
    fn sharesheet(&self) -> &Sharesheet {
        self.state::<Sharesheet>().inner()
    }
}

/// Initializes the sharesheet plugin.
///
/// This plugin opens the OS share sheet and reports how it ended:
/// - `share_completed` with the picked target (or `UnknownActivity`)
/// - `share_canceled` when the user backed out
/// - `share_failed` with a message when the sheet could not be shown
///
/// Android rarely says whether a share went through, so when the chooser
/// callback never arrives the outcome is guessed from how long the app was
/// in the background.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("sharesheet")
        .invoke_handler(tauri::generate_handler![
            commands::share,
            commands::is_share_pending,
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            #[cfg(mobile)]
            let backend = mobile::init(app, api)?;
            #[cfg(desktop)]
            let backend = desktop::init(app, api)?;

            let session = ShareSession::new(
                Arc::new(backend),
                Arc::new(AppEventSink(app.clone())),
                config,
            );
            session.initialize(&app.config().identifier);
            app.manage(Sharesheet(Arc::new(session)));
            Ok(())
        })
        .on_event(|app, event| {
            let Some(sharesheet) = app.try_state::<Sharesheet>() else {
                return;
            };
            match event {
                RunEvent::Resumed => sharesheet.session().on_resume(),
                RunEvent::Exit => sharesheet.session().on_teardown(),
                _ => {}
            }
        })
        .on_drop(|app| {
            if let Some(sharesheet) = app.try_state::<Sharesheet>() {
                sharesheet.session().on_teardown();
            }
        })
        .build()
}
