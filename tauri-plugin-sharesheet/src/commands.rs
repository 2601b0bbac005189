use tauri::{command, AppHandle, Runtime};

use crate::models::*;
use crate::Result;
use crate::SharesheetExt;

/// Open the system share sheet.
///
/// Returns as soon as the chooser is requested. The outcome arrives later as
/// exactly one `share_completed`, `share_canceled` or `share_failed` event;
/// failures are never returned from this command.
#[command]
pub(crate) async fn share<R: Runtime>(app: AppHandle<R>, request: ShareRequest) -> Result<()> {
    app.sharesheet().share(request);
    Ok(())
}

/// Whether a share is still waiting for its outcome.
#[command]
pub(crate) async fn is_share_pending<R: Runtime>(app: AppHandle<R>) -> Result<bool> {
    Ok(app.sharesheet().is_pending())
}
