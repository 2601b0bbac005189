//! Data types for the sharesheet plugin.

use serde::{Deserialize, Serialize};

/// Target name reported when the OS does not say which app was picked.
pub const UNKNOWN_TARGET: &str = "UnknownActivity";

pub const EVENT_SHARE_COMPLETED: &str = "share_completed";
pub const EVENT_SHARE_CANCELED: &str = "share_canceled";
pub const EVENT_SHARE_FAILED: &str = "share_failed";

/// One share invocation, as sent by the frontend.
///
/// Every field is optional. The snake_case aliases keep dictionaries written
/// against the older key names working.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Title shown on the chooser
    pub title: Option<String>,
    /// Subject line, used by mail-like targets
    pub subject: Option<String>,
    /// Text body
    pub content: Option<String>,
    /// Local file to attach
    #[serde(alias = "file_path")]
    pub file_path: Option<String>,
    /// MIME type of the payload
    #[serde(alias = "mime_type")]
    pub mime_type: Option<String>,
    /// Overrides the configured completion threshold (ms). Negative counts as 0.
    #[serde(alias = "custom_threshold")]
    pub custom_threshold: Option<i64>,
}

impl ShareRequest {
    /// Threshold for this request, falling back to `default_ms`.
    pub fn threshold_ms(&self, default_ms: u64) -> u64 {
        self.custom_threshold
            .map(|ms| u64::try_from(ms).unwrap_or(0))
            .unwrap_or(default_ms)
    }

    /// The attachment path with any `file://` scheme removed.
    ///
    /// Returns `None` when no file was requested or the path is empty.
    pub fn attachment_path(&self) -> Option<&str> {
        let path = self.file_path.as_deref()?;
        let path = path.strip_prefix("file://").unwrap_or(path);
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }
}

/// Terminal result of one share. Exactly one is emitted per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ShareOutcome {
    #[serde(rename_all = "camelCase")]
    Completed { target_name: String },
    Canceled,
    Failed { message: String },
}

impl ShareOutcome {
    pub fn completed(target_name: impl Into<String>) -> Self {
        ShareOutcome::Completed {
            target_name: target_name.into(),
        }
    }

    /// Completed, without knowing which app received the content.
    pub fn completed_unknown() -> Self {
        Self::completed(UNKNOWN_TARGET)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ShareOutcome::Failed {
            message: message.into(),
        }
    }

    /// Name of the event this outcome is emitted as.
    pub fn event_name(&self) -> &'static str {
        match self {
            ShareOutcome::Completed { .. } => EVENT_SHARE_COMPLETED,
            ShareOutcome::Canceled => EVENT_SHARE_CANCELED,
            ShareOutcome::Failed { .. } => EVENT_SHARE_FAILED,
        }
    }
}

impl From<crate::Error> for ShareOutcome {
    fn from(err: crate::Error) -> Self {
        ShareOutcome::failed(err.to_string())
    }
}

/// Payload of the `share_completed` event.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCompletedPayload {
    pub target_name: String,
}

/// Payload of the `share_failed` event.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareFailedPayload {
    pub message: String,
}

/// Everything the native side needs to build and present the chooser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChooserIntent {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    /// Content URI of the exposed attachment
    pub stream_uri: Option<String>,
    pub mime_type: String,
    /// Action the chooser broadcasts when a target is picked
    pub callback_action: String,
}

/// Definitive status, for platforms whose share sheet reports one (iOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NativeShareResult {
    Completed,
    Canceled,
    Failed,
}

/// Message pushed by the native side when the chooser reports back.
///
/// Android only fills `chosen_component`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChooserCallback {
    /// Flattened component name of the picked target
    pub chosen_component: Option<String>,
    pub result: Option<NativeShareResult>,
    pub error: Option<String>,
}

impl ChooserCallback {
    pub fn chosen(component: impl Into<String>) -> Self {
        Self {
            chosen_component: Some(component.into()),
            ..Default::default()
        }
    }

    pub fn into_outcome(self) -> ShareOutcome {
        match self.result {
            Some(NativeShareResult::Canceled) => ShareOutcome::Canceled,
            Some(NativeShareResult::Failed) => {
                ShareOutcome::failed(self.error.unwrap_or_else(|| "Share failed".to_string()))
            }
            Some(NativeShareResult::Completed) | None => match self.chosen_component {
                Some(name) if !name.is_empty() => ShareOutcome::completed(name),
                _ => ShareOutcome::completed_unknown(),
            },
        }
    }
}

/// Response of the native `exposeFile` command.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedFile {
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_snake_case_keys() {
        let request: ShareRequest = serde_json::from_str(
            r#"{ "title": "Share", "file_path": "/data/shot.png", "mime_type": "image/png", "custom_threshold": 2500 }"#,
        )
        .unwrap();
        assert_eq!(request.title.as_deref(), Some("Share"));
        assert_eq!(request.file_path.as_deref(), Some("/data/shot.png"));
        assert_eq!(request.mime_type.as_deref(), Some("image/png"));
        assert_eq!(request.custom_threshold, Some(2500));
    }

    #[test]
    fn test_negative_threshold_clamps_to_zero() {
        let request: ShareRequest =
            serde_json::from_str(r#"{ "customThreshold": -1 }"#).unwrap();
        assert_eq!(request.threshold_ms(5000), 0);
        assert_eq!(ShareRequest::default().threshold_ms(5000), 5000);
    }

    #[test]
    fn test_attachment_path_strips_scheme() {
        let request = ShareRequest {
            file_path: Some("file:///data/shot.png".into()),
            ..Default::default()
        };
        assert_eq!(request.attachment_path(), Some("/data/shot.png"));
    }

    #[test]
    fn test_empty_attachment_path_is_none() {
        let request = ShareRequest {
            file_path: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(request.attachment_path(), None);
        assert_eq!(ShareRequest::default().attachment_path(), None);
    }

    #[test]
    fn test_callback_without_component_is_unknown() {
        let outcome = ChooserCallback::default().into_outcome();
        assert_eq!(outcome, ShareOutcome::completed(UNKNOWN_TARGET));
    }

    #[test]
    fn test_callback_with_definitive_status() {
        let canceled: ChooserCallback =
            serde_json::from_str(r#"{ "result": "canceled" }"#).unwrap();
        assert_eq!(canceled.into_outcome(), ShareOutcome::Canceled);

        let failed: ChooserCallback =
            serde_json::from_str(r#"{ "result": "failed", "error": "disk full" }"#).unwrap();
        assert_eq!(failed.into_outcome(), ShareOutcome::failed("disk full"));
    }

    #[test]
    fn test_outcome_event_names() {
        assert_eq!(ShareOutcome::Canceled.event_name(), "share_canceled");
        assert_eq!(ShareOutcome::completed_unknown().event_name(), "share_completed");
        assert_eq!(ShareOutcome::failed("x").event_name(), "share_failed");
    }
}
