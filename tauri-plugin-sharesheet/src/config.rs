use serde::Deserialize;

/// Threshold (ms) past which returning to the app counts as a completed share.
pub const DEFAULT_COMPLETION_THRESHOLD_MS: u64 = 5000;

pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Plugin settings, read from `plugins.sharesheet` in `tauri.conf.json`.
///
/// The FileProvider authority is not configurable: the Android side derives
/// it from the running package name so it always matches the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Default lifecycle threshold, overridable per request.
    pub completion_threshold_ms: u64,
    /// MIME type used when a request does not name one.
    pub default_mime_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion_threshold_ms: DEFAULT_COMPLETION_THRESHOLD_MS,
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "completionThresholdMs": 3000 }"#).unwrap();
        assert_eq!(config.completion_threshold_ms, 3000);
        assert_eq!(config.default_mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_legacy_provider_suffix_is_ignored() {
        let config: Config =
            serde_json::from_str(r#"{ "fileProviderSuffix": ".custom" }"#).unwrap();
        assert_eq!(config.completion_threshold_ms, DEFAULT_COMPLETION_THRESHOLD_MS);
    }
}
