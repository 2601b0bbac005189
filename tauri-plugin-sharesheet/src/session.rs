//! The share adapter.
//!
//! [`ShareSession`] runs one share at a time against a platform
//! [`ShareBackend`], owns the in-flight slot and reports every outcome to an
//! [`OutcomeSink`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tauri::{AppHandle, Emitter, Runtime};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::*;
use crate::outcome::{Clock, OutcomeTracker, PendingShare, SystemClock};

/// Invoked by the backend when the chooser reports back.
pub type ChooserHandler = Box<dyn Fn(ChooserCallback) + Send + Sync>;

/// Platform side of a share: file exposure, chooser callback, chooser launch.
pub trait ShareBackend: Send + Sync {
    /// Make `path` readable by other apps, returning the URI to hand them.
    fn expose_file(&self, path: &Path) -> Result<String>;

    /// Route chooser results for `action` to `handler`.
    fn register_chooser_callback(&self, action: &str, handler: ChooserHandler) -> Result<()>;

    /// Undo [`ShareBackend::register_chooser_callback`]. Must tolerate unknown actions.
    fn unregister_chooser_callback(&self, action: &str);

    /// Present the system chooser.
    fn start_chooser(&self, intent: &ChooserIntent) -> Result<()>;

    /// Whether the chooser callback always reports completed, canceled or
    /// failed. When it does, app resume never decides the outcome.
    fn reports_definitive_outcome(&self) -> bool {
        false
    }
}

/// Receives the terminal outcome of each share.
pub trait OutcomeSink: Send + Sync {
    fn emit(&self, outcome: &ShareOutcome);
}

/// Emits outcomes as app-wide Tauri events.
pub struct AppEventSink<R: Runtime>(pub AppHandle<R>);

impl<R: Runtime> OutcomeSink for AppEventSink<R> {
    fn emit(&self, outcome: &ShareOutcome) {
        let event = outcome.event_name();
        let result = match outcome {
            ShareOutcome::Completed { target_name } => self.0.emit(
                event,
                ShareCompletedPayload {
                    target_name: target_name.clone(),
                },
            ),
            ShareOutcome::Canceled => self.0.emit(event, ()),
            ShareOutcome::Failed { message } => self.0.emit(
                event,
                ShareFailedPayload {
                    message: message.clone(),
                },
            ),
        };
        if let Err(e) = result {
            error!("Failed to emit {}: {}", event, e);
        }
    }
}

/// A live chooser callback registration. Dropping it deregisters.
pub struct ChooserRegistration {
    backend: Arc<dyn ShareBackend>,
    action: String,
}

impl Drop for ChooserRegistration {
    fn drop(&mut self) {
        debug!("Unregistering chooser receiver {}", self.action);
        self.backend.unregister_chooser_callback(&self.action);
    }
}

/// What the plugin learned about its host at setup.
#[derive(Debug, Clone)]
pub struct HostContext {
    /// App identifier, used to namespace chooser actions
    pub identifier: String,
}

pub struct ShareSession {
    backend: Arc<dyn ShareBackend>,
    sink: Arc<dyn OutcomeSink>,
    clock: Arc<dyn Clock>,
    config: Config,
    host: Mutex<Option<HostContext>>,
    tracker: Mutex<OutcomeTracker>,
}

impl ShareSession {
    pub fn new(backend: Arc<dyn ShareBackend>, sink: Arc<dyn OutcomeSink>, config: Config) -> Self {
        Self::with_clock(backend, sink, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        backend: Arc<dyn ShareBackend>,
        sink: Arc<dyn OutcomeSink>,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            sink,
            clock,
            config,
            host: Mutex::new(None),
            tracker: Mutex::new(OutcomeTracker::new()),
        }
    }

    /// Capture the host app. Until this runs every share fails.
    pub fn initialize(&self, identifier: &str) {
        let host = HostContext {
            identifier: identifier.to_string(),
        };
        debug!("Share host initialized ({})", host.identifier);
        *lock(&self.host) = Some(host);
    }

    pub fn is_pending(&self) -> bool {
        self.tracker().is_pending()
    }

    /// Open the chooser for `request`.
    ///
    /// Never fails to the caller: the outcome, including any failure to get
    /// the chooser on screen, arrives through the sink exactly once.
    pub fn share(self: &Arc<Self>, request: ShareRequest) {
        debug!("share() called");
        if let Err(e) = self.start(request) {
            error!("Share failed: {}", e);
            self.sink.emit(&ShareOutcome::from(e));
        }
    }

    fn start(self: &Arc<Self>, request: ShareRequest) -> Result<()> {
        let host = lock(&self.host).clone().ok_or(Error::NotInitialized)?;

        let stream_uri = match request.attachment_path() {
            Some(path) => Some(self.expose_attachment(path)?),
            None => None,
        };

        let action = format!(
            "{}.CHOOSER_TARGET_SELECTED.{}",
            host.identifier,
            Uuid::new_v4().simple()
        );
        let threshold_ms = request.threshold_ms(self.config.completion_threshold_ms);
        let intent = ChooserIntent {
            title: request.title,
            subject: request.subject,
            text: request.content,
            stream_uri,
            mime_type: request
                .mime_type
                .unwrap_or_else(|| self.config.default_mime_type.clone()),
            callback_action: action.clone(),
        };

        // Last write wins; the displaced share is dropped without an outcome.
        let displaced = self.tracker().clear();
        if let Some(displaced) = displaced {
            warn!("Share {} still pending, replacing it", displaced.action);
        }

        let mut pending = PendingShare::new(action.clone(), self.clock.now_millis(), threshold_ms);
        pending.registration = self.register(&action);
        // Without a registration nothing but resume can end the share.
        pending.definitive_callback =
            pending.registration.is_some() && self.backend.reports_definitive_outcome();
        let displaced = self.tracker().arm(pending);
        drop(displaced);

        if let Err(e) = self.backend.start_chooser(&intent) {
            let aborted = self.tracker().abort(&action);
            drop(aborted);
            return Err(e);
        }

        info!("Chooser started (threshold: {} ms)", threshold_ms);
        Ok(())
    }

    fn expose_attachment(&self, path: &str) -> Result<String> {
        let file = Path::new(path);
        if !file.exists() {
            return Err(Error::FileNotFound(path.to_string()));
        }
        self.backend.expose_file(file).map_err(|e| {
            warn!("Exposing {} failed: {}", path, e);
            Error::FileNotShareable(path.to_string())
        })
    }

    fn register(self: &Arc<Self>, action: &str) -> Option<ChooserRegistration> {
        let session = Arc::downgrade(self);
        let handled = AtomicBool::new(false);
        let handler_action = action.to_string();
        let handler: ChooserHandler = Box::new(move |callback| {
            if handled.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(session) = session.upgrade() {
                session.on_chooser_result(&handler_action, callback);
            }
        });

        match self.backend.register_chooser_callback(action, handler) {
            Ok(()) => Some(ChooserRegistration {
                backend: self.backend.clone(),
                action: action.to_string(),
            }),
            Err(e) => {
                // The resume hook still resolves the share.
                warn!("Failed to register chooser receiver: {}", e);
                None
            }
        }
    }

    /// Chooser callback path.
    pub fn on_chooser_result(&self, action: &str, callback: ChooserCallback) {
        let resolved = self.tracker().resolve_chosen(action, callback);
        if let Some((pending, outcome)) = resolved {
            drop(pending);
            debug!("Chooser reported {:?}", outcome);
            self.sink.emit(&outcome);
        }
    }

    /// Lifecycle path: the app came back to the foreground.
    pub fn on_resume(&self) {
        let now_ms = self.clock.now_millis();
        let resolved = self.tracker().resolve_resumed(now_ms);
        if let Some((pending, outcome)) = resolved {
            drop(pending);
            self.sink.emit(&outcome);
        }
    }

    /// Release everything in flight without reporting an outcome.
    pub fn on_teardown(&self) {
        let cleared = self.tracker().clear();
        if let Some(pending) = cleared {
            debug!("Discarding pending share {} on teardown", pending.action);
        }
    }

    fn tracker(&self) -> MutexGuard<'_, OutcomeTracker> {
        lock(&self.tracker)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Access to the sharesheet APIs.
pub struct Sharesheet(pub(crate) Arc<ShareSession>);

impl Sharesheet {
    /// Open the system chooser. The outcome arrives as one of the
    /// `share_completed`, `share_canceled` or `share_failed` events.
    pub fn share(&self, request: ShareRequest) {
        self.0.share(request)
    }

    /// Whether a share is waiting for its outcome.
    pub fn is_pending(&self) -> bool {
        self.0.is_pending()
    }

    pub(crate) fn session(&self) -> &ShareSession {
        &self.0
    }
}
