//! Outcome detection for the share in flight.
//!
//! Two producers race for one slot: the chooser callback, which knows the
//! picked target, and the app-resume hook, which only knows how long the
//! user was away. Whoever takes the pending share first decides the outcome;
//! the other finds the slot empty and emits nothing.
//!
//! Platforms whose share sheet always reports a definitive status (iOS) skip
//! the resume race: the callback is the only producer there.

use tracing::debug;

use crate::models::{ChooserCallback, ShareOutcome};
use crate::session::ChooserRegistration;

/// Source of wall-clock milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// The share currently awaiting its outcome.
pub struct PendingShare {
    /// Chooser action identifying this invocation
    pub action: String,
    pub started_at_ms: i64,
    pub threshold_ms: u64,
    /// The chooser callback always arrives; resume must not decide
    pub definitive_callback: bool,
    /// Released when the pending share is dropped
    pub registration: Option<ChooserRegistration>,
}

impl PendingShare {
    pub fn new(action: impl Into<String>, started_at_ms: i64, threshold_ms: u64) -> Self {
        Self {
            action: action.into(),
            started_at_ms,
            threshold_ms,
            definitive_callback: false,
            registration: None,
        }
    }

    /// Milliseconds since the chooser was launched, never negative.
    pub fn elapsed_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(now_ms.saturating_sub(self.started_at_ms)).unwrap_or(0)
    }
}

impl std::fmt::Debug for PendingShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingShare")
            .field("action", &self.action)
            .field("started_at_ms", &self.started_at_ms)
            .field("threshold_ms", &self.threshold_ms)
            .field("definitive_callback", &self.definitive_callback)
            .field("registered", &self.registration.is_some())
            .finish()
    }
}

/// Idle / AwaitingOutcome state machine.
///
/// Resolving methods hand the pending share back to the caller so its
/// registration can be released outside whatever lock guards the tracker.
#[derive(Debug, Default)]
pub struct OutcomeTracker {
    pending: Option<PendingShare>,
}

impl OutcomeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_action(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.action.as_str())
    }

    /// Enter AwaitingOutcome, returning any share this one displaces.
    pub fn arm(&mut self, pending: PendingShare) -> Option<PendingShare> {
        self.pending.replace(pending)
    }

    /// Chooser callback path. Ignored unless `action` is the share in flight.
    pub fn resolve_chosen(
        &mut self,
        action: &str,
        callback: ChooserCallback,
    ) -> Option<(PendingShare, ShareOutcome)> {
        if self.pending_action() != Some(action) {
            debug!("Ignoring chooser callback for stale action {}", action);
            return None;
        }
        let pending = self.pending.take()?;
        Some((pending, callback.into_outcome()))
    }

    /// Resume path. Decides from elapsed time alone.
    ///
    /// Away longer than the threshold counts as completed with an unknown
    /// target; a quick return counts as the chooser being dismissed.
    pub fn resolve_resumed(&mut self, now_ms: i64) -> Option<(PendingShare, ShareOutcome)> {
        if self.pending.as_ref()?.definitive_callback {
            debug!("Resume ignored, waiting for the share sheet to report");
            return None;
        }
        let pending = self.pending.take()?;
        let elapsed = pending.elapsed_ms(now_ms);
        let outcome = if elapsed > pending.threshold_ms {
            debug!("Share completed via lifecycle (duration: {} ms)", elapsed);
            ShareOutcome::completed_unknown()
        } else {
            debug!("Quick chooser dismissal, treating as canceled (duration: {} ms)", elapsed);
            ShareOutcome::Canceled
        };
        Some((pending, outcome))
    }

    /// Leave AwaitingOutcome without an outcome, if `action` is in flight.
    pub fn abort(&mut self, action: &str) -> Option<PendingShare> {
        if self.pending_action() == Some(action) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Drop whatever is in flight.
    pub fn clear(&mut self) -> Option<PendingShare> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_TARGET;

    fn armed(threshold_ms: u64) -> OutcomeTracker {
        let mut tracker = OutcomeTracker::new();
        tracker.arm(PendingShare::new("share.1", 10_000, threshold_ms));
        tracker
    }

    #[test]
    fn test_quick_return_is_canceled() {
        let mut tracker = armed(5000);
        let (_, outcome) = tracker.resolve_resumed(14_000).unwrap();
        assert_eq!(outcome, ShareOutcome::Canceled);
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_slow_return_is_completed_unknown() {
        let mut tracker = armed(5000);
        let (_, outcome) = tracker.resolve_resumed(16_000).unwrap();
        assert_eq!(outcome, ShareOutcome::completed(UNKNOWN_TARGET));
    }

    #[test]
    fn test_elapsed_equal_to_threshold_is_canceled() {
        let mut tracker = armed(5000);
        let (_, outcome) = tracker.resolve_resumed(15_000).unwrap();
        assert_eq!(outcome, ShareOutcome::Canceled, "comparison must be strictly greater");
    }

    #[test]
    fn test_zero_threshold_boundary() {
        let mut tracker = armed(0);
        let (_, outcome) = tracker.resolve_resumed(10_000).unwrap();
        assert_eq!(outcome, ShareOutcome::Canceled, "elapsed 0 is not above threshold 0");

        let mut tracker = armed(0);
        let (_, outcome) = tracker.resolve_resumed(10_001).unwrap();
        assert_eq!(outcome, ShareOutcome::completed_unknown());
    }

    #[test]
    fn test_clock_going_backwards_counts_as_zero() {
        let pending = PendingShare::new("share.1", 10_000, 0);
        assert_eq!(pending.elapsed_ms(9_000), 0);
    }

    #[test]
    fn test_callback_disarms_resume() {
        let mut tracker = armed(5000);
        let (_, outcome) = tracker
            .resolve_chosen("share.1", ChooserCallback::chosen("com.chat/.ShareActivity"))
            .unwrap();
        assert_eq!(outcome, ShareOutcome::completed("com.chat/.ShareActivity"));
        assert!(tracker.resolve_resumed(60_000).is_none());
    }

    #[test]
    fn test_resume_disarms_callback() {
        let mut tracker = armed(5000);
        assert!(tracker.resolve_resumed(11_000).is_some());
        assert!(tracker
            .resolve_chosen("share.1", ChooserCallback::default())
            .is_none());
    }

    #[test]
    fn test_resume_does_not_decide_definitive_share() {
        let mut tracker = OutcomeTracker::new();
        let mut pending = PendingShare::new("share.1", 10_000, 5000);
        pending.definitive_callback = true;
        tracker.arm(pending);

        assert!(tracker.resolve_resumed(11_000).is_none());
        assert!(tracker.is_pending());

        let callback: ChooserCallback = serde_json::from_str(
            r#"{ "result": "completed", "chosenComponent": "com.apple.UIKit.activity.Message" }"#,
        )
        .unwrap();
        let (_, outcome) = tracker.resolve_chosen("share.1", callback).unwrap();
        assert_eq!(outcome, ShareOutcome::completed("com.apple.UIKit.activity.Message"));
    }

    #[test]
    fn test_stale_callback_is_ignored() {
        let mut tracker = armed(5000);
        assert!(tracker
            .resolve_chosen("share.0", ChooserCallback::default())
            .is_none());
        assert!(tracker.is_pending(), "current share must stay armed");
    }

    #[test]
    fn test_arm_displaces_previous() {
        let mut tracker = armed(5000);
        let displaced = tracker.arm(PendingShare::new("share.2", 20_000, 5000));
        assert_eq!(displaced.map(|p| p.action), Some("share.1".to_string()));
        assert_eq!(tracker.pending_action(), Some("share.2"));
    }

    #[test]
    fn test_abort_only_matching_action() {
        let mut tracker = armed(5000);
        assert!(tracker.abort("share.0").is_none());
        assert!(tracker.abort("share.1").is_some());
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_resume_when_idle_emits_nothing() {
        let mut tracker = OutcomeTracker::new();
        assert!(tracker.resolve_resumed(1_000).is_none());
    }
}
