/// Transient user-facing notifications ("toasts").
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
}

/// Receives every notification the dashboard emits.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);

    /// Called whenever simulated time moves forward.
    fn expire(&mut self, _now: DateTime<Utc>) {}
}

/// Fans every call out to both notifiers.
impl<A: Notifier, B: Notifier> Notifier for (A, B) {
    fn notify(&mut self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        self.0.expire(now);
        self.1.expire(now);
    }
}

/// Mirrors notifications into the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, n: Notification) {
        match n.severity {
            Severity::Error => error!("[notify] {}", n.message),
            Severity::Success | Severity::Info => info!("[notify] ({}) {}", n.severity.label(), n.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Toast {
    notification: Notification,
    expires_at: DateTime<Utc>,
}

/// Visible toasts, each dismissed `ttl` after it was shown.
#[derive(Debug)]
pub struct ToastQueue {
    ttl: chrono::Duration,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::milliseconds(ttl.as_millis() as i64),
            toasts: Vec::new(),
        }
    }

    /// Applies to toasts shown from now on; visible ones keep their expiry.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = chrono::Duration::milliseconds(ttl.as_millis() as i64);
    }

    /// Currently visible notifications, oldest first.
    pub fn live(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter().map(|t| &t.notification)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.toasts.last().map(|t| &t.notification)
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, notification: Notification) {
        let expires_at = notification.shown_at + self.ttl;
        self.toasts.push(Toast {
            notification,
            expires_at,
        });
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        self.toasts.retain(|t| t.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(msg: &str, secs: i64) -> Notification {
        Notification {
            message: msg.to_string(),
            severity: Severity::Info,
            shown_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    fn t(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + chrono::Duration::milliseconds(millis)
    }

    #[test]
    fn toast_visible_until_ttl_elapses() {
        let mut q = ToastQueue::new(Duration::from_secs(3));
        q.notify(note("hello", 0));
        q.expire(t(2999));
        assert_eq!(q.len(), 1);
        q.expire(t(3000));
        assert!(q.is_empty());
    }

    #[test]
    fn toasts_expire_independently() {
        let mut q = ToastQueue::new(Duration::from_secs(3));
        q.notify(note("first", 0));
        q.notify(note("second", 2));
        q.expire(t(3500));
        let live: Vec<&str> = q.live().map(|n| n.message.as_str()).collect();
        assert_eq!(live, vec!["second"]);
        assert_eq!(q.latest().unwrap().message, "second");
    }

    #[test]
    fn new_ttl_applies_to_later_toasts_only() {
        let mut q = ToastQueue::new(Duration::from_secs(3));
        q.notify(note("old", 0));
        q.set_ttl(Duration::from_secs(10));
        q.notify(note("new", 0));
        q.expire(t(5000));
        let live: Vec<&str> = q.live().map(|n| n.message.as_str()).collect();
        assert_eq!(live, vec!["new"]);
    }

    #[test]
    fn pair_forwards_to_both() {
        let mut pair = (
            ToastQueue::new(Duration::from_secs(3)),
            ToastQueue::new(Duration::from_secs(10)),
        );
        pair.notify(note("x", 0));
        pair.expire(t(5000));
        assert!(pair.0.is_empty());
        assert_eq!(pair.1.len(), 1);
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Success.label(), "success");
        assert_eq!(Severity::Info.label(), "info");
        assert_eq!(Severity::Error.label(), "error");
    }
}
