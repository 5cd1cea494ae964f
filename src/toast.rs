//! Transient notifications shown in the page corner.
//!
//! Handlers raise toasts with [`notify`], which drops a message identical to
//! the previous one if it arrives within [`DEDUP_WINDOW_MS`], then hands it to
//! the flash-message framework. On render, [`ToastCenter`] turns the incoming
//! flash messages into the list the template displays.

use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionStorage;

pub const DEFAULT_DURATION_MS: u64 = 5000;
pub const DEDUP_WINDOW_MS: i64 = 500;

const LAST_TOAST_KEY: &str = "lastToast";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastLevel {
    /// Bootstrap contextual class used by the templates.
    pub fn css_class(&self) -> &'static str {
        match self {
            ToastLevel::Success => "success",
            ToastLevel::Error => "danger",
            ToastLevel::Warning => "warning",
            ToastLevel::Info => "info",
        }
    }
}

impl From<Level> for ToastLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => ToastLevel::Error,
            Level::Warning => ToastLevel::Warning,
            Level::Success => ToastLevel::Success,
            Level::Info | Level::Debug => ToastLevel::Info,
        }
    }
}

impl From<ToastLevel> for Level {
    fn from(level: ToastLevel) -> Self {
        match level {
            ToastLevel::Success => Level::Success,
            ToastLevel::Error => Level::Error,
            ToastLevel::Warning => Level::Warning,
            ToastLevel::Info => Level::Info,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub level: ToastLevel,
    /// Milliseconds before auto-dismissal; zero keeps the toast until dismissed.
    pub duration: u64,
    pub css_class: &'static str,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl Toast {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.duration > 0
            && now - self.created_at >= Duration::milliseconds(self.duration as i64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct LastToast {
    message: String,
    at: i64,
}

fn is_duplicate(last: Option<&LastToast>, message: &str, now: DateTime<Utc>) -> bool {
    last.is_some_and(|last| {
        last.message == message && now.timestamp_millis() - last.at < DEDUP_WINDOW_MS
    })
}

/// Ordered collection of live toasts.
#[derive(Debug, Default)]
pub struct ToastCenter {
    toasts: Vec<Toast>,
    last: Option<LastToast>,
}

impl ToastCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list shown on the current page from incoming flash messages.
    pub fn from_flash(messages: &IncomingFlashMessages, now: DateTime<Utc>) -> Self {
        let mut center = Self::new();
        for message in messages.iter() {
            center.push(message.content(), message.level().into(), None, now);
        }
        center
    }

    /// Adds a toast unless it repeats the previous message within the
    /// de-duplication window. Returns the new toast's id.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        level: ToastLevel,
        duration: Option<u64>,
        now: DateTime<Utc>,
    ) -> Option<Uuid> {
        let message = message.into();
        if is_duplicate(self.last.as_ref(), &message, now) {
            return None;
        }
        self.last = Some(LastToast {
            message: message.clone(),
            at: now.timestamp_millis(),
        });

        let id = Uuid::new_v4();
        self.toasts.push(Toast {
            id,
            message,
            level,
            duration: duration.unwrap_or(DEFAULT_DURATION_MS),
            css_class: level.css_class(),
            created_at: now,
        });
        Some(id)
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    /// Drops expired toasts and returns the rest in insertion order.
    pub fn visible(&mut self, now: DateTime<Utc>) -> &[Toast] {
        self.toasts.retain(|toast| !toast.expired(now));
        &self.toasts
    }

    pub fn into_toasts(self) -> Vec<Toast> {
        self.toasts
    }
}

/// Records `message` in the session ledger; false when it is a duplicate.
pub fn record_toast<S>(storage: &S, message: &str, now: DateTime<Utc>) -> bool
where
    S: SessionStorage + ?Sized,
{
    let last = storage
        .get(LAST_TOAST_KEY)
        .and_then(|raw| serde_json::from_str::<LastToast>(&raw).ok());

    if is_duplicate(last.as_ref(), message, now) {
        log::debug!("Skipping duplicate toast: {message}");
        return false;
    }

    let entry = LastToast {
        message: message.to_string(),
        at: now.timestamp_millis(),
    };
    match serde_json::to_string(&entry) {
        Ok(raw) => storage.set(LAST_TOAST_KEY, &raw),
        Err(e) => log::warn!("Failed to record toast: {e}"),
    }
    true
}

/// Queues a toast for the next rendered page.
pub fn notify<S>(storage: &S, level: ToastLevel, message: impl Into<String>)
where
    S: SessionStorage + ?Sized,
{
    let message = message.into();
    if record_toast(storage, &message, Utc::now()) {
        FlashMessage::new(message, level.into()).send();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::session::MemoryStorage;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn duplicate_within_window_is_dropped() {
        let mut center = ToastCenter::new();

        assert!(center.push("Saved", ToastLevel::Success, None, at(0)).is_some());
        assert!(center.push("Saved", ToastLevel::Success, None, at(499)).is_none());
        assert!(center.push("Saved", ToastLevel::Success, None, at(1000)).is_some());

        assert_eq!(center.visible(at(1000)).len(), 2);
    }

    #[test]
    fn different_message_is_not_deduplicated() {
        let mut center = ToastCenter::new();

        center.push("A", ToastLevel::Info, None, at(0));
        center.push("B", ToastLevel::Info, None, at(10));
        center.push("A", ToastLevel::Info, None, at(20));

        assert_eq!(center.visible(at(20)).len(), 3);
    }

    #[test]
    fn toasts_expire_after_duration() {
        let mut center = ToastCenter::new();
        center.push("short", ToastLevel::Warning, Some(1000), at(0));
        center.push("default", ToastLevel::Error, None, at(0));
        center.push("sticky", ToastLevel::Info, Some(0), at(0));

        let visible: Vec<_> = center
            .visible(at(1000))
            .iter()
            .map(|t| t.message.clone())
            .collect();
        assert_eq!(visible, vec!["default", "sticky"]);

        assert_eq!(center.visible(at(DEFAULT_DURATION_MS as i64)).len(), 1);
    }

    #[test]
    fn dismiss_removes_only_that_toast() {
        let mut center = ToastCenter::new();
        let first = center.push("one", ToastLevel::Info, None, at(0)).unwrap();
        center.push("two", ToastLevel::Info, None, at(0));

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        assert_eq!(center.into_toasts()[0].message, "two");
    }

    #[test]
    fn error_level_renders_as_danger() {
        assert_eq!(ToastLevel::from(Level::Error).css_class(), "danger");
        assert_eq!(ToastLevel::from(Level::Debug), ToastLevel::Info);
    }

    #[test]
    fn session_ledger_deduplicates_across_requests() {
        let storage = MemoryStorage::new();

        assert!(record_toast(&storage, "Please login to book tickets", at(0)));
        assert!(!record_toast(&storage, "Please login to book tickets", at(300)));
        assert!(record_toast(&storage, "Please login to book tickets", at(900)));
        assert!(record_toast(&storage, "Login successful!", at(901)));
    }
}
