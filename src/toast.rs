//! Ephemeral toast notification queue with per-entry timed expiry.
//!
//! Mutations happen behind one lock; scheduled removals are timer tasks that
//! remove by entry id, so a removal either drops exactly its entry once or
//! no-ops when the entry is already gone (manual dismiss, `clear`).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_DURATION_MS: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    /// Default display duration for the kind shorthands, in milliseconds.
    pub fn default_duration_ms(&self) -> i64 {
        match self {
            ToastKind::Success => 5_000,
            ToastKind::Error => 7_000,
            ToastKind::Warning => 6_000,
            ToastKind::Info => 5_000,
        }
    }
}

/// Input to [`ToastQueue::add`]; unset fields get defaults (duration 5000ms,
/// closable true).
#[derive(Debug, Clone)]
pub struct ToastConfig {
    pub kind: ToastKind,
    pub message: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub duration_ms: Option<i64>,
    pub closable: Option<bool>,
}

impl ToastConfig {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            title: None,
            icon: None,
            duration_ms: None,
            closable: None,
        }
    }

    /// Kind shorthand: like [`ToastConfig::new`] but with the kind-specific
    /// default duration pre-filled, so further overrides keep it.
    pub fn for_kind(kind: ToastKind, message: impl Into<String>) -> Self {
        Self::new(kind, message).with_duration_ms(kind.default_duration_ms())
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::for_kind(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::for_kind(ToastKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::for_kind(ToastKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::for_kind(ToastKind::Info, message)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Zero or negative keeps the toast until it is dismissed.
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_closable(mut self, closable: bool) -> Self {
        self.closable = Some(closable);
        self
    }
}

/// A queued notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub message: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub duration_ms: i64,
    pub closable: bool,
}

/// Ordered in-memory queue, newest last. Cheap to clone; clones share the
/// queue.
#[derive(Clone, Default)]
pub struct ToastQueue {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies defaults, appends, and for a strictly positive duration
    /// schedules removal of this exact entry. Must be called within a tokio
    /// runtime when the duration is positive.
    pub fn add(&self, config: ToastConfig) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind: config.kind,
            message: config.message,
            title: config.title,
            icon: config.icon,
            duration_ms: config.duration_ms.unwrap_or(DEFAULT_DURATION_MS),
            closable: config.closable.unwrap_or(true),
        };

        self.toasts.lock().expect("toast lock poisoned").push(toast.clone());

        if toast.duration_ms > 0 {
            let queue = self.clone();
            let id = toast.id;
            let delay = Duration::from_millis(toast.duration_ms as u64);
            // Create the sleep here so its deadline anchors at add() time,
            // not at the spawned task's first poll.
            let sleep = tokio::time::sleep(delay);
            tokio::spawn(async move {
                sleep.await;
                queue.remove(id);
            });
        }

        toast
    }

    /// Removes by id. No-op (returns false) when the entry is gone already.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut toasts = self.toasts.lock().expect("toast lock poisoned");
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// Empties the queue immediately; pending timer removals become no-ops.
    pub fn clear(&self) {
        self.toasts.lock().expect("toast lock poisoned").clear();
    }

    /// Snapshot of the active entries, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.toasts.lock().expect("toast lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.toasts.lock().expect("toast lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn success(&self, message: impl Into<String>) -> Toast {
        self.add(ToastConfig::success(message))
    }

    pub fn error(&self, message: impl Into<String>) -> Toast {
        self.add(ToastConfig::error(message))
    }

    pub fn warning(&self, message: impl Into<String>) -> Toast {
        self.add(ToastConfig::warning(message))
    }

    pub fn info(&self, message: impl Into<String>) -> Toast {
        self.add(ToastConfig::info(message))
    }
}
