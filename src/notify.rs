//! User-facing notifications.
//!
//! The state layer only ever calls [`Notifier::show_error`]. Whoever renders
//! the alert owns its lifetime and must call the `on_close` callback exactly
//! once when the alert goes away, whether the user dismissed it or a timer did.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

/// Callback fired when a notification is dismissed.
pub type OnClose = Box<dyn FnOnce()>;

pub trait Notifier {
    fn show_error(&self, message: &str, on_close: Option<OnClose>);
}

/// A notification waiting to be dismissed.
pub struct Notification {
    message: String,
    on_close: Option<OnClose>,
}

impl Notification {
    pub fn new(message: impl Into<String>, on_close: Option<OnClose>) -> Self {
        Self {
            message: message.into(),
            on_close,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_callback(&self) -> bool {
        self.on_close.is_some()
    }

    /// Consume the notification, running its callback.
    pub fn dismiss(self) {
        if let Some(on_close) = self.on_close {
            on_close();
        }
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("message", &self.message)
            .field("has_callback", &self.has_callback())
            .finish()
    }
}

/// Holds notifications until the UI dismisses them, oldest first.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    queue: RefCell<VecDeque<Notification>>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Message of the notification currently on screen.
    pub fn current(&self) -> Option<String> {
        self.queue.borrow().front().map(|n| n.message.clone())
    }

    pub fn messages(&self) -> Vec<String> {
        self.queue.borrow().iter().map(|n| n.message.clone()).collect()
    }

    /// Dismiss the oldest notification, returning its message.
    pub fn dismiss(&self) -> Option<String> {
        // release the borrow before the callback, which may notify again
        let notification = self.queue.borrow_mut().pop_front()?;
        let message = notification.message.clone();
        debug!(alert = %message, "notification dismissed");
        notification.dismiss();
        Some(message)
    }

    /// Dismiss everything currently queued. Returns how many were dismissed.
    pub fn dismiss_all(&self) -> usize {
        let pending = self.len();
        for _ in 0..pending {
            self.dismiss();
        }
        pending
    }
}

impl Notifier for QueuedNotifier {
    fn show_error(&self, message: &str, on_close: Option<OnClose>) {
        debug!(alert = message, "notification queued");
        self.queue
            .borrow_mut()
            .push_back(Notification::new(message, on_close));
    }
}

/// Logs each notification and dismisses it immediately.
///
/// For headless drivers with no alert surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_error(&self, message: &str, on_close: Option<OnClose>) {
        warn!(alert = message, "notification");
        Notification::new(message, on_close).dismiss();
    }
}
