//! Client-side view state: the loading flag and the toast queue the
//! frontend drains.

use std::collections::VecDeque;

/// Oldest notices drop off once the queue is full.
const MAX_NOTIFICATIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct UiState {
    pub is_loading: bool,
    notifications: VecDeque<Notification>,
}

impl UiState {
    pub fn push_success(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    pub fn push_info(&mut self, message: impl Into<String>) {
        self.push(NoticeKind::Info, message.into());
    }

    /// Next notice to show, oldest first.
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }

    fn push(&mut self, kind: NoticeKind, message: String) {
        if self.notifications.len() == MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification { kind, message });
    }
}
