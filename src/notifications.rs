use chrono::Utc;
use uuid::Uuid;

use crate::models::{NotificationKind, NotificationToast};

pub const MAX_TOASTS: usize = 5;
const BADGE_LIMIT: usize = 9;

/// Newest-first log of notifications. Entries are never removed; only the
/// `read` flag changes.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    entries: Vec<NotificationToast>,
}

impl NotificationFeed {
    pub fn push(&mut self, notification: NotificationToast) {
        self.entries.insert(0, notification);
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) if !entry.read => {
                entry.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn find(&self, id: &str) -> Option<&NotificationToast> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn all(&self) -> &[NotificationToast] {
        &self.entries
    }

    pub fn for_case<'a>(&'a self, case_id: &'a str) -> impl Iterator<Item = &'a NotificationToast> {
        self.entries
            .iter()
            .filter(move |entry| entry.case_id.as_deref() == Some(case_id))
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.read).count()
    }

    pub fn badge_label(&self) -> Option<String> {
        match self.unread_count() {
            0 => None,
            count if count > BADGE_LIMIT => Some(format!("{BADGE_LIMIT}+")),
            count => Some(count.to_string()),
        }
    }

    pub fn toasts(&self) -> &[NotificationToast] {
        let end = self.entries.len().min(MAX_TOASTS);
        &self.entries[..end]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn new_notification(
    kind: NotificationKind,
    title: impl Into<String>,
    message: impl Into<String>,
    case_id: Option<&str>,
) -> NotificationToast {
    NotificationToast {
        id: format!("NOT-{}", Uuid::new_v4().simple()),
        kind,
        title: title.into(),
        message: message.into(),
        timestamp: Utc::now(),
        read: false,
        case_id: case_id.map(str::to_string),
    }
}

pub fn case_approved(case_id: &str) -> NotificationToast {
    new_notification(
        NotificationKind::Success,
        "Case Approved",
        format!("Case {case_id} has been marked as legitimate"),
        Some(case_id),
    )
}

pub fn case_escalated(case_id: &str) -> NotificationToast {
    new_notification(
        NotificationKind::Error,
        "Case Escalated",
        format!("Case {case_id} has been escalated for further review"),
        Some(case_id),
    )
}

pub fn documents_requested(case_id: &str) -> NotificationToast {
    new_notification(
        NotificationKind::Info,
        "Documents Requested",
        "Additional verification documents requested from student",
        Some(case_id),
    )
}
