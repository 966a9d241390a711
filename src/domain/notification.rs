use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audience tag stored on each notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    User,
    Admin,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Order,
    Payment,
    Refund,
    Promotion,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Absent means the notification is not addressed to one user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub target: Audience,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    pub user_id: Option<String>,
    pub target: Audience,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub link: Option<String>,
}

impl NotificationCreate {
    pub fn for_user(
        user_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            target: Audience::User,
            title: title.into(),
            message: message.into(),
            kind,
            link: None,
        }
    }

    pub fn for_admin(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: None,
            target: Audience::Admin,
            title: title.into(),
            message: message.into(),
            kind,
            link: None,
        }
    }

    pub fn broadcast(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: None,
            target: Audience::All,
            title: title.into(),
            message: message.into(),
            kind,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
