use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Audience, Notification, NotificationCreate};
use crate::error::{EngineError, EngineResult};

/// Stamped create payload; the client supplies the time.
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub notification: NotificationCreate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum NotificationAction {
    MarkRead,
}

impl Entity for Notification {
    type Id = String;
    type CreatePayload = NotificationRecord;
    type Patch = ();
    type Action = NotificationAction;
    /// Whether the read flag changed.
    type ActionResult = bool;

    const KIND: &'static str = "notification";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, params: NotificationRecord) -> EngineResult<Self> {
        let n = params.notification;
        if n.target == Audience::User && n.user_id.is_none() {
            return Err(EngineError::ValidationFailed(
                "user-targeted notification needs a user id".into(),
            ));
        }
        Ok(Self {
            id,
            user_id: n.user_id,
            target: n.target,
            title: n.title,
            message: n.message,
            kind: n.kind,
            link: n.link,
            read: false,
            created_at: params.created_at,
        })
    }

    fn on_update(&mut self, _patch: ()) -> EngineResult<()> {
        Ok(())
    }

    fn handle_action(&mut self, action: NotificationAction) -> EngineResult<bool> {
        match action {
            NotificationAction::MarkRead => {
                let changed = !self.read;
                self.read = true;
                Ok(changed)
            }
        }
    }
}
