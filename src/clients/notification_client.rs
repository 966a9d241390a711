use tracing::{debug, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::ConversationClient;
use crate::clock::SharedClock;
use crate::domain::{Notification, NotificationCreate};
use crate::error::{EngineError, EngineResult};
use crate::notification_actor::{
    admin_unread_count, sort_newest_first, unread_for_user, visible_to_admin, visible_to_user,
    NotificationAction, NotificationRecord,
};
use crate::session::Session;

/// Client for the notification log and its fan-out reads.
#[derive(Clone)]
pub struct NotificationClient {
    inner: ResourceClient<Notification>,
    conversations: ConversationClient,
    clock: SharedClock,
}

impl NotificationClient {
    pub fn new(inner: ResourceClient<Notification>, conversations: ConversationClient, clock: SharedClock) -> Self {
        Self {
            inner,
            conversations,
            clock,
        }
    }

    #[instrument(skip(self, notification), fields(title = %notification.title, target = ?notification.target))]
    pub async fn add_notification(&self, notification: NotificationCreate) -> EngineResult<Notification> {
        debug!("Sending request");
        let created_at = self.clock.now();
        self.inner
            .create(NotificationRecord { notification, created_at })
            .await
    }

    /// Fire-and-forget emission used by state transitions. A failure is
    /// logged and never reaches the caller.
    pub async fn notify(&self, notification: NotificationCreate) {
        let title = notification.title.clone();
        if let Err(e) = self.add_notification(notification).await {
            warn!(error = %e, title = %title, "Notification dropped");
        }
    }

    /// Marks one notification read. Customers may only touch notifications in
    /// their own feed; admins only those in the admin feed.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn mark_notification_read(&self, session: &Session, id: String) -> EngineResult<bool> {
        let notification = self.inner.fetch(id.clone()).await?;
        let allowed = if session.is_admin() {
            visible_to_admin(&notification) || visible_to_user(&notification, &session.user_id)
        } else {
            visible_to_user(&notification, &session.user_id)
        };
        if !allowed {
            return Err(EngineError::Unauthorized(format!("notification {} is not in this feed", id)));
        }
        self.inner.perform_action(id, NotificationAction::MarkRead).await
    }

    /// Marks every notification in the caller's feed read. Returns how many changed.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn mark_all_read(&self, session: &Session) -> EngineResult<usize> {
        let feed = if session.is_admin() {
            self.get_admin_notifications().await?
        } else {
            self.get_user_notifications(session.user_id.clone()).await?
        };
        let mut changed = 0;
        for n in feed.into_iter().filter(|n| !n.read) {
            if self.inner.perform_action(n.id, NotificationAction::MarkRead).await? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    #[instrument(skip(self))]
    pub async fn get_user_notifications(&self, user_id: String) -> EngineResult<Vec<Notification>> {
        let mut feed = self
            .inner
            .find(move |n: &Notification| visible_to_user(n, &user_id))
            .await?;
        sort_newest_first(&mut feed);
        Ok(feed)
    }

    #[instrument(skip(self))]
    pub async fn get_admin_notifications(&self) -> EngineResult<Vec<Notification>> {
        let mut feed = self.inner.find(visible_to_admin).await?;
        sort_newest_first(&mut feed);
        Ok(feed)
    }

    pub async fn user_unread_count(&self, user_id: String) -> EngineResult<usize> {
        let unread = self
            .inner
            .find(move |n: &Notification| unread_for_user(n, &user_id))
            .await?;
        Ok(unread.len())
    }

    /// Unaddressed unread notifications plus support threads waiting on an admin.
    pub async fn admin_unread_count(&self) -> EngineResult<usize> {
        let notifications = self.inner.find(|n: &Notification| !n.read).await?;
        let conversations = self.conversations.awaiting_admin().await?;
        Ok(admin_unread_count(&notifications, &conversations))
    }
}
