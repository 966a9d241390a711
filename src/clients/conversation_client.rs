use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::clock::SharedClock;
use crate::conversation_actor::ConversationAction;
use crate::domain::{Conversation, ConversationCreate};
use crate::error::EngineResult;

/// Client for the support-thread flags.
#[derive(Clone)]
pub struct ConversationClient {
    inner: ResourceClient<Conversation>,
    clock: SharedClock,
}

impl_client_methods!(ConversationClient, Conversation, conversation);

impl ConversationClient {
    pub fn new(inner: ResourceClient<Conversation>, clock: SharedClock) -> Self {
        Self { inner, clock }
    }

    #[instrument(skip(self))]
    pub async fn start_conversation(&self, user_id: String) -> EngineResult<Conversation> {
        debug!("Sending request");
        let created_at = self.clock.now();
        self.inner.create(ConversationCreate { user_id, created_at }).await
    }

    #[instrument(skip(self))]
    pub async fn transfer_to_admin(&self, id: String) -> EngineResult<Conversation> {
        let at = self.clock.now();
        let conversation = self
            .inner
            .perform_action(id, ConversationAction::TransferToAdmin { at })
            .await?;
        info!("Conversation handed to an admin");
        Ok(conversation)
    }

    #[instrument(skip(self))]
    pub async fn mark_admin_replied(&self, id: String) -> EngineResult<Conversation> {
        let at = self.clock.now();
        self.inner
            .perform_action(id, ConversationAction::AdminReplied { at })
            .await
    }

    pub async fn awaiting_admin(&self) -> EngineResult<Vec<Conversation>> {
        self.inner.find(|c: &Conversation| c.awaits_admin()).await
    }
}
