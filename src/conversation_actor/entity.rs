use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Conversation, ConversationCreate};
use crate::error::EngineResult;

#[derive(Debug, Clone)]
pub enum ConversationAction {
    /// The customer asked for a human. Clears any earlier admin reply.
    TransferToAdmin { at: DateTime<Utc> },
    AdminReplied { at: DateTime<Utc> },
}

impl Entity for Conversation {
    type Id = String;
    type CreatePayload = ConversationCreate;
    type Patch = ();
    type Action = ConversationAction;
    type ActionResult = Conversation;

    const KIND: &'static str = "conversation";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, params: ConversationCreate) -> EngineResult<Self> {
        Ok(Self {
            id,
            user_id: params.user_id,
            transferred_to_admin: false,
            admin_replied: false,
            updated_at: params.created_at,
        })
    }

    fn on_update(&mut self, _patch: ()) -> EngineResult<()> {
        Ok(())
    }

    fn handle_action(&mut self, action: ConversationAction) -> EngineResult<Conversation> {
        match action {
            ConversationAction::TransferToAdmin { at } => {
                self.transferred_to_admin = true;
                self.admin_replied = false;
                self.updated_at = at;
            }
            ConversationAction::AdminReplied { at } => {
                self.admin_replied = true;
                self.updated_at = at;
            }
        }
        Ok(self.clone())
    }
}
