use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Support thread flags. Message content lives outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub transferred_to_admin: bool,
    pub admin_replied: bool,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Handed to a human and still waiting for the first admin reply.
    pub fn awaits_admin(&self) -> bool {
        self.transferred_to_admin && !self.admin_replied
    }
}

#[derive(Debug, Clone)]
pub struct ConversationCreate {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}
