use crate::{Id, RequestId, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message ID type
pub type MessageId = Id<Message>;

/// A chat line inside an accepted swap session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub request_id: RequestId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: UserId,
    pub author_name: String,
    pub author_avatar: String,
}

impl Message {
    pub fn new(request_id: RequestId, author: &User, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            request_id,
            text: text.into(),
            created_at: Utc::now(),
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            author_avatar: author.avatar_url.clone(),
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
