use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Follow edge - `user_id` receives the posts of `author_id` in their feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    /// Create a follow edge. A user cannot follow themself.
    pub fn new(user_id: Uuid, author_id: Uuid) -> Result<Self, DomainError> {
        if user_id == author_id {
            return Err(DomainError::SelfFollow);
        }

        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            author_id,
            created_at: Utc::now(),
        })
    }
}
