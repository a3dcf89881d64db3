use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters shown when a post is displayed inline.
pub const POST_LABEL_CHARS: usize = 15;

/// Number of characters used as the post detail page title.
pub const POST_TITLE_CHARS: usize = 30;

/// Post entity - a blog entry owned by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            author_id,
            group_id: None,
            text: text.into(),
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_group(mut self, group_id: Option<Uuid>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// First `chars` characters of the text, never splitting a code point.
    pub fn excerpt(&self, chars: usize) -> String {
        self.text.chars().take(chars).collect()
    }

    pub fn title(&self) -> String {
        self.excerpt(POST_TITLE_CHARS)
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.excerpt(POST_LABEL_CHARS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_first_fifteen_chars() {
        let post = Post::new(
            Uuid::now_v7(),
            "Тестовый пост для проверки и исправления ошибок в коде",
        );
        assert_eq!(post.to_string(), "Тестовый пост д");
    }

    #[test]
    fn title_is_limited_to_thirty_chars() {
        let post = Post::new(Uuid::now_v7(), "short");
        assert_eq!(post.title(), "short");

        let post = Post::new(Uuid::now_v7(), "a".repeat(45));
        assert_eq!(post.title().chars().count(), 30);
    }
}
