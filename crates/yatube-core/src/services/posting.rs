//! Write side: posts, comments and follow edges.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Comment, Follow, Group, Post, User};
use crate::error::{DomainError, RepoError};
use crate::forms::{CleanPost, CommentDraft, FieldErrors, INVALID_CHOICE, PostDraft};

use super::Repositories;

/// Outcome of an operation reserved to a post's author.
#[derive(Debug, Clone)]
pub enum Ownership<T> {
    Owner(T),
    /// The actor is not the author; nothing was changed.
    NotOwner { author: User },
}

/// Creates and edits content on behalf of an authenticated actor.
#[derive(Clone)]
pub struct PostingService {
    repos: Repositories,
}

impl PostingService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Groups a post may be filed under, ordered by title.
    pub async fn selectable_groups(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.repos.groups.list_all().await?)
    }

    pub async fn create_post(&self, author_id: Uuid, draft: &PostDraft) -> Result<Post, DomainError> {
        let clean = self.validate(draft).await?;

        let post = Post::new(author_id, clean.text)
            .in_group(clean.group_id)
            .with_image(clean.image);
        let post = self.repos.posts.save(post).await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// The post as it should pre-fill the edit form, for its author only.
    pub async fn edit_form(&self, post_id: Uuid, actor_id: Uuid) -> Result<Ownership<Post>, DomainError> {
        let post = self.find_post(post_id).await?;
        self.owned(post, actor_id).await
    }

    /// Apply an edit. Validation runs only once ownership is established;
    /// an omitted image keeps the current one.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        draft: &PostDraft,
    ) -> Result<Ownership<Post>, DomainError> {
        let mut post = match self.owned(self.find_post(post_id).await?, actor_id).await? {
            Ownership::Owner(post) => post,
            not_owner => return Ok(not_owner),
        };

        let clean = self.validate(draft).await?;
        post.text = clean.text;
        post.group_id = clean.group_id;
        if clean.image.is_some() {
            post.image = clean.image;
        }
        post.updated_at = Utc::now();

        let post = self.repos.posts.save(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(Ownership::Owner(post))
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        draft: &CommentDraft,
    ) -> Result<Comment, DomainError> {
        let post = self.find_post(post_id).await?;
        let text = draft.clean().map_err(DomainError::InvalidForm)?;

        let comment = self
            .repos
            .comments
            .save(Comment::new(post.id, actor_id, text))
            .await?;

        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");
        Ok(comment)
    }

    /// Follow `username`. Following yourself or an author you already
    /// follow changes nothing. Returns the author.
    pub async fn follow(&self, follower_id: Uuid, username: &str) -> Result<User, DomainError> {
        let author = self.find_author(username).await?;

        if author.id == follower_id || self.repos.follows.exists(follower_id, author.id).await? {
            return Ok(author);
        }

        let edge = Follow::new(follower_id, author.id)?;
        match self.repos.follows.save(edge).await {
            Ok(_) => {
                tracing::info!(follower_id = %follower_id, author_id = %author.id, "Follow created");
            }
            Err(RepoError::Constraint(reason)) => {
                tracing::debug!(%reason, "Concurrent follow already stored");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(author)
    }

    /// Remove the follow edge to `username` if there is one. Returns the author.
    pub async fn unfollow(&self, follower_id: Uuid, username: &str) -> Result<User, DomainError> {
        let author = self.find_author(username).await?;

        if self.repos.follows.delete_pair(follower_id, author.id).await? {
            tracing::info!(follower_id = %follower_id, author_id = %author.id, "Follow removed");
        }

        Ok(author)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn find_author(&self, username: &str) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    async fn owned(&self, post: Post, actor_id: Uuid) -> Result<Ownership<Post>, DomainError> {
        if post.is_authored_by(actor_id) {
            return Ok(Ownership::Owner(post));
        }

        let author = self
            .repos
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", post.author_id))?;

        tracing::debug!(post_id = %post.id, actor_id = %actor_id, "Edit refused to non-author");
        Ok(Ownership::NotOwner { author })
    }

    /// Field validation followed by the group existence check.
    async fn validate(&self, draft: &PostDraft) -> Result<CleanPost, DomainError> {
        let clean = draft.clean().map_err(DomainError::InvalidForm)?;

        if let Some(group_id) = clean.group_id {
            if self.repos.groups.find_by_id(group_id).await?.is_none() {
                let mut errors = FieldErrors::new();
                errors.add("group", INVALID_CHOICE);
                return Err(DomainError::InvalidForm(errors));
            }
        }

        Ok(clean)
    }
}
