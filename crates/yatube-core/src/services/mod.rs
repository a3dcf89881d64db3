//! Application services - the read and write paths of the blog.

mod feed;
mod page_cache;
mod posting;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Group, Post, User};
use crate::error::DomainError;
use crate::pagination::Page;
use crate::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

pub use feed::{CommentEntry, FeedHeading, FeedService, GroupFeed, HomeFeed, PostDetail, ProfileFeed};
pub use page_cache::{PAGE_CACHE_TTL, PageCache};
pub use posting::{Ownership, PostingService};

/// The set of repositories services read from and write to.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

/// A post together with the author and group it references.
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}

impl Repositories {
    /// Load authors and groups for a page of posts with one query each.
    pub(crate) async fn attach(&self, page: Page<Post>) -> Result<Page<PostEntry>, DomainError> {
        let author_ids: Vec<Uuid> = unique(page.items.iter().map(|p| p.author_id));
        let group_ids: Vec<Uuid> = unique(page.items.iter().filter_map(|p| p.group_id));

        if author_ids.is_empty() {
            return Ok(Page {
                items: Vec::new(),
                number: page.number,
                num_pages: page.num_pages,
                total: page.total,
            });
        }

        let authors: HashMap<Uuid, User> = self
            .users
            .find_many(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.groups
                .find_many(&group_ids)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        if let Some(orphan) = page.items.iter().find(|p| !authors.contains_key(&p.author_id)) {
            return Err(DomainError::Internal(format!(
                "post {} references a missing author",
                orphan.id
            )));
        }

        Ok(page.map(|post| PostEntry {
            author: authors[&post.author_id].clone(),
            group: post.group_id.and_then(|id| groups.get(&id).cloned()),
            post,
        }))
    }

    pub(crate) async fn entry(&self, post: Post) -> Result<PostEntry, DomainError> {
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| {
                DomainError::Internal(format!("post {} references a missing author", post.id))
            })?;
        let group = match post.group_id {
            Some(id) => self.groups.find_by_id(id).await?,
            None => None,
        };
        Ok(PostEntry {
            post,
            author,
            group,
        })
    }
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
