//! In-memory store - the default backend when no database URL is set.
//!
//! Mirrors the PostgreSQL schema rules: unique usernames, emails, slugs
//! and follow pairs, no self-follow, and cascading deletes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Comment, Follow, Group, Post, User};
use yatube_core::error::RepoError;
use yatube_core::pagination::{Page, PageRequest, paginate};
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};
use yatube_core::services::Repositories;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every repository port backed by this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            groups: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
            follows: Arc::new(self.clone()),
        }
    }
}

/// Insert or replace by id, keeping insertion order for new rows.
fn upsert<T: Clone>(rows: &mut Vec<T>, entity: T, id: impl Fn(&T) -> Uuid) -> T {
    let key = id(&entity);
    match rows.iter_mut().find(|row| id(row) == key) {
        Some(row) => *row = entity.clone(),
        None => rows.push(entity.clone()),
    }
    entity
}

fn remove<T>(rows: &mut Vec<T>, id: Uuid, key: impl Fn(&T) -> Uuid) -> Result<(), RepoError> {
    let before = rows.len();
    rows.retain(|row| key(row) != id);
    if rows.len() == before {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let clash = tables.users.iter().any(|u| {
            u.id != user.id && (u.username == user.username || u.email == user.email)
        });
        if clash {
            return Err(RepoError::Constraint(format!(
                "user {} already exists",
                user.username
            )));
        }
        Ok(upsert(&mut tables.users, user, |u| u.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.users, id, |u| u.id)?;

        let authored: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|p| p.author_id != id);
        tables
            .comments
            .retain(|c| c.author_id != id && !authored.contains(&c.post_id));
        tables
            .follows
            .retain(|f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn save(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .groups
            .iter()
            .any(|g| g.id != group.id && g.slug == group.slug)
        {
            return Err(RepoError::Constraint(format!(
                "group slug {} already exists",
                group.slug
            )));
        }
        Ok(upsert(&mut tables.groups, group, |g| g.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.groups, id, |g| g.id)?;
        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryDatabase {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }
        if let Some(group_id) = post.group_id {
            if !tables.groups.iter().any(|g| g.id == group_id) {
                return Err(RepoError::Constraint(format!(
                    "group {} does not exist",
                    group_id
                )));
            }
        }
        Ok(upsert(&mut tables.posts, post, |p| p.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.posts, id, |p| p.id)?;
        tables.comments.retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryDatabase {
    async fn find_page(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;

        let followed: Vec<Uuid> = match filter {
            PostFilter::FollowedBy(user_id) => tables
                .follows
                .iter()
                .filter(|f| f.user_id == *user_id)
                .map(|f| f.author_id)
                .collect(),
            _ => Vec::new(),
        };
        let needle = match filter {
            PostFilter::TextContains(term) => term.to_lowercase(),
            _ => String::new(),
        };

        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| match filter {
                PostFilter::All => true,
                PostFilter::TextContains(_) => p.text.to_lowercase().contains(&needle),
                PostFilter::Group(group_id) => p.group_id == Some(*group_id),
                PostFilter::Author(author_id) => p.author_id == *author_id,
                PostFilter::FollowedBy(_) => followed.contains(&p.author_id),
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(paginate(posts, page))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| p.author_id == author_id).count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        Ok(upsert(&mut tables.comments, comment, |c| c.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.comments, id, |c| c.id)
    }
}

#[async_trait]
impl CommentRepository for InMemoryDatabase {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl BaseRepository<Follow, Uuid> for InMemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Follow>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.iter().find(|f| f.id == id).cloned())
    }

    async fn save(&self, follow: Follow) -> Result<Follow, RepoError> {
        let mut tables = self.tables.write().await;
        if follow.user_id == follow.author_id {
            return Err(RepoError::Constraint("users cannot follow themselves".into()));
        }
        if tables.follows.iter().any(|f| {
            f.id != follow.id && f.user_id == follow.user_id && f.author_id == follow.author_id
        }) {
            return Err(RepoError::Constraint("follow already exists".into()));
        }
        Ok(upsert(&mut tables.follows, follow, |f| f.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.follows, id, |f| f.id)
    }
}

#[async_trait]
impl FollowRepository for InMemoryDatabase {
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn delete_pair(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() != before)
    }
}
