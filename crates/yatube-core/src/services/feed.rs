//! Read side: listings and post detail.

use uuid::Uuid;

use crate::domain::{Comment, Group, User};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};
use crate::ports::PostFilter;

use super::{PostEntry, Repositories};

/// Heading of the home listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedHeading {
    Latest,
    Found,
    NoResults,
}

impl FeedHeading {
    pub fn label(&self) -> &'static str {
        match self {
            FeedHeading::Latest => "latest updates",
            FeedHeading::Found => "found",
            FeedHeading::NoResults => "no results",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomeFeed {
    pub heading: FeedHeading,
    pub search: Option<String>,
    pub page: Page<PostEntry>,
}

#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostEntry>,
}

impl GroupFeed {
    pub fn heading(&self) -> String {
        format!("Posts of the \"{}\" community", self.group.title)
    }
}

#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: User,
    pub post_count: u64,
    pub following: bool,
    pub page: Page<PostEntry>,
}

#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: User,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub entry: PostEntry,
    pub author_post_count: u64,
    pub title: String,
    pub comments: Vec<CommentEntry>,
}

/// Builds every listing page and the post detail view.
#[derive(Clone)]
pub struct FeedService {
    repos: Repositories,
}

impl FeedService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Home listing, optionally narrowed by a search term. An empty term
    /// counts as no term.
    pub async fn list_home(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<HomeFeed, DomainError> {
        let search = search.filter(|term| !term.is_empty());

        let (filter, heading) = match search {
            None => (PostFilter::All, FeedHeading::Latest),
            Some(term) => (PostFilter::TextContains(term.to_string()), FeedHeading::Found),
        };

        let posts = self.repos.posts.find_page(&filter, page).await?;
        let heading = if heading == FeedHeading::Found && posts.total == 0 {
            FeedHeading::NoResults
        } else {
            heading
        };

        tracing::debug!(
            search = ?search,
            total = posts.total,
            page = posts.number,
            "Home listing built"
        );

        Ok(HomeFeed {
            heading,
            search: search.map(str::to_string),
            page: self.repos.attach(posts).await?,
        })
    }

    pub async fn list_group(&self, slug: &str, page: PageRequest) -> Result<GroupFeed, DomainError> {
        let group = self
            .repos
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;

        let posts = self
            .repos
            .posts
            .find_page(&PostFilter::Group(group.id), page)
            .await?;

        Ok(GroupFeed {
            group,
            page: self.repos.attach(posts).await?,
        })
    }

    /// Author profile. `viewer` is the authenticated caller, if any.
    pub async fn list_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<ProfileFeed, DomainError> {
        let author = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let posts = self
            .repos
            .posts
            .find_page(&PostFilter::Author(author.id), page)
            .await?;

        let following = match viewer {
            Some(viewer_id) => self.repos.follows.exists(viewer_id, author.id).await?,
            None => false,
        };

        Ok(ProfileFeed {
            post_count: posts.total,
            following,
            page: self.repos.attach(posts).await?,
            author,
        })
    }

    /// Posts by every author `viewer` follows.
    pub async fn list_followed(
        &self,
        viewer: Uuid,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, DomainError> {
        let posts = self
            .repos
            .posts
            .find_page(&PostFilter::FollowedBy(viewer), page)
            .await?;

        self.repos.attach(posts).await
    }

    pub async fn post_detail(&self, post_id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self
            .repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        let author_post_count = self.repos.posts.count_by_author(post.author_id).await?;
        let title = post.title();

        let comments = self.repos.comments.find_by_post(post.id).await?;
        let commenter_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
        let commenters = self.repos.users.find_many(&commenter_ids).await?;

        let comments = comments
            .into_iter()
            .filter_map(|comment| {
                let author = commenters.iter().find(|u| u.id == comment.author_id)?.clone();
                Some(CommentEntry { comment, author })
            })
            .collect();

        Ok(PostDetail {
            entry: self.repos.entry(post).await?,
            author_post_count,
            title,
            comments,
        })
    }
}
