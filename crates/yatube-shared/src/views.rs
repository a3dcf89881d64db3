//! View models - everything a template needs to render a page.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field name to validation messages.
pub type FormErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorView {
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
}

/// One post as shown in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCard {
    pub id: String,
    pub text: String,
    /// Short inline form of the post.
    pub label: String,
    pub author: AuthorView,
    pub group: Option<GroupLink>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeView {
    /// "latest updates", "found" or "no results".
    pub heading: String,
    pub search: Option<String>,
    pub page: PageView<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub heading: String,
    pub group: GroupInfo,
    pub page: PageView<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub author: AuthorView,
    pub post_count: u64,
    pub following: bool,
    /// Whether the viewer is looking at their own profile.
    pub is_self: bool,
    pub page: PageView<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowFeedView {
    pub page: PageView<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub author: AuthorView,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentFormView {
    pub text: String,
    pub errors: FormErrors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetailView {
    pub title: String,
    pub post: PostCard,
    pub author_post_count: u64,
    pub is_author: bool,
    pub comments: Vec<CommentView>,
    pub comment_form: CommentFormView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupOption {
    pub id: String,
    pub title: String,
}

/// Submitted or stored values of the post form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostFormValues {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostFormView {
    pub is_edit: bool,
    pub post_id: Option<String>,
    pub values: PostFormValues,
    pub errors: FormErrors,
    pub groups: Vec<GroupOption>,
}

/// Login page; `next` is where a successful login should return to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginPageView {
    pub next: Option<String>,
    pub fields: Vec<String>,
}
