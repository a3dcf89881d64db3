//! Maps service results onto the view models pages render from.

use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::forms::FieldErrors;
use yatube_core::pagination::Page;
use yatube_core::services::{CommentEntry, GroupFeed, HomeFeed, PostDetail, PostEntry, ProfileFeed};
use yatube_shared::dto::PostFormData;
use yatube_shared::views::{
    AuthorView, CommentFormView, CommentView, FollowFeedView, GroupInfo, GroupLink, GroupOption,
    GroupView, HomeView, PageView, PostCard, PostDetailView, PostFormValues, PostFormView,
    ProfileView,
};

pub fn author(user: &User) -> AuthorView {
    AuthorView {
        username: user.username.clone(),
        display_name: user.display_name(),
    }
}

pub fn post_card(entry: &PostEntry) -> PostCard {
    PostCard {
        id: entry.post.id.to_string(),
        text: entry.post.text.clone(),
        label: entry.post.to_string(),
        author: author(&entry.author),
        group: entry.group.as_ref().map(|g| GroupLink {
            title: g.title.clone(),
            slug: g.slug.clone(),
        }),
        image: entry.post.image.clone(),
        created_at: entry.post.created_at,
    }
}

fn page_view<T, U>(page: &Page<T>, f: impl Fn(&T) -> U) -> PageView<U> {
    PageView {
        items: page.items.iter().map(f).collect(),
        number: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
    }
}

fn cards(page: &Page<PostEntry>) -> PageView<PostCard> {
    page_view(page, post_card)
}

pub fn home(feed: &HomeFeed) -> HomeView {
    HomeView {
        heading: feed.heading.label().to_string(),
        search: feed.search.clone(),
        page: cards(&feed.page),
    }
}

pub fn group(feed: &GroupFeed) -> GroupView {
    GroupView {
        heading: feed.heading(),
        group: GroupInfo {
            title: feed.group.title.clone(),
            slug: feed.group.slug.clone(),
            description: feed.group.description.clone(),
        },
        page: cards(&feed.page),
    }
}

pub fn profile(feed: &ProfileFeed, viewer: Option<Uuid>) -> ProfileView {
    ProfileView {
        author: author(&feed.author),
        post_count: feed.post_count,
        following: feed.following,
        is_self: viewer == Some(feed.author.id),
        page: cards(&feed.page),
    }
}

pub fn follow_feed(page: &Page<PostEntry>) -> FollowFeedView {
    FollowFeedView { page: cards(page) }
}

fn comment(entry: &CommentEntry) -> CommentView {
    CommentView {
        id: entry.comment.id.to_string(),
        author: author(&entry.author),
        text: entry.comment.text.clone(),
        created_at: entry.comment.created_at,
    }
}

/// Post detail; `comment_form` carries a rejected submission back.
pub fn post_detail(
    detail: &PostDetail,
    viewer: Option<Uuid>,
    comment_form: CommentFormView,
) -> PostDetailView {
    PostDetailView {
        title: detail.title.clone(),
        post: post_card(&detail.entry),
        author_post_count: detail.author_post_count,
        is_author: viewer == Some(detail.entry.post.author_id),
        comments: detail.comments.iter().map(comment).collect(),
        comment_form,
    }
}

pub fn comment_form(text: String, errors: FieldErrors) -> CommentFormView {
    CommentFormView {
        text,
        errors: errors.into_inner(),
    }
}

fn group_options(groups: &[Group]) -> Vec<GroupOption> {
    groups
        .iter()
        .map(|g| GroupOption {
            id: g.id.to_string(),
            title: g.title.clone(),
        })
        .collect()
}

/// Empty create form.
pub fn new_post_form(groups: &[Group]) -> PostFormView {
    PostFormView {
        is_edit: false,
        post_id: None,
        values: PostFormValues::default(),
        errors: Default::default(),
        groups: group_options(groups),
    }
}

/// Edit form pre-filled from the stored post.
pub fn edit_post_form(post: &Post, groups: &[Group]) -> PostFormView {
    PostFormView {
        is_edit: true,
        post_id: Some(post.id.to_string()),
        values: PostFormValues {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
        },
        errors: Default::default(),
        groups: group_options(groups),
    }
}

/// A rejected submission, echoed back with its errors.
pub fn rejected_post_form(
    post_id: Option<Uuid>,
    submitted: PostFormData,
    errors: FieldErrors,
    groups: &[Group],
) -> PostFormView {
    PostFormView {
        is_edit: post_id.is_some(),
        post_id: post_id.map(|id| id.to_string()),
        values: PostFormValues {
            text: submitted.text,
            group: submitted.group,
            image: submitted.image,
        },
        errors: errors.into_inner(),
        groups: group_options(groups),
    }
}
