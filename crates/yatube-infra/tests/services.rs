//! Listing, posting and page-cache behaviour against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use yatube_core::DomainError;
use yatube_core::domain::{Group, Post, User};
use yatube_core::forms::{CommentDraft, INVALID_CHOICE, PostDraft, REQUIRED};
use yatube_core::pagination::PageRequest;
use yatube_core::services::{FeedHeading, FeedService, Ownership, PageCache, PostingService, Repositories};
use yatube_infra::{InMemoryCache, InMemoryDatabase};

struct Site {
    repos: Repositories,
    feed: FeedService,
    posting: PostingService,
}

impl Site {
    fn new() -> Self {
        let repos = InMemoryDatabase::new().repositories();
        Self {
            feed: FeedService::new(repos.clone()),
            posting: PostingService::new(repos.clone()),
            repos,
        }
    }

    async fn user(&self, username: &str) -> User {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        );
        self.repos.users.save(user).await.unwrap()
    }

    async fn group(&self, slug: &str) -> Group {
        let group = Group::new(format!("Group {slug}"), slug, "description");
        self.repos.groups.save(group).await.unwrap()
    }

    /// Posts with strictly increasing timestamps, oldest first.
    async fn seed_posts(&self, author: &User, count: usize) -> Vec<Post> {
        let start = Utc::now() - TimeDelta::hours(1);
        let mut posts = Vec::with_capacity(count);
        for i in 0..count {
            let mut post = Post::new(author.id, format!("Post number {i}"));
            post.created_at = start + TimeDelta::seconds(i as i64);
            posts.push(self.repos.posts.save(post).await.unwrap());
        }
        posts
    }
}

fn draft(text: &str) -> PostDraft {
    PostDraft {
        text: text.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn home_listing_paginates_by_ten() {
    let site = Site::new();
    let author = site.user("leo").await;
    site.seed_posts(&author, 21).await;

    let counts = page_sizes(&site, [1, 2, 3]).await;
    assert_eq!(counts, vec![10, 10, 1]);

    let page = site.feed.list_home(None, PageRequest::number(1)).await.unwrap();
    assert_eq!(page.heading, FeedHeading::Latest);
    assert_eq!(page.page.items[0].post.text, "Post number 20");
    assert_eq!(page.page.num_pages, 3);
}

async fn page_sizes<const N: usize>(site: &Site, pages: [i64; N]) -> Vec<usize> {
    let mut counts = Vec::with_capacity(N);
    for number in pages {
        let feed = site
            .feed
            .list_home(None, PageRequest::number(number))
            .await
            .unwrap();
        counts.push(feed.page.len());
    }
    counts
}

#[tokio::test]
async fn search_labels_found_and_no_results() {
    let site = Site::new();
    let author = site.user("leo").await;
    site.seed_posts(&author, 3).await;
    site.posting
        .create_post(author.id, &draft("Something about Anna Karenina"))
        .await
        .unwrap();

    let found = site
        .feed
        .list_home(Some("anna"), PageRequest::first())
        .await
        .unwrap();
    assert_eq!(found.heading, FeedHeading::Found);
    assert_eq!(found.heading.label(), "found");
    assert_eq!(found.page.total, 1);
    assert_eq!(found.page.items[0].post.text, "Something about Anna Karenina");

    let none = site
        .feed
        .list_home(Some("tolstoy"), PageRequest::first())
        .await
        .unwrap();
    assert_eq!(none.heading, FeedHeading::NoResults);
    assert!(none.page.is_empty());

    let blank = site.feed.list_home(Some(""), PageRequest::first()).await.unwrap();
    assert_eq!(blank.heading, FeedHeading::Latest);
    assert_eq!(blank.page.total, 4);
}

#[tokio::test]
async fn unknown_slug_username_and_post_are_not_found() {
    let site = Site::new();

    let group = site.feed.list_group("missing", PageRequest::first()).await;
    assert!(matches!(group, Err(DomainError::NotFound { entity_type: "group", .. })));

    let profile = site
        .feed
        .list_profile("nobody", None, PageRequest::first())
        .await;
    assert!(matches!(profile, Err(DomainError::NotFound { entity_type: "user", .. })));

    let detail = site.feed.post_detail(Uuid::now_v7()).await;
    assert!(matches!(detail, Err(DomainError::NotFound { entity_type: "post", .. })));
}

#[tokio::test]
async fn group_listing_only_shows_group_posts() {
    let site = Site::new();
    let author = site.user("leo").await;
    let group = site.group("novels").await;
    site.seed_posts(&author, 2).await;

    let mut in_group = draft("Filed under novels");
    in_group.group = Some(group.id.to_string());
    site.posting.create_post(author.id, &in_group).await.unwrap();

    let feed = site.feed.list_group("novels", PageRequest::first()).await.unwrap();
    assert_eq!(feed.page.total, 1);
    assert_eq!(feed.heading(), "Posts of the \"Group novels\" community");
    assert_eq!(
        feed.page.items[0].group.as_ref().map(|g| g.slug.as_str()),
        Some("novels")
    );
}

#[tokio::test]
async fn created_post_appears_first_on_home() {
    let site = Site::new();
    let author = site.user("leo").await;
    site.seed_posts(&author, 5).await;

    let post = site
        .posting
        .create_post(author.id, &draft("  Fresh off the press  "))
        .await
        .unwrap();
    assert_eq!(post.text, "Fresh off the press");
    assert_eq!(post.group_id, None);

    let home = site.feed.list_home(None, PageRequest::first()).await.unwrap();
    assert_eq!(home.page.items[0].post.id, post.id);
    assert_eq!(home.page.items[0].author.username, "leo");
}

#[tokio::test]
async fn invalid_post_form_persists_nothing() {
    let site = Site::new();
    let author = site.user("leo").await;

    let result = site.posting.create_post(author.id, &draft("   ")).await;
    match result {
        Err(DomainError::InvalidForm(errors)) => {
            assert_eq!(errors.get("text"), [REQUIRED.to_string()]);
        }
        other => panic!("expected form errors, got {other:?}"),
    }

    let mut unknown_group = draft("text");
    unknown_group.group = Some(Uuid::now_v7().to_string());
    match site.posting.create_post(author.id, &unknown_group).await {
        Err(DomainError::InvalidForm(errors)) => {
            assert_eq!(errors.get("group"), [INVALID_CHOICE.to_string()]);
        }
        other => panic!("expected form errors, got {other:?}"),
    }

    let home = site.feed.list_home(None, PageRequest::first()).await.unwrap();
    assert_eq!(home.page.total, 0);
}

#[tokio::test]
async fn non_author_edit_changes_nothing() {
    let site = Site::new();
    let author = site.user("author").await;
    let intruder = site.user("intruder").await;
    let post = site
        .posting
        .create_post(author.id, &draft("original"))
        .await
        .unwrap();

    let outcome = site
        .posting
        .update_post(post.id, intruder.id, &draft("vandalised"))
        .await
        .unwrap();
    match outcome {
        Ownership::NotOwner { author: owner } => assert_eq!(owner.username, "author"),
        Ownership::Owner(_) => panic!("intruder allowed to edit"),
    }

    let form = site.posting.edit_form(post.id, intruder.id).await.unwrap();
    assert!(matches!(form, Ownership::NotOwner { .. }));

    let stored = site.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn author_edit_keeps_image_when_omitted() {
    let site = Site::new();
    let author = site.user("leo").await;
    let mut with_image = draft("with picture");
    with_image.image = Some("small.gif".into());
    let post = site.posting.create_post(author.id, &with_image).await.unwrap();
    assert_eq!(post.image.as_deref(), Some("posts/small.gif"));

    let outcome = site
        .posting
        .update_post(post.id, author.id, &draft("new words"))
        .await
        .unwrap();
    let Ownership::Owner(updated) = outcome else {
        panic!("author refused");
    };
    assert_eq!(updated.text, "new words");
    assert_eq!(updated.image.as_deref(), Some("posts/small.gif"));
    assert_eq!(updated.created_at, post.created_at);

    let missing = site
        .posting
        .update_post(Uuid::now_v7(), author.id, &draft("x"))
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn comments_show_on_post_detail_oldest_first() {
    let site = Site::new();
    let author = site.user("leo").await;
    let reader = site.user("reader").await;
    let post = site
        .posting
        .create_post(author.id, &draft("A post long enough to have a truncated title"))
        .await
        .unwrap();

    for text in ["first", "second"] {
        site.posting
            .add_comment(post.id, reader.id, &CommentDraft { text: text.into() })
            .await
            .unwrap();
    }
    let blank = site
        .posting
        .add_comment(post.id, reader.id, &CommentDraft { text: " ".into() })
        .await;
    assert!(matches!(blank, Err(DomainError::InvalidForm(_))));

    let detail = site.feed.post_detail(post.id).await.unwrap();
    let texts: Vec<&str> = detail.comments.iter().map(|c| c.comment.text.as_str()).collect();
    assert_eq!(texts, ["first", "second"]);
    assert_eq!(detail.comments[0].author.username, "reader");
    assert_eq!(detail.title.chars().count(), 30);
    assert_eq!(detail.author_post_count, 1);

    let orphan = site
        .posting
        .add_comment(Uuid::now_v7(), reader.id, &CommentDraft { text: "hi".into() })
        .await;
    assert!(matches!(orphan, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn follow_and_unfollow_are_idempotent() {
    let site = Site::new();
    let reader = site.user("reader").await;
    let author = site.user("author").await;
    site.seed_posts(&author, 2).await;

    site.posting.follow(reader.id, "author").await.unwrap();
    site.posting.follow(reader.id, "author").await.unwrap();
    assert!(site.repos.follows.exists(reader.id, author.id).await.unwrap());

    let feed = site
        .feed
        .list_followed(reader.id, PageRequest::first())
        .await
        .unwrap();
    assert_eq!(feed.total, 2);

    let profile = site
        .feed
        .list_profile("author", Some(reader.id), PageRequest::first())
        .await
        .unwrap();
    assert!(profile.following);
    assert_eq!(profile.post_count, 2);

    site.posting.unfollow(reader.id, "author").await.unwrap();
    site.posting.unfollow(reader.id, "author").await.unwrap();
    assert!(!site.repos.follows.exists(reader.id, author.id).await.unwrap());

    let missing = site.posting.follow(reader.id, "ghost").await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn self_follow_is_a_no_op_and_non_followers_see_nothing() {
    let site = Site::new();
    let author = site.user("author").await;
    let stranger = site.user("stranger").await;
    site.seed_posts(&author, 3).await;

    let returned = site.posting.follow(author.id, "author").await.unwrap();
    assert_eq!(returned.id, author.id);
    assert!(!site.repos.follows.exists(author.id, author.id).await.unwrap());

    let feed = site
        .feed
        .list_followed(stranger.id, PageRequest::first())
        .await
        .unwrap();
    assert!(feed.is_empty());

    let anonymous = site
        .feed
        .list_profile("author", None, PageRequest::first())
        .await
        .unwrap();
    assert!(!anonymous.following);
}

#[tokio::test]
async fn page_cache_serves_stale_until_cleared() {
    let site = Site::new();
    let author = site.user("leo").await;
    let cache = PageCache::new(Arc::new(InMemoryCache::new()), Duration::from_secs(20));
    let key = PageCache::key("/");

    let post = site
        .posting
        .create_post(author.id, &draft("Soon to be deleted"))
        .await
        .unwrap();

    let site = &site;
    let render = || async move {
        let feed = site.feed.list_home(None, PageRequest::first()).await?;
        Ok::<_, DomainError>(feed
            .page
            .items
            .iter()
            .map(|entry| entry.post.text.clone())
            .collect::<Vec<_>>()
            .join("\n"))
    };

    let (body, cached) = cache.get_or_insert_with(&key, render).await.unwrap();
    assert!(!cached);
    assert!(body.contains("Soon to be deleted"));

    site.repos.posts.delete(post.id).await.unwrap();

    let (body, cached) = cache.get_or_insert_with(&key, render).await.unwrap();
    assert!(cached);
    assert!(body.contains("Soon to be deleted"));

    cache.clear().await.unwrap();

    let (body, cached) = cache.get_or_insert_with(&key, render).await.unwrap();
    assert!(!cached);
    assert!(!body.contains("Soon to be deleted"));
}

#[tokio::test]
async fn page_cache_entries_expire() {
    let cache = PageCache::new(Arc::new(InMemoryCache::new()), Duration::from_millis(20));
    let key = PageCache::key("/?page=2");

    cache.store(&key, "body").await;
    assert_eq!(cache.get(&key).await.as_deref(), Some("body"));

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.get(&key).await, None);
}
