use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use yatube_core::domain::{Follow, Post};
use yatube_core::error::RepoError;
use yatube_core::pagination::PageRequest;
use yatube_core::ports::{BaseRepository, FollowRepository, PostFilter, PostRepository};

use crate::database::entity::{follow, post};
use crate::database::postgres_repo::{
    PostgresFollowRepository, PostgresPostRepository, postgres_repositories,
};

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

fn post_model(author_id: Uuid, text: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::now_v7(),
        author_id,
        group_id: None,
        text: text.to_owned(),
        image: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let author_id = Uuid::now_v7();
    let model = post_model(author_id, "Test Post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.text, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_find_page_clamps_to_last_page() {
    let author_id = Uuid::now_v7();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(21)]])
        .append_query_results([vec![post_model(author_id, "oldest")]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let page = repo
        .find_page(&PostFilter::Author(author_id), PageRequest::number(7))
        .await
        .unwrap();

    assert_eq!(page.number, 3);
    assert_eq!(page.num_pages, 3);
    assert_eq!(page.total, 21);
    assert_eq!(page.items.len(), 1);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_save_post_returns_stored_row() {
    let author_id = Uuid::now_v7();
    let model = post_model(author_id, "stored");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let post: Post = model.clone().into();

    let saved = repo.save(post).await.unwrap();
    assert_eq!(saved.id, model.id);
    assert_eq!(saved.text, "stored");
}

#[tokio::test]
async fn test_follow_exists_and_delete_pair() {
    let user_id = Uuid::now_v7();
    let author_id = Uuid::now_v7();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresFollowRepository::new(Arc::new(db));

    assert!(repo.exists(user_id, author_id).await.unwrap());
    assert!(repo.delete_pair(user_id, author_id).await.unwrap());
    assert!(!repo.delete_pair(user_id, author_id).await.unwrap());
}

#[tokio::test]
async fn test_save_follow_maps_model() {
    let edge = Follow::new(Uuid::now_v7(), Uuid::now_v7()).unwrap();
    let model = follow::Model {
        id: edge.id,
        user_id: edge.user_id,
        author_id: edge.author_id,
        created_at: edge.created_at.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresFollowRepository::new(Arc::new(db));
    let saved = repo.save(edge.clone()).await.unwrap();
    assert_eq!(saved.author_id, edge.author_id);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::now_v7()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_repositories_share_one_connection() {
    let author_id = Uuid::now_v7();
    let model = post_model(author_id, "Shared pool");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .append_query_results([vec![count_row(1)]])
        .into_connection();

    let repos = postgres_repositories(db);
    let found = repos.posts.find_by_id(post_id).await.unwrap();
    assert_eq!(found.map(|p| p.text).as_deref(), Some("Shared pool"));
    assert_eq!(repos.posts.count_by_author(author_id).await.unwrap(), 1);
}
