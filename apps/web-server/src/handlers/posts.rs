//! Read-only pages: listings and post detail.

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};

use yatube_core::DomainError;
use yatube_core::pagination::PageRequest;
use yatube_core::services::PageCache;
use yatube_shared::dto::ListingQuery;
use yatube_shared::views::CommentFormView;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::presenter;
use crate::state::AppState;

use super::parse_post_id;

/// Header telling whether the body came from the page cache.
pub const CACHE_STATUS_HEADER: &str = "X-Cache";

/// GET / and GET /home - cached for the page cache TTL per path and query.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
) -> AppResult<HttpResponse> {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let key = PageCache::key(target);
    let query = query.into_inner();
    let feeds = state.feed.clone();

    let (body, hit) = state
        .page_cache
        .get_or_insert_with(&key, || async move {
            let feed = feeds
                .list_home(query.q.as_deref(), PageRequest::from_query(query.page.as_deref()))
                .await?;
            serde_json::to_string(&presenter::home(&feed))
                .map_err(|e| DomainError::Internal(e.to_string()))
        })
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .insert_header((CACHE_STATUS_HEADER, if hit { "HIT" } else { "MISS" }))
        .body(body))
}

/// GET /group/{slug}
pub async fn group(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListingQuery>,
) -> AppResult<HttpResponse> {
    let feed = state
        .feed
        .list_group(&path, PageRequest::from_query(query.page.as_deref()))
        .await?;

    Ok(HttpResponse::Ok().json(presenter::group(&feed)))
}

/// GET /profile/{username}
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<ListingQuery>,
) -> AppResult<HttpResponse> {
    let viewer = identity.user_id();
    let feed = state
        .feed
        .list_profile(&path, viewer, PageRequest::from_query(query.page.as_deref()))
        .await?;

    Ok(HttpResponse::Ok().json(presenter::profile(&feed, viewer)))
}

/// GET /posts/{post_id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let detail = state.feed.post_detail(post_id).await?;

    Ok(HttpResponse::Ok().json(presenter::post_detail(
        &detail,
        identity.user_id(),
        CommentFormView::default(),
    )))
}
