//! Follow edges and the followed-authors feed.

use actix_web::{HttpResponse, web};

use yatube_core::pagination::PageRequest;
use yatube_shared::dto::ListingQuery;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::presenter;
use crate::state::AppState;

use super::{profile_url, redirect};

/// GET /follow
pub async fn follow_index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListingQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feed
        .list_followed(identity.user_id, PageRequest::from_query(query.page.as_deref()))
        .await?;

    Ok(HttpResponse::Ok().json(presenter::follow_feed(&page)))
}

/// GET /profile/{username}/follow
pub async fn follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state.posting.follow(identity.user_id, &path).await?;
    Ok(redirect(&profile_url(&author.username)))
}

/// GET /profile/{username}/unfollow
pub async fn unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author = state.posting.unfollow(identity.user_id, &path).await?;
    Ok(redirect(&profile_url(&author.username)))
}
