//! Post create and edit forms.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use yatube_core::DomainError;
use yatube_core::forms::PostDraft;
use yatube_core::services::Ownership;
use yatube_shared::dto::PostFormData;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::presenter;
use crate::state::AppState;

use super::{parse_post_id, post_url, profile_url, redirect};

fn draft(form: &PostFormData) -> PostDraft {
    PostDraft {
        text: form.text.clone(),
        group: form.group.clone(),
        image: form.image.clone(),
    }
}

/// Render the form again with the submitted values and their errors.
async fn rejected(
    state: &AppState,
    post_id: Option<Uuid>,
    form: PostFormData,
    err: DomainError,
) -> AppResult<HttpResponse> {
    match err {
        DomainError::InvalidForm(errors) => {
            let groups = state.posting.selectable_groups().await?;
            Ok(HttpResponse::Ok().json(presenter::rejected_post_form(
                post_id, form, errors, &groups,
            )))
        }
        other => Err(other.into()),
    }
}

/// GET /create
pub async fn create_form(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let groups = state.posting.selectable_groups().await?;
    Ok(HttpResponse::Ok().json(presenter::new_post_form(&groups)))
}

/// POST /create
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    match state.posting.create_post(identity.user_id, &draft(&form)).await {
        Ok(_) => Ok(redirect(&profile_url(&identity.username))),
        Err(e) => rejected(&state, None, form, e).await,
    }
}

/// GET /posts/{post_id}/edit
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;

    match state.posting.edit_form(post_id, identity.user_id).await? {
        Ownership::Owner(post) => {
            let groups = state.posting.selectable_groups().await?;
            Ok(HttpResponse::Ok().json(presenter::edit_post_form(&post, &groups)))
        }
        Ownership::NotOwner { author } => Ok(redirect(&profile_url(&author.username))),
    }
}

/// POST /posts/{post_id}/edit
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let form = form.into_inner();

    match state
        .posting
        .update_post(post_id, identity.user_id, &draft(&form))
        .await
    {
        Ok(Ownership::Owner(post)) => Ok(redirect(&post_url(post.id))),
        Ok(Ownership::NotOwner { author }) => Ok(redirect(&profile_url(&author.username))),
        Err(e) => rejected(&state, Some(post_id), form, e).await,
    }
}
