//! Comment submission.

use actix_web::{HttpResponse, web};

use yatube_core::DomainError;
use yatube_core::forms::CommentDraft;
use yatube_shared::dto::CommentFormData;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::presenter;
use crate::state::AppState;

use super::{parse_post_id, post_url, redirect};

/// POST /posts/{post_id}/comment
///
/// A blank comment stores nothing; the detail page comes back with the
/// comment form errors instead of the redirect.
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<CommentFormData>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let draft = CommentDraft {
        text: form.into_inner().text,
    };

    match state.posting.add_comment(post_id, identity.user_id, &draft).await {
        Ok(_) => Ok(redirect(&post_url(post_id))),
        Err(DomainError::InvalidForm(errors)) => {
            let detail = state.feed.post_detail(post_id).await?;
            let view = presenter::post_detail(
                &detail,
                Some(identity.user_id),
                presenter::comment_form(draft.text, errors),
            );
            Ok(HttpResponse::Ok().json(view))
        }
        Err(e) => Err(e.into()),
    }
}
