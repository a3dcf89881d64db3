//! Page cache administration.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /cache/clear - staff only.
pub async fn clear(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    if !identity.is_staff() {
        tracing::warn!(user_id = %identity.user_id, "Cache clear refused to non-staff user");
        return Err(AppError::Forbidden);
    }

    state
        .page_cache
        .clear()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %identity.user_id, "Page cache cleared on request");
    Ok(HttpResponse::NoContent().finish())
}
