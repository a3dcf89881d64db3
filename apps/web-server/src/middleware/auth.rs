//! Authentication extractors.
//!
//! Pages that need a signed-in user take an [`Identity`]. Anonymous or
//! badly authenticated callers are sent to the login page with the
//! original target in `next`.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use yatube_core::ports::{AuthError, TokenClaims, TokenService};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Authenticated user identity extractor.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_staff(&self) -> bool {
        self.has_role("staff")
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

/// `/auth/login?next=<target>` with the target percent-encoded.
pub fn login_redirect_location(next: &str) -> String {
    format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next))
}

/// Authentication failure, remembering where the caller was headed.
#[derive(Debug)]
pub struct AuthenticationError {
    pub reason: AuthError,
    pub next: String,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.reason {
            AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        use yatube_shared::ErrorResponse;

        match &self.reason {
            AuthError::HashingError(_) => {
                HttpResponse::InternalServerError().json(ErrorResponse::internal_error())
            }
            reason => {
                tracing::debug!(%reason, next = %self.next, "Redirecting to login");
                HttpResponse::Found()
                    .insert_header((header::LOCATION, login_redirect_location(&self.next)))
                    .finish()
            }
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let token_service = match req.app_data::<web::Data<Arc<dyn TokenService>>>() {
        Some(service) => service,
        None => {
            tracing::error!("TokenService not found in app data");
            return Err(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            ));
        }
    };

    let auth_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    token_service.validate_token(token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|reason| {
            let next = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string());
            AuthenticationError { reason, next }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_parameter_is_percent_encoded() {
        assert_eq!(
            login_redirect_location("/create"),
            "/auth/login?next=%2Fcreate"
        );
        assert_eq!(
            login_redirect_location("/follow?page=2"),
            "/auth/login?next=%2Ffollow%3Fpage%3D2"
        );
    }

    #[test]
    fn staff_role_is_detected() {
        let identity = Identity {
            user_id: uuid::Uuid::now_v7(),
            username: "admin".into(),
            roles: vec!["user".into(), "staff".into()],
        };
        assert!(identity.is_staff());
        assert!(!identity.has_role("superuser"));
    }
}
