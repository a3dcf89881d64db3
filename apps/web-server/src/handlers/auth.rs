//! Account handlers: signup, login and the current user.

use actix_web::{HttpResponse, web};

use yatube_core::DomainError;
use yatube_core::domain::User;
use yatube_core::forms::{PasswordChangeDraft, SignupDraft};
use yatube_core::ports::AuthError;
use yatube_shared::dto::{
    AuthResponse, ChangePasswordRequest, LoginQuery, LoginRequest, RegisterUserRequest,
    UserResponse,
};
use yatube_shared::views::LoginPageView;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn token_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.roles())?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    SignupDraft {
        username: req.username.clone(),
        email: req.email.clone(),
        password: req.password.clone(),
    }
    .clean()
    .map_err(DomainError::InvalidForm)?;

    if state.repos.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict(
            "A user with that username already exists.".to_string(),
        ));
    }
    if state.repos.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let user = User::new(req.username, req.email, password_hash)
        .with_name(req.first_name.trim(), req.last_name.trim());
    let saved_user = state.repos.users.save(user).await?;

    tracing::info!(user_id = %saved_user.id, username = %saved_user.username, "User registered");

    Ok(HttpResponse::Created().json(token_response(&state, &saved_user)?))
}

/// GET /auth/login - where anonymous visitors of protected pages land.
pub async fn login_page(query: web::Query<LoginQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginPageView {
        next: query.into_inner().next,
        fields: vec!["username".to_string(), "password".to_string()],
    })
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .repos
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(HttpResponse::Ok().json(token_response(&state, &user)?))
}

/// GET /auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", &identity.username))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        is_staff: user.is_staff,
        created_at: user.created_at.to_rfc3339(),
    }))
}

/// POST /auth/password - 204 once the new password is stored; issued
/// tokens stay valid until they expire.
pub async fn change_password(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = PasswordChangeDraft {
        current_password: req.current_password,
        new_password: req.new_password,
        new_password_confirmation: req.new_password_confirmation,
    };

    let mut user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", &identity.username))?;

    let mut errors = draft.clean().err().unwrap_or_default();
    if !draft.current_password.is_empty()
        && !state
            .passwords
            .verify(&draft.current_password, &user.password_hash)?
    {
        errors.add(
            "current_password",
            "Your old password was entered incorrectly. Please enter it again.",
        );
    }
    errors.into_result(()).map_err(DomainError::InvalidForm)?;

    user.change_password_hash(state.passwords.hash(&draft.new_password)?);
    state.repos.users.save(user).await?;

    tracing::info!(user_id = %identity.user_id, "Password changed");

    Ok(HttpResponse::NoContent().finish())
}
