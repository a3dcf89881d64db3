//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request to change the signed-in user's password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub created_at: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Post create/edit form body (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    /// Group id; empty means no group.
    #[serde(default)]
    pub group: Option<String>,
    /// Uploaded image file name.
    #[serde(default)]
    pub image: Option<String>,
}

/// Comment form body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFormData {
    #[serde(default)]
    pub text: String,
}

/// Query string accepted by every listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Raw page number; anything non-numeric means page 1.
    pub page: Option<String>,
    /// Search term, home listing only.
    pub q: Option<String>,
}

/// Query string of the login route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}
