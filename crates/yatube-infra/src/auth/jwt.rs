//! HS256 bearer tokens naming the user and their roles.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use yatube_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "yatube".to_string(),
        }
    }
}

impl JwtConfig {
    /// `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`, each falling
    /// back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        if config.secret == DEFAULT_SECRET {
            let production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);
            if production {
                tracing::error!("JWT_SECRET is unset in production; tokens are forgeable");
            } else {
                tracing::warn!("JWT_SECRET is unset, using the development secret");
            }
        }

        config
    }
}

/// Wire form of [`TokenClaims`].
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    roles: Vec<String>,
    exp: i64,
    iat: i64,
    iss: String,
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            roles,
            exp: (now + TimeDelta::hours(self.config.expiration_hours)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?
            .claims;

        Ok(TokenClaims {
            user_id: claims.sub,
            username: claims.username,
            roles: claims.roles,
            exp: claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yatube_core::domain::User;

    fn service(secret: &str, issuer: &str) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: secret.to_string(),
            expiration_hours: 1,
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn staff_user_round_trips_with_roles() {
        let tokens = service("secret", "yatube");
        let admin = User::new("admin".into(), "admin@example.com".into(), "hash".into()).staff();

        let token = tokens
            .generate_token(admin.id, &admin.username, admin.roles())
            .unwrap();
        let claims = tokens.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, admin.id);
        assert_eq!(claims.username, "admin");
        assert!(claims.roles.iter().any(|r| r == "staff"));
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn foreign_tokens_are_rejected() {
        let ours = service("secret", "yatube");
        let other_secret = service("other", "yatube");
        let other_issuer = service("secret", "elsewhere");

        for token in [
            other_secret.generate_token(Uuid::now_v7(), "leo", vec![]).unwrap(),
            other_issuer.generate_token(Uuid::now_v7(), "leo", vec![]).unwrap(),
        ] {
            assert!(matches!(
                ours.validate_token(&token),
                Err(AuthError::InvalidToken(_))
            ));
        }
        assert!(ours.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = JwtTokenService::new(JwtConfig {
            expiration_hours: -2,
            ..JwtConfig::default()
        });
        let token = tokens
            .generate_token(Uuid::now_v7(), "leo", vec!["user".to_string()])
            .unwrap();

        assert!(matches!(
            tokens.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }
}
