//! Startup seeding of groups and the staff account.

use yatube_core::DomainError;
use yatube_core::domain::{Group, User};

use crate::config::{AdminSeed, GroupSeed};
use crate::state::AppState;

/// Create each group whose slug is still free.
pub async fn seed_groups(state: &AppState, seeds: &[GroupSeed]) -> Result<usize, DomainError> {
    let mut created = 0;
    for seed in seeds {
        if state.repos.groups.find_by_slug(&seed.slug).await?.is_some() {
            continue;
        }
        state
            .repos
            .groups
            .save(Group::new(seed.title.clone(), seed.slug.clone(), String::new()))
            .await?;
        created += 1;
    }

    if created > 0 {
        tracing::info!(created, "Seeded groups");
    }
    Ok(created)
}

/// Create the staff account unless the username is taken.
pub async fn seed_admin(state: &AppState, seed: &AdminSeed) -> Result<bool, DomainError> {
    if state.repos.users.find_by_username(&seed.username).await?.is_some() {
        return Ok(false);
    }

    let password_hash = state
        .passwords
        .hash(&seed.password)
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    let admin = User::new(seed.username.clone(), seed.email.clone(), password_hash).staff();
    state.repos.users.save(admin).await?;

    tracing::info!(username = %seed.username, "Seeded staff account");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use yatube_infra::{JwtConfig, JwtTokenService};

    use super::*;

    fn state() -> AppState {
        AppState::in_memory(
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Duration::from_secs(20),
        )
    }

    #[tokio::test]
    async fn seeding_groups_twice_creates_them_once() {
        let state = state();
        let seeds = vec![GroupSeed {
            slug: "cats".into(),
            title: "Cats".into(),
        }];

        assert_eq!(seed_groups(&state, &seeds).await.unwrap(), 1);
        assert_eq!(seed_groups(&state, &seeds).await.unwrap(), 0);
        assert_eq!(state.repos.groups.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seeded_admin_is_staff() {
        let state = state();
        let seed = AdminSeed {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "correct-horse".into(),
        };

        assert!(seed_admin(&state, &seed).await.unwrap());
        assert!(!seed_admin(&state, &seed).await.unwrap());

        let admin = state.repos.users.find_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_staff);
    }
}
