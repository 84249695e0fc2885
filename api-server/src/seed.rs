//! Bootstrap admin account

use anyhow::Context;
use rental_core::market::UserRepository;
use rental_core::user::{normalize_email, NewUser, User, UserRole, UserUpdate};
use tracing::info;

use crate::auth::{hash_password, validate_password};
use crate::config::AdminSeed;
use crate::state::AppState;

/// Make sure the configured admin exists, promoting an existing account
/// with the same email instead of creating a duplicate
pub async fn ensure_admin(state: &AppState, seed: &AdminSeed) -> anyhow::Result<User> {
    let email = normalize_email(&seed.email).context("invalid RENTAL_ADMIN_EMAIL")?;
    let store = state.store();

    if let Some(existing) = store.find_user_by_email(&email).await? {
        if existing.is_admin() {
            return Ok(existing);
        }
        let promoted = store
            .update_user(
                existing.id,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await?;
        info!(
            user_id = %promoted.id,
            username = %promoted.username,
            "promoted existing account to admin"
        );
        return Ok(promoted);
    }

    validate_password(&seed.password).context("invalid RENTAL_ADMIN_PASSWORD")?;
    let password_hash = hash_password(&seed.password)?;
    let admin = store
        .create_user(
            NewUser::new(&seed.username, email, password_hash).with_role(UserRole::Admin),
        )
        .await
        .context("failed to create admin account")?;
    info!(user_id = %admin.id, username = %admin.username, "admin account created");
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::routes::testing::{build_state, token_for, PASSWORD};

    fn seed() -> AdminSeed {
        AdminSeed {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: "rootpassword".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_admin_once() {
        let (state, _tmp) = build_state().await;
        let first = ensure_admin(&state, &seed()).await.unwrap();
        assert_eq!(first.role, UserRole::Admin);
        assert!(verify_password(&first.password_hash, "rootpassword"));

        let second = ensure_admin(&state, &seed()).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(state.store().list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn promotes_matching_account() {
        let (state, _tmp) = build_state().await;
        token_for(&state, "root", UserRole::User).await;

        let admin = ensure_admin(&state, &seed()).await.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.role, UserRole::Admin);
        assert!(verify_password(&admin.password_hash, PASSWORD));
    }

    #[tokio::test]
    async fn rejects_weak_password() {
        let (state, _tmp) = build_state().await;
        let weak = AdminSeed {
            password: "short".to_string(),
            ..seed()
        };
        assert!(ensure_admin(&state, &weak).await.is_err());
    }
}
