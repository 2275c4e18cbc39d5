use super::error::AuthError;
use super::models::{NewUser, User, UserProfile, UserUpdate};
use super::password::hash_password;
use super::repository::UserRepository;
use super::token::TokenService;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Register a new account. The password is hashed before it reaches the store.
    pub async fn create_user(&self, new_user: NewUser) -> Result<UserProfile, AuthError> {
        if self.user_repo.username_exists(&new_user.username).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(&new_user.password)?;

        let user = User::new(
            new_user.username,
            new_user.first_name,
            new_user.last_name,
            password_hash,
        );

        let user = self.user_repo.create(user).await?;
        info!("CREATE_USER: username={}", user.username);

        Ok(user.profile())
    }

    /// Get a user's profile by username
    pub async fn get_user(&self, username: &str) -> Result<UserProfile, AuthError> {
        self.user_repo
            .find_by_username(username)
            .await?
            .map(|user| user.profile())
            .ok_or(AuthError::UserNotFound)
    }

    /// List the profiles of all users
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, AuthError> {
        let users = self.user_repo.list_all().await?;
        Ok(users.iter().map(User::profile).collect())
    }

    /// Update the acting user's own profile.
    ///
    /// The record must match the acting user's id as well as their username;
    /// a token minted for a deleted or renamed account cannot reach a newer
    /// account that took over the name.
    pub async fn update_user(
        &self,
        acting: &UserProfile,
        username: &str,
        update: UserUpdate,
    ) -> Result<UserProfile, AuthError> {
        let mut user = self.find_own_record(acting, username).await?;

        user.apply(update);

        let user = self.user_repo.update(user).await?;
        info!(
            "UPDATE_USER: username={}, requested_by={}",
            user.username, acting.username
        );

        Ok(user.profile())
    }

    /// Delete the acting user's own account together with its refresh tokens
    pub async fn delete_user(&self, acting: &UserProfile, username: &str) -> Result<(), AuthError> {
        let user = self.find_own_record(acting, username).await?;

        self.user_repo.delete(&user.id).await?;
        info!("DELETE_USER: username={}", username);

        // The account is gone either way; leftover tokens can no longer be redeemed
        match self.token_service.revoke_user_tokens(&user.id).await {
            Ok(count) => info!("Revoked {} refresh token(s) for {}", count, username),
            Err(e) => error!("Failed to revoke refresh tokens for {}: {}", username, e),
        }

        Ok(())
    }

    async fn find_own_record(
        &self,
        acting: &UserProfile,
        username: &str,
    ) -> Result<User, AuthError> {
        if acting.username != username {
            return Err(AuthError::PermissionDenied);
        }

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.id != acting.id {
            warn!(
                "Token for user id {} presented for {} (id {})",
                acting.id, username, user.id
            );
            return Err(AuthError::PermissionDenied);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::auth::repository::RefreshTokenRepository;
    use crate::auth::sled_repository::{SledRefreshTokenRepository, SledUserRepository};
    use chrono::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        user_repo: Arc<dyn UserRepository>,
        token_service: Arc<TokenService>,
        users: UserService,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let user_repo =
            Arc::new(SledUserRepository::new(temp_dir.path().join("users.sled")).unwrap())
                as Arc<dyn UserRepository>;
        let token_repo = Arc::new(
            SledRefreshTokenRepository::new(temp_dir.path().join("tokens.sled")).unwrap(),
        ) as Arc<dyn RefreshTokenRepository>;
        let token_service = Arc::new(TokenService::new(
            Some("secret"),
            Duration::hours(72),
            user_repo.clone(),
            token_repo,
        ));

        Fixture {
            _temp_dir: temp_dir,
            users: UserService::new(user_repo.clone(), token_service.clone()),
            user_repo,
            token_service,
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            password: "longpw12".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user() {
        let fixture = fixture();

        let profile = fixture.users.create_user(new_user("alice")).await.unwrap();
        assert_eq!(profile.username, "alice");

        let stored = fixture
            .user_repo
            .find_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "longpw12");
        assert!(verify_password("longpw12", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_keeps_original() {
        let fixture = fixture();
        let original = fixture.users.create_user(new_user("alice")).await.unwrap();

        let mut duplicate = new_user("alice");
        duplicate.first_name = "Impostor".to_string();
        let result = fixture.users.create_user(duplicate).await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));

        let users = fixture.users.list_users().await.unwrap();
        assert_eq!(users, vec![original]);
    }

    #[tokio::test]
    async fn test_create_with_short_password_persists_nothing() {
        let fixture = fixture();

        let mut user = new_user("alice");
        user.password = "short".to_string();
        assert!(matches!(
            fixture.users.create_user(user).await,
            Err(AuthError::Validation(_))
        ));
        assert!(fixture.users.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_own_profile() {
        let fixture = fixture();
        let alice = fixture.users.create_user(new_user("alice")).await.unwrap();

        let updated = fixture
            .users
            .update_user(
                &alice,
                "alice",
                UserUpdate {
                    first_name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.last_name, "Liddell");
        assert_eq!(fixture.users.get_user("alice").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_cannot_modify_other_users() {
        let fixture = fixture();
        fixture.users.create_user(new_user("alice")).await.unwrap();
        let bob = fixture.users.create_user(new_user("bob")).await.unwrap();

        let update = UserUpdate {
            last_name: Some("Hacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fixture.users.update_user(&bob, "alice", update).await,
            Err(AuthError::PermissionDenied)
        ));
        assert!(matches!(
            fixture.users.delete_user(&bob, "alice").await,
            Err(AuthError::PermissionDenied)
        ));

        let alice = fixture.users.get_user("alice").await.unwrap();
        assert_eq!(alice.last_name, "Liddell");
    }

    #[tokio::test]
    async fn test_rename_onto_taken_username() {
        let fixture = fixture();
        let alice = fixture.users.create_user(new_user("alice")).await.unwrap();
        fixture.users.create_user(new_user("bob")).await.unwrap();

        let update = UserUpdate {
            username: Some("bob".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fixture.users.update_user(&alice, "alice", update).await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_delete_self_revokes_refresh_tokens() {
        let fixture = fixture();
        let alice = fixture.users.create_user(new_user("alice")).await.unwrap();

        fixture
            .token_service
            .persist_refresh_token(&alice.id, "alice-token")
            .await
            .unwrap();

        fixture.users.delete_user(&alice, "alice").await.unwrap();

        assert!(matches!(
            fixture.users.get_user("alice").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            fixture.token_service.redeem_refresh_token("alice-token").await,
            Err(AuthError::RefreshTokenNotFound)
        ));
        assert!(matches!(
            fixture.users.delete_user(&alice, "alice").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_profile_of_replaced_account_cannot_mutate_new_owner() {
        let fixture = fixture();
        let old_alice = fixture.users.create_user(new_user("alice")).await.unwrap();
        fixture.users.delete_user(&old_alice, "alice").await.unwrap();

        let mut replacement = new_user("alice");
        replacement.first_name = "Second".to_string();
        let new_alice = fixture.users.create_user(replacement).await.unwrap();
        assert_ne!(new_alice.id, old_alice.id);

        let update = UserUpdate {
            first_name: Some("Taken".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fixture.users.update_user(&old_alice, "alice", update).await,
            Err(AuthError::PermissionDenied)
        ));
        assert!(matches!(
            fixture.users.delete_user(&old_alice, "alice").await,
            Err(AuthError::PermissionDenied)
        ));

        assert_eq!(fixture.users.get_user("alice").await.unwrap(), new_alice);
    }
}
