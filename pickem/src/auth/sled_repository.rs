use super::error::AuthError;
use super::models::{RefreshTokenRecord, User};
use super::repository::{RefreshTokenRepository, UserRepository};
use async_trait::async_trait;
use sled::Db;
use sled::Transactional;
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, abort};
use std::path::Path;

const USERS_TREE: &str = "users";
const USERS_BY_USERNAME_TREE: &str = "users_by_username";
const REFRESH_TOKENS_TREE: &str = "refresh_tokens";
const REFRESH_TOKENS_BY_USER_TREE: &str = "refresh_tokens_by_user";

/// User records keyed by id, with a `username -> id` index tree.
///
/// Every write touching both trees runs in one sled transaction, so the index
/// and the records never disagree, even under concurrent renames and deletes.
#[derive(Clone)]
pub struct SledUserRepository {
    db: Db,
}

impl SledUserRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn users_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(USERS_TREE)?)
    }

    fn users_by_username_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(USERS_BY_USERNAME_TREE)?)
    }
}

type UserTxResult = ConflictableTransactionResult<(), AuthError>;

fn decode_user(data: &[u8]) -> ConflictableTransactionResult<User, AuthError> {
    serde_json::from_slice(data).map_err(|e| ConflictableTransactionError::Abort(e.into()))
}

#[async_trait]
impl UserRepository for SledUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let users_tree = self.users_tree()?;
        let username_tree = self.users_by_username_tree()?;
        let user_json = serde_json::to_vec(&user)?;

        (&users_tree, &username_tree).transaction(|(users, names)| -> UserTxResult {
            if names.get(user.username.as_bytes())?.is_some() {
                return abort(AuthError::UserAlreadyExists);
            }
            names.insert(user.username.as_bytes(), user.id.as_bytes())?;
            users.insert(user.id.as_bytes(), user_json.as_slice())?;
            Ok(())
        })?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let username_tree = self.users_by_username_tree()?;
        let users_tree = self.users_tree()?;

        if let Some(user_id) = username_tree.get(username.as_bytes())? {
            if let Some(user_data) = users_tree.get(&user_id)? {
                let user: User = serde_json::from_slice(&user_data)?;
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let users_tree = self.users_tree()?;

        if let Some(user_data) = users_tree.get(id.as_bytes())? {
            let user: User = serde_json::from_slice(&user_data)?;
            return Ok(Some(user));
        }

        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<User>, AuthError> {
        let users_tree = self.users_tree()?;
        let mut users = Vec::new();

        for item in users_tree.iter() {
            let (_, user_data) = item?;
            let user: User = serde_json::from_slice(&user_data)?;
            users.push(user);
        }

        Ok(users)
    }

    async fn update(&self, user: User) -> Result<User, AuthError> {
        let users_tree = self.users_tree()?;
        let username_tree = self.users_by_username_tree()?;
        let user_json = serde_json::to_vec(&user)?;

        (&users_tree, &username_tree).transaction(|(users, names)| -> UserTxResult {
            let existing = match users.get(user.id.as_bytes())? {
                Some(data) => decode_user(&data)?,
                None => return abort(AuthError::UserNotFound),
            };

            // Move the index entry from the stored name, not the caller's copy
            if existing.username != user.username {
                if names.get(user.username.as_bytes())?.is_some() {
                    return abort(AuthError::UserAlreadyExists);
                }
                names.insert(user.username.as_bytes(), user.id.as_bytes())?;
                names.remove(existing.username.as_bytes())?;
            }

            users.insert(user.id.as_bytes(), user_json.as_slice())?;
            Ok(())
        })?;

        Ok(user)
    }

    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        let users_tree = self.users_tree()?;
        let username_tree = self.users_by_username_tree()?;

        (&users_tree, &username_tree).transaction(|(users, names)| -> UserTxResult {
            let Some(data) = users.remove(id.as_bytes())? else {
                return abort(AuthError::UserNotFound);
            };
            let user = decode_user(&data)?;
            names.remove(user.username.as_bytes())?;
            Ok(())
        })?;

        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let username_tree = self.users_by_username_tree()?;
        Ok(username_tree.contains_key(username.as_bytes())?)
    }
}

#[derive(Clone)]
pub struct SledRefreshTokenRepository {
    db: Db,
}

impl SledRefreshTokenRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn tokens_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(REFRESH_TOKENS_TREE)?)
    }

    fn tokens_by_user_tree(&self) -> Result<sled::Tree, AuthError> {
        Ok(self.db.open_tree(REFRESH_TOKENS_BY_USER_TREE)?)
    }
}

fn user_index_key(user_id: &str, token: &str) -> String {
    format!("{}/{}", user_id, token)
}

#[async_trait]
impl RefreshTokenRepository for SledRefreshTokenRepository {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), AuthError> {
        let tokens_tree = self.tokens_tree()?;
        let by_user_tree = self.tokens_by_user_tree()?;

        let record_json = serde_json::to_vec(&record)?;
        tokens_tree.insert(record.token.as_bytes(), record_json)?;
        by_user_tree.insert(
            user_index_key(&record.user_id, &record.token).as_bytes(),
            &[] as &[u8],
        )?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let tokens_tree = self.tokens_tree()?;

        match tokens_tree.get(token.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn remove_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let tokens_tree = self.tokens_tree()?;
        let by_user_tree = self.tokens_by_user_tree()?;

        // sled's remove is atomic: of two concurrent removals only one sees the record
        let Some(data) = tokens_tree.remove(token.as_bytes())? else {
            return Ok(None);
        };

        let record: RefreshTokenRecord = serde_json::from_slice(&data)?;
        by_user_tree.remove(user_index_key(&record.user_id, &record.token).as_bytes())?;

        Ok(Some(record))
    }

    async fn remove_by_user(&self, user_id: &str) -> Result<usize, AuthError> {
        let tokens_tree = self.tokens_tree()?;
        let by_user_tree = self.tokens_by_user_tree()?;

        let prefix = format!("{}/", user_id);
        let mut removed = 0;

        for item in by_user_tree.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let token = &key[prefix.len()..];

            if tokens_tree.remove(token)?.is_some() {
                removed += 1;
            }
            by_user_tree.remove(&key)?;
        }

        Ok(removed)
    }
}
