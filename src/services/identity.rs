use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::user_repo;

/// A fully resolved account, as loaded from storage.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A new account, ready to persist. The password is already hashed by the
/// time this struct exists.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Lookup capability consumed by the authentication gate and the sign-in and
/// sign-up handlers. Implementations own their own consistency guarantees;
/// the gate only awaits `find_by_username` and never holds state across the
/// call.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError>;
    async fn username_taken(&self, username: &str) -> Result<bool, AppError>;
    async fn email_taken(&self, email: &str) -> Result<bool, AppError>;
    async fn insert(&self, new: NewIdentity) -> Result<Identity, AppError>;
}

#[derive(Clone)]
pub struct PgIdentityStore {
    db: PgPool,
}

impl PgIdentityStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn identity_from_row(row: user_repo::UserRow) -> Identity {
    Identity {
        id: row.id,
        firstname: row.firstname,
        lastname: row.lastname,
        username: row.username,
        email: row.email,
        password_hash: row.password_hash,
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let row = user_repo::find_by_username(&self.db, username).await?;
        Ok(row.map(identity_from_row))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, AppError> {
        Ok(user_repo::exists_by_username(&self.db, username).await?)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        Ok(user_repo::exists_by_email(&self.db, email).await?)
    }

    async fn insert(&self, new: NewIdentity) -> Result<Identity, AppError> {
        let row = user_repo::insert(
            &self.db,
            &new.firstname,
            &new.lastname,
            &new.username,
            &new.email,
            &new.password_hash,
        )
        .await?;
        Ok(identity_from_row(row))
    }
}
