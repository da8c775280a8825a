/*
 * Responsibility
 * - users table queries (lookup by username, uniqueness checks, insert)
 * - takes a PgPool, returns RepoError for the service layer to translate
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, firstname, lastname, username, email, password_hash
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn exists_by_username(db: &PgPool, username: &str) -> Result<bool, RepoError> {
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)"#)
            .bind(username)
            .fetch_one(db)
            .await?;

    Ok(exists)
}

pub async fn exists_by_email(db: &PgPool, email: &str) -> Result<bool, RepoError> {
    let exists: bool = sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)"#)
        .bind(email)
        .fetch_one(db)
        .await?;

    Ok(exists)
}

pub async fn insert(
    db: &PgPool,
    firstname: &str,
    lastname: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, firstname, lastname, username, email, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, firstname, lastname, username, email, password_hash
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(firstname)
    .bind(lastname)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await?;

    Ok(row)
}
