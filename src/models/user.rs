use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::AppError;
use crate::validation::Page;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 2, max = 250, message = "Name must be 2-250 characters"))]
    pub name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(min = 6, max = 254, message = "Email must be 6-254 characters")
    )]
    pub email: String,
}

impl User {
    /// An empty `ids` slice lists every user.
    pub async fn list(pool: &PgPool, ids: &[i64], page: Page) -> Result<Vec<User>, AppError> {
        let ids = (!ids.is_empty()).then(|| ids.to_vec());
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE ($1::int8[] IS NULL OR id = ANY($1)) ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(ids)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }
}
