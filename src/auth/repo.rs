use crate::auth::repo_types::User;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, goals, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, goals, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> anyhow::Result<User> {
        let mut tx = db.begin().await?;
        let user = Self::create_tx(&mut tx, email, password_hash, name).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Create a user inside a caller's transaction.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, name, goals, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;
        Ok(user)
    }

    pub async fn set_goals(db: &PgPool, id: Uuid, goals: &[String]) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET goals = $2 WHERE id = $1")
            .bind(id)
            .bind(goals)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Returns the updated user, `None` when the id is unknown.
    pub async fn set_name(db: &PgPool, id: Uuid, name: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET name = $2
             WHERE id = $1
            RETURNING id, email, password_hash, name, goals, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
