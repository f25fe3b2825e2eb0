use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::catalog::repo::Supplement;

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Supplement>> {
    let rows = sqlx::query_as::<_, Supplement>(
        r#"
        SELECT c.id, c.name, c.brand, c.price, c.category, c.description, c.ingredients,
               c.package_size, c.dosage, c.rating, c.image
          FROM user_supplements p
          JOIN supplements c ON c.id = p.supplement_id
         WHERE p.user_id = $1
         ORDER BY p.created_at ASC, c.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list plan")?;
    Ok(rows)
}

pub async fn find_in_plan(
    db: &PgPool,
    user_id: Uuid,
    supplement_id: i64,
) -> anyhow::Result<Option<Supplement>> {
    let row = sqlx::query_as::<_, Supplement>(
        r#"
        SELECT c.id, c.name, c.brand, c.price, c.category, c.description, c.ingredients,
               c.package_size, c.dosage, c.rating, c.image
          FROM user_supplements p
          JOIN supplements c ON c.id = p.supplement_id
         WHERE p.user_id = $1 AND p.supplement_id = $2
        "#,
    )
    .bind(user_id)
    .bind(supplement_id)
    .fetch_optional(db)
    .await
    .context("find plan supplement")?;
    Ok(row)
}

/// Returns false when the supplement was already in the plan.
pub async fn add(db: &PgPool, user_id: Uuid, supplement_id: i64) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT INTO user_supplements (user_id, supplement_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, supplement_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(supplement_id)
    .execute(db)
    .await
    .context("add to plan")?;
    Ok(res.rows_affected() == 1)
}

/// Same as [`add`] inside a caller's transaction.
pub async fn add_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    supplement_id: i64,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT INTO user_supplements (user_id, supplement_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, supplement_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(supplement_id)
    .execute(&mut **tx)
    .await
    .context("add to plan")?;
    Ok(res.rows_affected() == 1)
}

pub async fn remove(db: &PgPool, user_id: Uuid, supplement_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM user_supplements WHERE user_id = $1 AND supplement_id = $2")
        .bind(user_id)
        .bind(supplement_id)
        .execute(db)
        .await
        .context("remove from plan")?;
    Ok(res.rows_affected())
}

/// Dosage of the first schedule entry for the supplement, if scheduled.
pub async fn scheduled_dosage(
    db: &PgPool,
    user_id: Uuid,
    supplement_id: i64,
) -> anyhow::Result<Option<String>> {
    let dosage = sqlx::query_scalar::<_, String>(
        r#"
        SELECT dosage FROM user_schedule
         WHERE user_id = $1 AND supplement_id = $2
         ORDER BY id ASC
         LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(supplement_id)
    .fetch_optional(db)
    .await
    .context("load scheduled dosage")?;
    Ok(dosage)
}

pub async fn taken_count(db: &PgPool, user_id: Uuid, supplement_id: i64) -> anyhow::Result<i64> {
    let n = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM daily_supplement_intake
         WHERE user_id = $1 AND supplement_id = $2 AND taken
        "#,
    )
    .bind(user_id)
    .bind(supplement_id)
    .fetch_one(db)
    .await
    .context("count taken doses")?;
    Ok(n)
}
