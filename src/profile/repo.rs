use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, FromRow)]
pub struct WeightEntry {
    pub date: Date,
    pub weight: f64, // kg
}

/// Ascending by date.
pub async fn weight_history(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<WeightEntry>> {
    let rows = sqlx::query_as::<_, WeightEntry>(
        "SELECT date, weight FROM user_weight WHERE user_id = $1 ORDER BY date ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("load weight history")?;
    Ok(rows)
}

pub async fn record_weight(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    weight: f64,
) -> anyhow::Result<WeightEntry> {
    let mut tx = db.begin().await?;
    let entry = record_weight_tx(&mut tx, user_id, date, weight).await?;
    tx.commit().await?;
    Ok(entry)
}

/// One entry per day; a second recording replaces the first.
pub async fn record_weight_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    date: Date,
    weight: f64,
) -> anyhow::Result<WeightEntry> {
    let entry = sqlx::query_as::<_, WeightEntry>(
        r#"
        INSERT INTO user_weight (user_id, date, weight)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, date) DO UPDATE SET weight = EXCLUDED.weight
        RETURNING date, weight
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(weight)
    .fetch_one(&mut **tx)
    .await
    .context("record weight")?;
    Ok(entry)
}

/// Raw settings row; unset columns fall back to defaults in the service layer.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct SettingsRow {
    pub water_goal: Option<i32>,
    pub notifications: Option<bool>,
    pub dark_mode: Option<bool>,
    pub language: Option<String>,
}

pub async fn settings(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<SettingsRow>> {
    let row = sqlx::query_as::<_, SettingsRow>(
        r#"
        SELECT water_goal, notifications, dark_mode, language
          FROM user_settings
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load settings")?;
    Ok(row)
}

pub async fn set_water_goal(db: &PgPool, user_id: Uuid, ml: i32) -> anyhow::Result<SettingsRow> {
    let row = sqlx::query_as::<_, SettingsRow>(
        r#"
        INSERT INTO user_settings (user_id, water_goal)
        VALUES ($1, $2)
        ON CONFLICT (user_id)
        DO UPDATE SET water_goal = EXCLUDED.water_goal,
                      updated_at = now()
        RETURNING water_goal, notifications, dark_mode, language
        "#,
    )
    .bind(user_id)
    .bind(ml)
    .fetch_one(db)
    .await
    .context("save water goal")?;
    Ok(row)
}

/// Only the fields that are `Some` change.
pub async fn set_preferences(
    db: &PgPool,
    user_id: Uuid,
    notifications: Option<bool>,
    dark_mode: Option<bool>,
    language: Option<&str>,
) -> anyhow::Result<SettingsRow> {
    let row = sqlx::query_as::<_, SettingsRow>(
        r#"
        INSERT INTO user_settings (user_id, notifications, dark_mode, language)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id)
        DO UPDATE SET notifications = COALESCE(EXCLUDED.notifications, user_settings.notifications),
                      dark_mode = COALESCE(EXCLUDED.dark_mode, user_settings.dark_mode),
                      language = COALESCE(EXCLUDED.language, user_settings.language),
                      updated_at = now()
        RETURNING water_goal, notifications, dark_mode, language
        "#,
    )
    .bind(user_id)
    .bind(notifications)
    .bind(dark_mode)
    .bind(language)
    .fetch_one(db)
    .await
    .context("save preferences")?;
    Ok(row)
}
