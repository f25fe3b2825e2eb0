use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Catalog row. Read-only for users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Supplement {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub category: String,
    pub description: String,
    pub ingredients: String,  // comma-separated
    pub package_size: String, // e.g. "1000 g", "120 caps"
    pub dosage: String,       // recommended, e.g. "30 g"
    pub rating: f64,
    pub image: Option<String>,
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Supplement>> {
    let rows = sqlx::query_as::<_, Supplement>(
        r#"
        SELECT id, name, brand, price, category, description, ingredients,
               package_size, dosage, rating, image
          FROM supplements
         ORDER BY id ASC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list supplements")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: i64) -> anyhow::Result<Option<Supplement>> {
    let row = sqlx::query_as::<_, Supplement>(
        r#"
        SELECT id, name, brand, price, category, description, ingredients,
               package_size, dosage, rating, image
          FROM supplements
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find supplement")?;
    Ok(row)
}
