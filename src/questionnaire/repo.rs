use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::dto::{QuestionnaireAnswers, QuestionnaireResponse, QuestionnaireSubmission};
use crate::auth::repo_types::User;
use crate::{plan, profile};

const RESPONSE_COLUMNS: &str = r#"
    id, user_id, gender, height, weight, goal, experience, supplement_count,
    selection_preferences, fitness_goals, dietary_preferences,
    current_supplements, created_at
"#;

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    a: &QuestionnaireAnswers,
    current_supplements: &[i64],
) -> anyhow::Result<QuestionnaireResponse> {
    let row = sqlx::query_as::<_, QuestionnaireResponse>(&format!(
        r#"
        INSERT INTO user_questionnaire_responses
            (user_id, gender, height, weight, goal, experience, supplement_count,
             selection_preferences, fitness_goals, dietary_preferences, current_supplements)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {RESPONSE_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&a.gender)
    .bind(a.height)
    .bind(a.weight)
    .bind(a.goal.trim())
    .bind(a.experience.trim())
    .bind(a.supplement_count.trim())
    .bind(&a.selection_preferences)
    .bind(&a.fitness_goals)
    .bind(&a.dietary_preferences)
    .bind(current_supplements)
    .fetch_one(&mut **tx)
    .await
    .context("insert questionnaire response")?;
    Ok(row)
}

pub async fn latest_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Option<QuestionnaireResponse>> {
    let row = sqlx::query_as::<_, QuestionnaireResponse>(&format!(
        r#"
        SELECT {RESPONSE_COLUMNS}
          FROM user_questionnaire_responses
         WHERE user_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT 1
        "#
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("latest questionnaire response")?;
    Ok(row)
}

/// Overwrites the latest stored answers, or stores them when there are none yet.
/// The supplements picked at signup are left as they were.
pub async fn save_answers(
    db: &PgPool,
    user_id: Uuid,
    a: &QuestionnaireAnswers,
) -> anyhow::Result<QuestionnaireResponse> {
    let mut tx = db.begin().await?;
    let updated = sqlx::query_as::<_, QuestionnaireResponse>(&format!(
        r#"
        UPDATE user_questionnaire_responses
           SET gender = $2, height = $3, weight = $4, goal = $5, experience = $6,
               supplement_count = $7, selection_preferences = $8, fitness_goals = $9,
               dietary_preferences = $10
         WHERE id = (SELECT id FROM user_questionnaire_responses
                      WHERE user_id = $1
                      ORDER BY created_at DESC, id DESC
                      LIMIT 1)
        RETURNING {RESPONSE_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&a.gender)
    .bind(a.height)
    .bind(a.weight)
    .bind(a.goal.trim())
    .bind(a.experience.trim())
    .bind(a.supplement_count.trim())
    .bind(&a.selection_preferences)
    .bind(&a.fitness_goals)
    .bind(&a.dietary_preferences)
    .fetch_optional(&mut *tx)
    .await
    .context("update questionnaire response")?;

    let row = match updated {
        Some(row) => row,
        None => insert_tx(&mut tx, user_id, a, &[]).await?,
    };
    tx.commit().await?;
    Ok(row)
}

/// Account, answers, plan and first weight entry. All or nothing.
pub async fn register(
    db: &PgPool,
    s: &QuestionnaireSubmission,
    password_hash: &str,
    current_supplements: &[i64],
    today: Date,
) -> anyhow::Result<User> {
    let mut tx = db.begin().await?;

    let user = User::create_tx(&mut tx, &s.email, password_hash, s.name.trim()).await?;
    insert_tx(&mut tx, user.id, &s.answers, current_supplements).await?;
    for supplement_id in current_supplements {
        plan::repo::add_tx(&mut tx, user.id, *supplement_id).await?;
    }
    profile::repo::record_weight_tx(&mut tx, user.id, today, s.answers.weight).await?;

    tx.commit().await?;
    Ok(user)
}
