use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Answers to the profile steps, editable later from the profile.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireAnswers {
    pub gender: String,
    pub height: f64, // cm
    pub weight: f64, // kg
    pub goal: String,
    pub experience: String,
    pub supplement_count: String,
    #[serde(default)]
    pub selection_preferences: Vec<String>,
    #[serde(default)]
    pub fitness_goals: Vec<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

/// Everything collected by the onboarding questionnaire, account details included.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireSubmission {
    #[serde(flatten)]
    pub answers: QuestionnaireAnswers,
    #[serde(default)]
    pub current_supplements: Vec<i64>,
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Stored answers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct QuestionnaireResponse {
    pub id: i64,
    pub user_id: Uuid,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub goal: String,
    pub experience: String,
    pub supplement_count: String,
    pub selection_preferences: Vec<String>,
    pub fitness_goals: Vec<String>,
    pub dietary_preferences: Vec<String>,
    pub current_supplements: Vec<i64>,
    pub created_at: OffsetDateTime,
}
