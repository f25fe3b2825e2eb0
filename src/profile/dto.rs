use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::WeightEntry;
use super::services::SeriesPoint;
use crate::questionnaire::dto::QuestionnaireResponse;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub goals: Vec<String>,
    pub questionnaire: Option<QuestionnaireResponse>,
}

#[derive(Debug, Serialize)]
pub struct WeightHistory {
    pub entries: Vec<WeightEntry>,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Deserialize)]
pub struct RecordWeightRequest {
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub struct GoalsRequest {
    pub goals: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub water_goal: i32, // ml
    pub notifications: bool,
    pub dark_mode: bool,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct WaterGoalRequest {
    pub water_goal: i32,
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub notifications: Option<bool>,
    pub dark_mode: Option<bool>,
    pub language: Option<String>,
}
