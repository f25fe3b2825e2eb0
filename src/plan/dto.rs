use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddToPlanRequest {
    pub supplement_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub products: usize,
    pub monthly_expense: f64,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DoseCountdown {
    pub supplement_id: i64,
    pub dosage: String,
    pub total: u64,
    pub remaining: u64,
    pub daily_cost: Option<f64>,
}
