use serde::Serialize;
use time::Date;

use super::dto::Settings;
use super::repo::{SettingsRow, WeightEntry};

pub const DEFAULT_WATER_GOAL_ML: i32 = 3000;
/// One glass; the goal moves in glasses and never drops below one.
pub const GLASS_ML: i32 = 250;
pub const MAX_GOALS: usize = 3;
pub const MAX_NAME_LEN: usize = 100;
pub const LANGUAGES: [&str; 3] = ["cs", "en", "sk"];
pub const DEFAULT_LANGUAGE: &str = "cs";

/// One point per calendar day; `weight` is null on days nothing was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: Date,
    pub weight: Option<f64>,
}

/// Daily series from the first recorded day through `today`.
/// `entries` must be ascending by date, as the repository returns them.
pub fn daily_series(entries: &[WeightEntry], today: Date) -> Vec<SeriesPoint> {
    let Some(first) = entries.first() else {
        return Vec::new();
    };
    let last = entries.last().map_or(today, |e| e.date.max(today));

    let mut out = Vec::new();
    let mut it = entries.iter().peekable();
    let mut day = first.date;
    loop {
        let mut weight = None;
        while let Some(e) = it.next_if(|e| e.date <= day) {
            if e.date == day {
                weight = Some(e.weight);
            }
        }
        out.push(SeriesPoint { date: day, weight });
        match day.next_day() {
            Some(next) if next <= last => day = next,
            _ => break,
        }
    }
    out
}

/// Today's entry replaces an existing one for the same date; order stays ascending.
pub fn upsert_entry(entries: &mut Vec<WeightEntry>, entry: WeightEntry) {
    match entries.binary_search_by(|e| e.date.cmp(&entry.date)) {
        Ok(i) => entries[i] = entry,
        Err(i) => entries.insert(i, entry),
    }
}

pub fn validate_weight(kg: f64) -> Result<f64, &'static str> {
    if kg.is_finite() && kg > 0.0 {
        Ok(kg)
    } else {
        Err("weight must be a positive number")
    }
}

/// Trimmed, non-empty, distinct, 1..=3.
pub fn normalize_goals(goals: &[String]) -> Result<Vec<String>, &'static str> {
    let mut out: Vec<String> = Vec::with_capacity(goals.len());
    for g in goals {
        let g = g.trim();
        if g.is_empty() {
            return Err("goals must not be empty");
        }
        if out.iter().any(|o| o == g) {
            return Err("goals must be distinct");
        }
        out.push(g.to_string());
    }
    if out.is_empty() || out.len() > MAX_GOALS {
        return Err("pick between one and three goals");
    }
    Ok(out)
}

pub fn validate_water_goal(ml: i32) -> Result<i32, &'static str> {
    if ml >= GLASS_ML {
        Ok(ml)
    } else {
        Err("water goal must be at least one glass (250 ml)")
    }
}

pub fn normalize_name(name: &str) -> Result<String, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("name is required");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err("name is too long");
    }
    Ok(name.to_string())
}

pub fn validate_language(language: &str) -> Result<&str, &'static str> {
    LANGUAGES
        .into_iter()
        .find(|l| *l == language)
        .ok_or("language must be one of cs, en, sk")
}

/// Stored settings with defaults for anything never saved.
pub fn resolve_settings(row: Option<SettingsRow>) -> Settings {
    let row = row.unwrap_or_default();
    Settings {
        water_goal: row.water_goal.unwrap_or(DEFAULT_WATER_GOAL_ML),
        notifications: row.notifications.unwrap_or(true),
        dark_mode: row.dark_mode.unwrap_or(false),
        language: row.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
    }
}
