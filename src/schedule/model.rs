use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::Date;

/// Fixed time of day a supplement is taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeSlot {
    Morning,
    PreWorkout,
    PostWorkout,
    PreSleep,
}

impl TimeSlot {
    /// Display order of the slots on a day board.
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::Morning,
        TimeSlot::PreWorkout,
        TimeSlot::PostWorkout,
        TimeSlot::PreSleep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::PreWorkout => "pre-workout",
            TimeSlot::PostWorkout => "post-workout",
            TimeSlot::PreSleep => "pre-sleep",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown time slot: {0}")]
pub struct UnknownSlot(pub String);

impl FromStr for TimeSlot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| UnknownSlot(s.to_string()))
    }
}

/// A catalog item assigned to one slot of a user's day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledSupplement {
    pub id: i64,
    pub supplement_id: i64,
    pub time_slot: TimeSlot,
    pub dosage: String,
    pub name: String,
    pub brand: String,
    pub image: Option<String>,
}

/// Taken flag for one (supplement, slot) pair on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeRecord {
    pub supplement_id: i64,
    pub time_slot: TimeSlot,
    pub date: Date,
    pub taken: bool,
}

// Raw rows; time_slot is stored as TEXT.

#[derive(Debug, FromRow)]
pub struct ScheduleRow {
    pub id: i64,
    pub supplement_id: i64,
    pub time_slot: String,
    pub dosage: String,
    pub name: String,
    pub brand: String,
    pub image: Option<String>,
}

impl TryFrom<ScheduleRow> for ScheduledSupplement {
    type Error = UnknownSlot;

    fn try_from(r: ScheduleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            supplement_id: r.supplement_id,
            time_slot: r.time_slot.parse()?,
            dosage: r.dosage,
            name: r.name,
            brand: r.brand,
            image: r.image,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct IntakeRow {
    pub supplement_id: i64,
    pub time_slot: String,
    pub date: Date,
    pub taken: bool,
}

impl TryFrom<IntakeRow> for IntakeRecord {
    type Error = UnknownSlot;

    fn try_from(r: IntakeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            supplement_id: r.supplement_id,
            time_slot: r.time_slot.parse()?,
            date: r.date,
            taken: r.taken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_parses_its_own_name() {
        for slot in TimeSlot::ALL {
            assert_eq!(slot.as_str().parse::<TimeSlot>(), Ok(slot));
        }
        assert_eq!(
            "noon".parse::<TimeSlot>(),
            Err(UnknownSlot("noon".to_string()))
        );
    }

    #[test]
    fn slot_serializes_kebab_case() {
        let json = serde_json::to_string(&TimeSlot::PostWorkout).unwrap();
        assert_eq!(json, "\"post-workout\"");
        let back: TimeSlot = serde_json::from_str("\"pre-sleep\"").unwrap();
        assert_eq!(back, TimeSlot::PreSleep);
    }

    #[test]
    fn row_with_bad_slot_is_rejected() {
        let row = ScheduleRow {
            id: 1,
            supplement_id: 2,
            time_slot: "lunch".into(),
            dosage: "1".into(),
            name: "Creatine".into(),
            brand: "Acme".into(),
            image: None,
        };
        assert!(ScheduledSupplement::try_from(row).is_err());
    }
}
