use serde::{Deserialize, Serialize};
use time::Date;

use super::board::{BoardEntry, ScheduleBoard};
use super::model::TimeSlot;

#[derive(Debug, Deserialize)]
pub struct AddEntryRequest {
    pub supplement_id: i64,
    pub time_slot: TimeSlot,
    pub dosage: Option<String>,
}

/// Drop target of a drag-and-drop move.
#[derive(Debug, Deserialize)]
pub struct MoveEntryRequest {
    pub time_slot: TimeSlot,
    pub index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DosageRequest {
    pub dosage: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignSlotsRequest {
    pub slots: Vec<TimeSlot>,
    pub dosage: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub slot: TimeSlot,
    pub entries: Vec<BoardEntry>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub date: Date,
    pub adherence: u8,
    pub total: usize,
    pub taken: usize,
    pub slots: Vec<SlotView>,
}

impl From<&ScheduleBoard> for BoardResponse {
    fn from(board: &ScheduleBoard) -> Self {
        let slots = TimeSlot::ALL
            .into_iter()
            .map(|slot| SlotView {
                slot,
                entries: board.in_slot(slot).cloned().collect(),
            })
            .collect();
        Self {
            date: board.date(),
            adherence: board.adherence(),
            total: board.entries().len(),
            taken: board.entries().iter().filter(|e| e.taken).count(),
            slots,
        }
    }
}
