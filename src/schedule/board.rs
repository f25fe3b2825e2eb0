use serde::Serialize;
use thiserror::Error;
use time::Date;

use super::model::{IntakeRecord, ScheduledSupplement, TimeSlot};

/// Percentage of taken entries, rounded half away from zero. Zero when nothing is scheduled.
pub fn adherence(taken: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((taken as f64 / total as f64) * 100.0).round() as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry {
    #[serde(flatten)]
    pub entry: ScheduledSupplement,
    pub taken: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("schedule entry {0} not found")]
    NotFound(i64),
    #[error("supplement {supplement_id} is already scheduled for {slot}")]
    Duplicate { supplement_id: i64, slot: TimeSlot },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub taken: bool,
    pub adherence: u8,
    /// First time adherence hit 100 on the board's date.
    pub congratulate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moved {
    pub from: TimeSlot,
    pub to: TimeSlot,
}

impl Moved {
    pub fn changed_slot(&self) -> bool {
        self.from != self.to
    }
}

/// One user's schedule for one calendar date.
///
/// The entry order is the display order. Within a slot it only lives as long as the board,
/// since nothing about it is persisted.
#[derive(Debug, Clone)]
pub struct ScheduleBoard {
    date: Date,
    entries: Vec<BoardEntry>,
    congratulated_on: Option<Date>,
}

impl ScheduleBoard {
    pub fn new(
        date: Date,
        entries: Vec<ScheduledSupplement>,
        intake: &[IntakeRecord],
        congratulated_on: Option<Date>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let taken = intake.iter().any(|r| {
                    r.date == date
                        && r.taken
                        && r.supplement_id == entry.supplement_id
                        && r.time_slot == entry.time_slot
                });
                BoardEntry { entry, taken }
            })
            .collect();
        Self {
            date,
            entries,
            congratulated_on,
        }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn entries(&self) -> &[BoardEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&BoardEntry> {
        self.entries.iter().find(|e| e.entry.id == id)
    }

    pub fn in_slot(&self, slot: TimeSlot) -> impl Iterator<Item = &BoardEntry> {
        self.entries.iter().filter(move |e| e.entry.time_slot == slot)
    }

    pub fn contains(&self, supplement_id: i64, slot: TimeSlot) -> bool {
        self.in_slot(slot).any(|e| e.entry.supplement_id == supplement_id)
    }

    pub fn adherence(&self) -> u8 {
        let taken = self.entries.iter().filter(|e| e.taken).count();
        adherence(taken, self.entries.len())
    }

    pub fn insert(&mut self, entry: ScheduledSupplement) -> Result<(), BoardError> {
        if self.contains(entry.supplement_id, entry.time_slot) {
            return Err(BoardError::Duplicate {
                supplement_id: entry.supplement_id,
                slot: entry.time_slot,
            });
        }
        self.entries.push(BoardEntry {
            entry,
            taken: false,
        });
        Ok(())
    }

    pub fn remove(&mut self, id: i64) -> Result<BoardEntry, BoardError> {
        let pos = self.position(id)?;
        Ok(self.entries.remove(pos))
    }

    /// Moves an entry to `index` within the list of `to`, clamped to the list length.
    pub fn move_entry(
        &mut self,
        id: i64,
        to: TimeSlot,
        index: Option<usize>,
    ) -> Result<Moved, BoardError> {
        let pos = self.position(id)?;
        let mut moving = self.entries.remove(pos);
        let from = moving.entry.time_slot;

        if from != to && self.contains(moving.entry.supplement_id, to) {
            let supplement_id = moving.entry.supplement_id;
            self.entries.insert(pos, moving);
            return Err(BoardError::Duplicate {
                supplement_id,
                slot: to,
            });
        }
        moving.entry.time_slot = to;

        let targets: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.entry.time_slot == to)
            .map(|(i, _)| i)
            .collect();
        let at = match index {
            Some(i) if i < targets.len() => targets[i],
            _ => targets.last().map(|last| last + 1).unwrap_or(self.entries.len()),
        };
        self.entries.insert(at, moving);
        Ok(Moved { from, to })
    }

    pub fn set_dosage(&mut self, id: i64, dosage: String) -> Result<String, BoardError> {
        let pos = self.position(id)?;
        Ok(std::mem::replace(&mut self.entries[pos].entry.dosage, dosage))
    }

    /// Flips the taken flag of an entry for the board's date.
    pub fn toggle(&mut self, id: i64) -> Result<Toggle, BoardError> {
        let pos = self.position(id)?;
        let taken = !self.entries[pos].taken;
        self.entries[pos].taken = taken;

        let adherence = self.adherence();
        let congratulate = adherence == 100 && self.congratulated_on != Some(self.date);
        if congratulate {
            self.congratulated_on = Some(self.date);
        }
        Ok(Toggle {
            taken,
            adherence,
            congratulate,
        })
    }

    /// The intake row that mirrors an entry's current taken state.
    pub fn intake_record(&self, id: i64) -> Result<IntakeRecord, BoardError> {
        let e = &self.entries[self.position(id)?];
        Ok(IntakeRecord {
            supplement_id: e.entry.supplement_id,
            time_slot: e.entry.time_slot,
            date: self.date,
            taken: e.taken,
        })
    }

    fn position(&self, id: i64) -> Result<usize, BoardError> {
        self.entries
            .iter()
            .position(|e| e.entry.id == id)
            .ok_or(BoardError::NotFound(id))
    }
}
