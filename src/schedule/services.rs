use serde::Serialize;
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::board::{BoardError, ScheduleBoard};
use super::model::{ScheduledSupplement, TimeSlot};
use super::store::ScheduleStore;
use crate::error::{AppError, AppResult};

pub const DEFAULT_DOSAGE: &str = "1";
pub const FALLBACK_MESSAGE: &str = "Congratulations, you took everything on today's plan!";
const MAX_DOSAGE_LEN: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub entry_id: i64,
    pub taken: bool,
    pub adherence: u8,
    pub congratulate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<BoardError> for AppError {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::NotFound(_) => AppError::NotFound(e.to_string()),
            BoardError::Duplicate { .. } => AppError::Conflict(e.to_string()),
        }
    }
}

fn normalize_dosage(dosage: Option<String>) -> AppResult<String> {
    let dosage = dosage
        .map(|d| d.trim().to_string())
        .unwrap_or_else(|| DEFAULT_DOSAGE.to_string());
    if dosage.is_empty() {
        return Err(AppError::Validation("dosage must not be empty".into()));
    }
    if dosage.chars().count() > MAX_DOSAGE_LEN {
        return Err(AppError::Validation("dosage is too long".into()));
    }
    Ok(dosage)
}

pub async fn load_board(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    date: Date,
) -> AppResult<ScheduleBoard> {
    let entries = store.list_entries(user_id).await?;
    let intake = store.intake_for_day(user_id, date).await?;
    let congratulated_on = store.last_congratulated(user_id).await?;
    Ok(ScheduleBoard::new(date, entries, &intake, congratulated_on))
}

/// Assigns a plan supplement to a slot.
pub async fn add_to_slot(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    date: Date,
    supplement_id: i64,
    slot: TimeSlot,
    dosage: Option<String>,
) -> AppResult<ScheduledSupplement> {
    let dosage = normalize_dosage(dosage)?;
    if !store.in_plan(user_id, supplement_id).await? {
        return Err(AppError::Validation(format!(
            "supplement {} is not in your plan",
            supplement_id
        )));
    }

    let mut board = load_board(store, user_id, date).await?;
    if board.contains(supplement_id, slot) {
        return Err(BoardError::Duplicate {
            supplement_id,
            slot,
        }
        .into());
    }

    let entry = store
        .insert_entry(user_id, supplement_id, slot, &dosage)
        .await
        .map_err(|e| {
            AppError::on_unique(
                e,
                BoardError::Duplicate {
                    supplement_id,
                    slot,
                }
                .to_string(),
            )
        })?;
    board.insert(entry.clone())?;
    info!(%user_id, entry_id = entry.id, supplement_id, %slot, "supplement scheduled");
    Ok(entry)
}

pub async fn remove_entry(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    date: Date,
    entry_id: i64,
) -> AppResult<()> {
    let mut board = load_board(store, user_id, date).await?;
    let removed = board.remove(entry_id)?;

    // The row may have gone away since the board was loaded.
    if store.delete_entry(user_id, entry_id).await? == 0 {
        return Err(BoardError::NotFound(entry_id).into());
    }
    info!(
        %user_id,
        entry_id,
        supplement_id = removed.entry.supplement_id,
        slot = %removed.entry.time_slot,
        "schedule entry removed"
    );
    Ok(())
}

/// Drag-and-drop move. Only a slot change is persisted; the returned board carries the
/// requested order. A failed write discards the board instead of returning it.
pub async fn move_entry(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    date: Date,
    entry_id: i64,
    slot: TimeSlot,
    index: Option<usize>,
) -> AppResult<ScheduleBoard> {
    let mut board = load_board(store, user_id, date).await?;
    let moved = board.move_entry(entry_id, slot, index)?;

    if moved.changed_slot() {
        if let Err(e) = store.update_slot(user_id, entry_id, slot).await {
            warn!(error = %e, %user_id, entry_id, "slot change not persisted; discarding move");
            let supplement_id = board.get(entry_id).map_or(0, |m| m.entry.supplement_id);
            return Err(AppError::on_unique(
                e,
                BoardError::Duplicate { supplement_id, slot }.to_string(),
            ));
        }
        info!(%user_id, entry_id, from = %moved.from, to = %moved.to, "schedule entry moved");
    }
    Ok(board)
}

pub async fn update_dosage(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    date: Date,
    entry_id: i64,
    dosage: String,
) -> AppResult<ScheduledSupplement> {
    let dosage = normalize_dosage(Some(dosage))?;
    let mut board = load_board(store, user_id, date).await?;
    board.set_dosage(entry_id, dosage.clone())?;

    if let Err(e) = store.update_dosage(user_id, entry_id, &dosage).await {
        warn!(error = %e, %user_id, entry_id, "dosage change not persisted; discarding");
        return Err(e.into());
    }
    board
        .get(entry_id)
        .map(|e| e.entry.clone())
        .ok_or_else(|| BoardError::NotFound(entry_id).into())
}

/// Replaces the slots of one supplement with `slots`; an empty set unschedules it.
pub async fn assign_slots(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    supplement_id: i64,
    slots: Vec<TimeSlot>,
    dosage: Option<String>,
) -> AppResult<Vec<ScheduledSupplement>> {
    let dosage = normalize_dosage(dosage)?;
    if !store.in_plan(user_id, supplement_id).await? {
        return Err(AppError::Validation(format!(
            "supplement {} is not in your plan",
            supplement_id
        )));
    }
    let slots: Vec<TimeSlot> = TimeSlot::ALL
        .into_iter()
        .filter(|s| slots.contains(s))
        .collect();

    let entries = store
        .replace_slots(user_id, supplement_id, &slots, &dosage)
        .await
        .map_err(|e| {
            AppError::on_unique(e, format!("slots of supplement {} changed meanwhile", supplement_id))
        })?;
    info!(%user_id, supplement_id, slots = entries.len(), "supplement slots replaced");
    Ok(entries)
}

/// Flips today's taken state of an entry and reports adherence.
///
/// The upsert failing discards the flip and surfaces the error. The congratulation marker
/// failing is only logged.
pub async fn toggle_intake(
    store: &dyn ScheduleStore,
    user_id: Uuid,
    date: Date,
    entry_id: i64,
) -> AppResult<ToggleOutcome> {
    let mut board = load_board(store, user_id, date).await?;
    let toggle = board.toggle(entry_id)?;
    let record = board.intake_record(entry_id)?;

    if let Err(e) = store.upsert_intake(user_id, &record).await {
        warn!(error = %e, %user_id, entry_id, "intake not persisted; discarding toggle");
        return Err(e.into());
    }

    let mut message = None;
    if toggle.congratulate {
        if let Err(e) = store.set_last_congratulated(user_id, date).await {
            warn!(error = %e, %user_id, "failed to store congratulation date");
        }
        message = Some(match store.motivational_message().await {
            Ok(Some(m)) => m,
            Ok(None) => FALLBACK_MESSAGE.to_string(),
            Err(e) => {
                warn!(error = %e, "failed to load motivational message");
                FALLBACK_MESSAGE.to_string()
            }
        });
        info!(%user_id, %date, "daily plan completed");
    }

    Ok(ToggleOutcome {
        entry_id,
        taken: toggle.taken,
        adherence: toggle.adherence,
        congratulate: toggle.congratulate,
        message,
    })
}
