use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::model::{IntakeRecord, IntakeRow, ScheduleRow, ScheduledSupplement, TimeSlot};

/// Persistence for slot assignments, daily intake and the congratulation marker.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn list_entries(&self, user_id: Uuid) -> anyhow::Result<Vec<ScheduledSupplement>>;
    async fn in_plan(&self, user_id: Uuid, supplement_id: i64) -> anyhow::Result<bool>;
    async fn insert_entry(
        &self,
        user_id: Uuid,
        supplement_id: i64,
        slot: TimeSlot,
        dosage: &str,
    ) -> anyhow::Result<ScheduledSupplement>;
    /// Returns the number of rows removed.
    async fn delete_entry(&self, user_id: Uuid, entry_id: i64) -> anyhow::Result<u64>;
    async fn update_slot(&self, user_id: Uuid, entry_id: i64, slot: TimeSlot)
        -> anyhow::Result<()>;
    async fn update_dosage(&self, user_id: Uuid, entry_id: i64, dosage: &str)
        -> anyhow::Result<()>;
    /// Replaces every slot assignment of one supplement.
    async fn replace_slots(
        &self,
        user_id: Uuid,
        supplement_id: i64,
        slots: &[TimeSlot],
        dosage: &str,
    ) -> anyhow::Result<Vec<ScheduledSupplement>>;
    async fn intake_for_day(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<IntakeRecord>>;
    /// Upserts on (user, supplement, slot, date).
    async fn upsert_intake(&self, user_id: Uuid, record: &IntakeRecord) -> anyhow::Result<()>;
    async fn last_congratulated(&self, user_id: Uuid) -> anyhow::Result<Option<Date>>;
    async fn set_last_congratulated(&self, user_id: Uuid, date: Date) -> anyhow::Result<()>;
    async fn motivational_message(&self) -> anyhow::Result<Option<String>>;
}

#[derive(Clone)]
pub struct PgScheduleStore {
    db: PgPool,
}

impl PgScheduleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_entries(rows: Vec<ScheduleRow>) -> anyhow::Result<Vec<ScheduledSupplement>> {
    rows.into_iter()
        .map(|r| ScheduledSupplement::try_from(r).map_err(anyhow::Error::from))
        .collect()
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn list_entries(&self, user_id: Uuid) -> anyhow::Result<Vec<ScheduledSupplement>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT s.id, s.supplement_id, s.time_slot, s.dosage, c.name, c.brand, c.image
              FROM user_schedule s
              JOIN supplements c ON c.id = s.supplement_id
             WHERE s.user_id = $1
             ORDER BY s.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list schedule")?;
        into_entries(rows)
    }

    async fn in_plan(&self, user_id: Uuid, supplement_id: i64) -> anyhow::Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_supplements
                 WHERE user_id = $1 AND supplement_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(supplement_id)
        .fetch_one(&self.db)
        .await
        .context("check plan membership")?;
        Ok(found)
    }

    async fn insert_entry(
        &self,
        user_id: Uuid,
        supplement_id: i64,
        slot: TimeSlot,
        dosage: &str,
    ) -> anyhow::Result<ScheduledSupplement> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            WITH ins AS (
                INSERT INTO user_schedule (user_id, supplement_id, time_slot, dosage)
                VALUES ($1, $2, $3, $4)
                RETURNING id, supplement_id, time_slot, dosage
            )
            SELECT ins.id, ins.supplement_id, ins.time_slot, ins.dosage, c.name, c.brand, c.image
              FROM ins
              JOIN supplements c ON c.id = ins.supplement_id
            "#,
        )
        .bind(user_id)
        .bind(supplement_id)
        .bind(slot.as_str())
        .bind(dosage)
        .fetch_one(&self.db)
        .await
        .context("insert schedule entry")?;
        Ok(ScheduledSupplement::try_from(row)?)
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: i64) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM user_schedule WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete schedule entry")?;
        Ok(res.rows_affected())
    }

    async fn update_slot(
        &self,
        user_id: Uuid,
        entry_id: i64,
        slot: TimeSlot,
    ) -> anyhow::Result<()> {
        let res = sqlx::query(
            "UPDATE user_schedule SET time_slot = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(slot.as_str())
        .execute(&self.db)
        .await
        .context("update schedule slot")?;
        anyhow::ensure!(res.rows_affected() == 1, "schedule entry {} vanished", entry_id);
        Ok(())
    }

    async fn update_dosage(
        &self,
        user_id: Uuid,
        entry_id: i64,
        dosage: &str,
    ) -> anyhow::Result<()> {
        let res =
            sqlx::query("UPDATE user_schedule SET dosage = $3 WHERE id = $1 AND user_id = $2")
                .bind(entry_id)
                .bind(user_id)
                .bind(dosage)
                .execute(&self.db)
                .await
                .context("update schedule dosage")?;
        anyhow::ensure!(res.rows_affected() == 1, "schedule entry {} vanished", entry_id);
        Ok(())
    }

    async fn replace_slots(
        &self,
        user_id: Uuid,
        supplement_id: i64,
        slots: &[TimeSlot],
        dosage: &str,
    ) -> anyhow::Result<Vec<ScheduledSupplement>> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM user_schedule WHERE user_id = $1 AND supplement_id = $2")
            .bind(user_id)
            .bind(supplement_id)
            .execute(&mut *tx)
            .await
            .context("clear supplement slots")?;
        for slot in slots {
            sqlx::query(
                r#"
                INSERT INTO user_schedule (user_id, supplement_id, time_slot, dosage)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id)
            .bind(supplement_id)
            .bind(slot.as_str())
            .bind(dosage)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert slot {}", slot))?;
        }
        tx.commit().await.context("commit tx")?;

        Ok(self
            .list_entries(user_id)
            .await?
            .into_iter()
            .filter(|e| e.supplement_id == supplement_id)
            .collect())
    }

    async fn intake_for_day(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<IntakeRecord>> {
        let rows = sqlx::query_as::<_, IntakeRow>(
            r#"
            SELECT supplement_id, time_slot, date, taken
              FROM daily_supplement_intake
             WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.db)
        .await
        .context("list daily intake")?;
        rows.into_iter()
            .map(|r| IntakeRecord::try_from(r).map_err(anyhow::Error::from))
            .collect()
    }

    async fn upsert_intake(&self, user_id: Uuid, record: &IntakeRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_supplement_intake (user_id, supplement_id, time_slot, date, taken)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, supplement_id, time_slot, date)
            DO UPDATE SET taken = EXCLUDED.taken
            "#,
        )
        .bind(user_id)
        .bind(record.supplement_id)
        .bind(record.time_slot.as_str())
        .bind(record.date)
        .bind(record.taken)
        .execute(&self.db)
        .await
        .context("upsert daily intake")?;
        Ok(())
    }

    async fn last_congratulated(&self, user_id: Uuid) -> anyhow::Result<Option<Date>> {
        let date = sqlx::query_scalar::<_, Option<Date>>(
            "SELECT last_congratulated_on FROM user_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("load last congratulation")?;
        Ok(date.flatten())
    }

    async fn set_last_congratulated(&self, user_id: Uuid, date: Date) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, last_congratulated_on)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET last_congratulated_on = EXCLUDED.last_congratulated_on,
                          updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(date)
        .execute(&self.db)
        .await
        .context("store last congratulation")?;
        Ok(())
    }

    async fn motivational_message(&self) -> anyhow::Result<Option<String>> {
        let msg = sqlx::query_scalar::<_, String>(
            "SELECT message FROM motivational_messages ORDER BY random() LIMIT 1",
        )
        .fetch_optional(&self.db)
        .await
        .context("pick motivational message")?;
        Ok(msg)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::testing::unique_violation;

    #[derive(Default)]
    struct Inner {
        catalog: HashMap<i64, (String, String)>,
        plan: HashSet<(Uuid, i64)>,
        entries: Vec<(Uuid, ScheduledSupplement)>,
        intake: HashMap<(Uuid, i64, TimeSlot, Date), bool>,
        congratulated: HashMap<Uuid, Date>,
        messages: Vec<String>,
        hidden: HashSet<i64>,
        next_id: i64,
    }

    impl Inner {
        /// Mirrors the (user, supplement, slot) unique key.
        fn taken_slot(&self, user_id: Uuid, supplement_id: i64, slot: TimeSlot, except: Option<i64>) -> bool {
            self.entries.iter().any(|(u, e)| {
                *u == user_id
                    && e.supplement_id == supplement_id
                    && e.time_slot == slot
                    && Some(e.id) != except
            })
        }
    }

    /// In-memory store with switchable write failures.
    #[derive(Default)]
    pub struct MemoryScheduleStore {
        inner: Mutex<Inner>,
        fail_writes: AtomicBool,
    }

    impl MemoryScheduleStore {
        pub fn with_catalog(items: &[(i64, &str, &str)]) -> Self {
            let store = Self::default();
            {
                let mut g = store.inner.lock().unwrap();
                for (id, name, brand) in items {
                    g.catalog.insert(*id, (name.to_string(), brand.to_string()));
                }
            }
            store
        }

        pub fn add_to_plan(&self, user_id: Uuid, supplement_id: i64) {
            self.inner.lock().unwrap().plan.insert((user_id, supplement_id));
        }

        pub fn add_message(&self, msg: &str) {
            self.inner.lock().unwrap().messages.push(msg.to_string());
        }

        /// Leaves an entry out of reads while it still counts for the unique key.
        pub fn hide_entry(&self, entry_id: i64) {
            self.inner.lock().unwrap().hidden.insert(entry_id);
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn intake_rows(&self) -> usize {
            self.inner.lock().unwrap().intake.len()
        }

        pub fn intake(&self, user_id: Uuid, supplement_id: i64, slot: TimeSlot, date: Date) -> Option<bool> {
            self.inner
                .lock()
                .unwrap()
                .intake
                .get(&(user_id, supplement_id, slot, date))
                .copied()
        }

        pub fn stored_entry(&self, entry_id: i64) -> Option<ScheduledSupplement> {
            self.inner
                .lock()
                .unwrap()
                .entries
                .iter()
                .find(|(_, e)| e.id == entry_id)
                .map(|(_, e)| e.clone())
        }

        fn check_write(&self) -> anyhow::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                anyhow::bail!("connection reset");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ScheduleStore for MemoryScheduleStore {
        async fn list_entries(&self, user_id: Uuid) -> anyhow::Result<Vec<ScheduledSupplement>> {
            let g = self.inner.lock().unwrap();
            Ok(g.entries
                .iter()
                .filter(|(u, e)| *u == user_id && !g.hidden.contains(&e.id))
                .map(|(_, e)| e.clone())
                .collect())
        }

        async fn in_plan(&self, user_id: Uuid, supplement_id: i64) -> anyhow::Result<bool> {
            Ok(self.inner.lock().unwrap().plan.contains(&(user_id, supplement_id)))
        }

        async fn insert_entry(
            &self,
            user_id: Uuid,
            supplement_id: i64,
            slot: TimeSlot,
            dosage: &str,
        ) -> anyhow::Result<ScheduledSupplement> {
            self.check_write()?;
            let mut g = self.inner.lock().unwrap();
            if g.taken_slot(user_id, supplement_id, slot, None) {
                return Err(unique_violation()).context("insert schedule entry");
            }
            let (name, brand) = g
                .catalog
                .get(&supplement_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("foreign key violation"))?;
            g.next_id += 1;
            let entry = ScheduledSupplement {
                id: g.next_id,
                supplement_id,
                time_slot: slot,
                dosage: dosage.to_string(),
                name,
                brand,
                image: None,
            };
            g.entries.push((user_id, entry.clone()));
            Ok(entry)
        }

        async fn delete_entry(&self, user_id: Uuid, entry_id: i64) -> anyhow::Result<u64> {
            self.check_write()?;
            let mut g = self.inner.lock().unwrap();
            let before = g.entries.len();
            g.entries.retain(|(u, e)| !(*u == user_id && e.id == entry_id));
            Ok((before - g.entries.len()) as u64)
        }

        async fn update_slot(
            &self,
            user_id: Uuid,
            entry_id: i64,
            slot: TimeSlot,
        ) -> anyhow::Result<()> {
            self.check_write()?;
            let mut g = self.inner.lock().unwrap();
            let supplement_id = g
                .entries
                .iter()
                .find(|(u, e)| *u == user_id && e.id == entry_id)
                .map(|(_, e)| e.supplement_id)
                .ok_or_else(|| anyhow::anyhow!("schedule entry {} vanished", entry_id))?;
            if g.taken_slot(user_id, supplement_id, slot, Some(entry_id)) {
                return Err(unique_violation()).context("update schedule slot");
            }
            if let Some((_, e)) = g.entries.iter_mut().find(|(_, e)| e.id == entry_id) {
                e.time_slot = slot;
            }
            Ok(())
        }

        async fn update_dosage(
            &self,
            user_id: Uuid,
            entry_id: i64,
            dosage: &str,
        ) -> anyhow::Result<()> {
            self.check_write()?;
            let mut g = self.inner.lock().unwrap();
            let (_, e) = g
                .entries
                .iter_mut()
                .find(|(u, e)| *u == user_id && e.id == entry_id)
                .ok_or_else(|| anyhow::anyhow!("schedule entry {} vanished", entry_id))?;
            e.dosage = dosage.to_string();
            Ok(())
        }

        async fn replace_slots(
            &self,
            user_id: Uuid,
            supplement_id: i64,
            slots: &[TimeSlot],
            dosage: &str,
        ) -> anyhow::Result<Vec<ScheduledSupplement>> {
            self.check_write()?;
            {
                let mut g = self.inner.lock().unwrap();
                g.entries
                    .retain(|(u, e)| !(*u == user_id && e.supplement_id == supplement_id));
            }
            let mut out = Vec::with_capacity(slots.len());
            for slot in slots {
                out.push(self.insert_entry(user_id, supplement_id, *slot, dosage).await?);
            }
            Ok(out)
        }

        async fn intake_for_day(
            &self,
            user_id: Uuid,
            date: Date,
        ) -> anyhow::Result<Vec<IntakeRecord>> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .intake
                .iter()
                .filter(|((u, _, _, d), _)| *u == user_id && *d == date)
                .map(|((_, supplement_id, slot, d), taken)| IntakeRecord {
                    supplement_id: *supplement_id,
                    time_slot: *slot,
                    date: *d,
                    taken: *taken,
                })
                .collect())
        }

        async fn upsert_intake(&self, user_id: Uuid, record: &IntakeRecord) -> anyhow::Result<()> {
            self.check_write()?;
            self.inner.lock().unwrap().intake.insert(
                (user_id, record.supplement_id, record.time_slot, record.date),
                record.taken,
            );
            Ok(())
        }

        async fn last_congratulated(&self, user_id: Uuid) -> anyhow::Result<Option<Date>> {
            Ok(self.inner.lock().unwrap().congratulated.get(&user_id).copied())
        }

        async fn set_last_congratulated(&self, user_id: Uuid, date: Date) -> anyhow::Result<()> {
            self.check_write()?;
            self.inner.lock().unwrap().congratulated.insert(user_id, date);
            Ok(())
        }

        async fn motivational_message(&self) -> anyhow::Result<Option<String>> {
            Ok(self.inner.lock().unwrap().messages.first().cloned())
        }
    }
}
