//! Deterministic daily answer selection and the persisted daily record.
use serde::{Deserialize, Serialize};

use crate::calendar::GameDate;
use crate::catalog::{Catalog, Entity};
use crate::constants::RECENT_HISTORY_LIMIT;
use crate::engine::DailyError;
use crate::seed::seed_index;

/// Pick the answer for `date` from a validated catalog.
///
/// Entities listed in `recent` are skipped unless they cover the whole
/// catalog, in which case the full catalog is used.
#[must_use]
pub fn select_answer<'a>(
    catalog: &'a Catalog,
    date: GameDate,
    recent: &[u32],
    salt: u32,
) -> &'a Entity {
    choose(catalog.entities(), date, recent, salt)
}

/// [`select_answer`] over an unvalidated slice.
///
/// # Errors
///
/// Returns [`DailyError::InvalidCatalog`] when `entities` is empty.
pub fn select_from<'a>(
    entities: &'a [Entity],
    date: GameDate,
    recent: &[u32],
    salt: u32,
) -> Result<&'a Entity, DailyError> {
    if entities.is_empty() {
        return Err(DailyError::InvalidCatalog);
    }
    Ok(choose(entities, date, recent, salt))
}

// `entities` must be non-empty.
fn choose<'a>(entities: &'a [Entity], date: GameDate, recent: &[u32], salt: u32) -> &'a Entity {
    let available: Vec<&Entity> = entities
        .iter()
        .filter(|entity| !recent.contains(&entity.id))
        .collect();
    if available.is_empty() {
        log::debug!("recent history covers the catalog; selecting from all entities");
        return &entities[seed_index(date, salt, entities.len())];
    }
    available[seed_index(date, salt, available.len())]
}

/// Bounded FIFO of recently used answer ids, newest last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct RecentIds(Vec<u32>);

impl RecentIds {
    /// Append an id, evicting the oldest entries beyond the window.
    pub fn push(&mut self, id: u32) {
        self.0.push(id);
        self.trim();
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn trim(&mut self) {
        if self.0.len() > RECENT_HISTORY_LIMIT {
            let excess = self.0.len() - RECENT_HISTORY_LIMIT;
            self.0.drain(..excess);
        }
    }
}

impl From<Vec<u32>> for RecentIds {
    fn from(ids: Vec<u32>) -> Self {
        let mut recent = Self(ids);
        recent.trim();
        recent
    }
}

impl From<RecentIds> for Vec<u32> {
    fn from(value: RecentIds) -> Self {
        value.0
    }
}

/// The single persisted record: today's answer plus its anti-repeat history.
///
/// `revision` increases on every write and backs compare-and-swap in stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyState {
    pub date: GameDate,
    pub answer_id: u32,
    pub recent_answer_ids: RecentIds,
    pub reroll_count: u32,
    #[serde(default)]
    pub revision: u64,
}

impl DailyState {
    /// Create the record for a newly observed day.
    ///
    /// The previous record's history is inherited and its final answer
    /// folded in before selecting, so yesterday's answer is excluded.
    #[must_use]
    pub fn open_day(catalog: &Catalog, date: GameDate, previous: Option<&Self>) -> Self {
        let mut history = previous
            .map(|prev| prev.recent_answer_ids.clone())
            .unwrap_or_default();
        if let Some(prev) = previous
            && history.last() != Some(prev.answer_id)
        {
            history.push(prev.answer_id);
        }
        let answer = select_answer(catalog, date, history.ids(), 0);
        history.push(answer.id);
        Self {
            date,
            answer_id: answer.id,
            recent_answer_ids: history,
            reroll_count: 0,
            revision: previous.map_or(0, |prev| prev.revision) + 1,
        }
    }

    /// Replace today's answer with the next salted pick.
    ///
    /// The counter restarts when `current` belongs to another day; a
    /// missing record rerolls from an empty history.
    #[must_use]
    pub fn rerolled(catalog: &Catalog, today: GameDate, current: Option<&Self>) -> Self {
        let base = current
            .filter(|state| state.date == today)
            .map_or(0, |state| state.reroll_count);
        let salt = base.saturating_add(1);
        let mut history = current
            .map(|state| state.recent_answer_ids.clone())
            .unwrap_or_default();
        let answer = select_answer(catalog, today, history.ids(), salt);
        history.push(answer.id);
        Self {
            date: today,
            answer_id: answer.id,
            recent_answer_ids: history,
            reroll_count: salt,
            revision: current.map_or(0, |state| state.revision) + 1,
        }
    }
}
