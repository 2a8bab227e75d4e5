//! Client-facing daily operations: today's state, reroll, and guessing.
use std::sync::{Mutex, OnceLock};

use serde::Serialize;
use thiserror::Error;

use crate::calendar::{Clock, GameDate, ReferenceZone, SystemClock};
use crate::catalog::{Catalog, CatalogError, Entity};
use crate::constants::REROLL_MAX_ATTEMPTS;
use crate::evaluator::EvalError;
use crate::selector::DailyState;
use crate::session::{Guess, GuessSession, SessionError};
use crate::store::{StoreError, WriteOutcome};
use crate::{CatalogLoader, DailyStore, GuessStore};

/// Errors surfaced by the daily engine.
#[derive(Debug, Error)]
pub enum DailyError {
    #[error("catalog is empty; no answer can be selected")]
    InvalidCatalog,
    #[error("catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },
    #[error("persistence failed")]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    InvalidInput(#[from] EvalError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("reroll lost {attempts} consecutive races for the daily record")]
    RerollContention { attempts: u32 },
}

impl DailyError {
    /// True for the conditions clients should report as "not found".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InvalidCatalog | Self::CatalogUnavailable { .. }
        )
    }
}

/// Today's record together with the answer it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyView {
    pub state: DailyState,
    pub answer: Entity,
    /// False when the record could not be persisted.
    pub durable: bool,
}

/// Result of one submitted guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessOutcome {
    pub date: GameDate,
    pub guess: Guess,
    pub attempts: usize,
    pub won: bool,
    /// False when the session could not be saved.
    pub durable: bool,
}

/// Daily engine over a catalog source, a record store and a clock.
pub struct DailyEngine<L, S, C = SystemClock>
where
    L: CatalogLoader,
    S: DailyStore,
    C: Clock,
{
    loader: L,
    store: S,
    clock: C,
    zone: ReferenceZone,
    catalog: OnceLock<Catalog>,
    reroll_gate: Mutex<()>,
}

impl<L, S> DailyEngine<L, S, SystemClock>
where
    L: CatalogLoader,
    S: DailyStore,
{
    /// Create an engine that follows wall-clock time.
    pub fn new(loader: L, store: S, zone: ReferenceZone) -> Self {
        Self::with_clock(loader, store, zone, SystemClock)
    }
}

impl<L, S, C> DailyEngine<L, S, C>
where
    L: CatalogLoader,
    S: DailyStore,
    C: Clock,
{
    pub fn with_clock(loader: L, store: S, zone: ReferenceZone, clock: C) -> Self {
        Self {
            loader,
            store,
            clock,
            zone,
            catalog: OnceLock::new(),
            reroll_gate: Mutex::new(()),
        }
    }

    /// The catalog, loaded on first use and kept for the engine's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`DailyError::InvalidCatalog`] for an empty catalog and
    /// [`DailyError::CatalogUnavailable`] for any other loader failure.
    pub fn catalog(&self) -> Result<&Catalog, DailyError> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        let loaded = self.loader.load_catalog().map_err(|err| {
            if reports_empty_catalog(&err) {
                DailyError::InvalidCatalog
            } else {
                DailyError::CatalogUnavailable {
                    reason: error_chain(&err),
                }
            }
        })?;
        if loaded.is_empty() {
            return Err(DailyError::InvalidCatalog);
        }
        log::info!("catalog loaded with {} entities", loaded.len());
        Ok(self.catalog.get_or_init(|| loaded))
    }

    #[must_use]
    pub fn today_date(&self) -> GameDate {
        self.zone.today(&self.clock)
    }

    /// Today's record, creating and persisting it on the first request of a day.
    ///
    /// A failed read is treated as "no record"; a failed write still
    /// returns the computed answer with `durable == false`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the catalog is unavailable.
    pub fn today(&self) -> Result<DailyView, DailyError> {
        let catalog = self.catalog()?;
        let today = self.today_date();
        let existing = self.read_state();
        if let Some(view) = existing
            .as_ref()
            .and_then(|state| current_view(catalog, state, today))
        {
            return Ok(view);
        }

        let state = DailyState::open_day(catalog, today, existing.as_ref());
        log::info!(
            "opening {today}: answer {} (history {:?})",
            state.answer_id,
            state.recent_answer_ids.ids()
        );
        let expected = existing.as_ref().map(|s| s.revision);
        match self.store.write_if_revision(expected, &state) {
            Ok(WriteOutcome::Written) => build_view(catalog, state, true),
            Ok(WriteOutcome::Conflict { current }) => {
                log::debug!("daily record moved to revision {current:?} while opening {today}");
                match self.read_state() {
                    Some(winner) => match current_view(catalog, &winner, today) {
                        Some(view) => Ok(view),
                        None => build_view(catalog, state, false),
                    },
                    None => build_view(catalog, state, false),
                }
            }
            Err(err) => {
                log::warn!("failed to persist daily record: {}", error_chain(&err));
                build_view(catalog, state, false)
            }
        }
    }

    /// Advance today's reroll counter and pick a new answer.
    ///
    /// Local rerolls are serialised; concurrent writers elsewhere are
    /// detected through the record revision and retried.
    ///
    /// # Errors
    ///
    /// Returns [`DailyError::RerollContention`] after repeated lost races,
    /// or a catalog error.
    pub fn reroll(&self) -> Result<DailyView, DailyError> {
        let _gate = self
            .reroll_gate
            .lock()
            .map_err(|_| DailyError::Persistence(StoreError::Poisoned))?;
        let catalog = self.catalog()?;
        let today = self.today_date();
        for attempt in 1..=REROLL_MAX_ATTEMPTS {
            let current = self.read_state();
            let next = DailyState::rerolled(catalog, today, current.as_ref());
            let expected = current.as_ref().map(|s| s.revision);
            match self.store.write_if_revision(expected, &next) {
                Ok(WriteOutcome::Written) => {
                    log::info!(
                        "rerolled {today} (#{}): answer {}",
                        next.reroll_count,
                        next.answer_id
                    );
                    return build_view(catalog, next, true);
                }
                Ok(WriteOutcome::Conflict { current }) => {
                    log::debug!("reroll attempt {attempt} raced revision {current:?}");
                }
                Err(err) => {
                    log::warn!("failed to persist reroll: {}", error_chain(&err));
                    return build_view(catalog, next, false);
                }
            }
        }
        Err(DailyError::RerollContention {
            attempts: REROLL_MAX_ATTEMPTS,
        })
    }

    /// Today's guess session, evicting sessions of other days.
    ///
    /// Load failures start a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error only when the catalog is unavailable.
    pub fn session<G: GuessStore>(&self, guesses: &G) -> Result<GuessSession, DailyError> {
        let date = self.today()?.state.date;
        Ok(load_session(guesses, date))
    }

    /// Evaluate a named guess against today's answer and record it.
    ///
    /// # Errors
    ///
    /// Returns [`DailyError::Session`] for unknown names, repeated guesses
    /// or a game that is already won.
    pub fn submit_guess<G: GuessStore>(
        &self,
        guesses: &G,
        name: &str,
    ) -> Result<GuessOutcome, DailyError> {
        let daily = self.today()?;
        let catalog = self.catalog()?;
        let candidate = catalog
            .find_by_name(name)
            .ok_or_else(|| SessionError::UnknownEntity(name.trim().to_string()))?;
        let mut session = load_session(guesses, daily.state.date);
        let guess = session.submit(candidate, &daily.answer)?.clone();
        let durable = match guesses.save(&session) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to save guess session: {}", error_chain(&err));
                false
            }
        };
        Ok(GuessOutcome {
            date: session.date,
            guess,
            attempts: session.attempts(),
            won: session.won,
            durable,
        })
    }

    fn read_state(&self) -> Option<DailyState> {
        match self.store.read() {
            Ok(state) => state,
            Err(err) => {
                log::warn!(
                    "failed to read daily record, regenerating: {}",
                    error_chain(&err)
                );
                None
            }
        }
    }
}

fn load_session<G: GuessStore>(guesses: &G, date: GameDate) -> GuessSession {
    match guesses.purge_except(date) {
        Ok(0) => {}
        Ok(removed) => log::info!("cleared {removed} stale guess session(s)"),
        Err(err) => log::warn!("failed to clear stale guess sessions: {}", error_chain(&err)),
    }
    match guesses.load(date) {
        Ok(Some(session)) => session,
        Ok(None) => GuessSession::new(date),
        Err(err) => {
            log::warn!("failed to load guess session for {date}: {}", error_chain(&err));
            GuessSession::new(date)
        }
    }
}

// `None` when the record is for another day or names an id the catalog lacks.
fn current_view(catalog: &Catalog, state: &DailyState, today: GameDate) -> Option<DailyView> {
    if state.date != today {
        return None;
    }
    match catalog.get(state.answer_id) {
        Some(answer) => Some(DailyView {
            state: state.clone(),
            answer: answer.clone(),
            durable: true,
        }),
        None => {
            log::warn!(
                "stored answer {} is not in the catalog; regenerating {today}",
                state.answer_id
            );
            None
        }
    }
}

fn build_view(catalog: &Catalog, state: DailyState, durable: bool) -> Result<DailyView, DailyError> {
    let answer = catalog
        .get(state.answer_id)
        .cloned()
        .ok_or(DailyError::InvalidCatalog)?;
    Ok(DailyView {
        state,
        answer,
        durable,
    })
}

fn reports_empty_catalog(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut cause = Some(err);
    while let Some(current) = cause {
        if matches!(current.downcast_ref::<CatalogError>(), Some(CatalogError::Empty)) {
            return true;
        }
        cause = current.source();
    }
    false
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
