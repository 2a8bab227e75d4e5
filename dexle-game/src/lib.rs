//! Dexle Game Engine
//!
//! Platform-agnostic core for the Dexle daily creature guessing game:
//! deterministic daily answer selection, the persisted daily record, and
//! per-attribute guess evaluation. Catalog sourcing and persistence media
//! are supplied by the host through the traits below.

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod engine;
pub mod evaluator;
pub mod seed;
pub mod selector;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use calendar::{Clock, DateError, FixedClock, GameDate, ReferenceZone, SystemClock};
pub use catalog::{Catalog, CatalogError, CatalogReport, Entity, JsonFileLoader, Region, Tags};
pub use config::{ConfigError, GameConfig};
pub use engine::{DailyEngine, DailyError, DailyView, GuessOutcome};
pub use evaluator::{Direction, EvalError, Match, Outcome, Verdict, evaluate, try_evaluate};
pub use seed::{rolling_hash, seed_index, selection_seed};
pub use selector::{DailyState, RecentIds, select_answer, select_from};
pub use session::{Guess, GuessSession, SessionError};
pub use store::{
    FileDailyStore, FileGuessStore, MemoryDailyStore, MemoryGuessStore, StoreError, WriteOutcome,
};

/// Source of the creature catalog.
/// Loaded once per engine and treated as read-only afterwards.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or breaks its invariants.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Durable home of the single daily record.
/// Implementations must make `write` atomic with respect to `read`.
pub trait DailyStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the current record, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read.
    fn read(&self) -> Result<Option<DailyState>, Self::Error>;

    /// Replace the record unconditionally
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write(&self, state: &DailyState) -> Result<(), Self::Error>;

    /// Replace the record only if its revision still equals `expected`
    /// (`None` meaning "no record yet").
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or written.
    fn write_if_revision(
        &self,
        expected: Option<u64>,
        state: &DailyState,
    ) -> Result<WriteOutcome, Self::Error>;
}

/// Per-day guess sessions, evicted when the day changes.
pub trait GuessStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the session for `date`
    ///
    /// # Errors
    ///
    /// Returns an error if a stored session cannot be read.
    fn load(&self, date: GameDate) -> Result<Option<GuessSession>, Self::Error>;

    /// Save a session under its own date
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    fn save(&self, session: &GuessSession) -> Result<(), Self::Error>;

    /// Remove every session except the one for `keep`, returning how many went
    ///
    /// # Errors
    ///
    /// Returns an error if stale sessions cannot be removed.
    fn purge_except(&self, keep: GameDate) -> Result<usize, Self::Error>;
}
