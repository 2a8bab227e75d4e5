//! Centralized tuning constants for Dexle game logic.
//!
//! These values pin the deterministic behaviour of daily selection and the
//! on-disk layout of persisted state. Changing any of them changes which
//! answer a given day produces, so they live in code rather than config.

// Daily selection ----------------------------------------------------------
/// Size of the anti-repeat window kept in `DailyState::recent_answer_ids`.
pub const RECENT_HISTORY_LIMIT: usize = 10;
/// Optimistic compare-and-swap attempts before a reroll gives up.
pub const REROLL_MAX_ATTEMPTS: u32 = 8;
/// Multiplier of the rolling string hash.
pub(crate) const SEED_HASH_MULTIPLIER: i32 = 31;

// Reference calendar -------------------------------------------------------
/// America/Sao_Paulo standard time (UTC-03:00, no DST since 2019).
pub const DEFAULT_UTC_OFFSET_SECONDS: i32 = -3 * 3600;
pub(crate) const MAX_UTC_OFFSET_SECONDS: i32 = 18 * 3600;
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

// Search -------------------------------------------------------------------
/// Maximum number of prefix suggestions offered for one query.
pub const SUGGESTION_LIMIT: usize = 8;

// Storage layout -----------------------------------------------------------
pub const DEFAULT_CATALOG_PATH: &str = "public/creature-data.json";
pub const DEFAULT_STATE_PATH: &str = "data/daily-state.json";
pub const DEFAULT_GUESS_DIR: &str = "data/guesses";
pub(crate) const GUESS_FILE_PREFIX: &str = "dexle-game-";
pub(crate) const GUESS_FILE_EXTENSION: &str = "json";
