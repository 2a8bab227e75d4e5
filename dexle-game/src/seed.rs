//! Date-derived selection seeds.
//! Seed format: <YYYY-MM-DD>-<SALT>, e.g. 2024-01-01-0, 2024-01-01-3

use crate::calendar::GameDate;
use crate::constants::SEED_HASH_MULTIPLIER;

/// Rolling multiply-and-add hash over UTF-16 code units with 32-bit signed
/// wrap-around. Must stay bit-compatible with previously persisted days.
#[must_use]
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_mul(SEED_HASH_MULTIPLIER)
            .wrapping_add(i32::from(unit))
    })
}

/// Seed string for a day and reroll salt.
#[must_use]
pub fn selection_seed(date: GameDate, salt: u32) -> String {
    format!("{date}-{salt}")
}

/// Pseudo-random index into a candidate list of length `len`.
///
/// Returns 0 for an empty list; callers are expected to guard emptiness.
#[must_use]
pub fn seed_index(date: GameDate, salt: u32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let folded = u64::from(rolling_hash(&selection_seed(date, salt)).unsigned_abs());
    let len = len as u64;
    usize::try_from(folded % len).unwrap_or(0)
}
