//! Per-attribute guess feedback.
//!
//! Ordered attributes report direction from the guess's point of view:
//! `Higher` means the guessed value is above the answer's.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Entity;

/// Verdict for an ordered numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Correct,
    Higher,
    Lower,
}

impl Direction {
    /// Exact comparison, no tolerance.
    #[must_use]
    pub fn compare<T: PartialOrd>(candidate: T, answer: T) -> Self {
        if candidate == answer {
            Self::Correct
        } else if candidate > answer {
            Self::Higher
        } else {
            Self::Lower
        }
    }
}

/// Verdict for a categorical tag slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Match {
    Correct,
    Wrong,
}

impl Match {
    const fn from_bool(hit: bool) -> Self {
        if hit { Self::Correct } else { Self::Wrong }
    }
}

/// Any single attribute outcome, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Higher,
    Lower,
    Wrong,
}

impl Outcome {
    #[must_use]
    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }

    /// Hint glyph: arrows point toward the answer.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Correct => "✓",
            Self::Wrong => "✗",
            Self::Higher => "↓",
            Self::Lower => "↑",
        }
    }
}

impl From<Direction> for Outcome {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Correct => Self::Correct,
            Direction::Higher => Self::Higher,
            Direction::Lower => Self::Lower,
        }
    }
}

impl From<Match> for Outcome {
    fn from(value: Match) -> Self {
        match value {
            Match::Correct => Self::Correct,
            Match::Wrong => Self::Wrong,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Correct => "correct",
            Self::Higher => "higher",
            Self::Lower => "lower",
            Self::Wrong => "wrong",
        };
        f.write_str(label)
    }
}

/// Feedback for one guess, one field per comparable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verdict {
    pub generation: Direction,
    pub type1: Match,
    pub type2: Match,
    pub height: Direction,
    pub weight: Direction,
}

impl Verdict {
    /// A verdict with every field correct.
    #[must_use]
    pub const fn all_correct() -> Self {
        Self {
            generation: Direction::Correct,
            type1: Match::Correct,
            type2: Match::Correct,
            height: Direction::Correct,
            weight: Direction::Correct,
        }
    }

    /// Labelled outcomes in display order.
    #[must_use]
    pub fn outcomes(&self) -> [(&'static str, Outcome); 5] {
        [
            ("Gen", self.generation.into()),
            ("Type 1", self.type1.into()),
            ("Type 2", self.type2.into()),
            ("Height", self.height.into()),
            ("Weight", self.weight.into()),
        ]
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.outcomes()
            .iter()
            .filter(|(_, outcome)| outcome.is_correct())
            .count()
    }

    /// A guess wins only when every attribute is correct.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.outcomes().iter().all(|(_, outcome)| outcome.is_correct())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("entity {id} cannot be compared: {reason}")]
    InvalidInput { id: u32, reason: &'static str },
}

/// Compare a candidate against the secret answer.
///
/// Total for any pair of entities; validated catalogs never hit the
/// degenerate shapes that [`try_evaluate`] rejects.
#[must_use]
pub fn evaluate(candidate: &Entity, answer: &Entity) -> Verdict {
    Verdict {
        generation: Direction::compare(candidate.generation, answer.generation),
        type1: Match::from_bool(candidate.primary_tag() == answer.primary_tag()),
        type2: second_tag_match(&candidate.types, &answer.types),
        height: Direction::compare(candidate.height, answer.height),
        weight: Direction::compare(candidate.weight, answer.weight),
    }
}

/// [`evaluate`] with shape checks on both sides.
///
/// # Errors
///
/// Returns [`EvalError::InvalidInput`] if either entity has no tags, more
/// than two tags, or a non-finite size measure.
pub fn try_evaluate(candidate: &Entity, answer: &Entity) -> Result<Verdict, EvalError> {
    comparable(candidate)?;
    comparable(answer)?;
    Ok(evaluate(candidate, answer))
}

fn comparable(entity: &Entity) -> Result<(), EvalError> {
    let reason = if entity.types.is_empty() {
        Some("no category tags")
    } else if entity.types.len() > 2 {
        Some("more than two category tags")
    } else if !entity.height.is_finite() || !entity.weight.is_finite() {
        Some("non-finite size measure")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(EvalError::InvalidInput {
            id: entity.id,
            reason,
        })
    })
}

// Both single-tagged counts as a match; mismatched tag counts never do.
fn second_tag_match(candidate: &[String], answer: &[String]) -> Match {
    match (candidate, answer) {
        ([_], [_]) => Match::Correct,
        ([_, c], [_, a]) => Match::from_bool(c == a),
        _ => Match::from_bool(candidate.len() == answer.len()),
    }
}
