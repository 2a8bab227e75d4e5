//! Per-day guess history and the win lockout.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::GameDate;
use crate::catalog::Entity;
use crate::evaluator::{Verdict, evaluate};

/// One submitted guess and its feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub entity: Entity,
    pub verdict: Verdict,
}

impl Guess {
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.verdict.is_win()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("the {date} game is already won")]
    AlreadyWon { date: GameDate },
    #[error("{name} was already guessed")]
    AlreadyGuessed { id: u32, name: String },
    #[error("no creature named {0:?}")]
    UnknownEntity(String),
}

/// Guesses made against one day's answer, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessSession {
    pub date: GameDate,
    #[serde(default)]
    pub guesses: Vec<Guess>,
    #[serde(rename = "gameWon", default)]
    pub won: bool,
}

impl GuessSession {
    #[must_use]
    pub const fn new(date: GameDate) -> Self {
        Self {
            date,
            guesses: Vec::new(),
            won: false,
        }
    }

    /// Evaluate `candidate` against `answer` and record the guess.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyWon`] once a winning guess exists and
    /// [`SessionError::AlreadyGuessed`] for a repeated candidate.
    pub fn submit(&mut self, candidate: &Entity, answer: &Entity) -> Result<&Guess, SessionError> {
        if self.won {
            return Err(SessionError::AlreadyWon { date: self.date });
        }
        if self.guesses.iter().any(|g| g.entity.id == candidate.id) {
            return Err(SessionError::AlreadyGuessed {
                id: candidate.id,
                name: candidate.name.clone(),
            });
        }
        let verdict = evaluate(candidate, answer);
        self.won = verdict.is_win();
        self.guesses.push(Guess {
            entity: candidate.clone(),
            verdict,
        });
        Ok(&self.guesses[self.guesses.len() - 1])
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.guesses.len()
    }

    #[must_use]
    pub fn guessed_ids(&self) -> Vec<u32> {
        self.guesses.iter().map(|g| g.entity.id).collect()
    }

    /// Newest guess first, the order the board shows them in.
    pub fn newest_first(&self) -> impl Iterator<Item = &Guess> {
        self.guesses.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::starters;

    fn date() -> GameDate {
        "2024-01-01".parse().unwrap()
    }

    #[test]
    fn winning_guess_locks_the_session() {
        let catalog = starters();
        let answer = catalog.get(25).unwrap();
        let mut session = GuessSession::new(date());

        let miss = session.submit(catalog.get(4).unwrap(), answer).unwrap();
        assert!(!miss.is_win());
        assert!(!session.won);

        let hit = session.submit(answer, answer).unwrap();
        assert!(hit.is_win());
        assert!(session.won);
        assert_eq!(session.attempts(), 2);

        let locked = session.submit(catalog.get(7).unwrap(), answer);
        assert_eq!(locked.unwrap_err(), SessionError::AlreadyWon { date: date() });
        assert_eq!(session.attempts(), 2);
    }

    #[test]
    fn repeated_candidates_are_rejected() {
        let catalog = starters();
        let answer = catalog.get(25).unwrap();
        let mut session = GuessSession::new(date());
        session.submit(catalog.get(4).unwrap(), answer).unwrap();
        let again = session.submit(catalog.get(4).unwrap(), answer);
        assert!(matches!(again, Err(SessionError::AlreadyGuessed { id: 4, .. })));
        assert_eq!(session.guessed_ids(), vec![4]);
    }

    #[test]
    fn board_order_is_newest_first() {
        let catalog = starters();
        let answer = catalog.get(25).unwrap();
        let mut session = GuessSession::new(date());
        for id in [1, 4, 7] {
            session.submit(catalog.get(id).unwrap(), answer).unwrap();
        }
        let order: Vec<u32> = session.newest_first().map(|g| g.entity.id).collect();
        assert_eq!(order, vec![7, 4, 1]);
    }

    #[test]
    fn session_json_uses_game_won_key() {
        let session = GuessSession::new(date());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["gameWon"], serde_json::json!(false));
        assert_eq!(json["date"], serde_json::json!("2024-01-01"));
        let restored: GuessSession = serde_json::from_value(json).unwrap();
        assert_eq!(restored, session);
    }
}
