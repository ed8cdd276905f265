//! Cumulative player statistics.
//!
//! [`add_stats_for_completed_game`] is the only way statistics change. It is a
//! pure function: the caller decides when to persist the result.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_CHALLENGES;
use crate::error::{Error, Result};

/// Aggregate over every completed game.
///
/// Serialized with camelCase keys, the layout the browser build stores under
/// `gameStats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// `win_distribution[i]` counts wins that took `i + 1` guesses.
    pub win_distribution: Vec<u32>,
    pub games_failed: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_games: u32,
    /// Percentage of games won, rounded.
    pub success_rate: u32,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHALLENGES)
    }
}

impl GameStats {
    /// Empty stats with one win bucket per allowed guess.
    pub fn new(max_challenges: u8) -> Self {
        Self {
            win_distribution: vec![0; usize::from(max_challenges)],
            games_failed: 0,
            current_streak: 0,
            best_streak: 0,
            total_games: 0,
            success_rate: 0,
        }
    }

    /// Total wins across all buckets.
    pub fn wins(&self) -> u32 {
        self.win_distribution
            .iter()
            .fold(0, |total, &n| total.saturating_add(n))
    }

    /// Wins that took exactly `guesses` guesses.
    pub fn wins_in(&self, guesses: u8) -> u32 {
        usize::from(guesses)
            .checked_sub(1)
            .and_then(|i| self.win_distribution.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Resize the distribution to `max_challenges` buckets.
    ///
    /// Stats persisted under a different guess limit are padded with empty
    /// buckets, or have the extra buckets folded into the last one so no win
    /// is lost from the totals.
    pub fn normalized(mut self, max_challenges: u8) -> Self {
        let len = usize::from(max_challenges).max(1);
        if self.win_distribution.len() > len {
            let overflow = self
                .win_distribution
                .drain(len..)
                .fold(0u32, |total, n| total.saturating_add(n));
            let last = &mut self.win_distribution[len - 1];
            *last = last.saturating_add(overflow);
        } else {
            self.win_distribution.resize(len, 0);
        }
        self
    }
}

/// How a completed game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Solved on guess number `guesses` (1-based).
    Won { guesses: u8 },
    Lost,
}

impl GameOutcome {
    /// Interpret a raw guess count.
    ///
    /// Counts in `1..=max_challenges` are wins; anything above is the loss
    /// sentinel. Zero is rejected.
    pub fn from_guess_count(count: u32, max_challenges: u8) -> Result<Self> {
        match count {
            0 => Err(Error::InvalidGuessCount { count }),
            n if n <= u32::from(max_challenges) => Ok(Self::Won {
                guesses: u8::try_from(n).unwrap_or(max_challenges),
            }),
            _ => Ok(Self::Lost),
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Self::Won { .. })
    }
}

/// Rounded percentage of games won.
pub fn success_rate(stats: &GameStats) -> u32 {
    let total = u64::from(stats.total_games.max(1));
    let won = u64::from(stats.total_games.saturating_sub(stats.games_failed));
    // round half up: (200 * won + total) / (2 * total)
    let rate = (200 * won + total) / (2 * total);
    u32::try_from(rate).unwrap_or(100)
}

/// Fold one completed game into `stats`, returning the new aggregate.
pub fn add_stats_for_completed_game(stats: &GameStats, outcome: GameOutcome) -> GameStats {
    let mut next = stats.clone();
    next.total_games = next.total_games.saturating_add(1);

    match outcome {
        GameOutcome::Won { guesses } => {
            let bucket = usize::from(guesses.max(1)) - 1;
            if bucket >= next.win_distribution.len() {
                next.win_distribution.resize(bucket + 1, 0);
            }
            next.win_distribution[bucket] = next.win_distribution[bucket].saturating_add(1);
            next.current_streak = next.current_streak.saturating_add(1);
            next.best_streak = next.best_streak.max(next.current_streak);
        }
        GameOutcome::Lost => {
            next.current_streak = 0;
            next.games_failed = next.games_failed.saturating_add(1);
        }
    }

    next.success_rate = success_rate(&next);
    next
}
