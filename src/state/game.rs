//! Game branch: guesses, end-of-game flags, row feedback and stats.
//!
//! # Row jiggle
//!
//! An invalid guess shakes the current row while an alert explains why. The
//! two are tied together:
//!
//! ```text
//!   toggle_current_row_class_jiggle(msg)
//!        │
//!        ├─▶ current_row_class = Jiggle
//!        └─▶ notifier.show_error(msg, on_close)
//!                                     │  (dismissed by user or timer)
//!                                     ▼
//!                       last outstanding jiggle? ──▶ current_row_class = None
//! ```
//!
//! The row is set before the alert is shown, so a notifier that dismisses
//! synchronously still leaves the row cleared. While several jiggle alerts are
//! on screen the row stays shaking until the last of them closes.

use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info};

use super::stats::{add_stats_for_completed_game, GameOutcome, GameStats};
use super::store::{Key, Updater};
use super::{AppState, GlobalStore};
use crate::error::Result;

/// Transient class on the row being typed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RowClass {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "jiggle")]
    Jiggle,
}

impl RowClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Jiggle => "jiggle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameBranch {
    pub current_row_class: RowClass,
    /// Submitted guesses, oldest first. Only ever appended to.
    pub guesses: Vec<String>,
    pub stats: GameStats,
    pub is_game_won: bool,
    pub is_game_lost: bool,
    pub is_revealing: bool,
}

impl Default for GameBranch {
    fn default() -> Self {
        Self::new(GameStats::default())
    }
}

impl GameBranch {
    pub fn new(stats: GameStats) -> Self {
        Self {
            current_row_class: RowClass::None,
            guesses: Vec::new(),
            stats,
            is_game_won: false,
            is_game_lost: false,
            is_revealing: false,
        }
    }

    pub fn key() -> Key<AppState, Self> {
        Key::new("game", |s| &s.game, |s| &mut s.game)
    }

    pub fn current_row_class_key() -> Key<Self, RowClass> {
        Key::new(
            "current_row_class",
            |g| &g.current_row_class,
            |g| &mut g.current_row_class,
        )
    }

    pub fn guesses_key() -> Key<Self, Vec<String>> {
        Key::new("guesses", |g| &g.guesses, |g| &mut g.guesses)
    }

    pub fn stats_key() -> Key<Self, GameStats> {
        Key::new("stats", |g| &g.stats, |g| &mut g.stats)
    }

    pub fn is_game_won_key() -> Key<Self, bool> {
        Key::new("is_game_won", |g| &g.is_game_won, |g| &mut g.is_game_won)
    }

    pub fn is_game_lost_key() -> Key<Self, bool> {
        Key::new("is_game_lost", |g| &g.is_game_lost, |g| &mut g.is_game_lost)
    }

    pub fn is_revealing_key() -> Key<Self, bool> {
        Key::new("is_revealing", |g| &g.is_revealing, |g| &mut g.is_revealing)
    }

    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_over(&self) -> bool {
        self.is_game_won || self.is_game_lost
    }
}

impl GlobalStore {
    pub fn game_updater(&self) -> Updater<GameBranch> {
        self.updater().project(GameBranch::key())
    }

    pub fn current_row_class_updater(&self) -> Updater<RowClass> {
        self.game_updater().project(GameBranch::current_row_class_key())
    }

    pub fn is_game_won_updater(&self) -> Updater<bool> {
        self.game_updater().project(GameBranch::is_game_won_key())
    }

    pub fn is_game_lost_updater(&self) -> Updater<bool> {
        self.game_updater().project(GameBranch::is_game_lost_key())
    }

    pub fn is_revealing_updater(&self) -> Updater<bool> {
        self.game_updater().project(GameBranch::is_revealing_key())
    }

    pub fn set_is_game_won(&self, value: bool) {
        self.is_game_won_updater().set(value);
    }

    pub fn set_is_game_lost(&self, value: bool) {
        self.is_game_lost_updater().set(value);
    }

    pub fn set_is_revealing(&self, value: bool) {
        self.is_revealing_updater().set(value);
    }

    /// Append a submitted guess.
    pub fn add_guess(&self, word: impl Into<String>) {
        let word = word.into();
        debug!(%word, "guess added");
        self.game_updater()
            .project(GameBranch::guesses_key())
            .update(move |guesses: &Vec<String>| {
                let mut next = guesses.clone();
                next.push(word);
                next
            });
    }

    /// Put the current row back to rest.
    pub fn clear_current_row_class(&self) {
        self.current_row_class_updater().set(RowClass::None);
    }

    /// Shake the current row and show `message`.
    ///
    /// The row stops shaking when the notification is dismissed; see the
    /// module docs for how overlapping alerts are handled.
    pub fn toggle_current_row_class_jiggle(&self, message: &str) {
        let row_class = self.current_row_class_updater();
        let pending = Rc::clone(&self.pending_jiggles);

        pending.set(pending.get() + 1);
        row_class.set(RowClass::Jiggle);
        debug!(alert = message, pending = pending.get(), "row jiggle started");

        self.notifier.show_error(
            message,
            Some(Box::new(move || {
                let remaining = pending.get().saturating_sub(1);
                pending.set(remaining);
                if remaining == 0 {
                    row_class.set(RowClass::None);
                    debug!("row jiggle cleared");
                }
            })),
        );
    }

    /// Jiggle alerts shown but not yet dismissed.
    pub fn pending_jiggles(&self) -> usize {
        self.pending_jiggles.get()
    }

    /// Record a finished game and persist the new stats.
    ///
    /// `num_of_guesses` above the configured maximum counts as a loss. The
    /// stats are stored before the state changes; on a storage error the
    /// state keeps the old stats.
    pub fn add_stats_complete_game(&self, num_of_guesses: u32) -> Result<GameStats> {
        let outcome = GameOutcome::from_guess_count(num_of_guesses, self.config.max_challenges)?;
        let next = add_stats_for_completed_game(&self.state().game.stats, outcome);

        self.preferences.save_stats(&next)?;
        self.game_updater()
            .project(GameBranch::stats_key())
            .set(next.clone());

        info!(
            won = outcome.is_win(),
            total_games = next.total_games,
            current_streak = next.current_streak,
            best_streak = next.best_streak,
            "stats updated"
        );
        Ok(next)
    }
}
