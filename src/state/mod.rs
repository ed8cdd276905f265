//! State management for the game session.
//!
//! - `store` - generic container, scoped updaters, selective subscriptions
//! - `theming` - dark mode and high contrast
//! - `settings` - hard mode and the gate that guards it
//! - `game` - guesses, end-of-game flags, row feedback, stats
//! - `modals` - info/stats/settings dialog visibility
//! - `stats` - the statistics aggregate
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         GlobalStore                          │
//! │                                                              │
//! │   Store<AppState> ─── snapshot() / subscribe(select, cb)     │
//! │        │                                                     │
//! │        ├── theming   { is_dark_mode, is_high_contrast_mode } │
//! │        ├── settings  { is_hard_mode }                        │
//! │        ├── game      { current_row_class, guesses, stats,    │
//! │        │               is_game_won, is_game_lost,            │
//! │        │               is_revealing }                        │
//! │        └── modals    { info, stats, settings }               │
//! │                                                              │
//! │   PreferenceStore ◀── write-through on every setting change  │
//! │   Notifier        ◀── hard-mode rejections, row feedback     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The operations themselves live next to the branch they touch, as
//! `impl GlobalStore` blocks in each submodule.

pub mod game;
pub mod modals;
pub mod settings;
pub mod stats;
pub mod store;
pub mod theming;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::info;

use crate::config::GameConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::storage::PreferenceStore;

pub use game::{GameBranch, RowClass};
pub use modals::Modals;
pub use settings::{HardModeChange, Settings};
pub use stats::{add_stats_for_completed_game, success_rate, GameOutcome, GameStats};
pub use store::{Key, Store, Subscription, Update, Updater};
pub use theming::Theming;

/// The whole session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub theming: Theming,
    pub settings: Settings,
    pub game: GameBranch,
    pub modals: Modals,
}

impl AppState {
    /// Seed a fresh session from stored preferences.
    pub fn load(preferences: &dyn PreferenceStore, config: &GameConfig) -> Self {
        Self {
            theming: Theming {
                is_dark_mode: preferences.initial_dark_mode(),
                is_high_contrast_mode: preferences.initial_high_contrast(),
            },
            settings: Settings {
                is_hard_mode: preferences.stored_hard_mode(),
            },
            game: GameBranch::new(preferences.load_stats().normalized(config.max_challenges)),
            modals: Modals::default(),
        }
    }

    /// JSON snapshot for UI bridges.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Session-wide state plus the collaborators its operations need.
///
/// Cloning shares the same underlying state; hand a clone to every event
/// handler that needs one.
#[derive(Clone)]
pub struct GlobalStore {
    store: Store<AppState>,
    preferences: Rc<dyn PreferenceStore>,
    notifier: Rc<dyn Notifier>,
    config: GameConfig,
    /// Row-jiggle notifications shown but not yet dismissed.
    pending_jiggles: Rc<Cell<usize>>,
}

impl GlobalStore {
    /// Create the session store.
    ///
    /// `config` is the only source of the guess limit: stored stats are
    /// resized to `config.max_challenges` whatever the preference adapter was
    /// built with. An invalid config is rejected.
    pub fn new(
        config: GameConfig,
        preferences: Rc<dyn PreferenceStore>,
        notifier: Rc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;
        let initial = AppState::load(&*preferences, &config);
        info!(
            dark_mode = initial.theming.is_dark_mode,
            high_contrast = initial.theming.is_high_contrast_mode,
            hard_mode = initial.settings.is_hard_mode,
            total_games = initial.game.stats.total_games,
            "session state created"
        );

        Ok(Self {
            store: Store::new(initial),
            preferences,
            notifier,
            config,
            pending_jiggles: Rc::new(Cell::new(0)),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current state snapshot.
    pub fn state(&self) -> Rc<AppState> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &Store<AppState> {
        &self.store
    }

    /// See [`Store::subscribe`].
    pub fn subscribe<T, F, C>(&self, select: F, on_change: C) -> Subscription
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&AppState) -> T + 'static,
        C: Fn(&T) + 'static,
    {
        self.store.subscribe(select, on_change)
    }

    /// Root updater.
    pub fn updater(&self) -> Updater<AppState> {
        self.store.updater()
    }
}

impl fmt::Debug for GlobalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalStore")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("pending_jiggles", &self.pending_jiggles.get())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::harness;
    use super::*;
    use crate::error::Error;
    use crate::notify::QueuedNotifier;
    use crate::storage::{MemoryBackend, Preferences};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initial_state_from_preferences() {
        let stats = r#"{"winDistribution":[0,1,0,0,0,0],"gamesFailed":0,"currentStreak":1,"bestStreak":1,"totalGames":1,"successRate":100}"#;
        let h = harness(&[
            ("theme", "dark"),
            ("highContrast", "1"),
            ("gameMode", "hard"),
            ("gameStats", stats),
        ]);

        let state = h.store.state();
        assert!(state.theming.is_dark_mode);
        assert!(state.theming.is_high_contrast_mode);
        assert!(state.settings.is_hard_mode);
        assert_eq!(state.game.stats.wins_in(2), 1);
        assert_eq!(state.game.current_row_class, RowClass::None);
        assert!(state.game.guesses.is_empty());
        assert_eq!(state.modals, Modals::default());
    }

    #[test]
    fn test_initial_state_defaults() {
        let h = harness(&[]);
        let state = h.store.state();
        assert_eq!(state.theming, Theming::default());
        assert!(!state.settings.is_hard_mode);
        assert_eq!(state.game.stats, GameStats::new(6));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let prefs = Rc::new(Preferences::new(MemoryBackend::new(), &GameConfig::default()));
        let config = GameConfig {
            max_challenges: 0,
            ..GameConfig::default()
        };

        let err = GlobalStore::new(config, prefs, Rc::new(QueuedNotifier::new())).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_store_config_sizes_stats() {
        let prefs = Rc::new(Preferences::new(MemoryBackend::new(), &GameConfig::default()));
        let config = GameConfig {
            max_challenges: 4,
            ..GameConfig::default()
        };

        let store = GlobalStore::new(config, prefs, Rc::new(QueuedNotifier::new())).unwrap();
        assert_eq!(store.state().game.stats.win_distribution.len(), 4);

        let after_loss = store.add_stats_complete_game(5).unwrap();
        assert_eq!(after_loss.games_failed, 1);
    }

    #[test]
    fn test_to_json_layout() {
        let h = harness(&[]);
        let json = h.store.state().to_json();

        assert_eq!(json["theming"]["isDarkMode"], false);
        assert_eq!(json["settings"]["isHardMode"], false);
        assert_eq!(json["game"]["currentRowClass"], "");
        assert_eq!(json["game"]["guesses"], serde_json::json!([]));
        assert_eq!(json["game"]["stats"]["totalGames"], 0);
        assert_eq!(json["modals"]["isInfoModalOpen"], false);
    }

    #[test]
    fn test_clones_share_state() {
        let h = harness(&[]);
        let handle = h.store.clone();

        handle.toggle_info_modal();
        assert!(h.store.state().modals.is_info_modal_open);
    }

    #[test]
    fn test_subscription_tracks_one_branch() {
        let h = harness(&[]);
        let theming_changes = Rc::new(Cell::new(0));

        let seen = Rc::clone(&theming_changes);
        let _sub = h
            .store
            .subscribe(|s: &AppState| s.theming, move |_| seen.set(seen.get() + 1));

        h.store.toggle_stats_modal();
        h.store.add_guess("crane");
        assert_eq!(theming_changes.get(), 0);

        h.store.set_dark_mode(true).unwrap();
        assert_eq!(theming_changes.get(), 1);
    }
}
