//! Word-Game State Library
//!
//! This crate holds the shared state for a single session of a word-guessing
//! game: theme preferences, the hard-mode setting, the guesses and end-of-game
//! flags of the current game, cumulative statistics, and dialog visibility.
//!
//! # Overview
//!
//! - **Store** - One root value, replaced wholesale on every update, with
//!   subscriptions that only fire when the part they watch changes.
//!
//! - **Scoped updaters** - Write handles narrowed to one field, composable
//!   down the tree and comparable by identity.
//!
//! - **Hard-mode gate** - Hard mode changes only once the game is under way
//!   or when it was left on by an earlier session.
//!
//! - **Statistics** - A pure aggregate folded once per finished game and
//!   persisted after every change.
//!
//! - **Row feedback** - The row "jiggle" lasts exactly as long as the alert
//!   that explains it.
//!
//! # Design Principles
//!
//! 1. **Write, then reflect** - Preference changes reach storage before state;
//!    a failed write leaves state untouched and is returned to the caller.
//!
//! 2. **Collaborators behind traits** - Storage ([`storage::PreferenceStore`])
//!    and alerts ([`notify::Notifier`]) are injected, never global.
//!
//! 3. **Single-threaded** - Everything runs on the UI thread; `Rc` and
//!    `RefCell` throughout, no locks.
//!
//! No guess validation lives here. Whatever checks words calls
//! [`GlobalStore::add_guess`] and friends.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use wordle_state::config::GameConfig;
//! use wordle_state::notify::QueuedNotifier;
//! use wordle_state::storage::{MemoryBackend, Preferences};
//! use wordle_state::{GlobalStore, HardModeChange, RowClass};
//!
//! let config = GameConfig::default();
//! let prefs = Rc::new(Preferences::new(MemoryBackend::new(), &config));
//! let alerts = Rc::new(QueuedNotifier::new());
//! let store = GlobalStore::new(config, prefs, alerts.clone())?;
//!
//! // Hard mode cannot be switched on from a fresh start
//! assert_eq!(store.set_hard_mode(true)?, HardModeChange::Rejected);
//! alerts.dismiss();
//!
//! // An invalid guess shakes the row until its alert is dismissed
//! store.toggle_current_row_class_jiggle("Not in word list");
//! assert_eq!(store.state().game.current_row_class, RowClass::Jiggle);
//! alerts.dismiss();
//! assert_eq!(store.state().game.current_row_class, RowClass::None);
//!
//! // Won on the fourth guess
//! let stats = store.add_stats_complete_game(4)?;
//! assert_eq!(stats.wins_in(4), 1);
//! assert_eq!(stats.current_streak, 1);
//! # Ok::<(), wordle_state::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod notify;
pub mod state;
pub mod storage;

pub use error::{Error, Result};

// Re-export everything from state module at crate root
pub use state::*;
