//! Gameplay settings and the hard-mode gate.
//!
//! Hard mode may change only when the session already has guesses on the
//! board, or when a previous session left it switched on in storage. Anything
//! else is refused with a notification; the state is not touched.

use serde::Serialize;
use tracing::{debug, warn};

use super::store::{Key, Updater};
use super::{AppState, GlobalStore};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub is_hard_mode: bool,
}

impl Settings {
    pub fn key() -> Key<AppState, Self> {
        Key::new("settings", |s| &s.settings, |s| &mut s.settings)
    }

    pub fn hard_mode_key() -> Key<Self, bool> {
        Key::new("is_hard_mode", |s| &s.is_hard_mode, |s| &mut s.is_hard_mode)
    }
}

/// What the gate did with a hard-mode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardModeChange {
    /// Stored and reflected in state.
    Applied,
    /// Refused; the user was notified.
    Rejected,
}

impl GlobalStore {
    pub fn settings_updater(&self) -> Updater<Settings> {
        self.updater().project(Settings::key())
    }

    /// Whether the gate would currently let hard mode change.
    pub fn can_change_hard_mode(&self) -> bool {
        !self.state().game.guesses.is_empty() || self.preferences.stored_hard_mode()
    }

    /// Request a hard-mode change through the gate.
    ///
    /// A refusal is reported to the player through the notifier and returned
    /// as [`HardModeChange::Rejected`], never as an error. Errors are storage
    /// failures only, in which case the state is unchanged.
    pub fn set_hard_mode(&self, requested: bool) -> Result<HardModeChange> {
        if !self.can_change_hard_mode() {
            warn!(requested, "hard mode change refused");
            self.notifier.show_error(&self.config.hard_mode_alert_message, None);
            return Ok(HardModeChange::Rejected);
        }

        self.preferences.set_stored_hard_mode(requested)?;
        self.settings_updater()
            .project(Settings::hard_mode_key())
            .set(requested);
        debug!(requested, "hard mode set");
        Ok(HardModeChange::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HARD_MODE_ALERT_MESSAGE;
    use crate::state::test_support::harness;
    use crate::storage::PreferenceStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejected_without_guesses_or_stored_flag() {
        let h = harness(&[]);
        let before = h.store.state();

        let change = h.store.set_hard_mode(true).unwrap();

        assert_eq!(change, HardModeChange::Rejected);
        assert_eq!(*h.store.state(), *before);
        assert!(!h.prefs.stored_hard_mode());
        assert_eq!(h.alerts.messages(), vec![HARD_MODE_ALERT_MESSAGE]);
    }

    #[test]
    fn test_same_value_is_not_special_cased() {
        let h = harness(&[]);

        let change = h.store.set_hard_mode(false).unwrap();

        assert_eq!(change, HardModeChange::Rejected);
        assert_eq!(h.alerts.len(), 1);
    }

    #[test]
    fn test_stored_flag_allows_change_without_guesses() {
        let h = harness(&[("gameMode", "hard")]);

        assert_eq!(h.store.set_hard_mode(true).unwrap(), HardModeChange::Applied);
        assert!(h.store.state().settings.is_hard_mode);

        assert_eq!(h.store.set_hard_mode(false).unwrap(), HardModeChange::Applied);
        assert!(!h.store.state().settings.is_hard_mode);
        assert!(!h.prefs.stored_hard_mode());
        assert!(h.alerts.is_empty());
    }

    #[test]
    fn test_guesses_allow_change() {
        let h = harness(&[]);
        h.store.add_guess("crane");

        assert_eq!(h.store.set_hard_mode(true).unwrap(), HardModeChange::Applied);
        assert!(h.store.state().settings.is_hard_mode);
        assert!(h.prefs.stored_hard_mode());
        assert!(h.alerts.is_empty());
    }

    #[test]
    fn test_custom_alert_message() {
        let mut h = harness(&[]);
        h.store.config.hard_mode_alert_message = "Not now".to_string();

        h.store.set_hard_mode(true).unwrap();
        assert_eq!(h.alerts.current().as_deref(), Some("Not now"));
    }

    #[test]
    fn test_storage_failure_keeps_state() {
        let h = harness(&[("gameMode", "hard")]);
        h.fail_writes();

        assert!(h.store.set_hard_mode(false).is_err());
        assert!(h.store.state().settings.is_hard_mode);
        assert!(h.alerts.is_empty());
    }

    #[test]
    fn test_gate_leaves_other_branches() {
        let h = harness(&[("gameMode", "hard")]);
        h.store.toggle_settings_modal();
        h.store.set_dark_mode(true).unwrap();

        h.store.set_hard_mode(false).unwrap();

        let state = h.store.state();
        assert!(state.modals.is_settings_modal_open);
        assert!(state.theming.is_dark_mode);
    }
}
