//! Theme preferences.

use serde::Serialize;
use tracing::debug;

use super::store::{Key, Updater};
use super::{AppState, GlobalStore};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theming {
    pub is_dark_mode: bool,
    pub is_high_contrast_mode: bool,
}

impl Theming {
    pub fn key() -> Key<AppState, Self> {
        Key::new("theming", |s| &s.theming, |s| &mut s.theming)
    }

    pub fn dark_mode_key() -> Key<Self, bool> {
        Key::new("is_dark_mode", |t| &t.is_dark_mode, |t| &mut t.is_dark_mode)
    }

    pub fn high_contrast_key() -> Key<Self, bool> {
        Key::new(
            "is_high_contrast_mode",
            |t| &t.is_high_contrast_mode,
            |t| &mut t.is_high_contrast_mode,
        )
    }
}

impl GlobalStore {
    pub fn theming_updater(&self) -> Updater<Theming> {
        self.updater().project(Theming::key())
    }

    /// Store the dark-mode preference, then reflect it in state.
    ///
    /// If the write fails the state is left as it was.
    pub fn set_dark_mode(&self, value: bool) -> Result<()> {
        self.preferences.set_stored_dark_mode(value)?;
        self.theming_updater()
            .project(Theming::dark_mode_key())
            .set(value);
        debug!(value, "dark mode set");
        Ok(())
    }

    /// Store the high-contrast preference, then reflect it in state.
    pub fn set_high_contrast_mode(&self, value: bool) -> Result<()> {
        self.preferences.set_stored_high_contrast_mode(value)?;
        self.theming_updater()
            .project(Theming::high_contrast_key())
            .set(value);
        debug!(value, "high contrast set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::harness;
    use crate::storage::PreferenceStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_dark_mode_writes_through() {
        let h = harness(&[]);

        h.store.set_dark_mode(true).unwrap();

        assert!(h.store.state().theming.is_dark_mode);
        assert!(h.prefs.initial_dark_mode());
        assert!(!h.store.state().theming.is_high_contrast_mode);
    }

    #[test]
    fn test_set_high_contrast_keeps_dark_mode() {
        let h = harness(&[("theme", "dark")]);

        h.store.set_high_contrast_mode(true).unwrap();

        assert_eq!(
            h.store.state().theming,
            Theming {
                is_dark_mode: true,
                is_high_contrast_mode: true,
            }
        );
        assert!(h.prefs.initial_high_contrast());
    }

    #[test]
    fn test_failed_write_leaves_state() {
        let h = harness(&[]);
        h.fail_writes();

        assert!(h.store.set_dark_mode(true).is_err());
        assert!(h.store.set_high_contrast_mode(true).is_err());
        assert_eq!(h.store.state().theming, Theming::default());
    }

    #[test]
    fn test_updater_identity() {
        let h = harness(&[]);
        assert_eq!(h.store.theming_updater(), h.store.theming_updater());
        assert_eq!(h.store.theming_updater().path(), "theming");
    }
}
