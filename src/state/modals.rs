//! Dialog visibility. The three flags are independent of each other.

use serde::Serialize;
use tracing::debug;

use super::store::{Key, Updater};
use super::{AppState, GlobalStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modals {
    pub is_info_modal_open: bool,
    pub is_stats_modal_open: bool,
    pub is_settings_modal_open: bool,
}

impl Modals {
    pub fn key() -> Key<AppState, Self> {
        Key::new("modals", |s| &s.modals, |s| &mut s.modals)
    }

    pub fn any_open(&self) -> bool {
        self.is_info_modal_open || self.is_stats_modal_open || self.is_settings_modal_open
    }
}

impl GlobalStore {
    pub fn modals_updater(&self) -> Updater<Modals> {
        self.updater().project(Modals::key())
    }

    pub fn toggle_info_modal(&self) {
        debug!("toggle info modal");
        self.modals_updater().update(|m: &Modals| Modals {
            is_info_modal_open: !m.is_info_modal_open,
            ..*m
        });
    }

    pub fn toggle_stats_modal(&self) {
        debug!("toggle stats modal");
        self.modals_updater().update(|m: &Modals| Modals {
            is_stats_modal_open: !m.is_stats_modal_open,
            ..*m
        });
    }

    pub fn toggle_settings_modal(&self) {
        debug!("toggle settings modal");
        self.modals_updater().update(|m: &Modals| Modals {
            is_settings_modal_open: !m.is_settings_modal_open,
            ..*m
        });
    }
}
