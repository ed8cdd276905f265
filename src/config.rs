//! Game configuration.
//!
//! Everything here has a sensible default, so an empty JSON object (or no
//! config file at all) yields the classic six-guess game.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Guesses allowed per game.
pub const DEFAULT_MAX_CHALLENGES: u8 = 6;

/// Message shown when the hard-mode gate refuses a change.
pub const HARD_MODE_ALERT_MESSAGE: &str = "Hard Mode can be enabled only at the start!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of guesses a player gets. Sizes the win distribution.
    pub max_challenges: u8,

    /// Shown through the notifier when hard mode cannot be toggled.
    pub hard_mode_alert_message: String,

    /// Platform dark-mode preference, used when no theme has been stored yet.
    pub prefers_dark_mode: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_challenges: DEFAULT_MAX_CHALLENGES,
            hard_mode_alert_message: HARD_MODE_ALERT_MESSAGE.to_string(),
            prefers_dark_mode: false,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            max_challenges = config.max_challenges,
            "loaded game config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_challenges == 0 {
            return Err(Error::InvalidConfig(
                "max_challenges must be at least 1".to_string(),
            ));
        }
        if self.hard_mode_alert_message.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "hard_mode_alert_message must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
