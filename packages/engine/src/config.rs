//! Engine configuration with environment overrides.
//!
//! Every knob has a sensible default; `CARDROOM_*` variables override
//! individual values. House rules are per-room configuration and live in
//! [`crate::domain::rules::HouseRules`], not here.

use std::env;
use std::time::Duration;

use crate::errors::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cards dealt to each player at the start of a round.
    pub starting_hand_size: usize,
    /// Forced draws for failing to declare a low hand in time.
    pub low_hand_penalty: u8,
    /// Extra cards (on top of the pending draw) for losing a
    /// wild-draw-four challenge.
    pub challenge_loss_penalty: u8,
    /// Cumulative score that ends the game. `0` means a single round.
    pub winning_score: u32,
    /// Deal the next round immediately after a round ends instead of
    /// returning the room to the lobby.
    pub auto_redeal: bool,
    /// Upper bound on waiting for a room's exclusion slot.
    pub lock_timeout: Duration,
    /// Inactivity grace before the timer collaborator skips a turn.
    pub turn_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_hand_size: 7,
            low_hand_penalty: 2,
            challenge_loss_penalty: 2,
            winning_score: 500,
            auto_redeal: false,
            lock_timeout: Duration::from_secs(5),
            turn_grace: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Build a config from the environment, falling back to defaults for
    /// unset variables. Malformed values are reported, never ignored.
    pub fn from_env() -> Result<Self, EngineError> {
        let defaults = Self::default();
        Ok(Self {
            starting_hand_size: parsed_var(
                "CARDROOM_STARTING_HAND_SIZE",
                defaults.starting_hand_size,
            )?,
            low_hand_penalty: parsed_var("CARDROOM_LOW_HAND_PENALTY", defaults.low_hand_penalty)?,
            challenge_loss_penalty: parsed_var(
                "CARDROOM_CHALLENGE_LOSS_PENALTY",
                defaults.challenge_loss_penalty,
            )?,
            winning_score: parsed_var("CARDROOM_WINNING_SCORE", defaults.winning_score)?,
            auto_redeal: parsed_var("CARDROOM_AUTO_REDEAL", defaults.auto_redeal)?,
            lock_timeout: Duration::from_millis(parsed_var(
                "CARDROOM_LOCK_TIMEOUT_MS",
                defaults.lock_timeout.as_millis() as u64,
            )?),
            turn_grace: Duration::from_millis(parsed_var(
                "CARDROOM_TURN_GRACE_MS",
                defaults.turn_grace.as_millis() as u64,
            )?),
        })
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, EngineError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EngineError::validation(format!("{name} has invalid value: '{raw}'"))),
        Err(_) => Ok(default),
    }
}
