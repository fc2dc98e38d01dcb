use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    AGENT_SPEED, COLLISION_DISTANCE, COUNTDOWN_SECONDS, DEFAULT_MODE_SCHEDULE, DEFAULT_SEED,
    EVASION_SECONDS, GHOST_EVASION_SPEED, GHOST_RECOVERY_SPEED, GHOST_SCORE, GHOST_SPEED,
    MAX_DELTA_SECONDS, PELLET_SCORE, POWER_PELLET_SCORE, RECOVERY_HOLD_SECONDS, STARTING_LIVES,
};
use crate::error::ConfigError;
use crate::types::GhostMode;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ModeEntry {
    pub mode: GhostMode,
    /// `None` keeps this entry active for the rest of the round.
    pub seconds: Option<f32>,
}

pub fn default_mode_schedule() -> Vec<ModeEntry> {
    DEFAULT_MODE_SCHEDULE
        .iter()
        .map(|&(mode, seconds)| ModeEntry { mode, seconds })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchOptions {
    pub starting_lives: u32,
    pub countdown_seconds: f32,
    pub evasion_seconds: f32,
    pub recovery_hold_seconds: f32,
    pub agent_speed: f32,
    pub ghost_speed: f32,
    pub ghost_evasion_speed: f32,
    pub ghost_recovery_speed: f32,
    pub collision_distance: f32,
    pub max_delta_seconds: f32,
    pub pellet_score: u32,
    pub power_pellet_score: u32,
    pub ghost_score: u32,
    pub mode_schedule: Vec<ModeEntry>,
    pub seed: u64,
    pub layout: Option<Vec<String>>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            countdown_seconds: COUNTDOWN_SECONDS,
            evasion_seconds: EVASION_SECONDS,
            recovery_hold_seconds: RECOVERY_HOLD_SECONDS,
            agent_speed: AGENT_SPEED,
            ghost_speed: GHOST_SPEED,
            ghost_evasion_speed: GHOST_EVASION_SPEED,
            ghost_recovery_speed: GHOST_RECOVERY_SPEED,
            collision_distance: COLLISION_DISTANCE,
            max_delta_seconds: MAX_DELTA_SECONDS,
            pellet_score: PELLET_SCORE,
            power_pellet_score: POWER_PELLET_SCORE,
            ghost_score: GHOST_SCORE,
            mode_schedule: default_mode_schedule(),
            seed: DEFAULT_SEED,
            layout: None,
        }
    }
}

impl MatchOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: MatchOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_lives == 0 {
            return Err(invalid("startingLives must be at least 1"));
        }
        let positive = [
            ("countdownSeconds", self.countdown_seconds),
            ("evasionSeconds", self.evasion_seconds),
            ("agentSpeed", self.agent_speed),
            ("ghostSpeed", self.ghost_speed),
            ("ghostEvasionSpeed", self.ghost_evasion_speed),
            ("ghostRecoverySpeed", self.ghost_recovery_speed),
            ("collisionDistance", self.collision_distance),
            ("maxDeltaSeconds", self.max_delta_seconds),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(&format!("{name} must be positive, got {value}")));
            }
        }
        if !self.recovery_hold_seconds.is_finite() || self.recovery_hold_seconds < 0.0 {
            return Err(invalid("recoveryHoldSeconds must not be negative"));
        }
        if self.ghost_recovery_speed <= self.ghost_speed {
            return Err(invalid("ghostRecoverySpeed must exceed ghostSpeed"));
        }
        if self.ghost_evasion_speed >= self.ghost_speed {
            return Err(invalid("ghostEvasionSpeed must be below ghostSpeed"));
        }
        if self.mode_schedule.is_empty() {
            return Err(invalid("modeSchedule must have at least one entry"));
        }
        let last = self.mode_schedule.len() - 1;
        for (idx, entry) in self.mode_schedule.iter().enumerate() {
            match entry.seconds {
                Some(seconds) if !seconds.is_finite() || seconds <= 0.0 => {
                    return Err(invalid(&format!(
                        "modeSchedule[{idx}] must last a positive time"
                    )));
                }
                None if idx != last => {
                    return Err(invalid(&format!(
                        "modeSchedule[{idx}] is unbounded but not the last entry"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
