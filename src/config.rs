//! Tunable constants of the game loop and their RON config file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every constant the controller reads. Lengths are logical play-area pixels,
/// speeds are pixels per physics tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    pub arena_width: f64,
    pub arena_height: f64,
    pub bird_x: f64,
    pub bird_width: f64,
    pub bird_height: f64,
    pub gravity: f64,
    /// Overwrites the bird's velocity on a jump; negative is upward.
    pub jump_velocity: f64,
    pub pipe_speed: f64,
    pub pipe_width: f64,
    pub gap_size: f64,
    /// Minimum distance between the gap and the ceiling or floor.
    pub gap_margin: f64,
    pub tick_interval_ms: u64,
    pub spawn_interval_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: 400.0,
            arena_height: 600.0,
            bird_x: 50.0,
            bird_width: 40.0,
            bird_height: 30.0,
            gravity: 0.5,
            jump_velocity: -8.0,
            pipe_speed: 2.0,
            pipe_width: 60.0,
            gap_size: 150.0,
            gap_margin: 50.0,
            tick_interval_ms: 20,
            spawn_interval_ms: 2000,
        }
    }
}

impl Tuning {
    /// Reads a RON file; fields it leaves out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning: Tuning = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tuning.validate()?;
        tracing::info!(path = %path.display(), "loaded tuning");
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("bird_width", self.bird_width),
            ("bird_height", self.bird_height),
            ("gravity", self.gravity),
            ("pipe_speed", self.pipe_speed),
            ("pipe_width", self.pipe_width),
            ("gap_size", self.gap_size),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        if !(self.jump_velocity.is_finite() && self.jump_velocity < 0.0) {
            return Err(invalid(
                "jump_velocity",
                format!("must be negative (upward), got {}", self.jump_velocity),
            ));
        }
        if !(self.gap_margin.is_finite() && self.gap_margin >= 0.0) {
            return Err(invalid("gap_margin", "must not be negative".to_string()));
        }
        if self.spawn_range() < 1.0 {
            return Err(invalid(
                "gap_size",
                format!(
                    "gap of {} with margins of {} leaves no room in an arena {} high",
                    self.gap_size, self.gap_margin, self.arena_height
                ),
            ));
        }
        if self.bird_height >= self.arena_height {
            return Err(invalid("bird_height", "bird taller than the arena".to_string()));
        }
        if !self.bird_x.is_finite()
            || self.bird_x < 0.0
            || self.bird_x + self.bird_width > self.arena_width
        {
            return Err(invalid("bird_x", "bird outside the arena".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be non-zero".to_string()));
        }
        if self.spawn_interval_ms == 0 {
            return Err(invalid("spawn_interval_ms", "must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Width of the range the gap's top offset is drawn from.
    pub fn spawn_range(&self) -> f64 {
        self.arena_height - self.gap_size - 2.0 * self.gap_margin
    }

    /// Lowest bird position that still counts as airborne.
    pub fn floor(&self) -> f64 {
        self.arena_height - self.bird_height
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
