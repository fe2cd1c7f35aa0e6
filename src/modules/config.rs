use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::modules::ability::AbilityKind;
use crate::modules::clock::{BacklogPolicy, Clock};
use crate::modules::engine::DEFAULT_SPRITE_BASE_ANGLE;
use crate::modules::error::{ConfigError, SetupError};
use crate::modules::grid::GridPos;
use crate::modules::input::DEFAULT_BUFFER_CAPACITY;
use crate::modules::session::{DEFAULT_TARGET_SURVIVAL_TICKS, SessionBuilder};
use crate::modules::spawn::{SpawnEntry, SpawnSchedule};

pub const DEFAULT_CONFIG_PATH: &str = "maskhunt.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub pursuers: PursuerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub level: LevelConfig,
    #[serde(default)]
    pub spawns: Vec<SpawnEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: f32,
    #[serde(default)]
    pub backlog: BacklogPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub ability: AbilityKind,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PursuerConfig {
    #[serde(default = "default_sprite_base_angle")]
    pub sprite_base_angle: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_target_survival_ticks")]
    pub target_survival_ticks: u64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub origin_x: i32,
    #[serde(default)]
    pub origin_y: i32,
}

fn default_tick_interval() -> f32 {
    0.5
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_sprite_base_angle() -> f32 {
    DEFAULT_SPRITE_BASE_ANGLE
}

fn default_target_survival_ticks() -> u64 {
    DEFAULT_TARGET_SURVIVAL_TICKS
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            backlog: BacklogPolicy::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            ability: AbilityKind::default(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl Default for PursuerConfig {
    fn default() -> Self {
        Self {
            sprite_base_angle: default_sprite_base_angle(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_survival_ticks: default_target_survival_ticks(),
            seed: None,
        }
    }
}

impl LevelConfig {
    pub fn origin(&self) -> GridPos {
        GridPos::new(self.origin_x, self.origin_y)
    }
}

impl GameConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// A missing file means defaults; a broken one is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.clock.tick_interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "clock.tick_interval_secs must be positive, got {interval}"
            )));
        }
        if self.player.buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "player.buffer_capacity must be at least 1".to_string(),
            ));
        }
        if self.session.target_survival_ticks == 0 {
            return Err(ConfigError::Invalid(
                "session.target_survival_ticks must be at least 1".to_string(),
            ));
        }
        if !self.pursuers.sprite_base_angle.is_finite() {
            return Err(ConfigError::Invalid(
                "pursuers.sprite_base_angle must be finite".to_string(),
            ));
        }
        for entry in &self.spawns {
            if entry.tick == 0 {
                return Err(ConfigError::Invalid(
                    "spawns.tick starts at 1".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn clock(&self) -> Result<Clock, SetupError> {
        Clock::new(self.clock.tick_interval_secs, self.clock.backlog)
    }

    pub fn schedule(&self) -> SpawnSchedule {
        SpawnSchedule::new(self.spawns.clone())
    }

    /// Everything but the grid and placements, which come from the level.
    pub fn session_builder(&self) -> Result<SessionBuilder, SetupError> {
        Ok(SessionBuilder::new()
            .clock(self.clock()?)
            .seed(self.session.seed)
            .target_survival_ticks(self.session.target_survival_ticks)
            .schedule(self.schedule())
            .buffer_capacity(self.player.buffer_capacity)
            .sprite_base_angle(self.pursuers.sprite_base_angle)
            .player_ability(self.player.ability))
    }
}
