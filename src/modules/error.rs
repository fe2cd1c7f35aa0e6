use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::modules::ability::AbilityKind;
use crate::modules::actor::ActorId;
use crate::modules::grid::GridPos;

/// Failures of collaborator-facing engine calls (spawning, input routing).
/// Moves never fail this way; see `RejectReason`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("actor {0} does not take input")]
    NotControlled(ActorId),

    #[error("position {0} is outside the grid")]
    OutOfBounds(GridPos),

    #[error("position {position} is already held by {occupant}")]
    CellOccupied { position: GridPos, occupant: ActorId },

    #[error("no controlled actor in the world")]
    NoControlledActor,

    #[error("pursuers cannot carry the {0} ability")]
    UnsupportedPursuerAbility(AbilityKind),
}

/// Startup failures; a session that hits one never ticks.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("no grid was provided")]
    MissingGrid,

    #[error("no clock was provided")]
    MissingClock,

    #[error("tick interval must be a positive number of seconds, got {0}")]
    InvalidTickInterval(f32),

    #[error("initial placement failed: {0}")]
    Placement(#[from] EngineError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("level has no rows")]
    Empty,

    #[error("unknown tile {tile:?} at line {line}, column {column}")]
    UnknownTile {
        tile: char,
        line: usize,
        column: usize,
    },

    #[error("second player start at line {line}, column {column}")]
    DuplicatePlayer { line: usize, column: usize },
}
