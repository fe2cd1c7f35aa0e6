pub mod modules;

pub use modules::ability::{AbilityKind, Direction};
pub use modules::actor::{Actor, ActorId, ActorKind, Role};
pub use modules::clock::{BacklogPolicy, Clock};
pub use modules::config::{DEFAULT_CONFIG_PATH, GameConfig};
pub use modules::engine::{
    DEFAULT_SPRITE_BASE_ANGLE, Engine, Event, MoveRejection, RejectReason, TickResult,
};
pub use modules::error::{ConfigError, EngineError, LevelError, SetupError};
pub use modules::grid::{Cell, Grid, GridPos, TileKind, WorldPos};
pub use modules::input::{
    Controls, DEFAULT_BUFFER_CAPACITY, InputBuffer, MovementPattern, Vote, expand, tally,
};
pub use modules::level::Level;
pub use modules::session::{
    DEFAULT_TARGET_SURVIVAL_TICKS, Outcome, Session, SessionBuilder, TickListener,
};
pub use modules::spawn::{
    DEFAULT_WARNING_TICKS, Prefab, ScheduleAction, SpawnEntry, SpawnSchedule,
};
pub use modules::view::{ActorSnapshot, ArrowLevels, WorldSnapshot};
