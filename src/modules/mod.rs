pub mod ability;
pub mod actor;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod input;
pub mod level;
mod player;
mod pursuer;
pub mod session;
pub mod spawn;
pub mod view;
