//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The terminal front end in `modes` drives it one tick at a time.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{ConfigError, GameConfig, Grid};
pub use engine::{GameEngine, GameEvent, TickOutcome};
pub use state::{Food, GamePhase, GameState, Position, Snake};
