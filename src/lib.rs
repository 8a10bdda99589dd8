//! Snake Bite - a terminal Snake game
//!
//! This library provides:
//! - Core game logic (game module)
//! - Keyboard input mapping (input module)
//! - TUI rendering (render module)
//! - Optional sound cues (audio module)
//! - Session statistics (metrics module)
//! - The interactive game loop (modes module)

pub mod audio;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
