use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Turn(Direction),
    TogglePause,
    Restart,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => KeyAction::Turn(Direction::Up),
            KeyCode::Down => KeyAction::Turn(Direction::Down),
            KeyCode::Left => KeyAction::Turn(Direction::Left),
            KeyCode::Right => KeyAction::Turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Turn(Direction::Right),

            // Controls
            KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::TogglePause,
            KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
