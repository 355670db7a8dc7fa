use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::{Action, Direction};

/// Maps terminal key events to game actions
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Translate a key event. Releases and repeats yield `None`; every other
    /// key press maps to an action.
    pub fn handle_key_event(&self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        let action = match key.code {
            // Movement - Arrow keys
            KeyCode::Up => Action::Turn(Direction::Up),
            KeyCode::Down => Action::Turn(Direction::Down),
            KeyCode::Left => Action::Turn(Direction::Left),
            KeyCode::Right => Action::Turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Action::Turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Action::Turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Action::Turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Action::Turn(Direction::Right),

            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,

            _ => Action::Other,
        };

        Some(action)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
