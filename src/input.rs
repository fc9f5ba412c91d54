//! Maps terminal events onto game commands.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a run or flap.
    Jump,
    /// The restart control on the game-over panel.
    Restart,
    Quit,
    /// Terminal resized to `cols` x `rows` cells.
    Resize(u16, u16),
}

pub fn command_for(event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Command::Jump),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        },
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Command::Jump),
            _ => None,
        },
        Event::Resize(cols, rows) => Some(Command::Resize(*cols, *rows)),
        _ => None,
    }
}
