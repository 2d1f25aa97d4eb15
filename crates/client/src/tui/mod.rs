mod screens;

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, MouseButton,
    MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::Line;

use umbra::{Framebuffer, Key};

pub use screens::{FramebufferView, status_line};

/// Without release events a held key is let go after this long without a repeat.
const KEY_HOLD: Duration = Duration::from_millis(500);
/// Mouse units per terminal column of pointer motion.
const MOUSE_COLUMN_STEP: f32 = 6.0;
/// Mouse units per arrow key press.
const TURN_STEP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    Join,
    ToggleReady,
    Key(Key, bool),
    Turn(f32),
    Fire,
    FocusLost,
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    release_events: bool,
    held: HashMap<Key, Instant>,
    last_mouse_column: Option<u16>,
    status: Line<'static>,
    mouse_captured: bool,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange, cursor::Hide)?;

        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            release_events,
            held: HashMap::new(),
            last_mouse_column: None,
            status: Line::default(),
            mouse_captured: false,
        })
    }

    pub fn set_status(&mut self, status: Line<'static>) {
        self.status = status;
    }

    pub fn draw(&mut self, framebuffer: &Framebuffer) -> io::Result<()> {
        let status = self.status.clone();
        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            frame.render_widget(FramebufferView { framebuffer }, chunks[0]);
            frame.render_widget(status, chunks[1]);
        })?;
        Ok(())
    }

    pub fn set_mouse_capture(&mut self, capture: bool) -> io::Result<()> {
        if capture == self.mouse_captured {
            return Ok(());
        }
        if capture {
            execute!(self.terminal.backend_mut(), EnableMouseCapture)?;
        } else {
            execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        }
        self.mouse_captured = capture;
        self.last_mouse_column = None;
        Ok(())
    }

    /// Drains pending terminal events without blocking.
    pub fn poll(&mut self) -> io::Result<Vec<Action>> {
        let mut actions = Vec::new();
        while event::poll(Duration::ZERO)? {
            let action = match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        let dx = self
                            .last_mouse_column
                            .map_or(0, |last| mouse.column as i32 - last as i32);
                        self.last_mouse_column = Some(mouse.column);
                        Action::Turn(dx as f32 * MOUSE_COLUMN_STEP)
                    }
                    MouseEventKind::Down(MouseButton::Left) => Action::Fire,
                    _ => Action::None,
                },
                Event::FocusLost => Action::FocusLost,
                _ => Action::None,
            };
            if action != Action::None {
                actions.push(action);
            }
        }

        actions.extend(self.expire_keys(Instant::now()));
        Ok(actions)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        let pressed = match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => true,
            KeyEventKind::Release => false,
        };

        let game_key = match key.code {
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'w' => Key::Forward,
                's' => Key::Backward,
                'a' => Key::Left,
                'd' => Key::Right,
                'p' => Key::Pause,
                'q' if pressed => return Action::Quit,
                'j' if pressed => return Action::Join,
                'r' if pressed => return Action::ToggleReady,
                ' ' if pressed => return Action::Fire,
                other => Key::Other(other as u32),
            },
            KeyCode::Esc => Key::Escape,
            KeyCode::Left if pressed => return Action::Turn(-TURN_STEP),
            KeyCode::Right if pressed => return Action::Turn(TURN_STEP),
            _ => return Action::None,
        };

        if pressed {
            // legacy terminals report repeats as fresh presses
            if self.held.insert(game_key, Instant::now()).is_some() {
                return Action::None;
            }
        } else {
            self.held.remove(&game_key);
        }
        Action::Key(game_key, pressed)
    }

    fn expire_keys(&mut self, now: Instant) -> Vec<Action> {
        if self.release_events {
            return Vec::new();
        }

        let expired: Vec<Key> = self
            .held
            .iter()
            .filter(|(_, pressed_at)| now.duration_since(**pressed_at) > KEY_HOLD)
            .map(|(key, _)| *key)
            .collect();

        expired
            .into_iter()
            .map(|key| {
                self.held.remove(&key);
                Action::Key(key, false)
            })
            .collect()
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        if self.release_events {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            DisableFocusChange,
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.restore_terminal() {
            eprintln!("Failed to restore terminal: {e}");
        }
    }
}
