use crate::render::{ALPHA_DIMMED, ALPHA_OPAQUE};

/// What the client is showing. Each variant decides how ticks and input
/// events are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    Error,
    #[default]
    Menu,
    Loading,
    Waiting,
    Playing,
    Paused,
    /// `dead` is false when the game ended because everyone else left.
    Over { dead: bool },
}

impl View {
    pub fn alpha(self) -> u8 {
        match self {
            View::Waiting | View::Paused => ALPHA_DIMMED,
            _ => ALPHA_OPAQUE,
        }
    }

    /// Views that draw the game world.
    pub fn shows_world(self) -> bool {
        matches!(
            self,
            View::Waiting | View::Playing | View::Paused | View::Over { .. }
        )
    }

    pub fn shows_hud(self) -> bool {
        matches!(self, View::Playing | View::Paused)
    }
}
