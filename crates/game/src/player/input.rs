use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Held movement keys, laid out as on the wire: one byte per key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Keys: u32 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 8;
        const RIGHT = 1 << 16;
        const LEFT = 1 << 24;
    }
}

impl Keys {
    /// Unit (or zero) movement direction for a player facing `facing`.
    pub fn direction(self, facing: Vec2) -> Vec2 {
        let long = self.contains(Self::FORWARD) as i32 - self.contains(Self::BACKWARD) as i32;
        let side = self.contains(Self::RIGHT) as i32 - self.contains(Self::LEFT) as i32;

        let mut dir = Vec2::ZERO;
        if long != 0 {
            dir += facing * long as f32;
        }
        if side != 0 {
            dir += facing.perp() * side as f32;
            if long != 0 {
                dir *= std::f32::consts::FRAC_1_SQRT_2;
            }
        }
        dir
    }
}

/// Keys the core reacts to. Hosts translate their own key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Pause,
    Escape,
    Other(u32),
}

impl Key {
    /// Maps browser-style key codes (W/A/S/D/P/Escape).
    pub fn from_code(code: u32) -> Self {
        match code {
            87 => Key::Forward,
            83 => Key::Backward,
            65 => Key::Left,
            68 => Key::Right,
            80 => Key::Pause,
            27 => Key::Escape,
            other => Key::Other(other),
        }
    }

    pub fn movement_flag(self) -> Option<Keys> {
        match self {
            Key::Forward => Some(Keys::FORWARD),
            Key::Backward => Some(Keys::BACKWARD),
            Key::Left => Some(Keys::LEFT),
            Key::Right => Some(Keys::RIGHT),
            Key::Pause | Key::Escape | Key::Other(_) => None,
        }
    }
}
