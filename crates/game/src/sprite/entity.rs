use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SpriteKind {
    #[default]
    Player = 0,
    Bullet = 1,
}

impl SpriteKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Player),
            1 => Some(Self::Bullet),
            _ => None,
        }
    }

    /// Collision radius used for dead reckoning and overlap checks.
    pub fn radius(self) -> f32 {
        match self {
            Self::Player => 0.15,
            Self::Bullet => 0.01,
        }
    }
}

/// Identity of a sprite. `field` is kind specific: on destroy it names the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteDesc {
    pub kind: SpriteKind,
    pub id: u8,
    pub owner: u8,
    pub field: u8,
}

impl SpriteDesc {
    pub fn new(kind: SpriteKind, id: u8) -> Self {
        Self {
            kind,
            id,
            owner: id,
            field: 0,
        }
    }

    pub fn to_bits(self) -> u32 {
        self.kind as u32
            | (self.id as u32) << 8
            | (self.owner as u32) << 16
            | (self.field as u32) << 24
    }

    /// `None` if the kind byte is unknown.
    pub fn from_bits(bits: u32) -> Option<Self> {
        Some(Self {
            kind: SpriteKind::from_u8(bits as u8)?,
            id: (bits >> 8) as u8,
            owner: (bits >> 16) as u8,
            field: (bits >> 24) as u8,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpriteTransform {
    pub rotation: f32,
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpriteInit {
    pub desc: SpriteDesc,
    pub transform: SpriteTransform,
}

/// Screen placement computed by the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub screen_x: f32,
    pub half_width: f32,
    pub inv_depth: f32,
    pub depth2: f32,
}

#[derive(Debug, Clone)]
pub struct Sprite {
    pub desc: SpriteDesc,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub anim_frame: f32,
    pub disabled: bool,
    pub projection: Option<Projection>,
}

impl Sprite {
    pub fn new(init: SpriteInit) -> Self {
        let mut sprite = Self {
            desc: init.desc,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            anim_frame: 0.0,
            disabled: false,
            projection: None,
        };
        sprite.apply_transform(&init.transform);
        sprite
    }

    pub fn id(&self) -> u8 {
        self.desc.id
    }

    pub fn kind(&self) -> SpriteKind {
        self.desc.kind
    }

    pub fn apply_transform(&mut self, transform: &SpriteTransform) {
        self.rotation = transform.rotation;
        self.position = transform.position;
        self.velocity = transform.velocity;
        self.disabled = false;
    }

    pub fn is_moving(&self) -> bool {
        self.velocity.length_squared() > 0.01
    }
}
