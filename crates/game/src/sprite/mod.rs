mod entity;
mod set;

pub use entity::{Projection, Sprite, SpriteDesc, SpriteInit, SpriteKind, SpriteTransform};
pub use set::{FIRING_FRAME, MAX_SPRITES, STANDING_FRAME, SpriteSet};
