use glam::Vec2;

use super::{Sprite, SpriteInit, SpriteKind, SpriteTransform};
use crate::map::GridMap;
use crate::physics::move_and_collide;

pub const MAX_SPRITES: usize = 255;

pub const STANDING_FRAME: f32 = 4.0;
pub const FIRING_FRAME: f32 = 6.0;
const WALK_FRAMES: f32 = 4.0;
const ANIM_FPS: f32 = 6.0;

/// Remote players and bullets, kept dense. Slots shift on destroy, so
/// anything that follows a sprite holds its id, never its index.
#[derive(Debug, Default)]
pub struct SpriteSet {
    sprites: Vec<Sprite>,
}

impl SpriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses the slot of a sprite with the same id, otherwise appends.
    /// Returns `None` when the set is full.
    pub fn create(&mut self, init: SpriteInit) -> Option<&mut Sprite> {
        if init.desc.kind == SpriteKind::Bullet {
            if let Some(owner) = self.get_mut(init.desc.owner) {
                owner.anim_frame = FIRING_FRAME;
            }
        }

        let index = match self.index_of(init.desc.id) {
            Some(index) => {
                self.sprites[index] = Sprite::new(init);
                index
            }
            None if self.sprites.len() < MAX_SPRITES => {
                self.sprites.push(Sprite::new(init));
                self.sprites.len() - 1
            }
            None => {
                log::warn!("Sprite set full, dropping sprite {}", init.desc.id);
                return None;
            }
        };
        self.sprites.get_mut(index)
    }

    pub fn apply_transform(&mut self, id: u8, transform: &SpriteTransform) -> bool {
        match self.get_mut(id) {
            Some(sprite) => {
                sprite.apply_transform(transform);
                true
            }
            None => false,
        }
    }

    pub fn destroy(&mut self, id: u8) -> Option<Sprite> {
        let index = self.index_of(id)?;
        Some(self.sprites.remove(index))
    }

    pub fn get(&self, id: u8) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.desc.id == id)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|s| s.desc.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sprite> {
        self.sprites.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn count(&self, kind: SpriteKind) -> usize {
        self.sprites.iter().filter(|s| s.desc.kind == kind).count()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    /// Dead reckoning between server snapshots.
    pub fn update(&mut self, map: &GridMap, dt: f32) {
        for sprite in self.sprites.iter_mut().filter(|s| !s.disabled) {
            let displacement = sprite.velocity * dt;
            let collided = move_and_collide(
                map,
                &mut sprite.position,
                displacement,
                sprite.desc.kind.radius(),
            );

            match sprite.desc.kind {
                SpriteKind::Bullet => sprite.disabled |= collided,
                SpriteKind::Player => animate(sprite, dt),
            }
        }

        self.disable_hit_bullets();
    }

    fn disable_hit_bullets(&mut self) {
        let players: Vec<(u8, Vec2)> = self
            .sprites
            .iter()
            .filter(|s| s.desc.kind == SpriteKind::Player && !s.disabled)
            .map(|s| (s.desc.id, s.position))
            .collect();
        let reach = SpriteKind::Player.radius() + SpriteKind::Bullet.radius();

        for bullet in self
            .sprites
            .iter_mut()
            .filter(|s| s.desc.kind == SpriteKind::Bullet && !s.disabled)
        {
            let hit = players.iter().any(|&(id, position)| {
                id != bullet.desc.owner && position.distance_squared(bullet.position) < reach * reach
            });
            if hit {
                bullet.disabled = true;
            }
        }
    }

    fn index_of(&self, id: u8) -> Option<usize> {
        self.sprites.iter().position(|s| s.desc.id == id)
    }
}

fn animate(sprite: &mut Sprite, dt: f32) {
    let step = dt * ANIM_FPS;
    sprite.anim_frame = if sprite.anim_frame > STANDING_FRAME {
        (sprite.anim_frame - step).max(STANDING_FRAME)
    } else if sprite.is_moving() {
        let frame = if sprite.anim_frame >= STANDING_FRAME {
            0.0
        } else {
            sprite.anim_frame
        };
        (frame + step) % WALK_FRAMES
    } else {
        STANDING_FRAME
    };
}
