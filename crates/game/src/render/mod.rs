mod framebuffer;
mod hud;

pub use framebuffer::Framebuffer;
pub use hud::{HealthBar, draw_crosshair};

use glam::Vec2;

use crate::map::GridMap;
use crate::physics::{Axis, trace};
use crate::player::{Camera, LocalPlayer};
use crate::sprite::{Projection, STANDING_FRAME, SpriteKind, SpriteSet};

pub const SKY_COLOR: u32 = 0x87CEEB;
pub const FLOOR_COLOR: u32 = 0x000000;
pub const WALL_HORIZONTAL: u32 = 0xFFFFFF;
pub const WALL_VERTICAL: u32 = 0xC0C0C0;

pub const ALPHA_OPAQUE: u8 = 0xFF;
pub const ALPHA_DIMMED: u8 = 0x7F;

/// Billboard size in wall heights, and its flat color.
struct SpriteStyle {
    width: f32,
    height: f32,
    color: u32,
}

const PLAYER_STYLE: SpriteStyle = SpriteStyle {
    width: 0.4,
    height: 0.8,
    color: 0xC03030,
};
const PLAYER_FIRING_COLOR: u32 = 0xFFB030;
const BULLET_STYLE: SpriteStyle = SpriteStyle {
    width: 0.05,
    height: 0.05,
    color: 0xFFFF80,
};
/// Bullets float this far (in wall heights) below eye level.
const BULLET_DROP: f32 = 0.1;

struct VisibleSprite {
    projection: Projection,
    kind: SpriteKind,
    color: u32,
}

pub struct Renderer {
    framebuffer: Framebuffer,
    depth: Vec<f32>,
    depth_of_field: u32,
    alpha: u8,
    visible: Vec<VisibleSprite>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, depth_of_field: u32) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            depth: vec![f32::INFINITY; width as usize],
            depth_of_field,
            alpha: ALPHA_OPAQUE,
            visible: Vec::new(),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Squared wall distance per column from the last frame.
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    fn alpha_bits(&self) -> u32 {
        (self.alpha as u32) << 24
    }

    pub fn clear(&mut self, color: u32) {
        let color = color | self.alpha_bits();
        self.framebuffer.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    /// Walls and sprites as seen from the player's display position.
    /// `hidden` is a sprite id left out of the frame.
    pub fn render(
        &mut self,
        map: &GridMap,
        player: &LocalPlayer,
        sprites: &mut SpriteSet,
        hidden: Option<u8>,
    ) {
        let eye = player.display_position;
        let camera = player.camera();

        self.draw_walls(map, eye, camera);
        self.project_sprites(eye, camera, sprites, hidden);
        self.draw_sprites();
    }

    pub fn draw_hud(&mut self, health: i32, max_health: i32, bar: &HealthBar) {
        let alpha = self.alpha_bits();
        draw_crosshair(&mut self.framebuffer);
        bar.draw(&mut self.framebuffer, health, max_health, alpha);
    }

    fn draw_walls(&mut self, map: &GridMap, eye: Vec2, camera: &Camera) {
        let width = self.framebuffer.width();
        let height = self.framebuffer.height() as i32;
        let alpha = self.alpha_bits();

        for x in 0..width {
            let camera_x = 2.0 * x as f32 / width as f32 - 1.0;
            let hit = trace(map, eye, camera.column_ray(camera_x), self.depth_of_field);

            if !hit.is_wall() {
                self.depth[x as usize] = f32::INFINITY;
                self.framebuffer.column(x, 0, height / 2, SKY_COLOR | alpha);
                self.framebuffer.column(x, height / 2, height, FLOOR_COLOR | alpha);
                continue;
            }

            self.depth[x as usize] = hit.distance * hit.distance;

            let line = if hit.distance > 0.0 {
                (height as f32 / hit.distance).min(height as f32) as i32
            } else {
                height
            };
            let start = (height - line) / 2;
            let end = start + line;
            let wall = match hit.axis {
                Axis::Horizontal => WALL_HORIZONTAL,
                Axis::Vertical => WALL_VERTICAL,
            };

            self.framebuffer.column(x, 0, start, SKY_COLOR | alpha);
            self.framebuffer.column(x, start, end, wall | alpha);
            self.framebuffer.column(x, end, height, FLOOR_COLOR | alpha);
        }
    }

    fn project_sprites(
        &mut self,
        eye: Vec2,
        camera: &Camera,
        sprites: &mut SpriteSet,
        hidden: Option<u8>,
    ) {
        let width = self.framebuffer.width() as f32;
        let height = self.framebuffer.height() as f32;
        self.visible.clear();

        for sprite in sprites.iter_mut() {
            sprite.projection = None;
            if sprite.disabled || hidden == Some(sprite.id()) {
                continue;
            }

            let local = camera.to_camera_space(sprite.position - eye);
            if local.y <= 0.0 {
                continue;
            }

            let (style_width, color) = match sprite.kind() {
                SpriteKind::Player if sprite.anim_frame > STANDING_FRAME => {
                    (PLAYER_STYLE.width, PLAYER_FIRING_COLOR)
                }
                SpriteKind::Player => (PLAYER_STYLE.width, PLAYER_STYLE.color),
                SpriteKind::Bullet => (BULLET_STYLE.width, BULLET_STYLE.color),
            };

            let inv_depth = 1.0 / local.y;
            let screen_x = width * 0.5 * (1.0 + local.x * inv_depth);
            let half_width = style_width * height * inv_depth * 0.5;
            if screen_x + half_width < 0.0 || screen_x - half_width >= width {
                continue;
            }

            let projection = Projection {
                screen_x,
                half_width,
                inv_depth,
                depth2: local.y * local.y,
            };
            sprite.projection = Some(projection);
            self.visible.push(VisibleSprite {
                projection,
                kind: sprite.kind(),
                color,
            });
        }

        // farthest first, nearer sprites overwrite
        self.visible
            .sort_by(|a, b| b.projection.depth2.total_cmp(&a.projection.depth2));
    }

    fn draw_sprites(&mut self) {
        let width = self.framebuffer.width() as i32;
        let height = self.framebuffer.height() as f32;
        let alpha = self.alpha_bits();

        for sprite in &self.visible {
            let p = sprite.projection;
            let (size_y, y_end) = match sprite.kind {
                SpriteKind::Player => {
                    let size_y = PLAYER_STYLE.height * height * p.inv_depth;
                    (size_y, height * 0.5 * (1.0 + p.inv_depth))
                }
                SpriteKind::Bullet => {
                    let size_y = BULLET_STYLE.height * height * p.inv_depth;
                    let drop = BULLET_DROP * height * p.inv_depth;
                    (size_y, (height + size_y + drop) * 0.5)
                }
            };

            let x_start = ((p.screen_x - p.half_width) as i32).max(0);
            let x_end = ((p.screen_x + p.half_width).ceil() as i32).min(width);
            let y_start = (y_end - size_y) as i32;

            for x in x_start..x_end {
                if self.depth[x as usize] < p.depth2 {
                    continue;
                }
                self.framebuffer
                    .column(x as u32, y_start, y_end as i32, sprite.color | alpha);
            }
        }
    }
}
