use super::Framebuffer;

const CROSSHAIR_SIZE: i32 = 4;
const BAR_WIDTH: u32 = 100;
const BAR_HEIGHT: u32 = 6;
const BAR_MARGIN: u32 = 8;

const BAR_BACKGROUND: u32 = 0x202020;
const BAR_HEALTH: u32 = 0x30C040;
const BAR_DAMAGE: u32 = 0xC03030;

/// Health bar whose damage portion drains towards the real value.
#[derive(Debug, Clone)]
pub struct HealthBar {
    shown: f32,
    lag: f32,
}

impl HealthBar {
    pub fn new(health: i32) -> Self {
        Self {
            shown: health as f32,
            lag: 0.85,
        }
    }

    pub fn reset(&mut self, health: i32) {
        self.shown = health as f32;
    }

    pub fn shown(&self) -> f32 {
        self.shown
    }

    pub fn update(&mut self, health: i32) {
        self.shown = self.shown * self.lag + health as f32 * (1.0 - self.lag);
    }

    pub fn draw(&self, fb: &mut Framebuffer, health: i32, max_health: i32, alpha: u32) {
        if max_health <= 0 || fb.height() < BAR_HEIGHT + BAR_MARGIN {
            return;
        }
        let x = BAR_MARGIN;
        let y = fb.height() - BAR_HEIGHT - BAR_MARGIN;
        let scale = |value: f32| {
            ((value / max_health as f32).clamp(0.0, 1.0) * BAR_WIDTH as f32) as u32
        };

        let current = scale(health as f32);
        let lagging = scale(self.shown).max(current);

        fb.rect(x, y, BAR_WIDTH, BAR_HEIGHT, BAR_BACKGROUND | alpha);
        fb.rect(x, y, lagging, BAR_HEIGHT, BAR_DAMAGE | alpha);
        fb.rect(x, y, current, BAR_HEIGHT, BAR_HEALTH | alpha);
    }
}

/// Inverts the pixels under a small cross at the screen center.
pub fn draw_crosshair(fb: &mut Framebuffer) {
    let cx = fb.width() as i32 / 2;
    let cy = fb.height() as i32 / 2;

    for offset in -CROSSHAIR_SIZE..=CROSSHAIR_SIZE {
        invert(fb, cx + offset, cy);
        if offset != 0 {
            invert(fb, cx, cy + offset);
        }
    }
}

fn invert(fb: &mut Framebuffer, x: i32, y: i32) {
    if x < 0 || y < 0 {
        return;
    }
    if let Some(pixel) = fb.get(x as u32, y as u32) {
        fb.set(x as u32, y as u32, pixel ^ 0x00FF_FFFF);
    }
}
