use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Widget;

use umbra::{Framebuffer, Session, View};

/// Draws a framebuffer with two pixels per cell using upper half blocks.
pub struct FramebufferView<'a> {
    pub framebuffer: &'a Framebuffer,
}

impl Widget for FramebufferView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fb = self.framebuffer;
        if area.width == 0 || area.height == 0 || fb.width() == 0 || fb.height() == 0 {
            return;
        }

        let rows = area.height as u32 * 2;
        for cy in 0..area.height {
            for cx in 0..area.width {
                let px = cx as u32 * fb.width() / area.width as u32;
                let top = (cy as u32 * 2) * fb.height() / rows;
                let bottom = (cy as u32 * 2 + 1) * fb.height() / rows;

                let upper = fb.get(px, top).map_or(Color::Black, to_color);
                let lower = fb.get(px, bottom).map_or(Color::Black, to_color);
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_symbol("▀").set_fg(upper).set_bg(lower);
                }
            }
        }
    }
}

/// Terminals have no alpha, so it darkens the color instead.
fn to_color(pixel: u32) -> Color {
    let alpha = pixel >> 24;
    let channel = |shift: u32| (((pixel >> shift) & 0xFF) * alpha / 0xFF) as u8;
    Color::Rgb(channel(16), channel(8), channel(0))
}

pub fn status_line(view: View, session: &Session) -> Line<'static> {
    let text = match view {
        View::Error => "Disconnected. Esc for menu, q to quit".to_string(),
        View::Menu => "j to join, q to quit".to_string(),
        View::Loading => "Joining...".to_string(),
        View::Waiting => match session.wait_time() {
            Some(seconds) => format!("Starting in {seconds}s. r to toggle ready"),
            None => "Waiting for players. r to toggle ready".to_string(),
        },
        View::Playing => format!(
            "HP {}  WASD move, arrows or mouse turn, space fire, p pause",
            session.player.health
        ),
        View::Paused => "Paused. Any key to resume".to_string(),
        View::Over { dead: true } => "You died. Esc for menu".to_string(),
        View::Over { dead: false } => "Everyone else left. Esc for menu".to_string(),
    };
    Line::styled(text, Style::default().fg(Color::Cyan))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_darkens() {
        assert_eq!(to_color(0xFF80_4020), Color::Rgb(0x80, 0x40, 0x20));
        assert_eq!(to_color(0x0080_4020), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_half_blocks_sample_two_rows() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set(0, 0, 0xFFFF_0000);
        fb.set(0, 1, 0xFF00_00FF);

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        FramebufferView { framebuffer: &fb }.render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(0xFF, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 0xFF));
    }
}
