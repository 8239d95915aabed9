//! Basic UI widgets

use macroquad::prelude::*;
use super::{Rect, UiContext};

/// Highlight for active toolbar buttons
pub const ACCENT_COLOR: Color = Color::new(0.0, 0.75, 0.9, 1.0);

const FONT_SIZE: f32 = 16.0;

/// Simple toolbar layout helper
pub struct Toolbar {
    rect: Rect,
    cursor_x: f32,
    spacing: f32,
}

impl Toolbar {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_x: rect.x + 4.0,
            spacing: 6.0,
        }
    }

    /// Add a label
    pub fn label(&mut self, text: &str) {
        let text_dims = measure_text(text, None, FONT_SIZE as u16, 1.0);
        // Round to integer pixels for crisp text
        let text_y = (self.rect.y + (self.rect.h + text_dims.height) * 0.5).round();
        draw_text(text, self.cursor_x.round(), text_y, FONT_SIZE, WHITE);
        self.cursor_x += text_dims.width + self.spacing;
    }

    /// Add a text button sized to its label
    pub fn button(&mut self, ctx: &mut UiContext, text: &str, tooltip: &str, is_active: bool) -> bool {
        let dims = measure_text(text, None, FONT_SIZE as u16, 1.0);
        let w = (dims.width + 20.0).round();
        let btn_rect = Rect::new(self.cursor_x.round(), (self.rect.y + 2.0).round(), w, (self.rect.h - 4.0).round());
        self.cursor_x += w + self.spacing;
        text_button(ctx, btn_rect, text, tooltip, is_active)
    }
}

/// Draw a text button, returns true if clicked
pub fn text_button(ctx: &mut UiContext, rect: Rect, text: &str, tooltip: &str, is_active: bool) -> bool {
    let hovered = ctx.mouse.inside(&rect);
    let pressed = ctx.mouse.clicking(&rect);
    let clicked = ctx.mouse.clicked(&rect);

    if hovered && !tooltip.is_empty() {
        ctx.set_tooltip(tooltip, ctx.mouse.x, ctx.mouse.y);
    }

    let corner_radius = 4.0;
    let bg = if is_active {
        ACCENT_COLOR
    } else if pressed {
        Color::from_rgba(60, 60, 70, 255)
    } else if hovered {
        Color::from_rgba(50, 50, 60, 255)
    } else {
        Color::from_rgba(40, 40, 46, 255)
    };
    draw_rounded_rect(rect.x, rect.y, rect.w, rect.h, corner_radius, bg);

    let text_color = if is_active || hovered {
        WHITE
    } else {
        Color::from_rgba(200, 200, 200, 255)
    };
    let dims = measure_text(text, None, FONT_SIZE as u16, 1.0);
    draw_text(
        text,
        (rect.x + (rect.w - dims.width) * 0.5).round(),
        (rect.y + (rect.h + dims.height) * 0.5).round(),
        FONT_SIZE,
        text_color,
    );

    clicked
}

/// Draw a rounded rectangle (simple approximation using overlapping rects)
fn draw_rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
    // Main body
    draw_rectangle(x + r, y, w - r * 2.0, h, color);
    draw_rectangle(x, y + r, w, h - r * 2.0, color);
    // Corners
    draw_circle(x + r, y + r, r, color);
    draw_circle(x + w - r, y + r, r, color);
    draw_circle(x + r, y + h - r, r, color);
    draw_circle(x + w - r, y + h - r, r, color);
}
