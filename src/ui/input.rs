//! Input state for UI interaction

use super::Rect;
use macroquad::prelude::*;

/// Mouse button state
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left_down: bool,
    pub left_pressed: bool, // Just pressed this frame
}

impl MouseState {
    /// Sample macroquad's mouse, given last frame's button state
    pub fn poll(last_left_down: bool) -> Self {
        let (x, y) = mouse_position();
        let left_down = is_mouse_button_down(MouseButton::Left);
        Self {
            x,
            y,
            left_down,
            left_pressed: left_down && !last_left_down,
        }
    }

    /// Check if mouse is inside a rect
    pub fn inside(&self, rect: &Rect) -> bool {
        rect.contains(self.x, self.y)
    }

    /// Check if mouse is clicking inside a rect
    pub fn clicking(&self, rect: &Rect) -> bool {
        self.left_down && rect.contains(self.x, self.y)
    }

    /// Check if mouse just clicked inside a rect
    pub fn clicked(&self, rect: &Rect) -> bool {
        self.left_pressed && rect.contains(self.x, self.y)
    }
}

/// Pending tooltip to be drawn at end of frame
#[derive(Clone)]
pub struct PendingTooltip {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// UI context passed through the frame
pub struct UiContext {
    pub mouse: MouseState,
    /// Tooltip to show this frame (set by widgets, drawn at end)
    pub tooltip: Option<PendingTooltip>,
}

impl UiContext {
    pub fn new() -> Self {
        Self {
            mouse: MouseState::default(),
            tooltip: None,
        }
    }

    /// Reset at start of frame (call before UI code)
    pub fn begin_frame(&mut self, mouse: MouseState) {
        self.mouse = mouse;
        self.tooltip = None;
    }

    /// Set tooltip to show (call from widget when hovered)
    pub fn set_tooltip(&mut self, text: &str, x: f32, y: f32) {
        self.tooltip = Some(PendingTooltip {
            text: text.to_string(),
            x,
            y,
        });
    }

    /// Draw the tooltip if one is pending (call at end of frame)
    pub fn draw_tooltip(&self) {
        if let Some(tip) = &self.tooltip {
            let padding = 6.0;
            let font_size = 13.0;
            let dims = measure_text(&tip.text, None, font_size as u16, 1.0);

            let box_w = dims.width + padding * 2.0;
            let box_h = dims.height + padding * 2.0;

            // Below and right of the cursor, kept on screen
            let mut x = tip.x + 12.0;
            let mut y = tip.y + 20.0;
            if x + box_w > screen_width() {
                x = screen_width() - box_w - 4.0;
            }
            if y + box_h > screen_height() {
                y = tip.y - box_h - 4.0;
            }

            draw_rectangle(x, y, box_w, box_h, Color::from_rgba(30, 30, 35, 240));
            draw_rectangle_lines(x, y, box_w, box_h, 1.0, Color::from_rgba(80, 80, 90, 255));
            draw_text(
                &tip.text,
                x + padding,
                y + padding + dims.height - 2.0,
                font_size,
                Color::from_rgba(220, 220, 220, 255),
            );
        }
    }
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_needs_press_inside() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let held = MouseState { x: 5.0, y: 5.0, left_down: true, left_pressed: false };
        assert!(held.clicking(&rect));
        assert!(!held.clicked(&rect));
        let pressed = MouseState { left_pressed: true, ..held };
        assert!(pressed.clicked(&rect));
        let outside = MouseState { x: 50.0, ..pressed };
        assert!(!outside.clicked(&rect));
    }
}
