//! Immediate-mode UI helpers drawn with macroquad

mod input;
mod widgets;

pub use input::*;
pub use widgets::*;

/// Screen-space rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Half-open: the right and bottom edges are outside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Split off `w` pixels from the left, returning (left, rest)
    pub fn split_left(&self, w: f32) -> (Rect, Rect) {
        let w = w.clamp(0.0, self.w);
        (
            Rect::new(self.x, self.y, w, self.h),
            Rect::new(self.x + w, self.y, self.w - w, self.h),
        )
    }

    /// Split off `h` pixels from the bottom, returning (rest, bottom)
    pub fn split_bottom(&self, h: f32) -> (Rect, Rect) {
        let h = h.clamp(0.0, self.h);
        (
            Rect::new(self.x, self.y, self.w, self.h - h),
            Rect::new(self.x, self.bottom() - h, self.w, h),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(29.9, 14.9));
        assert!(!r.contains(30.0, 12.0));
        assert!(!r.contains(15.0, 15.0));
    }

    #[test]
    fn test_splits_cover_rect() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (left, rest) = r.split_left(30.0);
        assert_eq!(left, Rect::new(0.0, 0.0, 30.0, 50.0));
        assert_eq!(rest, Rect::new(30.0, 0.0, 70.0, 50.0));
        let (top, bottom) = r.split_bottom(10.0);
        assert_eq!(top.h + bottom.h, 50.0);
        assert_eq!(bottom.y, 40.0);
    }
}
