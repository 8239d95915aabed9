//! Viewer layout: selector panel, face viewport and toolbar

use macroquad::prelude::*;
use crate::app::AppState;
use crate::rasterizer::{self, Framebuffer};
use crate::selector::{Selection, POINT_SIZE};
use crate::ui::{Rect, Toolbar, UiContext};

/// Toolbar height under the panels
pub const TOOLBAR_HEIGHT: f32 = 36.0;

const PANEL_BG: Color = Color::new(0.96, 0.96, 0.96, 1.0);
const POLYGON_COLOR: Color = Color::new(0.25, 0.25, 0.3, 1.0);
const REFERENCE_COLOR: Color = Color::new(0.85, 0.1, 0.1, 1.0);
const SELECTED_COLOR: Color = Color::new(0.1, 0.2, 0.9, 1.0);

/// What the user asked for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    None,
    /// Click in selector panel coordinates
    Select(rasterizer::Vec2),
    RotateLeft,
    RotateRight,
    ToggleAutoRotate,
}

/// Panel rects for a screen: (selector, face, toolbar)
pub fn layout(screen: Rect, selector_width: f32) -> (Rect, Rect, Rect) {
    let (panels, toolbar) = screen.split_bottom(TOOLBAR_HEIGHT);
    let (selector, face) = panels.split_left(selector_width);
    (selector, face, toolbar)
}

/// Upload the framebuffer as a texture
pub fn framebuffer_texture(fb: &Framebuffer) -> Texture2D {
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
    texture.set_filter(FilterMode::Nearest);
    texture
}

fn draw_selector(ctx: &UiContext, app: &AppState, rect: Rect) -> ViewerAction {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, PANEL_BG);

    let vertices = app.selector.vertices();
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        draw_line(rect.x + a.x, rect.y + a.y, rect.x + b.x, rect.y + b.y, 1.5, POLYGON_COLOR);
    }

    for (i, v) in vertices.iter().enumerate() {
        let color = if app.selection == Selection::Reference(i) {
            SELECTED_COLOR
        } else {
            REFERENCE_COLOR
        };
        draw_circle(rect.x + v.x, rect.y + v.y, POINT_SIZE / 2.0, color);
    }

    if let Selection::Blend { point, .. } = &app.selection {
        draw_circle(rect.x + point.x, rect.y + point.y, POINT_SIZE / 2.0, SELECTED_COLOR);
    }

    if ctx.mouse.clicked(&rect) {
        return ViewerAction::Select(rasterizer::Vec2::new(
            ctx.mouse.x - rect.x,
            ctx.mouse.y - rect.y,
        ));
    }
    ViewerAction::None
}

fn draw_face(texture: Option<&Texture2D>, rect: Rect) {
    let bg = rasterizer::Color::WHITE;
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, Color::from_rgba(bg.r, bg.g, bg.b, bg.a));
    if let Some(texture) = texture {
        draw_texture_ex(
            texture,
            rect.x,
            rect.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(rect.w, rect.h)),
                ..Default::default()
            },
        );
    }
}

/// Draw the whole viewer and collect the user's action
pub fn draw_viewer(
    ctx: &mut UiContext,
    app: &AppState,
    texture: Option<&Texture2D>,
    screen: Rect,
) -> ViewerAction {
    let (selector_rect, face_rect, toolbar_rect) = layout(screen, app.settings.selector_width as f32);

    let mut action = draw_selector(ctx, app, selector_rect);
    draw_face(texture, face_rect);

    draw_rectangle(
        toolbar_rect.x,
        toolbar_rect.y,
        toolbar_rect.w,
        toolbar_rect.h,
        Color::new(0.12, 0.12, 0.14, 1.0),
    );
    let mut toolbar = Toolbar::new(toolbar_rect);
    if toolbar.button(ctx, "Left", "Rotate 18 degrees left", false) {
        action = ViewerAction::RotateLeft;
    }
    if toolbar.button(ctx, "Auto", "Rotate right every interval", app.auto_rotate.is_running()) {
        action = ViewerAction::ToggleAutoRotate;
    }
    if toolbar.button(ctx, "Right", "Rotate 18 degrees right", false) {
        action = ViewerAction::RotateRight;
    }

    let lighting = if app.settings.lighting { "lit" } else { "unlit" };
    toolbar.label(&format!("{} / {}", app.settings.render_mode.label(), lighting));
    if let Some(status) = app.status() {
        toolbar.label(status);
    }

    action
}

/// Apply an action to the app state
pub fn apply(app: &mut AppState, action: ViewerAction) {
    match action {
        ViewerAction::Select(point) => app.click_selector(point),
        ViewerAction::RotateLeft => app.rotate_left(),
        ViewerAction::RotateRight => app.rotate_right(),
        ViewerAction::ToggleAutoRotate => {
            app.toggle_auto_rotate();
        }
        ViewerAction::None => {}
    }
}
