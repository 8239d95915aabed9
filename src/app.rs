//! Application state and viewer actions
//!
//! Owns the model, the face currently on screen and everything derived from
//! it (bounds, adjacency). A new face replaces the old one wholesale; a
//! failed reconstruction leaves the old one in place.

use std::f32::consts::PI;
use log::{error, info, warn};
use crate::config::Settings;
use crate::face::{Aabb, Face, VertexAdjacency};
use crate::model::{InterpolationWeights, ModelError, ReferenceModel};
use crate::rasterizer::{render_face, Color, Framebuffer, RenderMode, RenderReport, RenderSettings, Vec2};
use crate::selector::{Selection, Selector};

/// One rotate step, 18 degrees
pub const ROTATION_STEP: f32 = PI / 10.0;

/// How long status messages stay up, in seconds
const STATUS_SECS: f32 = 4.0;

/// Background behind the rendered face
pub const CLEAR_COLOR: Color = Color::WHITE;

/// Fixed-interval timer driving automatic rotation
#[derive(Debug, Clone)]
pub struct AutoRotate {
    interval: f32,
    elapsed: f32,
    running: bool,
}

impl AutoRotate {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            elapsed: 0.0,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start if stopped, otherwise stop. Returns the new running state
    ///
    /// Starting makes the first step due at once; later steps follow every
    /// interval.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.stop();
        } else {
            self.running = true;
            self.elapsed = self.interval;
        }
        self.running
    }

    /// Stop and forget partial progress; no tick fires after this
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = 0.0;
    }

    /// Advance by `dt` seconds; returns how many ticks elapsed
    pub fn update(&mut self, dt: f32) -> u32 {
        if !self.running {
            return 0;
        }
        self.elapsed += dt.max(0.0);
        let mut ticks = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            ticks += 1;
        }
        ticks
    }
}

/// The displayed face with the data derived from it at load time
struct Scene {
    face: Face,
    /// Recorded when the face was built, kept across rotations
    bounds: Aabb,
    adjacency: VertexAdjacency,
}

impl Scene {
    fn new(face: Face) -> Self {
        let bounds = face.bounds();
        let adjacency = VertexAdjacency::build(&face);
        Self { face, bounds, adjacency }
    }
}

pub struct AppState {
    pub model: ReferenceModel,
    pub settings: Settings,
    pub selector: Selector,
    /// Last selector click
    pub selection: Selection,
    pub auto_rotate: AutoRotate,
    scene: Option<Scene>,
    status: Option<(String, f32)>,
    /// Face changed since the last render
    dirty: bool,
}

impl AppState {
    pub fn new(model: ReferenceModel, settings: Settings) -> Self {
        let selector = Selector::new(
            model.face_count(),
            settings.selector_width as f32,
            settings.viewport_height as f32,
        );
        let auto_rotate = AutoRotate::new(settings.auto_rotate_interval);
        Self {
            model,
            settings,
            selector,
            selection: Selection::None,
            auto_rotate,
            scene: None,
            status: None,
            dirty: true,
        }
    }

    #[cfg(test)]
    pub fn face(&self) -> Option<&Face> {
        self.scene.as_ref().map(|s| &s.face)
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Option<Aabb> {
        self.scene.as_ref().map(|s| s.bounds)
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    pub fn set_status(&mut self, message: &str) {
        self.status = Some((message.to_string(), STATUS_SECS));
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            mode: self.settings.render_mode,
            lighting: self.settings.lighting,
            antialiasing: self.settings.antialiasing,
            ..RenderSettings::default()
        }
    }

    fn replace_face(&mut self, face: Face) {
        self.scene = Some(Scene::new(face));
        self.dirty = true;
    }

    /// Report a failed reconstruction; the current face stays
    fn report(&mut self, err: ModelError) {
        error!("{}", err);
        self.set_status(&format!("Error: {}", err));
    }

    /// Show reference face `face_num` (1-based)
    pub fn show_reference(&mut self, face_num: usize) {
        match self.model.reconstruct_reference_face(face_num) {
            Ok(face) => {
                info!("Showing reference face {}", face_num);
                self.replace_face(face);
            }
            Err(e) => self.report(e),
        }
    }

    /// Show the blend of every reference face
    pub fn show_blend(&mut self, weights: &InterpolationWeights) {
        match self.model.interpolate(weights) {
            Ok(face) => {
                info!("Showing blend of {} reference faces", weights.len());
                self.replace_face(face);
            }
            Err(e) => self.report(e),
        }
    }

    /// Handle a click at `point` in selector panel coordinates
    pub fn click_selector(&mut self, point: Vec2) {
        let selection = match self.selector.select(point) {
            Ok(s) => s,
            Err(e) => return self.report(e),
        };
        match &selection {
            Selection::Reference(index) => self.show_reference(index + 1),
            Selection::Blend { weights, .. } => self.show_blend(weights),
            Selection::None => {}
        }
        self.selection = selection;
    }

    /// Rotate about the vertical axis through the recorded bounds center
    pub fn rotate(&mut self, angle: f32) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let face = scene.face.rotated_y(angle, scene.bounds.center());
        scene.adjacency = VertexAdjacency::build(&face);
        scene.face = face;
        self.dirty = true;
    }

    pub fn rotate_left(&mut self) {
        self.rotate(ROTATION_STEP);
    }

    pub fn rotate_right(&mut self) {
        self.rotate(-ROTATION_STEP);
    }

    /// Start or stop automatic rotation; refused in interpolated mode
    pub fn toggle_auto_rotate(&mut self) -> bool {
        if !self.auto_rotate.is_running() && self.settings.render_mode == RenderMode::Gouraud {
            warn!("Auto-rotate refused in interpolated mode");
            self.set_status("Interpolated shading is too slow for automatic rotation");
            return false;
        }
        let running = self.auto_rotate.toggle();
        info!("Auto-rotate {}", if running { "on" } else { "off" });
        running
    }

    /// Per-frame update: status expiry and auto-rotate ticks
    pub fn update(&mut self, dt: f32) {
        if let Some((_, remaining)) = self.status.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.status = None;
            }
        }
        for _ in 0..self.auto_rotate.update(dt) {
            self.rotate_right();
        }
    }

    /// Draw the current face into `fb`; None when nothing is loaded yet
    pub fn render(&mut self, fb: &mut Framebuffer) -> Option<RenderReport> {
        self.dirty = false;
        fb.clear(CLEAR_COLOR);
        let settings = self.render_settings();
        let scene = self.scene.as_ref()?;
        Some(render_face(fb, &scene.face, &scene.adjacency, &scene.bounds, &settings))
    }
}
