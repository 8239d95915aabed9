//! face-morph: morphable face viewer with a software rasterizer
//!
//! - Reference faces rebuilt from an average face plus weighted offsets
//! - Blends of all reference faces picked on a polygon selector
//! - Painter's algorithm, flat / interpolated / wireframe shading
//! - Barycentric triangle fill with 4x MSAA

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod face;
mod model;
mod selector;
mod config;
mod ui;
mod view;
mod app;

use clap::Parser;
use macroquad::prelude::*;
use log::{error, info};
use rasterizer::{Framebuffer, HEIGHT, WIDTH};
use model::{DataDir, ReferenceModel};
use ui::{MouseState, Rect, UiContext};
use app::AppState;
use config::Args;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("face-morph v{}", VERSION),
        window_width: (WIDTH * 2) as i32,
        window_height: HEIGHT as i32 + view::TOOLBAR_HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Load settings and the model, or explain why not
fn startup(args: &Args) -> Result<AppState, String> {
    let settings = config::configure(args).map_err(|e| e.to_string())?;

    let data_dir = DataDir::new(&args.data_dir);
    let mut model = ReferenceModel::load(&data_dir, args.face_count).map_err(|e| e.to_string())?;
    if settings.cache_offsets {
        model = model.with_offset_cache();
    }

    info!(
        "{} shading, lighting {}",
        settings.render_mode.label(),
        if settings.lighting { "on" } else { "off" }
    );
    Ok(AppState::new(model, settings))
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version print to stdout and exit cleanly
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let mut app = match startup(&args) {
        Ok(app) => app,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    info!("=== face-morph v{} ===", VERSION);

    let mut fb = Framebuffer::new(app.settings.viewport_width, app.settings.viewport_height);
    let mut texture: Option<Texture2D> = None;
    let mut ui_ctx = UiContext::new();
    let mut last_left_down = false;

    loop {
        let mouse_state = MouseState::poll(last_left_down);
        last_left_down = mouse_state.left_down;
        ui_ctx.begin_frame(mouse_state);

        app.update(get_frame_time());

        // Only rasterize when the face changed
        if app.needs_redraw() {
            texture = app.render(&mut fb).map(|report| {
                if report.skipped > 0 {
                    log::debug!("Skipped {} zero-area triangles", report.skipped);
                }
                view::framebuffer_texture(&fb)
            });
        }

        clear_background(Color::from_rgba(30, 30, 35, 255));

        let screen = Rect::new(0.0, 0.0, screen_width(), screen_height());
        let action = view::draw_viewer(&mut ui_ctx, &app, texture.as_ref(), screen);
        view::apply(&mut app, action);

        ui_ctx.draw_tooltip();

        next_frame().await;
    }
}
