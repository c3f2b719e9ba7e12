//! Entry point for HyperCube.

use anyhow::Result;
use clap::Parser;
use hypercube::{
    app::{App, Flow},
    config::Config,
    ui,
};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

/// Process status when the window or GPU cannot be brought up.
const INIT_FAILURE_EXIT: i32 = -1;

/// Event loop, window and renderer, in that order.
fn init(config: &Config) -> Result<(EventLoop<()>, Arc<Window>, App)> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(ui::TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );
    let app = pollster::block_on(App::new(window.clone(), config))?;
    Ok((event_loop, window, app))
}

fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let (event_loop, window, mut app) = match init(&config) {
        Ok(parts) => parts,
        Err(err) => {
            log::error!("failed to initialise: {err:#}");
            std::process::exit(INIT_FAILURE_EXIT);
        }
    };

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if !app.handle_event(&event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::RedrawRequested => {
                            if app.update(&window) == Flow::Quit {
                                elwt.exit();
                                return;
                            }
                            if let Err(err) = app.render() {
                                if let Err(fatal) = app.renderer.handle_surface_error(err) {
                                    log::error!("{fatal}; exiting");
                                    elwt.exit();
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
