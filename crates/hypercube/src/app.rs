use crate::{
    camera::{Camera, CameraController},
    config::Config,
    game::{Game, GameEvent, ShapePool},
    input::{commands, Command, GameInput, InputState},
    model::DrawMode,
    renderer::Renderer,
    scene::{Entity, RenderFlags, Scene},
    ui,
};
use anyhow::Result;
use glam::Vec3;
use std::sync::Arc;
use std::time::Instant;
use winit::{event::WindowEvent, window::Window};

const CAMERA_START: Vec3 = Vec3::new(0.0, 12.0, 18.0);
const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 0.0, -8.0);
/// Point light brightness gain at full flare.
const FLARE_GAIN: f32 = 3.0;
/// Frame steps longer than this are clamped (window drags, breakpoints).
const MAX_STEP_S: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything that advances per frame, without the GPU.
pub struct Session {
    pub scene: Scene,
    pub game: Game,
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub input: InputState,
    pub flags: RenderFlags,
    pub draw_mode: DrawMode,
}

impl Session {
    pub fn new(config: &Config, width: u32, height: u32) -> Self {
        let pool = ShapePool::scan(&config.shapes_dir);
        let mut scene = Scene::with_defaults(config.shadow_map_size);
        let mut game = Game::new(config.rules(), pool, config.seed);
        game.start(&mut scene);

        let mut session = Self {
            scene,
            game,
            camera: Camera::new(width, height, CAMERA_START, config.fov_deg).looking_at(CAMERA_TARGET),
            camera_controller: CameraController::new(),
            input: InputState::default(),
            flags: RenderFlags {
                shadows: !config.no_shadows,
                textures: true,
            },
            draw_mode: config.draw_mode,
        };
        session.apply_draw_mode();
        session
    }

    fn apply_draw_mode(&mut self) {
        self.scene.model_mut(Entity::Shape).draw_mode = self.draw_mode;
    }

    /// Returns `true` when the event was used.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        if self.input.handle_event(event) {
            return true;
        }
        self.camera_controller.handle_event(event, &mut self.camera)
    }

    /// Advance one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Flow {
        let dt = dt.max(0.0);
        let mut flow = Flow::Continue;

        for cmd in commands(&self.input) {
            match cmd {
                Command::ToggleShadows => {
                    self.flags.shadows = !self.flags.shadows;
                    log::info!("shadows {}", if self.flags.shadows { "on" } else { "off" });
                }
                Command::ToggleTextures => {
                    self.flags.textures = !self.flags.textures;
                    log::info!("textures {}", if self.flags.textures { "on" } else { "off" });
                }
                Command::SetDrawMode(mode) => {
                    self.draw_mode = mode;
                    log::info!("draw mode {mode:?}");
                }
                Command::Quit => flow = Flow::Quit,
            }
        }

        self.camera_controller
            .update(&self.input, dt.min(MAX_STEP_S), &mut self.camera);

        // A stalled frame is replayed in short steps: the clock loses the
        // whole stall but the shape never skips past the wall.
        let steps = (dt / MAX_STEP_S).ceil().max(1.0) as u32;
        let step = dt / steps as f32;
        let mut game_input = GameInput::from_input(&self.input);
        for _ in 0..steps {
            for event in self.game.update(step, &game_input, &mut self.scene) {
                match event {
                    GameEvent::QuitRequested => flow = Flow::Quit,
                    GameEvent::Respawned { shape: Some(path) } => {
                        log::debug!("next shape {}", path.display());
                    }
                    other => log::debug!("{other:?}"),
                }
            }
            // Key presses count once per frame.
            game_input.turn = None;
            game_input.answer = None;
        }

        self.apply_draw_mode();
        self.scene.apply_flare(self.game.flare_intensity(), FLARE_GAIN);
        self.input.end_frame();
        flow
    }
}

pub struct App {
    pub renderer: Renderer,
    pub session: Session,
    last_frame: Instant,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let renderer = Renderer::new(window, config.shadow_map_size).await?;
        let size = renderer.gfx.size;
        let session = Session::new(config, size.width, size.height);

        Ok(Self {
            renderer,
            session,
            last_frame: Instant::now(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.session.camera.resize(new_size.width, new_size.height);
        }
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
            return true;
        }
        self.session.handle_event(event)
    }

    /// Step the game and refresh the title.
    pub fn update(&mut self, window: &Window) -> Flow {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let flow = self.session.tick(dt);
        window.set_title(&ui::hud_title(&self.session.game));
        flow
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.renderer
            .render(&self.session.scene, &self.session.camera, self.session.flags)
    }
}
