use clap::Parser;
use std::path::PathBuf;

use crate::game::GameRules;
use crate::model::DrawMode;

/// `hypercube` - turn the falling box shape so it fits through the hole in the wall.
///
/// Shapes are read from CSV files (one `x,y,z,sx,sy,sz` box per line); the
/// matching wall for each shape is written next to it as `<name> - WALL.csv`.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory scanned for shape files.
    #[arg(long, env = "HYPERCUBE_SHAPES_DIR", default_value = "assets/shapes")]
    pub shapes_dir: PathBuf,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Vertical field of view, degrees.
    #[arg(long = "fov", default_value_t = 90.0)]
    pub fov_deg: f32,

    /// Seconds on the clock when a game starts.
    #[arg(long, default_value_t = 60.0)]
    pub countdown: f32,

    /// Seed for shape and orientation picks; random when unset.
    #[arg(long, env = "HYPERCUBE_SEED")]
    pub seed: Option<u64>,

    /// Quarter-turn speed, degrees per second.
    #[arg(long = "turn-rate", default_value_t = 180.0)]
    pub turn_rate_deg: f32,

    /// Forward speed of the shape, units per second.
    #[arg(long, default_value_t = 4.0)]
    pub speed: f32,

    /// Edge length of each shadow cube face, in texels.
    #[arg(long, default_value_t = 1024)]
    pub shadow_map_size: u32,

    /// How the shape is drawn at start.
    #[arg(long, value_enum, default_value_t = DrawMode::Triangles)]
    pub draw_mode: DrawMode,

    /// Start with shadows switched off.
    #[arg(long, default_value_t = false)]
    pub no_shadows: bool,
}

impl Config {
    pub fn rules(&self) -> GameRules {
        GameRules {
            countdown_s: self.countdown,
            turn_rate_deg: self.turn_rate_deg,
            base_speed: self.speed,
            ..GameRules::default()
        }
    }
}
