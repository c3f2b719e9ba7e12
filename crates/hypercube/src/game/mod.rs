//! The wall puzzle: the shape advances on the wall, the player turns it in
//! quarter turns, and crossing the wall plane is judged pass or fail.

pub mod rotation;
pub mod scoring;

use std::path::{Path, PathBuf};

use boxcsv::WallLayout;
use glam::{EulerRot, Quat};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use walkdir::WalkDir;

use crate::input::GameInput;
use crate::scene::{Entity, Scene};

use self::rotation::RotationState;
use self::scoring::{orientation_passes, pass_points, time_bonus};

/// Tunables for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    /// Seconds on the clock at start.
    pub countdown_s: f32,
    /// Degrees per second while a quarter turn animates.
    pub turn_rate_deg: f32,
    /// Forward speed, units per second.
    pub base_speed: f32,
    /// Speed multiplier while boosting.
    pub boost_factor: f32,
    /// Per-axis Euler tolerance for a pass, degrees.
    pub tolerance_deg: f32,
    /// How long the light flares after a failure.
    pub flare_s: f32,
    /// How long the score flickers after a pass.
    pub flicker_s: f32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            countdown_s: 60.0,
            turn_rate_deg: 180.0,
            base_speed: 4.0,
            boost_factor: 4.0,
            tolerance_deg: 1.0,
            flare_s: 0.35,
            flicker_s: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Passed { points: u32, score: u32 },
    Failed,
    Respawned { shape: Option<PathBuf> },
    GameOver { score: u32, high_score: u32 },
    Restarted,
    QuitRequested,
}

/// Shape files the game draws from.
#[derive(Debug, Clone, Default)]
pub struct ShapePool {
    shapes: Vec<PathBuf>,
}

impl ShapePool {
    /// Every `*.csv` directly under `dir`, wall files excluded.
    pub fn scan(dir: &Path) -> Self {
        let mut shapes: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("csv"))
            .filter(|p| !boxcsv::is_wall_file(p))
            .collect();
        shapes.sort();

        if shapes.is_empty() {
            warn!("No shape files found in '{}'", dir.display());
        } else {
            info!("Found {} shapes in '{}'", shapes.len(), dir.display());
        }

        Self { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// A random shape other than `previous`, unless it is the only one.
    pub fn pick_next<R: Rng>(&self, rng: &mut R, previous: Option<&Path>) -> Option<&Path> {
        if self.shapes.len() <= 1 {
            return self.shapes.first().map(PathBuf::as_path);
        }
        let candidates: Vec<&PathBuf> = self
            .shapes
            .iter()
            .filter(|p| Some(p.as_path()) != previous)
            .collect();
        candidates.choose(rng).map(|p| p.as_path())
    }
}

/// One of the 64 axis-aligned orientations built from quarter turns.
pub fn random_orientation<R: Rng>(rng: &mut R) -> Quat {
    let mut quarter = || (rng.gen_range(0..4) as f32 * 90.0).to_radians();
    let (x, y, z) = (quarter(), quarter(), quarter());
    Quat::from_euler(EulerRot::XYZ, x, y, z).normalize()
}

pub struct Game {
    pub rules: GameRules,
    phase: Phase,
    rotation: RotationState,
    speed: f32,
    since_last_pass: f32,
    score: u32,
    high_score: u32,
    time_left: f32,
    flicker_left: f32,
    flare_left: f32,
    pool: ShapePool,
    rng: StdRng,
}

impl Game {
    pub fn new(rules: GameRules, pool: ShapePool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            phase: Phase::Playing,
            rotation: RotationState::Idle,
            speed: rules.base_speed,
            since_last_pass: 0.0,
            score: 0,
            high_score: 0,
            time_left: rules.countdown_s,
            flicker_left: 0.0,
            flare_left: 0.0,
            pool,
            rng,
            rules,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn since_last_pass(&self) -> f32 {
        self.since_last_pass
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn pool(&self) -> &ShapePool {
        &self.pool
    }

    /// Light flare strength in [0, 1], decaying to 0 after a failure.
    pub fn flare_intensity(&self) -> f32 {
        if self.rules.flare_s <= 0.0 {
            return 0.0;
        }
        (self.flare_left / self.rules.flare_s).clamp(0.0, 1.0)
    }

    /// Blinks the score for a moment after a pass.
    pub fn score_visible(&self) -> bool {
        self.flicker_left <= 0.0 || (self.flicker_left / 0.1) as u32 % 2 == 0
    }

    /// Place the first shape and its wall.
    pub fn start(&mut self, scene: &mut Scene) -> GameEvent {
        self.respawn(scene)
    }

    /// Fresh score, clock and shape; the high score survives.
    pub fn restart(&mut self, scene: &mut Scene) -> Vec<GameEvent> {
        self.phase = Phase::Playing;
        self.rotation = RotationState::Idle;
        self.speed = self.rules.base_speed;
        self.since_last_pass = 0.0;
        self.score = 0;
        self.time_left = self.rules.countdown_s;
        self.flicker_left = 0.0;
        self.flare_left = 0.0;

        info!("Restarting (high score {})", self.high_score);
        vec![GameEvent::Restarted, self.respawn(scene)]
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f32, input: &GameInput, scene: &mut Scene) -> Vec<GameEvent> {
        match self.phase {
            Phase::GameOver => match input.answer {
                Some(true) => self.restart(scene),
                Some(false) => vec![GameEvent::QuitRequested],
                None => Vec::new(),
            },
            Phase::Playing => self.play(dt, input, scene),
        }
    }

    fn play(&mut self, dt: f32, input: &GameInput, scene: &mut Scene) -> Vec<GameEvent> {
        if self.time_left - dt < 0.0 {
            self.time_left = 0.0;
            self.phase = Phase::GameOver;
            self.rotation = RotationState::Idle;
            self.high_score = self.high_score.max(self.score);
            info!("Game over: score {} (high {})", self.score, self.high_score);
            return vec![GameEvent::GameOver {
                score: self.score,
                high_score: self.high_score,
            }];
        }

        self.time_left -= dt;
        self.since_last_pass += dt;
        self.flicker_left = (self.flicker_left - dt).max(0.0);
        self.flare_left = (self.flare_left - dt).max(0.0);

        let shape = scene.model_mut(Entity::Shape);
        if let Some(axis) = input.turn {
            if self.rotation.begin(axis, shape.rotation) {
                debug!("turn {:?}", axis);
            }
        }
        self.rotation.step(dt, self.rules.turn_rate_deg, &mut shape.rotation);

        self.speed = if input.boost {
            self.rules.base_speed * self.rules.boost_factor
        } else {
            self.rules.base_speed
        };
        shape.position.z += self.speed * dt;

        if scene.shape().position.z >= scene.wall().position.z {
            let mut events = vec![self.judge(scene)];
            events.push(self.respawn(scene));
            events
        } else {
            Vec::new()
        }
    }

    fn judge(&mut self, scene: &Scene) -> GameEvent {
        if orientation_passes(scene.shape().rotation, self.rules.tolerance_deg) {
            let points = pass_points(self.since_last_pass);
            self.score += points;
            self.high_score = self.high_score.max(self.score);
            self.time_left += time_bonus(self.score);
            self.since_last_pass = 0.0;
            self.flicker_left = self.rules.flicker_s;
            info!("Pass: +{} -> {}", points, self.score);
            GameEvent::Passed {
                points,
                score: self.score,
            }
        } else {
            self.flare_left = self.rules.flare_s;
            info!("Crash at score {}", self.score);
            GameEvent::Failed
        }
    }

    /// Reset the shape, give it a new random orientation and file, and build its wall.
    fn respawn(&mut self, scene: &mut Scene) -> GameEvent {
        self.rotation = RotationState::Idle;

        let previous = scene.shape().file_path().map(Path::to_path_buf);
        let next = self
            .pool
            .pick_next(&mut self.rng, previous.as_deref())
            .map(Path::to_path_buf);
        let orientation = random_orientation(&mut self.rng);

        let shape = scene.model_mut(Entity::Shape);
        shape.reset_model();
        shape.rotation = orientation;
        if let Some(path) = &next {
            shape.update_file_path(path);
        }

        let footprint = scene.shape().boxes().to_vec();
        let wall_path = next.as_deref().and_then(|p| match boxcsv::build_wall(p) {
            Ok(wall) => Some(wall),
            Err(err) => {
                warn!("{}; building the wall in memory", err);
                None
            }
        });

        let wall = scene.model_mut(Entity::Wall);
        match wall_path {
            Some(path) => wall.update_file_path(path),
            None => wall.set_boxes(WallLayout::from_footprint(&footprint).to_boxes()),
        }

        GameEvent::Respawned { shape: next }
    }
}
