//! HyperCube: a box shape drifts toward a wall and has to be turned, a quarter
//! turn at a time, until it fits through the hole cut for it.
//!
//! Game code drives a [`program::ShaderProgram`]; the [`renderer`] replays the
//! recorded frame with wgpu.

pub mod app;
pub mod camera;
pub mod config;
pub mod game;
pub mod input;
pub mod light;
pub mod model;
pub mod program;
pub mod renderer;
pub mod scene;
pub mod ui;
