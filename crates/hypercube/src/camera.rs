use crate::input::InputState;
use crate::program::{names, ShaderProgram};
use glam::{Mat4, Quat, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::KeyCode;

/// Closest the look direction may get to straight up or down.
pub const PITCH_LIMIT_DEG: f32 = 5.0;

const FOV_RANGE_DEG: (f32, f32) = (10.0, 120.0);
const ORBIT_RADIUS_RANGE: (f32, f32) = (2.0, 80.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    /// Free look from `position` along `orientation`.
    Fly,
    /// Circles `target`; position and orientation are derived.
    Orbit {
        target: Vec3,
        radius: f32,
        /// Radians around +Y, zero looking down -Z.
        azimuth_rad: f32,
        /// Radians above the XZ plane.
        elevation_rad: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Unit look direction.
    orientation: Vec3,
    pub up: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub width: u32,
    pub height: u32,
    pub mode: CameraMode,

    initial_position: Vec3,
    initial_orientation: Vec3,
    initial_fov_deg: f32,
}

impl Camera {
    /// A fly camera looking down -Z.
    pub fn new(width: u32, height: u32, position: Vec3, fov_deg: f32) -> Self {
        Self {
            position,
            orientation: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_deg,
            near: 0.01,
            far: 100.0,
            width,
            height,
            mode: CameraMode::Fly,
            initial_position: position,
            initial_orientation: Vec3::NEG_Z,
            initial_fov_deg: fov_deg,
        }
    }

    /// Start looking at `target` instead of down -Z; also becomes the reset pose.
    pub fn looking_at(mut self, target: Vec3) -> Self {
        let dir = (target - self.position).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.orientation = dir;
            self.initial_orientation = dir;
        }
        self
    }

    #[inline]
    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    /// Unit vector to the camera's right.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.orientation.cross(self.up).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.orientation, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, self.near, self.far)
    }

    pub fn upload(&self, program: &mut dyn ShaderProgram) {
        program.set_mat4(names::VIEW_MATRIX, self.view_matrix());
        program.set_mat4(names::PROJECTION_MATRIX, self.projection_matrix());
        program.set_vec3(names::VIEW_POSITION, self.position);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Back to the starting pose, field of view and fly mode.
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.orientation = self.initial_orientation;
        self.fov_deg = self.initial_fov_deg;
        self.mode = CameraMode::Fly;
    }

    /// Turn about the up axis.
    pub fn yaw(&mut self, angle_rad: f32) {
        self.orientation = (Quat::from_axis_angle(self.up, angle_rad) * self.orientation).normalize();
    }

    /// Tilt about the right axis, clamped so the look direction stays at
    /// least [`PITCH_LIMIT_DEG`] away from either pole. Returns `false` when
    /// the camera is already at the limit in that direction.
    pub fn pitch(&mut self, angle_rad: f32) -> bool {
        let max_elevation = (90.0 - PITCH_LIMIT_DEG).to_radians();
        let elevation = self.orientation.dot(self.up.normalize()).clamp(-1.0, 1.0).asin();
        let target = (elevation + angle_rad).clamp(-max_elevation, max_elevation);
        let delta = target - elevation;

        if delta.abs() < 1e-5 {
            return false;
        }
        let axis = self.right();
        self.orientation = (Quat::from_axis_angle(axis, delta) * self.orientation).normalize();
        true
    }

    /// Move relative to the look direction.
    pub fn move_local(&mut self, forward: f32, right: f32, upward: f32) {
        self.position += self.orientation * forward + self.right() * right + self.up * upward;
    }

    /// Slide in the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right();
        let view_up = right.cross(self.orientation);
        let offset = right * dx + view_up * dy;

        match &mut self.mode {
            CameraMode::Fly => self.position += offset,
            CameraMode::Orbit { target, .. } => {
                *target += offset;
                self.update_orbit();
            }
        }
    }

    /// Positive zooms in: narrows the field of view, or shrinks the orbit.
    pub fn zoom(&mut self, amount: f32) {
        match &mut self.mode {
            CameraMode::Fly => {
                self.fov_deg = (self.fov_deg - amount).clamp(FOV_RANGE_DEG.0, FOV_RANGE_DEG.1);
            }
            CameraMode::Orbit { radius, .. } => {
                *radius = (*radius * 1.1f32.powf(-amount / 5.0))
                    .clamp(ORBIT_RADIUS_RANGE.0, ORBIT_RADIUS_RANGE.1);
                self.update_orbit();
            }
        }
    }

    /// Rotate around the orbit target. No effect in fly mode.
    pub fn orbit(&mut self, d_azimuth_rad: f32, d_elevation_rad: f32) {
        if let CameraMode::Orbit {
            azimuth_rad,
            elevation_rad,
            ..
        } = &mut self.mode
        {
            *azimuth_rad += d_azimuth_rad;
            // 1 degree to 89 degrees.
            *elevation_rad = (*elevation_rad + d_elevation_rad)
                .clamp(1.0f32.to_radians(), 89.0f32.to_radians());
            self.update_orbit();
        }
    }

    /// Recompute position and orientation from the orbit parameters.
    fn update_orbit(&mut self) {
        if let CameraMode::Orbit {
            target,
            radius,
            azimuth_rad,
            elevation_rad,
        } = self.mode
        {
            let (sin_az, cos_az) = azimuth_rad.sin_cos();
            let (sin_el, cos_el) = elevation_rad.sin_cos();
            let offset = Vec3::new(radius * cos_el * sin_az, radius * sin_el, radius * cos_el * cos_az);

            self.position = target + offset;
            self.orientation = (-offset).normalize();
        }
    }

    /// Switch between fly and orbit. Orbit picks the point `distance` ahead.
    pub fn toggle_mode(&mut self, distance: f32) {
        self.mode = match self.mode {
            CameraMode::Fly => {
                let target = self.position + self.orientation * distance;
                let offset = self.position - target;
                let radius = offset.length();
                let elevation_rad = (offset.y / radius)
                    .asin()
                    .clamp(1.0f32.to_radians(), 89.0f32.to_radians());
                CameraMode::Orbit {
                    target,
                    radius,
                    azimuth_rad: offset.x.atan2(offset.z),
                    elevation_rad,
                }
            }
            CameraMode::Orbit { .. } => CameraMode::Fly,
        };
        self.update_orbit();
    }
}

/// Mouse gestures and held keys that drive the camera.
pub struct CameraController {
    left_down: bool,
    right_down: bool,
    middle_down: bool,
    last_mouse: Option<(f64, f64)>,
    /// World units per second.
    pub speed: f32,
    pub boost: f32,
    /// Degrees per second for arrow-key turns.
    pub turn_rate_deg: f32,
    /// Radians per pixel for middle-drag look.
    pub look_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            left_down: false,
            right_down: false,
            middle_down: false,
            last_mouse: None,
            speed: 5.0,
            boost: 5.0,
            turn_rate_deg: 45.0,
            look_sensitivity: 0.004,
        }
    }

    /// Handles mouse events. Returns `true` when the event was used.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                let down = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.left_down = down,
                    MouseButton::Right => self.right_down = down,
                    MouseButton::Middle => self.middle_down = down,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor((position.x, position.y), camera);
                self.left_down || self.right_down || self.middle_down
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                camera.zoom(scroll * 5.0);
                true
            }
            _ => false,
        }
    }

    fn handle_cursor(&mut self, xy: (f64, f64), camera: &mut Camera) {
        if let Some(last) = self.last_mouse {
            let dx = (xy.0 - last.0) as f32;
            let dy = (xy.1 - last.1) as f32;

            if self.right_down {
                let scale = 0.01;
                camera.pan(-dx * scale, dy * scale);
            }
            if self.middle_down {
                let s = self.look_sensitivity;
                match camera.mode {
                    CameraMode::Fly => {
                        camera.yaw(-dx * s);
                        camera.pitch(-dy * s);
                    }
                    CameraMode::Orbit { .. } => camera.orbit(-dx * s, dy * s),
                }
            }
            if self.left_down {
                camera.zoom(-dy * 0.1);
            }
        }
        self.last_mouse = Some(xy);
    }

    /// Apply held keys for one frame.
    pub fn update(&self, input: &InputState, dt: f32, camera: &mut Camera) {
        if input.was_pressed(KeyCode::Home) {
            camera.reset();
        }
        if input.was_pressed(KeyCode::KeyC) {
            camera.toggle_mode(10.0);
        }

        let turn = (self.turn_rate_deg * dt).to_radians();
        let axis = |neg: KeyCode, pos: KeyCode| -> f32 {
            input.is_held(pos) as i32 as f32 - input.is_held(neg) as i32 as f32
        };

        let yaw = axis(KeyCode::ArrowRight, KeyCode::ArrowLeft);
        let tilt = axis(KeyCode::ArrowDown, KeyCode::ArrowUp);

        match camera.mode {
            CameraMode::Fly => {
                if yaw != 0.0 {
                    camera.yaw(yaw * turn);
                }
                if tilt != 0.0 {
                    camera.pitch(tilt * turn);
                }

                let speed = if input.is_held(KeyCode::ShiftLeft) {
                    self.speed * self.boost
                } else {
                    self.speed
                } * dt;

                camera.move_local(
                    axis(KeyCode::KeyS, KeyCode::KeyW) * speed,
                    axis(KeyCode::KeyA, KeyCode::KeyD) * speed,
                    axis(KeyCode::KeyQ, KeyCode::KeyE) * speed,
                );
            }
            CameraMode::Orbit { .. } => {
                if yaw != 0.0 || tilt != 0.0 {
                    camera.orbit(yaw * turn, tilt * turn);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::new(1024, 768, Vec3::new(0.0, 5.0, 15.0), 90.0)
    }

    #[test]
    fn test_pitch_clamps_short_of_the_pole() {
        let mut cam = camera();
        let limit = (90.0 - PITCH_LIMIT_DEG).to_radians();

        // A quarter turn stops at the limit instead of pointing straight up.
        assert!(cam.pitch(FRAC_PI_2));
        assert!((cam.orientation().y.asin() - limit).abs() < 1e-4);
        assert!(!cam.pitch(6f32.to_radians()));

        // Back down works from the limit.
        assert!(cam.pitch(-10f32.to_radians()));
        assert!(cam.orientation().angle_between(Vec3::Y) > PITCH_LIMIT_DEG.to_radians());
    }

    #[test]
    fn test_large_pitch_never_flips_over_the_top() {
        let mut cam = camera();
        assert!(cam.pitch(100f32.to_radians()));

        let look = cam.orientation();
        let heading = Vec3::new(look.x, 0.0, look.z).normalize();
        assert!(heading.abs_diff_eq(Vec3::NEG_Z, 1e-4), "heading {heading}");
        assert!(look.angle_between(Vec3::Y) >= PITCH_LIMIT_DEG.to_radians() - 1e-4);

        let mut down = camera();
        assert!(down.pitch(-100f32.to_radians()));
        let look = down.orientation();
        assert!(Vec3::new(look.x, 0.0, look.z).normalize().abs_diff_eq(Vec3::NEG_Z, 1e-4));
    }

    #[test]
    fn test_orientation_stays_unit() {
        let mut cam = camera();
        for i in 0..500 {
            cam.yaw(0.37);
            cam.pitch(if i % 2 == 0 { 0.11 } else { -0.13 });
        }
        assert!((cam.orientation().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_reset_restores_pose() {
        let mut cam = camera();
        cam.yaw(1.0);
        cam.move_local(3.0, 1.0, -2.0);
        cam.zoom(20.0);
        cam.toggle_mode(10.0);
        cam.reset();

        assert_eq!(cam.position, Vec3::new(0.0, 5.0, 15.0));
        assert_eq!(cam.orientation(), Vec3::NEG_Z);
        assert_eq!(cam.fov_deg, 90.0);
        assert_eq!(cam.mode, CameraMode::Fly);
    }

    #[test]
    fn test_move_local_follows_look() {
        let mut cam = camera();
        cam.move_local(2.0, 1.0, 0.5);
        assert!(cam.position.abs_diff_eq(Vec3::new(1.0, 5.5, 13.0), 1e-6));
    }

    #[test]
    fn test_zoom_clamps_fov() {
        let mut cam = camera();
        cam.zoom(500.0);
        assert_eq!(cam.fov_deg, FOV_RANGE_DEG.0);
        cam.zoom(-500.0);
        assert_eq!(cam.fov_deg, FOV_RANGE_DEG.1);
    }

    #[test]
    fn test_orbit_keeps_target_centred() {
        let mut cam = camera();
        cam.toggle_mode(10.0);
        let CameraMode::Orbit { target, .. } = cam.mode else {
            panic!("expected orbit mode");
        };

        cam.orbit(0.5, 0.2);
        let seen = cam.position + cam.orientation() * (target - cam.position).length();
        assert!(seen.abs_diff_eq(target, 1e-4));
        assert!((cam.orientation().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_view_projection_uploaded() {
        let cam = camera();
        let mut rec = crate::program::FrameRecorder::new();
        cam.upload(&mut rec);

        assert_eq!(rec.mat4_or(names::VIEW_MATRIX, Mat4::IDENTITY), cam.view_matrix());
        assert_eq!(
            rec.mat4_or(names::PROJECTION_MATRIX, Mat4::IDENTITY),
            cam.projection_matrix()
        );
        assert_eq!(rec.vec3_or(names::VIEW_POSITION, Vec3::ZERO), cam.position);
    }

    #[test]
    fn test_controller_keys() {
        let mut input = InputState::default();
        let mut cam = camera();
        let ctl = CameraController::new();

        input.press(KeyCode::KeyW);
        ctl.update(&input, 1.0, &mut cam);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 5.0, 10.0), 1e-5));

        input.end_frame();
        input.release(KeyCode::KeyW);
        input.press(KeyCode::Home);
        ctl.update(&input, 1.0, &mut cam);
        assert_eq!(cam.position, Vec3::new(0.0, 5.0, 15.0));
    }
}
