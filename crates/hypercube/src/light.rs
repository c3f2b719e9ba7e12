//! Point, spot and directional lights.
//!
//! Lights never draw. They compute light-space transforms for the shadow pass
//! and upload their parameters, namespaced by a light name, to a program.

use glam::{Mat4, Vec3};

use crate::program::{names, ShaderProgram, UniformValue};

/// Look direction and up vector for each cube-map face, in +X, -X, +Y, -Y,
/// +Z, -Z order.
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// What the shadow pass needs from a light.
#[derive(Debug, Clone, PartialEq)]
pub enum LightSpace {
    /// Casts no shadow.
    None,
    Single(Mat4),
    Cube([Mat4; 6]),
}

pub trait Light {
    fn light_space(&self) -> LightSpace;

    /// Upload colour, placement and attenuation under `<name>.<field>`.
    fn upload_scene(&self, program: &mut dyn ShaderProgram, name: &str, shadows_enabled: bool);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub near: f32,
    pub far: f32,
    /// Edge length of each cube-map face, in texels.
    pub shadow_map_size: u32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, shadow_map_size: u32) -> Self {
        Self {
            position,
            color,
            constant: 1.0,
            linear: 0.045,
            quadratic: 0.0075,
            near: 1.0,
            far: 100.0,
            shadow_map_size,
        }
    }

    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }

    /// 90° square frustum shared by all six faces.
    pub fn face_projection(&self) -> Mat4 {
        Mat4::perspective_rh(90f32.to_radians(), 1.0, self.near, self.far)
    }

    /// projection × view for every cube face.
    pub fn cube_face_transforms(&self) -> [Mat4; 6] {
        let proj = self.face_projection();
        CUBE_FACES.map(|(dir, up)| {
            proj * Mat4::look_at_rh(self.position, self.position + dir, up)
        })
    }

    /// Attenuation at `distance` from the light.
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    /// Face transforms plus what the depth pass needs to write linear depth.
    pub fn upload_shadow(&self, program: &mut dyn ShaderProgram) {
        program.set_uniform(
            names::SHADOW_MATRICES,
            UniformValue::Mat4Array(self.cube_face_transforms().to_vec()),
        );
        program.set_vec3(names::LIGHT_POSITION, self.position);
        program.set_f32(names::LIGHT_FAR_PLANE, self.far);
    }
}

impl Light for PointLight {
    fn light_space(&self) -> LightSpace {
        LightSpace::Cube(self.cube_face_transforms())
    }

    fn upload_scene(&self, program: &mut dyn ShaderProgram, name: &str, shadows_enabled: bool) {
        program.set_vec3(&names::field(name, names::POS), self.position);
        program.set_vec3(&names::field(name, names::COLOR), self.color);
        program.set_f32(&names::field(name, names::CONST_TERM), self.constant);
        program.set_f32(&names::field(name, names::LINEAR_TERM), self.linear);
        program.set_f32(&names::field(name, names::QUAD_TERM), self.quadratic);
        program.set_f32(&names::field(name, names::FAR_PLANE), self.far);
        program.set_bool(names::ENABLE_SHADOWS, shadows_enabled);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    /// Radians.
    pub cutoff_inner: f32,
    /// Radians.
    pub cutoff_outer: f32,
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3, cutoff_inner: f32, cutoff_outer: f32) -> Self {
        Self {
            position,
            direction,
            color: Vec3::ONE,
            cutoff_inner,
            cutoff_outer,
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }
}

impl Light for SpotLight {
    fn light_space(&self) -> LightSpace {
        LightSpace::None
    }

    fn upload_scene(&self, program: &mut dyn ShaderProgram, name: &str, _shadows_enabled: bool) {
        program.set_vec3(&names::field(name, names::POS), self.position);
        program.set_vec3(&names::field(name, names::DIRECTION), self.direction);
        program.set_vec3(&names::field(name, names::COLOR), self.color);
        program.set_f32(&names::field(name, names::CUTOFF_INNER), self.cutoff_inner);
        program.set_f32(&names::field(name, names::CUTOFF_OUTER), self.cutoff_outer);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Anchor of the shadow frustum.
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
    pub up: Vec3,
}

impl DirectionalLight {
    /// Half-width of the orthographic shadow frustum.
    pub const EXTENT: f32 = 50.0;

    pub fn new(position: Vec3, direction: Vec3, color: Vec3) -> Self {
        Self {
            position,
            direction,
            color,
            near: 5.0,
            far: 150.0,
            up: Vec3::Y,
        }
    }

    pub fn light_space_matrix(&self) -> Mat4 {
        let e = Self::EXTENT;
        let proj = Mat4::orthographic_rh(-e, e, -e, e, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, self.position + self.direction, self.up);
        proj * view
    }

    pub fn upload_shadow(&self, program: &mut dyn ShaderProgram) {
        program.set_mat4(names::LIGHT_SPACE_MATRIX, self.light_space_matrix());
    }
}

impl Light for DirectionalLight {
    fn light_space(&self) -> LightSpace {
        LightSpace::Single(self.light_space_matrix())
    }

    fn upload_scene(&self, program: &mut dyn ShaderProgram, name: &str, shadows_enabled: bool) {
        program.set_mat4(&names::field(name, names::SPACE_MATRIX), self.light_space_matrix());
        program.set_vec3(&names::field(name, names::DIRECTION), self.direction);
        program.set_vec3(&names::field(name, names::COLOR), self.color);
        program.set_bool(names::ENABLE_SHADOWS, shadows_enabled);
    }
}

/// Any of the three light kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneLight {
    Point(PointLight),
    Spot(SpotLight),
    Directional(DirectionalLight),
}

impl SceneLight {
    fn inner(&self) -> &dyn Light {
        match self {
            SceneLight::Point(l) => l,
            SceneLight::Spot(l) => l,
            SceneLight::Directional(l) => l,
        }
    }

    pub fn color(&self) -> Vec3 {
        match self {
            SceneLight::Point(l) => l.color,
            SceneLight::Spot(l) => l.color,
            SceneLight::Directional(l) => l.color,
        }
    }

    pub fn set_color(&mut self, color: Vec3) {
        match self {
            SceneLight::Point(l) => l.color = color,
            SceneLight::Spot(l) => l.color = color,
            SceneLight::Directional(l) => l.color = color,
        }
    }
}

impl Light for SceneLight {
    fn light_space(&self) -> LightSpace {
        self.inner().light_space()
    }

    fn upload_scene(&self, program: &mut dyn ShaderProgram, name: &str, shadows_enabled: bool) {
        self.inner().upload_scene(program, name, shadows_enabled)
    }
}

impl From<PointLight> for SceneLight {
    fn from(l: PointLight) -> Self {
        SceneLight::Point(l)
    }
}

impl From<SpotLight> for SceneLight {
    fn from(l: SpotLight) -> Self {
        SceneLight::Spot(l)
    }
}

impl From<DirectionalLight> for SceneLight {
    fn from(l: DirectionalLight) -> Self {
        SceneLight::Directional(l)
    }
}
