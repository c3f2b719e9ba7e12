//! The uniform/draw contract between game code and the GPU backend.
//!
//! Models, lights and the camera only ever talk to a [`ShaderProgram`]: they
//! set named uniforms and issue draws against handles. [`FrameRecorder`] is the
//! program used every frame; the renderer replays what it captured.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Names of the uniforms shared by the scene and shadow programs.
pub mod names {
    pub const WORLD_MATRIX: &str = "worldMatrix";
    pub const VIEW_MATRIX: &str = "viewMatrix";
    pub const PROJECTION_MATRIX: &str = "projectionMatrix";
    pub const VIEW_POSITION: &str = "viewPosition";
    pub const ENABLE_SHADOWS: &str = "enableShadows";
    pub const ENABLE_TEXTURES: &str = "enableTextures";
    pub const TEX_WRAP_X: &str = "texWrapX";
    pub const TEX_WRAP_Y: &str = "texWrapY";
    pub const MATERIAL_COLOR: &str = "materialColor";
    pub const MATERIAL_SHININESS: &str = "materialShininess";

    // Shadow program.
    pub const SHADOW_MATRICES: &str = "shadowMatrices";
    pub const LIGHT_POSITION: &str = "lightPosition";
    pub const LIGHT_FAR_PLANE: &str = "lightFarPlane";
    pub const LIGHT_SPACE_MATRIX: &str = "lightSpaceMatrix";

    // Per-light fields, used as `<light>.<field>`.
    pub const POS: &str = "POS";
    pub const COLOR: &str = "lightColor";
    pub const DIRECTION: &str = "lightDirection";
    pub const CONST_TERM: &str = "constTerm";
    pub const LINEAR_TERM: &str = "linearTerm";
    pub const QUAD_TERM: &str = "quadTerm";
    pub const FAR_PLANE: &str = "lightFarPlane";
    pub const CUTOFF_INNER: &str = "cutOffInner";
    pub const CUTOFF_OUTER: &str = "cutOffOuter";
    pub const SPACE_MATRIX: &str = "lightSpaceMatrix";

    /// `<light>.<field>`
    pub fn field(light: &str, field: &str) -> String {
        format!("{light}.{field}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Mat4Array(Vec<Mat4>),
}

macro_rules! uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for UniformValue {
            fn from(v: $ty) -> Self {
                UniformValue::$variant(v)
            }
        })*
    };
}

uniform_from! {
    bool => Bool,
    i32 => Int,
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat4 => Mat4,
    Vec<Mat4> => Mat4Array,
}

impl UniformValue {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            UniformValue::Bool(b) => Some(b),
            UniformValue::Int(i) => Some(i != 0),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            UniformValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match *self {
            UniformValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mat4(&self) -> Option<Mat4> {
        match *self {
            UniformValue::Mat4(m) => Some(m),
            _ => None,
        }
    }
}

/// Index into the mesh arena built at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

impl MeshHandle {
    pub const UNIT_CUBE: MeshHandle = MeshHandle(0);
}

/// Index into the texture arena built at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub const WHITE: TextureHandle = TextureHandle(0);
    pub const CHECKER: TextureHandle = TextureHandle(1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Points,
}

/// Receives uniforms and draw calls.
pub trait ShaderProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue);
    fn bind_mesh(&mut self, mesh: MeshHandle);
    fn bind_texture(&mut self, texture: TextureHandle);
    fn set_polygon_mode(&mut self, mode: PolygonMode);
    fn polygon_mode(&self) -> PolygonMode;
    fn draw_arrays(&mut self, primitive: Primitive, vertex_count: u32);

    fn set_mat4(&mut self, name: &str, m: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(m));
    }

    fn set_vec3(&mut self, name: &str, v: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(v));
    }

    fn set_f32(&mut self, name: &str, f: f32) {
        self.set_uniform(name, UniformValue::Float(f));
    }

    fn set_bool(&mut self, name: &str, b: bool) {
        self.set_uniform(name, UniformValue::Bool(b));
    }
}

/// Per-draw state captured at `draw_arrays` time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub world: Mat4,
    pub color: Vec3,
    pub shininess: f32,
    pub tex_wrap: Vec2,
    pub enable_textures: bool,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            color: Vec3::ONE,
            shininess: 0.1,
            tex_wrap: Vec2::ONE,
            enable_textures: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    pub mesh: MeshHandle,
    pub texture: TextureHandle,
    pub primitive: Primitive,
    pub polygon_mode: PolygonMode,
    pub vertex_count: u32,
    pub uniforms: DrawUniforms,
}

/// Records uniforms and draws for later submission.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    uniforms: HashMap<String, UniformValue>,
    draws: Vec<DrawRecord>,
    mesh: Option<MeshHandle>,
    texture: Option<TextureHandle>,
    polygon_mode: PolygonMode,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.uniform(name).and_then(UniformValue::as_bool).unwrap_or(default)
    }

    pub fn f32_or(&self, name: &str, default: f32) -> f32 {
        self.uniform(name).and_then(UniformValue::as_f32).unwrap_or(default)
    }

    pub fn vec3_or(&self, name: &str, default: Vec3) -> Vec3 {
        self.uniform(name).and_then(UniformValue::as_vec3).unwrap_or(default)
    }

    pub fn mat4_or(&self, name: &str, default: Mat4) -> Mat4 {
        self.uniform(name).and_then(UniformValue::as_mat4).unwrap_or(default)
    }

    pub fn mat4_array(&self, name: &str) -> Option<&[Mat4]> {
        match self.uniform(name) {
            Some(UniformValue::Mat4Array(m)) => Some(m),
            _ => None,
        }
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Drop recorded draws; uniform values persist like GPU program state.
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    fn capture(&self) -> DrawUniforms {
        let d = DrawUniforms::default();
        DrawUniforms {
            world: self.mat4_or(names::WORLD_MATRIX, d.world),
            color: self.vec3_or(names::MATERIAL_COLOR, d.color),
            shininess: self.f32_or(names::MATERIAL_SHININESS, d.shininess),
            tex_wrap: Vec2::new(
                self.f32_or(names::TEX_WRAP_X, d.tex_wrap.x),
                self.f32_or(names::TEX_WRAP_Y, d.tex_wrap.y),
            ),
            enable_textures: self.bool_or(names::ENABLE_TEXTURES, d.enable_textures),
        }
    }
}

impl ShaderProgram for FrameRecorder {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_owned(), value);
    }

    fn bind_mesh(&mut self, mesh: MeshHandle) {
        self.mesh = Some(mesh);
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
    }

    fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    fn draw_arrays(&mut self, primitive: Primitive, vertex_count: u32) {
        let Some(mesh) = self.mesh else {
            log::warn!("draw issued with no mesh bound; skipped");
            return;
        };

        self.draws.push(DrawRecord {
            mesh,
            texture: self.texture.unwrap_or(TextureHandle::WHITE),
            primitive,
            polygon_mode: self.polygon_mode,
            vertex_count,
            uniforms: self.capture(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_captures_current_uniforms() {
        let mut rec = FrameRecorder::new();
        rec.bind_mesh(MeshHandle::UNIT_CUBE);
        rec.set_mat4(names::WORLD_MATRIX, Mat4::from_translation(Vec3::X));
        rec.set_vec3(names::MATERIAL_COLOR, Vec3::new(1.0, 0.0, 0.0));
        rec.draw_arrays(Primitive::Triangles, 36);

        rec.set_mat4(names::WORLD_MATRIX, Mat4::IDENTITY);
        rec.draw_arrays(Primitive::Points, 36);

        let draws = rec.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].uniforms.world, Mat4::from_translation(Vec3::X));
        assert_eq!(draws[0].uniforms.color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(draws[1].uniforms.world, Mat4::IDENTITY);
        assert_eq!(draws[1].primitive, Primitive::Points);
        assert_eq!(draws[1].texture, TextureHandle::WHITE);
    }

    #[test]
    fn test_draw_without_mesh_is_skipped() {
        let mut rec = FrameRecorder::new();
        rec.draw_arrays(Primitive::Triangles, 36);
        assert!(rec.draws().is_empty());
    }

    #[test]
    fn test_clear_keeps_uniforms() {
        let mut rec = FrameRecorder::new();
        rec.bind_mesh(MeshHandle::UNIT_CUBE);
        rec.set_bool(names::ENABLE_SHADOWS, true);
        rec.draw_arrays(Primitive::Triangles, 36);
        rec.clear_draws();

        assert!(rec.draws().is_empty());
        assert!(rec.bool_or(names::ENABLE_SHADOWS, false));
    }

    #[test]
    fn test_namespaced_field() {
        assert_eq!(names::field("pointLight", names::POS), "pointLight.POS");
    }
}
