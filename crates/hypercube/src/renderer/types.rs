//! GPU-side layouts of the uniforms the recorded frame is replayed with.
//!
//! Each struct must match its WGSL counterpart in `shaders/`.

use glam::{Mat4, Vec3};

use crate::program::{names, DrawUniforms, FrameRecorder};
use crate::scene::{DIR_LIGHT, POINT_LIGHT, SPOT_LIGHT};

/// Ambient term added to every lit fragment.
pub const AMBIENT: Vec3 = Vec3::new(0.12, 0.12, 0.14);

/// Per-frame camera and light parameters. Matches `Frame` in `scene.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view: Mat4,               // 64 B
    pub proj: Mat4,               // +64  -> 128
    pub view_pos: [f32; 4],       // +16  -> 144
    /// xyz: position, w: far plane.
    pub point_pos_far: [f32; 4],  // +16  -> 160
    /// rgb: colour, w: 1.0 when shadows are on.
    pub point_color: [f32; 4],    // +16  -> 176
    /// constant, linear, quadratic, unused.
    pub point_atten: [f32; 4],    // +16  -> 192
    /// xyz: position, w: cos(inner cutoff).
    pub spot_pos: [f32; 4],       // +16  -> 208
    /// xyz: direction, w: cos(outer cutoff).
    pub spot_dir: [f32; 4],       // +16  -> 224
    pub spot_color: [f32; 4],     // +16  -> 240
    pub dir_dir: [f32; 4],        // +16  -> 256
    pub dir_color: [f32; 4],      // +16  -> 272
    pub ambient: [f32; 4],        // +16  -> 288
}

const _: [(); 288] = [(); core::mem::size_of::<FrameUniform>()];

#[inline]
fn v4(v: Vec3, w: f32) -> [f32; 4] {
    v.extend(w).to_array()
}

impl FrameUniform {
    /// Collect the camera and light uniforms set during the colour pass.
    pub fn from_recorder(rec: &FrameRecorder) -> Self {
        let f = |light: &str, field: &str| names::field(light, field);
        let shadows = if rec.bool_or(names::ENABLE_SHADOWS, false) { 1.0 } else { 0.0 };

        Self {
            view: rec.mat4_or(names::VIEW_MATRIX, Mat4::IDENTITY),
            proj: rec.mat4_or(names::PROJECTION_MATRIX, Mat4::IDENTITY),
            view_pos: v4(rec.vec3_or(names::VIEW_POSITION, Vec3::ZERO), 1.0),
            point_pos_far: v4(
                rec.vec3_or(&f(POINT_LIGHT, names::POS), Vec3::ZERO),
                rec.f32_or(&f(POINT_LIGHT, names::FAR_PLANE), 100.0),
            ),
            point_color: v4(rec.vec3_or(&f(POINT_LIGHT, names::COLOR), Vec3::ZERO), shadows),
            point_atten: [
                rec.f32_or(&f(POINT_LIGHT, names::CONST_TERM), 1.0),
                rec.f32_or(&f(POINT_LIGHT, names::LINEAR_TERM), 0.0),
                rec.f32_or(&f(POINT_LIGHT, names::QUAD_TERM), 0.0),
                0.0,
            ],
            spot_pos: v4(
                rec.vec3_or(&f(SPOT_LIGHT, names::POS), Vec3::ZERO),
                rec.f32_or(&f(SPOT_LIGHT, names::CUTOFF_INNER), 0.0).cos(),
            ),
            spot_dir: v4(
                rec.vec3_or(&f(SPOT_LIGHT, names::DIRECTION), Vec3::NEG_Y),
                rec.f32_or(&f(SPOT_LIGHT, names::CUTOFF_OUTER), 0.0).cos(),
            ),
            spot_color: v4(rec.vec3_or(&f(SPOT_LIGHT, names::COLOR), Vec3::ZERO), 0.0),
            dir_dir: v4(rec.vec3_or(&f(DIR_LIGHT, names::DIRECTION), Vec3::NEG_Y), 0.0),
            dir_color: v4(rec.vec3_or(&f(DIR_LIGHT, names::COLOR), Vec3::ZERO), 0.0),
            ambient: v4(AMBIENT, 0.0),
        }
    }
}

/// Per-draw model data. Matches `Draw` in both shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub world: Mat4,        // 64 B
    /// Inverse-transpose of `world` for normals.
    pub normal: Mat4,       // +64 -> 128
    /// rgb: material colour, w: shininess.
    pub color: [f32; 4],    // +16 -> 144
    /// xy: texture wrap, z: 1.0 when textured.
    pub tex: [f32; 4],      // +16 -> 160
}

const _: [(); 160] = [(); core::mem::size_of::<DrawUniform>()];

impl From<&DrawUniforms> for DrawUniform {
    fn from(d: &DrawUniforms) -> Self {
        Self {
            world: d.world,
            normal: d.world.inverse().transpose(),
            color: d.color.extend(d.shininess).to_array(),
            tex: [
                d.tex_wrap.x,
                d.tex_wrap.y,
                if d.enable_textures { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// One shadow cube face. Matches `Face` in `shadow.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowFaceUniform {
    pub view_proj: Mat4,          // 64 B
    /// xyz: light position, w: far plane.
    pub light_pos_far: [f32; 4],  // +16 -> 80
}

const _: [(); 80] = [(); core::mem::size_of::<ShadowFaceUniform>()];

/// Interleaved unit-cube vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{Light, PointLight, SpotLight};
    use crate::program::ShaderProgram;

    #[test]
    fn test_frame_uniform_collects_lights() {
        let mut rec = FrameRecorder::new();
        PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE, 64)
            .upload_scene(&mut rec, POINT_LIGHT, true);
        SpotLight::new(Vec3::Y, Vec3::NEG_Y, 0.0, 0.0).upload_scene(&mut rec, SPOT_LIGHT, true);
        rec.set_vec3(names::VIEW_POSITION, Vec3::new(0.0, 5.0, 10.0));

        let u = FrameUniform::from_recorder(&rec);
        assert_eq!(u.point_pos_far, [1.0, 2.0, 3.0, 100.0]);
        assert_eq!(u.point_color[3], 1.0);
        assert_eq!(u.spot_pos[3], 1.0);
        assert_eq!(u.view_pos, [0.0, 5.0, 10.0, 1.0]);
    }

    #[test]
    fn test_draw_uniform_normal_matrix() {
        let d = DrawUniforms {
            world: Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)),
            enable_textures: true,
            ..DrawUniforms::default()
        };
        let u = DrawUniform::from(&d);
        assert!(u.normal.abs_diff_eq(Mat4::from_scale(Vec3::new(0.5, 1.0, 1.0)), 1e-6));
        assert_eq!(u.tex[2], 1.0);
        assert_eq!(u.color, [1.0, 1.0, 1.0, 0.1]);
    }
}
