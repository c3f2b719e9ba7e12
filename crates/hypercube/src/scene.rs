//! The fixed set of models and lights in play, and the order they are drawn.

use boxcsv::BoxInstance;
use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::light::{DirectionalLight, Light, PointLight, SpotLight};
use crate::model::{CompositeModel, DrawMode, Material, ModelGroup};
use crate::program::{ShaderProgram, TextureHandle};

pub const POINT_LIGHT: &str = "pointLight";
pub const SPOT_LIGHT: &str = "spotLight";
pub const DIR_LIGHT: &str = "dirLight";

/// Plane the wall stands in.
pub const WALL_Z: f32 = 0.0;
/// Where each new shape starts its approach.
pub const SHAPE_START: Vec3 = Vec3::new(0.0, 0.0, -25.0);
/// Top of the floor slab.
pub const FLOOR_Y: f32 = -5.0;

const FLOOR_HALF_EXTENT: f32 = 40.0;

/// Models in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Floor,
    Shape,
    Wall,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Floor, Entity::Shape, Entity::Wall];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Per-frame render switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFlags {
    pub shadows: bool,
    pub textures: bool,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            shadows: true,
            textures: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    models: Vec<CompositeModel>,
    /// Parent transform shared by the shape and its wall.
    pub stage: ModelGroup,
    pub point_light: PointLight,
    pub spot_light: SpotLight,
    pub sun: DirectionalLight,
    point_light_color: Vec3,
}

fn floor() -> CompositeModel {
    let slab = BoxInstance::new(
        [0.0, FLOOR_Y - 0.5, -FLOOR_HALF_EXTENT / 2.0],
        [FLOOR_HALF_EXTENT * 2.0, 1.0, FLOOR_HALF_EXTENT * 2.0],
    );
    let mut model = CompositeModel::from_boxes(vec![slab], Vec3::ZERO, 1.0, DrawMode::Triangles);
    model.set_material(Material::new(Vec3::new(0.55, 0.6, 0.65), 4.0));
    model.link_texture(TextureHandle::CHECKER);
    model.tex_wrap = Vec2::splat(FLOOR_HALF_EXTENT);
    model
}

impl Scene {
    /// Lay out the floor and lights around a shape and its wall.
    pub fn new(mut shape: CompositeModel, mut wall: CompositeModel, shadow_map_size: u32) -> Self {
        shape.set_material(Material::new(Vec3::new(0.95, 0.55, 0.12), 32.0));
        wall.set_material(Material::new(Vec3::new(0.62, 0.64, 0.7), 8.0));
        wall.link_texture(TextureHandle::CHECKER);

        let point_light_color = Vec3::splat(0.9);
        let point_light = PointLight::new(Vec3::new(0.0, 14.0, -8.0), point_light_color, shadow_map_size);
        let spot_light = SpotLight::new(
            Vec3::new(0.0, 18.0, WALL_Z),
            Vec3::NEG_Y,
            12.5f32.to_radians(),
            17.5f32.to_radians(),
        )
        .with_color(Vec3::new(0.5, 0.5, 0.6));
        let sun = DirectionalLight::new(
            Vec3::new(-30.0, 50.0, 30.0),
            Vec3::new(0.6, -1.0, -0.6),
            Vec3::new(0.25, 0.24, 0.22),
        );

        Self {
            models: vec![floor(), shape, wall],
            stage: ModelGroup::default(),
            point_light,
            spot_light,
            sun,
            point_light_color,
        }
    }

    /// The usual pair: a shape at the start line and a full wall at the wall plane.
    pub fn with_defaults(shadow_map_size: u32) -> Self {
        let shape = CompositeModel::new("", SHAPE_START, 1.0, DrawMode::Triangles);
        let wall = CompositeModel::from_boxes(
            boxcsv::WallLayout::full().to_boxes(),
            Vec3::new(0.0, 0.0, WALL_Z),
            1.0,
            DrawMode::Triangles,
        );
        Self::new(shape, wall, shadow_map_size)
    }

    pub fn model(&self, entity: Entity) -> &CompositeModel {
        &self.models[entity.index()]
    }

    pub fn model_mut(&mut self, entity: Entity) -> &mut CompositeModel {
        &mut self.models[entity.index()]
    }

    pub fn shape(&self) -> &CompositeModel {
        self.model(Entity::Shape)
    }

    pub fn wall(&self) -> &CompositeModel {
        self.model(Entity::Wall)
    }

    /// Scale the point light's colour, `1 + gain * intensity` times its rest colour.
    pub fn apply_flare(&mut self, intensity: f32, gain: f32) {
        self.point_light.color = self.point_light_color * (1.0 + gain * intensity.clamp(0.0, 1.0));
    }

    /// Shadow casters into the point light's cube map.
    pub fn render_shadow_pass(&self, program: &mut dyn ShaderProgram) -> usize {
        self.point_light.upload_shadow(program);
        self.sun.upload_shadow(program);
        self.stage.render(program, false, [self.shape(), self.wall()])
    }

    /// Everything, lit.
    pub fn render_color_pass(
        &self,
        program: &mut dyn ShaderProgram,
        camera: &Camera,
        flags: RenderFlags,
    ) -> usize {
        camera.upload(program);
        self.point_light.upload_scene(program, POINT_LIGHT, flags.shadows);
        self.spot_light.upload_scene(program, SPOT_LIGHT, flags.shadows);
        self.sun.upload_scene(program, DIR_LIGHT, flags.shadows);

        let floor = self.model(Entity::Floor).render(program, flags.textures, Mat4::IDENTITY);
        floor + self.stage.render(program, flags.textures, [self.shape(), self.wall()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{names, FrameRecorder};

    #[test]
    fn test_entities_index_models() {
        let scene = Scene::with_defaults(512);
        assert_eq!(scene.model(Entity::Floor).boxes().len(), 1);
        assert_eq!(scene.shape().boxes().len(), 1);
        assert_eq!(scene.wall().boxes().len(), 81);
        assert_eq!(scene.shape().position, SHAPE_START);
    }

    #[test]
    fn test_shadow_pass_draws_shape_and_wall() {
        let scene = Scene::with_defaults(512);
        let mut rec = FrameRecorder::new();
        assert_eq!(scene.render_shadow_pass(&mut rec), 82);
        assert_eq!(rec.mat4_array(names::SHADOW_MATRICES).map(|m| m.len()), Some(6));
    }

    #[test]
    fn test_color_pass_uploads_lights_and_flags() {
        let scene = Scene::with_defaults(512);
        let camera = Camera::new(1024, 768, Vec3::new(0.0, 10.0, 18.0), 90.0);
        let mut rec = FrameRecorder::new();
        let flags = RenderFlags {
            shadows: false,
            textures: true,
        };

        assert_eq!(scene.render_color_pass(&mut rec, &camera, flags), 83);
        assert!(!rec.bool_or(names::ENABLE_SHADOWS, true));
        assert!(rec.uniform("pointLight.POS").is_some());
        assert!(rec.uniform("spotLight.cutOffOuter").is_some());
        assert!(rec.uniform("dirLight.lightSpaceMatrix").is_some());
        assert_eq!(rec.draws()[0].texture, TextureHandle::CHECKER);
        assert!(rec.draws().iter().all(|d| d.uniforms.enable_textures));
    }

    #[test]
    fn test_flare_scales_point_light() {
        let mut scene = Scene::with_defaults(512);
        let rest = scene.point_light.color;
        scene.apply_flare(1.0, 3.0);
        assert_eq!(scene.point_light.color, rest * 4.0);
        scene.apply_flare(0.0, 3.0);
        assert_eq!(scene.point_light.color, rest);
    }
}
