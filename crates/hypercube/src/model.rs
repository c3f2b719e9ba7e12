//! Composite models: rigid assemblies of box instances sharing one transform.

use std::path::{Path, PathBuf};

use boxcsv::BoxInstance;
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::program::{
    names, MeshHandle, PolygonMode, Primitive, ShaderProgram, TextureHandle,
};

/// Vertex count of the shared unit-cube mesh.
pub const UNIT_CUBE_VERTICES: u32 = 36;

/// How a model's boxes are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DrawMode {
    #[default]
    Triangles,
    Lines,
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    /// White plastic.
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            shininess: 0.1,
        }
    }
}

impl Material {
    pub fn new(color: Vec3, shininess: f32) -> Self {
        Self { color, shininess }
    }
}

#[derive(Debug, Clone)]
pub struct CompositeModel {
    /// `None` means the built-in single unit box.
    file_path: Option<PathBuf>,
    boxes: Vec<BoxInstance>,

    pub position: Vec3,
    pub scale: f32,
    pub rotation: Quat,
    pub draw_mode: DrawMode,

    initial_position: Vec3,
    initial_scale: f32,
    initial_rotation: Quat,
    initial_draw_mode: DrawMode,

    pub material: Material,
    mesh: MeshHandle,
    vertex_count: u32,
    texture: TextureHandle,
    pub tex_wrap: Vec2,
}

fn boxes_for(path: Option<&Path>) -> Vec<BoxInstance> {
    match path {
        Some(p) => boxcsv::load_shape(p),
        None => vec![BoxInstance::unit()],
    }
}

fn non_empty(path: &Path) -> Option<PathBuf> {
    (!path.as_os_str().is_empty()).then(|| path.to_path_buf())
}

impl CompositeModel {
    /// Load a model from a shape file. An empty path yields one unit box; an
    /// unreadable file yields a model that draws nothing.
    pub fn new(
        file_path: impl AsRef<Path>,
        position: Vec3,
        scale: f32,
        draw_mode: DrawMode,
    ) -> Self {
        let file_path = non_empty(file_path.as_ref());
        let boxes = boxes_for(file_path.as_deref());
        Self::with_boxes(file_path, boxes, position, scale, draw_mode)
    }

    /// A model from boxes built in memory.
    pub fn from_boxes(
        boxes: Vec<BoxInstance>,
        position: Vec3,
        scale: f32,
        draw_mode: DrawMode,
    ) -> Self {
        Self::with_boxes(None, boxes, position, scale, draw_mode)
    }

    fn with_boxes(
        file_path: Option<PathBuf>,
        boxes: Vec<BoxInstance>,
        position: Vec3,
        scale: f32,
        draw_mode: DrawMode,
    ) -> Self {
        Self {
            file_path,
            boxes,
            position,
            scale,
            rotation: Quat::IDENTITY,
            draw_mode,
            initial_position: position,
            initial_scale: scale,
            initial_rotation: Quat::IDENTITY,
            initial_draw_mode: draw_mode,
            material: Material::default(),
            mesh: MeshHandle::UNIT_CUBE,
            vertex_count: UNIT_CUBE_VERTICES,
            texture: TextureHandle::WHITE,
            tex_wrap: Vec2::ONE,
        }
    }

    /// Restore the live transform and draw mode. Geometry is untouched.
    pub fn reset_model(&mut self) {
        self.position = self.initial_position;
        self.rotation = self.initial_rotation;
        self.scale = self.initial_scale;
        self.draw_mode = self.initial_draw_mode;
    }

    /// Point at another shape file and reload its boxes.
    pub fn update_file_path(&mut self, file_path: impl AsRef<Path>) {
        self.file_path = non_empty(file_path.as_ref());
        self.boxes = boxes_for(self.file_path.as_deref());
    }

    /// Replace the geometry with in-memory boxes.
    pub fn set_boxes(&mut self, boxes: Vec<BoxInstance>) {
        self.file_path = None;
        self.boxes = boxes;
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn boxes(&self) -> &[BoxInstance] {
        &self.boxes
    }

    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    pub fn initial_scale(&self) -> f32 {
        self.initial_scale
    }

    pub fn initial_rotation(&self) -> Quat {
        self.initial_rotation
    }

    pub fn initial_draw_mode(&self) -> DrawMode {
        self.initial_draw_mode
    }

    pub fn link_mesh(&mut self, mesh: MeshHandle, vertex_count: u32) {
        self.mesh = mesh;
        self.vertex_count = vertex_count;
    }

    pub fn link_texture(&mut self, texture: TextureHandle) {
        self.texture = texture;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// World transform of the model itself, before per-box offsets.
    pub fn transform(&self, parent: Mat4) -> Mat4 {
        parent * Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)
    }

    /// World transform of one box.
    pub fn box_transform(&self, parent: Mat4, b: &BoxInstance) -> Mat4 {
        let local = Vec3::from(b.position) * self.scale;
        let size = Vec3::from(b.scale) * self.scale;
        self.transform(parent) * Mat4::from_translation(local) * Mat4::from_scale(size)
    }

    /// Issue one draw per box. Returns the number of draws issued.
    ///
    /// Wireframe switches the program to line polygons and back to fill
    /// afterwards.
    pub fn render(
        &self,
        program: &mut dyn ShaderProgram,
        textures_enabled: bool,
        parent: Mat4,
    ) -> usize {
        program.set_vec3(names::MATERIAL_COLOR, self.material.color);
        program.set_f32(names::MATERIAL_SHININESS, self.material.shininess);
        program.set_f32(names::TEX_WRAP_X, self.tex_wrap.x);
        program.set_f32(names::TEX_WRAP_Y, self.tex_wrap.y);
        program.set_bool(names::ENABLE_TEXTURES, textures_enabled);
        program.bind_mesh(self.mesh);
        program.bind_texture(self.texture);

        let primitive = match self.draw_mode {
            DrawMode::Triangles | DrawMode::Lines => Primitive::Triangles,
            DrawMode::Points => Primitive::Points,
        };
        if self.draw_mode == DrawMode::Lines {
            program.set_polygon_mode(PolygonMode::Line);
        }

        for b in &self.boxes {
            program.set_mat4(names::WORLD_MATRIX, self.box_transform(parent, b));
            program.draw_arrays(primitive, self.vertex_count);
        }

        if self.draw_mode == DrawMode::Lines {
            program.set_polygon_mode(PolygonMode::Fill);
        }

        self.boxes.len()
    }
}

/// Shared parent transform for several models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelGroup {
    pub position: Vec3,
    pub scale: f32,
    pub rotation: Quat,
}

impl Default for ModelGroup {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: Quat::IDENTITY,
        }
    }
}

impl ModelGroup {
    pub fn new(position: Vec3, scale: f32, rotation: Quat) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// translate × scale × rotate
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_quat(self.rotation)
    }

    pub fn render<'a>(
        &self,
        program: &mut dyn ShaderProgram,
        textures_enabled: bool,
        members: impl IntoIterator<Item = &'a CompositeModel>,
    ) -> usize {
        let base = self.transform();
        members
            .into_iter()
            .map(|m| m.render(program, textures_enabled, base))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::FrameRecorder;
    use std::f32::consts::FRAC_PI_2;

    fn tee() -> Vec<BoxInstance> {
        vec![
            BoxInstance::unit_at(-1.0, 1.0, 0.0),
            BoxInstance::unit_at(0.0, 1.0, 0.0),
            BoxInstance::unit_at(1.0, 1.0, 0.0),
            BoxInstance::unit_at(0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_empty_path_is_unit_box() {
        let model = CompositeModel::new("", Vec3::ZERO, 1.0, DrawMode::Triangles);
        assert_eq!(model.boxes(), &[BoxInstance::unit()]);
        assert!(model.file_path().is_none());

        let mut rec = FrameRecorder::new();
        assert_eq!(model.render(&mut rec, false, Mat4::IDENTITY), 1);
        assert_eq!(rec.draws()[0].vertex_count, UNIT_CUBE_VERTICES);
    }

    #[test]
    fn test_missing_file_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let model = CompositeModel::new(
            dir.path().join("missing.csv"),
            Vec3::ZERO,
            1.0,
            DrawMode::Triangles,
        );
        let mut rec = FrameRecorder::new();
        assert_eq!(model.render(&mut rec, true, Mat4::IDENTITY), 0);
        assert!(rec.draws().is_empty());
    }

    #[test]
    fn test_loads_and_reloads_file() {
        let dir = tempfile::tempdir().unwrap();
        let tee_path = dir.path().join("Tee.csv");
        let bar_path = dir.path().join("Bar.csv");
        boxcsv::write_file(&tee_path, &tee()).unwrap();
        boxcsv::write_file(&bar_path, &[BoxInstance::unit(), BoxInstance::unit_at(0.0, 1.0, 0.0)])
            .unwrap();

        let start = Vec3::new(0.0, 0.0, -20.0);
        let mut model = CompositeModel::new(&tee_path, start, 1.0, DrawMode::Triangles);
        assert_eq!(model.boxes().len(), 4);

        model.position.z = -5.0;
        model.update_file_path(&bar_path);
        assert_eq!(model.boxes().len(), 2);
        assert_eq!(model.file_path(), Some(bar_path.as_path()));
        assert_eq!(model.position.z, -5.0);
        assert_eq!(model.initial_position(), Vec3::new(0.0, 0.0, -20.0));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut model =
            CompositeModel::from_boxes(tee(), Vec3::new(1.0, 2.0, 3.0), 0.5, DrawMode::Points);
        model.position = Vec3::splat(9.0);
        model.scale = 4.0;
        model.rotation = Quat::from_rotation_y(1.0);
        model.draw_mode = DrawMode::Lines;

        model.reset_model();
        let first = (model.position, model.rotation, model.scale, model.draw_mode);
        for _ in 0..5 {
            model.reset_model();
        }
        let again = (model.position, model.rotation, model.scale, model.draw_mode);

        assert_eq!(first, again);
        assert_eq!(first.0, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(first.1, Quat::IDENTITY);
        assert_eq!(first.2, 0.5);
        assert_eq!(first.3, DrawMode::Points);
        assert_eq!(model.boxes().len(), 4);
    }

    #[test]
    fn test_box_transform_composition() {
        let mut model = CompositeModel::from_boxes(
            vec![BoxInstance::new([1.0, 0.0, 0.0], [1.0, 2.0, 1.0])],
            Vec3::new(0.0, 0.0, -10.0),
            2.0,
            DrawMode::Triangles,
        );
        model.rotation = Quat::from_rotation_z(FRAC_PI_2);

        let mut rec = FrameRecorder::new();
        model.render(&mut rec, false, Mat4::IDENTITY);
        let world = rec.draws()[0].uniforms.world;

        // Local offset (1,0,0)*2 rotated a quarter turn about z lands on +y.
        let centre = world.transform_point3(Vec3::ZERO);
        assert!(centre.abs_diff_eq(Vec3::new(0.0, 2.0, -10.0), 1e-5));

        // Box height 2*2 along local y becomes width along -x after rotation.
        let top = world.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!(top.abs_diff_eq(Vec3::new(-2.0, 2.0, -10.0), 1e-5));
    }

    #[test]
    fn test_parent_transform_applies_first() {
        let model =
            CompositeModel::from_boxes(vec![BoxInstance::unit()], Vec3::X, 1.0, DrawMode::Triangles);
        let parent = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let mut rec = FrameRecorder::new();
        model.render(&mut rec, false, parent);

        let centre = rec.draws()[0].uniforms.world.transform_point3(Vec3::ZERO);
        assert!(centre.abs_diff_eq(Vec3::new(1.0, 5.0, 0.0), 1e-6));
    }

    #[test]
    fn test_wireframe_restores_fill() {
        let model = CompositeModel::from_boxes(tee(), Vec3::ZERO, 1.0, DrawMode::Lines);
        let mut rec = FrameRecorder::new();
        assert_eq!(model.render(&mut rec, false, Mat4::IDENTITY), 4);

        assert!(rec
            .draws()
            .iter()
            .all(|d| d.polygon_mode == PolygonMode::Line && d.primitive == Primitive::Triangles));
        assert_eq!(rec.polygon_mode(), PolygonMode::Fill);
    }

    #[test]
    fn test_points_mode() {
        let model = CompositeModel::from_boxes(tee(), Vec3::ZERO, 1.0, DrawMode::Points);
        let mut rec = FrameRecorder::new();
        model.render(&mut rec, false, Mat4::IDENTITY);
        assert!(rec.draws().iter().all(|d| d.primitive == Primitive::Points));
    }

    #[test]
    fn test_material_and_texture_reach_draws() {
        let mut model = CompositeModel::from_boxes(tee(), Vec3::ZERO, 1.0, DrawMode::Triangles);
        model.set_material(Material::new(Vec3::new(0.2, 0.4, 0.8), 32.0));
        model.link_texture(TextureHandle::CHECKER);
        model.tex_wrap = Vec2::new(9.0, 9.0);

        let mut rec = FrameRecorder::new();
        model.render(&mut rec, true, Mat4::IDENTITY);
        let d = rec.draws()[0];
        assert_eq!(d.texture, TextureHandle::CHECKER);
        assert_eq!(d.uniforms.color, Vec3::new(0.2, 0.4, 0.8));
        assert_eq!(d.uniforms.shininess, 32.0);
        assert_eq!(d.uniforms.tex_wrap, Vec2::new(9.0, 9.0));
        assert!(d.uniforms.enable_textures);
    }

    #[test]
    fn test_group_transform_order() {
        let turn = Quat::from_rotation_y(FRAC_PI_2);
        let group = ModelGroup::new(Vec3::new(0.0, 0.0, -3.0), 2.0, turn);
        let p = group.transform().transform_point3(Vec3::X);
        // Rotate +x to -z, scale by 2, then translate.
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));

        let a = CompositeModel::from_boxes(tee(), Vec3::ZERO, 1.0, DrawMode::Triangles);
        let b = CompositeModel::new("", Vec3::ZERO, 1.0, DrawMode::Triangles);
        let mut rec = FrameRecorder::new();
        assert_eq!(group.render(&mut rec, false, [&a, &b]), 5);
    }
}
