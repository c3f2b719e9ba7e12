//! Replays a recorded frame on the GPU: six shadow cube faces, then the lit scene.

pub mod context;
pub mod pipelines;
pub mod resources;
pub mod targets;
pub mod types;

use self::{
    context::GfxContext,
    pipelines::{scene::ScenePipeline, shadow::ShadowPipeline, DynamicUniforms},
    resources::Resources,
    targets::{ShadowCube, Targets},
    types::{DrawUniform, FrameUniform, ShadowFaceUniform},
};
use crate::camera::Camera;
use crate::program::{names, DrawRecord, FrameRecorder, PolygonMode};
use crate::scene::{RenderFlags, Scene};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use winit::window::Window;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.05, g: 0.06, b: 0.09, a: 1.0 };

/// Cube face matrices follow the GL convention; flip Y for wgpu's face layout.
fn face_view_proj(face: Mat4) -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0)) * face
}

/// Shadow face uniforms from what the shadow pass uploaded.
pub fn shadow_faces(rec: &FrameRecorder) -> Vec<ShadowFaceUniform> {
    let light = rec.vec3_or(names::LIGHT_POSITION, Vec3::ZERO);
    let far = rec.f32_or(names::LIGHT_FAR_PLANE, 1.0);
    rec.mat4_array(names::SHADOW_MATRICES)
        .unwrap_or_default()
        .iter()
        .map(|&m| ShadowFaceUniform {
            view_proj: face_view_proj(m),
            light_pos_far: light.extend(far).to_array(),
        })
        .collect()
}

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub resources: Resources,
    shadow_cube: ShadowCube,
    scene_pipeline: ScenePipeline,
    shadow_pipeline: ShadowPipeline,
    draws: DynamicUniforms,
    shadow_rec: FrameRecorder,
    color_rec: FrameRecorder,
    warned_line_mode: bool,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, shadow_map_size: u32) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let targets = Targets::new(&gfx.device, gfx.size);
        let resources = Resources::new(&gfx.device, &gfx.queue);
        let shadow_cube = ShadowCube::new(&gfx.device, shadow_map_size);

        let draws = DynamicUniforms::new(
            &gfx.device,
            "Draw UBO",
            std::mem::size_of::<DrawUniform>() as u64,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            256,
        );
        let scene_pipeline = ScenePipeline::new(
            &gfx.device,
            gfx.config.format,
            &draws.layout,
            &resources.texture_layout,
            &shadow_cube,
            gfx.line_mode,
        );
        let shadow_pipeline = ShadowPipeline::new(&gfx.device, &draws.layout);

        log::info!(
            "renderer ready: {}x{}, shadow cube {}",
            gfx.size.width,
            gfx.size.height,
            shadow_cube.size
        );

        Ok(Self {
            gfx,
            targets,
            resources,
            shadow_cube,
            scene_pipeline,
            shadow_pipeline,
            draws,
            shadow_rec: FrameRecorder::new(),
            color_rec: FrameRecorder::new(),
            warned_line_mode: false,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        flags: RenderFlags,
    ) -> Result<(), wgpu::SurfaceError> {
        self.shadow_rec.clear_draws();
        self.color_rec.clear_draws();
        if flags.shadows {
            scene.render_shadow_pass(&mut self.shadow_rec);
        }
        scene.render_color_pass(&mut self.color_rec, camera, flags);

        if !self.scene_pipeline.has_line_mode()
            && !self.warned_line_mode
            && self.color_rec.draws().iter().any(|d| d.polygon_mode == PolygonMode::Line)
        {
            log::warn!("wireframe unsupported on this device; drawing filled");
            self.warned_line_mode = true;
        }

        let shadow_count = self.shadow_rec.draws().len();
        let draw_data: Vec<DrawUniform> = self
            .shadow_rec
            .draws()
            .iter()
            .chain(self.color_rec.draws())
            .map(|d| DrawUniform::from(&d.uniforms))
            .collect();
        self.draws.write(&self.gfx.device, &self.gfx.queue, &draw_data);

        let faces = shadow_faces(&self.shadow_rec);
        self.shadow_pipeline
            .faces
            .write(&self.gfx.device, &self.gfx.queue, &faces);
        self.scene_pipeline
            .write_frame(&self.gfx.queue, &FrameUniform::from_recorder(&self.color_rec));

        let frame = self.gfx.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Pass 1..6: shadow cube faces.
        if flags.shadows {
            for (face, face_view) in self.shadow_cube.faces.iter().enumerate().take(faces.len()) {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Shadow Face Pass"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: face_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                pass.set_pipeline(&self.shadow_pipeline.pipeline);
                pass.set_bind_group(0, &self.shadow_pipeline.faces.bind, &[self.shadow_pipeline.faces.offset(face)]);
                for (i, draw) in self.shadow_rec.draws().iter().enumerate() {
                    self.issue(&mut pass, draw, i);
                }
            }
        }

        // Final pass: lit scene.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.scene_pipeline.frame_bind, &[]);
            for (i, draw) in self.color_rec.draws().iter().enumerate() {
                pass.set_pipeline(self.scene_pipeline.pipeline_for(draw.primitive, draw.polygon_mode));
                pass.set_bind_group(2, &self.resources.texture(draw.texture).bind, &[]);
                self.issue(&mut pass, draw, shadow_count + i);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Bind the draw's uniforms (group 1) and mesh, then draw.
    fn issue<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, draw: &DrawRecord, slot: usize) {
        let Some(mesh) = self.resources.mesh(draw.mesh) else {
            return;
        };
        pass.set_bind_group(1, &self.draws.bind, &[self.draws.offset(slot)]);
        pass.set_vertex_buffer(0, mesh.vertices.slice(..));
        pass.draw(0..draw.vertex_count.min(mesh.vertex_count), 0..1);
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> anyhow::Result<()> {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::debug!("surface {err:?}; reconfiguring");
                self.gfx.reconfigure();
                Ok(())
            }
            wgpu::SurfaceError::Timeout => {
                log::warn!("surface timeout");
                Ok(())
            }
            wgpu::SurfaceError::OutOfMemory => Err(anyhow::anyhow!("GPU out of memory")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_faces_from_shadow_pass() {
        let scene = Scene::with_defaults(256);
        let mut rec = FrameRecorder::new();
        scene.render_shadow_pass(&mut rec);

        let faces = shadow_faces(&rec);
        assert_eq!(faces.len(), 6);
        let light = scene.point_light.position;
        for f in &faces {
            assert_eq!(f.light_pos_far, light.extend(scene.point_light.far).to_array());
        }
        let expected = face_view_proj(scene.point_light.cube_face_transforms()[0]);
        assert_eq!(faces[0].view_proj, expected);
    }

    #[test]
    fn test_no_shadow_faces_without_shadow_pass() {
        assert!(shadow_faces(&FrameRecorder::new()).is_empty());
    }
}
