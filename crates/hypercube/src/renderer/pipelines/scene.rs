use super::uniform_entry;
use crate::program::{PolygonMode, Primitive};
use crate::renderer::targets::{ShadowCube, DEPTH_FORMAT};
use crate::renderer::types::{FrameUniform, Vertex};

/// The lit colour pass, in its fill, wireframe and point variants.
pub struct ScenePipeline {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
    point: wgpu::RenderPipeline,
    frame_buf: wgpu::Buffer,
    pub frame_bind: wgpu::BindGroup,
}

impl ScenePipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        draw_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        shadow: &ShadowCube,
        line_mode: bool,
    ) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Frame Layout"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    std::mem::size_of::<FrameUniform>() as u64,
                    false,
                ),
                wgpu::BindGroupLayoutEntry {
                    binding:    1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty:         wgpu::BindingType::Texture {
                        sample_type:    wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled:   false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding:    2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty:         wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count:      None,
                },
            ],
        });

        let frame_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("Scene Frame UBO"),
            size:               std::mem::size_of::<FrameUniform>() as u64,
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind = Self::frame_bind_group(device, &frame_layout, &frame_buf, shadow);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("shaders/scene.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/scene.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Scene PipelineLayout"),
            bind_group_layouts:   &[&frame_layout, draw_layout, texture_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str, topology, polygon_mode, cull_mode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label:  Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module:              &shader,
                    entry_point:         "vs_main",
                    buffers:             &[Vertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format:              DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare:       wgpu::CompareFunction::Less,
                    stencil:             wgpu::StencilState::default(),
                    bias:                wgpu::DepthBiasState::default(),
                }),
                fragment: Some(wgpu::FragmentState {
                    module:      &shader,
                    entry_point: "fs_main",
                    targets:     &[Some(wgpu::ColorTargetState {
                        format:     color_fmt,
                        blend:      None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview:   None,
            })
        };

        let fill = build(
            "Scene Fill Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PolygonMode::Fill,
            Some(wgpu::Face::Back),
        );
        let line = line_mode.then(|| {
            build(
                "Scene Line Pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::PolygonMode::Line,
                None,
            )
        });
        let point = build(
            "Scene Point Pipeline",
            wgpu::PrimitiveTopology::PointList,
            wgpu::PolygonMode::Fill,
            None,
        );

        Self {
            fill,
            line,
            point,
            frame_buf,
            frame_bind,
        }
    }

    fn frame_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        frame_buf: &wgpu::Buffer,
        shadow: &ShadowCube,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Scene Frame Bind"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding:  0,
                    resource: frame_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding:  1,
                    resource: wgpu::BindingResource::TextureView(&shadow.cube),
                },
                wgpu::BindGroupEntry {
                    binding:  2,
                    resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                },
            ],
        })
    }

    pub fn write_frame(&self, queue: &wgpu::Queue, frame: &FrameUniform) {
        queue.write_buffer(&self.frame_buf, 0, bytemuck::bytes_of(frame));
    }

    pub fn has_line_mode(&self) -> bool {
        self.line.is_some()
    }

    /// Pipeline for a recorded draw. Wireframe falls back to fill without device support.
    pub fn pipeline_for(&self, primitive: Primitive, polygon_mode: PolygonMode) -> &wgpu::RenderPipeline {
        match (primitive, polygon_mode) {
            (Primitive::Points, _) => &self.point,
            (Primitive::Triangles, PolygonMode::Line) => self.line.as_ref().unwrap_or(&self.fill),
            (Primitive::Triangles, PolygonMode::Fill) => &self.fill,
        }
    }
}
