use super::DynamicUniforms;
use crate::renderer::targets::DEPTH_FORMAT;
use crate::renderer::types::{ShadowFaceUniform, Vertex};

// Only the position attribute is read.
const POSITION_ONLY: [wgpu::VertexAttribute; 1] = [Vertex::ATTRIBUTES[0]];

/// Depth-only pass rendering distance-to-light into one cube face at a time.
pub struct ShadowPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub faces: DynamicUniforms,
}

impl ShadowPipeline {
    pub fn new(device: &wgpu::Device, draw_layout: &wgpu::BindGroupLayout) -> Self {
        let faces = DynamicUniforms::new(
            device,
            "Shadow Face UBO",
            std::mem::size_of::<ShadowFaceUniform>() as u64,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            6,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("shaders/shadow.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/shadow.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:                Some("Shadow PipelineLayout"),
            bind_group_layouts:   &[&faces.layout, draw_layout],
            push_constant_ranges: &[],
        });

        let position_only = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode:    wgpu::VertexStepMode::Vertex,
            attributes:   &POSITION_ONLY,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:  Some("Shadow Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module:              &shader,
                entry_point:         "vs_main",
                buffers:             &[position_only],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology:  wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format:              DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare:       wgpu::CompareFunction::LessEqual,
                stencil:             wgpu::StencilState::default(),
                bias:                wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module:              &shader,
                entry_point:         "fs_main",
                targets:             &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview:   None,
        });

        Self { pipeline, faces }
    }
}
