//! GPU-side meshes and textures, addressed by the handles models carry.

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::types::Vertex;
use crate::model::UNIT_CUBE_VERTICES;
use crate::program::{MeshHandle, TextureHandle};

/// (normal, u axis, v axis) per face, with `u x v == normal`.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X,     Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y,     Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z,     Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Unit cube centred on the origin, counter-clockwise from outside.
pub fn unit_cube_vertices() -> Vec<Vertex> {
    const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    const ORDER: [usize; 6] = [0, 1, 2, 0, 2, 3];

    let mut out = Vec::with_capacity(UNIT_CUBE_VERTICES as usize);
    for (n, u, v) in FACES {
        for i in ORDER {
            let (su, sv) = CORNERS[i];
            let p = (n + u * su + v * sv) * 0.5;
            out.push(Vertex {
                position: p.to_array(),
                normal:   n.to_array(),
                uv:       [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
            });
        }
    }
    out
}

/// RGBA8 checkerboard, `cells` squares per side.
pub fn checker_pixels(size: u32, cells: u32) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut px = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let v = if ((x / cell) + (y / cell)) % 2 == 0 { 235 } else { 150 };
            px.extend_from_slice(&[v, v, v, 255]);
        }
    }
    px
}

pub struct GpuMesh {
    pub vertices: wgpu::Buffer,
    pub vertex_count: u32,
}

pub struct GpuTexture {
    _tex: wgpu::Texture,
    pub bind: wgpu::BindGroup,
}

/// Meshes and textures indexed by handle.
pub struct Resources {
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    pub texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl Resources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Albedo Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding:    0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty:         wgpu::BindingType::Texture {
                        sample_type:    wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled:   false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding:    1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty:         wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count:      None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label:          Some("Albedo Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter:     wgpu::FilterMode::Nearest,
            min_filter:     wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mut res = Self {
            meshes: Vec::new(),
            textures: Vec::new(),
            texture_layout,
            sampler,
        };

        let cube = res.add_mesh(device, "Unit Cube", &unit_cube_vertices());
        let white = res.add_texture(device, queue, "White", 1, &[255, 255, 255, 255]);
        let checker = res.add_texture(device, queue, "Checker", 8, &checker_pixels(8, 2));
        debug_assert_eq!(cube, MeshHandle::UNIT_CUBE);
        debug_assert_eq!(white, TextureHandle::WHITE);
        debug_assert_eq!(checker, TextureHandle::CHECKER);
        res
    }

    pub fn add_mesh(&mut self, device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> MeshHandle {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage:    wgpu::BufferUsages::VERTEX,
        });
        self.meshes.push(GpuMesh {
            vertices: buffer,
            vertex_count: vertices.len() as u32,
        });
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    /// Square RGBA8 texture of `size` texels per side.
    pub fn add_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        size: u32,
        rgba: &[u8],
    ) -> TextureHandle {
        let tex = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label:           Some(label),
                size:            wgpu::Extent3d {
                    width:                 size,
                    height:                size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count:    1,
                dimension:       wgpu::TextureDimension::D2,
                format:          wgpu::TextureFormat::Rgba8UnormSrgb,
                usage:           wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats:    &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some(label),
            layout:  &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding:  0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding:  1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.textures.push(GpuTexture { _tex: tex, bind });
        TextureHandle(self.textures.len() as u32 - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0 as usize)
    }

    /// Falls back to white for unknown handles.
    pub fn texture(&self, handle: TextureHandle) -> &GpuTexture {
        self.textures
            .get(handle.0 as usize)
            .unwrap_or(&self.textures[TextureHandle::WHITE.0 as usize])
    }
}
