//! Depth targets: the window-sized scene depth and the point light's shadow cube.

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct Targets {
    _depth_tex: wgpu::Texture,
    pub depth: wgpu::TextureView,
}

impl Targets {
    pub fn new(device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) -> Self {
        let depth_tex = device.create_texture(&wgpu::TextureDescriptor {
            label:           Some("Scene Depth Target"),
            size:            wgpu::Extent3d {
                width:                 size.width.max(1),
                height:                size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count:    1,
            dimension:       wgpu::TextureDimension::D2,
            format:          DEPTH_FORMAT,
            usage:           wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats:    &[],
        });

        Self {
            depth: depth_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            _depth_tex: depth_tex,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) {
        *self = Self::new(device, size);
    }
}

/// Six-layer depth texture holding distance-to-light per face.
pub struct ShadowCube {
    _tex: wgpu::Texture,
    /// One 2D view per face, in `CUBE_FACES` order.
    pub faces: [wgpu::TextureView; 6],
    /// The whole cube, for sampling.
    pub cube: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: u32,
}

impl ShadowCube {
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let size = size.max(1);
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label:           Some("Shadow Cube"),
            size:            wgpu::Extent3d {
                width:                 size,
                height:                size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count:    1,
            dimension:       wgpu::TextureDimension::D2,
            format:          DEPTH_FORMAT,
            usage:           wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats:    &[],
        });

        let faces = std::array::from_fn(|layer| {
            tex.create_view(&wgpu::TextureViewDescriptor {
                label:             Some("Shadow Cube Face"),
                dimension:         Some(wgpu::TextureViewDimension::D2),
                base_array_layer:  layer as u32,
                array_layer_count: Some(1),
                ..Default::default()
            })
        });

        let cube = tex.create_view(&wgpu::TextureViewDescriptor {
            label:             Some("Shadow Cube View"),
            dimension:         Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        // Depth is compared by hand in the shader.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label:          Some("Shadow Sampler"),
            mag_filter:     wgpu::FilterMode::Nearest,
            min_filter:     wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Self {
            _tex: tex,
            faces,
            cube,
            sampler,
            size,
        }
    }
}
