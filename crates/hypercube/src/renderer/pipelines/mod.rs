pub mod scene;
pub mod shadow;

/// Round `size` up to a multiple of `align`.
#[inline]
pub fn aligned_stride(size: u64, align: u64) -> u64 {
    let align = align.max(1);
    size.div_ceil(align) * align
}

/// Uniform entry for a single bind group slot.
pub fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: u64,
    dynamic: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty:                 wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size:   wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

/// One uniform buffer holding many fixed-size records, bound with a dynamic offset.
pub struct DynamicUniforms {
    pub layout: wgpu::BindGroupLayout,
    pub bind: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    label: &'static str,
    item_size: u64,
    stride: u64,
    capacity: u64,
}

impl DynamicUniforms {
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        item_size: u64,
        visibility: wgpu::ShaderStages,
        capacity: u64,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some(label),
            entries: &[uniform_entry(0, visibility, item_size, true)],
        });
        let stride = aligned_stride(
            item_size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let capacity = capacity.max(1);
        let (buffer, bind) = Self::allocate(device, label, &layout, item_size, stride, capacity);

        Self {
            layout,
            bind,
            buffer,
            label,
            item_size,
            stride,
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        item_size: u64,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some(label),
            size:               stride * capacity,
            usage:              wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size:   wgpu::BufferSize::new(item_size),
                }),
            }],
        });
        (buffer, bind)
    }

    /// Upload `items`, growing the buffer when needed.
    pub fn write<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: &[T]) {
        let needed = items.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("{}: growing to {capacity} slots", self.label);
            let (buffer, bind) =
                Self::allocate(device, self.label, &self.layout, self.item_size, self.stride, capacity);
            self.buffer = buffer;
            self.bind = bind;
            self.capacity = capacity;
        }

        if items.is_empty() {
            return;
        }
        let mut staging = vec![0u8; (self.stride * needed) as usize];
        for (i, item) in items.iter().enumerate() {
            let start = i * self.stride as usize;
            let bytes = bytemuck::bytes_of(item);
            staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &staging);
    }

    #[inline]
    pub fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(160, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(80, 64), 128);
        assert_eq!(aligned_stride(80, 0), 80);
    }
}
