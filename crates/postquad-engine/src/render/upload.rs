//! Staging-buffer uploads.
//!
//! Geometry is written into one CPU-writable staging buffer (vertices first,
//! indices right after) and moved into the GPU-resident vertex and index
//! buffers by a copy submission. That submission lands on the queue before
//! the frame's render submission, so the draws see the new bytes.
//!
//! The staging buffer is never mapped. `Queue::write_buffer` fills it in place
//! of a map/write/unmap cycle; wgpu copies those bytes through its own
//! internal staging memory first, so each upload is copied twice before the
//! draw reads it.

use std::ops::Range;

use crate::error::UploadError;

use super::vertex::Vertex;

/// Size of one index element (`u32`).
pub const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Byte capacities of the GPU vertex and index buffers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UploadCapacity {
    pub vertex_bytes: u64,
    pub index_bytes: u64,
}

impl UploadCapacity {
    /// Capacity for `max_quads` quads (4 vertices, 6 indices each).
    pub fn for_quads(max_quads: u32) -> Self {
        let quads = u64::from(max_quads.max(1));
        Self {
            vertex_bytes: quads * 4 * Vertex::SIZE,
            index_bytes: quads * 6 * INDEX_SIZE,
        }
    }

    #[inline]
    pub fn staging_bytes(&self) -> u64 {
        self.vertex_bytes + self.index_bytes
    }
}

/// Where one upload's bytes sit inside the staging buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StagingLayout {
    pub vertex: Range<u64>,
    pub index: Range<u64>,
}

impl StagingLayout {
    /// Validates an upload against `capacity` and places it.
    pub fn plan(
        capacity: UploadCapacity,
        vertex_len: usize,
        index_len: usize,
    ) -> Result<Self, UploadError> {
        let vertex_len = vertex_len as u64;
        let index_len = index_len as u64;

        if vertex_len > capacity.vertex_bytes {
            return Err(UploadError::VertexOverflow {
                len: vertex_len,
                capacity: capacity.vertex_bytes,
            });
        }
        if index_len > capacity.index_bytes {
            return Err(UploadError::IndexOverflow {
                len: index_len,
                capacity: capacity.index_bytes,
            });
        }
        if vertex_len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(UploadError::Misaligned {
                what: "vertex",
                len: vertex_len,
                align: wgpu::COPY_BUFFER_ALIGNMENT,
            });
        }
        if index_len % INDEX_SIZE != 0 {
            return Err(UploadError::Misaligned {
                what: "index",
                len: index_len,
                align: INDEX_SIZE,
            });
        }

        Ok(Self {
            vertex: 0..vertex_len,
            index: vertex_len..vertex_len + index_len,
        })
    }

    #[inline]
    pub fn vertex_len(&self) -> u64 {
        self.vertex.end - self.vertex.start
    }

    #[inline]
    pub fn index_len(&self) -> u64 {
        self.index.end - self.index.start
    }

    /// Number of indices the draw will consume.
    #[inline]
    pub fn index_count(&self) -> u32 {
        (self.index_len() / INDEX_SIZE) as u32
    }
}

/// What a successful `stage` committed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UploadReceipt {
    pub vertex_bytes: u64,
    pub index_bytes: u64,
    pub index_count: u32,
}

impl From<&StagingLayout> for UploadReceipt {
    fn from(layout: &StagingLayout) -> Self {
        Self {
            vertex_bytes: layout.vertex_len(),
            index_bytes: layout.index_len(),
            index_count: layout.index_count(),
        }
    }
}

/// Staging buffer plus the GPU vertex/index buffers it feeds.
///
/// Field order is drop order: GPU buffers before the staging buffer.
pub struct UploadChannel {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    staging: wgpu::Buffer,

    capacity: UploadCapacity,
    index_count: u32,
}

impl UploadChannel {
    pub fn new(device: &wgpu::Device, capacity: UploadCapacity) -> Self {
        let vertex = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("postquad vertex buffer"),
            size: capacity.vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let index = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("postquad index buffer"),
            size: capacity.index_bytes,
            usage: wgpu::BufferUsages::INDEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("postquad staging buffer"),
            size: capacity.staging_bytes(),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        log::debug!(
            "upload channel: {} vertex bytes, {} index bytes",
            capacity.vertex_bytes,
            capacity.index_bytes
        );

        Self {
            vertex,
            index,
            staging,
            capacity,
            index_count: 0,
        }
    }

    /// Index count of the last committed upload.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex
    }

    #[inline]
    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index
    }

    /// Replaces the GPU vertex/index contents with the given bytes.
    ///
    /// Nothing is written when a precondition fails; the previous upload stays
    /// in place.
    pub fn stage(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertex_bytes: &[u8],
        index_bytes: &[u8],
    ) -> Result<UploadReceipt, UploadError> {
        let layout = StagingLayout::plan(self.capacity, vertex_bytes.len(), index_bytes.len())?;

        if !vertex_bytes.is_empty() {
            queue.write_buffer(&self.staging, layout.vertex.start, vertex_bytes);
        }
        if !index_bytes.is_empty() {
            queue.write_buffer(&self.staging, layout.index.start, index_bytes);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("postquad upload encoder"),
        });
        if layout.vertex_len() > 0 {
            encoder.copy_buffer_to_buffer(
                &self.staging,
                layout.vertex.start,
                &self.vertex,
                0,
                layout.vertex_len(),
            );
        }
        if layout.index_len() > 0 {
            encoder.copy_buffer_to_buffer(
                &self.staging,
                layout.index.start,
                &self.index,
                0,
                layout.index_len(),
            );
        }
        queue.submit(std::iter::once(encoder.finish()));

        self.index_count = layout.index_count();
        Ok(UploadReceipt::from(&layout))
    }
}

/// Copies `src` rows into rows padded to wgpu's copy row alignment.
///
/// Returns the padded bytes and the padded row pitch.
pub fn pad_rows(src: &[u8], row_bytes: u32, rows: u32) -> (Vec<u8>, u32) {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let pitch = row_bytes.div_ceil(align) * align;
    let mut out = vec![0u8; pitch as usize * rows as usize];

    for (dst, src) in out
        .chunks_exact_mut(pitch as usize)
        .zip(src.chunks_exact(row_bytes as usize))
    {
        dst[..row_bytes as usize].copy_from_slice(src);
    }
    (out, pitch)
}

/// Uploads 32-bit texels into `texture` through a staging buffer.
pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
    texels: &[u32],
) -> anyhow::Result<()> {
    anyhow::ensure!(
        texels.len() == width as usize * height as usize,
        "texture upload expects {}x{} texels, got {}",
        width,
        height,
        texels.len()
    );

    let (padded, pitch) = pad_rows(bytemuck::cast_slice(texels), width * 4, height);

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("postquad texture staging buffer"),
        size: padded.len() as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });
    queue.write_buffer(&staging, 0, &padded);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("postquad texture upload encoder"),
    });
    encoder.copy_buffer_to_texture(
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pitch),
                rows_per_image: Some(height),
            },
        },
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    Ok(())
}
