use bytemuck::{Pod, Zeroable};

use crate::shader::{VertexAttr, VertexLayout};

/// Per-vertex data for the scene pass.
///
/// Positions are logical pixels (top-left origin, +Y down); the vertex shader
/// projects them with the frame's `Projection`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const SIZE: u64 = std::mem::size_of::<Vertex>() as u64;

    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self { pos, uv, color }
    }

    /// Attribute layout: location 0 position, 1 uv, 2 color, all in slot 0.
    pub fn layout() -> VertexLayout {
        VertexLayout::new()
            .buffer(0, Self::SIZE)
            .attribute(VertexAttr {
                slot: 0,
                location: 0,
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
            })
            .attribute(VertexAttr {
                slot: 0,
                location: 1,
                format: wgpu::VertexFormat::Float32x2,
                offset: 8,
            })
            .attribute(VertexAttr {
                slot: 0,
                location: 2,
                format: wgpu::VertexFormat::Float32x4,
                offset: 16,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(Vertex::SIZE, 32);
        let v = Vertex::new([1.0, 2.0], [3.0, 4.0], [5.0, 6.0, 7.0, 8.0]);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn layout_offsets_match_fields() {
        let layout = Vertex::layout();
        let offsets: Vec<u64> = layout.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16]);
        assert_eq!(layout.stride(0), Some(Vertex::SIZE));
    }
}
