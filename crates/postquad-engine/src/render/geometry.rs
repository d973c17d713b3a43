//! CPU-side quad generation.
//!
//! The generator is pure: same pointer state in, same bytes out.

use crate::input::PointerState;

use super::vertex::Vertex;

/// Index pattern for one quad, relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Unit-square texture coordinates, in corner order.
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Vertices plus triangle-list indices for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBatch {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl GeometryBatch {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all geometry, keeping the allocations.
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Appends an axis-aligned square with its top-left corner at `origin`.
    ///
    /// Corners go clockwise on screen starting top-left; UVs follow the corners.
    pub fn push_quad(&mut self, origin: (f32, f32), side: f32, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        let (x, y) = origin;
        let corners = [[x, y], [x + side, y], [x + side, y + side], [x, y + side]];

        self.vertices.extend(
            corners
                .into_iter()
                .zip(QUAD_UVS)
                .map(|(pos, uv)| Vertex::new(pos, uv, color)),
        );
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Where quads are placed relative to the pointer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum QuadLayout {
    /// One quad at the origin, plus one at the pointer while the primary
    /// button is held.
    #[default]
    Anchored,

    /// A single quad at the last pointer position (touch screens).
    Follow,
}

impl QuadLayout {
    /// Quad side used when none is configured.
    pub fn default_side(self) -> f32 {
        match self {
            QuadLayout::Anchored => 500.0,
            QuadLayout::Follow => 100.0,
        }
    }
}

/// Builds the per-frame quads from the pointer state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadGenerator {
    side: f32,
    layout: QuadLayout,
}

impl QuadGenerator {
    pub fn new(side: f32, layout: QuadLayout) -> Self {
        debug_assert!(side.is_finite() && side >= 0.0);
        Self { side, layout }
    }

    /// Upper bound on quads produced per frame by this layout.
    pub fn max_quads(&self) -> usize {
        match self.layout {
            QuadLayout::Anchored => 2,
            QuadLayout::Follow => 1,
        }
    }

    pub fn generate(&self, pointer: &PointerState) -> GeometryBatch {
        let mut batch = GeometryBatch::new();
        self.generate_into(pointer, &mut batch);
        batch
    }

    /// Replaces the contents of `batch` with this frame's geometry.
    pub fn generate_into(&self, pointer: &PointerState, batch: &mut GeometryBatch) {
        batch.clear();
        match self.layout {
            QuadLayout::Anchored => {
                batch.push_quad((0.0, 0.0), self.side, Vertex::WHITE);
                if pointer.primary_down {
                    batch.push_quad(pointer.position, self.side, Vertex::WHITE);
                }
            }
            QuadLayout::Follow => {
                batch.push_quad(pointer.position, self.side, Vertex::WHITE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(batch: &GeometryBatch) -> Vec<[f32; 2]> {
        batch.vertices.iter().map(|v| v.pos).collect()
    }

    fn sample_pointers() -> Vec<PointerState> {
        let coords = [-250.0, -1.0, 0.0, 0.5, 100.0, 799.0, 1e6];
        let mut out = Vec::new();
        for &x in &coords {
            for &y in &coords {
                out.push(PointerState::new(false, x, y));
                out.push(PointerState::new(true, x, y));
            }
        }
        out
    }

    // ── scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn released_pointer_yields_single_origin_quad() {
        let g = QuadGenerator::new(500.0, QuadLayout::Anchored);
        let batch = g.generate(&PointerState::new(false, 321.0, 123.0));

        assert_eq!(
            positions(&batch),
            vec![[0.0, 0.0], [500.0, 0.0], [500.0, 500.0], [0.0, 500.0]]
        );
        let uvs: Vec<[f32; 2]> = batch.vertices.iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert_eq!(batch.indices, vec![0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn held_pointer_adds_quad_at_pointer() {
        let g = QuadGenerator::new(500.0, QuadLayout::Anchored);
        let batch = g.generate(&PointerState::new(true, 100.0, 100.0));

        assert_eq!(batch.quad_count(), 2);
        assert_eq!(
            &positions(&batch)[4..],
            &[[100.0, 100.0], [600.0, 100.0], [600.0, 600.0], [100.0, 600.0]]
        );
        assert_eq!(batch.indices, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn every_vertex_is_white() {
        let g = QuadGenerator::new(500.0, QuadLayout::Anchored);
        let batch = g.generate(&PointerState::new(true, 10.0, 10.0));
        assert!(batch.vertices.iter().all(|v| v.color == [1.0; 4]));
    }

    #[test]
    fn follow_layout_tracks_pointer_only() {
        let g = QuadGenerator::new(100.0, QuadLayout::Follow);
        let batch = g.generate(&PointerState::new(false, 40.0, 60.0));
        assert_eq!(
            positions(&batch),
            vec![[40.0, 60.0], [140.0, 60.0], [140.0, 160.0], [40.0, 160.0]]
        );
        assert_eq!(batch.indices, QUAD_INDICES.to_vec());
    }

    // ── properties ────────────────────────────────────────────────────────

    #[test]
    fn counts_hold_for_all_pointer_states() {
        for layout in [QuadLayout::Anchored, QuadLayout::Follow] {
            let g = QuadGenerator::new(500.0, layout);
            for p in sample_pointers() {
                let batch = g.generate(&p);
                let vc = batch.vertices.len();
                assert_eq!(vc % 4, 0, "{p:?}");
                assert_eq!(batch.indices.len() * 2, vc * 3, "{p:?}");
                assert!(batch.indices.iter().all(|&i| (i as usize) < vc), "{p:?}");
                assert!(batch.quad_count() <= g.max_quads());
            }
        }
    }

    #[test]
    fn generation_is_idempotent() {
        let g = QuadGenerator::new(500.0, QuadLayout::Anchored);
        for p in sample_pointers() {
            let a = g.generate(&p);
            let b = g.generate(&p);
            assert_eq!(a.vertex_bytes(), b.vertex_bytes());
            assert_eq!(a.index_bytes(), b.index_bytes());
        }
    }

    #[test]
    fn generate_into_replaces_previous_batch() {
        let g = QuadGenerator::new(500.0, QuadLayout::Anchored);
        let mut batch = g.generate(&PointerState::new(true, 5.0, 5.0));
        g.generate_into(&PointerState::new(false, 5.0, 5.0), &mut batch);
        assert_eq!(batch, g.generate(&PointerState::new(false, 5.0, 5.0)));
    }

    #[test]
    fn byte_views_cover_whole_batch() {
        let g = QuadGenerator::new(500.0, QuadLayout::Anchored);
        let batch = g.generate(&PointerState::new(true, 1.0, 2.0));
        assert_eq!(batch.vertex_bytes().len(), 8 * 32);
        assert_eq!(batch.index_bytes().len(), 12 * 4);
    }

    #[test]
    fn follow_layout_uses_smaller_default_side() {
        assert_eq!(QuadLayout::Anchored.default_side(), 500.0);
        assert_eq!(QuadLayout::Follow.default_side(), 100.0);
    }
}
