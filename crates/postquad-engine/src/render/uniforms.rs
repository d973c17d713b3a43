use bytemuck::{Pod, Zeroable};

/// Orthographic projection from logical pixels (top-left origin, +Y down) to
/// NDC. Column-major, as WGSL's `mat4x4<f32>` expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Projection {
    pub columns: [[f32; 4]; 4],
}

impl Projection {
    pub fn orthographic(width: f32, height: f32) -> Self {
        let w = width.max(1.0);
        let h = height.max(1.0);
        Self {
            columns: [
                [2.0 / w, 0.0, 0.0, 0.0],
                [0.0, -2.0 / h, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0, 1.0],
            ],
        }
    }

    /// Applies the matrix to `(x, y, 0, 1)`.
    pub fn transform(&self, x: f32, y: f32) -> [f32; 4] {
        let c = &self.columns;
        std::array::from_fn(|row| c[0][row] * x + c[1][row] * y + c[3][row])
    }
}

/// Distortion constants for the post pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PostEffect {
    pub speed: f32,
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for PostEffect {
    fn default() -> Self {
        Self {
            speed: 0.2,
            frequency: 8.0,
            amplitude: 0.1,
        }
    }
}

/// Fragment uniform of the post pass: `[time, speed, frequency, amplitude]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PostParams(pub [f32; 4]);

impl PostParams {
    #[inline]
    pub fn new(time: f32, effect: PostEffect) -> Self {
        Self([time, effect.speed, effect.frequency, effect.amplitude])
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.0[0]
    }
}

/// Everything written into uniform buffers for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    pub projection: Projection,
    pub post: PostParams,
}
