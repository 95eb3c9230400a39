use bytemuck::{Pod, Zeroable};

/// Mirror of the fragment stage's `QuadParams` std140 block.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadUniforms {
    pub resolution: [f32; 2],
    pub _padding: [f32; 2],
}

unsafe impl Zeroable for QuadUniforms {}
unsafe impl Pod for QuadUniforms {}

impl QuadUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            _padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_one_std140_slot() {
        assert_eq!(std::mem::size_of::<QuadUniforms>(), 16);
        let uniforms = QuadUniforms::new(500, 500);
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[0..4], &500.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &500.0f32.to_ne_bytes());
    }
}
