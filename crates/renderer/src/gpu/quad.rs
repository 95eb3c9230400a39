use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One corner of the full-viewport quad, bound to attribute `position`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    /// Location 0, two unnormalized 32-bit floats, tightly packed.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const fn corner(x: f32, y: f32) -> QuadVertex {
    QuadVertex { position: [x, y] }
}

/// Two triangles covering normalized device coordinates `[-1, 1]²`.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    corner(-1.0, -1.0),
    corner(1.0, -1.0),
    corner(-1.0, 1.0),
    corner(1.0, -1.0),
    corner(1.0, 1.0),
    corner(-1.0, 1.0),
];

/// Static vertex buffer holding [`QUAD_VERTICES`].
pub struct QuadGeometry {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl QuadGeometry {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            vertex_count: QUAD_VERTICES.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
        ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])) * 0.5
    }

    fn contains(triangle: &[QuadVertex], point: [f32; 2]) -> bool {
        let [a, b, c] = [triangle[0].position, triangle[1].position, triangle[2].position];
        let d1 = signed_area(point, a, b);
        let d2 = signed_area(point, b, c);
        let d3 = signed_area(point, c, a);
        let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_negative && has_positive)
    }

    #[test]
    fn six_vertices_two_triangles() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&QUAD_VERTICES).len(), 48);
        assert_eq!(QuadVertex::layout().array_stride, 8);
        assert_eq!(QuadVertex::layout().attributes[0].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(QuadVertex::layout().attributes[0].shader_location, 0);
    }

    #[test]
    fn triangles_tile_the_ndc_square() {
        let total: f32 = QUAD_VERTICES
            .chunks(3)
            .map(|t| signed_area(t[0].position, t[1].position, t[2].position).abs())
            .sum();
        assert_eq!(total, 4.0);

        for chunk in QUAD_VERTICES.chunks(3) {
            assert!(signed_area(chunk[0].position, chunk[1].position, chunk[2].position) > 0.0);
        }

        for i in 0..=20 {
            for j in 0..=20 {
                let point = [-1.0 + i as f32 * 0.1, -1.0 + j as f32 * 0.1];
                assert!(
                    QUAD_VERTICES.chunks(3).any(|t| contains(t, point)),
                    "{point:?} is not covered"
                );
            }
        }
    }

    #[test]
    fn vertices_stay_on_the_ndc_boundary() {
        for vertex in QUAD_VERTICES {
            for coordinate in vertex.position {
                assert!(coordinate == -1.0 || coordinate == 1.0);
            }
        }
    }
}
