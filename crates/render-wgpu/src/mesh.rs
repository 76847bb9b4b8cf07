use bytemuck::{Pod, Zeroable};
use cubescene_common::Color;
use cubescene_kernel::{BoxGeometry, GridHelper};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Box centred on the origin with one quad per face, so each face keeps a
/// flat normal.
pub fn box_mesh(geometry: &BoxGeometry) -> (Vec<Vertex>, Vec<u16>) {
    let x = geometry.width * 0.5;
    let y = geometry.height * 0.5;
    let z = geometry.depth * 0.5;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-x, -y,  z], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ x, -y,  z], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ x,  y,  z], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-x,  y,  z], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ x, -y, -z], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-x, -y, -z], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-x,  y, -z], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ x,  y, -z], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ x, -y,  z], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ x, -y, -z], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ x,  y, -z], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ x,  y,  z], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-x, -y, -z], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-x, -y,  z], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-x,  y,  z], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-x,  y, -z], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-x,  y,  z], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ x,  y,  z], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ x,  y, -z], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-x,  y, -z], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-x, -y, -z], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ x, -y, -z], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ x, -y,  z], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-x, -y,  z], normal: [0.0, -1.0, 0.0] },
    ];
    let indices = (0..6u16)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();
    (vertices, indices)
}

/// Square grid on the XZ plane as a line list. The middle line in each
/// direction uses the center color.
pub fn grid_lines(grid: &GridHelper) -> Vec<LineVertex> {
    let divisions = grid.divisions.max(1);
    let step = grid.size / divisions as f32;
    let half = grid.size / 2.0;
    let center = divisions / 2;

    let mut verts = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center {
            grid.center_color
        } else {
            grid.line_color
        }
        .to_array();
        // Line along X
        verts.push(LineVertex { position: [-half, 0.0, k], color });
        verts.push(LineVertex { position: [half, 0.0, k], color });
        // Line along Z
        verts.push(LineVertex { position: [k, 0.0, -half], color });
        verts.push(LineVertex { position: [k, 0.0, half], color });
    }
    verts
}

/// Three lines from the origin along +X, +Y and +Z, each fading from a
/// primary color to a lighter tint at its tip.
pub fn axes_lines(size: f32) -> Vec<LineVertex> {
    let axis = |dir: [f32; 3], base: Color, tip: Color| {
        [
            LineVertex { position: [0.0; 3], color: base.to_array() },
            LineVertex {
                position: dir.map(|d| d * size),
                color: tip.to_array(),
            },
        ]
    };
    [
        axis([1.0, 0.0, 0.0], Color::linear(1.0, 0.0, 0.0), Color::linear(1.0, 0.6, 0.0)),
        axis([0.0, 1.0, 0.0], Color::linear(0.0, 1.0, 0.0), Color::linear(0.6, 1.0, 0.0)),
        axis([0.0, 0.0, 1.0], Color::linear(0.0, 0.0, 1.0), Color::linear(0.0, 0.6, 1.0)),
    ]
    .concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn stock_grid() -> GridHelper {
        GridHelper {
            size: 10.0,
            divisions: 10,
            center_color: Color::from_hex(0x444444),
            line_color: Color::from_hex(0x888888),
            visible: true,
        }
    }

    #[test]
    fn box_has_flat_faces() {
        let (verts, indices) = box_mesh(&BoxGeometry::default());
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|i| (*i as usize) < verts.len()));
        for v in &verts {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
            assert_eq!(Vec3::from_array(v.normal).length(), 1.0);
        }
    }

    #[test]
    fn box_triangles_face_outwards() {
        let (verts, indices) = box_mesh(&BoxGeometry {
            width: 2.0,
            height: 1.0,
            depth: 3.0,
        });
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(verts[i as usize].position));
            let n = Vec3::from_array(verts[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn box_respects_dimensions() {
        let (verts, _) = box_mesh(&BoxGeometry {
            width: 2.0,
            height: 4.0,
            depth: 6.0,
        });
        let max = verts
            .iter()
            .fold(Vec3::ZERO, |m, v| m.max(Vec3::from_array(v.position)));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn grid_line_count_and_extent() {
        let verts = grid_lines(&stock_grid());
        assert_eq!(verts.len(), 11 * 4);
        assert!(verts.iter().all(|v| v.position[1] == 0.0));
        assert!(
            verts
                .iter()
                .all(|v| v.position[0].abs() <= 5.0 && v.position[2].abs() <= 5.0)
        );
    }

    #[test]
    fn grid_center_lines_use_center_color() {
        let grid = stock_grid();
        let verts = grid_lines(&grid);
        let center = grid.center_color.to_array();
        let through_origin: Vec<_> = verts
            .chunks(2)
            .filter(|line| line[0].color == center)
            .collect();
        assert_eq!(through_origin.len(), 2);
        for line in through_origin {
            assert!(line[0].position[0] == 0.0 || line[0].position[2] == 0.0);
        }
    }

    #[test]
    fn axes_point_along_positive_axes() {
        let verts = axes_lines(5.0);
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[1].position, [5.0, 0.0, 0.0]);
        assert_eq!(verts[3].position, [0.0, 5.0, 0.0]);
        assert_eq!(verts[5].position, [0.0, 0.0, 5.0]);
        assert_eq!(verts[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(verts[5].color, [0.0, 0.6, 1.0, 1.0]);
    }
}
