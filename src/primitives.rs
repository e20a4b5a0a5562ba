use std::f32::consts::PI;

use crate::mesh::MeshDescriptor;

/// Unit cube with shared corners: 8 vertices, 12 triangles.
pub fn cube() -> MeshDescriptor {
    let positions: Vec<[f32; 3]> = vec![
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ];

    // Two triangles per face, counter-clockwise seen from outside.
    let cells: Vec<[u32; 3]> = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 6, 2],
        [3, 7, 6],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];

    MeshDescriptor::new(positions, cells)
}

/// UV sphere as flat buffers, with a `normal` channel when `with_normals`.
pub fn sphere(segments: u32, rings: u32, with_normals: bool) -> MeshDescriptor {
    let mut positions = Vec::new();
    let mut cells = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for segment in 0..=segments {
            let theta = 2.0 * PI * segment as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();
            positions.extend_from_slice(&[x, y, z]);
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            cells.extend_from_slice(&[current, next, current + 1]);
            cells.extend_from_slice(&[current + 1, next, next + 1]);
        }
    }

    // For a unit sphere the normal is the position.
    let normals = positions.clone();
    let mesh = MeshDescriptor::new(positions, cells);
    if with_normals {
        mesh.with_attribute("normal", normals)
    } else {
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AttributeChannel;

    #[test]
    fn cube_counts_look_right() {
        let counts = cube().measure(&[]).unwrap();
        assert_eq!(counts.vertices, 8);
        assert_eq!(counts.indices, 36);
    }

    #[test]
    fn sphere_counts_look_right() {
        let counts = sphere(8, 4, true)
            .measure(&[AttributeChannel::new("normal", 3)])
            .unwrap();
        assert_eq!(counts.vertices, 9 * 5);
        assert_eq!(counts.indices, 8 * 4 * 6);
    }
}
