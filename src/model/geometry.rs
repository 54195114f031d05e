use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

pub const VERTEX_COUNT: usize = 24;
pub const INDEX_COUNT: u32 = 36;
pub const FACE_COUNT: usize = 6;

pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];
pub const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
pub const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
pub const ORANGE: [f32; 3] = [1.0, 0.5, 0.0];
pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Back, front, left, right, bottom, top.
pub const FACE_COLORS: [[f32; 3]; FACE_COUNT] = [RED, YELLOW, GREEN, BLUE, ORANGE, WHITE];

const fn v(position: [f32; 3], color: [f32; 3]) -> Vertex {
    Vertex { position, color }
}

/// Four corners per face, listed counter-clockwise as seen from outside the cube.
/// Faces never share a vertex so each one keeps a flat color.
pub static VERTICES: [Vertex; VERTEX_COUNT] = [
    // Back (z = -1)
    v([1.0, -1.0, -1.0], RED),
    v([-1.0, -1.0, -1.0], RED),
    v([-1.0, 1.0, -1.0], RED),
    v([1.0, 1.0, -1.0], RED),
    // Front (z = +1)
    v([-1.0, -1.0, 1.0], YELLOW),
    v([1.0, -1.0, 1.0], YELLOW),
    v([1.0, 1.0, 1.0], YELLOW),
    v([-1.0, 1.0, 1.0], YELLOW),
    // Left (x = -1)
    v([-1.0, -1.0, -1.0], GREEN),
    v([-1.0, -1.0, 1.0], GREEN),
    v([-1.0, 1.0, 1.0], GREEN),
    v([-1.0, 1.0, -1.0], GREEN),
    // Right (x = +1)
    v([1.0, -1.0, 1.0], BLUE),
    v([1.0, -1.0, -1.0], BLUE),
    v([1.0, 1.0, -1.0], BLUE),
    v([1.0, 1.0, 1.0], BLUE),
    // Bottom (y = -1)
    v([-1.0, -1.0, -1.0], ORANGE),
    v([1.0, -1.0, -1.0], ORANGE),
    v([1.0, -1.0, 1.0], ORANGE),
    v([-1.0, -1.0, 1.0], ORANGE),
    // Top (y = +1)
    v([-1.0, 1.0, 1.0], WHITE),
    v([1.0, 1.0, 1.0], WHITE),
    v([1.0, 1.0, -1.0], WHITE),
    v([-1.0, 1.0, -1.0], WHITE),
];

/// Two triangles per face sharing the q0-q2 diagonal.
pub static INDICES: [u16; INDEX_COUNT as usize] = [
    0, 1, 2, 0, 2, 3, // back
    4, 5, 6, 4, 6, 7, // front
    8, 9, 10, 8, 10, 11, // left
    12, 13, 14, 12, 14, 15, // right
    16, 17, 18, 16, 18, 19, // bottom
    20, 21, 22, 20, 22, 23, // top
];

/// The six indices (two triangles) belonging to `face`, or `None` past the last face.
pub fn face_indices(face: usize) -> Option<&'static [u16]> {
    if face >= FACE_COUNT {
        return None;
    }
    INDICES.get(face * 6..face * 6 + 6)
}

pub fn triangles() -> impl Iterator<Item = [u16; 3]> {
    INDICES.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::collections::BTreeSet;

    #[test]
    fn every_index_is_in_range() {
        assert_eq!(triangles().count(), 12);
        for tri in triangles() {
            for i in tri {
                assert!((i as usize) < VERTEX_COUNT, "index {i} out of range");
            }
        }
    }

    #[test]
    fn each_face_covers_four_vertices_of_one_color() {
        for face in 0..FACE_COUNT {
            let distinct: BTreeSet<u16> = face_indices(face).unwrap().iter().copied().collect();
            assert_eq!(distinct.len(), 4, "face {face}");

            let colors: Vec<[f32; 3]> = distinct
                .iter()
                .map(|&i| VERTICES[i as usize].color)
                .collect();
            assert!(colors.iter().all(|c| *c == FACE_COLORS[face]), "face {face} mixes colors");
        }
    }

    #[test]
    fn face_indices_stops_after_the_last_face() {
        assert_eq!(face_indices(FACE_COUNT - 1), Some(&INDICES[30..36]));
        assert_eq!(face_indices(FACE_COUNT), None);
        assert_eq!(face_indices(usize::MAX), None);
    }

    #[test]
    fn face_colors_are_unique() {
        for a in 0..FACE_COUNT {
            for b in (a + 1)..FACE_COUNT {
                assert_ne!(FACE_COLORS[a], FACE_COLORS[b]);
            }
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        for tri in triangles() {
            let [a, b, c] = tri.map(|i| Vec3::from(VERTICES[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn both_triangles_of_a_face_share_a_diagonal() {
        for face in 0..FACE_COUNT {
            let idx = face_indices(face).unwrap();
            let first: BTreeSet<u16> = idx[..3].iter().copied().collect();
            let second: BTreeSet<u16> = idx[3..].iter().copied().collect();
            assert_eq!(first.intersection(&second).count(), 2);
        }
    }
}
