use glam::{Vec2, Vec3};

/// CPU-side triangle mesh centred on the origin, ready for upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Axis-aligned box with independent vertices per face so each face
    /// gets the full texture.
    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        // (normal axis, u axis, v axis) per face.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            mesh.push_quad(normal * h, u * h, v * h);
        }
        mesh
    }

    /// Flat square in the XY plane, facing +Z.
    #[must_use]
    pub fn tile(half_size: f32) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(Vec3::ZERO, Vec3::X * half_size, Vec3::Y * half_size);
        mesh
    }

    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3) {
        let base = self.positions.len() as u16;
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        for (su, sv) in corners {
            self.positions.push(center + u * su + v * sv);
            self.tex_coords
                .push(Vec2::new((su + 1.0) / 2.0, (sv + 1.0) / 2.0));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::Mesh;

    #[test]
    fn cuboid_has_six_textured_faces() {
        let mesh = Mesh::cuboid(Vec3::splat(0.5));

        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.tex_coords.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(
            mesh.indices
                .iter()
                .all(|index| usize::from(*index) < mesh.positions.len())
        );
    }

    #[test]
    fn cuboid_vertices_lie_on_the_box_surface() {
        let half = Vec3::new(0.5, 1.0, 2.0);
        let mesh = Mesh::cuboid(half);

        for position in &mesh.positions {
            let on_face = (position.x.abs() - half.x).abs() < 1e-6
                || (position.y.abs() - half.y).abs() < 1e-6
                || (position.z.abs() - half.z).abs() < 1e-6;
            assert!(on_face, "{position:?} is not on a face");
            assert!(position.abs().cmple(half + Vec3::splat(1e-6)).all());
        }
    }

    #[test]
    fn tile_is_one_quad() {
        let mesh = Mesh::tile(0.5);

        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.positions.iter().all(|p| p.z == 0.0));
    }
}
