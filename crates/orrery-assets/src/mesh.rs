//! CPU-side triangle meshes and the built-in sphere primitive.

use glam::Vec3;

/// An indexed triangle mesh with per-vertex normals and UVs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append `other`, offsetting its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Replace the normals with area-weighted smooth vertex normals.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            // Unnormalised cross product weights by triangle area.
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// A unit-radius UV sphere.
///
/// Vertices along the seam and at the poles are duplicated so every vertex has
/// a single UV. `u` runs once around the equator, `v` from the north pole (0)
/// to the south pole (1). Triangles wind counter-clockwise seen from outside.
pub fn uv_sphere(width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let vertex_count = ((w + 1) * (h + 1)) as usize;
    let mut mesh = MeshData {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity((w * (h - 1) * 6) as usize),
    };

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let (sin_theta, cos_theta) = (v * std::f32::consts::PI).sin_cos();
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let (sin_phi, cos_phi) = (u * std::f32::consts::TAU).sin_cos();
            let p = [-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            mesh.positions.push(p);
            mesh.normals.push(p);
            mesh.uvs.push([u, v]);
        }
    }

    let row = w + 1;
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = uv_sphere(32, 32);
        for p in &mesh.positions {
            let len = Vec3::from(*p).length();
            assert!((len - 1.0).abs() < 1e-5, "length = {len}");
        }
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = uv_sphere(32, 32);
        assert_eq!(mesh.vertex_count(), 33 * 33);
        // Pole rows contribute one triangle per segment instead of two.
        assert_eq!(mesh.triangle_count(), 32 * 31 * 2);
    }

    #[test]
    fn test_sphere_indices_valid() {
        let mesh = uv_sphere(8, 6);
        let n = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_sphere_uvs_in_range() {
        let mesh = uv_sphere(16, 8);
        for uv in &mesh.uvs {
            assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let mesh = uv_sphere(16, 8);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| Vec3::from(mesh.positions[tri[k] as usize]));
            let n = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn test_degenerate_segment_counts_are_raised() {
        let mesh = uv_sphere(0, 0);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut a = uv_sphere(4, 3);
        let b = uv_sphere(4, 3);
        let base = a.vertex_count() as u32;
        a.append(&b);
        assert_eq!(a.vertex_count(), 2 * b.vertex_count());
        assert_eq!(a.indices[b.indices.len()], b.indices[0] + base);
    }

    #[test]
    fn test_compute_normals_flat_triangle() {
        let mut mesh = MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        mesh.compute_normals();
        for n in &mesh.normals {
            assert!((Vec3::from(*n) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_bounds() {
        let mesh = uv_sphere(8, 8);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.y + 1.0).abs() < 1e-6 && (hi.y - 1.0).abs() < 1e-6);
        assert!(MeshData::default().bounds().is_none());
    }
}
