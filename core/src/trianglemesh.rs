//! Triangle Meshes

use crate::geometry::*;
use crate::interaction::*;
use crate::math::*;

/// Determinants below this magnitude are treated as rays parallel to the
/// triangle plane.
const DET_EPSILON: Float = 1e-10;

/// An indexed triangle mesh. Normals and texture coordinates are optional and,
/// when present, are stored per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub positions: Vec<Point3f>,

    /// Per-vertex shading normals; empty to use geometric normals.
    pub normals: Vec<Vector3f>,

    /// Per-vertex texture coordinates; may be empty.
    pub texcoords: Vec<Point2f>,

    /// Vertex indices, three per triangle.
    pub faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a mesh, validating the per-vertex attribute counts and indices.
    ///
    /// * `positions` - Vertex positions.
    /// * `normals`   - Per-vertex normals or empty.
    /// * `texcoords` - Per-vertex texture coordinates or empty.
    /// * `faces`     - Vertex indices.
    pub fn new(
        positions: Vec<Point3f>,
        normals: Vec<Vector3f>,
        texcoords: Vec<Point2f>,
        faces: Vec<[u32; 3]>,
    ) -> Result<Self, String> {
        let n = positions.len();
        if !normals.is_empty() && normals.len() != n {
            return Err(format!("Mesh has {} normals for {} vertices", normals.len(), n));
        }
        if !texcoords.is_empty() && texcoords.len() != n {
            return Err(format!(
                "Mesh has {} texture coordinates for {} vertices",
                texcoords.len(),
                n
            ));
        }
        if let Some(face) = faces.iter().find(|f| f.iter().any(|&i| i as usize >= n)) {
            return Err(format!("Face {:?} references a vertex out of range [0, {})", face, n));
        }

        Ok(Self {
            positions,
            normals,
            texcoords,
            faces,
        })
    }

    /// Create a quad from four corners in counter-clockwise order as seen from
    /// the side its normal faces.
    ///
    /// * `corners` - The four corners.
    pub fn quad(corners: [Point3f; 4]) -> Self {
        Self {
            positions: corners.to_vec(),
            normals: vec![],
            texcoords: vec![
                Point2f::new(0.0, 0.0),
                Point2f::new(1.0, 0.0),
                Point2f::new(1.0, 1.0),
                Point2f::new(0.0, 1.0),
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if every vertex position is finite.
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite())
    }

    /// Returns the vertices of a triangle.
    ///
    /// * `i` - Triangle index.
    pub fn triangle(&self, i: usize) -> [Point3f; 3] {
        let [a, b, c] = self.faces[i];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Returns the bounds of a triangle.
    ///
    /// * `i` - Triangle index.
    pub fn triangle_bounds(&self, i: usize) -> Bounds3f {
        let [p1, p2, p3] = self.triangle(i);
        Bounds3f::new(p1, p2).union_point(&p3)
    }

    /// Returns the area of a triangle.
    ///
    /// * `i` - Triangle index.
    pub fn triangle_area(&self, i: usize) -> Float {
        let [p1, p2, p3] = self.triangle(i);
        0.5 * (p2 - p1).cross(&(p3 - p1)).length()
    }

    /// Returns the bounds of the whole mesh.
    pub fn bounds(&self) -> Bounds3f {
        self.positions
            .iter()
            .fold(Bounds3f::EMPTY, |b, p| b.union_point(p))
    }

    /// Returns a copy of the mesh with a transformation applied.
    ///
    /// * `transform` - The transformation.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
            normals: self
                .normals
                .iter()
                .map(|n| transform.transform_normal(n).normalize())
                .collect(),
            texcoords: self.texcoords.clone(),
            faces: self.faces.clone(),
        }
    }

    /// Intersect a ray with a triangle using the Möller-Trumbore test. Returns
    /// the distance and barycentric coordinates `(t, b1, b2)` of a hit strictly
    /// inside `(min_t, max_t)`.
    ///
    /// * `i`     - Triangle index.
    /// * `ray`   - The ray.
    /// * `min_t` - Lower distance bound.
    /// * `max_t` - Upper distance bound.
    pub fn intersect_triangle(
        &self,
        i: usize,
        ray: &Ray,
        min_t: Float,
        max_t: Float,
    ) -> Option<(Float, Float, Float)> {
        let [p1, p2, p3] = self.triangle(i);
        let e1 = p2 - p1;
        let e2 = p3 - p1;

        let pvec = ray.d.cross(&e2);
        let det = e1.dot(&pvec);
        if abs(det) < DET_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.o - p1;
        let b1 = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&b1) {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let b2 = ray.d.dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if t <= min_t || t >= max_t {
            return None;
        }

        Some((t, b1, b2))
    }

    /// Returns the surface geometry at barycentric coordinates on a triangle.
    ///
    /// * `i`  - Triangle index.
    /// * `b1` - Weight of the second vertex.
    /// * `b2` - Weight of the third vertex.
    pub fn surface_geometry(&self, i: usize, b1: Float, b2: Float) -> SurfaceGeometry {
        let [i1, i2, i3] = self.faces[i].map(|v| v as usize);
        let [p1, p2, p3] = self.triangle(i);
        let b0 = 1.0 - b1 - b2;

        let p = p1 * b0 + p2 * b1 + p3 * b2;
        let gn = (p2 - p1).cross(&(p3 - p1)).normalize();
        let sn = if self.normals.is_empty() {
            gn
        } else {
            let n = self.normals[i1] * b0 + self.normals[i2] * b1 + self.normals[i3] * b2;
            if n.length_squared() > 0.0 {
                n.normalize()
            } else {
                gn
            }
        };
        let uv = if self.texcoords.is_empty() {
            Point2f::new(b1, b2)
        } else {
            self.texcoords[i1] * b0 + self.texcoords[i2] * b1 + self.texcoords[i3] * b2
        };

        SurfaceGeometry::new(p, gn, sn, uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![],
            vec![],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn new_validates_input() {
        let p = vec![Point3f::zero(); 3];
        assert!(TriangleMesh::new(p.clone(), vec![], vec![], vec![[0, 1, 3]]).is_err());
        assert!(TriangleMesh::new(p.clone(), vec![Vector3f::zero()], vec![], vec![]).is_err());
        assert!(TriangleMesh::new(p, vec![], vec![Point2f::zero(); 2], vec![]).is_err());
    }

    #[test]
    fn area_and_normal() {
        let mesh = unit_triangle();
        assert!(approx_eq!(f32, mesh.triangle_area(0), 0.5, ulps = 2));
        let geom = mesh.surface_geometry(0, 0.25, 0.25);
        assert_eq!(geom.gn, Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(geom.p, Point3f::new(0.25, 0.25, 0.0));
    }

    #[test]
    fn hit_respects_bounds() {
        let mesh = unit_triangle();
        let ray = Ray::new(Point3f::new(0.2, 0.2, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        let (t, _, _) = mesh.intersect_triangle(0, &ray, 0.0, INFINITY).unwrap();
        assert!(approx_eq!(f32, t, 1.0, ulps = 2));
        assert!(mesh.intersect_triangle(0, &ray, 0.0, 1.0).is_none());
        assert!(mesh.intersect_triangle(0, &ray, 1.0, INFINITY).is_none());

        let away = Ray::new(Point3f::new(0.2, 0.2, 1.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(mesh.intersect_triangle(0, &away, 0.0, INFINITY).is_none());
    }

    #[test]
    fn transform_moves_vertices() {
        let mesh = unit_triangle().transformed(&Transform::translate(&Vector3f::new(0.0, 0.0, 5.0)));
        assert_eq!(mesh.bounds().p_min.z, 5.0);
        assert!(mesh.is_finite());
    }

    proptest! {
        #[test]
        fn interior_points_are_hit(b1 in 0.05..0.45f32, b2 in 0.05..0.45f32, h in 0.5..10.0f32) {
            let mesh = unit_triangle();
            let target = Point3f::new(b1, b2, 0.0);
            let o = Point3f::new(0.1, -0.3, h);
            let ray = Ray::new(o, (target - o).normalize());
            let (t, _, _) = mesh.intersect_triangle(0, &ray, 0.0, INFINITY).unwrap();
            prop_assert!((t - (target - o).length()).abs() < 1e-3);
        }
    }
}
