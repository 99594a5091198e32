//! Surface Geometry

use crate::geometry::*;

/// Local geometry of a point on a surface.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SurfaceGeometry {
    /// Position.
    pub p: Point3f,

    /// True for points without a surface, such as a pinhole. Normals and
    /// the frame are meaningless then.
    pub degenerated: bool,

    /// Geometric normal.
    pub gn: Vector3f,

    /// Shading normal.
    pub sn: Vector3f,

    /// Texture coordinates.
    pub uv: Point2f,

    /// Shading frame around `sn`.
    pub frame: Frame,
}

impl SurfaceGeometry {
    /// Create surface geometry with a shading frame built around `sn`.
    ///
    /// * `p`  - Position.
    /// * `gn` - Unit geometric normal.
    /// * `sn` - Unit shading normal.
    /// * `uv` - Texture coordinates.
    pub fn new(p: Point3f, gn: Vector3f, sn: Vector3f, uv: Point2f) -> Self {
        Self {
            p,
            degenerated: false,
            gn,
            sn,
            uv,
            frame: Frame::from_normal(&sn),
        }
    }

    /// Create geometry for a point without a surface.
    ///
    /// * `p` - Position.
    pub fn degenerated(p: Point3f) -> Self {
        Self {
            p,
            degenerated: true,
            ..Default::default()
        }
    }

    /// Returns the tangent along `u`.
    pub fn dpdu(&self) -> Vector3f {
        self.frame.s
    }

    /// Returns the tangent along `v`.
    pub fn dpdv(&self) -> Vector3f {
        self.frame.t
    }

    /// Transform a world direction into the shading frame.
    ///
    /// * `w` - World space direction.
    pub fn to_local(&self, w: &Vector3f) -> Vector3f {
        self.frame.to_local(w)
    }

    /// Transform a shading frame direction into world space.
    ///
    /// * `w` - Local direction.
    pub fn to_world(&self, w: &Vector3f) -> Vector3f {
        self.frame.to_world(w)
    }
}
