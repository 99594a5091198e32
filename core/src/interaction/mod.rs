//! Interactions

use crate::geometry::*;
use crate::math::*;
use crate::primitive::*;
use std::fmt;

mod surface_geometry;

// Re-export
pub use surface_geometry::*;

bitflags::bitflags! {
    /// Kinds of surface interaction. A primitive's type is the union of its
    /// emitter type and its BSDF type.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct SurfaceInteractionType: u32 {
        /// Diffuse reflection.
        const D = 1 << 0;
        /// Glossy reflection.
        const G = 1 << 1;
        /// Specular reflection or refraction.
        const S = 1 << 2;
        /// Light source.
        const L = 1 << 3;
        /// Sensor.
        const E = 1 << 4;
        /// Any scattering interaction.
        const BSDF = Self::D.bits() | Self::G.bits() | Self::S.bits();
        /// Any emitting interaction.
        const EMITTER = Self::L.bits() | Self::E.bits();
    }
}

impl fmt::Display for SurfaceInteractionType {
    /// Formats the flags as a compact string such as `DL`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::D, 'D'),
            (Self::G, 'G'),
            (Self::S, 'S'),
            (Self::L, 'L'),
            (Self::E, 'E'),
        ];
        for (flag, c) in names {
            if self.contains(flag) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// Direction in which light transport is traced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportDirection {
    /// From light to eye.
    LE,

    /// From eye to light.
    EL,
}

impl TransportDirection {
    /// Returns the opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Self::LE => Self::EL,
            Self::EL => Self::LE,
        }
    }
}

/// A ray hit: the surface geometry, the primitive it belongs to and the hit
/// distance along the ray.
#[derive(Clone)]
pub struct Intersection<'a> {
    /// Surface geometry at the hit point.
    pub geom: SurfaceGeometry,

    /// The primitive that was hit.
    pub primitive: &'a Primitive,

    /// Distance along the ray.
    pub t: Float,
}

/// Returns the geometry term `|cos θ1| |cos θ2| / d²` between two surface
/// points. Degenerated points contribute a cosine of 1.
///
/// * `g1` - First point.
/// * `g2` - Second point.
pub fn geometry_term(g1: &SurfaceGeometry, g2: &SurfaceGeometry) -> Float {
    let p1p2 = g2.p - g1.p;
    let dist2 = p1p2.length_squared();
    if dist2 == 0.0 {
        return 0.0;
    }
    let d = p1p2 / dist2.sqrt();
    let cos1 = if g1.degenerated { 1.0 } else { g1.sn.abs_dot(&d) };
    let cos2 = if g2.degenerated { 1.0 } else { g2.sn.abs_dot(&-d) };
    cos1 * cos2 / dist2
}
