//! Transformations

use super::{Point3f, Vector3f};
use crate::math::*;
use std::ops::Mul;

/// A 4x4 matrix containing `Float` values in row-major order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix4x4 {
    /// Stores a 2-D array of Float.
    pub m: [[Float; 4]; 4],
}

/// Identity matrix.
pub const IDENTITY_MATRIX: Matrix4x4 = Matrix4x4 {
    m: [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ],
};

impl Default for Matrix4x4 {
    /// Returns the default as identity matrix.
    fn default() -> Self {
        IDENTITY_MATRIX
    }
}

impl Matrix4x4 {
    /// Returns the inverse of the matrix using Gauss-Jordan elimination with
    /// full pivoting, or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix4x4> {
        let mut indxc = [0; 4];
        let mut indxr = [0; 4];
        let mut ipiv = [0; 4];
        let mut minv = self.m;

        for i in 0..4 {
            let (mut irow, mut icol) = (0, 0);
            let mut big: Float = 0.0;

            // Choose pivot.
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for (k, piv) in ipiv.iter().enumerate() {
                        if *piv == 0 {
                            if abs(minv[j][k]) >= big {
                                big = abs(minv[j][k]);
                                irow = j;
                                icol = k;
                            }
                        } else if *piv > 1 {
                            return None;
                        }
                    }
                }
            }
            ipiv[icol] += 1;

            if irow != icol {
                minv.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv[icol][icol] == 0.0 {
                return None;
            }

            // Scale the pivot row so the pivot becomes one.
            let pivinv = 1.0 / minv[icol][icol];
            minv[icol][icol] = 1.0;
            for v in minv[icol].iter_mut() {
                *v *= pivinv;
            }

            // Subtract this row from others to zero out their columns.
            for j in 0..4 {
                if j != icol {
                    let save = minv[j][icol];
                    minv[j][icol] = 0.0;
                    for k in 0..4 {
                        minv[j][k] -= minv[icol][k] * save;
                    }
                }
            }
        }

        // Swap columns to reflect permutation.
        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for row in minv.iter_mut() {
                    row.swap(indxr[j], indxc[j]);
                }
            }
        }

        Some(Matrix4x4 { m: minv })
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;

    /// Multiply two matrices.
    ///
    /// * `other` - The right hand side.
    fn mul(self, other: Matrix4x4) -> Self::Output {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Matrix4x4 { m }
    }
}

/// A transformation for mapping points to points and vectors to vectors. The
/// inverse is carried along so normals can be transformed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    /// The transformation matrix.
    pub m: Matrix4x4,

    /// The inverse transformation matrix.
    pub m_inv: Matrix4x4,
}

impl Transform {
    /// Create a transformation from a matrix. Fails if the matrix is singular.
    ///
    /// * `m` - The matrix.
    pub fn from_matrix(m: Matrix4x4) -> Result<Self, String> {
        let m_inv = m.inverse().ok_or_else(|| format!("Singular transformation matrix {:?}", m.m))?;
        Ok(Self { m, m_inv })
    }

    /// Create a transformation representing a translation.
    ///
    /// * `delta` - Translation.
    #[rustfmt::skip]
    pub fn translate(delta: &Vector3f) -> Self {
        Self {
            m: Matrix4x4 {
                m: [
                    [1.0, 0.0, 0.0, delta.x],
                    [0.0, 1.0, 0.0, delta.y],
                    [0.0, 0.0, 1.0, delta.z],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
            m_inv: Matrix4x4 {
                m: [
                    [1.0, 0.0, 0.0, -delta.x],
                    [0.0, 1.0, 0.0, -delta.y],
                    [0.0, 0.0, 1.0, -delta.z],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
        }
    }

    /// Create a transformation representing a scale. Zero factors are
    /// rejected since the transform would not be invertible.
    ///
    /// * `x` - Scaling factor in x-axis.
    /// * `y` - Scaling factor in y-axis.
    /// * `z` - Scaling factor in z-axis.
    #[rustfmt::skip]
    pub fn scale(x: Float, y: Float, z: Float) -> Result<Self, String> {
        if x == 0.0 || y == 0.0 || z == 0.0 {
            return Err(format!("Degenerate scale ({x}, {y}, {z})"));
        }
        Ok(Self {
            m: Matrix4x4 {
                m: [
                    [x,   0.0, 0.0, 0.0],
                    [0.0, y,   0.0, 0.0],
                    [0.0, 0.0, z,   0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            },
            m_inv: Matrix4x4 {
                m: [
                    [1.0 / x, 0.0,     0.0,     0.0],
                    [0.0,     1.0 / y, 0.0,     0.0],
                    [0.0,     0.0,     1.0 / z, 0.0],
                    [0.0,     0.0,     0.0,     1.0],
                ],
            },
        })
    }

    /// Create a rotation of `theta` degrees about an arbitrary axis.
    ///
    /// * `theta` - Rotation angle in degrees.
    /// * `axis`  - Rotation axis.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Self {
        let a = axis.normalize();
        let (sin_theta, cos_theta) = theta.to_radians().sin_cos();

        let mut m = IDENTITY_MATRIX;
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;

        // Rotations are orthonormal so the inverse is the transpose.
        let mut m_inv = m;
        for i in 0..4 {
            for j in 0..4 {
                m_inv.m[i][j] = m.m[j][i];
            }
        }
        Self { m, m_inv }
    }

    /// Returns the inverse transformation.
    pub fn inverse(&self) -> Self {
        Self {
            m: self.m_inv,
            m_inv: self.m,
        }
    }

    /// Returns true if the transformation is the identity.
    pub fn is_identity(&self) -> bool {
        self.m == IDENTITY_MATRIX
    }

    /// Applies transformation to a given point.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m.m;
        let xp = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let yp = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let zp = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let wp = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];

        debug_assert!(wp != 0.0, "Transform::transform_point(): wp is zero");
        if wp == 1.0 {
            Point3f::new(xp, yp, zp)
        } else {
            Point3f::new(xp, yp, zp) / wp
        }
    }

    /// Applies transformation to a given vector.
    ///
    /// * `v` - The vector.
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m.m;
        Vector3f::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Applies transformation to a given normal using the inverse transpose.
    ///
    /// * `n` - The normal.
    pub fn transform_normal(&self, n: &Vector3f) -> Vector3f {
        let m_inv = &self.m_inv.m;
        Vector3f::new(
            m_inv[0][0] * n.x + m_inv[1][0] * n.y + m_inv[2][0] * n.z,
            m_inv[0][1] * n.x + m_inv[1][1] * n.y + m_inv[2][1] * n.z,
            m_inv[0][2] * n.x + m_inv[1][2] * n.y + m_inv[2][2] * n.z,
        )
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// Compose two transformations; the right hand side is applied first.
    ///
    /// * `other` - The transformation applied first.
    fn mul(self, other: Transform) -> Self::Output {
        Transform {
            m: self.m * other.m,
            m_inv: other.m_inv * self.m_inv,
        }
    }
}
