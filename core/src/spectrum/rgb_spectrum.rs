//! RGB Spectrum

use crate::math::*;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub};

/// Number of samples in an `RGBSpectrum`.
pub const RGB_SAMPLES: usize = 3;

/// An SPD represented as a weighted sum of red, green and blue components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RGBSpectrum {
    /// The RGB values.
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Spectrum with all values set to 0.
    pub const ZERO: Self = Self { c: [0.0; RGB_SAMPLES] };

    /// Spectrum with all values set to 1.
    pub const ONE: Self = Self { c: [1.0; RGB_SAMPLES] };

    /// Create a new `RGBSpectrum` with a constant value.
    ///
    /// * `v` - Constant value.
    pub fn new(v: Float) -> Self {
        let ret = Self { c: [v; RGB_SAMPLES] };
        debug_assert!(!ret.has_nans());
        ret
    }

    /// Create a new `RGBSpectrum` from individual components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the RGB components.
    pub fn to_rgb(&self) -> [Float; RGB_SAMPLES] {
        self.c
    }

    /// Returns true if any component is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if every component is zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns the largest component.
    pub fn max_component_value(&self) -> Float {
        self.c.iter().fold(-INFINITY, |a, b| max(a, *b))
    }

    /// Returns the luminance (the y-coefficient of the CIE XYZ response).
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Clamps the components.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        Self {
            c: self.c.map(|v| clamp(v, low, high)),
        }
    }
}

impl Default for RGBSpectrum {
    /// Return a black `RGBSpectrum`.
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Float> for RGBSpectrum {
    /// Create a constant `RGBSpectrum`.
    ///
    /// * `v` - Constant value.
    fn from(v: Float) -> Self {
        Self::new(v)
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    /// Adds the corresponding components.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn add(self, other: Self) -> Self::Output {
        let mut ret = self;
        ret += other;
        ret
    }
}

impl AddAssign for RGBSpectrum {
    /// Adds the corresponding components.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn add_assign(&mut self, other: Self) {
        for (a, b) in self.c.iter_mut().zip(other.c.iter()) {
            *a += b;
        }
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    /// Subtracts the corresponding components.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn sub(self, other: Self) -> Self::Output {
        let mut ret = self;
        for (a, b) in ret.c.iter_mut().zip(other.c.iter()) {
            *a -= b;
        }
        ret
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    /// Multiplies the corresponding components.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn mul(self, other: Self) -> Self::Output {
        let mut ret = self;
        ret *= other;
        ret
    }
}

impl MulAssign for RGBSpectrum {
    /// Multiplies the corresponding components.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn mul_assign(&mut self, other: Self) {
        for (a, b) in self.c.iter_mut().zip(other.c.iter()) {
            *a *= b;
        }
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    /// Scales the components with a constant factor.
    ///
    /// * `f` - Scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        Self { c: self.c.map(|v| v * f) }
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    /// Scales the components of an `RGBSpectrum`.
    ///
    /// * `s` - The spectrum.
    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl MulAssign<Float> for RGBSpectrum {
    /// Scales the components with a constant factor.
    ///
    /// * `f` - Scaling factor.
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Div for RGBSpectrum {
    type Output = Self;

    /// Divides the corresponding components. Division by a zero component
    /// yields zero for that component.
    ///
    /// * `other` - The other `RGBSpectrum`.
    fn div(self, other: Self) -> Self::Output {
        let mut ret = self;
        for (a, b) in ret.c.iter_mut().zip(other.c.iter()) {
            *a = if *b == 0.0 { 0.0 } else { *a / b };
        }
        ret
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    /// Divides the components by a constant.
    ///
    /// * `f` - Divisor.
    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0, "RGBSpectrum::div(): division by zero");
        self * (1.0 / f)
    }
}

impl DivAssign<Float> for RGBSpectrum {
    /// Divides the components by a constant.
    ///
    /// * `f` - Divisor.
    fn div_assign(&mut self, f: Float) {
        *self = *self / f;
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    /// Index a component.
    ///
    /// * `i` - The index.
    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    /// Index a component mutably.
    ///
    /// * `i` - The index.
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

impl fmt::Display for RGBSpectrum {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn black_and_luminance() {
        assert!(RGBSpectrum::ZERO.is_black());
        assert!(!RGBSpectrum::from_rgb(0.0, 0.0, 1e-6).is_black());
        assert!(approx_eq!(f32, RGBSpectrum::ONE.y(), 1.0, epsilon = 1e-5));
    }

    #[test]
    fn component_division_by_zero_is_zero() {
        let s = RGBSpectrum::from_rgb(1.0, 2.0, 3.0) / RGBSpectrum::from_rgb(0.0, 2.0, 1.0);
        assert_eq!(s, RGBSpectrum::from_rgb(0.0, 1.0, 3.0));
    }

    proptest! {
        #[test]
        fn max_component(r in 0.0..10.0f32, g in 0.0..10.0f32, b in 0.0..10.0f32) {
            let s = RGBSpectrum::from_rgb(r, g, b);
            prop_assert_eq!(s.max_component_value(), r.max(g).max(b));
        }
    }
}
