//! 1D Distribution.

use crate::math::*;
use crate::rng::ONE_MINUS_EPSILON;

/// A piecewise-constant discrete distribution built incrementally from
/// non-negative weights. The cumulative table starts at 0, is non-decreasing
/// and ends at 1 after `normalize()`.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    /// Cumulative weights. Always holds at least the leading 0.
    cdf: Vec<Float>,

    /// Sum of the weights added before normalization.
    sum: Float,

    /// Set by `normalize()` and cleared by `add()`.
    normalized: bool,
}

impl Default for Distribution1D {
    /// Returns an empty distribution.
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution1D {
    /// Returns an empty distribution.
    pub fn new() -> Self {
        Self {
            cdf: vec![0.0],
            sum: 0.0,
            normalized: false,
        }
    }

    /// Append a bucket.
    ///
    /// * `w` - Non-negative weight of the bucket.
    pub fn add(&mut self, w: Float) {
        debug_assert!(w >= 0.0, "Distribution1D::add(): negative weight {w}");
        let last = self.cdf[self.cdf.len() - 1];
        self.cdf.push(last + w);
        self.sum += w;
        self.normalized = false;
    }

    /// Scale the cumulative table so the last entry is 1. A zero total weight
    /// asserts in debug builds; release builds leave the table untouched and
    /// sampling then always returns bucket 0.
    pub fn normalize(&mut self) {
        let sum = self.cdf[self.cdf.len() - 1];
        debug_assert!(sum > 0.0, "Distribution1D::normalize(): zero total weight");
        if sum > 0.0 {
            let inv_sum = 1.0 / sum;
            for v in self.cdf.iter_mut() {
                *v *= inv_sum;
            }
        }
        self.normalized = true;
    }

    /// Returns the bucket index for a uniform sample in [0, 1].
    ///
    /// * `u` - The random sample.
    pub fn sample(&self, u: Float) -> usize {
        debug_assert!(self.normalized, "Distribution1D::sample(): not normalized");
        if self.cdf[self.cdf.len() - 1] <= 0.0 {
            return 0;
        }
        find_interval(self.cdf.len(), |index| self.cdf[index] <= u)
    }

    /// Returns the bucket index and the sample rescaled to [0, 1) within that
    /// bucket so it can be reused for another dimension.
    ///
    /// * `u` - The random sample.
    pub fn sample_reuse(&self, u: Float) -> (usize, Float) {
        let i = self.sample(u);
        let width = self.cdf[i + 1] - self.cdf[i];
        let u_remapped = if width > 0.0 {
            clamp((u - self.cdf[i]) / width, 0.0, ONE_MINUS_EPSILON)
        } else {
            0.0
        };
        (i, u_remapped)
    }

    /// Returns the probability of selecting a bucket, or 0 if the index is out
    /// of range.
    ///
    /// * `i` - Bucket index.
    pub fn evaluate_pdf(&self, i: usize) -> Float {
        if i + 1 >= self.cdf.len() {
            0.0
        } else {
            self.cdf[i + 1] - self.cdf[i]
        }
    }

    /// Remove all buckets.
    pub fn clear(&mut self) {
        self.cdf.clear();
        self.cdf.push(0.0);
        self.sum = 0.0;
        self.normalized = false;
    }

    /// Returns true if no buckets have been added.
    pub fn is_empty(&self) -> bool {
        self.cdf.len() == 1
    }

    /// Returns the number of buckets.
    pub fn len(&self) -> usize {
        self.cdf.len() - 1
    }

    /// Returns the total weight added.
    pub fn sum(&self) -> Float {
        self.sum
    }
}
