//! Random Number Generator.

use crate::math::*;
use byteorder::{ByteOrder, LittleEndian};
use crate::geometry::Point2f;

/// 32-bit precision value for 1 - epsilon.
pub const FLOAT_ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1"); // 0.99999994

/// 1 - epsilon in the precision we've selected for `Float`.
pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// Size of a serialized `RandomState` in bytes.
pub const RANDOM_STATE_BYTES: usize = 16;

/// Snapshot of a `Random` generator that can be restored later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomState {
    state: u64,
    inc: u64,
}

impl RandomState {
    /// Serialize the state as little-endian bytes.
    pub fn to_bytes(&self) -> [u8; RANDOM_STATE_BYTES] {
        let mut buf = [0_u8; RANDOM_STATE_BYTES];
        LittleEndian::write_u64(&mut buf[0..8], self.state);
        LittleEndian::write_u64(&mut buf[8..16], self.inc);
        buf
    }

    /// Deserialize a state written by `to_bytes`.
    ///
    /// * `bytes` - Serialized state.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() != RANDOM_STATE_BYTES {
            return Err(format!(
                "Invalid random state length {}, expected {}",
                bytes.len(),
                RANDOM_STATE_BYTES
            ));
        }
        let inc = LittleEndian::read_u64(&bytes[8..16]);
        if inc & 1 == 0 {
            return Err(String::from("Invalid random state: stream increment must be odd"));
        }
        Ok(Self {
            state: LittleEndian::read_u64(&bytes[0..8]),
            inc,
        })
    }
}

/// PCG32 pseudo-random number generator.
#[derive(Clone, Debug)]
pub struct Random {
    state: u64,
    inc: u64,
}

impl Default for Random {
    /// Return a new instance of `Random` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl Random {
    /// Create a new `Random` seeded with the given value.
    ///
    /// * `seed` - The seed.
    pub fn new(seed: u32) -> Self {
        let mut ret = Self { state: 0, inc: 0 };
        ret.set_seed(seed);
        ret
    }

    /// Reinitialize the generator so that the same seed always reproduces the
    /// same sequence.
    ///
    /// * `seed` - The seed.
    pub fn set_seed(&mut self, seed: u32) {
        self.state = 0;
        let (inc, _) = (seed as u64).overflowing_shl(1);
        self.inc = inc | 1;
        let _ = self.next_u32();

        let (state, _) = self.state.overflowing_add(PCG32_DEFAULT_STATE);
        self.state = state;
        let _ = self.next_u32();
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        let (new_state, _) = old_state.overflowing_mul(PCG32_MULT);
        let (new_state, _) = new_state.overflowing_add(self.inc);
        self.state = new_state;

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value over [0, 1).
    pub fn next(&mut self) -> Float {
        min(
            self.next_u32() as Float * hexf32!("0x1.0p-32") as Float,
            ONE_MINUS_EPSILON,
        )
    }

    /// Returns a uniformly distributed point over [0, 1)².
    pub fn next_2d(&mut self) -> Point2f {
        let x = self.next();
        let y = self.next();
        Point2f::new(x, y)
    }

    /// Capture the generator state.
    pub fn get_state(&self) -> RandomState {
        RandomState {
            state: self.state,
            inc: self.inc,
        }
    }

    /// Restore a previously captured state.
    ///
    /// * `state` - The state.
    pub fn set_state(&mut self, state: &RandomState) {
        self.state = state.state;
        self.inc = state.inc;
    }
}
