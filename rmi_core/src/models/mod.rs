//! Submodels: parametric functions mapping a key to a real-valued position
//! estimate.
//!
//! Every model is fit to the points `(keys[offset + i], (offset + i) * compression)`
//! for `i` in `[0, n)`. Layer-2 models are trained with a compression factor of
//! one; the layer-1 model is trained with `layer2_size / n_keys` so that its
//! output lands in bucket space. All variants share the same degeneracy
//! handling: `n = 0` yields the zero predictor and `n = 1` the constant
//! predictor `offset * compression`.

mod cubic;
mod linear;
mod radix;

pub use cubic::CubicSpline;
pub use linear::{LinearRegression, LinearSpline};
pub use radix::Radix;

use crate::Key;
use bytemuck::Pod;
use std::fmt::Debug;
use std::mem;

/// A fitted submodel over a contiguous run of sorted keys.
///
/// All implementations are monotonic non-decreasing over their training
/// range when the input is sorted, which the RMI build pass relies on.
pub trait Model<K: Key>: Pod + Debug {
    /// Fits the model to `keys[offset..offset + n]`, mapping each key to its
    /// position scaled by `compression`.
    fn fit(keys: &[K], offset: usize, n: usize, compression: f64) -> Self;

    /// Estimated (scaled) position of `key`.
    fn predict(&self, key: K) -> f64;

    /// Bytes occupied by the fitted coefficients.
    fn size_in_bytes() -> usize {
        mem::size_of::<Self>()
    }
}

/// Widening cast. Exact for every key below 2^53; above that, `f64` rounds
/// and predictions merely become coarser.
#[inline]
pub(crate) fn as_f64<K: Key>(key: K) -> f64 {
    num::cast(key).unwrap()
}
