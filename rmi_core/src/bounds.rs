//! Error-bound policies: how residuals observed during construction widen a
//! raw position estimate into a guaranteed-containment interval.
//!
//! The five policies trade memory for interval tightness. Local policies keep
//! per-bucket counters, global policies a single record, and [`NoBounds`]
//! nothing at all (every query falls back to the full array). Individual
//! policies track over- and underestimation separately; absolute policies
//! fold both into one maximum.

use bytemuck::{Pod, Zeroable};
use std::collections::TryReserveError;
use std::mem;

/// Residual storage selected per RMI instance as a type parameter.
///
/// During construction, `record` is called once per key with the clamped
/// layer-2 prediction and the key's actual position. At query time,
/// `interval` widens a prediction into `[lo, hi)` with saturating arithmetic
/// on the low side and clamping to `n_keys` on the high side; the `+ 1` on
/// the high side keeps the exactly-predicted position inside the exclusive
/// bound.
pub trait BoundPolicy {
    /// Storage sized for `layer2_size` buckets.
    fn with_capacity(layer2_size: usize) -> Result<Self, TryReserveError>
    where
        Self: Sized;

    /// Folds in the residual of one key.
    fn record(&mut self, bucket: usize, pred: usize, actual: usize);

    /// Widens `pred` into a containment interval over `[0, n_keys)`.
    fn interval(&self, bucket: usize, pred: usize, n_keys: usize) -> (usize, usize);

    /// Bytes occupied by the bound storage.
    fn size_in_bytes(&self) -> usize;
}

/// Per-bucket maxima of over- and underestimation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Residuals {
    /// Largest overestimation: how far predictions exceeded positions.
    pub lo: usize,
    /// Largest underestimation: how far predictions fell short.
    pub hi: usize,
}

fn zeroed_vec<T: Clone + Default>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, T::default());
    Ok(v)
}

/// Local, individual: one `(lo, hi)` pair per bucket.
#[derive(Debug, Clone)]
pub struct LocalIndividual {
    errors: Vec<Residuals>,
}

impl LocalIndividual {
    pub fn errors(&self) -> &[Residuals] {
        &self.errors
    }
}

impl BoundPolicy for LocalIndividual {
    fn with_capacity(layer2_size: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            errors: zeroed_vec(layer2_size)?,
        })
    }

    fn record(&mut self, bucket: usize, pred: usize, actual: usize) {
        let e = &mut self.errors[bucket];
        if pred > actual {
            e.lo = e.lo.max(pred - actual);
        } else {
            e.hi = e.hi.max(actual - pred);
        }
    }

    fn interval(&self, bucket: usize, pred: usize, n_keys: usize) -> (usize, usize) {
        let e = self.errors[bucket];
        (pred.saturating_sub(e.lo), (pred + e.hi + 1).min(n_keys))
    }

    fn size_in_bytes(&self) -> usize {
        self.errors.len() * mem::size_of::<Residuals>()
    }
}

/// Local, absolute: one symmetric maximum per bucket.
#[derive(Debug, Clone)]
pub struct LocalAbsolute {
    errors: Vec<usize>,
}

impl LocalAbsolute {
    pub fn errors(&self) -> &[usize] {
        &self.errors
    }
}

impl BoundPolicy for LocalAbsolute {
    fn with_capacity(layer2_size: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            errors: zeroed_vec(layer2_size)?,
        })
    }

    fn record(&mut self, bucket: usize, pred: usize, actual: usize) {
        let err = if pred > actual {
            pred - actual
        } else {
            actual - pred
        };
        self.errors[bucket] = self.errors[bucket].max(err);
    }

    fn interval(&self, bucket: usize, pred: usize, n_keys: usize) -> (usize, usize) {
        let e = self.errors[bucket];
        (pred.saturating_sub(e), (pred + e + 1).min(n_keys))
    }

    fn size_in_bytes(&self) -> usize {
        self.errors.len() * mem::size_of::<usize>()
    }
}

/// Global, individual: one `(lo, hi)` pair for the whole index.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalIndividual {
    error_lo: usize,
    error_hi: usize,
}

impl GlobalIndividual {
    pub fn error_lo(&self) -> usize {
        self.error_lo
    }

    pub fn error_hi(&self) -> usize {
        self.error_hi
    }
}

impl BoundPolicy for GlobalIndividual {
    fn with_capacity(_layer2_size: usize) -> Result<Self, TryReserveError> {
        Ok(Self::default())
    }

    fn record(&mut self, _bucket: usize, pred: usize, actual: usize) {
        if pred > actual {
            self.error_lo = self.error_lo.max(pred - actual);
        } else {
            self.error_hi = self.error_hi.max(actual - pred);
        }
    }

    fn interval(&self, _bucket: usize, pred: usize, n_keys: usize) -> (usize, usize) {
        (
            pred.saturating_sub(self.error_lo),
            (pred + self.error_hi + 1).min(n_keys),
        )
    }

    fn size_in_bytes(&self) -> usize {
        2 * mem::size_of::<usize>()
    }
}

/// Global, absolute: one symmetric maximum for the whole index.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAbsolute {
    error: usize,
}

impl GlobalAbsolute {
    pub fn error(&self) -> usize {
        self.error
    }
}

impl BoundPolicy for GlobalAbsolute {
    fn with_capacity(_layer2_size: usize) -> Result<Self, TryReserveError> {
        Ok(Self::default())
    }

    fn record(&mut self, _bucket: usize, pred: usize, actual: usize) {
        let err = if pred > actual {
            pred - actual
        } else {
            actual - pred
        };
        self.error = self.error.max(err);
    }

    fn interval(&self, _bucket: usize, pred: usize, n_keys: usize) -> (usize, usize) {
        (
            pred.saturating_sub(self.error),
            (pred + self.error + 1).min(n_keys),
        )
    }

    fn size_in_bytes(&self) -> usize {
        mem::size_of::<usize>()
    }
}

/// No bounds: every interval spans the full array.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBounds;

impl BoundPolicy for NoBounds {
    fn with_capacity(_layer2_size: usize) -> Result<Self, TryReserveError> {
        Ok(Self)
    }

    fn record(&mut self, _bucket: usize, _pred: usize, _actual: usize) {}

    fn interval(&self, _bucket: usize, _pred: usize, n_keys: usize) -> (usize, usize) {
        (0, n_keys)
    }

    fn size_in_bytes(&self) -> usize {
        0
    }
}
