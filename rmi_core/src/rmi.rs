//! The two-layer recursive model index.

use crate::bounds::{
    BoundPolicy, GlobalAbsolute, GlobalIndividual, LocalAbsolute, LocalIndividual, NoBounds,
};
use crate::models::Model;
use crate::{Approximation, BuildError, Key};
use std::marker::PhantomData;
use std::mem;

/// Recursive model index over a sorted slice of keys.
///
/// Layer 1 is a single model trained over all keys with a compression factor
/// that maps key space into bucket space `[0, layer2_size)`. Layer 2 is a
/// dense array of models, each trained on the contiguous slice of keys that
/// layer 1 routes into its bucket and predicting absolute positions. The
/// bound policy `B` widens raw predictions into guaranteed-containment
/// intervals.
///
/// The key slice is borrowed only during [`Rmi::new`]; callers keep it for
/// the last-mile search (see [`crate::search`]).
pub struct Rmi<K: Key, L1: Model<K>, L2: Model<K>, B: BoundPolicy = LocalAbsolute> {
    l1: L1,
    l2: Vec<L2>,
    n_keys: usize,
    layer2_size: usize,
    bounds: B,
    _key: PhantomData<K>,
}

/// Per-bucket individual bounds.
pub type RmiLInd<K, L1, L2> = Rmi<K, L1, L2, LocalIndividual>;
/// Per-bucket absolute bounds (the default).
pub type RmiLAbs<K, L1, L2> = Rmi<K, L1, L2, LocalAbsolute>;
/// One individual bound pair for the whole index.
pub type RmiGInd<K, L1, L2> = Rmi<K, L1, L2, GlobalIndividual>;
/// One absolute bound for the whole index.
pub type RmiGAbs<K, L1, L2> = Rmi<K, L1, L2, GlobalAbsolute>;
/// No stored bounds; intervals span the full array.
pub type RmiNoBounds<K, L1, L2> = Rmi<K, L1, L2, NoBounds>;

#[inline]
fn clamp_bucket(pred: f64, layer2_size: usize) -> usize {
    pred.clamp(0.0, (layer2_size - 1) as f64) as usize
}

#[inline]
fn clamp_pos(pred: f64, n_keys: usize) -> usize {
    pred.clamp(0.0, (n_keys - 1) as f64) as usize
}

impl<K: Key, L1: Model<K>, L2: Model<K>, B: BoundPolicy> Rmi<K, L1, L2, B> {
    /// Builds the index over `keys`, which must be sorted non-decreasing.
    ///
    /// `keys` may be empty; the resulting index answers every query with the
    /// empty interval. Fails only on `layer2_size == 0` or allocation
    /// failure.
    pub fn new(keys: &[K], layer2_size: usize) -> Result<Self, BuildError> {
        if layer2_size == 0 {
            return Err(BuildError::EmptyLayer2);
        }
        let n_keys = keys.len();

        let mut l2 = Vec::new();
        l2.try_reserve_exact(layer2_size)?;

        if n_keys == 0 {
            let l1 = L1::fit(keys, 0, 0, 1.0);
            for _ in 0..layer2_size {
                l2.push(L2::fit(keys, 0, 0, 1.0));
            }
            let bounds = B::with_capacity(layer2_size)?;
            return Ok(Self {
                l1,
                l2,
                n_keys,
                layer2_size,
                bounds,
                _key: PhantomData,
            });
        }

        // Layer 1 maps key space into bucket space [0, layer2_size).
        let compression = layer2_size as f64 / n_keys as f64;
        let l1 = L1::fit(keys, 0, n_keys, compression);

        // Both layers are monotonic on sorted input, so bucket assignments
        // are non-decreasing and a single pass partitions the keys into
        // contiguous slices.
        let mut bucket_start = 0;
        let mut curr_bucket = 0;
        for i in 0..n_keys {
            let pred_bucket = clamp_bucket(l1.predict(keys[i]), layer2_size);
            if pred_bucket > curr_bucket {
                l2.push(L2::fit(keys, bucket_start, i - bucket_start, 1.0));
                // Skipped buckets get a single-point anchor at the last seen
                // key, so lookups stay total without a null check. When the
                // very first key skips past bucket zero, anchor at it.
                let anchor = i.saturating_sub(1);
                for _ in curr_bucket + 1..pred_bucket {
                    l2.push(L2::fit(keys, anchor, 1, 1.0));
                }
                curr_bucket = pred_bucket;
                bucket_start = i;
            }
        }
        l2.push(L2::fit(keys, bucket_start, n_keys - bucket_start, 1.0));
        for _ in curr_bucket + 1..layer2_size {
            l2.push(L2::fit(keys, n_keys - 1, 1, 1.0));
        }
        debug_assert_eq!(l2.len(), layer2_size);

        // Second pass: capture the worst-case residual of every key under
        // the exact prediction path queries will take.
        let mut bounds = B::with_capacity(layer2_size)?;
        for (i, &key) in keys.iter().enumerate() {
            let bucket = clamp_bucket(l1.predict(key), layer2_size);
            let pred = clamp_pos(l2[bucket].predict(key), n_keys);
            bounds.record(bucket, pred, i);
        }

        Ok(Self {
            l1,
            l2,
            n_keys,
            layer2_size,
            bounds,
            _key: PhantomData,
        })
    }

    /// Bucket that layer 1 routes `key` into.
    pub fn get_bucket(&self, key: K) -> usize {
        clamp_bucket(self.l1.predict(key), self.layer2_size)
    }

    /// Predicts the position of `key` and widens it into an interval
    /// `[lo, hi)` that contains the key's position whenever `key` is present
    /// in the indexed slice.
    pub fn search(&self, key: K) -> Approximation {
        if self.n_keys == 0 {
            return Approximation {
                pos: 0,
                lo: 0,
                hi: 0,
            };
        }
        let bucket = self.get_bucket(key);
        let pos = clamp_pos(self.l2[bucket].predict(key), self.n_keys);
        let (lo, hi) = self.bounds.interval(bucket, pos, self.n_keys);
        Approximation { pos, lo, hi }
    }

    pub fn n_keys(&self) -> usize {
        self.n_keys
    }

    pub fn layer2_size(&self) -> usize {
        self.layer2_size
    }

    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    pub fn l2(&self) -> &[L2] {
        &self.l2
    }

    /// The bound storage, exposing the mode-specific accessors.
    pub fn bounds(&self) -> &B {
        &self.bounds
    }

    /// Total bytes held: layer-1 coefficients, the layer-2 array, bound
    /// storage, and the two scalar counters.
    pub fn size_in_bytes(&self) -> usize {
        L1::size_in_bytes()
            + self.layer2_size * L2::size_in_bytes()
            + self.bounds.size_in_bytes()
            + 2 * mem::size_of::<usize>()
    }
}
