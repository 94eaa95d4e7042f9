//! A recursive model index (RMI) over a sorted slice of unsigned integer keys.
//!
//! The index predicts the position of a key with a two-layer model hierarchy
//! and widens the prediction into an interval `[lo, hi)` guaranteed to contain
//! the key's position whenever the key is present. A bounded lower-bound
//! search over that interval (see [`search`]) completes an exact lookup.
//!
//! The structure is immutable after construction and does not retain the key
//! slice it was built from.

use bytemuck::Pod;
use num::{PrimInt, Unsigned};
use std::fmt::Debug;
use trait_set::trait_set;

mod bounds;
mod error;
mod models;
mod rmi;
pub mod search;

pub use bounds::{
    BoundPolicy, GlobalAbsolute, GlobalIndividual, LocalAbsolute, LocalIndividual, NoBounds,
    Residuals,
};
pub use error::BuildError;
pub use models::{CubicSpline, LinearRegression, LinearSpline, Model, Radix};
pub use rmi::{Rmi, RmiGAbs, RmiGInd, RmiLAbs, RmiLInd, RmiNoBounds};

// Until `trait_alias` is stabilized, we have to use a macro
trait_set! {
    /// Key type: a thread-safe POD unsigned primitive integer.
    pub trait Key = Pod + Debug + Send + Sync + PrimInt + Unsigned;
}

/// A range of positions guaranteed to contain a key, together with the raw
/// position estimate the range was widened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approximation {
    /// Clamped layer-2 position estimate.
    pub pos: usize,
    /// Inclusive lower end of the containment interval.
    pub lo: usize,
    /// Exclusive upper end of the containment interval.
    pub hi: usize,
}
