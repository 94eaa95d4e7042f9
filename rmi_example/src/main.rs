//! Builds a two-layer RMI over random keys and resolves one lookup.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Uniform;
use rmi_core::search::{BinarySearch, Search};
use rmi_core::{BuildError, LinearRegression, LinearSpline, RmiLAbs};

fn main() -> Result<(), BuildError> {
    // One million random keys, sorted.
    let mut rng = StdRng::seed_from_u64(42);
    let mut keys: Vec<u64> = (&mut rng)
        .sample_iter(Uniform::new(0, u64::MAX))
        .take(1_000_000)
        .collect();
    keys.sort_unstable();

    // Two-layer RMI: a linear spline routing into 2^16 linear regressions.
    let rmi = RmiLAbs::<u64, LinearSpline, LinearRegression>::new(&keys, 1 << 16)?;

    // Pick an indexed key and complete the lookup inside the returned range.
    let key = keys[rng.sample(Uniform::new(0, keys.len()))];
    let approx = rmi.search(key);
    let pos = BinarySearch::lookup(&keys, approx, key).expect("indexed key must be found");

    println!("key {key} is located at position {pos}");
    println!(
        "index holds {} keys in {} bytes, predicted {} within [{}, {})",
        rmi.n_keys(),
        rmi.size_in_bytes(),
        approx.pos,
        approx.lo,
        approx.hi,
    );

    Ok(())
}
