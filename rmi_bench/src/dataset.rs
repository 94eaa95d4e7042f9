//! Dataset loading, generation, and probe sampling.

use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Uniform;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a binary key file: a little-endian `u64` count, then that many
/// little-endian `u64` keys in non-decreasing order.
pub fn load_keys(path: &Path) -> Result<Vec<u64>> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; 8];
    reader
        .read_exact(&mut header)
        .context("key file too short for count header")?;
    let n_keys = u64::from_le_bytes(header) as usize;

    let mut raw = vec![0u8; n_keys * 8];
    reader
        .read_exact(&mut raw)
        .with_context(|| format!("key file truncated, expected {n_keys} keys"))?;

    let keys: Vec<u64> = raw
        .chunks_exact(8)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
        .collect();

    ensure!(
        keys.windows(2).all(|w| w[0] <= w[1]),
        "keys in {} are not sorted",
        path.display()
    );

    Ok(keys)
}

/// Uniform random sorted `u64` keys, deduplicated, deterministic per seed.
pub fn gen_uniform(n_keys: usize, seed: u64) -> Vec<u64> {
    let mut keys: Vec<u64> = StdRng::seed_from_u64(seed)
        .sample_iter(Uniform::new(0, u64::MAX))
        .unique()
        .take(n_keys)
        .collect();
    keys.sort_unstable();
    keys
}

/// Probe keys drawn from random positions of the dataset.
pub fn sample_keys(keys: &[u64], n_samples: usize, seed: u64) -> Vec<u64> {
    let positions = Uniform::new(0, keys.len());
    StdRng::seed_from_u64(seed)
        .sample_iter(positions)
        .take(n_samples)
        .map(|i| keys[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_key_file() {
        let keys: Vec<u64> = vec![3, 7, 7, 100, u64::MAX];

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&(keys.len() as u64).to_le_bytes()).unwrap();
        for key in &keys {
            file.write_all(&key.to_le_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(load_keys(file.path()).unwrap(), keys);
    }

    #[test]
    fn rejects_truncated_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&10u64.to_le_bytes()).unwrap();
        file.write_all(&42u64.to_le_bytes()).unwrap();
        file.flush().unwrap();

        assert!(load_keys(file.path()).is_err());
    }

    #[test]
    fn rejects_unsorted_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&2u64.to_le_bytes()).unwrap();
        file.write_all(&9u64.to_le_bytes()).unwrap();
        file.write_all(&4u64.to_le_bytes()).unwrap();
        file.flush().unwrap();

        assert!(load_keys(file.path()).is_err());
    }

    #[test]
    fn generated_keys_are_sorted_unique_and_deterministic() {
        let a = gen_uniform(10_000, 7);
        let b = gen_uniform(10_000, 7);

        assert_eq!(a, b);
        assert_eq!(a.len(), 10_000);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn samples_come_from_the_dataset() {
        let keys = gen_uniform(1000, 3);
        let samples = sample_keys(&keys, 100, 9);

        assert_eq!(samples.len(), 100);
        assert!(samples.iter().all(|s| keys.binary_search(s).is_ok()));
    }
}
