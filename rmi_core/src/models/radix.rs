use super::{as_f64, Model};
use crate::Key;
use bytemuck::{Pod, Zeroable};
use std::mem;

/// Bits needed to represent `n`.
fn bit_width(n: usize) -> u8 {
    (usize::BITS - n.leading_zeros()) as u8
}

/// Length of the common high-order bit prefix of two values.
fn common_prefix_width<K: Key>(a: K, b: K) -> u8 {
    (a ^ b).leading_zeros() as u8
}

/// Bit-shift model: discards the common key prefix and reads the next
/// `radix` bits as the position estimate.
///
/// The estimate is pure integer arithmetic returned as `f64`. Shifts at or
/// beyond the key width evaluate to zero, keeping the predictor total where
/// the equivalent C shift would be undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Radix {
    prefix: u8,
    radix: u8,
}

impl Radix {
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn radix(&self) -> u8 {
        self.radix
    }
}

impl<K: Key> Model<K> for Radix {
    fn fit(keys: &[K], offset: usize, n: usize, compression: f64) -> Self {
        if n == 0 {
            return Self {
                prefix: 0,
                radix: 0,
            };
        }

        let prefix = common_prefix_width(keys[offset], keys[offset + n - 1]);

        // Width of the largest scaled position. One bit narrower unless the
        // maximum saturates its width (has the form 2^b - 1).
        let max = ((offset + n - 1) as f64 * compression) as usize;
        let saturated = (max & max.wrapping_add(1)) == 0;
        let radix = if saturated {
            bit_width(max)
        } else {
            bit_width(max) - 1
        };

        Self { prefix, radix }
    }

    fn predict(&self, key: K) -> f64 {
        let width = (mem::size_of::<K>() * 8) as u32;

        let shifted = if (self.prefix as u32) < width {
            key << self.prefix as usize
        } else {
            K::zero()
        };

        let down = width.saturating_sub(self.radix as u32);
        let bucket = if down == 0 {
            shifted
        } else if down < width {
            shifted >> down as usize
        } else {
            K::zero()
        };

        as_f64(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_width_counts() {
        assert_eq!(bit_width(0), 0);
        assert_eq!(bit_width(1), 1);
        assert_eq!(bit_width(7), 3);
        assert_eq!(bit_width(8), 4);
        assert_eq!(bit_width(1023), 10);
    }

    #[test]
    fn common_prefix_of_u64() {
        assert_eq!(common_prefix_width(0u64, u64::MAX), 0);
        assert_eq!(common_prefix_width(u64::MAX, u64::MAX), 64);
        assert_eq!(common_prefix_width(0b1010u64 << 60, 0b1011u64 << 60), 3);
    }

    #[test]
    fn extracts_high_bits() {
        // 256 keys spread over the full u64 range, no shared prefix.
        let keys: Vec<u64> = (0..256u64).map(|i| i << 56).collect();
        let m = <Radix as Model<u64>>::fit(&keys, 0, keys.len(), 1.0);

        assert_eq!(m.prefix(), 0);
        // max position 255 = 2^8 - 1, so all eight bits are kept.
        assert_eq!(m.radix(), 8);

        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(Model::<u64>::predict(&m, key), i as f64);
        }
    }

    #[test]
    fn shared_prefix_is_discarded() {
        let base = 0xABCDu64 << 48;
        let keys: Vec<u64> = (0..64u64).map(|i| base | (i << 42)).collect();
        let m = <Radix as Model<u64>>::fit(&keys, 0, keys.len(), 1.0);

        assert_eq!(m.prefix(), 16);
        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(Model::<u64>::predict(&m, key), i as f64);
        }
    }

    #[test]
    fn identical_keys_predict_zero() {
        let keys: Vec<u64> = vec![42; 100];
        let m = <Radix as Model<u64>>::fit(&keys, 0, keys.len(), 1.0);

        // Full-width prefix: every key collapses to the zero bucket.
        assert_eq!(m.prefix(), 64);
        assert_eq!(Model::<u64>::predict(&m, 42), 0.0);
    }

    #[test]
    fn empty_fit_is_zero() {
        let keys: Vec<u64> = vec![];
        let m = <Radix as Model<u64>>::fit(&keys, 0, 0, 1.0);
        assert_eq!(Model::<u64>::predict(&m, u64::MAX), 0.0);
    }

    #[test]
    fn size_is_two_bytes() {
        assert_eq!(<Radix as Model<u64>>::size_in_bytes(), 2);
    }
}
