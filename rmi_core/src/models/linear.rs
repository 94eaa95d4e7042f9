use super::{as_f64, Model};
use crate::Key;
use bytemuck::{Pod, Zeroable};

/// Line through the first and last training point.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LinearSpline {
    slope: f64,
    intercept: f64,
}

impl LinearSpline {
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl<K: Key> Model<K> for LinearSpline {
    fn fit(keys: &[K], offset: usize, n: usize, compression: f64) -> Self {
        if n == 0 {
            return Self {
                slope: 0.0,
                intercept: 0.0,
            };
        }
        if n == 1 {
            return Self {
                slope: 0.0,
                intercept: offset as f64 * compression,
            };
        }

        // Key delta is taken in integer arithmetic so it stays exact for
        // keys beyond 2^53. Rise is n rather than n - 1: (offset + n) - offset.
        let denominator = as_f64(keys[offset + n - 1] - keys[offset]);
        let slope = if denominator != 0.0 {
            n as f64 / denominator * compression
        } else {
            0.0
        };
        let intercept = offset as f64 * compression - slope * as_f64(keys[offset]);

        Self { slope, intercept }
    }

    fn predict(&self, key: K) -> f64 {
        self.slope.mul_add(as_f64(key), self.intercept)
    }
}

/// Ordinary least squares over the training points.
///
/// Moments are accumulated with Welford's single-pass recurrence, which stays
/// accurate on large runs where naive sum-of-products accumulation drifts.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
}

impl LinearRegression {
    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl<K: Key> Model<K> for LinearRegression {
    fn fit(keys: &[K], offset: usize, n: usize, compression: f64) -> Self {
        if n == 0 {
            return Self {
                slope: 0.0,
                intercept: 0.0,
            };
        }
        if n == 1 {
            return Self {
                slope: 0.0,
                intercept: offset as f64 * compression,
            };
        }

        let mut mean_x = 0.0;
        let mut mean_y = 0.0;
        let mut c = 0.0;
        let mut m2 = 0.0;

        for i in 0..n {
            let x = as_f64(keys[offset + i]);
            let y = (offset + i) as f64;

            let dx = x - mean_x;
            mean_x += dx / (i + 1) as f64;
            mean_y += (y - mean_y) / (i + 1) as f64;
            c += dx * (y - mean_y);
            m2 += dx * (x - mean_x);
        }

        let cov = c / (n - 1) as f64;
        let var = m2 / (n - 1) as f64;

        if var == 0.0 {
            // All training keys equal; predict the mean position.
            return Self {
                slope: 0.0,
                intercept: mean_y * compression,
            };
        }

        let slope = cov / var * compression;
        let intercept = mean_y * compression - slope * mean_x;

        Self { slope, intercept }
    }

    fn predict(&self, key: K) -> f64 {
        self.slope.mul_add(as_f64(key), self.intercept)
    }
}
