use super::{as_f64, LinearSpline, Model};
use crate::Key;
use bytemuck::{Pod, Zeroable};

/// Monotone Hermite cubic through the endpoints of the training range.
///
/// Endpoint tangents are estimated in normalized coordinates and run through
/// the Fritsch-Carlson correction, which keeps the cubic monotonic on sorted
/// input. Coefficients are expressed in original key units; for keys beyond
/// 2^53 the `(xmax - xmin)^3` term is evaluated in `f64` and predictions lose
/// precision accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct CubicSpline {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl CubicSpline {
    pub fn coefficients(&self) -> (f64, f64, f64, f64) {
        (self.a, self.b, self.c, self.d)
    }
}

impl<K: Key> Model<K> for CubicSpline {
    fn fit(keys: &[K], offset: usize, n: usize, compression: f64) -> Self {
        if n == 0 {
            return Self {
                a: 0.0,
                b: 0.0,
                c: 1.0,
                d: 0.0,
            };
        }
        if n == 1 || keys[offset] == keys[offset + n - 1] {
            return Self {
                a: 0.0,
                b: 0.0,
                c: 0.0,
                d: offset as f64 * compression,
            };
        }

        let xmin = as_f64(keys[offset]);
        let ymin = offset as f64 * compression;
        let xmax = as_f64(keys[offset + n - 1]);
        let ymax = (offset + n - 1) as f64 * compression;

        // Tangent at the left endpoint: secant to the first training point
        // with a distinct normalized x-coordinate.
        let mut sxn = 0.0;
        let mut syn = 0.0;
        for i in 0..n {
            let x = as_f64(keys[offset + i]);
            let y = (offset + i) as f64 * compression;
            sxn = (x - xmin) / (xmax - xmin);
            if sxn > 0.0 {
                syn = (y - ymin) / (ymax - ymin);
                break;
            }
        }
        let mut m1 = syn / sxn;

        // Tangent at the right endpoint: secant from the first training point
        // with normalized x below one.
        let mut sxp = 0.0;
        let mut syp = 0.0;
        for i in 0..n {
            let x = as_f64(keys[offset + i]);
            let y = (offset + i) as f64 * compression;
            sxp = (x - xmin) / (xmax - xmin);
            if sxp < 1.0 {
                syp = (y - ymin) / (ymax - ymin);
                break;
            }
        }
        let mut m2 = (1.0 - syp) / (1.0 - sxp);

        // Fritsch-Carlson: pull the tangent vector inside the circle of
        // radius three, preserving monotonicity.
        if m1 * m1 + m2 * m2 > 9.0 {
            let tau = 3.0 / (m1 * m1 + m2 * m2).sqrt();
            m1 *= tau;
            m2 *= tau;
        }

        let dx3 = (xmax - xmin).powi(3);

        let mut a = (m1 + m2 - 2.0) / dx3;
        let mut b = -(xmax * (2.0 * m1 + m2 - 3.0) + xmin * (m1 + 2.0 * m2 - 3.0)) / dx3;
        let mut c = (m1 * xmax.powi(2)
            + m2 * xmin.powi(2)
            + xmax * xmin * (2.0 * m1 + 2.0 * m2 - 6.0))
            / dx3;
        let mut d = -xmin * (m1 * xmax.powi(2) + xmax * xmin * (m2 - 3.0) + xmin.powi(2)) / dx3;

        a *= ymax - ymin;
        b *= ymax - ymin;
        c *= ymax - ymin;
        d *= ymax - ymin;
        d += ymin;

        let cubic = Self { a, b, c, d };

        // Keep the cubic only if it beats a linear spline on total absolute
        // residual over the same training points.
        let ls = <LinearSpline as Model<K>>::fit(keys, offset, n, compression);

        let mut ls_error = 0.0;
        let mut cs_error = 0.0;
        for i in 0..n {
            let key = keys[offset + i];
            let y = (offset + i) as f64 * compression;
            ls_error += (Model::<K>::predict(&ls, key) - y).abs();
            cs_error += (Model::<K>::predict(&cubic, key) - y).abs();
        }

        if ls_error < cs_error {
            Self {
                a: 0.0,
                b: 0.0,
                c: ls.slope(),
                d: ls.intercept(),
            }
        } else {
            cubic
        }
    }

    fn predict(&self, key: K) -> f64 {
        let x = as_f64(key);
        self.a
            .mul_add(x, self.b)
            .mul_add(x, self.c)
            .mul_add(x, self.d)
    }
}
