/*!
# Zipf Generator

Power-law integer generator after Gray et al., "Quickly Generating
Billion-Record Synthetic Databases". Element `k` receives weight proportional
to `(1/k)^theta`; with the default skew of 0.9 the first few elements soak up
most of the draws, which is what makes it useful for biased word and key
selection.

Each instance carries its own uniform source seeded with a fixed large prime,
so sequences are reproducible per instance; concurrent use requires one
instance per thread.
*/

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed seed for the internal uniform source (the Mersenne prime 2^31 - 1).
const ZIPF_SEED: u64 = 2_147_483_647;

const DEFAULT_THETA: f64 = 0.9;

/// Generator for Zipf-distributed integers in `[0, n - 1]`.
#[derive(Debug)]
pub struct ZipfGenerator {
    n: i64,
    theta: f64,
    alpha: f64,
    zetan: f64,
    eta: f64,
    rng: StdRng,
}

impl ZipfGenerator {
    /// Creates a generator over `n` elements with the default skew of 0.9.
    pub fn new(n: i64) -> Self {
        Self::with_skew(n, DEFAULT_THETA)
    }

    /// Creates a generator over `n` elements with skew `theta` in (0, 1).
    pub fn with_skew(n: i64, theta: f64) -> Self {
        let n = n.max(1);
        let alpha = 1.0 / (1.0 - theta);
        let zetan = zeta(n, theta);
        let eta = (1.0 - (2.0 / n as f64).powf(1.0 - theta)) / (1.0 - zeta(2, theta) / zetan);
        Self {
            n,
            theta,
            alpha,
            zetan,
            eta,
            rng: StdRng::seed_from_u64(ZIPF_SEED),
        }
    }

    /// Number of elements in the range.
    pub fn element_count(&self) -> i64 {
        self.n
    }

    /// Next Zipf-distributed integer in `[0, n - 1]`.
    pub fn next(&mut self) -> i64 {
        let u: f64 = self.rng.gen();
        let uz = u * self.zetan;
        if uz < 1.0 {
            return 0;
        }
        if uz < 1.0 + 0.5f64.powf(self.theta) {
            return 1;
        }
        (self.n as f64 * (self.eta * u - self.eta + 1.0).powf(self.alpha)) as i64
    }
}

/// Sum of `(1/k)^theta` for `k` in `[1, n]`.
fn zeta(n: i64, theta: f64) -> f64 {
    let mut sum = 0.0;
    for k in 1..=n {
        sum += (1.0 / k as f64).powf(theta);
    }
    sum
}
