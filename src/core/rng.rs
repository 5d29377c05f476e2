//! Counter-based random numbers. Every ray path carries its own 64-bit
//! counter, so paths can be traced in any order on any number of
//! workers and still reproduce bit-identical results.

// rayx
use crate::core::rayx::{Float, PI};

/*
 * Title: "Squares: A Fast Counter-Based RNG"
 * Author: Bernard Widynski
 * Date: November 24, 2020
 * URL: https://arxiv.org/pdf/2004.06278.pdf
 */
const RNG_KEY: u64 = (0xc8e4_fd15_u64 << 32) | 0x4ce3_2f6d_u64;

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rng {
    ctr: u64,
}

impl Rng {
    /// Seed the counter for one ray path. The counter space is split
    /// into equal strides, one per path, so the sequence a path draws
    /// from is independent of batch layout and worker count.
    pub fn new(ray_path_index: u64, num_rays_total: u64, seed: u64) -> Self {
        let stride: u64 = u64::MAX / num_rays_total.max(1);
        Rng {
            ctr: seed.wrapping_add(ray_path_index.wrapping_mul(stride)),
        }
    }

    /// Construct directly from a raw counter value.
    pub fn from_counter(ctr: u64) -> Self {
        Rng { ctr }
    }

    /// generates 64-bit random integers
    pub fn squares64(&mut self) -> u64 {
        let y: u64 = self.ctr.wrapping_mul(RNG_KEY);
        let mut x: u64 = y;
        let z: u64 = y.wrapping_add(RNG_KEY);
        self.ctr = self.ctr.wrapping_add(1);

        x = x.wrapping_mul(x).wrapping_add(y);
        x = (x >> 32) | (x << 32); /* round 1 */
        x = x.wrapping_mul(x).wrapping_add(z);
        x = (x >> 32) | (x << 32); /* round 2 */
        x = x.wrapping_mul(x).wrapping_add(y);
        x = (x >> 32) | (x << 32); /* round 3 */
        let t: u64 = x.wrapping_mul(x).wrapping_add(z);
        x = (t >> 32) | (t << 32); /* round 4 */
        t ^ (x.wrapping_mul(x).wrapping_add(y) >> 32)
    }

    /// generates uniformly distributed doubles in [0, 1) from one
    /// 64-bit random integer
    pub fn uniform(&mut self) -> Float {
        self.squares64() as Float / u64::MAX as Float
    }

    /// creates (via the Box-Muller transform) a normal distributed
    /// double with mean mu and standard deviation sigma
    pub fn normal(&mut self, mu: Float, sigma: Float) -> Float {
        let two_pi: Float = 2.0 * PI;

        let u: Float = self.uniform();
        let v: Float = self.uniform();
        let r: Float = self.uniform();
        let mut z: Float = (-2.0 * u.ln()).sqrt();

        if r < 0.5 {
            z *= (two_pi * v).sin();
        } else {
            z *= (two_pi * v).cos();
        }

        z * sigma + mu
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_random() {
        let mut rng = Rng::from_counter(13);
        let mut old: Float = 0.0;

        for _ in 0..100 {
            let d: Float = rng.uniform();
            // repeating numbers are forbidden!
            assert_ne!(d, old);
            assert!((0.0..1.0).contains(&d));
            old = d;
        }
    }

    #[test]
    fn test_normal_random() {
        let mut rng = Rng::from_counter(13);
        let mu: Float = 0.0;
        let sigma: Float = 1.0;

        let samples: Vec<Float> = (0..1000).map(|_| rng.normal(mu, sigma)).collect();

        let mean: Float = samples.iter().sum::<Float>() / samples.len() as Float;
        let sq_sum: Float = samples.iter().map(|x| x * x).sum::<Float>();
        let std_dev: Float = (sq_sum / samples.len() as Float - mean * mean).sqrt();

        assert!((mean - mu).abs() < 0.1);
        assert!((std_dev - sigma).abs() < 0.1);

        // the absolute z-score should stay below 2 for the vast
        // majority of draws
        let within = samples.iter().filter(|x| x.abs() <= 2.0).count();
        assert!(within > (0.95 * samples.len() as Float) as usize);
    }

    #[test]
    fn test_stride_partitioning_is_deterministic() {
        let a = Rng::new(17, 1000, 42);
        let b = Rng::new(17, 1000, 42);
        assert_eq!(a, b);

        let mut a = a;
        let mut b = b;
        for _ in 0..10 {
            assert_eq!(a.squares64(), b.squares64());
        }

        // different paths draw from disjoint counter slices
        let mut c = Rng::new(18, 1000, 42);
        assert_ne!(a.squares64(), c.squares64());
    }
}
