//! Seeded pseudo-random number generation for terrain variation.
//!
//! The seed is passed through the Wang hash so that weak seeds (0, 1, small
//! integers) still produce well-mixed streams. Two generation algorithms are
//! selectable; both are deterministic for a given seed, which is what makes a
//! regenerated terrain bit-reproducible.
//!
//! - <http://reedbeta.com/blog/quick-and-easy-gpu-random-numbers-in-d3d11/>

/// Which update function advances the generator state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Classic 32-bit linear congruential generator. Acceptable for
    /// non-cryptographic terrain jitter only.
    Lcg,
    /// Marsaglia's 32-bit xorshift.
    #[default]
    XorShift,
}

/// A small deterministic generator. Each generation pass owns one instance;
/// no thread-safety is implied.
#[derive(Clone, Debug)]
pub struct Prng {
    state: u32,
    algorithm: Algorithm,
}

/// Integer hash with strong avalanche, used to condition the seed.
pub fn wang_hash(seed: u32) -> u32 {
    let mut seed = (seed ^ 61) ^ (seed >> 16);
    seed = seed.wrapping_mul(9);
    seed ^= seed >> 4;
    seed = seed.wrapping_mul(0x27d4_eb2d);
    seed ^ (seed >> 15)
}

/// Map a 32-bit value into [0, 1). Keeps the top 24 bits so the quotient
/// fits the f32 mantissa exactly; dividing a full 32-bit value by 2^32 can
/// round up to 1.0. This is the host mirror of the device-side mapping in
/// the random height kernel.
pub fn unit_float(value: u32) -> f32 {
    (value >> 8) as f32 / 16_777_216.0
}

impl Prng {
    pub fn new(seed: u32) -> Self {
        Self::with_algorithm(seed, Algorithm::default())
    }

    pub fn with_algorithm(seed: u32, algorithm: Algorithm) -> Self {
        Self {
            state: wang_hash(seed),
            algorithm,
        }
    }

    /// Pull one 32-bit value, advancing the state.
    pub fn next(&mut self) -> u32 {
        match self.algorithm {
            Algorithm::Lcg => {
                self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            }
            Algorithm::XorShift => {
                self.state ^= self.state << 13;
                self.state ^= self.state >> 17;
                self.state ^= self.state << 5;
            }
        }
        self.state
    }

    /// Fill `out` by repeated `next()` calls, in order, overwriting any
    /// previous contents.
    pub fn refill(&mut self, out: &mut [u32]) {
        for slot in out.iter_mut() {
            *slot = self.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::RANDOM_UNIFORM_COUNT;

    #[test]
    fn equal_seeds_produce_identical_arrays() {
        for algorithm in [Algorithm::Lcg, Algorithm::XorShift] {
            let mut a = [0u32; RANDOM_UNIFORM_COUNT];
            let mut b = [0u32; RANDOM_UNIFORM_COUNT];
            Prng::with_algorithm(12345, algorithm).refill(&mut a);
            Prng::with_algorithm(12345, algorithm).refill(&mut b);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn distinct_seeds_differ_in_most_positions() {
        let mut base = [0u32; RANDOM_UNIFORM_COUNT];
        Prng::new(1).refill(&mut base);
        for seed in 2..34u32 {
            let mut other = [0u32; RANDOM_UNIFORM_COUNT];
            Prng::new(seed).refill(&mut other);
            let matching = base.iter().zip(&other).filter(|(a, b)| a == b).count();
            assert!(
                matching <= RANDOM_UNIFORM_COUNT / 4,
                "seed {seed} matched seed 1 in {matching} of {RANDOM_UNIFORM_COUNT} positions"
            );
        }
    }

    #[test]
    fn weak_seeds_are_conditioned() {
        // Without the Wang hash, seed 0 would be a fixed point of xorshift.
        let mut zeros = [0u32; 8];
        Prng::with_algorithm(0, Algorithm::XorShift).refill(&mut zeros);
        assert!(zeros.iter().any(|&v| v != 0));
        assert_ne!(wang_hash(0), 0);
        assert_ne!(wang_hash(1), wang_hash(0));
    }

    #[test]
    fn unit_float_never_reaches_one() {
        assert_eq!(unit_float(0), 0.0);
        // f32 rounds values within 128 of 2^32 up to 2^32 exactly, so a
        // naive `v as f32 / 2^32` mapping would hit 1.0 at the top of the
        // range. The 24-bit mapping must not.
        for v in [u32::MAX, u32::MAX - 1, u32::MAX - 127, 0xffff_ff00] {
            let f = unit_float(v);
            assert!((0.0..1.0).contains(&f), "unit_float({v:#x}) = {f}");
        }
        let mut prng = Prng::new(3);
        for _ in 0..10_000 {
            assert!((0.0..1.0).contains(&unit_float(prng.next())));
        }
    }

    #[test]
    fn refill_overwrites_previous_contents() {
        let mut arr = [u32::MAX; RANDOM_UNIFORM_COUNT];
        let mut prng = Prng::new(7);
        let first = prng.next();
        prng.refill(&mut arr);
        // Stream continues from where `next` left off.
        let mut reference = Prng::new(7);
        assert_eq!(reference.next(), first);
        for &v in &arr {
            assert_eq!(v, reference.next());
        }
    }
}
