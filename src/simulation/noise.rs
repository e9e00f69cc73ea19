use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::element::{CoeffElement, DataElement};

/// Seeded generator for reproducible runs, entropy-seeded otherwise
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Uniform samples with real and imaginary parts in `-amplitude..=amplitude`
pub fn random_samples<T: DataElement>(len: usize, amplitude: i16, rng: &mut ChaCha8Rng) -> Vec<T> {
    let amplitude = amplitude.saturating_abs();
    (0..len)
        .map(|_| {
            T::from_parts(
                rng.random_range(-amplitude..=amplitude),
                rng.random_range(-amplitude..=amplitude),
            )
        })
        .collect()
}

/// Uniform half tap set with parts in `-amplitude..=amplitude`
pub fn random_taps<C: CoeffElement>(len: usize, amplitude: i16, rng: &mut ChaCha8Rng) -> Vec<C> {
    let amplitude = amplitude.saturating_abs();
    (0..len)
        .map(|_| {
            C::from_parts(
                rng.random_range(-amplitude..=amplitude),
                rng.random_range(-amplitude..=amplitude),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_samples_repeat() {
        let a: Vec<i32> = random_samples(64, 1000, &mut create_rng(Some(7)));
        let b: Vec<i32> = random_samples(64, 1000, &mut create_rng(Some(7)));
        assert_eq!(a, b);
        assert!(a.iter().all(|&s| (-1000..=1000).contains(&s)));
    }
}
