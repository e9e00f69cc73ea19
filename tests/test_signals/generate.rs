use symdec::element::{CoeffElement, DataElement};
use symdec::simulation::{create_rng, random_samples, random_taps};

/// Reproducible input with parts in `-amplitude..=amplitude`
pub fn random_input<T: DataElement>(len: usize, amplitude: i16, seed: u64) -> Vec<T> {
    random_samples(len, amplitude, &mut create_rng(Some(seed)))
}

/// Reproducible half tap set with parts in `-amplitude..=amplitude`
pub fn random_half_taps<C: CoeffElement>(len: usize, amplitude: i16, seed: u64) -> Vec<C> {
    random_taps(len, amplitude, &mut create_rng(Some(seed)))
}
