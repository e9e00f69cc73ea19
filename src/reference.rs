//! Direct-form decimating FIR used to check the symmetric engine.

use crate::config::FilterConfig;
use crate::element::{CoeffElement, DataElement, SymMac};

/// Expand a stored half tap set to all `fir_len` taps
pub fn full_taps<C: Copy>(half: &[C], fir_len: usize) -> Vec<C> {
    (0..fir_len).map(|k| half[k.min(fir_len - 1 - k)]).collect()
}

/// Filter `input` from a zero history and keep every `D`-th output
///
/// Output `m` is `sum_k h[k] * x[m*D - k]`, narrowed with the configured
/// shift, rounding and saturation. Every tap is multiplied separately, so
/// the centre tap of an odd-length filter counts exactly once.
pub fn decimate<T, C>(config: &FilterConfig, half: &[C], input: &[T]) -> Vec<T>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    let taps = full_taps(half, config.fir_len());
    let decimate = config.decimate();

    (0..input.len() / decimate)
        .map(|m| {
            let newest = m * decimate;
            let mut acc = <T as DataElement>::Acc::default();
            for (k, &h) in taps.iter().enumerate() {
                if let Some(i) = newest.checked_sub(k) {
                    acc = T::mac(acc, input[i].widen(), h);
                }
            }
            T::narrow(acc, config.shift(), config.round(), config.saturation())
        })
        .collect()
}
