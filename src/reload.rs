//! Coefficient reload protocol.
//!
//! Only the head of a cascade sees new taps. It compares them with the last
//! applied set and its decision travels down the control links as a
//! [`ReloadTrigger`], so every member rebuilds on the same invocation or not
//! at all.

use log::debug;

use crate::constants::RELOAD_COMPARE_BITS;
use crate::element::CoeffElement;

/// Decision relayed along the cascade once per invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadTrigger<C> {
    Unchanged,
    Changed(Vec<C>),
}

impl<C> ReloadTrigger<C> {
    pub fn is_changed(&self) -> bool {
        matches!(self, ReloadTrigger::Changed(_))
    }
}

/// Compare tap sets chunk by chunk, stopping at the first differing chunk
pub fn taps_differ<C: CoeffElement>(previous: &[C], new: &[C]) -> bool {
    if previous.len() != new.len() {
        return true;
    }
    let chunk = (RELOAD_COMPARE_BITS / C::TYPE.bits()).max(1);
    let differing = previous
        .chunks(chunk)
        .zip(new.chunks(chunk))
        .position(|(old, new)| old.iter().zip(new).any(|(a, b)| !a.same_bits(b)));
    if let Some(index) = differing {
        debug!("tap set differs in compare chunk {}", index);
    }
    differing.is_some()
}

/// Last applied external tap set of a reloadable kernel
#[derive(Debug, Clone)]
pub struct ReloadState<C> {
    previous: Vec<C>,
}

impl<C: CoeffElement> ReloadState<C> {
    /// Start from an all-zero tap set
    pub fn zeroed(half_len: usize) -> Self {
        Self {
            previous: vec![C::default(); half_len],
        }
    }

    pub fn with_taps(taps: &[C]) -> Self {
        Self {
            previous: taps.to_vec(),
        }
    }

    pub fn previous(&self) -> &[C] {
        &self.previous
    }

    /// Decide whether `new` must be applied
    pub fn trigger_for(&self, new: &[C]) -> ReloadTrigger<C> {
        if taps_differ(&self.previous, new) {
            ReloadTrigger::Changed(new.to_vec())
        } else {
            ReloadTrigger::Unchanged
        }
    }

    pub fn accept(&mut self, taps: &[C]) {
        self.previous.clear();
        self.previous.extend_from_slice(taps);
    }
}
