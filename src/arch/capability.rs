use serde::Serialize;

use crate::config::ElementType;
use crate::constants::{MAX_DECIMATE, MAX_DECIMATE_REDUCED};
use crate::error::{FilterError, Result};

/// Vector resources available to one data/coefficient pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capability {
    /// Parallel output accumulators per vector operation
    pub lanes: usize,
    /// Taps consumed per lane per operation
    pub columns: usize,
    /// Largest supported decimation factor
    pub max_decimate: usize,
}

impl Capability {
    const fn new(lanes: usize, columns: usize, max_decimate: usize) -> Self {
        Self {
            lanes,
            columns,
            max_decimate,
        }
    }
}

/// Look up lanes and columns of the symmetric multiply for a type pair
///
/// # Errors
/// `SymmetryUnavailable` for pairings the hardware can multiply but has no
/// symmetric multi-column operation for, `UnsupportedPairing` otherwise.
pub fn capability(data: ElementType, coeff: ElementType) -> Result<Capability> {
    use ElementType::*;

    let cap = match (data, coeff) {
        (Int16, Int32) => Capability::new(8, 2, MAX_DECIMATE),
        (Int32, Int32) => Capability::new(4, 2, MAX_DECIMATE),
        (Cint16, Int16) => Capability::new(4, 4, MAX_DECIMATE),
        (Cint16, Int32) | (Cint16, Cint16) | (Cint16, Cint32) => {
            Capability::new(4, 2, MAX_DECIMATE)
        }
        (Cint32, Cint16) | (Cint32, Int32) => Capability::new(4, 2, MAX_DECIMATE_REDUCED),
        (Cint32, Cint32) => Capability::new(2, 2, MAX_DECIMATE),
        (Float, Float) => Capability::new(8, 1, MAX_DECIMATE),
        (Cfloat, Float) | (Cfloat, Cfloat) => Capability::new(4, 1, MAX_DECIMATE),
        (Int16, Int16) | (Int32, Int16) | (Cint32, Int16) => {
            return Err(FilterError::SymmetryUnavailable { data, coeff });
        }
        _ => return Err(FilterError::UnsupportedPairing { data, coeff }),
    };
    Ok(cap)
}
