//! Sizing arithmetic shared by the planner and the engine.

use crate::constants::{
    COEFF_REGISTER_BITS, DOUBLE_BUFFER_BITS, DOUBLE_BUFFER_LOAD_BITS, MARGIN_ALIGN_BITS,
    SINGLE_BUFFER_BITS, SINGLE_BUFFER_LOAD_BITS,
};

/// Sample register size and load width, both in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterGeometry {
    pub capacity: usize,
    pub load: usize,
}

pub fn single_buffer_geometry(data_bits: usize) -> RegisterGeometry {
    RegisterGeometry {
        capacity: SINGLE_BUFFER_BITS / data_bits,
        load: SINGLE_BUFFER_LOAD_BITS / data_bits,
    }
}

pub fn double_buffer_geometry(data_bits: usize) -> RegisterGeometry {
    RegisterGeometry {
        capacity: DOUBLE_BUFFER_BITS / data_bits,
        load: DOUBLE_BUFFER_LOAD_BITS / data_bits,
    }
}

/// Coefficients held by the coefficient register
pub fn coeff_register_len(coeff_bits: usize) -> usize {
    COEFF_REGISTER_BITS / coeff_bits
}

/// Look-back margin in samples, rounded up to whole 256-bit loads
pub fn margin(fir_len: usize, data_bits: usize) -> usize {
    fir_len.next_multiple_of(MARGIN_ALIGN_BITS / data_bits)
}

/// Half taps owned by cascade position `position`
///
/// The split works in whole operations of `columns` taps. Every kernel gets
/// an equal share of the column-aligned part; leftover whole operations go to
/// the earliest kernels and the sub-operation remainder to the last one.
pub fn fir_range_len(
    half_len: usize,
    columns: usize,
    cascade_len: usize,
    position: usize,
) -> usize {
    let aligned = half_len - half_len % (columns * cascade_len);
    let remainder = half_len - aligned;
    let share = aligned / cascade_len;
    if position + 1 == cascade_len {
        share + remainder % columns
    } else if remainder >= columns * (position + 1) {
        share + columns
    } else {
        share
    }
}

/// First half tap owned by cascade position `position`
pub fn fir_range_offset(
    half_len: usize,
    columns: usize,
    cascade_len: usize,
    position: usize,
) -> usize {
    (0..position)
        .map(|p| fir_range_len(half_len, columns, cascade_len, p))
        .sum()
}

/// Lanes that fit the double-buffer register
///
/// One operation reads `(lanes - 1) * decimate + columns` consecutive
/// samples and the register must hold them plus one partial load. Lanes are
/// halved until that holds.
pub fn effective_lanes(hw_lanes: usize, decimate: usize, columns: usize, data_bits: usize) -> usize {
    let geometry = double_buffer_geometry(data_bits);
    let mut lanes = hw_lanes;
    while lanes > 1 && (lanes - 1) * decimate + columns + geometry.load - 1 > geometry.capacity {
        lanes /= 2;
    }
    lanes
}
