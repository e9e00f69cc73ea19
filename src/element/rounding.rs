//! Shift, round and saturate an integer accumulator down to an output width.

use crate::config::{RoundMode, SaturationMode};

/// Shift `acc` right by `shift` bits with the given rounding
pub fn shift_round(acc: i128, shift: u32, round: RoundMode) -> i128 {
    if shift == 0 {
        return acc;
    }
    let half = 1i128 << (shift - 1);
    let below_half = half - 1;
    let offset = match round {
        RoundMode::Floor => 0,
        RoundMode::Ceil => (1i128 << shift) - 1,
        RoundMode::PosInf => half,
        RoundMode::NegInf => below_half,
        RoundMode::SymInf => {
            if acc < 0 {
                below_half
            } else {
                half
            }
        }
        RoundMode::SymZero => {
            if acc < 0 {
                half
            } else {
                below_half
            }
        }
        RoundMode::ConvEven => {
            if (acc >> shift) & 1 == 0 {
                below_half
            } else {
                half
            }
        }
        RoundMode::ConvOdd => {
            if (acc >> shift) & 1 == 1 {
                below_half
            } else {
                half
            }
        }
    };
    (acc + offset) >> shift
}

/// Fit `value` into a signed integer of `bits` bits
pub fn saturate(value: i128, bits: u32, saturation: SaturationMode) -> i128 {
    let max = (1i128 << (bits - 1)) - 1;
    let min = -max - 1;
    match saturation {
        SaturationMode::None => {
            let unused = 128 - bits;
            (value << unused) >> unused
        }
        SaturationMode::Saturate => value.clamp(min, max),
        SaturationMode::Symmetric => value.clamp(-max, max),
    }
}

pub fn narrow(
    acc: i128,
    shift: u32,
    round: RoundMode,
    saturation: SaturationMode,
    bits: u32,
) -> i128 {
    saturate(shift_round(acc, shift, round), bits, saturation)
}
