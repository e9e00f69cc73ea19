//! Element types for samples and coefficients.
//!
//! Integer data accumulates in `i128` (complex parts likewise), wide enough
//! for any sum of products this filter can form. Float data accumulates in
//! `f32` and ignores shift and saturation on output.

pub mod rounding;

use std::fmt;
use std::ops::Add;

use num_complex::Complex;

use crate::config::{ElementType, RoundMode, SaturationMode};

/// Sample element carried on the data ports
pub trait DataElement: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: ElementType;

    /// Accumulator the filter sums into
    type Acc: Copy + Default + PartialEq + fmt::Debug + Send + Sync + Add<Output = Self::Acc> + 'static;

    fn widen(self) -> Self::Acc;

    /// Shift, round and saturate an accumulator back to a sample
    fn narrow(acc: Self::Acc, shift: u32, round: RoundMode, saturation: SaturationMode) -> Self;

    /// Build a sample from small integer parts; real types drop `im`
    fn from_parts(re: i16, im: i16) -> Self;
}

/// Coefficient element
pub trait CoeffElement: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: ElementType;

    /// Bit-exact equality, so `-0.0` differs from `0.0`
    fn same_bits(&self, other: &Self) -> bool;

    fn from_parts(re: i16, im: i16) -> Self;
}

/// Symmetric multiply-accumulate of data type `Self` with coefficient `C`
///
/// `samples` is the pre-added forward and reverse sample pair (or the lone
/// centre sample).
pub trait SymMac<C: CoeffElement>: DataElement {
    fn mac(acc: Self::Acc, samples: Self::Acc, coeff: C) -> Self::Acc;
}

macro_rules! int_data {
    ($t:ty, $kind:expr, $bits:expr) => {
        impl DataElement for $t {
            const TYPE: ElementType = $kind;
            type Acc = i128;

            fn widen(self) -> i128 {
                self as i128
            }

            fn narrow(acc: i128, shift: u32, round: RoundMode, saturation: SaturationMode) -> Self {
                rounding::narrow(acc, shift, round, saturation, $bits) as $t
            }

            fn from_parts(re: i16, _im: i16) -> Self {
                re as $t
            }
        }
    };
}

macro_rules! cint_data {
    ($t:ty, $kind:expr, $bits:expr) => {
        impl DataElement for Complex<$t> {
            const TYPE: ElementType = $kind;
            type Acc = Complex<i128>;

            fn widen(self) -> Complex<i128> {
                Complex::new(self.re as i128, self.im as i128)
            }

            fn narrow(
                acc: Complex<i128>,
                shift: u32,
                round: RoundMode,
                saturation: SaturationMode,
            ) -> Self {
                Complex::new(
                    rounding::narrow(acc.re, shift, round, saturation, $bits) as $t,
                    rounding::narrow(acc.im, shift, round, saturation, $bits) as $t,
                )
            }

            fn from_parts(re: i16, im: i16) -> Self {
                Complex::new(re as $t, im as $t)
            }
        }
    };
}

int_data!(i16, ElementType::Int16, 16);
int_data!(i32, ElementType::Int32, 32);
cint_data!(i16, ElementType::Cint16, 16);
cint_data!(i32, ElementType::Cint32, 32);

impl DataElement for f32 {
    const TYPE: ElementType = ElementType::Float;
    type Acc = f32;

    fn widen(self) -> f32 {
        self
    }

    fn narrow(acc: f32, _shift: u32, _round: RoundMode, _saturation: SaturationMode) -> Self {
        acc
    }

    fn from_parts(re: i16, _im: i16) -> Self {
        re as f32
    }
}

impl DataElement for Complex<f32> {
    const TYPE: ElementType = ElementType::Cfloat;
    type Acc = Complex<f32>;

    fn widen(self) -> Complex<f32> {
        self
    }

    fn narrow(
        acc: Complex<f32>,
        _shift: u32,
        _round: RoundMode,
        _saturation: SaturationMode,
    ) -> Self {
        acc
    }

    fn from_parts(re: i16, im: i16) -> Self {
        Complex::new(re as f32, im as f32)
    }
}

macro_rules! int_coeff {
    ($t:ty, $kind:expr) => {
        impl CoeffElement for $t {
            const TYPE: ElementType = $kind;

            fn same_bits(&self, other: &Self) -> bool {
                self == other
            }

            fn from_parts(re: i16, _im: i16) -> Self {
                re as $t
            }
        }
    };
}

macro_rules! cint_coeff {
    ($t:ty, $kind:expr) => {
        impl CoeffElement for Complex<$t> {
            const TYPE: ElementType = $kind;

            fn same_bits(&self, other: &Self) -> bool {
                self == other
            }

            fn from_parts(re: i16, im: i16) -> Self {
                Complex::new(re as $t, im as $t)
            }
        }
    };
}

int_coeff!(i16, ElementType::Int16);
int_coeff!(i32, ElementType::Int32);
cint_coeff!(i16, ElementType::Cint16);
cint_coeff!(i32, ElementType::Cint32);

impl CoeffElement for f32 {
    const TYPE: ElementType = ElementType::Float;

    fn same_bits(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }

    fn from_parts(re: i16, _im: i16) -> Self {
        re as f32
    }
}

impl CoeffElement for Complex<f32> {
    const TYPE: ElementType = ElementType::Cfloat;

    fn same_bits(&self, other: &Self) -> bool {
        self.re.to_bits() == other.re.to_bits() && self.im.to_bits() == other.im.to_bits()
    }

    fn from_parts(re: i16, im: i16) -> Self {
        Complex::new(re as f32, im as f32)
    }
}

macro_rules! sym_mac {
    ($data:ty, $coeff:ty, |$c:ident| $wide:expr) => {
        impl SymMac<$coeff> for $data {
            #[inline]
            fn mac(acc: Self::Acc, samples: Self::Acc, $c: $coeff) -> Self::Acc {
                acc + samples * $wide
            }
        }
    };
}

sym_mac!(i16, i32, |c| c as i128);
sym_mac!(i32, i32, |c| c as i128);
sym_mac!(Complex<i16>, i16, |c| c as i128);
sym_mac!(Complex<i16>, i32, |c| c as i128);
sym_mac!(Complex<i16>, Complex<i16>, |c| Complex::new(c.re as i128, c.im as i128));
sym_mac!(Complex<i16>, Complex<i32>, |c| Complex::new(c.re as i128, c.im as i128));
sym_mac!(Complex<i32>, Complex<i16>, |c| Complex::new(c.re as i128, c.im as i128));
sym_mac!(Complex<i32>, i32, |c| c as i128);
sym_mac!(Complex<i32>, Complex<i32>, |c| Complex::new(c.re as i128, c.im as i128));
sym_mac!(f32, f32, |c| c);
sym_mac!(Complex<f32>, f32, |c| c);
sym_mac!(Complex<f32>, Complex<f32>, |c| c);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(
            i16::narrow(70000 << 2, 2, RoundMode::Floor, SaturationMode::Saturate),
            i16::MAX
        );
        assert_eq!(
            i32::narrow(-13, 2, RoundMode::SymInf, SaturationMode::None),
            -3
        );
    }

    #[test]
    fn test_complex_narrowing_rounds_each_part() {
        let acc = Complex::new(10i128, -10);
        let out = Complex::<i16>::narrow(acc, 2, RoundMode::ConvEven, SaturationMode::Saturate);
        assert_eq!(out, Complex::new(2, -2));
    }

    #[test]
    fn test_float_ignores_shift() {
        assert_eq!(
            f32::narrow(72.0, 0, RoundMode::Floor, SaturationMode::Saturate),
            72.0
        );
    }

    #[test]
    fn test_complex_mac() {
        let samples = Complex::<i16>::new(1, 2).widen();
        let acc = <Complex<i16> as SymMac<Complex<i16>>>::mac(
            Complex::default(),
            samples,
            Complex::new(3, 4),
        );
        // (1 + 2i)(3 + 4i) = -5 + 10i
        assert_eq!(acc, Complex::new(-5, 10));
    }

    #[test]
    fn test_same_bits_distinguishes_signed_zero() {
        assert!(!0.0f32.same_bits(&-0.0));
        assert!(f32::NAN.same_bits(&f32::NAN));
        assert!(7i16.same_bits(&7));
    }
}
