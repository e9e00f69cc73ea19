//! Coefficient table builder.
//!
//! The table lays a kernel's share of the half tap set out in operations of
//! `columns` taps. Slots past the end of the range are zero padding. When a
//! kernel owns the centre tap of an odd-length filter its last operation is
//! right-aligned so the centre lands in the final column, where the engine
//! applies it once instead of pairing it with a reverse sample.

use crate::arch::{KernelPlan, coeff_register_len};
use crate::element::CoeffElement;
use crate::error::{FilterError, Result};

/// One live slot of an operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapSlot<C> {
    pub column: usize,
    /// Index into the full half tap set
    pub tap: usize,
    pub coeff: C,
    /// Unpaired centre tap, applied to the forward sample only
    pub centre: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoeffTable<C> {
    columns: usize,
    padded: Vec<C>,
    ops: Vec<Vec<TapSlot<C>>>,
}

impl<C: CoeffElement> CoeffTable<C> {
    /// Lay out `taps`, the full half tap set, for the kernel described by `plan`
    ///
    /// # Errors
    /// `TapCount` when `taps` is not exactly `half_len` long.
    pub fn build(plan: &KernelPlan, half_len: usize, taps: &[C]) -> Result<Self> {
        if taps.len() != half_len {
            return Err(FilterError::TapCount {
                expected: half_len,
                actual: taps.len(),
            });
        }

        let columns = plan.columns;
        let register = coeff_register_len(C::TYPE.bits());
        let mut padded = vec![C::default(); (plan.ops * columns).next_multiple_of(register)];
        let mut ops = Vec::with_capacity(plan.ops);

        for op in 0..plan.ops {
            let centre_op = plan.holds_centre && op + 1 == plan.ops;
            let skew = if centre_op { plan.skew } else { 0 };
            let mut slots = Vec::with_capacity(columns);

            for column in skew..columns {
                let local = op * columns + column - skew;
                if local >= plan.range.len {
                    break;
                }
                let tap = plan.range.offset + local;
                padded[op * columns + column] = taps[tap];
                slots.push(TapSlot {
                    column,
                    tap,
                    coeff: taps[tap],
                    centre: centre_op && column + 1 == columns,
                });
            }
            ops.push(slots);
        }

        Ok(Self {
            columns,
            padded,
            ops,
        })
    }
}

impl<C> CoeffTable<C> {
    /// The padded, operation-aligned table as loaded into the coefficient register
    pub fn padded(&self) -> &[C] {
        &self.padded
    }

    pub fn ops(&self) -> &[Vec<TapSlot<C>>] {
        &self.ops
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Lowest and highest sample offsets read by one lane, relative to the
    /// sample under tap 0
    pub fn sample_extent(&self, fir_len: usize) -> (usize, usize) {
        let mut lo = usize::MAX;
        let mut hi = 0;
        for slot in self.ops.iter().flatten() {
            let mirror = fir_len - 1 - slot.tap;
            lo = lo.min(slot.tap.min(mirror));
            hi = hi.max(slot.tap.max(mirror));
        }
        (lo, hi)
    }
}
