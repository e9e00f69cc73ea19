use super::{ConvolutionStrategy, Frame, SampleRegister, symmetric_op};
use crate::arch::double_buffer_geometry;
use crate::config::Architecture;
use crate::element::{CoeffElement, SymMac};
use crate::taps::CoeffTable;

/// Two 512-bit registers: `x` slides up through forward samples while `y`
/// slides down through their mirrors
///
/// Both are refilled for every output vector and topped up lazily, one
/// operation at a time.
pub struct DoubleBuffer<T> {
    x: SampleRegister<T>,
    y: SampleRegister<T>,
}

impl<T: Copy + Default> DoubleBuffer<T> {
    pub fn new(data_bits: usize) -> Self {
        let geometry = double_buffer_geometry(data_bits);
        Self {
            x: SampleRegister::new(geometry),
            y: SampleRegister::new(geometry),
        }
    }
}

impl<T, C> ConvolutionStrategy<T, C> for DoubleBuffer<T>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    fn architecture(&self) -> Architecture {
        Architecture::DoubleBufferBasic
    }

    fn accumulate(
        &mut self,
        frame: &Frame<'_, T>,
        table: &CoeffTable<C>,
        vector: usize,
        acc: &mut [T::Acc],
    ) {
        self.x.clear();
        self.y.clear();

        let base = frame.vector_base(vector);
        let span = frame.lane_span();
        let mirror = frame.fir_len - 1;

        for op in table.ops() {
            let (Some(first), Some(last)) = (op.first(), op.last()) else {
                continue;
            };
            self.x
                .ensure_ascending(frame.forward, base + first.tap, base + span + last.tap);
            self.y.ensure_descending(
                frame.reverse,
                base + mirror - last.tap,
                base + span + mirror - first.tap,
            );

            let (x, y) = (&self.x, &self.y);
            symmetric_op(op, acc, frame, base, |i| x.get(i), |i| y.get(i));
        }
    }

    fn reset(&mut self) {
        self.x.clear();
        self.y.clear();
    }

    fn loads(&self) -> usize {
        self.x.loads() + self.y.loads()
    }
}
