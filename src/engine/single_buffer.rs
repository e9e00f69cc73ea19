use super::{ConvolutionStrategy, Frame, SampleRegister, symmetric_op};
use crate::arch::single_buffer_geometry;
use crate::config::Architecture;
use crate::element::{CoeffElement, SymMac};
use crate::taps::CoeffTable;

/// One 1024-bit register holding both halves of the symmetric window
///
/// Forward and reverse reads address the same register. The basic variant
/// refills it for every output vector; the incremental strobe keeps it
/// across `repeat` vectors and only tops up the newest samples.
pub struct SingleBuffer<T> {
    register: SampleRegister<T>,
    repeat: Option<usize>,
}

impl<T: Copy + Default> SingleBuffer<T> {
    pub fn basic(data_bits: usize) -> Self {
        Self {
            register: SampleRegister::new(single_buffer_geometry(data_bits)),
            repeat: None,
        }
    }

    pub fn incremental(data_bits: usize, repeat: usize) -> Self {
        Self {
            register: SampleRegister::new(single_buffer_geometry(data_bits)),
            repeat: Some(repeat.max(1)),
        }
    }
}

impl<T, C> ConvolutionStrategy<T, C> for SingleBuffer<T>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    fn architecture(&self) -> Architecture {
        match self.repeat {
            Some(_) => Architecture::SingleBufferIncrementalStrobe,
            None => Architecture::SingleBufferBasic,
        }
    }

    fn accumulate(
        &mut self,
        frame: &Frame<'_, T>,
        table: &CoeffTable<C>,
        vector: usize,
        acc: &mut [T::Acc],
    ) {
        let resync = match self.repeat {
            Some(repeat) => vector % repeat == 0,
            None => true,
        };
        if resync {
            self.register.clear();
        }

        let base = frame.vector_base(vector);
        let (lo, hi) = table.sample_extent(frame.fir_len);
        self.register
            .ensure_ascending(frame.forward, base + lo, base + frame.lane_span() + hi);

        let register = &self.register;
        for op in table.ops() {
            symmetric_op(op, acc, frame, base, |i| register.get(i), |i| register.get(i));
        }
    }

    fn reset(&mut self) {
        self.register.clear();
    }

    fn loads(&self) -> usize {
        self.register.loads()
    }
}
