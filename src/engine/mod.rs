//! Convolution engine: the decimated symmetric multiply-accumulate sweep.
//!
//! Every strategy issues the same sequence of multiply-accumulates (operation
//! by operation, column by column) and differs only in how samples reach its
//! registers, so all of them produce bit-identical accumulators.

mod double_buffer;
mod register;
mod single_buffer;

pub use double_buffer::DoubleBuffer;
pub use register::SampleRegister;
pub use single_buffer::SingleBuffer;

use crate::arch::KernelPlan;
use crate::config::Architecture;
use crate::element::{CoeffElement, SymMac};
use crate::taps::{CoeffTable, TapSlot};

/// Samples visible to one invocation
///
/// `forward` is the look-back margin followed by the new window. `reverse`
/// is the same for the second input port, or `forward` again.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a, T> {
    pub forward: &'a [T],
    pub reverse: &'a [T],
    /// Index of the oldest sample under tap 0 of output 0
    pub first_sample: usize,
    pub fir_len: usize,
    pub decimate: usize,
    pub lanes: usize,
}

impl<T> Frame<'_, T> {
    /// Index of the sample under tap 0 of lane 0 in output vector `vector`
    pub fn vector_base(&self, vector: usize) -> usize {
        self.first_sample + vector * self.lanes * self.decimate
    }

    /// Distance between lane 0 and the last lane
    pub fn lane_span(&self) -> usize {
        (self.lanes - 1) * self.decimate
    }
}

/// A buffering strategy for one kernel
pub trait ConvolutionStrategy<T, C>: Send
where
    T: SymMac<C>,
    C: CoeffElement,
{
    fn architecture(&self) -> Architecture;

    /// Add this kernel's contribution to output vector `vector` into `acc`
    fn accumulate(
        &mut self,
        frame: &Frame<'_, T>,
        table: &CoeffTable<C>,
        vector: usize,
        acc: &mut [T::Acc],
    );

    /// Forget resident samples; called when a new frame starts
    fn reset(&mut self);

    /// Sample chunk loads issued so far
    fn loads(&self) -> usize;
}

/// Construct the strategy chosen in `plan`
pub fn strategy_for<T, C>(plan: &KernelPlan) -> Box<dyn ConvolutionStrategy<T, C>>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    match plan.architecture {
        Architecture::SingleBufferBasic => Box::new(SingleBuffer::<T>::basic(T::TYPE.bits())),
        Architecture::SingleBufferIncrementalStrobe => {
            Box::new(SingleBuffer::<T>::incremental(T::TYPE.bits(), plan.repeat))
        }
        Architecture::DoubleBufferBasic => Box::new(DoubleBuffer::<T>::new(T::TYPE.bits())),
    }
}

/// One operation of the symmetric sweep across all lanes
///
/// Paired taps pre-add the forward sample at `base + tap` and its mirror at
/// `base + fir_len - 1 - tap`; the centre tap takes the forward sample alone.
#[inline]
pub(crate) fn symmetric_op<T, C, F, R>(
    op: &[TapSlot<C>],
    acc: &mut [T::Acc],
    frame: &Frame<'_, T>,
    base: usize,
    forward: F,
    reverse: R,
) where
    T: SymMac<C>,
    C: CoeffElement,
    F: Fn(usize) -> T,
    R: Fn(usize) -> T,
{
    let mirror = frame.fir_len - 1;
    for slot in op {
        for (lane, a) in acc.iter_mut().enumerate() {
            let lane_base = base + lane * frame.decimate;
            let fwd = forward(lane_base + slot.tap).widen();
            let samples = if slot.centre {
                fwd
            } else {
                fwd + reverse(lane_base + mirror - slot.tap).widen()
            };
            *a = T::mac(*a, samples, slot.coeff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementType, FilterConfig};

    fn run_strategy(architecture: Architecture) -> (Vec<i128>, usize) {
        let config = FilterConfig::builder(ElementType::Int16, ElementType::Int32)
            .fir_len(9)
            .decimate(3)
            .window_size(192)
            .architecture(architecture)
            .build()
            .unwrap();
        let plan = config.plan(0).unwrap();
        let taps = vec![3, -7, 11, 2, 5];
        let table = CoeffTable::build(&plan, config.half_len(), &taps).unwrap();

        let margin = plan.margin;
        let samples: Vec<i16> = (0..margin + config.window_size())
            .map(|i| ((i * 37 + 11) % 101) as i16 - 50)
            .collect();
        let frame = Frame {
            forward: &samples,
            reverse: &samples,
            first_sample: margin - config.fir_len() + 1,
            fir_len: config.fir_len(),
            decimate: config.decimate(),
            lanes: plan.lanes,
        };

        let mut strategy = strategy_for::<i16, i32>(&plan);
        assert_eq!(strategy.architecture(), architecture);
        strategy.reset();
        let mut out = Vec::new();
        for vector in 0..plan.vectors {
            let mut acc = vec![0i128; plan.lanes];
            strategy.accumulate(&frame, &table, vector, &mut acc);
            out.extend(acc);
        }
        (out, strategy.loads())
    }

    #[test]
    fn test_strategies_agree() {
        let (basic, basic_loads) = run_strategy(Architecture::SingleBufferBasic);
        let (strobe, strobe_loads) = run_strategy(Architecture::SingleBufferIncrementalStrobe);
        let (double, _) = run_strategy(Architecture::DoubleBufferBasic);
        assert_eq!(basic, strobe);
        assert_eq!(basic, double);
        assert!(
            strobe_loads < basic_loads,
            "incremental strobe should reuse loads: {} vs {}",
            strobe_loads,
            basic_loads
        );
    }
}
