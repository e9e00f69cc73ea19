//! Filter instance: one kernel of a symmetric decimating FIR cascade.

use log::{debug, warn};

use crate::arch::KernelPlan;
use crate::cascade::{CascadeCoordinator, CascadeReceiver, CascadeRole, CascadeSender, cascade_link};
use crate::config::{Architecture, FilterConfig, Transport};
use crate::element::{CoeffElement, SymMac};
use crate::engine::{ConvolutionStrategy, Frame, strategy_for};
use crate::error::{FilterError, LinkKind, Result};
use crate::reload::{ReloadState, ReloadTrigger};
use crate::taps::CoeffTable;

/// Inputs of one invocation at the head of a cascade
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a, T, C> {
    pub window: &'a [T],
    /// Second input port of a dual-input stream kernel
    pub second: Option<&'a [T]>,
    /// Latest half tap set on the reload port
    pub taps: Option<&'a [C]>,
}

impl<'a, T, C> Invocation<'a, T, C> {
    pub fn new(window: &'a [T]) -> Self {
        Self {
            window,
            second: None,
            taps: None,
        }
    }

    pub fn with_second(mut self, second: &'a [T]) -> Self {
        self.second = Some(second);
        self
    }

    pub fn with_taps(mut self, taps: &'a [C]) -> Self {
        self.taps = Some(taps);
        self
    }
}

/// Output ports of the final kernel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelOutput<T> {
    pub primary: Vec<T>,
    /// Present when two outputs are configured
    pub secondary: Option<Vec<T>>,
}

/// One symmetric decimating FIR kernel at a fixed cascade position
pub struct FirDecimateSym<T, C>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    config: FilterConfig,
    plan: KernelPlan,
    table: CoeffTable<C>,
    reload: Option<ReloadState<C>>,
    strategy: Box<dyn ConvolutionStrategy<T, C>>,
    coordinator: CascadeCoordinator<T, C>,
    margin: Vec<T>,
    second_margin: Vec<T>,
    output_phase: usize,
    rebuilds: usize,
}

impl<T, C> FirDecimateSym<T, C>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    /// Kernel with taps bound at construction
    ///
    /// `taps` is the full half tap set; the kernel picks out its own range.
    /// With reload enabled these taps become the initial applied set.
    pub fn new(config: &FilterConfig, position: usize, taps: &[C]) -> Result<Self> {
        let mut kernel = Self::build(config, position)?;
        kernel.table = CoeffTable::build(&kernel.plan, config.half_len(), taps)?;
        if config.reload() {
            kernel.reload = Some(ReloadState::with_taps(taps));
        }
        Ok(kernel)
    }

    /// Kernel whose taps arrive through the reload protocol
    ///
    /// Starts from an all-zero tap set, so the first non-zero set applied
    /// always registers as a change.
    pub fn new_reloadable(config: &FilterConfig, position: usize) -> Result<Self> {
        if !config.reload() {
            return Err(FilterError::Config(
                "reloadable kernel needs a configuration with coefficient reload".to_string(),
            ));
        }
        let mut kernel = Self::build(config, position)?;
        kernel.reload = Some(ReloadState::zeroed(config.half_len()));
        Ok(kernel)
    }

    fn build(config: &FilterConfig, position: usize) -> Result<Self> {
        if T::TYPE != config.data_type() {
            return Err(FilterError::TypeMismatch {
                expected: T::TYPE,
                actual: config.data_type(),
            });
        }
        if C::TYPE != config.coeff_type() {
            return Err(FilterError::TypeMismatch {
                expected: C::TYPE,
                actual: config.coeff_type(),
            });
        }

        let plan = config.plan(position)?;
        let half_len = config.half_len();
        let table = CoeffTable::build(&plan, half_len, &vec![C::default(); half_len])?;
        let strategy = strategy_for::<T, C>(&plan);
        debug!(
            "kernel {} of {}: {} with {} lanes",
            position,
            config.cascade_len(),
            strategy.architecture(),
            plan.lanes
        );

        Ok(Self {
            config: config.clone(),
            coordinator: CascadeCoordinator::new(plan.role),
            margin: vec![T::default(); plan.margin],
            second_margin: vec![T::default(); plan.margin],
            plan,
            table,
            reload: None,
            strategy,
            output_phase: 0,
            rebuilds: 0,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn plan(&self) -> &KernelPlan {
        &self.plan
    }

    pub fn role(&self) -> CascadeRole {
        self.plan.role
    }

    pub fn architecture(&self) -> Architecture {
        self.strategy.architecture()
    }

    /// Current internal coefficient table
    pub fn table(&self) -> &CoeffTable<C> {
        &self.table
    }

    /// Last applied tap set, when reload is enabled
    pub fn previous_taps(&self) -> Option<&[C]> {
        self.reload.as_ref().map(ReloadState::previous)
    }

    /// Table rebuilds triggered by reloads so far
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Sample chunk loads issued by the engine so far
    pub fn loads(&self) -> usize {
        self.strategy.loads()
    }

    pub fn connect_upstream(&mut self, link: CascadeReceiver<T, C>) -> Result<()> {
        self.coordinator.connect_upstream(link)
    }

    pub fn connect_downstream(&mut self, link: CascadeSender<T, C>) -> Result<()> {
        self.coordinator.connect_downstream(link)
    }

    /// Join this kernel to its successor with fresh links
    pub fn connect(&mut self, next: &mut Self, depth: usize) -> Result<()> {
        let (tx, rx) = cascade_link(self.plan.vectors, depth, self.config.reload());
        self.connect_downstream(tx)?;
        next.connect_upstream(rx)
    }

    /// Run the reload protocol on a standalone kernel
    ///
    /// Compares `new_taps` with the last applied set and rebuilds the table
    /// when they differ. Returns whether the taps changed. Kernels in a
    /// cascade only reload through [`process`](Self::process), which keeps
    /// the control links in step with the windows.
    pub fn maybe_reload(&mut self, new_taps: Option<&[C]>) -> Result<bool> {
        if self.plan.role != CascadeRole::Standalone {
            return Err(FilterError::Config(format!(
                "kernel {} is part of a cascade and reloads only while processing",
                self.plan.position
            )));
        }
        if self.reload.is_none() {
            return Ok(false);
        }
        let trigger = self.reload_decision(new_taps)?;
        self.apply_reload(trigger)
    }

    /// Reload decision for this invocation
    ///
    /// The head compares `new_taps` with the last applied set; later
    /// positions take the decision from the control link and ignore
    /// `new_taps`.
    fn reload_decision(&self, new_taps: Option<&[C]>) -> Result<ReloadTrigger<C>> {
        if self.plan.role.has_upstream() {
            return self.coordinator.receive_trigger();
        }
        match (new_taps, self.reload.as_ref()) {
            (Some(taps), Some(state)) => {
                if taps.len() != self.config.half_len() {
                    return Err(FilterError::TapCount {
                        expected: self.config.half_len(),
                        actual: taps.len(),
                    });
                }
                Ok(state.trigger_for(taps))
            }
            _ => Ok(ReloadTrigger::Unchanged),
        }
    }

    /// Relay `trigger` downstream, then rebuild the table if it carries taps
    fn apply_reload(&mut self, trigger: ReloadTrigger<C>) -> Result<bool> {
        self.coordinator.relay_trigger(&trigger)?;

        match trigger {
            ReloadTrigger::Changed(taps) => {
                self.table = CoeffTable::build(&self.plan, self.config.half_len(), &taps)?;
                if let Some(state) = self.reload.as_mut() {
                    state.accept(&taps);
                }
                self.rebuilds += 1;
                debug!(
                    "kernel {} rebuilt coefficient table ({} rebuilds)",
                    self.plan.position, self.rebuilds
                );
                Ok(true)
            }
            ReloadTrigger::Unchanged => Ok(false),
        }
    }

    /// Process one window at the head of the cascade
    ///
    /// Returns the output when this kernel is also the last one.
    pub fn process(&mut self, invocation: Invocation<'_, T, C>) -> Result<Option<KernelOutput<T>>> {
        if self.plan.role.has_upstream() {
            return Err(FilterError::Config(format!(
                "kernel {} reads its window from the cascade",
                self.plan.position
            )));
        }
        self.run(invocation.window, invocation.second, invocation.taps)
    }

    /// Process the next window broadcast by the predecessor
    pub fn process_from_upstream(&mut self) -> Result<Option<KernelOutput<T>>> {
        let window = self.coordinator.receive_window()?;
        self.run(&window.primary, window.secondary.as_deref(), None)
    }

    fn run(
        &mut self,
        window: &[T],
        second: Option<&[T]>,
        taps: Option<&[C]>,
    ) -> Result<Option<KernelOutput<T>>> {
        self.coordinator.check_links()?;

        let window_size = self.config.window_size();
        if window.len() != window_size {
            return Err(FilterError::WindowLength {
                expected: window_size,
                actual: window.len(),
            });
        }
        let second = if self.config.dual_input() {
            let second = second.ok_or(FilterError::MissingLink(LinkKind::SecondInput))?;
            if second.len() != window_size {
                return Err(FilterError::WindowLength {
                    expected: window_size,
                    actual: second.len(),
                });
            }
            Some(second)
        } else {
            None
        };

        // Reject bad taps before anything reaches the cascade links.
        let head_trigger = match (&self.reload, self.plan.role.has_upstream()) {
            (Some(_), false) => Some(self.reload_decision(taps)?),
            _ => None,
        };

        self.coordinator.broadcast_window(window, second)?;

        if self.reload.is_some() {
            let trigger = match head_trigger {
                Some(trigger) => trigger,
                None => self.reload_decision(None)?,
            };
            self.apply_reload(trigger)?;
        } else if taps.is_some() {
            warn!(
                "kernel {} ignores taps: coefficient reload is disabled",
                self.plan.position
            );
        }

        let mut forward = Vec::with_capacity(self.margin.len() + window_size);
        forward.extend_from_slice(&self.margin);
        forward.extend_from_slice(window);
        let reverse = second.map(|second| {
            let mut buf = Vec::with_capacity(self.second_margin.len() + window_size);
            buf.extend_from_slice(&self.second_margin);
            buf.extend_from_slice(second);
            buf
        });

        let frame = Frame {
            forward: &forward,
            reverse: reverse.as_deref().unwrap_or(&forward),
            first_sample: self.plan.margin + 1 - self.config.fir_len(),
            fir_len: self.config.fir_len(),
            decimate: self.config.decimate(),
            lanes: self.plan.lanes,
        };

        let mut output = self.plan.role.is_final().then(|| self.empty_output());
        self.strategy.reset();
        for vector in 0..self.plan.vectors {
            let mut acc = self.coordinator.seed(self.plan.lanes)?;
            self.strategy
                .accumulate(&frame, &self.table, vector, &mut acc);
            if let Some(acc) = self.coordinator.finish(acc)? {
                if let Some(output) = output.as_mut() {
                    self.write_vector(output, &acc);
                }
            }
        }

        let keep = self.plan.margin;
        self.margin.copy_from_slice(&forward[forward.len() - keep..]);
        if let Some(reverse) = &reverse {
            self.second_margin
                .copy_from_slice(&reverse[reverse.len() - keep..]);
        }

        Ok(output)
    }

    fn empty_output(&self) -> KernelOutput<T> {
        let size = self.config.output_size();
        KernelOutput {
            primary: Vec::with_capacity(size),
            secondary: (self.config.num_outputs() == 2).then(|| Vec::with_capacity(size)),
        }
    }

    fn write_vector(&mut self, output: &mut KernelOutput<T>, acc: &[T::Acc]) {
        let config = &self.config;
        let samples = acc
            .iter()
            .map(|&a| T::narrow(a, config.shift(), config.round(), config.saturation()));

        match (&mut output.secondary, config.transport()) {
            (None, _) => output.primary.extend(samples),
            (Some(secondary), Transport::Window) => {
                let samples: Vec<T> = samples.collect();
                output.primary.extend_from_slice(&samples);
                secondary.extend(samples);
            }
            (Some(secondary), Transport::Stream) => {
                let samples: Vec<T> = samples.collect();
                for part in samples.chunks(config.stream_write_len()) {
                    if self.output_phase % 2 == 0 {
                        output.primary.extend_from_slice(part);
                    } else {
                        secondary.extend_from_slice(part);
                    }
                    self.output_phase += 1;
                }
            }
        }
    }
}

/// Build every kernel of a cascade with bound taps and link them in order
pub fn build_cascade<T, C>(config: &FilterConfig, taps: &[C], depth: usize) -> Result<Vec<FirDecimateSym<T, C>>>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    let kernels = (0..config.cascade_len())
        .map(|p| FirDecimateSym::new(config, p, taps))
        .collect::<Result<Vec<_>>>()?;
    link_kernels(kernels, depth)
}

/// Build every kernel of a reloadable cascade and link them in order
pub fn build_reloadable_cascade<T, C>(
    config: &FilterConfig,
    depth: usize,
) -> Result<Vec<FirDecimateSym<T, C>>>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    let kernels = (0..config.cascade_len())
        .map(|p| FirDecimateSym::new_reloadable(config, p))
        .collect::<Result<Vec<_>>>()?;
    link_kernels(kernels, depth)
}

fn link_kernels<T, C>(
    mut kernels: Vec<FirDecimateSym<T, C>>,
    depth: usize,
) -> Result<Vec<FirDecimateSym<T, C>>>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    for p in 1..kernels.len() {
        let (head, tail) = kernels.split_at_mut(p);
        head[p - 1].connect(&mut tail[0], depth)?;
    }
    Ok(kernels)
}

/// Run one invocation through a linked cascade on the calling thread
///
/// Kernels must have been linked with a depth of at least 1 so the head can
/// finish before its successors start.
pub fn step_cascade<T, C>(
    kernels: &mut [FirDecimateSym<T, C>],
    invocation: Invocation<'_, T, C>,
) -> Result<KernelOutput<T>>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    let Some((head, rest)) = kernels.split_first_mut() else {
        return Err(FilterError::Config("empty cascade".to_string()));
    };
    let mut output = head.process(invocation)?;
    for kernel in rest {
        output = kernel.process_from_upstream()?;
    }
    output.ok_or(FilterError::MissingLink(LinkKind::Output))
}

#[cfg(test)]
mod tests {
    use num_complex::Complex;

    use super::*;
    use crate::config::{ElementType, RoundMode, SaturationMode};

    fn float_config() -> FilterConfig {
        FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(16)
            .decimate(2)
            .window_size(64)
            .build()
            .unwrap()
    }

    #[test]
    fn test_step_response_settles_at_tap_sum() {
        let config = float_config();
        let taps: Vec<f32> = (1..=8).map(|t| t as f32).collect();
        let mut kernel = FirDecimateSym::<f32, f32>::new(&config, 0, &taps).unwrap();

        let window = vec![1.0f32; 64];
        let out = kernel.process(Invocation::new(&window)).unwrap().unwrap();
        assert_eq!(out.primary.len(), 32);
        // taps fill after 16 samples, i.e. from output 8 on
        assert!(out.primary[..7].iter().all(|&y| y < 72.0));
        assert!(out.primary[8..].iter().all(|&y| y == 72.0));

        let out = kernel.process(Invocation::new(&window)).unwrap().unwrap();
        assert!(out.primary.iter().all(|&y| y == 72.0));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let config = float_config();
        let err = FirDecimateSym::<i32, i32>::new(&config, 0, &[0; 8])
            .err()
            .unwrap();
        assert!(matches!(err, FilterError::TypeMismatch { .. }));
    }

    #[test]
    fn test_window_length_checked() {
        let config = float_config();
        let mut kernel = FirDecimateSym::<f32, f32>::new(&config, 0, &[0.0; 8]).unwrap();
        let err = kernel.process(Invocation::new(&[0.0; 10])).unwrap_err();
        assert_eq!(
            err,
            FilterError::WindowLength {
                expected: 64,
                actual: 10
            }
        );
    }

    #[test]
    fn test_integer_shift_and_rounding() {
        let config = FilterConfig::builder(ElementType::Int32, ElementType::Int32)
            .fir_len(16)
            .decimate(2)
            .shift(2)
            .round(RoundMode::Floor)
            .saturation(SaturationMode::Saturate)
            .window_size(64)
            .build()
            .unwrap();
        let taps: Vec<i32> = (1..=8).collect();
        let mut kernel = FirDecimateSym::<i32, i32>::new(&config, 0, &taps).unwrap();
        let out = kernel
            .process(Invocation::new(&[1; 64]))
            .unwrap()
            .unwrap();
        assert_eq!(out.primary[31], 18);
    }

    #[test]
    fn test_dual_window_outputs_duplicate() {
        let config = FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(16)
            .decimate(2)
            .window_size(64)
            .num_outputs(2)
            .build()
            .unwrap();
        let taps: Vec<f32> = (1..=8).map(|t| t as f32).collect();
        let mut kernel = FirDecimateSym::<f32, f32>::new(&config, 0, &taps).unwrap();
        let out = kernel.process(Invocation::new(&[1.0; 64])).unwrap().unwrap();
        assert_eq!(out.secondary.as_deref(), Some(&out.primary[..]));
    }

    fn interleave<T: Copy>(primary: &[T], secondary: &[T], len: usize) -> Vec<T> {
        primary
            .chunks(len)
            .zip(secondary.chunks(len))
            .flat_map(|(a, b)| a.iter().chain(b).copied())
            .collect()
    }

    #[test]
    fn test_wide_stream_vectors_split_across_outputs() {
        let config = FilterConfig::builder(ElementType::Cfloat, ElementType::Cfloat)
            .fir_len(8)
            .decimate(2)
            .window_size(64)
            .num_outputs(2)
            .transport(Transport::Stream)
            .build()
            .unwrap();
        // 4 cfloat lanes make a 256-bit vector: 2 samples to each port
        assert_eq!(config.lanes(), 4);
        assert_eq!(config.stream_write_len(), 2);

        let taps: Vec<Complex<f32>> = (1..=4).map(|t| Complex::new(t as f32, 0.0)).collect();
        let mut kernel = FirDecimateSym::<Complex<f32>, Complex<f32>>::new(&config, 0, &taps).unwrap();
        let window: Vec<Complex<f32>> = (0..64).map(|i| Complex::new(i as f32, 1.0)).collect();
        let out = kernel.process(Invocation::new(&window)).unwrap().unwrap();

        let secondary = out.secondary.unwrap();
        let expected = crate::reference::decimate(&config, &taps, &window);
        assert_eq!(out.primary.len(), 16);
        assert_eq!(secondary.len(), 16);
        assert_eq!(out.primary[..4], [expected[0], expected[1], expected[4], expected[5]]);
        assert_eq!(secondary[..2], expected[2..4]);
        assert_eq!(interleave(&out.primary, &secondary, 2), expected);
    }

    #[test]
    fn test_narrow_stream_vectors_alternate() {
        let config = FilterConfig::builder(ElementType::Int32, ElementType::Int32)
            .fir_len(16)
            .decimate(2)
            .window_size(64)
            .num_outputs(2)
            .transport(Transport::Stream)
            .build()
            .unwrap();
        // 4 int32 lanes make a 128-bit vector, written whole
        assert_eq!(config.lanes(), 4);
        assert_eq!(config.stream_write_len(), 4);

        let taps: Vec<i32> = (1..=8).collect();
        let mut kernel = FirDecimateSym::<i32, i32>::new(&config, 0, &taps).unwrap();
        let window: Vec<i32> = (0..64).collect();
        let out = kernel.process(Invocation::new(&window)).unwrap().unwrap();

        let secondary = out.secondary.unwrap();
        let expected = crate::reference::decimate(&config, &taps, &window);
        assert_eq!(out.primary[..4], expected[..4]);
        assert_eq!(secondary[..4], expected[4..8]);
        assert_eq!(interleave(&out.primary, &secondary, 4), expected);
    }

    #[test]
    fn test_missing_second_input_rejected() {
        let config = FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(16)
            .decimate(2)
            .window_size(64)
            .transport(Transport::Stream)
            .dual_input(true)
            .build()
            .unwrap();
        let mut kernel = FirDecimateSym::<f32, f32>::new(&config, 0, &[1.0; 8]).unwrap();
        let err = kernel.process(Invocation::new(&[1.0; 64])).unwrap_err();
        assert_eq!(err, FilterError::MissingLink(LinkKind::SecondInput));
    }

    #[test]
    fn test_cascade_member_rejects_direct_reload() {
        let config = FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(32)
            .decimate(2)
            .window_size(64)
            .cascade_len(2)
            .reload(true)
            .build()
            .unwrap();
        let mut kernels = build_reloadable_cascade::<f32, f32>(&config, 1).unwrap();
        let taps = vec![1.0f32; 16];
        assert!(matches!(
            kernels[0].maybe_reload(Some(taps.as_slice())),
            Err(FilterError::Config(_))
        ));
        assert_eq!(kernels[0].rebuilds(), 0);

        // The control link is still empty, so processing stays in step
        let window = vec![1.0f32; 64];
        let out = step_cascade(&mut kernels, Invocation::new(&window).with_taps(&taps)).unwrap();
        assert_eq!(out.primary[31], 32.0);
    }

    #[test]
    fn test_unchanged_reload_keeps_table() {
        let config = FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(16)
            .decimate(2)
            .window_size(64)
            .reload(true)
            .build()
            .unwrap();
        let taps: Vec<f32> = (1..=8).map(|t| t as f32).collect();
        let mut kernel = FirDecimateSym::<f32, f32>::new_reloadable(&config, 0).unwrap();

        assert!(kernel.maybe_reload(Some(taps.as_slice())).unwrap());
        let table = kernel.table().clone();
        assert!(!kernel.maybe_reload(Some(taps.as_slice())).unwrap());
        assert_eq!(kernel.table(), &table);
        assert_eq!(kernel.rebuilds(), 1);

        let mut changed = taps.clone();
        changed[5] = 0.5;
        assert!(kernel.maybe_reload(Some(changed.as_slice())).unwrap());
        assert_eq!(kernel.previous_taps(), Some(&changed[..]));
        assert_eq!(kernel.table().padded()[5], 0.5);
    }
}
