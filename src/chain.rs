//! A whole cascade running as dataflow actors, one thread per kernel.

use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, info};

use crate::config::FilterConfig;
use crate::element::{CoeffElement, SymMac};
use crate::error::{FilterError, LinkKind, Result};
use crate::kernel::{
    FirDecimateSym, Invocation, KernelOutput, build_cascade, build_reloadable_cascade,
};

/// Invocations buffered on every link of a running chain
const CHAIN_DEPTH: usize = 2;

struct Job<T, C> {
    window: Vec<T>,
    second: Option<Vec<T>>,
    taps: Option<Vec<C>>,
}

/// Running cascade fed through [`push`](Self::push) and drained through
/// [`recv`](Self::recv)
pub struct CascadeChain<T, C> {
    input: Option<Sender<Job<T, C>>>,
    output: Receiver<KernelOutput<T>>,
    handles: Vec<thread::JoinHandle<Result<()>>>,
}

impl<T, C> CascadeChain<T, C>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    /// Spawn a cascade with taps bound at construction
    pub fn spawn(config: &FilterConfig, taps: &[C]) -> Result<Self> {
        Self::start(build_cascade(config, taps, CHAIN_DEPTH)?)
    }

    /// Spawn a cascade whose taps arrive with the invocations
    pub fn spawn_reloadable(config: &FilterConfig) -> Result<Self> {
        Self::start(build_reloadable_cascade(config, CHAIN_DEPTH)?)
    }

    fn start(kernels: Vec<FirDecimateSym<T, C>>) -> Result<Self> {
        let (input_tx, input_rx) = bounded::<Job<T, C>>(CHAIN_DEPTH);
        let (output_tx, output_rx) = bounded(CHAIN_DEPTH);

        let count = kernels.len();
        let mut handles = Vec::with_capacity(count);
        for (position, kernel) in kernels.into_iter().enumerate() {
            let output_tx = output_tx.clone();
            let builder = thread::Builder::new().name(format!("fir-kernel-{}", position));
            let spawned = if position == 0 {
                let input_rx = input_rx.clone();
                builder.spawn(move || run_head(kernel, input_rx, output_tx))
            } else {
                builder.spawn(move || run_downstream(kernel, output_tx))
            };
            let handle = spawned.map_err(|e| {
                FilterError::Config(format!("failed to spawn kernel thread: {}", e))
            })?;
            handles.push(handle);
        }
        info!("cascade chain started with {} kernels", count);

        Ok(Self {
            input: Some(input_tx),
            output: output_rx,
            handles,
        })
    }

    /// Queue one window, optionally with a second input and new taps
    pub fn push(&self, window: Vec<T>, second: Option<Vec<T>>, taps: Option<Vec<C>>) -> Result<()> {
        let input = self
            .input
            .as_ref()
            .ok_or(FilterError::Disconnected(LinkKind::Input))?;
        input
            .send(Job {
                window,
                second,
                taps,
            })
            .map_err(|_| FilterError::Disconnected(LinkKind::Input))
    }

    /// Next output, in the order windows were pushed
    pub fn recv(&self) -> Result<KernelOutput<T>> {
        self.output
            .recv()
            .map_err(|_| FilterError::Disconnected(LinkKind::Output))
    }

    /// Push one window and wait for its output
    pub fn process(&self, window: Vec<T>) -> Result<KernelOutput<T>> {
        self.push(window, None, None)?;
        self.recv()
    }

    /// Close the input and wait for every kernel, returning the first failure
    pub fn finish(mut self) -> Result<()> {
        self.input = None;
        // Unblock kernels still trying to hand over outputs nobody reads.
        while self.output.recv().is_ok() {}

        let mut result = Ok(());
        for (position, handle) in self.handles.drain(..).enumerate() {
            let outcome = handle
                .join()
                .unwrap_or(Err(FilterError::KernelPanicked(position)));
            if let Err(e) = outcome {
                debug!("kernel {} stopped with error: {}", position, e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        info!("cascade chain stopped");
        result
    }
}

fn run_head<T, C>(
    mut kernel: FirDecimateSym<T, C>,
    input: Receiver<Job<T, C>>,
    output: Sender<KernelOutput<T>>,
) -> Result<()>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    for job in input {
        let mut invocation = Invocation::new(&job.window);
        invocation.second = job.second.as_deref();
        invocation.taps = job.taps.as_deref();
        if let Some(out) = kernel.process(invocation)? {
            output
                .send(out)
                .map_err(|_| FilterError::Disconnected(LinkKind::Output))?;
        }
    }
    Ok(())
}

fn run_downstream<T, C>(
    mut kernel: FirDecimateSym<T, C>,
    output: Sender<KernelOutput<T>>,
) -> Result<()>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    loop {
        match kernel.process_from_upstream() {
            Ok(Some(out)) => output
                .send(out)
                .map_err(|_| FilterError::Disconnected(LinkKind::Output))?,
            Ok(None) => {}
            // Upstream closed between invocations: orderly shutdown.
            Err(FilterError::Disconnected(LinkKind::Window)) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementType;

    #[test]
    fn test_chain_matches_single_kernel() {
        let config = FilterConfig::builder(ElementType::Int32, ElementType::Int32)
            .fir_len(24)
            .decimate(2)
            .window_size(64)
            .build()
            .unwrap();
        let taps: Vec<i32> = (1..=12).map(|t| t * 3 - 20).collect();
        let input: Vec<i32> = (0..256).map(|i| (i * 7919 % 211) - 105).collect();

        let mut single = FirDecimateSym::<i32, i32>::new(&config, 0, &taps).unwrap();
        let expected: Vec<i32> = input
            .chunks(64)
            .flat_map(|w| single.process(Invocation::new(w)).unwrap().unwrap().primary)
            .collect();

        let chain =
            CascadeChain::<i32, i32>::spawn(&config.with_cascade_len(3).unwrap(), &taps).unwrap();
        let mut actual = Vec::new();
        for window in input.chunks(64) {
            actual.extend(chain.process(window.to_vec()).unwrap().primary);
        }
        chain.finish().unwrap();
        assert_eq!(actual, expected);
    }
}
