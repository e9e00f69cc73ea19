#![allow(dead_code)]

pub mod generate;

pub use generate::{random_half_taps, random_input};

use symdec::element::{CoeffElement, SymMac};
use symdec::{FilterConfig, Invocation, build_cascade, step_cascade};

/// Run `input` window by window through a freshly built cascade
pub fn run_cascade<T, C>(config: &FilterConfig, taps: &[C], input: &[T]) -> Vec<T>
where
    T: SymMac<C>,
    C: CoeffElement,
{
    let mut kernels = build_cascade(config, taps, 1).unwrap();
    input
        .chunks(config.window_size())
        .flat_map(|window| {
            step_cascade(&mut kernels, Invocation::new(window))
                .unwrap()
                .primary
        })
        .collect()
}
