//! Symmetric decimating FIR filters partitioned across a cascade of
//! buffer-constrained vector kernels.

pub mod arch;
pub mod cascade;
pub mod chain;
pub mod config;
pub mod constants;
pub mod design;
pub mod element;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod output;
pub mod reference;
pub mod reload;
pub mod taps;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use chain::CascadeChain;
pub use config::{Architecture, ElementType, FilterConfig, FilterSpec};
pub use error::{FilterError, Result};
pub use kernel::{FirDecimateSym, Invocation, KernelOutput, build_cascade, step_cascade};
