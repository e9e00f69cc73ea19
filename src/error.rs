use std::fmt;

use thiserror::Error;

use crate::config::{Architecture, ElementType};

/// Channel a cascade kernel talks over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Samples entering the head of a chain
    Input,
    /// Second input port of a dual-input kernel
    SecondInput,
    /// Broadcast copy of the input window
    Window,
    /// Partial accumulator vectors
    Partial,
    /// Reload trigger and taps
    Control,
    /// Final output of the last kernel
    Output,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkKind::Input => "input",
            LinkKind::SecondInput => "second input",
            LinkKind::Window => "window",
            LinkKind::Partial => "partial accumulator",
            LinkKind::Control => "reload control",
            LinkKind::Output => "output",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("FIR length {len} outside supported range {min}..={max}")]
    FirLength { len: usize, min: usize, max: usize },

    #[error(
        "decimation factor {factor} outside supported range {min}..={max} for {data} data with {coeff} coefficients"
    )]
    Decimation {
        factor: usize,
        min: usize,
        max: usize,
        data: ElementType,
        coeff: ElementType,
    },

    #[error("FIR length {len} is not a multiple of decimation factor {factor}")]
    LengthNotMultiple { len: usize, factor: usize },

    #[error("shift {shift} outside supported range 0..={max}")]
    Shift { shift: u32, max: u32 },

    #[error("shift must be 0 for floating-point data, got {0}")]
    FloatShift(u32),

    #[error("unsupported rounding mode code {0}")]
    RoundingMode(u32),

    #[error("unsupported saturation mode code {0}")]
    SaturationMode(u32),

    #[error("unsupported type pairing: {data} data with {coeff} coefficients")]
    UnsupportedPairing { data: ElementType, coeff: ElementType },

    #[error(
        "no symmetric multi-column operation for {data} data with {coeff} coefficients"
    )]
    SymmetryUnavailable { data: ElementType, coeff: ElementType },

    #[error("cascade length {len} outside supported range 1..={max}")]
    CascadeLength { len: usize, max: usize },

    #[error("cascade position {position} out of range for cascade length {len}")]
    CascadePosition { position: usize, len: usize },

    #[error(
        "kernel {position} receives no taps: {half_len} half taps across {cascade_len} kernels of {columns} columns"
    )]
    EmptyRange {
        position: usize,
        half_len: usize,
        cascade_len: usize,
        columns: usize,
    },

    #[error("per-kernel FIR length {len} exceeds limit {max}")]
    KernelLength { len: usize, max: usize },

    #[error("window size {size} is below the minimum of {min}")]
    WindowTooSmall { size: usize, min: usize },

    #[error("window size {size} is not a multiple of {multiple} (decimation x lanes)")]
    WindowAlignment { size: usize, multiple: usize },

    #[error("{what} needs {bytes} bytes, exceeding the {max} byte memory limit")]
    WindowMemory {
        what: &'static str,
        bytes: usize,
        max: usize,
    },

    #[error("number of outputs must be 1 or 2, got {0}")]
    Outputs(usize),

    #[error("dual input requires stream transport")]
    DualInputWindow,

    #[error("architecture {requested} is not eligible: {reason}")]
    ArchitectureIneligible {
        requested: Architecture,
        reason: String,
    },

    #[error("kernel built for {expected} elements but configured for {actual}")]
    TypeMismatch {
        expected: ElementType,
        actual: ElementType,
    },

    #[error("expected {expected} taps, got {actual}")]
    TapCount { expected: usize, actual: usize },

    #[error("expected window of {expected} samples, got {actual}")]
    WindowLength { expected: usize, actual: usize },

    #[error("{0} link required by this cascade position is not connected")]
    MissingLink(LinkKind),

    #[error("{0} link disconnected")]
    Disconnected(LinkKind),

    #[error("kernel thread at cascade position {0} panicked")]
    KernelPanicked(usize),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
