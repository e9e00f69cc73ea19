//! Register geometry and legality limits of the target vector processor
//!
//! Sizes are in bits unless the name says otherwise. Sample counts are
//! derived by dividing by the element width.

/// Capacity of the single sample buffer used by the single-buffer strategies.
pub const SINGLE_BUFFER_BITS: usize = 1024;

/// Width of one load into the single sample buffer.
pub const SINGLE_BUFFER_LOAD_BITS: usize = 256;

/// Capacity of each of the two sample buffers used by the double-buffer strategy.
pub const DOUBLE_BUFFER_BITS: usize = 512;

/// Width of one load into a double-buffer register.
pub const DOUBLE_BUFFER_LOAD_BITS: usize = 128;

/// Coefficient register width; also the alignment unit of the coefficient table.
pub const COEFF_REGISTER_BITS: usize = 256;

/// Chunk width used when comparing tap sets during reload.
pub const RELOAD_COMPARE_BITS: usize = 512;

/// Granularity of the look-back margin kept in front of each window.
pub const MARGIN_ALIGN_BITS: usize = 256;

pub const MIN_FIR_LEN: usize = 4;
pub const MAX_FIR_LEN: usize = 8192;

pub const MIN_DECIMATE: usize = 2;
pub const MAX_DECIMATE: usize = 3;
/// Decimation ceiling for pairings with a reduced lane budget.
pub const MAX_DECIMATE_REDUCED: usize = 2;

pub const MAX_CASCADE_LEN: usize = 40;
pub const MAX_SHIFT: u32 = 61;

pub const MIN_WINDOW_SIZE: usize = 4;

/// Per-kernel tap limit for window transport.
pub const MAX_KERNEL_LEN_WINDOW: usize = 512;

/// Stream transport keeps taps in registers: 2 x 1024 bits of data history.
pub const STREAM_HISTORY_BITS: usize = 2 * 1024;

/// Stream output vectors this wide are split in half across two output ports.
pub const STREAM_SPLIT_BITS: usize = 256;

/// Local memory available to one window buffer.
pub const WINDOW_MEMORY_BYTES: usize = 32768;
