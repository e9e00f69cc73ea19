//! Static planning of each kernel: capability lookup, tap partitioning and
//! architecture selection.

mod capability;
mod selector;
mod sizing;

pub use capability::{Capability, capability};
pub use selector::{KernelPlan, TapRange, incremental_fit, select_architecture, single_buffer_fit};
pub use sizing::{
    coeff_register_len, double_buffer_geometry, effective_lanes, fir_range_len, fir_range_offset,
    margin, single_buffer_geometry, RegisterGeometry,
};
