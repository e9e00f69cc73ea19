use log::debug;
use serde::Serialize;

use super::sizing::{
    coeff_register_len, fir_range_len, fir_range_offset, margin, single_buffer_geometry,
};
use crate::cascade::CascadeRole;
use crate::config::{Architecture, FilterConfig};
use crate::error::{FilterError, Result};

/// Contiguous slice of the stored half tap set owned by one kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TapRange {
    pub offset: usize,
    pub len: usize,
}

impl TapRange {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Everything one kernel needs to know about its place in the filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelPlan {
    pub position: usize,
    pub role: CascadeRole,
    pub architecture: Architecture,
    pub lanes: usize,
    pub columns: usize,
    pub range: TapRange,
    /// This kernel applies the unpaired centre tap of an odd-length filter
    pub holds_centre: bool,
    /// Multiply-accumulate operations per output vector
    pub ops: usize,
    /// Leading zero columns of the right-aligned centre operation
    pub skew: usize,
    pub margin: usize,
    /// Output vectors per invocation
    pub vectors: usize,
    /// Output vectors sharing one sample register fill (incremental strobe)
    pub repeat: usize,
}

impl KernelPlan {
    pub fn new(config: &FilterConfig, position: usize) -> Result<Self> {
        let cascade_len = config.cascade_len();
        if position >= cascade_len {
            return Err(FilterError::CascadePosition {
                position,
                len: cascade_len,
            });
        }

        let half_len = config.half_len();
        let columns = config.columns();
        let len = fir_range_len(half_len, columns, cascade_len, position);
        if len == 0 {
            return Err(FilterError::EmptyRange {
                position,
                half_len,
                cascade_len,
                columns,
            });
        }
        let range = TapRange {
            offset: fir_range_offset(half_len, columns, cascade_len, position),
            len,
        };

        let role = CascadeRole::from_position(position, cascade_len);
        let holds_centre = config.fir_len() % 2 == 1 && role.is_final();
        let ops = len.div_ceil(columns);
        let skew = if holds_centre {
            (columns - len % columns) % columns
        } else {
            0
        };
        let architecture = select_architecture(config, range)?;

        let plan = Self {
            position,
            role,
            architecture,
            lanes: config.lanes(),
            columns,
            range,
            holds_centre,
            ops,
            skew,
            margin: margin(config.fir_len(), config.data_type().bits()),
            vectors: config.vectors_per_window(),
            repeat: repeat_factor(config),
        };
        debug!(
            "kernel {} ({:?}): {} taps from {}, {} ops, {}",
            position, role, range.len, range.offset, ops, architecture
        );
        Ok(plan)
    }
}

/// Samples one output vector touches, forward and reverse reads combined
fn vector_span(config: &FilterConfig, range: TapRange) -> usize {
    let fir_len = config.fir_len();
    let lo = range.offset.min(fir_len - range.end());
    let hi = (range.end() - 1).max(fir_len - 1 - range.offset);
    hi - lo + 1 + (config.lanes() - 1) * config.decimate()
}

/// Output vectors served by one incremental register fill
fn repeat_factor(config: &FilterConfig) -> usize {
    let geometry = single_buffer_geometry(config.data_type().bits());
    if config.decimate() % 2 == 0 {
        geometry.load
    } else {
        geometry.capacity / config.lanes()
    }
}

/// Whether the whole symmetric window of one vector fits the single buffer
pub fn single_buffer_fit(config: &FilterConfig, range: TapRange) -> std::result::Result<(), String> {
    if config.cascade_len() != 1 {
        return Err(format!("cascade length is {}, not 1", config.cascade_len()));
    }

    let geometry = single_buffer_geometry(config.data_type().bits());
    let span = vector_span(config, range);
    if span + geometry.load - 1 > geometry.capacity {
        return Err(format!(
            "vector span of {} samples plus a load of {} exceeds {} samples",
            span, geometry.load, geometry.capacity
        ));
    }

    let padded = range.len.div_ceil(config.columns()) * config.columns();
    let register = coeff_register_len(config.coeff_type().bits());
    if padded > register {
        return Err(format!(
            "{} padded taps exceed the {} coefficient register slots",
            padded, register
        ));
    }
    Ok(())
}

/// Whether consecutive vectors can share a single-buffer fill
pub fn incremental_fit(config: &FilterConfig, range: TapRange) -> std::result::Result<(), String> {
    single_buffer_fit(config, range)?;

    let geometry = single_buffer_geometry(config.data_type().bits());
    let span = vector_span(config, range);
    if span + 2 * geometry.load - 1 > geometry.capacity {
        return Err(format!(
            "no headroom for an extra load: span {} in {} samples",
            span, geometry.capacity
        ));
    }

    let step = config.lanes() * config.decimate();
    if step >= span {
        return Err(format!(
            "vectors advance {} samples but only span {}, nothing to reuse",
            step, span
        ));
    }

    let multiple = step * repeat_factor(config);
    if !config.window_size().is_multiple_of(multiple) {
        return Err(format!(
            "window size {} is not a multiple of {}",
            config.window_size(),
            multiple
        ));
    }
    Ok(())
}

/// Choose the buffering strategy for one kernel, honouring an override
pub fn select_architecture(config: &FilterConfig, range: TapRange) -> Result<Architecture> {
    if let Some(requested) = config.architecture_override() {
        let fit = match requested {
            Architecture::SingleBufferBasic => single_buffer_fit(config, range),
            Architecture::SingleBufferIncrementalStrobe => incremental_fit(config, range),
            Architecture::DoubleBufferBasic => Ok(()),
        };
        return fit
            .map(|()| requested)
            .map_err(|reason| FilterError::ArchitectureIneligible { requested, reason });
    }

    let arch = if incremental_fit(config, range).is_ok() {
        Architecture::SingleBufferIncrementalStrobe
    } else if single_buffer_fit(config, range).is_ok() {
        Architecture::SingleBufferBasic
    } else {
        Architecture::DoubleBufferBasic
    };
    Ok(arch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementType;

    fn float_config(fir_len: usize, window_size: usize) -> FilterConfig {
        FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(fir_len)
            .decimate(2)
            .window_size(window_size)
            .build()
            .unwrap()
    }

    #[test]
    fn test_short_filter_uses_incremental_strobe() {
        let config = float_config(8, 128);
        assert_eq!(
            config.plan(0).unwrap().architecture,
            Architecture::SingleBufferIncrementalStrobe
        );
    }

    #[test]
    fn test_window_multiple_gates_incremental_strobe() {
        // 4 lanes x 8 repeats x D=2 = 64; 72 is only a multiple of 8
        let config = float_config(8, 72);
        assert_eq!(
            config.plan(0).unwrap().architecture,
            Architecture::SingleBufferBasic
        );
    }

    #[test]
    fn test_medium_filter_uses_single_buffer_basic() {
        let config = float_config(16, 64);
        assert_eq!(
            config.plan(0).unwrap().architecture,
            Architecture::SingleBufferBasic
        );
    }

    #[test]
    fn test_long_filter_uses_double_buffer() {
        let config = float_config(64, 128);
        assert_eq!(
            config.plan(0).unwrap().architecture,
            Architecture::DoubleBufferBasic
        );
    }

    #[test]
    fn test_cascade_forces_double_buffer() {
        let config = float_config(8, 128).with_cascade_len(2).unwrap();
        for plan in config.plans().unwrap() {
            assert_eq!(plan.architecture, Architecture::DoubleBufferBasic);
        }
    }

    #[test]
    fn test_ineligible_override_rejected() {
        let err = FilterConfig::builder(ElementType::Float, ElementType::Float)
            .fir_len(64)
            .decimate(2)
            .window_size(128)
            .architecture(Architecture::SingleBufferBasic)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::ArchitectureIneligible {
                requested: Architecture::SingleBufferBasic,
                ..
            }
        ));
    }

    #[test]
    fn test_centre_plan() {
        let config = FilterConfig::builder(ElementType::Int16, ElementType::Int32)
            .fir_len(9)
            .decimate(3)
            .window_size(192)
            .build()
            .unwrap();
        let plan = config.plan(0).unwrap();
        assert!(plan.holds_centre);
        assert_eq!(plan.range, TapRange { offset: 0, len: 5 });
        assert_eq!(plan.ops, 3);
        assert_eq!(plan.skew, 1);
        assert_eq!(plan.lanes, 8);
    }

    #[test]
    fn test_position_out_of_range() {
        let config = float_config(16, 64);
        assert!(matches!(
            config.plan(1),
            Err(FilterError::CascadePosition { position: 1, len: 1 })
        ));
    }
}
