//! Filter configuration and its validating builder.
//!
//! A [`FilterConfig`] can only be obtained through [`FilterConfigBuilder::build`],
//! which rejects every illegal combination before any kernel exists:
//!
//! ```
//! use symdec::config::{ElementType, FilterConfig};
//!
//! let config = FilterConfig::builder(ElementType::Float, ElementType::Float)
//!     .fir_len(16)
//!     .decimate(2)
//!     .window_size(64)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.half_len(), 8);
//!
//! let err = FilterConfig::builder(ElementType::Float, ElementType::Float)
//!     .fir_len(15)
//!     .decimate(2)
//!     .build();
//! assert!(err.is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arch::{self, Capability, KernelPlan};
use crate::constants::*;
use crate::design::LowpassDesign;
use crate::error::{FilterError, Result};

/// Sample or coefficient element type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Int16,
    Int32,
    Cint16,
    Cint32,
    Float,
    Cfloat,
}

impl ElementType {
    /// Storage width of one element in bits
    pub fn bits(self) -> usize {
        match self {
            ElementType::Int16 => 16,
            ElementType::Int32 | ElementType::Cint16 | ElementType::Float => 32,
            ElementType::Cint32 | ElementType::Cfloat => 64,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() / 8
    }

    pub fn is_float(self) -> bool {
        matches!(self, ElementType::Float | ElementType::Cfloat)
    }

    pub fn is_complex(self) -> bool {
        matches!(
            self,
            ElementType::Cint16 | ElementType::Cint32 | ElementType::Cfloat
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Cint16 => "cint16",
            ElementType::Cint32 => "cint32",
            ElementType::Float => "float",
            ElementType::Cfloat => "cfloat",
        };
        f.write_str(name)
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int16" => Ok(ElementType::Int16),
            "int32" => Ok(ElementType::Int32),
            "cint16" => Ok(ElementType::Cint16),
            "cint32" => Ok(ElementType::Cint32),
            "float" => Ok(ElementType::Float),
            "cfloat" => Ok(ElementType::Cfloat),
            other => Err(format!("unknown element type: {}", other)),
        }
    }
}

/// Rounding applied when the accumulator is shifted down to the output width
///
/// The numeric codes match the hardware rounding register.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    /// Truncate towards negative infinity
    #[default]
    Floor,
    /// Round towards positive infinity
    Ceil,
    /// Round half towards positive infinity
    PosInf,
    /// Round half towards negative infinity
    NegInf,
    /// Round half away from zero
    SymInf,
    /// Round half towards zero
    SymZero,
    /// Round half to even
    ConvEven,
    /// Round half to odd
    ConvOdd,
}

impl RoundMode {
    pub fn code(self) -> u32 {
        match self {
            RoundMode::Floor => 0,
            RoundMode::Ceil => 1,
            RoundMode::PosInf => 2,
            RoundMode::NegInf => 3,
            RoundMode::SymInf => 4,
            RoundMode::SymZero => 5,
            RoundMode::ConvEven => 6,
            RoundMode::ConvOdd => 7,
        }
    }
}

impl TryFrom<u32> for RoundMode {
    type Error = FilterError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(RoundMode::Floor),
            1 => Ok(RoundMode::Ceil),
            2 => Ok(RoundMode::PosInf),
            3 => Ok(RoundMode::NegInf),
            4 => Ok(RoundMode::SymInf),
            5 => Ok(RoundMode::SymZero),
            6 => Ok(RoundMode::ConvEven),
            7 => Ok(RoundMode::ConvOdd),
            other => Err(FilterError::RoundingMode(other)),
        }
    }
}

/// Saturation applied after rounding
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SaturationMode {
    /// Wrap on overflow
    #[default]
    None,
    /// Clamp to the full two's complement range
    Saturate,
    /// Clamp to a range symmetric around zero
    Symmetric,
}

impl SaturationMode {
    pub fn code(self) -> u32 {
        match self {
            SaturationMode::None => 0,
            SaturationMode::Saturate => 1,
            SaturationMode::Symmetric => 3,
        }
    }
}

impl TryFrom<u32> for SaturationMode {
    type Error = FilterError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(SaturationMode::None),
            1 => Ok(SaturationMode::Saturate),
            3 => Ok(SaturationMode::Symmetric),
            other => Err(FilterError::SaturationMode(other)),
        }
    }
}

/// How samples reach the kernel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Addressable buffer with a look-back margin
    #[default]
    Window,
    /// Sequential stream
    Stream,
}

/// Buffering strategy of the convolution engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    SingleBufferBasic,
    SingleBufferIncrementalStrobe,
    DoubleBufferBasic,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Architecture::SingleBufferBasic => "single-buffer basic",
            Architecture::SingleBufferIncrementalStrobe => "single-buffer incremental strobe",
            Architecture::DoubleBufferBasic => "double-buffer basic",
        };
        f.write_str(name)
    }
}

/// Immutable configuration shared by every kernel of one logical filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    data_type: ElementType,
    coeff_type: ElementType,
    fir_len: usize,
    decimate: usize,
    shift: u32,
    round: RoundMode,
    saturation: SaturationMode,
    window_size: usize,
    cascade_len: usize,
    dual_input: bool,
    reload: bool,
    num_outputs: usize,
    transport: Transport,
    architecture: Option<Architecture>,
    capability: Capability,
    lanes: usize,
}

impl FilterConfig {
    pub fn builder(data_type: ElementType, coeff_type: ElementType) -> FilterConfigBuilder {
        FilterConfigBuilder::new(data_type, coeff_type)
    }

    pub fn data_type(&self) -> ElementType {
        self.data_type
    }

    pub fn coeff_type(&self) -> ElementType {
        self.coeff_type
    }

    /// Total number of taps `L`
    pub fn fir_len(&self) -> usize {
        self.fir_len
    }

    /// Number of stored taps, `(L + 1) / 2`
    pub fn half_len(&self) -> usize {
        self.fir_len.div_ceil(2)
    }

    pub fn decimate(&self) -> usize {
        self.decimate
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn round(&self) -> RoundMode {
        self.round
    }

    pub fn saturation(&self) -> SaturationMode {
        self.saturation
    }

    /// Input samples consumed per invocation
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Output samples produced per invocation
    pub fn output_size(&self) -> usize {
        self.window_size / self.decimate
    }

    pub fn cascade_len(&self) -> usize {
        self.cascade_len
    }

    pub fn dual_input(&self) -> bool {
        self.dual_input
    }

    pub fn reload(&self) -> bool {
        self.reload
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Architecture forced by the caller, if any
    pub fn architecture_override(&self) -> Option<Architecture> {
        self.architecture
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Output lanes per vector after the register-fit reduction
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Samples written to one port before switching to the other
    ///
    /// Only meaningful for two stream outputs. Wide vectors put their lower
    /// half on the first port and upper half on the second; narrow vectors
    /// alternate whole.
    pub fn stream_write_len(&self) -> usize {
        if self.lanes * self.data_type.bits() >= STREAM_SPLIT_BITS {
            self.lanes / 2
        } else {
            self.lanes
        }
    }

    pub fn columns(&self) -> usize {
        self.capability.columns
    }

    /// Look-back samples kept in front of every window
    pub fn margin(&self) -> usize {
        arch::margin(self.fir_len, self.data_type.bits())
    }

    /// Output vectors produced per invocation
    pub fn vectors_per_window(&self) -> usize {
        self.window_size / (self.decimate * self.lanes)
    }

    /// Derive the kernel plan for one cascade position
    pub fn plan(&self, position: usize) -> Result<KernelPlan> {
        KernelPlan::new(self, position)
    }

    /// Plans for every position of the cascade, head first
    pub fn plans(&self) -> Result<Vec<KernelPlan>> {
        (0..self.cascade_len).map(|p| self.plan(p)).collect()
    }

    /// Same filter split across a different number of kernels
    pub fn with_cascade_len(&self, cascade_len: usize) -> Result<FilterConfig> {
        FilterConfigBuilder::from_config(self)
            .cascade_len(cascade_len)
            .build()
    }

    /// Same filter with a forced architecture
    pub fn with_architecture(&self, architecture: Option<Architecture>) -> Result<FilterConfig> {
        let mut builder = FilterConfigBuilder::from_config(self);
        builder.architecture = architecture;
        builder.build()
    }
}

/// Fallible builder for [`FilterConfig`]
///
/// Rounding and saturation are held as raw hardware codes so that
/// out-of-range codes surface as specific errors from [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct FilterConfigBuilder {
    data_type: ElementType,
    coeff_type: ElementType,
    fir_len: usize,
    decimate: usize,
    shift: u32,
    round_code: u32,
    saturation_code: u32,
    window_size: usize,
    cascade_len: usize,
    dual_input: bool,
    reload: bool,
    num_outputs: usize,
    transport: Transport,
    architecture: Option<Architecture>,
}

impl FilterConfigBuilder {
    pub fn new(data_type: ElementType, coeff_type: ElementType) -> Self {
        Self {
            data_type,
            coeff_type,
            fir_len: 16,
            decimate: 2,
            shift: 0,
            round_code: RoundMode::default().code(),
            saturation_code: SaturationMode::default().code(),
            window_size: 256,
            cascade_len: 1,
            dual_input: false,
            reload: false,
            num_outputs: 1,
            transport: Transport::Window,
            architecture: None,
        }
    }

    fn from_config(config: &FilterConfig) -> Self {
        Self {
            data_type: config.data_type,
            coeff_type: config.coeff_type,
            fir_len: config.fir_len,
            decimate: config.decimate,
            shift: config.shift,
            round_code: config.round.code(),
            saturation_code: config.saturation.code(),
            window_size: config.window_size,
            cascade_len: config.cascade_len,
            dual_input: config.dual_input,
            reload: config.reload,
            num_outputs: config.num_outputs,
            transport: config.transport,
            architecture: config.architecture,
        }
    }

    pub fn fir_len(mut self, fir_len: usize) -> Self {
        self.fir_len = fir_len;
        self
    }

    pub fn decimate(mut self, decimate: usize) -> Self {
        self.decimate = decimate;
        self
    }

    pub fn shift(mut self, shift: u32) -> Self {
        self.shift = shift;
        self
    }

    pub fn round(mut self, round: RoundMode) -> Self {
        self.round_code = round.code();
        self
    }

    pub fn round_code(mut self, code: u32) -> Self {
        self.round_code = code;
        self
    }

    pub fn saturation(mut self, saturation: SaturationMode) -> Self {
        self.saturation_code = saturation.code();
        self
    }

    pub fn saturation_code(mut self, code: u32) -> Self {
        self.saturation_code = code;
        self
    }

    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn cascade_len(mut self, cascade_len: usize) -> Self {
        self.cascade_len = cascade_len;
        self
    }

    pub fn dual_input(mut self, dual_input: bool) -> Self {
        self.dual_input = dual_input;
        self
    }

    pub fn reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    pub fn num_outputs(mut self, num_outputs: usize) -> Self {
        self.num_outputs = num_outputs;
        self
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    /// Validate every constraint and produce the configuration
    ///
    /// # Errors
    /// Returns the [`FilterError`] naming the first violated constraint.
    pub fn build(self) -> Result<FilterConfig> {
        let capability = arch::capability(self.data_type, self.coeff_type)?;

        if !(MIN_FIR_LEN..=MAX_FIR_LEN).contains(&self.fir_len) {
            return Err(FilterError::FirLength {
                len: self.fir_len,
                min: MIN_FIR_LEN,
                max: MAX_FIR_LEN,
            });
        }

        if !(MIN_DECIMATE..=capability.max_decimate).contains(&self.decimate) {
            return Err(FilterError::Decimation {
                factor: self.decimate,
                min: MIN_DECIMATE,
                max: capability.max_decimate,
                data: self.data_type,
                coeff: self.coeff_type,
            });
        }

        if !self.fir_len.is_multiple_of(self.decimate) {
            return Err(FilterError::LengthNotMultiple {
                len: self.fir_len,
                factor: self.decimate,
            });
        }

        if self.shift > MAX_SHIFT {
            return Err(FilterError::Shift {
                shift: self.shift,
                max: MAX_SHIFT,
            });
        }
        if self.data_type.is_float() && self.shift != 0 {
            return Err(FilterError::FloatShift(self.shift));
        }

        let round = RoundMode::try_from(self.round_code)?;
        let saturation = SaturationMode::try_from(self.saturation_code)?;

        if !(1..=MAX_CASCADE_LEN).contains(&self.cascade_len) {
            return Err(FilterError::CascadeLength {
                len: self.cascade_len,
                max: MAX_CASCADE_LEN,
            });
        }

        if !(1..=2).contains(&self.num_outputs) {
            return Err(FilterError::Outputs(self.num_outputs));
        }

        if self.dual_input && self.transport != Transport::Stream {
            return Err(FilterError::DualInputWindow);
        }

        self.check_kernel_length()?;

        let lanes = arch::effective_lanes(
            capability.lanes,
            self.decimate,
            capability.columns,
            self.data_type.bits(),
        );

        self.check_window(lanes)?;

        let config = FilterConfig {
            data_type: self.data_type,
            coeff_type: self.coeff_type,
            fir_len: self.fir_len,
            decimate: self.decimate,
            shift: self.shift,
            round,
            saturation,
            window_size: self.window_size,
            cascade_len: self.cascade_len,
            dual_input: self.dual_input,
            reload: self.reload,
            num_outputs: self.num_outputs,
            transport: self.transport,
            architecture: self.architecture,
            capability,
            lanes,
        };

        // Every position must own taps and accept any forced architecture.
        config.plans()?;

        Ok(config)
    }

    fn check_kernel_length(&self) -> Result<()> {
        let per_kernel = self.fir_len.div_ceil(self.cascade_len);
        let (len, max) = match self.transport {
            // Reloadable cascades hold the whole tap set in every member.
            Transport::Window if self.reload => (self.fir_len, MAX_KERNEL_LEN_WINDOW),
            Transport::Window => (per_kernel, MAX_KERNEL_LEN_WINDOW),
            Transport::Stream => (per_kernel, STREAM_HISTORY_BITS / self.data_type.bits()),
        };
        if len > max {
            return Err(FilterError::KernelLength { len, max });
        }
        Ok(())
    }

    fn check_window(&self, lanes: usize) -> Result<()> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(FilterError::WindowTooSmall {
                size: self.window_size,
                min: MIN_WINDOW_SIZE,
            });
        }

        if self.transport == Transport::Window {
            let bytes = self.data_type.bytes();
            let input_bytes = (self.fir_len + self.window_size) * bytes;
            if input_bytes > WINDOW_MEMORY_BYTES {
                return Err(FilterError::WindowMemory {
                    what: "input window with margin",
                    bytes: input_bytes,
                    max: WINDOW_MEMORY_BYTES,
                });
            }
            let output_bytes = self.window_size / self.decimate * bytes;
            if output_bytes > WINDOW_MEMORY_BYTES {
                return Err(FilterError::WindowMemory {
                    what: "output window",
                    bytes: output_bytes,
                    max: WINDOW_MEMORY_BYTES,
                });
            }
        }

        let multiple = self.decimate * lanes;
        if !self.window_size.is_multiple_of(multiple) {
            return Err(FilterError::WindowAlignment {
                size: self.window_size,
                multiple,
            });
        }
        Ok(())
    }
}

/// Filter description as written in a TOML file
///
/// ```toml
/// data_type = "float"
/// coeff_type = "float"
/// fir_len = 32
/// decimate = 2
/// window_size = 256
/// cascade_len = 2
///
/// [design]
/// passband = 0.2
/// stopband = 0.3
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    pub data_type: ElementType,
    pub coeff_type: ElementType,
    pub fir_len: usize,
    pub decimate: usize,
    #[serde(default)]
    pub shift: u32,
    #[serde(default)]
    pub round: RoundMode,
    #[serde(default)]
    pub saturation: SaturationMode,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_cascade_len")]
    pub cascade_len: usize,
    #[serde(default)]
    pub dual_input: bool,
    #[serde(default)]
    pub reload: bool,
    #[serde(default = "default_num_outputs")]
    pub num_outputs: usize,
    #[serde(default)]
    pub transport: Transport,
    pub architecture: Option<Architecture>,
    /// Explicit half-length tap set; takes precedence over `design`
    pub taps: Option<Vec<f64>>,
    pub design: Option<LowpassDesign>,
}

fn default_window_size() -> usize {
    256
}

fn default_cascade_len() -> usize {
    1
}

fn default_num_outputs() -> usize {
    1
}

impl FilterSpec {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FilterError::Config(e.to_string()))
    }

    pub fn to_config(&self) -> Result<FilterConfig> {
        let mut builder = FilterConfig::builder(self.data_type, self.coeff_type)
            .fir_len(self.fir_len)
            .decimate(self.decimate)
            .shift(self.shift)
            .round(self.round)
            .saturation(self.saturation)
            .window_size(self.window_size)
            .cascade_len(self.cascade_len)
            .dual_input(self.dual_input)
            .reload(self.reload)
            .num_outputs(self.num_outputs)
            .transport(self.transport);
        if let Some(arch) = self.architecture {
            builder = builder.architecture(arch);
        }
        builder.build()
    }
}
