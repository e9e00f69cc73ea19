use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};
use serde::Deserialize;

use crate::error::{FilterError, Result};

/// Equiripple lowpass prototype for the decimator
///
/// Band edges are normalized to the input sample rate (0.5 is Nyquist).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LowpassDesign {
    pub passband: f64,
    pub stopband: f64,
}

impl LowpassDesign {
    /// Default anti-alias design for decimation by `decimate`
    ///
    /// Passes 80% of the output Nyquist band and stops from the output
    /// Nyquist frequency on.
    pub fn for_decimation(decimate: usize) -> Self {
        let nyquist_out = 0.5 / decimate as f64;
        Self {
            passband: 0.8 * nyquist_out,
            stopband: nyquist_out,
        }
    }

    /// First half of the symmetric impulse response, `(fir_len + 1) / 2` taps
    pub fn half_taps(&self, fir_len: usize) -> Result<Vec<f64>> {
        lowpass_half_taps(fir_len, self.passband, self.stopband)
    }
}

/// Design a linear-phase lowpass with the Parks-McClellan (Remez) algorithm
/// and return its first `(fir_len + 1) / 2` taps
///
/// # Errors
/// Returns `FilterError::FilterDesign` if the band edges are not ordered
/// inside `(0, 0.5)` or the Remez exchange fails.
pub fn lowpass_half_taps(fir_len: usize, passband: f64, stopband: f64) -> Result<Vec<f64>> {
    if !(passband > 0.0 && passband < stopband && stopband < 0.5) {
        return Err(FilterError::FilterDesign(format!(
            "Invalid band edges: passband={}, stopband={}",
            passband, stopband
        )));
    }

    let bands = [
        BandSetting::new(0.0, passband, constant(1.0))
            .map_err(|e| FilterError::FilterDesign(format!("Passband: {:?}", e)))?,
        BandSetting::new(stopband, 0.5, constant(0.0))
            .map_err(|e| FilterError::FilterDesign(format!("Stopband: {:?}", e)))?,
    ];

    let params = pm_parameters(fir_len, &bands)
        .map_err(|e| FilterError::FilterDesign(format!("PM parameters: {:?}", e)))?;

    let design =
        pm_remez(&params).map_err(|e| FilterError::FilterDesign(format!("PM Remez: {:?}", e)))?;

    let mut taps = design.impulse_response;
    taps.truncate(fir_len.div_ceil(2));
    Ok(taps)
}
