use std::f32::consts::PI;

use crate::element::DataElement;

/// Unit impulse of `amplitude` at `position`, zero elsewhere
pub fn impulse<T: DataElement>(len: usize, position: usize, amplitude: i16) -> Vec<T> {
    let mut samples = vec![T::default(); len];
    if let Some(sample) = samples.get_mut(position) {
        *sample = T::from_parts(amplitude, 0);
    }
    samples
}

/// Step of height `amplitude` starting at `start`
pub fn step<T: DataElement>(len: usize, start: usize, amplitude: i16) -> Vec<T> {
    (0..len)
        .map(|i| {
            if i >= start {
                T::from_parts(amplitude, 0)
            } else {
                T::default()
            }
        })
        .collect()
}

/// Sine tone at `frequency` cycles per sample
pub fn tone(len: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
    let omega = 2.0 * PI * frequency;
    (0..len).map(|i| amplitude * (omega * i as f32).sin()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex;

    #[test]
    fn test_impulse_position() {
        let x: Vec<i16> = impulse(8, 3, 100);
        assert_eq!(x, vec![0, 0, 0, 100, 0, 0, 0, 0]);

        let x: Vec<Complex<i32>> = impulse(4, 9, 1);
        assert!(x.iter().all(|s| *s == Complex::new(0, 0)));
    }

    #[test]
    fn test_step_starts_at_offset() {
        let x: Vec<f32> = step(5, 2, 3);
        assert_eq!(x, vec![0.0, 0.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_tone_period() {
        let x = tone(16, 0.25, 1.0);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(x[3], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(x[5], x[1], epsilon = 1e-6);
    }
}
