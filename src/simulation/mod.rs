mod noise;
mod signal;

pub use noise::{create_rng, random_samples, random_taps};
pub use signal::{impulse, step, tone};
