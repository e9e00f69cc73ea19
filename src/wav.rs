use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Mono samples and the rate they were recorded at
#[derive(Debug, Clone, PartialEq)]
pub struct MonoWav {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Read the first channel of a WAV file as floats in `[-1, 1)`
pub fn load_mono_wav(filename: &str) -> Result<MonoWav, hound::Error> {
    let mut reader = WavReader::open(filename)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(MonoWav {
        samples: interleaved.into_iter().step_by(channels).collect(),
        sample_rate: spec.sample_rate,
    })
}

/// Write mono 32-bit float samples
pub fn save_mono_wav(filename: &str, samples: &[f32], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(filename, spec)?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}
