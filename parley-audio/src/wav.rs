//! WAV decoding to the 16kHz mono f32 format Whisper expects

use anyhow::Result;
use std::path::Path;

/// Read a WAV file and normalize it to 16kHz mono f32 samples.
pub fn read_wav_mono_16k(path: impl AsRef<Path>) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = downmix_to_mono(&samples, spec.channels);
    Ok(resample_to_16khz(&mono, spec.sample_rate))
}

/// Average interleaved channels down to one.
fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Resample audio to 16kHz for Whisper compatibility
pub fn resample_to_16khz(samples: &[f32], original_sample_rate: u32) -> Vec<f32> {
    if original_sample_rate == 16000 {
        return samples.to_vec();
    }

    let ratio = original_sample_rate as f32 / 16000.0;
    let output_len = (samples.len() as f32 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_index = (i as f32 * ratio) as usize;
        if src_index < samples.len() {
            output.push(samples[src_index]);
        } else {
            output.push(0.0);
        }
    }

    output
}
