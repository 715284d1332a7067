//! WAV file I/O
//!
//! [`WavLoader`] reads only the header to build a [`MediaHandle`]; sample
//! decoding for playback belongs to the render engine. [`read_wav`] and
//! [`write_wav`] move whole files through an [`AudioBuffer`] for offline
//! signal-chain rendering.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;

use crate::engine::buffer::AudioBuffer;
use crate::engine::media::{MediaHandle, MediaLoader};
use crate::error::{MediaError, Result};

/// Loads WAV files as frame-accurate media
#[derive(Debug, Clone, Copy, Default)]
pub struct WavLoader;

impl MediaLoader for WavLoader {
    fn load(&self, path: &Path) -> Result<MediaHandle> {
        let reader = open_reader(path)?;
        let spec = reader.spec();
        let total_frames = reader.duration() as u64;

        if spec.sample_rate == 0 {
            return Err(MediaError::decode("WAV header reports a zero sample rate"));
        }
        if total_frames == 0 {
            return Err(MediaError::decode("WAV file contains no audio frames"));
        }

        let media = MediaHandle::audio(total_frames, spec.sample_rate, spec.channels).with_source(path);
        info!(
            "Loaded {} ({} frames @ {} Hz, {:.2}s)",
            path.display(),
            total_frames,
            spec.sample_rate,
            media.duration_secs()
        );
        Ok(media)
    }
}

/// Read a whole WAV file into a planar buffer at its native sample rate
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = open_reader(path)?;
    let spec = reader.spec();
    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    AudioBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate)
}

/// Write a buffer as a WAV file
///
/// `bit_depth` of 16 or 24 writes integer PCM, 32 writes float.
pub fn write_wav(buffer: &AudioBuffer, path: &Path, bit_depth: u16) -> Result<()> {
    if !matches!(bit_depth, 16 | 24 | 32) {
        return Err(MediaError::Config {
            reason: format!("{}-bit output is not supported (use 16, 24 or 32)", bit_depth),
        });
    }

    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: bit_depth,
        sample_format: if bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(hound_to_io)?;
    let interleaved = buffer.to_interleaved();

    match bit_depth {
        16 => {
            for sample in interleaved {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(hound_to_io)?;
            }
        }
        24 => {
            for sample in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(hound_to_io)?;
            }
        }
        _ => {
            for sample in interleaved {
                writer.write_sample(sample).map_err(hound_to_io)?;
            }
        }
    }

    writer.finalize().map_err(hound_to_io)?;
    Ok(())
}

fn open_reader(path: &Path) -> Result<WavReader<std::io::BufReader<std::fs::File>>> {
    if !path.exists() {
        return Err(MediaError::MediaNotFound {
            path: path.display().to_string(),
        });
    }

    WavReader::open(path).map_err(|e| MediaError::DecodeError {
        reason: format!("failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })
}

fn hound_to_io(e: hound::Error) -> MediaError {
    match e {
        hound::Error::IoError(io) => MediaError::Io(io),
        other => MediaError::Io(std::io::Error::new(std::io::ErrorKind::Other, other.to_string())),
    }
}

fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let decode_err = |e: hound::Error| MediaError::DecodeError {
        reason: format!("failed to read samples: {}", e),
        source: Some(Box::new(e)),
    };

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, bits) => Err(MediaError::decode(format!("{}-bit integer audio is not supported", bits))),
    }
}
