//! WAV file writer utility
//!
//! Writes the canonical 44-byte RIFF/WAVE header followed by little-endian
//! integer PCM. No optional chunks, no padding; every declared size matches
//! the payload exactly.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use thiserror::Error;

/// Bytes before the sample data
pub const HEADER_SIZE: usize = 44;

const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("unsupported bit depth: {0} (only 16-bit PCM is written)")]
    UnsupportedBitDepth(u16),

    #[error("invalid channel layout: {samples} samples for {channels} channels")]
    InvalidChannels { channels: u16, samples: usize },

    #[error("data size of {0} bytes does not fit a RIFF header")]
    TooLarge(usize),

    #[error("byte rate of {sample_rate} Hz x {block_align} bytes does not fit a RIFF header")]
    ByteRateOverflow { sample_rate: u32, block_align: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Shape of the PCM payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl PcmFormat {
    pub fn mono_16bit(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample: 16,
            channels: 1,
        }
    }

    /// Bytes per sample frame, bit depth rounded up to whole bytes
    ///
    /// `None` if the frame size does not fit the 16-bit header field.
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample.div_ceil(8))
    }

    /// `None` if the rate does not fit the 32-bit header field
    pub fn byte_rate(&self) -> Option<u32> {
        self.block_align()
            .and_then(|align| self.sample_rate.checked_mul(u32::from(align)))
    }
}

/// Write a complete WAV stream
///
/// `samples` are interleaved when `format.channels > 1`.
pub fn write_wav<W: Write>(
    writer: &mut W,
    samples: &[i16],
    format: &PcmFormat,
) -> Result<(), WavError> {
    if format.bits_per_sample != 16 {
        return Err(WavError::UnsupportedBitDepth(format.bits_per_sample));
    }
    if format.channels == 0 || samples.len() % usize::from(format.channels) != 0 {
        return Err(WavError::InvalidChannels {
            channels: format.channels,
            samples: samples.len(),
        });
    }

    let block_align = format.block_align().ok_or(WavError::InvalidChannels {
        channels: format.channels,
        samples: samples.len(),
    })?;
    let byte_rate = format.byte_rate().ok_or(WavError::ByteRateOverflow {
        sample_rate: format.sample_rate,
        block_align,
    })?;

    let frames = samples.len() / usize::from(format.channels);
    let data_len = frames * usize::from(block_align);
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or(WavError::TooLarge(data_len))?;

    // RIFF chunk
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(36 + data_size)?;
    writer.write_all(b"WAVE")?;

    // fmt subchunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(FMT_CHUNK_SIZE)?;
    writer.write_u16::<LittleEndian>(FORMAT_PCM)?;
    writer.write_u16::<LittleEndian>(format.channels)?;
    writer.write_u32::<LittleEndian>(format.sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(format.bits_per_sample)?;

    // data subchunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_size)?;
    for &sample in samples {
        writer.write_i16::<LittleEndian>(sample)?;
    }

    Ok(())
}

/// Serialize samples into an in-memory WAV file
///
/// # Example
/// ```
/// use midisine::wav::{write_pcm, PcmFormat};
///
/// let bytes = write_pcm(&[100, -100], &PcmFormat::mono_16bit(44100)).unwrap();
/// assert_eq!(bytes.len(), 48);
/// assert_eq!(&bytes[0..4], b"RIFF");
/// ```
pub fn write_pcm(samples: &[i16], format: &PcmFormat) -> Result<Vec<u8>, WavError> {
    let mut buffer = Vec::with_capacity(HEADER_SIZE + samples.len() * 2);
    write_wav(&mut buffer, samples, format)?;
    Ok(buffer)
}

/// Write a mono 16-bit PCM WAV file
pub fn write_wav_16bit<P: AsRef<Path>>(
    path: P,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), WavError> {
    let mut file = BufWriter::new(File::create(path)?);
    write_wav(&mut file, samples, &PcmFormat::mono_16bit(sample_rate))?;
    file.flush()?;
    Ok(())
}
