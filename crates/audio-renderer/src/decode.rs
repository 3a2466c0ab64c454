//! AAC-ELD decode stage.
//!
//! The stream is raw (no ADTS/LATM framing) and not self-describing. The
//! decoder is configured once with a fixed AudioSpecificConfig and then fed
//! exactly one access unit per call.
//!
//! Decode failures are best effort: the status is logged and whatever the
//! decoder wrote into the block is still handed to the output.

use audio_renderer_types::StreamInfo;

use crate::config::format;
use crate::error::{DecodeError, InitError};

/// AudioSpecificConfig for the AirPlay mirroring audio stream.
///
/// AAC-ELD (object type 39), 44.1 kHz, channel configuration 2, 480-sample
/// frames. The sender's encoder profile is agreed out of band, so this value
/// is never parsed from or negotiated with the stream.
pub const ASC_AAC_ELD_44100_STEREO: [u8; 4] = [0xF8, 0xE8, 0x50, 0x00];

/// Samples per channel produced by one decode call.
pub const FRAME_SAMPLES: usize = 480;

/// Interleaved `i16` samples in one decoded block.
pub const BLOCK_SAMPLES: usize = FRAME_SAMPLES * format::CHANNELS as usize;

/// Bytes in one decoded block (4 bytes per stereo sample pair).
pub const BLOCK_BYTES: usize = FRAME_SAMPLES * format::BYTES_PER_FRAME;

/// Operations the renderer needs from an AAC decoder library.
pub trait AacBackend {
    /// Apply a raw AudioSpecificConfig.
    fn config_raw(&mut self, asc: &[u8]) -> Result<(), DecodeError>;
    /// Hand one complete access unit to the decoder's input buffer.
    fn fill(&mut self, data: &[u8]) -> Result<(), DecodeError>;
    /// Decode one frame into `pcm` (interleaved).
    fn decode_frame(&mut self, pcm: &mut [i16]) -> Result<(), DecodeError>;
    /// Current stream parameters, if the library can report them.
    fn stream_info(&self) -> Option<StreamInfo>;
}

/// One decoded PCM block.
#[derive(Debug)]
pub struct DecodedBlock {
    /// Interleaved S16 samples, always [`BLOCK_SAMPLES`] long.
    pub pcm: Vec<i16>,
    /// `false` when fill or decode reported a non-OK status.
    pub clean: bool,
}

impl DecodedBlock {
    /// Size of the block in bytes.
    pub fn byte_len(&self) -> usize {
        self.pcm.len() * format::BYTES_PER_SAMPLE
    }

    /// Raw little-endian bytes of the block.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.pcm.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Exclusively owned, configured decoder instance.
///
/// Dropping the decoder releases the library handle.
pub struct Decoder<B: AacBackend> {
    backend: B,
    stream_info: Option<StreamInfo>,
}

impl<B: AacBackend> Decoder<B> {
    /// Open a decoder via `open` and apply [`ASC_AAC_ELD_44100_STEREO`].
    pub fn open<F>(open: F) -> Result<Self, InitError>
    where
        F: FnOnce() -> Result<B, DecodeError>,
    {
        let mut backend = open().map_err(|e| {
            tracing::error!("aacDecoder open failed: {e}");
            InitError::DecoderOpen(e)
        })?;

        backend.config_raw(&ASC_AAC_ELD_44100_STEREO).map_err(|e| {
            tracing::error!("unable to set configRaw: {e}");
            InitError::DecoderConfig(e)
        })?;

        let stream_info = backend.stream_info();
        match &stream_info {
            Some(info) => tracing::debug!(
                channel = info.channel_config,
                sample_rate = info.sample_rate,
                frame_size = info.samples_per_frame,
                aot = info.audio_object_type,
                bitrate = info.bitrate,
                "stream info"
            ),
            None => tracing::error!("aacDecoder stream info unavailable"),
        }

        Ok(Self {
            backend,
            stream_info,
        })
    }

    /// Stream parameters captured after configuration.
    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.stream_info
    }

    /// Decode one compressed frame into a fixed-size PCM block.
    ///
    /// The whole buffer is assumed to be exactly one access unit. Returns
    /// `None` for an empty buffer without touching the decoder.
    pub fn decode_frame(&mut self, frame: &[u8]) -> Option<DecodedBlock> {
        if frame.is_empty() {
            return None;
        }

        let mut clean = true;
        if let Err(e) = self.backend.fill(frame) {
            tracing::error!("aacDecoder_Fill error: {e}");
            clean = false;
        }

        let mut pcm = vec![0i16; BLOCK_SAMPLES];
        if let Err(e) = self.backend.decode_frame(&mut pcm) {
            tracing::error!("aacDecoder_DecodeFrame error: {e}");
            clean = false;
        }

        Some(DecodedBlock { pcm, clean })
    }
}
