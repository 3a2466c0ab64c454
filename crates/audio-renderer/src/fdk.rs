//! [`AacBackend`] over libfdk-aac.

use audio_renderer_types::StreamInfo;
use fdk_aac::dec::{Decoder as FdkDecoder, DecoderError, Transport};

use crate::decode::AacBackend;
use crate::error::DecodeError;

/// fdk-aac decoder opened for raw (unframed) MPEG-4 access units.
pub struct FdkAacBackend {
    inner: FdkDecoder,
}

impl FdkAacBackend {
    pub fn open() -> Result<Self, DecodeError> {
        Ok(Self {
            inner: FdkDecoder::new(Transport::Raw),
        })
    }
}

impl AacBackend for FdkAacBackend {
    fn config_raw(&mut self, asc: &[u8]) -> Result<(), DecodeError> {
        self.inner.config_raw(asc).map_err(decode_error)
    }

    fn fill(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        self.inner.fill(data).map(|_| ()).map_err(decode_error)
    }

    fn decode_frame(&mut self, pcm: &mut [i16]) -> Result<(), DecodeError> {
        self.inner.decode_frame(pcm).map_err(decode_error)
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        let info = self.inner.stream_info();
        Some(StreamInfo {
            channel_config: info.channelConfig as i32,
            sample_rate: info.aacSampleRate as i32,
            samples_per_frame: info.aacSamplesPerFrame as i32,
            audio_object_type: info.aot as i32,
            bitrate: info.bitRate as i32,
        })
    }
}

fn decode_error(err: DecoderError) -> DecodeError {
    DecodeError::new(format!("{err:?}"))
}
