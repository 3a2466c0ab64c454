use serde::{Deserialize, Serialize};

/// Family of an audio renderer implementation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudioRendererKind {
    /// fdk-aac decode + ALSA output (shares the RPi renderer family tag).
    Rpi,
    /// Renderer that drops every frame.
    Dummy,
}

/// Family of a co-located video renderer.
///
/// Only [`VideoRendererKind::Rpi`] peers share hardware resources with an
/// audio renderer; any other kind is treated as if no peer was given.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VideoRendererKind {
    Rpi,
    Gstreamer,
    Dummy,
}

/// Stream parameters reported by the decoder after configuration.
///
/// Diagnostic only; none of these values alter rendering.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamInfo {
    /// Channel configuration index from the AudioSpecificConfig.
    pub channel_config: i32,
    /// Core sample rate (Hz).
    pub sample_rate: i32,
    /// Samples per channel in one decoded frame.
    pub samples_per_frame: i32,
    /// MPEG-4 audio object type (39 = AAC-ELD).
    pub audio_object_type: i32,
    /// Bitrate in bits per second; 0 when unknown.
    pub bitrate: i32,
}

/// Counters accumulated by a renderer over its lifetime.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RendererStats {
    /// Non-empty compressed frames handed to the renderer.
    pub frames_rendered: u64,
    /// Zero-length frames that were ignored.
    pub empty_frames: u64,
    /// Frames where the decoder reported a non-OK status on fill or decode.
    pub decode_warnings: u64,
    /// PCM frames (sample pairs) accepted by the output device.
    pub pcm_frames_written: u64,
    /// Writes that accepted fewer frames than requested.
    pub short_writes: u64,
    /// Write errors followed by a successful recovery.
    pub recoveries: u64,
    /// Write errors where recovery also failed.
    pub failed_recoveries: u64,
    /// Volume changes that reached the mixer element.
    pub volume_changes: u64,
}
