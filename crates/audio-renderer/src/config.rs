use std::path::PathBuf;

/// ALSA device used when no device string is configured.
pub const DEFAULT_DEVICE: &str = "default";

/// Renderer settings fixed for the lifetime of one renderer.
#[derive(Clone, Debug, Default)]
pub struct RendererConfig {
    /// ALSA PCM/control name (for example `hw:0` or `plughw:1,0`).
    ///
    /// `None` or a blank string selects [`DEFAULT_DEVICE`].
    pub device: Option<String>,
    /// When set, every decoded PCM block is also appended to this file as raw S16_LE.
    pub dump_pcm: Option<PathBuf>,
}

impl RendererConfig {
    /// Device name to open, falling back to [`DEFAULT_DEVICE`].
    pub fn device_name(&self) -> &str {
        self.device
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DEVICE)
    }
}

/// Fixed output format the device is opened with.
///
/// The decoder always produces 16-bit interleaved stereo at 44.1 kHz, so the
/// device format is never negotiated.
pub mod format {
    pub const CHANNELS: u32 = 2;
    pub const SAMPLE_RATE: u32 = 44_100;
    pub const BYTES_PER_SAMPLE: usize = 2;
    /// Bytes per interleaved sample frame (all channels).
    pub const BYTES_PER_FRAME: usize = BYTES_PER_SAMPLE * CHANNELS as usize;
    /// Target device latency in microseconds.
    pub const LATENCY_US: u32 = 100_000;

    /// Number of whole sample frames in `bytes` bytes of PCM.
    pub fn bytes_to_frames(bytes: usize) -> usize {
        bytes / BYTES_PER_FRAME
    }
}
