//! Renderer: the decoder and output sink owned and torn down as one unit.

use audio_renderer_types::{AudioRendererKind, RendererStats, StreamInfo, VideoRendererKind};

use crate::config::RendererConfig;
use crate::decode::{AacBackend, Decoder};
use crate::dump::PcmDump;
use crate::error::{DecodeError, InitError};
use crate::output::{OutputBackend, OutputSink, WriteOutcome};

/// A video renderer running next to this audio renderer.
pub trait VideoRenderer {
    fn kind(&self) -> VideoRendererKind;
}

/// Keep `peer` only if it can share hardware resources with this renderer.
pub fn compatible_video_peer(peer: Option<&dyn VideoRenderer>) -> Option<&dyn VideoRenderer> {
    peer.filter(|p| p.kind() == VideoRendererKind::Rpi)
}

/// Decoder + output device pair driven one frame at a time.
///
/// Every method takes `&mut self`: a single render call is in flight at any
/// time, and volume changes are serialized with rendering by the borrow.
/// [`AudioRenderer::destroy`] consumes the renderer, so nothing can be
/// written after teardown.
pub struct AudioRenderer<D: AacBackend, O: OutputBackend> {
    config: RendererConfig,
    decoder: Option<Decoder<D>>,
    sink: Option<OutputSink<O::Pcm, O::Control>>,
    shares_video_resources: bool,
    dump: Option<PcmDump>,
    stats: RendererStats,
}

impl<D: AacBackend, O: OutputBackend> AudioRenderer<D, O> {
    /// Open the decoder, then the output device.
    ///
    /// If the device fails, the already opened decoder is released before the
    /// error is returned.
    pub fn init<F>(
        open_decoder: F,
        output: &O,
        peer: Option<&dyn VideoRenderer>,
        config: RendererConfig,
    ) -> Result<Self, InitError>
    where
        F: FnOnce() -> Result<D, DecodeError>,
    {
        let shares_video_resources = compatible_video_peer(peer).is_some();

        let decoder = Decoder::open(open_decoder)?;
        let sink = OutputSink::open(output, config.device_name())?;
        let dump = config.dump_pcm.as_deref().and_then(PcmDump::create);

        tracing::info!(
            device = sink.device(),
            volume_control = sink.has_volume_control(),
            shares_video_resources,
            "audio renderer ready"
        );

        Ok(Self {
            config,
            decoder: Some(decoder),
            sink: Some(sink),
            shares_video_resources,
            dump,
            stats: RendererStats::default(),
        })
    }

    pub fn kind(&self) -> AudioRendererKind {
        AudioRendererKind::Rpi
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Whether a compatible video renderer was given at init.
    pub fn shares_video_resources(&self) -> bool {
        self.shares_video_resources
    }

    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.decoder.as_ref().and_then(Decoder::stream_info)
    }

    pub fn has_volume_control(&self) -> bool {
        self.sink
            .as_ref()
            .map(OutputSink::has_volume_control)
            .unwrap_or(false)
    }

    /// Snapshot of the counters collected so far.
    pub fn stats(&self) -> RendererStats {
        self.stats.clone()
    }

    /// No-op; the device is live as soon as init returns.
    pub fn start(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.start();
        }
    }

    /// No-op; no samples are held on the application side.
    pub fn flush(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush();
        }
    }

    /// Decode one compressed frame and write it to the device.
    ///
    /// `frame` must be exactly one access unit. `_pts` is accepted for
    /// interface parity and not used. Returns `None` when nothing was written
    /// (empty frame).
    pub fn render_buffer(&mut self, frame: &[u8], _pts: u64) -> Option<WriteOutcome> {
        if frame.is_empty() {
            self.stats.empty_frames += 1;
            return None;
        }
        let (Some(decoder), Some(sink)) = (self.decoder.as_mut(), self.sink.as_mut()) else {
            return None;
        };

        tracing::debug!(bytes = frame.len(), "Got AAC data");
        self.stats.frames_rendered += 1;

        let block = decoder.decode_frame(frame)?;
        if !block.clean {
            self.stats.decode_warnings += 1;
        }
        if let Some(dump) = self.dump.as_mut() {
            dump.write_block(&block);
        }

        let outcome = sink.write(&block);
        match &outcome {
            WriteOutcome::Complete { frames } => self.stats.pcm_frames_written += *frames as u64,
            WriteOutcome::Short { written, .. } => {
                self.stats.short_writes += 1;
                self.stats.pcm_frames_written += *written as u64;
            }
            WriteOutcome::Recovered { .. } => self.stats.recoveries += 1,
            WriteOutcome::RecoveryFailed { .. } => self.stats.failed_recoveries += 1,
        }
        Some(outcome)
    }

    /// Set the output volume in dB. No-op when the device has no volume element.
    pub fn set_volume(&mut self, volume_db: f32) -> Option<i64> {
        let raw = self.sink.as_mut()?.set_volume(volume_db);
        if raw.is_some() {
            self.stats.volume_changes += 1;
        }
        raw
    }

    /// Flush, release the decoder, then drain and close the device.
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.decoder.is_none() && self.sink.is_none() {
            return;
        }
        self.flush();
        drop(self.decoder.take());
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        if let Some(mut dump) = self.dump.take() {
            dump.finish();
        }
        tracing::info!(
            frames = self.stats.frames_rendered,
            pcm_frames = self.stats.pcm_frames_written,
            "audio renderer destroyed"
        );
    }
}

impl<D: AacBackend, O: OutputBackend> Drop for AudioRenderer<D, O> {
    fn drop(&mut self) {
        self.teardown();
    }
}
