//! Output sink: fixed-format PCM device plus optional mixer volume control.
//!
//! The device is opened once with S16_LE / interleaved / stereo / 44.1 kHz and
//! written synchronously. Write faults get a single recovery attempt and are
//! otherwise only logged; nothing on this path returns an error once the sink
//! exists.

use crate::config::format;
use crate::decode::DecodedBlock;
use crate::error::{DeviceError, InitError};

/// Substring identifying a usable volume element (case-sensitive).
pub const VOLUME_ELEMENT_MATCH: &str = "Playback Volume";

/// Factor applied to the requested dB value before conversion.
///
/// The control API takes gains in 1/100 dB units; the sender's volume scale
/// is additionally doubled.
pub const VOLUME_DB_SCALE: i64 = 200;

/// Playback PCM handle of an audio device library.
pub trait PcmBackend {
    /// Apply the fixed format from [`crate::config::format`].
    fn set_fixed_params(&mut self) -> Result<(), DeviceError>;
    /// Blocking interleaved write. Returns the number of frames accepted.
    fn writei(&mut self, pcm: &[i16]) -> Result<usize, DeviceError>;
    /// Recover from a write error (underrun, suspend, ...).
    fn recover(&mut self, err: &DeviceError) -> Result<(), DeviceError>;
    /// Block until pending frames have been played.
    fn drain(&mut self) -> Result<(), DeviceError>;
    fn close(self) -> Result<(), DeviceError>
    where
        Self: Sized;
}

/// A control element exposed by the device's control interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlElement {
    pub numid: u32,
    pub name: String,
}

/// Control-plane handle of an audio device library.
pub trait ControlBackend {
    /// Enumerate all elements exposed by the device.
    fn elements(&mut self) -> Result<Vec<ControlElement>, DeviceError>;
    /// Convert a gain in 1/100 dB to the element's raw value range.
    fn convert_from_db(&mut self, numid: u32, centi_db: i64) -> Result<i64, DeviceError>;
    /// Write `raw` to the left and right channels of the element.
    fn write_stereo(&mut self, numid: u32, raw: i64) -> Result<(), DeviceError>;
    fn close(self) -> Result<(), DeviceError>
    where
        Self: Sized;
}

/// Opens the PCM and control handles for a named device.
pub trait OutputBackend {
    type Pcm: PcmBackend;
    type Control: ControlBackend;

    fn open_pcm(&self, device: &str) -> Result<Self::Pcm, DeviceError>;
    fn open_control(&self, device: &str) -> Result<Self::Control, DeviceError>;
}

/// Result of one block write. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// All requested frames were accepted.
    Complete { frames: usize },
    /// The device accepted fewer frames than requested; the rest is dropped.
    Short { requested: usize, written: usize },
    /// The write failed and the device was recovered; the block is lost.
    Recovered { error: DeviceError },
    /// The write failed and recovery failed too.
    RecoveryFailed {
        error: DeviceError,
        recovery: DeviceError,
    },
}

/// Opened output device, owning its PCM and control handles.
///
/// Handles are released by [`OutputSink::close`], or on drop if the sink is
/// dropped without closing.
pub struct OutputSink<P: PcmBackend, C: ControlBackend> {
    device: String,
    pcm: Option<P>,
    control: Option<C>,
    mixer: Option<ControlElement>,
}

impl<P: PcmBackend, C: ControlBackend> OutputSink<P, C> {
    /// Open `device` for playback with the fixed format and look up its volume element.
    ///
    /// Only PCM open/configuration failures are fatal. Problems on the control
    /// side just leave the sink without volume control.
    pub fn open<B>(backend: &B, device: &str) -> Result<Self, InitError>
    where
        B: OutputBackend<Pcm = P, Control = C>,
    {
        let mut pcm = backend.open_pcm(device).map_err(|source| {
            tracing::error!(device, "ALSA PCM open: {source}");
            InitError::DeviceOpen {
                device: device.to_string(),
                source,
            }
        })?;

        if let Err(source) = pcm.set_fixed_params() {
            tracing::error!(device, "ALSA PCM set params: {source}");
            if let Err(e) = pcm.close() {
                tracing::error!(device, "ALSA PCM close: {e}");
            }
            return Err(InitError::DeviceConfig {
                device: device.to_string(),
                source,
            });
        }

        let (control, mixer) = match backend.open_control(device) {
            Ok(mut control) => {
                let mixer = find_volume_element(&mut control);
                (Some(control), mixer)
            }
            Err(e) => {
                tracing::error!(device, "Ctrl open: {e}");
                (None, None)
            }
        };

        match &mixer {
            Some(elem) => {
                tracing::debug!(device, numid = elem.numid, name = %elem.name, "volume element")
            }
            None => tracing::info!(device, "Cannot control Volume for selected device"),
        }

        Ok(Self {
            device: device.to_string(),
            pcm: Some(pcm),
            control,
            mixer,
        })
    }

    /// Device name the sink was opened with.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Volume element in use, if the device exposes one.
    pub fn mixer(&self) -> Option<&ControlElement> {
        self.mixer.as_ref()
    }

    /// Whether [`OutputSink::set_volume`] can have any effect.
    pub fn has_volume_control(&self) -> bool {
        self.mixer.is_some() && self.control.is_some()
    }

    /// Write one decoded block. Blocks for up to the device latency.
    pub fn write(&mut self, block: &DecodedBlock) -> WriteOutcome {
        let requested = format::bytes_to_frames(block.byte_len());
        let Some(pcm) = self.pcm.as_mut() else {
            return WriteOutcome::Short {
                requested,
                written: 0,
            };
        };
        if requested == 0 {
            return WriteOutcome::Complete { frames: 0 };
        }

        let samples = &block.pcm[..requested * format::CHANNELS as usize];
        match pcm.writei(samples) {
            Ok(written) if written >= requested => WriteOutcome::Complete { frames: written },
            Ok(written) => {
                if written > 0 {
                    tracing::error!(
                        expected = requested,
                        written,
                        "ALSA: short write, remaining frames dropped"
                    );
                }
                WriteOutcome::Short { requested, written }
            }
            Err(error) => match pcm.recover(&error) {
                Ok(()) => {
                    tracing::debug!("ALSA write recovered after: {error}");
                    WriteOutcome::Recovered { error }
                }
                Err(recovery) => {
                    tracing::error!("ALSA write failed: {error}; recovery failed: {recovery}");
                    WriteOutcome::RecoveryFailed { error, recovery }
                }
            },
        }
    }

    /// Set the playback volume in dB on both channels.
    ///
    /// No-op without a volume element. Returns the raw control value written.
    pub fn set_volume(&mut self, volume_db: f32) -> Option<i64> {
        let numid = self.mixer.as_ref()?.numid;
        let control = self.control.as_mut()?;

        let raw = match control.convert_from_db(numid, volume_to_centi_db(volume_db)) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(volume_db, "Convert: {e}");
                return None;
            }
        };
        if let Err(e) = control.write_stereo(numid, raw) {
            tracing::error!(volume_db, raw, "Set volume: {e}");
            return None;
        }
        tracing::debug!(volume_db, raw, "volume set");
        Some(raw)
    }

    /// Nothing is buffered on the application side, so there is nothing to discard.
    pub fn flush(&mut self) {}

    /// The device accepts writes right after open.
    pub fn start(&mut self) {}

    /// Drain, close the PCM, then close the control interface.
    pub fn close(mut self) {
        self.shutdown();
    }

    /// Every step runs even if an earlier one failed.
    fn shutdown(&mut self) {
        if let Some(mut pcm) = self.pcm.take() {
            if let Err(e) = pcm.drain() {
                tracing::error!(device = %self.device, "ALSA PCM drain: {e}");
            }
            if let Err(e) = pcm.close() {
                tracing::error!(device = %self.device, "ALSA PCM close: {e}");
            }
        }
        if let Some(control) = self.control.take() {
            if let Err(e) = control.close() {
                tracing::error!(device = %self.device, "ALSA CTL close: {e}");
            }
        }
        self.mixer = None;
    }
}

impl<P: PcmBackend, C: ControlBackend> Drop for OutputSink<P, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Truncate the requested dB toward zero, then apply [`VOLUME_DB_SCALE`].
pub fn volume_to_centi_db(volume_db: f32) -> i64 {
    (volume_db as i64).saturating_mul(VOLUME_DB_SCALE)
}

/// Pick the volume element, scanning from the last element backwards.
fn find_volume_element<C: ControlBackend>(control: &mut C) -> Option<ControlElement> {
    let elements = match control.elements() {
        Ok(elements) => elements,
        Err(e) => {
            tracing::error!("Get ALSA control element list: {e}");
            return None;
        }
    };
    elements
        .into_iter()
        .rev()
        .find(|elem| elem.name.contains(VOLUME_ELEMENT_MATCH))
}
