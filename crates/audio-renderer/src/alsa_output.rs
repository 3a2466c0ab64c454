//! ALSA output backend (Linux only).
//!
//! The PCM is opened blocking with the fixed format, leaving ALSA's default
//! rate resampling enabled for cards without native 44.1 kHz. The control
//! interface of the same device is used for volume. `alsa` releases handles
//! on drop, so the `close` methods just drop them.

use alsa::ctl::{Ctl, ElemId, ElemIface, ElemType, ElemValue};
use alsa::hctl::HCtl;
use alsa::mixer::MilliBel;
use alsa::pcm::{Access, Format, HwParams, PCM};
use alsa::{Direction, Round, ValueOr};

use crate::config::{RendererConfig, format};
use crate::error::{DeviceError, InitError};
use crate::fdk::FdkAacBackend;
use crate::output::{ControlBackend, ControlElement, OutputBackend, PcmBackend};
use crate::renderer::{AudioRenderer, VideoRenderer};

/// fdk-aac decode into an ALSA device.
pub type AlsaRenderer = AudioRenderer<FdkAacBackend, AlsaOutput>;

/// Build a renderer on the real decoder and ALSA device named in `config`.
pub fn init_renderer(
    peer: Option<&dyn VideoRenderer>,
    config: RendererConfig,
) -> Result<AlsaRenderer, InitError> {
    AudioRenderer::init(FdkAacBackend::open, &AlsaOutput, peer, config)
}

/// Opens ALSA PCM and control handles by device name.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlsaOutput;

impl OutputBackend for AlsaOutput {
    type Pcm = AlsaPcm;
    type Control = AlsaControl;

    fn open_pcm(&self, device: &str) -> Result<AlsaPcm, DeviceError> {
        let pcm = PCM::new(device, Direction::Playback, false).map_err(device_error)?;
        Ok(AlsaPcm { pcm })
    }

    fn open_control(&self, device: &str) -> Result<AlsaControl, DeviceError> {
        let ctl = Ctl::new(device, false).map_err(device_error)?;
        let hctl = HCtl::new(device, false).map_err(device_error)?;
        hctl.load().map_err(device_error)?;
        Ok(AlsaControl { ctl, hctl })
    }
}

pub struct AlsaPcm {
    pcm: PCM,
}

impl PcmBackend for AlsaPcm {
    fn set_fixed_params(&mut self) -> Result<(), DeviceError> {
        let hwp = HwParams::any(&self.pcm).map_err(device_error)?;
        hwp.set_access(Access::RWInterleaved).map_err(device_error)?;
        hwp.set_format(Format::S16LE).map_err(device_error)?;
        hwp.set_channels(format::CHANNELS).map_err(device_error)?;
        hwp.set_rate(format::SAMPLE_RATE, ValueOr::Nearest)
            .map_err(device_error)?;
        hwp.set_buffer_time_near(format::LATENCY_US, ValueOr::Nearest)
            .map_err(device_error)?;
        self.pcm.hw_params(&hwp).map_err(device_error)?;

        // Start once a full buffer is queued, wake whenever a period is free.
        let buffer = hwp.get_buffer_size().map_err(device_error)?;
        let period = hwp.get_period_size().map_err(device_error)?;
        let swp = self.pcm.sw_params_current().map_err(device_error)?;
        let start = if period > 0 { (buffer / period) * period } else { buffer };
        swp.set_start_threshold(start).map_err(device_error)?;
        swp.set_avail_min(period).map_err(device_error)?;
        self.pcm.sw_params(&swp).map_err(device_error)?;

        tracing::debug!(buffer, period, "ALSA hw params applied");
        Ok(())
    }

    fn writei(&mut self, pcm: &[i16]) -> Result<usize, DeviceError> {
        let io = self.pcm.io_i16().map_err(device_error)?;
        io.writei(pcm).map_err(device_error)
    }

    fn recover(&mut self, err: &DeviceError) -> Result<(), DeviceError> {
        self.pcm.recover(err.code, false).map_err(device_error)
    }

    fn drain(&mut self) -> Result<(), DeviceError> {
        self.pcm.drain().map_err(device_error)
    }

    fn close(self) -> Result<(), DeviceError> {
        drop(self.pcm);
        Ok(())
    }
}

pub struct AlsaControl {
    ctl: Ctl,
    hctl: HCtl,
}

impl AlsaControl {
    fn mixer_id(numid: u32) -> ElemId {
        let mut id = ElemId::new(ElemIface::Mixer);
        id.set_numid(numid);
        id
    }
}

impl ControlBackend for AlsaControl {
    fn elements(&mut self) -> Result<Vec<ControlElement>, DeviceError> {
        let mut out = Vec::new();
        for elem in self.hctl.elem_iter() {
            let id = elem.get_id().map_err(device_error)?;
            let name = id.get_name().map_err(device_error)?;
            out.push(ControlElement {
                numid: id.get_numid(),
                name: name.to_string(),
            });
        }
        Ok(out)
    }

    fn convert_from_db(&mut self, numid: u32, centi_db: i64) -> Result<i64, DeviceError> {
        let id = Self::mixer_id(numid);
        self.ctl
            .convert_from_db(&id, MilliBel(centi_db), Round::Floor)
            .map_err(device_error)
    }

    fn write_stereo(&mut self, numid: u32, raw: i64) -> Result<(), DeviceError> {
        let id = Self::mixer_id(numid);
        let raw = raw.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let mut value = ElemValue::new(ElemType::Integer).map_err(device_error)?;
        value.set_id(&id);
        for channel in 0..format::CHANNELS {
            value
                .set_integer(channel, raw)
                .ok_or_else(|| DeviceError::new(-22, "element value has no such channel"))?;
        }
        self.ctl.elem_write(&value).map_err(device_error)
    }

    fn close(self) -> Result<(), DeviceError> {
        drop(self.hctl);
        drop(self.ctl);
        Ok(())
    }
}

/// ALSA reports positive errno values; the device seam uses negative codes.
fn device_error(err: alsa::Error) -> DeviceError {
    DeviceError::new(-err.errno().abs(), err.to_string())
}
