//! In-memory backends recording every library call in a shared journal.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use audio_renderer_types::StreamInfo;

use crate::decode::AacBackend;
use crate::error::{DecodeError, DeviceError};
use crate::output::{ControlBackend, ControlElement, OutputBackend, PcmBackend};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ConfigRaw(Vec<u8>),
    Fill(usize),
    DecodeFrame(usize),
    DecoderDropped,
    PcmOpen(String),
    SetParams,
    Writei(usize),
    Recover(i32),
    Drain,
    PcmClose,
    ControlOpen(String),
    Elements,
    ConvertFromDb { numid: u32, centi_db: i64 },
    WriteStereo { numid: u32, raw: i64 },
    ControlClose,
}

#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub fn element(numid: u32, name: &str) -> ControlElement {
    ControlElement {
        numid,
        name: name.to_string(),
    }
}

fn fault(code: i32, what: &str) -> DeviceError {
    DeviceError::new(code, format!("injected {what} failure"))
}

pub struct FakeAac {
    journal: Journal,
    pub fail_config: bool,
    pub fail_fill: bool,
    pub fail_decode: bool,
}

impl FakeAac {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_config: false,
            fail_fill: false,
            fail_decode: false,
        }
    }
}

impl AacBackend for FakeAac {
    fn config_raw(&mut self, asc: &[u8]) -> Result<(), DecodeError> {
        self.journal.push(Call::ConfigRaw(asc.to_vec()));
        if self.fail_config {
            return Err(DecodeError::new("AAC_DEC_UNSUPPORTED_FORMAT"));
        }
        Ok(())
    }

    fn fill(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        self.journal.push(Call::Fill(data.len()));
        if self.fail_fill {
            return Err(DecodeError::new("AAC_DEC_INVALID_HANDLE"));
        }
        Ok(())
    }

    fn decode_frame(&mut self, pcm: &mut [i16]) -> Result<(), DecodeError> {
        self.journal.push(Call::DecodeFrame(pcm.len()));
        if self.fail_decode {
            return Err(DecodeError::new("AAC_DEC_TRANSPORT_SYNC_ERROR"));
        }
        for (i, sample) in pcm.iter_mut().enumerate() {
            *sample = (i % 64) as i16;
        }
        Ok(())
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        Some(StreamInfo {
            channel_config: 2,
            sample_rate: 44_100,
            samples_per_frame: 480,
            audio_object_type: 39,
            bitrate: 0,
        })
    }
}

impl Drop for FakeAac {
    fn drop(&mut self) {
        self.journal.push(Call::DecoderDropped);
    }
}

/// Fault injection knobs shared by every handle a [`FakeOutput`] opens.
#[derive(Default)]
pub struct Script {
    pub fail_pcm_open: bool,
    pub fail_params: bool,
    pub fail_control_open: bool,
    pub fail_elements: bool,
    pub elements: Vec<ControlElement>,
    /// Consumed one per write; an empty queue accepts every frame.
    pub write_results: VecDeque<Result<usize, DeviceError>>,
    pub fail_recover: bool,
    pub fail_drain: bool,
    pub fail_pcm_close: bool,
    pub fail_control_close: bool,
    pub fail_convert: bool,
    pub fail_volume_write: bool,
}

#[derive(Default)]
pub struct FakeOutput {
    pub journal: Journal,
    pub script: Rc<RefCell<Script>>,
}

impl FakeOutput {
    pub fn with_elements(elements: Vec<ControlElement>) -> Self {
        let output = Self::default();
        output.script.borrow_mut().elements = elements;
        output
    }
}

impl OutputBackend for FakeOutput {
    type Pcm = FakePcm;
    type Control = FakeControl;

    fn open_pcm(&self, device: &str) -> Result<FakePcm, DeviceError> {
        self.journal.push(Call::PcmOpen(device.to_string()));
        if self.script.borrow().fail_pcm_open {
            return Err(fault(-2, "pcm open"));
        }
        Ok(FakePcm {
            journal: self.journal.clone(),
            script: self.script.clone(),
        })
    }

    fn open_control(&self, device: &str) -> Result<FakeControl, DeviceError> {
        self.journal.push(Call::ControlOpen(device.to_string()));
        if self.script.borrow().fail_control_open {
            return Err(fault(-19, "ctl open"));
        }
        Ok(FakeControl {
            journal: self.journal.clone(),
            script: self.script.clone(),
        })
    }
}

pub struct FakePcm {
    journal: Journal,
    script: Rc<RefCell<Script>>,
}

impl PcmBackend for FakePcm {
    fn set_fixed_params(&mut self) -> Result<(), DeviceError> {
        self.journal.push(Call::SetParams);
        if self.script.borrow().fail_params {
            return Err(fault(-22, "hw params"));
        }
        Ok(())
    }

    fn writei(&mut self, pcm: &[i16]) -> Result<usize, DeviceError> {
        let frames = pcm.len() / 2;
        self.journal.push(Call::Writei(frames));
        self.script
            .borrow_mut()
            .write_results
            .pop_front()
            .unwrap_or(Ok(frames))
    }

    fn recover(&mut self, err: &DeviceError) -> Result<(), DeviceError> {
        self.journal.push(Call::Recover(err.code));
        if self.script.borrow().fail_recover {
            return Err(err.clone());
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), DeviceError> {
        self.journal.push(Call::Drain);
        if self.script.borrow().fail_drain {
            return Err(fault(-77, "drain"));
        }
        Ok(())
    }

    fn close(self) -> Result<(), DeviceError> {
        self.journal.push(Call::PcmClose);
        if self.script.borrow().fail_pcm_close {
            return Err(fault(-5, "pcm close"));
        }
        Ok(())
    }
}

pub struct FakeControl {
    journal: Journal,
    script: Rc<RefCell<Script>>,
}

impl ControlBackend for FakeControl {
    fn elements(&mut self) -> Result<Vec<ControlElement>, DeviceError> {
        self.journal.push(Call::Elements);
        let script = self.script.borrow();
        if script.fail_elements {
            return Err(fault(-5, "elem list"));
        }
        Ok(script.elements.clone())
    }

    fn convert_from_db(&mut self, numid: u32, centi_db: i64) -> Result<i64, DeviceError> {
        self.journal.push(Call::ConvertFromDb { numid, centi_db });
        if self.script.borrow().fail_convert {
            return Err(fault(-22, "convert"));
        }
        Ok((255 + centi_db / 50).max(0))
    }

    fn write_stereo(&mut self, numid: u32, raw: i64) -> Result<(), DeviceError> {
        self.journal.push(Call::WriteStereo { numid, raw });
        if self.script.borrow().fail_volume_write {
            return Err(fault(-1, "elem write"));
        }
        Ok(())
    }

    fn close(self) -> Result<(), DeviceError> {
        self.journal.push(Call::ControlClose);
        if self.script.borrow().fail_control_close {
            return Err(fault(-5, "ctl close"));
        }
        Ok(())
    }
}
