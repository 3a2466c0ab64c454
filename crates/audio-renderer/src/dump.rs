//! Raw PCM dump of decoded blocks, for inspecting decoder output offline.
//!
//! The file holds headerless S16_LE interleaved stereo at 44.1 kHz
//! (e.g. `aplay -f cd dump.pcm`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::decode::DecodedBlock;

pub struct PcmDump {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl PcmDump {
    /// Create (truncate) the dump file. Failure disables dumping and is only logged.
    pub fn create(path: &Path) -> Option<Self> {
        match File::create(path) {
            Ok(file) => {
                tracing::info!(path = %path.display(), "dumping decoded PCM");
                Some(Self {
                    path: path.to_path_buf(),
                    writer: Some(BufWriter::new(file)),
                })
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "PCM dump disabled: {e}");
                None
            }
        }
    }

    /// Append one block. The first I/O error stops further dumping.
    pub fn write_block(&mut self, block: &DecodedBlock) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writer.write_all(&block.to_le_bytes()) {
            tracing::warn!(path = %self.path.display(), "PCM dump write failed: {e}");
            self.writer = None;
        }
    }

    pub fn finish(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), "PCM dump flush failed: {e}");
            }
        }
    }
}

impl Drop for PcmDump {
    fn drop(&mut self) {
        self.finish();
    }
}
