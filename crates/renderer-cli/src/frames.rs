//! Reader for recorded compressed-frame dumps.
//!
//! A dump is a sequence of records:
//! `[u32 LE payload length][u64 LE presentation timestamp][payload]`.
//! Each payload is one AAC-ELD access unit exactly as the transport delivered it.

use std::io::{ErrorKind, Read};

use anyhow::{Context, Result, anyhow};

/// Upper bound for one access unit; anything larger means a corrupt dump.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

const HEADER_BYTES: usize = 12;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub pts: u64,
    pub data: Vec<u8>,
}

/// Iterates frames until a clean end of input or the first error.
pub struct FrameReader<R> {
    inner: R,
    index: u64,
    failed: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            index: 0,
            failed: false,
        }
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut header = [0u8; HEADER_BYTES];
        let got = read_full(&mut self.inner, &mut header)
            .with_context(|| format!("read header of frame #{}", self.index))?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_BYTES {
            return Err(anyhow!(
                "truncated header of frame #{} ({got} of {HEADER_BYTES} bytes)",
                self.index
            ));
        }

        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let mut pts_bytes = [0u8; 8];
        pts_bytes.copy_from_slice(&header[4..]);
        let pts = u64::from_le_bytes(pts_bytes);
        if len > MAX_FRAME_BYTES {
            return Err(anyhow!(
                "frame #{} claims {len} bytes (max {MAX_FRAME_BYTES})",
                self.index
            ));
        }

        let mut data = vec![0u8; len];
        let got = read_full(&mut self.inner, &mut data)
            .with_context(|| format!("read payload of frame #{}", self.index))?;
        if got < len {
            return Err(anyhow!(
                "truncated payload of frame #{} ({got} of {len} bytes)",
                self.index
            ));
        }

        self.index += 1;
        Ok(Some(Frame { pts, data }))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_frame() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the input allows; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
