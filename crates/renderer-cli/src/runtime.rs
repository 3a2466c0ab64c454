//! CLI runtime helpers.
//!
//! `play` runs two threads, mirroring the mirroring server's delivery model:
//! a reader thread stands in for the network transport and pushes one frame
//! at a time into a bounded channel; the calling thread owns the renderer and
//! is the only one that ever touches it.

use std::fs::File;
use std::io::{BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use audio_renderer_types::RendererStats;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::config::PlayConfig;
use crate::device;
use crate::frames::{Frame, FrameReader};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// List output devices and print them to stdout.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();
    device::list_devices(&host)
}

/// Render every frame of a recorded dump, then drain and close the device.
///
/// Setting `stop` ends playback early; the renderer is still torn down.
pub fn run_play(config: PlayConfig, stop: Arc<AtomicBool>) -> Result<()> {
    let file = File::open(&config.path).with_context(|| format!("open {:?}", config.path))?;
    let (tx, rx) = crossbeam_channel::bounded::<Frame>(config.queue_frames);
    let reader = spawn_reader(BufReader::new(file), tx, stop.clone());

    let rendered = render_frames(&config, &rx, &stop);
    drop(rx);

    match reader.join() {
        Ok(Ok(count)) => tracing::debug!(frames = count, "reader finished"),
        Ok(Err(e)) => tracing::warn!("frame dump error: {e:#}"),
        Err(_) => tracing::warn!("reader thread panicked"),
    }

    let stats = rendered?;
    tracing::info!(
        stats = %serde_json::to_string(&stats).context("serialize stats")?,
        "playback finished"
    );
    Ok(())
}

/// Read frames from `source` and forward them until EOF, error, stop, or hang-up.
///
/// Returns the number of frames forwarded.
fn spawn_reader<R>(
    source: R,
    tx: Sender<Frame>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<Result<u64>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut sent = 0u64;
        for frame in FrameReader::new(source) {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if tx.send(frame?).is_err() {
                break;
            }
            sent += 1;
        }
        Ok(sent)
    })
}

#[cfg(target_os = "linux")]
fn render_frames(
    config: &PlayConfig,
    rx: &Receiver<Frame>,
    stop: &AtomicBool,
) -> Result<RendererStats> {
    use audio_renderer::alsa_output;

    let mut renderer = alsa_output::init_renderer(None, config.renderer.clone())
        .with_context(|| format!("init renderer on {}", config.renderer.device_name()))?;

    if let Some(db) = config.volume_db {
        if renderer.set_volume(db).is_none() {
            tracing::warn!(volume_db = db, "volume not applied");
        }
    }
    renderer.start();

    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::info!("stop requested");
            break;
        }
        match rx.recv_timeout(STOP_POLL_INTERVAL) {
            Ok(frame) => {
                renderer.render_buffer(&frame.data, frame.pts);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let stats = renderer.stats();
    renderer.destroy();
    Ok(stats)
}

#[cfg(not(target_os = "linux"))]
fn render_frames(
    _config: &PlayConfig,
    _rx: &Receiver<Frame>,
    _stop: &AtomicBool,
) -> Result<RendererStats> {
    anyhow::bail!("ALSA output is only available on Linux")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dump(frames: &[(u64, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (pts, data) in frames {
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&pts.to_le_bytes());
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn reader_forwards_every_frame() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let source = Cursor::new(dump(&[(1, &[1, 2]), (2, &[3]), (3, &[])]));
        let handle = spawn_reader(source, tx, Arc::new(AtomicBool::new(false)));

        let pts: Vec<u64> = rx.iter().map(|f| f.pts).collect();
        assert_eq!(pts, vec![1, 2, 3]);
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }

    #[test]
    fn reader_stops_when_receiver_hangs_up() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        let source = Cursor::new(dump(&[(1, &[1]), (2, &[2])]));
        let handle = spawn_reader(source, tx, Arc::new(AtomicBool::new(false)));
        assert_eq!(handle.join().unwrap().unwrap(), 0);
    }

    #[test]
    fn reader_honours_stop_flag() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let source = Cursor::new(dump(&[(1, &[1]), (2, &[2])]));
        let handle = spawn_reader(source, tx, Arc::new(AtomicBool::new(true)));
        assert_eq!(handle.join().unwrap().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reader_reports_corrupt_dump_after_good_frames() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut bytes = dump(&[(1, &[1, 2, 3])]);
        bytes.extend_from_slice(&[5, 0]);
        let handle = spawn_reader(Cursor::new(bytes), tx, Arc::new(AtomicBool::new(false)));

        assert_eq!(rx.recv().unwrap().data, vec![1, 2, 3]);
        assert!(handle.join().unwrap().is_err());
    }

    #[test]
    fn missing_dump_file_is_an_error() {
        let config = PlayConfig {
            path: std::env::temp_dir().join("aac-render-does-not-exist.bin"),
            renderer: Default::default(),
            volume_db: None,
            queue_frames: 1,
        };
        let err = run_play(config, Arc::new(AtomicBool::new(false))).unwrap_err();
        assert!(err.to_string().contains("open"));
    }
}
