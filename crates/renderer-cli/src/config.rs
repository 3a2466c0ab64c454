use std::path::PathBuf;

pub use audio_renderer::config::RendererConfig;

use crate::cli::Args;

#[derive(Clone, Debug)]
pub struct PlayConfig {
    pub path: PathBuf,
    pub renderer: RendererConfig,
    pub volume_db: Option<f32>,
    pub queue_frames: usize,
}

impl PlayConfig {
    pub fn from_args(args: &Args, path: PathBuf) -> Self {
        Self {
            path,
            renderer: RendererConfig {
                device: args.device.clone(),
                dump_pcm: args.dump_pcm.clone(),
            },
            volume_db: args.volume_db,
            queue_frames: args.queue_frames.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn from_args_clamps_queue_and_keeps_device() {
        let args = Args::try_parse_from([
            "aac-render",
            "--device",
            "plughw:0,0",
            "--queue-frames",
            "0",
        ])
        .unwrap();
        let cfg = PlayConfig::from_args(&args, PathBuf::from("x.bin"));
        assert_eq!(cfg.queue_frames, 1);
        assert_eq!(cfg.renderer.device_name(), "plughw:0,0");
        assert!(cfg.volume_db.is_none());
    }
}
