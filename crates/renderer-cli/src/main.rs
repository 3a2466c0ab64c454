//! aac-render — plays recorded AirPlay mirroring audio through ALSA.
//!
//! Each input record is one raw AAC-ELD access unit. Frames are decoded with
//! fdk-aac using the fixed mirroring stream config and written to the device
//! one 480-sample block at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use renderer_cli::cli::{Args, Command};
use renderer_cli::config::PlayConfig;
use renderer_cli::runtime;

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,aac_render=info,audio_renderer=info")
        }))
        .init();

    if args.list_devices {
        return runtime::list_devices();
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        let _ = ctrlc::set_handler(move || {
            if stop.swap(true, Ordering::Relaxed) {
                std::process::exit(130);
            }
        });
    }

    match &args.cmd {
        Some(Command::Play { path }) => {
            runtime::run_play(PlayConfig::from_args(&args, path.clone()), stop)
        }
        None => {
            tracing::warn!("nothing to do; pass `play <path>` or --list-devices");
            Ok(())
        }
    }
}
