use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aac-render", version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Command>,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// ALSA device name (e.g. hw:0, plughw:1,0); uses "default" when unset
    #[arg(long)]
    pub device: Option<String>,

    /// Volume in dB applied once after the device is opened
    #[arg(long, allow_hyphen_values = true)]
    pub volume_db: Option<f32>,

    /// Also write every decoded block as raw S16_LE to this file
    #[arg(long)]
    pub dump_pcm: Option<PathBuf>,

    /// Frames buffered between the reader and the render thread
    #[arg(long, default_value_t = 32)]
    pub queue_frames: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a recorded AAC-ELD frame dump
    Play {
        /// Path to the frame dump ([u32 LE len][u64 LE pts][payload] records)
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_with_negative_volume() {
        let args = Args::try_parse_from([
            "aac-render",
            "--device",
            "hw:1",
            "--volume-db",
            "-12.5",
            "play",
            "frames.bin",
        ])
        .unwrap();
        assert_eq!(args.device.as_deref(), Some("hw:1"));
        assert_eq!(args.volume_db, Some(-12.5));
        assert_eq!(args.queue_frames, 32);
        match args.cmd {
            Some(Command::Play { path }) => assert_eq!(path, PathBuf::from("frames.bin")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_devices_needs_no_subcommand() {
        let args = Args::try_parse_from(["aac-render", "--list-devices"]).unwrap();
        assert!(args.list_devices);
        assert!(args.cmd.is_none());
    }
}
