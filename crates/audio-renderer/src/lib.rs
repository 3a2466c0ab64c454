//! AAC-ELD audio renderer.
//!
//! Decodes one raw AAC-ELD access unit per call and writes the resulting PCM
//! to a fixed-format output device, with optional mixer volume control.
//!
//! ## Layout
//! - [`decode`]: fixed-config decoder over an [`decode::AacBackend`]
//! - [`output`]: PCM write/recover, volume, and teardown over [`output::OutputBackend`]
//! - [`renderer`]: the decoder and sink owned and torn down together
//! - `alsa_output` / [`fdk`]: the libasound and libfdk-aac backends

pub mod config;
pub mod decode;
pub mod dump;
pub mod error;
pub mod fdk;
pub mod output;
pub mod renderer;

#[cfg(target_os = "linux")]
pub mod alsa_output;

#[cfg(test)]
mod testing;

pub use config::RendererConfig;
pub use error::InitError;
pub use renderer::{AudioRenderer, VideoRenderer};
