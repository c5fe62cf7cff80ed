pub mod cmd;
pub mod config;
pub mod download;
pub mod driver;
mod error;
pub mod ffmpeg;
pub mod gate;
pub mod manifest;
pub mod progress;

pub use error::{DownloadError, ManifestError, ProbeError, RunError};
