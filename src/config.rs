use std::path::PathBuf;

pub const DEFAULT_MANIFEST_FILE: &str = "video_defs.json";
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_videos";
pub const OUTPUT_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct Config {
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    /// Program used for remuxing; resolved through PATH when not absolute.
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Probe existing outputs and skip the ones whose duration already matches.
    pub skip_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            skip_existing: true,
        }
    }
}

impl Config {
    /// Config rooted at `base_dir`, with the default file names underneath it.
    pub fn in_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            manifest_path: base_dir.join(DEFAULT_MANIFEST_FILE),
            output_dir: base_dir.join(DEFAULT_OUTPUT_DIR),
            ..Self::default()
        }
    }

    pub fn output_path_for(&self, name: &str) -> PathBuf {
        output_path(&self.output_dir, name)
    }
}

pub fn output_path(output_dir: &std::path::Path, name: &str) -> PathBuf {
    output_dir.join(format!("{name}.{OUTPUT_EXTENSION}"))
}
