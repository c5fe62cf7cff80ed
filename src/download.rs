use crate::config;
use crate::error::DownloadError;
use crate::gate::{SkipDecision, SkipPolicy};
use crate::manifest::VideoDef;
use crate::progress::ProgressIndicator;
use log::info;
use std::path::{Path, PathBuf};

/// Runs the external remux of one HLS source into one output file.
pub trait Remuxer {
    fn remux(&self, source_location: &str, output_path: &Path) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub output_path: PathBuf,
    pub source_location: String,
    pub display_name: String,
    /// `None` disables the skip check for this task.
    pub expected_duration: Option<u64>,
}

impl DownloadTask {
    pub fn new(
        output_dir: &Path,
        name: &str,
        source_location: &str,
        expected_duration: Option<u64>,
    ) -> Self {
        Self {
            output_path: config::output_path(output_dir, name),
            source_location: source_location.to_string(),
            display_name: name.to_string(),
            expected_duration,
        }
    }

    pub fn from_def(output_dir: &Path, def: &VideoDef) -> Self {
        Self::new(output_dir, &def.name, &def.location, Some(def.duration))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded { output_path: PathBuf },
    Skipped { output_path: PathBuf },
}

impl DownloadOutcome {
    pub fn output_path(&self) -> &Path {
        match self {
            DownloadOutcome::Downloaded { output_path } | DownloadOutcome::Skipped { output_path } => {
                output_path
            }
        }
    }
}

pub fn download(
    task: &DownloadTask,
    policy: &dyn SkipPolicy,
    remuxer: &dyn Remuxer,
) -> Result<DownloadOutcome, DownloadError> {
    if let Some(expected) = task.expected_duration {
        if let SkipDecision::Skip { probed } = policy.decide(&task.output_path, expected) {
            info!(
                "File {} already exists with correct duration ({probed:.1}s), skipping...",
                task.display_name
            );
            return Ok(DownloadOutcome::Skipped {
                output_path: task.output_path.clone(),
            });
        }
    }

    let indicator = ProgressIndicator::start(format!("Downloading {}", task.display_name));
    let result = remuxer.remux(&task.source_location, &task.output_path);
    indicator.finish();
    result?;

    info!("Saved to {}", task.output_path.display());
    Ok(DownloadOutcome::Downloaded {
        output_path: task.output_path.clone(),
    })
}
