use crate::config::Config;
use crate::download::{self, DownloadOutcome, DownloadTask, Remuxer};
use crate::error::{DownloadError, RunError};
use crate::ffmpeg::FfmpegRemuxer;
use crate::gate::{AlwaysDownload, DurationMatch, FfprobeDuration, SkipPolicy};
use crate::manifest;
use log::{error, info};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug)]
pub struct EntryOutcome {
    pub name: String,
    pub result: Result<DownloadOutcome, DownloadError>,
}

/// What happened to each manifest entry, in manifest order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<EntryOutcome>,
}

impl RunReport {
    pub fn downloaded(&self) -> usize {
        self.count(|r| matches!(r, Ok(DownloadOutcome::Downloaded { .. })))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(DownloadOutcome::Skipped { .. })))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| r.is_err())
    }

    fn count(&self, pred: impl Fn(&Result<DownloadOutcome, DownloadError>) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.result)).count()
    }
}

/// Loads the manifest, prepares the output directory and processes every entry in
/// order. Only manifest and directory failures abort; entry failures are logged and
/// recorded in the report.
pub fn run(
    config: &Config,
    policy: &dyn SkipPolicy,
    remuxer: &dyn Remuxer,
) -> Result<RunReport, RunError> {
    let manifest = manifest::load(&config.manifest_path)?;
    info!(
        "Loaded {} video definitions from {}",
        manifest.len(),
        config.manifest_path.display()
    );

    std::fs::create_dir_all(&config.output_dir).map_err(|source| RunError::CreateOutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let mut report = RunReport::default();

    for def in &manifest.video_defs {
        let task = DownloadTask::from_def(&config.output_dir, def);
        let result = if claimed.insert(task.output_path.clone()) {
            download::download(&task, policy, remuxer)
        } else {
            Err(DownloadError::DuplicateName {
                name: def.name.clone(),
                path: task.output_path.clone(),
            })
        };

        if let Err(err) = &result {
            error!("Error downloading {}: {err}", def.name);
        }
        report.entries.push(EntryOutcome {
            name: def.name.clone(),
            result,
        });
    }

    Ok(report)
}

/// [`run`] with the real ffmpeg/ffprobe collaborators named by `config`.
pub fn run_default(config: &Config) -> Result<RunReport, RunError> {
    let remuxer = FfmpegRemuxer::new(&config.ffmpeg);
    if config.skip_existing {
        let policy = DurationMatch::new(FfprobeDuration::new(&config.ffprobe));
        run(config, &policy, &remuxer)
    } else {
        run(config, &AlwaysDownload, &remuxer)
    }
}
