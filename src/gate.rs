//! Skip policies: decide whether an output file from an earlier run can be kept.

use crate::error::ProbeError;
use crate::ffmpeg;
use log::warn;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Allowed absolute difference between probed and expected duration, inclusive.
pub const DURATION_TOLERANCE_SECS: f64 = 5.0;

pub trait DurationProbe {
    fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError>;
}

impl<P: DurationProbe + ?Sized> DurationProbe for &P {
    fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        (**self).duration_seconds(path)
    }
}

#[derive(Debug, Clone)]
pub struct FfprobeDuration {
    program: PathBuf,
}

impl FfprobeDuration {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DurationProbe for FfprobeDuration {
    fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        ffmpeg::probe_duration_seconds(&self.program, path)
    }
}

#[derive(Debug)]
pub enum DownloadReason {
    AlwaysDownload,
    Missing,
    ProbeFailed(ProbeError),
    DurationMismatch {
        expected: f64,
        actual: f64,
        tolerance: f64,
    },
}

impl fmt::Display for DownloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadReason::AlwaysDownload => write!(f, "existing outputs are not checked"),
            DownloadReason::Missing => write!(f, "no existing output"),
            DownloadReason::ProbeFailed(err) => write!(f, "could not get duration: {err}"),
            DownloadReason::DurationMismatch {
                expected,
                actual,
                tolerance,
            } => write!(
                f,
                "expected {expected:.1}s, got {actual:.1}s (tolerance: {tolerance:.1}s)"
            ),
        }
    }
}

#[derive(Debug)]
pub enum SkipDecision {
    Skip { probed: f64 },
    Download(DownloadReason),
}

impl SkipDecision {
    pub fn should_skip(&self) -> bool {
        matches!(self, SkipDecision::Skip { .. })
    }
}

pub trait SkipPolicy {
    fn decide(&self, output_path: &Path, expected_seconds: u64) -> SkipDecision;
}

/// Never trusts an existing file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDownload;

impl SkipPolicy for AlwaysDownload {
    fn decide(&self, _output_path: &Path, _expected_seconds: u64) -> SkipDecision {
        SkipDecision::Download(DownloadReason::AlwaysDownload)
    }
}

/// Keeps an existing file when its probed duration is within tolerance.
#[derive(Debug, Clone)]
pub struct DurationMatch<P> {
    probe: P,
}

impl<P: DurationProbe> DurationMatch<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }
}

impl<P: DurationProbe> SkipPolicy for DurationMatch<P> {
    fn decide(&self, output_path: &Path, expected_seconds: u64) -> SkipDecision {
        match std::fs::metadata(output_path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return SkipDecision::Download(DownloadReason::Missing);
            }
            Err(source) => {
                let err = ProbeError::Stat {
                    path: output_path.to_path_buf(),
                    source,
                };
                warn!(
                    "Could not check {}, will re-download: {err}",
                    output_path.display()
                );
                return SkipDecision::Download(DownloadReason::ProbeFailed(err));
            }
        }

        let actual = match self.probe.duration_seconds(output_path) {
            Ok(v) => v,
            Err(err) => {
                warn!(
                    "Could not get duration for {}, will re-download: {err}",
                    output_path.display()
                );
                return SkipDecision::Download(DownloadReason::ProbeFailed(err));
            }
        };

        if within_tolerance(actual, expected_seconds) {
            return SkipDecision::Skip { probed: actual };
        }

        let reason = DownloadReason::DurationMismatch {
            expected: expected_seconds as f64,
            actual,
            tolerance: DURATION_TOLERANCE_SECS,
        };
        warn!("Duration mismatch for {}: {reason}", output_path.display());
        SkipDecision::Download(reason)
    }
}

pub fn within_tolerance(actual_seconds: f64, expected_seconds: u64) -> bool {
    (actual_seconds - expected_seconds as f64).abs() <= DURATION_TOLERANCE_SECS
}

pub fn should_skip<P: DurationProbe>(probe: &P, output_path: &Path, expected_seconds: u64) -> bool {
    DurationMatch::new(probe)
        .decide(output_path, expected_seconds)
        .should_skip()
}
