use std::cell::RefCell;
use std::path::{Path, PathBuf};

use hlsgrab::config::Config;
use hlsgrab::download::{DownloadOutcome, Remuxer};
use hlsgrab::driver;
use hlsgrab::gate::{AlwaysDownload, DurationMatch, DurationProbe};
use hlsgrab::{DownloadError, ManifestError, ProbeError, RunError};

const MANIFEST: &str = r#"{
  "video_defs": [
    {"name": "lecture1", "duration": 100, "location": "https://cdn.example.com/l1/index.m3u8",
     "subtitle_base": "subs/lecture1", "has_translations": true},
    {"name": "lecture2", "duration": 200, "location": "https://cdn.example.com/l2/index.m3u8",
     "subtitle_base": "", "has_translations": false},
    {"name": "lecture3", "duration": 300, "location": "https://cdn.example.com/l3/index.m3u8",
     "subtitle_base": "", "has_translations": false}
  ]
}"#;

#[derive(Default)]
struct FakeRemuxer {
    calls: RefCell<Vec<(String, PathBuf)>>,
    fail_sources: Vec<String>,
}

impl Remuxer for FakeRemuxer {
    fn remux(&self, source_location: &str, output_path: &Path) -> Result<(), DownloadError> {
        self.calls
            .borrow_mut()
            .push((source_location.to_string(), output_path.to_path_buf()));
        if self.fail_sources.iter().any(|s| s == source_location) {
            return Err(DownloadError::Exit {
                tool: "ffmpeg".to_string(),
                code: Some(1),
                stderr_tail: "Server returned 403 Forbidden".to_string(),
            });
        }
        std::fs::write(output_path, b"mp4")
            .map_err(|source| DownloadError::Wait {
                tool: "ffmpeg".to_string(),
                source,
            })
    }
}

/// Reports the same duration for every file.
struct FixedProbe(f64);

impl DurationProbe for FixedProbe {
    fn duration_seconds(&self, _path: &Path) -> Result<f64, ProbeError> {
        Ok(self.0)
    }
}

fn config_with_manifest(dir: &Path, body: &str) -> Config {
    let config = Config::in_dir(dir);
    std::fs::write(&config.manifest_path, body).expect("write manifest");
    config
}

fn sources(remuxer: &FakeRemuxer) -> Vec<String> {
    remuxer.calls.borrow().iter().map(|(s, _)| s.clone()).collect()
}

#[test]
fn every_entry_is_attempted_in_manifest_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_manifest(dir.path(), MANIFEST);
    let remuxer = FakeRemuxer::default();

    let report = driver::run(&config, &AlwaysDownload, &remuxer).expect("run");

    assert_eq!(
        sources(&remuxer),
        [
            "https://cdn.example.com/l1/index.m3u8",
            "https://cdn.example.com/l2/index.m3u8",
            "https://cdn.example.com/l3/index.m3u8",
        ]
    );
    let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["lecture1", "lecture2", "lecture3"]);
    assert_eq!(report.downloaded(), 3);
    assert!(config.output_dir.is_dir());
    assert_eq!(
        remuxer.calls.borrow()[0].1,
        config.output_dir.join("lecture1.mp4")
    );
}

#[test]
fn failing_entry_does_not_stop_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_manifest(dir.path(), MANIFEST);
    let remuxer = FakeRemuxer {
        fail_sources: vec!["https://cdn.example.com/l2/index.m3u8".to_string()],
        ..Default::default()
    };

    let report = driver::run(&config, &AlwaysDownload, &remuxer).expect("run");

    assert_eq!(remuxer.calls.borrow().len(), 3);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.entries[1].result,
        Err(DownloadError::Exit { code: Some(1), .. })
    ));
    assert!(matches!(
        report.entries[2].result,
        Ok(DownloadOutcome::Downloaded { .. })
    ));
}

#[test]
fn malformed_manifest_aborts_before_any_download() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_manifest(dir.path(), r#"{"video_defs": [{"name": "lecture1","#);
    let remuxer = FakeRemuxer::default();

    let err = driver::run(&config, &AlwaysDownload, &remuxer).expect_err("should abort");

    assert!(matches!(err, RunError::Manifest(ManifestError::Decode { .. })));
    assert_eq!(err.exit_code(), 3);
    assert!(remuxer.calls.borrow().is_empty());
    assert!(!config.output_dir.exists());
}

#[test]
fn missing_manifest_aborts_with_open_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::in_dir(dir.path());
    let remuxer = FakeRemuxer::default();

    let err = driver::run(&config, &AlwaysDownload, &remuxer).expect_err("should abort");

    assert!(matches!(err, RunError::Manifest(ManifestError::Open { .. })));
    assert_eq!(err.exit_code(), 2);
    assert!(remuxer.calls.borrow().is_empty());
}

#[test]
fn second_run_skips_outputs_with_matching_duration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_with_manifest(
        dir.path(),
        r#"{"video_defs": [
            {"name": "short", "duration": 102, "location": "https://cdn.example.com/s.m3u8"},
            {"name": "long", "duration": 900, "location": "https://cdn.example.com/l.m3u8"}
        ]}"#,
    );
    // Every existing file probes at 100s: "short" is within tolerance, "long" is not.
    let policy = DurationMatch::new(FixedProbe(100.0));

    let first = FakeRemuxer::default();
    let report = driver::run(&config, &policy, &first).expect("first run");
    assert_eq!(report.downloaded(), 2);

    let second = FakeRemuxer::default();
    let report = driver::run(&config, &policy, &second).expect("second run");
    assert_eq!(sources(&second), ["https://cdn.example.com/l.m3u8"]);
    assert_eq!(report.skipped(), 1);
    assert_eq!(
        report.entries[0].result.as_ref().expect("short").output_path(),
        config.output_dir.join("short.mp4")
    );
}
