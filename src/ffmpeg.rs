use crate::cmd;
use crate::download::Remuxer;
use crate::error::{DownloadError, ProbeError};
use log::{debug, trace};
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::thread;

const STDERR_TAIL_LINES: usize = 20;

pub fn probe_args(input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_os_string());
    args
}

/// Container duration of `input` in seconds, as reported by ffprobe.
pub fn probe_duration_seconds(ffprobe: &Path, input: &Path) -> Result<f64, ProbeError> {
    std::fs::metadata(input).map_err(|source| ProbeError::Stat {
        path: input.to_path_buf(),
        source,
    })?;

    let tool = cmd::tool_name(ffprobe.as_os_str());
    let output = cmd::command(ffprobe)
        .args(probe_args(input))
        .output()
        .map_err(|e| {
            if cmd::is_not_found(&e) {
                ProbeError::ToolMissing { tool: tool.clone() }
            } else {
                ProbeError::Spawn {
                    tool: tool.clone(),
                    source: e,
                }
            }
        })?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            tool,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_duration_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parses `csv=p=0` output: a single line holding a decimal number of seconds.
pub fn parse_duration_output(text: &str) -> Result<f64, ProbeError> {
    let trimmed = text.trim();
    let unparseable = || ProbeError::Unparseable {
        output: trimmed.to_string(),
    };
    if trimmed.is_empty() || trimmed.lines().count() != 1 {
        return Err(unparseable());
    }
    let seconds: f64 = trimmed.parse().map_err(|_| unparseable())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(unparseable());
    }
    Ok(seconds)
}

/// Stream-copy remux of an HLS playlist into a fast-start MP4. Order matters.
pub fn remux_args(source_location: &str, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(14);
    args.push("-y".into());
    args.push("-i".into());
    args.push(source_location.into());
    for flag in [
        "-c",
        "copy",
        "-bsf:a",
        "aac_adtstoasc",
        "-progress",
        "pipe:1",
        "-nostats",
        "-movflags",
        "+faststart",
    ] {
        args.push(flag.into());
    }
    args.push(output.as_os_str().to_os_string());
    args
}

#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    program: PathBuf,
}

impl FfmpegRemuxer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Remuxer for FfmpegRemuxer {
    fn remux(&self, source_location: &str, output_path: &Path) -> Result<(), DownloadError> {
        let tool = cmd::tool_name(self.program.as_os_str());
        let mut child = cmd::command(&self.program)
            .args(remux_args(source_location, output_path))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if cmd::is_not_found(&e) {
                    DownloadError::ToolMissing { tool: tool.clone() }
                } else {
                    DownloadError::Spawn {
                        tool: tool.clone(),
                        source: e,
                    }
                }
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            kill_and_reap(&mut child);
            return Err(DownloadError::Wait {
                tool,
                source: std::io::Error::new(ErrorKind::Other, "stdout/stderr pipe missing"),
            });
        };

        let stderr_handle = thread::spawn(move || drain_tail(stderr, STDERR_TAIL_LINES));

        // Keep the -progress pipe flowing so ffmpeg never blocks on a full buffer.
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => trace!("{tool} progress: {}", String::from_utf8_lossy(&buf).trim_end()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("{tool} progress stream closed: {e}");
                    let _ = std::io::copy(reader.get_mut(), &mut std::io::sink());
                    break;
                }
            }
        }

        let status = match child.wait() {
            Ok(status) => status,
            Err(source) => {
                kill_and_reap(&mut child);
                let _ = stderr_handle.join();
                return Err(DownloadError::Wait { tool, source });
            }
        };
        let stderr_tail = stderr_handle.join().unwrap_or_default();

        if !status.success() {
            return Err(DownloadError::Exit {
                tool,
                code: status.code(),
                stderr_tail: stderr_tail.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Reads `reader` to EOF and returns its last `max_lines` lines. Bytes that are not
/// UTF-8 are replaced, never treated as the end of the stream.
fn drain_tail(reader: impl Read, max_lines: usize) -> String {
    let mut reader = BufReader::new(reader);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(max_lines);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if tail.len() == max_lines {
                    tail.pop_front();
                }
                tail.push_back(String::from_utf8_lossy(&buf).trim_end().to_string());
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => {
                let _ = std::io::copy(reader.get_mut(), &mut std::io::sink());
                break;
            }
        }
    }
    tail.into_iter().collect::<Vec<_>>().join("\n")
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
