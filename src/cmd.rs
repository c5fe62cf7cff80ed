use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

/// Builds a command for an external tool: no stdin, no console window.
pub fn command(program: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null());
    configure_for_background(&mut cmd);
    cmd
}

/// Short tool name for messages ("ffmpeg" for "/opt/bin/ffmpeg.exe").
pub fn tool_name(program: &OsStr) -> String {
    std::path::Path::new(program)
        .file_stem()
        .unwrap_or(program)
        .to_string_lossy()
        .to_string()
}

pub fn is_not_found(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::NotFound
}

#[cfg(windows)]
fn configure_for_background(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    // Keep ffmpeg/ffprobe from popping up console windows.
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_for_background(_cmd: &mut Command) {}
