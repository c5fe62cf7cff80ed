use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to open manifest {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode manifest {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool is missing: {tool}")]
    ToolMissing { tool: String },

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool failed: {tool} (code={code:?}) {stderr}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unparseable duration output: {output:?}")]
    Unparseable { output: String },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("external tool is missing: {tool}")]
    ToolMissing { tool: String },

    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {tool}: {source}")]
    Wait {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool failed: {tool} (code={code:?}) {stderr_tail}")]
    Exit {
        tool: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("duplicate name {name:?}; {path} is already written by an earlier entry")]
    DuplicateName { name: String, path: PathBuf },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit code for a run that could not start downloading.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Manifest(ManifestError::Open { .. }) => 2,
            RunError::Manifest(ManifestError::Decode { .. }) => 3,
            RunError::CreateOutputDir { .. } => 4,
        }
    }
}
