use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One video entry of `video_defs.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoDef {
    pub name: String,
    /// Expected duration in whole seconds.
    pub duration: u64,
    /// HLS playlist URL (or local path), handed to ffmpeg as-is.
    pub location: String,
    pub subtitle_base: String,
    pub has_translations: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub video_defs: Vec<VideoDef>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.video_defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video_defs.is_empty()
    }
}

pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let bytes = std::fs::read(path).map_err(|source| ManifestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    from_slice(path, &bytes)
}

/// Decodes a manifest already in memory; `origin` only labels errors.
pub fn from_slice(origin: &Path, bytes: &[u8]) -> Result<Manifest, ManifestError> {
    serde_json::from_slice(bytes).map_err(|source| ManifestError::Decode {
        path: origin.to_path_buf(),
        source,
    })
}
