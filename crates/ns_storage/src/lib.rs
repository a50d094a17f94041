use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod audio;

pub use audio::{sanitize_file_stem, AudioStore, AUDIO_EXTENSION};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Directory audio files are written to and served from.
    pub dir: PathBuf,
}

impl AudioConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::new("audio")
    }
}

pub mod prelude {
    pub use super::audio::AudioStore;
    pub use super::AudioConfig;
}
