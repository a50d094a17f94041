use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ns_core::{AudioArtifact, Error, Result};
use tokio::fs;

use crate::AudioConfig;

const MAX_STEM_LEN: usize = 64;
const DEFAULT_STEM: &str = "company";
const TMP_SUFFIX: &str = ".tmp";

/// Extension of the audio files the store owns and cleans up.
pub const AUDIO_EXTENSION: &str = "mp3";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Turns a company name into a safe file stem.
///
/// Only alphanumerics, `-` and `_` survive; everything else becomes `_`.
/// Path separators and dots never reach the file system.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(MAX_STEM_LEN)
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        stem.to_string()
    }
}

// `{stem}.mp3` written by `write`, or a `.{stem}.*.tmp` it left behind.
fn is_owned_file(name: &str) -> bool {
    if let Some(rest) = name.strip_prefix('.') {
        let Some((stem, unique)) = rest.strip_suffix(TMP_SUFFIX).and_then(|r| r.rsplit_once('.')) else {
            return false;
        };
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        return sanitize_file_stem(stem) == stem
            && unique.split_once('-').is_some_and(|(pid, n)| digits(pid) && digits(n));
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => ext == AUDIO_EXTENSION && sanitize_file_stem(stem) == stem,
        None => false,
    }
}

/// Audio files keyed by company, one per company.
///
/// Writes are last-write-wins: two requests for the same company race and
/// the later rename replaces the earlier file. A reader never sees a
/// partially written file.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(config: AudioConfig) -> Self {
        Self { dir: config.dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, company: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_file_stem(company), extension))
    }

    pub async fn write(&self, company: &str, extension: &str, bytes: &[u8]) -> Result<AudioArtifact> {
        if bytes.is_empty() {
            return Err(Error::Storage(format!("refusing to write empty audio for {}", company)));
        }
        fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(company, extension);
        let tmp = self.dir.join(format!(
            ".{}.{}-{}{}",
            sanitize_file_stem(company),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            TMP_SUFFIX
        ));

        let result = match fs::write(&tmp, bytes).await {
            Ok(()) => fs::rename(&tmp, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!("Wrote {} bytes of audio to {}", bytes.len(), target.display());
        Ok(AudioArtifact::new(target))
    }

    /// Removes audio files and leftover temp files last modified more than
    /// `max_age` ago. Anything else in the directory is left alone.
    /// Returns how many files were removed.
    pub async fn cleanup_older_than(&self, max_age: Duration) -> Result<usize> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| Error::Storage(format!("invalid cleanup age: {}", e)))?;
        let cutoff = Utc::now() - max_age;

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() || !is_owned_file(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let modified: DateTime<Utc> = metadata.modified()?.into();
            if modified < cutoff {
                match fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!("Failed to remove {}: {}", entry.path().display(), e),
                }
            }
        }

        if removed > 0 {
            tracing::info!("🧹 Removed {} stale audio files from {}", removed, self.dir.display());
        }
        Ok(removed)
    }
}
