use std::path::PathBuf;
use std::sync::Arc;

use ns_scrappers::AnalysisManager;

pub struct AppState {
    pub manager: Arc<AnalysisManager>,
    /// Served read-only under `/audio`.
    pub audio_dir: PathBuf,
}
