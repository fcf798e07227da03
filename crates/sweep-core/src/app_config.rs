use std::path::PathBuf;

/// Process-level settings read from the environment.
///
/// Everything here has a default; the agent can start with an empty
/// environment and a missing platforms file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database file.
    pub data_dir: PathBuf,
    /// Path to the platforms JSON document.
    pub platforms_path: PathBuf,
    /// Directory where one-shot collection snapshots are exported.
    pub export_dir: PathBuf,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Wait after a failed scheduler cycle before the next attempt.
    pub failure_cooldown_secs: u64,
}

impl AppConfig {
    /// Path of the SQLite database file under `data_dir`.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("posts.db")
    }
}
