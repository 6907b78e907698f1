// Configuration for both tools. Everything comes from the environment;
// the binaries read it once at startup and pass it down explicitly.

use std::env;
use std::path::{Path, PathBuf};

/// Default checklist location, relative to the project root.
pub const DEFAULT_CHECKLIST: &str = "scripts/deliverables.json";

/// Snapshot file name, written at the project root.
pub const SNAPSHOT_FILE: &str = ".progress.json";

/// Credentials for the Grafana HTTP API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
#[error("GRAFANA_URL and GRAFANA_API_KEY must be set.")]
pub struct MissingCredentials;

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        ApiConfig {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Read `GRAFANA_URL` and `GRAFANA_API_KEY`. Unset and empty are
    /// treated the same.
    pub fn from_env() -> Result<Self, MissingCredentials> {
        let base_url = non_empty_var("GRAFANA_URL");
        let token = non_empty_var("GRAFANA_API_KEY");
        match (base_url, token) {
            (Some(base_url), Some(token)) => Ok(ApiConfig { base_url, token }),
            _ => Err(MissingCredentials),
        }
    }
}

/// Where the tracker looks for the project tree and its checklist.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub project_root: PathBuf,
    pub checklist: PathBuf,
}

impl TrackerConfig {
    /// Relative checklist paths are resolved against `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, checklist: impl AsRef<Path>) -> Self {
        let project_root = project_root.into();
        let checklist = project_root.join(checklist);
        TrackerConfig {
            project_root,
            checklist,
        }
    }

    /// `PROGRESS_ROOT` defaults to `default_project_root()` and
    /// `PROGRESS_CONFIG` to `scripts/deliverables.json` under the root.
    /// The working directory plays no part.
    pub fn from_env() -> Self {
        let project_root = non_empty_var("PROGRESS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(default_project_root);
        let checklist =
            non_empty_var("PROGRESS_CONFIG").unwrap_or_else(|| DEFAULT_CHECKLIST.to_string());
        Self::new(project_root, checklist)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.project_root.join(SNAPSHOT_FILE)
    }

    /// Checklist path as recorded in the snapshot: relative to the root
    /// when it lives inside it.
    pub fn checklist_display(&self) -> String {
        self.checklist
            .strip_prefix(&self.project_root)
            .unwrap_or(&self.checklist)
            .display()
            .to_string()
    }
}

/// The project tree this tool ships in: the package directory holding
/// `scripts/`, fixed at build time.
pub fn default_project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_checklist_resolves_under_root() {
        let cfg = TrackerConfig::new("/work/app", "scripts/deliverables.json");
        assert_eq!(cfg.checklist, PathBuf::from("/work/app/scripts/deliverables.json"));
        assert_eq!(cfg.checklist_display(), "scripts/deliverables.json");
        assert_eq!(cfg.snapshot_path(), PathBuf::from("/work/app/.progress.json"));
    }

    #[test]
    fn default_root_holds_the_shipped_checklist() {
        let cfg = TrackerConfig::new(default_project_root(), DEFAULT_CHECKLIST);
        assert!(cfg.checklist.is_file(), "{}", cfg.checklist.display());
    }

    #[test]
    fn absolute_checklist_is_kept_as_is() {
        let cfg = TrackerConfig::new("/work/app", "/etc/checklist.json");
        assert_eq!(cfg.checklist, PathBuf::from("/etc/checklist.json"));
        assert_eq!(cfg.checklist_display(), "/etc/checklist.json");
    }
}
