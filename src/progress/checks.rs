// Filesystem checks. Read-only: nothing here touches the tree beyond
// `stat` and `read_dir`.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::checklist::{Check, CheckKind};

/// Evaluate one check against the tree under `root`. Never fails: anything
/// that cannot be confirmed counts as not satisfied.
pub fn evaluate_check(root: &Path, check: &Check) -> bool {
    if check.path.is_empty() {
        warn!(kind = %check.kind, "check without a path, counting as missing");
        return false;
    }
    let target = root.join(&check.path);
    let exists = match CheckKind::parse(&check.kind) {
        Some(CheckKind::File) => target.is_file(),
        Some(CheckKind::Dir) => has_visible_entry(&target),
        None => {
            warn!(kind = %check.kind, path = %check.path, "unknown check kind, counting as missing");
            false
        }
    };
    debug!(kind = %check.kind, path = %check.path, exists, "check evaluated");
    exists
}

/// True when `path` is a directory holding at least one entry whose name
/// does not start with a dot.
fn has_visible_entry(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    match fs::read_dir(path) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .any(|entry| !entry.file_name().to_string_lossy().starts_with('.')),
        Err(_) => false,
    }
}
