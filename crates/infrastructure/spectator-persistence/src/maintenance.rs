use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;

/// Where a damaged store file is moved: `<name>.corrupt.<ts>.<pid>.<n>` next to it.
fn quarantine_path(path: &Utf8Path) -> Utf8PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let name = path
        .file_name()
        .unwrap_or(spectator_config::ENDPOINT_STORE_FILENAME);
    let ts = Utc::now().format("%Y%m%dT%H%M%S%.f");
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!("{name}.corrupt.{ts}.{}.{n}", std::process::id()))
}

/// Move a damaged store aside so the next write starts a fresh one.
///
/// Recorded endpoints in the old file are kept for manual recovery, never deleted.
pub fn quarantine_corrupt_file(path: &Utf8Path) -> std::io::Result<Option<Utf8PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let target = quarantine_path(path);
    std::fs::rename(path, &target)?;
    tracing::warn!("endpoint store {} is unreadable, moved to {}", path, target);
    Ok(Some(target))
}
