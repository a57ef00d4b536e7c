//! JSON snapshot persistence for the event store.
//!
//! The whole store is written as one pretty-printed JSON document. Saves go
//! to a temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written snapshot behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};
use crate::store::{EventStore, StoredEvent};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    events: &'a [StoredEvent],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    events: Vec<StoredEvent>,
}

/// Loads a store from `path`.
///
/// A missing file yields an empty store.
pub fn load(path: &Path) -> ServerResult<EventStore> {
    if !path.exists() {
        debug!(path = %path.display(), "No snapshot, starting empty");
        return Ok(EventStore::new());
    }

    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
        ServerError::snapshot(path.display().to_string(), format!("invalid JSON: {}", e))
    })?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(ServerError::snapshot(
            path.display().to_string(),
            format!(
                "unsupported version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            ),
        ));
    }

    debug!(path = %path.display(), events = snapshot.events.len(), "Loaded snapshot");
    Ok(EventStore::from_events(snapshot.events))
}

/// Writes `store` to `path`, creating parent directories as needed.
pub fn save(store: &EventStore, path: &Path) -> ServerResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        events: store.events(),
    };
    let mut content = serde_json::to_string_pretty(&snapshot)?;
    content.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, content)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(path = %path.display(), events = store.len(), "Saved snapshot");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "events.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};
    use eventscheduler_core::Weekdays;

    fn event(id: &str) -> StoredEvent {
        StoredEvent {
            id: id.to_string(),
            name: format!("Event {id}"),
            start_time: FixedOffset::west_opt(5 * 3600)
                .unwrap()
                .with_ymd_and_hms(2030, 6, 3, 9, 0, 0)
                .unwrap(),
            duration: 45,
            is_recurring: true,
            recurring_days: Weekdays::from_indices([1, 3]),
            created_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Some(Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("events.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.json");
        let store = EventStore::from_events(vec![event("a"), event("b")]);

        save(&store, &path).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.events()[1].start_time.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        save(&EventStore::from_events(vec![event("a")]), &path).unwrap();
        save(&EventStore::new(), &path).unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn written_as_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        save(&EventStore::from_events(vec![event("a")]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \"version\": 1,"));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["events"][0]["recurring_days"], serde_json::json!([1, 3]));
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, r#"{"version": 2, "events": []}"#).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ServerError::Snapshot { .. }));
        assert!(err.to_string().contains("unsupported version 2"));
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
