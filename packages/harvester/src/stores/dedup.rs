//! Per-project progress log of completed URLs.
//!
//! One plain-text file per project, one URL per line, append-only. The file
//! is loaded into memory once when the store is opened; appends go to both.

use regex::Regex;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, RwLock};
use tracing::{debug, info};

use crate::error::StoreResult;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").unwrap());

/// File-system-safe form of a project name.
pub fn sanitize_project_name(project: &str) -> String {
    UNSAFE_CHARS.replace_all(project, "_").into_owned()
}

/// Completed-URL set for one project, backed by an append-only log.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    seen: RwLock<HashSet<String>>,
    log: Mutex<File>,
}

impl DedupStore {
    /// Where the log for `project` lives under `dir`.
    pub fn log_path(dir: &Path, project: &str) -> PathBuf {
        dir.join(format!("processed_urls_{}.log", sanitize_project_name(project)))
    }

    /// Load (or create) the log for `project`.
    pub fn open(dir: &Path, project: &str) -> StoreResult<Self> {
        std::fs::create_dir_all(dir)?;
        let path = Self::log_path(dir, project);

        let mut seen = HashSet::new();
        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            for line in reader.lines() {
                let line = line?;
                let url = line.trim();
                if !url.is_empty() {
                    seen.insert(url.to_string());
                }
            }
            info!(project, completed = seen.len(), "Loaded progress log");
        } else {
            debug!(project, path = %path.display(), "No progress log yet");
        }

        let log = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            seen: RwLock::new(seen),
            log: Mutex::new(log),
        })
    }

    /// Delete the log for `project`. Returns whether a log existed.
    ///
    /// Must run before the session opens the store.
    pub fn clear(dir: &Path, project: &str) -> StoreResult<bool> {
        let path = Self::log_path(dir, project);
        if path.exists() {
            std::fs::remove_file(&path)?;
            info!(project, "Cleared progress log");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
    }

    /// Record `url` as completed. Recording a URL twice writes it once.
    pub fn record(&self, url: &str) -> StoreResult<()> {
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());

        if self.contains(url) {
            return Ok(());
        }

        log.write_all(format!("{}\n", url).as_bytes())?;
        log.flush()?;

        self.seen
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sanitize_project_name() {
        assert_eq!(sanitize_project_name("Pizzerie Roma/2024"), "Pizzerie_Roma_2024");
        assert_eq!(sanitize_project_name("ok_name-1"), "ok_name-1");
    }

    #[test]
    fn test_record_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = DedupStore::open(dir.path(), "roma").unwrap();
        store.record("https://maps.example/A").unwrap();
        store.record("https://maps.example/B").unwrap();
        store.record("https://maps.example/A").unwrap();
        drop(store);

        let reopened = DedupStore::open(dir.path(), "roma").unwrap();
        assert!(reopened.contains("https://maps.example/A"));
        assert!(reopened.contains("https://maps.example/B"));
        assert_eq!(reopened.len(), 2);

        let contents = std::fs::read_to_string(reopened.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_projects_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let roma = DedupStore::open(dir.path(), "roma").unwrap();
        let milano = DedupStore::open(dir.path(), "milano").unwrap();

        roma.record("https://maps.example/A").unwrap();
        assert!(!milano.contains("https://maps.example/A"));
    }

    #[test]
    fn test_clear_removes_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::open(dir.path(), "roma").unwrap();
        store.record("https://maps.example/A").unwrap();
        drop(store);

        assert!(DedupStore::clear(dir.path(), "roma").unwrap());
        assert!(!DedupStore::clear(dir.path(), "roma").unwrap());

        let fresh = DedupStore::open(dir.path(), "roma").unwrap();
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DedupStore::open(dir.path(), "roma").unwrap());

        let handles: Vec<_> = (0..6)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store
                            .record(&format!("https://maps.example/place/{}/{}", w, i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 600);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("https://maps.example/place/") && l.matches("https").count() == 1));
    }
}
