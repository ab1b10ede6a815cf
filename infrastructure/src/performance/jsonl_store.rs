//! JSONL file store for model performance records.
//!
//! Each [`PerformanceRecord`] is serialized as a single JSON line and
//! appended to the file. Existing lines are read once at open time; stats
//! are computed from memory. Only records inside the retention period are
//! kept in memory; the file itself is never rewritten.

use chrono::{Duration, Utc};
use reasoning_application::ports::performance_store::{
    ModelStats, PerformanceRecord, PerformanceStore, aggregate,
};
use reasoning_domain::QueryCategory;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Records older than this are dropped from memory.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Append-only JSONL performance store.
///
/// Thread-safe via `Mutex`. Flushes after every record and on `Drop`.
pub struct JsonlPerformanceStore {
    writer: Mutex<BufWriter<File>>,
    records: Mutex<Vec<PerformanceRecord>>,
    path: PathBuf,
    retention: Duration,
}

impl JsonlPerformanceStore {
    /// Open (or create) the store at `path`.
    ///
    /// Creates parent directories if needed. Unparseable lines are skipped.
    /// Returns `None` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        Self::open_with_retention(path, Duration::days(DEFAULT_RETENTION_DAYS))
    }

    /// Like [`open`](Self::open), keeping records no older than `retention`.
    pub fn open_with_retention(path: impl AsRef<Path>, retention: Duration) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create performance log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let mut records = Self::read_existing(path);
        let loaded = records.len();
        prune_expired(&mut records, retention);

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open performance log {}: {}", path.display(), e);
                return None;
            }
        };

        debug!(
            path = %path.display(),
            records = records.len(),
            expired = loaded - records.len(),
            "Opened performance log"
        );
        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            records: Mutex::new(records),
            path: path.to_path_buf(),
            retention,
        })
    }

    fn read_existing(path: &Path) -> Vec<PerformanceRecord> {
        let Ok(file) = File::open(path) else {
            return Vec::new();
        };

        let mut skipped = 0usize;
        let records: Vec<PerformanceRecord> = BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(&line) {
                Ok(record) => Some(record),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            warn!(path = %path.display(), skipped, "Skipped malformed performance records");
        }
        records
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PerformanceStore for JsonlPerformanceStore {
    fn record(&self, record: PerformanceRecord) {
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                warn!(path = %self.path.display(), error = %e, "Could not write performance record");
            }
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    /// Windows longer than the retention period only see retained records.
    fn stats(&self, category: QueryCategory, window: Duration) -> Vec<ModelStats> {
        let cutoff = Utc::now() - window;
        let Ok(mut records) = self.records.lock() else {
            return Vec::new();
        };
        prune_expired(&mut records, self.retention);
        aggregate(
            records
                .iter()
                .filter(|r| r.category == category && r.timestamp >= cutoff),
        )
    }
}

fn prune_expired(records: &mut Vec<PerformanceRecord>, retention: Duration) {
    let cutoff = Utc::now() - retention;
    records.retain(|r| r.timestamp >= cutoff);
}

impl Drop for JsonlPerformanceStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reasoning_domain::{ModelTarget, ProviderKind};

    fn flash() -> ModelTarget {
        ModelTarget::new(ProviderKind::Gemini, "gemini-2.5-flash")
    }

    fn llama() -> ModelTarget {
        ModelTarget::new(ProviderKind::Ollama, "llama3.1:8b")
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("perf.jsonl");

        {
            let store = JsonlPerformanceStore::open(&path).unwrap();
            store.record(PerformanceRecord::new(flash(), QueryCategory::Math, true, 120));
            store.record(PerformanceRecord::new(llama(), QueryCategory::Math, false, 900));
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        for line in content.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("model").is_some());
        }

        let reopened = JsonlPerformanceStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf.jsonl");
        let good = serde_json::to_string(&PerformanceRecord::new(
            flash(),
            QueryCategory::General,
            true,
            10,
        ))
        .unwrap();
        std::fs::write(&path, format!("{}\nnot json\n\n", good)).unwrap();

        let store = JsonlPerformanceStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stats_filter_category_and_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlPerformanceStore::open(dir.path().join("perf.jsonl")).unwrap();

        let mut stale = PerformanceRecord::new(llama(), QueryCategory::Math, true, 50);
        stale.timestamp = Utc::now() - Duration::days(45);
        store.record(stale);
        store.record(PerformanceRecord::new(flash(), QueryCategory::Math, true, 100));
        store.record(PerformanceRecord::new(flash(), QueryCategory::Math, false, 300));
        store.record(PerformanceRecord::new(llama(), QueryCategory::Writing, true, 80));

        let stats = store.stats(QueryCategory::Math, Duration::days(30));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].model, flash());
        assert_eq!(stats[0].samples, 2);
        assert_eq!(stats[0].success_rate(), 0.5);
        assert_eq!(stats[0].mean_latency_ms, 200.0);
    }

    #[test]
    fn test_best_model_needs_min_samples() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlPerformanceStore::open(dir.path().join("perf.jsonl")).unwrap();
        for latency in [100, 120] {
            store.record(PerformanceRecord::new(flash(), QueryCategory::Coding, true, latency));
        }
        assert!(store.best_model(QueryCategory::Coding, Duration::days(30), 3).is_none());

        store.record(PerformanceRecord::new(flash(), QueryCategory::Coding, true, 110));
        assert_eq!(
            store.best_model(QueryCategory::Coding, Duration::days(30), 3),
            Some(flash())
        );
    }

    #[test]
    fn test_expired_records_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perf.jsonl");
        let mut old = PerformanceRecord::new(llama(), QueryCategory::Math, true, 50);
        old.timestamp = Utc::now() - Duration::days(45);
        let fresh = PerformanceRecord::new(flash(), QueryCategory::Math, true, 100);
        std::fs::write(
            &path,
            format!(
                "{}\n{}\n",
                serde_json::to_string(&old).unwrap(),
                serde_json::to_string(&fresh).unwrap()
            ),
        )
        .unwrap();

        let store = JsonlPerformanceStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);

        // the file keeps its history
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

        let mut aging = PerformanceRecord::new(llama(), QueryCategory::Math, true, 70);
        aging.timestamp = Utc::now() - Duration::days(40);
        store.record(aging);
        assert_eq!(store.len(), 2);

        let stats = store.stats(QueryCategory::Math, Duration::days(90));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].model, flash());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_custom_retention() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            JsonlPerformanceStore::open_with_retention(dir.path().join("perf.jsonl"), Duration::days(60))
                .unwrap();
        let mut record = PerformanceRecord::new(flash(), QueryCategory::Math, true, 100);
        record.timestamp = Utc::now() - Duration::days(45);
        store.record(record);

        assert_eq!(store.stats(QueryCategory::Math, Duration::days(60)).len(), 1);
        assert_eq!(store.len(), 1);
    }
}
