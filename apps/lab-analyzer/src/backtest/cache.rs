//! On-disk cache of raw backtest results.
//!
//! Raw vendor results are stored as JSON files keyed by identifier:
//!
//! ```text
//! <root>/<lab_id>/<backtest_id>.json
//! ```
//!
//! Files written by older tooling may sit directly under the root, or hold an
//! array of backtest objects instead of a single one; both are accepted on
//! read. Bulk loads skip unreadable files with a warning so one corrupt file
//! does not stop a batch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// File extension of cached results.
pub const CACHE_EXTENSION: &str = "json";

/// Errors from cache access.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem error.
    #[error("Cache I/O error at '{path}': {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// File is not valid JSON.
    #[error("Invalid JSON in '{path}': {source}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Identifier cannot be used as a file name.
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    /// No cached result for the identifier.
    #[error("Backtest '{0}' not found in cache")]
    NotFound(String),
}

/// One raw backtest record loaded from the cache.
#[derive(Debug, Clone)]
pub struct CachedRecord {
    /// File the record was read from.
    pub source: PathBuf,
    /// Lab identifier implied by the parent directory, if any.
    pub lab_hint: Option<String>,
    /// Backtest identifier implied by the file name.
    pub id_hint: String,
    /// Raw vendor payload.
    pub raw: Value,
}

/// Outcome of a bulk load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Records successfully read.
    pub records: Vec<CachedRecord>,
    /// Files visited.
    pub files_scanned: usize,
    /// Files skipped because they could not be read or parsed.
    pub files_failed: usize,
}

/// Directory-backed backtest cache.
#[derive(Debug, Clone)]
pub struct BacktestCache {
    root: PathBuf,
}

impl BacktestCache {
    /// Open a cache rooted at `root`. The directory need not exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every cached result file, sorted by path.
    pub fn scan(&self) -> Result<Vec<PathBuf>, CacheError> {
        scan_json_files(&self.root)
    }

    /// List the result files of one lab, sorted by path.
    pub fn scan_lab(&self, lab_id: &str) -> Result<Vec<PathBuf>, CacheError> {
        validate_key(lab_id)?;
        scan_json_files(&self.root.join(lab_id))
    }

    /// Read one cache file into its records.
    pub fn load_file(&self, path: &Path) -> Result<Vec<CachedRecord>, CacheError> {
        let contents = fs::read_to_string(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&contents).map_err(|source| CacheError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let lab_hint = self.lab_hint(path);

        let records = match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, raw)| CachedRecord {
                    source: path.to_path_buf(),
                    lab_hint: lab_hint.clone(),
                    id_hint: format!("{stem}[{index}]"),
                    raw,
                })
                .collect(),
            raw => vec![CachedRecord {
                source: path.to_path_buf(),
                lab_hint,
                id_hint: stem,
                raw,
            }],
        };

        Ok(records)
    }

    /// Load every cached record, skipping unreadable files.
    pub fn load_all(&self) -> Result<LoadReport, CacheError> {
        let files = self.scan()?;
        Ok(self.load_files(&files))
    }

    /// Load the cached records of one lab, skipping unreadable files.
    pub fn load_lab(&self, lab_id: &str) -> Result<LoadReport, CacheError> {
        let files = self.scan_lab(lab_id)?;
        Ok(self.load_files(&files))
    }

    /// Find the cached record of one backtest.
    ///
    /// Looks for a file named after the identifier first, then falls back to
    /// reading every file and matching the record's own identifier.
    pub fn find(&self, backtest_id: &str) -> Result<CachedRecord, CacheError> {
        validate_key(backtest_id)?;
        let files = self.scan()?;

        let by_name = files
            .iter()
            .filter(|p| p.file_stem().and_then(|s| s.to_str()) == Some(backtest_id));
        for path in by_name {
            if let Some(record) = self.load_file(path)?.into_iter().next() {
                return Ok(record);
            }
        }

        self.load_files(&files)
            .records
            .into_iter()
            .find(|record| record_id(&record.raw).as_deref() == Some(backtest_id))
            .ok_or_else(|| CacheError::NotFound(backtest_id.to_string()))
    }

    /// Write a raw record to `<root>/<lab_id>/<backtest_id>.json`.
    pub fn store(&self, lab_id: &str, backtest_id: &str, raw: &Value) -> Result<PathBuf, CacheError> {
        validate_key(lab_id)?;
        validate_key(backtest_id)?;

        let dir = self.root.join(lab_id);
        fs::create_dir_all(&dir).map_err(|source| CacheError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(format!("{backtest_id}.{CACHE_EXTENSION}"));
        let contents = serde_json::to_string_pretty(raw).map_err(|source| CacheError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, contents).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Stored backtest in cache");
        Ok(path)
    }

    fn load_files(&self, files: &[PathBuf]) -> LoadReport {
        let mut report = LoadReport {
            files_scanned: files.len(),
            ..LoadReport::default()
        };

        for path in files {
            match self.load_file(path) {
                Ok(records) => report.records.extend(records),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable cache file");
                    report.files_failed += 1;
                }
            }
        }

        info!(
            root = %self.root.display(),
            files = report.files_scanned,
            failed = report.files_failed,
            records = report.records.len(),
            "Loaded cached backtests"
        );
        report
    }

    fn lab_hint(&self, path: &Path) -> Option<String> {
        let parent = path.parent()?;
        if parent == self.root.as_path() {
            return None;
        }
        parent
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}

/// Identifier a raw record carries for itself, if any.
fn record_id(raw: &Value) -> Option<String> {
    ["backtest_id", "id"]
        .iter()
        .find_map(|key| raw.get(*key))
        .and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\'])
        && !key.contains('\0');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

fn scan_json_files(dir: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let mut files = Vec::new();
    if dir.is_dir() {
        scan_directory(dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn scan_directory(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), CacheError> {
    let entries = fs::read_dir(dir).map_err(|source| CacheError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_store_and_find() {
        let dir = tempdir().unwrap();
        let cache = BacktestCache::new(dir.path());

        let raw = json!({"backtest_id": "bt-1", "trades": []});
        let path = cache.store("lab-a", "bt-1", &raw).unwrap();
        assert_eq!(path, dir.path().join("lab-a").join("bt-1.json"));

        let record = cache.find("bt-1").unwrap();
        assert_eq!(record.raw, raw);
        assert_eq!(record.lab_hint.as_deref(), Some("lab-a"));
        assert_eq!(record.id_hint, "bt-1");
    }

    #[test]
    fn test_find_by_embedded_id() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("dump.json"),
            r#"[{"backtest_id": "x"}, {"backtest_id": "y"}]"#,
        )
        .unwrap();

        let cache = BacktestCache::new(dir.path());
        let record = cache.find("y").unwrap();
        assert_eq!(record.id_hint, "dump[1]");
        assert_eq!(record.lab_hint, None);

        assert!(matches!(cache.find("z"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_load_all_skips_corrupt_files() {
        let dir = tempdir().unwrap();
        let cache = BacktestCache::new(dir.path());
        cache.store("lab-a", "bt-1", &json!({"id": 1})).unwrap();
        cache.store("lab-b", "bt-2", &json!({"id": 2})).unwrap();
        fs::write(dir.path().join("lab-b").join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("lab-b").join("notes.txt"), "ignored").unwrap();

        let report = cache.load_all().unwrap();
        assert_eq!(report.files_scanned, 3);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.records.len(), 2);

        let lab = cache.load_lab("lab-a").unwrap();
        assert_eq!(lab.records.len(), 1);
        assert_eq!(lab.records[0].raw, json!({"id": 1}));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let cache = BacktestCache::new(dir.path().join("absent"));
        assert!(cache.scan().unwrap().is_empty());
        assert_eq!(cache.load_all().unwrap().records.len(), 0);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let cache = BacktestCache::new(dir.path());
        for key in ["", "..", "a/b", "a\\b"] {
            assert!(matches!(
                cache.store(key, "bt", &json!({})),
                Err(CacheError::InvalidKey(_))
            ));
        }
    }
}
