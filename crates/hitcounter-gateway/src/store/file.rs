//! File-backed counter store.
//!
//! Layout: one JSON line per committed increment, `{"key": .., "hits": ..}`,
//! where `hits` is the absolute post-increment value. Replay keeps the largest
//! value seen per key, so a record is self-contained and the log can be
//! compacted to one line per key at any time.
//!
//! Write path (serialized on one writer):
//! 1. wait for the writer, bounded by `lock_timeout` (nothing written yet)
//! 2. append the record and `sync_data`
//! 3. publish the new value to the in-memory view and return it
//!
//! A failed append is rolled back by truncating to the last committed length.
//! If the rollback itself fails the writer is poisoned and every later
//! increment reports `StoreUnavailable` until the store is reopened.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_core::{CounterRecord, RouteKey};

use super::CounterStore;

struct LogWriter {
    file: File,
    committed_len: u64,
    poisoned: bool,
}

impl LogWriter {
    /// Truncate back to the last committed length. Returns false (and poisons
    /// the writer) when the file is left in an unknown state.
    async fn rollback(&mut self) -> bool {
        match self.file.set_len(self.committed_len).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, committed_len = self.committed_len, "counter log truncate failed");
                self.poisoned = true;
                false
            }
        }
    }
}

pub struct FileCounterStore {
    path: PathBuf,
    hits: DashMap<RouteKey, u64>,
    writer: Mutex<LogWriter>,
    lock_timeout: Duration,
}

impl FileCounterStore {
    /// Replay and compact the log at `path` (created if missing), then open it
    /// for appends.
    ///
    /// Fails with `Internal`, leaving the file untouched, when a line other
    /// than an unterminated tail cannot be read.
    pub async fn open(path: impl AsRef<Path>, lock_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let hits = replay(&path).await?;
        compact(&path, &hits).await?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| HitCounterError::Internal(format!("open counter log failed: {e}")))?;
        let committed_len = file
            .metadata()
            .await
            .map_err(|e| HitCounterError::Internal(format!("stat counter log failed: {e}")))?
            .len();

        tracing::info!(path = %path.display(), keys = hits.len(), bytes = committed_len, "counter log opened");

        Ok(Self {
            path,
            hits,
            writer: Mutex::new(LogWriter {
                file,
                committed_len,
                poisoned: false,
            }),
            lock_timeout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CounterStore for FileCounterStore {
    async fn increment(&self, key: &RouteKey) -> Result<u64> {
        let mut w = tokio::time::timeout(self.lock_timeout, self.writer.lock())
            .await
            .map_err(|_| HitCounterError::StoreUnavailable("counter log writer busy".into()))?;

        if w.poisoned {
            return Err(HitCounterError::StoreUnavailable(
                "counter log is in an unknown state; reopen required".into(),
            ));
        }

        let next = self.hits.get(key).map_or(0, |h| *h) + 1;
        let mut line = serde_json::to_vec(&CounterRecord::new(key.clone(), next))
            .map_err(|e| HitCounterError::StoreUnavailable(format!("encode record failed: {e}")))?;
        line.push(b'\n');

        if let Err(e) = append_synced(&mut w.file, &line).await {
            if !w.rollback().await {
                tracing::error!(path = %self.path.display(), "counter log rollback failed; writer poisoned");
            }
            return Err(HitCounterError::StoreUnavailable(format!(
                "append counter record failed: {e}"
            )));
        }

        w.committed_len += line.len() as u64;
        self.hits.insert(key.clone(), next);
        Ok(next)
    }

    async fn get(&self, key: &RouteKey) -> Result<Option<u64>> {
        Ok(self.hits.get(key).map(|h| *h))
    }

    async fn list(&self) -> Result<Vec<CounterRecord>> {
        Ok(self
            .hits
            .iter()
            .map(|r| CounterRecord::new(r.key().clone(), *r.value()))
            .collect())
    }
}

async fn append_synced(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line).await?;
    file.flush().await?;
    file.sync_data().await
}

/// Rebuild the committed view from the log.
///
/// Only the final segment may be unreadable, and only when it has no trailing
/// newline: that is a torn append which never confirmed an increment. Any other
/// unreadable line may hold a committed count, so replay refuses to continue
/// and the log is left as-is for inspection.
async fn replay(path: &Path) -> Result<DashMap<RouteKey, u64>> {
    let hits = DashMap::new();

    let raw = match fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(hits),
        Err(e) => {
            return Err(HitCounterError::Internal(format!(
                "read counter log failed: {e}"
            )))
        }
    };

    let segments: Vec<&[u8]> = raw.split(|b| *b == b'\n').collect();
    let last = segments.len().saturating_sub(1);

    for (idx, line) in segments.iter().enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<CounterRecord>(line) {
            Ok(rec) => {
                let mut e = hits.entry(rec.key).or_insert(0u64);
                if rec.hits > *e {
                    *e = rec.hits;
                }
            }
            // `split` yields the bytes after the last '\n' as the final segment,
            // so a non-empty final segment is exactly an unterminated tail.
            Err(_) if idx == last => {
                tracing::warn!(path = %path.display(), bytes = line.len(), "dropping torn tail of counter log");
            }
            Err(e) => {
                return Err(HitCounterError::Internal(format!(
                    "counter log {} is corrupt at line {}: {e}",
                    path.display(),
                    idx + 1
                )))
            }
        }
    }

    Ok(hits)
}

/// Rewrite the log as one line per key: temp file, fsync, rename.
async fn compact(path: &Path, hits: &DashMap<RouteKey, u64>) -> Result<()> {
    let mut records: Vec<CounterRecord> = hits
        .iter()
        .map(|r| CounterRecord::new(r.key().clone(), *r.value()))
        .collect();
    records.sort_by(|a, b| a.key.cmp(&b.key));

    let mut buf = Vec::new();
    for rec in &records {
        serde_json::to_writer(&mut buf, rec)
            .map_err(|e| HitCounterError::Internal(format!("encode record failed: {e}")))?;
        buf.push(b'\n');
    }

    let tmp_path = tmp_path_for(path);
    let compact_err = |e: std::io::Error| HitCounterError::Internal(format!("compact counter log failed: {e}"));

    let mut out = File::create(&tmp_path).await.map_err(compact_err)?;
    out.write_all(&buf).await.map_err(compact_err)?;
    out.flush().await.map_err(compact_err)?;
    out.sync_all().await.map_err(compact_err)?;
    drop(out);
    fs::rename(&tmp_path, path).await.map_err(compact_err)?;
    sync_parent_dir(path).await.map_err(compact_err)?;

    tracing::info!(path = %path.display(), keys = records.len(), "counter log compacted");
    Ok(())
}

/// Make the rename itself durable.
async fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(dir).await?.sync_all().await
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}
