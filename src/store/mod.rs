//! Persistent session store
//!
//! One JSON file per session, keyed by session id. Writes are atomic
//! (temp file then rename) and last-write-wins on duplicate ids. All
//! cross-session statistics are computed fresh from disk on every call;
//! corpora are small by construction, so correctness beats caching.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::{PersistenceError, Result, TelemetryError};
use crate::session::{SessionRecord, SessionSummary};

/// Aggregate statistics over every stored session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateStatistics {
    pub total_sessions: usize,
    pub total_duration_seconds: f64,
    pub total_damage: f64,
    pub total_xp: f64,
    /// Mean of per-session DPS values
    pub average_dps: f64,
    pub average_xp_per_session: f64,
}

impl AggregateStatistics {
    fn empty() -> Self {
        Self {
            total_sessions: 0,
            total_duration_seconds: 0.0,
            total_damage: 0.0,
            total_xp: 0.0,
            average_dps: 0.0,
            average_xp_per_session: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

/// Side-by-side comparison of selected sessions
#[derive(Clone, Debug, Serialize)]
pub struct ComparisonReport {
    pub session_ids: Vec<String>,
    pub dps_range: MetricRange,
    pub xp_per_hour_range: MetricRange,
    /// Session id with the highest DPS
    pub best_performing_session: String,
}

/// File-backed store of finalized session records
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(PersistenceError::from)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Session ids double as file names, so they must be non-empty and
    /// limited to `[A-Za-z0-9._-]`. Rejecting instead of remapping keeps
    /// distinct ids pointing at distinct files.
    fn path_for(&self, session_id: &str) -> Result<PathBuf> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(TelemetryError::InvalidEvent(format!(
                "session id {:?} is not usable as a store key",
                session_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", session_id)))
    }

    /// Persist a record. Overwrites an existing record with the same id
    /// (last write wins) and logs the overwrite as a warning.
    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        let path = self.path_for(&record.summary.session_id)?;
        if path.exists() {
            tracing::warn!(
                session_id = %record.summary.session_id,
                "overwriting existing session record"
            );
        }

        self.write_atomic(&path, record)?;
        tracing::debug!(session_id = %record.summary.session_id, path = %path.display(), "session saved");
        Ok(())
    }

    fn write_atomic(&self, path: &Path, record: &SessionRecord) -> Result<()> {
        let write = || -> std::result::Result<(), PersistenceError> {
            let json = serde_json::to_vec_pretty(record)?;
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, path)?;
            Ok(())
        };
        write().map_err(TelemetryError::from)
    }

    /// Load one record by id; `None` when no such session is stored
    pub fn load(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let path = self.path_for(session_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let read = || -> std::result::Result<SessionRecord, PersistenceError> {
            let bytes = fs::read(&path)?;
            Ok(serde_json::from_slice(&bytes)?)
        };
        Ok(Some(read().map_err(TelemetryError::from)?))
    }

    /// Remove one record; true if it existed
    pub fn delete(&self, session_id: &str) -> Result<bool> {
        let path = self.path_for(session_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(PersistenceError::from)?;
        Ok(true)
    }

    /// Every stored record, in deterministic (lexicographic file) order.
    /// Unreadable files are skipped with a warning rather than failing
    /// the whole corpus.
    pub fn load_all(&self) -> Result<Vec<SessionRecord>> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(PersistenceError::from)? {
            let entry = entry.map_err(PersistenceError::from)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let read = || -> std::result::Result<SessionRecord, PersistenceError> {
                let bytes = fs::read(&path)?;
                Ok(serde_json::from_slice(&bytes)?)
            };
            match read() {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable session record");
                }
            }
        }
        Ok(records)
    }

    pub fn session_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|r| r.summary.session_id)
            .collect())
    }

    /// Fresh aggregate over every stored summary
    pub fn aggregate_statistics(&self) -> Result<AggregateStatistics> {
        let records = self.load_all()?;
        if records.is_empty() {
            return Ok(AggregateStatistics::empty());
        }

        let count = records.len();
        let mut stats = AggregateStatistics::empty();
        stats.total_sessions = count;
        for record in &records {
            let s = &record.summary;
            stats.total_duration_seconds += s.duration;
            stats.total_damage += s.total_damage;
            stats.total_xp += s.total_xp;
            stats.average_dps += s.dps;
        }
        stats.average_dps /= count as f64;
        stats.average_xp_per_session = stats.total_xp / count as f64;
        Ok(stats)
    }

    /// The `n` most recently ended sessions, newest first.
    ///
    /// Ties on end time keep the store's deterministic listing order,
    /// which stands in for insertion order.
    pub fn recent(&self, n: usize) -> Result<Vec<SessionSummary>> {
        let mut summaries: Vec<SessionSummary> = self
            .load_all()?
            .into_iter()
            .map(|r| r.summary)
            .collect();
        summaries.sort_by(|a, b| {
            b.end_time
                .partial_cmp(&a.end_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        summaries.truncate(n);
        Ok(summaries)
    }

    /// Compare the selected sessions on DPS and XP rate.
    ///
    /// Ids that do not resolve are ignored; fewer than 2 resolvable
    /// sessions is an `EmptySelection` error.
    pub fn compare(&self, session_ids: &[String]) -> Result<ComparisonReport> {
        let mut resolved: Vec<SessionSummary> = Vec::new();
        for id in session_ids {
            if let Some(record) = self.load(id)? {
                resolved.push(record.summary);
            } else {
                tracing::warn!(session_id = %id, "comparison target not found");
            }
        }

        if resolved.len() < 2 {
            return Err(TelemetryError::EmptySelection {
                resolved: resolved.len(),
            });
        }

        let mut dps_range = MetricRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        let mut xp_range = dps_range;
        let mut best = &resolved[0];
        for summary in &resolved {
            dps_range.min = dps_range.min.min(summary.dps);
            dps_range.max = dps_range.max.max(summary.dps);
            xp_range.min = xp_range.min.min(summary.xp_per_hour);
            xp_range.max = xp_range.max.max(summary.xp_per_hour);
            if summary.dps > best.dps {
                best = summary;
            }
        }

        Ok(ComparisonReport {
            session_ids: resolved.iter().map(|s| s.session_id.clone()).collect(),
            dps_range,
            xp_per_hour_range: xp_range,
            best_performing_session: best.session_id.clone(),
        })
    }
}
