//! JSON file persistence for cases, debates, and win statistics.
//!
//! Two files under the data directory: `debates.json` (cases plus full
//! transcripts) and `statistics.json` (running win counters). Writes go
//! through a single process-wide mutex and rewrite the whole file, which
//! is fine at the scale of hand-entered cases. Corrupt or missing files
//! load as empty rather than aborting startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Settings;
use crate::orchestrator::short_id;
use crate::transcript::{Case, DebateStatus, DebateTranscript};
use crate::verdict::Winner;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unknown case: {0}")]
    UnknownCase(String),
    #[error("unknown debate: {0}")]
    UnknownDebate(String),
}

/// A registered case with its assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCase {
    pub id: String,
    pub case: Case,
    pub created_at: DateTime<Utc>,
}

/// A debate transcript linked back to the case it was run for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRecord {
    pub case_id: String,
    pub transcript: DebateTranscript,
}

/// One row of `list_debates` output.
#[derive(Debug, Clone, Serialize)]
pub struct DebateSummary {
    pub id: String,
    pub case_id: String,
    pub title: String,
    pub status: DebateStatus,
    pub winner: Winner,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate win counters. Only completed debates count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub emotional_wins: u64,
    pub logical_wins: u64,
    pub total_debates: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DebatesFile {
    cases: BTreeMap<String, StoredCase>,
    debates: BTreeMap<String, DebateRecord>,
}

pub struct DebateStore {
    debates_path: PathBuf,
    statistics_path: PathBuf,
    lock: Mutex<()>,
}

impl DebateStore {
    pub fn new(settings: &Settings) -> Self {
        Self {
            debates_path: settings.debates_path.clone(),
            statistics_path: settings.statistics_path.clone(),
            lock: Mutex::new(()),
        }
    }

    /// Register a case and return it with its generated id.
    pub fn create_case(&self, case: Case) -> Result<StoredCase, StoreError> {
        let _guard = self.guard();
        let mut file = load_or_default::<DebatesFile>(&self.debates_path);
        let stored = StoredCase {
            id: short_id("case"),
            case,
            created_at: Utc::now(),
        };
        file.cases.insert(stored.id.clone(), stored.clone());
        write_json(&self.debates_path, &file)?;
        Ok(stored)
    }

    pub fn get_case(&self, case_id: &str) -> Result<StoredCase, StoreError> {
        let _guard = self.guard();
        let file = load_or_default::<DebatesFile>(&self.debates_path);
        file.cases
            .get(case_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCase(case_id.to_string()))
    }

    /// Persist a freshly created pending transcript so the debate is
    /// visible (and recoverable) before any round has run.
    pub fn insert_pending(
        &self,
        case_id: &str,
        transcript: &DebateTranscript,
    ) -> Result<(), StoreError> {
        let _guard = self.guard();
        let mut file = load_or_default::<DebatesFile>(&self.debates_path);
        if !file.cases.contains_key(case_id) {
            return Err(StoreError::UnknownCase(case_id.to_string()));
        }
        file.debates.insert(
            transcript.id.clone(),
            DebateRecord {
                case_id: case_id.to_string(),
                transcript: transcript.clone(),
            },
        );
        write_json(&self.debates_path, &file)
    }

    /// Replace the stored transcript with its final state and, for a
    /// completed debate, bump the win counters. Failed debates are kept
    /// but never counted.
    pub fn apply_transcript(&self, transcript: &DebateTranscript) -> Result<(), StoreError> {
        let _guard = self.guard();
        let mut file = load_or_default::<DebatesFile>(&self.debates_path);
        let record = file
            .debates
            .get_mut(&transcript.id)
            .ok_or_else(|| StoreError::UnknownDebate(transcript.id.clone()))?;
        record.transcript = transcript.clone();
        write_json(&self.debates_path, &file)?;

        if transcript.status == DebateStatus::Complete {
            let mut stats = load_or_default::<Statistics>(&self.statistics_path);
            stats.total_debates += 1;
            match transcript.verdict.winner {
                Winner::Emotional => stats.emotional_wins += 1,
                Winner::Logical => stats.logical_wins += 1,
                Winner::Tie => {}
            }
            write_json(&self.statistics_path, &stats)?;
        }
        Ok(())
    }

    pub fn get_debate(&self, debate_id: &str) -> Result<DebateRecord, StoreError> {
        let _guard = self.guard();
        let file = load_or_default::<DebatesFile>(&self.debates_path);
        file.debates
            .get(debate_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownDebate(debate_id.to_string()))
    }

    /// All debates, newest first.
    pub fn list_debates(&self) -> Vec<DebateSummary> {
        let _guard = self.guard();
        let file = load_or_default::<DebatesFile>(&self.debates_path);
        let mut rows: Vec<DebateSummary> = file
            .debates
            .values()
            .map(|r| DebateSummary {
                id: r.transcript.id.clone(),
                case_id: r.case_id.clone(),
                title: r.transcript.case.title.clone(),
                status: r.transcript.status,
                winner: r.transcript.verdict.winner,
                timestamp: r.transcript.timestamp,
            })
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }

    pub fn statistics(&self) -> Statistics {
        let _guard = self.guard();
        load_or_default::<Statistics>(&self.statistics_path)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another thread panicked mid-write;
        // the file contents are still the source of truth.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn load_or_default<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!("ignoring corrupt store file {}: {}", path.display(), e);
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}
