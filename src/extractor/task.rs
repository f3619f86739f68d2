use crate::config::{Config, FileGroup};
use crate::error::{Result, UnitError, UntarError};
use crate::extractor::pipeline::UnpackStats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A file group after existence filtering: the sources that will be
/// attempted, in declared order, and the ones that were dropped.
#[derive(Debug, Clone)]
pub struct FilteredGroup {
    pub dest: PathBuf,
    pub sources: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// Drop declared sources that do not exist on disk, preserving the
/// relative order of the ones that do. Missing sources are returned for
/// warning and reporting; they are never an error.
pub fn filter_sources(group: &FileGroup) -> FilteredGroup {
    let (sources, missing) = group.src.iter().cloned().partition(|path| path.exists());

    FilteredGroup {
        dest: group.dest.clone(),
        sources,
        missing,
    }
}

/// Terminal record of one extraction unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub gunzip: bool,
    #[serde(flatten)]
    pub status: UnitStatus,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Extracted { entries: u64, skipped: u64 },
    Failed { stage: String, error: String },
}

impl UnitOutcome {
    pub fn extracted(
        source: PathBuf,
        dest: PathBuf,
        gunzip: bool,
        stats: UnpackStats,
        duration: Duration,
    ) -> Self {
        Self {
            source,
            dest,
            gunzip,
            status: UnitStatus::Extracted {
                entries: stats.entries_written,
                skipped: stats.entries_skipped,
            },
            duration,
        }
    }

    pub fn failed(
        source: PathBuf,
        dest: PathBuf,
        gunzip: bool,
        error: &UnitError,
        duration: Duration,
    ) -> Self {
        Self {
            source,
            dest,
            gunzip,
            status: UnitStatus::Failed {
                stage: error.stage().to_string(),
                error: error.to_string(),
            },
            duration,
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self.status, UnitStatus::Extracted { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    pub mode: Option<String>,
    pub groups: usize,
}

impl ConfigSnapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.mode.clone(),
            groups: config.groups.len(),
        }
    }
}

/// Task-level aggregation of unit outcomes. The report is informational:
/// unit failures are listed here, never propagated as task failure.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub missing_sources: Vec<PathBuf>,
    pub units: Vec<UnitOutcome>,
    pub config_used: ConfigSnapshot,
}

impl TaskReport {
    pub fn new(config_used: ConfigSnapshot) -> Self {
        Self {
            started_at: Utc::now(),
            duration: Duration::ZERO,
            missing_sources: Vec::new(),
            units: Vec::new(),
            config_used,
        }
    }

    pub fn record_missing(&mut self, path: &Path) {
        self.missing_sources.push(path.to_path_buf());
    }

    pub fn record(&mut self, outcome: UnitOutcome) {
        self.units.push(outcome);
    }

    pub fn finish(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn extracted_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_extracted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.units.len() - self.extracted_count()
    }

    pub fn total_entries(&self) -> u64 {
        self.units
            .iter()
            .map(|u| match u.status {
                UnitStatus::Extracted { entries, .. } => entries,
                UnitStatus::Failed { .. } => 0,
            })
            .sum()
    }

    /// Write the report as pretty JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_content = serde_json::to_string_pretty(self).map_err(|e| UntarError::Config {
            message: format!("Failed to serialize report to JSON: {}", e),
        })?;

        fs::write(path.as_ref(), json_content).map_err(UntarError::Io)?;

        Ok(())
    }
}
