mod record;

pub use record::{Scenario, ScenarioSummary};

use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculator::{ScenarioInputs, SimulationResults};
use crate::error::{Result, RoiError};

/// Saved scenarios, kept as one JSON array in a single file.
///
/// Every operation reads the whole file and writes it back. There is no
/// locking; two processes editing the same file can lose each other's
/// writes.
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    path: PathBuf,
}

impl ScenarioStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw entries from the file. `None` means the file exists but does
    /// not hold a JSON array.
    fn read_entries(&self) -> Result<Option<Vec<Value>>> {
        if !self.path.exists() {
            return Ok(Some(Vec::new()));
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Vec<Value>>(&content) {
            Ok(entries) => Ok(Some(entries)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "scenario file is not a JSON array");
                Ok(None)
            }
        }
    }

    /// Entries to modify and write back. Refuses to proceed when the file
    /// is unreadable, so its contents are never replaced.
    fn entries_for_update(&self) -> Result<Vec<Value>> {
        self.read_entries()?
            .ok_or_else(|| RoiError::StoreCorrupt(self.path.clone()))
    }

    /// All well-formed records in insertion order. A missing or unreadable
    /// file reads as empty; entries that do not match the record shape are
    /// skipped here but kept on disk.
    pub fn read_all(&self) -> Result<Vec<Scenario>> {
        let entries = self.read_entries()?.unwrap_or_default();
        let total = entries.len();

        let all: Vec<Scenario> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
                Ok(scenario) => Some(scenario),
                Err(e) => {
                    warn!(path = %self.path.display(), index = idx, error = %e, "skipping malformed scenario");
                    None
                }
            })
            .collect();

        debug!(path = %self.path.display(), count = all.len(), total, "read scenarios");
        Ok(all)
    }

    fn write_entries(&self, entries: &[Value]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries).map_err(RoiError::Serialize)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), count = entries.len(), "wrote scenarios");
        Ok(())
    }

    /// Save a new scenario under a fresh id
    pub fn create(
        &self,
        name: &str,
        inputs: ScenarioInputs,
        results: SimulationResults,
    ) -> Result<Scenario> {
        if name.trim().is_empty() {
            return Err(RoiError::MissingScenarioName);
        }

        let now = Utc::now();
        let record = Scenario {
            id: Uuid::new_v4().to_string(),
            scenario_name: name.to_string(),
            inputs,
            results,
            created_at: now,
            updated_at: now,
        };

        let mut entries = self.entries_for_update()?;
        entries.push(serde_json::to_value(&record).map_err(RoiError::Serialize)?);
        self.write_entries(&entries)?;

        info!(id = %record.id, name = %record.scenario_name, "scenario created");
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<Option<Scenario>> {
        Ok(self.read_all()?.into_iter().find(|s| s.id == id))
    }

    pub fn list(&self) -> Result<Vec<ScenarioSummary>> {
        Ok(self.read_all()?.iter().map(ScenarioSummary::from).collect())
    }

    /// Remove a scenario; returns whether it existed
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut entries = self.entries_for_update()?;
        let before = entries.len();
        entries.retain(|entry| entry.get("id").and_then(Value::as_str) != Some(id));
        let existed = entries.len() != before;

        if existed {
            self.write_entries(&entries)?;
            info!(id, "scenario deleted");
        }
        Ok(existed)
    }

    /// Resolve a scenario reference to its id.
    /// Accepts either a 1-based index from 'list' (newest first) or the full id.
    pub fn resolve_id(&self, reference: &str) -> Result<String> {
        let all = self.read_all()?;

        if let Ok(idx) = reference.parse::<usize>() {
            if idx == 0 || idx > all.len() {
                return Err(RoiError::InvalidScenarioIndex(reference.to_string()));
            }
            return Ok(all[all.len() - idx].id.clone());
        }

        if all.iter().any(|s| s.id == reference) {
            Ok(reference.to_string())
        } else {
            Err(RoiError::ScenarioNotFound(reference.to_string()))
        }
    }
}
