//! Saved calculations, newest last, persisted as JSON

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calculators::Calculation;
use crate::error::HistoryError;
use crate::formula::OutputRecord;
use crate::schema::InputState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    pub calculator: String,
    pub saved_at: DateTime<Utc>,
    pub inputs: InputState,
    pub outputs: OutputRecord,
}

impl SavedCalculation {
    pub fn from_calculation(calculation: &Calculation, saved_at: DateTime<Utc>) -> Self {
        Self {
            calculator: calculation.calculator.clone(),
            saved_at,
            inputs: calculation.inputs.clone(),
            outputs: calculation.outputs.clone(),
        }
    }
}

/// Bounded list of saved calculations backed by a file
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    limit: usize,
    entries: Vec<SavedCalculation>,
}

impl History {
    /// Open the history at `path`; a missing file is an empty history
    pub fn open(path: &Path, limit: usize) -> Result<Self, HistoryError> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| HistoryError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| HistoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Vec::new()
        };

        let mut history = Self {
            path: path.to_path_buf(),
            limit,
            entries,
        };
        history.truncate();
        Ok(history)
    }

    /// Append an entry, dropping the oldest beyond the limit
    pub fn push(&mut self, entry: SavedCalculation) {
        self.entries.push(entry);
        self.truncate();
    }

    pub fn list(&self) -> &[SavedCalculation] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn save(&self) -> Result<(), HistoryError> {
        let io_error = |source: std::io::Error| HistoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(io_error)?;

        info!("saved {} calculations to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    fn truncate(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            debug!("dropping {} oldest saved calculations", excess);
            self.entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::Catalog;
    use crate::formula::OutputValue;
    use chrono::TimeZone;

    fn entry(catalog: &Catalog, id: &str, second: u32) -> SavedCalculation {
        let calc = catalog.get(id).unwrap();
        let calculation = calc.calculate(&calc.defaults());
        let saved_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, second).unwrap();
        SavedCalculation::from_calculation(&calculation, saved_at)
    }

    #[test]
    fn test_push_keeps_newest() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut history = History::open(&dir.path().join("history.json"), 2).unwrap();

        history.push(entry(&catalog, "fire", 0));
        history.push(entry(&catalog, "loan", 1));
        history.push(entry(&catalog, "car-import", 2));

        let ids: Vec<_> = history.list().iter().map(|e| e.calculator.as_str()).collect();
        assert_eq!(ids, vec!["loan", "car-import"]);
    }

    #[test]
    fn test_save_and_reopen() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = History::open(&path, 10).unwrap();
        history.push(entry(&catalog, "solar-payback", 5));
        history.save().unwrap();

        let reopened = History::open(&path, 10).unwrap();
        let (saved, loaded) = (&history.list()[0], &reopened.list()[0]);
        assert_eq!(loaded.calculator, "solar-payback");
        assert_eq!(loaded.saved_at, saved.saved_at);
        assert_eq!(loaded.outputs.len(), saved.outputs.len());
        assert_eq!(loaded.outputs.get("payback_year"), Some(OutputValue::Number(7.0)));

        // Smaller limit applies on open
        history.push(entry(&catalog, "income-tax", 6));
        history.save().unwrap();
        assert_eq!(History::open(&path, 1).unwrap().list().len(), 1);
    }

    #[test]
    fn test_clear() {
        let catalog = Catalog::builtin().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = History::open(&path, 10).unwrap();
        history.push(entry(&catalog, "fire", 0));
        history.clear();
        history.save().unwrap();

        assert!(History::open(&path, 10).unwrap().list().is_empty());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{").unwrap();

        assert!(matches!(History::open(&path, 10), Err(HistoryError::Parse { .. })));
    }
}
