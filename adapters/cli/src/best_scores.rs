use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DATA_DIR: &str = "bubble-shooter";
const FILE_NAME: &str = "best_scores.json";

/// Winning scores keyed by the Unix timestamp of the win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BestScores {
    entries: BTreeMap<u64, u64>,
}

impl BestScores {
    /// Location used when no path is given on the command line.
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join(DATA_DIR).join(FILE_NAME))
    }

    /// Reads the store at `path`; a missing file yields an empty store.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read best scores from {}", path.display()))
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse best scores in {}", path.display()))
    }

    /// Writes the store to `path`, creating parent directories as needed.
    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to encode best scores")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write best scores to {}", path.display()))
    }

    /// Records `score` under `key`, keeping the higher score on a clash.
    pub(crate) fn record(&mut self, key: u64, score: u64) {
        let entry = self.entries.entry(key).or_insert(score);
        *entry = (*entry).max(score);
    }

    pub(crate) fn best(&self) -> Option<u64> {
        self.entries.values().copied().max()
    }
}
