use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::state::StateTree;
use crate::error::{FactureError, Result};

/// Name of the state blob inside the data directory
pub const STATE_FILE: &str = "state.toml";

/// Storage collaborator: loads and saves the whole state tree as one blob.
/// The engine never cares what medium sits behind this.
pub trait StateStore {
    /// Ok(None) means no state has ever been written (fresh start).
    fn load(&self) -> Result<Option<StateTree>>;
    fn save(&self, state: &StateTree) -> Result<()>;
}

/// Production backend: a TOML file at a fixed path in the data directory.
pub struct TomlStateStore {
    path: PathBuf,
}

impl TomlStateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATE_FILE),
        }
    }
}

impl StateStore for TomlStateStore {
    fn load(&self) -> Result<Option<StateTree>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let tree = toml::from_str(&content).map_err(|e| FactureError::StateParse {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(tree))
    }

    fn save(&self, state: &StateTree) -> Result<()> {
        let content = toml::to_string_pretty(state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Get the data directory path (~/.facture or XDG data dir)
pub fn data_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "facture") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    // Fallback to ~/.facture/
    let home = dirs_home().ok_or_else(|| {
        FactureError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".facture"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
