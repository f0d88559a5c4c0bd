//! Data directory layout
//!
//! Everything lives under one root: `$STUDYDESK_HOME` when set, otherwise
//! `~/.studydesk`. The embedding model is expected at
//! `<root>/models/all-MiniLM-L6-v2/{model.onnx,tokenizer.json}`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Resolve the data root from the environment.
    pub fn resolve() -> Result<Self> {
        let root = match std::env::var_os("STUDYDESK_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var_os("HOME").context("HOME is not set")?;
                PathBuf::from(home).join(".studydesk")
            }
        };
        Ok(Self { root })
    }

    pub fn from_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the data root if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        Ok(())
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("studydesk.db")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.root.join("models").join("all-MiniLM-L6-v2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_root() {
        let paths = DataPaths::from_root(PathBuf::from("/tmp/sd"));
        assert_eq!(paths.db_path(), PathBuf::from("/tmp/sd/studydesk.db"));
        assert!(paths
            .model_dir()
            .ends_with("models/all-MiniLM-L6-v2"));
    }
}
