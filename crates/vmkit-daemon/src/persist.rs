use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use vmkit_core::instance::VmSpecs;

/// Durable store for the instance spec map, one JSON document at
/// `<data_dir>/instance_specs.json`. Writes go through a temp file in the
/// same directory and are renamed into place, so readers never observe a
/// partial document.
pub struct SpecStore {
    path: PathBuf,
}

impl SpecStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("instance_specs.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted specs; a missing file is an empty daemon, not an error.
    pub fn load(&self) -> Result<HashMap<String, VmSpecs>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing {}", self.path.display()))
    }

    pub fn save(&self, specs: &HashMap<String, VmSpecs>) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let json = serde_json::to_string_pretty(specs).context("serializing instance specs")?;
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes()).context("writing instance specs")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
