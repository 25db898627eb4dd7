//! `cbind.toml` configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cbind_ffi::{GenerateOptions, RemappingTable};
use serde::{Deserialize, Serialize};

/// The top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CbindConfig {
    #[serde(default)]
    pub binding: BindingConfig,
    #[serde(default)]
    pub types: TypesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Naming of the generated loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Loader class name.
    #[serde(default)]
    pub name: Option<String>,
    /// Shared library name without platform suffix.
    #[serde(default)]
    pub binary_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypesConfig {
    /// Extra names resolvable without a declaration.
    #[serde(default)]
    pub known: Vec<String>,
    /// Name overrides applied while mapping types.
    #[serde(default)]
    pub remap: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the config file.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub binary_name: Option<String>,
}

impl CbindConfig {
    /// Search upward from `start_dir` for a `cbind.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("cbind.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: CbindConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing cbind.toml")
    }

    pub fn remapping(&self) -> RemappingTable {
        self.types
            .remap
            .iter()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect()
    }

    /// Build pipeline options for `module_path`.
    ///
    /// The binary name defaults to the module file's stem and the class
    /// name to its camel-cased form.
    pub fn options_for(&self, module_path: &Path, overrides: &Overrides) -> GenerateOptions {
        let stem = module_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string());
        let binary_name = overrides
            .binary_name
            .clone()
            .or_else(|| self.binding.binary_name.clone())
            .unwrap_or(stem);
        let name = overrides
            .name
            .clone()
            .or_else(|| self.binding.name.clone())
            .unwrap_or_else(|| class_name(&binary_name));

        GenerateOptions::new(&name, &binary_name)
            .with_known_types(self.types.known.iter().cloned())
            .with_remap(self.remapping())
    }

    /// Output directory resolved against the config file's directory.
    pub fn output_dir(&self, config_dir: &Path) -> Option<PathBuf> {
        self.output.dir.as_ref().map(|dir| config_dir.join(dir))
    }
}

/// `plant_model-v2` → `PlantModelV2`.
pub fn class_name(stem: &str) -> String {
    let mut name: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
