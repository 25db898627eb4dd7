//! CLI command implementations.

pub mod generate;
pub mod order;
pub mod prune;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cbind_core::Module;

/// Read a front-end module from its JSON file.
pub fn load_module(path: &Path) -> Result<Module> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Module::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}
