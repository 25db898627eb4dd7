//! `cbind prune` — print the pruned module as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use cbind_core::{prune, Module};

use crate::commands::load_module;
use crate::config::{CbindConfig, Overrides};

pub fn run(module_path: &Path, config: &CbindConfig) -> Result<()> {
    let module = load_module(module_path)?;
    let pruned = prune_module(&module, module_path, config)?;
    let json = serde_json::to_string_pretty(&pruned).context("serializing pruned module")?;
    println!("{json}");
    Ok(())
}

fn prune_module(module: &Module, module_path: &Path, config: &CbindConfig) -> Result<Module> {
    let options = config.options_for(module_path, &Overrides::default());
    prune(module, &options.prune_known())
        .with_context(|| format!("pruning {}", module_path.display()))
}
