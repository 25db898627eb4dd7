//! `cbind order` — print the emission order of a module's elements.

use std::path::Path;

use anyhow::{Context, Result};
use cbind_ffi::{generate_system, SystemBinding};

use crate::commands::load_module;
use crate::config::{CbindConfig, Overrides};

pub fn run(module_path: &Path, config: &CbindConfig) -> Result<()> {
    let module = load_module(module_path)?;
    let options = config.options_for(module_path, &Overrides::default());
    let system = generate_system(&module, &options)
        .with_context(|| format!("ordering elements of {}", module_path.display()))?;
    print!("{}", render_order(&system));
    Ok(())
}

/// One line per element, then a summary line.
pub fn render_order(system: &SystemBinding) -> String {
    let mut text = String::new();
    for (i, element) in system.elements.iter().enumerate() {
        text.push_str(&format!("{:>4}  {element}\n", i + 1));
    }
    text.push_str(&format!(
        "{} elements, {} split{}\n",
        system.elements.len(),
        system.splits,
        if system.splits == 1 { "" } else { "s" }
    ));
    text
}
