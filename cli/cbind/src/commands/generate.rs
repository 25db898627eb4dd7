//! `cbind generate` — write the bindings and loader modules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cbind_core::hash::module_digest;
use cbind_ffi::emit::{render_bindings, render_system};
use cbind_ffi::generate_system;
use tracing::info;

use crate::commands::load_module;
use crate::config::{CbindConfig, Overrides};

/// Paths of the files written by one run.
#[derive(Debug)]
pub struct GeneratedFiles {
    pub bindings: PathBuf,
    pub loader: PathBuf,
}

/// Generate bindings for `module_path` into `out_dir`.
///
/// Both files are rendered before either is written.
pub fn run(
    module_path: &Path,
    config: &CbindConfig,
    overrides: &Overrides,
    out_dir: &Path,
) -> Result<GeneratedFiles> {
    let module = load_module(module_path)?;
    let digest = module_digest(&module).context("hashing module")?;
    let options = config.options_for(module_path, overrides);

    let system = generate_system(&module, &options)
        .with_context(|| format!("generating bindings for {}", module_path.display()))?;

    let bindings_module = format!("{}_bindings", options.binary_basename);
    let bindings_text = render_bindings(&system.elements, &digest);
    let loader_text = render_system(&system, &bindings_module, &digest);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let files = GeneratedFiles {
        bindings: out_dir.join(format!("{bindings_module}.py")),
        loader: out_dir.join(format!("{}.py", options.binary_basename)),
    };
    fs::write(&files.bindings, bindings_text)
        .with_context(|| format!("writing {}", files.bindings.display()))?;
    fs::write(&files.loader, loader_text)
        .with_context(|| format!("writing {}", files.loader.display()))?;

    info!(
        bindings = %files.bindings.display(),
        loader = %files.loader.display(),
        splits = system.splits,
        "wrote bindings"
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn writes_bindings_and_loader() {
        let dir = tempfile::tempdir().unwrap();
        let module_path = fixtures::write_model(dir.path());
        let out = dir.path().join("out");

        let files = run(&module_path, &CbindConfig::default(), &Overrides::default(), &out).unwrap();
        assert_eq!(files.bindings, out.join("graph_bindings.py"));
        assert_eq!(files.loader, out.join("graph.py"));

        let bindings = fs::read_to_string(&files.bindings).unwrap();
        assert!(bindings.contains("real_T = ctypes.c_double\n"));
        assert!(bindings.contains("class Node(ctypes.Structure):\n    pass\n"));
        assert!(bindings.contains("Node._fields_ = [\n"));
        assert!(!bindings.contains("Orphan"));

        let loader = fs::read_to_string(&files.loader).unwrap();
        assert!(loader.contains("class Graph:\n"));
        assert!(loader.contains("from graph_bindings import *"));
        assert!(loader.contains("self.outputs = Node.in_dll(self.dll, \"graph_Y\")\n"));
        assert!(loader.contains("    def step(self):\n"));
    }

    #[test]
    fn digest_tracks_module_content() {
        let dir = tempfile::tempdir().unwrap();
        let module_path = fixtures::write_model(dir.path());
        let out = dir.path().join("out");
        let files = run(&module_path, &CbindConfig::default(), &Overrides::default(), &out).unwrap();

        let module = load_module(&module_path).unwrap();
        let digest = module_digest(&module).unwrap();
        let bindings = fs::read_to_string(&files.bindings).unwrap();
        assert!(bindings.contains(&format!("# module digest: {digest}\n")));
    }

    #[test]
    fn failed_generation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let module_path = dir.path().join("bad.json");
        fs::write(
            &module_path,
            r#"{ "fields": [ { "name": "g", "type": { "kind": "named", "name": "Ghost" } } ] }"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let err = run(&module_path, &CbindConfig::default(), &Overrides::default(), &out)
            .unwrap_err();
        assert!(format!("{err:#}").contains("Ghost"));
        assert!(!out.exists());
    }
}
