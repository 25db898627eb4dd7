//! System bindings: the loadable surface of a compiled library.
//!
//! A system binding pairs every global field and function of a module with
//! its FFI descriptor and the symbol name to load, alongside the ordered
//! type elements those descriptors refer to.
//!
//! Generated model code names its entry points `{model}_initialize`,
//! `{model}_step` and `{model}_terminate`. The model prefix is taken from the
//! first such function and stripped from method names, and the model's
//! `{model}_Y`, `{model}_U` and `{model}_B` globals are exposed as
//! `outputs`, `inputs` and `signals`.

use std::collections::BTreeSet;

use cbind_core::{primitives, prune, Field, Method, Module};
use serde::Serialize;
use tracing::{debug, info};

use crate::arrange::arrange;
use crate::descriptor::FfiType;
use crate::element::Element;
use crate::error::Result;
use crate::generate::{generate_elements, GeneratedElements};
use crate::mapper::{map_type, RemappingTable};

const LIFECYCLE_SUFFIXES: [&str; 3] = ["_initialize", "_step", "_terminate"];

const FIELD_ROLES: [(&str, &str); 3] = [("_Y", "outputs"), ("_U", "inputs"), ("_B", "signals")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemParameter {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: FfiType,
}

/// A callable symbol of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMethod {
    /// Binding-side name.
    pub name: String,
    /// Symbol name in the shared library.
    pub name_in_library: String,
    pub return_type: FfiType,
    pub parameters: Vec<SystemParameter>,
}

/// A global variable of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemField {
    /// Binding-side name.
    pub name: String,
    /// Symbol name in the shared library.
    pub name_in_library: String,
    #[serde(rename = "type")]
    pub ty: FfiType,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemBinding {
    pub name: String,
    /// Shared library name without platform suffix.
    pub binary_basename: String,
    pub model_prefix: Option<String>,
    pub methods: Vec<SystemMethod>,
    pub fields: Vec<SystemField>,
    /// Type elements in emission order.
    pub elements: Vec<Element>,
    pub splits: usize,
}

/// Inputs to [`generate_system`] besides the module itself.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub name: String,
    pub binary_basename: String,
    /// Names resolvable without a declaration. Defaults to the primitive table.
    pub known_types: BTreeSet<String>,
    /// Caller overrides applied before enum aliases.
    pub remap: RemappingTable,
}

impl GenerateOptions {
    pub fn new(name: &str, binary_basename: &str) -> Self {
        Self {
            name: name.to_string(),
            binary_basename: binary_basename.to_string(),
            known_types: primitives::known_names(),
            remap: RemappingTable::new(),
        }
    }

    /// Add names to the externally-known set.
    pub fn with_known_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_types.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_remap(mut self, remap: RemappingTable) -> Self {
        self.remap = remap;
        self
    }

    /// Remapped names need no declaration of their own.
    pub fn prune_known(&self) -> BTreeSet<String> {
        let mut known = self.known_types.clone();
        known.extend(self.remap.iter().map(|(from, _)| from.to_string()));
        known
    }

    /// Remap targets are provided by the binding environment.
    pub fn arrange_known(&self) -> BTreeSet<String> {
        let mut known = self.known_types.clone();
        known.extend(self.remap.iter().map(|(_, to)| to.to_string()));
        known
    }
}

/// The model prefix of a lifecycle function name, if it is one.
pub fn lifecycle_prefix(name: &str) -> Option<&str> {
    LIFECYCLE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
}

/// Run the full pipeline: prune, generate, arrange, and map the interface.
pub fn generate_system(module: &Module, options: &GenerateOptions) -> Result<SystemBinding> {
    let pruned = prune(module, &options.prune_known())?;
    let GeneratedElements { elements, table } = generate_elements(&pruned, options.remap.clone())?;
    let arrangement = arrange(elements, &options.arrange_known())?;

    let model_prefix = pruned
        .methods
        .iter()
        .find_map(|m| lifecycle_prefix(&m.name))
        .map(str::to_string);
    debug!(prefix = ?model_prefix, "detected model prefix");
    let prefix = model_prefix.as_deref().unwrap_or("");

    let methods = pruned
        .methods
        .iter()
        .map(|m| system_method(m, prefix, &table))
        .collect::<Result<Vec<_>>>()?;
    let fields = pruned
        .fields
        .iter()
        .map(|f| system_field(f, prefix, &table))
        .collect::<Result<Vec<_>>>()?;

    info!(
        name = %options.name,
        methods = methods.len(),
        fields = fields.len(),
        elements = arrangement.elements.len(),
        "generated system binding"
    );

    Ok(SystemBinding {
        name: options.name.clone(),
        binary_basename: options.binary_basename.clone(),
        model_prefix,
        methods,
        fields,
        elements: arrangement.elements,
        splits: arrangement.splits,
    })
}

fn system_method(method: &Method, prefix: &str, table: &RemappingTable) -> Result<SystemMethod> {
    let name = method
        .name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|rest| !prefix.is_empty() && !rest.is_empty())
        .unwrap_or(method.name.as_str());
    let parameters = method
        .parameters
        .iter()
        .map(|p| {
            Ok(SystemParameter {
                name: p.name.clone(),
                ty: map_type(&p.ty, table)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SystemMethod {
        name: name.to_string(),
        name_in_library: method.name.clone(),
        return_type: map_type(&method.return_type, table)?,
        parameters,
    })
}

fn system_field(field: &Field, prefix: &str, table: &RemappingTable) -> Result<SystemField> {
    let name = FIELD_ROLES
        .iter()
        .filter(|_| !prefix.is_empty())
        .find(|(suffix, _)| field.name == format!("{prefix}{suffix}"))
        .map_or(field.name.as_str(), |(_, role)| *role);
    Ok(SystemField {
        name: name.to_string(),
        name_in_library: field.name.clone(),
        ty: map_type(&field.ty, table)?,
    })
}
