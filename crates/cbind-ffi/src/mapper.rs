//! C type → FFI descriptor mapping.
//!
//! Name substitution happens only while generating descriptors; the type
//! model itself is never rewritten. The [`RemappingTable`] is an immutable
//! value threaded through one generation pass: registering an entry yields
//! a new table.

use std::collections::BTreeMap;

use cbind_core::{Primitive, Type};

use crate::descriptor::FfiType;
use crate::error::{FfiError, Result};

/// Name substitutions applied when a named type is mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemappingTable {
    entries: BTreeMap<String, String>,
}

impl RemappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a table that additionally maps `from` to `to`.
    #[must_use]
    pub fn with(&self, from: &str, to: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(from.to_string(), to.to_string());
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for RemappingTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Map a C type to its FFI descriptor.
///
/// Precedence for names: remapping table, then primitive table, then the
/// name passes through unchanged (a container or alias emitted elsewhere).
///
/// `Pointer(Function)` maps to the bare function descriptor: a mapped
/// function already denotes a callable reference, so the pointer layer is
/// dropped. No other combination collapses pointers.
pub fn map_type(ty: &Type, table: &RemappingTable) -> Result<FfiType> {
    match ty {
        Type::Named { name, .. } => Ok(map_name(name, table)),
        Type::Inline {
            name: Some(name), ..
        } => Ok(map_name(name, table)),
        Type::Inline {
            container,
            name: None,
            ..
        } => Err(FfiError::UnsupportedType {
            detail: format!("anonymous inline {container} has no name to bind"),
        }),
        Type::Pointer { of, .. } => match of.as_ref() {
            Type::Named { name, .. } if name == "void" => Ok(FfiType::OpaquePointer),
            Type::Function { .. } => map_type(of, table),
            _ => Ok(FfiType::pointer(map_type(of, table)?)),
        },
        Type::Array { of, length, .. } => Ok(FfiType::array(map_type(of, table)?, *length)),
        Type::Function {
            parameters,
            return_type,
            ..
        } => {
            let return_type = map_type(return_type, table)?;
            let parameters = parameters
                .iter()
                .map(|p| map_type(&p.ty, table))
                .collect::<Result<Vec<_>>>()?;
            Ok(FfiType::function(return_type, parameters))
        }
    }
}

fn map_name(name: &str, table: &RemappingTable) -> FfiType {
    if let Some(remapped) = table.get(name) {
        return FfiType::named(remapped);
    }
    match Primitive::from_c_name(name) {
        Some(primitive) => FfiType::primitive(primitive),
        None => FfiType::named(name),
    }
}
