//! Top-level declarations produced by the C front end.
//!
//! A [`Module`] holds every container, enum, and type alias of a header,
//! together with the global fields and functions that form its public
//! interface. Only the interface anchors reachability; everything else is
//! kept or dropped depending on whether the interface needs it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ContainerKind, FunctionParameter, Type};

/// A named member of a struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Property {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// A struct or union declaration.
///
/// Property order is binary layout order. Every property whose base type is
/// an inline container reference has exactly one matching entry in
/// `inner`, carrying the same (pre-flatten) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Container {
    pub kind: ContainerKind,
    /// Absent only for anonymous inline containers before flattening.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Containers declared inline inside this one.
    #[serde(default)]
    pub inner: Vec<Container>,
}

impl Container {
    pub fn new(kind: ContainerKind, name: &str, properties: Vec<Property>) -> Self {
        Self {
            kind,
            name: Some(name.to_string()),
            properties,
            inner: Vec::new(),
        }
    }

    pub fn with_inner(mut self, inner: Vec<Container>) -> Self {
        self.inner = inner;
        self
    }

    /// Names of the containers declared inline directly inside this one.
    pub fn inner_names(&self) -> BTreeSet<&str> {
        self.inner.iter().filter_map(|c| c.name.as_deref()).collect()
    }

    /// Total number of inline containers, at any depth.
    pub fn nested_count(&self) -> usize {
        self.inner.iter().map(|c| 1 + c.nested_count()).sum()
    }
}

/// One enumerator. The value is absent when the header leaves it implicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumEntry {
    pub name: String,
    #[serde(default)]
    pub value: Option<i64>,
}

impl EnumEntry {
    pub fn new(name: &str, value: Option<i64>) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// An enumerator with its value made explicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enum {
    #[serde(default)]
    pub name: Option<String>,
    pub entries: Vec<EnumEntry>,
}

impl Enum {
    pub fn new(name: &str, entries: Vec<EnumEntry>) -> Self {
        Self {
            name: Some(name.to_string()),
            entries,
        }
    }

    /// Resolve implicit enumerator values.
    ///
    /// An implicit value is the previous entry's value plus one, starting
    /// at zero. An explicit value resets the running counter.
    pub fn resolved_entries(&self) -> Vec<ResolvedEntry> {
        let mut last: i64 = -1;
        self.entries
            .iter()
            .map(|entry| {
                let value = entry.value.unwrap_or_else(|| last.wrapping_add(1));
                last = value;
                ResolvedEntry {
                    name: entry.name.clone(),
                    value,
                }
            })
            .collect()
    }
}

/// A `typedef`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    pub target: Type,
}

impl TypeAlias {
    pub fn new(name: &str, target: Type) -> Self {
        Self {
            name: name.to_string(),
            target,
        }
    }

    /// Whether this alias only restates a container of the same name
    /// (`typedef struct X X;`).
    pub fn is_self_alias(&self) -> bool {
        !self.target.is_indirect() && self.target.base_name() == Some(self.name.as_str())
    }
}

/// A global variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Field {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// A global function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Type,
}

impl Method {
    pub fn new(name: &str, parameters: Vec<FunctionParameter>, return_type: Type) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            return_type,
        }
    }

    /// Return type followed by parameter types, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        std::iter::once(&self.return_type).chain(self.parameters.iter().map(|p| &p.ty))
    }
}

/// All top-level declarations of one header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub aliases: Vec<TypeAlias>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Module {
    /// Parse a module from its JSON interchange form.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Every type mentioned by the public interface.
    pub fn interface_types(&self) -> impl Iterator<Item = &Type> {
        self.fields
            .iter()
            .map(|f| &f.ty)
            .chain(self.methods.iter().flat_map(Method::types))
    }

    /// Number of container, enum, and alias declarations.
    pub fn declaration_count(&self) -> usize {
        self.containers.len() + self.enums.len() + self.aliases.len()
    }
}
