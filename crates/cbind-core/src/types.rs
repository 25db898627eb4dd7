//! The C type model.
//!
//! A closed set of type shapes produced by the C front end. Every consumer
//! (pruning, flattening, FFI mapping) matches on [`Type`] exhaustively, so a
//! new shape cannot be added without every stage deciding how to handle it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Struct or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Struct,
    Union,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Struct => write!(f, "struct"),
            ContainerKind::Union => write!(f, "union"),
        }
    }
}

/// A parameter of a function type or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// Parameter name, absent for unnamed prototype parameters.
    #[serde(default)]
    pub name: Option<String>,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: Type,
}

impl FunctionParameter {
    pub fn new(name: Option<&str>, ty: Type) -> Self {
        Self {
            name: name.map(str::to_string),
            ty,
        }
    }
}

/// A C type as seen at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    /// A primitive or previously declared type, by name.
    Named {
        name: String,
        #[serde(default)]
        constant: bool,
    },
    /// Pointer to another type.
    Pointer {
        of: Box<Type>,
        #[serde(default)]
        constant: bool,
    },
    /// Fixed-length array.
    Array {
        of: Box<Type>,
        length: u64,
        #[serde(default)]
        constant: bool,
    },
    /// Reference to a struct or union, possibly defined inline at the point
    /// of use. The name is absent for anonymous inline containers until the
    /// property holding it assigns one.
    Inline {
        container: ContainerKind,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        constant: bool,
    },
    /// Function type. Only ever reached through a pointer in practice.
    Function {
        parameters: Vec<FunctionParameter>,
        return_type: Box<Type>,
        #[serde(default)]
        constant: bool,
    },
}

impl Type {
    pub fn named(name: &str) -> Self {
        Type::Named {
            name: name.to_string(),
            constant: false,
        }
    }

    pub fn pointer(of: Type) -> Self {
        Type::Pointer {
            of: Box::new(of),
            constant: false,
        }
    }

    pub fn array(of: Type, length: u64) -> Self {
        Type::Array {
            of: Box::new(of),
            length,
            constant: false,
        }
    }

    pub fn inline(container: ContainerKind, name: Option<&str>) -> Self {
        Type::Inline {
            container,
            name: name.map(str::to_string),
            constant: false,
        }
    }

    pub fn function(parameters: Vec<FunctionParameter>, return_type: Type) -> Self {
        Type::Function {
            parameters,
            return_type: Box::new(return_type),
            constant: false,
        }
    }

    /// Return a copy of this type with the constness flag set.
    pub fn with_constant(mut self, value: bool) -> Self {
        match &mut self {
            Type::Named { constant, .. }
            | Type::Pointer { constant, .. }
            | Type::Array { constant, .. }
            | Type::Inline { constant, .. }
            | Type::Function { constant, .. } => *constant = value,
        }
        self
    }

    pub fn is_constant(&self) -> bool {
        match self {
            Type::Named { constant, .. }
            | Type::Pointer { constant, .. }
            | Type::Array { constant, .. }
            | Type::Inline { constant, .. }
            | Type::Function { constant, .. } => *constant,
        }
    }

    /// The innermost type reached by unwrapping pointer and array layers.
    ///
    /// Function types are their own base and are never unwrapped further.
    pub fn base(&self) -> &Type {
        match self {
            Type::Pointer { of, .. } | Type::Array { of, .. } => of.base(),
            Type::Named { .. } | Type::Inline { .. } | Type::Function { .. } => self,
        }
    }

    /// The name of the base type, if it has one.
    ///
    /// `None` for function base types and for anonymous inline containers.
    pub fn base_name(&self) -> Option<&str> {
        match self.base() {
            Type::Named { name, .. } => Some(name),
            Type::Inline { name, .. } => name.as_deref(),
            Type::Function { .. } => None,
            Type::Pointer { .. } | Type::Array { .. } => None,
        }
    }

    /// Whether the base type is an inline container reference.
    pub fn is_inline_container(&self) -> bool {
        matches!(self.base(), Type::Inline { .. })
    }

    /// Collect every type name this type refers to, descending into function
    /// parameters and return types reached through any number of pointers.
    pub fn referenced_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_referenced_names(&mut names);
        names
    }

    fn collect_referenced_names(&self, names: &mut BTreeSet<String>) {
        match self.base() {
            Type::Named { name, .. } => {
                names.insert(name.clone());
            }
            Type::Inline { name, .. } => {
                if let Some(name) = name {
                    names.insert(name.clone());
                }
            }
            Type::Function {
                parameters,
                return_type,
                ..
            } => {
                for param in parameters {
                    param.ty.collect_referenced_names(names);
                }
                return_type.collect_referenced_names(names);
            }
            Type::Pointer { .. } | Type::Array { .. } => {}
        }
    }

    /// Rewrite an inline container reference whose base name is `from` to
    /// use `to` instead.
    ///
    /// Rewrites through any pointer/array nesting but never descends into
    /// function parameter or return types: those belong to a different
    /// declaration.
    pub fn rename_inline(&self, from: Option<&str>, to: &str) -> Type {
        match self {
            Type::Pointer { of, constant } => Type::Pointer {
                of: Box::new(of.rename_inline(from, to)),
                constant: *constant,
            },
            Type::Array {
                of,
                length,
                constant,
            } => Type::Array {
                of: Box::new(of.rename_inline(from, to)),
                length: *length,
                constant: *constant,
            },
            Type::Inline {
                container,
                name,
                constant,
            } if name.as_deref() == from => Type::Inline {
                container: *container,
                name: Some(to.to_string()),
                constant: *constant,
            },
            Type::Named { .. } | Type::Inline { .. } | Type::Function { .. } => self.clone(),
        }
    }

    /// Whether the base type is reached through at least one pointer.
    pub fn is_indirect(&self) -> bool {
        match self {
            Type::Pointer { .. } => true,
            Type::Array { of, .. } => of.is_indirect(),
            Type::Named { .. } | Type::Inline { .. } | Type::Function { .. } => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named { name, constant } => {
                if *constant {
                    write!(f, "const ")?;
                }
                write!(f, "{name}")
            }
            Type::Pointer { of, constant } => {
                write!(f, "{of}*")?;
                if *constant {
                    write!(f, " const")?;
                }
                Ok(())
            }
            Type::Array { of, length, .. } => write!(f, "{of}[{length}]"),
            Type::Inline {
                container, name, ..
            } => match name {
                Some(name) => write!(f, "{container} {name}"),
                None => write!(f, "{container} <anonymous>"),
            },
            Type::Function {
                parameters,
                return_type,
                ..
            } => {
                write!(f, "{return_type}(")?;
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.ty)?;
                }
                write!(f, ")")
            }
        }
    }
}
