//! Foreign-call type descriptors.
//!
//! The target-side view of a C type: what a foreign-call marshaller needs to
//! know to lay out a field or call a symbol.

use std::collections::BTreeSet;
use std::fmt;

use cbind_core::Primitive;
use serde::Serialize;

/// A type descriptor for the binding layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FfiType {
    /// A fixed-width scalar.
    Primitive { primitive: Primitive },
    /// A container or alias emitted elsewhere in the binding.
    Named { name: String },
    /// Untyped pointer (`void *`).
    OpaquePointer,
    Pointer { of: Box<FfiType> },
    Array { of: Box<FfiType>, length: u64 },
    /// A callable reference. Already denotes a function pointer.
    Function {
        return_type: Box<FfiType>,
        parameters: Vec<FfiType>,
    },
}

impl FfiType {
    pub fn primitive(primitive: Primitive) -> Self {
        FfiType::Primitive { primitive }
    }

    pub fn named(name: &str) -> Self {
        FfiType::Named {
            name: name.to_string(),
        }
    }

    pub fn pointer(of: FfiType) -> Self {
        FfiType::Pointer { of: Box::new(of) }
    }

    pub fn array(of: FfiType, length: u64) -> Self {
        FfiType::Array {
            of: Box::new(of),
            length,
        }
    }

    pub fn function(return_type: FfiType, parameters: Vec<FfiType>) -> Self {
        FfiType::Function {
            return_type: Box::new(return_type),
            parameters,
        }
    }

    /// Names of every binding-side type this descriptor refers to.
    pub fn referenced_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            FfiType::Named { name } => {
                names.insert(name.as_str());
            }
            FfiType::Pointer { of } | FfiType::Array { of, .. } => of.collect_names(names),
            FfiType::Function {
                return_type,
                parameters,
            } => {
                return_type.collect_names(names);
                for param in parameters {
                    param.collect_names(names);
                }
            }
            FfiType::Primitive { .. } | FfiType::OpaquePointer => {}
        }
    }

    /// Whether this is the `void` scalar.
    pub fn is_void(&self) -> bool {
        matches!(self, FfiType::Primitive { primitive } if primitive.is_void())
    }
}

impl fmt::Display for FfiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiType::Primitive { primitive } => write!(f, "{primitive}"),
            FfiType::Named { name } => write!(f, "{name}"),
            FfiType::OpaquePointer => write!(f, "void*"),
            FfiType::Pointer { of } => write!(f, "{of}*"),
            FfiType::Array { of, length } => write!(f, "{of}[{length}]"),
            FfiType::Function {
                return_type,
                parameters,
            } => {
                write!(f, "fn(")?;
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {return_type}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_names_walk_functions() {
        let ty = FfiType::function(
            FfiType::named("Status"),
            vec![
                FfiType::pointer(FfiType::named("Event")),
                FfiType::primitive(Primitive::Int),
                FfiType::OpaquePointer,
            ],
        );
        let names: Vec<_> = ty.referenced_names().into_iter().collect();
        assert_eq!(names, vec!["Event", "Status"]);
    }

    #[test]
    fn display_is_readable() {
        let ty = FfiType::array(FfiType::pointer(FfiType::named("Node")), 4);
        assert_eq!(ty.to_string(), "Node*[4]");
        let cb = FfiType::function(
            FfiType::primitive(Primitive::Void),
            vec![FfiType::primitive(Primitive::Int)],
        );
        assert_eq!(cb.to_string(), "fn(int) -> void");
    }
}
