//! Emission units of a binding.
//!
//! Each [`Element`] becomes one top-level statement in generated code. A
//! fused container can be split into a forward declaration and a separate
//! layout definition when it participates in a dependency cycle.

use std::fmt;

use cbind_core::module::ResolvedEntry;
use cbind_core::ContainerKind;
use serde::Serialize;

use crate::descriptor::FfiType;

/// A container member with its mapped type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FfiType,
}

/// A struct or union with its full field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerElement {
    pub kind: ContainerKind,
    pub name: String,
    pub fields: Vec<ContainerField>,
}

/// One emission unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum Element {
    /// `name = target`, for typedefs and synthetic enum aliases.
    Definition { name: String, target: FfiType },
    /// An enum's constant list.
    Enum {
        name: String,
        entries: Vec<ResolvedEntry>,
    },
    /// Declaration and layout in one unit.
    Container(ContainerElement),
    /// Forward declaration half of a split container.
    ContainerDeclaration { kind: ContainerKind, name: String },
    /// Layout half of a split container.
    ContainerDefinition(ContainerElement),
}

impl Element {
    /// The name this element introduces.
    pub fn name(&self) -> &str {
        match self {
            Element::Definition { name, .. }
            | Element::Enum { name, .. }
            | Element::ContainerDeclaration { name, .. } => name,
            Element::Container(c) | Element::ContainerDefinition(c) => &c.name,
        }
    }

    /// Only fused containers can be split.
    pub fn is_splittable(&self) -> bool {
        matches!(self, Element::Container(_))
    }

    /// Split a fused container into its declaration and definition halves.
    ///
    /// Returns the element unchanged in `Err` if it is not splittable.
    pub fn split(self) -> Result<(Element, Element), Element> {
        match self {
            Element::Container(container) => Ok((
                Element::ContainerDeclaration {
                    kind: container.kind,
                    name: container.name.clone(),
                },
                Element::ContainerDefinition(container),
            )),
            other => Err(other),
        }
    }

    /// Short label for the element's role.
    pub fn label(&self) -> &'static str {
        match self {
            Element::Definition { .. } => "definition",
            Element::Enum { .. } => "enum",
            Element::Container(_) => "container",
            Element::ContainerDeclaration { .. } => "declaration",
            Element::ContainerDefinition(_) => "layout",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Definition { name, target } => write!(f, "definition {name} = {target}"),
            Element::Enum { name, entries } => write!(f, "enum {name} ({} entries)", entries.len()),
            Element::Container(c) => {
                write!(f, "{} {} ({} fields)", c.kind, c.name, c.fields.len())
            }
            Element::ContainerDeclaration { kind, name } => write!(f, "{kind} {name} [declaration]"),
            Element::ContainerDefinition(c) => {
                write!(f, "{} {} [layout, {} fields]", c.kind, c.name, c.fields.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(name: &str) -> Element {
        Element::Container(ContainerElement {
            kind: ContainerKind::Struct,
            name: name.to_string(),
            fields: vec![ContainerField {
                name: "next".into(),
                ty: FfiType::pointer(FfiType::named(name)),
            }],
        })
    }

    #[test]
    fn fused_container_splits_into_halves() {
        let (decl, def) = container("Node").split().unwrap();
        assert_eq!(
            decl,
            Element::ContainerDeclaration {
                kind: ContainerKind::Struct,
                name: "Node".into()
            }
        );
        match def {
            Element::ContainerDefinition(c) => {
                assert_eq!(c.name, "Node");
                assert_eq!(c.fields.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn halves_and_other_elements_do_not_split() {
        let (decl, def) = container("Node").split().unwrap();
        assert!(!decl.is_splittable());
        assert!(!def.is_splittable());
        assert!(decl.split().is_err());

        let alias = Element::Definition {
            name: "real_T".into(),
            target: FfiType::named("double"),
        };
        assert!(alias.split().is_err());
    }

    #[test]
    fn names_and_labels() {
        let e = container("Node");
        assert_eq!(e.name(), "Node");
        assert_eq!(e.label(), "container");
        assert_eq!(e.to_string(), "struct Node (1 fields)");
    }
}
