//! Dependency graph construction over binding elements.
//!
//! Every container has two resolution states. [`DependencyKey::Name`] means
//! the type exists and can be pointed at; [`DependencyKey::Layout`] means
//! its full field layout is known and it can be embedded by value. A
//! pointer reference only needs the name, a by-value reference needs the
//! layout.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use cbind_core::graph::Node;
use serde::Serialize;

use crate::descriptor::FfiType;
use crate::element::{ContainerElement, Element};
use crate::error::{FfiError, Result};

/// A resolvable identifier in the element dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "state", content = "name", rename_all = "snake_case")]
pub enum DependencyKey {
    /// The type exists (a forward declaration suffices).
    Name(String),
    /// The type's layout is fully known.
    Layout(String),
}

impl DependencyKey {
    pub fn type_name(&self) -> &str {
        match self {
            DependencyKey::Name(name) | DependencyKey::Layout(name) => name,
        }
    }

    /// Both keys of an externally resolved type.
    pub fn resolved_external(name: &str) -> [DependencyKey; 2] {
        [
            DependencyKey::Name(name.to_string()),
            DependencyKey::Layout(name.to_string()),
        ]
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKey::Name(name) => write!(f, "{name}"),
            DependencyKey::Layout(name) => write!(f, "{name}[layout]"),
        }
    }
}

/// A sortable element.
pub type ElementNode = Node<DependencyKey, Element>;

/// What kind of element provides a given name.
#[derive(Debug, Clone)]
enum Provider {
    Container,
    Alias(FfiType),
    Enum,
}

/// Builds graph nodes for elements.
///
/// The catalogue is the full element list of the generation pass, so that
/// by-value references can be classified even when their provider has
/// already been emitted in an earlier sort pass.
#[derive(Debug)]
pub struct DependencyGraphBuilder<'a> {
    providers: BTreeMap<String, Provider>,
    resolved: &'a BTreeSet<DependencyKey>,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(catalogue: &[Element], resolved: &'a BTreeSet<DependencyKey>) -> Self {
        let mut providers = BTreeMap::new();
        for element in catalogue {
            let provider = match element {
                Element::Definition { target, .. } => Provider::Alias(target.clone()),
                Element::Enum { .. } => Provider::Enum,
                Element::Container(_)
                | Element::ContainerDeclaration { .. }
                | Element::ContainerDefinition(_) => Provider::Container,
            };
            providers.entry(element.name().to_string()).or_insert(provider);
        }
        Self {
            providers,
            resolved,
        }
    }

    /// Build one node per element, in input order.
    pub fn build(&self, elements: Vec<Element>) -> Result<Vec<ElementNode>> {
        elements.into_iter().map(|e| self.node(e)).collect()
    }

    fn node(&self, element: Element) -> Result<ElementNode> {
        let (keys, dependencies) = match &element {
            Element::Definition { name, target } => {
                let deps = target
                    .referenced_names()
                    .into_iter()
                    .map(|n| DependencyKey::Name(n.to_string()))
                    .collect();
                (BTreeSet::from([DependencyKey::Name(name.clone())]), deps)
            }
            Element::Enum { name, .. } => (
                BTreeSet::from([DependencyKey::Name(name.clone())]),
                BTreeSet::new(),
            ),
            Element::Container(container) => (
                BTreeSet::from([
                    DependencyKey::Name(container.name.clone()),
                    DependencyKey::Layout(container.name.clone()),
                ]),
                self.field_dependencies(container),
            ),
            Element::ContainerDeclaration { name, .. } => (
                BTreeSet::from([DependencyKey::Name(name.clone())]),
                BTreeSet::new(),
            ),
            Element::ContainerDefinition(container) => {
                let mut deps = self.field_dependencies(container);
                deps.insert(DependencyKey::Name(container.name.clone()));
                (
                    BTreeSet::from([DependencyKey::Layout(container.name.clone())]),
                    deps,
                )
            }
        };

        let dependencies: BTreeSet<DependencyKey> = dependencies
            .into_iter()
            .filter(|key| !self.resolved.contains(key))
            .collect();

        if let Some(missing) = dependencies
            .iter()
            .find(|key| !self.providers.contains_key(key.type_name()))
        {
            return Err(FfiError::MissingDependency {
                element: element.name().to_string(),
                name: missing.type_name().to_string(),
            });
        }

        Ok(Node::new(keys, dependencies, element))
    }

    fn field_dependencies(&self, container: &ContainerElement) -> BTreeSet<DependencyKey> {
        let mut deps = BTreeSet::new();
        let mut visiting = BTreeSet::new();
        for field in &container.fields {
            self.type_dependencies(&field.ty, false, &mut deps, &mut visiting);
        }
        deps
    }

    fn type_dependencies(
        &self,
        ty: &FfiType,
        indirect: bool,
        deps: &mut BTreeSet<DependencyKey>,
        visiting: &mut BTreeSet<String>,
    ) {
        match ty {
            FfiType::Primitive { .. } | FfiType::OpaquePointer => {}
            FfiType::Named { name } if indirect => {
                deps.insert(DependencyKey::Name(name.clone()));
            }
            FfiType::Named { name } => self.by_value_dependencies(name, deps, visiting),
            FfiType::Pointer { of } => self.type_dependencies(of, true, deps, visiting),
            FfiType::Array { of, .. } => self.type_dependencies(of, indirect, deps, visiting),
            FfiType::Function {
                return_type,
                parameters,
            } => {
                self.type_dependencies(return_type, false, deps, visiting);
                for param in parameters {
                    self.type_dependencies(param, false, deps, visiting);
                }
            }
        }
    }

    /// Embedding `name` by value needs its layout; through an alias, the
    /// alias itself plus whatever its target needs by value.
    fn by_value_dependencies(
        &self,
        name: &str,
        deps: &mut BTreeSet<DependencyKey>,
        visiting: &mut BTreeSet<String>,
    ) {
        match self.providers.get(name) {
            Some(Provider::Container) => {
                deps.insert(DependencyKey::Layout(name.to_string()));
            }
            Some(Provider::Alias(target)) => {
                deps.insert(DependencyKey::Name(name.to_string()));
                if visiting.insert(name.to_string()) {
                    self.type_dependencies(target, false, deps, visiting);
                }
            }
            Some(Provider::Enum) | None => {
                deps.insert(DependencyKey::Name(name.to_string()));
            }
        }
    }
}
