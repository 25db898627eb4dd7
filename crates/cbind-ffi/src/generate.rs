//! Element generation from a pruned module.
//!
//! Produces, in this order: one `enum_{name} = int` alias per named enum,
//! one definition per type alias, one element per enum, and one fused
//! container element per (flattened) struct or union. A `typedef struct X X`
//! with no body for `X` becomes a forward declaration of an opaque `X`.

use cbind_core::{flatten, Container, ContainerKind, Module, Primitive, Type};
use tracing::debug;

use crate::descriptor::FfiType;
use crate::element::{ContainerElement, ContainerField, Element};
use crate::error::Result;
use crate::mapper::{map_type, RemappingTable};

/// Elements of one generation pass, together with the remapping table the
/// pass ended with.
#[derive(Debug, Clone)]
pub struct GeneratedElements {
    pub elements: Vec<Element>,
    pub table: RemappingTable,
}

/// Binding-side name of the integer alias standing in for an enum.
///
/// The binding layer cannot back a struct field with an enum type directly,
/// so fields of enum type are declared with this alias instead.
pub fn enum_alias_name(name: &str) -> String {
    format!("enum_{name}")
}

/// Generate unordered elements for `module`.
///
/// `table` seeds the remapping table (for caller-supplied overrides); enum
/// aliases are registered on top of it.
pub fn generate_elements(module: &Module, table: RemappingTable) -> Result<GeneratedElements> {
    let mut table = table;
    let mut elements = Vec::new();

    let named_enums: Vec<_> = module
        .enums
        .iter()
        .filter_map(|e| e.name.as_deref().map(|name| (name, e)))
        .collect();

    for (name, _) in &named_enums {
        let alias = enum_alias_name(name);
        elements.push(Element::Definition {
            name: alias.clone(),
            target: FfiType::primitive(Primitive::Int),
        });
        table = table.with(name, &alias);
    }

    for alias in &module.aliases {
        if alias.is_self_alias() {
            let declared = module
                .containers
                .iter()
                .any(|c| c.name.as_deref() == Some(alias.name.as_str()));
            if declared {
                debug!(alias = %alias.name, "skipping alias that restates its container");
            } else {
                // Opaque handle: the name exists but its layout is never given.
                debug!(alias = %alias.name, "declaring opaque container");
                let kind = match alias.target.base() {
                    Type::Inline { container, .. } => *container,
                    _ => ContainerKind::Struct,
                };
                elements.push(Element::ContainerDeclaration {
                    kind,
                    name: alias.name.clone(),
                });
            }
            continue;
        }
        elements.push(Element::Definition {
            name: alias.name.clone(),
            target: map_type(&alias.target, &table)?,
        });
    }

    for (name, e) in &named_enums {
        elements.push(Element::Enum {
            name: name.to_string(),
            entries: e.resolved_entries(),
        });
    }

    for container in flatten(&module.containers) {
        if let Some(element) = container_element(&container, &table)? {
            elements.push(element);
        }
    }

    debug!(elements = elements.len(), remappings = table.len(), "generated elements");
    Ok(GeneratedElements { elements, table })
}

fn container_element(container: &Container, table: &RemappingTable) -> Result<Option<Element>> {
    let Some(name) = container.name.as_deref() else {
        return Ok(None);
    };
    let fields = container
        .properties
        .iter()
        .map(|p| {
            Ok(ContainerField {
                name: p.name.clone(),
                ty: map_type(&p.ty, table)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Element::Container(ContainerElement {
        kind: container.kind,
        name: name.to_string(),
        fields,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbind_core::{Enum, EnumEntry, Property, TypeAlias};

    fn sample_module() -> Module {
        Module {
            containers: vec![Container::new(
                ContainerKind::Struct,
                "Lamp",
                vec![
                    Property::new("color", Type::named("Color")),
                    Property::new("level", Type::named("real_T")),
                ],
            )],
            enums: vec![Enum::new(
                "Color",
                vec![EnumEntry::new("RED", None), EnumEntry::new("GREEN", None)],
            )],
            aliases: vec![
                TypeAlias::new("real_T", Type::named("double")),
                TypeAlias::new("Lamp", Type::inline(ContainerKind::Struct, Some("Lamp"))),
            ],
            ..Module::default()
        }
    }

    #[test]
    fn element_order_and_enum_aliases() {
        let generated = generate_elements(&sample_module(), RemappingTable::new()).unwrap();
        let labels: Vec<_> = generated
            .elements
            .iter()
            .map(|e| (e.label(), e.name().to_string()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("definition", "enum_Color".to_string()),
                ("definition", "real_T".to_string()),
                ("enum", "Color".to_string()),
                ("container", "Lamp".to_string()),
            ]
        );
        assert_eq!(generated.table.get("Color"), Some("enum_Color"));
    }

    #[test]
    fn enum_fields_use_the_integer_alias() {
        let generated = generate_elements(&sample_module(), RemappingTable::new()).unwrap();
        let Some(Element::Container(lamp)) = generated.elements.last() else {
            panic!("expected container last");
        };
        assert_eq!(lamp.fields[0].ty, FfiType::named("enum_Color"));
        assert_eq!(lamp.fields[1].ty, FfiType::named("real_T"));
    }

    #[test]
    fn enum_values_are_resolved() {
        let generated = generate_elements(&sample_module(), RemappingTable::new()).unwrap();
        let entries = generated
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Enum { entries, .. } => Some(entries.clone()),
                _ => None,
            })
            .unwrap();
        let values: Vec<_> = entries.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0, 1]);
    }

    #[test]
    fn seeded_overrides_apply() {
        let table = RemappingTable::new().with("real_T", "ctypes_double");
        let generated = generate_elements(&sample_module(), table).unwrap();
        let Some(Element::Container(lamp)) = generated.elements.last() else {
            panic!("expected container last");
        };
        assert_eq!(lamp.fields[1].ty, FfiType::named("ctypes_double"));
    }

    #[test]
    fn inline_containers_become_elements() {
        let module = Module {
            containers: vec![Container::new(
                ContainerKind::Struct,
                "Msg",
                vec![Property::new("body", Type::inline(ContainerKind::Union, Some("body")))],
            )
            .with_inner(vec![Container::new(
                ContainerKind::Union,
                "body",
                vec![Property::new("i", Type::named("int"))],
            )])],
            ..Module::default()
        };
        let generated = generate_elements(&module, RemappingTable::new()).unwrap();
        let names: Vec<_> = generated.elements.iter().map(Element::name).collect();
        assert_eq!(names, vec!["Msg", "Msg_body"]);
        let Element::Container(msg) = &generated.elements[0] else {
            panic!("expected container");
        };
        assert_eq!(msg.fields[0].ty, FfiType::named("Msg_body"));
    }

    #[test]
    fn self_alias_without_container_is_declared_opaque() {
        let module = Module {
            aliases: vec![TypeAlias::new(
                "Handle",
                Type::inline(ContainerKind::Union, Some("Handle")),
            )],
            ..Module::default()
        };
        let generated = generate_elements(&module, RemappingTable::new()).unwrap();
        assert_eq!(
            generated.elements,
            vec![Element::ContainerDeclaration {
                kind: ContainerKind::Union,
                name: "Handle".into(),
            }]
        );
    }
}
