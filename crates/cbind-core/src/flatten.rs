//! Inline container flattening.
//!
//! C allows a struct or union to be declared inline as the type of a
//! property. Binding layers need every container to be independently
//! nameable, so each inline container is renamed to `{outer}_{property}`,
//! the property is rewritten to refer to the new name, and the container is
//! promoted to the top level.

use tracing::warn;

use crate::module::Container;
use crate::types::Type;

/// Flatten every inline container into a top-level one.
///
/// Output order: each input container, followed by its inline containers
/// depth-first. Returned containers never carry inline containers.
pub fn flatten(containers: &[Container]) -> Vec<Container> {
    let mut out = Vec::with_capacity(containers.len());
    for container in containers {
        match container.name.as_deref() {
            Some(name) => flatten_into(container, name, &mut out),
            None => warn!(
                kind = %container.kind,
                "skipping unnamed top-level container"
            ),
        }
    }
    out
}

fn flatten_into(container: &Container, name: &str, out: &mut Vec<Container>) {
    let mut properties = container.properties.clone();
    let inline_slots: Vec<usize> = container
        .properties
        .iter()
        .enumerate()
        .filter(|(_, p)| p.ty.is_inline_container())
        .map(|(i, _)| i)
        .collect();
    // Anonymous inner containers pair in order with properties whose inline
    // type has no name. Named references to other containers never qualify.
    let mut anonymous_slots = container
        .properties
        .iter()
        .enumerate()
        .filter(|(_, p)| matches!(p.ty.base(), Type::Inline { name: None, .. }))
        .map(|(i, _)| i);

    let mut promoted: Vec<Container> = Vec::with_capacity(container.inner.len());
    for inner in &container.inner {
        let old_name = inner.name.as_deref();
        let slot = match old_name {
            Some(old) => inline_slots
                .iter()
                .copied()
                .find(|&i| container.properties[i].ty.base_name() == Some(old)),
            None => anonymous_slots.next(),
        };

        let Some(property_name) = slot
            .map(|i| container.properties[i].name.as_str())
            .or(old_name)
        else {
            warn!(container = name, "inline container has no owning property");
            continue;
        };
        let new_name = format!("{name}_{property_name}");

        for (i, property) in properties.iter_mut().enumerate() {
            let owned = match old_name {
                Some(_) => inline_slots.contains(&i)
                    && container.properties[i].ty.base_name() == old_name,
                None => slot == Some(i),
            };
            if owned {
                property.ty = property.ty.rename_inline(old_name, &new_name);
            }
        }

        promoted.push(Container {
            name: Some(new_name),
            ..inner.clone()
        });
    }

    out.push(Container {
        kind: container.kind,
        name: Some(name.to_string()),
        properties,
        inner: Vec::new(),
    });

    for inner in &promoted {
        if let Some(inner_name) = inner.name.as_deref() {
            flatten_into(inner, inner_name, out);
        }
    }
}
