use std::collections::BTreeSet;

use cbind_core::{ContainerKind, Primitive};
use cbind_ffi::{
    arrange, ContainerElement, ContainerField, DependencyGraphBuilder, DependencyKey, Element,
    FfiType,
};
use proptest::prelude::*;

/// One member of container `i`: refers to container `target`, by pointer or
/// by value. By-value members only point backwards so layouts stay finite.
#[derive(Debug, Clone)]
struct Member {
    target: usize,
    by_pointer: bool,
}

fn name(i: usize) -> String {
    format!("S{i}")
}

fn graph_strategy(allow_pointers: bool) -> impl Strategy<Value = Vec<Vec<Member>>> {
    (1usize..8).prop_flat_map(move |count| {
        (0..count)
            .map(move |i| {
                prop::collection::vec((0..count, any::<bool>()), 0..4).prop_map(move |raw| {
                    raw.into_iter()
                        .filter_map(|(target, pointer)| {
                            let by_pointer = allow_pointers && pointer;
                            (by_pointer || target < i).then_some(Member { target, by_pointer })
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>()
    })
}

fn elements(graph: &[Vec<Member>]) -> Vec<Element> {
    graph
        .iter()
        .enumerate()
        .map(|(i, members)| {
            let mut fields = vec![ContainerField {
                name: "tag".into(),
                ty: FfiType::primitive(Primitive::Int),
            }];
            fields.extend(members.iter().enumerate().map(|(k, m)| {
                let target = FfiType::named(&name(m.target));
                ContainerField {
                    name: format!("m{k}"),
                    ty: if m.by_pointer {
                        FfiType::pointer(target)
                    } else {
                        target
                    },
                }
            }));
            Element::Container(ContainerElement {
                kind: ContainerKind::Struct,
                name: name(i),
                fields,
            })
        })
        .collect()
}

/// Every element's dependencies must be provided by an earlier element.
fn assert_emittable(ordered: &[Element]) -> Result<(), TestCaseError> {
    let mut resolved: BTreeSet<DependencyKey> = BTreeSet::new();
    for element in ordered {
        let node = DependencyGraphBuilder::new(ordered, &resolved)
            .build(vec![element.clone()])
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .remove(0);
        prop_assert!(
            node.dependencies.is_empty(),
            "{} emitted before {:?}",
            element,
            node.dependencies
        );
        resolved.extend(node.keys);
    }
    Ok(())
}

proptest! {
    #[test]
    fn arrangement_is_total_and_ordered(graph in graph_strategy(true)) {
        let input = elements(&graph);
        let arranged = arrange(input.clone(), &BTreeSet::new()).unwrap();

        prop_assert_eq!(arranged.elements.len(), input.len() + arranged.splits);
        prop_assert!(arranged.splits <= input.len());

        let emitted: BTreeSet<&str> = arranged.elements.iter().map(Element::name).collect();
        let expected: BTreeSet<&str> = input.iter().map(Element::name).collect();
        prop_assert_eq!(emitted, expected);

        assert_emittable(&arranged.elements)?;
    }
}

proptest! {
    #[test]
    fn by_value_only_graphs_never_split(graph in graph_strategy(false)) {
        let input = elements(&graph);
        let arranged = arrange(input.clone(), &BTreeSet::new()).unwrap();
        prop_assert_eq!(arranged.splits, 0);
        prop_assert_eq!(arranged.elements.len(), input.len());
        assert_emittable(&arranged.elements)?;
    }
}
