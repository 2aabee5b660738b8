//! Unit tests for the dependency graph and SCC driver.

use indoc::indoc;
use triplang_compiler::compile_source;
use triplang_object::ObjectModule;

use crate::graph::{build_graph, sccs};
use crate::space::GlobalSpace;

fn objects(sources: &[&str]) -> Vec<ObjectModule> {
    sources
        .iter()
        .map(|src| compile_source(src).unwrap())
        .collect()
}

const PRELUDE: &str = indoc! {r"
    module Prelude
    export Nat
    export zero
    export succ
    type Nat = #X => (X -> X) -> X -> X
    poly zero : Nat = #X => \s:(X -> X) => \z:X => z
    poly succ : Nat -> Nat = \n:Nat => #X => \s:(X -> X) => \z:X => s (n [X] s z)
"};

const CONSUMER: &str = indoc! {"
    module T
    import Prelude zero
    import Prelude succ
    export main
    poly main = succ zero
"};

#[test]
fn edges_point_at_qualified_dependencies() {
    let objects = objects(&[PRELUDE, CONSUMER]);
    let space = GlobalSpace::build(&objects).unwrap();

    let graph = build_graph(&space);

    let deps = &graph.edges["T.main"];
    assert!(deps.contains("Prelude.succ"));
    assert!(deps.contains("Prelude.zero"));
}

#[test]
fn every_node_lands_in_exactly_one_component() {
    let objects = objects(&[PRELUDE, CONSUMER]);
    let space = GlobalSpace::build(&objects).unwrap();
    let graph = build_graph(&space);

    let components = sccs(&graph);

    let mut seen = indexmap::IndexSet::new();
    for component in &components {
        for node in component {
            assert!(seen.insert(node.clone()), "{node} appeared twice");
        }
    }
    assert_eq!(seen.len(), graph.edges.len());
}

#[test]
fn cross_component_edges_respect_reverse_topological_order() {
    let objects = objects(&[PRELUDE, CONSUMER]);
    let space = GlobalSpace::build(&objects).unwrap();
    let graph = build_graph(&space);

    let components = sccs(&graph);
    let index_of = |node: &str| {
        components
            .iter()
            .position(|c| c.iter().any(|n| n == node))
            .unwrap()
    };

    for (node, deps) in &graph.edges {
        for dep in deps {
            if index_of(node) != index_of(dep) {
                assert!(
                    index_of(dep) < index_of(node),
                    "dependency {dep} of {node} must be processed first"
                );
            }
        }
    }
}

#[test]
fn rec_self_edges_are_suppressed() {
    let objects = objects(&[indoc! {r"
        module M
        type Nat = #X => (X -> X) -> X -> X
        export main
        poly rec f : Nat -> Nat = \n:Nat => f n
        poly main = f
    "}]);
    let space = GlobalSpace::build(&objects).unwrap();

    let graph = build_graph(&space);

    assert!(!graph.has_self_loop("M.f"));
}

#[test]
fn recursive_type_aliases_are_detected_and_not_self_looped() {
    let objects = objects(&[indoc! {r"
        module M
        export main
        type SNat = #R => (SNat -> R) -> R -> R
        poly main = \n:SNat => n
    "}]);
    let space = GlobalSpace::build(&objects).unwrap();

    assert!(space.recursive_types.contains("M.SNat"));

    let graph = build_graph(&space);
    assert!(!graph.has_self_loop("M.SNat"));
}

#[test]
fn import_edges_only_exist_for_declared_imports() {
    // T declares imports; Prelude's own defs never point back at T.
    let objects = objects(&[PRELUDE, CONSUMER]);
    let space = GlobalSpace::build(&objects).unwrap();

    let graph = build_graph(&space);

    assert!(graph.edges["Prelude.succ"].is_empty());
    assert!(graph.edges["Prelude.zero"].is_empty());
}
