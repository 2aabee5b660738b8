//! Cross-module dependency graph and Tarjan SCC.
//!
//! Nodes are qualified `Module.symbol` names; edges point from a definition
//! to every qualified external term and type reference in its body. `rec`
//! self-edges and recursive-alias self-edges are suppressed, so simple
//! recursion stays a singleton component; everything else cyclic lands in a
//! multi-node (or self-loop) SCC for the fix-point.
//!
//! Tarjan emits components in reverse topological order, leaves first, and
//! is deterministic for a given module list: node order is module order then
//! definition order.

use indexmap::{IndexMap, IndexSet};
use triplang_core::Def;
use triplang_core::free_vars::external_refs;

use crate::space::GlobalSpace;

#[derive(Debug, Default)]
pub struct DepGraph {
    /// Node → qualified dependencies, in first-reference order.
    pub edges: IndexMap<String, IndexSet<String>>,
}

impl DepGraph {
    pub fn has_self_loop(&self, node: &str) -> bool {
        self.edges
            .get(node)
            .is_some_and(|deps| deps.contains(node))
    }
}

/// Build the dependency graph of every definition in the space.
pub fn build_graph(space: &GlobalSpace) -> DepGraph {
    let mut graph = DepGraph::default();

    for (qualified, entry) in space.terms.iter().chain(space.types.iter()) {
        let mut deps = IndexSet::new();
        let (refs, own_name, suppress_self) = match &entry.def {
            Def::Type { name, ty } => (external_refs(ty), name.clone(), true),
            def => {
                let name = def.defined_name().unwrap_or_default().to_owned();
                let term = def.term().expect("term defs carry a term");
                (external_refs(term), name, def.is_rec())
            }
        };

        for term_ref in &refs.terms {
            if suppress_self && term_ref == &own_name {
                continue;
            }
            if let Some(target) = space.resolve_term_ref(&entry.module, term_ref) {
                deps.insert(target);
            }
        }
        for type_ref in &refs.types {
            if suppress_self && type_ref == &own_name {
                continue;
            }
            if let Some(target) = space.resolve_type_ref(&entry.module, type_ref) {
                deps.insert(target);
            }
        }
        graph.edges.insert(qualified.clone(), deps);
    }

    graph
}

/// Tarjan's strongly connected components, reverse topological order.
pub fn sccs(graph: &DepGraph) -> Vec<Vec<String>> {
    SccFinder::find(graph)
}

struct SccFinder<'a> {
    graph: &'a DepGraph,
    index: usize,
    stack: Vec<&'a str>,
    on_stack: IndexSet<&'a str>,
    indices: IndexMap<&'a str, usize>,
    lowlinks: IndexMap<&'a str, usize>,
    sccs: Vec<Vec<&'a str>>,
}

impl<'a> SccFinder<'a> {
    fn find(graph: &'a DepGraph) -> Vec<Vec<String>> {
        let mut finder = Self {
            graph,
            index: 0,
            stack: Vec::new(),
            on_stack: IndexSet::new(),
            indices: IndexMap::new(),
            lowlinks: IndexMap::new(),
            sccs: Vec::new(),
        };

        for node in graph.edges.keys() {
            if !finder.indices.contains_key(node.as_str()) {
                finder.strongconnect(node);
            }
        }

        finder
            .sccs
            .into_iter()
            .map(|scc| scc.into_iter().map(String::from).collect())
            .collect()
    }

    fn strongconnect(&mut self, node: &'a str) {
        self.indices.insert(node, self.index);
        self.lowlinks.insert(node, self.index);
        self.index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let graph = self.graph;
        let deps: Vec<&'a str> = graph
            .edges
            .get(node)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default();
        for dep in deps {
            if !self.indices.contains_key(dep) {
                self.strongconnect(dep);
                let dep_lowlink = self.lowlinks[dep];
                let own = self.lowlinks.get_mut(node).expect("visited");
                *own = (*own).min(dep_lowlink);
            } else if self.on_stack.contains(dep) {
                let dep_index = self.indices[dep];
                let own = self.lowlinks.get_mut(node).expect("visited");
                *own = (*own).min(dep_index);
            }
        }

        if self.lowlinks[node] == self.indices[node] {
            let mut scc = Vec::new();
            loop {
                let member = self.stack.pop().expect("stack holds the component");
                self.on_stack.swap_remove(member);
                let done = member == node;
                scc.push(member);
                if done {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}
