//! The declaration dependency graph and its strongly connected
//! components.
//!
//! For each namespace, nodes are its declarations and edges go from a
//! declaration to every declaration it references by name in its type
//! annotations, initializers, bodies, or extends clauses. References that
//! resolve outside the namespace (imports, other namespaces, locals that
//! shadow) contribute no edge; they act as sinks resolved through the
//! scope at inference time.
//!
//! Components are processed in the order Tarjan's algorithm emits them,
//! which is reverse topological: every reference out of a component lands
//! in a component that has already been inferred.

use escalier_ast::visitor::{walk_decl, Visitor};
use escalier_ast::{DeclKind, Expr, ExprKind, Namespace, Pattern, PatternKind, TypeAnn, TypeAnnKind};
use rustc_hash::FxHashMap;

/// Reference edges between a namespace's declarations, indexed by
/// declaration position.
#[derive(Debug)]
pub struct DepGraph {
    pub edges: Vec<Vec<usize>>,
}

impl DepGraph {
    /// Build the reference graph for one namespace.
    pub fn build(namespace: &Namespace) -> Self {
        let mut value_names: FxHashMap<String, usize> = FxHashMap::default();
        let mut type_names: FxHashMap<String, usize> = FxHashMap::default();
        let mut variant_names: FxHashMap<String, usize> = FxHashMap::default();

        for (i, decl) in namespace.decls.iter().enumerate() {
            match &decl.kind {
                DeclKind::Var { pattern, .. } => {
                    for name in escalier_ast::find_bindings(pattern) {
                        value_names.entry(name).or_insert(i);
                    }
                }
                DeclKind::Func { name, .. } => {
                    value_names.entry(name.name.clone()).or_insert(i);
                }
                DeclKind::TypeAlias { name, .. } | DeclKind::Interface { name, .. } => {
                    type_names.entry(name.name.clone()).or_insert(i);
                }
                DeclKind::Enum { name, members, .. } => {
                    type_names.entry(name.name.clone()).or_insert(i);
                    value_names.entry(name.name.clone()).or_insert(i);
                    for member in members {
                        if let escalier_ast::EnumMember::Variant { name, .. } = member {
                            variant_names.entry(name.name.clone()).or_insert(i);
                        }
                    }
                }
                DeclKind::Class { name, .. } => {
                    type_names.entry(name.name.clone()).or_insert(i);
                    value_names.entry(name.name.clone()).or_insert(i);
                }
                DeclKind::Namespace { .. } => {}
            }
        }

        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); namespace.decls.len()];
        for (i, decl) in namespace.decls.iter().enumerate() {
            let mut collector = RefCollector {
                value_names: &value_names,
                type_names: &type_names,
                variant_names: &variant_names,
                current: i,
                edges: &mut edges,
            };
            // Extends clauses reference by qualified identifier rather
            // than by annotation node, so they are collected up front.
            match &decl.kind {
                DeclKind::Interface { extends, .. } => {
                    for (name, _) in extends {
                        collector.add_type_edge(&name.head().name);
                    }
                }
                DeclKind::Class { extends: Some((name, _)), .. } => {
                    collector.add_type_edge(&name.head().name);
                }
                _ => {}
            }
            walk_decl(&mut collector, decl);
        }
        for targets in edges.iter_mut() {
            targets.sort_unstable();
            targets.dedup();
        }

        DepGraph { edges }
    }

    /// Strongly connected components in reverse topological order.
    pub fn sccs(&self) -> Vec<Vec<usize>> {
        tarjan(self.edges.len(), &self.edges)
    }
}

struct RefCollector<'a> {
    value_names: &'a FxHashMap<String, usize>,
    type_names: &'a FxHashMap<String, usize>,
    variant_names: &'a FxHashMap<String, usize>,
    current: usize,
    edges: &'a mut Vec<Vec<usize>>,
}

impl RefCollector<'_> {
    fn add_edge(&mut self, target: usize) {
        self.edges[self.current].push(target);
    }

    fn add_value_edge(&mut self, name: &str) {
        if let Some(&target) = self.value_names.get(name) {
            self.add_edge(target);
        }
    }

    fn add_type_edge(&mut self, name: &str) {
        if let Some(&target) = self.type_names.get(name) {
            self.add_edge(target);
        }
    }
}

impl Visitor for RefCollector<'_> {
    fn enter_expr(&mut self, expr: &Expr) -> bool {
        if let ExprKind::Ident { name } = &expr.kind {
            self.add_value_edge(&name.name);
        }
        true
    }

    fn enter_pattern(&mut self, pattern: &Pattern) -> bool {
        match &pattern.kind {
            PatternKind::Extractor { name, .. } => {
                let head = &name.head().name;
                if self.type_names.contains_key(head) {
                    self.add_type_edge(head);
                } else if let Some(&target) = self.variant_names.get(head) {
                    self.add_edge(target);
                }
            }
            PatternKind::Instance { class_name, .. } => {
                self.add_type_edge(&class_name.head().name);
            }
            _ => {}
        }
        true
    }

    fn enter_type_ann(&mut self, type_ann: &TypeAnn) -> bool {
        match &type_ann.kind {
            TypeAnnKind::Ref { name, .. } => self.add_type_edge(&name.head().name),
            TypeAnnKind::TypeOf { target } => self.add_value_edge(&target.head().name),
            _ => {}
        }
        true
    }
}

/// Tarjan's strongly-connected-components algorithm. Nodes are visited in
/// index order, so the output is deterministic for a given declaration
/// order. Components are emitted dependencies-first.
fn tarjan(n: usize, edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    struct State<'a> {
        edges: &'a [Vec<usize>],
        index: Vec<Option<u32>>,
        lowlink: Vec<u32>,
        on_stack: Vec<bool>,
        stack: Vec<usize>,
        next_index: u32,
        out: Vec<Vec<usize>>,
    }

    fn strongconnect(state: &mut State, v: usize) {
        state.index[v] = Some(state.next_index);
        state.lowlink[v] = state.next_index;
        state.next_index += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for &w in &state.edges[v] {
            match state.index[w] {
                None => {
                    strongconnect(state, w);
                    state.lowlink[v] = state.lowlink[v].min(state.lowlink[w]);
                }
                Some(w_index) if state.on_stack[w] => {
                    state.lowlink[v] = state.lowlink[v].min(w_index);
                }
                _ => {}
            }
        }

        if state.lowlink[v] == state.index[v].expect("v was just indexed") {
            let mut component = Vec::new();
            loop {
                let w = state.stack.pop().expect("stack holds the component");
                state.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            // Keep declaration order within the component.
            component.sort_unstable();
            state.out.push(component);
        }
    }

    let mut state = State {
        edges,
        index: vec![None; n],
        lowlink: vec![0; n],
        on_stack: vec![false; n],
        stack: Vec::new(),
        next_index: 0,
        out: Vec::new(),
    };
    for v in 0..n {
        if state.index[v].is_none() {
            strongconnect(&mut state, v);
        }
    }
    state.out
}
