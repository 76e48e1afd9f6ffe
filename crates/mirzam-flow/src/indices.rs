//! Structural indices over a method AST.
//!
//! Three identity-keyed maps, built by one depth-first walk at every pass
//! entry and discarded on exit: a parent map, a next-sibling map inside
//! ordered bodies, and a label index associating each statement with the
//! label immediately preceding it.

use std::collections::HashMap;

use mirzam_ast::{Ast, Node, NodeId};

use crate::{Error, Result};

/// Parent, sibling, and label lookups for one pass invocation.
#[derive(Debug)]
pub struct Indices {
    parents: HashMap<NodeId, NodeId>,
    siblings: HashMap<NodeId, NodeId>,
    labels: HashMap<NodeId, NodeId>,
}

impl Indices {
    /// Walk the tree under `root` and record parent, sibling, and label
    /// links. Fails if any node is reachable through two parents: with an
    /// aliased node the parent map is ill-defined and no walk can be
    /// trusted.
    pub fn build(ast: &Ast, root: NodeId) -> Result<Self> {
        let mut indices = Self {
            parents: HashMap::new(),
            siblings: HashMap::new(),
            labels: HashMap::new(),
        };
        indices.visit(ast, root)?;
        Ok(indices)
    }

    fn visit(&mut self, ast: &Ast, node: NodeId) -> Result<()> {
        let children = ast.children(node);
        for &child in &children {
            if self.parents.insert(child, node).is_some() {
                return Err(Error::MultipleParents(child));
            }
        }
        // Sibling and label links exist only inside ordered bodies.
        if let Some(body) = ast.node(node).body() {
            for pair in body.windows(2) {
                self.siblings.insert(pair[0], pair[1]);
                if matches!(ast.node(pair[0]), Node::Label(_)) {
                    self.labels.insert(pair[1], pair[0]);
                }
            }
        }
        for child in children {
            self.visit(ast, child)?;
        }
        Ok(())
    }

    /// Structural parent, or `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Next statement in the enclosing body, if any.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.siblings.get(&node).copied()
    }

    /// The label immediately preceding `node` in its body, if any.
    pub fn label_before(&self, node: NodeId) -> Option<NodeId> {
        self.labels.get(&node).copied()
    }

    /// Lazy chain `parent, parent.parent, ...` up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }
}
