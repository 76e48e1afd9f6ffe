//! Semantic enter/exit walker.
//!
//! Answers the question "if control is currently at node N, what is the
//! next semantically meaningful node that executes": [`Walker::enter`]
//! computes the first node reached when control arrives at N,
//! [`Walker::exit`] the node that runs after N completes. The two are
//! mutually recursive and share one visited set per top-level query; a
//! repeated entry means the walk cycled through gotos and yields `None`.
//! The walker never mutates the AST.

use std::collections::HashSet;

use mirzam_ast::{Ast, AstCode, Node, NodeId, Operand};

use crate::indices::Indices;
use crate::{Error, Result};

pub(crate) struct Walker<'a> {
    ast: &'a Ast,
    indices: &'a Indices,
}

impl<'a> Walker<'a> {
    pub fn new(ast: &'a Ast, indices: &'a Indices) -> Self {
        Self { ast, indices }
    }

    /// First semantic node executed when control arrives at `node`.
    ///
    /// `None` means the walk is unresolvable here: a cycle, a dangling
    /// jump, a fall-off past a switch frontier, or a jump that may not
    /// enter a try region sideways.
    pub fn enter(
        &self,
        node: NodeId,
        visited: &mut HashSet<NodeId>,
    ) -> Result<Option<NodeId>> {
        if !visited.insert(node) {
            // Cycled back through a goto; there is no meaningful successor.
            return Ok(None);
        }
        match self.ast.node(node) {
            // Labels are transparent markers.
            Node::Label(_) => self.exit(node, visited),
            Node::Expr(e) => match e.code {
                AstCode::Goto => match e.operand {
                    Operand::Label(target) => self.enter_goto_target(node, target, visited),
                    // Malformed goto; decline to resolve it.
                    _ => Ok(None),
                },
                _ => Ok(Some(node)),
            },
            Node::Block(b) => {
                if let Some(entry) = b.entry_goto {
                    self.enter(entry, visited)
                } else if let Some(&first) = b.body.first() {
                    self.enter(first, visited)
                } else {
                    self.exit(node, visited)
                }
            }
            Node::Case(c) => match c.body.first() {
                Some(&first) => self.enter(first, visited),
                None => self.exit(node, visited),
            },
            Node::Catch(c) => match c.body.first() {
                Some(&first) => self.enter(first, visited),
                None => self.exit(node, visited),
            },
            Node::Condition(c) => Ok(Some(c.condition)),
            Node::Loop(l) => match l.condition {
                Some(condition) => Ok(Some(condition)),
                None => self.enter(l.body, visited),
            },
            Node::Switch(s) => Ok(Some(s.condition)),
            // Opaque: a try region is never entered mid-walk; control
            // arriving here stops at the frame itself.
            Node::TryCatch(_) => Ok(Some(node)),
        }
    }

    /// Next semantic node executed after `node` completes.
    pub fn exit(&self, node: NodeId, visited: &mut HashSet<NodeId>) -> Result<Option<NodeId>> {
        let Some(parent) = self.indices.parent(node) else {
            // Exited the method.
            return Ok(None);
        };
        match self.ast.node(parent) {
            Node::Block(_) | Node::Case(_) | Node::Catch(_) => {
                match self.indices.next_sibling(node) {
                    Some(sibling) => self.enter(sibling, visited),
                    None => self.exit(parent, visited),
                }
            }
            // Both arms converge after the condition.
            Node::Condition(_) => self.exit(parent, visited),
            Node::TryCatch(_) => self.exit(parent, visited),
            // Falling off the end of a case is not permitted; it must
            // break explicitly.
            Node::Switch(_) => Ok(None),
            // Completed an iteration; re-enter the loop head.
            Node::Loop(_) => self.enter(parent, visited),
            Node::Expr(_) => Err(Error::UnsupportedNode("expression")),
            Node::Label(_) => Err(Error::UnsupportedNode("label")),
        }
    }

    /// Resolve a goto at `source` jumping to `target`.
    ///
    /// A jump may leave any number of try regions but may not enter one
    /// from the side: the implicit stack of tried frames on entry would
    /// differ. The only permitted entry is a jump to the very start of a
    /// try body, which is equivalent to entering the try statement itself.
    fn enter_goto_target(
        &self,
        source: NodeId,
        target: NodeId,
        visited: &mut HashSet<NodeId>,
    ) -> Result<Option<NodeId>> {
        if self.nearest_try(source) == self.nearest_try(target) {
            return self.enter(target, visited);
        }

        // Root-to-node try chains with the common prefix skipped.
        let source_chain = self.try_chain(source);
        let target_chain = self.try_chain(target);
        let common = source_chain
            .iter()
            .zip(&target_chain)
            .take_while(|(s, t)| s == t)
            .count();

        if common == target_chain.len() {
            // The target is inside every try frame the source is in; the
            // jump only leaves frames.
            return self.enter(target, visited);
        }

        let boundary = target_chain[common];
        if self.is_try_entry_label(boundary, target) {
            Ok(Some(boundary))
        } else {
            Ok(None)
        }
    }

    fn nearest_try(&self, node: NodeId) -> Option<NodeId> {
        self.indices
            .ancestors(node)
            .find(|&n| matches!(self.ast.node(n), Node::TryCatch(_)))
    }

    /// Try ancestors of `node`, ordered root-to-node.
    fn try_chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = self
            .indices
            .ancestors(node)
            .filter(|&n| matches!(self.ast.node(n), Node::TryCatch(_)))
            .collect();
        chain.reverse();
        chain
    }

    /// True if `target` marks the entry position of `try_catch`'s try
    /// body: among its leading nops and labels (descending into nested
    /// try bodies), or immediately preceding the first real statement.
    fn is_try_entry_label(&self, try_catch: NodeId, target: NodeId) -> bool {
        let Node::TryCatch(t) = self.ast.node(try_catch) else {
            return false;
        };
        let mut body: &[NodeId] = &self.ast.block(t.try_block).body;
        let mut i = 0;
        loop {
            let Some(&stmt) = body.get(i) else {
                return false;
            };
            if stmt == target {
                return true;
            }
            match self.ast.node(stmt) {
                Node::Label(_) => i += 1,
                Node::Expr(e) if e.code == AstCode::Nop => i += 1,
                Node::TryCatch(inner) => {
                    body = &self.ast.block(inner.try_block).body;
                    i = 0;
                }
                _ => return self.indices.label_before(stmt) == Some(target),
            }
        }
    }
}

/// Enclosing try/catch statements of `node`, innermost first.
pub(crate) fn try_ancestors<'a>(
    ast: &'a Ast,
    indices: &'a Indices,
    node: NodeId,
) -> impl Iterator<Item = NodeId> + 'a {
    indices
        .ancestors(node)
        .filter(move |&n| matches!(ast.node(n), Node::TryCatch(_)))
}
