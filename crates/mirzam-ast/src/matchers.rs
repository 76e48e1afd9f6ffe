//! Pattern-matching helpers over expressions.
//!
//! Small predicates shared by every pass that inspects statement shapes.

use crate::code::AstCode;
use crate::node::{Ast, Block, Node, NodeId};

/// True if `node` is an expression with the given opcode.
pub fn match_code(ast: &Ast, node: NodeId, code: AstCode) -> bool {
    matches!(ast.node(node), Node::Expr(e) if e.code == code)
}

/// The label operand of `node`, if it is an expression with the given
/// opcode and a single-label operand.
pub fn match_label_operand(ast: &Ast, node: NodeId, code: AstCode) -> Option<NodeId> {
    match ast.node(node) {
        Node::Expr(e) if e.code == code => e.operand.label(),
        _ => None,
    }
}

/// True if the block's last statement is an expression with the given
/// opcode.
pub fn match_last(ast: &Ast, block: &Block, code: AstCode) -> bool {
    block
        .body
        .last()
        .is_some_and(|&last| match_code(ast, last, code))
}

/// True if `node` is an expression that never falls through.
pub fn is_unconditional_control_flow(ast: &Ast, node: NodeId) -> bool {
    matches!(ast.node(node), Node::Expr(e) if e.is_unconditional_control_flow())
}
