//! Structured method AST for Mirzam decompilation passes.
//!
//! A decompiled method body is a tree of [`Node`]s held in an arena
//! ([`Ast`]) and addressed by [`NodeId`]. Labels and jump expressions
//! overlay a control-flow graph on the tree; every cross-reference is keyed
//! by node identity (the arena index), never by structural equality.
//!
//! - `node` - node variants and the arena
//! - `code` - opcode set and control-flow predicates
//! - `matchers` - pattern-matching helpers over expressions
//! - `dump` - text rendering for inspection and snapshot tests

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod code;
mod dump;
mod matchers;
mod node;
mod range;


pub use code::AstCode;
pub use dump::AstPrinter;
pub use matchers::{is_unconditional_control_flow, match_code, match_label_operand, match_last};
pub use node::{
    Ast, Block, Case, Catch, Condition, Expr, Label, Loop, Node, NodeId, Operand, Switch, TryCatch,
};
pub use range::OffsetRange;
