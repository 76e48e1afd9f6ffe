//! Control-flow reconstruction for decompiled method bodies.
//!
//! Earlier decompilation stages produce a structured AST (blocks,
//! conditions, loops, switches, try/catch) still littered with the raw
//! `goto` jumps of the original bytecode. The passes here eliminate those
//! gotos by rewriting each into a cheaper structured equivalent (`nop`
//! fall-through, `break`, `continue`) and then sweep out the scaffolding
//! that remains: unreferenced labels, nops, `leave` markers, redundant
//! terminators, and unreachable returns.
//!
//! Two public entry points share the machinery:
//!
//! - [`remove_gotos`] runs the jump simplifier to a fixpoint, then sweeps;
//! - [`remove_redundant_code`] is the standalone sweeper, which re-runs
//!   the whole pass when its removals may have exposed new
//!   simplifications.
//!
//! Both mutate the caller-owned [`Ast`] in place. All auxiliary indices
//! (parent, sibling, and label maps) are built at entry, keyed by node
//! identity, and discarded on return.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod indices;
mod simplify;
mod sweep;
mod walker;

#[cfg(test)]
mod remove_gotos_tests;

pub use indices::Indices;

use mirzam_ast::{Ast, NodeId};

/// Errors surfaced by the control-flow passes.
///
/// Both variants indicate an ill-formed input tree. Unresolvable jumps,
/// cyclic walks, and dangling labels are handled internally: the walker
/// reports no successor and the simplifier leaves that goto alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A node was reached through two distinct parents while building the
    /// parent map.
    #[error("node #{0} is linked from more than one parent")]
    MultipleParents(NodeId),

    /// Control flow walked into a structural position that has no defined
    /// successor (e.g. exiting a node whose parent is an expression).
    #[error("cannot walk control flow through a {0} parent")]
    UnsupportedNode(&'static str),
}

/// Result type for the control-flow passes.
pub type Result<T> = std::result::Result<T, Error>;

/// Counters reported by [`remove_gotos`] and [`remove_redundant_code`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemovalStats {
    /// Gotos folded to `nop` (fall-through or an implicit finally entry).
    pub gotos_folded: usize,
    /// Gotos rewritten to `LoopOrSwitchBreak`.
    pub breaks_introduced: usize,
    /// Gotos rewritten to `LoopContinue`.
    pub continues_introduced: usize,
    /// Statements removed by the dead-code sweep.
    pub nodes_removed: usize,
}

/// Eliminate `goto` expressions under `method`, rewriting them into
/// structured control flow where possible, then sweep redundant code.
///
/// `method` must be the root block of a method body; the tree is mutated
/// in place. Gotos that cannot be proven equivalent to a structured
/// construct are left untouched.
pub fn remove_gotos(ast: &mut Ast, method: NodeId) -> Result<RemovalStats> {
    let mut stats = RemovalStats::default();
    simplify::remove_gotos_in(ast, method, &mut stats)?;
    Ok(stats)
}

/// Remove dead labels, `nop`s, `leave`s, and redundant terminators under
/// `method`.
///
/// Re-runs the whole goto-removal pass when a removal may have exposed
/// further simplifications.
pub fn remove_redundant_code(ast: &mut Ast, method: NodeId) -> Result<RemovalStats> {
    let mut stats = RemovalStats::default();
    sweep::sweep_in(ast, method, &mut stats)?;
    Ok(stats)
}
