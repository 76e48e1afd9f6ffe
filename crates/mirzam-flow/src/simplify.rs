//! Jump simplifier: rewrites `goto` expressions to structured equivalents.
//!
//! Each sweep visits every reachable goto and tries, in order of strength:
//! fall-through (the jump lands where control would flow anyway), implicit
//! finally entry (the jump lands on an enclosing finally head), `break`
//! out of the innermost loop or switch, and `continue` of the innermost
//! loop. Sweeps repeat until none of them fires. Rewrites only touch the
//! expression in place, so the structural indices stay valid for the
//! whole fixpoint.

use std::collections::HashSet;

use mirzam_ast::{Ast, AstCode, Node, NodeId, Operand, match_label_operand};

use crate::indices::Indices;
use crate::walker::{Walker, try_ancestors};
use crate::{RemovalStats, Result, sweep};

/// Run the simplifier to a fixpoint, then sweep. Re-entered by the
/// sweeper when its removals may have exposed new simplifications.
pub(crate) fn remove_gotos_in(
    ast: &mut Ast,
    method: NodeId,
    stats: &mut RemovalStats,
) -> Result<()> {
    let indices = Indices::build(ast, method)?;
    loop {
        let gotos: Vec<NodeId> = ast
            .preorder(method)
            .into_iter()
            .filter(|&n| match_label_operand(ast, n, AstCode::Goto).is_some())
            .collect();
        let mut modified = false;
        for goto in gotos {
            modified |= try_simplify(ast, &indices, goto, stats)?;
        }
        if !modified {
            break;
        }
    }
    sweep::sweep_in(ast, method, stats)
}

/// The rewrite chosen for one goto.
enum Rewrite {
    /// Fold to `nop`; the target expression absorbs the goto's ranges.
    FallThrough(NodeId),
    /// Fold to `nop`; the jump is equivalent to falling into an enclosing
    /// finally, so its ranges are dropped.
    FinallyEntry,
    Break,
    Continue,
}

fn try_simplify(
    ast: &mut Ast,
    indices: &Indices,
    goto: NodeId,
    stats: &mut RemovalStats,
) -> Result<bool> {
    let Some(rewrite) = decide(ast, indices, goto)? else {
        return Ok(false);
    };
    match rewrite {
        Rewrite::FallThrough(target) => {
            let ranges = match ast.expr_mut(goto) {
                Some(e) => {
                    e.code = AstCode::Nop;
                    e.operand = Operand::None;
                    std::mem::take(&mut e.ranges)
                }
                None => return Ok(false),
            };
            if let Some(t) = ast.expr_mut(target) {
                t.absorb_ranges(ranges);
            }
            stats.gotos_folded += 1;
        }
        Rewrite::FinallyEntry => {
            if let Some(e) = ast.expr_mut(goto) {
                e.code = AstCode::Nop;
                e.operand = Operand::None;
                e.ranges.clear();
            }
            stats.gotos_folded += 1;
        }
        Rewrite::Break => {
            if let Some(e) = ast.expr_mut(goto) {
                e.code = AstCode::LoopOrSwitchBreak;
                e.operand = Operand::None;
            }
            stats.breaks_introduced += 1;
        }
        Rewrite::Continue => {
            if let Some(e) = ast.expr_mut(goto) {
                e.code = AstCode::LoopContinue;
                e.operand = Operand::None;
            }
            stats.continues_introduced += 1;
        }
    }
    Ok(true)
}

/// Pick the strongest applicable rewrite for `goto`, or `None`.
///
/// Every test below walks with a fresh visited set seeded with the goto
/// itself, so the walk can never traverse the expression being rewritten.
fn decide(ast: &Ast, indices: &Indices, goto: NodeId) -> Result<Option<Rewrite>> {
    let walker = Walker::new(ast, indices);

    let target = {
        let mut visited = HashSet::new();
        walker.enter(goto, &mut visited)?
    };
    let Some(target) = target else {
        return Ok(None);
    };

    // Fall-through: the jump lands exactly where control would go anyway.
    let mut visited = HashSet::from([goto]);
    if walker.exit(goto, &mut visited)? == Some(target) {
        return Ok(Some(Rewrite::FallThrough(target)));
    }

    // A jump to an enclosing finally's entry is equivalent to falling off
    // the end of the protected region.
    for try_catch in try_ancestors(ast, indices, goto) {
        let Node::TryCatch(t) = ast.node(try_catch) else {
            continue;
        };
        if let Some(finally) = t.finally_block {
            let mut visited = HashSet::from([goto]);
            if walker.enter(finally, &mut visited)? == Some(target) {
                return Ok(Some(Rewrite::FinallyEntry));
            }
        }
    }

    // Break out of the innermost loop or switch.
    let break_block = indices
        .ancestors(goto)
        .find(|&n| matches!(ast.node(n), Node::Loop(_) | Node::Switch(_)));
    if let Some(block) = break_block {
        let mut visited = HashSet::from([goto]);
        if walker.exit(block, &mut visited)? == Some(target) {
            return Ok(Some(Rewrite::Break));
        }
    }

    // Continue the innermost loop.
    let continue_loop = indices
        .ancestors(goto)
        .find(|&n| matches!(ast.node(n), Node::Loop(_)));
    if let Some(lp) = continue_loop {
        let mut visited = HashSet::from([goto]);
        if walker.enter(lp, &mut visited)? == Some(target) {
            return Ok(Some(Rewrite::Continue));
        }
    }

    Ok(None)
}
