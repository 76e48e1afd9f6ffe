//! Dead-code sweeper.
//!
//! Runs after the jump simplifier stabilizes (and standalone as
//! [`remove_redundant_code`](crate::remove_redundant_code)): purges nops,
//! `leave` markers, and labels no branch still names, then removes the
//! redundant terminators the simplifier leaves behind: trailing continues,
//! case-final breaks after unconditional control flow, no-op switch cases,
//! trailing empty returns, and returns made unreachable by the statement
//! before them. When an unreachable return was removed the whole pass runs
//! again, since the shorter bodies may expose new fall-throughs.

use indexmap::IndexSet;

use mirzam_ast::{
    Ast, AstCode, Node, NodeId, is_unconditional_control_flow, match_code, match_label_operand,
    match_last,
};

use crate::indices::Indices;
use crate::walker::try_ancestors;
use crate::{RemovalStats, Result, simplify};

pub(crate) fn sweep_in(ast: &mut Ast, method: NodeId, stats: &mut RemovalStats) -> Result<()> {
    let indices = Indices::build(ast, method)?;
    let live_labels = collect_live_labels(ast, &indices, method);

    // Purge nops, leaves, and dead labels from every body.
    for owner in body_owners(ast, method) {
        stats.nodes_removed += retain_statements(ast, owner, |ast, stmt| {
            !(match_code(ast, stmt, AstCode::Nop)
                || match_code(ast, stmt, AstCode::Leave)
                || (matches!(ast.node(stmt), Node::Label(_)) && !live_labels.contains(&stmt)))
        });
    }

    // An entry goto folded to a nop is construction scaffolding with no
    // remaining meaning; drop it with the other nops.
    let folded_entries: Vec<NodeId> = ast
        .preorder(method)
        .into_iter()
        .filter(|&id| {
            matches!(
                ast.node(id),
                Node::Block(b) if b.entry_goto.is_some_and(|e| match_code(ast, e, AstCode::Nop))
            )
        })
        .collect();
    for block in folded_entries {
        ast.block_mut(block).entry_goto = None;
        stats.nodes_removed += 1;
    }

    // A loop body ending in `continue` restates the loop itself.
    for lp in collect_loops(ast, method) {
        let Node::Loop(l) = ast.node(lp) else { continue };
        let body = l.body;
        if match_last(ast, ast.block(body), AstCode::LoopContinue) {
            ast.block_mut(body).body.pop();
            stats.nodes_removed += 1;
        }
    }

    for switch in collect_switches(ast, method) {
        clean_switch(ast, switch, stats);
    }

    // Trailing empty return from the method body.
    let last = ast.block(method).body.last().copied();
    if let Some(last) = last {
        if is_empty_return(ast, last) {
            ast.block_mut(method).body.pop();
            stats.nodes_removed += 1;
        }
    }

    // Returns directly following unconditional control flow can never run.
    let mut removed_return = false;
    for owner in body_owners(ast, method) {
        let Some(body) = ast.node(owner).body() else {
            continue;
        };
        let mut body = body.to_vec();
        let mut removed_here = 0;
        let mut i = 1;
        while i < body.len() {
            if match_code(ast, body[i], AstCode::Return)
                && is_unconditional_control_flow(ast, body[i - 1])
            {
                body.remove(i);
                removed_here += 1;
            } else {
                i += 1;
            }
        }
        if removed_here > 0 {
            if let Some(b) = ast.node_mut(owner).body_mut() {
                *b = body;
            }
            stats.nodes_removed += removed_here;
            removed_return = true;
        }
    }

    if removed_return {
        // Shorter bodies may expose new fall-throughs; run the whole pass
        // again.
        simplify::remove_gotos_in(ast, method, stats)?;
    }
    Ok(())
}

/// Labels still named by a surviving branch expression.
///
/// A goto targeting the first statement of an enclosing finally body does
/// not keep its label alive: that jump is removed by a later lowering, and
/// a live label would block the cleanup.
fn collect_live_labels(ast: &Ast, indices: &Indices, method: NodeId) -> IndexSet<NodeId> {
    let mut live = IndexSet::new();
    for node in ast.preorder(method) {
        let Node::Expr(e) = ast.node(node) else {
            continue;
        };
        if !e.is_branch() {
            continue;
        }
        if let Some(target) = match_label_operand(ast, node, AstCode::Goto) {
            if jumps_to_enclosing_finally_entry(ast, indices, node, target) {
                continue;
            }
        }
        live.extend(e.branch_targets().iter().copied());
    }
    live
}

fn jumps_to_enclosing_finally_entry(
    ast: &Ast,
    indices: &Indices,
    goto: NodeId,
    target: NodeId,
) -> bool {
    try_ancestors(ast, indices, goto).any(|tc| {
        let Node::TryCatch(t) = ast.node(tc) else {
            return false;
        };
        t.finally_block
            .is_some_and(|f| ast.block(f).body.first() == Some(&target))
    })
}

fn clean_switch(ast: &mut Ast, switch: NodeId, stats: &mut RemovalStats) {
    let case_ids: Vec<NodeId> = match ast.node(switch) {
        Node::Switch(s) => s.cases.clone(),
        _ => return,
    };

    // A case-final break after unconditional control flow can never run.
    for &case in &case_ids {
        let drop_last = match ast.node(case) {
            Node::Case(c) => {
                let n = c.body.len();
                n >= 2
                    && is_unconditional_control_flow(ast, c.body[n - 2])
                    && match_code(ast, c.body[n - 1], AstCode::LoopOrSwitchBreak)
            }
            _ => false,
        };
        if drop_last {
            if let Node::Case(c) = ast.node_mut(case) {
                c.body.pop();
                stats.nodes_removed += 1;
            }
        }
    }

    // With no default case, or a default that only breaks, a case that
    // only breaks is a no-op.
    let default = case_ids
        .iter()
        .copied()
        .find(|&c| matches!(ast.node(c), Node::Case(cb) if cb.values.is_empty()));
    let default_removable = match default {
        None => true,
        Some(d) => is_single_break_case(ast, d),
    };
    if default_removable {
        let removable: Vec<NodeId> = case_ids
            .iter()
            .copied()
            .filter(|&c| is_single_break_case(ast, c))
            .collect();
        if !removable.is_empty() {
            if let Node::Switch(s) = ast.node_mut(switch) {
                s.cases.retain(|c| !removable.contains(c));
            }
            stats.nodes_removed += removable.len();
        }
    }
}

fn is_single_break_case(ast: &Ast, case: NodeId) -> bool {
    matches!(
        ast.node(case),
        Node::Case(c) if c.body.len() == 1 && match_code(ast, c.body[0], AstCode::LoopOrSwitchBreak)
    )
}

fn is_empty_return(ast: &Ast, node: NodeId) -> bool {
    matches!(
        ast.node(node),
        Node::Expr(e) if e.code == AstCode::Return && e.args.is_empty()
    )
}

fn body_owners(ast: &Ast, method: NodeId) -> Vec<NodeId> {
    ast.preorder(method)
        .into_iter()
        .filter(|&n| ast.node(n).body().is_some())
        .collect()
}

fn collect_loops(ast: &Ast, method: NodeId) -> Vec<NodeId> {
    ast.preorder(method)
        .into_iter()
        .filter(|&n| matches!(ast.node(n), Node::Loop(_)))
        .collect()
}

fn collect_switches(ast: &Ast, method: NodeId) -> Vec<NodeId> {
    ast.preorder(method)
        .into_iter()
        .filter(|&n| matches!(ast.node(n), Node::Switch(_)))
        .collect()
}

fn retain_statements(
    ast: &mut Ast,
    owner: NodeId,
    keep: impl Fn(&Ast, NodeId) -> bool,
) -> usize {
    let Some(body) = ast.node(owner).body() else {
        return 0;
    };
    let kept: Vec<NodeId> = body.iter().copied().filter(|&s| keep(ast, s)).collect();
    let removed = body.len() - kept.len();
    if removed > 0 {
        if let Some(b) = ast.node_mut(owner).body_mut() {
            *b = kept;
        }
    }
    removed
}
