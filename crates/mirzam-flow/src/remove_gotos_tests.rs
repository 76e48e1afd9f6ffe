//! End-to-end tests for the full pass: simplifier plus sweeper.

use indoc::indoc;
use mirzam_ast::{Ast, AstCode, AstPrinter, Node, NodeId, Operand, match_code};

use crate::{RemovalStats, remove_gotos};

fn dump(ast: &Ast, root: NodeId) -> String {
    AstPrinter::new(ast).dump(root)
}

/// Every label left in the tree must still be named by a branch.
fn assert_labels_live(ast: &Ast, root: NodeId) {
    let reachable = ast.preorder(root);
    let mut named = Vec::new();
    for &node in &reachable {
        if let Node::Expr(e) = ast.node(node) {
            named.extend(e.branch_targets().iter().copied());
        }
    }
    for &node in &reachable {
        if matches!(ast.node(node), Node::Label(_)) {
            assert!(named.contains(&node), "label #{node} survived unreferenced");
        }
    }
}

#[test]
fn direct_fall_through() {
    let mut ast = Ast::new();
    let l0 = ast.add_label("L0");
    let a = ast.add_expr(AstCode::Store, Operand::Local(0));
    let goto = ast.add_goto(l0);
    let root = ast.add_block(vec![goto, l0, a]);

    remove_gotos(&mut ast, root).unwrap();

    assert_eq!(
        dump(&ast, root),
        indoc! {"
            block
              store $0
        "}
    );
    assert_labels_live(&ast, root);
}

#[test]
fn loop_break() {
    let mut ast = Ast::new();
    let l1 = ast.add_label("L1");
    let goto = ast.add_goto(l1);
    let then_block = ast.add_block(vec![goto]);
    let else_block = ast.add_block(vec![]);
    let guard = ast.add_expr(AstCode::Load, Operand::Local(0));
    let cond = ast.add_condition(guard, then_block, else_block);
    let a = ast.add_expr(AstCode::Store, Operand::Local(1));
    let body = ast.add_block(vec![cond, a]);
    let lp = ast.add_loop(None, body);
    let b = ast.add_expr(AstCode::Store, Operand::Local(2));
    let root = ast.add_block(vec![lp, l1, b]);

    remove_gotos(&mut ast, root).unwrap();

    // The jump becomes a break; nothing else references L1, so it dies.
    assert!(match_code(&ast, goto, AstCode::LoopOrSwitchBreak));
    assert_eq!(ast.block(root).body, vec![lp, b]);
    assert_labels_live(&ast, root);
}

#[test]
fn loop_continue_leaves_a_clean_body() {
    let mut ast = Ast::new();
    let head = ast.add_label("L0");
    let a = ast.add_expr(AstCode::Store, Operand::Local(0));
    let goto = ast.add_goto(head);
    let condition = ast.add_expr(AstCode::Load, Operand::Local(1));
    let body = ast.add_block(vec![a, goto]);
    let lp = ast.add_loop(Some(condition), body);
    let root = ast.add_block(vec![head, lp]);

    remove_gotos(&mut ast, root).unwrap();

    // Whether the jump folds as fall-through or continues and is then
    // dropped as a trailing continue, the body ends up bare.
    assert_eq!(ast.block(body).body, vec![a]);
    assert_eq!(ast.block(root).body, vec![lp]);
    assert_labels_live(&ast, root);
}

#[test]
fn switch_case_cleanup() {
    let mut ast = Ast::new();
    let selector = ast.add_expr(AstCode::Load, Operand::Local(0));
    let a = ast.add_expr(AstCode::Store, Operand::Local(1));
    let brk1 = ast.add_expr(AstCode::LoopOrSwitchBreak, Operand::None);
    let brk2 = ast.add_expr(AstCode::LoopOrSwitchBreak, Operand::None);
    let case1 = ast.add_case(vec![1], vec![a, brk1]);
    let case2 = ast.add_case(vec![2], vec![brk2]);
    let switch = ast.add_switch(selector, vec![case1, case2]);
    let root = ast.add_block(vec![switch]);

    remove_gotos(&mut ast, root).unwrap();

    // Case 1 needs its break; case 2 is a no-op with no default to fall
    // into.
    let Node::Switch(s) = ast.node(switch) else {
        panic!("switch expected");
    };
    assert_eq!(s.cases, vec![case1]);
    let Node::Case(c) = ast.node(case1) else {
        panic!("case expected");
    };
    assert_eq!(c.body, vec![a, brk1]);
}

#[test]
fn unreachable_return() {
    let mut ast = Ast::new();
    let value = ast.add_expr(AstCode::LdC, Operand::Int(42));
    let ret42 = ast.add_expr_with_args(AstCode::Return, Operand::None, vec![value]);
    let bare = ast.add_expr(AstCode::Return, Operand::None);
    let root = ast.add_block(vec![ret42, bare]);

    remove_gotos(&mut ast, root).unwrap();

    assert_eq!(
        dump(&ast, root),
        indoc! {"
            block
              return(ldc 42)
        "}
    );
}

#[test]
fn jump_into_a_try_leaves_the_tree_unchanged() {
    let mut ast = Ast::new();
    let l0 = ast.add_label("L0");
    let a = ast.add_expr(AstCode::Store, Operand::Local(0));
    let b = ast.add_expr(AstCode::Store, Operand::Local(1));
    let try_block = ast.add_block(vec![a, l0, b]);
    let catch = ast.add_catch("java/lang/Exception", vec![]);
    let try_catch = ast.add_try_catch(try_block, vec![catch], None);
    let goto = ast.add_goto(l0);
    let root = ast.add_block(vec![goto, try_catch]);

    let before = dump(&ast, root);
    let stats = remove_gotos(&mut ast, root).unwrap();

    assert_eq!(stats, RemovalStats::default());
    assert_eq!(dump(&ast, root), before);
}

#[test]
fn pass_is_idempotent() {
    let mut ast = Ast::new();
    let l1 = ast.add_label("L1");
    let goto = ast.add_goto(l1);
    let then_block = ast.add_block(vec![goto]);
    let else_block = ast.add_block(vec![]);
    let guard = ast.add_expr(AstCode::Load, Operand::Local(0));
    let cond = ast.add_condition(guard, then_block, else_block);
    let a = ast.add_expr(AstCode::Store, Operand::Local(1));
    let body = ast.add_block(vec![cond, a]);
    let lp = ast.add_loop(None, body);
    let bare = ast.add_expr(AstCode::Return, Operand::None);
    let root = ast.add_block(vec![lp, l1, bare]);

    remove_gotos(&mut ast, root).unwrap();
    let first = dump(&ast, root);

    let stats = remove_gotos(&mut ast, root).unwrap();
    assert_eq!(stats, RemovalStats::default());
    assert_eq!(dump(&ast, root), first);
}

#[test]
fn no_case_ends_with_unconditional_flow_then_break() {
    let mut ast = Ast::new();
    let selector = ast.add_expr(AstCode::Load, Operand::Local(0));
    let throw = ast.add_expr(AstCode::AThrow, Operand::None);
    let brk = ast.add_expr(AstCode::LoopOrSwitchBreak, Operand::None);
    let a = ast.add_expr(AstCode::Store, Operand::Local(1));
    let case1 = ast.add_case(vec![1], vec![throw, brk]);
    let default = ast.add_case(vec![], vec![a]);
    let switch = ast.add_switch(selector, vec![case1, default]);
    let root = ast.add_block(vec![switch]);

    remove_gotos(&mut ast, root).unwrap();

    for &node in &ast.preorder(root) {
        let Node::Case(c) = ast.node(node) else {
            continue;
        };
        if let [.., a, b] = c.body[..] {
            let tail_is_redundant = mirzam_ast::is_unconditional_control_flow(&ast, a)
                && match_code(&ast, b, AstCode::LoopOrSwitchBreak);
            assert!(!tail_is_redundant, "case #{node} kept a redundant break");
        }
    }
}

#[test]
fn stats_accumulate_across_the_rerun() {
    let mut ast = Ast::new();
    let l0 = ast.add_label("L0");
    let goto = ast.add_goto(l0);
    let bare = ast.add_expr(AstCode::Return, Operand::None);
    let a = ast.add_expr(AstCode::Store, Operand::Local(0));
    let root = ast.add_block(vec![goto, bare, l0, a]);

    let stats = remove_gotos(&mut ast, root).unwrap();

    assert_eq!(stats.gotos_folded, 1);
    assert!(stats.nodes_removed >= 3);
    assert_eq!(
        dump(&ast, root),
        indoc! {"
            block
              store $0
        "}
    );
}
