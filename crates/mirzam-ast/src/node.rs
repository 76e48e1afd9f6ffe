//! Arena-backed AST nodes for a decompiled method body.
//!
//! Nodes are stored in a flat vector and referenced by [`NodeId`]. The tree
//! is mutable in place: flow passes rewrite expressions and splice block
//! bodies without cloning nodes. Identity is the arena index; labels and
//! jump operands are cross-references by id, not structural children.
//! Detached nodes stay allocated until the arena is dropped.

use indexmap::IndexSet;

use crate::code::AstCode;
use crate::range::OffsetRange;

/// Index into [`Ast`]'s node arena.
pub type NodeId = u32;

/// A node of the structured method AST.
#[derive(Debug, Clone)]
pub enum Node {
    Block(Block),
    Expr(Expr),
    Label(Label),
    Condition(Condition),
    Loop(Loop),
    Switch(Switch),
    Case(Case),
    TryCatch(TryCatch),
    Catch(Catch),
}

impl Node {
    /// Variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Block(_) => "block",
            Node::Expr(_) => "expression",
            Node::Label(_) => "label",
            Node::Condition(_) => "condition",
            Node::Loop(_) => "loop",
            Node::Switch(_) => "switch",
            Node::Case(_) => "case",
            Node::TryCatch(_) => "try/catch",
            Node::Catch(_) => "catch",
        }
    }

    /// Ordered statement list, for the block-like variants.
    pub fn body(&self) -> Option<&[NodeId]> {
        match self {
            Node::Block(b) => Some(&b.body),
            Node::Case(c) => Some(&c.body),
            Node::Catch(c) => Some(&c.body),
            _ => None,
        }
    }

    /// Mutable statement list, for the block-like variants.
    pub fn body_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Node::Block(b) => Some(&mut b.body),
            Node::Case(c) => Some(&mut c.body),
            Node::Catch(c) => Some(&mut c.body),
            _ => None,
        }
    }
}

/// Ordered statement list. `entry_goto` is a construction-time jump into
/// the block; the flow passes fold it away like any other goto.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub entry_goto: Option<NodeId>,
    pub body: Vec<NodeId>,
}

/// Jump target marker. Identity-only; the name exists for rendering.
#[derive(Debug, Clone)]
pub struct Label {
    pub name: String,
}

/// An expression: opcode, operand, argument expressions, and the set of
/// bytecode ranges it was decompiled from.
#[derive(Debug, Clone)]
pub struct Expr {
    pub code: AstCode,
    pub operand: Operand,
    pub args: Vec<NodeId>,
    pub ranges: IndexSet<OffsetRange>,
}

impl Expr {
    pub fn new(code: AstCode, operand: Operand) -> Self {
        Self {
            code,
            operand,
            args: Vec::new(),
            ranges: IndexSet::new(),
        }
    }

    /// Labels this expression may branch to.
    pub fn branch_targets(&self) -> &[NodeId] {
        match &self.operand {
            Operand::Label(label) => std::slice::from_ref(label),
            Operand::Labels(labels) => labels,
            _ => &[],
        }
    }

    /// True if the expression carries at least one branch target.
    pub fn is_branch(&self) -> bool {
        !self.branch_targets().is_empty()
    }

    /// True if control never falls through to the textual successor.
    pub fn is_unconditional_control_flow(&self) -> bool {
        self.code.is_unconditional_control_flow()
    }

    /// Union the given range markers into this expression's set.
    pub fn absorb_ranges(&mut self, ranges: impl IntoIterator<Item = OffsetRange>) {
        self.ranges.extend(ranges);
    }
}

/// Expression operand.
#[derive(Debug, Clone)]
pub enum Operand {
    None,
    /// Single branch target (`Goto`, `IfTrue`).
    Label(NodeId),
    /// Multi-way branch targets (`Switch`).
    Labels(Vec<NodeId>),
    /// Local variable slot.
    Local(u16),
    /// Integer constant.
    Int(i64),
}

impl Operand {
    /// The single label target, if this is a `Label` operand.
    pub fn label(&self) -> Option<NodeId> {
        match self {
            Operand::Label(label) => Some(*label),
            _ => None,
        }
    }
}

/// Two-armed conditional. Both arms are blocks; control converges after.
#[derive(Debug, Clone)]
pub struct Condition {
    pub condition: NodeId,
    pub then_block: NodeId,
    pub else_block: NodeId,
}

/// Loop with an optional head condition. A condition-less loop iterates
/// until broken out of.
#[derive(Debug, Clone)]
pub struct Loop {
    pub condition: Option<NodeId>,
    pub body: NodeId,
}

/// Multi-way dispatch over an ordered list of [`Case`] nodes.
#[derive(Debug, Clone)]
pub struct Switch {
    pub condition: NodeId,
    pub cases: Vec<NodeId>,
}

/// One switch arm. Empty `values` marks the default case. Block-like:
/// falling off the end of a case is not permitted, it must break.
#[derive(Debug, Clone)]
pub struct Case {
    pub values: Vec<i32>,
    pub body: Vec<NodeId>,
}

/// Protected region: a try block, catch handlers, and an optional finally.
#[derive(Debug, Clone)]
pub struct TryCatch {
    pub try_block: NodeId,
    pub catches: Vec<NodeId>,
    pub finally_block: Option<NodeId>,
}

/// Catch handler. Block-like.
#[derive(Debug, Clone)]
pub struct Catch {
    pub exception_type: String,
    pub body: Vec<NodeId>,
}

/// Arena for one decompiled method body.
///
/// Nodes are added and never freed; removal from the tree means detaching
/// an id from its parent's child list. The arena is owned by the caller of
/// the flow passes, which mutate it in place.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node, returning its id.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_expr(&mut self, code: AstCode, operand: Operand) -> NodeId {
        self.add(Node::Expr(Expr::new(code, operand)))
    }

    pub fn add_expr_with_args(
        &mut self,
        code: AstCode,
        operand: Operand,
        args: Vec<NodeId>,
    ) -> NodeId {
        let mut expr = Expr::new(code, operand);
        expr.args = args;
        self.add(Node::Expr(expr))
    }

    pub fn add_nop(&mut self) -> NodeId {
        self.add_expr(AstCode::Nop, Operand::None)
    }

    pub fn add_goto(&mut self, label: NodeId) -> NodeId {
        self.add_expr(AstCode::Goto, Operand::Label(label))
    }

    pub fn add_label(&mut self, name: impl Into<String>) -> NodeId {
        self.add(Node::Label(Label { name: name.into() }))
    }

    pub fn add_block(&mut self, body: Vec<NodeId>) -> NodeId {
        self.add(Node::Block(Block {
            entry_goto: None,
            body,
        }))
    }

    pub fn add_condition(
        &mut self,
        condition: NodeId,
        then_block: NodeId,
        else_block: NodeId,
    ) -> NodeId {
        self.add(Node::Condition(Condition {
            condition,
            then_block,
            else_block,
        }))
    }

    pub fn add_loop(&mut self, condition: Option<NodeId>, body: NodeId) -> NodeId {
        self.add(Node::Loop(Loop { condition, body }))
    }

    pub fn add_switch(&mut self, condition: NodeId, cases: Vec<NodeId>) -> NodeId {
        self.add(Node::Switch(Switch { condition, cases }))
    }

    pub fn add_case(&mut self, values: Vec<i32>, body: Vec<NodeId>) -> NodeId {
        self.add(Node::Case(Case { values, body }))
    }

    pub fn add_try_catch(
        &mut self,
        try_block: NodeId,
        catches: Vec<NodeId>,
        finally_block: Option<NodeId>,
    ) -> NodeId {
        self.add(Node::TryCatch(TryCatch {
            try_block,
            catches,
            finally_block,
        }))
    }

    pub fn add_catch(&mut self, exception_type: impl Into<String>, body: Vec<NodeId>) -> NodeId {
        self.add(Node::Catch(Catch {
            exception_type: exception_type.into(),
            body,
        }))
    }

    /// Expression view of a node, if it is one.
    pub fn expr(&self, id: NodeId) -> Option<&Expr> {
        match self.node(id) {
            Node::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    /// Mutable expression view of a node, if it is one.
    pub fn expr_mut(&mut self, id: NodeId) -> Option<&mut Expr> {
        match self.node_mut(id) {
            Node::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    /// Block view of a node. Panics if `id` is not a block; structural
    /// slots that must hold blocks (loop bodies, condition arms, try
    /// bodies) are constructed as blocks.
    pub fn block(&self, id: NodeId) -> &Block {
        match self.node(id) {
            Node::Block(block) => block,
            other => panic!("node #{id} is not a block (found {})", other.kind()),
        }
    }

    /// Mutable block view of a node. Panics if `id` is not a block.
    pub fn block_mut(&mut self, id: NodeId) -> &mut Block {
        match self.node_mut(id) {
            Node::Block(block) => block,
            other => panic!("node #{id} is not a block (found {})", other.kind()),
        }
    }

    /// Structural children of a node, in order. A block's `entry_goto`
    /// precedes its body; label operands are cross-references, not
    /// children.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.node(id) {
            Node::Block(b) => b.entry_goto.into_iter().chain(b.body.iter().copied()).collect(),
            Node::Expr(e) => e.args.clone(),
            Node::Label(_) => Vec::new(),
            Node::Condition(c) => vec![c.condition, c.then_block, c.else_block],
            Node::Loop(l) => l.condition.into_iter().chain([l.body]).collect(),
            Node::Switch(s) => std::iter::once(s.condition)
                .chain(s.cases.iter().copied())
                .collect(),
            Node::Case(c) => c.body.clone(),
            Node::TryCatch(t) => std::iter::once(t.try_block)
                .chain(t.catches.iter().copied())
                .chain(t.finally_block)
                .collect(),
            Node::Catch(c) => c.body.clone(),
        }
    }

    /// Preorder walk of every node reachable from `root`.
    pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.children(id);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}
