//! Text rendering of method ASTs for inspection and snapshot tests.

use std::fmt::{self, Write};

use crate::node::{Ast, Block, Node, NodeId, Operand};

/// Printer producing an indented, one-node-per-line rendering.
pub struct AstPrinter<'a> {
    ast: &'a Ast,
    show_ranges: bool,
}

impl<'a> AstPrinter<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            show_ranges: false,
        }
    }

    /// Append `@[..]` offset markers after expressions that carry ranges.
    pub fn show_ranges(mut self, show: bool) -> Self {
        self.show_ranges = show;
        self
    }

    pub fn dump(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, root, 0)
            .expect("String write never fails");
        out
    }

    fn write_node(&self, w: &mut String, id: NodeId, depth: usize) -> fmt::Result {
        match self.ast.node(id) {
            Node::Block(b) => {
                line(w, depth, "block")?;
                self.write_block_parts(w, b, depth + 1)?;
            }
            Node::Expr(_) => line(w, depth, &self.expr_string(id))?,
            Node::Label(l) => line(w, depth, &format!("{}:", l.name))?,
            Node::Condition(c) => {
                line(w, depth, &format!("if ({})", self.expr_string(c.condition)))?;
                line(w, depth + 1, "then:")?;
                self.write_node(w, c.then_block, depth + 2)?;
                line(w, depth + 1, "else:")?;
                self.write_node(w, c.else_block, depth + 2)?;
            }
            Node::Loop(l) => {
                match l.condition {
                    Some(condition) => {
                        line(w, depth, &format!("loop ({})", self.expr_string(condition)))?;
                    }
                    None => line(w, depth, "loop")?,
                }
                self.write_node(w, l.body, depth + 1)?;
            }
            Node::Switch(s) => {
                line(w, depth, &format!("switch ({})", self.expr_string(s.condition)))?;
                for &case in &s.cases {
                    self.write_node(w, case, depth + 1)?;
                }
            }
            Node::Case(c) => {
                if c.values.is_empty() {
                    line(w, depth, "default:")?;
                } else {
                    let values: Vec<String> = c.values.iter().map(i32::to_string).collect();
                    line(w, depth, &format!("case {}:", values.join(", ")))?;
                }
                for &stmt in &c.body {
                    self.write_node(w, stmt, depth + 1)?;
                }
            }
            Node::TryCatch(t) => {
                line(w, depth, "try")?;
                self.write_node(w, t.try_block, depth + 1)?;
                for &catch in &t.catches {
                    self.write_node(w, catch, depth)?;
                }
                if let Some(finally) = t.finally_block {
                    line(w, depth, "finally")?;
                    self.write_node(w, finally, depth + 1)?;
                }
            }
            Node::Catch(c) => {
                line(w, depth, &format!("catch {}", c.exception_type))?;
                for &stmt in &c.body {
                    self.write_node(w, stmt, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn write_block_parts(&self, w: &mut String, block: &Block, depth: usize) -> fmt::Result {
        if let Some(entry) = block.entry_goto {
            line(w, depth, &format!("entry: {}", self.expr_string(entry)))?;
        }
        for &stmt in &block.body {
            self.write_node(w, stmt, depth)?;
        }
        Ok(())
    }

    fn expr_string(&self, id: NodeId) -> String {
        let Node::Expr(e) = self.ast.node(id) else {
            // Non-expression in expression position; render by id.
            return format!("#{id}");
        };
        let mut s = String::from(e.code.name());
        match &e.operand {
            Operand::None => {}
            Operand::Label(label) => {
                let _ = write!(s, " {}", self.label_name(*label));
            }
            Operand::Labels(labels) => {
                let names: Vec<String> = labels.iter().map(|&l| self.label_name(l)).collect();
                let _ = write!(s, " [{}]", names.join(", "));
            }
            Operand::Local(slot) => {
                let _ = write!(s, " ${slot}");
            }
            Operand::Int(value) => {
                let _ = write!(s, " {value}");
            }
        }
        if !e.args.is_empty() {
            let args: Vec<String> = e.args.iter().map(|&a| self.expr_string(a)).collect();
            let _ = write!(s, "({})", args.join(", "));
        }
        if self.show_ranges && !e.ranges.is_empty() {
            let mut ranges: Vec<_> = e.ranges.iter().copied().collect();
            ranges.sort();
            let parts: Vec<String> = ranges.iter().map(ToString::to_string).collect();
            let _ = write!(s, " @[{}]", parts.join(" "));
        }
        s
    }

    fn label_name(&self, id: NodeId) -> String {
        match self.ast.node(id) {
            Node::Label(l) => l.name.clone(),
            _ => format!("#{id}"),
        }
    }
}

fn line(w: &mut String, depth: usize, text: &str) -> fmt::Result {
    writeln!(w, "{:indent$}{text}", "", indent = depth * 2)
}
