//! Opcode set for decompiled method expressions.

/// Expression opcodes.
///
/// The control codes (`Goto`, `Nop`, `Leave`, `Return`, `LoopOrSwitchBreak`,
/// `LoopContinue`) are what the flow passes rewrite. Everything else is
/// opaque to control-flow reasoning: only
/// [`is_unconditional_control_flow`](AstCode::is_unconditional_control_flow)
/// and the branch targets carried by an expression's operand matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstCode {
    Nop,
    LdC,
    Load,
    Store,
    LoadElement,
    StoreElement,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    CmpEq,
    CmpNe,
    CmpLt,
    CmpGe,
    CmpGt,
    CmpLe,
    IfTrue,
    Switch,
    Goto,
    InvokeVirtual,
    InvokeStatic,
    GetField,
    PutField,
    Return,
    AThrow,
    Leave,
    EndFinally,
    LoopOrSwitchBreak,
    LoopContinue,
}

impl AstCode {
    /// True for codes that transfer control and never fall through to
    /// their textual successor.
    pub fn is_unconditional_control_flow(self) -> bool {
        matches!(
            self,
            AstCode::Goto
                | AstCode::Return
                | AstCode::AThrow
                | AstCode::Leave
                | AstCode::EndFinally
                | AstCode::LoopOrSwitchBreak
                | AstCode::LoopContinue
        )
    }

    /// Lowercase mnemonic used by the dump printer.
    pub fn name(self) -> &'static str {
        match self {
            AstCode::Nop => "nop",
            AstCode::LdC => "ldc",
            AstCode::Load => "load",
            AstCode::Store => "store",
            AstCode::LoadElement => "loadelement",
            AstCode::StoreElement => "storeelement",
            AstCode::Add => "add",
            AstCode::Sub => "sub",
            AstCode::Mul => "mul",
            AstCode::Div => "div",
            AstCode::Rem => "rem",
            AstCode::Neg => "neg",
            AstCode::CmpEq => "cmpeq",
            AstCode::CmpNe => "cmpne",
            AstCode::CmpLt => "cmplt",
            AstCode::CmpGe => "cmpge",
            AstCode::CmpGt => "cmpgt",
            AstCode::CmpLe => "cmple",
            AstCode::IfTrue => "iftrue",
            AstCode::Switch => "switch",
            AstCode::Goto => "goto",
            AstCode::InvokeVirtual => "invokevirtual",
            AstCode::InvokeStatic => "invokestatic",
            AstCode::GetField => "getfield",
            AstCode::PutField => "putfield",
            AstCode::Return => "return",
            AstCode::AThrow => "athrow",
            AstCode::Leave => "leave",
            AstCode::EndFinally => "endfinally",
            AstCode::LoopOrSwitchBreak => "break",
            AstCode::LoopContinue => "continue",
        }
    }
}
