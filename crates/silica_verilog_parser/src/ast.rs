//! Abstract syntax tree for the Verilog subset.
//!
//! The tree carries no source positions; parsing is fail-fast, so a tree
//! that exists is syntactically well-formed. All nodes serialize with serde
//! for debug dumps.

use serde::{Deserialize, Serialize};

/// A parsed source file: zero or more module declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// The modules, in declaration order.
    pub modules: Vec<ModuleDecl>,
}

/// A `module ... endmodule` declaration with ANSI ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// The module name.
    pub name: String,
    /// Header parameters from `#(parameter N = expr, ...)`.
    pub params: Vec<ParamDecl>,
    /// ANSI port declarations, in header order.
    pub ports: Vec<Port>,
    /// Body items, in declaration order.
    pub items: Vec<ModuleItem>,
}

/// A `parameter` or `localparam` binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    /// The parameter name.
    pub name: String,
    /// The default (or only) value expression.
    pub value: Expr,
    /// True for `localparam`.
    pub is_local: bool,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout` (parsed but rejected at elaboration).
    Inout,
}

/// A packed range `[msb:lsb]`. Bounds are constant expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// The left bound.
    pub msb: Expr,
    /// The right bound.
    pub lsb: Expr,
}

/// An ANSI port declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port direction.
    pub direction: Direction,
    /// True for `output reg`.
    pub is_reg: bool,
    /// Optional packed range.
    pub range: Option<Range>,
    /// The port name.
    pub name: String,
}

/// An item in a module body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModuleItem {
    /// A `wire` or `reg` declaration.
    Net(NetDecl),
    /// A `parameter` or `localparam` in the body.
    Param(ParamDecl),
    /// A continuous assignment.
    Assign(ContinuousAssign),
    /// An `always` block.
    Always(AlwaysBlock),
}

/// A `wire`/`reg` declaration, possibly declaring several names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetDecl {
    /// True for `reg`.
    pub is_reg: bool,
    /// Optional packed range shared by all declared names.
    pub range: Option<Range>,
    /// The declared names.
    pub names: Vec<DeclName>,
}

/// One name in a net declaration, with an optional unpacked array
/// dimension (`reg [7:0] mem [0:3];`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclName {
    /// The declared name.
    pub name: String,
    /// The unpacked dimension, if this declares a register file.
    pub dimension: Option<Range>,
}

/// A continuous assignment `assign target = expr;`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// The assigned signal name.
    pub target: String,
    /// The driving expression.
    pub value: Expr,
}

/// An `always @(...)` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlwaysBlock {
    /// The sensitivity list. Empty for `@(*)` / `@*`.
    pub sensitivity: Vec<SensItem>,
    /// The body statement.
    pub body: Statement,
}

/// One entry in a sensitivity list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensItem {
    /// The edge qualifier, if any.
    pub edge: Option<Edge>,
    /// The watched signal.
    pub signal: String,
}

/// A clock edge qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
}

/// A procedural statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// A `begin ... end` block.
    Block(Vec<Statement>),
    /// A blocking or nonblocking assignment, optionally to an array element.
    Assign {
        /// The assigned name.
        target: String,
        /// The element index for array writes (`mem[addr] <= d`).
        index: Option<Expr>,
        /// The right-hand side.
        value: Expr,
        /// True for `<=`.
        nonblocking: bool,
    },
    /// An `if`/`else`.
    If {
        /// The condition.
        cond: Expr,
        /// The then branch.
        then_branch: Box<Statement>,
        /// The else branch, if present.
        else_branch: Option<Box<Statement>>,
    },
    /// A `case ... endcase`.
    Case {
        /// The scrutinized expression.
        subject: Expr,
        /// The non-default arms, in declaration order.
        arms: Vec<CaseArm>,
        /// The `default:` arm, if present.
        default: Option<Box<Statement>>,
    },
}

/// One non-default arm of a `case`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    /// The label expressions (a comma list shares one body).
    pub labels: Vec<Expr>,
    /// The arm body.
    pub body: Statement,
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical negation `!`.
    LNot,
}

/// A binary operator, listed loosest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `||`
    LOr,
    /// `&&`
    LAnd,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `+`
    Add,
    /// `-`
    Sub,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A signal, parameter, or array reference by name.
    Identifier(String),
    /// A numeric literal; `width` is present for sized literals.
    Literal {
        /// The literal value.
        value: u64,
        /// The declared width, for sized literals.
        width: Option<u32>,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        lhs: Box<Expr>,
        /// The right operand.
        rhs: Box<Expr>,
    },
    /// A replication `{count{value}}`.
    Replicate {
        /// The replication count (a constant expression).
        count: Box<Expr>,
        /// The replicated expression.
        value: Box<Expr>,
    },
    /// An indexed read `base[index]`.
    Index {
        /// The indexed array or vector name.
        base: String,
        /// The index expression.
        index: Box<Expr>,
    },
}

impl Expr {
    /// Convenience constructor for an identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }
}
