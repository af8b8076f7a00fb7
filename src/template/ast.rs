//! Syntax tree for template expressions.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Var(String),
    /// Call into the fixed helper namespace.
    Call { name: String, args: Vec<Expr> },
    Member { target: Box<Expr>, field: String },
    Index { target: Box<Expr>, index: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Conditional { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::Unary { op, operand: Box::new(operand) }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    /// Every expression directly below this one.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Number(_) | Self::Str(_) | Self::Var(_) => vec![],
            Self::Call { args, .. } => args.iter().collect(),
            Self::Member { target, .. } => vec![&**target],
            Self::Index { target, index } => vec![&**target, &**index],
            Self::Unary { operand, .. } => vec![&**operand],
            Self::Binary { left, right, .. } => vec![&**left, &**right],
            Self::Conditional { cond, then, otherwise } => vec![&**cond, &**then, &**otherwise],
        }
    }
}

/// A piece of question text: literal prose or an `@{...}` interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Expr(Expr),
}

/// Answer-check line: `let` bindings evaluated in order, then the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Checker {
    pub bindings: Vec<(String, Expr)>,
    pub verdict: Expr,
}
