use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    True,
    False,

    // Variables
    Assign(String),     // =name
    Call(String),       // @name
    CallTop,            // @
    Identifier(String), // name

    // Operators
    Binary(BinaryOp),
    Unary(UnaryOp),

    // Commands
    Print,
    DebugPrint,
    If,
    IfElse,
    While,

    // Function literal: the bracketed body, shared and never mutated
    Block(Rc<[Token]>),

    // Lexeme matching no category; faults when executed
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,          // +
    Sub,          // -
    Mul,          // *
    Div,          // /
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    And,          // &
    Or,           // |
    Min,          // min
    Max,          // max
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate, // ~
    Not,    // !
    Abs,    // abs
}

impl BinaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Some(match lexeme {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEqual,
            ">" => BinaryOp::Greater,
            ">=" => BinaryOp::GreaterEqual,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            "min" => BinaryOp::Min,
            "max" => BinaryOp::Max,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }
}

impl UnaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Some(match lexeme {
            "~" => UnaryOp::Negate,
            "!" => UnaryOp::Not,
            "abs" => UnaryOp::Abs,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "~",
            UnaryOp::Not => "!",
            UnaryOp::Abs => "abs",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Integer(n) => write!(f, "{n}"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Assign(name) => write!(f, "={name}"),
            TokenKind::Call(name) => write!(f, "@{name}"),
            TokenKind::CallTop => write!(f, "@"),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Binary(op) => write!(f, "{}", op.symbol()),
            TokenKind::Unary(op) => write!(f, "{}", op.symbol()),
            TokenKind::Print => write!(f, "print"),
            TokenKind::DebugPrint => write!(f, "debug_print"),
            TokenKind::If => write!(f, "if"),
            TokenKind::IfElse => write!(f, "ifelse"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Block(_) => write!(f, "[...]"),
            TokenKind::Unknown(lexeme) => write!(f, "{lexeme}"),
        }
    }
}
