mod token;

#[cfg(test)]
mod tests;

pub use token::{BinaryOp, Span, Token, TokenKind, UnaryOp};

use std::str::Chars;

/// Deepest `[ ... ]` nesting accepted by default.
pub const DEFAULT_MAX_NESTING: usize = 1_000;

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    position: usize,
    line: u32,
    column: u32,
    max_nesting: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnclosedBracket,
    UnexpectedCloseBracket,
    NestingTooDeep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl LexError {
    fn at(kind: LexErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

enum Lexeme<'a> {
    Open(Span),
    Close(Span),
    Word(&'a str, Span),
}

/// A bracket group that is still being collected.
struct Frame {
    open: Span,
    enclosing: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars(),
            position: 0,
            line: 1,
            column: 1,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Splits the source into tokens, folding every `[ ... ]` region into a
    /// single `Block` token. Bracket mismatches are reported here, before
    /// anything runs.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();

        while let Some(lexeme) = self.next_lexeme() {
            match lexeme {
                Lexeme::Open(span) => {
                    // Block bodies are dropped recursively, so depth is bounded here
                    if frames.len() >= self.max_nesting {
                        return Err(LexError::at(
                            LexErrorKind::NestingTooDeep,
                            format!("Brackets nested deeper than {} levels", self.max_nesting),
                            span,
                        ));
                    }
                    frames.push(Frame {
                        open: span,
                        enclosing: std::mem::take(&mut tokens),
                    });
                }
                Lexeme::Close(span) => {
                    let frame = frames.pop().ok_or_else(|| {
                        LexError::at(
                            LexErrorKind::UnexpectedCloseBracket,
                            "Unexpected ']' without matching '['",
                            span,
                        )
                    })?;
                    let body = std::mem::replace(&mut tokens, frame.enclosing);
                    tokens.push(Token {
                        kind: TokenKind::Block(body.into()),
                        span: Span {
                            start: frame.open.start,
                            end: span.end,
                            line: frame.open.line,
                            column: frame.open.column,
                        },
                    });
                }
                Lexeme::Word(text, span) => tokens.push(Token {
                    kind: classify(text),
                    span,
                }),
            }
        }

        if let Some(frame) = frames.last() {
            return Err(LexError::at(
                LexErrorKind::UnclosedBracket,
                "Unclosed '[' (missing matching ']')",
                frame.open,
            ));
        }

        Ok(tokens)
    }

    fn next_lexeme(&mut self) -> Option<Lexeme<'a>> {
        self.skip_whitespace_and_comments();

        let start_position = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let span = |end| Span {
            start: start_position,
            end,
            line: start_line,
            column: start_column,
        };

        match self.peek()? {
            '[' => {
                self.advance();
                Some(Lexeme::Open(span(self.position)))
            }
            ']' => {
                self.advance();
                Some(Lexeme::Close(span(self.position)))
            }
            _ => {
                while let Some(c) = self.peek() {
                    if is_delimiter(c) {
                        break;
                    }
                    self.advance();
                }
                let source = self.source;
                let text = &source[start_position..self.position];
                Some(Lexeme::Word(text, span(self.position)))
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '[' || c == ']' || c == '#'
}

/// Maps a bare lexeme onto its category, in dispatch priority order.
fn classify(text: &str) -> TokenKind {
    if is_integer_literal(text) {
        return match text.parse::<i64>() {
            Ok(n) => TokenKind::Integer(n),
            Err(_) => TokenKind::Unknown(text.to_string()),
        };
    }

    match text {
        "true" => return TokenKind::True,
        "false" => return TokenKind::False,
        "@" => return TokenKind::CallTop,
        _ => {}
    }

    if let Some(name) = text.strip_prefix('=').filter(|name| is_identifier(name)) {
        return TokenKind::Assign(name.to_string());
    }
    if let Some(name) = text.strip_prefix('@').filter(|name| is_identifier(name)) {
        return TokenKind::Call(name.to_string());
    }
    if let Some(op) = BinaryOp::from_lexeme(text) {
        return TokenKind::Binary(op);
    }
    if let Some(op) = UnaryOp::from_lexeme(text) {
        return TokenKind::Unary(op);
    }

    match text {
        "print" => TokenKind::Print,
        "debug_print" => TokenKind::DebugPrint,
        "if" => TokenKind::If,
        "ifelse" => TokenKind::IfElse,
        "while" => TokenKind::While,
        _ if is_identifier(text) => TokenKind::Identifier(text.to_string()),
        _ => TokenKind::Unknown(text.to_string()),
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '?' || c == '\'')
        }
        _ => false,
    }
}
