// ─────────────────────────────────────────────────────────────────────────────
//  gos :: error
//  Crate-wide error type plus the parser's diagnostic records.
// ─────────────────────────────────────────────────────────────────────────────

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::lexer::token::TokenKind;

// ── Source positions ──────────────────────────────────────────────────────────

/// A position in the source text. `line` and `col` are 1-based; `offset`
/// is the byte index of the first character of the lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line:   usize,
    pub col:    usize,
    pub offset: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, offset }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ── Parser diagnostics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticKind {
    #[error("expected next token to be {expected}, got {found} instead")]
    ExpectedToken { expected: TokenKind, found: TokenKind },

    #[error("no prefix parse function for {0} found")]
    NoPrefixRule(TokenKind),

    #[error("illegal token {0:?}")]
    IllegalToken(String),

    #[error("could not parse {0:?} as integer")]
    InvalidInteger(String),

    #[error("could not parse {0:?} as float")]
    InvalidFloat(String),

    #[error("unexpected indentation")]
    UnexpectedIndent,

    #[error("cannot assign to this expression")]
    InvalidAssignTarget,
}

/// One syntax problem, positioned at the token that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.kind)
    }
}

/// Ordered accumulator of diagnostics. The parser owns one and pushes into it
/// instead of aborting, so a single pass reports every recoverable problem.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, span: Span, kind: DiagnosticKind) {
        self.items.push(Diagnostic { span, kind });
    }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> { self.items.iter() }

    /// Human-readable messages, in the order they were reported.
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> { self.items }
}

// ── Crate error ───────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GosError {
    #[error("compilation failed: {file} ({} error(s))", diagnostics.len())]
    Compile { file: String, diagnostics: Vec<Diagnostic> },

    #[error("codegen error: {0}")]
    Codegen(String),

    #[error("malformed manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("host toolchain: {0}")]
    Toolchain(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GosError>;

impl GosError {
    pub fn codegen(msg: impl Into<String>) -> Self {
        Self::Codegen(msg.into())
    }

    pub fn manifest(path: impl Into<PathBuf>, msg: impl fmt::Display) -> Self {
        Self::Manifest { path: path.into(), message: msg.to_string() }
    }

    /// The diagnostics carried by a compile failure, empty otherwise.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Compile { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }

    /// Render the error for a terminal. Compile failures become a numbered
    /// list, each entry followed by the offending source line and a caret.
    pub fn pretty(&self, source: &str) -> String {
        let Self::Compile { file, diagnostics } = self else {
            return self.to_string();
        };

        let lines: Vec<&str> = source.lines().collect();
        let mut out = format!("Compilation failed: {file}\n");
        for (i, d) in diagnostics.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n", i + 1, d));
            if let Some(text) = d.span.line.checked_sub(1).and_then(|l| lines.get(l)) {
                let gutter = d.span.line.to_string();
                out.push_str(&format!("   {gutter} | {text}\n"));
                let pad = " ".repeat(gutter.len());
                let caret = " ".repeat(d.span.col.saturating_sub(1));
                out.push_str(&format!("   {pad} | {caret}^\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn diagnostic_messages_carry_position() {
        let mut d = Diagnostics::new();
        d.push(
            Span::new(2, 5, 12),
            DiagnosticKind::ExpectedToken { expected: TokenKind::Colon, found: TokenKind::Newline },
        );
        d.push(Span::new(3, 1, 20), DiagnosticKind::NoPrefixRule(TokenKind::RParen));

        assert_eq!(d.messages(), vec![
            "2:5: expected next token to be COLON, got NEWLINE instead".to_string(),
            "3:1: no prefix parse function for RPAREN found".to_string(),
        ]);
    }

    #[test]
    fn pretty_points_at_the_column() {
        let err = GosError::Compile {
            file: "main.gos".into(),
            diagnostics: vec![Diagnostic {
                span: Span::new(1, 10, 9),
                kind: DiagnosticKind::NoPrefixRule(TokenKind::RParen),
            }],
        };
        let text = err.pretty("x := 1 + )");
        assert_eq!(text, concat!(
            "Compilation failed: main.gos\n",
            "\n1. 1:10: no prefix parse function for RPAREN found\n",
            "   1 | x := 1 + )\n",
            "     |          ^\n",
        ));
    }

    #[test]
    fn pretty_falls_back_to_display() {
        let err = GosError::codegen("range() needs a bound");
        assert_eq!(err.pretty(""), "codegen error: range() needs a bound");
    }
}
