// ─────────────────────────────────────────────────────────────────────────────
//  gos :: lexer :: token
//  Terminal alphabet of Go-Script plus the static keyword table.
// ─────────────────────────────────────────────────────────────────────────────

use std::fmt;

use crate::error::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Illegal,
    Eof,
    Comment,

    // Identifiers + literals
    Ident,
    Int,
    Float,
    String,
    Char,

    // Keywords
    KwAnd, KwOr, KwNot,
    KwIf, KwElif, KwElse,
    KwFor, KwWhile,
    KwFunc, KwReturn,
    KwImport, KwFrom,
    KwStruct, KwInterface,
    KwVar, KwConst,
    KwTrue, KwFalse, KwNil,
    KwIn, KwRange,
    KwBreak, KwContinue,
    KwDefer, KwGo, KwChan, KwSelect,
    KwCase, KwDefault, KwSwitch,
    KwType, KwPackage,

    // Operators
    Assign,     // =
    Walrus,     // :=
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Power,      // **
    Eq,         // ==
    NotEq,      // !=
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=
    PercentEq,  // %=
    BitAnd,     // &
    BitOr,      // |
    BitXor,     // ^
    Shl,        // <<
    Shr,        // >>
    BitClear,   // &^
    Increment,  // ++
    Decrement,  // --

    // Punctuation
    Comma,
    Semicolon,
    Colon,
    Dot,
    Arrow,      // ->
    Channel,    // <-
    LParen,   RParen,
    LBrace,   RBrace,
    LBracket, RBracket,

    // Layout
    Newline,
    Indent,
    Dedent,
}

impl TokenKind {
    /// Upper-case display name, as it appears in parser diagnostics.
    pub fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Illegal => "ILLEGAL",
            Eof     => "EOF",
            Comment => "COMMENT",
            Ident   => "IDENT",
            Int     => "INT",
            Float   => "FLOAT",
            String  => "STRING",
            Char    => "CHAR",

            KwAnd       => "AND",       KwOr       => "OR",      KwNot     => "NOT",
            KwIf        => "IF",        KwElif     => "ELIF",    KwElse    => "ELSE",
            KwFor       => "FOR",       KwWhile    => "WHILE",
            KwFunc      => "FUNC",      KwReturn   => "RETURN",
            KwImport    => "IMPORT",    KwFrom     => "FROM",
            KwStruct    => "STRUCT",    KwInterface => "INTERFACE",
            KwVar       => "VAR",       KwConst    => "CONST",
            KwTrue      => "TRUE",      KwFalse    => "FALSE",   KwNil     => "NIL",
            KwIn        => "IN",        KwRange    => "RANGE",
            KwBreak     => "BREAK",     KwContinue => "CONTINUE",
            KwDefer     => "DEFER",     KwGo       => "GO",
            KwChan      => "CHAN",      KwSelect   => "SELECT",
            KwCase      => "CASE",      KwDefault  => "DEFAULT", KwSwitch  => "SWITCH",
            KwType      => "TYPE",      KwPackage  => "PACKAGE",

            Assign    => "=",   Walrus    => ":=",
            Plus      => "+",   Minus     => "-",
            Star      => "*",   Slash     => "/",
            Percent   => "%",   Power     => "**",
            Eq        => "==",  NotEq     => "!=",
            Lt        => "<",   LtEq      => "<=",
            Gt        => ">",   GtEq      => ">=",
            PlusEq    => "+=",  MinusEq   => "-=",
            StarEq    => "*=",  SlashEq   => "/=",
            PercentEq => "%=",
            BitAnd    => "&",   BitOr     => "|",
            BitXor    => "^",   BitClear  => "&^",
            Shl       => "<<",  Shr       => ">>",
            Increment => "++",  Decrement => "--",

            Comma     => ",",   Semicolon => ";",
            Colon     => ":",   Dot       => ".",
            Arrow     => "->",  Channel   => "<-",
            LParen    => "(",   RParen    => ")",
            LBrace    => "{",   RBrace    => "}",
            LBracket  => "[",   RBracket  => "]",

            Newline => "NEWLINE",
            Indent  => "INDENT",
            Dedent  => "DEDENT",
        }
    }

    pub fn is_keyword(self) -> bool {
        lookup_keyword(self.name().to_ascii_lowercase().as_str()) == Some(self)
    }

    /// Tokens that close a logical line.
    pub fn ends_line(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Operators read better quoted inside diagnostics.
        let name = self.name();
        if name.chars().all(|c| c.is_ascii_uppercase()) {
            f.write_str(name)
        } else {
            match self {
                TokenKind::LParen   => f.write_str("LPAREN"),
                TokenKind::RParen   => f.write_str("RPAREN"),
                TokenKind::LBrace   => f.write_str("LBRACE"),
                TokenKind::RBrace   => f.write_str("RBRACE"),
                TokenKind::LBracket => f.write_str("LBRACKET"),
                TokenKind::RBracket => f.write_str("RBRACKET"),
                TokenKind::Comma    => f.write_str("COMMA"),
                TokenKind::Colon    => f.write_str("COLON"),
                _ => write!(f, "`{name}`"),
            }
        }
    }
}

// ── Keyword table ─────────────────────────────────────────────────────────────

/// Exact-match keyword lookup. Anything else that starts with a letter is an
/// identifier, including keyword-prefixed words like `iffy`.
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match word {
        "and"       => KwAnd,       "or"       => KwOr,       "not"     => KwNot,
        "if"        => KwIf,        "elif"     => KwElif,     "else"    => KwElse,
        "for"       => KwFor,       "while"    => KwWhile,
        "func"      => KwFunc,      "return"   => KwReturn,
        "import"    => KwImport,    "from"     => KwFrom,
        "struct"    => KwStruct,    "interface" => KwInterface,
        "var"       => KwVar,       "const"    => KwConst,
        "true"      => KwTrue,      "false"    => KwFalse,    "nil"     => KwNil,
        "in"        => KwIn,        "range"    => KwRange,
        "break"     => KwBreak,     "continue" => KwContinue,
        "defer"     => KwDefer,     "go"       => KwGo,
        "chan"      => KwChan,      "select"   => KwSelect,
        "case"      => KwCase,      "default"  => KwDefault,  "switch"  => KwSwitch,
        "type"      => KwType,      "package"  => KwPackage,
        _ => return None,
    };
    Some(kind)
}

/// Resolve a scanned word to its keyword kind or `Ident`.
pub fn ident_kind(word: &str) -> TokenKind {
    lookup_keyword(word).unwrap_or(TokenKind::Ident)
}

// ── Token ─────────────────────────────────────────────────────────────────────

/// One lexeme. `text` is the exact source slice (strings keep their quotes'
/// contents with escapes untouched); synthetic layout tokens carry "".
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self { kind, text: text.into(), span }
    }

    pub fn line(&self) -> usize { self.span.line }
    pub fn column(&self) -> usize { self.span.col }
    pub fn offset(&self) -> usize { self.span.offset }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {:?} @ {}", self.kind.name(), self.text, self.span)
    }
}
