// ─────────────────────────────────────────────────────────────────────────────
//  gos :: lexer
//  Pull-based scanner: source text → Token, one per `next_token()` call.
//  Leading whitespace of each logical line drives INDENT / DEDENT.
// ─────────────────────────────────────────────────────────────────────────────

pub mod token;

use std::collections::VecDeque;

use tracing::trace;

use crate::error::Span;
use token::{ident_kind, Token, TokenKind};

/// Width a tab contributes to an indentation level.
pub const TAB_WIDTH: usize = 4;

pub struct Lexer<'src> {
    src:        &'src str,
    bytes:      &'src [u8],
    pos:        usize,
    line:       usize,
    col:        usize,
    indents:    Vec<usize>,
    pending:    VecDeque<Token>,
    line_start: bool,
}

// ── Cursor ────────────────────────────────────────────────────────────────────

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes:      src.as_bytes(),
            pos:        0,
            line:       1,
            col:        1,
            indents:    vec![0],
            pending:    VecDeque::new(),
            line_start: true,
        }
    }

    /// Current byte, `0` at end of input.
    fn ch(&self) -> u8 { self.peek_at(0) }

    fn peek(&self) -> u8 { self.peek_at(1) }

    fn peek_at(&self, off: usize) -> u8 {
        self.bytes.get(self.pos + off).copied().unwrap_or(0)
    }

    fn at_eof(&self) -> bool { self.pos >= self.bytes.len() }

    fn span(&self) -> Span { Span::new(self.line, self.col, self.pos) }

    fn bump(&mut self) {
        let Some(&b) = self.bytes.get(self.pos) else { return };
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if b & 0xC0 != 0x80 {
            // columns count characters, not UTF-8 continuation bytes
            self.col += 1;
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n { self.bump(); }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch(), b' ' | b'\t' | b'\r') {
            self.bump();
        }
    }
}

// ── Public entry ──────────────────────────────────────────────────────────────

impl<'src> Lexer<'src> {
    /// Next token. Once input is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> Token {
        let tok = self.scan();
        trace!(kind = tok.kind.name(), text = %tok.text, line = tok.span.line, col = tok.span.col, "token");
        tok
    }

    /// Drain the lexer, the trailing `Eof` included.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok);
            if done { return out; }
        }
    }

    /// Current indentation stack, base level first.
    pub fn indent_levels(&self) -> &[usize] { &self.indents }

    fn scan(&mut self) -> Token {
        if let Some(tok) = self.pending.pop_front() {
            return tok;
        }
        if self.line_start {
            self.line_start = false;
            self.handle_indentation();
            if let Some(tok) = self.pending.pop_front() {
                return tok;
            }
        }

        self.skip_whitespace();
        let span = self.span();

        if self.at_eof() {
            return self.end_of_input(span);
        }

        let c = self.ch();
        match c {
            b'\n' => {
                self.bump();
                self.line_start = true;
                Token::new(TokenKind::Newline, "\n", span)
            }
            b'#' => self.comment(span),
            b'"' | b'\'' => self.quoted(c, span),
            b'0'..=b'9' => self.number(span),
            c if is_letter(c) => self.ident(span),
            _ => self.operator(span),
        }
    }

    fn end_of_input(&mut self, span: Span) -> Token {
        while self.indents.len() > 1 {
            self.indents.pop();
            self.pending.push_back(Token::new(TokenKind::Dedent, "", span));
        }
        self.pending.pop_front().unwrap_or_else(|| Token::new(TokenKind::Eof, "", span))
    }
}

// ── Indentation ───────────────────────────────────────────────────────────────

impl<'src> Lexer<'src> {
    fn handle_indentation(&mut self) {
        let start = self.pos;
        let mut width = 0;
        while matches!(self.ch(), b' ' | b'\t') {
            width += if self.ch() == b'\t' { TAB_WIDTH } else { 1 };
            self.bump();
        }

        // blank and comment-only lines leave the stack alone
        let blank = match self.ch() {
            b'\n' | b'#' | 0 => true,
            b'\r' => matches!(self.peek(), b'\n' | 0),
            _ => false,
        };
        if blank { return; }

        let span = self.span();
        let top = self.indents.last().copied().unwrap_or(0);

        if width > top {
            self.indents.push(width);
            self.pending.push_back(Token::new(TokenKind::Indent, "", span));
            return;
        }

        while width < self.indents.last().copied().unwrap_or(0) && self.indents.len() > 1 {
            self.indents.pop();
            self.pending.push_back(Token::new(TokenKind::Dedent, "", span));
        }
        if self.indents.last().copied().unwrap_or(0) != width {
            let text = &self.src[start..self.pos];
            self.pending.push_back(Token::new(TokenKind::Illegal, text, span));
        }
    }
}

// ── Literals & words ──────────────────────────────────────────────────────────

impl<'src> Lexer<'src> {
    fn comment(&mut self, span: Span) -> Token {
        let start = self.pos;
        while !self.at_eof() && self.ch() != b'\n' {
            self.bump();
        }
        Token::new(TokenKind::Comment, &self.src[start..self.pos], span)
    }

    fn quoted(&mut self, delim: u8, span: Span) -> Token {
        self.bump();
        let start = self.pos;
        while !self.at_eof() && self.ch() != delim {
            if self.ch() == b'\\' {
                self.bump();
            }
            self.bump();
        }
        let end = self.pos.min(self.bytes.len());
        let text = &self.src[start..end];
        self.bump(); // closing delimiter, no-op at EOF

        let kind = if delim == b'"' { TokenKind::String } else { TokenKind::Char };
        Token::new(kind, text, span)
    }

    fn number(&mut self, span: Span) -> Token {
        let start = self.pos;
        let mut kind = TokenKind::Int;

        while self.ch().is_ascii_digit() { self.bump(); }

        if self.ch() == b'.' && self.peek().is_ascii_digit() {
            kind = TokenKind::Float;
            self.bump();
            while self.ch().is_ascii_digit() { self.bump(); }
        }

        if matches!(self.ch(), b'e' | b'E') {
            kind = TokenKind::Float;
            self.bump();
            if matches!(self.ch(), b'+' | b'-') { self.bump(); }
            while self.ch().is_ascii_digit() { self.bump(); }
        }

        Token::new(kind, &self.src[start..self.pos], span)
    }

    fn ident(&mut self, span: Span) -> Token {
        let start = self.pos;
        while is_letter(self.ch()) || self.ch().is_ascii_digit() {
            self.bump();
        }
        let word = &self.src[start..self.pos];
        Token::new(ident_kind(word), word, span)
    }
}

// ── Operators & punctuation ───────────────────────────────────────────────────

impl<'src> Lexer<'src> {
    fn operator(&mut self, span: Span) -> Token {
        use TokenKind::*;

        let (kind, len) = match (self.ch(), self.peek()) {
            (b'=', b'=') => (Eq, 2),
            (b'=', _)    => (Assign, 1),

            (b'+', b'=') => (PlusEq, 2),
            (b'+', b'+') => (Increment, 2),
            (b'+', _)    => (Plus, 1),

            (b'-', b'=') => (MinusEq, 2),
            (b'-', b'-') => (Decrement, 2),
            (b'-', b'>') => (Arrow, 2),
            (b'-', _)    => (Minus, 1),

            (b'*', b'=') => (StarEq, 2),
            (b'*', b'*') => (Power, 2),
            (b'*', _)    => (Star, 1),

            (b'/', b'=') => (SlashEq, 2),
            (b'/', _)    => (Slash, 1),

            (b'%', b'=') => (PercentEq, 2),
            (b'%', _)    => (Percent, 1),

            (b'!', b'=') => (NotEq, 2),

            (b'<', b'=') => (LtEq, 2),
            (b'<', b'<') => (Shl, 2),
            (b'<', b'-') => (Channel, 2),
            (b'<', _)    => (Lt, 1),

            (b'>', b'=') => (GtEq, 2),
            (b'>', b'>') => (Shr, 2),
            (b'>', _)    => (Gt, 1),

            (b'&', b'^') => (BitClear, 2),
            (b'&', _)    => (BitAnd, 1),
            (b'|', _)    => (BitOr, 1),
            (b'^', _)    => (BitXor, 1),

            (b':', b'=') => (Walrus, 2),
            (b':', _)    => (Colon, 1),

            (b',', _) => (Comma, 1),
            (b';', _) => (Semicolon, 1),
            (b'.', _) => (Dot, 1),
            (b'(', _) => (LParen, 1),
            (b')', _) => (RParen, 1),
            (b'{', _) => (LBrace, 1),
            (b'}', _) => (RBrace, 1),
            (b'[', _) => (LBracket, 1),
            (b']', _) => (RBracket, 1),

            _ => (Illegal, 1),
        };

        let start = self.pos;
        self.bump_n(len);
        Token::new(kind, &self.src[start..self.pos], span)
    }
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use TokenKind::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn eof_is_idempotent() {
        let mut lx = Lexer::new("x");
        assert_eq!(lx.next_token().kind, Ident);
        for _ in 0..5 {
            assert_eq!(lx.next_token().kind, Eof);
        }
        let mut empty = Lexer::new("");
        assert_eq!(empty.next_token().kind, Eof);
        assert_eq!(empty.next_token().kind, Eof);
    }

    #[test]
    fn numbers_keep_their_text() {
        for (src, kind) in [("42", Int), ("3.14", Float), ("1.5e10", Float), ("2.5E-3", Float)] {
            let toks = Lexer::new(src).tokenize();
            assert_eq!(toks.len(), 2, "{src}");
            assert_eq!(toks[0].kind, kind);
            assert_eq!(toks[0].text, src);
        }
        // `.` not followed by a digit is a selector
        assert_eq!(kinds("1.x"), vec![Int, Dot, Ident, Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(kinds("if iffy elif _x über"), vec![KwIf, Ident, KwElif, Ident, Ident, Eof]);
    }

    #[test]
    fn maximal_munch() {
        assert_eq!(kinds("a := b"), vec![Ident, Walrus, Ident, Eof]);
        assert_eq!(kinds("2 ** 3"), vec![Int, Power, Int, Eof]);
        assert_eq!(kinds("<-ch"), vec![Channel, Ident, Eof]);
        assert_eq!(kinds("a < -b"), vec![Ident, Lt, Minus, Ident, Eof]);
        assert_eq!(
            kinds("== != <= >= << >> &^ & | ^ += -= *= /= %= ++ -- -> : ="),
            vec![
                Eq, NotEq, LtEq, GtEq, Shl, Shr, BitClear, BitAnd, BitOr, BitXor,
                PlusEq, MinusEq, StarEq, SlashEq, PercentEq, Increment, Decrement,
                Arrow, Colon, Assign, Eof,
            ],
        );
        assert_eq!(kinds(", ; . ( ) { } [ ]"), vec![
            Comma, Semicolon, Dot, LParen, RParen, LBrace, RBrace, LBracket, RBracket, Eof,
        ]);
    }

    #[test]
    fn bare_bang_and_unknown_bytes_are_illegal() {
        let toks = Lexer::new("! @").tokenize();
        assert_eq!(toks[0].kind, Illegal);
        assert_eq!(toks[0].text, "!");
        assert_eq!(toks[1].kind, Illegal);
        assert_eq!(toks[1].text, "@");
    }

    #[test]
    fn strings_keep_escapes_verbatim() {
        let toks = Lexer::new(r#""a\"b\n" 'c' "open"#).tokenize();
        assert_eq!(toks[0].kind, String);
        assert_eq!(toks[0].text, r#"a\"b\n"#);
        assert_eq!(toks[1].kind, Char);
        assert_eq!(toks[1].text, "c");
        // unterminated: cut off at end of input
        assert_eq!(toks[2].kind, String);
        assert_eq!(toks[2].text, "open");
        assert_eq!(toks[3].kind, Eof);
    }

    #[test]
    fn comments_stop_before_newline() {
        let toks = Lexer::new("x # note\ny").tokenize();
        let got: Vec<_> = toks.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(got, vec![
            (Ident, "x"), (Comment, "# note"), (Newline, "\n"), (Ident, "y"), (Eof, ""),
        ]);
    }

    #[test]
    fn positions_snapshot_first_character() {
        let toks = Lexer::new("a := 1\n  b == c").tokenize();
        let walrus = &toks[1];
        assert_eq!((walrus.line(), walrus.column(), walrus.offset()), (1, 3, 2));
        let eq = toks.iter().find(|t| t.kind == Eq).unwrap();
        assert_eq!((eq.line(), eq.column(), eq.offset()), (2, 5, 11));
    }

    #[test]
    fn off_side_rule() {
        let src = indoc! {"
            func f():
                if x:
                    y

                z
            w
        "};
        assert_eq!(kinds(src), vec![
            KwFunc, Ident, LParen, RParen, Colon, Newline,
            Indent, KwIf, Ident, Colon, Newline,
            Indent, Ident, Newline,
            Newline,
            Dedent, Ident, Newline,
            Dedent, Ident, Newline,
            Eof,
        ]);
    }

    #[test]
    fn dedents_flushed_before_eof() {
        let mut lx = Lexer::new("a:\n    b:\n        c");
        let toks: Vec<_> = std::iter::from_fn(|| Some(lx.next_token())).take(12).map(|t| t.kind).collect();
        assert_eq!(toks, vec![
            Ident, Colon, Newline, Indent, Ident, Colon, Newline, Indent, Ident,
            Dedent, Dedent, Eof,
        ]);
        assert_eq!(lx.indent_levels(), &[0]);
        assert_eq!(lx.next_token().kind, Eof);
    }

    #[test]
    fn comment_lines_do_not_dedent() {
        let src = "a:\n    b\n# top\n    c\n";
        assert_eq!(kinds(src), vec![
            Ident, Colon, Newline, Indent, Ident, Newline,
            Comment, Newline, Ident, Newline, Dedent, Eof,
        ]);
    }

    #[test]
    fn tabs_count_as_four() {
        assert_eq!(kinds("a:\n\tb\n    c\n"), vec![
            Ident, Colon, Newline, Indent, Ident, Newline, Ident, Newline, Dedent, Eof,
        ]);
    }

    #[test]
    fn inconsistent_dedent_is_illegal() {
        let toks = Lexer::new("a:\n    b\n  c\n").tokenize();
        let got: Vec<_> = toks.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(got, vec![
            (Ident, "a"), (Colon, ":"), (Newline, "\n"),
            (Indent, ""), (Ident, "b"), (Newline, "\n"),
            (Dedent, ""), (Illegal, "  "), (Ident, "c"), (Newline, "\n"),
            (Eof, ""),
        ]);
    }
}
