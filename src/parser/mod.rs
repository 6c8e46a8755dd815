// ─────────────────────────────────────────────────────────────────────────────
//  gos :: parser
//  Pratt parser: Lexer → Program AST, collecting diagnostics as it goes.
// ─────────────────────────────────────────────────────────────────────────────

pub mod ast;
pub use ast::*;

use tracing::debug;

use crate::error::{DiagnosticKind, Diagnostics};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;
use crate::runtime::AliasTable;

type PrefixFn<'a> = fn(&mut Parser<'a>) -> Option<Expr>;
type InfixFn<'a>  = fn(&mut Parser<'a>, Expr) -> Option<Expr>;

/// Parse a whole source text with the built-in alias table.
pub fn parse(src: &str) -> (Program, Diagnostics) {
    let mut p = Parser::new(src);
    let prog = p.parse_program();
    (prog, p.into_diagnostics())
}

pub struct Parser<'a> {
    lexer:   Lexer<'a>,
    cur:     Token,
    peek:    Token,
    aliases: &'a AliasTable,
    diags:   Diagnostics,
}

// ── Token cursor ──────────────────────────────────────────────────────────────

/// Next token that is not a comment.
fn pull(lexer: &mut Lexer<'_>) -> Token {
    loop {
        let tok = lexer.next_token();
        if tok.kind != TokenKind::Comment {
            return tok;
        }
    }
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_aliases(src, AliasTable::builtin())
    }

    pub fn with_aliases(src: &'a str, aliases: &'a AliasTable) -> Self {
        let mut lexer = Lexer::new(src);
        let cur  = pull(&mut lexer);
        let peek = pull(&mut lexer);
        Self { lexer, cur, peek, aliases, diags: Diagnostics::new() }
    }

    /// Consume the current token and return it.
    fn advance(&mut self) -> Token {
        let next = pull(&mut self.lexer);
        let peek = std::mem::replace(&mut self.peek, next);
        std::mem::replace(&mut self.cur, peek)
    }

    fn at(&self, kind: TokenKind) -> bool { self.cur.kind == kind }

    fn peek_is(&self, kind: TokenKind) -> bool { self.peek.kind == kind }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            self.error_expected(kind);
            None
        }
    }

    fn expect_ident(&mut self) -> Option<String> {
        self.expect(TokenKind::Ident).map(|t| t.text)
    }

    /// Expressions never continue past these.
    fn at_boundary(&self) -> bool {
        self.cur.kind.ends_line() || self.at(TokenKind::Indent)
    }

    fn skip_layout(&mut self) {
        while matches!(self.cur.kind, TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent) {
            self.advance();
        }
    }
}

// ── Diagnostics & recovery ────────────────────────────────────────────────────

impl<'a> Parser<'a> {
    pub fn diagnostics(&self) -> &Diagnostics { &self.diags }

    pub fn into_diagnostics(self) -> Diagnostics { self.diags }

    /// Messages in the order they were found.
    pub fn errors(&self) -> Vec<String> { self.diags.messages() }

    fn error_expected(&mut self, expected: TokenKind) {
        let found = self.cur.kind;
        self.diags.push(self.cur.span, DiagnosticKind::ExpectedToken { expected, found });
    }

    fn error_no_prefix(&mut self) {
        let kind = match self.cur.kind {
            TokenKind::Illegal => DiagnosticKind::IllegalToken(self.cur.text.clone()),
            other              => DiagnosticKind::NoPrefixRule(other),
        };
        self.diags.push(self.cur.span, kind);
    }

    fn illegal(&mut self) {
        let tok = self.advance();
        self.diags.push(tok.span, DiagnosticKind::IllegalToken(tok.text));
    }

    /// Skip to the end of the current line. When the line opened an indented
    /// body that will never be parsed, skip that body as well.
    fn synchronize(&mut self) {
        while !self.cur.kind.ends_line() {
            self.advance();
        }
        if self.at(TokenKind::Newline) && self.peek_is(TokenKind::Indent) {
            self.advance();
            self.skip_indented();
        }
    }

    fn skip_indented(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.cur.kind {
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => depth = depth.saturating_sub(1),
                TokenKind::Eof    => return,
                _ => {}
            }
            self.advance();
            if depth == 0 { return; }
        }
    }

    fn end_of_line(&mut self) {
        if !self.cur.kind.ends_line() {
            self.error_expected(TokenKind::Newline);
            self.synchronize();
        }
    }
}

// ── Program ───────────────────────────────────────────────────────────────────

impl<'a> Parser<'a> {
    /// Consume the whole token stream. Never fails; check `errors()` before
    /// trusting the returned tree.
    pub fn parse_program(&mut self) -> Program {
        let mut package = "main".to_string();
        self.skip_layout();
        if self.eat(TokenKind::KwPackage) {
            if let Some(name) = self.expect_ident() {
                package = name;
            }
            self.end_of_line();
        }

        let mut imports    = Vec::new();
        let mut statements = Vec::new();

        loop {
            match self.cur.kind {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Dedent => { self.advance(); }
                TokenKind::Indent => {
                    self.diags.push(self.cur.span, DiagnosticKind::UnexpectedIndent);
                    self.advance();
                }
                TokenKind::Illegal => self.illegal(),
                TokenKind::KwImport | TokenKind::KwFrom => match self.parse_import() {
                    Some(list) => { imports.extend(list); self.end_of_line(); }
                    None       => self.synchronize(),
                },
                _ => match self.parse_statement() {
                    Some(stmt) => statements.push(stmt),
                    None       => self.synchronize(),
                },
            }
        }

        debug!(
            package = %package,
            imports = imports.len(),
            statements = statements.len(),
            diagnostics = self.diags.len(),
            "parsed program"
        );
        Program { package, imports, statements }
    }

    // ── Imports ───────────────────────────────────────────────────────────────

    fn parse_import(&mut self) -> Option<Vec<ImportDecl>> {
        if self.eat(TokenKind::KwFrom) {
            let path = self.parse_import_path()?;
            self.expect(TokenKind::KwImport)?;
            let mut items = vec![self.expect_ident()?];
            while self.eat(TokenKind::Comma) {
                items.push(self.expect_ident()?);
            }
            return Some(vec![self.import_decl(path, None, items)]);
        }

        self.expect(TokenKind::KwImport)?;

        if self.eat(TokenKind::LParen) {
            let mut list = Vec::new();
            loop {
                self.skip_layout();
                if self.eat(TokenKind::RParen) { break; }
                if self.at(TokenKind::Eof) {
                    self.error_expected(TokenKind::RParen);
                    return None;
                }
                let path  = self.parse_import_path()?;
                let alias = self.parse_import_alias()?;
                list.push(self.import_decl(path, alias, Vec::new()));
                self.eat(TokenKind::Comma);
            }
            return Some(list);
        }

        let path  = self.parse_import_path()?;
        let alias = self.parse_import_alias()?;
        Some(vec![self.import_decl(path, alias, Vec::new())])
    }

    fn parse_import_path(&mut self) -> Option<String> {
        match self.cur.kind {
            TokenKind::String | TokenKind::Ident => Some(self.advance().text),
            _ => {
                self.error_expected(TokenKind::String);
                None
            }
        }
    }

    /// Optional `as name`. `as` is contextual, not a keyword.
    fn parse_import_alias(&mut self) -> Option<Option<String>> {
        if self.at(TokenKind::Ident) && self.cur.text == "as" {
            self.advance();
            return Some(Some(self.expect_ident()?));
        }
        Some(None)
    }

    fn import_decl(&self, raw: String, alias: Option<String>, items: Vec<String>) -> ImportDecl {
        let path = self.aliases.resolve(&raw).to_string();
        // `rand_math` → math/rand keeps `rand_math` usable as the package name
        let alias = alias.or_else(|| {
            let last = path.rsplit('/').next().unwrap_or(&path);
            (path != raw && last != raw && items.is_empty()).then(|| raw.clone())
        });
        ImportDecl { path, alias, items }
    }
}

// ── Statements ────────────────────────────────────────────────────────────────

impl<'a> Parser<'a> {
    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur.kind {
            TokenKind::KwFunc   => return self.parse_function(None).map(Stmt::Function),
            TokenKind::KwStruct => return self.parse_struct().map(Stmt::Struct),
            TokenKind::KwIf     => return self.parse_if().map(Stmt::If),
            TokenKind::KwFor    => return self.parse_for().map(Stmt::For),
            TokenKind::KwWhile  => return self.parse_while().map(Stmt::While),
            _ => {}
        }

        let stmt = match self.cur.kind {
            TokenKind::KwVar      => self.parse_var()?,
            TokenKind::KwReturn   => self.parse_return()?,
            TokenKind::KwBreak    => { self.advance(); Stmt::Branch(BranchStmt::Break) }
            TokenKind::KwContinue => { self.advance(); Stmt::Branch(BranchStmt::Continue) }
            _                     => self.parse_simple()?,
        };
        self.end_of_line();
        Some(stmt)
    }

    /// Statements allowed inside a `for` header: bindings, assignments,
    /// `++`/`--` and bare expressions.
    fn parse_simple(&mut self) -> Option<Stmt> {
        if self.at(TokenKind::Ident)
            && (self.peek_is(TokenKind::Walrus) || self.peek_is(TokenKind::Assign))
        {
            return self.parse_binding();
        }

        let span = self.cur.span;
        let expr = self.parse_expression(Precedence::Lowest)?;

        if let Some(op) = AssignOp::from_token(self.cur.kind) {
            if !expr.is_assignable() {
                self.diags.push(span, DiagnosticKind::InvalidAssignTarget);
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Some(Stmt::Assign(AssignStmt { target: expr, op, value }));
        }

        match self.cur.kind {
            TokenKind::Increment | TokenKind::Decrement => {
                if !expr.is_assignable() {
                    self.diags.push(span, DiagnosticKind::InvalidAssignTarget);
                    return None;
                }
                let increment = self.advance().kind == TokenKind::Increment;
                Some(Stmt::IncDec(IncDecStmt { target: expr, increment }))
            }
            TokenKind::Walrus => {
                self.diags.push(span, DiagnosticKind::InvalidAssignTarget);
                None
            }
            _ => Some(Stmt::Expression(ExpressionStmt { expr })),
        }
    }

    /// `name := value` or `name = value`.
    fn parse_binding(&mut self) -> Option<Stmt> {
        let name = self.advance().text;
        let binding = match self.advance().kind {
            TokenKind::Walrus => Binding::Walrus,
            _                 => Binding::Assign,
        };
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Var(VarDecl { name, ty: None, value: Some(value), binding }))
    }

    fn parse_var(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwVar)?;
        let name = self.expect_ident()?;
        let ty = if self.at(TokenKind::Assign) || self.at_boundary() {
            None
        } else {
            Some(self.parse_type()?)
        };
        let value = if self.eat(TokenKind::Assign) {
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };
        if ty.is_none() && value.is_none() {
            self.error_expected(TokenKind::Assign);
            return None;
        }
        Some(Stmt::Var(VarDecl { name, ty, value, binding: Binding::Var }))
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwReturn)?;
        let value = if self.at_boundary() {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        Some(Stmt::Return(ReturnStmt { value }))
    }

    // ── Blocks ────────────────────────────────────────────────────────────────

    /// Body after a construct's `:`. Either one statement on the same line,
    /// or an indented run of lines. No indented line means an empty body.
    fn parse_block(&mut self) -> Option<BlockStmt> {
        if !self.cur.kind.ends_line() {
            let stmt = self.parse_statement()?;
            return Some(BlockStmt { statements: vec![stmt] });
        }
        while self.eat(TokenKind::Newline) {}
        if !self.eat(TokenKind::Indent) {
            return Some(BlockStmt::default());
        }
        let statements = self.parse_block_body();
        self.eat(TokenKind::Dedent);
        Some(BlockStmt { statements })
    }

    fn parse_block_body(&mut self) -> Vec<Stmt> {
        let mut out = Vec::new();
        loop {
            match self.cur.kind {
                TokenKind::Dedent | TokenKind::Eof => return out,
                TokenKind::Newline => { self.advance(); }
                TokenKind::Illegal => self.illegal(),
                TokenKind::Indent  => {
                    self.diags.push(self.cur.span, DiagnosticKind::UnexpectedIndent);
                    self.advance();
                    out.extend(self.parse_block_body());
                    self.eat(TokenKind::Dedent);
                }
                _ => match self.parse_statement() {
                    Some(stmt) => out.push(stmt),
                    None       => self.synchronize(),
                },
            }
        }
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    /// `func name(params) [->] [type]:` followed by a block. Inside a struct
    /// `owner` names it; a leading `self` parameter becomes the receiver.
    fn parse_function(&mut self, owner: Option<&str>) -> Option<FunctionDecl> {
        self.expect(TokenKind::KwFunc)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = self.parse_params()?;

        let receiver = owner.map(|owner| {
            let explicit = if params.first().is_some_and(|p| p.name == "self") {
                Some(params.remove(0))
            } else {
                None
            };
            let ty = explicit.and_then(|p| p.ty).unwrap_or_else(|| TypeSpec::named(owner));
            Parameter { name: "self".into(), ty: Some(ty) }
        });

        let return_type = if self.at(TokenKind::Colon) {
            None
        } else {
            self.eat(TokenKind::Arrow);
            Some(self.parse_type()?)
        };
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;

        Some(FunctionDecl { name, params, return_type, body, receiver })
    }

    fn parse_params(&mut self) -> Option<Vec<Parameter>> {
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Some(params);
        }
        loop {
            let name = self.expect_ident()?;
            let ty = if self.at(TokenKind::Comma) || self.at(TokenKind::RParen) {
                None
            } else {
                Some(self.parse_type()?)
            };
            params.push(Parameter { name, ty });
            if !self.eat(TokenKind::Comma) { break; }
        }
        self.expect(TokenKind::RParen)?;
        Some(params)
    }

    fn parse_struct(&mut self) -> Option<StructDecl> {
        self.expect(TokenKind::KwStruct)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        if !self.cur.kind.ends_line() {
            self.error_expected(TokenKind::Newline);
            return None;
        }

        let mut decl = StructDecl { name, fields: Vec::new(), methods: Vec::new() };
        while self.eat(TokenKind::Newline) {}
        if !self.eat(TokenKind::Indent) {
            return Some(decl);
        }

        loop {
            match self.cur.kind {
                TokenKind::Eof => break,
                TokenKind::Dedent => { self.advance(); break; }
                TokenKind::Newline => { self.advance(); }
                TokenKind::Illegal => self.illegal(),
                TokenKind::KwFunc => match self.parse_function(Some(&decl.name)) {
                    Some(method) => decl.methods.push(method),
                    None         => self.synchronize(),
                },
                TokenKind::Ident => match self.parse_field() {
                    Some(field) => { decl.fields.push(field); self.end_of_line(); }
                    None        => self.synchronize(),
                },
                TokenKind::Indent => {
                    self.diags.push(self.cur.span, DiagnosticKind::UnexpectedIndent);
                    self.skip_indented();
                }
                _ => {
                    self.error_expected(TokenKind::Ident);
                    self.synchronize();
                }
            }
        }
        Some(decl)
    }

    /// `name [type] ["tag"]`
    fn parse_field(&mut self) -> Option<Field> {
        let name = self.expect_ident()?;
        let is_tag = |k: TokenKind| matches!(k, TokenKind::String | TokenKind::Char);
        let ty = if self.at_boundary() || is_tag(self.cur.kind) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let tag = if is_tag(self.cur.kind) { Some(self.advance().text) } else { None };
        Some(Field { name, ty, tag })
    }

    // ── Control flow ──────────────────────────────────────────────────────────

    /// Handles both `if` and `elif`; the keyword is consumed either way.
    fn parse_if(&mut self) -> Option<IfStmt> {
        self.advance();
        let cond = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Colon)?;
        let then = self.parse_block()?;

        let else_ = if self.at_clause(TokenKind::KwElif) {
            Some(Box::new(Stmt::If(self.parse_if()?)))
        } else if self.at_clause(TokenKind::KwElse) {
            self.advance();
            self.expect(TokenKind::Colon)?;
            Some(Box::new(Stmt::Block(self.parse_block()?)))
        } else {
            None
        };
        Some(IfStmt { cond, then, else_ })
    }

    /// True if `kind` continues the construct, looking past the newline that
    /// ends a one-line block and any blank or comment-only lines after it.
    fn at_clause(&mut self, kind: TokenKind) -> bool {
        if self.at(TokenKind::Newline) {
            // a run of newlines is layout-equivalent to one
            while self.peek_is(TokenKind::Newline) {
                self.advance();
            }
            if self.peek_is(kind) {
                self.advance();
            }
        }
        self.at(kind)
    }

    fn parse_for(&mut self) -> Option<ForStmt> {
        self.expect(TokenKind::KwFor)?;
        let clause = if self.at(TokenKind::Ident) && self.peek_is(TokenKind::KwIn) {
            let var = self.advance().text;
            self.advance();
            let iterable = self.parse_expression(Precedence::Lowest)?;
            ForClause::Range { var, iterable }
        } else {
            self.parse_for_clauses()?
        };
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;
        Some(ForStmt { clause, body })
    }

    /// `init; cond; update`, a lone condition, or nothing at all.
    fn parse_for_clauses(&mut self) -> Option<ForClause> {
        if self.at(TokenKind::Colon) {
            return Some(ForClause::ThreeClause { init: None, cond: None, update: None });
        }

        let init = if self.at(TokenKind::Semicolon) { None } else { Some(self.parse_simple()?) };
        if !self.at(TokenKind::Semicolon) {
            return match init {
                Some(Stmt::Expression(e)) => {
                    Some(ForClause::ThreeClause { init: None, cond: Some(e.expr), update: None })
                }
                _ => {
                    self.error_expected(TokenKind::Semicolon);
                    None
                }
            };
        }
        self.advance();

        let cond = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.expect(TokenKind::Semicolon)?;
        let update = if self.at(TokenKind::Colon) { None } else { Some(Box::new(self.parse_simple()?)) };

        Some(ForClause::ThreeClause { init: init.map(Box::new), cond, update })
    }

    fn parse_while(&mut self) -> Option<WhileStmt> {
        self.expect(TokenKind::KwWhile)?;
        let cond = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;
        Some(WhileStmt { cond, body })
    }

    // ── Types ─────────────────────────────────────────────────────────────────

    fn parse_type(&mut self) -> Option<TypeSpec> {
        if self.eat(TokenKind::Star) {
            return Some(self.parse_type()?.pointer_to());
        }

        let shape = match self.cur.kind {
            TokenKind::LBracket => {
                self.advance();
                if self.eat(TokenKind::RBracket) {
                    TypeShape::Slice(Box::new(self.parse_type()?))
                } else {
                    let tok = self.expect(TokenKind::Int)?;
                    let Ok(size) = tok.text.parse::<usize>() else {
                        self.diags.push(tok.span, DiagnosticKind::InvalidInteger(tok.text));
                        return None;
                    };
                    self.expect(TokenKind::RBracket)?;
                    TypeShape::Array { size, elem: Box::new(self.parse_type()?) }
                }
            }
            TokenKind::Ident if self.cur.text == "map" && self.peek_is(TokenKind::LBracket) => {
                self.advance();
                self.advance();
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                TypeShape::Map { key: Box::new(key), value: Box::new(value) }
            }
            TokenKind::Ident => {
                let mut name = self.advance().text;
                if self.eat(TokenKind::Dot) {
                    name.push('.');
                    name.push_str(&self.expect_ident()?);
                }
                TypeShape::Named(name)
            }
            TokenKind::KwInterface => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                self.expect(TokenKind::RBrace)?;
                TypeShape::Named("interface{}".into())
            }
            _ => {
                self.error_expected(TokenKind::Ident);
                return None;
            }
        };
        Some(TypeSpec { pointer: false, shape })
    }
}

// ── Expressions (Pratt) ───────────────────────────────────────────────────────

impl<'a> Parser<'a> {
    /// Rule for a token in expression-start position.
    fn prefix_rule(kind: TokenKind) -> Option<PrefixFn<'a>> {
        use TokenKind::*;
        let rule: PrefixFn<'a> = match kind {
            Ident | KwRange  => Self::parse_identifier,
            Int              => Self::parse_int,
            Float            => Self::parse_float,
            String | Char    => Self::parse_string,
            KwTrue | KwFalse => Self::parse_bool,
            KwNil            => Self::parse_nil,
            Minus | KwNot    => Self::parse_prefix,
            LParen           => Self::parse_grouped,
            LBracket         => Self::parse_array,
            LBrace           => Self::parse_map,
            _ => return None,
        };
        Some(rule)
    }

    /// Rule and binding power for a token that continues an expression.
    fn infix_rule(kind: TokenKind) -> Option<(Precedence, InfixFn<'a>)> {
        if let Some(op) = BinaryOp::from_token(kind) {
            return Some((op.precedence(), Self::parse_binary as InfixFn<'a>));
        }
        let rule: InfixFn<'a> = match kind {
            TokenKind::LParen   => Self::parse_call,
            TokenKind::LBracket => Self::parse_index,
            TokenKind::Dot      => Self::parse_selector,
            _ => return None,
        };
        Some((Precedence::Call, rule))
    }

    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let Some(prefix) = Self::prefix_rule(self.cur.kind) else {
            self.error_no_prefix();
            return None;
        };
        let mut left = prefix(self)?;

        while !self.at_boundary() {
            let Some((prec, infix)) = Self::infix_rule(self.cur.kind) else { break };
            if prec <= precedence { break; }
            left = infix(self, left)?;
        }
        Some(left)
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();
        if self.eat(end) {
            return Some(list);
        }
        loop {
            list.push(self.parse_expression(Precedence::Lowest)?);
            if !self.eat(TokenKind::Comma) || self.at(end) { break; }
        }
        self.expect(end)?;
        Some(list)
    }

    // ── Prefix rules ──────────────────────────────────────────────────────────

    fn parse_identifier(&mut self) -> Option<Expr> {
        Some(Expr::ident(self.advance().text))
    }

    fn parse_int(&mut self) -> Option<Expr> {
        let tok = self.advance();
        match tok.text.parse::<i64>() {
            Ok(n) => Some(Expr::Literal(Literal::Int(n))),
            Err(_) => {
                self.diags.push(tok.span, DiagnosticKind::InvalidInteger(tok.text));
                None
            }
        }
    }

    fn parse_float(&mut self) -> Option<Expr> {
        let tok = self.advance();
        match tok.text.parse::<f64>() {
            // Go has no spelling for an overflowed constant
            Ok(x) if x.is_finite() => Some(Expr::Literal(Literal::Float(x))),
            _ => {
                self.diags.push(tok.span, DiagnosticKind::InvalidFloat(tok.text));
                None
            }
        }
    }

    fn parse_string(&mut self) -> Option<Expr> {
        let tok = self.advance();
        let text = match tok.kind {
            TokenKind::Char => requote_single(&tok.text),
            _               => tok.text,
        };
        Some(Expr::Literal(Literal::Str(text)))
    }

    fn parse_bool(&mut self) -> Option<Expr> {
        let tok = self.advance();
        Some(Expr::Literal(Literal::Bool(tok.kind == TokenKind::KwTrue)))
    }

    fn parse_nil(&mut self) -> Option<Expr> {
        self.advance();
        Some(Expr::Literal(Literal::Nil))
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let op = match self.advance().kind {
            TokenKind::KwNot => UnaryOp::Not,
            _                => UnaryOp::Neg,
        };
        let operand = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Unary(UnaryExpr { op, operand: Box::new(operand) }))
    }

    fn parse_grouped(&mut self) -> Option<Expr> {
        self.advance();
        let inner = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen)?;
        Some(inner)
    }

    fn parse_array(&mut self) -> Option<Expr> {
        self.advance();
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expr::Array(ArrayLiteral { elements }))
    }

    fn parse_map(&mut self) -> Option<Expr> {
        self.advance();
        let mut pairs = Vec::new();
        if !self.eat(TokenKind::RBrace) {
            loop {
                let key = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::Colon)?;
                let value = self.parse_expression(Precedence::Lowest)?;
                pairs.push((key, value));
                if !self.eat(TokenKind::Comma) || self.at(TokenKind::RBrace) { break; }
            }
            self.expect(TokenKind::RBrace)?;
        }
        Some(Expr::Map(MapLiteral { pairs }))
    }

    // ── Infix rules ───────────────────────────────────────────────────────────

    fn parse_binary(&mut self, left: Expr) -> Option<Expr> {
        let tok = self.advance();
        let op = BinaryOp::from_token(tok.kind)?;
        let right = self.parse_expression(op.precedence())?;
        Some(Expr::binary(left, op, right))
    }

    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        self.advance();
        let args = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expr::Call(CallExpr { callee: Box::new(callee), args }))
    }

    fn parse_index(&mut self, object: Expr) -> Option<Expr> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RBracket)?;
        Some(Expr::Index(IndexExpr { object: Box::new(object), index: Box::new(index) }))
    }

    fn parse_selector(&mut self, object: Expr) -> Option<Expr> {
        self.advance();
        let member = self.expect_ident()?;
        Some(Expr::Selector(SelectorExpr { object: Box::new(object), member }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a single-quoted literal rewritten for a double-quoted Go string.
fn requote_single(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(n)    => { out.push('\\'); out.push(n); }
                None       => out.push_str("\\\\"),
            },
            '"' => out.push_str("\\\""),
            c   => out.push(c),
        }
    }
    out
}
