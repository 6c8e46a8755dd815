// ─────────────────────────────────────────────────────────────────────────────
//  gos :: parser :: ast
//  Abstract Syntax Tree for Go-Script. Closed node set, tree-shaped ownership.
// ─────────────────────────────────────────────────────────────────────────────

use std::fmt;

use crate::lexer::token::TokenKind;

// ── Types ─────────────────────────────────────────────────────────────────────

/// A written type. Exactly one shape is active; `pointer` composes with any.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub pointer: bool,
    pub shape:   TypeShape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Named (String),
    Slice (Box<TypeSpec>),
    Array { size: usize, elem: Box<TypeSpec> },
    Map   { key: Box<TypeSpec>, value: Box<TypeSpec> },
}

impl TypeSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self { pointer: false, shape: TypeShape::Named(name.into()) }
    }

    pub fn pointer_to(mut self) -> Self {
        self.pointer = true;
        self
    }

    /// Plain type name, `None` for composite shapes.
    pub fn name(&self) -> Option<&str> {
        match &self.shape {
            TypeShape::Named(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer { f.write_str("*")?; }
        match &self.shape {
            TypeShape::Named(n)             => f.write_str(n),
            TypeShape::Slice(elem)          => write!(f, "[]{elem}"),
            TypeShape::Array { size, elem } => write!(f, "[{size}]{elem}"),
            TypeShape::Map { key, value }   => write!(f, "map[{key}]{value}"),
        }
    }
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Binding power, lowest first. Shared by the parser's rule table and by the
/// generator when it decides where parentheses are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, Sub, Mul, Div, Rem, Pow,
    Eq, NotEq, Lt, LtEq, Gt, GtEq,
    And, Or,
    BitAnd, BitOr, BitXor, BitClear, Shl, Shr,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        Some(match kind {
            T::Plus     => Self::Add,    T::Minus    => Self::Sub,
            T::Star     => Self::Mul,    T::Slash    => Self::Div,
            T::Percent  => Self::Rem,    T::Power    => Self::Pow,
            T::Eq       => Self::Eq,     T::NotEq    => Self::NotEq,
            T::Lt       => Self::Lt,     T::LtEq     => Self::LtEq,
            T::Gt       => Self::Gt,     T::GtEq     => Self::GtEq,
            T::KwAnd    => Self::And,    T::KwOr     => Self::Or,
            T::BitAnd   => Self::BitAnd, T::BitOr    => Self::BitOr,
            T::BitXor   => Self::BitXor, T::BitClear => Self::BitClear,
            T::Shl      => Self::Shl,    T::Shr      => Self::Shr,
            _ => return None,
        })
    }

    pub fn precedence(self) -> Precedence {
        match self {
            Self::Or  => Precedence::Or,
            Self::And => Precedence::And,
            Self::Eq | Self::NotEq => Precedence::Equals,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => Precedence::LessGreater,
            Self::Add | Self::Sub | Self::BitOr | Self::BitXor => Precedence::Sum,
            Self::Mul | Self::Div | Self::Rem | Self::Pow
            | Self::BitAnd | Self::BitClear | Self::Shl | Self::Shr => Precedence::Product,
        }
    }

    /// Spelling in Go-Script source.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add    => "+",   Self::Sub      => "-",
            Self::Mul    => "*",   Self::Div      => "/",
            Self::Rem    => "%",   Self::Pow      => "**",
            Self::Eq     => "==",  Self::NotEq    => "!=",
            Self::Lt     => "<",   Self::LtEq     => "<=",
            Self::Gt     => ">",   Self::GtEq     => ">=",
            Self::And    => "and", Self::Or       => "or",
            Self::BitAnd => "&",   Self::BitOr    => "|",
            Self::BitXor => "^",   Self::BitClear => "&^",
            Self::Shl    => "<<",  Self::Shr      => ">>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp { Neg, Not }

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp { Assign, Add, Sub, Mul, Div, Rem }

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Assign    => Self::Assign,
            TokenKind::PlusEq    => Self::Add,
            TokenKind::MinusEq   => Self::Sub,
            TokenKind::StarEq    => Self::Mul,
            TokenKind::SlashEq   => Self::Div,
            TokenKind::PercentEq => Self::Rem,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",  Self::Add => "+=", Self::Sub => "-=",
            Self::Mul    => "*=", Self::Div => "/=", Self::Rem => "%=",
        }
    }
}

// ── Expressions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary   (BinaryExpr),
    Unary    (UnaryExpr),
    Call     (CallExpr),
    Ident    (Identifier),
    Literal  (Literal),
    Array    (ArrayLiteral),
    Map      (MapLiteral),
    Index    (IndexExpr),
    Selector (SelectorExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left:  Box<Expr>,
    pub op:    BinaryOp,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op:      UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args:   Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralType { Int, Float, String, Bool, Nil }

/// Literal payload. The variant is the type tag, so the two cannot disagree.
/// `Str` holds the text between the quotes with escapes left as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int   (i64),
    Float (f64),
    Str   (String),
    Bool  (bool),
    Nil,
}

impl Literal {
    pub fn type_tag(&self) -> LiteralType {
        match self {
            Self::Int(_)   => LiteralType::Int,
            Self::Float(_) => LiteralType::Float,
            Self::Str(_)   => LiteralType::String,
            Self::Bool(_)  => LiteralType::Bool,
            Self::Nil      => LiteralType::Nil,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expr>,
}

/// Pairs in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLiteral {
    pub pairs: Vec<(Expr, Expr)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index:  Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub object: Box<Expr>,
    pub member: String,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Identifier { name: name.into() })
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary(BinaryExpr { left: Box::new(left), op, right: Box::new(right) })
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(id) => Some(&id.name),
            _ => None,
        }
    }

    /// Can this expression stand on the left of `=` / `++`?
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Index(_) | Expr::Selector(_))
    }

    pub fn accept<V: Visitor>(&self, v: &mut V) -> V::Output {
        match self {
            Expr::Binary(e)   => v.visit_binary(e),
            Expr::Unary(e)    => v.visit_unary(e),
            Expr::Call(e)     => v.visit_call(e),
            Expr::Ident(e)    => v.visit_identifier(e),
            Expr::Literal(e)  => v.visit_literal(e),
            Expr::Array(e)    => v.visit_array(e),
            Expr::Map(e)      => v.visit_map(e),
            Expr::Index(e)    => v.visit_index(e),
            Expr::Selector(e) => v.visit_selector(e),
        }
    }
}

// ── Statements ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Function   (FunctionDecl),
    Struct     (StructDecl),
    Var        (VarDecl),
    If         (IfStmt),
    For        (ForStmt),
    While      (WhileStmt),
    Return     (ReturnStmt),
    Branch     (BranchStmt),
    Assign     (AssignStmt),
    IncDec     (IncDecStmt),
    Expression (ExpressionStmt),
    Block      (BlockStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty:   Option<TypeSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty:   Option<TypeSpec>,
    pub tag:  Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name:        String,
    pub params:      Vec<Parameter>,
    pub return_type: Option<TypeSpec>,
    pub body:        BlockStmt,
    /// Present exactly when this is a method.
    pub receiver:    Option<Parameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name:    String,
    pub fields:  Vec<Field>,
    pub methods: Vec<FunctionDecl>,
}

/// How a `VarDecl` was written: `var x ...`, `x := ...` or `x = ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding { Var, Walrus, Assign }

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name:    String,
    pub ty:      Option<TypeSpec>,
    pub value:   Option<Expr>,
    pub binding: Binding,
}

impl VarDecl {
    /// `x := v` introduces a new name without a written type.
    pub fn is_walrus(&self) -> bool { self.binding == Binding::Walrus }

    pub fn is_new_binding(&self) -> bool { self.binding != Binding::Assign }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond:  Expr,
    pub then:  BlockStmt,
    /// Another `IfStmt` for `elif`, a `BlockStmt` for `else`.
    pub else_: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForClause {
    ThreeClause {
        init:   Option<Box<Stmt>>,
        cond:   Option<Expr>,
        update: Option<Box<Stmt>>,
    },
    Range {
        var:      String,
        iterable: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub clause: ForClause,
    pub body:   BlockStmt,
}

impl ForStmt {
    pub fn is_range(&self) -> bool { matches!(self.clause, ForClause::Range { .. }) }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchStmt { Break, Continue }

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub op:     AssignOp,
    pub value:  Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncDecStmt {
    pub target:    Expr,
    pub increment: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

impl Stmt {
    pub fn accept<V: Visitor>(&self, v: &mut V) -> V::Output {
        match self {
            Stmt::Function(s)   => v.visit_function(s),
            Stmt::Struct(s)     => v.visit_struct(s),
            Stmt::Var(s)        => v.visit_var(s),
            Stmt::If(s)         => v.visit_if(s),
            Stmt::For(s)        => v.visit_for(s),
            Stmt::While(s)      => v.visit_while(s),
            Stmt::Return(s)     => v.visit_return(s),
            Stmt::Branch(s)     => v.visit_branch(s),
            Stmt::Assign(s)     => v.visit_assign(s),
            Stmt::IncDec(s)     => v.visit_inc_dec(s),
            Stmt::Expression(s) => v.visit_expression_stmt(s),
            Stmt::Block(s)      => v.visit_block(s),
        }
    }
}

// ── Program root ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Fully qualified Go path, already alias-resolved.
    pub path:  String,
    pub alias: Option<String>,
    /// Names pulled in by `from "p" import a, b`.
    pub items: Vec<String>,
}

impl ImportDecl {
    /// The name this package is referenced by in Go source.
    pub fn local_name(&self) -> &str {
        if let Some(a) = &self.alias { return a; }
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub package:    String,
    pub imports:    Vec<ImportDecl>,
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn accept<V: Visitor>(&self, v: &mut V) -> V::Output {
        v.visit_program(self)
    }
}

// ── Visitor ───────────────────────────────────────────────────────────────────

/// Double dispatch over the closed node set. Each `accept` forwards to the
/// matching method and returns its result.
pub trait Visitor {
    type Output;

    fn visit_program(&mut self, node: &Program) -> Self::Output;

    fn visit_function(&mut self, node: &FunctionDecl) -> Self::Output;
    fn visit_struct(&mut self, node: &StructDecl) -> Self::Output;
    fn visit_var(&mut self, node: &VarDecl) -> Self::Output;
    fn visit_if(&mut self, node: &IfStmt) -> Self::Output;
    fn visit_for(&mut self, node: &ForStmt) -> Self::Output;
    fn visit_while(&mut self, node: &WhileStmt) -> Self::Output;
    fn visit_return(&mut self, node: &ReturnStmt) -> Self::Output;
    fn visit_branch(&mut self, node: &BranchStmt) -> Self::Output;
    fn visit_assign(&mut self, node: &AssignStmt) -> Self::Output;
    fn visit_inc_dec(&mut self, node: &IncDecStmt) -> Self::Output;
    fn visit_expression_stmt(&mut self, node: &ExpressionStmt) -> Self::Output;
    fn visit_block(&mut self, node: &BlockStmt) -> Self::Output;

    fn visit_binary(&mut self, node: &BinaryExpr) -> Self::Output;
    fn visit_unary(&mut self, node: &UnaryExpr) -> Self::Output;
    fn visit_call(&mut self, node: &CallExpr) -> Self::Output;
    fn visit_identifier(&mut self, node: &Identifier) -> Self::Output;
    fn visit_literal(&mut self, node: &Literal) -> Self::Output;
    fn visit_array(&mut self, node: &ArrayLiteral) -> Self::Output;
    fn visit_map(&mut self, node: &MapLiteral) -> Self::Output;
    fn visit_index(&mut self, node: &IndexExpr) -> Self::Output;
    fn visit_selector(&mut self, node: &SelectorExpr) -> Self::Output;
}

// ── Debug text ────────────────────────────────────────────────────────────────
//
// One line per statement, expressions fully parenthesised so that the shape
// of the tree is visible. Used by `gos debug` and the tests; never by codegen.

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary(b)   => write!(f, "({} {} {})", b.left, b.op.symbol(), b.right),
            Expr::Unary(u)    => match u.op {
                UnaryOp::Neg => write!(f, "(-{})", u.operand),
                UnaryOp::Not => write!(f, "(not {})", u.operand),
            },
            Expr::Call(c)     => write!(f, "{}({})", c.callee, join(&c.args, ", ")),
            Expr::Ident(id)   => f.write_str(&id.name),
            Expr::Literal(l)  => write!(f, "{l}"),
            Expr::Array(a)    => write!(f, "[{}]", join(&a.elements, ", ")),
            Expr::Map(m)      => {
                let pairs: Vec<String> = m.pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expr::Index(i)    => write!(f, "{}[{}]", i.object, i.index),
            Expr::Selector(s) => write!(f, "{}.{}", s.object, s.member),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n)   => write!(f, "{n}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s)   => write!(f, "\"{s}\""),
            Literal::Bool(b)  => write!(f, "{b}"),
            Literal::Nil      => f.write_str("nil"),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "{} {}", self.name, ty),
            None     => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for BlockStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        write!(f, "{{ {} }}", join(&self.statements, "; "))
    }
}

impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("func ")?;
        if let Some(recv) = &self.receiver {
            write!(f, "({recv}) ")?;
        }
        write!(f, "{}({})", self.name, join(&self.params, ", "))?;
        if let Some(ret) = &self.return_type {
            write!(f, " {ret}")?;
        }
        write!(f, " {}", self.body)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Function(func) => write!(f, "{func}"),
            Stmt::Struct(s) => {
                let mut members: Vec<String> = s.fields.iter().map(|fd| {
                    let mut out = fd.name.clone();
                    if let Some(ty) = &fd.ty { out.push_str(&format!(" {ty}")); }
                    if let Some(tag) = &fd.tag { out.push_str(&format!(" \"{tag}\"")); }
                    out
                }).collect();
                members.extend(s.methods.iter().map(ToString::to_string));
                write!(f, "struct {} {{ {} }}", s.name, members.join("; "))
            }
            Stmt::Var(v) => {
                let value = v.value.as_ref().map(|e| e.to_string());
                match (v.binding, &v.ty, value) {
                    (Binding::Var, Some(ty), Some(val)) => write!(f, "var {} {} = {}", v.name, ty, val),
                    (Binding::Var, Some(ty), None)      => write!(f, "var {} {}", v.name, ty),
                    (Binding::Var, None, val)           => write!(f, "var {} = {}", v.name, val.unwrap_or_default()),
                    (Binding::Walrus, _, val)           => write!(f, "{} := {}", v.name, val.unwrap_or_default()),
                    (Binding::Assign, _, val)           => write!(f, "{} = {}", v.name, val.unwrap_or_default()),
                }
            }
            Stmt::If(i) => {
                write!(f, "if {} {}", i.cond, i.then)?;
                match i.else_.as_deref() {
                    Some(Stmt::If(elif)) => write!(f, " el{}", Stmt::If(elif.clone())),
                    Some(other)          => write!(f, " else {other}"),
                    None                 => Ok(()),
                }
            }
            Stmt::For(fs) => match &fs.clause {
                ForClause::Range { var, iterable } => write!(f, "for {var} in {iterable} {}", fs.body),
                ForClause::ThreeClause { init, cond, update } => {
                    let part = |s: Option<String>| s.unwrap_or_default();
                    write!(
                        f, "for {}; {}; {} {}",
                        part(init.as_ref().map(|s| s.to_string())),
                        part(cond.as_ref().map(|e| e.to_string())),
                        part(update.as_ref().map(|s| s.to_string())),
                        fs.body,
                    )
                }
            },
            Stmt::While(w)  => write!(f, "while {} {}", w.cond, w.body),
            Stmt::Return(r) => match &r.value {
                Some(v) => write!(f, "return {v}"),
                None    => f.write_str("return"),
            },
            Stmt::Branch(BranchStmt::Break)    => f.write_str("break"),
            Stmt::Branch(BranchStmt::Continue) => f.write_str("continue"),
            Stmt::Assign(a)     => write!(f, "{} {} {}", a.target, a.op.symbol(), a.value),
            Stmt::IncDec(s)     => write!(f, "{}{}", s.target, if s.increment { "++" } else { "--" }),
            Stmt::Expression(e) => write!(f, "{}", e.expr),
            Stmt::Block(b)      => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {}", self.package)?;
        for imp in &self.imports {
            write!(f, "import \"{}\"", imp.path)?;
            if let Some(alias) = &imp.alias { write!(f, " as {alias}")?; }
            if !imp.items.is_empty() { write!(f, " ({})", imp.items.join(", "))?; }
            writeln!(f)?;
        }
        for stmt in &self.statements {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn type_spec_display() {
        let map = TypeSpec {
            pointer: false,
            shape: TypeShape::Map {
                key:   Box::new(TypeSpec::named("string")),
                value: Box::new(TypeSpec {
                    pointer: false,
                    shape: TypeShape::Slice(Box::new(TypeSpec::named("int"))),
                }),
            },
        };
        assert_eq!(map.to_string(), "map[string][]int");
        assert!(matches!(map.shape, TypeShape::Map { .. }));
        assert_eq!(map.name(), None);

        let arr = TypeSpec {
            pointer: true,
            shape: TypeShape::Array { size: 3, elem: Box::new(TypeSpec::named("byte")) },
        };
        assert_eq!(arr.to_string(), "*[3]byte");
        assert_eq!(TypeSpec::named("Point").pointer_to().to_string(), "*Point");
    }

    #[test]
    fn literal_tags_follow_payload() {
        assert_eq!(Literal::Int(1).type_tag(), LiteralType::Int);
        assert_eq!(Literal::Float(1.0).type_tag(), LiteralType::Float);
        assert_eq!(Literal::Str("a".into()).type_tag(), LiteralType::String);
        assert_eq!(Literal::Bool(true).type_tag(), LiteralType::Bool);
        assert_eq!(Literal::Nil.type_tag(), LiteralType::Nil);
    }

    #[test]
    fn debug_text_is_fully_parenthesised() {
        let e = Expr::binary(
            Expr::Literal(Literal::Int(1)),
            BinaryOp::Add,
            Expr::binary(Expr::Literal(Literal::Int(2)), BinaryOp::Mul, Expr::Literal(Literal::Int(3))),
        );
        assert_eq!(e.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn import_local_name() {
        let imp = ImportDecl { path: "net/http".into(), alias: None, items: vec![] };
        assert_eq!(imp.local_name(), "http");
        let aliased = ImportDecl { path: "math/rand".into(), alias: Some("mr".into()), items: vec![] };
        assert_eq!(aliased.local_name(), "mr");
    }

    struct CountIdents(usize);

    impl Visitor for CountIdents {
        type Output = ();
        fn visit_program(&mut self, p: &Program) { p.statements.iter().for_each(|s| s.accept(self)) }
        fn visit_function(&mut self, n: &FunctionDecl) { self.visit_block(&n.body) }
        fn visit_struct(&mut self, _: &StructDecl) {}
        fn visit_var(&mut self, n: &VarDecl) { if let Some(v) = &n.value { v.accept(self) } }
        fn visit_if(&mut self, _: &IfStmt) {}
        fn visit_for(&mut self, _: &ForStmt) {}
        fn visit_while(&mut self, _: &WhileStmt) {}
        fn visit_return(&mut self, n: &ReturnStmt) { if let Some(v) = &n.value { v.accept(self) } }
        fn visit_branch(&mut self, _: &BranchStmt) {}
        fn visit_assign(&mut self, _: &AssignStmt) {}
        fn visit_inc_dec(&mut self, _: &IncDecStmt) {}
        fn visit_expression_stmt(&mut self, n: &ExpressionStmt) { n.expr.accept(self) }
        fn visit_block(&mut self, n: &BlockStmt) { n.statements.iter().for_each(|s| s.accept(self)) }
        fn visit_binary(&mut self, n: &BinaryExpr) { n.left.accept(self); n.right.accept(self) }
        fn visit_unary(&mut self, n: &UnaryExpr) { n.operand.accept(self) }
        fn visit_call(&mut self, n: &CallExpr) { n.callee.accept(self); n.args.iter().for_each(|a| a.accept(self)) }
        fn visit_identifier(&mut self, _: &Identifier) { self.0 += 1 }
        fn visit_literal(&mut self, _: &Literal) {}
        fn visit_array(&mut self, _: &ArrayLiteral) {}
        fn visit_map(&mut self, _: &MapLiteral) {}
        fn visit_index(&mut self, _: &IndexExpr) {}
        fn visit_selector(&mut self, _: &SelectorExpr) {}
    }

    #[test]
    fn accept_dispatches_per_variant() {
        let prog = Program {
            package: "main".into(),
            imports: vec![],
            statements: vec![Stmt::Function(FunctionDecl {
                name: "add".into(),
                params: vec![],
                return_type: None,
                receiver: None,
                body: BlockStmt {
                    statements: vec![Stmt::Return(ReturnStmt {
                        value: Some(Expr::binary(Expr::ident("x"), BinaryOp::Add, Expr::ident("y"))),
                    })],
                },
            })],
        };
        let mut v = CountIdents(0);
        prog.accept(&mut v);
        assert_eq!(v.0, 2);
    }
}
