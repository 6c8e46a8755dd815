// ─────────────────────────────────────────────────────────────────────────────
//  gos :: transpiler
//  Program AST → gofmt-style Go source. Each visit returns the rendered text
//  of one node; statements come back already indented to the current depth.
// ─────────────────────────────────────────────────────────────────────────────

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::error::{GosError, Result};
use crate::parser::ast::*;
use crate::runtime::Runtime;

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TranspileConfig {
    /// One indentation step. gofmt uses a tab.
    pub indent:       String,
    /// Add imports that rewrites depend on (`fmt` for `print`, `math` for `**`)
    /// and for known packages used as `pkg.Name` without an import line.
    pub auto_imports: bool,
    /// Prefix the output with a "generated, do not edit" comment.
    pub emit_header:  bool,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self { indent: "\t".into(), auto_imports: true, emit_header: false }
    }
}

pub const HEADER: &str = "// Code generated by gos. DO NOT EDIT.";

// ── Transpiler ────────────────────────────────────────────────────────────────

pub struct Transpiler {
    cfg:   TranspileConfig,
    rt:    Runtime,
    depth: usize,
    /// Packages a rewrite needs imported.
    needs: BTreeSet<String>,
    /// `from "p" import x` → `x` renders as `p.x`.
    items: HashMap<String, String>,
    /// Local names of explicit imports.
    imported: HashSet<String>,
    /// Names bound so far: package-level vars, then the current function's
    /// params and locals. Scoped per function, not per block.
    bound: HashSet<String>,
}

impl Transpiler {
    pub fn new(cfg: TranspileConfig) -> Self {
        Self::with_runtime(cfg, Runtime::new())
    }

    pub fn with_runtime(cfg: TranspileConfig, rt: Runtime) -> Self {
        Self {
            cfg,
            rt,
            depth:    0,
            needs:    BTreeSet::new(),
            items:    HashMap::new(),
            imported: HashSet::new(),
            bound:    HashSet::new(),
        }
    }

    pub fn generate(&mut self, prog: &Program) -> Result<String> {
        self.depth = 0;
        self.needs.clear();
        self.items.clear();
        self.imported.clear();
        self.bound.clear();
        let out = prog.accept(self)?;
        debug!(bytes = out.len(), auto_imports = ?self.needs, "generated go source");
        Ok(out)
    }

    /// A known package referenced as `name.X` with no import line naming it.
    fn note_package(&mut self, name: &str) {
        if self.bound.contains(name) || self.imported.contains(name) || self.items.contains_key(name) {
            return;
        }
        let Some(entry) = self.rt.aliases.get(name) else { return };
        // only when the Go package name is the identifier itself
        if entry.path.rsplit('/').next() == Some(name) {
            self.needs.insert(entry.path.clone());
        }
    }

    fn pad(&self) -> String {
        self.cfg.indent.repeat(self.depth)
    }

    fn expr(&mut self, e: &Expr) -> Result<String> {
        e.accept(self)
    }

    /// `e` as an operand of something binding at `Precedence::Call`
    /// (callee, indexed object, selector base).
    fn operand(&mut self, e: &Expr) -> Result<String> {
        let text = self.expr(e)?;
        Ok(match e {
            Expr::Binary(b) if b.op != BinaryOp::Pow => format!("({text})"),
            Expr::Unary(_) => format!("({text})"),
            _ => text,
        })
    }

    /// `{ ... }` after a header, closing brace at the current depth.
    fn block(&mut self, block: &BlockStmt) -> Result<String> {
        self.depth += 1;
        let body: Result<Vec<String>> = block.statements.iter().map(|s| s.accept(self)).collect();
        self.depth -= 1;
        let body = body?;
        if body.is_empty() {
            return Ok(format!("{{\n{}}}", self.pad()));
        }
        Ok(format!("{{\n{}\n{}}}", body.join("\n"), self.pad()))
    }

    /// A statement that fits in a `for` header.
    fn inline(&mut self, stmt: &Stmt) -> Result<String> {
        match stmt {
            Stmt::Var(_) | Stmt::Assign(_) | Stmt::IncDec(_) | Stmt::Expression(_) => {
                // render as if nested so a package-level loop keeps `:=`
                self.depth += 1;
                let text = stmt.accept(self);
                self.depth -= 1;
                Ok(text?.trim_start().to_string())
            }
            other => Err(GosError::codegen(format!("`{other}` cannot appear in a for clause"))),
        }
    }

    fn if_chain(&mut self, node: &IfStmt) -> Result<String> {
        let cond = self.expr(&node.cond)?;
        let mut out = format!("if {cond} {}", self.block(&node.then)?);
        match node.else_.as_deref() {
            Some(Stmt::If(elif))  => out.push_str(&format!(" else {}", self.if_chain(elif)?)),
            Some(Stmt::Block(b))  => out.push_str(&format!(" else {}", self.block(b)?)),
            Some(other) => {
                let wrapped = BlockStmt { statements: vec![other.clone()] };
                out.push_str(&format!(" else {}", self.block(&wrapped)?));
            }
            None => {}
        }
        Ok(out)
    }
}

// ── Operator rendering ────────────────────────────────────────────────────────

/// Go's binary precedence levels (5 binds tightest). These differ from the
/// script's: Go puts equality and ordering on one level.
fn go_level(op: BinaryOp) -> u8 {
    match op.precedence() {
        Precedence::Or  => 1,
        Precedence::And => 2,
        Precedence::Equals | Precedence::LessGreater => 3,
        Precedence::Sum => 4,
        _ => 5,
    }
}

fn go_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::And => "&&",
        BinaryOp::Or  => "||",
        other         => other.symbol(),
    }
}

/// Does `child` need parentheses as an operand of `parent`?
fn needs_parens(child: &Expr, parent: BinaryOp, right: bool) -> bool {
    let Expr::Binary(c) = child else { return false };
    if c.op == BinaryOp::Pow {
        return false;
    }
    let (cl, pl) = (go_level(c.op), go_level(parent));
    cl < pl || (right && cl == pl)
}

fn counting_loop(var: &str, from: &str, to: &str, step: Option<&str>) -> String {
    let update = match step {
        Some(s) => format!("{var} += {s}"),
        None    => format!("{var}++"),
    };
    format!("for {var} := {from}; {var} < {to}; {update}")
}

fn render_params(params: &[Parameter]) -> String {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| match &p.ty {
            Some(ty) => format!("{} {}", p.name, ty),
            // `x, y int` shares the type of the next typed parameter
            None if params[i + 1..].iter().any(|q| q.ty.is_some()) => p.name.clone(),
            None => format!("{} interface{{}}", p.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Visitor ───────────────────────────────────────────────────────────────────

impl Visitor for Transpiler {
    type Output = Result<String>;

    fn visit_program(&mut self, node: &Program) -> Result<String> {
        for imp in &node.imports {
            let pkg = imp.local_name().to_string();
            for item in &imp.items {
                self.items.insert(item.clone(), format!("{pkg}.{item}"));
            }
            if imp.items.is_empty() {
                self.imported.insert(pkg);
            }
        }
        for stmt in &node.statements {
            if let Stmt::Var(v) = stmt {
                self.bound.insert(v.name.clone());
            }
        }

        let mut decls = Vec::with_capacity(node.statements.len());
        for stmt in &node.statements {
            decls.push(stmt.accept(self)?);
        }

        // path (unquoted) → alias, sorted the way gofmt sorts an import block
        let mut imports: BTreeMap<String, Option<String>> = BTreeMap::new();
        for imp in &node.imports {
            let path = imp.path.trim_matches('"').to_string();
            let slot = imports.entry(path).or_default();
            if slot.is_none() {
                *slot = imp.alias.clone();
            }
        }
        if self.cfg.auto_imports {
            for pkg in &self.needs {
                imports.entry(pkg.clone()).or_default();
            }
        }

        let mut out = String::new();
        if self.cfg.emit_header {
            out.push_str(HEADER);
            out.push_str("\n\n");
        }
        out.push_str(&format!("package {}\n", node.package));

        if !imports.is_empty() {
            out.push_str("\nimport (\n");
            for (path, alias) in &imports {
                out.push_str(&self.cfg.indent);
                if let Some(a) = alias {
                    out.push_str(a);
                    out.push(' ');
                }
                out.push_str(&format!("\"{path}\""));
                out.push('\n');
            }
            out.push_str(")\n");
        }

        if !decls.is_empty() {
            out.push('\n');
            out.push_str(&decls.join("\n\n"));
            out.push('\n');
        }
        Ok(out)
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    fn visit_function(&mut self, node: &FunctionDecl) -> Result<String> {
        let recv = match &node.receiver {
            Some(r) => format!("({}) ", render_params(std::slice::from_ref(r))),
            None    => String::new(),
        };
        let ret = node.return_type.as_ref().map(|t| format!(" {t}")).unwrap_or_default();

        let outer = self.bound.clone();
        self.bound.extend(node.receiver.iter().chain(&node.params).map(|p| p.name.clone()));
        let body = self.block(&node.body);
        self.bound = outer;
        let body = body?;
        Ok(format!(
            "{}func {recv}{}({}){ret} {body}",
            self.pad(),
            node.name,
            render_params(&node.params),
        ))
    }

    fn visit_struct(&mut self, node: &StructDecl) -> Result<String> {
        let pad = self.pad();
        let inner = format!("{pad}{}", self.cfg.indent);

        let types: Vec<String> = node.fields.iter()
            .map(|f| f.ty.as_ref().map_or_else(|| "interface{}".to_string(), ToString::to_string))
            .collect();
        let name_w = node.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        let type_w = types.iter().map(String::len).max().unwrap_or(0);

        let mut out = format!("{pad}type {} struct {{\n", node.name);
        for (field, ty) in node.fields.iter().zip(&types) {
            let line = match &field.tag {
                Some(tag) => format!("{:name_w$} {:type_w$} `{}`", field.name, ty, tag.replace("\\\"", "\"")),
                None      => format!("{:name_w$} {ty}", field.name),
            };
            out.push_str(&inner);
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push_str(&format!("{pad}}}"));

        for method in &node.methods {
            out.push_str("\n\n");
            out.push_str(&self.visit_function(method)?);
        }
        Ok(out)
    }

    fn visit_var(&mut self, node: &VarDecl) -> Result<String> {
        let pad = self.pad();
        let value = node.value.as_ref().map(|e| self.expr(e)).transpose()?;
        let name = &node.name;
        let missing = || GosError::codegen(format!("`{name}` is bound without a value"));
        if node.binding != Binding::Assign {
            self.bound.insert(name.clone());
        }

        Ok(match node.binding {
            // `:=` is not allowed at package level
            Binding::Walrus if self.depth == 0 => format!("var {name} = {}", value.ok_or_else(missing)?),
            Binding::Walrus => format!("{pad}{name} := {}", value.ok_or_else(missing)?),
            Binding::Assign if self.depth == 0 => {
                return Err(GosError::codegen(format!("`{name} = ...` is not allowed at package level")));
            }
            Binding::Assign => format!("{pad}{name} = {}", value.ok_or_else(missing)?),
            Binding::Var => match (&node.ty, value) {
                (Some(ty), Some(v)) => format!("{pad}var {name} {ty} = {v}"),
                (Some(ty), None)    => format!("{pad}var {name} {ty}"),
                (None, Some(v))     => format!("{pad}var {name} = {v}"),
                (None, None)        => return Err(missing()),
            },
        })
    }

    // ── Control flow ──────────────────────────────────────────────────────────

    fn visit_if(&mut self, node: &IfStmt) -> Result<String> {
        Ok(format!("{}{}", self.pad(), self.if_chain(node)?))
    }

    fn visit_for(&mut self, node: &ForStmt) -> Result<String> {
        let header = match &node.clause {
            ForClause::Range { var, iterable } => match iterable {
                Expr::Call(call) if call.callee.as_ident() == Some("range") => {
                    let args: Result<Vec<String>> = call.args.iter().map(|a| self.expr(a)).collect();
                    match &args?[..] {
                        [n]          => counting_loop(var, "0", n, None),
                        [a, b]       => counting_loop(var, a, b, None),
                        [a, b, step] => counting_loop(var, a, b, Some(step.as_str())),
                        [] => return Err(GosError::codegen("range() needs at least one bound")),
                        _  => return Err(GosError::codegen("range() takes at most three arguments")),
                    }
                }
                Expr::Literal(Literal::Int(n)) => counting_loop(var, "0", &n.to_string(), None),
                other => format!("for {var} := range {}", self.expr(other)?),
            },
            ForClause::ThreeClause { init, cond, update } => {
                let init   = init.as_deref().map(|s| self.inline(s)).transpose()?;
                let cond   = cond.as_ref().map(|e| self.expr(e)).transpose()?;
                let update = update.as_deref().map(|s| self.inline(s)).transpose()?;
                match (init, cond, update) {
                    (None, None, None)    => "for".to_string(),
                    (None, Some(c), None) => format!("for {c}"),
                    (i, c, u) => format!(
                        "for {}; {}; {}",
                        i.unwrap_or_default(),
                        c.unwrap_or_default(),
                        u.unwrap_or_default(),
                    ),
                }
            }
        };
        if let ForClause::Range { var, .. } = &node.clause {
            self.bound.insert(var.clone());
        }
        Ok(format!("{}{header} {}", self.pad(), self.block(&node.body)?))
    }

    fn visit_while(&mut self, node: &WhileStmt) -> Result<String> {
        let cond = self.expr(&node.cond)?;
        Ok(format!("{}for {cond} {}", self.pad(), self.block(&node.body)?))
    }

    fn visit_return(&mut self, node: &ReturnStmt) -> Result<String> {
        Ok(match &node.value {
            Some(v) => format!("{}return {}", self.pad(), self.expr(v)?),
            None    => format!("{}return", self.pad()),
        })
    }

    fn visit_branch(&mut self, node: &BranchStmt) -> Result<String> {
        let word = match node {
            BranchStmt::Break    => "break",
            BranchStmt::Continue => "continue",
        };
        Ok(format!("{}{word}", self.pad()))
    }

    fn visit_assign(&mut self, node: &AssignStmt) -> Result<String> {
        let target = self.expr(&node.target)?;
        let value = self.expr(&node.value)?;
        Ok(format!("{}{target} {} {value}", self.pad(), node.op.symbol()))
    }

    fn visit_inc_dec(&mut self, node: &IncDecStmt) -> Result<String> {
        let target = self.expr(&node.target)?;
        Ok(format!("{}{target}{}", self.pad(), if node.increment { "++" } else { "--" }))
    }

    fn visit_expression_stmt(&mut self, node: &ExpressionStmt) -> Result<String> {
        Ok(format!("{}{}", self.pad(), self.expr(&node.expr)?))
    }

    fn visit_block(&mut self, node: &BlockStmt) -> Result<String> {
        Ok(format!("{}{}", self.pad(), self.block(node)?))
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    fn visit_binary(&mut self, node: &BinaryExpr) -> Result<String> {
        let left = self.expr(&node.left)?;
        let right = self.expr(&node.right)?;

        if let Some(rewrite) = self.rt.operator(node.op.symbol()) {
            if let Some(pkg) = rewrite.needs {
                self.needs.insert(pkg.to_string());
            }
            return Ok(rewrite.map.apply(&[left, right]));
        }

        let left = if needs_parens(&node.left, node.op, false) { format!("({left})") } else { left };
        let right = if needs_parens(&node.right, node.op, true) { format!("({right})") } else { right };
        Ok(format!("{left} {} {right}", go_symbol(node.op)))
    }

    fn visit_unary(&mut self, node: &UnaryExpr) -> Result<String> {
        let inner = self.expr(&node.operand)?;
        let wrap = match &*node.operand {
            Expr::Binary(b) => b.op != BinaryOp::Pow,
            // `- -x` would lex as `--` in Go
            _ => node.op == UnaryOp::Neg && inner.starts_with('-'),
        };
        let inner = if wrap { format!("({inner})") } else { inner };
        Ok(match node.op {
            UnaryOp::Neg => format!("-{inner}"),
            UnaryOp::Not => format!("!{inner}"),
        })
    }

    fn visit_call(&mut self, node: &CallExpr) -> Result<String> {
        let args: Vec<String> = node.args.iter().map(|a| self.expr(a)).collect::<Result<_>>()?;

        if let Some(name) = node.callee.as_ident() {
            if !self.items.contains_key(name) && !self.bound.contains(name) {
                if let Some(builtin) = self.rt.builtin(name) {
                    if let Some(pkg) = builtin.needs {
                        self.needs.insert(pkg.to_string());
                    }
                    return Ok(builtin.map.apply(&args));
                }
            }
        }

        let callee = self.operand(&node.callee)?;
        Ok(format!("{callee}({})", args.join(", ")))
    }

    fn visit_identifier(&mut self, node: &Identifier) -> Result<String> {
        if self.bound.contains(&node.name) {
            return Ok(node.name.clone());
        }
        Ok(self.items.get(&node.name).cloned().unwrap_or_else(|| node.name.clone()))
    }

    fn visit_literal(&mut self, node: &Literal) -> Result<String> {
        Ok(match node {
            Literal::Int(n)   => n.to_string(),
            // Debug keeps a decimal point on whole numbers
            Literal::Float(x) => format!("{x:?}"),
            Literal::Str(s)   => format!("\"{s}\""),
            Literal::Bool(b)  => b.to_string(),
            Literal::Nil      => "nil".into(),
        })
    }

    fn visit_array(&mut self, node: &ArrayLiteral) -> Result<String> {
        let elems: Vec<String> = node.elements.iter().map(|e| self.expr(e)).collect::<Result<_>>()?;
        Ok(format!("[]interface{{}}{{{}}}", elems.join(", ")))
    }

    fn visit_map(&mut self, node: &MapLiteral) -> Result<String> {
        let mut pairs = Vec::with_capacity(node.pairs.len());
        for (k, v) in &node.pairs {
            pairs.push(format!("{}: {}", self.expr(k)?, self.expr(v)?));
        }
        Ok(format!("map[interface{{}}]interface{{}}{{{}}}", pairs.join(", ")))
    }

    fn visit_index(&mut self, node: &IndexExpr) -> Result<String> {
        let object = self.operand(&node.object)?;
        let index = self.expr(&node.index)?;
        Ok(format!("{object}[{index}]"))
    }

    fn visit_selector(&mut self, node: &SelectorExpr) -> Result<String> {
        if let Some(base) = node.object.as_ident() {
            self.note_package(base);
        }
        let object = self.operand(&node.object)?;
        Ok(format!("{object}.{}", node.member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    /// Generate with four-space indentation so expectations stay readable.
    fn go(src: &str) -> String {
        let (prog, diags) = parse(src);
        assert!(diags.is_empty(), "parse errors: {:#?}", diags.messages());
        let cfg = TranspileConfig { indent: "    ".into(), ..TranspileConfig::default() };
        Transpiler::new(cfg).generate(&prog).unwrap()
    }

    fn go_err(src: &str) -> GosError {
        let (prog, diags) = parse(src);
        assert!(diags.is_empty(), "parse errors: {:#?}", diags.messages());
        Transpiler::new(TranspileConfig::default()).generate(&prog).unwrap_err()
    }

    #[test]
    fn add_function() {
        assert_eq!(go("func add(x int, y int) int:\n    return x + y"), indoc! {"
            package main

            func add(x int, y int) int {
                return x + y
            }
        "});
    }

    #[test]
    fn default_indent_is_a_tab() {
        let (prog, _) = parse("func f():\n    return 1\n");
        let out = Transpiler::new(TranspileConfig::default()).generate(&prog).unwrap();
        assert_eq!(out, "package main\n\nfunc f() {\n\treturn 1\n}\n");
    }

    #[test]
    fn print_pulls_in_fmt() {
        assert_eq!(
            go(indoc! {r#"
                import "os"

                func main():
                    print("hi", 1)
                    os.Exit(0)
            "#}),
            indoc! {r#"
                package main

                import (
                    "fmt"
                    "os"
                )

                func main() {
                    fmt.Println("hi", 1)
                    os.Exit(0)
                }
            "#},
        );
    }

    #[test]
    fn explicit_fmt_is_not_duplicated() {
        let out = go("import \"fmt\"\nprint(1)\n");
        assert_eq!(out.matches("\"fmt\"").count(), 1);
    }

    #[test]
    fn auto_imports_can_be_disabled() {
        let (prog, _) = parse("func main():\n    print(2 ** 3)\n");
        let cfg = TranspileConfig { auto_imports: false, ..TranspileConfig::default() };
        let out = Transpiler::new(cfg).generate(&prog).unwrap();
        assert!(!out.contains("import"));
        assert!(out.contains("fmt.Println(math.Pow(2, 3))"));
    }

    #[test]
    fn header_comment() {
        let (prog, _) = parse("x := 1\n");
        let cfg = TranspileConfig { emit_header: true, ..TranspileConfig::default() };
        let out = Transpiler::new(cfg).generate(&prog).unwrap();
        assert!(out.starts_with("// Code generated by gos. DO NOT EDIT.\n\npackage main\n"));
    }

    #[test]
    fn operators_and_parentheses() {
        let out = go(indoc! {"
            func f():
                a := x and y or not z
                b := (p + q) * r
                c := p + q * r
                d := 2 ** n * 3
                e := a - (b - c)
                g := a == (b < c)
                h := -(-x)
                i := -(a + b)
                j := (a + b).c
                k := a &^ b << 2
        "});
        let body: Vec<&str> = out.lines().skip(7).take(10).map(str::trim).collect();
        assert_eq!(body, vec![
            "a := x && y || !z",
            "b := (p + q) * r",
            "c := p + q * r",
            "d := math.Pow(2, n) * 3",
            "e := a - (b - c)",
            "g := a == (b < c)",
            "h := -(-x)",
            "i := -(a + b)",
            "j := (a + b).c",
            "k := a &^ b << 2",
        ]);
        assert!(out.contains("import (\n    \"math\"\n)"));
    }

    #[test]
    fn range_loops() {
        let out = go(indoc! {"
            func main():
                for i in range(10):
                    print(i)
                for i in range(2, n):
                    continue
                for i in range(0, 10, 2):
                    break
                for i in 5:
                    i++
                for name in names:
                    print(name)
        "});
        assert_eq!(out, indoc! {"
            package main

            import (
                \"fmt\"
            )

            func main() {
                for i := 0; i < 10; i++ {
                    fmt.Println(i)
                }
                for i := 2; i < n; i++ {
                    continue
                }
                for i := 0; i < 10; i += 2 {
                    break
                }
                for i := 0; i < 5; i++ {
                    i++
                }
                for name := range names {
                    fmt.Println(name)
                }
            }
        "});
    }

    #[test]
    fn three_clause_while_and_forever() {
        let out = go(indoc! {"
            func main():
                for i := 0; i < 3; i += 1:
                    total = total + i
                for x < 3:
                    x++
                while ok:
                    tick()
                for:
                    break
        "});
        assert_eq!(out, indoc! {"
            package main

            func main() {
                for i := 0; i < 3; i += 1 {
                    total = total + i
                }
                for x < 3 {
                    x++
                }
                for ok {
                    tick()
                }
                for {
                    break
                }
            }
        "});
    }

    #[test]
    fn if_elif_else_chain() {
        let out = go(indoc! {"
            func sign(x int) int:
                if x < 0:
                    return -1
                elif x == 0:
                    return 0
                else:
                    return 1
        "});
        assert_eq!(out, indoc! {"
            package main

            func sign(x int) int {
                if x < 0 {
                    return -1
                } else if x == 0 {
                    return 0
                } else {
                    return 1
                }
            }
        "});
    }

    #[test]
    fn struct_with_tags_and_methods() {
        let out = go(indoc! {r#"
            struct User:
                name string "json:\"name\""
                age  int    'json:"age"'
                func greet(self) string:
                    return "hi " + self.name
                func birthday(self *User):
                    self.age += 1
        "#});
        assert_eq!(out, indoc! {r#"
            package main

            type User struct {
                name string `json:"name"`
                age  int    `json:"age"`
            }

            func (self User) greet() string {
                return "hi " + self.name
            }

            func (self *User) birthday() {
                self.age += 1
            }
        "#});
    }

    #[test]
    fn struct_without_tags_and_empty_struct() {
        let out = go("struct P:\n    x int\n    label string\nstruct Empty:\n");
        assert_eq!(out, indoc! {"
            package main

            type P struct {
                x     int
                label string
            }

            type Empty struct {
            }
        "});
    }

    #[test]
    fn untyped_parameters() {
        let out = go("func pair(a, b int, c):\n    return\n");
        assert!(out.contains("func pair(a, b int, c interface{}) {"));
    }

    #[test]
    fn literals_and_collections() {
        let out = go(indoc! {r#"
            func main():
                a := [1, 2.0, "s", true, nil]
                m := {"b": 1, "a": 2}
                f := 1.5e10
                s := 'say "hi"'
                v := m["a"]
        "#});
        assert!(out.contains(r#"a := []interface{}{1, 2.0, "s", true, nil}"#));
        assert!(out.contains(r#"m := map[interface{}]interface{}{"b": 1, "a": 2}"#));
        assert!(out.contains("f := 15000000000.0"));
        assert!(out.contains(r#"s := "say \"hi\"""#));
        assert!(out.contains(r#"v := m["a"]"#));
    }

    #[test]
    fn imports_are_sorted_aliased_and_deduplicated() {
        let out = go(indoc! {r#"
            import "strings"
            import http as web
            import rand_math
            import "strings"
            from "filepath" import Join

            func main():
                p := Join("a", "b")
                web.Get(p)
                print(strings.ToUpper(p), rand_math.Intn(3))
        "#});
        assert_eq!(out, indoc! {r#"
            package main

            import (
                "fmt"
                rand_math "math/rand"
                web "net/http"
                "path/filepath"
                "strings"
            )

            func main() {
                p := filepath.Join("a", "b")
                web.Get(p)
                fmt.Println(strings.ToUpper(p), rand_math.Intn(3))
            }
        "#});
    }

    #[test]
    fn package_level_walrus_becomes_var() {
        let out = go("package util\nlimit := 5\nvar name string\n");
        assert_eq!(out, indoc! {"
            package util

            var limit = 5

            var name string
        "});
    }

    #[test]
    fn empty_program() {
        assert_eq!(go(""), "package main\n");
    }

    #[test]
    fn range_without_bound_fails_loudly() {
        let err = go_err("for i in range():\n    print(i)\n");
        assert!(matches!(err, GosError::Codegen(ref m) if m.contains("range()")));
    }

    #[test]
    fn package_level_assignment_fails_loudly() {
        let err = go_err("x = 5\n");
        assert!(matches!(err, GosError::Codegen(ref m) if m.contains("package level")));
    }

    #[test]
    fn packages_used_without_import_are_imported() {
        let out = go(indoc! {"
            func main():
                os.Exit(1)
                time.Sleep(1)
                b := json.Valid(data)
        "});
        assert_eq!(out, indoc! {r#"
            package main

            import (
                "encoding/json"
                "os"
                "time"
            )

            func main() {
                os.Exit(1)
                time.Sleep(1)
                b := json.Valid(data)
            }
        "#});
    }

    #[test]
    fn local_names_are_not_taken_for_packages() {
        let out = go(indoc! {"
            limit := 3
            func f(os string):
                print(os.Name)
                strings := load()
                strings.Reset()
                for time in ticks:
                    time.Stop()
        "});
        assert!(out.contains("import (\n    \"fmt\"\n)\n"), "{out}");
        assert!(!out.contains("\"os\""));
        assert!(!out.contains("\"strings\""));
        assert!(!out.contains("\"time\""));
    }

    #[test]
    fn rebinding_an_imported_item_shadows_it() {
        let out = go(indoc! {r#"
            from "filepath" import Join

            func main():
                print(Join("a", "b"))
                Join := 1
                print(Join)
        "#});
        assert!(out.contains("fmt.Println(filepath.Join(\"a\", \"b\"))"));
        assert!(out.contains("Join := 1\n    fmt.Println(Join)"));
    }

    #[test]
    fn compound_statement_in_for_clause_fails_loudly() {
        let bad = Program {
            package: "main".into(),
            imports: vec![],
            statements: vec![Stmt::For(ForStmt {
                clause: ForClause::ThreeClause {
                    init:   Some(Box::new(Stmt::Return(ReturnStmt { value: None }))),
                    cond:   None,
                    update: None,
                },
                body: BlockStmt::default(),
            })],
        };
        let err = Transpiler::new(TranspileConfig::default()).generate(&bad).unwrap_err();
        assert!(matches!(err, GosError::Codegen(_)));
    }
}
