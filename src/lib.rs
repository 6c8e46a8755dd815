// ─────────────────────────────────────────────────────────────────────────────
//  gos_core  —  public library API
// ─────────────────────────────────────────────────────────────────────────────

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod transpiler;

pub use error::{Diagnostic, DiagnosticKind, Diagnostics, GosError, Result, Span};
pub use lexer::token::{Token, TokenKind};
pub use lexer::Lexer;
pub use parser::{ast, Parser};
pub use runtime::manifest::Manifest;
pub use runtime::{AliasTable, Runtime};
pub use transpiler::{TranspileConfig, Transpiler};

use tracing::debug;

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// One-shot: Go-Script source text → Go source text.
///
/// # Minimal usage
/// ```no_run
/// use gos_core::{Pipeline, TranspileConfig};
///
/// let source = "func main():\n    print(\"hi\")\n";
///
/// let go = Pipeline::new(TranspileConfig::default())
///     .run(source, "main.gos")
///     .unwrap();
/// ```
///
/// # With project aliases
/// ```no_run
/// use gos_core::{AliasTable, Pipeline, TranspileConfig};
///
/// let mut aliases = AliasTable::new();
/// aliases.extend([("yaml", "gopkg.in/yaml.v3")]);
///
/// let go = Pipeline::new(TranspileConfig::default())
///     .with_aliases(aliases)
///     .run("import yaml\n", "main.gos")
///     .unwrap();
/// ```
pub struct Pipeline {
    cfg:     TranspileConfig,
    runtime: Runtime,
}

impl Pipeline {
    pub fn new(cfg: TranspileConfig) -> Self {
        Self { cfg, runtime: Runtime::new() }
    }

    /// Resolve imports against `aliases` instead of the built-in table.
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.runtime = self.runtime.with_aliases(aliases);
        self
    }

    /// Parse only. Diagnostics become `GosError::Compile`.
    pub fn parse(&self, source: &str, filename: &str) -> Result<ast::Program> {
        let mut parser = Parser::with_aliases(source, &self.runtime.aliases);
        let prog = parser.parse_program();
        let diags = parser.into_diagnostics();
        debug!(file = filename, statements = prog.statements.len(), errors = diags.len(), "parse finished");

        if !diags.is_empty() {
            return Err(GosError::Compile { file: filename.to_string(), diagnostics: diags.into_vec() });
        }
        Ok(prog)
    }

    pub fn generate(&self, prog: &ast::Program) -> Result<String> {
        let mut gen = Transpiler::with_runtime(self.cfg.clone(), self.runtime.clone());
        gen.generate(prog)
    }

    pub fn run(&self, source: &str, filename: &str) -> Result<String> {
        // 1. Lex + 2. Parse (the parser pulls tokens on demand)
        let prog = self.parse(source, filename)?;

        // 3. Generate
        self.generate(&prog)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.runtime.aliases
    }
}

/// Compile with default settings and the built-in alias table.
pub fn compile_str(source: &str) -> Result<String> {
    Pipeline::new(TranspileConfig::default()).run(source, "<input>")
}

// ── Diagnostics helper ────────────────────────────────────────────────────────

pub fn pretty_error(err: &GosError, source: &str) -> String {
    err.pretty(source)
}
