// ─────────────────────────────────────────────────────────────────────────────
//  gos :: runtime
//  Maps short import names → Go package paths, and Go-Script builtins → Go
//  calls. Both tables are read-only after construction.
// ─────────────────────────────────────────────────────────────────────────────

pub mod cache;
pub mod manifest;

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

// ── Builtin call mapping ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum FnMap {
    /// `{0}`, `{1}` … are replaced by the rendered arguments.
    Template(String),
    /// All args joined by ", " replace the `{args}` placeholder.
    Variadic(String),
}

impl FnMap {
    pub fn apply(&self, args: &[String]) -> String {
        match self {
            Self::Template(t) => {
                let mut out = t.clone();
                for (i, a) in args.iter().enumerate() {
                    out = out.replace(&format!("{{{i}}}"), a);
                }
                out
            }
            Self::Variadic(t) => t.replace("{args}", &args.join(", ")),
        }
    }
}

/// A Go-Script builtin plus the Go package its expansion needs imported.
#[derive(Debug, Clone)]
pub struct Builtin {
    pub map:   FnMap,
    pub needs: Option<&'static str>,
}

// ── Alias table ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AliasEntry {
    pub path:     String,
    pub category: &'static str,
    pub summary:  &'static str,
}

/// Short import name → fully qualified Go path (`json` → `encoding/json`).
/// Unknown names resolve to themselves.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        let mut t = Self::default();
        t.init_data();
        t.init_files();
        t.init_network();
        t.init_crypto();
        t.init_text();
        t.init_math();
        t.init_time();
        t.init_compression();
        t.init_logging();
        t.init_concurrency();
        t.init_system();
        t.init_containers();
        t.init_misc();
        t
    }

    /// Shared table with only the built-in entries.
    pub fn builtin() -> &'static AliasTable {
        static TABLE: OnceLock<AliasTable> = OnceLock::new();
        TABLE.get_or_init(AliasTable::new)
    }

    fn reg(&mut self, category: &'static str, short: &str, path: &str, summary: &'static str) {
        self.entries.insert(short.to_owned(), AliasEntry { path: path.to_owned(), category, summary });
    }

    /// Add or override entries, e.g. from a manifest's `[aliases]` table.
    pub fn extend<I, K, V>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (short, path) in extra {
            self.entries.insert(short.into(), AliasEntry {
                path:     path.into(),
                category: "Project",
                summary:  "",
            });
        }
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(|e| e.path.as_str()).unwrap_or(name)
    }

    pub fn get(&self, name: &str) -> Option<&AliasEntry> { self.entries.get(name) }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entries grouped by category, both levels sorted, for `gos stdlib`.
    pub fn by_category(&self) -> BTreeMap<&'static str, Vec<(&str, &AliasEntry)>> {
        let mut out: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for (short, entry) in &self.entries {
            out.entry(entry.category).or_default().push((short.as_str(), entry));
        }
        for list in out.values_mut() {
            list.sort_by_key(|(short, _)| *short);
        }
        out
    }

    // ── Built-in entries ──────────────────────────────────────────────────────

    fn init_data(&mut self) {
        const C: &str = "Data Processing";
        self.reg(C, "json",   "encoding/json",   "JSON encoding and decoding");
        self.reg(C, "xml",    "encoding/xml",    "XML encoding and decoding");
        self.reg(C, "csv",    "encoding/csv",    "CSV file processing");
        self.reg(C, "base64", "encoding/base64", "Base64 encoding");
        self.reg(C, "hex",    "encoding/hex",    "Hexadecimal encoding");
    }

    fn init_files(&mut self) {
        const C: &str = "File System";
        self.reg(C, "fs",       "io/fs",         "File system interface");
        self.reg(C, "io",       "io",            "Basic I/O primitives");
        self.reg(C, "ioutil",   "io/ioutil",     "I/O utilities (deprecated)");
        self.reg(C, "path",     "path",          "Slash-separated path utilities");
        self.reg(C, "filepath", "path/filepath", "File path manipulation");
        self.reg(C, "os",       "os",            "Operating system interface");
        self.reg(C, "bufio",    "bufio",         "Buffered I/O");
        self.reg(C, "bytes",    "bytes",         "Byte slice utilities");
    }

    fn init_network(&mut self) {
        const C: &str = "Network & HTTP";
        self.reg(C, "http", "net/http", "HTTP client and server");
        self.reg(C, "url",  "net/url",  "URL parsing");
        self.reg(C, "net",  "net",      "Network I/O");
        self.reg(C, "mail", "net/mail", "Mail parsing");
    }

    fn init_crypto(&mut self) {
        const C: &str = "Crypto & Security";
        self.reg(C, "crypto", "crypto",        "Cryptographic constants");
        self.reg(C, "md5",    "crypto/md5",    "MD5 hash algorithm");
        self.reg(C, "sha1",   "crypto/sha1",   "SHA1 hash algorithm");
        self.reg(C, "sha256", "crypto/sha256", "SHA256 hash algorithm");
        self.reg(C, "rand",   "crypto/rand",   "Cryptographically secure random numbers");
        self.reg(C, "tls",    "crypto/tls",    "TLS support");
    }

    fn init_text(&mut self) {
        const C: &str = "String & Text";
        self.reg(C, "strings",       "strings",        "String manipulation");
        self.reg(C, "strconv",       "strconv",        "String conversions");
        self.reg(C, "regexp",        "regexp",         "Regular expressions");
        self.reg(C, "unicode",       "unicode",        "Unicode character classes");
        self.reg(C, "utf8",          "unicode/utf8",   "UTF-8 encoding");
        self.reg(C, "utf16",         "unicode/utf16",  "UTF-16 encoding");
        self.reg(C, "template",      "text/template",  "Text templates");
        self.reg(C, "html_template", "html/template",  "HTML templates");
        self.reg(C, "html",          "html",           "HTML escaping");
        self.reg(C, "scanner",       "text/scanner",   "Text scanner");
        self.reg(C, "tabwriter",     "text/tabwriter", "Aligned text columns");
    }

    fn init_math(&mut self) {
        const C: &str = "Math & Numbers";
        self.reg(C, "math",      "math",      "Mathematical functions");
        self.reg(C, "big",       "math/big",  "Arbitrary precision arithmetic");
        self.reg(C, "rand_math", "math/rand", "Pseudo-random numbers");
    }

    fn init_time(&mut self) {
        self.reg("Time & Date", "time", "time", "Time and date functions");
    }

    fn init_compression(&mut self) {
        const C: &str = "Compression";
        self.reg(C, "gzip", "compress/gzip", "Gzip compression");
        self.reg(C, "zip",  "archive/zip",   "ZIP archive format");
        self.reg(C, "tar",  "archive/tar",   "TAR archive format");
    }

    fn init_logging(&mut self) {
        const C: &str = "Logging & Debug";
        self.reg(C, "log",     "log",     "Logging utilities");
        self.reg(C, "fmt",     "fmt",     "Formatted I/O");
        self.reg(C, "errors",  "errors",  "Error values");
        self.reg(C, "reflect", "reflect", "Runtime reflection");
        self.reg(C, "runtime", "runtime", "Go runtime interaction");
        self.reg(C, "testing", "testing", "Test support");
    }

    fn init_concurrency(&mut self) {
        const C: &str = "Concurrency";
        self.reg(C, "sync",    "sync",    "Synchronization primitives");
        self.reg(C, "context", "context", "Request contexts");
    }

    fn init_system(&mut self) {
        const C: &str = "System";
        self.reg(C, "exec",   "os/exec",   "External command execution");
        self.reg(C, "signal", "os/signal", "Signal handling");
        self.reg(C, "user",   "os/user",   "User account information");
    }

    fn init_containers(&mut self) {
        const C: &str = "Containers";
        self.reg(C, "sort", "sort",           "Sorting");
        self.reg(C, "heap", "container/heap", "Heap operations");
        self.reg(C, "list", "container/list", "Doubly linked list");
        self.reg(C, "ring", "container/ring", "Circular list");
    }

    fn init_misc(&mut self) {
        const C: &str = "Images & Data";
        self.reg(C, "image", "image",       "2-D images");
        self.reg(C, "color", "image/color", "Colour models");
        self.reg(C, "png",   "image/png",   "PNG codec");
        self.reg(C, "jpeg",  "image/jpeg",  "JPEG codec");
        self.reg(C, "gif",   "image/gif",   "GIF codec");
        self.reg(C, "sql",   "database/sql", "SQL database interface");
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Everything the generator looks up by name: builtin calls, operators Go
/// lacks, and the alias table used when the parser resolves imports.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub aliases:   AliasTable,
    pub builtins:  HashMap<String, Builtin>,
    /// Script operators with no Go spelling, keyed by symbol.
    pub operators: HashMap<String, Builtin>,
}

impl Default for Runtime { fn default() -> Self { Self::new() } }

impl Runtime {
    pub fn new() -> Self {
        let mut r = Runtime {
            aliases:   AliasTable::builtin().clone(),
            builtins:  HashMap::new(),
            operators: HashMap::new(),
        };
        r.init_builtins();
        r.init_operators();
        r
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    fn init_builtins(&mut self) {
        let fmt = Some("fmt");
        self.fun("print",   FnMap::Variadic("fmt.Println({args})".into()), fmt);
        self.fun("println", FnMap::Variadic("fmt.Println({args})".into()), fmt);
        self.fun("printf",  FnMap::Variadic("fmt.Printf({args})".into()),  fmt);
        self.fun("str",     FnMap::Variadic("fmt.Sprint({args})".into()),  fmt);
        self.fun("len",     FnMap::Variadic("len({args})".into()),         None);
    }

    fn init_operators(&mut self) {
        self.op("**", FnMap::Template("math.Pow({0}, {1})".into()), Some("math"));
    }

    fn fun(&mut self, name: &str, map: FnMap, needs: Option<&'static str>) {
        self.builtins.insert(name.to_owned(), Builtin { map, needs });
    }

    fn op(&mut self, symbol: &str, map: FnMap, needs: Option<&'static str>) {
        self.operators.insert(symbol.to_owned(), Builtin { map, needs });
    }

    pub fn builtin(&self, name: &str) -> Option<&Builtin> {
        self.builtins.get(name)
    }

    /// Rewrite for a binary operator, called with `[left, right]`.
    pub fn operator(&self, symbol: &str) -> Option<&Builtin> {
        self.operators.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_known_and_passes_through_unknown() {
        let t = AliasTable::builtin();
        assert_eq!(t.resolve("json"), "encoding/json");
        assert_eq!(t.resolve("http"), "net/http");
        assert_eq!(t.resolve("rand_math"), "math/rand");
        assert_eq!(t.resolve("fmt"), "fmt");
        assert_eq!(t.resolve("github.com/x/y"), "github.com/x/y");
    }

    #[test]
    fn extend_overrides() {
        let mut t = AliasTable::new();
        t.extend([("yaml", "gopkg.in/yaml.v3"), ("json", "github.com/goccy/go-json")]);
        assert_eq!(t.resolve("yaml"), "gopkg.in/yaml.v3");
        assert_eq!(t.resolve("json"), "github.com/goccy/go-json");
        assert_eq!(t.get("yaml").map(|e| e.category), Some("Project"));
    }

    #[test]
    fn categories_are_sorted() {
        let t = AliasTable::new();
        let cats = t.by_category();
        let comp: Vec<&str> = cats["Compression"].iter().map(|(s, _)| *s).collect();
        assert_eq!(comp, vec!["gzip", "tar", "zip"]);
        let total: usize = cats.values().map(Vec::len).sum();
        assert_eq!(total, t.len());
    }

    #[test]
    fn builtin_templates() {
        let rt = Runtime::new();
        let print = rt.builtin("print").unwrap();
        assert_eq!(print.map.apply(&["x".into(), "1".into()]), "fmt.Println(x, 1)");
        assert_eq!(print.needs, Some("fmt"));
        assert!(rt.builtin("range").is_none());
    }

    #[test]
    fn power_operator_template() {
        let rt = Runtime::new();
        let pow = rt.operator("**").unwrap();
        assert_eq!(pow.map.apply(&["a".into(), "b + 1".into()]), "math.Pow(a, b + 1)");
        assert_eq!(pow.needs, Some("math"));
        assert!(rt.operator("+").is_none());
    }
}
