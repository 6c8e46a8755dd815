// ─────────────────────────────────────────────────────────────────────────────
//  gos  —  Go-Script → Go command line
//
//  USAGE
//  ─────
//    gos run    main.gos [-- args…]     compile to a temp dir and `go run` it
//    gos build  src/ other.gos [-o bin] write <stem>.go next to each source
//    gos check  main.gos                parse only, report diagnostics
//    gos debug  main.gos                tokens, AST and generated Go
//    gos init   [name]                  scaffold gos.toml + main.gos
//    gos stdlib                         list import aliases by category
//    gos version
// ─────────────────────────────────────────────────────────────────────────────

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, ExitStatus, Stdio};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use gos_core::runtime::cache::{hash_str, BuildCache};
use gos_core::runtime::manifest::{self, Manifest};
use gos_core::{AliasTable, GosError, Lexer, Pipeline, TokenKind, TranspileConfig};

const SOURCE_EXT: &str = "gos";
const HINT: &str = "Check your syntax, especially indentation and colons after function definitions.";

// ─────────────────────────────────────────────────────────────────────────────
//  CLI definition (clap derive)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "gos",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Go-Script → Go transpiler",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Log pipeline stages (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile a script and run it with the Go toolchain
    Run(RunArgs),
    /// Write generated Go next to each source (or into the manifest's output_dir)
    Build(BuildArgs),
    /// Parse only and report every diagnostic
    Check {
        /// Source files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Dump tokens, the AST and the generated Go for one file
    Debug {
        file: PathBuf,
    },
    /// Create gos.toml and a starter main.gos
    Init {
        /// Project name (default: directory name)
        name: Option<String>,

        /// Directory to initialise
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// List the built-in import aliases by category
    Stdlib,
    /// Print the version
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// Script to run
    file: PathBuf,

    /// Arguments passed through to the program
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Args)]
struct BuildArgs {
    /// Source files or directories (searched recursively for .gos files)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Also build a binary from the generated sources with `go build`
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Rebuild even when the cache says a file is up to date
    #[arg(long)]
    force: bool,

    /// Start each generated file with a "do not edit" comment
    #[arg(long)]
    header: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
//  Entry point
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    let result = match cli.command {
        Cmd::Run(args)           => cmd_run(args),
        Cmd::Build(args)         => cmd_build(args),
        Cmd::Check { paths }     => cmd_check(&paths),
        Cmd::Debug { file }      => cmd_debug(&file),
        Cmd::Init { name, dir }  => cmd_init(name, &dir),
        Cmd::Stdlib              => cmd_stdlib(),
        Cmd::Version             => { println!("gos {}", env!("CARGO_PKG_VERSION")); Ok(ExitCode::SUCCESS) }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ─────────────────────────────────────────────────────────────────────────────
//  Project settings
// ─────────────────────────────────────────────────────────────────────────────

/// Everything besides the source text that shapes one file's output.
struct Settings {
    cfg:         TranspileConfig,
    aliases:     AliasTable,
    out_dir:     Option<PathBuf>,
    fingerprint: String,
}

impl Settings {
    fn for_source(src: &Path, header: bool) -> anyhow::Result<Self> {
        let mut cfg = TranspileConfig { emit_header: header, ..TranspileConfig::default() };
        let found = manifest::discover(src)?;

        let (aliases, out_dir, extra) = match &found {
            Some((path, m)) => {
                debug!(manifest = %path.display(), package = %m.package.name, "using project manifest");
                cfg.auto_imports = m.build.auto_imports;
                let root = path.parent().unwrap_or(Path::new("."));
                let out_dir = m.build.output_dir.as_ref().map(|d| root.join(d));
                (m.alias_table(), out_dir, format!("{:?}", m.aliases))
            }
            None => (AliasTable::builtin().clone(), None, String::new()),
        };

        let fingerprint = hash_str(&format!("{}|{:?}|{}", env!("CARGO_PKG_VERSION"), cfg, extra));
        Ok(Self { cfg, aliases, out_dir, fingerprint })
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.cfg.clone()).with_aliases(self.aliases.clone())
    }

    fn output_for(&self, src: &Path) -> PathBuf {
        match &self.out_dir {
            Some(dir) => {
                let stem = src.file_stem().unwrap_or_default();
                dir.join(stem).with_extension("go")
            }
            None => src.with_extension("go"),
        }
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == SOURCE_EXT)
}

/// Expand directories into the `.gos` files below them, in a stable order.
fn collect_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for p in paths {
        if p.is_dir() {
            for entry in WalkDir::new(p).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walking {}", p.display()))?;
                if entry.file_type().is_file() && is_source(entry.path()) {
                    out.push(entry.into_path());
                }
            }
        } else if p.is_file() {
            if !is_source(p) {
                bail!("{} is not a .{SOURCE_EXT} file", p.display());
            }
            out.push(p.clone());
        } else {
            bail!("{} does not exist", p.display());
        }
    }
    Ok(out)
}

fn report_compile(err: &GosError, source: &str) {
    eprintln!("{} {}", "✗".red().bold(), err.pretty(source).trim_end());
    if matches!(err, GosError::Compile { .. }) {
        eprintln!("\n{} {}", "hint:".yellow().bold(), HINT);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
//  Command handlers
// ─────────────────────────────────────────────────────────────────────────────

// ── build ─────────────────────────────────────────────────────────────────────

struct Job {
    src:      PathBuf,
    out:      PathBuf,
    settings: Settings,
}

enum Failure {
    Compile(GosError, String),
    Other(anyhow::Error),
}

fn cache_dir(out: &Path) -> PathBuf {
    match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Compile one file. Output is written only when generation succeeds.
fn compile_job(job: &Job) -> Result<(), Failure> {
    let source = read_source(&job.src).map_err(Failure::Other)?;
    let name = job.src.display().to_string();
    let go = job.settings.pipeline()
        .run(&source, &name)
        .map_err(|e| Failure::Compile(e, source.clone()))?;

    let write = || -> io::Result<()> {
        fs::create_dir_all(cache_dir(&job.out))?;
        fs::write(&job.out, go)
    };
    write()
        .with_context(|| format!("cannot write {}", job.out.display()))
        .map_err(Failure::Other)
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<ExitCode> {
    let sources = collect_sources(&args.paths)?;
    if sources.is_empty() {
        bail!("no .{SOURCE_EXT} files found");
    }

    let mut caches: HashMap<PathBuf, BuildCache> = HashMap::new();
    let mut outputs = Vec::new();
    let mut jobs = Vec::new();
    let mut fresh = 0usize;

    for src in sources {
        let settings = Settings::for_source(&src, args.header)?;
        let out = settings.output_for(&src);
        let dir = cache_dir(&out);
        let cache = caches.entry(dir.clone()).or_insert_with(|| BuildCache::load(&dir));

        outputs.push(out.clone());
        if !args.force && cache.is_fresh(&src, &out, &settings.fingerprint) {
            debug!(src = %src.display(), "up to date");
            fresh += 1;
            continue;
        }
        jobs.push(Job { src, out, settings });
    }

    println!(
        "{} {} {}",
        "Building".cyan().bold(),
        format!("[{} file(s)]", outputs.len()).dimmed(),
        format!("[{fresh} cached]").dimmed(),
    );
    println!("{}", "─".repeat(60).dimmed());

    let t0 = Instant::now();
    let results: Vec<(&Job, Result<(), Failure>)> = jobs.par_iter().map(|j| (j, compile_job(j))).collect();

    let mut failed = 0usize;
    for (job, res) in results {
        match res {
            Ok(()) => {
                println!("  {} {} → {}", "✓".green().bold(), job.src.display(), job.out.display());
                if let Some(cache) = caches.get_mut(&cache_dir(&job.out)) {
                    cache.record(&job.src, &job.settings.fingerprint);
                }
            }
            Err(Failure::Compile(err, source)) => {
                failed += 1;
                report_compile(&err, &source);
            }
            Err(Failure::Other(e)) => {
                failed += 1;
                eprintln!("  {} {}: {:#}", "✗".red().bold(), job.src.display(), e);
            }
        }
    }

    for (dir, cache) in &caches {
        if dir.is_dir() {
            if let Err(e) = cache.save(dir) {
                warn!(dir = %dir.display(), error = %e, "could not save build cache");
            }
        }
    }

    if failed > 0 {
        eprintln!("\n{} {failed} file(s) failed to compile", "✗".red().bold());
        return Ok(ExitCode::FAILURE);
    }
    println!("{} built in {:.2}s", "✓".green().bold(), t0.elapsed().as_secs_f64());

    if let Some(bin) = args.output {
        let status = run_go(Command::new("go").arg("build").arg("-o").arg(&bin).args(&outputs))?;
        if !status.success() {
            bail!("go build exited with {status}");
        }
        println!("  {} {}", "bin:".dimmed(), bin.display());
    }
    Ok(ExitCode::SUCCESS)
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Run a `go` subcommand, turning a missing binary into a toolchain error.
fn run_go(cmd: &mut Command) -> anyhow::Result<ExitStatus> {
    debug!(command = ?cmd, "spawning go toolchain");
    cmd.status().map_err(|e| {
        let err = match e.kind() {
            io::ErrorKind::NotFound => GosError::Toolchain("`go` was not found on PATH".into()),
            _ => GosError::Toolchain(e.to_string()),
        };
        anyhow::Error::new(err)
    })
}

fn cmd_run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let source = read_source(&args.file)?;
    let settings = Settings::for_source(&args.file, false)?;

    let t0 = Instant::now();
    let go = match settings.pipeline().run(&source, &args.file.display().to_string()) {
        Ok(go) => go,
        Err(e) => {
            report_compile(&e, &source);
            return Ok(ExitCode::FAILURE);
        }
    };
    let compiled_in = t0.elapsed();

    let dir = tempfile::Builder::new().prefix("gos-run-").tempdir().context("cannot create temp dir")?;
    fs::write(dir.path().join("main.go"), &go)?;

    let module = args.file.file_stem().and_then(|s| s.to_str()).unwrap_or("main");
    let init = run_go(
        Command::new("go")
            .args(["mod", "init", module])
            .current_dir(dir.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null()),
    )?;
    if !init.success() {
        bail!("go mod init exited with {init}");
    }

    eprintln!("{} compiled in {:.2}ms", "✓".green().bold(), compiled_in.as_secs_f64() * 1000.0);
    eprintln!("{}", "─".repeat(60).dimmed());

    let t1 = Instant::now();
    let status = run_go(Command::new("go").arg("run").arg(".").args(&args.args).current_dir(dir.path()))?;

    eprintln!("{}", "─".repeat(60).dimmed());
    eprintln!("{} finished in {:.2}s ({status})", "•".cyan(), t1.elapsed().as_secs_f64());

    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(c) => ExitCode::from((c & 0xff) as u8),
        None    => ExitCode::FAILURE,
    })
}

// ── check / debug ─────────────────────────────────────────────────────────────

fn cmd_check(paths: &[PathBuf]) -> anyhow::Result<ExitCode> {
    let mut failed = 0usize;
    let mut errors = 0usize;
    for src in collect_sources(paths)? {
        let source = read_source(&src)?;
        let settings = Settings::for_source(&src, false)?;
        match settings.pipeline().parse(&source, &src.display().to_string()) {
            Ok(_) => println!("{} {}", "✓".green().bold(), src.display()),
            Err(e) => {
                failed += 1;
                errors += e.diagnostics().len();
                report_compile(&e, &source);
            }
        }
    }

    if failed > 0 {
        eprintln!("\n{} {errors} error(s) in {failed} file(s)", "✗".red().bold());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_debug(file: &Path) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let settings = Settings::for_source(file, false)?;

    println!("{}", "── Tokens ──".cyan().bold());
    let tokens = Lexer::new(&source).tokenize();
    let shown = tokens.iter().filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Newline));
    for (i, tok) in shown.enumerate() {
        println!("{:>4}  {:<10} {:<20} {}", i + 1, tok.kind.name(), format!("{:?}", tok.text), tok.span);
    }

    let pipeline = settings.pipeline();
    let prog = match pipeline.parse(&source, &file.display().to_string()) {
        Ok(prog) => prog,
        Err(e) => {
            report_compile(&e, &source);
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("\n{}", "── AST ──".cyan().bold());
    print!("{prog}");

    println!("\n{}", "── Go ──".cyan().bold());
    print!("{}", pipeline.generate(&prog)?);
    Ok(ExitCode::SUCCESS)
}

// ── init / stdlib ─────────────────────────────────────────────────────────────

fn cmd_init(name: Option<String>, dir: &Path) -> anyhow::Result<ExitCode> {
    let name = name
        .or_else(|| dir.canonicalize().ok()?.file_name()?.to_str().map(String::from))
        .unwrap_or_else(|| "app".into());

    let written = manifest::init_project(dir, &name)?;
    println!("{} created project {}", "✓".green().bold(), name.bold());
    for path in written {
        println!("  {} {}", "+".green(), path.display());
    }
    println!("\n  next: {}", "gos run main.gos".bold());
    Ok(ExitCode::SUCCESS)
}

fn cmd_stdlib() -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let table = match manifest::find_manifest(&cwd) {
        Some(path) => Manifest::load(&path)?.alias_table(),
        None       => AliasTable::builtin().clone(),
    };

    for (category, entries) in table.by_category() {
        println!("\n{}", category.cyan().bold());
        for (short, entry) in entries {
            println!("  {:<14} {:<24} {}", short, entry.path, entry.summary.dimmed());
        }
    }
    println!("\n{} {} aliases", "•".cyan(), table.len());
    Ok(ExitCode::SUCCESS)
}
