// ─────────────────────────────────────────────────────────────────────────────
//  gos :: runtime :: manifest
//
//  Project manifest `gos.toml`, looked up from the directory of the file
//  being compiled towards the filesystem root.
//
//      [package]
//      name    = "hello"
//      version = "0.1.0"
//
//      [build]
//      output_dir   = "generated"   # default: next to each source file
//      auto_imports = true
//
//      [aliases]
//      yaml = "gopkg.in/yaml.v3"
// ─────────────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GosError, Result};
use crate::runtime::AliasTable;

pub const MANIFEST_FILE: &str = "gos.toml";

// ── TOML schema ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    pub package: PackageInfo,
    #[serde(default)]
    pub build:   BuildSettings,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PackageInfo {
    pub name:        String,
    #[serde(default = "default_version")]
    pub version:     String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BuildSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir:   Option<PathBuf>,
    #[serde(default = "yes")]
    pub auto_imports: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self { output_dir: None, auto_imports: true }
    }
}

fn default_version() -> String { "0.1.0".into() }
fn yes() -> bool { true }

// ── Loading ───────────────────────────────────────────────────────────────────

impl Manifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            package: PackageInfo { name: name.into(), version: default_version(), description: None },
            build:   BuildSettings::default(),
            aliases: BTreeMap::new(),
        }
    }

    /// Parse a manifest from a TOML string (path is used only for errors).
    pub fn from_str(toml_str: &str, path: &Path) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| GosError::manifest(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_str(&raw, path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GosError::manifest(MANIFEST_FILE, e))
    }

    /// Built-in aliases overlaid with this manifest's `[aliases]`. Entries
    /// with an empty path are skipped.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::builtin().clone();
        let usable = self.aliases.iter().filter(|(short, path)| {
            if path.trim().is_empty() {
                warn!(alias = %short, "skipping manifest alias with empty path");
                return false;
            }
            true
        });
        table.extend(usable.map(|(k, v)| (k.clone(), v.clone())));
        table
    }
}

/// Walk up from `start` looking for `gos.toml`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() { start.parent()? } else { start };
    loop {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found manifest");
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Locate and load the manifest governing `source`, if any.
pub fn discover(source: &Path) -> Result<Option<(PathBuf, Manifest)>> {
    let start = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    match find_manifest(&start) {
        Some(path) => {
            let m = Manifest::load(&path)?;
            Ok(Some((path, m)))
        }
        None => Ok(None),
    }
}

// ── Scaffolding ───────────────────────────────────────────────────────────────

pub const STARTER_SOURCE: &str = "\
package main

func main():
    print(\"Hello from Go-Script!\")
";

/// Write `gos.toml` and `main.gos` into `dir`. An existing manifest is never
/// overwritten; an existing `main.gos` is left alone.
pub fn init_project(dir: &Path, name: &str) -> Result<Vec<PathBuf>> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        return Err(GosError::Other(format!("{} already exists", manifest_path.display())));
    }
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    fs::write(&manifest_path, Manifest::new(name).to_toml()?)?;
    written.push(manifest_path);

    let main = dir.join("main.gos");
    if !main.exists() {
        fs::write(&main, STARTER_SOURCE)?;
        written.push(main);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_manifest() {
        let src = indoc! {r#"
            [package]
            name = "hello"
            version = "1.2.0"

            [build]
            output_dir = "generated"
            auto_imports = false

            [aliases]
            yaml = "gopkg.in/yaml.v3"
        "#};
        let m = Manifest::from_str(src, Path::new("gos.toml")).unwrap();
        assert_eq!(m.package.name, "hello");
        assert_eq!(m.package.version, "1.2.0");
        assert_eq!(m.build.output_dir, Some(PathBuf::from("generated")));
        assert!(!m.build.auto_imports);
        assert_eq!(m.alias_table().resolve("yaml"), "gopkg.in/yaml.v3");
        assert_eq!(m.alias_table().resolve("json"), "encoding/json");
    }

    #[test]
    fn defaults_apply() {
        let m = Manifest::from_str("[package]\nname = \"x\"\n", Path::new("gos.toml")).unwrap();
        assert_eq!(m, Manifest::new("x"));
        assert!(m.build.auto_imports);
    }

    #[test]
    fn malformed_reports_path() {
        let err = Manifest::from_str("[package\n", Path::new("proj/gos.toml")).unwrap_err();
        assert!(matches!(err, GosError::Manifest { ref path, .. } if path == Path::new("proj/gos.toml")));
    }

    #[test]
    fn init_writes_once_and_discovery_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        let written = init_project(tmp.path(), "demo").unwrap();
        assert_eq!(written.len(), 2);
        assert!(init_project(tmp.path(), "demo").is_err());

        let nested = tmp.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        let found = find_manifest(&nested).unwrap();
        assert_eq!(found, tmp.path().join(MANIFEST_FILE));

        let (_, m) = discover(&nested.join("x.gos")).unwrap().unwrap();
        assert_eq!(m.package.name, "demo");
    }
}
