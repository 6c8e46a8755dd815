// ─────────────────────────────────────────────────────────────────────────────
//  gos :: runtime :: cache
//
//  Per-source SHA-256 fingerprints so `gos build` skips files whose source
//  and settings have not changed since the last successful build.
//
//  The cache lives at <dir>/.gos-cache.json, one per output directory.
// ─────────────────────────────────────────────────────────────────────────────

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;

pub const CACHE_FILE: &str = ".gos-cache.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BuildCache {
    /// Source path → hex SHA-256 of its content.
    pub entries:       HashMap<String, String>,
    /// Fingerprint of everything besides the source that shapes the output.
    pub settings_hash: String,
}

impl BuildCache {
    /// Load from disk. A missing or unreadable cache is an empty one.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CACHE_FILE);
        let Ok(data) = std::fs::read_to_string(&path) else { return Self::default() };
        serde_json::from_str(&data).unwrap_or_else(|e| {
            debug!(path = %path.display(), error = %e, "discarding unreadable cache");
            Self::default()
        })
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(dir.join(CACHE_FILE), json)?;
        Ok(())
    }

    /// True when `src` hashes to the recorded value, settings are unchanged,
    /// and the generated file is still on disk.
    pub fn is_fresh(&self, src: &Path, out: &Path, settings_hash: &str) -> bool {
        if self.settings_hash != settings_hash || !out.exists() {
            return false;
        }
        match self.entries.get(&key(src)) {
            Some(cached) => hash_file(src).as_deref() == Some(cached.as_str()),
            None => false,
        }
    }

    /// Record a successful build. A settings change drops older entries.
    pub fn record(&mut self, src: &Path, settings_hash: &str) {
        if self.settings_hash != settings_hash {
            self.entries.clear();
            self.settings_hash = settings_hash.to_owned();
        }
        if let Some(hash) = hash_file(src) {
            self.entries.insert(key(src), hash);
        }
    }
}

fn key(src: &Path) -> String {
    std::fs::canonicalize(src)
        .unwrap_or_else(|_| src.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// SHA-256 of the file content, hex-encoded.
pub fn hash_file(path: &Path) -> Option<String> {
    let data = std::fs::read(path).ok()?;
    Some(hex::encode(Sha256::digest(&data)))
}

/// SHA-256 of a string, hex-encoded.
pub fn hash_str(s: &str) -> String {
    hex::encode(Sha256::digest(s.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn hash_str_is_sha256() {
        assert_eq!(
            hash_str("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        );
    }

    #[test]
    fn freshness_tracks_source_settings_and_output() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("main.gos");
        let out = tmp.path().join("main.go");
        fs::write(&src, "x := 1\n").unwrap();

        let mut cache = BuildCache::default();
        assert!(!cache.is_fresh(&src, &out, "s1"));

        fs::write(&out, "package main\n").unwrap();
        cache.record(&src, "s1");
        assert!(cache.is_fresh(&src, &out, "s1"));
        assert!(!cache.is_fresh(&src, &out, "s2"));

        cache.save(tmp.path()).unwrap();
        let reloaded = BuildCache::load(tmp.path());
        assert!(reloaded.is_fresh(&src, &out, "s1"));

        fs::write(&src, "x := 2\n").unwrap();
        assert!(!reloaded.is_fresh(&src, &out, "s1"));

        fs::remove_file(&out).unwrap();
        cache.record(&src, "s1");
        assert!(!cache.is_fresh(&src, &out, "s1"));
    }

    #[test]
    fn corrupt_cache_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CACHE_FILE), "{not json").unwrap();
        assert!(BuildCache::load(tmp.path()).entries.is_empty());
    }
}
