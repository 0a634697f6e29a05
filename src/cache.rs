//! Per-user tally cache.
//!
//! Each completed user is written once under a key derived from their
//! display name. A key that already exists means the user is done, which
//! lets an interrupted workspace run pick up where it left off.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Member;
use crate::tally::ReactionTally;

/// What gets stored for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedTally {
    pub user_id: String,
    pub display_name: String,
    pub collected_at: DateTime<Utc>,
    pub tally: ReactionTally,
}

impl CachedTally {
    pub fn new(member: &Member, tally: ReactionTally) -> Self {
        Self {
            user_id: member.id.clone(),
            display_name: member.display_name.clone(),
            collected_at: Utc::now(),
            tally,
        }
    }
}

/// Storage for finished per-user tallies.
pub trait TallyStore {
    fn contains(&self, key: &str) -> Result<bool>;

    /// Store a new entry. Never overwrites: an existing key is
    /// [`Error::AlreadyCached`].
    fn store(&mut self, key: &str, entry: &CachedTally) -> Result<()>;

    fn load(&self, key: &str) -> Result<CachedTally>;

    /// All stored keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Longest key in bytes. Leaves room for the `.json.tmp` suffix inside the
/// usual 255-byte file name limit.
pub const MAX_KEY_BYTES: usize = 200;

/// Derive a filesystem-safe cache key from a member's display name.
///
/// Path separators, characters Windows rejects, and control characters
/// become `_`. Leading dots are stripped so a name can't produce a hidden
/// file or `..`. Long names are cut to [`MAX_KEY_BYTES`] on a character
/// boundary. A name with nothing left falls back to the member id.
pub fn cache_key(member: &Member) -> String {
    let sanitized: String = member
        .display_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = sanitized.trim().trim_start_matches('.').trim();
    let trimmed = truncate_at_char(trimmed, MAX_KEY_BYTES).trim_end();

    if trimmed.is_empty() {
        member.id.clone()
    } else {
        trimmed.to_string()
    }
}

fn truncate_at_char(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// Directory store
// ---------------------------------------------------------------------------

/// One JSON file per key in a directory.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open (creating if needed) a cache directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl TallyStore for DirStore {
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.path_for(key).is_file())
    }

    fn store(&mut self, key: &str, entry: &CachedTally) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            return Err(Error::AlreadyCached(key.to_string()));
        }

        // Write then rename, so a crash mid-write never leaves a partial
        // file that a later run would mistake for a finished user.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, serde_json::to_vec_pretty(entry)?)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(key, path = %path.display(), "cached tally");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<CachedTally> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotCached(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store backed by a map (for testing and dry runs).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, CachedTally>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TallyStore for MemoryStore {
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn store(&mut self, key: &str, entry: &CachedTally) -> Result<()> {
        if self.entries.contains_key(key) {
            return Err(Error::AlreadyCached(key.to_string()));
        }
        self.entries.insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<CachedTally> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotCached(key.to_string()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
