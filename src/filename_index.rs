// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Filename index for relocated-file repair (C3).
//!
//! Maps a normalised lowercase basename to an absolute path, built by walking
//! a music-root directory. Bounded in size; when full, the least-accessed
//! entry is evicted (ties broken by insertion order) to make room.

use crate::error::ErrorType;
use crate::util::walk_dir;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Audio file extensions recognised while walking the music root.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "aiff", "aif", "m4a", "ogg", "opus"];

/// A single filename-index entry.
struct Entry {
    /// Absolute path to the file.
    path: PathBuf,
    /// Number of times this entry has been looked up.
    access_count: u64,
    /// Monotonic insertion sequence, used to break eviction ties.
    inserted_at: u64,
}

/// Bounded `basename -> absolute path` index, built once and read many times.
#[derive(Debug)]
pub struct FilenameIndex {
    entries: HashMap<String, Entry>,
    capacity: usize,
    next_sequence: u64,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.path)
            .field("access_count", &self.access_count)
            .field("inserted_at", &self.inserted_at)
            .finish()
    }
}

impl FilenameIndex {
    /// Build an index by recursively walking `root`, with a bounded entry `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorType::IndexUnusable`] if `root` does not exist.
    pub fn build<P: AsRef<Path>>(root: P, capacity: usize) -> crate::Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(ErrorType::IndexUnusable(root.display().to_string()));
        }

        let mut index = FilenameIndex {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            next_sequence: 0,
        };

        for result in walk_dir(root.to_path_buf()) {
            let (_dir, _subdirs, files) = result.map_err(|e| ErrorType::IndexUnusable(e.to_string()))?;
            for file in files {
                let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
                    continue;
                };
                if !AUDIO_EXTENSIONS
                    .iter()
                    .any(|recognised| recognised.eq_ignore_ascii_case(ext))
                {
                    continue;
                }
                let Some(basename) = file.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                index.insert(basename.to_lowercase(), file);
            }
        }

        Ok(index)
    }

    /// Insert a single `(basename, path)` pair, evicting the least-accessed
    /// entry first if the index is at capacity. On a basename collision, the
    /// first-seen path wins — this is a safety property, not an optimisation:
    /// repeated lookups of the same tree must stay deterministic across runs.
    fn insert(&mut self, basename: String, path: PathBuf) {
        if self.entries.contains_key(&basename) {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.evict_least_accessed();
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(
            basename,
            Entry {
                path,
                access_count: 0,
                inserted_at: sequence,
            },
        );
    }

    /// Evict the entry with the lowest access count, breaking ties by the
    /// oldest insertion sequence.
    fn evict_least_accessed(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.access_count, entry.inserted_at))
            .map(|(basename, _)| basename.clone());
        if let Some(basename) = victim {
            self.entries.remove(&basename);
        }
    }

    /// Look up a basename (case-insensitive), incrementing its access count on
    /// a hit. Returns `None` on a miss without modifying the index.
    #[must_use]
    pub fn lookup(&mut self, basename: &str) -> Option<&Path> {
        let key = basename.to_lowercase();
        let entry = self.entries.get_mut(&key)?;
        entry.access_count += 1;
        Some(entry.path.as_path())
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_tree(root: &Path, names: &[&str]) {
        fs::create_dir_all(root).unwrap();
        for name in names {
            fs::write(root.join(name), b"fake-audio").unwrap();
        }
    }

    #[test]
    fn missing_root_is_unusable() {
        let result = FilenameIndex::build("/nonexistent/definitely/not/here", 100);
        assert!(matches!(result, Err(ErrorType::IndexUnusable(_))));
    }

    #[test]
    fn builds_and_looks_up() {
        let dir = tempfile::tempdir().unwrap();
        make_tree(dir.path(), &["Track One.mp3", "notes.txt"]);

        let mut index = FilenameIndex::build(dir.path(), 100).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.lookup("track one.mp3").is_some());
        assert!(index.lookup("missing.mp3").is_none());
    }

    #[test]
    fn deterministic_across_independent_builds() {
        let dir = tempfile::tempdir().unwrap();
        make_tree(dir.path(), &["a.mp3", "b.flac", "c.wav"]);

        let first = FilenameIndex::build(dir.path(), 100).unwrap();
        let second = FilenameIndex::build(dir.path(), 100).unwrap();

        let mut first_keys: Vec<_> = first.entries.keys().cloned().collect();
        let mut second_keys: Vec<_> = second.entries.keys().cloned().collect();
        first_keys.sort();
        second_keys.sort();
        assert_eq!(first_keys, second_keys);
    }

    #[test]
    fn eviction_removes_least_accessed() {
        let dir = tempfile::tempdir().unwrap();
        make_tree(dir.path(), &["a.mp3", "b.mp3", "c.mp3"]);

        let mut index = FilenameIndex::build(dir.path(), 3).unwrap();
        // Access "a" and "b" repeatedly so "c" is the least-accessed.
        for _ in 0..5 {
            index.lookup("a.mp3");
            index.lookup("b.mp3");
        }
        index.insert("d.mp3".to_string(), dir.path().join("d.mp3"));
        assert_eq!(index.len(), 3);
        assert!(index.lookup("c.mp3").is_none());
        assert!(index.lookup("d.mp3").is_some());
    }
}
