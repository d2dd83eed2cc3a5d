// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The playlist/folder tree and the collection that owns it (§3).
//!
//! Nodes are stored as indexed entries in a flat vector addressed by
//! [`NodeId`] rather than as owning pointers (Design Notes §9): this both
//! eliminates cycle risk and makes a pre-order traversal — which the database
//! writer needs for id assignment — a straight loop over parent/child links.

use super::track::{Fingerprint, Track};
use std::collections::HashMap;
use uuid::Uuid;

/// Index into [`Collection::nodes`].
pub type NodeId = usize;

/// A single playlist entry, before or after cross-resolution.
#[derive(Debug, Clone)]
pub enum PlaylistEntry {
    /// The raw key as read from the source (full volume+path string).
    Unresolved(String),
    /// The resolved track fingerprint.
    Resolved(Fingerprint),
}

/// The kind of a playlist-tree node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A folder, holding an ordered list of child node ids.
    Folder {
        /// Ordered child node ids.
        children: Vec<NodeId>,
    },
    /// A playlist, holding an ordered list of track references.
    Playlist {
        /// Ordered entries; a [`PlaylistEntry::Unresolved`] entry until
        /// cross-resolution runs, then either [`PlaylistEntry::Resolved`] or
        /// dropped with a warning (§4.4) if no track matched.
        entries: Vec<PlaylistEntry>,
    },
    /// A smart playlist; the query is passed through to interchange XML
    /// verbatim and ignored entirely for hardware export.
    Smartlist {
        /// Free-form query text, preserved verbatim.
        query: String,
    },
}

/// A node in the playlist/folder tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Stable UUID, assigned at construction and never reused.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// The node's kind and kind-specific payload.
    pub kind: NodeKind,
}

impl Node {
    /// A new empty folder node.
    #[must_use]
    pub fn new_folder(name: impl Into<String>) -> Self {
        Node {
            uuid: Uuid::new_v4(),
            name: name.into(),
            kind: NodeKind::Folder { children: Vec::new() },
        }
    }

    /// A new empty playlist node.
    #[must_use]
    pub fn new_playlist(name: impl Into<String>) -> Self {
        Node {
            uuid: Uuid::new_v4(),
            name: name.into(),
            kind: NodeKind::Playlist { entries: Vec::new() },
        }
    }

    /// A new smartlist node.
    #[must_use]
    pub fn new_smartlist(name: impl Into<String>, query: impl Into<String>) -> Self {
        Node {
            uuid: Uuid::new_v4(),
            name: name.into(),
            kind: NodeKind::Smartlist { query: query.into() },
        }
    }

    /// Whether this node is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }
}

/// Parse-run statistics.
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    /// The source document's version attribute, verbatim.
    pub version: String,
    /// Number of entry elements successfully materialised as tracks.
    pub entry_count: usize,
    /// Wall-clock time taken to parse, in milliseconds.
    pub parse_time_ms: u64,
    /// Non-fatal issues collected during parsing.
    pub issues: Vec<String>,
}

/// The parsed collection: tracks keyed by fingerprint, plus the node tree.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    tracks: HashMap<Fingerprint, Track>,
    /// Flat node storage; `nodes[0]` is always the tree's root folder if non-empty.
    pub nodes: Vec<Node>,
    /// Root-level node ids, in source order.
    pub roots: Vec<NodeId>,
    /// Parse-run statistics.
    pub stats: CollectionStats,
}

impl Collection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a track by its fingerprint.
    pub fn insert_track(&mut self, track: Track) {
        self.tracks.insert(track.fingerprint.clone(), track);
    }

    /// Look up a track by fingerprint.
    #[must_use]
    pub fn track(&self, fingerprint: &Fingerprint) -> Option<&Track> {
        self.tracks.get(fingerprint)
    }

    /// Mutable lookup, used by path repair (§4.4).
    pub fn track_mut(&mut self, fingerprint: &Fingerprint) -> Option<&mut Track> {
        self.tracks.get_mut(fingerprint)
    }

    /// Iterate over all tracks, in unspecified order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Number of tracks in the collection.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Append a node, returning its freshly assigned id.
    pub fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Pre-order traversal of the tree starting from `self.roots`, yielding
    /// `(node_id, depth)` pairs. This is the straight loop the database
    /// writer relies on for id assignment.
    #[must_use]
    pub fn preorder(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> =
            self.roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            if let NodeKind::Folder { children } = &self.nodes[id].kind {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        out
    }

    /// Resolve every playlist entry key (full volume+path string) to a track
    /// fingerprint, using `resolve` to look up the fingerprint for a given key.
    /// Entries that fail to resolve are dropped (with the caller expected to
    /// emit a warning per entry dropped); a playlist left with no resolvable
    /// entries remains in the tree but empty.
    pub fn resolve_playlist_entries<F>(&mut self, mut resolve: F)
    where
        F: FnMut(&str) -> Option<Fingerprint>,
    {
        for node in &mut self.nodes {
            if let NodeKind::Playlist { entries } = &mut node.kind {
                entries.retain_mut(|entry| {
                    let PlaylistEntry::Unresolved(raw_key) = entry else {
                        return true;
                    };
                    match resolve(raw_key) {
                        Some(fingerprint) => {
                            *entry = PlaylistEntry::Resolved(fingerprint);
                            true
                        }
                        None => false,
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preorder_visits_root_before_children() {
        let mut collection = Collection::new();
        let child = collection.push_node(Node::new_playlist("Child"));
        let mut root = Node::new_folder("Root");
        if let NodeKind::Folder { children } = &mut root.kind {
            children.push(child);
        }
        let root_id = collection.push_node(root);
        collection.roots.push(root_id);

        let order = collection.preorder();
        assert_eq!(order, vec![(root_id, 0), (child, 1)]);
    }
}
