//! Frozen prefix trees over symbol sequences.
//!
//! A profile owns four tries: numeric prefixes, bracket pairs, operators
//! (comment markers included), and literal prefixes. They are built with
//! [`TrieBuilder`] and frozen into [`Trie`], a flat node array with sorted
//! transition slices. Frozen tries are read-only and traversal never
//! allocates.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::kind::TokenKind;
use crate::literal::LiteralParserId;

/// Index of a trie node.
///
/// Ids handed out by [`TrieBuilder::insert`] stay valid after freezing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Why an insertion was rejected.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TrieError {
    #[error("cannot insert an empty sequence")]
    EmptySequence,
    #[error("sequence {sequence:?} is already registered as {existing:?}, not {requested:?}")]
    KindConflict {
        sequence: String,
        existing: TokenKind,
        requested: TokenKind,
    },
    #[error("sequence {sequence:?} already has a literal parser bound")]
    PayloadConflict { sequence: String },
}

#[derive(Clone, Debug)]
struct FrozenNode {
    symbol: char,
    parent: Option<NodeId>,
    /// Range into `Trie::edges`.
    edges_start: u32,
    edges_end: u32,
    depth: u16,
    kind: Option<TokenKind>,
    payload: Option<LiteralParserId>,
}

/// Frozen prefix tree.
#[derive(Clone, Debug)]
pub struct Trie {
    nodes: Vec<FrozenNode>,
    /// Transitions of all nodes, each node's slice sorted by symbol.
    edges: Vec<(char, NodeId)>,
}

impl Trie {
    /// Follow `symbol` from `from` (`None` = start of a sequence).
    #[inline]
    pub fn advance(&self, from: Option<NodeId>, symbol: char) -> Option<NodeId> {
        let node = self.nodes.get(from.unwrap_or(NodeId::ROOT).index())?;
        let edges = &self.edges[node.edges_start as usize..node.edges_end as usize];
        edges
            .binary_search_by_key(&symbol, |&(c, _)| c)
            .ok()
            .map(|i| edges[i].1)
    }

    /// Terminal kind of a node, if a sequence ends there.
    #[inline]
    pub fn kind(&self, node: NodeId) -> Option<TokenKind> {
        self.nodes.get(node.index()).and_then(|n| n.kind)
    }

    /// Literal parser bound to a node.
    #[inline]
    pub fn payload(&self, node: NodeId) -> Option<LiteralParserId> {
        self.nodes.get(node.index()).and_then(|n| n.payload)
    }

    /// Whether any longer sequence continues through this node.
    #[inline]
    pub fn has_children(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.index())
            .is_some_and(|n| n.edges_end > n.edges_start)
    }

    /// Number of symbols matched to reach this node.
    #[inline]
    pub fn depth(&self, node: NodeId) -> usize {
        self.nodes.get(node.index()).map_or(0, |n| usize::from(n.depth))
    }

    /// Symbols matched so far, first symbol first.
    pub fn backtrack_symbols(&self, node: NodeId) -> SmallVec<[char; 8]> {
        let mut symbols = SmallVec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == NodeId::ROOT {
                break;
            }
            let Some(n) = self.nodes.get(id.index()) else {
                break;
            };
            symbols.push(n.symbol);
            cursor = n.parent;
        }
        symbols.reverse();
        symbols
    }

    /// Whether the trie holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Trie {
    fn default() -> Self {
        TrieBuilder::new().freeze()
    }
}

#[derive(Clone, Debug)]
struct BuilderNode {
    symbol: char,
    parent: Option<NodeId>,
    depth: u16,
    children: FxHashMap<char, NodeId>,
    kind: Option<TokenKind>,
    payload: Option<LiteralParserId>,
}

impl BuilderNode {
    fn new(symbol: char, parent: Option<NodeId>, depth: u16) -> Self {
        BuilderNode {
            symbol,
            parent,
            depth,
            children: FxHashMap::default(),
            kind: None,
            payload: None,
        }
    }
}

/// Mutable trie under construction.
#[derive(Clone, Debug)]
pub struct TrieBuilder {
    nodes: Vec<BuilderNode>,
}

impl TrieBuilder {
    pub fn new() -> Self {
        TrieBuilder {
            nodes: vec![BuilderNode::new('\0', None, 0)],
        }
    }

    /// Insert `sequence` ending in `kind`, optionally binding a literal parser.
    ///
    /// Re-inserting a sequence with the same kind is accepted; a different
    /// kind is a conflict.
    pub fn insert(
        &mut self,
        sequence: &str,
        kind: TokenKind,
        payload: Option<LiteralParserId>,
    ) -> Result<NodeId, TrieError> {
        if sequence.is_empty() {
            return Err(TrieError::EmptySequence);
        }
        let mut current = NodeId::ROOT;
        for symbol in sequence.chars() {
            current = self.child_or_insert(current, symbol);
        }
        let node = &mut self.nodes[current.index()];
        match node.kind {
            Some(existing) if existing != kind => {
                return Err(TrieError::KindConflict {
                    sequence: sequence.to_owned(),
                    existing,
                    requested: kind,
                });
            }
            _ => node.kind = Some(kind),
        }
        if let Some(payload) = payload {
            if node.payload.is_some_and(|p| p != payload) {
                return Err(TrieError::PayloadConflict {
                    sequence: sequence.to_owned(),
                });
            }
            node.payload = Some(payload);
        }
        Ok(current)
    }

    /// Node reached by `sequence`, if it was inserted as a prefix of anything.
    pub fn find(&self, sequence: &str) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for symbol in sequence.chars() {
            current = *self.nodes[current.index()].children.get(&symbol)?;
        }
        Some(current)
    }

    /// Terminal kind stored at a builder node.
    pub fn kind(&self, node: NodeId) -> Option<TokenKind> {
        self.nodes.get(node.index()).and_then(|n| n.kind)
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "node counts and sequence depths are bounded by profile size"
    )]
    fn child_or_insert(&mut self, parent: NodeId, symbol: char) -> NodeId {
        if let Some(&child) = self.nodes[parent.index()].children.get(&symbol) {
            return child;
        }
        let id = NodeId(self.nodes.len() as u32);
        let depth = self.nodes[parent.index()].depth + 1;
        self.nodes.push(BuilderNode::new(symbol, Some(parent), depth));
        self.nodes[parent.index()].children.insert(symbol, id);
        id
    }

    /// Freeze into a read-only trie with identical node ids.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "edge counts are bounded by node count, which fits u32"
    )]
    pub fn freeze(self) -> Trie {
        let mut edges = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            let edges_start = edges.len() as u32;
            let mut children: Vec<(char, NodeId)> = node.children.into_iter().collect();
            children.sort_unstable_by_key(|&(c, _)| c);
            edges.extend(children);
            nodes.push(FrozenNode {
                symbol: node.symbol,
                parent: node.parent,
                edges_start,
                edges_end: edges.len() as u32,
                depth: node.depth,
                kind: node.kind,
                payload: node.payload,
            });
        }
        Trie { nodes, edges }
    }
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self::new()
    }
}
