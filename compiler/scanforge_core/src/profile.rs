//! Frozen language profiles.
//!
//! A [`Profile`] is everything the scanner needs to know about a language:
//! classes, options, the four tries, literal parser factories and comment
//! markers. It is produced by [`ProfileBuilder`](crate::ProfileBuilder),
//! never changes afterwards, and is shared by any number of scan states.

use rustc_hash::FxHashMap;

use crate::char_class::CharClassTable;
use crate::kind::TokenKind;
use crate::literal::LiteralRegistry;
use crate::options::Options;
use crate::trie::{NodeId, Trie};

/// Immutable, shareable language description.
#[derive(Debug)]
pub struct Profile {
    pub(crate) classes: CharClassTable,
    pub(crate) options: Options,
    /// Numeric kind for numbers without a prefix.
    pub(crate) default_number: TokenKind,
    pub(crate) number_prefixes: Trie,
    pub(crate) brackets: Trie,
    /// Operators plus comment open markers.
    pub(crate) operators: Trie,
    pub(crate) literals: Trie,
    pub(crate) literal_parsers: LiteralRegistry,
    /// Close marker of the multi-line comment, empty if there is none.
    pub(crate) multi_line_end: Box<[char]>,
    /// Operator kind a single-line comment marker scans as when it is not
    /// at line start.
    pub(crate) comment_fallbacks: Vec<(NodeId, TokenKind)>,
    /// Source sequence of each registered kind.
    pub(crate) names: FxHashMap<TokenKind, Box<str>>,
}

impl Profile {
    pub fn classes(&self) -> &CharClassTable {
        &self.classes
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Kind of the operator spelled `sequence`.
    ///
    /// Comment markers report their comment kind.
    pub fn operator_kind(&self, sequence: &str) -> Option<TokenKind> {
        lookup(&self.operators, sequence)
    }

    /// Kind of the numeric prefix spelled `prefix`.
    pub fn number_prefix_kind(&self, prefix: &str) -> Option<TokenKind> {
        lookup(&self.number_prefixes, prefix)
    }

    /// Kind of the literal introduced by `prefix`.
    pub fn literal_kind(&self, prefix: &str) -> Option<TokenKind> {
        lookup(&self.literals, prefix)
    }

    /// Operator kind a single-line comment `marker` falls back to.
    pub fn comment_fallback_kind(&self, marker: &str) -> Option<TokenKind> {
        let node = walk(&self.operators, marker)?;
        self.comment_fallback(node)
    }

    /// Sequence a kind was registered for, e.g. `"->"` for an arrow operator.
    pub fn describe(&self, kind: TokenKind) -> Option<&str> {
        self.names.get(&kind).map(AsRef::as_ref)
    }

    pub(crate) fn comment_fallback(&self, node: NodeId) -> Option<TokenKind> {
        self.comment_fallbacks
            .iter()
            .find(|(n, _)| *n == node)
            .map(|(_, kind)| *kind)
    }
}

fn walk(trie: &Trie, sequence: &str) -> Option<NodeId> {
    let mut node = None;
    for symbol in sequence.chars() {
        node = Some(trie.advance(node, symbol)?);
    }
    node
}

fn lookup(trie: &Trie, sequence: &str) -> Option<TokenKind> {
    walk(trie, sequence).and_then(|node| trie.kind(node))
}
