//! Profile construction.
//!
//! Every method validates its input immediately, so a builder that accepted
//! all calls always freezes into a usable [`Profile`]. Classes for operator,
//! bracket, literal-prefix and numeric-prefix symbols are derived from the
//! sequences registered here; callers only set the base classes.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::char_class::{CharClass, CharClassTable};
use crate::error::BuildError;
use crate::kind::TokenKind;
use crate::literal::{LiteralParserFactory, LiteralRegistry};
use crate::options::Options;
use crate::profile::Profile;
use crate::trie::{NodeId, TrieBuilder};

/// Mutable profile under construction.
#[derive(Debug)]
pub struct ProfileBuilder {
    classes: CharClassTable,
    options: Options,
    default_number: TokenKind,
    number_prefixes: TrieBuilder,
    brackets: TrieBuilder,
    operators: TrieBuilder,
    literals: TrieBuilder,
    literal_parsers: LiteralRegistry,
    multi_line_end: Box<[char]>,
    comment_fallbacks: Vec<(NodeId, TokenKind)>,
    names: FxHashMap<TokenKind, Box<str>>,
    next_operator: u16,
    allow_kind_reuse: bool,
}

impl ProfileBuilder {
    /// Builder over the standard class table and default options.
    pub fn new() -> Self {
        ProfileBuilder {
            classes: CharClassTable::standard(),
            options: Options::default(),
            default_number: TokenKind::NUMBER_DECIMAL,
            number_prefixes: TrieBuilder::new(),
            brackets: TrieBuilder::new(),
            operators: TrieBuilder::new(),
            literals: TrieBuilder::new(),
            literal_parsers: LiteralRegistry::default(),
            multi_line_end: Box::default(),
            comment_fallbacks: Vec::new(),
            names: FxHashMap::default(),
            next_operator: TokenKind::OPERATOR_FIRST,
            allow_kind_reuse: false,
        }
    }

    // === Classes ===

    /// Replace the class of `symbol`.
    pub fn set_class(&mut self, symbol: char, class: CharClass) -> &mut Self {
        self.classes.set(symbol, class);
        self
    }

    /// Add flags to the class of every symbol in `symbols`.
    pub fn add_class(&mut self, symbols: &str, class: CharClass) -> &mut Self {
        for symbol in symbols.chars() {
            self.classes.insert(symbol, class);
        }
        self
    }

    /// Replace the class shared by all non-ASCII symbols.
    pub fn set_non_ascii_class(&mut self, class: CharClass) -> &mut Self {
        self.classes.set_non_ascii(class);
        self
    }

    /// Let several sequences share one kind.
    pub fn allow_kind_reuse(&mut self, allow: bool) -> &mut Self {
        self.allow_kind_reuse = allow;
        self
    }

    // === Options ===

    pub fn options(&mut self, options: Options) -> Result<&mut Self, BuildError> {
        let base = options.default_numeric_base;
        self.default_number =
            TokenKind::number_for_base(base).ok_or(BuildError::UnsupportedBase { base })?;
        self.options = options;
        Ok(self)
    }

    // === Sequences ===

    /// Register a bracket pair such as `"()"` under its open kind.
    pub fn add_brackets(&mut self, pair: &str, open: TokenKind) -> Result<&mut Self, BuildError> {
        let mut symbols = pair.chars();
        let (Some(open_symbol), Some(close_symbol), None) =
            (symbols.next(), symbols.next(), symbols.next())
        else {
            return Err(BuildError::MalformedBracketPair {
                pair: pair.to_owned(),
            });
        };
        let Some(close) = open.bracket_close() else {
            return Err(BuildError::MalformedBracketPair {
                pair: pair.to_owned(),
            });
        };
        self.register_kind(open, &open_symbol.to_string())?;
        self.register_kind(close, &close_symbol.to_string())?;
        self.brackets
            .insert(&open_symbol.to_string(), open, None)?;
        self.brackets
            .insert(&close_symbol.to_string(), close, None)?;
        self.classes.insert(open_symbol, CharClass::OPEN);
        self.classes.insert(close_symbol, CharClass::CLOSE);
        Ok(self)
    }

    /// Register a numeric prefix (`"0x"`, `"0"`, ...) with its number kind.
    ///
    /// The base comes from the kind's base bits; set
    /// [`TokenKind::NUMBER_MISSED_DIGITS_FLAG`] to accept the bare prefix.
    pub fn add_number_prefix(
        &mut self,
        prefix: &str,
        kind: TokenKind,
    ) -> Result<&mut Self, BuildError> {
        let Some(first) = prefix.chars().next() else {
            return Err(BuildError::EmptySequence {
                what: "numeric prefix",
            });
        };
        if !first.is_ascii_digit() {
            return Err(BuildError::PrefixNotDigit {
                prefix: prefix.to_owned(),
            });
        }
        if !kind.is_number() || kind.is_float() {
            return Err(BuildError::KindOutOfRange {
                kind,
                expected: "integer number",
            });
        }
        if kind.number_base().is_none() {
            return Err(BuildError::UnsupportedBase {
                base: u32::from((kind.raw() & TokenKind::NUMBER_BASE_MASK) >> 8),
            });
        }
        self.register_kind(kind, prefix)?;
        self.number_prefixes.insert(prefix, kind, None)?;
        self.classes.insert(first, CharClass::DIGIT);
        Ok(self)
    }

    /// Register a single-line comment marker.
    ///
    /// The marker also gets an automatic operator kind, used when
    /// `single_line_comment_only_at_line_start` rejects it.
    pub fn add_single_line_comment(&mut self, marker: &str) -> Result<&mut Self, BuildError> {
        if marker.is_empty() {
            return Err(BuildError::EmptySequence {
                what: "comment marker",
            });
        }
        let node = self
            .operators
            .insert(marker, TokenKind::COMMENT_SINGLE_LINE, None)?;
        if self.comment_fallbacks.iter().any(|(n, _)| *n == node) {
            return Ok(self);
        }
        let fallback = self.allocate_operator_kind()?;
        self.register_kind(fallback, marker)?;
        self.comment_fallbacks.push((node, fallback));
        self.mark_operator(marker);
        Ok(self)
    }

    /// Set the multi-line comment markers.
    pub fn set_multi_line_comment(&mut self, open: &str, close: &str) -> Result<&mut Self, BuildError> {
        if open.is_empty() || close.is_empty() {
            return Err(BuildError::EmptySequence {
                what: "comment marker",
            });
        }
        self.operators
            .insert(open, TokenKind::COMMENT_MULTI_LINE, None)?;
        self.multi_line_end = close.chars().collect();
        self.mark_operator(open);
        Ok(self)
    }

    /// Register an operator with the next free automatic kind.
    ///
    /// Registering the same operator twice returns its existing kind.
    pub fn add_operator(&mut self, sequence: &str) -> Result<TokenKind, BuildError> {
        if sequence.is_empty() {
            return Err(BuildError::EmptySequence { what: "operator" });
        }
        if let Some(kind) = self
            .operators
            .find(sequence)
            .and_then(|node| self.operators.kind(node))
        {
            if kind.is_operator() {
                return Ok(kind);
            }
        }
        let kind = self.allocate_operator_kind()?;
        self.add_operator_kind(sequence, kind)?;
        Ok(kind)
    }

    /// Register an operator with an explicit kind.
    pub fn add_operator_kind(
        &mut self,
        sequence: &str,
        kind: TokenKind,
    ) -> Result<&mut Self, BuildError> {
        if sequence.is_empty() {
            return Err(BuildError::EmptySequence { what: "operator" });
        }
        if !kind.is_operator() {
            return Err(BuildError::KindOutOfRange {
                kind,
                expected: "operator",
            });
        }
        self.register_kind(kind, sequence)?;
        self.operators.insert(sequence, kind, None)?;
        self.mark_operator(sequence);
        Ok(self)
    }

    /// Register a literal syntax introduced by `prefix` and decoded by the
    /// parsers `factory` creates.
    pub fn add_literal(
        &mut self,
        prefix: &str,
        kind: TokenKind,
        factory: LiteralParserFactory,
    ) -> Result<&mut Self, BuildError> {
        let Some(first) = prefix.chars().next() else {
            return Err(BuildError::EmptySequence {
                what: "literal prefix",
            });
        };
        if !kind.is_literal() {
            return Err(BuildError::KindOutOfRange {
                kind,
                expected: "literal",
            });
        }
        self.register_kind(kind, prefix)?;
        let id = self
            .literal_parsers
            .register(factory)
            .ok_or(BuildError::LiteralParsersExhausted)?;
        self.literals.insert(prefix, kind, Some(id))?;
        self.classes
            .insert(first, CharClass::STRING_LITERAL_PREFIX);
        Ok(self)
    }

    /// Freeze into a shareable profile.
    pub fn build(self) -> Profile {
        let profile = Profile {
            classes: self.classes,
            options: self.options,
            default_number: self.default_number,
            number_prefixes: self.number_prefixes.freeze(),
            brackets: self.brackets.freeze(),
            operators: self.operators.freeze(),
            literals: self.literals.freeze(),
            literal_parsers: self.literal_parsers,
            multi_line_end: self.multi_line_end,
            comment_fallbacks: self.comment_fallbacks,
            names: self.names,
        };
        debug!(
            operators = profile.operators.node_count(),
            literals = profile.literal_parsers.len(),
            kinds = profile.names.len(),
            "profile frozen"
        );
        profile
    }

    fn mark_operator(&mut self, sequence: &str) {
        for symbol in sequence.chars() {
            self.classes.insert(symbol, CharClass::OPERATOR);
        }
    }

    /// Record `kind` as spelled `sequence`.
    fn register_kind(&mut self, kind: TokenKind, sequence: &str) -> Result<(), BuildError> {
        match self.names.get(&kind) {
            Some(existing) if existing.as_ref() == sequence || self.allow_kind_reuse => Ok(()),
            Some(existing) => Err(BuildError::DuplicateKind {
                kind,
                existing: existing.to_string(),
            }),
            None => {
                self.names.insert(kind, sequence.into());
                Ok(())
            }
        }
    }

    fn allocate_operator_kind(&mut self) -> Result<TokenKind, BuildError> {
        while self.next_operator < TokenKind::OPERATOR_USER_FIRST {
            let kind = TokenKind::new(self.next_operator);
            self.next_operator += 1;
            if !self.names.contains_key(&kind) {
                return Ok(kind);
            }
        }
        Err(BuildError::OperatorKindsExhausted)
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
