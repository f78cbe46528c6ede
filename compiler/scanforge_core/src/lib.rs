//! Configurable single-pass tokenizer engine.
//!
//! A [`Profile`] describes a language (character classes, operators, numeric
//! prefixes, brackets, comments, literal syntaxes). The engine feeds one
//! symbol at a time through a state machine and hands classified [`Token`]s
//! to a [`TokenSink`], optionally through a [`FilterChain`].
//!
//! ```text
//! (symbol, offset) ──▶ ScanState + Profile ──▶ filters ──▶ sink
//! ```
//!
//! Profiles are immutable and `Send + Sync`; every scan owns its
//! [`ScanState`]. Positions are byte offsets into the caller's UTF-8 text.

mod builder;
mod char_class;
mod error;
mod filter;
mod kind;
mod literal;
mod number;
mod options;
mod profile;
mod scanner;
mod span;
mod token;
mod trie;

pub use builder::ProfileBuilder;
pub use char_class::{CharClass, CharClassTable, ASCII_TABLE_SIZE};
pub use error::{BuildError, ScanError};
pub use filter::{FilterChain, LineDirective, ModeGate, SequenceComposer, SuffixGlue, TokenFilter};
pub use kind::{KindCategory, TokenKind};
pub use literal::{
    LiteralParser, LiteralParserFactory, LiteralParserId, LiteralRegistry, LiteralSignal,
};
pub use number::{accumulate, digit_value, NumberAccumulator};
pub use options::Options;
pub use profile::Profile;
pub use scanner::{ScanState, StateKind, Tokenizer};
pub use span::{symbol_end, Span};
pub use token::{
    Diagnostic, FloatData, IntegerData, Token, TokenCollector, TokenData, TokenSink,
    UnexpectedReport,
};
pub use trie::{NodeId, Trie, TrieBuilder, TrieError};
