//! Pluggable literal sub-parsers.
//!
//! The scanner never interprets quoted content itself. When the literal
//! prefix trie matches, the parser bound to that prefix receives every
//! following symbol until it signals a stop or an error, and the token it
//! produces carries the parser's decoded text rather than the raw source.
//!
//! Profiles are shared across threads, so they store *factories*. Each
//! [`ScanState`](crate::ScanState) instantiates its own parsers on first use.

use std::fmt;

/// Typed handle of a literal parser registered in a profile.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct LiteralParserId(u16);

impl LiteralParserId {
    #[inline]
    pub const fn new(index: u16) -> Self {
        LiteralParserId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Answer of a sub-parser to one symbol.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LiteralSignal {
    /// Symbol consumed, literal continues.
    Continue,
    /// Symbol consumed, literal continues, message reported to the sink.
    ContinueWithWarning(String),
    /// Symbol consumed and the literal is complete.
    StopOk,
    /// Literal complete, message reported to the sink.
    StopWithWarning(String),
    /// Decoding failed; the scan takes the unexpected-input path.
    Error(String),
}

/// Decoder for one literal syntax.
pub trait LiteralParser: Send {
    /// Prepare for a new literal. Called right after the prefix matched.
    fn reset(&mut self);

    /// Consume one symbol of literal content.
    fn parse_symbol(&mut self, symbol: char) -> LiteralSignal;

    /// Take the decoded text of the literal that just stopped.
    fn take_decoded(&mut self) -> String;

    /// Input ended inside the literal.
    fn finish_at_end(&mut self) -> LiteralSignal {
        LiteralSignal::Error("unterminated literal".to_owned())
    }
}

/// Creates fresh parser instances for each scan state.
pub type LiteralParserFactory = Box<dyn Fn() -> Box<dyn LiteralParser> + Send + Sync>;

/// Factories indexed by [`LiteralParserId`].
#[derive(Default)]
pub struct LiteralRegistry {
    factories: Vec<LiteralParserFactory>,
}

impl LiteralRegistry {
    /// Register a factory and return its handle.
    ///
    /// Returns `None` once the 16-bit id space is exhausted.
    pub fn register(&mut self, factory: LiteralParserFactory) -> Option<LiteralParserId> {
        let index = u16::try_from(self.factories.len()).ok()?;
        self.factories.push(factory);
        Some(LiteralParserId(index))
    }

    /// Create a new parser instance for `id`.
    pub fn instantiate(&self, id: LiteralParserId) -> Option<Box<dyn LiteralParser>> {
        self.factories.get(id.index()).map(|factory| factory())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for LiteralRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteralRegistry")
            .field("parsers", &self.factories.len())
            .finish()
    }
}
