//! Scan and build errors.

use crate::kind::TokenKind;
use crate::span::Span;
use crate::trie::TrieError;

/// Why a scan stopped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// A token handler returned `Break`. `message` is whatever it wrote.
    #[error("token handler aborted at {span}: {message}")]
    Aborted { span: Span, message: String },
    /// Unexpected input and the handler declined to continue.
    #[error("unexpected input at {span}")]
    Unexpected { span: Span },
    /// A literal sub-parser failed and the handler declined to continue.
    #[error("malformed literal at {span}: {message}")]
    Literal { span: Span, message: String },
    /// Offsets no longer fit in `u32`.
    #[error("source of {len} bytes exceeds the 4 GiB position limit")]
    SourceTooLarge { len: usize },
}

impl ScanError {
    /// Location the scan stopped at, if there is one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ScanError::Aborted { span, .. }
            | ScanError::Unexpected { span }
            | ScanError::Literal { span, .. } => Some(*span),
            ScanError::SourceTooLarge { .. } => None,
        }
    }
}

/// Profile builder validation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("kind {kind:?} is already assigned to {existing:?}")]
    DuplicateKind { kind: TokenKind, existing: String },
    #[error("empty {what} sequence")]
    EmptySequence { what: &'static str },
    #[error("numeric prefix {prefix:?} must start with a digit")]
    PrefixNotDigit { prefix: String },
    #[error("kind {kind:?} is outside the {expected} range")]
    KindOutOfRange {
        kind: TokenKind,
        expected: &'static str,
    },
    #[error("numeric base {base} is not supported")]
    UnsupportedBase { base: u32 },
    #[error("bracket pair {pair:?} must be exactly two symbols with an open bracket kind")]
    MalformedBracketPair { pair: String },
    #[error("operator kind space exhausted")]
    OperatorKindsExhausted,
    #[error("literal parser id space exhausted")]
    LiteralParsersExhausted,
    #[error(transparent)]
    Trie(#[from] TrieError),
}
