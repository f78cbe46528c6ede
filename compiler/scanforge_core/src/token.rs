//! Tokens and the handler interface they are delivered through.

use std::ops::ControlFlow;
use std::panic::Location;

use crate::kind::TokenKind;
use crate::span::Span;

/// Parsed integer payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegerData {
    pub value: u64,
    /// More digits than fit in `u64`; `value` holds the last value that fit.
    pub overflow: bool,
    /// Byte offset where a glued suffix starts (the token end if none).
    pub suffix_start: u32,
}

/// Parsed float payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatData {
    pub value: f64,
    pub integer_overflow: bool,
    pub fraction_overflow: bool,
    pub suffix_start: u32,
}

/// Payload attached to a token.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TokenData {
    #[default]
    Empty,
    /// Comment body without its markers.
    Comment(String),
    /// Decoded literal content.
    Literal(String),
    Integer(IntegerData),
    Float(FloatData),
}

impl TokenData {
    /// Decoded text of a comment or literal.
    pub fn text(&self) -> Option<&str> {
        match self {
            TokenData::Comment(text) | TokenData::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Suffix offset of a numeric payload.
    pub fn suffix_start(&self) -> Option<u32> {
        match self {
            TokenData::Integer(data) => Some(data.suffix_start),
            TokenData::Float(data) => Some(data.suffix_start),
            _ => None,
        }
    }

    /// Same payload with the numeric suffix moved to `offset`.
    #[must_use]
    pub fn with_suffix_start(self, offset: u32) -> Self {
        match self {
            TokenData::Integer(data) => TokenData::Integer(IntegerData {
                suffix_start: offset,
                ..data
            }),
            TokenData::Float(data) => TokenData::Float(FloatData {
                suffix_start: offset,
                ..data
            }),
            other => other,
        }
    }
}

/// One classified token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// No non-trivia token precedes this one on its line.
    pub at_line_start: bool,
    pub kind: TokenKind,
    pub span: Span,
    pub data: TokenData,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            at_line_start: false,
            kind,
            span,
            data: TokenData::Empty,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: TokenData) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn at_line_start(mut self, at_line_start: bool) -> Self {
        self.at_line_start = at_line_start;
        self
    }

    /// Source text of this token.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.to_range()).unwrap_or("")
    }
}

/// Unexpected input, reported before the engine decides whether to go on.
#[derive(Copy, Clone, Debug)]
pub struct UnexpectedReport {
    pub span: Span,
    /// Engine location that raised the report.
    pub origin: &'static Location<'static>,
}

impl UnexpectedReport {
    #[track_caller]
    pub fn here(span: Span) -> Self {
        UnexpectedReport {
            span,
            origin: Location::caller(),
        }
    }
}

/// Receiver of everything a scan produces.
///
/// Every method may stop the scan by returning `ControlFlow::Break`.
pub trait TokenSink {
    /// A finished token. On `Break`, `message` becomes the abort reason.
    fn token(&mut self, token: Token, message: &mut String) -> ControlFlow<()>;

    /// Input that no rule accepts. `Continue` makes the engine emit an
    /// `UNEXPECTED` token over the span and resume after it.
    fn unexpected(&mut self, report: &UnexpectedReport) -> ControlFlow<()> {
        let _ = report;
        ControlFlow::Break(())
    }

    /// An operator walk failed before reaching any terminal.
    fn possible_unknown_operator(&mut self, span: Span) {
        let _ = span;
    }

    /// Warning or error text from a literal sub-parser.
    fn literal_message(&mut self, span: Span, message: &str) {
        let _ = (span, message);
    }
}

impl<S: TokenSink + ?Sized> TokenSink for &mut S {
    fn token(&mut self, token: Token, message: &mut String) -> ControlFlow<()> {
        (**self).token(token, message)
    }

    fn unexpected(&mut self, report: &UnexpectedReport) -> ControlFlow<()> {
        (**self).unexpected(report)
    }

    fn possible_unknown_operator(&mut self, span: Span) {
        (**self).possible_unknown_operator(span);
    }

    fn literal_message(&mut self, span: Span, message: &str) {
        (**self).literal_message(span, message);
    }
}

/// Non-token output of a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    Unexpected { span: Span },
    PossibleUnknownOperator { span: Span },
    LiteralMessage { span: Span, message: String },
}

/// Sink that keeps everything.
///
/// Strict by default: the first unexpected input ends the scan. A lenient
/// collector records it and lets the engine emit an `UNEXPECTED` token.
#[derive(Clone, Debug, Default)]
pub struct TokenCollector {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    lenient: bool,
}

impl TokenCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        TokenCollector {
            lenient: true,
            ..Self::default()
        }
    }

    /// Kinds of all collected tokens, in order.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    /// Kinds with whitespace and line terminators dropped.
    pub fn significant_kinds(&self) -> Vec<TokenKind> {
        self.tokens
            .iter()
            .map(|t| t.kind)
            .filter(|k| {
                !matches!(
                    *k,
                    TokenKind::SPACE | TokenKind::TAB | TokenKind::FORM_FEED | TokenKind::LINEFEED
                )
            })
            .collect()
    }
}

impl TokenSink for TokenCollector {
    fn token(&mut self, token: Token, _message: &mut String) -> ControlFlow<()> {
        self.tokens.push(token);
        ControlFlow::Continue(())
    }

    fn unexpected(&mut self, report: &UnexpectedReport) -> ControlFlow<()> {
        self.diagnostics
            .push(Diagnostic::Unexpected { span: report.span });
        if self.lenient {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }

    fn possible_unknown_operator(&mut self, span: Span) {
        self.diagnostics
            .push(Diagnostic::PossibleUnknownOperator { span });
    }

    fn literal_message(&mut self, span: Span, message: &str) {
        self.diagnostics.push(Diagnostic::LiteralMessage {
            span,
            message: message.to_owned(),
        });
    }
}
