//! Token filters.
//!
//! Filters sit between the scanner and the final sink and may drop, merge,
//! rewrite or inject tokens. A [`FilterChain`] is itself a [`TokenSink`], so
//! a scan never knows whether it talks to a chain or a plain sink.
//!
//! The most recently installed filter sees tokens first. Each filter gets the
//! rest of the chain as `next`. Diagnostics bypass the filters and go
//! straight to the final sink.

use std::ops::ControlFlow;

use crate::kind::TokenKind;
use crate::span::{symbol_end, Span};
use crate::token::{Token, TokenData, TokenSink, UnexpectedReport};

/// One stage of a filter chain.
pub trait TokenFilter {
    /// Handle `token`, forwarding whatever should go on to `next`.
    fn token(&mut self, token: Token, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()>;
}

/// Filters in front of a sink.
pub struct FilterChain<S> {
    filters: Vec<Box<dyn TokenFilter + Send>>,
    sink: S,
}

impl<S: TokenSink> FilterChain<S> {
    pub fn new(sink: S) -> Self {
        FilterChain {
            filters: Vec::new(),
            sink,
        }
    }

    /// Add a filter in front of all installed ones.
    pub fn install(&mut self, filter: impl TokenFilter + Send + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S> std::fmt::Debug for FilterChain<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

impl<S: TokenSink> TokenSink for FilterChain<S> {
    fn token(&mut self, token: Token, message: &mut String) -> ControlFlow<()> {
        Downstream {
            filters: &mut self.filters,
            sink: &mut self.sink,
        }
        .token(token, message)
    }

    fn unexpected(&mut self, report: &UnexpectedReport) -> ControlFlow<()> {
        self.sink.unexpected(report)
    }

    fn possible_unknown_operator(&mut self, span: Span) {
        self.sink.possible_unknown_operator(span);
    }

    fn literal_message(&mut self, span: Span, message: &str) {
        self.sink.literal_message(span, message);
    }
}

/// The part of a chain after some filter.
struct Downstream<'a> {
    filters: &'a mut [Box<dyn TokenFilter + Send>],
    sink: &'a mut dyn TokenSink,
}

impl TokenSink for Downstream<'_> {
    fn token(&mut self, token: Token, message: &mut String) -> ControlFlow<()> {
        match self.filters.split_last_mut() {
            Some((filter, rest)) => {
                let mut next = Downstream {
                    filters: rest,
                    sink: &mut *self.sink,
                };
                filter.token(token, message, &mut next)
            }
            None => self.sink.token(token, message),
        }
    }

    fn unexpected(&mut self, report: &UnexpectedReport) -> ControlFlow<()> {
        self.sink.unexpected(report)
    }

    fn possible_unknown_operator(&mut self, span: Span) {
        self.sink.possible_unknown_operator(span);
    }

    fn literal_message(&mut self, span: Span, message: &str) {
        self.sink.literal_message(span, message);
    }
}

// === Stock filters ===

/// Merges a number with an identifier that directly follows it (`12abc`,
/// `1.5f`, `0x1Fu`) into one numeric token. The payload's `suffix_start`
/// marks where the identifier began.
#[derive(Debug, Default)]
pub struct SuffixGlue {
    held: Option<Token>,
}

impl SuffixGlue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenFilter for SuffixGlue {
    fn token(&mut self, token: Token, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()> {
        if let Some(number) = self.held.take() {
            if token.kind == TokenKind::IDENTIFIER && token.span.start == number.span.end {
                let glued = Token {
                    span: number.span.merge(token.span),
                    data: number.data.with_suffix_start(token.span.start),
                    ..number
                };
                return next.token(glued, message);
            }
            next.token(number, message)?;
        }
        if token.kind.is_number() {
            self.held = Some(token);
            return ControlFlow::Continue(());
        }
        next.token(token, message)
    }
}

/// Demotes gated operators to raw symbols unless the mode is active.
///
/// The mode is switched on by the `enter` kind and off by the `exit` kind;
/// both pass through unchanged. Outside the mode a gated token becomes one
/// `RAW_CHAR` per symbol of its spelling. When a line continuation widened
/// the token, the last symbol's span stretches to the token end.
#[derive(Debug)]
pub struct ModeGate {
    enter: TokenKind,
    exit: TokenKind,
    gated: Vec<(TokenKind, Box<[char]>)>,
    active: bool,
}

impl ModeGate {
    /// Gate each `(kind, spelling)` pair.
    pub fn new<'a>(
        enter: TokenKind,
        exit: TokenKind,
        gated: impl IntoIterator<Item = (TokenKind, &'a str)>,
    ) -> Self {
        ModeGate {
            enter,
            exit,
            gated: gated
                .into_iter()
                .map(|(kind, spelling)| (kind, spelling.chars().collect()))
                .collect(),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn spelling(&self, kind: TokenKind) -> Option<&[char]> {
        self.gated
            .iter()
            .find(|(gated, _)| *gated == kind)
            .map(|(_, spelling)| spelling.as_ref())
    }
}

impl TokenFilter for ModeGate {
    fn token(&mut self, token: Token, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()> {
        if token.kind == self.enter {
            self.active = true;
        } else if token.kind == self.exit {
            self.active = false;
        } else if !self.active {
            if let Some(spelling) = self.spelling(token.kind).filter(|s| !s.is_empty()) {
                let mut start = token.span.start;
                for (i, &symbol) in spelling.iter().enumerate() {
                    let end = if i + 1 == spelling.len() {
                        token.span.end
                    } else {
                        symbol_end(symbol, start).min(token.span.end)
                    };
                    let raw = Token::new(TokenKind::RAW_CHAR, Span::new(start, end))
                        .at_line_start(token.at_line_start && i == 0);
                    next.token(raw, message)?;
                    start = end;
                }
                return ControlFlow::Continue(());
            }
        }
        next.token(token, message)
    }
}

/// Brackets lines that start with `marker` (such as `#`) with
/// `DIRECTIVE_ENTER` and `DIRECTIVE_EXIT` control tokens.
///
/// Enter is a point token in front of the marker. Exit is a point token in
/// front of the line terminator (or `FIN`) that ends the directive; spliced
/// lines do not end it.
#[derive(Debug)]
pub struct LineDirective {
    marker: TokenKind,
    active: bool,
}

impl LineDirective {
    pub fn new(marker: TokenKind) -> Self {
        LineDirective {
            marker,
            active: false,
        }
    }
}

impl TokenFilter for LineDirective {
    fn token(&mut self, token: Token, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()> {
        if self.active && matches!(token.kind, TokenKind::LINEFEED | TokenKind::FIN) {
            self.active = false;
            let exit = Token::new(TokenKind::DIRECTIVE_EXIT, Span::point(token.span.start));
            next.token(exit, message)?;
        } else if !self.active && token.kind == self.marker && token.at_line_start {
            self.active = true;
            let enter = Token::new(TokenKind::DIRECTIVE_ENTER, Span::point(token.span.start))
                .at_line_start(true);
            next.token(enter, message)?;
        }
        next.token(token, message)
    }
}

/// Replaces an adjacent run of exactly `pattern` kinds with one `compound`
/// token spanning the run.
///
/// A mismatch flushes the held tokens and only the current token may start a
/// new run. Held tokens are not re-tried, so with a repeated leading kind
/// (`[A, A, B]` over `A A A B`) the overlapping match is missed.
#[derive(Debug)]
pub struct SequenceComposer {
    pattern: Vec<TokenKind>,
    compound: TokenKind,
    held: Vec<Token>,
}

impl SequenceComposer {
    pub fn new(pattern: impl IntoIterator<Item = TokenKind>, compound: TokenKind) -> Self {
        SequenceComposer {
            pattern: pattern.into_iter().collect(),
            compound,
            held: Vec::new(),
        }
    }

    fn extends_run(&self, token: &Token) -> bool {
        let Some(&expected) = self.pattern.get(self.held.len()) else {
            return false;
        };
        if token.kind != expected || token.kind.is_control() {
            return false;
        }
        self.held
            .last()
            .map_or(true, |last| last.span.end == token.span.start)
    }

    fn flush(&mut self, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()> {
        for token in self.held.drain(..) {
            next.token(token, message)?;
        }
        ControlFlow::Continue(())
    }
}

impl TokenFilter for SequenceComposer {
    fn token(&mut self, token: Token, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()> {
        if !self.held.is_empty() && !self.extends_run(&token) {
            self.flush(message, next)?;
        }
        if !self.extends_run(&token) {
            return next.token(token, message);
        }
        self.held.push(token);
        if self.held.len() < self.pattern.len() {
            return ControlFlow::Continue(());
        }
        let Some(first) = self.held.first() else {
            return ControlFlow::Continue(());
        };
        let span = self
            .held
            .iter()
            .fold(first.span, |span, t| span.merge(t.span));
        let compound = Token {
            at_line_start: first.at_line_start,
            kind: self.compound,
            span,
            data: TokenData::Empty,
        };
        self.held.clear();
        next.token(compound, message)
    }
}

#[cfg(test)]
mod tests;
