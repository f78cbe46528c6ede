//! The scan state machine.
//!
//! The engine is fed one `(symbol, position)` pair at a time. Each step
//! either extends the pending token or finishes it, hands it to the sink,
//! and dispatches the same symbol again from `Initial`. Lookahead is
//! never more than one symbol: where a decision needs more, the pending
//! symbols are kept and re-fed once the decision is made.
//!
//! # Dispatch order in `Initial`
//!
//! line continuation, line terminator, whitespace, literal prefix, `.` before
//! a digit, digit (numeric prefix trie, then default base), identifier start,
//! bracket, operator, escape, stray punctuation, unexpected.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use bitflags::bitflags;
use smallvec::SmallVec;
use tracing::trace;

use crate::char_class::{CharClass, CharClassTable};
use crate::error::ScanError;
use crate::kind::TokenKind;
use crate::literal::{LiteralParser, LiteralParserId, LiteralSignal};
use crate::number::{digit_value, NumberAccumulator};
use crate::profile::Profile;
use crate::span::{symbol_end, Span};
use crate::token::{Token, TokenData, TokenSink, UnexpectedReport};
use crate::trie::NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Initial,
    /// Run of one whitespace symbol, or a `\r` waiting for `\n`.
    ReadingWhitespace { symbol: char },
    ReadingIdentifier,
    /// Walking the numeric prefix trie; symbols are in `pending`.
    ReadingNumberPrefix { node: NodeId },
    ReadingNumber,
    /// Saw `.` at `dot`; a digit makes it a float.
    ReadingNumberMaybeFloat { dot: u32, has_integer: bool },
    ReadingFloatNumber,
    /// Walking the operator trie; symbols are in `pending`.
    ReadingOperator { node: NodeId },
    ReadingSingleLineComment,
    /// `matched` symbols of the close marker seen.
    ReadingMultiLineComment { matched: usize },
    /// `Some` while the prefix is still being walked, `None` inside content.
    ReadingStringLiteral { prefix: Option<NodeId> },
    AwaitingLineContinuationNewline,
}

/// Public view of the machine state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    Initial,
    ReadingWhitespace,
    ReadingIdentifier,
    ReadingNumberPrefix,
    ReadingNumber,
    ReadingNumberMaybeFloat,
    ReadingFloatNumber,
    ReadingOperator,
    ReadingSingleLineComment,
    ReadingMultiLineComment,
    ReadingStringLiteral,
    AwaitingLineContinuationNewline,
}

impl State {
    fn kind(self) -> StateKind {
        match self {
            State::Initial => StateKind::Initial,
            State::ReadingWhitespace { .. } => StateKind::ReadingWhitespace,
            State::ReadingIdentifier => StateKind::ReadingIdentifier,
            State::ReadingNumberPrefix { .. } => StateKind::ReadingNumberPrefix,
            State::ReadingNumber => StateKind::ReadingNumber,
            State::ReadingNumberMaybeFloat { .. } => StateKind::ReadingNumberMaybeFloat,
            State::ReadingFloatNumber => StateKind::ReadingFloatNumber,
            State::ReadingOperator { .. } => StateKind::ReadingOperator,
            State::ReadingSingleLineComment => StateKind::ReadingSingleLineComment,
            State::ReadingMultiLineComment { .. } => StateKind::ReadingMultiLineComment,
            State::ReadingStringLiteral { .. } => StateKind::ReadingStringLiteral,
            State::AwaitingLineContinuationNewline => StateKind::AwaitingLineContinuationNewline,
        }
    }
}

bitflags! {
    /// Rules to skip when a symbol is dispatched again.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    struct Dispatch: u8 {
        /// A literal prefix walk already failed on this symbol.
        const NO_LITERAL_PREFIX = 1 << 0;
        /// This `.` was not followed by a digit.
        const NO_DOT_NUMBER = 1 << 1;
        /// This escape was not followed by a line terminator.
        const NO_CONTINUATION = 1 << 2;
    }
}

/// Escape seen; waiting to know if a line terminator follows.
#[derive(Copy, Clone, Debug)]
struct Continuation {
    resume: State,
    escape: char,
    escape_pos: u32,
    /// Position of a `\r` that may be followed by `\n`.
    cr: Option<u32>,
}

/// Mutable scanning state, one per scan.
///
/// A state is tied to the profile that created it (parser slots are sized
/// for that profile's literal registry). After a step returns an error the
/// state is unspecified until [`ScanState::init`].
pub struct ScanState {
    state: State,
    token_start: u32,
    line_start: bool,
    number: NumberAccumulator,
    pending: SmallVec<[(char, u32); 8]>,
    /// Last terminal node of the operator or literal prefix walk and how
    /// many pending symbols it covers.
    last_terminal: Option<(NodeId, usize)>,
    text: String,
    comment_newline: bool,
    literal: Option<(LiteralParserId, TokenKind)>,
    parsers: Vec<Option<Box<dyn LiteralParser>>>,
    continuation: Option<Continuation>,
    /// Private class table after a runtime edit.
    classes: Option<Box<CharClassTable>>,
    message: String,
}

impl ScanState {
    pub fn new() -> Self {
        ScanState {
            state: State::Initial,
            token_start: 0,
            line_start: true,
            number: NumberAccumulator::default(),
            pending: SmallVec::new(),
            last_terminal: None,
            text: String::new(),
            comment_newline: false,
            literal: None,
            parsers: Vec::new(),
            continuation: None,
            classes: None,
            message: String::new(),
        }
    }

    /// Reset to the start of a document.
    ///
    /// Literal parser instances and a private class table survive.
    pub fn init(&mut self) {
        self.state = State::Initial;
        self.token_start = 0;
        self.line_start = true;
        self.number = NumberAccumulator::default();
        self.pending.clear();
        self.last_terminal = None;
        self.text.clear();
        self.comment_newline = false;
        self.literal = None;
        self.continuation = None;
        self.message.clear();
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Whether no non-trivia token was emitted on the current line yet.
    pub fn at_line_start(&self) -> bool {
        self.line_start
    }

    /// Start offset of the pending token.
    pub fn token_start(&self) -> u32 {
        self.token_start
    }

    /// Give this state its own copy of the profile's class table and change
    /// `symbol` in it. The shared profile is untouched.
    pub fn set_char_class(&mut self, profile: &Profile, symbol: char, class: CharClass) {
        self.classes
            .get_or_insert_with(|| Box::new(profile.classes.clone()))
            .set(symbol, class);
    }

    /// Drop a private class table created by [`ScanState::set_char_class`].
    pub fn reset_char_classes(&mut self) {
        self.classes = None;
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanState")
            .field("state", &self.state)
            .field("token_start", &self.token_start)
            .field("line_start", &self.line_start)
            .field("pending", &self.pending)
            .field("literal", &self.literal)
            .field("continuation", &self.continuation)
            .field("private_classes", &self.classes.is_some())
            .field(
                "parsers",
                &self.parsers.iter().filter(|p| p.is_some()).count(),
            )
            .finish_non_exhaustive()
    }
}

impl Profile {
    /// Fresh state for scanning with this profile.
    #[allow(
        clippy::unused_self,
        reason = "states are requested from the profile they will scan with"
    )]
    pub fn new_state(&self) -> ScanState {
        ScanState::new()
    }

    /// Feed one symbol at byte offset `position`.
    ///
    /// Positions must increase with every step. Spans ending past
    /// `u32::MAX` are clamped there.
    pub fn step<S: TokenSink + ?Sized>(
        &self,
        state: &mut ScanState,
        symbol: char,
        position: u32,
        sink: &mut S,
    ) -> Result<(), ScanError> {
        Machine {
            profile: self,
            st: state,
            sink,
        }
        .feed(symbol, position, Dispatch::empty())
    }

    /// Flush the pending token and emit `FIN` at `end`.
    pub fn finalize<S: TokenSink + ?Sized>(
        &self,
        state: &mut ScanState,
        end: u32,
        sink: &mut S,
    ) -> Result<(), ScanError> {
        let mut machine = Machine {
            profile: self,
            st: state,
            sink,
        };
        machine.flush(end)?;
        machine.emit(TokenKind::FIN, Span::point(end), TokenData::Empty)
    }

    /// Scan a whole string: init, step every symbol, finalize.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets are below the length checked to fit u32"
    )]
    pub fn tokenize<S: TokenSink + ?Sized>(
        &self,
        state: &mut ScanState,
        source: &str,
        sink: &mut S,
    ) -> Result<(), ScanError> {
        let end = u32::try_from(source.len())
            .map_err(|_| ScanError::SourceTooLarge { len: source.len() })?;
        state.init();
        for (offset, symbol) in source.char_indices() {
            self.step(state, symbol, offset as u32, sink)?;
        }
        self.finalize(state, end, sink)
    }
}

/// A scan state bound to a shared profile.
#[derive(Debug)]
pub struct Tokenizer {
    profile: Arc<Profile>,
    state: ScanState,
}

impl Tokenizer {
    pub fn new(profile: Arc<Profile>) -> Self {
        let state = profile.new_state();
        Tokenizer { profile, state }
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn init(&mut self) {
        self.state.init();
    }

    pub fn step<S: TokenSink + ?Sized>(
        &mut self,
        symbol: char,
        position: u32,
        sink: &mut S,
    ) -> Result<(), ScanError> {
        self.profile.step(&mut self.state, symbol, position, sink)
    }

    pub fn finalize<S: TokenSink + ?Sized>(&mut self, end: u32, sink: &mut S) -> Result<(), ScanError> {
        self.profile.finalize(&mut self.state, end, sink)
    }

    pub fn tokenize<S: TokenSink + ?Sized>(&mut self, source: &str, sink: &mut S) -> Result<(), ScanError> {
        self.profile.tokenize(&mut self.state, source, sink)
    }

    /// Change one symbol's class for this tokenizer only.
    pub fn set_char_class(&mut self, symbol: char, class: CharClass) {
        self.state.set_char_class(&self.profile, symbol, class);
    }
}

/// One step's worth of borrowed context.
struct Machine<'a, S: ?Sized> {
    profile: &'a Profile,
    st: &'a mut ScanState,
    sink: &'a mut S,
}

impl<S: TokenSink + ?Sized> Machine<'_, S> {
    #[inline]
    fn classify(&self, symbol: char) -> CharClass {
        match &self.st.classes {
            Some(table) => table.classify(symbol),
            None => self.profile.classes.classify(symbol),
        }
    }

    fn enter(&mut self, state: State) {
        if self.st.state != state {
            trace!(from = ?self.st.state, to = ?state, "state");
        }
        self.st.state = state;
    }

    fn continuation_applies(&self, class: CharClass, flags: Dispatch) -> bool {
        class.contains(CharClass::ESCAPE)
            && self.profile.options.honor_line_continuation
            && !flags.contains(Dispatch::NO_CONTINUATION)
    }

    fn feed(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        match self.st.state {
            State::Initial => self.initial(symbol, pos, flags),
            State::ReadingWhitespace { symbol: run } => self.whitespace(run, symbol, pos, flags),
            State::ReadingIdentifier => self.identifier(symbol, pos, flags),
            State::ReadingNumberPrefix { node } => self.number_prefix(node, symbol, pos, flags),
            State::ReadingNumber => self.number(symbol, pos, flags),
            State::ReadingNumberMaybeFloat { dot, has_integer } => {
                self.maybe_float(dot, has_integer, symbol, pos, flags)
            }
            State::ReadingFloatNumber => self.float(symbol, pos, flags),
            State::ReadingOperator { node } => self.operator(node, symbol, pos, flags),
            State::ReadingSingleLineComment => self.single_line_comment(symbol, pos, flags),
            State::ReadingMultiLineComment { matched } => {
                self.multi_line_comment(matched, symbol, pos)
            }
            State::ReadingStringLiteral { prefix: Some(node) } => {
                self.literal_prefix(node, symbol, pos, flags)
            }
            State::ReadingStringLiteral { prefix: None } => self.literal_content(symbol, pos),
            State::AwaitingLineContinuationNewline => self.awaiting_newline(symbol, pos, flags),
        }
    }

    fn refeed<I>(&mut self, symbols: I, first: Dispatch) -> Result<(), ScanError>
    where
        I: IntoIterator<Item = (char, u32)>,
    {
        for (i, (symbol, pos)) in symbols.into_iter().enumerate() {
            let flags = if i == 0 { first } else { Dispatch::empty() };
            self.feed(symbol, pos, flags)?;
        }
        Ok(())
    }

    // === Emission ===

    fn emit(&mut self, kind: TokenKind, span: Span, data: TokenData) -> Result<(), ScanError> {
        let at_line_start = self.st.line_start;
        if kind == TokenKind::LINEFEED {
            self.st.line_start = true;
        } else if !kind.is_trivia() {
            self.st.line_start = false;
        }
        trace!(%kind, start = span.start, end = span.end, at_line_start, "token");
        let token = Token {
            at_line_start,
            kind,
            span,
            data,
        };
        self.st.message.clear();
        match self.sink.token(token, &mut self.st.message) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(ScanError::Aborted {
                span,
                message: std::mem::take(&mut self.st.message),
            }),
        }
    }

    /// Emit the pending token as `kind` ending at `end` and return to `Initial`.
    fn finish(&mut self, kind: TokenKind, end: u32, data: TokenData) -> Result<(), ScanError> {
        self.enter(State::Initial);
        let span = Span::new(self.st.token_start, end);
        self.emit(kind, span, data)
    }

    fn finish_number(&mut self, end: u32) -> Result<(), ScanError> {
        let kind = self.st.number.kind();
        let data = self.st.number.finish(end);
        self.finish(kind, end, data)
    }

    /// Report unexpected input; on `Continue` it becomes an `UNEXPECTED` token.
    #[track_caller]
    fn unexpected(&mut self, span: Span) -> Result<(), ScanError> {
        self.enter(State::Initial);
        let report = UnexpectedReport::here(span);
        trace!(start = span.start, end = span.end, origin = %report.origin, "unexpected");
        match self.sink.unexpected(&report) {
            ControlFlow::Continue(()) => self.emit(TokenKind::UNEXPECTED, span, TokenData::Empty),
            ControlFlow::Break(()) => Err(ScanError::Unexpected { span }),
        }
    }

    fn pending_span(&self) -> Option<Span> {
        let (_, first) = *self.st.pending.first()?;
        let &(last_symbol, last) = self.st.pending.last()?;
        Some(Span::new(first, symbol_end(last_symbol, last)))
    }

    // === States ===

    fn initial(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        let class = self.classify(symbol);
        let profile = self.profile;
        self.st.token_start = pos;

        if self.continuation_applies(class, flags) {
            return self.begin_continuation(State::Initial, symbol, pos);
        }
        if class.contains(CharClass::LINEFEED) {
            if symbol == '\r' {
                self.enter(State::ReadingWhitespace { symbol });
                return Ok(());
            }
            return self.emit(TokenKind::LINEFEED, Span::of_symbol(symbol, pos), TokenData::Empty);
        }
        if class.contains(CharClass::WHITESPACE) {
            self.enter(State::ReadingWhitespace { symbol });
            return Ok(());
        }
        if class.contains(CharClass::STRING_LITERAL_PREFIX)
            && !flags.contains(Dispatch::NO_LITERAL_PREFIX)
        {
            if let Some(node) = profile.literals.advance(None, symbol) {
                self.st.pending.clear();
                self.st.pending.push((symbol, pos));
                self.st.last_terminal = None;
                return self.literal_prefix_reached(node);
            }
        }
        if symbol == '.' && !flags.contains(Dispatch::NO_DOT_NUMBER) {
            self.st.number.begin(profile.default_number);
            self.enter(State::ReadingNumberMaybeFloat {
                dot: pos,
                has_integer: false,
            });
            return Ok(());
        }
        if class.contains(CharClass::DIGIT) {
            if let Some(node) = profile.number_prefixes.advance(None, symbol) {
                self.st.pending.clear();
                self.st.pending.push((symbol, pos));
                self.enter(State::ReadingNumberPrefix { node });
                return Ok(());
            }
            if let Some(digit) = digit_value(symbol, profile.options.default_numeric_base) {
                self.st.number.begin(profile.default_number);
                self.st.number.push_digit(digit);
                self.enter(State::ReadingNumber);
                return Ok(());
            }
        }
        if class.contains(CharClass::IDENTIFIER_FIRST) {
            self.enter(State::ReadingIdentifier);
            return Ok(());
        }
        if class.intersects(CharClass::OPEN | CharClass::CLOSE) {
            if let Some(kind) = profile
                .brackets
                .advance(None, symbol)
                .and_then(|node| profile.brackets.kind(node))
            {
                return self.emit(kind, Span::of_symbol(symbol, pos), TokenData::Empty);
            }
        }
        if class.contains(CharClass::OPERATOR) {
            if let Some(node) = profile.operators.advance(None, symbol) {
                self.st.pending.clear();
                self.st.pending.push((symbol, pos));
                self.st.last_terminal = None;
                return self.operator_reached(node);
            }
        }
        if class.contains(CharClass::ESCAPE) {
            return self.emit(TokenKind::ESCAPE, Span::of_symbol(symbol, pos), TokenData::Empty);
        }
        if class.contains(CharClass::STRAY_PUNCT) {
            return self.emit(
                TokenKind::STRAY_PUNCT,
                Span::of_symbol(symbol, pos),
                TokenData::Empty,
            );
        }
        self.unexpected(Span::of_symbol(symbol, pos))
    }

    fn whitespace(&mut self, run: char, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        if run == '\r' {
            if symbol == '\n' {
                return self.finish(TokenKind::LINEFEED, symbol_end(symbol, pos), TokenData::Empty);
            }
            self.finish(TokenKind::LINEFEED, pos, TokenData::Empty)?;
            return self.feed(symbol, pos, flags);
        }
        if symbol == run {
            return Ok(());
        }
        self.finish(whitespace_kind(run), pos, TokenData::Empty)?;
        self.feed(symbol, pos, flags)
    }

    fn identifier(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        let class = self.classify(symbol);
        if self.continuation_applies(class, flags) {
            return self.begin_continuation(State::ReadingIdentifier, symbol, pos);
        }
        if class.contains(CharClass::IDENTIFIER) {
            return Ok(());
        }
        self.finish(TokenKind::IDENTIFIER, pos, TokenData::Empty)?;
        self.feed(symbol, pos, flags)
    }

    // === Numbers ===

    fn number_prefix(&mut self, node: NodeId, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        if let Some(next) = self.profile.number_prefixes.advance(Some(node), symbol) {
            self.st.pending.push((symbol, pos));
            self.enter(State::ReadingNumberPrefix { node: next });
            return Ok(());
        }
        self.resolve_number_prefix(node, Some((symbol, pos)), flags)
    }

    /// Decide what a stuck numeric prefix walk was.
    fn resolve_number_prefix(
        &mut self,
        node: NodeId,
        next: Option<(char, u32)>,
        flags: Dispatch,
    ) -> Result<(), ScanError> {
        let profile = self.profile;
        let prefix_kind = profile.number_prefixes.kind(node);
        let default_base = profile.options.default_numeric_base;
        let separator = profile.options.separator();
        let Some(span) = self.pending_span() else {
            self.enter(State::Initial);
            return self.refeed(next, flags);
        };

        // Prefix complete and a digit of its base follows. A separator only
        // counts when the prefix stands as a number on its own.
        if let (Some(kind), Some((symbol, _))) = (prefix_kind, next) {
            let base = kind.number_base().unwrap_or(default_base);
            if digit_value(symbol, base).is_some()
                || (Some(symbol) == separator && kind.allows_missing_digits())
            {
                self.st.number.begin(kind);
                self.st.pending.clear();
                self.enter(State::ReadingNumber);
                return self.refeed(next, flags);
            }
        }

        let all_default_digits = self
            .st
            .pending
            .iter()
            .all(|&(c, _)| digit_value(c, default_base).is_some());

        // Prefix symbols were plain digits and the number goes on.
        if let (true, Some((symbol, _))) = (all_default_digits, next) {
            if digit_value(symbol, default_base).is_some()
                || symbol == '.'
                || Some(symbol) == separator
            {
                self.take_pending_as_default_number();
                self.enter(State::ReadingNumber);
                return self.refeed(next, flags);
            }
        }

        if let Some(kind) = prefix_kind.filter(|k| k.allows_missing_digits()) {
            self.st.number.begin(kind);
            self.st.pending.clear();
            self.finish_number(span.end)?;
            return self.refeed(next, flags);
        }

        if all_default_digits {
            self.take_pending_as_default_number();
            self.finish_number(span.end)?;
            return self.refeed(next, flags);
        }

        self.st.pending.clear();
        self.unexpected(span)?;
        self.refeed(next, flags)
    }

    fn take_pending_as_default_number(&mut self) {
        let base = self.profile.options.default_numeric_base;
        self.st.number.begin(self.profile.default_number);
        for (symbol, _) in std::mem::take(&mut self.st.pending) {
            if let Some(digit) = digit_value(symbol, base) {
                self.st.number.push_digit(digit);
            }
        }
    }

    fn number(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        if let Some(digit) = digit_value(symbol, self.st.number.base()) {
            self.st.number.push_digit(digit);
            return Ok(());
        }
        if Some(symbol) == self.profile.options.separator() {
            return Ok(());
        }
        if symbol == '.' {
            self.enter(State::ReadingNumberMaybeFloat {
                dot: pos,
                has_integer: true,
            });
            return Ok(());
        }
        self.finish_number(pos)?;
        self.feed(symbol, pos, flags)
    }

    fn maybe_float(
        &mut self,
        dot: u32,
        has_integer: bool,
        symbol: char,
        pos: u32,
        flags: Dispatch,
    ) -> Result<(), ScanError> {
        if let Some(digit) = digit_value(symbol, self.st.number.base()) {
            self.st.number.start_fraction();
            self.st.number.push_fraction_digit(digit);
            self.enter(State::ReadingFloatNumber);
            return Ok(());
        }
        self.dot_was_not_a_fraction(dot, has_integer)?;
        self.feed(symbol, pos, flags)
    }

    /// Emit the integer before a `.` (if any) and dispatch the `.` again.
    fn dot_was_not_a_fraction(&mut self, dot: u32, has_integer: bool) -> Result<(), ScanError> {
        if has_integer {
            self.finish_number(dot)?;
        } else {
            self.enter(State::Initial);
        }
        self.feed('.', dot, Dispatch::NO_DOT_NUMBER)
    }

    fn float(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        if let Some(digit) = digit_value(symbol, self.st.number.base()) {
            self.st.number.push_fraction_digit(digit);
            return Ok(());
        }
        if Some(symbol) == self.profile.options.separator() {
            return Ok(());
        }
        self.finish_number(pos)?;
        self.feed(symbol, pos, flags)
    }

    // === Operators and comments ===

    /// The operator walk reached `node` with the symbol already pending.
    fn operator_reached(&mut self, node: NodeId) -> Result<(), ScanError> {
        let profile = self.profile;
        let operators = &profile.operators;
        if operators.kind(node).is_some() {
            self.st.last_terminal = Some((node, self.st.pending.len()));
        }
        if !operators.has_children(node) {
            return self.finish_operator(node, self.st.pending.len(), None);
        }
        self.enter(State::ReadingOperator { node });
        Ok(())
    }

    fn operator(&mut self, node: NodeId, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        let class = self.classify(symbol);
        if self.continuation_applies(class, flags) {
            return self.begin_continuation(State::ReadingOperator { node }, symbol, pos);
        }
        if let Some(next) = self.profile.operators.advance(Some(node), symbol) {
            self.st.pending.push((symbol, pos));
            return self.operator_reached(next);
        }
        self.operator_stuck(Some(pos))?;
        self.feed(symbol, pos, flags)
    }

    /// The walk cannot go on: fall back to the longest terminal seen.
    ///
    /// `stop` is where the next token starts, if known; symbols absorbed by
    /// a line continuation up to there stay inside the operator.
    fn operator_stuck(&mut self, stop: Option<u32>) -> Result<(), ScanError> {
        if let Some((node, count)) = self.st.last_terminal {
            return self.finish_operator(node, count, stop);
        }
        let Some(span) = self.pending_span() else {
            self.enter(State::Initial);
            return Ok(());
        };
        self.sink.possible_unknown_operator(span);
        let symbols = std::mem::take(&mut self.st.pending);
        let Some((&(first, first_pos), rest)) = symbols.split_first() else {
            self.enter(State::Initial);
            return Ok(());
        };
        let end = rest
            .first()
            .map(|&(_, p)| p)
            .or(stop)
            .unwrap_or_else(|| symbol_end(first, first_pos));
        self.unexpected(Span::new(first_pos, end))?;
        self.refeed(rest.iter().copied(), Dispatch::empty())
    }

    /// Emit the operator ending at `node`, covering `count` pending symbols,
    /// and re-feed the symbols after it.
    fn finish_operator(&mut self, node: NodeId, count: usize, stop: Option<u32>) -> Result<(), ScanError> {
        let profile = self.profile;
        let leftover: SmallVec<[(char, u32); 8]> = self.st.pending.drain(count..).collect();
        let last_end = self
            .st
            .pending
            .last()
            .map_or(self.st.token_start, |&(c, p)| symbol_end(c, p));
        let end = leftover
            .first()
            .map(|&(_, p)| p)
            .or(stop)
            .unwrap_or(last_end);
        self.st.pending.clear();
        self.st.last_terminal = None;

        let kind = profile.operators.kind(node).unwrap_or(TokenKind::UNEXPECTED);
        match kind {
            TokenKind::COMMENT_SINGLE_LINE => {
                let demoted = profile.options.single_line_comment_only_at_line_start
                    && !self.st.line_start;
                match profile.comment_fallback(node) {
                    Some(fallback) if demoted => {
                        self.finish(fallback, end, TokenData::Empty)?;
                    }
                    _ => {
                        self.st.text.clear();
                        self.enter(State::ReadingSingleLineComment);
                    }
                }
            }
            TokenKind::COMMENT_MULTI_LINE => {
                self.st.text.clear();
                self.st.comment_newline = false;
                self.enter(State::ReadingMultiLineComment { matched: 0 });
            }
            kind => self.finish(kind, end, TokenData::Empty)?,
        }
        self.refeed(leftover, Dispatch::empty())
    }

    fn single_line_comment(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        let class = self.classify(symbol);
        if self.continuation_applies(class, flags) {
            return self.begin_continuation(State::ReadingSingleLineComment, symbol, pos);
        }
        if class.contains(CharClass::LINEFEED) {
            let text = std::mem::take(&mut self.st.text);
            self.finish(TokenKind::COMMENT_SINGLE_LINE, pos, TokenData::Comment(text))?;
            return self.feed(symbol, pos, flags);
        }
        self.st.text.push(symbol);
        Ok(())
    }

    fn multi_line_comment(&mut self, matched: usize, symbol: char, pos: u32) -> Result<(), ScanError> {
        let profile = self.profile;
        let close = &profile.multi_line_end;
        // Restart from zero on mismatch, re-checking this symbol.
        let matched = if close.get(matched) == Some(&symbol) {
            matched + 1
        } else if close.first() == Some(&symbol) {
            1
        } else {
            0
        };
        self.st.text.push(symbol);
        if self.classify(symbol).contains(CharClass::LINEFEED) {
            self.st.comment_newline = true;
        }
        if matched < close.len() {
            self.st.state = State::ReadingMultiLineComment { matched };
            return Ok(());
        }

        let marker_len: usize = close.iter().map(|c| c.len_utf8()).sum();
        let mut text = std::mem::take(&mut self.st.text);
        text.truncate(text.len().saturating_sub(marker_len));
        self.finish(
            TokenKind::COMMENT_MULTI_LINE,
            symbol_end(symbol, pos),
            TokenData::Comment(text),
        )?;
        if self.st.comment_newline {
            self.st.line_start = true;
        }
        Ok(())
    }

    // === Line continuation ===

    fn begin_continuation(&mut self, resume: State, escape: char, pos: u32) -> Result<(), ScanError> {
        self.st.continuation = Some(Continuation {
            resume,
            escape,
            escape_pos: pos,
            cr: None,
        });
        self.enter(State::AwaitingLineContinuationNewline);
        Ok(())
    }

    fn awaiting_newline(&mut self, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        let Some(mut continuation) = self.st.continuation else {
            self.enter(State::Initial);
            return self.feed(symbol, pos, flags);
        };
        if symbol == '\n' {
            return self.complete_continuation(continuation, symbol_end(symbol, pos));
        }
        if symbol == '\r' && continuation.cr.is_none() {
            continuation.cr = Some(pos);
            self.st.continuation = Some(continuation);
            return Ok(());
        }
        if let Some(cr) = continuation.cr {
            self.complete_continuation(continuation, symbol_end('\r', cr))?;
            return self.feed(symbol, pos, flags);
        }
        self.abandon_continuation(continuation)?;
        self.feed(symbol, pos, flags)
    }

    /// Escape + terminator seen. Emitted from `Initial`, absorbed otherwise.
    fn complete_continuation(&mut self, continuation: Continuation, end: u32) -> Result<(), ScanError> {
        self.st.continuation = None;
        self.enter(continuation.resume);
        if continuation.resume == State::Initial {
            let span = Span::new(continuation.escape_pos, end);
            return self.emit(TokenKind::LINE_CONTINUATION, span, TokenData::Empty);
        }
        Ok(())
    }

    /// No terminator after the escape: resume and treat it as a plain symbol.
    fn abandon_continuation(&mut self, continuation: Continuation) -> Result<(), ScanError> {
        self.st.continuation = None;
        self.enter(continuation.resume);
        self.feed(
            continuation.escape,
            continuation.escape_pos,
            Dispatch::NO_CONTINUATION,
        )
    }

    // === Literals ===

    /// The literal prefix walk reached `node` with the symbol already pending.
    fn literal_prefix_reached(&mut self, node: NodeId) -> Result<(), ScanError> {
        let profile = self.profile;
        let literals = &profile.literals;
        if literals.kind(node).is_some() {
            if !literals.has_children(node) {
                return self.start_literal(node);
            }
            self.st.last_terminal = Some((node, self.st.pending.len()));
        }
        self.enter(State::ReadingStringLiteral { prefix: Some(node) });
        Ok(())
    }

    fn literal_prefix(&mut self, node: NodeId, symbol: char, pos: u32, flags: Dispatch) -> Result<(), ScanError> {
        let profile = self.profile;
        let literals = &profile.literals;
        if let Some(next) = literals.advance(Some(node), symbol) {
            self.st.pending.push((symbol, pos));
            return self.literal_prefix_reached(next);
        }
        self.literal_prefix_stuck()?;
        self.feed(symbol, pos, flags)
    }

    /// The prefix walk cannot go on: open the longest complete prefix seen
    /// and hand the symbols after it to its parser, or re-feed everything
    /// with literal detection off when no prefix was complete.
    fn literal_prefix_stuck(&mut self) -> Result<(), ScanError> {
        let Some((node, count)) = self.st.last_terminal.take() else {
            let symbols = std::mem::take(&mut self.st.pending);
            self.enter(State::Initial);
            return self.refeed(symbols, Dispatch::NO_LITERAL_PREFIX);
        };
        let leftover: SmallVec<[(char, u32); 8]> = self.st.pending.drain(count..).collect();
        self.start_literal(node)?;
        self.refeed(leftover, Dispatch::empty())
    }

    fn start_literal(&mut self, node: NodeId) -> Result<(), ScanError> {
        let profile = self.profile;
        let kind = profile.literals.kind(node).unwrap_or(TokenKind::UNEXPECTED);
        let end = self.pending_span().map_or(self.st.token_start, |s| s.end);
        self.st.pending.clear();
        let Some(id) = profile.literals.payload(node) else {
            return self.finish(kind, end, TokenData::Empty);
        };
        let slot = id.index();
        if self.st.parsers.len() <= slot {
            self.st.parsers.resize_with(slot + 1, || None);
        }
        if self.st.parsers[slot].is_none() {
            self.st.parsers[slot] = profile.literal_parsers.instantiate(id);
        }
        let Some(parser) = self.st.parsers[slot].as_mut() else {
            return self.finish(kind, end, TokenData::Empty);
        };
        parser.reset();
        self.st.literal = Some((id, kind));
        self.enter(State::ReadingStringLiteral { prefix: None });
        Ok(())
    }

    fn active_parser(&mut self) -> Option<(&mut Box<dyn LiteralParser>, TokenKind)> {
        let (id, kind) = self.st.literal?;
        let parser = self.st.parsers.get_mut(id.index())?.as_mut()?;
        Some((parser, kind))
    }

    fn literal_content(&mut self, symbol: char, pos: u32) -> Result<(), ScanError> {
        let Some((parser, kind)) = self.active_parser() else {
            self.enter(State::Initial);
            return self.feed(symbol, pos, Dispatch::empty());
        };
        let signal = parser.parse_symbol(symbol);
        let end = symbol_end(symbol, pos);
        let span = Span::new(self.st.token_start, end);
        match signal {
            LiteralSignal::Continue => Ok(()),
            LiteralSignal::ContinueWithWarning(message) => {
                self.sink.literal_message(span, &message);
                Ok(())
            }
            LiteralSignal::StopOk => self.finish_literal(kind, end),
            LiteralSignal::StopWithWarning(message) => {
                self.sink.literal_message(span, &message);
                self.finish_literal(kind, end)
            }
            LiteralSignal::Error(message) => {
                // A terminator stays outside the failed literal.
                if self.classify(symbol).contains(CharClass::LINEFEED) {
                    self.literal_failed(Span::new(self.st.token_start, pos), message)?;
                    self.feed(symbol, pos, Dispatch::empty())
                } else {
                    self.literal_failed(span, message)
                }
            }
        }
    }

    fn finish_literal(&mut self, kind: TokenKind, end: u32) -> Result<(), ScanError> {
        let decoded = self
            .active_parser()
            .map(|(parser, _)| parser.take_decoded())
            .unwrap_or_default();
        self.st.literal = None;
        self.finish(kind, end, TokenData::Literal(decoded))
    }

    #[track_caller]
    fn literal_failed(&mut self, span: Span, message: String) -> Result<(), ScanError> {
        self.st.literal = None;
        self.sink.literal_message(span, &message);
        match self.unexpected(span) {
            Err(ScanError::Unexpected { span }) => Err(ScanError::Literal { span, message }),
            other => other,
        }
    }

    // === End of input ===

    /// Flush whatever is pending until the machine is back in `Initial`.
    fn flush(&mut self, end: u32) -> Result<(), ScanError> {
        loop {
            match self.st.state {
                State::Initial => return Ok(()),
                State::ReadingWhitespace { symbol } => {
                    let kind = if symbol == '\r' {
                        TokenKind::LINEFEED
                    } else {
                        whitespace_kind(symbol)
                    };
                    self.finish(kind, end, TokenData::Empty)?;
                }
                State::ReadingIdentifier => {
                    self.finish(TokenKind::IDENTIFIER, end, TokenData::Empty)?;
                }
                State::ReadingNumberPrefix { node } => {
                    self.resolve_number_prefix(node, None, Dispatch::empty())?;
                }
                State::ReadingNumber | State::ReadingFloatNumber => self.finish_number(end)?,
                State::ReadingNumberMaybeFloat { dot, has_integer } => {
                    self.dot_was_not_a_fraction(dot, has_integer)?;
                }
                State::ReadingOperator { .. } => self.operator_stuck(Some(end))?,
                State::ReadingSingleLineComment => {
                    let text = std::mem::take(&mut self.st.text);
                    self.finish(TokenKind::COMMENT_SINGLE_LINE, end, TokenData::Comment(text))?;
                }
                State::ReadingMultiLineComment { .. } => {
                    self.st.text.clear();
                    self.unexpected(Span::new(self.st.token_start, end))?;
                }
                State::ReadingStringLiteral { prefix: Some(_) } => self.literal_prefix_stuck()?,
                State::ReadingStringLiteral { prefix: None } => self.literal_at_end(end)?,
                State::AwaitingLineContinuationNewline => match self.st.continuation {
                    Some(continuation) => match continuation.cr {
                        Some(cr) => {
                            self.complete_continuation(continuation, symbol_end('\r', cr))?;
                        }
                        None => self.abandon_continuation(continuation)?,
                    },
                    None => self.enter(State::Initial),
                },
            }
        }
    }

    fn literal_at_end(&mut self, end: u32) -> Result<(), ScanError> {
        let Some((parser, kind)) = self.active_parser() else {
            self.enter(State::Initial);
            return Ok(());
        };
        let signal = parser.finish_at_end();
        let span = Span::new(self.st.token_start, end);
        match signal {
            LiteralSignal::StopOk => self.finish_literal(kind, end),
            LiteralSignal::StopWithWarning(message) => {
                self.sink.literal_message(span, &message);
                self.finish_literal(kind, end)
            }
            LiteralSignal::Error(message) | LiteralSignal::ContinueWithWarning(message) => {
                self.literal_failed(span, message)
            }
            LiteralSignal::Continue => self.literal_failed(span, "unterminated literal".to_owned()),
        }
    }
}

fn whitespace_kind(symbol: char) -> TokenKind {
    match symbol {
        '\t' => TokenKind::TAB,
        '\x0C' => TokenKind::FORM_FEED,
        _ => TokenKind::SPACE,
    }
}
