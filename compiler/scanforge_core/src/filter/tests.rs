use pretty_assertions::assert_eq;

use super::*;
use crate::token::{IntegerData, TokenCollector};

const HASH: TokenKind = TokenKind::operator(0);
const HASH_HASH: TokenKind = TokenKind::operator(1);
const AT: TokenKind = TokenKind::STRAY_PUNCT;
const DIRECTIVE: TokenKind = TokenKind::user_operator(0);

fn tok(kind: TokenKind, start: u32, end: u32) -> Token {
    Token::new(kind, Span::new(start, end))
}

fn number(start: u32, end: u32, value: u64) -> Token {
    tok(TokenKind::NUMBER_DECIMAL, start, end).with_data(TokenData::Integer(IntegerData {
        value,
        overflow: false,
        suffix_start: end,
    }))
}

fn fin(at: u32) -> Token {
    Token::new(TokenKind::FIN, Span::point(at))
}

fn run<S: TokenSink>(chain: &mut FilterChain<S>, tokens: Vec<Token>) {
    let mut message = String::new();
    for token in tokens {
        assert!(chain.token(token, &mut message).is_continue());
    }
}

fn kinds_and_spans(sink: &TokenCollector) -> Vec<(TokenKind, Span)> {
    sink.tokens.iter().map(|t| (t.kind, t.span)).collect()
}

// === Chain mechanics ===

#[test]
fn empty_chain_forwards() {
    let mut chain = FilterChain::new(TokenCollector::new());
    assert!(chain.is_empty());
    run(&mut chain, vec![tok(TokenKind::IDENTIFIER, 0, 1), fin(1)]);
    assert_eq!(chain.sink().kinds(), vec![TokenKind::IDENTIFIER, TokenKind::FIN]);
}

/// Rewrites one kind into another.
struct Rename(TokenKind, TokenKind);

impl TokenFilter for Rename {
    fn token(&mut self, mut token: Token, message: &mut String, next: &mut dyn TokenSink) -> ControlFlow<()> {
        if token.kind == self.0 {
            token.kind = self.1;
        }
        next.token(token, message)
    }
}

#[test]
fn last_installed_runs_first() {
    let a = TokenKind::operator(1);
    let b = TokenKind::operator(2);
    let c = TokenKind::operator(3);
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(Rename(b, c)).install(Rename(a, b));
    assert_eq!(chain.len(), 2);
    run(&mut chain, vec![tok(a, 0, 1)]);
    // a -> b (last installed) then b -> c.
    assert_eq!(chain.sink().kinds(), vec![c]);

    let mut reversed = FilterChain::new(TokenCollector::new());
    reversed.install(Rename(a, b)).install(Rename(b, c));
    run(&mut reversed, vec![tok(a, 0, 1)]);
    assert_eq!(reversed.sink().kinds(), vec![b]);
}

#[test]
fn diagnostics_bypass_filters() {
    let mut chain = FilterChain::new(TokenCollector::lenient());
    chain.install(SuffixGlue::new());
    chain.literal_message(Span::new(0, 1), "careful");
    assert!(chain
        .unexpected(&UnexpectedReport::here(Span::new(1, 2)))
        .is_continue());
    assert_eq!(chain.into_sink().diagnostics.len(), 2);
}

// === SuffixGlue ===

#[test]
fn glue_merges_adjacent_identifier() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SuffixGlue::new());
    run(
        &mut chain,
        vec![number(0, 2, 12), tok(TokenKind::IDENTIFIER, 2, 5), fin(5)],
    );
    let sink = chain.sink();
    assert_eq!(
        kinds_and_spans(sink),
        vec![
            (TokenKind::NUMBER_DECIMAL, Span::new(0, 5)),
            (TokenKind::FIN, Span::point(5)),
        ]
    );
    assert_eq!(
        sink.tokens[0].data,
        TokenData::Integer(IntegerData {
            value: 12,
            overflow: false,
            suffix_start: 2,
        })
    );
}

#[test]
fn glue_leaves_separated_identifier() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SuffixGlue::new());
    run(
        &mut chain,
        vec![
            number(0, 1, 1),
            tok(TokenKind::SPACE, 1, 2),
            tok(TokenKind::IDENTIFIER, 2, 3),
        ],
    );
    assert_eq!(
        chain.sink().kinds(),
        vec![TokenKind::NUMBER_DECIMAL, TokenKind::SPACE, TokenKind::IDENTIFIER]
    );
}

#[test]
fn glue_flushes_held_number_on_fin() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SuffixGlue::new());
    run(&mut chain, vec![number(0, 1, 1)]);
    assert!(chain.sink().tokens.is_empty());
    run(&mut chain, vec![fin(1)]);
    assert_eq!(
        chain.sink().kinds(),
        vec![TokenKind::NUMBER_DECIMAL, TokenKind::FIN]
    );
}

#[test]
fn glue_consecutive_numbers() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SuffixGlue::new());
    run(&mut chain, vec![number(0, 4, 1), number(4, 5, 2), fin(5)]);
    assert_eq!(chain.sink().tokens.len(), 3);
}

// === ModeGate ===

#[test]
fn gate_rewrites_outside_mode() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(ModeGate::new(
        TokenKind::DIRECTIVE_ENTER,
        TokenKind::DIRECTIVE_EXIT,
        [(HASH, "#")],
    ));
    run(
        &mut chain,
        vec![
            tok(HASH, 0, 1),
            Token::new(TokenKind::DIRECTIVE_ENTER, Span::point(2)),
            tok(HASH, 2, 3),
            Token::new(TokenKind::DIRECTIVE_EXIT, Span::point(4)),
            tok(HASH, 5, 6),
        ],
    );
    assert_eq!(
        chain.sink().kinds(),
        vec![
            TokenKind::RAW_CHAR,
            TokenKind::DIRECTIVE_ENTER,
            HASH,
            TokenKind::DIRECTIVE_EXIT,
            TokenKind::RAW_CHAR,
        ]
    );
}

#[test]
fn gated_run_becomes_one_raw_char_per_symbol() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(ModeGate::new(
        TokenKind::DIRECTIVE_ENTER,
        TokenKind::DIRECTIVE_EXIT,
        [(HASH, "#"), (HASH_HASH, "##")],
    ));
    run(
        &mut chain,
        vec![
            tok(TokenKind::IDENTIFIER, 0, 1).at_line_start(true),
            tok(HASH_HASH, 2, 4),
            // Spliced by a line continuation: `#\\\n#`.
            tok(HASH_HASH, 5, 9),
            fin(9),
        ],
    );
    assert_eq!(
        kinds_and_spans(chain.sink()),
        vec![
            (TokenKind::IDENTIFIER, Span::new(0, 1)),
            (TokenKind::RAW_CHAR, Span::new(2, 3)),
            (TokenKind::RAW_CHAR, Span::new(3, 4)),
            (TokenKind::RAW_CHAR, Span::new(5, 6)),
            (TokenKind::RAW_CHAR, Span::new(6, 9)),
            (TokenKind::FIN, Span::point(9)),
        ]
    );
    assert!(chain.sink().tokens.iter().all(|t| !t.at_line_start || t.span.start == 0));
}

// === LineDirective ===

#[test]
fn directive_lines_are_bracketed() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(LineDirective::new(HASH));
    run(
        &mut chain,
        vec![
            tok(HASH, 0, 1).at_line_start(true),
            tok(TokenKind::IDENTIFIER, 1, 7),
            tok(TokenKind::LINEFEED, 7, 8).at_line_start(false),
            tok(TokenKind::IDENTIFIER, 8, 9).at_line_start(true),
            tok(HASH, 10, 11),
            fin(11),
        ],
    );
    assert_eq!(
        kinds_and_spans(chain.sink()),
        vec![
            (TokenKind::DIRECTIVE_ENTER, Span::point(0)),
            (HASH, Span::new(0, 1)),
            (TokenKind::IDENTIFIER, Span::new(1, 7)),
            (TokenKind::DIRECTIVE_EXIT, Span::point(7)),
            (TokenKind::LINEFEED, Span::new(7, 8)),
            (TokenKind::IDENTIFIER, Span::new(8, 9)),
            (HASH, Span::new(10, 11)),
            (TokenKind::FIN, Span::point(11)),
        ]
    );
}

#[test]
fn directive_closed_by_fin() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(LineDirective::new(HASH));
    run(&mut chain, vec![tok(HASH, 0, 1).at_line_start(true), fin(1)]);
    assert_eq!(
        chain.sink().kinds(),
        vec![
            TokenKind::DIRECTIVE_ENTER,
            HASH,
            TokenKind::DIRECTIVE_EXIT,
            TokenKind::FIN,
        ]
    );
}

// === SequenceComposer ===

#[test]
fn composer_merges_adjacent_run() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SequenceComposer::new([AT, TokenKind::IDENTIFIER], DIRECTIVE));
    run(
        &mut chain,
        vec![
            tok(AT, 0, 1).at_line_start(true),
            tok(TokenKind::IDENTIFIER, 1, 9),
            tok(TokenKind::LINEFEED, 9, 10),
        ],
    );
    let sink = chain.sink();
    assert_eq!(
        kinds_and_spans(sink),
        vec![
            (DIRECTIVE, Span::new(0, 9)),
            (TokenKind::LINEFEED, Span::new(9, 10)),
        ]
    );
    assert!(sink.tokens[0].at_line_start);
}

#[test]
fn composer_flushes_partial_run() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SequenceComposer::new([AT, TokenKind::IDENTIFIER], DIRECTIVE));
    run(
        &mut chain,
        vec![
            tok(AT, 0, 1),
            tok(TokenKind::SPACE, 1, 2),
            tok(TokenKind::IDENTIFIER, 2, 3),
            tok(AT, 3, 4),
            tok(AT, 4, 5),
            tok(TokenKind::IDENTIFIER, 5, 6),
            tok(AT, 6, 7),
            fin(7),
        ],
    );
    assert_eq!(
        chain.sink().kinds(),
        vec![
            AT,
            TokenKind::SPACE,
            TokenKind::IDENTIFIER,
            AT,
            DIRECTIVE,
            AT,
            TokenKind::FIN,
        ]
    );
}

#[test]
fn composer_does_not_retry_held_tokens() {
    let mut chain = FilterChain::new(TokenCollector::new());
    chain.install(SequenceComposer::new(
        [AT, AT, TokenKind::IDENTIFIER],
        DIRECTIVE,
    ));
    run(
        &mut chain,
        vec![
            tok(AT, 0, 1),
            tok(AT, 1, 2),
            tok(AT, 2, 3),
            tok(TokenKind::IDENTIFIER, 3, 4),
            fin(4),
        ],
    );
    assert_eq!(
        chain.sink().kinds(),
        vec![AT, AT, AT, TokenKind::IDENTIFIER, TokenKind::FIN]
    );
}
