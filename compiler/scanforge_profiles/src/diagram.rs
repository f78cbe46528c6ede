//! Diagram description profile.
//!
//! Modelled on text-to-diagram languages: arrows of several shapes, `'`
//! comments that only count at the start of a line (elsewhere `'` is an
//! ordinary operator), `/' ... '/` block comments and plain `"` strings.
//! There are no line continuations and no numeric prefixes.
//!
//! [`filters`] composes `@` followed directly by an identifier
//! (`@startuml`) into one [`DIRECTIVE`] token.

use scanforge_core::{
    BuildError, CharClass, FilterChain, Options, Profile, ProfileBuilder, SequenceComposer,
    TokenKind, TokenSink,
};
use tracing::debug;

use crate::literals::QuotedLiteralParser;

/// `@` plus identifier, produced by [`filters`].
pub const DIRECTIVE: TokenKind = TokenKind::user_operator(0);

pub const STRING: TokenKind = TokenKind::literal(0);

// === Arrows ===

pub const LINE: TokenKind = TokenKind::operator(0);
pub const ARROW: TokenKind = TokenKind::operator(1);
pub const LONG_ARROW: TokenKind = TokenKind::operator(2);
pub const ASYNC_ARROW: TokenKind = TokenKind::operator(3);
pub const LONG_ASYNC_ARROW: TokenKind = TokenKind::operator(4);
pub const BACK_ARROW: TokenKind = TokenKind::operator(5);
pub const LONG_BACK_ARROW: TokenKind = TokenKind::operator(6);
pub const ASYNC_BACK_ARROW: TokenKind = TokenKind::operator(7);
pub const BOTH_ARROW: TokenKind = TokenKind::operator(8);
pub const LONG_BOTH_ARROW: TokenKind = TokenKind::operator(9);
pub const DOTTED: TokenKind = TokenKind::operator(10);
pub const DOTTED_ARROW: TokenKind = TokenKind::operator(11);
pub const DOTTED_BACK_ARROW: TokenKind = TokenKind::operator(12);
pub const LONG_LINE: TokenKind = TokenKind::operator(13);
/// `'` away from the start of a line. The builder allocates it as the
/// comment marker's fallback kind.
pub const QUOTE: TokenKind = TokenKind::operator(14);

// === Punctuation ===

pub const DOT: TokenKind = TokenKind::operator(15);
pub const COLON: TokenKind = TokenKind::operator(16);
pub const COMMA: TokenKind = TokenKind::operator(17);
pub const ASSIGN: TokenKind = TokenKind::operator(18);
pub const PLUS: TokenKind = TokenKind::operator(19);
pub const STAR: TokenKind = TokenKind::operator(20);
pub const HASH: TokenKind = TokenKind::operator(21);
pub const PIPE: TokenKind = TokenKind::operator(22);
pub const SLASH: TokenKind = TokenKind::operator(23);
pub const LT: TokenKind = TokenKind::operator(24);
pub const GT: TokenKind = TokenKind::operator(25);
pub const BANG: TokenKind = TokenKind::operator(26);
pub const QUESTION: TokenKind = TokenKind::operator(27);
pub const SEMICOLON: TokenKind = TokenKind::operator(28);
pub const DOLLAR: TokenKind = TokenKind::operator(29);

const OPERATORS: &[(&str, TokenKind)] = &[
    ("-", LINE),
    ("--", LONG_LINE),
    ("->", ARROW),
    ("-->", LONG_ARROW),
    ("->>", ASYNC_ARROW),
    ("-->>", LONG_ASYNC_ARROW),
    ("<-", BACK_ARROW),
    ("<--", LONG_BACK_ARROW),
    ("<<-", ASYNC_BACK_ARROW),
    ("<->", BOTH_ARROW),
    ("<-->", LONG_BOTH_ARROW),
    ("..", DOTTED),
    ("..>", DOTTED_ARROW),
    ("<..", DOTTED_BACK_ARROW),
    (".", DOT),
    (":", COLON),
    (",", COMMA),
    ("=", ASSIGN),
    ("+", PLUS),
    ("*", STAR),
    ("#", HASH),
    ("|", PIPE),
    ("/", SLASH),
    ("<", LT),
    (">", GT),
    ("!", BANG),
    ("?", QUESTION),
    (";", SEMICOLON),
    ("$", DOLLAR),
];

pub fn options() -> Options {
    Options {
        single_line_comment_only_at_line_start: true,
        honor_line_continuation: false,
        ..Options::default()
    }
}

/// Builder preloaded with the diagram profile.
pub fn builder() -> Result<ProfileBuilder, BuildError> {
    let mut b = ProfileBuilder::new();
    b.options(options())?;
    b.add_brackets("{}", TokenKind::CURLY_OPEN)?
        .add_brackets("()", TokenKind::ROUND_OPEN)?
        .add_brackets("[]", TokenKind::SQUARE_OPEN)?;
    for &(sequence, kind) in OPERATORS {
        b.add_operator_kind(sequence, kind)?;
    }
    b.add_single_line_comment("'")?
        .set_multi_line_comment("/'", "'/")?;
    b.add_literal("\"", STRING, QuotedLiteralParser::factory('"'))?;
    b.add_class("@", CharClass::STRAY_PUNCT);
    debug!(operators = OPERATORS.len(), "diagram profile configured");
    Ok(b)
}

pub fn profile() -> Result<Profile, BuildError> {
    Ok(builder()?.build())
}

/// Wrap `sink` in the directive composer.
pub fn filters<S: TokenSink>(sink: S) -> FilterChain<S> {
    let mut chain = FilterChain::new(sink);
    chain.install(SequenceComposer::new(
        [TokenKind::STRAY_PUNCT, TokenKind::IDENTIFIER],
        DIRECTIVE,
    ));
    chain
}
