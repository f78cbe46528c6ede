//! C and C++ source profile.
//!
//! Brackets `{} () []`, the full C/C++ operator set (digraphs excluded),
//! `//` and `/* */` comments, `0x`/`0b`/`0` numeric prefixes with `'` digit
//! separators, and the `"`, `'`, `L"`, `L'`, `u8"` and `R"` literal forms.
//! Line continuations are honoured.
//!
//! [`filters`] wraps a sink the way a C front end wants its tokens: numeric
//! suffixes glued on (`10u`, `1.5f`), preprocessor lines bracketed by
//! directive control tokens, and `#`/`##` demoted to raw characters outside
//! them.

use scanforge_core::{
    BuildError, CharClass, FilterChain, LineDirective, ModeGate, Options, Profile,
    ProfileBuilder, SuffixGlue, TokenKind, TokenSink,
};
use tracing::debug;

use crate::literals::{QuotedLiteralParser, RawStringParser};

// === Numbers ===

pub const HEX: TokenKind = TokenKind::NUMBER_HEX;
/// `0X` spelling of [`HEX`].
pub const HEX_UPPER: TokenKind = TokenKind::new(TokenKind::NUMBER_HEX.raw() | 1);
pub const BINARY: TokenKind = TokenKind::NUMBER_BINARY;
/// `0B` spelling of [`BINARY`].
pub const BINARY_UPPER: TokenKind = TokenKind::new(TokenKind::NUMBER_BINARY.raw() | 1);
/// Leading-zero octal; a lone `0` is this kind with value 0.
pub const OCTAL: TokenKind =
    TokenKind::new(TokenKind::NUMBER_OCTAL.raw() | TokenKind::NUMBER_MISSED_DIGITS_FLAG);

// === Literals ===

pub const STRING: TokenKind = TokenKind::literal(0);
pub const CHAR: TokenKind = TokenKind::literal(1);
pub const WIDE_STRING: TokenKind = TokenKind::literal(2);
pub const WIDE_CHAR: TokenKind = TokenKind::literal(3);
pub const UTF8_STRING: TokenKind = TokenKind::literal(4);
pub const RAW_STRING: TokenKind = TokenKind::literal(5);

// === Operators ===

pub const PLUS: TokenKind = TokenKind::operator(0);
pub const MINUS: TokenKind = TokenKind::operator(1);
pub const STAR: TokenKind = TokenKind::operator(2);
pub const SLASH: TokenKind = TokenKind::operator(3);
pub const PERCENT: TokenKind = TokenKind::operator(4);
pub const PLUS_PLUS: TokenKind = TokenKind::operator(5);
pub const MINUS_MINUS: TokenKind = TokenKind::operator(6);
pub const ASSIGN: TokenKind = TokenKind::operator(7);
pub const PLUS_ASSIGN: TokenKind = TokenKind::operator(8);
pub const MINUS_ASSIGN: TokenKind = TokenKind::operator(9);
pub const STAR_ASSIGN: TokenKind = TokenKind::operator(10);
pub const SLASH_ASSIGN: TokenKind = TokenKind::operator(11);
pub const PERCENT_ASSIGN: TokenKind = TokenKind::operator(12);
pub const EQ: TokenKind = TokenKind::operator(13);
pub const NOT_EQ: TokenKind = TokenKind::operator(14);
pub const LT: TokenKind = TokenKind::operator(15);
pub const GT: TokenKind = TokenKind::operator(16);
pub const LT_EQ: TokenKind = TokenKind::operator(17);
pub const GT_EQ: TokenKind = TokenKind::operator(18);
pub const SPACESHIP: TokenKind = TokenKind::operator(19);
pub const AND_AND: TokenKind = TokenKind::operator(20);
pub const OR_OR: TokenKind = TokenKind::operator(21);
pub const BANG: TokenKind = TokenKind::operator(22);
pub const AMP: TokenKind = TokenKind::operator(23);
pub const PIPE: TokenKind = TokenKind::operator(24);
pub const CARET: TokenKind = TokenKind::operator(25);
pub const TILDE: TokenKind = TokenKind::operator(26);
pub const SHL: TokenKind = TokenKind::operator(27);
pub const SHR: TokenKind = TokenKind::operator(28);
pub const AMP_ASSIGN: TokenKind = TokenKind::operator(29);
pub const PIPE_ASSIGN: TokenKind = TokenKind::operator(30);
pub const CARET_ASSIGN: TokenKind = TokenKind::operator(31);
pub const SHL_ASSIGN: TokenKind = TokenKind::operator(32);
pub const SHR_ASSIGN: TokenKind = TokenKind::operator(33);
pub const ARROW: TokenKind = TokenKind::operator(34);
pub const ARROW_STAR: TokenKind = TokenKind::operator(35);
pub const DOT: TokenKind = TokenKind::operator(36);
pub const DOT_STAR: TokenKind = TokenKind::operator(37);
pub const ELLIPSIS: TokenKind = TokenKind::operator(38);
pub const SCOPE: TokenKind = TokenKind::operator(39);
pub const COLON: TokenKind = TokenKind::operator(40);
pub const SEMICOLON: TokenKind = TokenKind::operator(41);
pub const COMMA: TokenKind = TokenKind::operator(42);
pub const QUESTION: TokenKind = TokenKind::operator(43);
pub const HASH: TokenKind = TokenKind::operator(44);
pub const HASH_HASH: TokenKind = TokenKind::operator(45);

const OPERATORS: &[(&str, TokenKind)] = &[
    ("+", PLUS),
    ("-", MINUS),
    ("*", STAR),
    ("/", SLASH),
    ("%", PERCENT),
    ("++", PLUS_PLUS),
    ("--", MINUS_MINUS),
    ("=", ASSIGN),
    ("+=", PLUS_ASSIGN),
    ("-=", MINUS_ASSIGN),
    ("*=", STAR_ASSIGN),
    ("/=", SLASH_ASSIGN),
    ("%=", PERCENT_ASSIGN),
    ("==", EQ),
    ("!=", NOT_EQ),
    ("<", LT),
    (">", GT),
    ("<=", LT_EQ),
    (">=", GT_EQ),
    ("<=>", SPACESHIP),
    ("&&", AND_AND),
    ("||", OR_OR),
    ("!", BANG),
    ("&", AMP),
    ("|", PIPE),
    ("^", CARET),
    ("~", TILDE),
    ("<<", SHL),
    (">>", SHR),
    ("&=", AMP_ASSIGN),
    ("|=", PIPE_ASSIGN),
    ("^=", CARET_ASSIGN),
    ("<<=", SHL_ASSIGN),
    (">>=", SHR_ASSIGN),
    ("->", ARROW),
    ("->*", ARROW_STAR),
    (".", DOT),
    (".*", DOT_STAR),
    ("...", ELLIPSIS),
    ("::", SCOPE),
    (":", COLON),
    (";", SEMICOLON),
    (",", COMMA),
    ("?", QUESTION),
    ("#", HASH),
    ("##", HASH_HASH),
];

/// Options the profile is built with.
pub fn options() -> Options {
    Options {
        honor_line_continuation: true,
        allow_digit_group_separator: true,
        digit_group_separator: '\'',
        ..Options::default()
    }
}

/// Builder preloaded with the C/C++ profile, for callers adding to it.
pub fn builder() -> Result<ProfileBuilder, BuildError> {
    let mut b = ProfileBuilder::new();
    b.options(options())?;

    b.add_brackets("{}", TokenKind::CURLY_OPEN)?
        .add_brackets("()", TokenKind::ROUND_OPEN)?
        .add_brackets("[]", TokenKind::SQUARE_OPEN)?;

    b.add_number_prefix("0x", HEX)?
        .add_number_prefix("0X", HEX_UPPER)?
        .add_number_prefix("0b", BINARY)?
        .add_number_prefix("0B", BINARY_UPPER)?
        .add_number_prefix("0", OCTAL)?;

    for &(sequence, kind) in OPERATORS {
        b.add_operator_kind(sequence, kind)?;
    }
    b.add_single_line_comment("//")?
        .set_multi_line_comment("/*", "*/")?;

    b.add_literal("\"", STRING, QuotedLiteralParser::factory('"'))?
        .add_literal("'", CHAR, QuotedLiteralParser::character_factory('\''))?
        .add_literal("L\"", WIDE_STRING, QuotedLiteralParser::factory('"'))?
        .add_literal("L'", WIDE_CHAR, QuotedLiteralParser::character_factory('\''))?
        .add_literal("u8\"", UTF8_STRING, QuotedLiteralParser::factory('"'))?
        .add_literal("R\"", RAW_STRING, RawStringParser::factory())?;

    b.add_class("@$`", CharClass::STRAY_PUNCT);
    debug!(operators = OPERATORS.len(), "c-like profile configured");
    Ok(b)
}

/// The C/C++ profile.
pub fn profile() -> Result<Profile, BuildError> {
    Ok(builder()?.build())
}

/// Wrap `sink` in the C front-end filters.
///
/// Tokens pass the directive bracketing first, then the `#`/`##` gate,
/// then suffix gluing.
pub fn filters<S: TokenSink>(sink: S) -> FilterChain<S> {
    let mut chain = FilterChain::new(sink);
    chain
        .install(SuffixGlue::new())
        .install(ModeGate::new(
            TokenKind::DIRECTIVE_ENTER,
            TokenKind::DIRECTIVE_EXIT,
            [(HASH, "#"), (HASH_HASH, "##")],
        ))
        .install(LineDirective::new(HASH));
    chain
}
