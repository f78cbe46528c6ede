//! C/C++ profile end to end.

use pretty_assertions::assert_eq;
use scanforge_core::{
    Diagnostic, FloatData, IntegerData, Profile, ScanError, Span, Token, TokenCollector,
    TokenData, TokenKind,
};
use scanforge_profiles::c_like::{self, *};

fn profile() -> Profile {
    c_like::profile().expect("c-like profile builds")
}

/// Scan without filters.
fn scan(source: &str) -> TokenCollector {
    let profile = profile();
    let mut sink = TokenCollector::lenient();
    profile
        .tokenize(&mut profile.new_state(), source, &mut sink)
        .expect("scan succeeds");
    sink
}

/// Scan through the C front-end filters.
fn scan_filtered(source: &str) -> TokenCollector {
    let profile = profile();
    let mut chain = c_like::filters(TokenCollector::lenient());
    profile
        .tokenize(&mut profile.new_state(), source, &mut chain)
        .expect("scan succeeds");
    chain.into_sink()
}

fn significant(sink: &TokenCollector) -> Vec<&Token> {
    sink.tokens
        .iter()
        .filter(|t| {
            !matches!(
                t.kind,
                TokenKind::SPACE | TokenKind::LINEFEED | TokenKind::FIN
            )
        })
        .collect()
}

fn int(value: u64, suffix_start: u32) -> TokenData {
    TokenData::Integer(IntegerData {
        value,
        overflow: false,
        suffix_start,
    })
}

/// Kind and payload of the only number in `source`.
fn number(source: &str) -> (TokenKind, TokenData) {
    let sink = scan(source);
    let numbers: Vec<_> = sink.tokens.iter().filter(|t| t.kind.is_number()).collect();
    assert_eq!(numbers.len(), 1, "{source:?} -> {:?}", sink.tokens);
    (numbers[0].kind, numbers[0].data.clone())
}

// === Basics ===

#[test]
fn declaration() {
    let sink = scan("int x = 0x1A;");
    assert_eq!(
        sink.kinds(),
        vec![
            TokenKind::IDENTIFIER,
            TokenKind::SPACE,
            TokenKind::IDENTIFIER,
            TokenKind::SPACE,
            ASSIGN,
            TokenKind::SPACE,
            HEX,
            SEMICOLON,
            TokenKind::FIN,
        ]
    );
    let hex = &sink.tokens[6];
    assert_eq!(hex.span, Span::new(8, 12));
    assert_eq!(hex.data, int(26, 12));
    assert_eq!(sink.tokens[8].span, Span::point(13));
}

#[test]
fn input_ending_mid_identifier() {
    let sink = scan("abc");
    assert_eq!(sink.kinds(), vec![TokenKind::IDENTIFIER, TokenKind::FIN]);
    assert_eq!(sink.tokens[0].span, Span::new(0, 3));
}

#[test]
fn operators_take_longest_match() {
    let sink = scan("a->b ->* .* ... :: <=> <<= >>= x/=y/z && || ! ~ ? :");
    let kinds: Vec<_> = significant(&sink).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::IDENTIFIER,
            ARROW,
            TokenKind::IDENTIFIER,
            ARROW_STAR,
            DOT_STAR,
            ELLIPSIS,
            SCOPE,
            SPACESHIP,
            SHL_ASSIGN,
            SHR_ASSIGN,
            TokenKind::IDENTIFIER,
            SLASH_ASSIGN,
            TokenKind::IDENTIFIER,
            SLASH,
            TokenKind::IDENTIFIER,
            AND_AND,
            OR_OR,
            BANG,
            TILDE,
            QUESTION,
            COLON,
        ]
    );
}

#[test]
fn two_dots_fall_back_to_single_dots() {
    let kinds: Vec<_> = significant(&scan("a..b")).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::IDENTIFIER, DOT, DOT, TokenKind::IDENTIFIER]
    );
}

#[test]
fn brackets_and_stray_punctuation() {
    let kinds: Vec<_> = significant(&scan("{([])} @ $ `")).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::CURLY_OPEN,
            TokenKind::ROUND_OPEN,
            TokenKind::SQUARE_OPEN,
            TokenKind::SQUARE_CLOSE,
            TokenKind::ROUND_CLOSE,
            TokenKind::CURLY_CLOSE,
            TokenKind::STRAY_PUNCT,
            TokenKind::STRAY_PUNCT,
            TokenKind::STRAY_PUNCT,
        ]
    );
}

#[test]
fn describe_names_kinds() {
    let profile = profile();
    assert_eq!(profile.describe(SHL_ASSIGN), Some("<<="));
    assert_eq!(profile.describe(RAW_STRING), Some("R\""));
    assert_eq!(profile.describe(OCTAL), Some("0"));
    assert_eq!(profile.operator_kind("->*"), Some(ARROW_STAR));
    assert_eq!(profile.operator_kind("/*"), Some(TokenKind::COMMENT_MULTI_LINE));
}

#[test]
fn unexpected_symbol_stops_strict_scan() {
    let profile = profile();
    let mut sink = TokenCollector::new();
    let result = profile.tokenize(&mut profile.new_state(), "a \u{1} b", &mut sink);
    assert_eq!(
        result,
        Err(ScanError::Unexpected {
            span: Span::new(2, 3)
        })
    );
    assert_eq!(
        sink.diagnostics,
        vec![Diagnostic::Unexpected {
            span: Span::new(2, 3)
        }]
    );
}

// === Numbers ===

#[test]
fn number_prefixes() {
    assert_eq!(number("0x1A"), (HEX, int(26, 4)));
    assert_eq!(number("0XfF"), (HEX_UPPER, int(255, 4)));
    assert_eq!(number("0b101"), (BINARY, int(5, 5)));
    assert_eq!(number("0B1"), (BINARY_UPPER, int(1, 3)));
    assert_eq!(number("017"), (OCTAL, int(15, 3)));
}

#[test]
fn lone_zero_is_octal_without_digits() {
    assert_eq!(number("0"), (OCTAL, int(0, 1)));
    assert_eq!(number("0;").0, OCTAL);
}

#[test]
fn leading_zero_with_decimal_digit_is_decimal() {
    assert_eq!(number("09"), (TokenKind::NUMBER_DECIMAL, int(9, 2)));
    assert_eq!(number("08.5").0, TokenKind::NUMBER_DECIMAL.with_float());
}

#[test]
fn bare_hex_prefix_is_unexpected() {
    let sink = scan("0x");
    assert_eq!(sink.kinds(), vec![TokenKind::UNEXPECTED, TokenKind::FIN]);
    assert_eq!(sink.tokens[0].span, Span::new(0, 2));
}

#[test]
fn separator_does_not_complete_bare_prefix() {
    let sink = scan("0x';");
    assert_eq!(sink.tokens[0].kind, TokenKind::UNEXPECTED);
    assert_eq!(sink.tokens[0].span, Span::new(0, 2));
    assert!(sink.tokens.iter().all(|t| !t.kind.is_number()));

    // The lone zero prefix is a number by itself, so a separator may follow.
    assert_eq!(number("0'7"), (OCTAL, int(7, 3)));
}

#[test]
fn digit_separators() {
    assert_eq!(
        number("1'000'000"),
        (TokenKind::NUMBER_DECIMAL, int(1_000_000, 9))
    );
    assert_eq!(number("0xFF'FF"), (HEX, int(0xFFFF, 7)));
}

#[test]
fn floats() {
    assert_eq!(
        number("0.5"),
        (
            TokenKind::NUMBER_DECIMAL.with_float(),
            TokenData::Float(FloatData {
                value: 0.5,
                integer_overflow: false,
                fraction_overflow: false,
                suffix_start: 3,
            })
        )
    );
    let (kind, data) = number(".25");
    assert!(kind.is_float());
    assert!(matches!(data, TokenData::Float(FloatData { value, .. }) if (value - 0.25).abs() < 1e-12));
}

#[test]
fn oversized_integer_still_scans() {
    let (kind, data) = number("18446744073709551616");
    assert_eq!(kind, TokenKind::NUMBER_DECIMAL);
    assert!(matches!(data, TokenData::Integer(IntegerData { overflow: true, .. })));
}

#[test]
fn member_access_on_integer() {
    let kinds: Vec<_> = significant(&scan("1.x")).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::NUMBER_DECIMAL, DOT, TokenKind::IDENTIFIER]
    );
}

// === Suffixes ===

#[test]
fn suffix_glued_onto_number() {
    let sink = scan_filtered("12abc");
    assert_eq!(sink.kinds(), vec![TokenKind::NUMBER_DECIMAL, TokenKind::FIN]);
    assert_eq!(sink.tokens[0].span, Span::new(0, 5));
    assert_eq!(sink.tokens[0].data, int(12, 2));
}

#[test]
fn float_and_hex_suffixes() {
    let sink = scan_filtered("1.5f 0x1Fu 7 u");
    let numbers: Vec<_> = significant(&sink)
        .into_iter()
        .map(|t| (t.kind, t.span, t.data.suffix_start()))
        .collect();
    assert_eq!(
        numbers,
        vec![
            (TokenKind::NUMBER_DECIMAL.with_float(), Span::new(0, 4), Some(3)),
            (HEX, Span::new(5, 10), Some(9)),
            (TokenKind::NUMBER_DECIMAL, Span::new(11, 12), Some(12)),
            (TokenKind::IDENTIFIER, Span::new(13, 14), None),
        ]
    );
}

// === Literals ===

#[test]
fn literal_forms() {
    let source = r#"L"wide" 'c' L'w' u8"utf" R"x(a\b)x" "esc\n""#;
    let sink = scan(source);
    let literals: Vec<_> = significant(&sink)
        .into_iter()
        .map(|t| (t.kind, t.data.text().unwrap_or_default().to_owned()))
        .collect();
    assert_eq!(
        literals,
        vec![
            (WIDE_STRING, "wide".to_owned()),
            (CHAR, "c".to_owned()),
            (WIDE_CHAR, "w".to_owned()),
            (UTF8_STRING, "utf".to_owned()),
            (RAW_STRING, "a\\b".to_owned()),
            (STRING, "esc\n".to_owned()),
        ]
    );
    assert!(sink.diagnostics.is_empty());
}

#[test]
fn literal_spans_cover_prefix_and_quotes() {
    let sink = scan(r#"u8"é" x"#);
    assert_eq!(sink.tokens[0].span, Span::new(0, 6));
    assert_eq!(sink.tokens[0].text(r#"u8"é" x"#), r#"u8"é""#);
}

#[test]
fn failed_prefixes_are_identifiers() {
    let sink = scan("Lx u8x R u");
    let tokens: Vec<_> = significant(&sink)
        .into_iter()
        .map(|t| (t.kind, t.span))
        .collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::IDENTIFIER, Span::new(0, 2)),
            (TokenKind::IDENTIFIER, Span::new(3, 6)),
            (TokenKind::IDENTIFIER, Span::new(7, 8)),
            (TokenKind::IDENTIFIER, Span::new(9, 10)),
        ]
    );
}

#[test]
fn literal_warnings_reach_the_sink() {
    let sink = scan(r#""\q" ''"#);
    assert_eq!(
        sink.diagnostics,
        vec![
            Diagnostic::LiteralMessage {
                span: Span::new(0, 3),
                message: "unknown escape sequence \\q".to_owned(),
            },
            Diagnostic::LiteralMessage {
                span: Span::new(5, 7),
                message: "empty character literal".to_owned(),
            },
        ]
    );
    assert_eq!(
        sink.kinds(),
        vec![STRING, TokenKind::SPACE, CHAR, TokenKind::FIN]
    );
}

#[test]
fn newline_in_string_leaves_terminator_outside() {
    let sink = scan("\"abc\nx");
    assert_eq!(
        sink.tokens
            .iter()
            .map(|t| (t.kind, t.span))
            .collect::<Vec<_>>(),
        vec![
            (TokenKind::UNEXPECTED, Span::new(0, 4)),
            (TokenKind::LINEFEED, Span::new(4, 5)),
            (TokenKind::IDENTIFIER, Span::new(5, 6)),
            (TokenKind::FIN, Span::point(6)),
        ]
    );
}

#[test]
fn unterminated_literal_in_strict_scan() {
    let profile = profile();
    let mut sink = TokenCollector::new();
    let result = profile.tokenize(&mut profile.new_state(), "R\"d(never", &mut sink);
    assert_eq!(
        result,
        Err(ScanError::Literal {
            span: Span::new(0, 9),
            message: "unterminated raw string".to_owned(),
        })
    );
}

// === Comments ===

#[test]
fn comments_carry_their_text() {
    let source = "a // note\n/* block\n */b";
    let sink = scan(source);
    let tokens: Vec<_> = sink
        .tokens
        .iter()
        .map(|t| (t.kind, t.data.text().map(str::to_owned)))
        .collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::IDENTIFIER, None),
            (TokenKind::SPACE, None),
            (TokenKind::COMMENT_SINGLE_LINE, Some(" note".to_owned())),
            (TokenKind::LINEFEED, None),
            (TokenKind::COMMENT_MULTI_LINE, Some(" block\n ".to_owned())),
            (TokenKind::IDENTIFIER, None),
            (TokenKind::FIN, None),
        ]
    );
    // The block comment spanned a line break.
    assert!(sink.tokens[5].at_line_start);
}

#[test]
fn empty_block_comment() {
    let sink = scan("/**/");
    assert_eq!(
        sink.tokens[0],
        Token::new(TokenKind::COMMENT_MULTI_LINE, Span::new(0, 4))
            .with_data(TokenData::Comment(String::new()))
            .at_line_start(true)
    );
}

#[test]
fn near_miss_close_marker() {
    let sink = scan("/* a **/x");
    assert_eq!(sink.tokens[0].data, TokenData::Comment(" a *".to_owned()));
    assert_eq!(sink.tokens[1].kind, TokenKind::IDENTIFIER);
}

#[test]
fn unterminated_block_comment() {
    let sink = scan("/* open");
    assert_eq!(sink.kinds(), vec![TokenKind::UNEXPECTED, TokenKind::FIN]);
    assert_eq!(sink.tokens[0].span, Span::new(0, 7));
}

// === Line continuation ===

#[test]
fn continuation_splices_identifier() {
    let sink = scan("ab\\\ncd e");
    assert_eq!(sink.tokens[0].kind, TokenKind::IDENTIFIER);
    assert_eq!(sink.tokens[0].span, Span::new(0, 6));
}

#[test]
fn continuation_extends_comment() {
    let sink = scan("// one\\\r\ntwo\nx");
    assert_eq!(
        sink.tokens[0].data,
        TokenData::Comment(" onetwo".to_owned())
    );
    assert_eq!(sink.tokens[0].span, Span::new(0, 12));
    assert_eq!(
        sink.kinds(),
        vec![
            TokenKind::COMMENT_SINGLE_LINE,
            TokenKind::LINEFEED,
            TokenKind::IDENTIFIER,
            TokenKind::FIN,
        ]
    );
}

#[test]
fn standalone_continuation() {
    let sink = scan("a \\\nb");
    assert_eq!(
        sink.kinds(),
        vec![
            TokenKind::IDENTIFIER,
            TokenKind::SPACE,
            TokenKind::LINE_CONTINUATION,
            TokenKind::IDENTIFIER,
            TokenKind::FIN,
        ]
    );
    // A spliced line is still the same logical line.
    assert!(!sink.tokens[3].at_line_start);
}

#[test]
fn backslash_without_newline_is_escape() {
    let kinds: Vec<_> = significant(&scan("a \\ b")).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::IDENTIFIER, TokenKind::ESCAPE, TokenKind::IDENTIFIER]
    );
}

// === Directives ===

#[test]
fn directive_lines_are_bracketed() {
    let sink = scan_filtered("#define X 1\nint y;\na # b\n");
    let tokens: Vec<_> = sink.tokens.iter().map(|t| (t.kind, t.span)).collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::DIRECTIVE_ENTER, Span::point(0)),
            (HASH, Span::new(0, 1)),
            (TokenKind::IDENTIFIER, Span::new(1, 7)),
            (TokenKind::SPACE, Span::new(7, 8)),
            (TokenKind::IDENTIFIER, Span::new(8, 9)),
            (TokenKind::SPACE, Span::new(9, 10)),
            (TokenKind::NUMBER_DECIMAL, Span::new(10, 11)),
            (TokenKind::DIRECTIVE_EXIT, Span::point(11)),
            (TokenKind::LINEFEED, Span::new(11, 12)),
            (TokenKind::IDENTIFIER, Span::new(12, 15)),
            (TokenKind::SPACE, Span::new(15, 16)),
            (TokenKind::IDENTIFIER, Span::new(16, 17)),
            (SEMICOLON, Span::new(17, 18)),
            (TokenKind::LINEFEED, Span::new(18, 19)),
            (TokenKind::IDENTIFIER, Span::new(19, 20)),
            (TokenKind::SPACE, Span::new(20, 21)),
            (TokenKind::RAW_CHAR, Span::new(21, 22)),
            (TokenKind::SPACE, Span::new(22, 23)),
            (TokenKind::IDENTIFIER, Span::new(23, 24)),
            (TokenKind::LINEFEED, Span::new(24, 25)),
            (TokenKind::FIN, Span::point(25)),
        ]
    );
}

#[test]
fn continued_directive_and_token_pasting() {
    let sink = scan_filtered("  #define CAT(a, b) a ## b \\\n  extra\nx ## y");
    let kinds: Vec<_> = significant(&sink).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::DIRECTIVE_ENTER,
            HASH,
            TokenKind::IDENTIFIER,
            TokenKind::IDENTIFIER,
            TokenKind::ROUND_OPEN,
            TokenKind::IDENTIFIER,
            COMMA,
            TokenKind::IDENTIFIER,
            TokenKind::ROUND_CLOSE,
            TokenKind::IDENTIFIER,
            HASH_HASH,
            TokenKind::IDENTIFIER,
            TokenKind::LINE_CONTINUATION,
            TokenKind::IDENTIFIER,
            TokenKind::DIRECTIVE_EXIT,
            TokenKind::IDENTIFIER,
            TokenKind::RAW_CHAR,
            TokenKind::RAW_CHAR,
            TokenKind::IDENTIFIER,
        ]
    );
}

#[test]
fn token_pasting_outside_directive_is_raw_symbols() {
    let sink = scan_filtered("a ## b");
    let tokens: Vec<_> = sink.tokens.iter().map(|t| (t.kind, t.span)).collect();
    assert_eq!(
        tokens,
        vec![
            (TokenKind::IDENTIFIER, Span::new(0, 1)),
            (TokenKind::SPACE, Span::new(1, 2)),
            (TokenKind::RAW_CHAR, Span::new(2, 3)),
            (TokenKind::RAW_CHAR, Span::new(3, 4)),
            (TokenKind::SPACE, Span::new(4, 5)),
            (TokenKind::IDENTIFIER, Span::new(5, 6)),
            (TokenKind::FIN, Span::point(6)),
        ]
    );
}

#[test]
fn directive_closed_at_end_of_input() {
    let sink = scan_filtered("#pragma once");
    assert_eq!(
        sink.kinds(),
        vec![
            TokenKind::DIRECTIVE_ENTER,
            HASH,
            TokenKind::IDENTIFIER,
            TokenKind::SPACE,
            TokenKind::IDENTIFIER,
            TokenKind::DIRECTIVE_EXIT,
            TokenKind::FIN,
        ]
    );
}
