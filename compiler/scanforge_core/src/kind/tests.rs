use super::*;

// === Bit layout ===

#[test]
fn atomic_kinds_occupy_low_nibble() {
    assert_eq!(TokenKind::UNEXPECTED.raw(), 0x0000);
    assert_eq!(TokenKind::RAW_CHAR.raw(), 0x0001);
    assert_eq!(TokenKind::LINEFEED.raw(), 0x0002);
    assert_eq!(TokenKind::SPACE.raw(), 0x0003);
    assert_eq!(TokenKind::TAB.raw(), 0x0004);
    assert_eq!(TokenKind::FORM_FEED.raw(), 0x0005);
    assert_eq!(TokenKind::IDENTIFIER.raw(), 0x0006);
    assert_eq!(TokenKind::STRAY_PUNCT.raw(), 0x0007);
    assert_eq!(TokenKind::ESCAPE.raw(), 0x0008);
    assert_eq!(TokenKind::LINE_CONTINUATION.raw(), 0x0009);
    for kind in [TokenKind::COMMENT_SINGLE_LINE, TokenKind::COMMENT_MULTI_LINE] {
        assert_eq!(kind.category(), KindCategory::Atomic);
    }
}

#[test]
fn bracket_close_is_open_plus_one() {
    for open in [
        TokenKind::CURLY_OPEN,
        TokenKind::ROUND_OPEN,
        TokenKind::ANGLE_OPEN,
        TokenKind::SQUARE_OPEN,
    ] {
        assert_eq!(open.category(), KindCategory::Bracket);
        let close = open.bracket_close();
        assert_eq!(close.map(TokenKind::raw), Some(open.raw() + 1));
    }
    assert_eq!(TokenKind::CURLY_CLOSE.bracket_close(), None);
    assert_eq!(TokenKind::SQUARE_CLOSE.raw(), 0x0042);
}

#[test]
fn control_tokens_have_bit_15() {
    for kind in [
        TokenKind::FIN,
        TokenKind::DIRECTIVE_ENTER,
        TokenKind::DIRECTIVE_EXIT,
        TokenKind::control(0x0100),
    ] {
        assert!(kind.is_control());
        assert!(kind.is_trivia());
    }
    assert!(!TokenKind::IDENTIFIER.is_control());
}

// === Numbers ===

#[test]
fn number_bases_decode_from_bits_8_to_10() {
    assert_eq!(TokenKind::NUMBER_DECIMAL.number_base(), Some(10));
    assert_eq!(TokenKind::NUMBER_BINARY.number_base(), Some(2));
    assert_eq!(TokenKind::NUMBER_QUATERNARY.number_base(), Some(4));
    assert_eq!(TokenKind::NUMBER_OCTAL.number_base(), Some(8));
    assert_eq!(TokenKind::NUMBER_DUODECIMAL.number_base(), Some(12));
    assert_eq!(TokenKind::NUMBER_HEX.number_base(), Some(16));
    assert_eq!(TokenKind::new(0x1600).number_base(), None);
    assert_eq!(TokenKind::IDENTIFIER.number_base(), None);
}

#[test]
fn number_for_base_inverts_number_base() {
    for base in [2, 4, 8, 10, 12, 16] {
        let kind = TokenKind::number_for_base(base);
        assert_eq!(kind.and_then(TokenKind::number_base), Some(base));
    }
    assert_eq!(TokenKind::number_for_base(3), None);
}

#[test]
fn float_and_missing_digit_flags() {
    let hex_float = TokenKind::NUMBER_HEX.with_float();
    assert_eq!(hex_float.raw(), 0x1580);
    assert!(hex_float.is_float());
    assert_eq!(hex_float.number_base(), Some(16));

    let octal_zero = TokenKind::new(0x1300 | TokenKind::NUMBER_MISSED_DIGITS_FLAG);
    assert!(octal_zero.allows_missing_digits());
    assert_eq!(octal_zero.number_base(), Some(8));
    assert!(!TokenKind::NUMBER_OCTAL.allows_missing_digits());

    // Outside the numeric range the same bits mean nothing.
    assert!(!TokenKind::operator(0x80).is_float());
}

// === Ranges ===

#[test]
fn operator_literal_keyword_ranges() {
    assert_eq!(TokenKind::operator(0).raw(), 0x2000);
    assert_eq!(TokenKind::user_operator(1).raw(), 0x2801);
    assert!(TokenKind::user_operator(0x7FF).is_operator());
    assert_eq!(TokenKind::literal(2).raw(), 0x3002);
    assert!(TokenKind::literal(2).is_literal());

    assert_eq!(TokenKind::keyword(0, 0).raw(), 0x4000);
    assert_eq!(TokenKind::keyword(7, 1023).raw(), 0x5FFF);
    assert_eq!(TokenKind::keyword(3, 5).keyword_set(), Some(3));
    assert_eq!(TokenKind::new(0x6000).category(), KindCategory::Reserved);
    assert_eq!(TokenKind::new(0x0010).category(), KindCategory::Reserved);
}

#[test]
fn debug_names_atomic_kinds() {
    assert_eq!(format!("{:?}", TokenKind::IDENTIFIER), "identifier");
    assert_eq!(format!("{:?}", TokenKind::FIN), "fin");
    assert_eq!(format!("{:?}", TokenKind::operator(3)), "Operator(0x2003)");
}
