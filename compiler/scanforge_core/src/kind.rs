//! Token-kind namespace.
//!
//! A `TokenKind` is a 16-bit tag. The value space is partitioned into fixed
//! ranges that every profile shares, so a consumer can classify a kind
//! without knowing which profile produced it:
//!
//! ```text
//! 0x8000..=0xFFFF  control tokens (bit 15)
//! 0x0000..=0x000F  atomic kinds (identifier, whitespace, comments, ...)
//! 0x0011..=0x0042  bracket pairs, open = base, close = base + 1
//! 0x1000..=0x1FFF  numeric literals (bit 7 float, bits 8-10 base, bit 11 zero-digit prefix)
//! 0x2000..=0x2FFF  operators (0x2800.. caller-defined)
//! 0x3000..=0x3FFF  string/char/raw literals
//! 0x4000..=0x5FFF  eight keyword sets of 1024 kinds each
//! ```

use std::fmt;

/// Classified token tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenKind(u16);

/// Which of the fixed ranges a kind belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KindCategory {
    Control,
    Atomic,
    Bracket,
    Number,
    Operator,
    Literal,
    Keyword,
    Reserved,
}

impl TokenKind {
    // === Control (bit 15) ===

    /// Bit marking control/signal tokens that carry no text.
    pub const CONTROL_FLAG: u16 = 0x8000;
    /// End of input. The only token ever emitted with an empty span by the engine.
    pub const FIN: TokenKind = TokenKind(0x8000);
    /// Entering a directive line (emitted by the line-directive filter).
    pub const DIRECTIVE_ENTER: TokenKind = TokenKind(0x8001);
    /// Leaving a directive line.
    pub const DIRECTIVE_EXIT: TokenKind = TokenKind(0x8002);

    // === Atomic (0x0000-0x000F) ===

    pub const UNEXPECTED: TokenKind = TokenKind(0x0000);
    pub const RAW_CHAR: TokenKind = TokenKind(0x0001);
    pub const LINEFEED: TokenKind = TokenKind(0x0002);
    pub const SPACE: TokenKind = TokenKind(0x0003);
    pub const TAB: TokenKind = TokenKind(0x0004);
    pub const FORM_FEED: TokenKind = TokenKind(0x0005);
    pub const IDENTIFIER: TokenKind = TokenKind(0x0006);
    pub const STRAY_PUNCT: TokenKind = TokenKind(0x0007);
    pub const ESCAPE: TokenKind = TokenKind(0x0008);
    pub const LINE_CONTINUATION: TokenKind = TokenKind(0x0009);
    pub const COMMENT_SINGLE_LINE: TokenKind = TokenKind(0x000A);
    pub const COMMENT_MULTI_LINE: TokenKind = TokenKind(0x000B);

    // === Brackets (0x0011-0x0042) ===

    pub const CURLY_OPEN: TokenKind = TokenKind(0x0011);
    pub const CURLY_CLOSE: TokenKind = TokenKind(0x0012);
    pub const ROUND_OPEN: TokenKind = TokenKind(0x0021);
    pub const ROUND_CLOSE: TokenKind = TokenKind(0x0022);
    pub const ANGLE_OPEN: TokenKind = TokenKind(0x0031);
    pub const ANGLE_CLOSE: TokenKind = TokenKind(0x0032);
    pub const SQUARE_OPEN: TokenKind = TokenKind(0x0041);
    pub const SQUARE_CLOSE: TokenKind = TokenKind(0x0042);

    // === Numbers (0x1000-0x1FFF) ===

    pub const NUMBER_FIRST: u16 = 0x1000;
    pub const NUMBER_LAST: u16 = 0x1FFF;
    pub const NUMBER_FLOAT_FLAG: u16 = 0x0080;
    pub const NUMBER_BASE_MASK: u16 = 0x0700;
    pub const NUMBER_MISSED_DIGITS_FLAG: u16 = 0x0800;
    /// Low-bit variants `0x40..=0x7F` are left for user-defined suffix kinds.
    pub const NUMBER_USER_SUFFIX_FIRST: u16 = 0x0040;

    pub const NUMBER_DECIMAL: TokenKind = TokenKind(0x1000);
    pub const NUMBER_BINARY: TokenKind = TokenKind(0x1100);
    pub const NUMBER_QUATERNARY: TokenKind = TokenKind(0x1200);
    pub const NUMBER_OCTAL: TokenKind = TokenKind(0x1300);
    pub const NUMBER_DUODECIMAL: TokenKind = TokenKind(0x1400);
    pub const NUMBER_HEX: TokenKind = TokenKind(0x1500);

    // === Operators (0x2000-0x2FFF) ===

    pub const OPERATOR_FIRST: u16 = 0x2000;
    /// First kind of the caller-defined operator sub-range.
    pub const OPERATOR_USER_FIRST: u16 = 0x2800;
    pub const OPERATOR_LAST: u16 = 0x2FFF;

    // === Literals (0x3000-0x3FFF) ===

    pub const LITERAL_FIRST: u16 = 0x3000;
    pub const LITERAL_LAST: u16 = 0x3FFF;

    // === Keyword sets (0x4000-0x5FFF) ===

    pub const KEYWORD_FIRST: u16 = 0x4000;
    pub const KEYWORD_SET_SIZE: u16 = 0x0400;
    pub const KEYWORD_SET_COUNT: u16 = 8;

    /// Wrap a raw kind value.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        TokenKind(raw)
    }

    /// Raw 16-bit value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Operator kind at `offset` from the start of the operator range.
    #[inline]
    pub const fn operator(offset: u16) -> Self {
        TokenKind(Self::OPERATOR_FIRST + offset)
    }

    /// Caller-defined operator kind at `offset` within `0x2800..=0x2FFF`.
    #[inline]
    pub const fn user_operator(offset: u16) -> Self {
        TokenKind(Self::OPERATOR_USER_FIRST + offset)
    }

    /// Literal kind at `offset` from the start of the literal range.
    #[inline]
    pub const fn literal(offset: u16) -> Self {
        TokenKind(Self::LITERAL_FIRST + offset)
    }

    /// Kind `index` of keyword set `set` (`set < 8`, `index < 1024`).
    #[inline]
    pub const fn keyword(set: u16, index: u16) -> Self {
        TokenKind(Self::KEYWORD_FIRST + set * Self::KEYWORD_SET_SIZE + index)
    }

    /// Control kind with the given low bits.
    #[inline]
    pub const fn control(raw: u16) -> Self {
        TokenKind(Self::CONTROL_FLAG | raw)
    }

    /// Range this kind belongs to.
    pub const fn category(self) -> KindCategory {
        let raw = self.0;
        if raw & Self::CONTROL_FLAG != 0 {
            KindCategory::Control
        } else if raw <= 0x000F {
            KindCategory::Atomic
        } else if raw >= 0x0011 && raw <= 0x0042 {
            KindCategory::Bracket
        } else if raw >= Self::NUMBER_FIRST && raw <= Self::NUMBER_LAST {
            KindCategory::Number
        } else if raw >= Self::OPERATOR_FIRST && raw <= Self::OPERATOR_LAST {
            KindCategory::Operator
        } else if raw >= Self::LITERAL_FIRST && raw <= Self::LITERAL_LAST {
            KindCategory::Literal
        } else if raw >= Self::KEYWORD_FIRST
            && raw < Self::KEYWORD_FIRST + Self::KEYWORD_SET_SIZE * Self::KEYWORD_SET_COUNT
        {
            KindCategory::Keyword
        } else {
            KindCategory::Reserved
        }
    }

    #[inline]
    pub const fn is_control(self) -> bool {
        self.0 & Self::CONTROL_FLAG != 0
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        matches!(self.category(), KindCategory::Number)
    }

    #[inline]
    pub const fn is_operator(self) -> bool {
        matches!(self.category(), KindCategory::Operator)
    }

    #[inline]
    pub const fn is_literal(self) -> bool {
        matches!(self.category(), KindCategory::Literal)
    }

    #[inline]
    pub const fn is_comment(self) -> bool {
        self.0 == Self::COMMENT_SINGLE_LINE.0 || self.0 == Self::COMMENT_MULTI_LINE.0
    }

    /// Whitespace, continuation, comment, and control kinds.
    ///
    /// Trivia does not end the "at line start" window.
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::SPACE | Self::TAB | Self::FORM_FEED | Self::LINE_CONTINUATION
        ) || self.is_comment()
            || self.is_control()
    }

    /// Whether this is one of the eight bracket open kinds.
    pub const fn is_bracket_open(self) -> bool {
        matches!(
            self,
            Self::CURLY_OPEN | Self::ROUND_OPEN | Self::ANGLE_OPEN | Self::SQUARE_OPEN
        )
    }

    /// Closing kind paired with a bracket open kind.
    pub const fn bracket_close(self) -> Option<TokenKind> {
        if self.is_bracket_open() {
            Some(TokenKind(self.0 + 1))
        } else {
            None
        }
    }

    /// Numeric float flag set.
    #[inline]
    pub const fn is_float(self) -> bool {
        self.is_number() && self.0 & Self::NUMBER_FLOAT_FLAG != 0
    }

    /// Numeric kind with the float flag added.
    #[inline]
    #[must_use]
    pub const fn with_float(self) -> Self {
        TokenKind(self.0 | Self::NUMBER_FLOAT_FLAG)
    }

    /// Prefix may legally be followed by zero digits (e.g. a lone octal `0`).
    #[inline]
    pub const fn allows_missing_digits(self) -> bool {
        self.is_number() && self.0 & Self::NUMBER_MISSED_DIGITS_FLAG != 0
    }

    /// Radix encoded in bits 8-10 of a numeric kind.
    ///
    /// Returns `None` for non-numeric kinds and for the two unused selectors.
    pub const fn number_base(self) -> Option<u32> {
        if !self.is_number() {
            return None;
        }
        match (self.0 & Self::NUMBER_BASE_MASK) >> 8 {
            0 => Some(10),
            1 => Some(2),
            2 => Some(4),
            3 => Some(8),
            4 => Some(12),
            5 => Some(16),
            _ => None,
        }
    }

    /// Numeric kind (variant 0) for a supported radix.
    pub const fn number_for_base(base: u32) -> Option<TokenKind> {
        match base {
            10 => Some(Self::NUMBER_DECIMAL),
            2 => Some(Self::NUMBER_BINARY),
            4 => Some(Self::NUMBER_QUATERNARY),
            8 => Some(Self::NUMBER_OCTAL),
            12 => Some(Self::NUMBER_DUODECIMAL),
            16 => Some(Self::NUMBER_HEX),
            _ => None,
        }
    }

    /// Keyword set index (0..8) of a keyword kind.
    pub const fn keyword_set(self) -> Option<u16> {
        if matches!(self.category(), KindCategory::Keyword) {
            Some((self.0 - Self::KEYWORD_FIRST) / Self::KEYWORD_SET_SIZE)
        } else {
            None
        }
    }

    /// Short name for atomic and control kinds.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::UNEXPECTED => "unexpected",
            Self::RAW_CHAR => "raw-char",
            Self::LINEFEED => "linefeed",
            Self::SPACE => "space",
            Self::TAB => "tab",
            Self::FORM_FEED => "form-feed",
            Self::IDENTIFIER => "identifier",
            Self::STRAY_PUNCT => "stray-punct",
            Self::ESCAPE => "escape",
            Self::LINE_CONTINUATION => "line-continuation",
            Self::COMMENT_SINGLE_LINE => "comment",
            Self::COMMENT_MULTI_LINE => "block-comment",
            Self::FIN => "fin",
            Self::DIRECTIVE_ENTER => "directive-enter",
            Self::DIRECTIVE_EXIT => "directive-exit",
            _ => return None,
        })
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{:?}(0x{:04X})", self.category(), self.0),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests;
