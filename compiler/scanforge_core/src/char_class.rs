//! Character classification table.
//!
//! Every step of the scanner starts with one table lookup. ASCII symbols
//! have individual entries; all non-ASCII symbols share one class, which by
//! default lets them take part in identifiers.

use bitflags::bitflags;

bitflags! {
    /// Category hints for a single symbol.
    ///
    /// Categories are not mutually exclusive: `'` can be both an operator
    /// character and a literal prefix, `7` both a digit and an identifier
    /// character. The scanner decides by state which hint applies.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct CharClass: u16 {
        /// Decimal digit `0-9`.
        const DIGIT = 1 << 0;
        /// Hex digit `0-9a-fA-F`.
        const HEX_DIGIT = 1 << 1;
        /// May start an identifier.
        const IDENTIFIER_FIRST = 1 << 2;
        /// May continue an identifier.
        const IDENTIFIER = 1 << 3;
        /// Horizontal whitespace.
        const WHITESPACE = 1 << 4;
        /// Line terminator (`\n`, `\r`).
        const LINEFEED = 1 << 5;
        /// Appears in at least one operator sequence.
        const OPERATOR = 1 << 6;
        /// Opening bracket.
        const OPEN = 1 << 7;
        /// Closing bracket.
        const CLOSE = 1 << 8;
        /// Escape symbol (line continuation trigger).
        const ESCAPE = 1 << 9;
        /// First symbol of a literal prefix.
        const STRING_LITERAL_PREFIX = 1 << 10;
        /// Punctuation with no operator meaning, emitted as a lone token.
        const STRAY_PUNCT = 1 << 11;
    }
}

/// Number of individually classified symbols.
pub const ASCII_TABLE_SIZE: usize = 128;

/// Symbol → class lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharClassTable {
    ascii: [CharClass; ASCII_TABLE_SIZE],
    non_ascii: CharClass,
}

impl CharClassTable {
    /// Table with every symbol unclassified.
    pub const fn empty() -> Self {
        CharClassTable {
            ascii: [CharClass::empty(); ASCII_TABLE_SIZE],
            non_ascii: CharClass::empty(),
        }
    }

    /// Letters, digits, whitespace, line terminators, and the backslash escape.
    ///
    /// Operators, brackets, and literal prefixes are not part of the base
    /// table: the profile builder derives them from the sequences it is given.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for b in 0u8..128 {
            let c = char::from(b);
            let mut class = CharClass::empty();
            if c.is_ascii_digit() {
                class |= CharClass::DIGIT | CharClass::HEX_DIGIT | CharClass::IDENTIFIER;
            }
            if c.is_ascii_hexdigit() {
                class |= CharClass::HEX_DIGIT;
            }
            if c.is_ascii_alphabetic() || c == '_' {
                class |= CharClass::IDENTIFIER_FIRST | CharClass::IDENTIFIER;
            }
            if matches!(c, ' ' | '\t' | '\x0B' | '\x0C') {
                class |= CharClass::WHITESPACE;
            }
            if matches!(c, '\n' | '\r') {
                class |= CharClass::LINEFEED;
            }
            if c == '\\' {
                class |= CharClass::ESCAPE;
            }
            table.ascii[usize::from(b)] = class;
        }
        table.non_ascii = CharClass::IDENTIFIER_FIRST | CharClass::IDENTIFIER;
        table
    }

    /// Class of `symbol`.
    #[inline]
    pub fn classify(&self, symbol: char) -> CharClass {
        match self.ascii.get(symbol as usize) {
            Some(class) => *class,
            None => self.non_ascii,
        }
    }

    /// Replace the class of an ASCII symbol, or of all non-ASCII symbols.
    pub fn set(&mut self, symbol: char, class: CharClass) {
        match self.ascii.get_mut(symbol as usize) {
            Some(slot) => *slot = class,
            None => self.non_ascii = class,
        }
    }

    /// Add flags to a symbol's class.
    pub fn insert(&mut self, symbol: char, class: CharClass) {
        let current = self.classify(symbol);
        self.set(symbol, current | class);
    }

    /// Remove flags from a symbol's class.
    pub fn remove(&mut self, symbol: char, class: CharClass) {
        let current = self.classify(symbol);
        self.set(symbol, current - class);
    }

    /// Class shared by every symbol above U+007F.
    pub fn non_ascii(&self) -> CharClass {
        self.non_ascii
    }

    /// Replace the class shared by every symbol above U+007F.
    pub fn set_non_ascii(&mut self, class: CharClass) {
        self.non_ascii = class;
    }
}

impl Default for CharClassTable {
    fn default() -> Self {
        Self::standard()
    }
}
