//! Stock literal sub-parsers.
//!
//! Both parsers are fed the symbols that follow the literal prefix, one at a
//! time, and decode as they go. Malformed escapes never stop a literal: the
//! parser substitutes U+FFFD (or the escaped symbol itself) and reports a
//! warning, so the scan keeps going with a usable token.

use scanforge_core::{LiteralParser, LiteralParserFactory, LiteralSignal};

/// Longest delimiter a raw string may declare.
pub const RAW_DELIMITER_MAX: usize = 16;

/// Where a quoted literal is inside an escape sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Escape {
    None,
    /// Right after the backslash.
    Start,
    /// Backslash followed by `\r`; a following `\n` belongs to the splice.
    SplicedCr,
    /// `\ooo`, at most three digits.
    Octal { value: u32, digits: u8 },
    /// `\x...`, any number of digits.
    Hex { value: u32, digits: u8 },
    /// `\uXXXX` or `\UXXXXXXXX`, exactly `width` digits.
    Universal { value: u32, digits: u8, width: u8 },
}

/// Quoted text closed by its opening quote, with C escapes.
///
/// Simple escapes (`\n \t \r \a \b \f \v \0 \\ \' \" \?`), octal `\ooo`,
/// hex `\x..`, and universal `\uXXXX` / `\UXXXXXXXX` are decoded. A
/// backslash before a line terminator splices the lines. An unescaped line
/// terminator is an error.
#[derive(Debug)]
pub struct QuotedLiteralParser {
    quote: char,
    single: bool,
    decoded: String,
    escape: Escape,
    /// Symbols decoded so far, for single-symbol literals.
    count: usize,
}

impl QuotedLiteralParser {
    /// String-like literal closed by `quote`.
    pub fn new(quote: char) -> Self {
        QuotedLiteralParser {
            quote,
            single: false,
            decoded: String::new(),
            escape: Escape::None,
            count: 0,
        }
    }

    /// Character literal: warns when it does not hold exactly one symbol.
    pub fn character(quote: char) -> Self {
        QuotedLiteralParser {
            single: true,
            ..Self::new(quote)
        }
    }

    /// Factory for string-like literals closed by `quote`.
    pub fn factory(quote: char) -> LiteralParserFactory {
        Box::new(move || -> Box<dyn LiteralParser> { Box::new(Self::new(quote)) })
    }

    /// Factory for character literals closed by `quote`.
    pub fn character_factory(quote: char) -> LiteralParserFactory {
        Box::new(move || -> Box<dyn LiteralParser> { Box::new(Self::character(quote)) })
    }

    fn push(&mut self, decoded: char) {
        self.decoded.push(decoded);
        self.count += 1;
    }

    fn push_code(&mut self, value: u32) -> Option<String> {
        match char::from_u32(value) {
            Some(decoded) => {
                self.push(decoded);
                None
            }
            None => {
                self.push(char::REPLACEMENT_CHARACTER);
                Some(format!("escape value {value:#x} is not a character"))
            }
        }
    }

    /// Handle `symbol` outside any escape.
    fn text(&mut self, symbol: char) -> LiteralSignal {
        match symbol {
            '\n' | '\r' => LiteralSignal::Error("newline in literal".to_owned()),
            '\\' => {
                self.escape = Escape::Start;
                LiteralSignal::Continue
            }
            _ if symbol == self.quote => self.close(),
            _ => {
                self.push(symbol);
                LiteralSignal::Continue
            }
        }
    }

    fn close(&mut self) -> LiteralSignal {
        if !self.single {
            return LiteralSignal::StopOk;
        }
        match self.count {
            0 => LiteralSignal::StopWithWarning("empty character literal".to_owned()),
            1 => LiteralSignal::StopOk,
            _ => LiteralSignal::StopWithWarning("multi-character literal".to_owned()),
        }
    }

    /// First symbol after the backslash.
    fn escape_start(&mut self, symbol: char) -> LiteralSignal {
        self.escape = Escape::None;
        let simple = match symbol {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'a' => Some('\x07'),
            'b' => Some('\x08'),
            'f' => Some('\x0C'),
            'v' => Some('\x0B'),
            '\\' | '\'' | '"' | '?' => Some(symbol),
            _ => None,
        };
        if let Some(decoded) = simple {
            self.push(decoded);
            return LiteralSignal::Continue;
        }
        match symbol {
            '0'..='7' => {
                self.escape = Escape::Octal {
                    value: symbol.to_digit(8).unwrap_or(0),
                    digits: 1,
                };
                LiteralSignal::Continue
            }
            'x' => {
                self.escape = Escape::Hex { value: 0, digits: 0 };
                LiteralSignal::Continue
            }
            'u' | 'U' => {
                self.escape = Escape::Universal {
                    value: 0,
                    digits: 0,
                    width: if symbol == 'u' { 4 } else { 8 },
                };
                LiteralSignal::Continue
            }
            '\n' => LiteralSignal::Continue,
            '\r' => {
                self.escape = Escape::SplicedCr;
                LiteralSignal::Continue
            }
            other => {
                self.push(other);
                LiteralSignal::ContinueWithWarning(format!("unknown escape sequence \\{other}"))
            }
        }
    }

    /// An escape ended before `symbol`; decode `symbol` as text and attach
    /// `warning` to whatever it produces.
    fn after_escape(&mut self, warning: Option<String>, symbol: char) -> LiteralSignal {
        let signal = self.text(symbol);
        let Some(warning) = warning else {
            return signal;
        };
        match signal {
            LiteralSignal::Continue => LiteralSignal::ContinueWithWarning(warning),
            LiteralSignal::StopOk => LiteralSignal::StopWithWarning(warning),
            other => other,
        }
    }

    /// Flush an escape that was still collecting digits.
    fn end_escape(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.escape, Escape::None) {
            Escape::None | Escape::Start | Escape::SplicedCr => None,
            Escape::Hex { digits: 0, .. } => {
                Some("\\x used with no following hex digits".to_owned())
            }
            Escape::Octal { value, .. } | Escape::Hex { value, .. } => self.push_code(value),
            Escape::Universal { .. } => {
                self.push(char::REPLACEMENT_CHARACTER);
                Some("incomplete universal character name".to_owned())
            }
        }
    }
}

impl LiteralParser for QuotedLiteralParser {
    fn reset(&mut self) {
        self.decoded.clear();
        self.escape = Escape::None;
        self.count = 0;
    }

    fn parse_symbol(&mut self, symbol: char) -> LiteralSignal {
        match self.escape {
            Escape::None => self.text(symbol),
            Escape::Start => self.escape_start(symbol),
            Escape::SplicedCr => {
                self.escape = Escape::None;
                if symbol == '\n' {
                    LiteralSignal::Continue
                } else {
                    self.text(symbol)
                }
            }
            Escape::Octal { value, digits } => match symbol.to_digit(8) {
                Some(digit) if digits < 3 => {
                    let value = value * 8 + digit;
                    if digits + 1 == 3 {
                        self.escape = Escape::None;
                        let warning = self.push_code(value);
                        return warning.map_or(LiteralSignal::Continue, LiteralSignal::ContinueWithWarning);
                    }
                    self.escape = Escape::Octal {
                        value,
                        digits: digits + 1,
                    };
                    LiteralSignal::Continue
                }
                _ => {
                    let warning = self.end_escape();
                    self.after_escape(warning, symbol)
                }
            },
            Escape::Hex { value, digits } => match symbol.to_digit(16) {
                Some(digit) => {
                    // Saturate; the code point check rejects it later.
                    let value = value.saturating_mul(16).saturating_add(digit);
                    self.escape = Escape::Hex {
                        value,
                        digits: digits.saturating_add(1),
                    };
                    LiteralSignal::Continue
                }
                None => {
                    let warning = self.end_escape();
                    self.after_escape(warning, symbol)
                }
            },
            Escape::Universal {
                value,
                digits,
                width,
            } => match symbol.to_digit(16) {
                Some(digit) => {
                    let value = value * 16 + digit;
                    if digits + 1 == width {
                        self.escape = Escape::None;
                        let warning = self.push_code(value);
                        return warning.map_or(LiteralSignal::Continue, LiteralSignal::ContinueWithWarning);
                    }
                    self.escape = Escape::Universal {
                        value,
                        digits: digits + 1,
                        width,
                    };
                    LiteralSignal::Continue
                }
                None => {
                    let warning = self.end_escape();
                    self.after_escape(warning, symbol)
                }
            },
        }
    }

    fn take_decoded(&mut self) -> String {
        std::mem::take(&mut self.decoded)
    }
}

/// Where a raw string is.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Raw {
    /// Reading the delimiter up to `(`.
    Delimiter,
    /// Reading the body; the close sequence is `)delimiter"`.
    Body,
}

/// C++ raw string: `R"delim( ... )delim"` with no escapes.
///
/// Fed the symbols after `R"`. The body may span lines; the decoded text is
/// the body without delimiters.
#[derive(Debug)]
pub struct RawStringParser {
    state: Raw,
    delimiter: String,
    decoded: String,
}

impl RawStringParser {
    pub fn new() -> Self {
        RawStringParser {
            state: Raw::Delimiter,
            delimiter: String::new(),
            decoded: String::new(),
        }
    }

    pub fn factory() -> LiteralParserFactory {
        Box::new(|| -> Box<dyn LiteralParser> { Box::new(Self::new()) })
    }

    /// Length of `)delimiter"` in bytes.
    fn close_len(&self) -> usize {
        self.delimiter.len() + 2
    }

    fn body_closed(&self) -> bool {
        let Some(tail) = self
            .decoded
            .len()
            .checked_sub(self.close_len())
            .and_then(|start| self.decoded.get(start..))
        else {
            return false;
        };
        tail.strip_prefix(')')
            .and_then(|rest| rest.strip_suffix('"'))
            .is_some_and(|delimiter| delimiter == self.delimiter)
    }
}

impl Default for RawStringParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralParser for RawStringParser {
    fn reset(&mut self) {
        self.state = Raw::Delimiter;
        self.delimiter.clear();
        self.decoded.clear();
    }

    fn parse_symbol(&mut self, symbol: char) -> LiteralSignal {
        match self.state {
            Raw::Delimiter => {
                if symbol == '(' {
                    self.state = Raw::Body;
                    return LiteralSignal::Continue;
                }
                if symbol.is_whitespace()
                    || symbol.is_control()
                    || matches!(symbol, ')' | '\\' | '"')
                    || self.delimiter.len() >= RAW_DELIMITER_MAX
                {
                    return LiteralSignal::Error("invalid raw string delimiter".to_owned());
                }
                self.delimiter.push(symbol);
                LiteralSignal::Continue
            }
            Raw::Body => {
                self.decoded.push(symbol);
                if symbol == '"' && self.body_closed() {
                    let body = self.decoded.len() - self.close_len();
                    self.decoded.truncate(body);
                    return LiteralSignal::StopOk;
                }
                LiteralSignal::Continue
            }
        }
    }

    fn take_decoded(&mut self) -> String {
        std::mem::take(&mut self.decoded)
    }

    fn finish_at_end(&mut self) -> LiteralSignal {
        LiteralSignal::Error("unterminated raw string".to_owned())
    }
}
