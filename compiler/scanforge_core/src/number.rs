//! Base-aware numeric accumulation.
//!
//! Values are built digit by digit while the scanner is in a number state:
//! `value = value * base + digit`, with a sticky overflow flag. Floats add a
//! fraction and a parallel scale accumulated the same way and finish as
//! `integer + fraction / scale`. Overflow is never an error here; it travels
//! on the token and the caller decides.

use crate::kind::TokenKind;
use crate::token::{FloatData, IntegerData, TokenData};

/// Value of `symbol` as a digit of `base`, for bases up to 16.
///
/// Duodecimal uses `a`/`b` (either case) for ten and eleven.
#[inline]
pub fn digit_value(symbol: char, base: u32) -> Option<u32> {
    if base > 16 {
        return None;
    }
    symbol.to_digit(base)
}

/// Running state of one numeric literal.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberAccumulator {
    kind: TokenKind,
    base: u32,
    integer: u64,
    integer_overflow: bool,
    fraction: u64,
    scale: u64,
    fraction_overflow: bool,
    is_float: bool,
}

impl NumberAccumulator {
    /// Fresh accumulator for a numeric kind; the base comes from the kind bits.
    pub fn new(kind: TokenKind) -> Self {
        NumberAccumulator {
            kind,
            base: kind.number_base().unwrap_or(10),
            integer: 0,
            integer_overflow: false,
            fraction: 0,
            scale: 1,
            fraction_overflow: false,
            is_float: false,
        }
    }

    /// Restart for a new literal of `kind`.
    pub fn begin(&mut self, kind: TokenKind) {
        *self = Self::new(kind);
    }

    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Kind to emit, with the float flag when a fraction was started.
    pub fn kind(&self) -> TokenKind {
        if self.is_float {
            self.kind.with_float()
        } else {
            self.kind
        }
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        self.is_float
    }

    pub fn integer(&self) -> u64 {
        self.integer
    }

    pub fn integer_overflow(&self) -> bool {
        self.integer_overflow
    }

    pub fn fraction_overflow(&self) -> bool {
        self.fraction_overflow
    }

    /// Append one integer-part digit (already validated against the base).
    pub fn push_digit(&mut self, digit: u32) {
        if self.integer_overflow {
            return;
        }
        match self
            .integer
            .checked_mul(u64::from(self.base))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(value) => self.integer = value,
            None => self.integer_overflow = true,
        }
    }

    /// Switch to the fractional part.
    pub fn start_fraction(&mut self) {
        self.is_float = true;
    }

    /// Append one fractional digit.
    ///
    /// Once either the fraction or its scale overflows both freeze, so the
    /// finished value keeps the precision reached so far.
    pub fn push_fraction_digit(&mut self, digit: u32) {
        self.is_float = true;
        if self.fraction_overflow {
            return;
        }
        let base = u64::from(self.base);
        let next = self
            .fraction
            .checked_mul(base)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .zip(self.scale.checked_mul(base));
        match next {
            Some((fraction, scale)) => {
                self.fraction = fraction;
                self.scale = scale;
            }
            None => self.fraction_overflow = true,
        }
    }

    /// `integer + fraction / scale`.
    #[allow(
        clippy::cast_precision_loss,
        reason = "float literals are approximations by definition"
    )]
    pub fn float_value(&self) -> f64 {
        self.integer as f64 + self.fraction as f64 / self.scale as f64
    }

    /// Parsed payload for the finished token.
    pub fn finish(&self, suffix_start: u32) -> TokenData {
        if self.is_float {
            TokenData::Float(FloatData {
                value: self.float_value(),
                integer_overflow: self.integer_overflow,
                fraction_overflow: self.fraction_overflow,
                suffix_start,
            })
        } else {
            TokenData::Integer(IntegerData {
                value: self.integer,
                overflow: self.integer_overflow,
                suffix_start,
            })
        }
    }
}

impl Default for NumberAccumulator {
    fn default() -> Self {
        Self::new(TokenKind::NUMBER_DECIMAL)
    }
}

/// Accumulate a whole digit string in `base`, skipping `separator`.
///
/// Returns `None` if a symbol is neither a digit of `base` nor the separator.
pub fn accumulate(digits: &str, base: u32, separator: Option<char>) -> Option<(u64, bool)> {
    let kind = TokenKind::number_for_base(base)?;
    let mut acc = NumberAccumulator::new(kind);
    for c in digits.chars() {
        if Some(c) == separator {
            continue;
        }
        acc.push_digit(digit_value(c, base)?);
    }
    Some((acc.integer(), acc.integer_overflow()))
}
