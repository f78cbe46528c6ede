//! Per-profile scanning options.

/// Behaviour switches a profile carries into every scan.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Single-line comment markers only open a comment when they are the
    /// first non-whitespace token of their line. Elsewhere they scan as an
    /// operator.
    pub single_line_comment_only_at_line_start: bool,
    /// Escape + line terminator splices lines.
    pub honor_line_continuation: bool,
    /// `digit_group_separator` may appear between digits of a number.
    pub allow_digit_group_separator: bool,
    /// Radix of numbers without a prefix. One of 2, 4, 8, 10, 12, 16.
    pub default_numeric_base: u32,
    /// Symbol skipped inside numbers when separators are allowed.
    pub digit_group_separator: char,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            single_line_comment_only_at_line_start: false,
            honor_line_continuation: true,
            allow_digit_group_separator: false,
            default_numeric_base: 10,
            digit_group_separator: '\'',
        }
    }
}

impl Options {
    /// Separator symbol if separators are enabled.
    #[inline]
    pub fn separator(&self) -> Option<char> {
        self.allow_digit_group_separator
            .then_some(self.digit_group_separator)
    }
}
