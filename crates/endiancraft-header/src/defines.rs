//! `#define` collection.

use std::sync::LazyLock;

use endiancraft::constants::ResolvedConstants;
use regex::Regex;

/// Object-like macros only: a name directly followed by `(` is function-like and never matches.
static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*#[ \t]*define[ \t]+([A-Za-z_]\w*)[ \t]+(.*?)[ \t]*$").unwrap()
});

/// An object-like macro whose value is not an integer, e.g. `__attribute__((packed))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueDefine {
    pub name: String,
    pub value: String,
}

/// Macros found in one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defines {
    /// Integer macros, in definition order. Later definitions win.
    pub constants: ResolvedConstants,
    pub opaque: Vec<OpaqueDefine>,
}

/// Collects `#define NAME VALUE` lines from comment-free header text.
///
/// A value made of one integer wrapped in any number of parentheses
/// (`32`, `(32)`, `((32))`) becomes a constant. Everything else is kept as
/// an [OpaqueDefine] so the caller can decide what to do with it.
pub fn parse_defines(text: &str) -> Defines {
    let mut defines = Defines::default();

    for caps in DEFINE.captures_iter(text) {
        let name = &caps[1];
        let value = caps[2].trim();
        if value.is_empty() {
            continue;
        }

        let unwrapped = value.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
        match parse_c_integer(unwrapped) {
            Some(number) => {
                defines.constants.insert(name, number);
            }
            None => {
                tracing::debug!(name, value, "non-integer macro");
                defines.opaque.push(OpaqueDefine {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    defines
}

/// Parses a C integer literal: decimal, `0x` hex, `0b` binary, `0o` or
/// leading-zero octal, with an optional sign and `u`/`l` suffixes.
pub fn parse_c_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let lower = text.to_ascii_lowercase();
    let digits = lower.trim_end_matches(['u', 'l']);

    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}
