//! Properties-syntax parser with line tracking.
//!
//! Follows the standard key/value properties rules: `#`/`!` comments,
//! backslash line continuation, `=`, `:` or whitespace separators and
//! backslash escapes including `\uXXXX`. Every parsed property remembers
//! the 1-based line and column where its key starts.
//!
//! There is no error outcome: any text parses, and oddities such as a
//! malformed `\u` escape are kept literally.

use std::borrow::Cow;

/// One `key=value` assignment in definition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProperty {
    /// Unescaped key.
    pub key: String,
    /// Unescaped value.
    pub value: String,
    /// Line where the logical line starts.
    pub line: usize,
    /// Column of the first key character.
    pub column: usize,
}

/// Decode raw bytes as UTF-8, falling back to ISO-8859-1.
///
/// A leading UTF-8 byte order mark is dropped.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Parse properties text into assignments, repeated keys included.
pub fn parse(text: &str) -> Vec<ParsedProperty> {
    let lines = natural_lines(text);
    let mut properties = Vec::new();
    let mut next = 0;

    while next < lines.len() {
        let line_number = next + 1;
        let line = lines[next];
        next += 1;

        let content = line.trim_start_matches(is_blank);
        if content.is_empty() || content.starts_with('#') || content.starts_with('!') {
            continue;
        }
        let column = line[..line.len() - content.len()].chars().count() + 1;

        let mut logical = content.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            if next >= lines.len() {
                break;
            }
            logical.push_str(lines[next].trim_start_matches(is_blank));
            next += 1;
        }

        let (key, value) = split_key_value(&logical);
        properties.push(ParsedProperty {
            key: unescape(key),
            value: unescape(value),
            line: line_number,
            column,
        });
    }

    properties
}

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Split on `\n`, `\r` and `\r\n`.
fn natural_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// A line continues when it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line (leading blanks already removed) into raw key
/// and raw value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (idx, c) in line.char_indices() {
        if !escaped && (c == '=' || c == ':') {
            key_end = idx;
            value_start = idx + c.len_utf8();
            has_separator = true;
            break;
        }
        if !escaped && is_blank(c) {
            key_end = idx;
            value_start = idx + c.len_utf8();
            break;
        }
        escaped = c == '\\' && !escaped;
    }

    let rest = &line[value_start..];
    let mut skip = rest.len();
    for (idx, c) in rest.char_indices() {
        if is_blank(c) {
            continue;
        }
        if !has_separator && (c == '=' || c == ':') {
            has_separator = true;
            continue;
        }
        skip = idx;
        break;
    }

    (&line[..key_end], &rest[skip..])
}

fn unescape(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&escaped) = chars.get(i) else {
            break;
        };
        i += 1;
        match escaped {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\x0c'),
            'u' => match hex_unit(&chars, i) {
                Some(unit) => {
                    i += 4;
                    out.push(decode_unit(unit, &chars, &mut i));
                }
                None => out.push_str("\\u"),
            },
            other => out.push(other),
        }
    }

    out
}

/// Read four hex digits starting at `at`.
fn hex_unit(chars: &[char], at: usize) -> Option<u16> {
    let digits: String = chars.get(at..at + 4)?.iter().collect();
    if digits.chars().all(|c| c.is_ascii_hexdigit()) {
        u16::from_str_radix(&digits, 16).ok()
    } else {
        None
    }
}

/// Turn a UTF-16 unit into a char, consuming a following `\uXXXX` low
/// surrogate when `unit` is a high surrogate.
fn decode_unit(unit: u16, chars: &[char], i: &mut usize) -> char {
    if (0xD800..0xDC00).contains(&unit)
        && chars.get(*i) == Some(&'\\')
        && chars.get(*i + 1) == Some(&'u')
    {
        if let Some(low) = hex_unit(chars, *i + 2).filter(|low| (0xDC00..0xE000).contains(low)) {
            *i += 6;
            return char::decode_utf16([unit, low])
                .next()
                .and_then(Result::ok)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
        }
    }
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}
