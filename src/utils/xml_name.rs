//! XML name encoding
//!
//! Listing text is emitted through the XML *name* encoding convention: every
//! character that is not allowed in an XML name is replaced by `_xHHHH_`
//! (or `_xHHHHHHHH_` outside the Basic Multilingual Plane), and an underscore
//! that starts an `_xHHHH` run is itself escaped as `_x005F_` so the text
//! decodes back unchanged. Guide consumers already expect this form, so it is
//! applied to element content as well.

use regex::Regex;
use std::sync::OnceLock;

/// Matches an `_xHHHH` run at the start of the input
///
/// No trailing underscore is required: the next character may itself be
/// escaped, which would supply one.
fn escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^_[Xx][0-9a-fA-F]{4}").expect("valid escape pattern"))
}

/// Only the lowercase `x` form is produced and decoded
fn decode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"_x([0-9a-fA-F]{8}|[0-9a-fA-F]{4})_").expect("valid decode pattern")
    })
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn push_escape(out: &mut String, c: char) {
    let code = c as u32;
    if code > 0xFFFF {
        out.push_str(&format!("_x{:08X}_", code));
    } else {
        out.push_str(&format!("_x{:04X}_", code));
    }
}

/// Encode arbitrary text as a valid XML name
///
/// The first character must be a name-start character, the rest name
/// characters; everything else is escaped. An empty input stays empty.
pub fn encode_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for (index, c) in input.char_indices() {
        let valid = if index == 0 {
            is_name_start_char(c)
        } else {
            is_name_char(c)
        };

        if c == '_' && escape_pattern().is_match(&input[index..]) {
            push_escape(&mut out, c);
        } else if valid {
            out.push(c);
        } else {
            push_escape(&mut out, c);
        }
    }

    out
}

/// Reverse of [`encode_name`]
///
/// Escapes that do not map to a Unicode scalar value are left untouched.
pub fn decode_name(input: &str) -> String {
    decode_pattern()
        .replace_all(input, |caps: &regex::Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
