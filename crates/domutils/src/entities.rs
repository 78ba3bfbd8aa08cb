//! Entity encoding used by the serializer
//!
//! The serializer only needs a pure `text -> escaped text` function. It is
//! a trait so callers can plug in a different escaping table.

use std::borrow::Cow;

pub trait EntityEncoder {
    fn encode<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// XML escaping: the five predefined entities plus a hex character
/// reference for every non-ASCII code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlEntities;

impl EntityEncoder for XmlEntities {
    fn encode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        encode_xml(text)
    }
}

/// Escape `text` for use in XML/HTML text or a quoted attribute value.
///
/// Borrows the input when nothing needs escaping.
pub fn encode_xml(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find(needs_escape) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);

    for c in text[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !c.is_ascii() => out.push_str(&format!("&#x{:X};", c as u32)),
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

fn needs_escape(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'') || !c.is_ascii()
}
