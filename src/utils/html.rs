// ABOUTME: HTML escaping and strict markup stripping for untrusted tool input
// ABOUTME: Removes every tag, comment and declaration; drops script-like element bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use std::borrow::Cow;

/// Elements whose content is discarded together with the tags
const NON_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "noscript", "template"];

/// Escape `&`, `<` and `>`
#[must_use]
pub fn escape_basic_html(input: &str) -> Cow<'_, str> {
    html_escape::encode_text(input)
}

/// Strip all markup, keeping text only.
///
/// Tags, comments, declarations and processing instructions are removed and the
/// content of script-like elements is dropped. Character references are decoded
/// and the remaining text is re-escaped with [`escape_basic_html`], so for plain
/// text both functions agree. A `<` not followed by a tag name is kept as text.
#[must_use]
pub fn strip_markup(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match markup_len(candidate) {
            Some(consumed) => rest = &candidate[consumed..],
            None => {
                text.push('<');
                rest = &candidate[1..];
            }
        }
    }
    text.push_str(rest);

    let decoded = html_escape::decode_html_entities(&text);
    escape_basic_html(&decoded).into_owned()
}

/// Byte length of the markup construct at the start of `candidate`, `None` when
/// the leading `<` is plain text
fn markup_len(candidate: &str) -> Option<usize> {
    let after = &candidate[1..];
    if after.starts_with("!--") {
        return Some(after.find("-->").map_or(candidate.len(), |end| 1 + end + 3));
    }

    match after.chars().next()? {
        '!' | '?' => Some(tag_len(candidate)),
        '/' => after[1..]
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .map(|_| tag_len(candidate)),
        first if first.is_ascii_alphabetic() => {
            let name: String = after
                .chars()
                .take_while(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase();
            let open_len = tag_len(candidate);
            let self_closing = candidate[..open_len].ends_with("/>");
            if NON_TEXT_TAGS.contains(&name.as_str()) && !self_closing {
                Some(open_len + element_body_len(&candidate[open_len..], &name))
            } else {
                Some(open_len)
            }
        }
        _ => None,
    }
}

/// Length up to and including the closing `>`, quotes respected; the whole input
/// when the tag is never closed
fn tag_len(candidate: &str) -> usize {
    let mut quote = None;
    for (index, ch) in candidate.char_indices().skip(1) {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => return index + 1,
            (None, _) => {}
        }
    }
    candidate.len()
}

/// Length of an element body including its closing tag
fn element_body_len(body: &str, name: &str) -> usize {
    // ASCII lowercasing keeps byte offsets stable
    let lowered = body.to_ascii_lowercase();
    lowered
        .find(&format!("</{name}"))
        .map_or(body.len(), |start| start + tag_len(&body[start..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_matches_escaped_form() {
        for input in ["Dinner for four", "Tom & Jerry", "1 < 2 and 3 > 2", "<3 pasta"] {
            assert_eq!(strip_markup(input), escape_basic_html(input), "{input}");
        }
    }

    #[test]
    fn test_tags_and_script_bodies_removed() {
        assert_eq!(strip_markup("<b>bold</b> text"), "bold text");
        assert_eq!(strip_markup("a<script>alert(1)</script>b"), "ab");
        assert_eq!(strip_markup("x<!-- hidden -->y"), "xy");
        assert_eq!(strip_markup("<img src=\"a>b\" onerror=x>after"), "after");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(strip_markup("&lt;b&gt;"), "&lt;b&gt;");
        assert_ne!(strip_markup("&amp;"), escape_basic_html("&amp;"));
    }
}
