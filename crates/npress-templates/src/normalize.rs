//! Source and output text normalization.
//!
//! Template bodies arrive from the store carrying legacy escape artifacts
//! left by the upstream encoding: entity-escaped markup, literal `\n`
//! sequences, stray backslash escapes, quote-concatenation seams. They are
//! scrubbed before parsing. The rendered page gets a lighter tidy pass.

/// HTML-escape the five significant characters for `{{ }}` interpolation.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode entity-escaped markup: the named entities templates actually
/// arrive with, plus decimal and hex numeric references. Anything
/// unrecognized is left untouched.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_one(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_one(s: &str) -> Option<(char, usize)> {
    // `;` is ASCII, so its byte index is always a char boundary even when
    // multi-byte text follows the `&`.
    let end = s[1..].find(';').map(|i| i + 1)?;
    if end > 12 {
        return None;
    }
    let name = &s[1..end];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits
                .strip_prefix('x')
                .or_else(|| digits.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 1))
}

/// Scrub a template or partial body fetched from the store.
#[must_use]
pub fn clean_source(input: &str) -> String {
    let decoded = decode_entities(input);
    let unescaped = strip_escapes(&decoded.replace("\\n", "\n"));
    let collapsed = collapse_blank_lines(&unescaped);
    let joined = remove_quote_breaks(&collapsed);
    let stripped = strip_wrapping_quotes(&joined);
    stripped.replace("\\\"", "\"")
}

/// Tidy a rendered page: collapse blank-line runs, break runs of inter-tag
/// whitespace into single newlines, trim the ends.
#[must_use]
pub fn tidy_output(input: &str) -> String {
    let collapsed = collapse_blank_lines(input);
    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '>' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j] == '<' {
                out.push_str(">\n");
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out.trim().to_string()
}

/// Drop single-character backslash escapes, keeping `\\` pairs intact.
fn strip_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('\\') => out.push_str("\\\\"),
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn collapse_blank_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '\n' {
            while chars.peek() == Some(&'\n') {
                chars.next();
            }
        }
    }
    out
}

/// Remove `"<newline><whitespace>"` seams left by concatenated string
/// literals in the upstream encoding.
fn remove_quote_breaks(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '"' && i + 1 < chars.len() && chars[i + 1] == '\n' {
            let mut j = i + 2;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '"' {
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn strip_wrapping_quotes(input: &str) -> String {
    let s = input.strip_prefix('"').unwrap_or(input);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_significant_characters() {
        assert_eq!(escape_html(r#"<x>&""#), "&lt;x&gt;&amp;&quot;");
        assert_eq!(escape_html("it's"), "it&#039;s");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("&lt;p&gt;&amp;&quot;"), "<p>&\"");
        assert_eq!(decode_entities("&#039;&#x41;"), "'A");
        assert_eq!(decode_entities("fish &chips;"), "fish &chips;");
        assert_eq!(decode_entities("a & b"), "a & b");
    }

    #[test]
    fn multibyte_text_near_ampersand_left_intact() {
        assert_eq!(decode_entities("&aaaaaaaaaaé rest"), "&aaaaaaaaaaé rest");
        assert_eq!(decode_entities("thee & koffie, hè"), "thee & koffie, hè");
        assert_eq!(decode_entities("caf&eacute;"), "caf&eacute;");
        assert_eq!(decode_entities("&amp;é"), "&é");
    }

    #[test]
    fn cleans_escaped_newlines_and_quotes() {
        let raw = r#""<div>\n\n<span>\"{{title}}\"</span>\n</div>""#;
        assert_eq!(
            clean_source(raw),
            "<div>\n<span>\"{{title}}\"</span>\n</div>"
        );
    }

    #[test]
    fn decodes_entity_escaped_markup() {
        assert_eq!(clean_source("&lt;h1&gt;{{title}}&lt;/h1&gt;"), "<h1>{{title}}</h1>");
    }

    #[test]
    fn removes_quote_concatenation_seams() {
        assert_eq!(clean_source("<a>\"\n   \"<b>"), "<a><b>");
    }

    #[test]
    fn keeps_escaped_backslash_pairs() {
        assert_eq!(clean_source(r"a\\b"), r"a\\b");
        assert_eq!(clean_source(r"a\tb"), "atb");
    }

    #[test]
    fn tidies_rendered_output() {
        assert_eq!(
            tidy_output("  <div>\n\n\n<p>x</p>   </div>  "),
            "<div>\n<p>x</p>\n</div>"
        );
        assert_eq!(tidy_output("<b>text</b>"), "<b>text</b>");
    }
}
