//! Identifier and literal quoting utilities.
//!
//! Everything produced here is reversible by the tokenizer: quoting a
//! value and lexing the result yields the original value back.

use crate::keywords::Keyword;
use crate::strings;

/// Escapes a string for inclusion in a single-quoted literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Returns `s` as a single-quoted string literal with escapes applied.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Decodes a single- or double-quoted string literal, including its
/// quotes.
pub fn unquote_literal(quoted: &str) -> Result<String, strings::DecodeError> {
    strings::unquote_string(&quoted[1..quoted.len() - 1])
}

/// Returns `s` enclosed in dollar-quote delimiters that do not occur
/// in `s`.
///
/// The tag search walks hex numerals, reversing their digits, until a
/// delimiter free of collisions is found; `$$` is tried first.
pub fn dollar_quote_literal(text: &str) -> String {
    let mut quote = "$$".to_string();
    let mut qq: u64 = 0;

    while text.contains(&quote) {
        if qq % 16 < 10 {
            qq += 10 - qq % 16;
        }
        let tag: String = format!("{qq:x}").chars().rev().collect();
        quote = format!("${tag}$");
        qq += 1;
    }

    format!("{quote}{text}{quote}")
}

/// Determines if an identifier requires backtick quoting.
pub fn needs_quoting(name: &str, allow_reserved: bool, allow_num: bool) -> bool {
    if name.is_empty() || name.starts_with('@') || name.contains("::") {
        // Such strings are not identifiers at all; they are never
        // quotable and callers handle them elsewhere.
        return false;
    }

    let is_ident = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    let is_num = allow_num
        && !name.is_empty()
        && name.chars().all(|c| c.is_ascii_digit())
        && (name.len() == 1 || !name.starts_with('0'));

    let lowered = name.to_lowercase();
    let is_reserved = lowered != "__type__"
        && lowered != "__std__"
        && Keyword::lookup(&lowered).is_some_and(Keyword::is_reserved);

    !(is_ident || is_num) || (!allow_reserved && is_reserved)
}

fn quote_ident_always(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quotes an identifier with backticks when required.
///
/// With `force`, the identifier is always quoted. `allow_reserved`
/// permits reserved keywords to pass unquoted; `allow_num` permits bare
/// numbers.
pub fn quote_ident(name: &str, force: bool, allow_reserved: bool, allow_num: bool) -> String {
    if force || needs_quoting(name, allow_reserved, allow_num) {
        quote_ident_always(name)
    } else {
        name.to_string()
    }
}

/// Removes backtick quoting from an identifier, if present.
pub fn unquote_ident(name: &str) -> String {
    if name.len() > 1 && name.starts_with('`') && name.ends_with('`') {
        name[1..name.len() - 1].replace("``", "`")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn literals_quote_reversibly() {
        for s in ["", "plain", "with 'quotes'", "tab\t\\slash\nline", "жарко"] {
            assert_eq!(unquote_literal(&quote_literal(s)).unwrap(), s);
        }
    }

    #[test]
    fn idents_stay_bare_when_safe() {
        assert_eq!(quote_ident("foo", false, false, false), "foo");
        assert_eq!(quote_ident("_foo1", false, false, false), "_foo1");
    }

    #[test]
    fn reserved_keywords_get_backticks() {
        assert_eq!(quote_ident("select", false, false, false), "`select`");
        assert_eq!(quote_ident("select", false, true, false), "select");
        // Unreserved keywords never need quoting.
        assert_eq!(quote_ident("property", false, false, false), "property");
    }

    #[test]
    fn non_identifiers_get_backticks() {
        assert_eq!(quote_ident("foo-bar", false, false, false), "`foo-bar`");
        assert_eq!(quote_ident("back`tick", false, false, false), "`back``tick`");
        assert_eq!(quote_ident("42", false, false, false), "`42`");
        assert_eq!(quote_ident("42", false, false, true), "42");
    }

    #[test]
    fn force_always_quotes() {
        assert_eq!(quote_ident("foo", true, false, false), "`foo`");
    }

    #[test]
    fn quote_then_unquote_is_identity() {
        for s in ["foo", "select", "we`ird", "42"] {
            assert_eq!(unquote_ident(&quote_ident(s, true, false, false)), s);
        }
    }

    #[test]
    fn dollar_quotes_avoid_collisions() {
        assert_eq!(dollar_quote_literal("plain"), "$$plain$$");
        let quoted = dollar_quote_literal("has $$ inside");
        assert!(quoted.starts_with("$a$"), "{quoted}");
        assert!(quoted.ends_with("$a$"));
        let tricky = "mentions $$ and $a$ too";
        let quoted = dollar_quote_literal(tricky);
        let tag_end = quoted[1..].find('$').unwrap() + 2;
        let tag = &quoted[..tag_end];
        assert!(!tricky.contains(tag));
    }
}
