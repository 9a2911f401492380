//! Decoding of quoted literals.
//!
//! The tokenizer matches whole literals; the functions here decode their
//! interiors, validating escape sequences as they go. Offsets in errors
//! are relative to the start of the decoded slice.

/// An invalid escape sequence or malformed quoted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// The error message.
    pub message: String,
    /// The byte offset of the offending sequence, relative to the
    /// decoded slice.
    pub offset: usize,
    /// An optional fix suggestion.
    pub hint: Option<String>,
}

impl DecodeError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Shifts the error offset by the length of a literal prefix.
    pub fn shift(mut self, by: usize) -> Self {
        self.offset += by;
        self
    }
}

/// Decodes the interior of a plain (escaping) string literal.
pub fn unquote_string(s: &str) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(s.len());
    decode_escapes(s, false, |piece| match piece {
        Piece::Char(c) => out.push(c),
        Piece::Byte(b) => out.push(b as char),
        Piece::Str(text) => out.push_str(text),
    })?;
    Ok(out)
}

/// Decodes the interior of a bytes literal.
pub fn unquote_bytes(s: &str) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(s.len());
    decode_escapes(s, true, |piece| match piece {
        Piece::Char(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        Piece::Byte(b) => out.push(b),
        Piece::Str(text) => out.extend_from_slice(text.as_bytes()),
    })?;
    Ok(out)
}

/// Decodes a backtick-quoted name, including the surrounding backticks.
pub fn unquote_ident(quoted: &str) -> Result<String, DecodeError> {
    let inner = quoted
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
        .ok_or_else(|| DecodeError::new("quoted name must be enclosed in backticks", 0))?;

    if inner.is_empty() {
        return Err(DecodeError::new("backtick-quoted name must not be empty", 0));
    }

    let name = inner.replace("``", "`");

    if name.starts_with('@') {
        return Err(DecodeError::new("name cannot start with '@'", 0));
    }
    if name.contains("::") {
        return Err(DecodeError::new("name cannot contain '::'", 0));
    }
    if name.starts_with("__") && name.ends_with("__") {
        return Err(DecodeError::new(
            "backtick-quoted names surrounded by double underscores are forbidden",
            0,
        ));
    }

    Ok(name)
}

enum Piece<'a> {
    Char(char),
    Byte(u8),
    Str(&'a str),
}

fn decode_escapes<'a>(
    s: &'a str,
    bytes: bool,
    mut emit: impl FnMut(Piece<'a>),
) -> Result<(), DecodeError> {
    let mut chars = s.char_indices().peekable();
    let mut plain_start = 0;

    while let Some((at, c)) = chars.next() {
        if c != '\\' {
            continue;
        }

        // Flush the plain run before the escape.
        if at > plain_start {
            flush_plain(s, plain_start, at, bytes, &mut emit)?;
        }

        let Some((_, esc)) = chars.next() else {
            return Err(DecodeError::new("unexpected end of escape sequence", at));
        };

        match esc {
            '\\' => emit(Piece::Char('\\')),
            '\'' => emit(Piece::Char('\'')),
            '"' => emit(Piece::Char('"')),
            'n' => emit(Piece::Char('\n')),
            't' => emit(Piece::Char('\t')),
            'r' => emit(Piece::Char('\r')),
            'b' => emit(Piece::Char('\u{0008}')),
            'f' => emit(Piece::Char('\u{000c}')),
            '0' => emit(Piece::Char('\0')),
            '\n' => {
                // Line continuation: the newline and the indentation
                // that follows it are dropped.
                while let Some(&(_, next)) = chars.peek() {
                    if next == ' ' || next == '\t' {
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            '\r' => {
                if let Some(&(_, '\n')) = chars.peek() {
                    chars.next();
                }
                while let Some(&(_, next)) = chars.peek() {
                    if next == ' ' || next == '\t' {
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            'x' => {
                let value = take_hex(s, &mut chars, 2, at)?;
                if bytes {
                    emit(Piece::Byte(value as u8));
                } else if value > 0x7f {
                    return Err(DecodeError::new(
                        format!("invalid escape sequence '\\x{value:02x}' (only ascii hex escapes are allowed)"),
                        at,
                    ));
                } else {
                    emit(Piece::Char(value as u8 as char));
                }
            }
            'u' | 'U' => {
                if bytes {
                    return Err(DecodeError::new(
                        format!("invalid escape sequence '\\{esc}' in bytes literal"),
                        at,
                    ));
                }
                let digits = if esc == 'u' { 4 } else { 8 };
                let value = take_hex(s, &mut chars, digits, at)?;
                match char::from_u32(value) {
                    Some(c) => emit(Piece::Char(c)),
                    None => {
                        return Err(DecodeError::new(
                            format!("invalid unicode escape '\\{esc}{value:x}'"),
                            at,
                        ));
                    }
                }
            }
            ' ' => {
                let err = DecodeError::new("invalid escape sequence '\\ '", at);
                // A line continuation whose backslash drifted away from
                // the newline usually means stray trailing whitespace.
                let rest = &s[at..];
                let err = if rest
                    .strip_prefix('\\')
                    .map(|r| {
                        r.chars()
                            .take_while(|c| *c == ' ' || *c == '\t')
                            .count()
                            > 0
                            && r.trim_start_matches([' ', '\t']).starts_with(['\n', '\r'])
                    })
                    .unwrap_or(false)
                {
                    err.with_hint("consider removing trailing whitespace")
                } else {
                    err
                };
                return Err(err);
            }
            other => {
                return Err(DecodeError::new(
                    format!("invalid escape sequence '\\{other}'"),
                    at,
                ));
            }
        }

        plain_start = chars.peek().map(|(i, _)| *i).unwrap_or(s.len());
    }

    if s.len() > plain_start {
        flush_plain(s, plain_start, s.len(), bytes, &mut emit)?;
    }

    Ok(())
}

fn flush_plain<'a>(
    s: &'a str,
    start: usize,
    end: usize,
    bytes: bool,
    emit: &mut impl FnMut(Piece<'a>),
) -> Result<(), DecodeError> {
    let piece = &s[start..end];
    if bytes {
        if let Some(bad) = piece.find(|c: char| !c.is_ascii()) {
            return Err(DecodeError::new(
                "invalid character in bytes literal (only ascii is allowed)",
                start + bad,
            ));
        }
    }
    emit(Piece::Str(piece));
    Ok(())
}

fn take_hex(
    s: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    digits: usize,
    at: usize,
) -> Result<u32, DecodeError> {
    let mut value = 0u32;
    for _ in 0..digits {
        match chars.next() {
            Some((_, c)) if c.is_ascii_hexdigit() => {
                value = value * 16 + c.to_digit(16).expect("hex digit");
            }
            _ => {
                return Err(DecodeError::new(
                    format!(
                        "invalid escape sequence '{}'",
                        &s[at..s.len().min(at + digits + 2)]
                    ),
                    at,
                ));
            }
        }
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_escapes_decode() {
        assert_eq!(
            unquote_string(r"a\n\t\\\'\x41 ж b").unwrap(),
            "a\n\t\\'A ж b"
        );
    }

    #[test]
    fn line_continuation_swallows_indentation() {
        assert_eq!(unquote_string("one \\\n    two").unwrap(), "one two");
    }

    #[test]
    fn backslash_space_is_invalid_with_hint() {
        let err = unquote_string("one \\ \n two").unwrap_err();
        assert_eq!(err.message, "invalid escape sequence '\\ '");
        assert_eq!(err.hint.as_deref(), Some("consider removing trailing whitespace"));

        let err = unquote_string("one \\ two").unwrap_err();
        assert_eq!(err.hint, None);
    }

    #[test]
    fn high_hex_escapes_are_rejected_in_strings() {
        assert!(unquote_string(r"\xff").is_err());
        assert_eq!(unquote_bytes(r"\xff").unwrap(), vec![0xff]);
    }

    #[test]
    fn unicode_escapes_are_rejected_in_bytes() {
        assert!(unquote_bytes(r"ж").is_err());
    }

    #[test]
    fn idents_unquote() {
        assert_eq!(unquote_ident("`select`").unwrap(), "select");
        assert_eq!(unquote_ident("`we``ird`").unwrap(), "we`ird");
        assert!(unquote_ident("``").is_err());
        assert!(unquote_ident("`a::b`").is_err());
        assert!(unquote_ident("`__type__`").is_err());
    }
}
