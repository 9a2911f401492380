//! The tokenizer.
//!
//! Lexing runs in two passes. A [`logos`]-derived scanner produces raw
//! matches (with callback-driven scanning for the constructs regular
//! expressions cannot express, such as dollar-quoted strings), and a
//! wrapper pass classifies identifiers against the keyword table,
//! decodes literal payloads, fuses the two-word operators, and converts
//! failures into diagnostics.

use logos::FilterResult;
use logos::Logos;
use tql_ast::span::Span;

use crate::diagnostic::Diagnostic;
use crate::keywords::Keyword;
use crate::strings;
use crate::token::Token;
use crate::token::TokenKind;
use crate::token::Value;

/// A raw scanner error.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexError {
    /// No token matched at the current position.
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    /// A dollar-quoted string was never closed.
    #[error("unterminated string")]
    UnterminatedString,
    /// A block comment was never closed.
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Scans a dollar-quoted string after its `$tag$` opener matched.
fn dollar_string(lex: &mut logos::Lexer<'_, RawToken>) -> Result<(), LexError> {
    let opener = lex.slice().to_string();
    match lex.remainder().find(&opener) {
        Some(idx) => {
            lex.bump(idx + opener.len());
            Ok(())
        }
        None => Err(LexError::UnterminatedString),
    }
}

/// Scans past a `/* … */` comment. Nesting is not supported.
fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> FilterResult<(), LexError> {
    match lex.remainder().find("*/") {
        Some(idx) => {
            lex.bump(idx + 2);
            FilterResult::Skip
        }
        None => FilterResult::Error(LexError::UnterminatedComment),
    }
}

/// The raw token classes matched by the scanner.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"#[^\n]*", allow_greedy = true))]
#[logos(subpattern digits = r"[0-9](?:_?[0-9])*")]
enum RawToken {
    /// `.` and the longer `.<`.
    #[token(".")]
    Dot,
    #[token(".<")]
    BackwardDot,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("::")]
    Namespace,
    #[token("**")]
    DoubleSplat,
    #[token("??")]
    Coalesce,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("+")]
    Plus,
    #[token("++")]
    Concat,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    FloorDiv,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("@")]
    At,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token(":=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("->")]
    Arrow,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Equals,
    #[token("!=")]
    NotEquals,
    #[token("<=")]
    LessEquals,
    #[token(">=")]
    GreaterEquals,
    #[token("?=")]
    NotDistinctFrom,
    #[token("?!=")]
    DistinctFrom,

    /// An integer, with an optional bigint suffix.
    #[regex(r"(?&digits)n?")]
    IntLike,

    /// A float, with an optional decimal suffix.
    #[regex(r"(?&digits)\.(?&digits)(?:[eE][+-]?(?&digits))?n?")]
    #[regex(r"(?&digits)[eE][+-]?(?&digits)n?")]
    FloatLike,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"`(?:[^`]|``)*`")]
    QuotedIdent,

    #[regex(r"'(?:[^'\\]|\\[\s\S])*'")]
    #[regex(r#""(?:[^"\\]|\\[\s\S])*""#)]
    Str,

    #[regex(r"r'[^']*'")]
    #[regex(r#"r"[^"]*""#)]
    RawStr,

    #[regex(r"b'(?:[^'\\]|\\[\s\S])*'")]
    #[regex(r#"b"(?:[^"\\]|\\[\s\S])*""#)]
    Bytes,

    #[regex(r"\$[0-9]+")]
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Parameter,

    /// A dollar-quoted string; the callback consumes up to the matching
    /// closer.
    #[regex(r"\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$", dollar_string)]
    DollarStr,

    /// Never emitted; the callback skips the comment or errors.
    #[token("/*", block_comment)]
    BlockComment,
}

/// Tokenizes a source string.
///
/// On success the returned vector contains every significant token in
/// source order, with decoded payloads attached to literals. Whitespace
/// and comments are skipped. The synthetic start and end-of-input tokens
/// are the parser driver's business and are not included.
///
/// Fails with a diagnostic at the first ill-formed token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span().start, lexer.span().end);
        let text = lexer.slice();

        let raw = match result {
            Ok(raw) => raw,
            Err(error) => return Err(scan_error(source, error, span)),
        };

        let token = match raw {
            RawToken::Ident => classify_ident(text, span),
            RawToken::QuotedIdent => {
                let name = strings::unquote_ident(text)
                    .map_err(|e| decode_error(e, span))?;
                Token {
                    kind: TokenKind::Ident,
                    text: text.to_string(),
                    value: Some(Value::Str(name)),
                    span,
                }
            }
            RawToken::IntLike => decode_int(text, span)?,
            RawToken::FloatLike => decode_float(text, span)?,
            RawToken::Str => {
                let inner = &text[1..text.len() - 1];
                let value = strings::unquote_string(inner)
                    .map_err(|e| decode_error(e.shift(1), span))?;
                Token {
                    kind: TokenKind::StringConst,
                    text: text.to_string(),
                    value: Some(Value::Str(value)),
                    span,
                }
            }
            RawToken::RawStr => {
                let inner = &text[2..text.len() - 1];
                Token {
                    kind: TokenKind::StringConst,
                    text: text.to_string(),
                    value: Some(Value::Str(inner.to_string())),
                    span,
                }
            }
            RawToken::DollarStr => {
                let tag_len = text[1..]
                    .find('$')
                    .expect("dollar string opener contains a second dollar")
                    + 2;
                let inner = &text[tag_len..text.len() - tag_len];
                Token {
                    kind: TokenKind::StringConst,
                    text: text.to_string(),
                    value: Some(Value::Str(inner.to_string())),
                    span,
                }
            }
            RawToken::Bytes => {
                let inner = &text[2..text.len() - 1];
                let value = strings::unquote_bytes(inner)
                    .map_err(|e| decode_error(e.shift(2), span))?;
                Token {
                    kind: TokenKind::BytesConst,
                    text: text.to_string(),
                    value: Some(Value::Bytes(value)),
                    span,
                }
            }
            RawToken::Parameter => Token {
                kind: TokenKind::Parameter,
                text: text.to_string(),
                value: Some(Value::Str(text[1..].to_string())),
                span,
            },
            punct => Token::new(punct_kind(punct), text, span),
        };

        // Numbers must be separated from what follows them.
        if matches!(raw, RawToken::IntLike | RawToken::FloatLike) {
            let rest = &source[span.end()..];
            if rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(Diagnostic::error("invalid number literal", span)
                    .with_hint("separate the number from the identifier that follows it"));
            }
        }

        tokens.push(token);
    }

    Ok(fuse(source, tokens))
}

/// Maps a raw punctuation class to its token kind.
fn punct_kind(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Dot => TokenKind::Dot,
        RawToken::BackwardDot => TokenKind::BackwardDot,
        RawToken::OpenBracket => TokenKind::OpenBracket,
        RawToken::CloseBracket => TokenKind::CloseBracket,
        RawToken::OpenParen => TokenKind::OpenParen,
        RawToken::CloseParen => TokenKind::CloseParen,
        RawToken::OpenBrace => TokenKind::OpenBrace,
        RawToken::CloseBrace => TokenKind::CloseBrace,
        RawToken::Namespace => TokenKind::Namespace,
        RawToken::DoubleSplat => TokenKind::DoubleSplat,
        RawToken::Coalesce => TokenKind::Coalesce,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Concat => TokenKind::Concat,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::FloorDiv => TokenKind::FloorDiv,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Caret => TokenKind::Caret,
        RawToken::At => TokenKind::At,
        RawToken::Ampersand => TokenKind::Ampersand,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Assign => TokenKind::Assign,
        RawToken::AddAssign => TokenKind::AddAssign,
        RawToken::SubAssign => TokenKind::SubAssign,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Less => TokenKind::Less,
        RawToken::Greater => TokenKind::Greater,
        RawToken::Equals => TokenKind::Equals,
        RawToken::NotEquals => TokenKind::NotEquals,
        RawToken::LessEquals => TokenKind::LessEquals,
        RawToken::GreaterEquals => TokenKind::GreaterEquals,
        RawToken::NotDistinctFrom => TokenKind::NotDistinctFrom,
        RawToken::DistinctFrom => TokenKind::DistinctFrom,
        other => unreachable!("not a punctuation token: {other:?}"),
    }
}

/// Classifies an identifier against the keyword table.
fn classify_ident(text: &str, span: Span) -> Token {
    let lowered = text.to_ascii_lowercase();
    match Keyword::lookup(&lowered) {
        Some(kw) => Token::new(TokenKind::Keyword(kw), text, span),
        None => Token {
            kind: TokenKind::Ident,
            text: text.to_string(),
            value: Some(Value::Str(text.to_string())),
            span,
        },
    }
}

/// Decodes an integer literal.
fn decode_int(text: &str, span: Span) -> Result<Token, Diagnostic> {
    check_leading_zeros(text, span)?;
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if text.ends_with('n') {
        return Ok(Token {
            kind: TokenKind::BigIntConst,
            text: text.to_string(),
            value: Some(Value::BigInt(digits)),
            span,
        });
    }

    match digits.parse::<i64>() {
        Ok(value) => Ok(Token {
            kind: TokenKind::IntConst,
            text: text.to_string(),
            value: Some(Value::Int(value)),
            span,
        }),
        // Does not fit a signed 64-bit value: promote to bigint.
        Err(_) => Ok(Token {
            kind: TokenKind::BigIntConst,
            text: text.to_string(),
            value: Some(Value::BigInt(digits)),
            span,
        }),
    }
}

/// Decodes a float literal.
fn decode_float(text: &str, span: Span) -> Result<Token, Diagnostic> {
    check_leading_zeros(text, span)?;
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_' && *c != 'n')
        .collect();

    if text.ends_with('n') {
        return Ok(Token {
            kind: TokenKind::DecimalConst,
            text: text.to_string(),
            value: Some(Value::Decimal(cleaned)),
            span,
        });
    }

    let value = cleaned.parse::<f64>().map_err(|_| {
        Diagnostic::error("invalid float literal", span)
            .with_hint("the value does not fit a 64-bit float")
    })?;
    Ok(Token {
        kind: TokenKind::FloatConst,
        text: text.to_string(),
        value: Some(Value::Float(value)),
        span,
    })
}

/// Rejects leading zeros in the integer part of a number.
fn check_leading_zeros(text: &str, span: Span) -> Result<(), Diagnostic> {
    let int_part: &str = text
        .split(['.', 'e', 'E'])
        .next()
        .expect("split yields at least one piece");
    let digits: String = int_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(
            Diagnostic::error("leading zeros are not allowed in numbers", span)
                .with_hint("remove the leading zeros"),
        );
    }
    Ok(())
}

/// Converts a raw scanner error into a diagnostic.
fn scan_error(source: &str, error: LexError, span: Span) -> Diagnostic {
    match error {
        LexError::UnterminatedString => {
            let opener = &source[span.start()..span.end()];
            Diagnostic::error(
                format!("unterminated string started with {opener}"),
                Span::new(span.start(), 1),
            )
            .with_hint(format!("add a closing {opener}"))
        }
        LexError::UnterminatedComment => {
            Diagnostic::error("unterminated block comment", Span::new(span.start(), 1))
                .with_hint("add a closing `*/`")
        }
        LexError::UnexpectedCharacter => {
            let rest = &source[span.start()..];
            let first = rest.chars().next().unwrap_or(' ');
            match first {
                '\'' | '"' => Diagnostic::error(
                    format!("unterminated string, quoted by `{first}`"),
                    Span::new(span.start(), 1),
                )
                .with_hint(format!("add a closing `{first}`")),
                '`' => Diagnostic::error(
                    "unterminated backtick name",
                    Span::new(span.start(), 1),
                )
                .with_hint("add a closing backtick"),
                '$' => Diagnostic::error(
                    "bare `$` is not allowed",
                    Span::new(span.start(), 1),
                ),
                other => Diagnostic::error(
                    format!("unexpected character {other:?}"),
                    span,
                ),
            }
        }
    }
}

/// Converts a literal decode failure into a diagnostic.
fn decode_error(error: strings::DecodeError, token_span: Span) -> Diagnostic {
    let at = token_span.start() + error.offset;
    let mut diagnostic = Diagnostic::error(
        format!("invalid string literal: {}", error.message),
        Span::new(at, (token_span.end() - at).max(1).min(2)),
    );
    diagnostic = match error.hint {
        Some(hint) => diagnostic.with_hint(hint),
        None => diagnostic
            .with_hint(r#"valid escapes are \n \t \r \b \f \\ \' \" \xNN \uXXXX \UXXXXXXXX"#),
    };
    diagnostic
}

/// Fuses the two-word reserved operator sequences into single tokens.
fn fuse(source: &str, tokens: Vec<Token>) -> Vec<Token> {
    use Keyword::*;

    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let fused_kind = match (token.kind, iter.peek().map(|t| t.kind)) {
            (TokenKind::Keyword(Named), Some(TokenKind::Keyword(Only))) => {
                Some(TokenKind::NamedOnly)
            }
            (TokenKind::Keyword(Set), Some(TokenKind::Keyword(Type))) => {
                Some(TokenKind::SetType)
            }
            (TokenKind::Keyword(Extension), Some(TokenKind::Keyword(Package))) => {
                Some(TokenKind::ExtensionPackage)
            }
            (TokenKind::Keyword(Order), Some(TokenKind::Keyword(By))) => {
                Some(TokenKind::OrderBy)
            }
            _ => None,
        };

        match fused_kind {
            Some(kind) => {
                let second = iter.next().expect("peeked token is present");
                let span = token.span.union(second.span);
                out.push(Token::new(
                    kind,
                    &source[span.start()..span.end()],
                    span,
                ));
            }
            None => out.push(token),
        }
    }

    out
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators_match_longest_first() {
        assert_eq!(
            kinds(":= : .< . ?!= ?= != >= <= ++ // ** :: -> ??"),
            vec![
                TokenKind::Assign,
                TokenKind::Colon,
                TokenKind::BackwardDot,
                TokenKind::Dot,
                TokenKind::DistinctFrom,
                TokenKind::NotDistinctFrom,
                TokenKind::NotEquals,
                TokenKind::GreaterEquals,
                TokenKind::LessEquals,
                TokenKind::Concat,
                TokenKind::FloorDiv,
                TokenKind::DoubleSplat,
                TokenKind::Namespace,
                TokenKind::Arrow,
                TokenKind::Coalesce,
            ]
        );
    }

    #[test]
    fn identifiers_classify_against_keywords() {
        assert_eq!(
            kinds("select Sally SELECT"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Ident,
                TokenKind::Keyword(Keyword::Select),
            ]
        );
    }

    #[test]
    fn dunder_names_become_keywords() {
        assert_eq!(kinds("__type__"), vec![TokenKind::Keyword(Keyword::DunderType)]);
        assert_eq!(kinds("__typo__"), vec![TokenKind::Ident]);
    }

    #[test]
    fn backtick_names_are_plain_identifiers() {
        let tokens = tokenize("`select`").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].value, Some(Value::Str("select".into())));
        assert_eq!(tokens[0].text, "`select`");
    }

    #[test]
    fn numbers_decode() {
        let tokens = tokenize("0 123 1_000 123n 12345678901234567890 1.5 3.5432e-20 0e-999 1.5n").unwrap();
        assert_eq!(tokens[0].value, Some(Value::Int(0)));
        assert_eq!(tokens[1].value, Some(Value::Int(123)));
        assert_eq!(tokens[2].value, Some(Value::Int(1000)));
        assert_eq!(tokens[3].kind, TokenKind::BigIntConst);
        assert_eq!(tokens[3].value, Some(Value::BigInt("123".into())));
        // Too large for i64: promoted to bigint.
        assert_eq!(tokens[4].kind, TokenKind::BigIntConst);
        assert_eq!(tokens[5].value, Some(Value::Float(1.5)));
        assert_eq!(tokens[6].value, Some(Value::Float(3.5432e-20)));
        assert_eq!(tokens[7].value, Some(Value::Float(0.0)));
        assert_eq!(tokens[8].kind, TokenKind::DecimalConst);
        assert_eq!(tokens[8].value, Some(Value::Decimal("1.5".into())));
    }

    #[test]
    fn leading_zeros_are_rejected() {
        assert!(tokenize("0123").is_err());
        assert!(tokenize("00.5").is_err());
        // A single zero and zeros in exponents are fine.
        assert!(tokenize("0 0.5 1e007").is_ok());
    }

    #[test]
    fn adjacent_number_and_identifier_is_an_error() {
        let err = tokenize("select 123abc").unwrap_err();
        assert_eq!(err.message(), "invalid number literal");
    }

    #[test]
    fn strings_decode_with_escapes() {
        let tokens = tokenize(r#"'a\nb' "c\td" r'a\nb'"#).unwrap();
        assert_eq!(tokens[0].value, Some(Value::Str("a\nb".into())));
        assert_eq!(tokens[1].value, Some(Value::Str("c\td".into())));
        assert_eq!(tokens[2].value, Some(Value::Str(r"a\nb".into())));
    }

    #[test]
    fn dollar_strings_capture_verbatim_bytes() {
        let tokens = tokenize(r#"SELECT $$he said "hi"$$ ;"#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::StringConst);
        assert_eq!(tokens[1].value, Some(Value::Str(r#"he said "hi""#.into())));
        assert_eq!(tokens[1].text, r#"$$he said "hi"$$"#);

        let tokens = tokenize("$tag$ nested $$ quotes $tag$").unwrap();
        assert_eq!(tokens[0].value, Some(Value::Str(" nested $$ quotes ".into())));
    }

    #[test]
    fn unterminated_dollar_string_names_its_opener() {
        let err = tokenize("select $abc$oops").unwrap_err();
        assert_eq!(err.message(), "unterminated string started with $abc$");
        assert_eq!(err.span().start(), 7);
    }

    #[test]
    fn unterminated_string_points_at_the_quote() {
        let err = tokenize("SELECT 'oops").unwrap_err();
        assert_eq!(err.message(), "unterminated string, quoted by `'`");
        assert_eq!(err.span().start(), 7);
    }

    #[test]
    fn parameters_lex_with_names() {
        let tokens = tokenize("$0 $name").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Parameter);
        assert_eq!(tokens[0].value, Some(Value::Str("0".into())));
        assert_eq!(tokens[1].value, Some(Value::Str("name".into())));
    }

    #[test]
    fn two_word_operators_fuse() {
        let source = "named  only set type extension package order by";
        let tokens = tokenize(source).unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::NamedOnly,
                TokenKind::SetType,
                TokenKind::ExtensionPackage,
                TokenKind::OrderBy,
            ]
        );
        // The fused span covers both source words.
        assert_eq!(tokens[0].text, "named  only");
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("select # trailing\n /* block\n comment */ 1"),
            vec![TokenKind::Keyword(Keyword::Select), TokenKind::IntConst]
        );
        assert!(tokenize("select /* oops").is_err());
    }

    #[test]
    fn token_spans_do_not_overlap() {
        let tokens = tokenize("select User { name := 'x' } filter .name = $0").unwrap();
        for pair in tokens.windows(2) {
            assert!(pair[0].span.end() <= pair[1].span.start());
        }
    }
}
