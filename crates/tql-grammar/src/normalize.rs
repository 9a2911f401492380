//! Query normalization.
//!
//! Normalization rewrites a query into a cache-friendly canonical form:
//! literal constants are extracted into positional parameters so that
//! queries differing only in literal values share a cache key. Only
//! query-shaped sources are rewritten; DDL and configuration commands
//! keep every literal in place, as do queries that already carry named
//! parameters.

use blake2::digest::consts::U32;
use blake2::Blake2b;
use blake2::Digest;
use indexmap::IndexMap;
use tql_ast::span::Span;

use crate::diagnostic::Diagnostic;
use crate::keywords::Keyword;
use crate::lexer;
use crate::token::Token;
use crate::token::TokenKind;
use crate::token::Value;

/// BLAKE2b with a 256-bit digest.
type Blake2b256 = Blake2b<U32>;

/// A normalized query entry.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The cache key: a BLAKE2b-256 digest of the canonical text.
    pub key: [u8; 32],
    /// The canonical text, with literals replaced by parameters.
    pub text: String,
    /// The rewritten token vector.
    pub tokens: Vec<Token>,
    /// Extracted parameter values, keyed by parameter name.
    pub variables: IndexMap<String, Value>,
    /// The index of the first extracted parameter, when any literal was
    /// extracted.
    pub first_extra: Option<usize>,
    /// Extracted-literal counts per kind, in the order integer, bigint,
    /// float, decimal, string, bytes.
    pub extra_counts: [usize; 6],
    /// The original source text of each extracted literal, in
    /// parameter order.
    pub extra_blobs: Vec<Vec<u8>>,
}

impl Entry {
    /// Rebuilds the original source, up to insignificant whitespace, by
    /// splicing the extracted literals back over their parameters.
    pub fn reconstruct(&self) -> String {
        let first = self.first_extra.unwrap_or(0);
        let mut out = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            if token.kind == TokenKind::ParameterAndType {
                let name = match &token.value {
                    Some(Value::Str(name)) => name.clone(),
                    _ => String::new(),
                };
                if let Some(index) = name.parse::<usize>().ok().and_then(|i| i.checked_sub(first))
                {
                    if let Some(blob) = self.extra_blobs.get(index) {
                        out.push(String::from_utf8_lossy(blob).into_owned());
                        continue;
                    }
                }
            }
            out.push(token.text.clone());
        }
        out.join(" ")
    }
}

/// The statement keywords that open a normalizable query.
fn is_query_start(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Keyword(
            Keyword::Select
                | Keyword::With
                | Keyword::For
                | Keyword::Group
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::Analyze
        )
    )
}

/// The cast type applied to an extracted literal of the given kind.
fn type_tag(kind: TokenKind) -> Option<(&'static str, usize)> {
    match kind {
        TokenKind::IntConst => Some(("std::int64", 0)),
        TokenKind::BigIntConst => Some(("std::bigint", 1)),
        TokenKind::FloatConst => Some(("std::float64", 2)),
        TokenKind::DecimalConst => Some(("std::decimal", 3)),
        TokenKind::StringConst => Some(("std::str", 4)),
        TokenKind::BytesConst => Some(("std::bytes", 5)),
        _ => None,
    }
}

/// Computes the cache key of a canonical text.
fn cache_key(text: &str) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

/// Joins a token vector into canonical text with minimal whitespace.
fn canonical_text(tokens: &[Token]) -> String {
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    texts.join(" ")
}

/// Builds an entry that keeps the source as-is.
fn verbatim(tokens: Vec<Token>) -> Entry {
    let text = canonical_text(&tokens);
    Entry {
        key: cache_key(&text),
        text,
        tokens,
        variables: IndexMap::new(),
        first_extra: None,
        extra_counts: [0; 6],
        extra_blobs: Vec::new(),
    }
}

/// Normalizes a source string.
///
/// Failures are tokenization failures; normalization itself cannot
/// fail, it just declines to rewrite ineligible sources.
pub fn normalize(source: &str) -> Result<Entry, Diagnostic> {
    let tokens = lexer::tokenize(source)?;

    let eligible = tokens.first().map(is_query_start).unwrap_or(false);
    if !eligible {
        return Ok(verbatim(tokens));
    }

    // Queries that already use named parameters are left alone; numeric
    // parameters shift the extracted indices past their maximum.
    let mut next_index = 0usize;
    for token in &tokens {
        if token.kind == TokenKind::Parameter {
            let name = match &token.value {
                Some(Value::Str(name)) => name.as_str(),
                _ => "",
            };
            match name.parse::<usize>() {
                Ok(index) => next_index = next_index.max(index + 1),
                Err(_) => return Ok(verbatim(tokens)),
            }
        }
    }

    let first_extra = next_index;
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut variables = IndexMap::new();
    let mut extra_counts = [0usize; 6];
    let mut extra_blobs = Vec::new();

    for token in tokens {
        let Some((tag, kind_index)) = type_tag(token.kind) else {
            out.push(token);
            continue;
        };

        let name = next_index.to_string();
        next_index += 1;

        let value = token
            .value
            .clone()
            .expect("literal tokens carry decoded values");
        variables.insert(name.clone(), value);
        extra_counts[kind_index] += 1;
        extra_blobs.push(token.text.clone().into_bytes());

        out.push(Token {
            kind: TokenKind::ParameterAndType,
            text: format!("<{tag}>${name}"),
            value: Some(Value::Str(name)),
            span: token.span,
        });
    }

    let extracted = !variables.is_empty();
    let text = canonical_text(&out);
    Ok(Entry {
        key: cache_key(&text),
        text,
        tokens: out,
        variables,
        first_extra: extracted.then_some(first_extra),
        extra_counts,
        extra_blobs,
    })
}

/// An immutable source buffer with its token vector and cache key.
#[derive(Debug, Clone)]
pub struct Source {
    text: String,
    filename: Option<String>,
    tokens: Vec<Token>,
    cache_key: [u8; 32],
}

impl Source {
    /// Tokenizes a string into a source.
    pub fn from_string(text: impl Into<String>) -> Result<Self, Diagnostic> {
        let text = text.into();
        let tokens = lexer::tokenize(&text)?;
        let key = cache_key(&canonical_text(&tokens));
        Ok(Self {
            text,
            filename: None,
            tokens,
            cache_key: key,
        })
    }

    /// Attaches a file name for diagnostics.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Gets the source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Gets the file name, when one was attached.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Gets the token vector.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Gets the cache key.
    pub fn cache_key(&self) -> &[u8; 32] {
        &self.cache_key
    }

    /// The span covering the entire source.
    pub fn full_span(&self) -> Span {
        Span::new(0, self.text.len())
    }
}

/// A normalized source: the original text plus its canonical entry.
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    original: String,
    entry: Entry,
}

impl NormalizedSource {
    /// Normalizes a string.
    pub fn from_string(text: impl Into<String>) -> Result<Self, Diagnostic> {
        let original = text.into();
        let entry = normalize(&original)?;
        Ok(Self { original, entry })
    }

    /// Gets the original text.
    pub fn text(&self) -> &str {
        &self.original
    }

    /// Gets the cache key.
    pub fn cache_key(&self) -> &[u8; 32] {
        &self.entry.key
    }

    /// Gets the extracted variables.
    pub fn variables(&self) -> &IndexMap<String, Value> {
        &self.entry.variables
    }

    /// Gets the rewritten token vector.
    pub fn tokens(&self) -> &[Token] {
        &self.entry.tokens
    }

    /// Gets the canonical entry.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn literal_values_do_not_affect_the_cache_key() {
        let a = normalize("select 1 + 2").unwrap();
        let b = normalize("select 5 + 10").unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.text, b.text);
        assert_eq!(a.text, "select <std::int64>$0 + <std::int64>$1");
        assert_ne!(a.variables, b.variables);
        assert_eq!(b.variables["0"], Value::Int(5));
        assert_eq!(b.variables["1"], Value::Int(10));
    }

    #[test]
    fn extracted_kinds_are_counted() {
        let entry = normalize("select ('x', 1.5, b'ab', 9n)").unwrap();
        assert_eq!(entry.extra_counts, [0, 1, 1, 0, 1, 1]);
        assert_eq!(entry.first_extra, Some(0));
        assert_eq!(entry.variables.len(), 4);
    }

    #[test]
    fn numeric_parameters_shift_extraction() {
        let entry = normalize("select $0 + 2").unwrap();
        assert_eq!(entry.first_extra, Some(1));
        assert_eq!(entry.text, "select $0 + <std::int64>$1");
        assert_eq!(entry.variables["1"], Value::Int(2));
    }

    #[test]
    fn named_parameters_disable_extraction() {
        let entry = normalize("select $x + 2").unwrap();
        assert_eq!(entry.first_extra, None);
        assert!(entry.variables.is_empty());
        assert_eq!(entry.text, "select $x + 2");
    }

    #[test]
    fn ddl_is_left_verbatim() {
        let entry = normalize("create type Foo { create property n -> std::int64 };").unwrap();
        assert!(entry.variables.is_empty());
        assert!(!entry.text.contains('$'));
    }

    #[test]
    fn originals_reconstruct() {
        let entry = normalize("select 'World' ++ \"!\"").unwrap();
        assert_eq!(entry.reconstruct(), "select 'World' ++ \"!\"");
    }

    #[test]
    fn sources_expose_tokens_and_keys() {
        let source = Source::from_string("select 1").unwrap();
        assert_eq!(source.tokens().len(), 2);
        let normalized = NormalizedSource::from_string("select 1").unwrap();
        assert_ne!(source.cache_key(), normalized.cache_key());
    }
}
