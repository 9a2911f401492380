//! Token definitions.

use std::fmt;

use tql_ast::span::Span;

use crate::keywords::Keyword;

/// The kind of a token.
///
/// Keywords share a single variant carrying the [`Keyword`] value; the
/// parser tables address them through their terminal names (`SELECT`,
/// `DUNDERTYPE`, …) while punctuation uses the classic names (`DOT`,
/// `ASSIGN`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    /// `.`
    Dot,
    /// `.<`
    BackwardDot,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `::`
    Namespace,
    /// `**`
    DoubleSplat,
    /// `??`
    Coalesce,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `+`
    Plus,
    /// `++`
    Concat,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `//`
    FloorDiv,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `@`
    At,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `:=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `->`
    Arrow,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// `<=`
    LessEquals,
    /// `>=`
    GreaterEquals,
    /// `?=`
    NotDistinctFrom,
    /// `?!=`
    DistinctFrom,
    /// The fused `NAMED ONLY` operator.
    NamedOnly,
    /// The fused `SET TYPE` operator.
    SetType,
    /// The fused `EXTENSION PACKAGE` operator.
    ExtensionPackage,
    /// The fused `ORDER BY` operator.
    OrderBy,
    /// An integer literal that fits a signed 64-bit value.
    IntConst,
    /// An arbitrary-precision integer literal (`123n`).
    BigIntConst,
    /// A float literal.
    FloatConst,
    /// An arbitrary-precision decimal literal (`1.5n`).
    DecimalConst,
    /// A string literal.
    StringConst,
    /// A bytes literal.
    BytesConst,
    /// An identifier (plain or backtick-quoted).
    Ident,
    /// A parameter reference (`$name`, `$0`).
    Parameter,
    /// A parameter carrying its own cast, produced by normalization.
    ParameterAndType,
    /// A keyword.
    Keyword(Keyword),
    /// The synthetic start token of the block dialect.
    StartBlock,
    /// The synthetic start token of the fragment dialect.
    StartFragment,
    /// The synthetic start token of the migration-body dialect.
    StartMigration,
    /// The synthetic start token of the extension-package-body dialect.
    StartExtension,
    /// The synthetic start token of the SDL document dialect.
    StartSdlDocument,
    /// End of input.
    Eoi,
}

/// The non-keyword kinds paired with their table names and display
/// forms, in declaration order.
const NON_KEYWORD: &[(TokenKind, &str, &str)] = &[
    (TokenKind::Dot, "DOT", "."),
    (TokenKind::BackwardDot, "DOTBW", ".<"),
    (TokenKind::OpenBracket, "LBRACKET", "["),
    (TokenKind::CloseBracket, "RBRACKET", "]"),
    (TokenKind::OpenParen, "LPAREN", "("),
    (TokenKind::CloseParen, "RPAREN", ")"),
    (TokenKind::OpenBrace, "LBRACE", "{"),
    (TokenKind::CloseBrace, "RBRACE", "}"),
    (TokenKind::Namespace, "DOUBLECOLON", "::"),
    (TokenKind::DoubleSplat, "DOUBLESTAR", "**"),
    (TokenKind::Coalesce, "DOUBLEQMARK", "??"),
    (TokenKind::Colon, "COLON", ":"),
    (TokenKind::Semicolon, "SEMICOLON", ";"),
    (TokenKind::Comma, "COMMA", ","),
    (TokenKind::Plus, "PLUS", "+"),
    (TokenKind::Concat, "DOUBLEPLUS", "++"),
    (TokenKind::Minus, "MINUS", "-"),
    (TokenKind::Star, "STAR", "*"),
    (TokenKind::Slash, "SLASH", "/"),
    (TokenKind::FloorDiv, "DOUBLESLASH", "//"),
    (TokenKind::Percent, "PERCENT", "%"),
    (TokenKind::Caret, "CIRCUMFLEX", "^"),
    (TokenKind::At, "AT", "@"),
    (TokenKind::Ampersand, "AMPER", "&"),
    (TokenKind::Pipe, "PIPE", "|"),
    (TokenKind::Assign, "ASSIGN", ":="),
    (TokenKind::AddAssign, "ADDASSIGN", "+="),
    (TokenKind::SubAssign, "REMASSIGN", "-="),
    (TokenKind::Arrow, "ARROW", "->"),
    (TokenKind::Less, "LANGBRACKET", "<"),
    (TokenKind::Greater, "RANGBRACKET", ">"),
    (TokenKind::Equals, "EQUALS", "="),
    (TokenKind::NotEquals, "NOTEQ", "!="),
    (TokenKind::LessEquals, "LESSEQ", "<="),
    (TokenKind::GreaterEquals, "GREATEREQ", ">="),
    (TokenKind::NotDistinctFrom, "NOTDISTINCTFROM", "?="),
    (TokenKind::DistinctFrom, "DISTINCTFROM", "?!="),
    (TokenKind::NamedOnly, "NAMEDONLY", "named only"),
    (TokenKind::SetType, "SETTYPE", "set type"),
    (TokenKind::ExtensionPackage, "EXTENSIONPACKAGE", "extension package"),
    (TokenKind::OrderBy, "ORDERBY", "order by"),
    (TokenKind::IntConst, "ICONST", "integer literal"),
    (TokenKind::BigIntConst, "NICONST", "bigint literal"),
    (TokenKind::FloatConst, "FCONST", "float literal"),
    (TokenKind::DecimalConst, "NFCONST", "decimal literal"),
    (TokenKind::StringConst, "SCONST", "string literal"),
    (TokenKind::BytesConst, "BCONST", "bytes literal"),
    (TokenKind::Ident, "IDENT", "identifier"),
    (TokenKind::Parameter, "PARAMETER", "parameter"),
    (TokenKind::ParameterAndType, "PARAMETERANDTYPE", "parameter"),
    (TokenKind::StartBlock, "STARTBLOCK", "start of block"),
    (TokenKind::StartFragment, "STARTFRAGMENT", "start of fragment"),
    (TokenKind::StartMigration, "STARTMIGRATION", "start of migration"),
    (TokenKind::StartExtension, "STARTEXTENSION", "start of extension"),
    (TokenKind::StartSdlDocument, "STARTSDLDOCUMENT", "start of schema"),
    (TokenKind::Eoi, "EOI", "end of input"),
];

impl TokenKind {
    /// Gets the terminal name of the kind, as used in the parser tables.
    pub fn terminal_name(self) -> String {
        if let TokenKind::Keyword(kw) = self {
            kw.token_name()
        } else {
            NON_KEYWORD
                .iter()
                .find(|(kind, ..)| *kind == self)
                .map(|(_, name, _)| (*name).to_string())
                .expect("every non-keyword kind has a terminal name")
        }
    }

    /// Resolves a terminal name back to a token kind.
    pub fn from_terminal_name(name: &str) -> Option<TokenKind> {
        if let Some((kind, ..)) = NON_KEYWORD.iter().find(|(_, n, _)| *n == name) {
            return Some(*kind);
        }
        Keyword::ALL
            .iter()
            .find(|kw| kw.token_name() == name)
            .map(|kw| TokenKind::Keyword(*kw))
    }

    /// Describes the kind for use in a diagnostic.
    pub fn describe(self) -> String {
        match self {
            TokenKind::Keyword(kw) => format!("keyword '{}'", kw.text().to_uppercase()),
            _ => {
                let display = NON_KEYWORD
                    .iter()
                    .find(|(kind, ..)| *kind == self)
                    .map(|(.., display)| *display)
                    .expect("every non-keyword kind has a display form");
                format!("'{display}'")
            }
        }
    }

    /// Determines if the kind is a literal constant.
    pub fn is_const(self) -> bool {
        matches!(
            self,
            TokenKind::IntConst
                | TokenKind::BigIntConst
                | TokenKind::FloatConst
                | TokenKind::DecimalConst
                | TokenKind::StringConst
                | TokenKind::BytesConst
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// The decoded payload of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A decoded string.
    Str(String),
    /// A 64-bit integer.
    Int(i64),
    /// An arbitrary-precision integer, kept as its digit string.
    BigInt(String),
    /// A 64-bit float.
    Float(f64),
    /// An arbitrary-precision decimal, kept as written (sans suffix).
    Decimal(String),
    /// Decoded bytes.
    Bytes(Vec<u8>),
}

impl Value {
    /// Renders the value as plain text.
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::BigInt(s) | Value::Decimal(s) => s.clone(),
            Value::Float(v) => v.to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

/// A token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The raw source slice of the token.
    pub text: String,
    /// The decoded payload, for literals.
    pub value: Option<Value>,
    /// The source span of the token.
    pub span: Span,
}

impl Token {
    /// Creates a token with no payload.
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
            span,
        }
    }

    /// Creates a synthetic token with an empty span at the given offset.
    pub fn synthetic(kind: TokenKind, offset: usize) -> Self {
        Self {
            kind,
            text: String::new(),
            value: None,
            span: Span::new(offset, 0),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn terminal_names_round_trip() {
        let kinds = [
            TokenKind::Dot,
            TokenKind::Assign,
            TokenKind::OrderBy,
            TokenKind::IntConst,
            TokenKind::Keyword(Keyword::Select),
            TokenKind::Keyword(Keyword::DunderType),
            TokenKind::Eoi,
        ];
        for kind in kinds {
            let name = kind.terminal_name();
            assert_eq!(TokenKind::from_terminal_name(&name), Some(kind), "{name}");
        }
    }

    #[test]
    fn descriptions_match_convention() {
        assert_eq!(TokenKind::Comma.describe(), "','");
        assert_eq!(
            TokenKind::Keyword(Keyword::Select).describe(),
            "keyword 'SELECT'"
        );
    }
}
