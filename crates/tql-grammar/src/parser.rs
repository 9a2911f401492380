//! The LR parser engine.
//!
//! The driver runs the table automaton over a token vector, producing a
//! CST root or a list of diagnostics. Errors do not abort the parse:
//! the engine first attempts single-token insertion recovery (trying
//! every actionable terminal and requiring several tokens of clean
//! progress), and failing that skips to a synchronizing token. All
//! encountered errors are collected in source order; callers pick the
//! one to surface with [`pick_error`].

use tql_ast::span::Span;

use crate::cst::CstNode;
use crate::cst::CstTerminal;
use crate::diagnostic::Diagnostic;
use crate::grammar::generate::Action;
use crate::keywords::Keyword;
use crate::spec::Spec;
use crate::token::Token;
use crate::token::TokenKind;

/// How many tokens of clean progress an inserted token must enable.
const RECOVERY_PROBE: usize = 4;

/// How many consecutive insertions are allowed at one position.
const MAX_INSERTIONS: usize = 2;

/// The error budget; past it the parse is abandoned.
const MAX_ERRORS: usize = 50;

/// When several insertion candidates make progress, the cheapest of
/// these wins; candidates outside this list lose ties.
const PREFERRED_INSERTIONS: &[TokenKind] = &[
    TokenKind::Comma,
    TokenKind::Semicolon,
    TokenKind::CloseParen,
    TokenKind::CloseBrace,
    TokenKind::CloseBracket,
    TokenKind::Colon,
    TokenKind::Assign,
];

/// The dialect to parse, selected through a synthetic start token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// A sequence of top-level statements and DDL.
    Block,
    /// A single expression or statement.
    Fragment,
    /// The body of `CREATE MIGRATION`.
    Migration,
    /// The body of `CREATE EXTENSION PACKAGE`.
    Extension,
    /// A schema definition file.
    SdlDocument,
}

impl Dialect {
    /// The synthetic start token of the dialect.
    pub fn start_token(self) -> TokenKind {
        match self {
            Dialect::Block => TokenKind::StartBlock,
            Dialect::Fragment => TokenKind::StartFragment,
            Dialect::Migration => TokenKind::StartMigration,
            Dialect::Extension => TokenKind::StartExtension,
            Dialect::SdlDocument => TokenKind::StartSdlDocument,
        }
    }
}

/// The outcome of a parse.
pub struct ParseResult {
    /// The CST root, present whenever the parse could be completed
    /// (possibly after recovery).
    pub out: Option<CstNode>,
    /// Every error encountered, ordered by source position.
    pub errors: Vec<Diagnostic>,
}

/// A symbol on the parser stack, kept for error heuristics.
#[derive(Debug, Clone, Copy)]
enum StackSym {
    /// A shifted token.
    Token(TokenKind),
    /// A reduced nonterminal.
    NonTerm(u32),
}

/// Parses a token vector in the given dialect.
pub fn parse(dialect: Dialect, tokens: &[Token], spec: &Spec) -> ParseResult {
    let end = tokens.last().map(|t| t.span.end()).unwrap_or(0);

    // The driver input: the synthetic start token, the lexical tokens,
    // and the end-of-input marker.
    let mut input: Vec<Token> = Vec::with_capacity(tokens.len() + 2);
    input.push(Token::synthetic(dialect.start_token(), 0));
    input.extend(tokens.iter().cloned());
    input.push(Token::synthetic(TokenKind::Eoi, end));

    Parser {
        spec,
        input,
        cursor: 0,
        states: vec![0],
        values: Vec::new(),
        syms: Vec::new(),
        errors: Vec::new(),
        insertions_here: 0,
    }
    .run()
}

struct Parser<'s> {
    spec: &'s Spec,
    input: Vec<Token>,
    cursor: usize,
    states: Vec<u32>,
    values: Vec<CstNode>,
    syms: Vec<StackSym>,
    errors: Vec<Diagnostic>,
    insertions_here: usize,
}

impl Parser<'_> {
    fn run(mut self) -> ParseResult {
        let out = loop {
            let token = &self.input[self.cursor];
            let state = *self.states.last().expect("state stack is never empty");

            match self.spec.action(state, token.kind) {
                Some(Action::Shift(next)) => {
                    self.shift(next);
                    self.insertions_here = 0;
                }
                Some(Action::Reduce(production)) => {
                    self.reduce(production);
                }
                Some(Action::Accept) => {
                    break self.values.pop();
                }
                None => {
                    if !self.recover() {
                        break None;
                    }
                }
            }
        };

        self.errors.sort_by_key(|e| e.span().start());
        ParseResult {
            out,
            errors: self.errors,
        }
    }

    fn shift(&mut self, next: u32) {
        let token = &self.input[self.cursor];
        self.values.push(CstNode::Terminal(CstTerminal {
            text: token.text.clone(),
            value: token.value.clone(),
            span: token.span,
        }));
        self.syms.push(StackSym::Token(token.kind));
        self.states.push(next);
        self.cursor += 1;
    }

    fn reduce(&mut self, production: u32) {
        let info = self.spec.production(production);
        let len = info.rhs_len as usize;

        let args = self.values.split_off(self.values.len() - len);
        self.states.truncate(self.states.len() - len);
        self.syms.truncate(self.syms.len() - len);

        let top = *self.states.last().expect("state stack is never empty");
        let next = self
            .spec
            .goto(top, info.lhs)
            .expect("goto entry exists for every reduction");

        self.values.push(CstNode::Production {
            production_id: production,
            args,
        });
        self.syms.push(StackSym::NonTerm(info.lhs));
        self.states.push(next);
    }

    /// Handles a missing action: try single-token insertion, then skip
    /// to a synchronizing token. Returns false when the parse cannot
    /// continue.
    fn recover(&mut self) -> bool {
        if self.errors.len() >= MAX_ERRORS {
            return false;
        }

        let state = *self.states.last().expect("state stack is never empty");

        // Token insertion: a candidate that lets the parse make several
        // tokens of progress is treated as merely missing. A unique
        // winner is taken outright; ties go to the cheapest candidate
        // from the preference list.
        if self.insertions_here < MAX_INSERTIONS {
            let candidates: Vec<TokenKind> = self
                .spec
                .actionable_tokens(state)
                .filter(|kind| !matches!(kind, TokenKind::Eoi))
                .filter(|kind| self.simulate(*kind))
                .collect();

            let winner = match candidates[..] {
                [candidate] => Some(candidate),
                [] => None,
                _ => PREFERRED_INSERTIONS
                    .iter()
                    .find(|preferred| candidates.contains(preferred))
                    .copied(),
            };

            if let Some(candidate) = winner {
                self.errors.push(self.missing_error(candidate));
                self.insert(candidate);
                self.insertions_here += 1;
                return true;
            }
        }

        self.errors.push(self.unexpected_error());

        // Skip to a synchronizing token that some state on the stack
        // can act on; tokens and states given up on are dropped.
        loop {
            let kind = self.input[self.cursor].kind;
            let sync = matches!(
                kind,
                TokenKind::Semicolon
                    | TokenKind::CloseBrace
                    | TokenKind::CloseParen
                    | TokenKind::CloseBracket
                    | TokenKind::Eoi
            );
            if sync {
                while self.states.len() > 1 {
                    let state = *self.states.last().expect("state stack is never empty");
                    if self.spec.action(state, kind).is_some() {
                        break;
                    }
                    self.states.pop();
                    self.values.pop();
                    self.syms.pop();
                }
                let state = *self.states.last().expect("state stack is never empty");
                if self.spec.action(state, kind).is_some() && kind != TokenKind::Eoi {
                    self.insertions_here = 0;
                    return true;
                }
                if kind == TokenKind::Eoi {
                    return false;
                }
            }
            self.cursor += 1;
        }
    }

    /// Inserts a synthetic token before the current one.
    fn insert(&mut self, kind: TokenKind) {
        let at = self.input[self.cursor].span.start();
        self.input.insert(self.cursor, Token::synthetic(kind, at));
    }

    /// Checks whether inserting `kind` lets the parse consume the next
    /// few tokens without another error.
    fn simulate(&self, kind: TokenKind) -> bool {
        let mut states = self.states.clone();
        let mut queue: Vec<TokenKind> = vec![kind];
        queue.extend(
            self.input[self.cursor..]
                .iter()
                .take(RECOVERY_PROBE)
                .map(|t| t.kind),
        );

        let mut consumed = 0usize;
        for token in queue {
            loop {
                let state = *states.last().expect("simulated stack is never empty");
                match self.spec.action(state, token) {
                    Some(Action::Shift(next)) => {
                        states.push(next);
                        break;
                    }
                    Some(Action::Reduce(production)) => {
                        let info = self.spec.production(production);
                        states.truncate(states.len() - info.rhs_len as usize);
                        let top = *states.last().expect("simulated stack is never empty");
                        match self.spec.goto(top, info.lhs) {
                            Some(next) => states.push(next),
                            None => return false,
                        }
                    }
                    Some(Action::Accept) => return true,
                    None => return false,
                }
            }
            consumed += 1;
        }

        // The inserted token itself does not count as progress.
        consumed > RECOVERY_PROBE || self.cursor + RECOVERY_PROBE >= self.input.len()
    }

    /// Builds the `Missing …` diagnostic for an inserted token.
    fn missing_error(&self, kind: TokenKind) -> Diagnostic {
        let token = &self.input[self.cursor];
        let at = Span::new(token.span.start(), 0);
        let message = match kind {
            TokenKind::Keyword(kw) => {
                format!("Missing keyword '{}'", kw.text().to_uppercase())
            }
            other => format!("Missing {}", other.describe()),
        };
        let mut diagnostic = Diagnostic::error(message, at);

        if kind == TokenKind::Comma {
            if let Some(rule) = self.infer_rule() {
                diagnostic = diagnostic.with_hint(format!(
                    "It appears that a ',' is missing in {rule} before '{text}'",
                    text = token.text
                ));
            }
        } else if kind == TokenKind::Colon {
            if matches!(self.infer_rule(), Some(rule) if rule == "an array slice") {
                diagnostic = diagnostic.with_hint(format!(
                    "It appears that a ':' is missing in an array slice before '{text}'",
                    text = token.text
                ));
            }
        }

        diagnostic
    }

    /// Builds the primary `Unexpected …` diagnostic for the current
    /// token.
    fn unexpected_error(&self) -> Diagnostic {
        let token = &self.input[self.cursor];

        if token.kind == TokenKind::Eoi {
            return Diagnostic::error("Unexpected end of input", token.span);
        }

        if let TokenKind::Keyword(kw) = token.kind {
            if kw == Keyword::Explain {
                return Diagnostic::error(
                    format!("Unexpected keyword '{}'", token.text),
                    token.span,
                )
                .with_hint("Use `analyze` to show query performance details");
            }
            if self.statement_in_arguments(kw) {
                return Diagnostic::error(
                    format!("Unexpected keyword '{}'", token.text),
                    token.span,
                )
                .with_hint("Missing parentheses around statement used as an expression");
            }
            if kw.is_reserved() && !self.top_is_expression() {
                return Diagnostic::error(
                    format!("Unexpected keyword '{}'", token.text),
                    token.span,
                )
                .with_details(format!(
                    "Token '{text}' is a reserved keyword and cannot be used as an identifier",
                    text = token.text
                ))
                .with_hint(format!(
                    "Use a different identifier or quote the name with backticks: `{text}`",
                    text = token.text
                ));
            }
        }

        if self.in_for_iterator() {
            return Diagnostic::error(
                "Missing parentheses around complex expression in a FOR iterator clause",
                token.span,
            );
        }

        Diagnostic::error(format!("Unexpected '{}'", token.text), token.span)
    }

    /// Detects an error inside the iterator of a `FOR` binding.
    fn in_for_iterator(&self) -> bool {
        let n = self.syms.len();
        (0..n).rev().take(4).any(|i| {
            matches!(self.syms[i], StackSym::Token(TokenKind::Keyword(Keyword::In)))
                && i >= 2
                && matches!(
                    self.syms[i - 2],
                    StackSym::Token(TokenKind::Keyword(Keyword::For))
                )
        })
    }

    /// Infers the syntactic rule enclosing the error position by
    /// scanning the symbol stack for the nearest unmatched opener.
    fn infer_rule(&self) -> Option<&'static str> {
        let mut need_brace = false;
        let mut need_paren = false;
        let mut need_bracket = false;
        if let Some(StackSym::Token(top)) = self.syms.last() {
            match top {
                TokenKind::CloseBrace => need_brace = true,
                TokenKind::CloseParen => need_paren = true,
                TokenKind::CloseBracket => need_bracket = true,
                _ => {}
            }
        }

        for (at, sym) in self.syms.iter().enumerate().rev() {
            let StackSym::Token(kind) = sym else { continue };
            let prev = at.checked_sub(1).map(|i| self.syms[i]);
            match kind {
                TokenKind::OpenBrace => {
                    if need_brace {
                        need_brace = false;
                        continue;
                    }
                    return match prev {
                        Some(StackSym::NonTerm(nt)) if self.is_expression_nonterm(nt) => {
                            Some("a shape")
                        }
                        Some(StackSym::Token(TokenKind::Colon)) => Some("a shape"),
                        _ => Some("a definition"),
                    };
                }
                TokenKind::OpenParen => {
                    if need_paren {
                        need_paren = false;
                        continue;
                    }
                    return match prev {
                        Some(StackSym::NonTerm(nt)) if self.is_name_nonterm(nt) => {
                            Some("a list of arguments")
                        }
                        _ => Some("a tuple"),
                    };
                }
                TokenKind::OpenBracket => {
                    if need_bracket {
                        need_bracket = false;
                        continue;
                    }
                    return match prev {
                        Some(StackSym::NonTerm(nt)) if self.is_expression_nonterm(nt) => {
                            Some("an array slice")
                        }
                        _ => Some("an array"),
                    };
                }
                _ => {}
            }
        }
        None
    }

    /// Detects an unparenthesized statement keyword in a call's
    /// argument list.
    fn statement_in_arguments(&self, kw: Keyword) -> bool {
        let statement = matches!(
            kw,
            Keyword::Select
                | Keyword::With
                | Keyword::For
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::Group
        );
        statement
            && matches!(self.syms.last(), Some(StackSym::Token(TokenKind::OpenParen)))
            && self.syms.len() >= 2
            && matches!(self.syms[self.syms.len() - 2], StackSym::NonTerm(nt) if self.is_name_nonterm(nt))
    }

    fn top_is_expression(&self) -> bool {
        match self.syms.last() {
            Some(StackSym::NonTerm(nt)) => self.is_expression_nonterm(*nt),
            _ => false,
        }
    }

    fn is_expression_nonterm(&self, nt: u32) -> bool {
        matches!(
            self.spec.nonterm_name(nt),
            "Expr" | "BaseAtomicExpr" | "AtomicExpr" | "ExprList" | "OptionallyAliasedExpr"
        )
    }

    fn is_name_nonterm(&self, nt: u32) -> bool {
        let name = self.spec.nonterm_name(nt);
        name.ends_with("NodeName") || name.ends_with("Identifier") || name == "BaseName"
    }
}

/// Picks the error to surface from a parse's collected errors.
///
/// The heuristic mirrors long-standing behavior: a sole `Unexpected
/// keyword` error wins outright; otherwise the earliest error, with
/// `Unexpected` preferred over `Missing` at the same position.
pub fn pick_error(errors: &[Diagnostic]) -> Diagnostic {
    assert!(!errors.is_empty(), "no errors to pick from");

    let unexpected: Vec<&Diagnostic> = errors
        .iter()
        .filter(|e| e.message().starts_with("Unexpected"))
        .collect();
    if let [only] = unexpected[..] {
        if only.message().starts_with("Unexpected keyword") {
            return only.clone();
        }
    }

    let mut sorted: Vec<&Diagnostic> = errors.iter().collect();
    sorted.sort_by_key(|e| {
        (
            e.span().start(),
            if e.message().starts_with("Unexpected") { 0 } else { 1 },
        )
    });
    sorted[0].clone()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::generate;
    use crate::grammar::n;
    use crate::grammar::t;
    use crate::grammar::GrammarBuilder;
    use crate::grammar::StackValue;

    /// A miniature arithmetic grammar exercising precedence resolution.
    fn mini_grammar() -> crate::grammar::Grammar {
        let mut g = GrammarBuilder::new();
        g.inline("Grammar", &[t(TokenKind::StartFragment), n("E")], 1);
        g.rule("E", &[n("E"), t(TokenKind::Plus), n("E")], |_, _| {
            Ok(StackValue::Empty)
        });
        g.rule("E", &[n("E"), t(TokenKind::Star), n("E")], |_, _| {
            Ok(StackValue::Empty)
        });
        g.rule("E", &[t(TokenKind::IntConst)], |_, _| Ok(StackValue::Empty));
        g.finish("Grammar")
    }

    fn int(text: &str, at: usize) -> Token {
        Token {
            kind: TokenKind::IntConst,
            text: text.to_string(),
            value: Some(crate::token::Value::Int(text.parse().unwrap())),
            span: Span::new(at, text.len()),
        }
    }

    #[test]
    fn the_driver_honors_precedence() {
        let spec = Spec::from_grammar(&mini_grammar()).unwrap();
        let tokens = vec![
            int("1", 0),
            Token::new(TokenKind::Plus, "+", Span::new(2, 1)),
            int("2", 4),
            Token::new(TokenKind::Star, "*", Span::new(6, 1)),
            int("3", 8),
        ];

        let result = parse(Dialect::Fragment, &tokens, &spec);
        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);

        // Underneath the start production, the root must be the
        // addition, with the multiplication nested as its right
        // operand.
        let root = result.out.unwrap();
        let CstNode::Production { args: start_args, .. } = &root else {
            panic!("expected a production root");
        };
        let CstNode::Production { production_id, args } = &start_args[1] else {
            panic!("expected an expression under the start token");
        };
        assert_eq!(
            spec.production(*production_id).method,
            "reduce_E_PLUS_E"
        );
        let CstNode::Production { production_id, .. } = &args[2] else {
            panic!("expected a production as the right operand");
        };
        assert_eq!(spec.production(*production_id).method, "reduce_E_STAR_E");
    }

    #[test]
    fn left_associativity_ties_resolve_to_reduce() {
        let spec = Spec::from_grammar(&mini_grammar()).unwrap();
        let tokens = vec![
            int("1", 0),
            Token::new(TokenKind::Plus, "+", Span::new(2, 1)),
            int("2", 4),
            Token::new(TokenKind::Plus, "+", Span::new(6, 1)),
            int("3", 8),
        ];

        let result = parse(Dialect::Fragment, &tokens, &spec);
        assert!(result.errors.is_empty());
        let CstNode::Production { args: start_args, .. } = result.out.unwrap() else {
            panic!("expected a production root");
        };
        let CstNode::Production { args, .. } = &start_args[1] else {
            panic!("expected an expression under the start token");
        };
        // `(1 + 2) + 3`: the left operand is itself an addition.
        assert!(matches!(&args[0], CstNode::Production { production_id, .. }
            if spec.production(*production_id).method == "reduce_E_PLUS_E"));
    }

    #[test]
    fn conflicts_without_precedence_fail_generation() {
        let mut g = GrammarBuilder::new();
        g.inline("Grammar", &[t(TokenKind::StartFragment), n("E")], 1);
        // A dangling juxtaposition with no precedence to resolve it.
        g.rule("E", &[n("E"), n("E")], |_, _| Ok(StackValue::Empty));
        g.rule("E", &[t(TokenKind::IntConst)], |_, _| Ok(StackValue::Empty));
        let grammar = g.finish("Grammar");
        assert!(Spec::from_grammar(&grammar).is_err());
    }

    #[test]
    fn the_full_grammar_generates_clean_tables() {
        let error = std::panic::catch_unwind(|| {
            crate::default_spec();
        });
        assert!(error.is_ok(), "table generation reported a conflict");
    }

    #[test]
    fn insertion_recovery_reports_missing_tokens() {
        let spec = Spec::from_grammar(&mini_grammar()).unwrap();
        // `1 + + 2` cannot be repaired by inserting one token uniquely,
        // but `1 2` misses exactly the operator… which is ambiguous
        // between `+` and `*`, so the parse reports the unexpected
        // token instead.
        let tokens = vec![int("1", 0), int("2", 2)];
        let result = parse(Dialect::Fragment, &tokens, &spec);
        assert!(!result.errors.is_empty());
        assert!(result.errors[0].message().starts_with("Unexpected"));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate::generate(&mini_grammar()).unwrap();
        let b = generate::generate(&mini_grammar()).unwrap();
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.goto, b.goto);
    }
}
