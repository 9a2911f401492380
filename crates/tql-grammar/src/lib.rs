//! The TQL parsing front end.
//!
//! The pipeline is strictly one direction: source text is tokenized,
//! the token vector drives a table-based LR automaton that produces a
//! concrete syntax tree, and the lowerer re-executes the grammar's
//! semantic actions to turn that CST into the typed AST defined by
//! [`tql_ast`]. The optional normalizer rewrites a query's literals
//! into parameters ahead of parsing so equivalent queries share a plan
//! cache key.
//!
//! The parser tables are generated from the grammar declared in
//! [`grammar`]; they can be precomputed into a `.bc` artifact and
//! loaded at startup with [`preload_spec`], or built on first use.
//!
//! The per-dialect entry points are [`parse_block`], [`parse_fragment`]
//! (and its [`parse_query`] wrapper), [`parse_migration_body`],
//! [`parse_extension_package_body`], and [`parse_sdl_document`].

use std::path::Path;
use std::sync::OnceLock;

use tql_ast::ddl::DdlBlock;
use tql_ast::expr::Expr;
use tql_ast::sdl::Schema;
use tql_ast::stmt::Command;
use tracing::info;

pub mod cst;
pub mod diagnostic;
pub mod grammar;
pub mod keywords;
pub mod lexer;
pub mod lower;
pub mod normalize;
pub mod parser;
pub mod quote;
pub mod spec;
pub mod strings;
pub mod token;

pub use cst::CstNode;
pub use diagnostic::Diagnostic;
pub use diagnostic::Severity;
pub use diagnostic::SourcePoint;
pub use diagnostic::Span;
pub use keywords::Keyword;
pub use keywords::KeywordClass;
pub use lexer::tokenize;
pub use normalize::normalize;
pub use normalize::Entry;
pub use normalize::NormalizedSource;
pub use normalize::Source;
pub use parser::parse;
pub use parser::pick_error;
pub use parser::Dialect;
pub use parser::ParseResult;
pub use spec::Spec;
pub use spec::SpecError;
pub use token::Token;
pub use token::TokenKind;
pub use token::Value;

/// The compiled-in grammar, built once per process.
pub fn default_grammar() -> &'static grammar::Grammar {
    static GRAMMAR: OnceLock<grammar::Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(grammar::full_grammar)
}

/// The process-wide parser spec.
static SPEC: OnceLock<Spec> = OnceLock::new();

/// Gets the process-wide parser spec, generating it from the
/// compiled-in grammar if no artifact was preloaded.
pub fn default_spec() -> &'static Spec {
    SPEC.get_or_init(|| {
        Spec::from_grammar(default_grammar())
            .expect("the compiled-in grammar generates conflict-free tables")
    })
}

/// Loads the parser spec artifact from the given path into the
/// process-wide slot.
///
/// Has no effect if a spec is already loaded.
pub fn preload_spec(path: impl AsRef<Path>) -> Result<(), SpecError> {
    let path = path.as_ref();
    if SPEC.get().is_some() {
        return Ok(());
    }
    let loaded = Spec::load(path, default_grammar())?;
    info!(path = %path.display(), "preloaded parser spec");
    let _ = SPEC.set(loaded);
    Ok(())
}

/// Writes the current parser spec to a `.bc` artifact.
pub fn write_spec(path: impl AsRef<Path>) -> std::io::Result<()> {
    default_spec().write(path)
}

/// Runs the full pipeline for one dialect and lowers the result.
fn parse_and_lower(
    dialect: Dialect,
    source: &str,
) -> Result<grammar::StackValue, Diagnostic> {
    let tokens = tokenize(source)?;
    let spec = default_spec();
    let result = parse(dialect, &tokens, spec);
    if !result.errors.is_empty() {
        return Err(pick_error(&result.errors));
    }
    let cst = result
        .out
        .expect("an error-free parse produces a CST root");
    lower::lower(&cst, spec)
}

/// Parses a single expression.
pub fn parse_fragment(source: &str) -> Result<Expr, Diagnostic> {
    Ok(parse_and_lower(Dialect::Fragment, source)?.into_expr())
}

/// Parses a single expression, wrapping bare expressions into an
/// implicit `SELECT` so the result is always a query.
pub fn parse_query(source: &str) -> Result<Expr, Diagnostic> {
    let expr = parse_fragment(source)?;
    if expr.is_query() {
        Ok(expr)
    } else {
        Ok(Expr::Select(tql_ast::expr::SelectQuery::implicit(expr)))
    }
}

/// Parses a sequence of top-level statements.
pub fn parse_block(source: &str) -> Result<Vec<Command>, Diagnostic> {
    Ok(parse_and_lower(Dialect::Block, source)?
        .into_list()
        .into_iter()
        .map(grammar::StackValue::into_command)
        .collect())
}

/// Parses the body of a `CREATE MIGRATION` block.
///
/// There is no production for the *inside* of a migration block on its
/// own, so the source is wrapped in braces before parsing; spans in the
/// result are offset by the added brace.
pub fn parse_migration_body(source: &str) -> Result<DdlBlock, Diagnostic> {
    let wrapped = format!("{{{source}}}");
    let value = parse_and_lower(Dialect::Migration, &wrapped)?;
    Ok(match value {
        grammar::StackValue::DdlBlock(block) => block,
        other => panic!("migration body lowers to a block, found {other:?}"),
    })
}

/// Parses the body of a `CREATE EXTENSION PACKAGE` block.
///
/// The same brace-wrapping shim as [`parse_migration_body`] applies.
pub fn parse_extension_package_body(source: &str) -> Result<DdlBlock, Diagnostic> {
    let wrapped = format!("{{{source}}}");
    let value = parse_and_lower(Dialect::Extension, &wrapped)?;
    Ok(match value {
        grammar::StackValue::DdlBlock(block) => block,
        other => panic!("extension package body lowers to a block, found {other:?}"),
    })
}

/// Parses a schema definition document.
pub fn parse_sdl_document(source: &str) -> Result<Schema, Diagnostic> {
    let value = parse_and_lower(Dialect::SdlDocument, source)?;
    Ok(match value {
        grammar::StackValue::Schema(schema) => schema,
        other => panic!("an SDL document lowers to a schema, found {other:?}"),
    })
}
