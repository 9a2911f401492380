//! The TQL language front end.
//!
//! This crate is a facade over the component crates:
//!
//! * [`ast`] - the abstract syntax tree and its traversal;
//! * [`grammar`] - the tokenizer, parser, lowerer, and normalizer.
//!
//! The common entry points are re-exported at the root.

/// The abstract syntax tree.
pub mod ast {
    pub use tql_ast::*;
}

/// The tokenizer, parser, and normalizer.
pub mod grammar {
    pub use tql_grammar::*;
}

pub use tql_grammar::normalize;
pub use tql_grammar::parse_block;
pub use tql_grammar::parse_extension_package_body;
pub use tql_grammar::parse_fragment;
pub use tql_grammar::parse_migration_body;
pub use tql_grammar::parse_query;
pub use tql_grammar::parse_sdl_document;
pub use tql_grammar::preload_spec;
pub use tql_grammar::tokenize;
pub use tql_grammar::Diagnostic;
