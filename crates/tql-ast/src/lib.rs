//! An abstract syntax tree for TQL queries and schema documents.
//!
//! The nodes here are pure data: the parser (in `tql-grammar`) constructs
//! them, downstream consumers (resolver, compiler) walk them. Nothing in
//! this crate performs semantic validation.
//!
//! Node categories:
//!
//! * [`expr`] - expressions, including the query statements (`SELECT`,
//!   `INSERT`, …), which are expressions in TQL;
//! * [`stmt`] - top-level commands (transaction control, session and
//!   configuration commands, `DESCRIBE`, and the DDL umbrella);
//! * [`ddl`] - data definition commands;
//! * [`sdl`] - schema definition language declarations;
//! * [`qltypes`] - the small value enums shared by all of the above.
//!
//! Every node carries a [`Span`](span::Span) wrapped in
//! [`Hidden`](span::Hidden), so structural equality between two trees
//! ignores where their nodes were parsed from.

pub mod ddl;
pub mod expr;
pub mod qltypes;
pub mod sdl;
pub mod span;
pub mod stmt;
pub mod visitor;

pub use ddl::DdlCommand;
pub use expr::Expr;
pub use sdl::Schema;
pub use sdl::SdlDeclaration;
pub use span::Hidden;
pub use span::SourcePoint;
pub use span::Span;
pub use stmt::Command;
pub use visitor::VisitReason;
pub use visitor::Visitor;
