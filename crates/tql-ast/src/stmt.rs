//! Top-level command nodes.

use crate::ddl::DdlCommand;
use crate::expr::Expr;
use crate::expr::NamedTuple;
use crate::expr::ObjectRef;
use crate::expr::ShapeElement;
use crate::qltypes::ConfigScope;
use crate::qltypes::DescribeGlobal;
use crate::qltypes::DescribeLanguage;
use crate::qltypes::TransactionAccessMode;
use crate::qltypes::TransactionDeferMode;
use crate::qltypes::TransactionIsolationLevel;
use crate::span::Hidden;
use crate::span::Span;

/// A top-level command: one entry of a statement block.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// An expression statement (a query).
    Expr(Expr),
    /// `START TRANSACTION …`
    StartTransaction(StartTransaction),
    /// `COMMIT`
    CommitTransaction(CommitTransaction),
    /// `ROLLBACK`
    RollbackTransaction(RollbackTransaction),
    /// `DECLARE SAVEPOINT name`
    DeclareSavepoint(DeclareSavepoint),
    /// `RELEASE SAVEPOINT name`
    ReleaseSavepoint(ReleaseSavepoint),
    /// `ROLLBACK TO SAVEPOINT name`
    RollbackToSavepoint(RollbackToSavepoint),
    /// `DESCRIBE …`
    Describe(DescribeStmt),
    /// `ANALYZE …`
    Analyze(AnalyzeStmt),
    /// `ADMINISTER func()`
    Administer(AdministerStmt),
    /// `SET MODULE name` / `SET ALIAS name AS MODULE name`
    SessionSetAlias(SessionSetAlias),
    /// `RESET MODULE` / `RESET ALIAS name` / `RESET ALIAS *`
    SessionResetAlias(SessionResetAlias),
    /// `CONFIGURE … SET …`
    ConfigSet(ConfigSet),
    /// `CONFIGURE … RESET …`
    ConfigReset(ConfigReset),
    /// `CONFIGURE … INSERT …`
    ConfigInsert(ConfigInsert),
    /// A data definition command.
    Ddl(DdlCommand),
}

impl Command {
    /// Gets the source span of the command.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(e) => e.span(),
            Self::StartTransaction(n) => n.span.0,
            Self::CommitTransaction(n) => n.span.0,
            Self::RollbackTransaction(n) => n.span.0,
            Self::DeclareSavepoint(n) => n.span.0,
            Self::ReleaseSavepoint(n) => n.span.0,
            Self::RollbackToSavepoint(n) => n.span.0,
            Self::Describe(n) => n.span.0,
            Self::Analyze(n) => n.span.0,
            Self::Administer(n) => n.span.0,
            Self::SessionSetAlias(n) => n.span.0,
            Self::SessionResetAlias(n) => n.span.0,
            Self::ConfigSet(n) => n.span.0,
            Self::ConfigReset(n) => n.span.0,
            Self::ConfigInsert(n) => n.span.0,
            Self::Ddl(d) => d.span(),
        }
    }
}

/// A `START TRANSACTION` command.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTransaction {
    /// The requested isolation level.
    pub isolation: Option<TransactionIsolationLevel>,
    /// The requested access mode.
    pub access: Option<TransactionAccessMode>,
    /// The requested deferrability.
    pub deferrable: Option<TransactionDeferMode>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `COMMIT` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitTransaction {
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `ROLLBACK` command.
#[derive(Debug, Clone, PartialEq)]
pub struct RollbackTransaction {
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `DECLARE SAVEPOINT` command.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareSavepoint {
    /// The savepoint name.
    pub name: String,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `RELEASE SAVEPOINT` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSavepoint {
    /// The savepoint name.
    pub name: String,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `ROLLBACK TO SAVEPOINT` command.
#[derive(Debug, Clone, PartialEq)]
pub struct RollbackToSavepoint {
    /// The savepoint name.
    pub name: String,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// The object addressed by a `DESCRIBE` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum DescribeTarget {
    /// A well-known global (schema, config, roles).
    Global(DescribeGlobal),
    /// A named schema object.
    Object(ObjectRef),
    /// The migration currently being built.
    CurrentMigration,
}

/// A `DESCRIBE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DescribeStmt {
    /// What is being described.
    pub target: DescribeTarget,
    /// The output language.
    pub language: DescribeLanguage,
    /// Whether `VERBOSE` output was requested.
    pub verbose: bool,
    /// The source span of the statement.
    pub span: Hidden<Span>,
}

/// An `ANALYZE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeStmt {
    /// The analysis options, when written as a named tuple.
    pub args: Option<NamedTuple>,
    /// The analyzed query.
    pub query: Box<Expr>,
    /// The source span of the statement.
    pub span: Hidden<Span>,
}

/// An `ADMINISTER` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AdministerStmt {
    /// The administrative function call.
    pub expr: Box<Expr>,
    /// The source span of the statement.
    pub span: Hidden<Span>,
}

/// A session `SET` alias command.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSetAlias {
    /// The alias being set; `None` sets the default module.
    pub alias: Option<String>,
    /// The target module name.
    pub module: String,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A session `RESET` alias command.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResetAliasKind {
    /// `RESET ALIAS name`
    Alias(String),
    /// `RESET MODULE`
    Module,
    /// `RESET ALIAS *`
    AllAliases,
}

/// A session `RESET` command.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResetAlias {
    /// What is being reset.
    pub kind: SessionResetAliasKind,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CONFIGURE … SET name := value` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSet {
    /// The configuration scope.
    pub scope: ConfigScope,
    /// The configured setting.
    pub name: ObjectRef,
    /// The new value.
    pub value: Box<Expr>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CONFIGURE … RESET name [FILTER expr]` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigReset {
    /// The configuration scope.
    pub scope: ConfigScope,
    /// The reset setting or object.
    pub name: ObjectRef,
    /// The `FILTER` clause restricting the reset.
    pub filter: Option<Box<Expr>>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CONFIGURE … INSERT Object { … }` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigInsert {
    /// The configuration scope.
    pub scope: ConfigScope,
    /// The inserted configuration object.
    pub name: ObjectRef,
    /// The inserted shape.
    pub shape: Vec<ShapeElement>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}
