//! Value enumerations shared between the AST and its consumers.

use std::fmt;

/// The effective cardinality of a pointer or parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// At most one value.
    One,
    /// Any number of values.
    Many,
}

/// The declared upper cardinality of a pointer definition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SchemaCardinality {
    /// `single`
    Single,
    /// `multi`
    Multi,
}

impl fmt::Display for SchemaCardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// The kind of a function or operator parameter.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// An ordinary positional parameter.
    #[default]
    Positional,
    /// A `VARIADIC` parameter.
    Variadic,
    /// A `NAMED ONLY` parameter.
    NamedOnly,
}

/// The set-type modifier of a parameter or return type.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TypeModifier {
    /// Exactly one value (the default).
    #[default]
    Singleton,
    /// `OPTIONAL`: zero or one value.
    Optional,
    /// `SET OF`: any number of values.
    SetOf,
}

/// The implementation language of a function body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    /// A body expressed in TQL itself.
    Tql,
    /// A body delegated to the SQL backend.
    Sql,
}

/// The output language of a `DESCRIBE` statement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DescribeLanguage {
    /// Imperative DDL commands.
    Ddl,
    /// Declarative SDL.
    Sdl,
    /// Human-readable text.
    Text,
    /// A JSON document.
    Json,
}

/// The global addressed by a bare `DESCRIBE` statement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DescribeGlobal {
    /// `DESCRIBE SCHEMA`
    Schema,
    /// `DESCRIBE CURRENT DATABASE CONFIG`
    DatabaseConfig,
    /// `DESCRIBE INSTANCE CONFIG`
    InstanceConfig,
    /// `DESCRIBE ROLES`
    Roles,
}

/// A transaction isolation level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransactionIsolationLevel {
    /// `ISOLATION SERIALIZABLE`
    Serializable,
    /// `ISOLATION REPEATABLE READ`
    RepeatableRead,
}

/// A transaction access mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransactionAccessMode {
    /// `READ WRITE`
    ReadWrite,
    /// `READ ONLY`
    ReadOnly,
}

/// A transaction deferrability mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransactionDeferMode {
    /// `DEFERRABLE`
    Deferrable,
    /// `NOT DEFERRABLE`
    NotDeferrable,
}

/// The scope of a `CONFIGURE` command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConfigScope {
    /// `CONFIGURE SESSION`
    Session,
    /// `CONFIGURE CURRENT DATABASE`
    Database,
    /// `CONFIGURE INSTANCE`
    Instance,
}

/// The fixity of an operator definition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// `INFIX OPERATOR`
    Infix,
    /// `POSTFIX OPERATOR`
    Postfix,
    /// `PREFIX OPERATOR`
    Prefix,
    /// `TERNARY OPERATOR`
    Ternary,
}

/// The action taken when a link target is deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LinkTargetDeleteAction {
    /// `ON TARGET DELETE RESTRICT`
    Restrict,
    /// `ON TARGET DELETE DELETE SOURCE`
    DeleteSource,
    /// `ON TARGET DELETE ALLOW`
    Allow,
    /// `ON TARGET DELETE DEFERRED RESTRICT`
    DeferredRestrict,
}

/// The action taken when a link source is deleted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LinkSourceDeleteAction {
    /// `ON SOURCE DELETE DELETE TARGET`
    DeleteTarget,
    /// `ON SOURCE DELETE ALLOW`
    Allow,
    /// `ON SOURCE DELETE DELETE TARGET IF ORPHAN`
    DeleteTargetIfOrphan,
}

/// The direction of an `ORDER BY` key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// `ASC` (the default).
    Asc,
    /// `DESC`
    Desc,
}

/// Where empty values sort relative to non-empty ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NonesOrder {
    /// `EMPTY FIRST`
    First,
    /// `EMPTY LAST`
    Last,
}
