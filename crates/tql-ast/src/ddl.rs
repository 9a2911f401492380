//! Data definition command nodes.

use crate::expr::Expr;
use crate::expr::ObjectRef;
use crate::expr::TypeExpr;
use crate::qltypes::Language;
use crate::qltypes::LinkSourceDeleteAction;
use crate::qltypes::LinkTargetDeleteAction;
use crate::qltypes::OperatorKind;
use crate::qltypes::ParameterKind;
use crate::qltypes::SchemaCardinality;
use crate::qltypes::TypeModifier;
use crate::sdl::Schema;
use crate::span::Hidden;
use crate::span::Span;
use crate::stmt::Command;

/// A data definition command, either top-level or nested inside another
/// command's block.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlCommand {
    /// `CREATE DATABASE name`
    CreateDatabase(CreateDatabase),
    /// `DROP DATABASE name`
    DropDatabase(DropObject),
    /// `CREATE [SUPERUSER] ROLE name …`
    CreateRole(CreateRole),
    /// `ALTER ROLE name …`
    AlterRole(AlterObject),
    /// `DROP ROLE name`
    DropRole(DropObject),
    /// `CREATE MIGRATION [name [ONTO parent]] { … }`
    CreateMigration(CreateMigration),
    /// `START MIGRATION TO { … }`
    StartMigration(StartMigration),
    /// `ABORT MIGRATION`
    AbortMigration(MigrationCommand),
    /// `POPULATE MIGRATION`
    PopulateMigration(MigrationCommand),
    /// `COMMIT MIGRATION`
    CommitMigration(MigrationCommand),
    /// `ALTER MIGRATION name …`
    AlterMigration(AlterObject),
    /// `DROP MIGRATION name`
    DropMigration(DropObject),
    /// `CREATE MODULE name`
    CreateModule(CreateModule),
    /// `ALTER MODULE name …`
    AlterModule(AlterObject),
    /// `DROP MODULE name`
    DropModule(DropObject),
    /// `CREATE [ABSTRACT] SCALAR TYPE name …`
    CreateScalarType(CreateScalarType),
    /// `ALTER SCALAR TYPE name …`
    AlterScalarType(AlterObject),
    /// `DROP SCALAR TYPE name`
    DropScalarType(DropObject),
    /// `CREATE [ABSTRACT] TYPE name …`
    CreateObjectType(CreateObjectType),
    /// `ALTER TYPE name …`
    AlterObjectType(AlterObject),
    /// `DROP TYPE name`
    DropObjectType(DropObject),
    /// `CREATE ALIAS name := expr`
    CreateAlias(CreateAlias),
    /// `ALTER ALIAS name …`
    AlterAlias(AlterObject),
    /// `DROP ALIAS name`
    DropAlias(DropObject),
    /// `CREATE ABSTRACT [INHERITABLE] ANNOTATION name`
    CreateAnnotation(CreateAnnotation),
    /// `ALTER ABSTRACT ANNOTATION name …`
    AlterAnnotation(AlterObject),
    /// `DROP ABSTRACT ANNOTATION name`
    DropAnnotation(DropObject),
    /// `CREATE ABSTRACT LINK name …`
    CreateLink(CreatePointer),
    /// `ALTER ABSTRACT LINK name …`
    AlterLink(AlterObject),
    /// `DROP ABSTRACT LINK name`
    DropLink(DropObject),
    /// `CREATE [qualifiers] LINK name … -> type` (inside a type block)
    CreateConcreteLink(CreateConcretePointer),
    /// `ALTER LINK name …` (inside a type block)
    AlterConcreteLink(AlterObject),
    /// `DROP LINK name` (inside a type block)
    DropConcreteLink(DropObject),
    /// `CREATE ABSTRACT PROPERTY name …`
    CreateProperty(CreatePointer),
    /// `ALTER ABSTRACT PROPERTY name …`
    AlterProperty(AlterObject),
    /// `DROP ABSTRACT PROPERTY name`
    DropProperty(DropObject),
    /// `CREATE [qualifiers] PROPERTY name … -> type`
    CreateConcreteProperty(CreateConcretePointer),
    /// `ALTER PROPERTY name …`
    AlterConcreteProperty(AlterObject),
    /// `DROP PROPERTY name`
    DropConcreteProperty(DropObject),
    /// `CREATE ABSTRACT CONSTRAINT name(params) [ON (expr)] …`
    CreateConstraint(CreateConstraint),
    /// `ALTER ABSTRACT CONSTRAINT name …`
    AlterConstraint(AlterObject),
    /// `DROP ABSTRACT CONSTRAINT name`
    DropConstraint(DropObject),
    /// `CREATE [DELEGATED] CONSTRAINT name(args) [ON (expr)] …`
    CreateConcreteConstraint(CreateConcreteConstraint),
    /// `ALTER CONSTRAINT name …`
    AlterConcreteConstraint(AlterConcreteConstraint),
    /// `DROP CONSTRAINT name [ON (expr)]`
    DropConcreteConstraint(AlterConcreteConstraint),
    /// `CREATE INDEX ON (expr) [EXCEPT (expr)] …`
    CreateIndex(CreateIndex),
    /// `ALTER INDEX ON (expr) …`
    AlterIndex(AlterIndex),
    /// `DROP INDEX ON (expr)`
    DropIndex(AlterIndex),
    /// `CREATE FUNCTION name(params) -> type { … }`
    CreateFunction(CreateFunction),
    /// `ALTER FUNCTION name(params) …`
    AlterFunction(AlterFunction),
    /// `DROP FUNCTION name(params)`
    DropFunction(AlterFunction),
    /// `CREATE [ABSTRACT] INFIX|PREFIX|POSTFIX|TERNARY OPERATOR …`
    CreateOperator(CreateOperator),
    /// `ALTER … OPERATOR name(params) …`
    AlterOperator(AlterOperator),
    /// `DROP … OPERATOR name(params)`
    DropOperator(AlterOperator),
    /// `CREATE CAST FROM type TO type { … }`
    CreateCast(CreateCast),
    /// `ALTER CAST FROM type TO type { … }`
    AlterCast(AlterCast),
    /// `DROP CAST FROM type TO type`
    DropCast(AlterCast),
    /// `CREATE EXTENSION name [VERSION str]`
    CreateExtension(CreateExtension),
    /// `DROP EXTENSION name`
    DropExtension(DropObject),
    /// `CREATE EXTENSION PACKAGE name VERSION str { … }`
    CreateExtensionPackage(CreateExtensionPackage),
    /// `DROP EXTENSION PACKAGE name VERSION str`
    DropExtensionPackage(CreateExtensionPackage),

    /// `SET field := expr` (inside a command block)
    SetField(SetField),
    /// `RESET field` (inside a command block)
    ResetField(ResetField),
    /// `CREATE ANNOTATION name := expr` / `SET ANNOTATION name := expr`
    SetAnnotationValue(SetAnnotationValue),
    /// `DROP ANNOTATION name` (a value, inside a command block)
    DropAnnotationValue(DropAnnotationValue),
    /// `RENAME TO name`
    Rename(Rename),
    /// `EXTENDING bases [position]` (inside an alter block)
    AlterAddInherit(AlterAddInherit),
    /// `DROP EXTENDING bases`
    AlterDropInherit(AlterDropInherit),
    /// `SET TYPE type [USING (expr)]`
    SetPointerType(SetPointerType),
    /// `SET single` / `SET multi [USING (expr)]`
    SetPointerCardinality(SetPointerCardinality),
    /// `SET required` / `SET optional [USING (expr)]`
    SetPointerOptionality(SetPointerOptionality),
    /// `USING (expr)` (inside an alter block)
    SetUsing(SetUsing),
    /// `ON TARGET DELETE action`
    OnTargetDelete(OnTargetDelete),
    /// `ON SOURCE DELETE action`
    OnSourceDelete(OnSourceDelete),
}

impl DdlCommand {
    /// Gets the source span of the command.
    pub fn span(&self) -> Span {
        match self {
            Self::CreateDatabase(n) => n.span.0,
            Self::DropDatabase(n) => n.span.0,
            Self::CreateRole(n) => n.span.0,
            Self::AlterRole(n) => n.span.0,
            Self::DropRole(n) => n.span.0,
            Self::CreateMigration(n) => n.span.0,
            Self::StartMigration(n) => n.span.0,
            Self::AbortMigration(n) => n.span.0,
            Self::PopulateMigration(n) => n.span.0,
            Self::CommitMigration(n) => n.span.0,
            Self::AlterMigration(n) => n.span.0,
            Self::DropMigration(n) => n.span.0,
            Self::CreateModule(n) => n.span.0,
            Self::AlterModule(n) => n.span.0,
            Self::DropModule(n) => n.span.0,
            Self::CreateScalarType(n) => n.span.0,
            Self::AlterScalarType(n) => n.span.0,
            Self::DropScalarType(n) => n.span.0,
            Self::CreateObjectType(n) => n.span.0,
            Self::AlterObjectType(n) => n.span.0,
            Self::DropObjectType(n) => n.span.0,
            Self::CreateAlias(n) => n.span.0,
            Self::AlterAlias(n) => n.span.0,
            Self::DropAlias(n) => n.span.0,
            Self::CreateAnnotation(n) => n.span.0,
            Self::AlterAnnotation(n) => n.span.0,
            Self::DropAnnotation(n) => n.span.0,
            Self::CreateLink(n) => n.span.0,
            Self::AlterLink(n) => n.span.0,
            Self::DropLink(n) => n.span.0,
            Self::CreateConcreteLink(n) => n.span.0,
            Self::AlterConcreteLink(n) => n.span.0,
            Self::DropConcreteLink(n) => n.span.0,
            Self::CreateProperty(n) => n.span.0,
            Self::AlterProperty(n) => n.span.0,
            Self::DropProperty(n) => n.span.0,
            Self::CreateConcreteProperty(n) => n.span.0,
            Self::AlterConcreteProperty(n) => n.span.0,
            Self::DropConcreteProperty(n) => n.span.0,
            Self::CreateConstraint(n) => n.span.0,
            Self::AlterConstraint(n) => n.span.0,
            Self::DropConstraint(n) => n.span.0,
            Self::CreateConcreteConstraint(n) => n.span.0,
            Self::AlterConcreteConstraint(n) => n.span.0,
            Self::DropConcreteConstraint(n) => n.span.0,
            Self::CreateIndex(n) => n.span.0,
            Self::AlterIndex(n) => n.span.0,
            Self::DropIndex(n) => n.span.0,
            Self::CreateFunction(n) => n.span.0,
            Self::AlterFunction(n) => n.span.0,
            Self::DropFunction(n) => n.span.0,
            Self::CreateOperator(n) => n.span.0,
            Self::AlterOperator(n) => n.span.0,
            Self::DropOperator(n) => n.span.0,
            Self::CreateCast(n) => n.span.0,
            Self::AlterCast(n) => n.span.0,
            Self::DropCast(n) => n.span.0,
            Self::CreateExtension(n) => n.span.0,
            Self::DropExtension(n) => n.span.0,
            Self::CreateExtensionPackage(n) => n.span.0,
            Self::DropExtensionPackage(n) => n.span.0,
            Self::SetField(n) => n.span.0,
            Self::ResetField(n) => n.span.0,
            Self::SetAnnotationValue(n) => n.span.0,
            Self::DropAnnotationValue(n) => n.span.0,
            Self::Rename(n) => n.span.0,
            Self::AlterAddInherit(n) => n.span.0,
            Self::AlterDropInherit(n) => n.span.0,
            Self::SetPointerType(n) => n.span.0,
            Self::SetPointerCardinality(n) => n.span.0,
            Self::SetPointerOptionality(n) => n.span.0,
            Self::SetUsing(n) => n.span.0,
            Self::OnTargetDelete(n) => n.span.0,
            Self::OnSourceDelete(n) => n.span.0,
        }
    }
}

/// An `ALTER` command addressing a named object, carrying a block of
/// subcommands.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterObject {
    /// The altered object.
    pub name: ObjectRef,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `DROP` command addressing a named object.
#[derive(Debug, Clone, PartialEq)]
pub struct DropObject {
    /// The dropped object.
    pub name: ObjectRef,
    /// The nested subcommands, when a block was written.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE DATABASE` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabase {
    /// The database name.
    pub name: ObjectRef,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE ROLE` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRole {
    /// The role name.
    pub name: ObjectRef,
    /// Whether the role is a superuser.
    pub superuser: bool,
    /// The roles this role extends.
    pub extending: Vec<ObjectRef>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// The body of a migration or extension-package block: the nested
/// commands plus any `SET field := …` metadata written alongside them.
#[derive(Debug, Clone, PartialEq)]
pub struct DdlBlock {
    /// The commands of the block, in source order.
    pub commands: Vec<Command>,
    /// The source span of the block.
    pub span: Hidden<Span>,
}

/// A `CREATE MIGRATION` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMigration {
    /// The migration name, when written.
    pub name: Option<ObjectRef>,
    /// The parent migration of an `ONTO` clause.
    pub parent: Option<ObjectRef>,
    /// The migration body.
    pub body: DdlBlock,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `START MIGRATION TO { … }` command.
#[derive(Debug, Clone, PartialEq)]
pub struct StartMigration {
    /// The target schema document.
    pub target: Schema,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A bare migration command (`ABORT`/`POPULATE`/`COMMIT MIGRATION`).
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationCommand {
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE MODULE` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateModule {
    /// The module name.
    pub name: ObjectRef,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE SCALAR TYPE` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateScalarType {
    /// The type name.
    pub name: ObjectRef,
    /// Whether the type is abstract.
    pub abstract_: bool,
    /// The extended base types.
    pub extending: Vec<TypeExpr>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE TYPE` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateObjectType {
    /// The type name.
    pub name: ObjectRef,
    /// Whether the type is abstract.
    pub abstract_: bool,
    /// The extended base types.
    pub extending: Vec<TypeExpr>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE ALIAS` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAlias {
    /// The alias name.
    pub name: ObjectRef,
    /// The aliased expression, for the short `:= expr` form.
    pub value: Option<Box<Expr>>,
    /// The nested subcommands, for the block form.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE ABSTRACT ANNOTATION` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAnnotation {
    /// The annotation name.
    pub name: ObjectRef,
    /// Whether values of the annotation are inherited.
    pub inheritable: bool,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE ABSTRACT LINK` / `CREATE ABSTRACT PROPERTY` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePointer {
    /// The pointer name.
    pub name: ObjectRef,
    /// The extended base pointers.
    pub extending: Vec<TypeExpr>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// The declared target of a concrete pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// An explicit target type.
    Type(TypeExpr),
    /// A computed pointer (`:= expr`).
    Computed(Box<Expr>),
}

/// A `CREATE LINK` / `CREATE PROPERTY` command inside a type block.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateConcretePointer {
    /// The pointer name.
    pub name: ObjectRef,
    /// The `required`/`optional` qualifier, when written.
    pub required: Option<bool>,
    /// The `single`/`multi` qualifier, when written.
    pub cardinality: Option<SchemaCardinality>,
    /// The extended base pointers.
    pub extending: Vec<TypeExpr>,
    /// The declared target.
    pub target: Option<PointerTarget>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE ABSTRACT CONSTRAINT` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateConstraint {
    /// The constraint name.
    pub name: ObjectRef,
    /// The declared parameters.
    pub params: Vec<FuncParam>,
    /// The `ON (expr)` subject clause.
    pub on: Option<Box<Expr>>,
    /// The extended base constraints.
    pub extending: Vec<TypeExpr>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE CONSTRAINT` command inside a type or pointer block.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateConcreteConstraint {
    /// The constraint name.
    pub name: ObjectRef,
    /// The constraint arguments.
    pub args: Vec<Expr>,
    /// The `ON (expr)` subject clause.
    pub on: Option<Box<Expr>>,
    /// The `EXCEPT (expr)` clause.
    pub except: Option<Box<Expr>>,
    /// Whether the constraint is delegated.
    pub delegated: bool,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// An `ALTER`/`DROP CONSTRAINT` command addressing a concrete constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterConcreteConstraint {
    /// The constraint name.
    pub name: ObjectRef,
    /// The constraint arguments.
    pub args: Vec<Expr>,
    /// The `ON (expr)` subject clause.
    pub on: Option<Box<Expr>>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE INDEX` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    /// The indexed expression.
    pub expr: Box<Expr>,
    /// The `EXCEPT (expr)` clause.
    pub except: Option<Box<Expr>>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// An `ALTER`/`DROP INDEX` command.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterIndex {
    /// The indexed expression.
    pub expr: Box<Expr>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A declared function, operator, or constraint parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncParam {
    /// The parameter kind.
    pub kind: ParameterKind,
    /// The parameter name.
    pub name: String,
    /// The set-type modifier of the parameter.
    pub typemod: TypeModifier,
    /// The parameter type.
    pub ty: TypeExpr,
    /// The default value, when declared.
    pub default: Option<Box<Expr>>,
    /// The source span of the parameter.
    pub span: Hidden<Span>,
}

/// The implementation of a function, operator, or cast.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionCode {
    /// The implementation language of a `USING LANGUAGE` body.
    pub language: Option<Language>,
    /// The body source, for `USING LANGUAGE x 'code'` bodies.
    pub code: Option<String>,
    /// The delegated backend function of `USING x FUNCTION 'name'`.
    pub from_function: Option<String>,
    /// The body expression of a `USING (expr)` body.
    pub from_expr: Option<Box<Expr>>,
}

/// A `CREATE FUNCTION` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateFunction {
    /// The function name.
    pub name: ObjectRef,
    /// The declared parameters.
    pub params: Vec<FuncParam>,
    /// The return type.
    pub returning: TypeExpr,
    /// The set-type modifier of the return type.
    pub returning_typemod: TypeModifier,
    /// The function body.
    pub code: FunctionCode,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// An `ALTER`/`DROP FUNCTION` command.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterFunction {
    /// The function name.
    pub name: ObjectRef,
    /// The declared parameters identifying the overload.
    pub params: Vec<FuncParam>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE … OPERATOR` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperator {
    /// The operator fixity.
    pub kind: OperatorKind,
    /// The operator name.
    pub name: ObjectRef,
    /// The declared parameters.
    pub params: Vec<FuncParam>,
    /// The return type.
    pub returning: TypeExpr,
    /// The set-type modifier of the return type.
    pub returning_typemod: TypeModifier,
    /// Whether the operator is abstract.
    pub abstract_: bool,
    /// The operator body.
    pub code: FunctionCode,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// An `ALTER`/`DROP … OPERATOR` command.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterOperator {
    /// The operator fixity.
    pub kind: OperatorKind,
    /// The operator name.
    pub name: ObjectRef,
    /// The declared parameters identifying the overload.
    pub params: Vec<FuncParam>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE CAST` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCast {
    /// The source type.
    pub from_type: TypeExpr,
    /// The target type.
    pub to_type: TypeExpr,
    /// Whether the cast may be applied implicitly.
    pub allow_implicit: bool,
    /// Whether the cast may be applied in assignments.
    pub allow_assignment: bool,
    /// The cast body.
    pub code: FunctionCode,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// An `ALTER`/`DROP CAST` command.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterCast {
    /// The source type.
    pub from_type: TypeExpr,
    /// The target type.
    pub to_type: TypeExpr,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE EXTENSION` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateExtension {
    /// The extension name.
    pub name: ObjectRef,
    /// The requested version string.
    pub version: Option<String>,
    /// The nested subcommands.
    pub commands: Vec<DdlCommand>,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `CREATE EXTENSION PACKAGE` command.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateExtensionPackage {
    /// The package name.
    pub name: ObjectRef,
    /// The package version string.
    pub version: String,
    /// The package body.
    pub body: DdlBlock,
    /// The source span of the command.
    pub span: Hidden<Span>,
}

/// A `SET field := expr` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SetField {
    /// The field name.
    pub name: String,
    /// The new value.
    pub value: Box<Expr>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `RESET field` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetField {
    /// The field name.
    pub name: String,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `CREATE ANNOTATION name := expr` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SetAnnotationValue {
    /// The annotation name.
    pub name: ObjectRef,
    /// The annotation value.
    pub value: Box<Expr>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `DROP ANNOTATION name` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct DropAnnotationValue {
    /// The annotation name.
    pub name: ObjectRef,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `RENAME TO name` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct Rename {
    /// The new name.
    pub new_name: ObjectRef,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// Where newly added bases are placed in the inheritance list.
#[derive(Debug, Clone, PartialEq)]
pub enum InheritPosition {
    /// `FIRST`
    First,
    /// `LAST`
    Last,
    /// `BEFORE base`
    Before(ObjectRef),
    /// `AFTER base`
    After(ObjectRef),
}

/// An `EXTENDING bases [position]` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterAddInherit {
    /// The added bases.
    pub bases: Vec<TypeExpr>,
    /// The placement of the added bases.
    pub position: Option<InheritPosition>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `DROP EXTENDING bases` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterDropInherit {
    /// The removed bases.
    pub bases: Vec<TypeExpr>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `SET TYPE type [USING (expr)]` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPointerType {
    /// The new target type.
    pub ty: TypeExpr,
    /// The conversion expression of the `USING` clause.
    pub cast_expr: Option<Box<Expr>>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `SET single`/`SET multi` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPointerCardinality {
    /// The new cardinality.
    pub cardinality: SchemaCardinality,
    /// The conversion expression of the `USING` clause.
    pub conv_expr: Option<Box<Expr>>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `SET required`/`SET optional` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPointerOptionality {
    /// Whether the pointer becomes required.
    pub required: bool,
    /// The fill expression of the `USING` clause.
    pub fill_expr: Option<Box<Expr>>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// A `USING (expr)` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct SetUsing {
    /// The new computed expression.
    pub expr: Box<Expr>,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// An `ON TARGET DELETE` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct OnTargetDelete {
    /// The configured action.
    pub action: LinkTargetDeleteAction,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}

/// An `ON SOURCE DELETE` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct OnSourceDelete {
    /// The configured action.
    pub action: LinkSourceDeleteAction,
    /// The source span of the subcommand.
    pub span: Hidden<Span>,
}
