//! Schema definition language (SDL) declaration nodes.
//!
//! SDL is the declarative mirror of the DDL command set: a schema file
//! states what exists rather than how to get there. The hierarchy here
//! parallels [`crate::ddl`] but carries no subcommand blocks, only
//! nested declarations.

use crate::ddl::FuncParam;
use crate::ddl::FunctionCode;
use crate::expr::Expr;
use crate::expr::ObjectRef;
use crate::expr::TypeExpr;
use crate::qltypes::LinkSourceDeleteAction;
use crate::qltypes::LinkTargetDeleteAction;
use crate::qltypes::SchemaCardinality;
use crate::qltypes::TypeModifier;
use crate::span::Hidden;
use crate::span::Span;

/// A parsed schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// The top-level declarations, in source order.
    pub declarations: Vec<SdlDeclaration>,
    /// The source span of the document.
    pub span: Hidden<Span>,
}

/// A top-level SDL declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum SdlDeclaration {
    /// `module name { … }`
    Module(ModuleDeclaration),
    /// `[abstract] scalar type name …`
    ScalarType(ScalarTypeDeclaration),
    /// `[abstract] type name …`
    ObjectType(ObjectTypeDeclaration),
    /// `alias name := expr`
    Alias(AliasDeclaration),
    /// `abstract link name { … }`
    Link(PointerDeclaration),
    /// `abstract property name { … }`
    Property(PointerDeclaration),
    /// `abstract constraint name(…) { … }`
    Constraint(ConstraintDeclaration),
    /// `abstract [inheritable] annotation name`
    Annotation(AnnotationDeclaration),
    /// `function name(…) -> type { … }`
    Function(FunctionDeclaration),
    /// `using extension name [version '…']`
    ExtensionRequirement(ExtensionRequirement),
}

impl SdlDeclaration {
    /// Gets the source span of the declaration.
    pub fn span(&self) -> Span {
        match self {
            Self::Module(n) => n.span.0,
            Self::ScalarType(n) => n.span.0,
            Self::ObjectType(n) => n.span.0,
            Self::Alias(n) => n.span.0,
            Self::Link(n) => n.span.0,
            Self::Property(n) => n.span.0,
            Self::Constraint(n) => n.span.0,
            Self::Annotation(n) => n.span.0,
            Self::Function(n) => n.span.0,
            Self::ExtensionRequirement(n) => n.span.0,
        }
    }
}

/// A nested member of a type, pointer, or similar declaration body.
#[derive(Debug, Clone, PartialEq)]
pub enum SdlMember {
    /// A concrete link or property.
    Pointer(ConcretePointerDeclaration),
    /// A concrete constraint.
    Constraint(ConcreteConstraintDeclaration),
    /// An index definition.
    Index(IndexDeclaration),
    /// An annotation value.
    AnnotationValue(AnnotationValue),
    /// A `field := value` setting (e.g. `default := 0`).
    Field(SdlSetField),
    /// An `on target delete` policy.
    OnTargetDelete(LinkTargetDeleteAction, Hidden<Span>),
    /// An `on source delete` policy.
    OnSourceDelete(LinkSourceDeleteAction, Hidden<Span>),
}

/// A `module name { … }` declaration.
///
/// Nested module blocks are preserved as written; flattening dotted
/// names is the resolver's business.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDeclaration {
    /// The module name (dotted names keep their dots).
    pub name: String,
    /// The declarations inside the block.
    pub declarations: Vec<SdlDeclaration>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// A scalar type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTypeDeclaration {
    /// The type name.
    pub name: ObjectRef,
    /// Whether the type is abstract.
    pub abstract_: bool,
    /// The extended base types.
    pub extending: Vec<TypeExpr>,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// An object type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeDeclaration {
    /// The type name.
    pub name: ObjectRef,
    /// Whether the type is abstract.
    pub abstract_: bool,
    /// The extended base types.
    pub extending: Vec<TypeExpr>,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// An `alias name := expr` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDeclaration {
    /// The alias name.
    pub name: ObjectRef,
    /// The aliased expression.
    pub value: Box<Expr>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// The kind of a pointer declaration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A link.
    Link,
    /// A property.
    Property,
}

/// An abstract link or property declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDeclaration {
    /// Whether this declares a link or a property.
    pub kind: PointerKind,
    /// The pointer name.
    pub name: ObjectRef,
    /// The extended base pointers.
    pub extending: Vec<TypeExpr>,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// A concrete link or property declaration inside a type body.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcretePointerDeclaration {
    /// Whether this declares a link or a property.
    pub kind: PointerKind,
    /// The pointer name.
    pub name: ObjectRef,
    /// The `required`/`optional` qualifier, when written.
    pub required: Option<bool>,
    /// The `single`/`multi` qualifier, when written.
    pub cardinality: Option<SchemaCardinality>,
    /// Whether the declaration is marked `overloaded`.
    pub overloaded: bool,
    /// The extended base pointers.
    pub extending: Vec<TypeExpr>,
    /// The declared target type, for non-computed pointers.
    pub target: Option<TypeExpr>,
    /// The computed expression, for computed pointers.
    pub computed: Option<Box<Expr>>,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// An abstract constraint declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDeclaration {
    /// The constraint name.
    pub name: ObjectRef,
    /// The declared parameters.
    pub params: Vec<FuncParam>,
    /// The `on (expr)` subject clause.
    pub on: Option<Box<Expr>>,
    /// The extended base constraints.
    pub extending: Vec<TypeExpr>,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// A concrete constraint inside a type or pointer body.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteConstraintDeclaration {
    /// The constraint name.
    pub name: ObjectRef,
    /// The constraint arguments.
    pub args: Vec<Expr>,
    /// The `on (expr)` subject clause.
    pub on: Option<Box<Expr>>,
    /// The `except (expr)` clause.
    pub except: Option<Box<Expr>>,
    /// Whether the constraint is delegated.
    pub delegated: bool,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// An abstract annotation declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDeclaration {
    /// The annotation name.
    pub name: ObjectRef,
    /// Whether values of the annotation are inherited.
    pub inheritable: bool,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// An `annotation name := expr` value.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationValue {
    /// The annotation name.
    pub name: ObjectRef,
    /// The annotation value.
    pub value: Box<Expr>,
    /// The source span of the value.
    pub span: Hidden<Span>,
}

/// An `index on (expr)` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDeclaration {
    /// The indexed expression.
    pub expr: Box<Expr>,
    /// The `except (expr)` clause.
    pub except: Option<Box<Expr>>,
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
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
    /// The nested members.
    pub members: Vec<SdlMember>,
    /// The source span of the declaration.
    pub span: Hidden<Span>,
}

/// A `using extension name [version '…']` requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRequirement {
    /// The extension name.
    pub name: ObjectRef,
    /// The requested version string.
    pub version: Option<String>,
    /// The source span of the requirement.
    pub span: Hidden<Span>,
}

/// A `field := value` setting inside a declaration body.
#[derive(Debug, Clone, PartialEq)]
pub struct SdlSetField {
    /// The field name.
    pub name: String,
    /// The field value.
    pub value: Box<Expr>,
    /// The source span of the setting.
    pub span: Hidden<Span>,
}
