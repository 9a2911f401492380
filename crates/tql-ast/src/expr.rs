//! Expression nodes.

use crate::qltypes::Cardinality;
use crate::qltypes::NonesOrder;
use crate::qltypes::SortOrder;
use crate::span::Hidden;
use crate::span::Span;

/// An expression.
///
/// Queries are expressions: any statement form that produces a value can
/// appear wherever an expression is expected (parenthesized when needed).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A path expression (including a bare object name).
    Path(Path),
    /// A reference to a global variable.
    Global(GlobalExpr),
    /// A scalar constant.
    Constant(Constant),
    /// A bytes constant.
    BytesConstant(BytesConstant),
    /// A reference to a query parameter.
    Parameter(Parameter),
    /// A type cast applied to an expression.
    TypeCast(TypeCast),
    /// An `INTROSPECT` expression.
    Introspect(Introspect),
    /// A prefix operator application.
    UnaryOp(UnaryOp),
    /// A binary operator application.
    BinOp(BinOp),
    /// An `IS` / `IS NOT` type check.
    IsOp(IsOp),
    /// A conditional expression.
    IfElse(IfElse),
    /// An indexing or slicing operation.
    Indirection(Indirection),
    /// A tuple literal.
    Tuple(Tuple),
    /// A named tuple literal.
    NamedTuple(NamedTuple),
    /// An array literal.
    Array(Array),
    /// A set literal.
    Set(SetLiteral),
    /// A shape applied to an expression, or a free shape.
    Shape(Shape),
    /// A splat element inside a shape.
    Splat(Splat),
    /// A function call.
    FuncCall(FuncCall),
    /// A `DETACHED` expression.
    Detached(DetachedExpr),
    /// A `SELECT` query.
    Select(SelectQuery),
    /// A `FOR` query.
    For(ForQuery),
    /// A `GROUP` query.
    Group(GroupQuery),
    /// An `INSERT` query.
    Insert(InsertQuery),
    /// An `UPDATE` query.
    Update(UpdateQuery),
    /// A `DELETE` query.
    Delete(DeleteQuery),
}

impl Expr {
    /// Gets the source span of the expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Path(n) => n.span.0,
            Self::Global(n) => n.span.0,
            Self::Constant(n) => n.span.0,
            Self::BytesConstant(n) => n.span.0,
            Self::Parameter(n) => n.span.0,
            Self::TypeCast(n) => n.span.0,
            Self::Introspect(n) => n.span.0,
            Self::UnaryOp(n) => n.span.0,
            Self::BinOp(n) => n.span.0,
            Self::IsOp(n) => n.span.0,
            Self::IfElse(n) => n.span.0,
            Self::Indirection(n) => n.span.0,
            Self::Tuple(n) => n.span.0,
            Self::NamedTuple(n) => n.span.0,
            Self::Array(n) => n.span.0,
            Self::Set(n) => n.span.0,
            Self::Shape(n) => n.span.0,
            Self::Splat(n) => n.span.0,
            Self::FuncCall(n) => n.span.0,
            Self::Detached(n) => n.span.0,
            Self::Select(n) => n.span.0,
            Self::For(n) => n.span.0,
            Self::Group(n) => n.span.0,
            Self::Insert(n) => n.span.0,
            Self::Update(n) => n.span.0,
            Self::Delete(n) => n.span.0,
        }
    }

    /// Determines if this expression is a query statement.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::Select(_)
                | Self::For(_)
                | Self::Group(_)
                | Self::Insert(_)
                | Self::Update(_)
                | Self::Delete(_)
        )
    }
}

/// A reference to a named schema object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    /// The module part of the name, when qualified.
    pub module: Option<String>,
    /// The local name.
    pub name: String,
    /// The source span of the reference.
    pub span: Hidden<Span>,
}

impl ObjectRef {
    /// Creates an unqualified reference.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            module: None,
            name: name.into(),
            span: span.into(),
        }
    }
}

/// The direction of a pointer traversal step.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointerDirection {
    /// Forward traversal (`.name`).
    #[default]
    Forward,
    /// Backward traversal (`.<name`).
    Backward,
}

/// A single pointer traversal step of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Ptr {
    /// The pointer name.
    pub name: String,
    /// The traversal direction.
    pub direction: PointerDirection,
    /// Whether this step addresses a link property (`@name`).
    pub is_property: bool,
    /// The source span of the step.
    pub span: Hidden<Span>,
}

/// A tuple element access step (`.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct TupleIndex {
    /// The element index digits exactly as written.
    pub index: String,
    /// The source span of the step.
    pub span: Hidden<Span>,
}

/// A type intersection step (`[IS Type]`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeIntersection {
    /// The intersected type.
    pub ty: TypeExpr,
    /// The source span of the step.
    pub span: Hidden<Span>,
}

/// The implicit anchors a path may start from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `__source__`
    Source,
    /// `__subject__`
    Subject,
    /// `__old__`
    Old,
    /// `__new__`
    New,
    /// `__specified__`
    Specified,
    /// `__default__`
    Default,
}

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    /// A leading object name.
    ObjectRef(ObjectRef),
    /// A leading implicit anchor.
    Anchor(Anchor, Hidden<Span>),
    /// An arbitrary expression as the path source (`(select x).name`).
    Expr(Box<Expr>),
    /// A pointer traversal.
    Ptr(Ptr),
    /// A tuple element access.
    TupleIndex(TupleIndex),
    /// A type intersection.
    TypeIntersection(TypeIntersection),
}

/// A path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// The ordered steps of the path.
    pub steps: Vec<PathStep>,
    /// Whether the path is partial (starts with `.` and no source).
    pub partial: bool,
    /// The source span of the path.
    pub span: Hidden<Span>,
}

/// A reference to a global variable (`GLOBAL name`).
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalExpr {
    /// The name of the global.
    pub name: ObjectRef,
    /// The source span of the expression.
    pub span: Hidden<Span>,
}

/// The kind and decoded payload of a scalar constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantKind {
    /// A 64-bit integer constant.
    Integer,
    /// An arbitrary-precision integer constant.
    BigInt,
    /// A 64-bit float constant.
    Float,
    /// An arbitrary-precision decimal constant.
    Decimal,
    /// A boolean constant.
    Boolean,
    /// A string constant together with the quote marker it was written
    /// with (`'`, `"`, `r'`, `r"`, or a dollar quote such as `$$`).
    String {
        /// The quote marker.
        quote: String,
    },
}

/// A scalar constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// The kind of the constant.
    pub kind: ConstantKind,
    /// The decoded value rendered as text.
    pub value: String,
    /// The source span of the constant.
    pub span: Hidden<Span>,
}

impl Constant {
    /// Creates a string constant with a plain single-quote marker.
    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ConstantKind::String { quote: "'".into() },
            value: value.into(),
            span: span.into(),
        }
    }

    /// Creates an integer constant.
    pub fn integer(value: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ConstantKind::Integer,
            value: value.into(),
            span: span.into(),
        }
    }

    /// Determines if this is a numeric constant with a leading minus sign
    /// folded into its value.
    pub fn is_negative(&self) -> bool {
        matches!(
            self.kind,
            ConstantKind::Integer
                | ConstantKind::BigInt
                | ConstantKind::Float
                | ConstantKind::Decimal
        ) && self.value.starts_with('-')
    }
}

/// A bytes constant.
#[derive(Debug, Clone, PartialEq)]
pub struct BytesConstant {
    /// The decoded bytes.
    pub value: Vec<u8>,
    /// The source span of the constant.
    pub span: Hidden<Span>,
}

/// A reference to a query parameter (`$name` or `$0`).
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name without the `$` sigil.
    pub name: String,
    /// The source span of the reference.
    pub span: Hidden<Span>,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A (possibly generic) type name.
    Name(TypeName),
    /// A union or intersection of types.
    Op(TypeOp),
    /// The type of an expression (`TYPEOF expr`).
    Typeof(TypeOfExpr),
}

impl TypeExpr {
    /// Gets the source span of the type expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Name(n) => n.span.0,
            Self::Op(n) => n.span.0,
            Self::Typeof(n) => n.span.0,
        }
    }
}

/// A type argument, optionally labeled (`tuple<x: int64>`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeArg {
    /// The element label, for named subtypes.
    pub label: Option<String>,
    /// The argument type.
    pub ty: TypeExpr,
    /// The source span of the argument.
    pub span: Hidden<Span>,
}

/// A type name with optional generic arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    /// The name of the type.
    pub name: ObjectRef,
    /// The generic arguments, empty for plain names.
    pub subtypes: Vec<TypeArg>,
    /// The source span of the name.
    pub span: Hidden<Span>,
}

/// The operator of a type operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TypeOpKind {
    /// A type union (`A | B`).
    Union,
    /// A type intersection (`A & B`).
    Intersection,
}

/// A binary type operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeOp {
    /// The left operand.
    pub left: Box<TypeExpr>,
    /// The operator.
    pub op: TypeOpKind,
    /// The right operand.
    pub right: Box<TypeExpr>,
    /// The source span of the operation.
    pub span: Hidden<Span>,
}

/// A `TYPEOF expr` type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeOfExpr {
    /// The expression whose type is taken.
    pub expr: Box<Expr>,
    /// The source span of the expression.
    pub span: Hidden<Span>,
}

/// The cardinality modifier of a cast target (`<OPTIONAL T>`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastModifier {
    /// `OPTIONAL`
    Optional,
    /// `REQUIRED`
    Required,
}

/// A type cast.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCast {
    /// The target type.
    pub ty: TypeExpr,
    /// The expression being cast.
    pub expr: Box<Expr>,
    /// The cardinality modifier, if one was written.
    pub modifier: Option<CastModifier>,
    /// The source span of the cast.
    pub span: Hidden<Span>,
}

/// An `INTROSPECT TypeExpr` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Introspect {
    /// The introspected type.
    pub ty: TypeExpr,
    /// The source span of the expression.
    pub span: Hidden<Span>,
}

/// A prefix operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    /// The operator text (`-`, `+`, `NOT`, `EXISTS`, `DISTINCT`).
    pub op: String,
    /// The operand.
    pub operand: Box<Expr>,
    /// The source span of the application.
    pub span: Hidden<Span>,
}

/// A binary operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    /// The left operand.
    pub left: Box<Expr>,
    /// The operator text (`+`, `=`, `UNION`, `NOT IN`, …).
    pub op: String,
    /// The right operand.
    pub right: Box<Expr>,
    /// The source span of the application.
    pub span: Hidden<Span>,
}

/// An `IS` / `IS NOT` type check.
#[derive(Debug, Clone, PartialEq)]
pub struct IsOp {
    /// The checked expression.
    pub expr: Box<Expr>,
    /// Whether the check is negated (`IS NOT`).
    pub negated: bool,
    /// The type operand.
    pub ty: TypeExpr,
    /// The source span of the check.
    pub span: Hidden<Span>,
}

/// A conditional expression, in either the postfix form
/// `a IF cond ELSE b` or the prefix form `IF cond THEN a ELSE b`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfElse {
    /// The condition.
    pub condition: Box<Expr>,
    /// The value when the condition holds.
    pub if_expr: Box<Expr>,
    /// The value when the condition does not hold.
    pub else_expr: Box<Expr>,
    /// The source span of the expression.
    pub span: Hidden<Span>,
}

/// One indexing or slicing application.
#[derive(Debug, Clone, PartialEq)]
pub enum IndirectionOp {
    /// A single-element index (`[i]`).
    Index(Box<Expr>),
    /// A slice (`[i:j]`, `[i:]`, `[:j]`).
    Slice {
        /// The start of the slice, when present.
        start: Option<Box<Expr>>,
        /// The end of the slice, when present.
        stop: Option<Box<Expr>>,
    },
}

/// An indexing or slicing expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Indirection {
    /// The subject expression.
    pub expr: Box<Expr>,
    /// The applied operation.
    pub op: IndirectionOp,
    /// The source span of the expression.
    pub span: Hidden<Span>,
}

/// A tuple literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    /// The tuple elements.
    pub elements: Vec<Expr>,
    /// The source span of the literal.
    pub span: Hidden<Span>,
}

/// One element of a named tuple literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    /// The element name.
    pub name: String,
    /// The element value.
    pub val: Expr,
    /// The source span of the element.
    pub span: Hidden<Span>,
}

/// A named tuple literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTuple {
    /// The tuple elements.
    pub elements: Vec<TupleElement>,
    /// The source span of the literal.
    pub span: Hidden<Span>,
}

/// An array literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    /// The array elements.
    pub elements: Vec<Expr>,
    /// The source span of the literal.
    pub span: Hidden<Span>,
}

/// A set literal.
#[derive(Debug, Clone, PartialEq)]
pub struct SetLiteral {
    /// The set elements.
    pub elements: Vec<Expr>,
    /// The source span of the literal.
    pub span: Hidden<Span>,
}

/// The operation of a computed shape element.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeOperation {
    /// `:=`
    #[default]
    Assign,
    /// `+=`
    Append,
    /// `-=`
    Subtract,
}

/// One element of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeElement {
    /// The pointer path of the element (or a splat expression).
    pub expr: Expr,
    /// The nested shape, when one is attached.
    pub elements: Vec<ShapeElement>,
    /// The computed value, for computed elements.
    pub compexpr: Option<Box<Expr>>,
    /// The assignment operation of a computed element.
    pub operation: ShapeOperation,
    /// The `required`/`optional` qualifier, when written.
    pub required: Option<bool>,
    /// The `single`/`multi` qualifier, when written.
    pub cardinality: Option<Cardinality>,
    /// The per-element `FILTER` clause.
    pub filter: Option<Box<Expr>>,
    /// The per-element `ORDER BY` clause.
    pub order_by: Vec<SortExpr>,
    /// The per-element `OFFSET` clause.
    pub offset: Option<Box<Expr>>,
    /// The per-element `LIMIT` clause.
    pub limit: Option<Box<Expr>>,
    /// The source span of the element.
    pub span: Hidden<Span>,
}

impl ShapeElement {
    /// Creates a plain (non-computed) element over the given pointer path.
    pub fn plain(expr: Expr, span: Span) -> Self {
        Self {
            expr,
            elements: Vec::new(),
            compexpr: None,
            operation: ShapeOperation::Assign,
            required: None,
            cardinality: None,
            filter: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            span: span.into(),
        }
    }
}

/// A shape expression: `expr { elements }`, or a free shape when the
/// subject is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// The shaped expression; `None` for free shapes.
    pub expr: Option<Box<Expr>>,
    /// The shape elements.
    pub elements: Vec<ShapeElement>,
    /// The source span of the shape.
    pub span: Hidden<Span>,
}

/// A splat shape element (`*` or `**`), optionally scoped to a type.
#[derive(Debug, Clone, PartialEq)]
pub struct Splat {
    /// The splat depth: 1 for `*`, 2 for `**`.
    pub depth: u8,
    /// The type the splat is scoped to, when written (`Type.*`).
    pub ty: Option<TypeExpr>,
    /// The source span of the splat.
    pub span: Hidden<Span>,
}

/// One argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncArg {
    /// The argument value.
    pub arg: Expr,
    /// An aggregate `FILTER` clause attached to the argument.
    pub filter: Option<Box<Expr>>,
    /// An aggregate `ORDER BY` clause attached to the argument.
    pub sort: Vec<SortExpr>,
    /// The source span of the argument.
    pub span: Hidden<Span>,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    /// The name of the called function.
    pub func: ObjectRef,
    /// The positional arguments.
    pub args: Vec<FuncArg>,
    /// The named arguments, in source order.
    pub kwargs: Vec<(String, Expr)>,
    /// The source span of the call.
    pub span: Hidden<Span>,
}

/// A `DETACHED` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedExpr {
    /// The detached expression.
    pub expr: Box<Expr>,
    /// The source span of the expression.
    pub span: Hidden<Span>,
}

/// One key of an `ORDER BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SortExpr {
    /// The key expression.
    pub path: Box<Expr>,
    /// The sort direction, when written.
    pub direction: Option<SortOrder>,
    /// The placement of empty values, when written.
    pub nones_order: Option<NonesOrder>,
    /// The source span of the key.
    pub span: Hidden<Span>,
}

/// A `WITH` block alias declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasDecl {
    /// `WITH MODULE name` or `WITH alias AS MODULE name`.
    Module {
        /// The alias name; `None` sets the default module.
        alias: Option<String>,
        /// The aliased module name.
        module: String,
        /// The source span of the declaration.
        span: Hidden<Span>,
    },
    /// `WITH name := expr`.
    Expr {
        /// The alias name.
        alias: String,
        /// The aliased expression.
        expr: Box<Expr>,
        /// The source span of the declaration.
        span: Hidden<Span>,
    },
}

/// A `SELECT` query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    /// The `WITH` block aliases.
    pub aliases: Vec<AliasDecl>,
    /// The alias given to the result, for `SELECT x := expr`.
    pub result_alias: Option<String>,
    /// The result expression.
    pub result: Box<Expr>,
    /// The `FILTER` clause.
    pub filter: Option<Box<Expr>>,
    /// The `ORDER BY` clause.
    pub order_by: Vec<SortExpr>,
    /// The `OFFSET` clause.
    pub offset: Option<Box<Expr>>,
    /// The `LIMIT` clause.
    pub limit: Option<Box<Expr>>,
    /// Whether the query was implied rather than written (an expression
    /// used where a statement was expected).
    pub implicit: bool,
    /// The source span of the query.
    pub span: Hidden<Span>,
}

impl SelectQuery {
    /// Wraps an expression in an implicit `SELECT`.
    pub fn implicit(result: Expr) -> Self {
        let span = result.span();
        Self {
            aliases: Vec::new(),
            result_alias: None,
            result: Box::new(result),
            filter: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            implicit: true,
            span: span.into(),
        }
    }
}

/// A `FOR` query.
#[derive(Debug, Clone, PartialEq)]
pub struct ForQuery {
    /// The `WITH` block aliases.
    pub aliases: Vec<AliasDecl>,
    /// Whether the iterator binding is `OPTIONAL`.
    pub optional: bool,
    /// The name bound to each iteration.
    pub iterator_alias: String,
    /// The iterated expression.
    pub iterator: Box<Expr>,
    /// The body of the query.
    pub result: Box<Expr>,
    /// The source span of the query.
    pub span: Hidden<Span>,
}

/// One grouping element of a `GROUP … BY` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupingElement {
    /// A simple reference (a path or alias name).
    Simple(Box<Expr>),
    /// A parenthesized list treated as one compound key.
    Tuple(Vec<GroupingElement>, Hidden<Span>),
    /// A set of alternative grouping elements (`{…}`).
    Sets(Vec<GroupingElement>, Hidden<Span>),
    /// A `CUBE (…)` grouping set.
    Cube(Vec<GroupingElement>, Hidden<Span>),
    /// A `ROLLUP (…)` grouping set.
    Rollup(Vec<GroupingElement>, Hidden<Span>),
    /// The empty grouping set `()`.
    Empty(Hidden<Span>),
}

/// A `GROUP` query.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupQuery {
    /// The `WITH` block aliases.
    pub aliases: Vec<AliasDecl>,
    /// The alias given to the subject, for `GROUP x := expr`.
    pub subject_alias: Option<String>,
    /// The grouped subject.
    pub subject: Box<Expr>,
    /// The `USING` alias declarations.
    pub using: Vec<AliasDecl>,
    /// The `BY` grouping elements.
    pub by: Vec<GroupingElement>,
    /// The binding name of the legacy `INTO name` clause.
    pub into: Option<String>,
    /// The result of the legacy `INTO name UNION expr` tail.
    pub result: Option<Box<Expr>>,
    /// The source span of the query.
    pub span: Hidden<Span>,
}

/// The `UNLESS CONFLICT` clause of an `INSERT`.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// The conflicting-property expression, when written.
    pub on: Option<Box<Expr>>,
    /// The alternative branch, when written.
    pub else_expr: Option<Box<Expr>>,
    /// The source span of the clause.
    pub span: Hidden<Span>,
}

/// An `INSERT` query.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    /// The `WITH` block aliases.
    pub aliases: Vec<AliasDecl>,
    /// The inserted object type.
    pub subject: ObjectRef,
    /// The inserted shape elements.
    pub shape: Vec<ShapeElement>,
    /// The `UNLESS CONFLICT` clause.
    pub unless_conflict: Option<OnConflict>,
    /// The source span of the query.
    pub span: Hidden<Span>,
}

/// An `UPDATE` query.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    /// The `WITH` block aliases.
    pub aliases: Vec<AliasDecl>,
    /// The updated subject.
    pub subject: Box<Expr>,
    /// The `FILTER` clause.
    pub filter: Option<Box<Expr>>,
    /// The `SET` shape.
    pub shape: Vec<ShapeElement>,
    /// The source span of the query.
    pub span: Hidden<Span>,
}

/// A `DELETE` query.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    /// The `WITH` block aliases.
    pub aliases: Vec<AliasDecl>,
    /// The deleted subject.
    pub subject: Box<Expr>,
    /// The `FILTER` clause.
    pub filter: Option<Box<Expr>>,
    /// The `ORDER BY` clause.
    pub order_by: Vec<SortExpr>,
    /// The `OFFSET` clause.
    pub offset: Option<Box<Expr>>,
    /// The `LIMIT` clause.
    pub limit: Option<Box<Expr>>,
    /// The source span of the query.
    pub span: Hidden<Span>,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn equality_ignores_spans() {
        let a = Expr::Constant(Constant::integer("1", Span::new(0, 1)));
        let b = Expr::Constant(Constant::integer("1", Span::new(40, 1)));
        assert_eq!(a, b);
    }

    #[test]
    fn negative_constants_are_detected() {
        let c = Constant {
            kind: ConstantKind::Float,
            value: "-1.5".into(),
            span: Span::default().into(),
        };
        assert!(c.is_negative());
        assert!(!Constant::string("-x", Span::default()).is_negative());
    }
}
