//! The grammar definition.
//!
//! Productions are declared against a [`GrammarBuilder`]: each carries
//! its right-hand side, an optional precedence class, and either a
//! reduce function or an inline child index (a pure alias that forwards
//! one child's value). The offline table generator in [`generate`]
//! turns the built [`Grammar`] into LALR(1) ACTION/GOTO tables.
//!
//! The grammar proper is split by region, mirroring the language
//! surface: names and common DDL pieces in [`commondl`], expressions in
//! [`expressions`], statements in [`statements`], DDL in [`ddl`], SDL
//! in [`sdl`], session and configuration commands in [`session`] and
//! [`config`], and the per-dialect start productions in [`start`].

use std::collections::HashMap;

use tql_ast::ddl::DdlBlock;
use tql_ast::ddl::DdlCommand;
use tql_ast::ddl::FuncParam;
use tql_ast::ddl::FunctionCode;
use tql_ast::ddl::InheritPosition;
use tql_ast::expr::AliasDecl;
use tql_ast::expr::Expr;
use tql_ast::expr::GroupingElement;
use tql_ast::expr::ObjectRef;
use tql_ast::expr::PathStep;
use tql_ast::expr::ShapeElement;
use tql_ast::expr::ShapeOperation;
use tql_ast::expr::SortExpr;
use tql_ast::expr::TypeArg;
use tql_ast::expr::TypeExpr;

pub mod commondl;
pub mod config;
pub mod ddl;
pub mod expressions;
pub mod generate;
pub mod sdl;
pub mod session;
pub mod start;
pub mod statements;

use tql_ast::qltypes;
use tql_ast::sdl::Schema;
use tql_ast::sdl::SdlDeclaration;
use tql_ast::sdl::SdlMember;
use tql_ast::span::Span;
use tql_ast::stmt::Command;

use crate::cst::CstTerminal;
use crate::diagnostic::Diagnostic;
use crate::keywords::Keyword;
use crate::token::TokenKind;

/// A grammar symbol: a terminal token kind or a nonterminal by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A terminal.
    Term(TokenKind),
    /// A nonterminal, identified by its name.
    NonTerm(&'static str),
}

/// Shorthand for a terminal symbol.
pub fn t(kind: TokenKind) -> Symbol {
    Symbol::Term(kind)
}

/// Shorthand for a keyword terminal symbol.
pub fn kw(keyword: Keyword) -> Symbol {
    Symbol::Term(TokenKind::Keyword(keyword))
}

/// Shorthand for a nonterminal symbol.
pub fn n(name: &'static str) -> Symbol {
    Symbol::NonTerm(name)
}

/// Operator associativity of a precedence class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Left-associative: reduce on a tie.
    Left,
    /// Right-associative: shift on a tie.
    Right,
    /// Non-associative: a tie is a syntax error.
    NonAssoc,
}

/// The precedence ladder, lowest binding first.
///
/// Classes with no tokens exist for explicit production annotations
/// (unary minus, type casts, and the type-name reduce that must lose
/// to a `<` shift so generic arguments parse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Prec {
    /// Reducing a bare type name; loses to every shift.
    TypeName,
    /// `UNION`, `EXCEPT`
    Union,
    /// `INTERSECT`
    Intersect,
    /// `IF`, `THEN`, `ELSE`
    IfElse,
    /// `OR`
    Or,
    /// `AND`
    And,
    /// `NOT`
    Not,
    /// `=`
    Equals,
    /// `<`, `>`, `!=`, `<=`, `>=`, `?=`, `?!=`
    Compare,
    /// `LIKE`, `ILIKE`
    LikeIlike,
    /// `IN`
    In,
    /// A bare identifier; resolves name-versus-clause shifts.
    Ident,
    /// `IS`
    Is,
    /// `+`, `-`, `++`
    AddOp,
    /// `*`, `/`, `//`, `%`
    MulOp,
    /// `??`
    Coalesce,
    /// `TYPEOF`
    Typeof,
    /// `INTROSPECT`
    Introspect,
    /// `|` in type expressions
    TypeOr,
    /// `&` in type expressions
    TypeAnd,
    /// Unary minus/plus, `EXISTS`, `DISTINCT`
    Unary,
    /// `^`
    Pow,
    /// Type casts.
    TypeCast,
    /// `{`, `}`
    Brace,
    /// `[`, `]`
    Bracket,
    /// `(`, `)`
    Paren,
    /// `.`, `.<`
    Dot,
    /// `DETACHED`
    Detached,
    /// `GLOBAL`
    Global,
    /// `::`
    Namespace,
    /// `@`
    At,
}

impl Prec {
    /// Gets the associativity of the class.
    pub fn assoc(self) -> Assoc {
        match self {
            Prec::TypeName => Assoc::NonAssoc,
            Prec::Union => Assoc::Left,
            Prec::Intersect => Assoc::Left,
            Prec::IfElse => Assoc::Right,
            Prec::Or => Assoc::Left,
            Prec::And => Assoc::Left,
            Prec::Not => Assoc::Right,
            Prec::Equals => Assoc::Right,
            Prec::Compare => Assoc::NonAssoc,
            Prec::LikeIlike => Assoc::NonAssoc,
            Prec::In => Assoc::NonAssoc,
            Prec::Ident => Assoc::NonAssoc,
            Prec::Is => Assoc::NonAssoc,
            Prec::AddOp => Assoc::Left,
            Prec::MulOp => Assoc::Left,
            Prec::Coalesce => Assoc::Right,
            Prec::Typeof => Assoc::NonAssoc,
            Prec::Introspect => Assoc::NonAssoc,
            Prec::TypeOr => Assoc::Left,
            Prec::TypeAnd => Assoc::Left,
            Prec::Unary => Assoc::Right,
            Prec::Pow => Assoc::Right,
            Prec::TypeCast => Assoc::Right,
            Prec::Brace => Assoc::Left,
            Prec::Bracket => Assoc::Left,
            Prec::Paren => Assoc::Left,
            Prec::Dot => Assoc::Left,
            Prec::Detached => Assoc::Right,
            Prec::Global => Assoc::Right,
            Prec::Namespace => Assoc::Left,
            Prec::At => Assoc::Left,
        }
    }

    /// The tokens assigned to each class.
    pub fn token_assignments() -> Vec<(Prec, Vec<TokenKind>)> {
        use Keyword as K;
        use TokenKind as T;
        vec![
            (Prec::Union, vec![T::Keyword(K::Union), T::Keyword(K::Except)]),
            (Prec::Intersect, vec![T::Keyword(K::Intersect)]),
            (
                Prec::IfElse,
                vec![T::Keyword(K::If), T::Keyword(K::Then), T::Keyword(K::Else)],
            ),
            (Prec::Or, vec![T::Keyword(K::Or)]),
            (Prec::And, vec![T::Keyword(K::And)]),
            (Prec::Not, vec![T::Keyword(K::Not)]),
            (Prec::Equals, vec![T::Equals]),
            (
                Prec::Compare,
                vec![
                    T::Less,
                    T::Greater,
                    T::NotEquals,
                    T::LessEquals,
                    T::GreaterEquals,
                    T::NotDistinctFrom,
                    T::DistinctFrom,
                ],
            ),
            (Prec::LikeIlike, vec![T::Keyword(K::Like), T::Keyword(K::Ilike)]),
            (Prec::In, vec![T::Keyword(K::In)]),
            (Prec::Ident, vec![T::Ident]),
            (Prec::Is, vec![T::Keyword(K::Is)]),
            (Prec::AddOp, vec![T::Plus, T::Minus, T::Concat]),
            (Prec::MulOp, vec![T::Star, T::Slash, T::FloorDiv, T::Percent]),
            (Prec::Coalesce, vec![T::Coalesce]),
            (Prec::Typeof, vec![T::Keyword(K::Typeof)]),
            (Prec::Introspect, vec![T::Keyword(K::Introspect)]),
            (Prec::TypeOr, vec![T::Pipe]),
            (Prec::TypeAnd, vec![T::Ampersand]),
            (Prec::Unary, vec![T::Keyword(K::Exists), T::Keyword(K::Distinct)]),
            (Prec::Pow, vec![T::Caret]),
            (Prec::Brace, vec![T::OpenBrace, T::CloseBrace]),
            (Prec::Bracket, vec![T::OpenBracket, T::CloseBracket]),
            (Prec::Paren, vec![T::OpenParen, T::CloseParen]),
            (Prec::Dot, vec![T::Dot, T::BackwardDot]),
            (Prec::Detached, vec![T::Keyword(K::Detached)]),
            (Prec::Global, vec![T::Keyword(K::Global)]),
            (Prec::Namespace, vec![T::Namespace]),
            (Prec::At, vec![T::At]),
        ]
    }
}

/// A semantic value on the lowerer's result stack.
///
/// This is the tagged union of everything a reduction can produce.
/// The accessors panic on a mismatch: the tables and the reduce
/// functions come from the same grammar, so a mismatch is an internal
/// invariant violation, not a user error.
#[derive(Debug, Clone)]
pub enum StackValue {
    /// A consumed terminal.
    Token(CstTerminal),
    /// The value of an empty or clause-less production.
    Empty,
    /// A homogeneous list of values.
    List(Vec<StackValue>),
    /// A boolean flag.
    Bool(bool),
    /// A plain string (identifiers, field names, module paths).
    Str(String),
    /// An expression.
    Expr(Expr),
    /// A top-level command.
    Command(Command),
    /// A DDL command.
    Ddl(DdlCommand),
    /// An object name reference.
    ObjectRef(ObjectRef),
    /// A single path step.
    PathStep(PathStep),
    /// A type expression.
    TypeExpr(TypeExpr),
    /// A type argument.
    TypeArg(TypeArg),
    /// A shape element.
    ShapeElement(ShapeElement),
    /// An `ORDER BY` key.
    SortExpr(SortExpr),
    /// A sort direction.
    SortOrder(qltypes::SortOrder),
    /// An empty-values placement.
    NonesOrder(qltypes::NonesOrder),
    /// A `WITH` block declaration.
    AliasDecl(AliasDecl),
    /// A grouping element.
    GroupingElement(GroupingElement),
    /// A function call argument.
    CallArg(CallArg),
    /// A named tuple element.
    TupleElement(tql_ast::expr::TupleElement),
    /// An expression with an optional result alias.
    AliasedExpr {
        /// The alias, when one was written.
        alias: Option<String>,
        /// The expression.
        expr: Expr,
    },
    /// An `UNLESS CONFLICT` clause.
    OnConflict(tql_ast::expr::OnConflict),
    /// A concrete pointer target.
    PointerTarget(tql_ast::ddl::PointerTarget),
    /// A declared parameter.
    FuncParam(FuncParam),
    /// A parameter kind.
    ParameterKind(qltypes::ParameterKind),
    /// A set-type modifier.
    TypeModifier(qltypes::TypeModifier),
    /// A cast cardinality modifier.
    CastModifier(tql_ast::expr::CastModifier),
    /// A computed-shape assignment operation.
    ShapeOperation(ShapeOperation),
    /// Pointer qualifiers (`required`/`optional`, `single`/`multi`).
    PointerQuals {
        /// The `required`/`optional` qualifier.
        required: Option<bool>,
        /// The `single`/`multi` qualifier.
        cardinality: Option<qltypes::SchemaCardinality>,
    },
    /// `OFFSET`/`LIMIT` clauses.
    OffsetLimit {
        /// The `OFFSET` expression.
        offset: Option<Expr>,
        /// The `LIMIT` expression.
        limit: Option<Expr>,
    },
    /// One transaction mode.
    TransactionMode(TransactionMode),
    /// A `DESCRIBE` output format.
    DescribeFormat {
        /// The output language.
        language: qltypes::DescribeLanguage,
        /// Whether `VERBOSE` was requested.
        verbose: bool,
    },
    /// A function, operator, or cast implementation.
    FunctionCode(FunctionCode),
    /// An inheritance position.
    InheritPosition(InheritPosition),
    /// An SDL declaration.
    SdlDeclaration(SdlDeclaration),
    /// An SDL body member.
    SdlMember(SdlMember),
    /// A schema document.
    Schema(Schema),
    /// A nested command block.
    DdlBlock(DdlBlock),
    /// A link target-delete policy.
    LinkTargetAction(qltypes::LinkTargetDeleteAction),
    /// A link source-delete policy.
    LinkSourceAction(qltypes::LinkSourceDeleteAction),
    /// A configuration scope.
    ConfigScope(qltypes::ConfigScope),
    /// An operator fixity.
    OperatorKind(qltypes::OperatorKind),
}

/// One transaction mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// An isolation level.
    Isolation(qltypes::TransactionIsolationLevel),
    /// An access mode.
    Access(qltypes::TransactionAccessMode),
    /// A deferrability mode.
    Defer(qltypes::TransactionDeferMode),
}

/// A function call argument: positional (with optional aggregate
/// clauses) or named.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// A positional argument.
    Positional {
        /// The argument value.
        arg: Expr,
        /// The aggregate `FILTER` clause.
        filter: Option<Expr>,
        /// The aggregate `ORDER BY` clause.
        sort: Vec<SortExpr>,
    },
    /// A named argument.
    Named(String, Expr),
}

/// The signature of a reduce function.
///
/// Receives the span covering the production (the union of its child
/// spans) and the child values in source order.
pub type ReduceFn = fn(Span, Vec<StackValue>) -> Result<StackValue, Diagnostic>;

/// What a production does when reduced.
#[derive(Clone, Copy)]
pub enum ReduceKind {
    /// Call a reduce function.
    Call(ReduceFn),
    /// Forward the value of the indexed child unchanged.
    Inline(u8),
}

/// A declared production.
pub struct Production {
    /// The left-hand side nonterminal name.
    pub lhs: &'static str,
    /// The right-hand side symbols.
    pub rhs: Vec<Symbol>,
    /// The derived method name (`reduce_<symbols>`).
    pub method: String,
    /// The reduce behavior.
    pub reduce: ReduceKind,
    /// The explicit precedence class, when one was declared.
    pub prec: Option<Prec>,
}

/// The assembled grammar.
pub struct Grammar {
    /// All productions, in declaration order (the production id is the
    /// index).
    pub productions: Vec<Production>,
    /// The start nonterminal name.
    pub start: &'static str,
    /// Token precedence assignments.
    pub token_prec: HashMap<TokenKind, Prec>,
}

impl Grammar {
    /// Finds a production's reduce behavior by its qualified name.
    pub fn reduce_by_name(&self, lhs: &str, method: &str) -> Option<ReduceKind> {
        self.productions
            .iter()
            .find(|p| p.lhs == lhs && p.method == method)
            .map(|p| p.reduce)
    }
}

/// Builds a [`Grammar`] from production declarations.
#[derive(Default)]
pub struct GrammarBuilder {
    productions: Vec<Production>,
}

impl GrammarBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a production with a reduce function.
    pub fn rule(&mut self, lhs: &'static str, rhs: &[Symbol], reduce: ReduceFn) {
        self.push(lhs, rhs, ReduceKind::Call(reduce), None);
    }

    /// Declares a production with a reduce function and an explicit
    /// precedence class.
    pub fn rule_prec(
        &mut self,
        lhs: &'static str,
        rhs: &[Symbol],
        prec: Prec,
        reduce: ReduceFn,
    ) {
        self.push(lhs, rhs, ReduceKind::Call(reduce), Some(prec));
    }

    /// Declares an inline production forwarding the indexed child.
    pub fn inline(&mut self, lhs: &'static str, rhs: &[Symbol], child: u8) {
        self.push(lhs, rhs, ReduceKind::Inline(child), None);
    }

    /// Declares an inline production with an explicit precedence class.
    pub fn inline_prec(&mut self, lhs: &'static str, rhs: &[Symbol], child: u8, prec: Prec) {
        self.push(lhs, rhs, ReduceKind::Inline(child), Some(prec));
    }

    /// Declares a list nonterminal: `name → element` and
    /// `name → name [separator] element`, accumulating a
    /// [`StackValue::List`].
    pub fn list(&mut self, lhs: &'static str, element: Symbol, separator: Option<Symbol>) {
        self.rule(lhs, &[element], |_, mut args| {
            Ok(StackValue::List(vec![args.remove(0)]))
        });
        let mut rhs = vec![Symbol::NonTerm(lhs)];
        if let Some(separator) = separator {
            rhs.push(separator);
        }
        rhs.push(element);
        let reduce: ReduceFn = |_, mut args| {
            let element = args.pop().expect("list production has children");
            let mut list = args.remove(0).into_list();
            list.push(element);
            Ok(StackValue::List(list))
        };
        self.rule(lhs, &rhs, reduce);
    }

    fn push(
        &mut self,
        lhs: &'static str,
        rhs: &[Symbol],
        reduce: ReduceKind,
        prec: Option<Prec>,
    ) {
        let method = method_name(rhs);
        debug_assert!(
            !self
                .productions
                .iter()
                .any(|p| p.lhs == lhs && p.method == method),
            "duplicate production {lhs}.{method}"
        );
        self.productions.push(Production {
            lhs,
            rhs: rhs.to_vec(),
            method,
            reduce,
            prec,
        });
    }

    /// Finishes the build with the given start nonterminal.
    pub fn finish(self, start: &'static str) -> Grammar {
        let mut token_prec = HashMap::new();
        for (prec, tokens) in Prec::token_assignments() {
            for token in tokens {
                let previous = token_prec.insert(token, prec);
                assert!(
                    previous.is_none(),
                    "token {token:?} assigned two precedence classes"
                );
            }
        }
        Grammar {
            productions: self.productions,
            start,
            token_prec,
        }
    }
}

/// Derives the production method name from its right-hand side.
fn method_name(rhs: &[Symbol]) -> String {
    if rhs.is_empty() {
        return "reduce_empty".to_string();
    }
    let mut name = String::from("reduce");
    for symbol in rhs {
        name.push('_');
        match symbol {
            Symbol::Term(kind) => name.push_str(&kind.terminal_name()),
            Symbol::NonTerm(nt) => name.push_str(nt),
        }
    }
    name
}

/// Builds the complete grammar.
pub fn full_grammar() -> Grammar {
    let mut g = GrammarBuilder::new();
    commondl::register(&mut g);
    expressions::register(&mut g);
    statements::register(&mut g);
    session::register(&mut g);
    config::register(&mut g);
    ddl::register(&mut g);
    sdl::register(&mut g);
    start::register(&mut g);
    g.finish("Grammar")
}

impl StackValue {
    /// Takes the value as an expression.
    pub fn into_expr(self) -> Expr {
        match self {
            StackValue::Expr(e) => e,
            other => mismatch("expression", &other),
        }
    }

    /// Takes the value as an optional expression.
    pub fn into_opt_expr(self) -> Option<Expr> {
        match self {
            StackValue::Empty => None,
            StackValue::Expr(e) => Some(e),
            other => mismatch("optional expression", &other),
        }
    }

    /// Takes the value as a terminal token.
    pub fn into_token(self) -> CstTerminal {
        match self {
            StackValue::Token(t) => t,
            other => mismatch("token", &other),
        }
    }

    /// Takes the value as a string.
    pub fn into_str(self) -> String {
        match self {
            StackValue::Str(s) => s,
            other => mismatch("string", &other),
        }
    }

    /// Takes the value as an optional string.
    pub fn into_opt_str(self) -> Option<String> {
        match self {
            StackValue::Empty => None,
            StackValue::Str(s) => Some(s),
            other => mismatch("optional string", &other),
        }
    }

    /// Takes the value as a raw list.
    pub fn into_list(self) -> Vec<StackValue> {
        match self {
            StackValue::List(items) => items,
            StackValue::Empty => Vec::new(),
            other => mismatch("list", &other),
        }
    }

    /// Takes the value as a list of expressions.
    pub fn into_exprs(self) -> Vec<Expr> {
        self.into_list().into_iter().map(StackValue::into_expr).collect()
    }

    /// Takes the value as an object reference.
    pub fn into_object_ref(self) -> ObjectRef {
        match self {
            StackValue::ObjectRef(r) => r,
            other => mismatch("object reference", &other),
        }
    }

    /// Takes the value as a type expression.
    pub fn into_type_expr(self) -> TypeExpr {
        match self {
            StackValue::TypeExpr(t) => t,
            other => mismatch("type expression", &other),
        }
    }

    /// Takes the value as an optional type expression.
    pub fn into_opt_type_expr(self) -> Option<TypeExpr> {
        match self {
            StackValue::Empty => None,
            StackValue::TypeExpr(t) => Some(t),
            other => mismatch("optional type expression", &other),
        }
    }

    /// Takes the value as a list of type expressions.
    pub fn into_type_exprs(self) -> Vec<TypeExpr> {
        self.into_list()
            .into_iter()
            .map(StackValue::into_type_expr)
            .collect()
    }

    /// Takes the value as a top-level command.
    pub fn into_command(self) -> Command {
        match self {
            StackValue::Command(c) => c,
            StackValue::Ddl(d) => Command::Ddl(d),
            StackValue::Expr(e) => Command::Expr(e),
            other => mismatch("command", &other),
        }
    }

    /// Takes the value as a DDL command.
    pub fn into_ddl(self) -> DdlCommand {
        match self {
            StackValue::Ddl(d) => d,
            other => mismatch("ddl command", &other),
        }
    }

    /// Takes the value as a list of DDL commands.
    pub fn into_ddl_list(self) -> Vec<DdlCommand> {
        self.into_list().into_iter().map(StackValue::into_ddl).collect()
    }

    /// Takes the value as a list of shape elements.
    pub fn into_shape(self) -> Vec<ShapeElement> {
        self.into_list()
            .into_iter()
            .map(|v| match v {
                StackValue::ShapeElement(e) => e,
                other => mismatch("shape element", &other),
            })
            .collect()
    }

    /// Takes the value as a list of sort keys.
    pub fn into_sort_exprs(self) -> Vec<SortExpr> {
        self.into_list()
            .into_iter()
            .map(|v| match v {
                StackValue::SortExpr(e) => e,
                other => mismatch("sort key", &other),
            })
            .collect()
    }

    /// Takes the value as a list of alias declarations.
    pub fn into_alias_decls(self) -> Vec<AliasDecl> {
        self.into_list()
            .into_iter()
            .map(|v| match v {
                StackValue::AliasDecl(a) => a,
                other => mismatch("alias declaration", &other),
            })
            .collect()
    }

    /// Takes the value as a list of declared parameters.
    pub fn into_func_params(self) -> Vec<FuncParam> {
        self.into_list()
            .into_iter()
            .map(|v| match v {
                StackValue::FuncParam(p) => p,
                other => mismatch("parameter", &other),
            })
            .collect()
    }

    /// Takes the value as a list of SDL members.
    pub fn into_sdl_members(self) -> Vec<SdlMember> {
        self.into_list()
            .into_iter()
            .map(|v| match v {
                StackValue::SdlMember(m) => m,
                other => mismatch("sdl member", &other),
            })
            .collect()
    }

    /// Takes the value as a list of SDL declarations.
    pub fn into_sdl_declarations(self) -> Vec<SdlDeclaration> {
        self.into_list()
            .into_iter()
            .map(|v| match v {
                StackValue::SdlDeclaration(d) => d,
                other => mismatch("sdl declaration", &other),
            })
            .collect()
    }

    /// Takes the value as a nested command block.
    pub fn into_ddl_block(self, span: Span) -> DdlBlock {
        match self {
            StackValue::DdlBlock(b) => b,
            StackValue::Empty => DdlBlock {
                commands: Vec::new(),
                span: span.into(),
            },
            other => mismatch("command block", &other),
        }
    }
}

#[track_caller]
fn mismatch(expected: &str, found: &StackValue) -> ! {
    panic!("parser stack value mismatch: expected {expected}, found {found:?}")
}
