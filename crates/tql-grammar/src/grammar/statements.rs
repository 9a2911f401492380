//! Statement productions: queries, transaction control, `DESCRIBE`,
//! `ANALYZE`, and `ADMINISTER`.

use tql_ast::expr::AliasDecl;
use tql_ast::expr::DeleteQuery;
use tql_ast::expr::Expr;
use tql_ast::expr::ForQuery;
use tql_ast::expr::GroupQuery;
use tql_ast::expr::GroupingElement;
use tql_ast::expr::InsertQuery;
use tql_ast::expr::NamedTuple;
use tql_ast::expr::ObjectRef;
use tql_ast::expr::OnConflict;
use tql_ast::expr::Path;
use tql_ast::expr::PathStep;
use tql_ast::expr::PointerDirection;
use tql_ast::expr::Ptr;
use tql_ast::expr::SelectQuery;
use tql_ast::expr::ShapeElement;
use tql_ast::expr::UpdateQuery;
use tql_ast::qltypes::DescribeGlobal;
use tql_ast::qltypes::DescribeLanguage;
use tql_ast::qltypes::TransactionAccessMode;
use tql_ast::qltypes::TransactionDeferMode;
use tql_ast::qltypes::TransactionIsolationLevel;
use tql_ast::span::Span;
use tql_ast::stmt::AdministerStmt;
use tql_ast::stmt::AnalyzeStmt;
use tql_ast::stmt::Command;
use tql_ast::stmt::CommitTransaction;
use tql_ast::stmt::DeclareSavepoint;
use tql_ast::stmt::DescribeStmt;
use tql_ast::stmt::DescribeTarget;
use tql_ast::stmt::ReleaseSavepoint;
use tql_ast::stmt::RollbackToSavepoint;
use tql_ast::stmt::RollbackTransaction;
use tql_ast::stmt::StartTransaction;

use super::kw;
use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use super::TransactionMode;
use crate::diagnostic::Diagnostic;
use crate::keywords::Keyword as K;
use crate::token::TokenKind as T;

/// Attaches a `WITH` block's aliases to a query expression.
fn with_aliases(expr: Expr, aliases: Vec<AliasDecl>) -> Expr {
    match expr {
        Expr::Select(mut q) => {
            q.aliases = aliases;
            Expr::Select(q)
        }
        Expr::For(mut q) => {
            q.aliases = aliases;
            Expr::For(q)
        }
        Expr::Group(mut q) => {
            q.aliases = aliases;
            Expr::Group(q)
        }
        Expr::Insert(mut q) => {
            q.aliases = aliases;
            Expr::Insert(q)
        }
        Expr::Update(mut q) => {
            q.aliases = aliases;
            Expr::Update(q)
        }
        Expr::Delete(mut q) => {
            q.aliases = aliases;
            Expr::Delete(q)
        }
        other => other,
    }
}

/// Splits an `INSERT` subject into its type reference and shape.
fn insert_subject(
    expr: Expr,
    span: Span,
) -> Result<(ObjectRef, Vec<ShapeElement>), Diagnostic> {
    let bad = || {
        Diagnostic::error("insert expression must be an object type reference", span)
    };
    match expr {
        Expr::Path(path) => match &path.steps[..] {
            [PathStep::ObjectRef(name)] => Ok((name.clone(), Vec::new())),
            _ => Err(bad()),
        },
        Expr::Shape(shape) => {
            let subject = shape.expr.ok_or_else(bad)?;
            match *subject {
                Expr::Path(path) => match &path.steps[..] {
                    [PathStep::ObjectRef(name)] => Ok((name.clone(), shape.elements)),
                    _ => Err(bad()),
                },
                _ => Err(bad()),
            }
        }
        _ => Err(bad()),
    }
}

/// Registers the statement productions.
pub fn register(g: &mut GrammarBuilder) {
    stmt(g);
    with_block(g);
    select(g);
    for_group(g);
    dml(g);
    transactions(g);
    describe(g);
    analyze(g);
}

fn stmt(g: &mut GrammarBuilder) {
    g.inline("Stmt", &[n("TransactionStmt")], 0);
    g.inline("Stmt", &[n("DescribeStmt")], 0);
    g.inline("Stmt", &[n("AnalyzeStmt")], 0);
    g.inline("Stmt", &[n("AdministerStmt")], 0);
    g.rule("Stmt", &[n("ExprStmt")], |_, mut args| {
        Ok(StackValue::Command(Command::Expr(args.remove(0).into_expr())))
    });

    g.inline("ExprStmt", &[n("SimpleExprStmt")], 0);
    g.rule(
        "ExprStmt",
        &[n("WithBlock"), n("SimpleExprStmt")],
        |_, mut args| {
            let expr = args.remove(1).into_expr();
            let aliases = args.remove(0).into_alias_decls();
            Ok(StackValue::Expr(with_aliases(expr, aliases)))
        },
    );

    g.inline("SimpleExprStmt", &[n("SimpleSelect")], 0);
    g.inline("SimpleExprStmt", &[n("SimpleFor")], 0);
    g.inline("SimpleExprStmt", &[n("SimpleGroup")], 0);
    g.inline("SimpleExprStmt", &[n("SimpleInsert")], 0);
    g.inline("SimpleExprStmt", &[n("SimpleUpdate")], 0);
    g.inline("SimpleExprStmt", &[n("SimpleDelete")], 0);

    g.rule("OptionallyAliasedExpr", &[n("Expr")], |_, mut args| {
        Ok(StackValue::AliasedExpr {
            alias: None,
            expr: args.remove(0).into_expr(),
        })
    });
    g.rule(
        "OptionallyAliasedExpr",
        &[n("Identifier"), t(T::Assign), n("Expr")],
        |_, mut args| {
            let expr = args.remove(2).into_expr();
            let alias = args.remove(0).into_str();
            Ok(StackValue::AliasedExpr {
                alias: Some(alias),
                expr,
            })
        },
    );
}

fn with_block(g: &mut GrammarBuilder) {
    g.inline("WithBlock", &[kw(K::With), n("WithDeclList")], 1);
    g.list("WithDeclList", n("WithDecl"), Some(t(T::Comma)));

    g.rule(
        "WithDecl",
        &[n("Identifier"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let expr = args.remove(2).into_expr();
            let alias = args.remove(0).into_str();
            Ok(StackValue::AliasDecl(AliasDecl::Expr {
                alias,
                expr: Box::new(expr),
                span: span.into(),
            }))
        },
    );
    g.rule("WithDecl", &[kw(K::Module), n("DotName")], |span, mut args| {
        let module = args.remove(1).into_str();
        Ok(StackValue::AliasDecl(AliasDecl::Module {
            alias: None,
            module,
            span: span.into(),
        }))
    });
    g.rule(
        "WithDecl",
        &[n("Identifier"), kw(K::As), kw(K::Module), n("DotName")],
        |span, mut args| {
            let module = args.remove(3).into_str();
            let alias = args.remove(0).into_str();
            Ok(StackValue::AliasDecl(AliasDecl::Module {
                alias: Some(alias),
                module,
                span: span.into(),
            }))
        },
    );
}

fn select(g: &mut GrammarBuilder) {
    g.rule(
        "SimpleSelect",
        &[
            kw(K::Select),
            n("OptionallyAliasedExpr"),
            n("OptFilterClause"),
            n("OptSortClause"),
            n("OptSelectLimit"),
        ],
        |span, mut args| {
            let (offset, limit) = match args.remove(4) {
                StackValue::OffsetLimit { offset, limit } => (offset, limit),
                other => panic!("expected offset/limit, found {other:?}"),
            };
            let order_by = args.remove(3).into_sort_exprs();
            let filter = args.remove(2).into_opt_expr();
            let (alias, result) = match args.remove(1) {
                StackValue::AliasedExpr { alias, expr } => (alias, expr),
                other => panic!("expected aliased expression, found {other:?}"),
            };
            Ok(StackValue::Expr(Expr::Select(SelectQuery {
                aliases: Vec::new(),
                result_alias: alias,
                result: Box::new(result),
                filter: filter.map(Box::new),
                order_by,
                offset: offset.map(Box::new),
                limit: limit.map(Box::new),
                implicit: false,
                span: span.into(),
            })))
        },
    );
}

fn for_group(g: &mut GrammarBuilder) {
    // The iterator is restricted to atomic expressions; anything with
    // operators needs parentheses.
    g.inline("AtomicExpr", &[n("BaseAtomicExpr")], 0);
    g.inline("AtomicExpr", &[n("AtomicPath")], 0);

    g.rule("AtomicPath", &[n("PathNodeName")], |span, mut args| {
        let name = args.remove(0).into_object_ref();
        Ok(StackValue::Expr(Expr::Path(Path {
            steps: vec![PathStep::ObjectRef(name)],
            partial: false,
            span: span.into(),
        })))
    });
    g.rule_prec(
        "AtomicPath",
        &[n("AtomicExpr"), t(T::Dot), n("PathStepName")],
        super::Prec::Dot,
        |span, mut args| {
            let name = args.remove(2).into_str();
            let subject = args.remove(0).into_expr();
            let step = PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Forward,
                is_property: false,
                span: span.into(),
            });
            Ok(StackValue::Expr(super::expressions::extend_path(
                span, subject, step,
            )))
        },
    );
    g.rule_prec(
        "AtomicPath",
        &[n("AtomicExpr"), t(T::BackwardDot), n("PathStepName")],
        super::Prec::Dot,
        |span, mut args| {
            let name = args.remove(2).into_str();
            let subject = args.remove(0).into_expr();
            let step = PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Backward,
                is_property: false,
                span: span.into(),
            });
            Ok(StackValue::Expr(super::expressions::extend_path(
                span, subject, step,
            )))
        },
    );

    g.rule(
        "SimpleFor",
        &[
            kw(K::For),
            n("Identifier"),
            kw(K::In),
            n("AtomicExpr"),
            kw(K::Union),
            n("Expr"),
        ],
        |span, mut args| {
            let result = args.remove(5).into_expr();
            let iterator = args.remove(3).into_expr();
            let alias = args.remove(1).into_str();
            Ok(StackValue::Expr(Expr::For(ForQuery {
                aliases: Vec::new(),
                optional: false,
                iterator_alias: alias,
                iterator: Box::new(iterator),
                result: Box::new(result),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "SimpleFor",
        &[
            kw(K::For),
            kw(K::Optional),
            n("Identifier"),
            kw(K::In),
            n("AtomicExpr"),
            kw(K::Union),
            n("Expr"),
        ],
        |span, mut args| {
            let result = args.remove(6).into_expr();
            let iterator = args.remove(4).into_expr();
            let alias = args.remove(2).into_str();
            Ok(StackValue::Expr(Expr::For(ForQuery {
                aliases: Vec::new(),
                optional: true,
                iterator_alias: alias,
                iterator: Box::new(iterator),
                result: Box::new(result),
                span: span.into(),
            })))
        },
    );

    // GROUP … [USING …] BY …, with the legacy INTO/UNION tail.
    g.rule("OptUsingClause", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.inline("OptUsingClause", &[kw(K::Using), n("UsingDeclList")], 1);
    g.list("UsingDeclList", n("UsingDecl"), Some(t(T::Comma)));
    g.rule(
        "UsingDecl",
        &[n("Identifier"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let expr = args.remove(2).into_expr();
            let alias = args.remove(0).into_str();
            Ok(StackValue::AliasDecl(AliasDecl::Expr {
                alias,
                expr: Box::new(expr),
                span: span.into(),
            }))
        },
    );

    g.rule("GroupingIdent", &[n("Identifier")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::GroupingElement(GroupingElement::Simple(
            Box::new(Expr::Path(Path {
                steps: vec![PathStep::ObjectRef(ObjectRef::new(name, span))],
                partial: false,
                span: span.into(),
            })),
        )))
    });
    g.rule(
        "GroupingIdent",
        &[t(T::Dot), n("PathStepName")],
        |span, mut args| {
            let name = args.remove(1).into_str();
            Ok(StackValue::GroupingElement(GroupingElement::Simple(
                Box::new(Expr::Path(Path {
                    steps: vec![PathStep::Ptr(Ptr {
                        name,
                        direction: PointerDirection::Forward,
                        is_property: false,
                        span: span.into(),
                    })],
                    partial: true,
                    span: span.into(),
                })),
            )))
        },
    );
    g.list("GroupingIdentList", n("GroupingIdent"), Some(t(T::Comma)));

    g.inline("GroupingAtom", &[n("GroupingIdent")], 0);
    g.rule(
        "GroupingAtom",
        &[t(T::OpenParen), t(T::CloseParen)],
        |span, _| {
            Ok(StackValue::GroupingElement(GroupingElement::Empty(
                span.into(),
            )))
        },
    );
    g.rule(
        "GroupingAtom",
        &[t(T::OpenParen), n("GroupingIdentList"), t(T::CloseParen)],
        |span, mut args| {
            let elements = grouping_list(args.remove(1));
            Ok(StackValue::GroupingElement(GroupingElement::Tuple(
                elements,
                span.into(),
            )))
        },
    );
    g.list("GroupingAtomList", n("GroupingAtom"), Some(t(T::Comma)));

    g.inline("GroupingElement", &[n("GroupingAtom")], 0);
    g.rule(
        "GroupingElement",
        &[kw(K::Cube), t(T::OpenParen), n("GroupingAtomList"), t(T::CloseParen)],
        |span, mut args| {
            let elements = grouping_list(args.remove(2));
            Ok(StackValue::GroupingElement(GroupingElement::Cube(
                elements,
                span.into(),
            )))
        },
    );
    g.rule(
        "GroupingElement",
        &[
            kw(K::Rollup),
            t(T::OpenParen),
            n("GroupingAtomList"),
            t(T::CloseParen),
        ],
        |span, mut args| {
            let elements = grouping_list(args.remove(2));
            Ok(StackValue::GroupingElement(GroupingElement::Rollup(
                elements,
                span.into(),
            )))
        },
    );
    g.rule(
        "GroupingElement",
        &[t(T::OpenBrace), n("GroupingElementList"), t(T::CloseBrace)],
        |span, mut args| {
            let elements = grouping_list(args.remove(1));
            Ok(StackValue::GroupingElement(GroupingElement::Sets(
                elements,
                span.into(),
            )))
        },
    );
    g.list("GroupingElementList", n("GroupingElement"), Some(t(T::Comma)));

    g.rule(
        "SimpleGroup",
        &[
            kw(K::Group),
            n("OptionallyAliasedExpr"),
            n("OptUsingClause"),
            kw(K::By),
            n("GroupingElementList"),
        ],
        |span, mut args| {
            let by = grouping_list(args.remove(4));
            let using = args.remove(2).into_alias_decls();
            let (alias, subject) = match args.remove(1) {
                StackValue::AliasedExpr { alias, expr } => (alias, expr),
                other => panic!("expected aliased expression, found {other:?}"),
            };
            Ok(StackValue::Expr(Expr::Group(GroupQuery {
                aliases: Vec::new(),
                subject_alias: alias,
                subject: Box::new(subject),
                using,
                by,
                into: None,
                result: None,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "SimpleGroup",
        &[
            kw(K::Group),
            n("OptionallyAliasedExpr"),
            n("OptUsingClause"),
            kw(K::By),
            n("GroupingElementList"),
            kw(K::Into),
            n("Identifier"),
            kw(K::Union),
            n("Expr"),
        ],
        |span, mut args| {
            let result = args.remove(8).into_expr();
            let into = args.remove(6).into_str();
            let by = grouping_list(args.remove(4));
            let using = args.remove(2).into_alias_decls();
            let (alias, subject) = match args.remove(1) {
                StackValue::AliasedExpr { alias, expr } => (alias, expr),
                other => panic!("expected aliased expression, found {other:?}"),
            };
            Ok(StackValue::Expr(Expr::Group(GroupQuery {
                aliases: Vec::new(),
                subject_alias: alias,
                subject: Box::new(subject),
                using,
                by,
                into: Some(into),
                result: Some(Box::new(result)),
                span: span.into(),
            })))
        },
    );
}

/// Unwraps a list of grouping elements.
fn grouping_list(value: StackValue) -> Vec<GroupingElement> {
    value
        .into_list()
        .into_iter()
        .map(|v| match v {
            StackValue::GroupingElement(e) => e,
            other => panic!("expected grouping element, found {other:?}"),
        })
        .collect()
}

fn dml(g: &mut GrammarBuilder) {
    g.rule(
        "SimpleInsert",
        &[kw(K::Insert), n("Expr"), n("OptUnlessConflict")],
        |span, mut args| {
            let conflict = match args.remove(2) {
                StackValue::OnConflict(c) => Some(c),
                StackValue::Empty => None,
                other => panic!("expected conflict clause, found {other:?}"),
            };
            let (subject, shape) = insert_subject(args.remove(1).into_expr(), span)?;
            Ok(StackValue::Expr(Expr::Insert(InsertQuery {
                aliases: Vec::new(),
                subject,
                shape,
                unless_conflict: conflict,
                span: span.into(),
            })))
        },
    );

    g.rule("OptUnlessConflict", &[], |_, _| Ok(StackValue::Empty));
    g.rule(
        "OptUnlessConflict",
        &[kw(K::Unless), kw(K::Conflict)],
        |span, _| {
            Ok(StackValue::OnConflict(OnConflict {
                on: None,
                else_expr: None,
                span: span.into(),
            }))
        },
    );
    g.rule(
        "OptUnlessConflict",
        &[kw(K::Unless), kw(K::Conflict), kw(K::On), n("Expr")],
        |span, mut args| {
            let on = args.remove(3).into_expr();
            Ok(StackValue::OnConflict(OnConflict {
                on: Some(Box::new(on)),
                else_expr: None,
                span: span.into(),
            }))
        },
    );
    g.rule(
        "OptUnlessConflict",
        &[
            kw(K::Unless),
            kw(K::Conflict),
            kw(K::On),
            n("Expr"),
            kw(K::Else),
            n("Expr"),
        ],
        |span, mut args| {
            let else_expr = args.remove(5).into_expr();
            let on = args.remove(3).into_expr();
            Ok(StackValue::OnConflict(OnConflict {
                on: Some(Box::new(on)),
                else_expr: Some(Box::new(else_expr)),
                span: span.into(),
            }))
        },
    );

    g.rule(
        "SimpleUpdate",
        &[
            kw(K::Update),
            n("Expr"),
            n("OptFilterClause"),
            kw(K::Set),
            n("Shape"),
        ],
        |span, mut args| {
            let shape = args.remove(4).into_shape();
            let filter = args.remove(2).into_opt_expr();
            let subject = args.remove(1).into_expr();
            Ok(StackValue::Expr(Expr::Update(UpdateQuery {
                aliases: Vec::new(),
                subject: Box::new(subject),
                filter: filter.map(Box::new),
                shape,
                span: span.into(),
            })))
        },
    );

    g.rule(
        "SimpleDelete",
        &[
            kw(K::Delete),
            n("Expr"),
            n("OptFilterClause"),
            n("OptSortClause"),
            n("OptSelectLimit"),
        ],
        |span, mut args| {
            let (offset, limit) = match args.remove(4) {
                StackValue::OffsetLimit { offset, limit } => (offset, limit),
                other => panic!("expected offset/limit, found {other:?}"),
            };
            let order_by = args.remove(3).into_sort_exprs();
            let filter = args.remove(2).into_opt_expr();
            let subject = args.remove(1).into_expr();
            Ok(StackValue::Expr(Expr::Delete(DeleteQuery {
                aliases: Vec::new(),
                subject: Box::new(subject),
                filter: filter.map(Box::new),
                order_by,
                offset: offset.map(Box::new),
                limit: limit.map(Box::new),
                span: span.into(),
            })))
        },
    );
}

fn transactions(g: &mut GrammarBuilder) {
    g.rule(
        "TransactionMode",
        &[kw(K::Isolation), kw(K::Serializable)],
        |_, _| {
            Ok(StackValue::TransactionMode(TransactionMode::Isolation(
                TransactionIsolationLevel::Serializable,
            )))
        },
    );
    g.rule(
        "TransactionMode",
        &[kw(K::Isolation), kw(K::Repeatable), kw(K::Read)],
        |_, _| {
            Ok(StackValue::TransactionMode(TransactionMode::Isolation(
                TransactionIsolationLevel::RepeatableRead,
            )))
        },
    );
    g.rule("TransactionMode", &[kw(K::Read), kw(K::Write)], |_, _| {
        Ok(StackValue::TransactionMode(TransactionMode::Access(
            TransactionAccessMode::ReadWrite,
        )))
    });
    g.rule("TransactionMode", &[kw(K::Read), kw(K::Only)], |_, _| {
        Ok(StackValue::TransactionMode(TransactionMode::Access(
            TransactionAccessMode::ReadOnly,
        )))
    });
    g.rule("TransactionMode", &[kw(K::Deferrable)], |_, _| {
        Ok(StackValue::TransactionMode(TransactionMode::Defer(
            TransactionDeferMode::Deferrable,
        )))
    });
    g.rule("TransactionMode", &[kw(K::Not), kw(K::Deferrable)], |_, _| {
        Ok(StackValue::TransactionMode(TransactionMode::Defer(
            TransactionDeferMode::NotDeferrable,
        )))
    });

    g.list("TransactionModeList", n("TransactionMode"), Some(t(T::Comma)));
    g.rule("OptTransactionModeList", &[], |_, _| {
        Ok(StackValue::List(Vec::new()))
    });
    g.inline("OptTransactionModeList", &[n("TransactionModeList")], 0);

    g.rule(
        "TransactionStmt",
        &[kw(K::Start), kw(K::Transaction), n("OptTransactionModeList")],
        |span, mut args| {
            let modes = args.remove(2).into_list();
            let mut isolation = None;
            let mut access = None;
            let mut deferrable = None;
            for mode in modes {
                let StackValue::TransactionMode(mode) = mode else {
                    panic!("expected transaction mode, found {mode:?}");
                };
                match mode {
                    TransactionMode::Isolation(level) => {
                        if isolation.is_some() {
                            return Err(Diagnostic::error(
                                "only one isolation level can be specified",
                                span,
                            ));
                        }
                        isolation = Some(level);
                    }
                    TransactionMode::Access(mode) => {
                        if access.is_some() {
                            return Err(Diagnostic::error(
                                "only one access mode can be specified",
                                span,
                            ));
                        }
                        access = Some(mode);
                    }
                    TransactionMode::Defer(mode) => {
                        if deferrable.is_some() {
                            return Err(Diagnostic::error(
                                "deferrable mode can only be specified once",
                                span,
                            ));
                        }
                        deferrable = Some(mode);
                    }
                }
            }
            Ok(StackValue::Command(Command::StartTransaction(
                StartTransaction {
                    isolation,
                    access,
                    deferrable,
                    span: span.into(),
                },
            )))
        },
    );

    g.rule("TransactionStmt", &[kw(K::Commit)], |span, _| {
        Ok(StackValue::Command(Command::CommitTransaction(
            CommitTransaction { span: span.into() },
        )))
    });
    g.rule("TransactionStmt", &[kw(K::Rollback)], |span, _| {
        Ok(StackValue::Command(Command::RollbackTransaction(
            RollbackTransaction { span: span.into() },
        )))
    });
    g.rule(
        "TransactionStmt",
        &[kw(K::Declare), kw(K::Savepoint), n("Identifier")],
        |span, mut args| {
            let name = args.remove(2).into_str();
            Ok(StackValue::Command(Command::DeclareSavepoint(
                DeclareSavepoint {
                    name,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "TransactionStmt",
        &[
            kw(K::Rollback),
            kw(K::To),
            kw(K::Savepoint),
            n("Identifier"),
        ],
        |span, mut args| {
            let name = args.remove(3).into_str();
            Ok(StackValue::Command(Command::RollbackToSavepoint(
                RollbackToSavepoint {
                    name,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "TransactionStmt",
        &[kw(K::Release), kw(K::Savepoint), n("Identifier")],
        |span, mut args| {
            let name = args.remove(2).into_str();
            Ok(StackValue::Command(Command::ReleaseSavepoint(
                ReleaseSavepoint {
                    name,
                    span: span.into(),
                },
            )))
        },
    );
}

fn describe(g: &mut GrammarBuilder) {
    g.rule("DescribeFormat", &[], |_, _| {
        Ok(StackValue::DescribeFormat {
            language: DescribeLanguage::Ddl,
            verbose: false,
        })
    });
    g.rule("DescribeFormat", &[kw(K::As), kw(K::Ddl)], |_, _| {
        Ok(StackValue::DescribeFormat {
            language: DescribeLanguage::Ddl,
            verbose: false,
        })
    });
    g.rule("DescribeFormat", &[kw(K::As), kw(K::Sdl)], |_, _| {
        Ok(StackValue::DescribeFormat {
            language: DescribeLanguage::Sdl,
            verbose: false,
        })
    });
    g.rule("DescribeFormat", &[kw(K::As), kw(K::Json)], |_, _| {
        Ok(StackValue::DescribeFormat {
            language: DescribeLanguage::Json,
            verbose: false,
        })
    });
    g.rule("DescribeFormat", &[kw(K::As), kw(K::Text)], |_, _| {
        Ok(StackValue::DescribeFormat {
            language: DescribeLanguage::Text,
            verbose: false,
        })
    });
    g.rule(
        "DescribeFormat",
        &[kw(K::As), kw(K::Text), kw(K::Verbose)],
        |_, _| {
            Ok(StackValue::DescribeFormat {
                language: DescribeLanguage::Text,
                verbose: true,
            })
        },
    );

    let global_rules: &[&[super::Symbol]] = &[
        &[kw(K::Describe), kw(K::Schema), n("DescribeFormat")],
        &[
            kw(K::Describe),
            kw(K::Current),
            kw(K::Database),
            kw(K::Config),
            n("DescribeFormat"),
        ],
        &[
            kw(K::Describe),
            kw(K::Instance),
            kw(K::Config),
            n("DescribeFormat"),
        ],
        &[
            kw(K::Describe),
            kw(K::System),
            kw(K::Config),
            n("DescribeFormat"),
        ],
        &[kw(K::Describe), kw(K::Roles), n("DescribeFormat")],
    ];
    for rhs in global_rules {
        g.rule("DescribeStmt", rhs, describe_global);
    }

    fn describe_global(span: Span, mut args: Vec<StackValue>) -> Result<StackValue, Diagnostic> {
        let format = args.pop().expect("describe format");
        let (language, verbose) = match format {
            StackValue::DescribeFormat { language, verbose } => (language, verbose),
            other => panic!("expected describe format, found {other:?}"),
        };
        // The second keyword names the described global.
        let target = match args.get(1).map(|v| v.clone()) {
            Some(StackValue::Token(token)) => match token.text.to_lowercase().as_str() {
                "schema" => DescribeTarget::Global(DescribeGlobal::Schema),
                "roles" => DescribeTarget::Global(DescribeGlobal::Roles),
                "current" => DescribeTarget::Global(DescribeGlobal::DatabaseConfig),
                "instance" | "system" => {
                    DescribeTarget::Global(DescribeGlobal::InstanceConfig)
                }
                other => panic!("not a describe global: {other}"),
            },
            other => panic!("expected keyword token, found {other:?}"),
        };
        Ok(StackValue::Command(Command::Describe(DescribeStmt {
            target,
            language,
            verbose,
            span: span.into(),
        })))
    }

    g.rule(
        "DescribeStmt",
        &[
            kw(K::Describe),
            kw(K::Object),
            n("NodeName"),
            n("DescribeFormat"),
        ],
        |span, mut args| {
            let (language, verbose) = match args.remove(3) {
                StackValue::DescribeFormat { language, verbose } => (language, verbose),
                other => panic!("expected describe format, found {other:?}"),
            };
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Command(Command::Describe(DescribeStmt {
                target: DescribeTarget::Object(name),
                language,
                verbose,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DescribeStmt",
        &[
            kw(K::Describe),
            kw(K::Type),
            n("NodeName"),
            n("DescribeFormat"),
        ],
        |span, mut args| {
            let (language, verbose) = match args.remove(3) {
                StackValue::DescribeFormat { language, verbose } => (language, verbose),
                other => panic!("expected describe format, found {other:?}"),
            };
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Command(Command::Describe(DescribeStmt {
                target: DescribeTarget::Object(name),
                language,
                verbose,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DescribeStmt",
        &[
            kw(K::Describe),
            kw(K::Current),
            kw(K::Migration),
            n("DescribeFormat"),
        ],
        |span, mut args| {
            let (language, verbose) = match args.remove(3) {
                StackValue::DescribeFormat { language, verbose } => (language, verbose),
                other => panic!("expected describe format, found {other:?}"),
            };
            if !matches!(language, DescribeLanguage::Ddl | DescribeLanguage::Json) {
                return Err(Diagnostic::error(
                    format!("unexpected DESCRIBE format: {language:?}"),
                    span,
                ));
            }
            Ok(StackValue::Command(Command::Describe(DescribeStmt {
                target: DescribeTarget::CurrentMigration,
                language,
                verbose,
                span: span.into(),
            })))
        },
    );
}

fn analyze(g: &mut GrammarBuilder) {
    g.rule(
        "AnalyzeStmt",
        &[kw(K::Analyze), n("NamedTuple"), n("ExprStmt")],
        |span, mut args| {
            let query = args.remove(2).into_expr();
            let tuple = match args.remove(1).into_expr() {
                Expr::NamedTuple(tuple) => tuple,
                other => NamedTuple {
                    elements: Vec::new(),
                    span: other.span().into(),
                },
            };
            Ok(StackValue::Command(Command::Analyze(AnalyzeStmt {
                args: Some(tuple),
                query: Box::new(query),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "AnalyzeStmt",
        &[kw(K::Analyze), n("ExprStmt")],
        |span, mut args| {
            let query = args.remove(1).into_expr();
            Ok(StackValue::Command(Command::Analyze(AnalyzeStmt {
                args: None,
                query: Box::new(query),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "AdministerStmt",
        &[kw(K::Administer), n("FuncExpr")],
        |span, mut args| {
            let expr = args.remove(1).into_expr();
            Ok(StackValue::Command(Command::Administer(AdministerStmt {
                expr: Box::new(expr),
                span: span.into(),
            })))
        },
    );
}
