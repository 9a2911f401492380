//! Expression productions.

use tql_ast::expr::Anchor;
use tql_ast::expr::Array;
use tql_ast::expr::BinOp;
use tql_ast::expr::BytesConstant;
use tql_ast::expr::CastModifier;
use tql_ast::expr::Constant;
use tql_ast::expr::ConstantKind;
use tql_ast::expr::DetachedExpr;
use tql_ast::expr::Expr;
use tql_ast::expr::FuncArg;
use tql_ast::expr::FuncCall;
use tql_ast::expr::GlobalExpr;
use tql_ast::expr::IfElse;
use tql_ast::expr::Indirection;
use tql_ast::expr::IndirectionOp;
use tql_ast::expr::Introspect;
use tql_ast::expr::IsOp;
use tql_ast::expr::NamedTuple;
use tql_ast::expr::ObjectRef;
use tql_ast::expr::Parameter;
use tql_ast::expr::Path;
use tql_ast::expr::PathStep;
use tql_ast::expr::PointerDirection;
use tql_ast::expr::Ptr;
use tql_ast::expr::SetLiteral;
use tql_ast::expr::Shape;
use tql_ast::expr::ShapeElement;
use tql_ast::expr::ShapeOperation;
use tql_ast::expr::SortExpr;
use tql_ast::expr::Splat;
use tql_ast::expr::Tuple;
use tql_ast::expr::TupleElement;
use tql_ast::expr::TupleIndex;
use tql_ast::expr::TypeArg;
use tql_ast::expr::TypeCast;
use tql_ast::expr::TypeExpr;
use tql_ast::expr::TypeIntersection;
use tql_ast::expr::TypeName;
use tql_ast::expr::TypeOfExpr;
use tql_ast::expr::TypeOp;
use tql_ast::expr::TypeOpKind;
use tql_ast::expr::UnaryOp;
use tql_ast::qltypes::Cardinality;
use tql_ast::qltypes::NonesOrder;
use tql_ast::qltypes::SortOrder;
use tql_ast::span::Span;

use super::kw;
use super::n;
use super::t;
use super::CallArg;
use super::GrammarBuilder;
use super::Prec;
use super::StackValue;
use crate::diagnostic::Diagnostic;
use crate::keywords::Keyword as K;
use crate::token::TokenKind as T;

/// Builds a binary operator node.
fn binop(span: Span, args: Vec<StackValue>, op: &str) -> StackValue {
    let mut it = args.into_iter();
    let left = it.next().expect("binop lhs").into_expr();
    let right = it.last().expect("binop rhs").into_expr();
    StackValue::Expr(Expr::BinOp(BinOp {
        left: Box::new(left),
        op: op.to_string(),
        right: Box::new(right),
        span: span.into(),
    }))
}

/// Builds a prefix operator node.
fn unary(span: Span, args: Vec<StackValue>, op: &str) -> StackValue {
    let operand = args
        .into_iter()
        .last()
        .expect("unary operand")
        .into_expr();

    // A sign applied directly to a numeric literal folds into it, so
    // `-1` stays one constant through normalization and lowering.
    if op == "-" {
        if let Expr::Constant(mut constant) = operand {
            if matches!(
                constant.kind,
                ConstantKind::Integer
                    | ConstantKind::BigInt
                    | ConstantKind::Float
                    | ConstantKind::Decimal
            ) && !constant.value.starts_with('-')
            {
                constant.value = format!("-{}", constant.value);
                constant.span = span.into();
                return StackValue::Expr(Expr::Constant(constant));
            }
            return StackValue::Expr(Expr::UnaryOp(UnaryOp {
                op: op.to_string(),
                operand: Box::new(Expr::Constant(constant)),
                span: span.into(),
            }));
        }
    }

    StackValue::Expr(Expr::UnaryOp(UnaryOp {
        op: op.to_string(),
        operand: Box::new(operand),
        span: span.into(),
    }))
}

/// Appends a step to a path, wrapping non-path subjects.
pub(super) fn extend_path(span: Span, subject: Expr, step: PathStep) -> Expr {
    match subject {
        Expr::Path(mut path) => {
            path.steps.push(step);
            path.span = span.into();
            Expr::Path(path)
        }
        other => Expr::Path(Path {
            steps: vec![PathStep::Expr(Box::new(other)), step],
            partial: false,
            span: span.into(),
        }),
    }
}

/// The quote marker of a string literal, derived from its source text.
fn quote_marker(text: &str) -> String {
    if let Some(rest) = text.strip_prefix('$') {
        let tag_end = rest.find('$').map(|i| i + 2).unwrap_or(2);
        text[..tag_end].to_string()
    } else if text.starts_with("r'") || text.starts_with("r\"") {
        text[..2].to_string()
    } else {
        text[..1].to_string()
    }
}

/// Parses the `<type>$name` text of a normalized parameter token.
fn parse_param_and_type(text: &str, span: Span) -> Result<Expr, Diagnostic> {
    let malformed =
        || Diagnostic::error("malformed normalized parameter token", span);
    let inner = text.strip_prefix('<').ok_or_else(malformed)?;
    let close = inner.find('>').ok_or_else(malformed)?;
    let ty = &inner[..close];
    let name = inner[close + 1..].strip_prefix('$').ok_or_else(malformed)?;

    let (module, tail) = match ty.rfind("::") {
        Some(at) => (Some(ty[..at].to_string()), &ty[at + 2..]),
        None => (None, ty),
    };

    Ok(Expr::TypeCast(TypeCast {
        ty: TypeExpr::Name(TypeName {
            name: ObjectRef {
                module,
                name: tail.to_string(),
                span: span.into(),
            },
            subtypes: Vec::new(),
            span: span.into(),
        }),
        expr: Box::new(Expr::Parameter(Parameter {
            name: name.to_string(),
            span: span.into(),
        })),
        modifier: None,
        span: span.into(),
    }))
}

/// Registers the expression productions.
pub fn register(g: &mut GrammarBuilder) {
    constants(g);
    atoms(g);
    paths(g);
    operators(g);
    type_exprs(g);
    shapes(g);
    calls(g);
    clauses(g);
}

fn constants(g: &mut GrammarBuilder) {
    g.rule("Constant", &[t(T::IntConst)], |span, mut args| {
        let token = args.remove(0).into_token();
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::Integer,
            value: token.value.map(|v| v.to_text()).unwrap_or(token.text),
            span: span.into(),
        })))
    });
    g.rule("Constant", &[t(T::BigIntConst)], |span, mut args| {
        let token = args.remove(0).into_token();
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::BigInt,
            value: token.value.map(|v| v.to_text()).unwrap_or(token.text),
            span: span.into(),
        })))
    });
    g.rule("Constant", &[t(T::FloatConst)], |span, mut args| {
        let token = args.remove(0).into_token();
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::Float,
            value: token.value.map(|v| v.to_text()).unwrap_or(token.text),
            span: span.into(),
        })))
    });
    g.rule("Constant", &[t(T::DecimalConst)], |span, mut args| {
        let token = args.remove(0).into_token();
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::Decimal,
            value: token.value.map(|v| v.to_text()).unwrap_or(token.text),
            span: span.into(),
        })))
    });
    g.inline("Constant", &[n("BaseStringConstant")], 0);
    g.rule("Constant", &[t(T::BytesConst)], |span, mut args| {
        let token = args.remove(0).into_token();
        let value = match token.value {
            Some(crate::token::Value::Bytes(bytes)) => bytes,
            _ => Vec::new(),
        };
        Ok(StackValue::Expr(Expr::BytesConstant(BytesConstant {
            value,
            span: span.into(),
        })))
    });
    g.rule("Constant", &[kw(K::True)], |span, _| {
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::Boolean,
            value: "true".to_string(),
            span: span.into(),
        })))
    });
    g.rule("Constant", &[kw(K::False)], |span, _| {
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::Boolean,
            value: "false".to_string(),
            span: span.into(),
        })))
    });

    // A string constant as an expression, carrying its quote marker.
    g.rule("BaseStringConstant", &[t(T::StringConst)], |span, mut args| {
        let token = args.remove(0).into_token();
        let value = match token.value {
            Some(crate::token::Value::Str(s)) => s,
            _ => String::new(),
        };
        Ok(StackValue::Expr(Expr::Constant(Constant {
            kind: ConstantKind::String {
                quote: quote_marker(&token.text),
            },
            value,
            span: span.into(),
        })))
    });
}

fn atoms(g: &mut GrammarBuilder) {
    g.inline("BaseAtomicExpr", &[n("Constant")], 0);
    g.inline("BaseAtomicExpr", &[n("FreeShape")], 0);
    g.inline("BaseAtomicExpr", &[n("Tuple")], 0);
    g.inline("BaseAtomicExpr", &[n("NamedTuple")], 0);
    g.inline("BaseAtomicExpr", &[n("Collection")], 0);
    g.inline("BaseAtomicExpr", &[n("Set")], 0);
    g.inline("BaseAtomicExpr", &[n("ParenExpr")], 0);
    g.inline("BaseAtomicExpr", &[n("FuncExpr")], 0);
    g.inline("BaseAtomicExpr", &[n("AnchorExpr")], 0);

    g.rule("BaseAtomicExpr", &[t(T::Parameter)], |span, mut args| {
        let token = args.remove(0).into_token();
        let name = match token.value {
            Some(crate::token::Value::Str(s)) => s,
            _ => token.text.trim_start_matches('$').to_string(),
        };
        Ok(StackValue::Expr(Expr::Parameter(Parameter {
            name,
            span: span.into(),
        })))
    });
    g.rule("BaseAtomicExpr", &[t(T::ParameterAndType)], |span, mut args| {
        let token = args.remove(0).into_token();
        Ok(StackValue::Expr(parse_param_and_type(&token.text, span)?))
    });

    // Parenthesized expressions and statements-as-expressions.
    g.inline("ParenExpr", &[t(T::OpenParen), n("Expr"), t(T::CloseParen)], 1);
    g.inline(
        "ParenExpr",
        &[t(T::OpenParen), n("ExprStmt"), t(T::CloseParen)],
        1,
    );

    // Tuples. A one-element tuple requires the trailing comma.
    g.rule("Tuple", &[t(T::OpenParen), t(T::CloseParen)], |span, _| {
        Ok(StackValue::Expr(Expr::Tuple(Tuple {
            elements: Vec::new(),
            span: span.into(),
        })))
    });
    g.rule(
        "Tuple",
        &[t(T::OpenParen), n("Expr"), t(T::Comma), t(T::CloseParen)],
        |span, mut args| {
            let first = args.remove(1).into_expr();
            Ok(StackValue::Expr(Expr::Tuple(Tuple {
                elements: vec![first],
                span: span.into(),
            })))
        },
    );
    g.rule(
        "Tuple",
        &[
            t(T::OpenParen),
            n("Expr"),
            t(T::Comma),
            n("ExprList"),
            n("OptComma"),
            t(T::CloseParen),
        ],
        |span, mut args| {
            let rest = args.remove(3).into_exprs();
            let first = args.remove(1).into_expr();
            let mut elements = vec![first];
            elements.extend(rest);
            Ok(StackValue::Expr(Expr::Tuple(Tuple {
                elements,
                span: span.into(),
            })))
        },
    );

    // Named tuples.
    g.rule(
        "NamedTupleElement",
        &[n("AnyIdentifier"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let val = args.remove(2).into_expr();
            let name = args.remove(0).into_str();
            Ok(StackValue::TupleElement(TupleElement {
                name,
                val,
                span: span.into(),
            }))
        },
    );
    g.list("NamedTupleElementList", n("NamedTupleElement"), Some(t(T::Comma)));
    g.rule(
        "NamedTuple",
        &[
            t(T::OpenParen),
            n("NamedTupleElementList"),
            n("OptComma"),
            t(T::CloseParen),
        ],
        |span, mut args| {
            let elements = args
                .remove(1)
                .into_list()
                .into_iter()
                .map(|v| match v {
                    StackValue::TupleElement(e) => e,
                    other => panic!("expected tuple element, found {other:?}"),
                })
                .collect();
            Ok(StackValue::Expr(Expr::NamedTuple(NamedTuple {
                elements,
                span: span.into(),
            })))
        },
    );

    // Arrays.
    g.rule(
        "Collection",
        &[t(T::OpenBracket), t(T::CloseBracket)],
        |span, _| {
            Ok(StackValue::Expr(Expr::Array(Array {
                elements: Vec::new(),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "Collection",
        &[
            t(T::OpenBracket),
            n("ExprList"),
            n("OptComma"),
            t(T::CloseBracket),
        ],
        |span, mut args| {
            let elements = args.remove(1).into_exprs();
            Ok(StackValue::Expr(Expr::Array(Array {
                elements,
                span: span.into(),
            })))
        },
    );

    // Set literals.
    g.rule("Set", &[t(T::OpenBrace), t(T::CloseBrace)], |span, _| {
        Ok(StackValue::Expr(Expr::Set(SetLiteral {
            elements: Vec::new(),
            span: span.into(),
        })))
    });
    g.rule(
        "Set",
        &[
            t(T::OpenBrace),
            n("ExprList"),
            n("OptComma"),
            t(T::CloseBrace),
        ],
        |span, mut args| {
            let elements = args.remove(1).into_exprs();
            Ok(StackValue::Expr(Expr::Set(SetLiteral {
                elements,
                span: span.into(),
            })))
        },
    );

    g.list("ExprList", n("Expr"), Some(t(T::Comma)));

    g.rule("OptComma", &[], |_, _| Ok(StackValue::Empty));
    g.rule("OptComma", &[t(T::Comma)], |_, _| Ok(StackValue::Empty));

    // Implicit path anchors.
    for (keyword, anchor) in [
        (K::DunderSource, Anchor::Source),
        (K::DunderSubject, Anchor::Subject),
        (K::DunderOld, Anchor::Old),
        (K::DunderNew, Anchor::New),
        (K::DunderSpecified, Anchor::Specified),
        (K::DunderDefault, Anchor::Default),
    ] {
        let reduce: super::ReduceFn = match anchor {
            Anchor::Source => |span, _| Ok(anchor_expr(span, Anchor::Source)),
            Anchor::Subject => |span, _| Ok(anchor_expr(span, Anchor::Subject)),
            Anchor::Old => |span, _| Ok(anchor_expr(span, Anchor::Old)),
            Anchor::New => |span, _| Ok(anchor_expr(span, Anchor::New)),
            Anchor::Specified => |span, _| Ok(anchor_expr(span, Anchor::Specified)),
            Anchor::Default => |span, _| Ok(anchor_expr(span, Anchor::Default)),
        };
        g.rule("AnchorExpr", &[kw(keyword)], reduce);
    }

    // `__type__` standing alone names the type pointer.
    g.rule("AnchorExpr", &[kw(K::DunderType)], |span, _| {
        Ok(StackValue::Expr(Expr::Path(Path {
            steps: vec![PathStep::ObjectRef(ObjectRef::new("__type__", span))],
            partial: false,
            span: span.into(),
        })))
    });
}

/// Builds a path expression rooted at an implicit anchor.
fn anchor_expr(span: Span, anchor: Anchor) -> StackValue {
    StackValue::Expr(Expr::Path(Path {
        steps: vec![PathStep::Anchor(anchor, span.into())],
        partial: false,
        span: span.into(),
    }))
}

fn paths(g: &mut GrammarBuilder) {
    g.inline("Expr", &[n("BaseAtomicExpr")], 0);
    g.inline("Expr", &[n("Path")], 0);

    // A bare name is a single-step path.
    g.rule("Path", &[n("PathNodeName")], |span, mut args| {
        let name = args.remove(0).into_object_ref();
        Ok(StackValue::Expr(Expr::Path(Path {
            steps: vec![PathStep::ObjectRef(name)],
            partial: false,
            span: span.into(),
        })))
    });

    // Forward, backward, property, and tuple-index steps.
    g.rule_prec(
        "Path",
        &[n("Expr"), t(T::Dot), n("PathStepName")],
        Prec::Dot,
        |span, mut args| {
            let name = args.remove(2).into_str();
            let subject = args.remove(0).into_expr();
            let step = PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Forward,
                is_property: false,
                span: span.into(),
            });
            Ok(StackValue::Expr(extend_path(span, subject, step)))
        },
    );
    g.rule_prec(
        "Path",
        &[n("Expr"), t(T::Dot), t(T::IntConst)],
        Prec::Dot,
        |span, mut args| {
            let token = args.remove(2).into_token();
            let subject = args.remove(0).into_expr();
            let step = PathStep::TupleIndex(TupleIndex {
                index: token.text,
                span: span.into(),
            });
            Ok(StackValue::Expr(extend_path(span, subject, step)))
        },
    );
    g.rule_prec(
        "Path",
        &[n("Expr"), t(T::BackwardDot), n("PathStepName")],
        Prec::Dot,
        |span, mut args| {
            let name = args.remove(2).into_str();
            let subject = args.remove(0).into_expr();
            let step = PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Backward,
                is_property: false,
                span: span.into(),
            });
            Ok(StackValue::Expr(extend_path(span, subject, step)))
        },
    );
    g.rule_prec(
        "Path",
        &[n("Expr"), t(T::At), n("PathStepName")],
        Prec::At,
        |span, mut args| {
            let name = args.remove(2).into_str();
            let subject = args.remove(0).into_expr();
            let step = PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Forward,
                is_property: true,
                span: span.into(),
            });
            Ok(StackValue::Expr(extend_path(span, subject, step)))
        },
    );

    // Type intersection steps: `expr[IS Type]`.
    g.rule_prec(
        "Path",
        &[
            n("Expr"),
            t(T::OpenBracket),
            kw(K::Is),
            n("FullTypeExpr"),
            t(T::CloseBracket),
        ],
        Prec::Bracket,
        |span, mut args| {
            let ty = args.remove(3).into_type_expr();
            let subject = args.remove(0).into_expr();
            let step = PathStep::TypeIntersection(TypeIntersection {
                ty,
                span: span.into(),
            });
            Ok(StackValue::Expr(extend_path(span, subject, step)))
        },
    );

    // Partial paths: `.name` and `.<name` without a source.
    g.rule("Path", &[t(T::Dot), n("PathStepName")], |span, mut args| {
        let name = args.remove(1).into_str();
        Ok(StackValue::Expr(Expr::Path(Path {
            steps: vec![PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Forward,
                is_property: false,
                span: span.into(),
            })],
            partial: true,
            span: span.into(),
        })))
    });
    g.rule(
        "Path",
        &[t(T::BackwardDot), n("PathStepName")],
        |span, mut args| {
            let name = args.remove(1).into_str();
            Ok(StackValue::Expr(Expr::Path(Path {
                steps: vec![PathStep::Ptr(Ptr {
                    name,
                    direction: PointerDirection::Backward,
                    is_property: false,
                    span: span.into(),
                })],
                partial: true,
                span: span.into(),
            })))
        },
    );

    // `GLOBAL name` references a global variable.
    g.rule_prec(
        "Expr",
        &[kw(K::Global), n("NodeName")],
        Prec::Global,
        |span, mut args| {
            let name = args.remove(1).into_object_ref();
            Ok(StackValue::Expr(Expr::Global(GlobalExpr {
                name,
                span: span.into(),
            })))
        },
    );
}

fn operators(g: &mut GrammarBuilder) {
    let infix: &[(&[super::Symbol], &str)] = &[
        (&[n("Expr"), kw(K::Union), n("Expr")], "UNION"),
        (&[n("Expr"), kw(K::Except), n("Expr")], "EXCEPT"),
        (&[n("Expr"), kw(K::Intersect), n("Expr")], "INTERSECT"),
        (&[n("Expr"), kw(K::Or), n("Expr")], "OR"),
        (&[n("Expr"), kw(K::And), n("Expr")], "AND"),
        (&[n("Expr"), t(T::Plus), n("Expr")], "+"),
        (&[n("Expr"), t(T::Minus), n("Expr")], "-"),
        (&[n("Expr"), t(T::Concat), n("Expr")], "++"),
        (&[n("Expr"), t(T::Star), n("Expr")], "*"),
        (&[n("Expr"), t(T::Slash), n("Expr")], "/"),
        (&[n("Expr"), t(T::FloorDiv), n("Expr")], "//"),
        (&[n("Expr"), t(T::Percent), n("Expr")], "%"),
        (&[n("Expr"), t(T::Caret), n("Expr")], "^"),
        (&[n("Expr"), t(T::Less), n("Expr")], "<"),
        (&[n("Expr"), t(T::Greater), n("Expr")], ">"),
        (&[n("Expr"), t(T::Equals), n("Expr")], "="),
        (&[n("Expr"), t(T::NotEquals), n("Expr")], "!="),
        (&[n("Expr"), t(T::LessEquals), n("Expr")], "<="),
        (&[n("Expr"), t(T::GreaterEquals), n("Expr")], ">="),
        (&[n("Expr"), t(T::NotDistinctFrom), n("Expr")], "?="),
        (&[n("Expr"), t(T::DistinctFrom), n("Expr")], "?!="),
        (&[n("Expr"), t(T::Coalesce), n("Expr")], "??"),
        (&[n("Expr"), kw(K::Like), n("Expr")], "LIKE"),
        (&[n("Expr"), kw(K::Ilike), n("Expr")], "ILIKE"),
        (&[n("Expr"), kw(K::In), n("Expr")], "IN"),
    ];
    // Reduce functions are plain function pointers, so the operator
    // text is recovered from the consumed operator token rather than
    // captured per production.
    for (rhs, _op) in infix {
        g.rule("Expr", rhs, binop_from_token);
    }

    fn binop_from_token(span: Span, args: Vec<StackValue>) -> Result<StackValue, Diagnostic> {
        let mut it = args.into_iter();
        let left = it.next().expect("binop lhs").into_expr();
        let op_token = it.next().expect("binop operator").into_token();
        let right = it.next().expect("binop rhs").into_expr();
        let op = match op_token.text.to_uppercase().as_str() {
            s @ ("UNION" | "EXCEPT" | "INTERSECT" | "OR" | "AND" | "LIKE" | "ILIKE" | "IN") => {
                s.to_string()
            }
            _ => op_token.text.clone(),
        };
        Ok(StackValue::Expr(Expr::BinOp(BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span: span.into(),
        })))
    }

    // Negated two-word operators keep their canonical spelling.
    g.rule_prec(
        "Expr",
        &[n("Expr"), kw(K::Not), kw(K::Like), n("Expr")],
        Prec::LikeIlike,
        |span, args| Ok(binop(span, args, "NOT LIKE")),
    );
    g.rule_prec(
        "Expr",
        &[n("Expr"), kw(K::Not), kw(K::Ilike), n("Expr")],
        Prec::LikeIlike,
        |span, args| Ok(binop(span, args, "NOT ILIKE")),
    );
    g.rule_prec(
        "Expr",
        &[n("Expr"), kw(K::Not), kw(K::In), n("Expr")],
        Prec::In,
        |span, args| Ok(binop(span, args, "NOT IN")),
    );

    // Prefix operators.
    g.rule_prec("Expr", &[t(T::Minus), n("Expr")], Prec::Unary, |span, args| {
        Ok(unary(span, args, "-"))
    });
    g.rule_prec("Expr", &[t(T::Plus), n("Expr")], Prec::Unary, |span, args| {
        Ok(unary(span, args, "+"))
    });
    g.rule("Expr", &[kw(K::Not), n("Expr")], |span, args| {
        Ok(unary(span, args, "NOT"))
    });
    g.rule("Expr", &[kw(K::Exists), n("Expr")], |span, args| {
        Ok(unary(span, args, "EXISTS"))
    });
    g.rule("Expr", &[kw(K::Distinct), n("Expr")], |span, args| {
        Ok(unary(span, args, "DISTINCT"))
    });
    g.rule("Expr", &[kw(K::Detached), n("Expr")], |span, mut args| {
        let expr = args.remove(1).into_expr();
        Ok(StackValue::Expr(Expr::Detached(DetachedExpr {
            expr: Box::new(expr),
            span: span.into(),
        })))
    });

    // Conditionals, both orders.
    g.rule(
        "Expr",
        &[n("Expr"), kw(K::If), n("Expr"), kw(K::Else), n("Expr")],
        |span, mut args| {
            let else_expr = args.remove(4).into_expr();
            let condition = args.remove(2).into_expr();
            let if_expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::IfElse(IfElse {
                condition: Box::new(condition),
                if_expr: Box::new(if_expr),
                else_expr: Box::new(else_expr),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "Expr",
        &[
            kw(K::If),
            n("Expr"),
            kw(K::Then),
            n("Expr"),
            kw(K::Else),
            n("Expr"),
        ],
        |span, mut args| {
            let else_expr = args.remove(5).into_expr();
            let if_expr = args.remove(3).into_expr();
            let condition = args.remove(1).into_expr();
            Ok(StackValue::Expr(Expr::IfElse(IfElse {
                condition: Box::new(condition),
                if_expr: Box::new(if_expr),
                else_expr: Box::new(else_expr),
                span: span.into(),
            })))
        },
    );

    // `IS` type checks.
    g.rule_prec(
        "Expr",
        &[n("Expr"), kw(K::Is), n("FullTypeExpr")],
        Prec::Is,
        |span, mut args| {
            let ty = args.remove(2).into_type_expr();
            let expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::IsOp(IsOp {
                expr: Box::new(expr),
                negated: false,
                ty,
                span: span.into(),
            })))
        },
    );
    g.rule_prec(
        "Expr",
        &[n("Expr"), kw(K::Is), kw(K::Not), n("FullTypeExpr")],
        Prec::Is,
        |span, mut args| {
            let ty = args.remove(3).into_type_expr();
            let expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::IsOp(IsOp {
                expr: Box::new(expr),
                negated: true,
                ty,
                span: span.into(),
            })))
        },
    );

    // `INTROSPECT Type`.
    g.rule_prec(
        "Expr",
        &[kw(K::Introspect), n("FullTypeExpr")],
        Prec::Introspect,
        |span, mut args| {
            let ty = args.remove(1).into_type_expr();
            Ok(StackValue::Expr(Expr::Introspect(Introspect {
                ty,
                span: span.into(),
            })))
        },
    );

    // Type casts.
    g.rule_prec(
        "Expr",
        &[t(T::Less), n("FullTypeExpr"), t(T::Greater), n("Expr")],
        Prec::TypeCast,
        |span, mut args| {
            let expr = args.remove(3).into_expr();
            let ty = args.remove(1).into_type_expr();
            Ok(StackValue::Expr(Expr::TypeCast(TypeCast {
                ty,
                expr: Box::new(expr),
                modifier: None,
                span: span.into(),
            })))
        },
    );
    g.rule_prec(
        "Expr",
        &[
            t(T::Less),
            kw(K::Optional),
            n("FullTypeExpr"),
            t(T::Greater),
            n("Expr"),
        ],
        Prec::TypeCast,
        |span, mut args| {
            let expr = args.remove(4).into_expr();
            let ty = args.remove(2).into_type_expr();
            Ok(StackValue::Expr(Expr::TypeCast(TypeCast {
                ty,
                expr: Box::new(expr),
                modifier: Some(CastModifier::Optional),
                span: span.into(),
            })))
        },
    );
    g.rule_prec(
        "Expr",
        &[
            t(T::Less),
            kw(K::Required),
            n("FullTypeExpr"),
            t(T::Greater),
            n("Expr"),
        ],
        Prec::TypeCast,
        |span, mut args| {
            let expr = args.remove(4).into_expr();
            let ty = args.remove(2).into_type_expr();
            Ok(StackValue::Expr(Expr::TypeCast(TypeCast {
                ty,
                expr: Box::new(expr),
                modifier: Some(CastModifier::Required),
                span: span.into(),
            })))
        },
    );

    // Indexing and slicing.
    g.rule(
        "Expr",
        &[n("Expr"), t(T::OpenBracket), n("Expr"), t(T::CloseBracket)],
        |span, mut args| {
            let index = args.remove(2).into_expr();
            let expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::Indirection(Indirection {
                expr: Box::new(expr),
                op: IndirectionOp::Index(Box::new(index)),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "Expr",
        &[
            n("Expr"),
            t(T::OpenBracket),
            n("Expr"),
            t(T::Colon),
            n("Expr"),
            t(T::CloseBracket),
        ],
        |span, mut args| {
            let stop = args.remove(4).into_expr();
            let start = args.remove(2).into_expr();
            let expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::Indirection(Indirection {
                expr: Box::new(expr),
                op: IndirectionOp::Slice {
                    start: Some(Box::new(start)),
                    stop: Some(Box::new(stop)),
                },
                span: span.into(),
            })))
        },
    );
    g.rule(
        "Expr",
        &[
            n("Expr"),
            t(T::OpenBracket),
            n("Expr"),
            t(T::Colon),
            t(T::CloseBracket),
        ],
        |span, mut args| {
            let start = args.remove(2).into_expr();
            let expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::Indirection(Indirection {
                expr: Box::new(expr),
                op: IndirectionOp::Slice {
                    start: Some(Box::new(start)),
                    stop: None,
                },
                span: span.into(),
            })))
        },
    );
    g.rule(
        "Expr",
        &[
            n("Expr"),
            t(T::OpenBracket),
            t(T::Colon),
            n("Expr"),
            t(T::CloseBracket),
        ],
        |span, mut args| {
            let stop = args.remove(3).into_expr();
            let expr = args.remove(0).into_expr();
            Ok(StackValue::Expr(Expr::Indirection(Indirection {
                expr: Box::new(expr),
                op: IndirectionOp::Slice {
                    start: None,
                    stop: Some(Box::new(stop)),
                },
                span: span.into(),
            })))
        },
    );
}

fn type_exprs(g: &mut GrammarBuilder) {
    g.inline("FullTypeExpr", &[n("TypeName")], 0);
    g.rule(
        "FullTypeExpr",
        &[n("FullTypeExpr"), t(T::Pipe), n("FullTypeExpr")],
        |span, mut args| {
            let right = args.remove(2).into_type_expr();
            let left = args.remove(0).into_type_expr();
            Ok(StackValue::TypeExpr(TypeExpr::Op(TypeOp {
                left: Box::new(left),
                op: TypeOpKind::Union,
                right: Box::new(right),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "FullTypeExpr",
        &[n("FullTypeExpr"), t(T::Ampersand), n("FullTypeExpr")],
        |span, mut args| {
            let right = args.remove(2).into_type_expr();
            let left = args.remove(0).into_type_expr();
            Ok(StackValue::TypeExpr(TypeExpr::Op(TypeOp {
                left: Box::new(left),
                op: TypeOpKind::Intersection,
                right: Box::new(right),
                span: span.into(),
            })))
        },
    );
    g.rule_prec(
        "FullTypeExpr",
        &[kw(K::Typeof), n("Expr")],
        Prec::Typeof,
        |span, mut args| {
            let expr = args.remove(1).into_expr();
            Ok(StackValue::TypeExpr(TypeExpr::Typeof(TypeOfExpr {
                expr: Box::new(expr),
                span: span.into(),
            })))
        },
    );
    g.inline(
        "FullTypeExpr",
        &[t(T::OpenParen), n("FullTypeExpr"), t(T::CloseParen)],
        1,
    );

    g.inline("TypeName", &[n("SimpleTypeName")], 0);
    g.inline("TypeName", &[n("CollectionTypeName")], 0);

    g.rule_prec(
        "SimpleTypeName",
        &[n("PtrNodeName")],
        Prec::TypeName,
        |span, mut args| {
            let name = args.remove(0).into_object_ref();
            Ok(StackValue::TypeExpr(TypeExpr::Name(TypeName {
                name,
                subtypes: Vec::new(),
                span: span.into(),
            })))
        },
    );
    g.rule_prec(
        "SimpleTypeName",
        &[kw(K::Anytype)],
        Prec::TypeName,
        |span, _| {
            Ok(StackValue::TypeExpr(TypeExpr::Name(TypeName {
                name: ObjectRef::new("anytype", span),
                subtypes: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "CollectionTypeName",
        &[n("NodeName"), t(T::Less), n("SubtypeList"), n("OptComma"), t(T::Greater)],
        |span, mut args| {
            let subtypes = args
                .remove(2)
                .into_list()
                .into_iter()
                .map(|v| match v {
                    StackValue::TypeArg(arg) => arg,
                    other => panic!("expected type argument, found {other:?}"),
                })
                .collect();
            let name = args.remove(0).into_object_ref();
            Ok(StackValue::TypeExpr(TypeExpr::Name(TypeName {
                name,
                subtypes,
                span: span.into(),
            })))
        },
    );

    g.rule("Subtype", &[n("FullTypeExpr")], |span, mut args| {
        let ty = args.remove(0).into_type_expr();
        Ok(StackValue::TypeArg(TypeArg {
            label: None,
            ty,
            span: span.into(),
        }))
    });
    g.rule(
        "Subtype",
        &[n("Identifier"), t(T::Colon), n("FullTypeExpr")],
        |span, mut args| {
            let ty = args.remove(2).into_type_expr();
            let label = args.remove(0).into_str();
            Ok(StackValue::TypeArg(TypeArg {
                label: Some(label),
                ty,
                span: span.into(),
            }))
        },
    );
    g.list("SubtypeList", n("Subtype"), Some(t(T::Comma)));
}

fn shapes(g: &mut GrammarBuilder) {
    // A shape attaches to the preceding expression.
    g.rule("Expr", &[n("Expr"), n("Shape")], |span, mut args| {
        let elements = args.remove(1).into_shape();
        let subject = args.remove(0).into_expr();
        Ok(StackValue::Expr(Expr::Shape(Shape {
            expr: Some(Box::new(subject)),
            elements,
            span: span.into(),
        })))
    });

    g.rule("Shape", &[t(T::OpenBrace), t(T::CloseBrace)], |_, _| {
        Ok(StackValue::List(Vec::new()))
    });
    g.inline(
        "Shape",
        &[
            t(T::OpenBrace),
            n("ShapeElementList"),
            n("OptComma"),
            t(T::CloseBrace),
        ],
        1,
    );
    g.list("ShapeElementList", n("ShapeElement"), Some(t(T::Comma)));

    // Plain pointers, optionally with a nested shape and trailing
    // clauses.
    g.rule("ShapeElement", &[n("ShapePath")], |span, mut args| {
        let expr = args.remove(0).into_expr();
        Ok(StackValue::ShapeElement(ShapeElement::plain(expr, span)))
    });
    g.rule(
        "ShapeElement",
        &[
            n("ShapePath"),
            t(T::Colon),
            n("Shape"),
            n("OptFilterClause"),
            n("OptSortClause"),
            n("OptSelectLimit"),
        ],
        |span, mut args| {
            let (offset, limit) = match args.remove(5) {
                StackValue::OffsetLimit { offset, limit } => (offset, limit),
                other => panic!("expected offset/limit, found {other:?}"),
            };
            let order_by = args.remove(4).into_sort_exprs();
            let filter = args.remove(3).into_opt_expr();
            let elements = args.remove(2).into_shape();
            let expr = args.remove(0).into_expr();
            let mut element = ShapeElement::plain(expr, span);
            element.elements = elements;
            element.filter = filter.map(Box::new);
            element.order_by = order_by;
            element.offset = offset.map(Box::new);
            element.limit = limit.map(Box::new);
            Ok(StackValue::ShapeElement(element))
        },
    );

    // Computed pointers, with qualifier prefixes spelled out so the
    // parser never has to guess before seeing the pointer name.
    g.rule("ShapeElement", &[n("ComputedShapePointer")], |_, mut args| {
        Ok(args.remove(0))
    });

    computed_pointer(g, &[]);
    computed_pointer(g, &[kw(K::Required)]);
    computed_pointer(g, &[kw(K::Optional)]);
    computed_pointer(g, &[kw(K::Multi)]);
    computed_pointer(g, &[kw(K::Single)]);
    computed_pointer(g, &[kw(K::Required), kw(K::Multi)]);
    computed_pointer(g, &[kw(K::Required), kw(K::Single)]);
    computed_pointer(g, &[kw(K::Optional), kw(K::Multi)]);
    computed_pointer(g, &[kw(K::Optional), kw(K::Single)]);

    // Append and subtract assignments.
    g.rule(
        "ComputedShapePointer",
        &[n("ShapePath"), t(T::AddAssign), n("Expr")],
        |span, mut args| {
            let value = args.remove(2).into_expr();
            let expr = args.remove(0).into_expr();
            let mut element = ShapeElement::plain(expr, span);
            element.compexpr = Some(Box::new(value));
            element.operation = ShapeOperation::Append;
            Ok(StackValue::ShapeElement(element))
        },
    );
    g.rule(
        "ComputedShapePointer",
        &[n("ShapePath"), t(T::SubAssign), n("Expr")],
        |span, mut args| {
            let value = args.remove(2).into_expr();
            let expr = args.remove(0).into_expr();
            let mut element = ShapeElement::plain(expr, span);
            element.compexpr = Some(Box::new(value));
            element.operation = ShapeOperation::Subtract;
            Ok(StackValue::ShapeElement(element))
        },
    );

    // Splats.
    g.rule("ShapeElement", &[t(T::Star)], |span, _| {
        Ok(StackValue::ShapeElement(ShapeElement::plain(
            Expr::Splat(Splat {
                depth: 1,
                ty: None,
                span: span.into(),
            }),
            span,
        )))
    });
    g.rule("ShapeElement", &[t(T::DoubleSplat)], |span, _| {
        Ok(StackValue::ShapeElement(ShapeElement::plain(
            Expr::Splat(Splat {
                depth: 2,
                ty: None,
                span: span.into(),
            }),
            span,
        )))
    });

    // The pointer path of a shape element.
    g.rule("ShapePath", &[n("PathStepName")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::Expr(Expr::Path(Path {
            steps: vec![PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Forward,
                is_property: false,
                span: span.into(),
            })],
            partial: false,
            span: span.into(),
        })))
    });
    g.rule(
        "ShapePath",
        &[t(T::At), n("PathStepName")],
        |span, mut args| {
            let name = args.remove(1).into_str();
            Ok(StackValue::Expr(Expr::Path(Path {
                steps: vec![PathStep::Ptr(Ptr {
                    name,
                    direction: PointerDirection::Forward,
                    is_property: true,
                    span: span.into(),
                })],
                partial: false,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "ShapePath",
        &[n("ShapePath"), t(T::Dot), n("PathStepName")],
        |span, mut args| {
            let name = args.remove(2).into_str();
            let subject = args.remove(0).into_expr();
            let step = PathStep::Ptr(Ptr {
                name,
                direction: PointerDirection::Forward,
                is_property: false,
                span: span.into(),
            });
            Ok(StackValue::Expr(extend_path(span, subject, step)))
        },
    );

    // Free shapes hold computed pointers only; `{x}` is a set.
    g.inline(
        "FreeShape",
        &[n("FreeShapeInner")],
        0,
    );
    g.rule(
        "FreeShapeInner",
        &[
            t(T::OpenBrace),
            n("FreeShapeElementList"),
            n("OptComma"),
            t(T::CloseBrace),
        ],
        |span, mut args| {
            let elements = args.remove(1).into_shape();
            Ok(StackValue::Expr(Expr::Shape(Shape {
                expr: None,
                elements,
                span: span.into(),
            })))
        },
    );
    g.list("FreeShapeElementList", n("ComputedShapePointer"), Some(t(T::Comma)));
}

/// Registers one qualifier spelling of a computed shape pointer.
///
/// The qualifier flags are re-derived from the consumed tokens, so a
/// single non-capturing reduce function serves every spelling.
fn computed_pointer(g: &mut GrammarBuilder, quals: &[super::Symbol]) {
    let mut rhs: Vec<super::Symbol> = quals.to_vec();
    rhs.push(n("ShapePath"));
    rhs.push(t(T::Assign));
    rhs.push(n("Expr"));

    g.rule("ComputedShapePointer", &rhs, |span, args| {
        let mut required = None;
        let mut cardinality = None;
        let mut it = args.into_iter().peekable();
        while let Some(StackValue::Token(token)) = it.peek() {
            match token.text.to_lowercase().as_str() {
                "required" => required = Some(true),
                "optional" => required = Some(false),
                "multi" => cardinality = Some(Cardinality::Many),
                "single" => cardinality = Some(Cardinality::One),
                _ => break,
            }
            it.next();
        }
        let expr = it.next().expect("shape pointer path").into_expr();
        let _assign = it.next();
        let value = it.next().expect("computed value").into_expr();
        let mut element = ShapeElement::plain(expr, span);
        element.compexpr = Some(Box::new(value));
        element.operation = ShapeOperation::Assign;
        element.required = required;
        element.cardinality = cardinality;
        Ok(StackValue::ShapeElement(element))
    });
}

fn calls(g: &mut GrammarBuilder) {
    g.inline("FuncExpr", &[n("FuncApplication")], 0);

    g.rule(
        "FuncApplication",
        &[n("NodeName"), t(T::OpenParen), t(T::CloseParen)],
        |span, mut args| {
            let func = args.remove(0).into_object_ref();
            Ok(StackValue::Expr(Expr::FuncCall(FuncCall {
                func,
                args: Vec::new(),
                kwargs: Vec::new(),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "FuncApplication",
        &[
            n("NodeName"),
            t(T::OpenParen),
            n("FuncArgList"),
            n("OptComma"),
            t(T::CloseParen),
        ],
        |span, mut args| {
            let call_args = args.remove(2).into_list();
            let func = args.remove(0).into_object_ref();
            let mut positional = Vec::new();
            let mut kwargs = Vec::new();
            for arg in call_args {
                match arg {
                    StackValue::CallArg(CallArg::Positional { arg, filter, sort }) => {
                        let span = arg.span();
                        positional.push(FuncArg {
                            arg,
                            filter: filter.map(Box::new),
                            sort,
                            span: span.into(),
                        });
                    }
                    StackValue::CallArg(CallArg::Named(name, value)) => {
                        kwargs.push((name, value));
                    }
                    other => panic!("expected call argument, found {other:?}"),
                }
            }
            Ok(StackValue::Expr(Expr::FuncCall(FuncCall {
                func,
                args: positional,
                kwargs,
                span: span.into(),
            })))
        },
    );

    g.list("FuncArgList", n("FuncCallArg"), Some(t(T::Comma)));

    g.rule(
        "FuncCallArg",
        &[n("Expr"), n("OptFilterClause"), n("OptSortClause")],
        |_, mut args| {
            let sort = args.remove(2).into_sort_exprs();
            let filter = args.remove(1).into_opt_expr();
            let arg = args.remove(0).into_expr();
            Ok(StackValue::CallArg(CallArg::Positional {
                arg,
                filter,
                sort,
            }))
        },
    );
    g.rule(
        "FuncCallArg",
        &[n("AnyIdentifier"), t(T::Assign), n("Expr")],
        |_, mut args| {
            let value = args.remove(2).into_expr();
            let name = args.remove(0).into_str();
            Ok(StackValue::CallArg(CallArg::Named(name, value)))
        },
    );
}

fn clauses(g: &mut GrammarBuilder) {
    g.rule("OptFilterClause", &[], |_, _| Ok(StackValue::Empty));
    g.rule(
        "OptFilterClause",
        &[kw(K::Filter), n("Expr")],
        |_, mut args| Ok(StackValue::Expr(args.remove(1).into_expr())),
    );

    g.rule("OptSortClause", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.inline("OptSortClause", &[t(T::OrderBy), n("OrderbyList")], 1);

    g.list("OrderbyList", n("OrderbyExpr"), Some(kw(K::Then)));

    g.rule(
        "OrderbyExpr",
        &[n("Expr"), n("OptDirection"), n("OptNonesOrder")],
        |span, mut args| {
            let nones_order = match args.remove(2) {
                StackValue::NonesOrder(order) => Some(order),
                StackValue::Empty => None,
                other => panic!("expected empty-values order, found {other:?}"),
            };
            let direction = match args.remove(1) {
                StackValue::SortOrder(order) => Some(order),
                StackValue::Empty => None,
                other => panic!("expected sort direction, found {other:?}"),
            };
            let path = args.remove(0).into_expr();
            Ok(StackValue::SortExpr(SortExpr {
                path: Box::new(path),
                direction,
                nones_order,
                span: span.into(),
            }))
        },
    );

    g.rule("OptDirection", &[], |_, _| Ok(StackValue::Empty));
    g.rule("OptDirection", &[kw(K::Asc)], |_, _| {
        Ok(StackValue::SortOrder(SortOrder::Asc))
    });
    g.rule("OptDirection", &[kw(K::Desc)], |_, _| {
        Ok(StackValue::SortOrder(SortOrder::Desc))
    });

    g.rule("OptNonesOrder", &[], |_, _| Ok(StackValue::Empty));
    g.rule("OptNonesOrder", &[kw(K::Empty), kw(K::First)], |_, _| {
        Ok(StackValue::NonesOrder(NonesOrder::First))
    });
    g.rule("OptNonesOrder", &[kw(K::Empty), kw(K::Last)], |_, _| {
        Ok(StackValue::NonesOrder(NonesOrder::Last))
    });

    g.rule("OptSelectLimit", &[], |_, _| {
        Ok(StackValue::OffsetLimit {
            offset: None,
            limit: None,
        })
    });
    g.rule(
        "OptSelectLimit",
        &[kw(K::Offset), n("Expr")],
        |_, mut args| {
            Ok(StackValue::OffsetLimit {
                offset: Some(args.remove(1).into_expr()),
                limit: None,
            })
        },
    );
    g.rule("OptSelectLimit", &[kw(K::Limit), n("Expr")], |_, mut args| {
        Ok(StackValue::OffsetLimit {
            offset: None,
            limit: Some(args.remove(1).into_expr()),
        })
    });
    g.rule(
        "OptSelectLimit",
        &[kw(K::Offset), n("Expr"), kw(K::Limit), n("Expr")],
        |_, mut args| {
            let limit = args.remove(3).into_expr();
            let offset = args.remove(1).into_expr();
            Ok(StackValue::OffsetLimit {
                offset: Some(offset),
                limit: Some(limit),
            })
        },
    );
}
