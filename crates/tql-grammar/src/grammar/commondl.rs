//! Names, identifier ladders, and pieces shared between DDL and SDL.

use tql_ast::ddl::FuncParam;
use tql_ast::ddl::FunctionCode;
use tql_ast::expr::ObjectRef;
use tql_ast::qltypes::Language;
use tql_ast::qltypes::ParameterKind;
use tql_ast::qltypes::SchemaCardinality;
use tql_ast::qltypes::TypeModifier;
use tql_ast::span::Span;

use super::kw;
use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use crate::diagnostic::Diagnostic;
use crate::keywords::Keyword;
use crate::keywords::Keyword as K;
use crate::keywords::KeywordClass;
use crate::token::TokenKind as T;
use crate::token::Value;

/// The shared reduce for keyword-as-identifier productions: the value
/// is the keyword's source text.
fn keyword_text(_: Span, mut args: Vec<StackValue>) -> Result<StackValue, Diagnostic> {
    let token = args.remove(0).into_token();
    Ok(StackValue::Str(token.text))
}

/// Registers the name ladder and common declaration pieces.
pub fn register(g: &mut GrammarBuilder) {
    keywords(g);
    names(g);
    semicolons(g);
    clauses(g);
    parameters(g);
    bodies(g);
}

fn keywords(g: &mut GrammarBuilder) {
    for keyword in Keyword::ALL {
        let lhs = match keyword.class() {
            KeywordClass::Unreserved => "UnreservedKeyword",
            KeywordClass::PartialReserved => "PartialReservedKeyword",
            KeywordClass::CurrentReserved | KeywordClass::FutureReserved => "ReservedKeyword",
        };
        g.rule(lhs, &[kw(*keyword)], keyword_text);
    }
}

fn names(g: &mut GrammarBuilder) {
    g.rule("Identifier", &[t(T::Ident)], |_, mut args| {
        let token = args.remove(0).into_token();
        let name = match token.value {
            Some(Value::Str(name)) => name,
            _ => token.text,
        };
        Ok(StackValue::Str(name))
    });
    g.inline("Identifier", &[n("UnreservedKeyword")], 0);

    g.inline("PtrIdentifier", &[n("Identifier")], 0);
    g.inline("PtrIdentifier", &[n("PartialReservedKeyword")], 0);

    g.inline("AnyIdentifier", &[n("PtrIdentifier")], 0);
    g.inline("AnyIdentifier", &[n("ReservedKeyword")], 0);

    // Dotted module paths.
    g.inline("DotName", &[n("Identifier")], 0);
    g.rule(
        "DotName",
        &[n("DotName"), t(T::Dot), n("Identifier")],
        |_, mut args| {
            let tail = args.remove(2).into_str();
            let head = args.remove(0).into_str();
            Ok(StackValue::Str(format!("{head}.{tail}")))
        },
    );

    // `::`-joined name tails.
    g.inline("ColonedIdent", &[n("AnyIdentifier")], 0);
    g.rule(
        "ColonedIdent",
        &[n("ColonedIdent"), t(T::Namespace), n("AnyIdentifier")],
        |_, mut args| {
            let tail = args.remove(2).into_str();
            let head = args.remove(0).into_str();
            Ok(StackValue::Str(format!("{head}::{tail}")))
        },
    );

    g.rule(
        "QualifiedName",
        &[n("Identifier"), t(T::Namespace), n("ColonedIdent")],
        |span, mut args| {
            let tail = args.remove(2).into_str();
            let head = args.remove(0).into_str();
            Ok(StackValue::ObjectRef(split_qualified(&head, &tail, span)))
        },
    );
    g.rule(
        "QualifiedName",
        &[kw(K::DunderStd), t(T::Namespace), n("ColonedIdent")],
        |span, mut args| {
            let tail = args.remove(2).into_str();
            Ok(StackValue::ObjectRef(split_qualified("__std__", &tail, span)))
        },
    );

    g.rule("BaseName", &[n("Identifier")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::ObjectRef(ObjectRef::new(name, span)))
    });
    g.inline("BaseName", &[n("QualifiedName")], 0);

    g.inline("NodeName", &[n("BaseName")], 0);

    g.rule("PtrName", &[n("PtrIdentifier")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::ObjectRef(ObjectRef::new(name, span)))
    });
    g.inline("PtrName", &[n("QualifiedName")], 0);
    g.inline("PtrNodeName", &[n("PtrName")], 0);

    g.rule("AnyNodeName", &[n("AnyIdentifier")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::ObjectRef(ObjectRef::new(name, span)))
    });

    g.rule("ShortNodeName", &[n("Identifier")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::ObjectRef(ObjectRef::new(name, span)))
    });

    g.inline("PathNodeName", &[n("PtrName")], 0);

    g.inline("PathStepName", &[n("PtrIdentifier")], 0);
    g.rule("PathStepName", &[kw(K::DunderType)], |_, _| {
        Ok(StackValue::Str("__type__".to_string()))
    });
}

/// Splits a `module::…::name` pair into an object reference.
fn split_qualified(head: &str, tail: &str, span: Span) -> ObjectRef {
    let full = format!("{head}::{tail}");
    let (module, name) = match full.rfind("::") {
        Some(at) => (Some(full[..at].to_string()), full[at + 2..].to_string()),
        None => (None, full),
    };
    ObjectRef {
        module,
        name,
        span: span.into(),
    }
}

fn semicolons(g: &mut GrammarBuilder) {
    g.rule("Semicolons", &[t(T::Semicolon)], |_, _| Ok(StackValue::Empty));
    g.rule(
        "Semicolons",
        &[n("Semicolons"), t(T::Semicolon)],
        |_, _| Ok(StackValue::Empty),
    );
    g.rule("OptSemicolons", &[], |_, _| Ok(StackValue::Empty));
    g.rule("OptSemicolons", &[n("Semicolons")], |_, _| Ok(StackValue::Empty));
}

fn clauses(g: &mut GrammarBuilder) {
    g.list("TypeNameList", n("FullTypeExpr"), Some(t(T::Comma)));

    g.inline("Extending", &[kw(K::Extending), n("TypeNameList")], 1);
    g.rule("OptExtending", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.inline("OptExtending", &[n("Extending")], 0);

    g.inline(
        "OnExpr",
        &[kw(K::On), t(T::OpenParen), n("Expr"), t(T::CloseParen)],
        2,
    );
    g.rule("OptOnExpr", &[], |_, _| Ok(StackValue::Empty));
    g.inline("OptOnExpr", &[n("OnExpr")], 0);

    g.inline(
        "ExceptExpr",
        &[kw(K::Except), t(T::OpenParen), n("Expr"), t(T::CloseParen)],
        2,
    );
    g.rule("OptExceptExpr", &[], |_, _| Ok(StackValue::Empty));
    g.inline("OptExceptExpr", &[n("ExceptExpr")], 0);

    g.rule("OptDefault", &[], |_, _| Ok(StackValue::Empty));
    g.inline("OptDefault", &[t(T::Equals), n("Expr")], 1);

    // Pointer qualifiers, spelled out so no empty prefix is needed.
    for (rhs, required, cardinality) in [
        (vec![kw(K::Required)], Some(true), None),
        (vec![kw(K::Optional)], Some(false), None),
        (vec![kw(K::Multi)], None, Some(SchemaCardinality::Multi)),
        (vec![kw(K::Single)], None, Some(SchemaCardinality::Single)),
        (
            vec![kw(K::Required), kw(K::Multi)],
            Some(true),
            Some(SchemaCardinality::Multi),
        ),
        (
            vec![kw(K::Required), kw(K::Single)],
            Some(true),
            Some(SchemaCardinality::Single),
        ),
        (
            vec![kw(K::Optional), kw(K::Multi)],
            Some(false),
            Some(SchemaCardinality::Multi),
        ),
        (
            vec![kw(K::Optional), kw(K::Single)],
            Some(false),
            Some(SchemaCardinality::Single),
        ),
    ] {
        let _ = (required, cardinality);
        g.rule("PtrQuals", &rhs, |_, args| {
            let mut required = None;
            let mut cardinality = None;
            for value in args {
                let token = value.into_token();
                match token.text.to_lowercase().as_str() {
                    "required" => required = Some(true),
                    "optional" => required = Some(false),
                    "multi" => cardinality = Some(SchemaCardinality::Multi),
                    "single" => cardinality = Some(SchemaCardinality::Single),
                    other => panic!("not a pointer qualifier: {other}"),
                }
            }
            Ok(StackValue::PointerQuals {
                required,
                cardinality,
            })
        });
    }

    g.rule("OptVersion", &[], |_, _| Ok(StackValue::Empty));
    g.rule(
        "OptVersion",
        &[kw(K::Version), t(T::StringConst)],
        |_, mut args| {
            let token = args.remove(1).into_token();
            let version = match token.value {
                Some(Value::Str(s)) => s,
                _ => token.text,
            };
            Ok(StackValue::Str(version))
        },
    );
}

fn parameters(g: &mut GrammarBuilder) {
    g.rule("OptParameterKind", &[], |_, _| {
        Ok(StackValue::ParameterKind(ParameterKind::Positional))
    });
    g.rule("OptParameterKind", &[kw(K::Variadic)], |_, _| {
        Ok(StackValue::ParameterKind(ParameterKind::Variadic))
    });
    g.rule("OptParameterKind", &[t(T::NamedOnly)], |_, _| {
        Ok(StackValue::ParameterKind(ParameterKind::NamedOnly))
    });

    g.inline("FuncDeclArgName", &[n("Identifier")], 0);
    g.rule("FuncDeclArgName", &[t(T::Parameter)], |span, mut args| {
        let token = args.remove(0).into_token();
        let name = token.text.trim_start_matches('$');
        if name.chars().all(|c| c.is_ascii_digit()) {
            Err(Diagnostic::error(
                "numeric parameters are not supported",
                span,
            ))
        } else {
            Err(Diagnostic::error(
                format!(
                    "function parameters do not need a $ prefix, rewrite as '{name}'"
                ),
                span,
            ))
        }
    });

    g.rule(
        "FuncDeclArg",
        &[
            n("OptParameterKind"),
            n("FuncDeclArgName"),
            t(T::Colon),
            n("OptTypeQualifier"),
            n("FullTypeExpr"),
            n("OptDefault"),
        ],
        |span, mut args| {
            let default = args.remove(5).into_opt_expr();
            let ty = args.remove(4).into_type_expr();
            let typemod = match args.remove(3) {
                StackValue::TypeModifier(m) => m,
                other => panic!("expected type modifier, found {other:?}"),
            };
            let name = args.remove(1).into_str();
            let kind = match args.remove(0) {
                StackValue::ParameterKind(k) => k,
                other => panic!("expected parameter kind, found {other:?}"),
            };
            Ok(StackValue::FuncParam(FuncParam {
                kind,
                name,
                typemod,
                ty,
                default: default.map(Box::new),
                span: span.into(),
            }))
        },
    );
    g.rule(
        "FuncDeclArg",
        &[n("OptParameterKind"), n("FuncDeclArgName"), n("OptDefault")],
        |span, mut args| {
            let name = args.remove(1).into_str();
            Err(Diagnostic::error(
                format!("missing type declaration for the `{name}` parameter"),
                span,
            ))
        },
    );
    g.list("FuncDeclArgList", n("FuncDeclArg"), Some(t(T::Comma)));

    g.rule(
        "CreateFunctionArgs",
        &[t(T::OpenParen), t(T::CloseParen)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.rule(
        "CreateFunctionArgs",
        &[t(T::OpenParen), n("FuncDeclArgList"), t(T::CloseParen)],
        |_, mut args| {
            let params = args.remove(1);
            validate_params(&params)?;
            Ok(params)
        },
    );

    g.rule("OptTypeQualifier", &[], |_, _| {
        Ok(StackValue::TypeModifier(TypeModifier::Singleton))
    });
    g.rule("OptTypeQualifier", &[kw(K::Set), kw(K::Of)], |_, _| {
        Ok(StackValue::TypeModifier(TypeModifier::SetOf))
    });
    g.rule("OptTypeQualifier", &[kw(K::Optional)], |_, _| {
        Ok(StackValue::TypeModifier(TypeModifier::Optional))
    });
}

/// Enforces the declaration-order rules of a parameter list.
fn validate_params(list: &StackValue) -> Result<(), Diagnostic> {
    let StackValue::List(items) = list else {
        panic!("expected parameter list, found {list:?}");
    };

    let mut names: Vec<&str> = Vec::new();
    let mut last_pos_default: Option<&FuncParam> = None;
    let mut last_named: Option<&FuncParam> = None;
    let mut variadic: Option<&FuncParam> = None;

    for item in items {
        let StackValue::FuncParam(param) = item else {
            panic!("expected parameter, found {item:?}");
        };

        if names.contains(&param.name.as_str()) {
            return Err(Diagnostic::error(
                format!("duplicate parameter name `{}`", param.name),
                param.span.0,
            ));
        }
        names.push(&param.name);

        match param.kind {
            ParameterKind::Variadic => {
                if variadic.is_some() {
                    return Err(Diagnostic::error(
                        "more than one variadic argument",
                        param.span.0,
                    ));
                }
                if let Some(named) = last_named {
                    return Err(Diagnostic::error(
                        format!(
                            "NAMED ONLY argument `{}` before VARIADIC argument `{}`",
                            named.name, param.name
                        ),
                        named.span.0,
                    ));
                }
                if param.default.is_some() {
                    return Err(Diagnostic::error(
                        format!(
                            "VARIADIC argument `{}` cannot have a default value",
                            param.name
                        ),
                        param.span.0,
                    ));
                }
                variadic = Some(param);
            }
            ParameterKind::NamedOnly => last_named = Some(param),
            ParameterKind::Positional => {
                if let Some(named) = last_named {
                    return Err(Diagnostic::error(
                        format!(
                            "positional argument `{}` follows NAMED ONLY argument `{}`",
                            param.name, named.name
                        ),
                        param.span.0,
                    ));
                }
                if let Some(variadic) = variadic {
                    return Err(Diagnostic::error(
                        format!(
                            "positional argument `{}` follows VARIADIC argument `{}`",
                            param.name, variadic.name
                        ),
                        param.span.0,
                    ));
                }
                match (&param.default, last_pos_default) {
                    (None, Some(with_default)) => {
                        return Err(Diagnostic::error(
                            format!(
                                "positional argument `{}` without default follows positional \
                                 argument `{}` with default",
                                param.name, with_default.name
                            ),
                            param.span.0,
                        ));
                    }
                    (Some(_), _) => last_pos_default = Some(param),
                    (None, None) => {}
                }
            }
        }
    }

    Ok(())
}

fn bodies(g: &mut GrammarBuilder) {
    // Function, operator, and cast implementations.
    g.rule(
        "FromFunction",
        &[kw(K::Using), t(T::OpenParen), n("Expr"), t(T::CloseParen)],
        |_, mut args| {
            let expr = args.remove(2).into_expr();
            Ok(StackValue::FunctionCode(FunctionCode {
                from_expr: Some(Box::new(expr)),
                ..Default::default()
            }))
        },
    );
    g.rule(
        "FromFunction",
        &[kw(K::Using), n("Identifier"), t(T::StringConst)],
        |span, mut args| {
            let token = args.remove(2).into_token();
            let language = parse_language(&args.remove(1).into_str(), span)?;
            let code = match token.value {
                Some(Value::Str(s)) => s,
                _ => token.text,
            };
            Ok(StackValue::FunctionCode(FunctionCode {
                language: Some(language),
                code: Some(code),
                ..Default::default()
            }))
        },
    );
    g.rule(
        "FromFunction",
        &[
            kw(K::Using),
            n("Identifier"),
            kw(K::Function),
            t(T::StringConst),
        ],
        |span, mut args| {
            let token = args.remove(3).into_token();
            let language = parse_language(&args.remove(1).into_str(), span)?;
            let name = match token.value {
                Some(Value::Str(s)) => s,
                _ => token.text,
            };
            Ok(StackValue::FunctionCode(FunctionCode {
                language: Some(language),
                from_function: Some(name),
                ..Default::default()
            }))
        },
    );
}

/// Parses an implementation language name.
fn parse_language(name: &str, span: Span) -> Result<Language, Diagnostic> {
    match name.to_lowercase().as_str() {
        "sql" => Ok(Language::Sql),
        "tql" => Ok(Language::Tql),
        other => Err(Diagnostic::error(
            format!("{other} is not a valid language"),
            span,
        )),
    }
}
