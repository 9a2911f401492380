//! Schema definition language productions.

use tql_ast::ddl::DdlCommand;
use tql_ast::ddl::FunctionCode;
use tql_ast::qltypes::LinkSourceDeleteAction;
use tql_ast::qltypes::LinkTargetDeleteAction;
use tql_ast::sdl::AliasDeclaration;
use tql_ast::sdl::AnnotationDeclaration;
use tql_ast::sdl::AnnotationValue;
use tql_ast::sdl::ConcreteConstraintDeclaration;
use tql_ast::sdl::ConcretePointerDeclaration;
use tql_ast::sdl::ConstraintDeclaration;
use tql_ast::sdl::ExtensionRequirement;
use tql_ast::sdl::FunctionDeclaration;
use tql_ast::sdl::IndexDeclaration;
use tql_ast::sdl::ModuleDeclaration;
use tql_ast::sdl::ObjectTypeDeclaration;
use tql_ast::sdl::PointerDeclaration;
use tql_ast::sdl::PointerKind;
use tql_ast::sdl::ScalarTypeDeclaration;
use tql_ast::sdl::Schema;
use tql_ast::sdl::SdlDeclaration;
use tql_ast::sdl::SdlMember;
use tql_ast::sdl::SdlSetField;
use tql_ast::span::Span;

use super::kw;
use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use crate::keywords::Keyword as K;
use crate::token::TokenKind as T;

/// Converts collected function-body items into SDL members and a code
/// value.
fn sdl_function_body(value: StackValue, span: Span) -> (FunctionCode, Vec<SdlMember>) {
    let mut code = FunctionCode::default();
    let mut members = Vec::new();
    for item in value.into_list() {
        match item {
            StackValue::FunctionCode(part) => {
                if part.from_expr.is_some() {
                    code.from_expr = part.from_expr;
                } else {
                    code.language = part.language.or(code.language);
                    code.code = part.code.or(code.code.take());
                    code.from_function = part.from_function.or(code.from_function.take());
                }
            }
            StackValue::Ddl(DdlCommand::SetField(field)) => {
                members.push(SdlMember::Field(SdlSetField {
                    name: field.name,
                    value: field.value,
                    span: field.span,
                }));
            }
            StackValue::Ddl(DdlCommand::SetAnnotationValue(value)) => {
                members.push(SdlMember::AnnotationValue(AnnotationValue {
                    name: value.name,
                    value: value.value,
                    span: value.span,
                }));
            }
            StackValue::Str(_) => {}
            other => panic!("unexpected function body item: {other:?}"),
        }
    }
    let _ = span;
    (code, members)
}

/// Registers the SDL productions.
pub fn register(g: &mut GrammarBuilder) {
    document(g);
    declarations(g);
    members(g);
    pointers(g);
}

fn document(g: &mut GrammarBuilder) {
    g.rule("SDLDocument", &[n("OptSemicolons")], |span, _| {
        Ok(StackValue::Schema(Schema {
            declarations: Vec::new(),
            span: span.into(),
        }))
    });
    g.rule(
        "SDLDocument",
        &[n("OptSemicolons"), n("SdlStatementList"), n("OptSemicolons")],
        |span, mut args| {
            let declarations = args.remove(1).into_sdl_declarations();
            Ok(StackValue::Schema(Schema {
                declarations,
                span: span.into(),
            }))
        },
    );

    // Statements separate with semicolon runs; block-shaped statements
    // may also simply abut.
    g.list("SdlStatementList", n("SDLStatement"), Some(n("OptSemicolons")));

    // A brace-enclosed schema body, as used by `START MIGRATION TO`.
    g.rule(
        "SdlBraceBlock",
        &[t(T::OpenBrace), n("OptSemicolons"), t(T::CloseBrace)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.inline(
        "SdlBraceBlock",
        &[
            t(T::OpenBrace),
            n("OptSemicolons"),
            n("SdlStatementList"),
            n("OptSemicolons"),
            t(T::CloseBrace),
        ],
        2,
    );
}

fn declarations(g: &mut GrammarBuilder) {
    for decl in [
        "ModuleDeclaration",
        "ScalarTypeDeclaration",
        "ObjectTypeDeclaration",
        "AliasDeclaration",
        "LinkDeclaration",
        "PropertyDeclaration",
        "ConstraintDeclaration",
        "AnnotationDeclaration",
        "FunctionDeclaration",
        "ExtensionRequirementDeclaration",
    ] {
        g.inline("SDLStatement", &[n(decl)], 0);
    }

    g.rule(
        "ModuleDeclaration",
        &[kw(K::Module), n("DotName"), n("SdlDeclBlock")],
        |span, mut args| {
            let declarations = args.remove(2).into_sdl_declarations();
            let name = args.remove(1).into_str();
            Ok(StackValue::SdlDeclaration(SdlDeclaration::Module(
                ModuleDeclaration {
                    name,
                    declarations,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "SdlDeclBlock",
        &[t(T::OpenBrace), n("OptSemicolons"), t(T::CloseBrace)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.inline(
        "SdlDeclBlock",
        &[
            t(T::OpenBrace),
            n("OptSemicolons"),
            n("SdlStatementList"),
            n("OptSemicolons"),
            t(T::CloseBrace),
        ],
        2,
    );

    g.rule(
        "ScalarTypeDeclaration",
        &[
            kw(K::Scalar),
            kw(K::Type),
            n("ShortNodeName"),
            n("OptExtending"),
            n("OptSdlMemberBlock"),
        ],
        scalar_declaration,
    );
    g.rule(
        "ScalarTypeDeclaration",
        &[
            kw(K::Abstract),
            kw(K::Scalar),
            kw(K::Type),
            n("ShortNodeName"),
            n("OptExtending"),
            n("OptSdlMemberBlock"),
        ],
        scalar_declaration,
    );

    fn scalar_declaration(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let members = args.pop().expect("members").into_sdl_members();
        let extending = args.pop().expect("bases").into_type_exprs();
        let name = args.pop().expect("name").into_object_ref();
        let abstract_ = args.len() == 3;
        Ok(StackValue::SdlDeclaration(SdlDeclaration::ScalarType(
            ScalarTypeDeclaration {
                name,
                abstract_,
                extending,
                members,
                span: span.into(),
            },
        )))
    }

    g.rule(
        "ObjectTypeDeclaration",
        &[
            kw(K::Type),
            n("ShortNodeName"),
            n("OptExtending"),
            n("OptSdlMemberBlock"),
        ],
        object_declaration,
    );
    g.rule(
        "ObjectTypeDeclaration",
        &[
            kw(K::Abstract),
            kw(K::Type),
            n("ShortNodeName"),
            n("OptExtending"),
            n("OptSdlMemberBlock"),
        ],
        object_declaration,
    );

    fn object_declaration(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let members = args.pop().expect("members").into_sdl_members();
        let extending = args.pop().expect("bases").into_type_exprs();
        let name = args.pop().expect("name").into_object_ref();
        let abstract_ = args.len() == 2;
        Ok(StackValue::SdlDeclaration(SdlDeclaration::ObjectType(
            ObjectTypeDeclaration {
                name,
                abstract_,
                extending,
                members,
                span: span.into(),
            },
        )))
    }

    g.rule(
        "AliasDeclaration",
        &[kw(K::Alias), n("ShortNodeName"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let value = args.remove(3).into_expr();
            let name = args.remove(1).into_object_ref();
            Ok(StackValue::SdlDeclaration(SdlDeclaration::Alias(
                AliasDeclaration {
                    name,
                    value: Box::new(value),
                    span: span.into(),
                },
            )))
        },
    );

    for (keyword, link) in [(K::Link, true), (K::Property, false)] {
        let reduce: super::ReduceFn = if link {
            |span, args| abstract_pointer_declaration(span, args, PointerKind::Link)
        } else {
            |span, args| abstract_pointer_declaration(span, args, PointerKind::Property)
        };
        g.rule(
            if link { "LinkDeclaration" } else { "PropertyDeclaration" },
            &[
                kw(K::Abstract),
                kw(keyword),
                n("ShortNodeName"),
                n("OptExtending"),
                n("OptSdlMemberBlock"),
            ],
            reduce,
        );
    }

    fn abstract_pointer_declaration(
        span: Span,
        mut args: Vec<StackValue>,
        kind: PointerKind,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let members = args.remove(4).into_sdl_members();
        let extending = args.remove(3).into_type_exprs();
        let name = args.remove(2).into_object_ref();
        let declaration = PointerDeclaration {
            kind,
            name,
            extending,
            members,
            span: span.into(),
        };
        Ok(StackValue::SdlDeclaration(match kind {
            PointerKind::Link => SdlDeclaration::Link(declaration),
            PointerKind::Property => SdlDeclaration::Property(declaration),
        }))
    }

    g.rule(
        "ConstraintDeclaration",
        &[
            kw(K::Abstract),
            kw(K::Constraint),
            n("ShortNodeName"),
            n("OptCreateFunctionArgs"),
            n("OptOnExpr"),
            n("OptExtending"),
            n("OptSdlMemberBlock"),
        ],
        |span, mut args| {
            let members = args.remove(6).into_sdl_members();
            let extending = args.remove(5).into_type_exprs();
            let on = args.remove(4).into_opt_expr();
            let params = args.remove(3).into_func_params();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::SdlDeclaration(SdlDeclaration::Constraint(
                ConstraintDeclaration {
                    name,
                    params,
                    on: on.map(Box::new),
                    extending,
                    members,
                    span: span.into(),
                },
            )))
        },
    );

    g.rule(
        "AnnotationDeclaration",
        &[kw(K::Abstract), kw(K::Annotation), n("ShortNodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::SdlDeclaration(SdlDeclaration::Annotation(
                AnnotationDeclaration {
                    name,
                    inheritable: false,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "AnnotationDeclaration",
        &[
            kw(K::Abstract),
            kw(K::Inheritable),
            kw(K::Annotation),
            n("ShortNodeName"),
        ],
        |span, mut args| {
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::SdlDeclaration(SdlDeclaration::Annotation(
                AnnotationDeclaration {
                    name,
                    inheritable: true,
                    span: span.into(),
                },
            )))
        },
    );

    g.rule(
        "FunctionDeclaration",
        &[
            kw(K::Function),
            n("NodeName"),
            n("CreateFunctionArgs"),
            t(T::Arrow),
            n("OptTypeQualifier"),
            n("FullTypeExpr"),
            n("SdlFunctionBody"),
        ],
        |span, mut args| {
            let body = args.remove(6);
            let returning = args.remove(5).into_type_expr();
            let returning_typemod = match args.remove(4) {
                StackValue::TypeModifier(m) => m,
                other => panic!("expected type modifier, found {other:?}"),
            };
            let params = args.remove(2).into_func_params();
            let name = args.remove(1).into_object_ref();

            let (code, members) = match body {
                StackValue::FunctionCode(code) => (code, Vec::new()),
                list => sdl_function_body(list, span),
            };

            Ok(StackValue::SdlDeclaration(SdlDeclaration::Function(
                FunctionDeclaration {
                    name,
                    params,
                    returning,
                    returning_typemod,
                    code,
                    members,
                    span: span.into(),
                },
            )))
        },
    );
    g.inline("SdlFunctionBody", &[n("FunctionBodyBlock")], 0);
    g.inline("SdlFunctionBody", &[n("FromFunction")], 0);

    g.rule(
        "ExtensionRequirementDeclaration",
        &[
            kw(K::Using),
            kw(K::Extension),
            n("ShortNodeName"),
            n("OptVersion"),
        ],
        |span, mut args| {
            let version = args.remove(3).into_opt_str();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::SdlDeclaration(
                SdlDeclaration::ExtensionRequirement(ExtensionRequirement {
                    name,
                    version,
                    span: span.into(),
                }),
            ))
        },
    );
}

fn members(g: &mut GrammarBuilder) {
    g.rule(
        "SdlMemberBlock",
        &[t(T::OpenBrace), n("OptSemicolons"), t(T::CloseBrace)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.inline(
        "SdlMemberBlock",
        &[
            t(T::OpenBrace),
            n("OptSemicolons"),
            n("SdlMemberList"),
            n("OptSemicolons"),
            t(T::CloseBrace),
        ],
        2,
    );
    g.list("SdlMemberList", n("SdlMember"), Some(n("OptSemicolons")));

    g.rule("OptSdlMemberBlock", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.inline("OptSdlMemberBlock", &[n("SdlMemberBlock")], 0);

    // Concrete constraints.
    g.rule(
        "SdlMember",
        &[
            kw(K::Constraint),
            n("NodeName"),
            n("OptConstraintArgs"),
            n("OptOnExpr"),
            n("OptExceptExpr"),
            n("OptSdlMemberBlock"),
        ],
        sdl_constraint,
    );
    g.rule(
        "SdlMember",
        &[
            kw(K::Delegated),
            kw(K::Constraint),
            n("NodeName"),
            n("OptConstraintArgs"),
            n("OptOnExpr"),
            n("OptExceptExpr"),
            n("OptSdlMemberBlock"),
        ],
        sdl_constraint,
    );

    fn sdl_constraint(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let members = args.pop().expect("members").into_sdl_members();
        let except = args.pop().expect("except").into_opt_expr();
        let on = args.pop().expect("on").into_opt_expr();
        let constraint_args = args.pop().expect("args").into_exprs();
        let name = args.pop().expect("name").into_object_ref();
        let delegated = args.len() == 2;
        Ok(StackValue::SdlMember(SdlMember::Constraint(
            ConcreteConstraintDeclaration {
                name,
                args: constraint_args,
                on: on.map(Box::new),
                except: except.map(Box::new),
                delegated,
                members,
                span: span.into(),
            },
        )))
    }

    // Indexes.
    g.rule(
        "SdlMember",
        &[
            kw(K::Index),
            n("OnExpr"),
            n("OptExceptExpr"),
            n("OptSdlMemberBlock"),
        ],
        |span, mut args| {
            let members = args.remove(3).into_sdl_members();
            let except = args.remove(2).into_opt_expr();
            let expr = args.remove(1).into_expr();
            Ok(StackValue::SdlMember(SdlMember::Index(IndexDeclaration {
                expr: Box::new(expr),
                except: except.map(Box::new),
                members,
                span: span.into(),
            })))
        },
    );

    // Annotation values.
    g.rule(
        "SdlMember",
        &[kw(K::Annotation), n("NodeName"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let value = args.remove(3).into_expr();
            let name = args.remove(1).into_object_ref();
            Ok(StackValue::SdlMember(SdlMember::AnnotationValue(
                AnnotationValue {
                    name,
                    value: Box::new(value),
                    span: span.into(),
                },
            )))
        },
    );

    // `field := value` settings (also bare computed pointers; context
    // decides which, and that is the resolver's call).
    g.rule(
        "SdlMember",
        &[n("PathStepName"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let value = args.remove(2).into_expr();
            let name = args.remove(0).into_str();
            Ok(StackValue::SdlMember(SdlMember::Field(SdlSetField {
                name,
                value: Box::new(value),
                span: span.into(),
            })))
        },
    );

    // Deletion policies.
    g.rule(
        "SdlMember",
        &[kw(K::On), kw(K::Target), kw(K::Delete), kw(K::Restrict)],
        |span, _| {
            Ok(StackValue::SdlMember(SdlMember::OnTargetDelete(
                LinkTargetDeleteAction::Restrict,
                span.into(),
            )))
        },
    );
    g.rule(
        "SdlMember",
        &[kw(K::On), kw(K::Target), kw(K::Delete), kw(K::Allow)],
        |span, _| {
            Ok(StackValue::SdlMember(SdlMember::OnTargetDelete(
                LinkTargetDeleteAction::Allow,
                span.into(),
            )))
        },
    );
    g.rule(
        "SdlMember",
        &[
            kw(K::On),
            kw(K::Target),
            kw(K::Delete),
            kw(K::Delete),
            kw(K::Source),
        ],
        |span, _| {
            Ok(StackValue::SdlMember(SdlMember::OnTargetDelete(
                LinkTargetDeleteAction::DeleteSource,
                span.into(),
            )))
        },
    );
    g.rule(
        "SdlMember",
        &[
            kw(K::On),
            kw(K::Target),
            kw(K::Delete),
            kw(K::Deferred),
            kw(K::Restrict),
        ],
        |span, _| {
            Ok(StackValue::SdlMember(SdlMember::OnTargetDelete(
                LinkTargetDeleteAction::DeferredRestrict,
                span.into(),
            )))
        },
    );
    g.rule(
        "SdlMember",
        &[
            kw(K::On),
            kw(K::Source),
            kw(K::Delete),
            kw(K::Delete),
            kw(K::Target),
        ],
        |span, _| {
            Ok(StackValue::SdlMember(SdlMember::OnSourceDelete(
                LinkSourceDeleteAction::DeleteTarget,
                span.into(),
            )))
        },
    );
    g.rule(
        "SdlMember",
        &[kw(K::On), kw(K::Source), kw(K::Delete), kw(K::Allow)],
        |span, _| {
            Ok(StackValue::SdlMember(SdlMember::OnSourceDelete(
                LinkSourceDeleteAction::Allow,
                span.into(),
            )))
        },
    );
}

fn pointers(g: &mut GrammarBuilder) {
    // Keyworded concrete pointers, with overloaded/qualifier spellings
    // written out so the parser commits only on real tokens.
    for link in [true, false] {
        let keyword = if link { K::Link } else { K::Property };
        let reduce: super::ReduceFn = if link {
            |span, args| concrete_pointer(span, args, PointerKind::Link)
        } else {
            |span, args| concrete_pointer(span, args, PointerKind::Property)
        };

        for overloaded in [false, true] {
            for quals in [false, true] {
                for extending in [false, true] {
                    let mut rhs: Vec<super::Symbol> = Vec::new();
                    if overloaded {
                        rhs.push(kw(K::Overloaded));
                    }
                    if quals {
                        rhs.push(n("PtrQuals"));
                    }
                    rhs.push(kw(keyword));
                    rhs.push(n("PtrNodeName"));
                    if extending {
                        rhs.push(kw(K::Extending));
                        rhs.push(n("TypeNameList"));
                    }
                    rhs.push(n("SdlPointerTail"));
                    g.rule(
                        if link {
                            "SdlConcreteLink"
                        } else {
                            "SdlConcreteProperty"
                        },
                        &rhs,
                        reduce,
                    );
                }
            }
        }
    }
    g.inline("SdlMember", &[n("SdlConcreteLink")], 0);
    g.inline("SdlMember", &[n("SdlConcreteProperty")], 0);

    // Bare pointers: `name: type { … }` and qualified computed forms.
    g.rule(
        "SdlMember",
        &[
            n("PathStepName"),
            t(T::Colon),
            n("FullTypeExpr"),
            n("OptSdlMemberBlock"),
        ],
        bare_pointer,
    );
    g.rule(
        "SdlMember",
        &[
            n("PtrQuals"),
            n("PathStepName"),
            t(T::Colon),
            n("FullTypeExpr"),
            n("OptSdlMemberBlock"),
        ],
        bare_pointer,
    );
    g.rule(
        "SdlMember",
        &[n("PtrQuals"), n("PathStepName"), t(T::Assign), n("Expr")],
        bare_pointer,
    );

    fn bare_pointer(
        span: Span,
        args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let mut declaration = empty_pointer(PointerKind::Property, span);
        for value in args {
            apply_pointer_part(&mut declaration, value, span);
        }
        Ok(StackValue::SdlMember(SdlMember::Pointer(declaration)))
    }

    fn concrete_pointer(
        span: Span,
        args: Vec<StackValue>,
        kind: PointerKind,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let mut declaration = empty_pointer(kind, span);
        for value in args {
            apply_pointer_part(&mut declaration, value, span);
        }
        Ok(StackValue::SdlMember(SdlMember::Pointer(declaration)))
    }

    fn empty_pointer(kind: PointerKind, span: Span) -> ConcretePointerDeclaration {
        ConcretePointerDeclaration {
            kind,
            name: tql_ast::expr::ObjectRef::new(String::new(), span),
            required: None,
            cardinality: None,
            overloaded: false,
            extending: Vec::new(),
            target: None,
            computed: None,
            members: Vec::new(),
            span: span.into(),
        }
    }

    fn apply_pointer_part(
        declaration: &mut ConcretePointerDeclaration,
        value: StackValue,
        span: Span,
    ) {
        match value {
            StackValue::Token(token) => {
                if token.text.eq_ignore_ascii_case("overloaded") {
                    declaration.overloaded = true;
                }
            }
            StackValue::PointerQuals {
                required,
                cardinality,
            } => {
                declaration.required = required;
                declaration.cardinality = cardinality;
            }
            StackValue::ObjectRef(name) => declaration.name = name,
            StackValue::Str(name) => {
                declaration.name = tql_ast::expr::ObjectRef::new(name, span);
            }
            StackValue::TypeExpr(ty) => declaration.target = Some(ty),
            StackValue::Expr(expr) => declaration.computed = Some(Box::new(expr)),
            StackValue::PointerTarget(target) => match target {
                tql_ast::ddl::PointerTarget::Type(ty) => declaration.target = Some(ty),
                tql_ast::ddl::PointerTarget::Computed(expr) => {
                    declaration.computed = Some(expr)
                }
            },
            StackValue::List(items) => {
                let mut types = Vec::new();
                let mut members = Vec::new();
                for item in items {
                    match item {
                        StackValue::TypeExpr(ty) => types.push(ty),
                        StackValue::SdlMember(member) => members.push(member),
                        StackValue::PointerTarget(tql_ast::ddl::PointerTarget::Type(ty)) => {
                            declaration.target = Some(ty)
                        }
                        other => panic!("unexpected pointer part: {other:?}"),
                    }
                }
                if !types.is_empty() {
                    declaration.extending = types;
                }
                if !members.is_empty() {
                    declaration.members = members;
                }
            }
            StackValue::Empty => {}
            other => panic!("unexpected pointer part: {other:?}"),
        }
    }

    // The tail of a pointer declaration: a typed target (old arrow or
    // new colon form) with an optional body, a computed expression, or
    // a bare body.
    g.rule(
        "SdlPointerTail",
        &[t(T::Colon), n("FullTypeExpr"), n("OptSdlMemberBlock")],
        pointer_tail_typed,
    );
    g.rule(
        "SdlPointerTail",
        &[t(T::Arrow), n("FullTypeExpr"), n("OptSdlMemberBlock")],
        pointer_tail_typed,
    );
    g.rule("SdlPointerTail", &[t(T::Assign), n("Expr")], |_, mut args| {
        Ok(StackValue::Expr(args.remove(1).into_expr()))
    });
    g.inline("SdlPointerTail", &[n("SdlMemberBlock")], 0);

    fn pointer_tail_typed(
        _: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let members = args.remove(2).into_list();
        let ty = args.remove(1).into_type_expr();
        let mut out = vec![StackValue::PointerTarget(
            tql_ast::ddl::PointerTarget::Type(ty),
        )];
        out.extend(members);
        Ok(StackValue::List(out))
    }
}
