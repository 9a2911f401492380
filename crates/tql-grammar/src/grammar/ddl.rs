//! Data definition productions.
//!
//! Commands that carry nested blocks share one generic `CommandsBlock`;
//! which subcommands make sense inside which object is the resolver's
//! concern, not the parser's. The pieces with their own body grammars
//! (functions, casts, migrations) get dedicated block nonterminals.

use tql_ast::ddl::AlterCast;
use tql_ast::ddl::AlterConcreteConstraint;
use tql_ast::ddl::AlterFunction;
use tql_ast::ddl::AlterIndex;
use tql_ast::ddl::AlterObject;
use tql_ast::ddl::AlterOperator;
use tql_ast::ddl::CreateAlias;
use tql_ast::ddl::CreateAnnotation;
use tql_ast::ddl::CreateCast;
use tql_ast::ddl::CreateConcreteConstraint;
use tql_ast::ddl::CreateConcretePointer;
use tql_ast::ddl::CreateConstraint;
use tql_ast::ddl::CreateDatabase;
use tql_ast::ddl::CreateExtension;
use tql_ast::ddl::CreateExtensionPackage;
use tql_ast::ddl::CreateFunction;
use tql_ast::ddl::CreateIndex;
use tql_ast::ddl::CreateMigration;
use tql_ast::ddl::CreateModule;
use tql_ast::ddl::CreateObjectType;
use tql_ast::ddl::CreateOperator;
use tql_ast::ddl::CreatePointer;
use tql_ast::ddl::CreateRole;
use tql_ast::ddl::CreateScalarType;
use tql_ast::ddl::DdlBlock;
use tql_ast::ddl::DdlCommand;
use tql_ast::ddl::DropAnnotationValue;
use tql_ast::ddl::DropObject;
use tql_ast::ddl::FunctionCode;
use tql_ast::ddl::InheritPosition;
use tql_ast::ddl::MigrationCommand;
use tql_ast::ddl::OnSourceDelete;
use tql_ast::ddl::OnTargetDelete;
use tql_ast::ddl::PointerTarget;
use tql_ast::ddl::Rename;
use tql_ast::ddl::ResetField;
use tql_ast::ddl::SetAnnotationValue;
use tql_ast::ddl::SetField;
use tql_ast::ddl::SetPointerCardinality;
use tql_ast::ddl::SetPointerOptionality;
use tql_ast::ddl::SetPointerType;
use tql_ast::ddl::SetUsing;
use tql_ast::ddl::StartMigration;
use tql_ast::ddl::AlterAddInherit;
use tql_ast::ddl::AlterDropInherit;
use tql_ast::expr::Constant;
use tql_ast::expr::ConstantKind;
use tql_ast::expr::Expr;
use tql_ast::qltypes::LinkSourceDeleteAction;
use tql_ast::qltypes::LinkTargetDeleteAction;
use tql_ast::qltypes::OperatorKind;
use tql_ast::qltypes::SchemaCardinality;
use tql_ast::sdl::Schema;
use tql_ast::span::Span;

use super::kw;
use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use crate::keywords::Keyword as K;
use crate::token::TokenKind as T;

/// Unwraps a function-body item list into its code and subcommands.
fn function_body(value: StackValue, span: Span) -> (FunctionCode, Vec<DdlCommand>) {
    let mut code = FunctionCode::default();
    let mut commands = Vec::new();
    let mut allow_implicit = false;
    let mut allow_assignment = false;
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
            StackValue::Str(flag) if flag == "implicit" => allow_implicit = true,
            StackValue::Str(flag) if flag == "assignment" => allow_assignment = true,
            StackValue::Ddl(command) => commands.push(command),
            other => panic!("unexpected body item: {other:?}"),
        }
    }
    // The allow flags only matter for casts; they ride along as
    // synthetic set-fields elsewhere.
    if allow_implicit {
        commands.push(DdlCommand::SetField(SetField {
            name: "allow_implicit".to_string(),
            value: Box::new(bool_const(span)),
            span: span.into(),
        }));
    }
    if allow_assignment {
        commands.push(DdlCommand::SetField(SetField {
            name: "allow_assignment".to_string(),
            value: Box::new(bool_const(span)),
            span: span.into(),
        }));
    }
    (code, commands)
}

fn bool_const(span: Span) -> Expr {
    Expr::Constant(Constant {
        kind: ConstantKind::Boolean,
        value: "true".to_string(),
        span: span.into(),
    })
}

/// Registers the DDL productions.
pub fn register(g: &mut GrammarBuilder) {
    dispatch(g);
    blocks(g);
    subcommands(g);
    databases_roles_modules(g);
    types(g);
    pointers(g);
    constraints_indexes(g);
    functions_operators_casts(g);
    annotations_aliases(g);
    extensions(g);
    migrations(g);
}

fn dispatch(g: &mut GrammarBuilder) {
    for stmt in [
        "CreateDatabaseStmt",
        "DropDatabaseStmt",
        "CreateRoleStmt",
        "AlterRoleStmt",
        "DropRoleStmt",
        "MigrationStmt",
        "InnerDDLStmt",
    ] {
        g.inline("DDLStmt", &[n(stmt)], 0);
    }

    for stmt in [
        "CreateModuleStmt",
        "AlterModuleStmt",
        "DropModuleStmt",
        "CreateScalarTypeStmt",
        "AlterScalarTypeStmt",
        "DropScalarTypeStmt",
        "CreateObjectTypeStmt",
        "AlterObjectTypeStmt",
        "DropObjectTypeStmt",
        "CreateAliasStmt",
        "AlterAliasStmt",
        "DropAliasStmt",
        "CreateAnnotationStmt",
        "AlterAnnotationStmt",
        "DropAnnotationStmt",
        "CreateLinkStmt",
        "AlterLinkStmt",
        "DropLinkStmt",
        "CreatePropertyStmt",
        "AlterPropertyStmt",
        "DropPropertyStmt",
        "CreateConstraintStmt",
        "AlterConstraintStmt",
        "DropConstraintStmt",
        "CreateFunctionStmt",
        "AlterFunctionStmt",
        "DropFunctionStmt",
        "CreateOperatorStmt",
        "AlterOperatorStmt",
        "DropOperatorStmt",
        "CreateCastStmt",
        "AlterCastStmt",
        "DropCastStmt",
        "CreateExtensionStmt",
        "DropExtensionStmt",
        "CreateExtensionPackageStmt",
        "DropExtensionPackageStmt",
    ] {
        g.inline("InnerDDLStmt", &[n(stmt)], 0);
    }

    for stmt in [
        "CreateMigrationStmt",
        "StartMigrationStmt",
        "AbortMigrationStmt",
        "PopulateMigrationStmt",
        "CommitMigrationStmt",
        "AlterMigrationStmt",
        "DropMigrationStmt",
    ] {
        g.inline("MigrationStmt", &[n(stmt)], 0);
    }
}

fn blocks(g: &mut GrammarBuilder) {
    g.rule(
        "CommandsBlock",
        &[t(T::OpenBrace), n("OptSemicolons"), t(T::CloseBrace)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.inline(
        "CommandsBlock",
        &[
            t(T::OpenBrace),
            n("OptSemicolons"),
            n("DdlCommandsList"),
            n("OptSemicolons"),
            t(T::CloseBrace),
        ],
        2,
    );
    g.list("DdlCommandsList", n("DdlSubcommand"), Some(n("Semicolons")));

    g.rule("OptCommandsBlock", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.inline("OptCommandsBlock", &[n("CommandsBlock")], 0);
}

fn subcommands(g: &mut GrammarBuilder) {
    for stmt in [
        "SetFieldStmt",
        "ResetFieldStmt",
        "SetAnnotationStmt",
        "DropAnnotationValueStmt",
        "RenameStmt",
        "AlterAddInheritStmt",
        "AlterDropInheritStmt",
        "UsingStmt",
        "SetPointerTypeStmt",
        "SetCardinalityStmt",
        "SetOptionalityStmt",
        "OnTargetDeleteStmt",
        "OnSourceDeleteStmt",
        "CreateConcretePropertyStmt",
        "AlterConcretePropertyStmt",
        "DropConcretePropertyStmt",
        "CreateConcreteLinkStmt",
        "AlterConcreteLinkStmt",
        "DropConcreteLinkStmt",
        "CreateConcreteConstraintStmt",
        "AlterConcreteConstraintStmt",
        "DropConcreteConstraintStmt",
        "CreateIndexStmt",
        "AlterIndexStmt",
        "DropIndexStmt",
        "InnerDDLStmt",
    ] {
        g.inline("DdlSubcommand", &[n(stmt)], 0);
    }

    g.rule(
        "SetFieldStmt",
        &[kw(K::Set), n("Identifier"), t(T::Assign), n("Expr")],
        |span, mut args| {
            let value = args.remove(3).into_expr();
            let name = args.remove(1).into_str();
            Ok(StackValue::Ddl(DdlCommand::SetField(SetField {
                name,
                value: Box::new(value),
                span: span.into(),
            })))
        },
    );
    g.rule("SetFieldStmt", &[kw(K::Set), kw(K::Abstract)], |span, _| {
        Ok(StackValue::Ddl(DdlCommand::SetField(SetField {
            name: "abstract".to_string(),
            value: Box::new(bool_const(span)),
            span: span.into(),
        })))
    });
    g.rule("SetFieldStmt", &[kw(K::Drop), kw(K::Abstract)], |span, _| {
        Ok(StackValue::Ddl(DdlCommand::SetField(SetField {
            name: "abstract".to_string(),
            value: Box::new(Expr::Constant(Constant {
                kind: ConstantKind::Boolean,
                value: "false".to_string(),
                span: span.into(),
            })),
            span: span.into(),
        })))
    });

    g.rule(
        "ResetFieldStmt",
        &[kw(K::Reset), n("Identifier")],
        |span, mut args| {
            let name = args.remove(1).into_str();
            Ok(StackValue::Ddl(DdlCommand::ResetField(ResetField {
                name,
                span: span.into(),
            })))
        },
    );

    g.rule(
        "SetAnnotationStmt",
        &[kw(K::Create), kw(K::Annotation), n("NodeName"), t(T::Assign), n("Expr")],
        set_annotation,
    );
    g.rule(
        "SetAnnotationStmt",
        &[kw(K::Alter), kw(K::Annotation), n("NodeName"), t(T::Assign), n("Expr")],
        set_annotation,
    );

    fn set_annotation(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let value = args.remove(4).into_expr();
        let name = args.remove(2).into_object_ref();
        Ok(StackValue::Ddl(DdlCommand::SetAnnotationValue(
            SetAnnotationValue {
                name,
                value: Box::new(value),
                span: span.into(),
            },
        )))
    }

    g.rule(
        "DropAnnotationValueStmt",
        &[kw(K::Drop), kw(K::Annotation), n("NodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropAnnotationValue(
                DropAnnotationValue {
                    name,
                    span: span.into(),
                },
            )))
        },
    );

    g.rule(
        "RenameStmt",
        &[kw(K::Rename), kw(K::To), n("NodeName")],
        |span, mut args| {
            let new_name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::Rename(Rename {
                new_name,
                span: span.into(),
            })))
        },
    );

    g.rule("OptInheritPosition", &[], |_, _| Ok(StackValue::Empty));
    g.rule("OptInheritPosition", &[kw(K::First)], |_, _| {
        Ok(StackValue::InheritPosition(InheritPosition::First))
    });
    g.rule("OptInheritPosition", &[kw(K::Last)], |_, _| {
        Ok(StackValue::InheritPosition(InheritPosition::Last))
    });
    g.rule(
        "OptInheritPosition",
        &[kw(K::Before), n("NodeName")],
        |_, mut args| {
            Ok(StackValue::InheritPosition(InheritPosition::Before(
                args.remove(1).into_object_ref(),
            )))
        },
    );
    g.rule(
        "OptInheritPosition",
        &[kw(K::After), n("NodeName")],
        |_, mut args| {
            Ok(StackValue::InheritPosition(InheritPosition::After(
                args.remove(1).into_object_ref(),
            )))
        },
    );

    g.rule(
        "AlterAddInheritStmt",
        &[kw(K::Extending), n("TypeNameList"), n("OptInheritPosition")],
        |span, mut args| {
            let position = match args.remove(2) {
                StackValue::InheritPosition(p) => Some(p),
                StackValue::Empty => None,
                other => panic!("expected inherit position, found {other:?}"),
            };
            let bases = args.remove(1).into_type_exprs();
            Ok(StackValue::Ddl(DdlCommand::AlterAddInherit(
                AlterAddInherit {
                    bases,
                    position,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "AlterDropInheritStmt",
        &[kw(K::Drop), kw(K::Extending), n("TypeNameList")],
        |span, mut args| {
            let bases = args.remove(2).into_type_exprs();
            Ok(StackValue::Ddl(DdlCommand::AlterDropInherit(
                AlterDropInherit {
                    bases,
                    span: span.into(),
                },
            )))
        },
    );

    g.rule(
        "UsingStmt",
        &[kw(K::Using), t(T::OpenParen), n("Expr"), t(T::CloseParen)],
        |span, mut args| {
            let expr = args.remove(2).into_expr();
            Ok(StackValue::Ddl(DdlCommand::SetUsing(SetUsing {
                expr: Box::new(expr),
                span: span.into(),
            })))
        },
    );

    g.rule("OptAlterUsing", &[], |_, _| Ok(StackValue::Empty));
    g.inline(
        "OptAlterUsing",
        &[kw(K::Using), t(T::OpenParen), n("Expr"), t(T::CloseParen)],
        2,
    );

    g.rule(
        "SetPointerTypeStmt",
        &[t(T::SetType), n("FullTypeExpr"), n("OptAlterUsing")],
        |span, mut args| {
            let cast_expr = args.remove(2).into_opt_expr();
            let ty = args.remove(1).into_type_expr();
            Ok(StackValue::Ddl(DdlCommand::SetPointerType(SetPointerType {
                ty,
                cast_expr: cast_expr.map(Box::new),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "SetCardinalityStmt",
        &[kw(K::Set), kw(K::Single), n("OptAlterUsing")],
        |span, mut args| {
            let conv_expr = args.remove(2).into_opt_expr();
            Ok(StackValue::Ddl(DdlCommand::SetPointerCardinality(
                SetPointerCardinality {
                    cardinality: SchemaCardinality::Single,
                    conv_expr: conv_expr.map(Box::new),
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "SetCardinalityStmt",
        &[kw(K::Set), kw(K::Multi), n("OptAlterUsing")],
        |span, mut args| {
            let conv_expr = args.remove(2).into_opt_expr();
            Ok(StackValue::Ddl(DdlCommand::SetPointerCardinality(
                SetPointerCardinality {
                    cardinality: SchemaCardinality::Multi,
                    conv_expr: conv_expr.map(Box::new),
                    span: span.into(),
                },
            )))
        },
    );

    g.rule(
        "SetOptionalityStmt",
        &[kw(K::Set), kw(K::Required), n("OptAlterUsing")],
        |span, mut args| {
            let fill_expr = args.remove(2).into_opt_expr();
            Ok(StackValue::Ddl(DdlCommand::SetPointerOptionality(
                SetPointerOptionality {
                    required: true,
                    fill_expr: fill_expr.map(Box::new),
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "SetOptionalityStmt",
        &[kw(K::Set), kw(K::Optional), n("OptAlterUsing")],
        |span, mut args| {
            let fill_expr = args.remove(2).into_opt_expr();
            Ok(StackValue::Ddl(DdlCommand::SetPointerOptionality(
                SetPointerOptionality {
                    required: false,
                    fill_expr: fill_expr.map(Box::new),
                    span: span.into(),
                },
            )))
        },
    );

    on_delete(g);
}

fn on_delete(g: &mut GrammarBuilder) {
    let target: &[(&[super::Symbol], LinkTargetDeleteAction)] = &[
        (
            &[kw(K::On), kw(K::Target), kw(K::Delete), kw(K::Restrict)],
            LinkTargetDeleteAction::Restrict,
        ),
        (
            &[kw(K::On), kw(K::Target), kw(K::Delete), kw(K::Allow)],
            LinkTargetDeleteAction::Allow,
        ),
        (
            &[
                kw(K::On),
                kw(K::Target),
                kw(K::Delete),
                kw(K::Delete),
                kw(K::Source),
            ],
            LinkTargetDeleteAction::DeleteSource,
        ),
        (
            &[
                kw(K::On),
                kw(K::Target),
                kw(K::Delete),
                kw(K::Deferred),
                kw(K::Restrict),
            ],
            LinkTargetDeleteAction::DeferredRestrict,
        ),
    ];
    for (rhs, _action) in target {
        g.rule("OnTargetDeleteStmt", rhs, |span, args| {
            let action = match args.len() {
                4 => match args[3].clone().into_token().text.to_lowercase().as_str() {
                    "restrict" => LinkTargetDeleteAction::Restrict,
                    "allow" => LinkTargetDeleteAction::Allow,
                    other => panic!("not a target-delete action: {other}"),
                },
                5 => match args[3].clone().into_token().text.to_lowercase().as_str() {
                    "delete" => LinkTargetDeleteAction::DeleteSource,
                    "deferred" => LinkTargetDeleteAction::DeferredRestrict,
                    other => panic!("not a target-delete action: {other}"),
                },
                len => panic!("unexpected target-delete arity {len}"),
            };
            Ok(StackValue::Ddl(DdlCommand::OnTargetDelete(OnTargetDelete {
                action,
                span: span.into(),
            })))
        });
    }

    g.rule(
        "OnSourceDeleteStmt",
        &[
            kw(K::On),
            kw(K::Source),
            kw(K::Delete),
            kw(K::Delete),
            kw(K::Target),
        ],
        |span, _| {
            Ok(StackValue::Ddl(DdlCommand::OnSourceDelete(OnSourceDelete {
                action: LinkSourceDeleteAction::DeleteTarget,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "OnSourceDeleteStmt",
        &[kw(K::On), kw(K::Source), kw(K::Delete), kw(K::Allow)],
        |span, _| {
            Ok(StackValue::Ddl(DdlCommand::OnSourceDelete(OnSourceDelete {
                action: LinkSourceDeleteAction::Allow,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "OnSourceDeleteStmt",
        &[
            kw(K::On),
            kw(K::Source),
            kw(K::Delete),
            kw(K::Delete),
            kw(K::Target),
            kw(K::If),
            kw(K::Orphan),
        ],
        |span, _| {
            Ok(StackValue::Ddl(DdlCommand::OnSourceDelete(OnSourceDelete {
                action: LinkSourceDeleteAction::DeleteTargetIfOrphan,
                span: span.into(),
            })))
        },
    );
}

fn databases_roles_modules(g: &mut GrammarBuilder) {
    g.rule(
        "CreateDatabaseStmt",
        &[kw(K::Create), kw(K::Database), n("AnyNodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateDatabase(CreateDatabase {
                name,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropDatabaseStmt",
        &[kw(K::Drop), kw(K::Database), n("AnyNodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropDatabase(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule("OptRoleExtending", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.inline(
        "OptRoleExtending",
        &[kw(K::Extending), n("ShortNodeNameList")],
        1,
    );
    g.list("ShortNodeNameList", n("ShortNodeName"), Some(t(T::Comma)));

    g.rule(
        "CreateRoleStmt",
        &[
            kw(K::Create),
            kw(K::Role),
            n("ShortNodeName"),
            n("OptRoleExtending"),
            n("OptCommandsBlock"),
        ],
        create_role,
    );
    g.rule(
        "CreateRoleStmt",
        &[
            kw(K::Create),
            kw(K::Superuser),
            kw(K::Role),
            n("ShortNodeName"),
            n("OptRoleExtending"),
            n("OptCommandsBlock"),
        ],
        create_role,
    );

    fn create_role(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.pop().expect("role commands").into_ddl_list();
        let extending = args
            .pop()
            .expect("role bases")
            .into_list()
            .into_iter()
            .map(StackValue::into_object_ref)
            .collect();
        let name = args.pop().expect("role name").into_object_ref();
        let superuser = args.len() == 3;
        Ok(StackValue::Ddl(DdlCommand::CreateRole(CreateRole {
            name,
            superuser,
            extending,
            commands,
            span: span.into(),
        })))
    }

    g.rule(
        "AlterRoleStmt",
        &[kw(K::Alter), kw(K::Role), n("ShortNodeName"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterRole(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropRoleStmt",
        &[kw(K::Drop), kw(K::Role), n("ShortNodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropRole(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "CreateModuleStmt",
        &[kw(K::Create), kw(K::Module), n("ModuleRef"), n("OptCommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateModule(CreateModule {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "AlterModuleStmt",
        &[kw(K::Alter), kw(K::Module), n("ModuleRef"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterModule(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropModuleStmt",
        &[kw(K::Drop), kw(K::Module), n("ModuleRef")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropModule(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    // A module reference: a dotted name.
    g.rule("ModuleRef", &[n("DotName")], |span, mut args| {
        let name = args.remove(0).into_str();
        Ok(StackValue::ObjectRef(tql_ast::expr::ObjectRef::new(
            name, span,
        )))
    });
}

fn types(g: &mut GrammarBuilder) {
    g.rule(
        "CreateScalarTypeStmt",
        &[
            kw(K::Create),
            kw(K::Scalar),
            kw(K::Type),
            n("NodeName"),
            n("OptExtending"),
            n("OptCommandsBlock"),
        ],
        create_scalar,
    );
    g.rule(
        "CreateScalarTypeStmt",
        &[
            kw(K::Create),
            kw(K::Abstract),
            kw(K::Scalar),
            kw(K::Type),
            n("NodeName"),
            n("OptExtending"),
            n("OptCommandsBlock"),
        ],
        create_scalar,
    );

    fn create_scalar(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.pop().expect("commands").into_ddl_list();
        let extending = args.pop().expect("bases").into_type_exprs();
        let name = args.pop().expect("name").into_object_ref();
        let abstract_ = args.len() == 4;
        Ok(StackValue::Ddl(DdlCommand::CreateScalarType(
            CreateScalarType {
                name,
                abstract_,
                extending,
                commands,
                span: span.into(),
            },
        )))
    }

    g.rule(
        "AlterScalarTypeStmt",
        &[
            kw(K::Alter),
            kw(K::Scalar),
            kw(K::Type),
            n("NodeName"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(4).into_ddl_list();
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterScalarType(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropScalarTypeStmt",
        &[kw(K::Drop), kw(K::Scalar), kw(K::Type), n("NodeName")],
        |span, mut args| {
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropScalarType(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "CreateObjectTypeStmt",
        &[
            kw(K::Create),
            kw(K::Type),
            n("NodeName"),
            n("OptExtending"),
            n("OptCommandsBlock"),
        ],
        create_object_type,
    );
    g.rule(
        "CreateObjectTypeStmt",
        &[
            kw(K::Create),
            kw(K::Abstract),
            kw(K::Type),
            n("NodeName"),
            n("OptExtending"),
            n("OptCommandsBlock"),
        ],
        create_object_type,
    );

    fn create_object_type(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.pop().expect("commands").into_ddl_list();
        let extending = args.pop().expect("bases").into_type_exprs();
        let name = args.pop().expect("name").into_object_ref();
        let abstract_ = args.len() == 3;
        Ok(StackValue::Ddl(DdlCommand::CreateObjectType(
            CreateObjectType {
                name,
                abstract_,
                extending,
                commands,
                span: span.into(),
            },
        )))
    }

    g.rule(
        "AlterObjectTypeStmt",
        &[kw(K::Alter), kw(K::Type), n("NodeName"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterObjectType(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropObjectTypeStmt",
        &[kw(K::Drop), kw(K::Type), n("NodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropObjectType(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );
}

fn pointers(g: &mut GrammarBuilder) {
    // Abstract links and properties.
    for (keyword, link) in [(K::Link, true), (K::Property, false)] {
        let create: super::ReduceFn = if link {
            |span, args| abstract_pointer(span, args, true)
        } else {
            |span, args| abstract_pointer(span, args, false)
        };
        g.rule(
            if link { "CreateLinkStmt" } else { "CreatePropertyStmt" },
            &[
                kw(K::Create),
                kw(K::Abstract),
                kw(keyword),
                n("PtrNodeName"),
                n("OptExtending"),
                n("OptCommandsBlock"),
            ],
            create,
        );
        let alter: super::ReduceFn = if link {
            |span, args| alter_abstract_pointer(span, args, true)
        } else {
            |span, args| alter_abstract_pointer(span, args, false)
        };
        g.rule(
            if link { "AlterLinkStmt" } else { "AlterPropertyStmt" },
            &[
                kw(K::Alter),
                kw(K::Abstract),
                kw(keyword),
                n("PtrNodeName"),
                n("CommandsBlock"),
            ],
            alter,
        );
        let drop: super::ReduceFn = if link {
            |span, args| drop_abstract_pointer(span, args, true)
        } else {
            |span, args| drop_abstract_pointer(span, args, false)
        };
        g.rule(
            if link { "DropLinkStmt" } else { "DropPropertyStmt" },
            &[kw(K::Drop), kw(K::Abstract), kw(keyword), n("PtrNodeName")],
            drop,
        );
    }

    fn abstract_pointer(
        span: Span,
        mut args: Vec<StackValue>,
        link: bool,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.remove(5).into_ddl_list();
        let extending = args.remove(4).into_type_exprs();
        let name = args.remove(3).into_object_ref();
        let pointer = CreatePointer {
            name,
            extending,
            commands,
            span: span.into(),
        };
        Ok(StackValue::Ddl(if link {
            DdlCommand::CreateLink(pointer)
        } else {
            DdlCommand::CreateProperty(pointer)
        }))
    }

    fn alter_abstract_pointer(
        span: Span,
        mut args: Vec<StackValue>,
        link: bool,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.remove(4).into_ddl_list();
        let name = args.remove(3).into_object_ref();
        let alter = AlterObject {
            name,
            commands,
            span: span.into(),
        };
        Ok(StackValue::Ddl(if link {
            DdlCommand::AlterLink(alter)
        } else {
            DdlCommand::AlterProperty(alter)
        }))
    }

    fn drop_abstract_pointer(
        span: Span,
        mut args: Vec<StackValue>,
        link: bool,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let name = args.remove(3).into_object_ref();
        let drop = DropObject {
            name,
            commands: Vec::new(),
            span: span.into(),
        };
        Ok(StackValue::Ddl(if link {
            DdlCommand::DropLink(drop)
        } else {
            DdlCommand::DropProperty(drop)
        }))
    }

    // Concrete pointer targets.
    g.rule("PtrTarget", &[t(T::Arrow), n("FullTypeExpr")], |_, mut args| {
        Ok(StackValue::PointerTarget(PointerTarget::Type(
            args.remove(1).into_type_expr(),
        )))
    });
    g.rule("PtrTarget", &[t(T::Colon), n("FullTypeExpr")], |_, mut args| {
        Ok(StackValue::PointerTarget(PointerTarget::Type(
            args.remove(1).into_type_expr(),
        )))
    });

    // Concrete links and properties; qualifier spellings enumerated.
    for link in [true, false] {
        let keyword = if link { K::Link } else { K::Property };
        let create_lhs = if link {
            "CreateConcreteLinkStmt"
        } else {
            "CreateConcretePropertyStmt"
        };
        let create: super::ReduceFn = if link {
            |span, args| concrete_pointer(span, args, true)
        } else {
            |span, args| concrete_pointer(span, args, false)
        };

        // CREATE [quals] (LINK|PROPERTY) name [EXTENDING …] target [block]
        g.rule(
            create_lhs,
            &[
                kw(K::Create),
                kw(keyword),
                n("PtrNodeName"),
                n("OptExtending"),
                n("PtrTarget"),
                n("OptCommandsBlock"),
            ],
            create,
        );
        g.rule(
            create_lhs,
            &[
                kw(K::Create),
                n("PtrQuals"),
                kw(keyword),
                n("PtrNodeName"),
                n("OptExtending"),
                n("PtrTarget"),
                n("OptCommandsBlock"),
            ],
            create,
        );
        // Computed forms.
        g.rule(
            create_lhs,
            &[
                kw(K::Create),
                kw(keyword),
                n("PtrNodeName"),
                t(T::Assign),
                n("Expr"),
            ],
            create,
        );
        g.rule(
            create_lhs,
            &[
                kw(K::Create),
                n("PtrQuals"),
                kw(keyword),
                n("PtrNodeName"),
                t(T::Assign),
                n("Expr"),
            ],
            create,
        );
        // Target supplied through the command block.
        g.rule(
            create_lhs,
            &[kw(K::Create), kw(keyword), n("PtrNodeName"), n("CommandsBlock")],
            create,
        );
        g.rule(
            create_lhs,
            &[
                kw(K::Create),
                n("PtrQuals"),
                kw(keyword),
                n("PtrNodeName"),
                n("CommandsBlock"),
            ],
            create,
        );

        let alter: super::ReduceFn = if link {
            |span, args| alter_concrete_pointer(span, args, true)
        } else {
            |span, args| alter_concrete_pointer(span, args, false)
        };
        g.rule(
            if link {
                "AlterConcreteLinkStmt"
            } else {
                "AlterConcretePropertyStmt"
            },
            &[kw(K::Alter), kw(keyword), n("PtrNodeName"), n("CommandsBlock")],
            alter,
        );

        let drop: super::ReduceFn = if link {
            |span, args| drop_concrete_pointer(span, args, true)
        } else {
            |span, args| drop_concrete_pointer(span, args, false)
        };
        g.rule(
            if link {
                "DropConcreteLinkStmt"
            } else {
                "DropConcretePropertyStmt"
            },
            &[kw(K::Drop), kw(keyword), n("PtrNodeName")],
            drop,
        );
    }

    fn concrete_pointer(
        span: Span,
        args: Vec<StackValue>,
        link: bool,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let mut required = None;
        let mut cardinality = None;
        let mut extending = Vec::new();
        let mut target = None;
        let mut commands = Vec::new();
        let mut name = None;

        let mut it = args.into_iter();
        let _create = it.next();
        for value in it {
            match value {
                StackValue::PointerQuals {
                    required: r,
                    cardinality: c,
                } => {
                    required = r;
                    cardinality = c;
                }
                StackValue::Token(_) => {}
                StackValue::ObjectRef(r) => name = Some(r),
                StackValue::List(items) => {
                    // Either the extending list or the command block.
                    let mut types = Vec::new();
                    let mut cmds = Vec::new();
                    for item in items {
                        match item {
                            StackValue::TypeExpr(ty) => types.push(ty),
                            StackValue::Ddl(cmd) => cmds.push(cmd),
                            other => panic!("unexpected pointer item: {other:?}"),
                        }
                    }
                    if !types.is_empty() {
                        extending = types;
                    }
                    if !cmds.is_empty() {
                        commands = cmds;
                    }
                }
                StackValue::PointerTarget(t) => target = Some(t),
                StackValue::Expr(e) => target = Some(PointerTarget::Computed(Box::new(e))),
                StackValue::Empty => {}
                other => panic!("unexpected pointer item: {other:?}"),
            }
        }

        let pointer = CreateConcretePointer {
            name: name.expect("pointer name"),
            required,
            cardinality,
            extending,
            target,
            commands,
            span: span.into(),
        };
        Ok(StackValue::Ddl(if link {
            DdlCommand::CreateConcreteLink(pointer)
        } else {
            DdlCommand::CreateConcreteProperty(pointer)
        }))
    }

    fn alter_concrete_pointer(
        span: Span,
        mut args: Vec<StackValue>,
        link: bool,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.remove(3).into_ddl_list();
        let name = args.remove(2).into_object_ref();
        let alter = AlterObject {
            name,
            commands,
            span: span.into(),
        };
        Ok(StackValue::Ddl(if link {
            DdlCommand::AlterConcreteLink(alter)
        } else {
            DdlCommand::AlterConcreteProperty(alter)
        }))
    }

    fn drop_concrete_pointer(
        span: Span,
        mut args: Vec<StackValue>,
        link: bool,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let name = args.remove(2).into_object_ref();
        let drop = DropObject {
            name,
            commands: Vec::new(),
            span: span.into(),
        };
        Ok(StackValue::Ddl(if link {
            DdlCommand::DropConcreteLink(drop)
        } else {
            DdlCommand::DropConcreteProperty(drop)
        }))
    }
}

fn constraints_indexes(g: &mut GrammarBuilder) {
    g.rule("OptCreateFunctionArgs", &[], |_, _| {
        Ok(StackValue::List(Vec::new()))
    });
    g.inline("OptCreateFunctionArgs", &[n("CreateFunctionArgs")], 0);

    g.rule(
        "CreateConstraintStmt",
        &[
            kw(K::Create),
            kw(K::Abstract),
            kw(K::Constraint),
            n("NodeName"),
            n("OptCreateFunctionArgs"),
            n("OptOnExpr"),
            n("OptExtending"),
            n("OptCommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(7).into_ddl_list();
            let extending = args.remove(6).into_type_exprs();
            let on = args.remove(5).into_opt_expr();
            let params = args.remove(4).into_func_params();
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateConstraint(
                CreateConstraint {
                    name,
                    params,
                    on: on.map(Box::new),
                    extending,
                    commands,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "AlterConstraintStmt",
        &[
            kw(K::Alter),
            kw(K::Abstract),
            kw(K::Constraint),
            n("NodeName"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(4).into_ddl_list();
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterConstraint(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropConstraintStmt",
        &[kw(K::Drop), kw(K::Abstract), kw(K::Constraint), n("NodeName")],
        |span, mut args| {
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropConstraint(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule("OptConstraintArgs", &[], |_, _| Ok(StackValue::List(Vec::new())));
    g.rule(
        "OptConstraintArgs",
        &[t(T::OpenParen), t(T::CloseParen)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.inline(
        "OptConstraintArgs",
        &[t(T::OpenParen), n("ExprList"), t(T::CloseParen)],
        1,
    );

    g.rule(
        "CreateConcreteConstraintStmt",
        &[
            kw(K::Create),
            kw(K::Constraint),
            n("NodeName"),
            n("OptConstraintArgs"),
            n("OptOnExpr"),
            n("OptExceptExpr"),
            n("OptCommandsBlock"),
        ],
        create_concrete_constraint,
    );
    g.rule(
        "CreateConcreteConstraintStmt",
        &[
            kw(K::Create),
            kw(K::Delegated),
            kw(K::Constraint),
            n("NodeName"),
            n("OptConstraintArgs"),
            n("OptOnExpr"),
            n("OptExceptExpr"),
            n("OptCommandsBlock"),
        ],
        create_concrete_constraint,
    );

    fn create_concrete_constraint(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.pop().expect("commands").into_ddl_list();
        let except = args.pop().expect("except").into_opt_expr();
        let on = args.pop().expect("on").into_opt_expr();
        let constraint_args = args.pop().expect("args").into_exprs();
        let name = args.pop().expect("name").into_object_ref();
        let delegated = args.len() == 3;
        Ok(StackValue::Ddl(DdlCommand::CreateConcreteConstraint(
            CreateConcreteConstraint {
                name,
                args: constraint_args,
                on: on.map(Box::new),
                except: except.map(Box::new),
                delegated,
                commands,
                span: span.into(),
            },
        )))
    }

    g.rule(
        "AlterConcreteConstraintStmt",
        &[
            kw(K::Alter),
            kw(K::Constraint),
            n("NodeName"),
            n("OptConstraintArgs"),
            n("OptOnExpr"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(5).into_ddl_list();
            let on = args.remove(4).into_opt_expr();
            let constraint_args = args.remove(3).into_exprs();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterConcreteConstraint(
                AlterConcreteConstraint {
                    name,
                    args: constraint_args,
                    on: on.map(Box::new),
                    commands,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "DropConcreteConstraintStmt",
        &[
            kw(K::Drop),
            kw(K::Constraint),
            n("NodeName"),
            n("OptConstraintArgs"),
            n("OptOnExpr"),
        ],
        |span, mut args| {
            let on = args.remove(4).into_opt_expr();
            let constraint_args = args.remove(3).into_exprs();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropConcreteConstraint(
                AlterConcreteConstraint {
                    name,
                    args: constraint_args,
                    on: on.map(Box::new),
                    commands: Vec::new(),
                    span: span.into(),
                },
            )))
        },
    );

    g.rule(
        "CreateIndexStmt",
        &[
            kw(K::Create),
            kw(K::Index),
            n("OnExpr"),
            n("OptExceptExpr"),
            n("OptCommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(4).into_ddl_list();
            let except = args.remove(3).into_opt_expr();
            let expr = args.remove(2).into_expr();
            Ok(StackValue::Ddl(DdlCommand::CreateIndex(CreateIndex {
                expr: Box::new(expr),
                except: except.map(Box::new),
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "AlterIndexStmt",
        &[kw(K::Alter), kw(K::Index), n("OnExpr"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let expr = args.remove(2).into_expr();
            Ok(StackValue::Ddl(DdlCommand::AlterIndex(AlterIndex {
                expr: Box::new(expr),
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropIndexStmt",
        &[kw(K::Drop), kw(K::Index), n("OnExpr")],
        |span, mut args| {
            let expr = args.remove(2).into_expr();
            Ok(StackValue::Ddl(DdlCommand::DropIndex(AlterIndex {
                expr: Box::new(expr),
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );
}

fn functions_operators_casts(g: &mut GrammarBuilder) {
    // Function and cast bodies collect using-clauses, fields, and
    // annotation values.
    g.inline("FunctionBodyItem", &[n("SetFieldStmt")], 0);
    g.inline("FunctionBodyItem", &[n("SetAnnotationStmt")], 0);
    g.rule("FunctionBodyItem", &[n("FromFunction")], |_, mut args| {
        Ok(args.remove(0))
    });
    g.rule("FunctionBodyItem", &[kw(K::Allow), kw(K::Implicit)], |_, _| {
        Ok(StackValue::Str("implicit".to_string()))
    });
    g.rule(
        "FunctionBodyItem",
        &[kw(K::Allow), kw(K::Assignment)],
        |_, _| Ok(StackValue::Str("assignment".to_string())),
    );

    g.list("FunctionBodyItemList", n("FunctionBodyItem"), Some(n("Semicolons")));

    g.rule(
        "FunctionBodyBlock",
        &[t(T::OpenBrace), n("OptSemicolons"), t(T::CloseBrace)],
        |_, _| Ok(StackValue::List(Vec::new())),
    );
    g.inline(
        "FunctionBodyBlock",
        &[
            t(T::OpenBrace),
            n("OptSemicolons"),
            n("FunctionBodyItemList"),
            n("OptSemicolons"),
            t(T::CloseBrace),
        ],
        2,
    );

    g.rule(
        "CreateFunctionStmt",
        &[
            kw(K::Create),
            kw(K::Function),
            n("NodeName"),
            n("CreateFunctionArgs"),
            t(T::Arrow),
            n("OptTypeQualifier"),
            n("FullTypeExpr"),
            n("FunctionBodyBlock"),
        ],
        create_function,
    );
    g.rule(
        "CreateFunctionStmt",
        &[
            kw(K::Create),
            kw(K::Function),
            n("NodeName"),
            n("CreateFunctionArgs"),
            t(T::Arrow),
            n("OptTypeQualifier"),
            n("FullTypeExpr"),
            n("FromFunction"),
        ],
        create_function,
    );

    fn create_function(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let body = args.remove(7);
        let returning = args.remove(6).into_type_expr();
        let returning_typemod = match args.remove(5) {
            StackValue::TypeModifier(m) => m,
            other => panic!("expected type modifier, found {other:?}"),
        };
        let params = args.remove(3).into_func_params();
        let name = args.remove(2).into_object_ref();

        let (code, commands) = match body {
            StackValue::FunctionCode(code) => (code, Vec::new()),
            list => function_body(list, span),
        };

        Ok(StackValue::Ddl(DdlCommand::CreateFunction(CreateFunction {
            name,
            params,
            returning,
            returning_typemod,
            code,
            commands,
            span: span.into(),
        })))
    }

    g.rule(
        "AlterFunctionStmt",
        &[
            kw(K::Alter),
            kw(K::Function),
            n("NodeName"),
            n("CreateFunctionArgs"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(4).into_ddl_list();
            let params = args.remove(3).into_func_params();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterFunction(AlterFunction {
                name,
                params,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropFunctionStmt",
        &[
            kw(K::Drop),
            kw(K::Function),
            n("NodeName"),
            n("CreateFunctionArgs"),
        ],
        |span, mut args| {
            let params = args.remove(3).into_func_params();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropFunction(AlterFunction {
                name,
                params,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule("OperatorKindNT", &[kw(K::Infix)], |_, _| {
        Ok(StackValue::OperatorKind(OperatorKind::Infix))
    });
    g.rule("OperatorKindNT", &[kw(K::Postfix)], |_, _| {
        Ok(StackValue::OperatorKind(OperatorKind::Postfix))
    });
    g.rule("OperatorKindNT", &[kw(K::Prefix)], |_, _| {
        Ok(StackValue::OperatorKind(OperatorKind::Prefix))
    });
    g.rule("OperatorKindNT", &[kw(K::Ternary)], |_, _| {
        Ok(StackValue::OperatorKind(OperatorKind::Ternary))
    });

    g.rule(
        "CreateOperatorStmt",
        &[
            kw(K::Create),
            n("OperatorKindNT"),
            kw(K::Operator),
            n("NodeName"),
            n("CreateFunctionArgs"),
            t(T::Arrow),
            n("OptTypeQualifier"),
            n("FullTypeExpr"),
            n("FunctionBodyBlock"),
        ],
        create_operator,
    );
    g.rule(
        "CreateOperatorStmt",
        &[
            kw(K::Create),
            kw(K::Abstract),
            n("OperatorKindNT"),
            kw(K::Operator),
            n("NodeName"),
            n("CreateFunctionArgs"),
            t(T::Arrow),
            n("OptTypeQualifier"),
            n("FullTypeExpr"),
        ],
        create_operator,
    );

    fn create_operator(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let abstract_ = matches!(args.get(1), Some(StackValue::Token(_)));
        let body = if abstract_ {
            StackValue::List(Vec::new())
        } else {
            args.pop().expect("operator body")
        };
        let returning = args.pop().expect("return type").into_type_expr();
        let returning_typemod = match args.pop().expect("type modifier") {
            StackValue::TypeModifier(m) => m,
            other => panic!("expected type modifier, found {other:?}"),
        };
        let _arrow = args.pop();
        let params = args.pop().expect("params").into_func_params();
        let name = args.pop().expect("name").into_object_ref();
        let _operator_kw = args.pop();
        let kind = match args.pop().expect("operator kind") {
            StackValue::OperatorKind(kind) => kind,
            other => panic!("expected operator kind, found {other:?}"),
        };

        let (code, commands) = match body {
            StackValue::FunctionCode(code) => (code, Vec::new()),
            list => function_body(list, span),
        };

        Ok(StackValue::Ddl(DdlCommand::CreateOperator(CreateOperator {
            kind,
            name,
            params,
            returning,
            returning_typemod,
            abstract_,
            code,
            commands,
            span: span.into(),
        })))
    }

    g.rule(
        "AlterOperatorStmt",
        &[
            kw(K::Alter),
            n("OperatorKindNT"),
            kw(K::Operator),
            n("NodeName"),
            n("CreateFunctionArgs"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(5).into_ddl_list();
            let params = args.remove(4).into_func_params();
            let name = args.remove(3).into_object_ref();
            let kind = match args.remove(1) {
                StackValue::OperatorKind(kind) => kind,
                other => panic!("expected operator kind, found {other:?}"),
            };
            Ok(StackValue::Ddl(DdlCommand::AlterOperator(AlterOperator {
                kind,
                name,
                params,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropOperatorStmt",
        &[
            kw(K::Drop),
            n("OperatorKindNT"),
            kw(K::Operator),
            n("NodeName"),
            n("CreateFunctionArgs"),
        ],
        |span, mut args| {
            let params = args.remove(4).into_func_params();
            let name = args.remove(3).into_object_ref();
            let kind = match args.remove(1) {
                StackValue::OperatorKind(kind) => kind,
                other => panic!("expected operator kind, found {other:?}"),
            };
            Ok(StackValue::Ddl(DdlCommand::DropOperator(AlterOperator {
                kind,
                name,
                params,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "CreateCastStmt",
        &[
            kw(K::Create),
            kw(K::Cast),
            kw(K::From),
            n("FullTypeExpr"),
            kw(K::To),
            n("FullTypeExpr"),
            n("FunctionBodyBlock"),
        ],
        |span, mut args| {
            let body = args.remove(6);
            let to_type = args.remove(5).into_type_expr();
            let from_type = args.remove(3).into_type_expr();
            let (code, commands) = function_body(body, span);

            let allow_implicit = commands.iter().any(|c| {
                matches!(c, DdlCommand::SetField(f) if f.name == "allow_implicit")
            });
            let allow_assignment = commands.iter().any(|c| {
                matches!(c, DdlCommand::SetField(f) if f.name == "allow_assignment")
            });
            let commands = commands
                .into_iter()
                .filter(|c| {
                    !matches!(
                        c,
                        DdlCommand::SetField(f)
                            if f.name == "allow_implicit" || f.name == "allow_assignment"
                    )
                })
                .collect();

            Ok(StackValue::Ddl(DdlCommand::CreateCast(CreateCast {
                from_type,
                to_type,
                allow_implicit,
                allow_assignment,
                code,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "AlterCastStmt",
        &[
            kw(K::Alter),
            kw(K::Cast),
            kw(K::From),
            n("FullTypeExpr"),
            kw(K::To),
            n("FullTypeExpr"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(6).into_ddl_list();
            let to_type = args.remove(5).into_type_expr();
            let from_type = args.remove(3).into_type_expr();
            Ok(StackValue::Ddl(DdlCommand::AlterCast(AlterCast {
                from_type,
                to_type,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropCastStmt",
        &[
            kw(K::Drop),
            kw(K::Cast),
            kw(K::From),
            n("FullTypeExpr"),
            kw(K::To),
            n("FullTypeExpr"),
        ],
        |span, mut args| {
            let to_type = args.remove(5).into_type_expr();
            let from_type = args.remove(3).into_type_expr();
            Ok(StackValue::Ddl(DdlCommand::DropCast(AlterCast {
                from_type,
                to_type,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );
}

fn annotations_aliases(g: &mut GrammarBuilder) {
    g.rule(
        "CreateAnnotationStmt",
        &[
            kw(K::Create),
            kw(K::Abstract),
            kw(K::Annotation),
            n("NodeName"),
            n("OptCommandsBlock"),
        ],
        create_annotation,
    );
    g.rule(
        "CreateAnnotationStmt",
        &[
            kw(K::Create),
            kw(K::Abstract),
            kw(K::Inheritable),
            kw(K::Annotation),
            n("NodeName"),
            n("OptCommandsBlock"),
        ],
        create_annotation,
    );

    fn create_annotation(
        span: Span,
        mut args: Vec<StackValue>,
    ) -> Result<StackValue, crate::diagnostic::Diagnostic> {
        let commands = args.pop().expect("commands").into_ddl_list();
        let name = args.pop().expect("name").into_object_ref();
        let inheritable = args.len() == 4;
        Ok(StackValue::Ddl(DdlCommand::CreateAnnotation(
            CreateAnnotation {
                name,
                inheritable,
                commands,
                span: span.into(),
            },
        )))
    }

    g.rule(
        "AlterAnnotationStmt",
        &[
            kw(K::Alter),
            kw(K::Abstract),
            kw(K::Annotation),
            n("NodeName"),
            n("CommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(4).into_ddl_list();
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterAnnotation(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropAnnotationStmt",
        &[kw(K::Drop), kw(K::Abstract), kw(K::Annotation), n("NodeName")],
        |span, mut args| {
            let name = args.remove(3).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropAnnotation(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "CreateAliasStmt",
        &[
            kw(K::Create),
            kw(K::Alias),
            n("NodeName"),
            t(T::Assign),
            n("Expr"),
        ],
        |span, mut args| {
            let value = args.remove(4).into_expr();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateAlias(CreateAlias {
                name,
                value: Some(Box::new(value)),
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "CreateAliasStmt",
        &[kw(K::Create), kw(K::Alias), n("NodeName"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateAlias(CreateAlias {
                name,
                value: None,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "AlterAliasStmt",
        &[kw(K::Alter), kw(K::Alias), n("NodeName"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterAlias(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropAliasStmt",
        &[kw(K::Drop), kw(K::Alias), n("NodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropAlias(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );
}

fn extensions(g: &mut GrammarBuilder) {
    g.rule(
        "CreateExtensionStmt",
        &[
            kw(K::Create),
            kw(K::Extension),
            n("ShortNodeName"),
            n("OptVersion"),
            n("OptCommandsBlock"),
        ],
        |span, mut args| {
            let commands = args.remove(4).into_ddl_list();
            let version = args.remove(3).into_opt_str();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateExtension(
                CreateExtension {
                    name,
                    version,
                    commands,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "DropExtensionStmt",
        &[kw(K::Drop), kw(K::Extension), n("ShortNodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropExtension(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );

    g.rule(
        "CreateExtensionPackageStmt",
        &[
            kw(K::Create),
            t(T::ExtensionPackage),
            n("ShortNodeName"),
            n("OptVersion"),
            n("NestedBlock"),
        ],
        |span, mut args| {
            let body = args.remove(4).into_ddl_block(span);
            let version = args.remove(3).into_opt_str().unwrap_or_default();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateExtensionPackage(
                CreateExtensionPackage {
                    name,
                    version,
                    body,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "DropExtensionPackageStmt",
        &[
            kw(K::Drop),
            t(T::ExtensionPackage),
            n("ShortNodeName"),
            n("OptVersion"),
        ],
        |span, mut args| {
            let version = args.remove(3).into_opt_str().unwrap_or_default();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropExtensionPackage(
                CreateExtensionPackage {
                    name,
                    version,
                    body: DdlBlock {
                        commands: Vec::new(),
                        span: span.into(),
                    },
                    span: span.into(),
                },
            )))
        },
    );
}

fn migrations(g: &mut GrammarBuilder) {
    // The body of a migration or extension package: a brace-enclosed
    // run of full statements with free semicolon runs.
    g.rule(
        "NestedBlock",
        &[t(T::OpenBrace), n("OptSemicolons"), t(T::CloseBrace)],
        |span, _| {
            Ok(StackValue::DdlBlock(DdlBlock {
                commands: Vec::new(),
                span: span.into(),
            }))
        },
    );
    g.rule(
        "NestedBlock",
        &[
            t(T::OpenBrace),
            n("OptSemicolons"),
            n("NestedStatementList"),
            n("OptSemicolons"),
            t(T::CloseBrace),
        ],
        |span, mut args| {
            let commands = args
                .remove(2)
                .into_list()
                .into_iter()
                .map(StackValue::into_command)
                .collect();
            Ok(StackValue::DdlBlock(DdlBlock {
                commands,
                span: span.into(),
            }))
        },
    );
    g.list("NestedStatementList", n("SingleStatement"), Some(n("Semicolons")));

    g.rule(
        "CreateMigrationStmt",
        &[kw(K::Create), kw(K::Migration), n("NestedBlock")],
        |span, mut args| {
            let body = args.remove(2).into_ddl_block(span);
            Ok(StackValue::Ddl(DdlCommand::CreateMigration(CreateMigration {
                name: None,
                parent: None,
                body,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "CreateMigrationStmt",
        &[
            kw(K::Create),
            kw(K::Migration),
            n("ShortNodeName"),
            n("NestedBlock"),
        ],
        |span, mut args| {
            let body = args.remove(3).into_ddl_block(span);
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateMigration(CreateMigration {
                name: Some(name),
                parent: None,
                body,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "CreateMigrationStmt",
        &[
            kw(K::Create),
            kw(K::Migration),
            n("ShortNodeName"),
            kw(K::Onto),
            n("ShortNodeName"),
            n("NestedBlock"),
        ],
        |span, mut args| {
            let body = args.remove(5).into_ddl_block(span);
            let parent = args.remove(4).into_object_ref();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::CreateMigration(CreateMigration {
                name: Some(name),
                parent: Some(parent),
                body,
                span: span.into(),
            })))
        },
    );

    g.rule(
        "StartMigrationStmt",
        &[
            kw(K::Start),
            kw(K::Migration),
            kw(K::To),
            n("SdlBraceBlock"),
        ],
        |span, mut args| {
            let declarations = args.remove(3).into_sdl_declarations();
            Ok(StackValue::Ddl(DdlCommand::StartMigration(StartMigration {
                target: Schema {
                    declarations,
                    span: span.into(),
                },
                span: span.into(),
            })))
        },
    );

    g.rule(
        "AbortMigrationStmt",
        &[kw(K::Abort), kw(K::Migration)],
        |span, _| {
            Ok(StackValue::Ddl(DdlCommand::AbortMigration(
                MigrationCommand { span: span.into() },
            )))
        },
    );
    g.rule(
        "PopulateMigrationStmt",
        &[kw(K::Populate), kw(K::Migration)],
        |span, _| {
            Ok(StackValue::Ddl(DdlCommand::PopulateMigration(
                MigrationCommand { span: span.into() },
            )))
        },
    );
    g.rule(
        "CommitMigrationStmt",
        &[kw(K::Commit), kw(K::Migration)],
        |span, _| {
            Ok(StackValue::Ddl(DdlCommand::CommitMigration(
                MigrationCommand { span: span.into() },
            )))
        },
    );
    g.rule(
        "AlterMigrationStmt",
        &[kw(K::Alter), kw(K::Migration), n("NodeName"), n("CommandsBlock")],
        |span, mut args| {
            let commands = args.remove(3).into_ddl_list();
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::AlterMigration(AlterObject {
                name,
                commands,
                span: span.into(),
            })))
        },
    );
    g.rule(
        "DropMigrationStmt",
        &[kw(K::Drop), kw(K::Migration), n("NodeName")],
        |span, mut args| {
            let name = args.remove(2).into_object_ref();
            Ok(StackValue::Ddl(DdlCommand::DropMigration(DropObject {
                name,
                commands: Vec::new(),
                span: span.into(),
            })))
        },
    );
}
