//! Configuration command productions.

use tql_ast::qltypes::ConfigScope;
use tql_ast::stmt::Command;
use tql_ast::stmt::ConfigInsert;
use tql_ast::stmt::ConfigReset;
use tql_ast::stmt::ConfigSet;

use super::kw;
use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use crate::keywords::Keyword as K;
use crate::token::TokenKind as T;

/// Registers the `CONFIGURE` productions.
pub fn register(g: &mut GrammarBuilder) {
    g.rule("ConfigScope", &[kw(K::Session)], |_, _| {
        Ok(StackValue::ConfigScope(ConfigScope::Session))
    });
    g.rule("ConfigScope", &[kw(K::Current), kw(K::Database)], |_, _| {
        Ok(StackValue::ConfigScope(ConfigScope::Database))
    });
    g.rule("ConfigScope", &[kw(K::Instance)], |_, _| {
        Ok(StackValue::ConfigScope(ConfigScope::Instance))
    });
    g.rule("ConfigScope", &[kw(K::System)], |_, _| {
        Ok(StackValue::ConfigScope(ConfigScope::Instance))
    });

    g.rule(
        "ConfigStmt",
        &[
            kw(K::Configure),
            n("ConfigScope"),
            kw(K::Set),
            n("NodeName"),
            t(T::Assign),
            n("Expr"),
        ],
        |span, mut args| {
            let value = args.remove(5).into_expr();
            let name = args.remove(3).into_object_ref();
            let scope = match args.remove(1) {
                StackValue::ConfigScope(scope) => scope,
                other => panic!("expected config scope, found {other:?}"),
            };
            Ok(StackValue::Command(Command::ConfigSet(ConfigSet {
                scope,
                name,
                value: Box::new(value),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "ConfigStmt",
        &[
            kw(K::Configure),
            n("ConfigScope"),
            kw(K::Reset),
            n("NodeName"),
            n("OptFilterClause"),
        ],
        |span, mut args| {
            let filter = args.remove(4).into_opt_expr();
            let name = args.remove(3).into_object_ref();
            let scope = match args.remove(1) {
                StackValue::ConfigScope(scope) => scope,
                other => panic!("expected config scope, found {other:?}"),
            };
            Ok(StackValue::Command(Command::ConfigReset(ConfigReset {
                scope,
                name,
                filter: filter.map(Box::new),
                span: span.into(),
            })))
        },
    );
    g.rule(
        "ConfigStmt",
        &[
            kw(K::Configure),
            n("ConfigScope"),
            kw(K::Insert),
            n("NodeName"),
            n("Shape"),
        ],
        |span, mut args| {
            let shape = args.remove(4).into_shape();
            let name = args.remove(3).into_object_ref();
            let scope = match args.remove(1) {
                StackValue::ConfigScope(scope) => scope,
                other => panic!("expected config scope, found {other:?}"),
            };
            Ok(StackValue::Command(Command::ConfigInsert(ConfigInsert {
                scope,
                name,
                shape,
                span: span.into(),
            })))
        },
    );
}
