//! The per-dialect start productions.
//!
//! One parser table serves every dialect: each `Grammar` production
//! begins with a distinct synthetic start token injected by the driver,
//! and the grammars share all common nonterminals below that point.

use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use crate::token::TokenKind as T;

/// Registers the start productions.
pub fn register(g: &mut GrammarBuilder) {
    g.inline("Grammar", &[t(T::StartBlock), n("QLBlock")], 1);
    g.inline("Grammar", &[t(T::StartFragment), n("ExprStmt")], 1);
    g.inline("Grammar", &[t(T::StartFragment), n("Expr")], 1);
    g.inline("Grammar", &[t(T::StartMigration), n("NestedBlock")], 1);
    g.inline("Grammar", &[t(T::StartExtension), n("NestedBlock")], 1);
    g.inline("Grammar", &[t(T::StartSdlDocument), n("SDLDocument")], 1);

    g.rule("QLBlock", &[n("OptSemicolons")], |_, _| {
        Ok(StackValue::List(Vec::new()))
    });
    g.rule(
        "QLBlock",
        &[n("StatementBlock"), n("OptSemicolons")],
        |_, mut args| {
            let statements = args
                .remove(0)
                .into_list()
                .into_iter()
                .map(|v| StackValue::Command(v.into_command()))
                .collect();
            Ok(StackValue::List(statements))
        },
    );
    g.list("StatementBlock", n("SingleStatement"), Some(n("Semicolons")));

    g.inline("SingleStatement", &[n("Stmt")], 0);
    g.rule("SingleStatement", &[n("DDLStmt")], |_, mut args| {
        Ok(StackValue::Command(args.remove(0).into_command()))
    });
    g.inline("SingleStatement", &[n("SessionStmt")], 0);
    g.inline("SingleStatement", &[n("ConfigStmt")], 0);
}
