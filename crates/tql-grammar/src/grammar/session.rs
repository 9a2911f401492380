//! Session command productions.

use tql_ast::stmt::Command;
use tql_ast::stmt::SessionResetAlias;
use tql_ast::stmt::SessionResetAliasKind;
use tql_ast::stmt::SessionSetAlias;

use super::kw;
use super::n;
use super::t;
use super::GrammarBuilder;
use super::StackValue;
use crate::keywords::Keyword as K;
use crate::token::TokenKind as T;

/// Registers the session command productions.
pub fn register(g: &mut GrammarBuilder) {
    g.inline("SessionStmt", &[n("SetStmt")], 0);
    g.inline("SessionStmt", &[n("ResetStmt")], 0);

    g.rule(
        "SetStmt",
        &[kw(K::Set), kw(K::Module), n("DotName")],
        |span, mut args| {
            let module = args.remove(2).into_str();
            Ok(StackValue::Command(Command::SessionSetAlias(
                SessionSetAlias {
                    alias: None,
                    module,
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "SetStmt",
        &[
            kw(K::Set),
            kw(K::Alias),
            n("Identifier"),
            kw(K::As),
            kw(K::Module),
            n("DotName"),
        ],
        |span, mut args| {
            let module = args.remove(5).into_str();
            let alias = args.remove(2).into_str();
            Ok(StackValue::Command(Command::SessionSetAlias(
                SessionSetAlias {
                    alias: Some(alias),
                    module,
                    span: span.into(),
                },
            )))
        },
    );

    g.rule("ResetStmt", &[kw(K::Reset), kw(K::Module)], |span, _| {
        Ok(StackValue::Command(Command::SessionResetAlias(
            SessionResetAlias {
                kind: SessionResetAliasKind::Module,
                span: span.into(),
            },
        )))
    });
    g.rule(
        "ResetStmt",
        &[kw(K::Reset), kw(K::Alias), n("Identifier")],
        |span, mut args| {
            let alias = args.remove(2).into_str();
            Ok(StackValue::Command(Command::SessionResetAlias(
                SessionResetAlias {
                    kind: SessionResetAliasKind::Alias(alias),
                    span: span.into(),
                },
            )))
        },
    );
    g.rule(
        "ResetStmt",
        &[kw(K::Reset), kw(K::Alias), t(T::Star)],
        |span, _| {
            Ok(StackValue::Command(Command::SessionResetAlias(
                SessionResetAlias {
                    kind: SessionResetAliasKind::AllAliases,
                    span: span.into(),
                },
            )))
        },
    );
}
