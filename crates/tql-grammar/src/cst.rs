//! The concrete syntax tree.
//!
//! A CST mirrors the grammar one-to-one: terminals are consumed tokens,
//! productions hold exactly the symbols of their right-hand side in
//! source order. The tree lives only between the parser and the lowerer
//! and is consumed whole by the latter.

use tql_ast::span::Span;

use crate::token::Value;

/// A terminal CST node: one consumed token.
#[derive(Debug, Clone, PartialEq)]
pub struct CstTerminal {
    /// The raw source slice of the token.
    pub text: String,
    /// The decoded payload of the token, for literals.
    pub value: Option<Value>,
    /// The source span of the token.
    pub span: Span,
}

/// A node of the concrete syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CstNode {
    /// A consumed token.
    Terminal(CstTerminal),
    /// A reduced production and its children.
    Production {
        /// The production that was reduced.
        production_id: u32,
        /// The child nodes, exactly the right-hand side symbols in
        /// source order.
        args: Vec<CstNode>,
    },
}

impl CstNode {
    /// Gets the source span covered by the node, when any of its
    /// terminals carry one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CstNode::Terminal(t) => (!t.span.is_empty()).then_some(t.span),
            CstNode::Production { args, .. } => {
                let mut span: Option<Span> = None;
                for arg in args {
                    if let Some(child) = arg.span() {
                        span = Some(match span {
                            Some(current) => current.union(child),
                            None => child,
                        });
                    }
                }
                span
            }
        }
    }
}
