//! CST to AST lowering.
//!
//! Lowering re-executes the semantic actions of the productions the
//! parser reduced, bottom-up. The traversal is an explicit two-stack
//! loop rather than recursion: queries nest arbitrarily deep and the
//! call stack must not be a limit.

use tql_ast::span::Span;

use crate::cst::CstNode;
use crate::diagnostic::Diagnostic;
use crate::grammar::ReduceKind;
use crate::grammar::StackValue;
use crate::spec::Spec;

/// A unit of pending work.
enum Work<'a> {
    /// Visit a CST node.
    Node(&'a CstNode),
    /// All children of the production are on the result stack; reduce
    /// them.
    Reduce {
        /// The production to reduce.
        production_id: u32,
        /// The number of children to pop.
        argc: usize,
        /// The source span covered by the production.
        span: Span,
    },
}

/// Lowers a CST root to its semantic value.
///
/// The returned value is whatever the root production's action
/// produced; the per-dialect entry points downcast it.
pub fn lower(root: &CstNode, spec: &Spec) -> Result<StackValue, Diagnostic> {
    let mut work: Vec<Work<'_>> = vec![Work::Node(root)];
    let mut result: Vec<StackValue> = Vec::new();

    while let Some(item) = work.pop() {
        match item {
            Work::Node(CstNode::Terminal(terminal)) => {
                result.push(StackValue::Token(terminal.clone()));
            }
            Work::Node(node @ CstNode::Production { production_id, args }) => {
                work.push(Work::Reduce {
                    production_id: *production_id,
                    argc: args.len(),
                    span: node.span().unwrap_or_default(),
                });
                // Children are pushed in reverse so they pop in source
                // order.
                for arg in args.iter().rev() {
                    work.push(Work::Node(arg));
                }
            }
            Work::Reduce {
                production_id,
                argc,
                span,
            } => {
                let args = result.split_off(result.len() - argc);
                let info = spec.production(production_id);
                let value = match info.reduce {
                    ReduceKind::Inline(child) => {
                        let mut args = args;
                        let index = child as usize;
                        assert!(
                            index < args.len(),
                            "inline index {index} out of range for {nonterm}.{method}",
                            nonterm = info.nonterm,
                            method = info.method,
                        );
                        // Forward the child's value as-is.
                        args.swap_remove(index)
                    }
                    ReduceKind::Call(reduce) => reduce(span, args)?,
                };
                result.push(value);
            }
        }
    }

    let value = result.pop().expect("lowering leaves exactly one value");
    assert!(result.is_empty(), "lowering leaves exactly one value");
    Ok(value)
}
