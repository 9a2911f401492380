//! End-to-end parsing scenarios.

use pretty_assertions::assert_eq;
use tql_ast::expr::ConstantKind;
use tql_ast::expr::Expr;
use tql_ast::expr::PathStep;
use tql_ast::stmt::Command;
use tql_grammar::lower;
use tql_grammar::parse;
use tql_grammar::parse_block;
use tql_grammar::parse_fragment;
use tql_grammar::pick_error;
use tql_grammar::tokenize;
use tql_grammar::Dialect;

/// Parses a block that is expected to be error-free.
fn block(source: &str) -> Vec<Command> {
    parse_block(source).unwrap_or_else(|e| panic!("{source:?} failed: {e}"))
}

/// Unwraps a single expression statement.
fn single_query(source: &str) -> Expr {
    let mut commands = block(source);
    assert_eq!(commands.len(), 1, "expected one statement in {source:?}");
    match commands.remove(0) {
        Command::Expr(expr) => expr,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

#[test]
fn minimal_select() {
    let source = "select 1";
    let query = single_query(source);
    let Expr::Select(select) = query else {
        panic!("expected a select query, got {query:?}");
    };
    assert_eq!(select.span.0.start(), 0);
    assert_eq!(select.span.0.end(), source.len());
    let Expr::Constant(constant) = *select.result else {
        panic!("expected a constant result");
    };
    assert_eq!(constant.kind, ConstantKind::Integer);
    assert_eq!(constant.value, "1");
}

#[test]
fn shape_with_filter() {
    let query = single_query("select User { name, email } filter .name = 'Sully'");
    let Expr::Select(select) = query else {
        panic!("expected a select query");
    };

    let Expr::Shape(shape) = *select.result else {
        panic!("expected a shaped result");
    };
    let subject = shape.expr.expect("the shape has a subject");
    let Expr::Path(path) = *subject else {
        panic!("expected a path subject");
    };
    assert!(
        matches!(&path.steps[..], [PathStep::ObjectRef(r)] if r.name == "User"),
        "unexpected subject path: {path:?}"
    );

    let names: Vec<&str> = shape
        .elements
        .iter()
        .map(|element| match &element.expr {
            Expr::Path(p) => match &p.steps[..] {
                [PathStep::Ptr(ptr)] => ptr.name.as_str(),
                other => panic!("unexpected element path: {other:?}"),
            },
            other => panic!("unexpected element: {other:?}"),
        })
        .collect();
    assert_eq!(names, ["name", "email"]);
    assert!(shape.elements.iter().all(|e| e.compexpr.is_none()));

    let filter = select.filter.expect("the query has a filter");
    let Expr::BinOp(cmp) = *filter else {
        panic!("expected a comparison filter");
    };
    assert_eq!(cmp.op, "=");
    let Expr::Path(lhs) = *cmp.left else {
        panic!("expected a path on the left");
    };
    assert!(lhs.partial);
    assert!(matches!(&lhs.steps[..], [PathStep::Ptr(p)] if p.name == "name"));
    let Expr::Constant(rhs) = *cmp.right else {
        panic!("expected a string constant on the right");
    };
    assert_eq!(rhs.value, "Sully");
}

#[test]
fn missing_comma_in_shape_recovers() {
    let tokens = tokenize("SELECT User { name last_name }").unwrap();
    let result = parse(Dialect::Block, &tokens, tql_grammar::default_spec());

    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    let error = &result.errors[0];
    assert_eq!(error.message(), "Missing ','");
    assert_eq!(
        error.hint(),
        Some("It appears that a ',' is missing in a shape before 'last_name'")
    );

    // The recovered tree matches the corrected source, spans aside.
    let recovered = lower::lower(result.out.as_ref().unwrap(), tql_grammar::default_spec())
        .unwrap()
        .into_list()
        .into_iter()
        .map(tql_grammar::grammar::StackValue::into_command)
        .collect::<Vec<_>>();
    let clean = block("SELECT User { name, last_name }");
    assert_eq!(recovered, clean);
}

#[test]
fn unterminated_string_points_at_the_quote() {
    let error = tokenize("SELECT 'oops").unwrap_err();
    assert!(
        error.message().contains("unterminated string"),
        "message: {}",
        error.message()
    );
    assert_eq!(error.span().start(), 7);
}

#[test]
fn dollar_quoted_string_constant() {
    let query = single_query(r#"SELECT $$he said "hi"$$ ;"#);
    let Expr::Select(select) = query else {
        panic!("expected a select query");
    };
    let Expr::Constant(constant) = *select.result else {
        panic!("expected a constant result");
    };
    assert_eq!(constant.value, r#"he said "hi""#);
    assert_eq!(
        constant.kind,
        ConstantKind::String {
            quote: "$$".to_string()
        }
    );
}

#[test]
fn normalization_is_stable_across_literal_values() {
    let a = tql_grammar::normalize("select 1 + 2").unwrap();
    let b = tql_grammar::normalize("select 5 + 10").unwrap();
    assert_eq!(a.key, b.key);
    assert_eq!(a.text, b.text);
    assert_ne!(a.variables, b.variables);
}

#[test]
fn token_texts_cover_the_source() {
    let source = "select User { name := 'x' } filter .name = $0 # done";
    let joined: String = tokenize(source)
        .unwrap()
        .iter()
        .map(|t| t.text.as_str())
        .collect();
    let condensed: String = source[..source.find('#').unwrap()]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let joined_condensed: String = joined.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(joined_condensed, condensed);
}

#[test]
fn reserved_keyword_as_identifier_is_reported() {
    let tokens = tokenize("select User { select }").unwrap();
    let result = parse(Dialect::Block, &tokens, tql_grammar::default_spec());
    assert!(!result.errors.is_empty());
    let error = pick_error(&result.errors);
    assert_eq!(error.message(), "Unexpected keyword 'select'");
    assert!(error.details().unwrap().contains("reserved keyword"));
    assert!(error.hint().unwrap().contains("backticks: `select`"));

    // The offending keyword really is classified as reserved.
    assert!(tql_grammar::Keyword::lookup("select").unwrap().is_reserved());
}

#[test]
fn partial_reserved_keywords_work_as_pointer_names() {
    // `intersect` is partial-reserved: fine after `{`, `.`, and `@`.
    single_query("select User { intersect }");
    single_query("select User.intersect");
}

#[test]
fn backtick_quoted_reserved_names_parse() {
    single_query("select `select`");
}

#[test]
fn explain_suggests_analyze() {
    let tokens = tokenize("explain select 1").unwrap();
    let result = parse(Dialect::Block, &tokens, tql_grammar::default_spec());
    assert!(!result.errors.is_empty());
    let error = pick_error(&result.errors);
    assert_eq!(error.message(), "Unexpected keyword 'explain'");
    assert_eq!(
        error.hint(),
        Some("Use `analyze` to show query performance details")
    );
}

#[test]
fn error_selection_prefers_the_sole_unexpected_keyword() {
    use tql_grammar::Diagnostic;
    use tql_grammar::Span;

    let errors = vec![
        Diagnostic::error("Missing ','", Span::new(2, 0)),
        Diagnostic::error("Unexpected keyword 'select'", Span::new(10, 6)),
    ];
    assert_eq!(pick_error(&errors).message(), "Unexpected keyword 'select'");

    // Otherwise the earliest error wins, with `Unexpected` preferred
    // over `Missing` at the same position.
    let errors = vec![
        Diagnostic::error("Missing ','", Span::new(5, 0)),
        Diagnostic::error("Unexpected 'x'", Span::new(5, 1)),
        Diagnostic::error("Unexpected 'y'", Span::new(9, 1)),
    ];
    assert_eq!(pick_error(&errors).message(), "Unexpected 'x'");
}

#[test]
fn expressions_honor_precedence() {
    let query = single_query("select 1 + 2 * 3");
    let Expr::Select(select) = query else {
        panic!("expected select");
    };
    let Expr::BinOp(add) = *select.result else {
        panic!("expected addition at the root");
    };
    assert_eq!(add.op, "+");
    let Expr::BinOp(mul) = *add.right else {
        panic!("expected multiplication on the right");
    };
    assert_eq!(mul.op, "*");
}

#[test]
fn coalesce_is_right_associative() {
    let query = single_query("select a ?? b ?? c");
    let Expr::Select(select) = query else {
        panic!("expected select");
    };
    let Expr::BinOp(outer) = *select.result else {
        panic!("expected coalesce at the root");
    };
    assert_eq!(outer.op, "??");
    assert!(matches!(*outer.right, Expr::BinOp(inner) if inner.op == "??"));
}

#[test]
fn casts_and_parameters_parse() {
    let query = single_query("select <std::int64>$0 + <optional str>$x");
    let Expr::Select(select) = query else {
        panic!("expected select");
    };
    let Expr::BinOp(add) = *select.result else {
        panic!("expected addition");
    };
    let Expr::TypeCast(left) = *add.left else {
        panic!("expected a cast on the left");
    };
    assert!(matches!(*left.expr, Expr::Parameter(p) if p.name == "0"));
    let Expr::TypeCast(right) = *add.right else {
        panic!("expected a cast on the right");
    };
    assert_eq!(
        right.modifier,
        Some(tql_ast::expr::CastModifier::Optional)
    );
}

#[test]
fn statements_as_expressions_need_parentheses() {
    parse_fragment("(select 1)").unwrap();
    assert!(parse_fragment("select 1 + (select 2)").is_ok());

    let tokens = tokenize("select count(select 1)").unwrap();
    let result = parse(Dialect::Block, &tokens, tql_grammar::default_spec());
    assert!(!result.errors.is_empty());
    let error = pick_error(&result.errors);
    assert_eq!(
        error.hint(),
        Some("Missing parentheses around statement used as an expression")
    );
}

#[test]
fn for_and_group_queries_parse() {
    let query = single_query("for x in {1, 2, 3} union x + 1");
    assert!(matches!(query, Expr::For(_)));

    let query = single_query("group Card by .element");
    let Expr::Group(group) = query else {
        panic!("expected a group query");
    };
    assert_eq!(group.by.len(), 1);
    assert!(group.into.is_none());

    let query = single_query("group Card using element := .element by cube (element, nominal)");
    assert!(matches!(query, Expr::Group(_)));
}

#[test]
fn dml_statements_parse() {
    let query = single_query("insert User { name := 'Alice' } unless conflict on .name else User");
    let Expr::Insert(insert) = query else {
        panic!("expected an insert");
    };
    assert_eq!(insert.subject.name, "User");
    assert_eq!(insert.shape.len(), 1);
    let conflict = insert.unless_conflict.expect("conflict clause");
    assert!(conflict.on.is_some());
    assert!(conflict.else_expr.is_some());

    let query = single_query("update User filter .name = 'x' set { name := 'y' }");
    let Expr::Update(update) = query else {
        panic!("expected an update");
    };
    assert_eq!(update.shape.len(), 1);

    let query = single_query("delete User filter .inactive order by .name limit 10");
    let Expr::Delete(delete) = query else {
        panic!("expected a delete");
    };
    assert!(delete.limit.is_some());
}

#[test]
fn with_blocks_attach_aliases() {
    let query = single_query("with m as module std, x := 1 select x");
    let Expr::Select(select) = query else {
        panic!("expected select");
    };
    assert_eq!(select.aliases.len(), 2);
}

#[test]
fn transaction_statements_parse() {
    let commands = block(
        "start transaction isolation serializable, read only, deferrable; \
         declare savepoint a; rollback to savepoint a; release savepoint a; \
         commit; rollback;",
    );
    assert_eq!(commands.len(), 6);
    let Command::StartTransaction(start) = &commands[0] else {
        panic!("expected start transaction");
    };
    assert!(start.isolation.is_some());
    assert!(start.access.is_some());
    assert!(start.deferrable.is_some());
}

#[test]
fn order_by_uses_then_separator() {
    let query = single_query("select User order by .age asc then .name desc empty last");
    let Expr::Select(select) = query else {
        panic!("expected select");
    };
    assert_eq!(select.order_by.len(), 2);
    assert_eq!(
        select.order_by[1].nones_order,
        Some(tql_ast::qltypes::NonesOrder::Last)
    );
}

#[test]
fn function_calls_take_clauses_and_kwargs() {
    single_query("select count(User filter .active)");
    single_query("select array_agg(User.name order by User.name)");
    single_query("select std::len(name := 'x')");
}
