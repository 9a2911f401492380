//! AST traversal.
//!
//! Traversal is depth-first in source order. Each node is visited twice,
//! once on entry and once on exit; a visitor that needs parent links
//! maintains its own ancestor stack from the enter/exit pairs, which is
//! also how the parent relation is materialized on demand (it is never
//! stored in the nodes themselves).

use crate::ddl::DdlCommand;
use crate::expr::AliasDecl;
use crate::expr::Expr;
use crate::expr::GroupingElement;
use crate::expr::PathStep;
use crate::expr::ShapeElement;
use crate::expr::SortExpr;
use crate::expr::TypeExpr;
use crate::sdl::SdlDeclaration;
use crate::sdl::SdlMember;
use crate::stmt::Command;

/// The reason a node is being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisitReason {
    /// The traversal has entered the node.
    Enter,
    /// The traversal has exited the node.
    Exit,
}

/// A visitor over the AST.
///
/// All methods have empty default implementations; implement the ones
/// relevant to the traversal at hand.
#[allow(unused_variables)]
pub trait Visitor {
    /// Visits an expression.
    fn expr(&mut self, reason: VisitReason, expr: &Expr) {}

    /// Visits a top-level command.
    fn command(&mut self, reason: VisitReason, command: &Command) {}

    /// Visits a DDL command.
    fn ddl(&mut self, reason: VisitReason, command: &DdlCommand) {}

    /// Visits a shape element.
    fn shape_element(&mut self, reason: VisitReason, element: &ShapeElement) {}

    /// Visits a type expression.
    fn type_expr(&mut self, reason: VisitReason, ty: &TypeExpr) {}

    /// Visits an SDL declaration.
    fn sdl_declaration(&mut self, reason: VisitReason, decl: &SdlDeclaration) {}
}

/// Walks an expression and its descendants.
pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    v.expr(VisitReason::Enter, expr);
    match expr {
        Expr::Path(path) => {
            for step in &path.steps {
                match step {
                    PathStep::TypeIntersection(i) => walk_type_expr(v, &i.ty),
                    PathStep::Expr(e) => walk_expr(v, e),
                    _ => {}
                }
            }
        }
        Expr::Global(_) | Expr::Constant(_) | Expr::BytesConstant(_) | Expr::Parameter(_) => {}
        Expr::TypeCast(n) => {
            walk_type_expr(v, &n.ty);
            walk_expr(v, &n.expr);
        }
        Expr::Introspect(n) => walk_type_expr(v, &n.ty),
        Expr::UnaryOp(n) => walk_expr(v, &n.operand),
        Expr::BinOp(n) => {
            walk_expr(v, &n.left);
            walk_expr(v, &n.right);
        }
        Expr::IsOp(n) => {
            walk_expr(v, &n.expr);
            walk_type_expr(v, &n.ty);
        }
        Expr::IfElse(n) => {
            walk_expr(v, &n.condition);
            walk_expr(v, &n.if_expr);
            walk_expr(v, &n.else_expr);
        }
        Expr::Indirection(n) => {
            walk_expr(v, &n.expr);
            match &n.op {
                crate::expr::IndirectionOp::Index(i) => walk_expr(v, i),
                crate::expr::IndirectionOp::Slice { start, stop } => {
                    if let Some(start) = start {
                        walk_expr(v, start);
                    }
                    if let Some(stop) = stop {
                        walk_expr(v, stop);
                    }
                }
            }
        }
        Expr::Tuple(n) => n.elements.iter().for_each(|e| walk_expr(v, e)),
        Expr::NamedTuple(n) => n.elements.iter().for_each(|e| walk_expr(v, &e.val)),
        Expr::Array(n) => n.elements.iter().for_each(|e| walk_expr(v, e)),
        Expr::Set(n) => n.elements.iter().for_each(|e| walk_expr(v, e)),
        Expr::Shape(n) => {
            if let Some(subject) = &n.expr {
                walk_expr(v, subject);
            }
            for element in &n.elements {
                walk_shape_element(v, element);
            }
        }
        Expr::Splat(n) => {
            if let Some(ty) = &n.ty {
                walk_type_expr(v, ty);
            }
        }
        Expr::FuncCall(n) => {
            for arg in &n.args {
                walk_expr(v, &arg.arg);
                if let Some(filter) = &arg.filter {
                    walk_expr(v, filter);
                }
                for key in &arg.sort {
                    walk_sort_expr(v, key);
                }
            }
            for (_, value) in &n.kwargs {
                walk_expr(v, value);
            }
        }
        Expr::Detached(n) => walk_expr(v, &n.expr),
        Expr::Select(n) => {
            walk_aliases(v, &n.aliases);
            walk_expr(v, &n.result);
            if let Some(filter) = &n.filter {
                walk_expr(v, filter);
            }
            for key in &n.order_by {
                walk_sort_expr(v, key);
            }
            if let Some(offset) = &n.offset {
                walk_expr(v, offset);
            }
            if let Some(limit) = &n.limit {
                walk_expr(v, limit);
            }
        }
        Expr::For(n) => {
            walk_aliases(v, &n.aliases);
            walk_expr(v, &n.iterator);
            walk_expr(v, &n.result);
        }
        Expr::Group(n) => {
            walk_aliases(v, &n.aliases);
            walk_expr(v, &n.subject);
            walk_aliases(v, &n.using);
            for element in &n.by {
                walk_grouping_element(v, element);
            }
            if let Some(result) = &n.result {
                walk_expr(v, result);
            }
        }
        Expr::Insert(n) => {
            walk_aliases(v, &n.aliases);
            for element in &n.shape {
                walk_shape_element(v, element);
            }
            if let Some(conflict) = &n.unless_conflict {
                if let Some(on) = &conflict.on {
                    walk_expr(v, on);
                }
                if let Some(else_expr) = &conflict.else_expr {
                    walk_expr(v, else_expr);
                }
            }
        }
        Expr::Update(n) => {
            walk_aliases(v, &n.aliases);
            walk_expr(v, &n.subject);
            if let Some(filter) = &n.filter {
                walk_expr(v, filter);
            }
            for element in &n.shape {
                walk_shape_element(v, element);
            }
        }
        Expr::Delete(n) => {
            walk_aliases(v, &n.aliases);
            walk_expr(v, &n.subject);
            if let Some(filter) = &n.filter {
                walk_expr(v, filter);
            }
            for key in &n.order_by {
                walk_sort_expr(v, key);
            }
            if let Some(offset) = &n.offset {
                walk_expr(v, offset);
            }
            if let Some(limit) = &n.limit {
                walk_expr(v, limit);
            }
        }
    }
    v.expr(VisitReason::Exit, expr);
}

/// Walks a shape element and its descendants.
pub fn walk_shape_element<V: Visitor + ?Sized>(v: &mut V, element: &ShapeElement) {
    v.shape_element(VisitReason::Enter, element);
    walk_expr(v, &element.expr);
    for nested in &element.elements {
        walk_shape_element(v, nested);
    }
    if let Some(compexpr) = &element.compexpr {
        walk_expr(v, compexpr);
    }
    if let Some(filter) = &element.filter {
        walk_expr(v, filter);
    }
    for key in &element.order_by {
        walk_sort_expr(v, key);
    }
    if let Some(offset) = &element.offset {
        walk_expr(v, offset);
    }
    if let Some(limit) = &element.limit {
        walk_expr(v, limit);
    }
    v.shape_element(VisitReason::Exit, element);
}

/// Walks a type expression and its descendants.
pub fn walk_type_expr<V: Visitor + ?Sized>(v: &mut V, ty: &TypeExpr) {
    v.type_expr(VisitReason::Enter, ty);
    match ty {
        TypeExpr::Name(name) => {
            for arg in &name.subtypes {
                walk_type_expr(v, &arg.ty);
            }
        }
        TypeExpr::Op(op) => {
            walk_type_expr(v, &op.left);
            walk_type_expr(v, &op.right);
        }
        TypeExpr::Typeof(of) => walk_expr(v, &of.expr),
    }
    v.type_expr(VisitReason::Exit, ty);
}

/// Walks a top-level command and its descendants.
pub fn walk_command<V: Visitor + ?Sized>(v: &mut V, command: &Command) {
    v.command(VisitReason::Enter, command);
    match command {
        Command::Expr(expr) => walk_expr(v, expr),
        Command::Describe(_)
        | Command::StartTransaction(_)
        | Command::CommitTransaction(_)
        | Command::RollbackTransaction(_)
        | Command::DeclareSavepoint(_)
        | Command::ReleaseSavepoint(_)
        | Command::RollbackToSavepoint(_)
        | Command::SessionSetAlias(_)
        | Command::SessionResetAlias(_) => {}
        Command::Analyze(n) => walk_expr(v, &n.query),
        Command::Administer(n) => walk_expr(v, &n.expr),
        Command::ConfigSet(n) => walk_expr(v, &n.value),
        Command::ConfigReset(n) => {
            if let Some(filter) = &n.filter {
                walk_expr(v, filter);
            }
        }
        Command::ConfigInsert(n) => {
            for element in &n.shape {
                walk_shape_element(v, element);
            }
        }
        Command::Ddl(ddl) => walk_ddl(v, ddl),
    }
    v.command(VisitReason::Exit, command);
}

/// Walks a DDL command and its nested subcommands.
pub fn walk_ddl<V: Visitor + ?Sized>(v: &mut V, command: &DdlCommand) {
    v.ddl(VisitReason::Enter, command);
    match command {
        DdlCommand::CreateMigration(n) => {
            for nested in &n.body.commands {
                walk_command(v, nested);
            }
        }
        DdlCommand::CreateExtensionPackage(n) | DdlCommand::DropExtensionPackage(n) => {
            for nested in &n.body.commands {
                walk_command(v, nested);
            }
        }
        DdlCommand::StartMigration(n) => {
            for decl in &n.target.declarations {
                walk_sdl_declaration(v, decl);
            }
        }
        DdlCommand::SetField(n) => walk_expr(v, &n.value),
        DdlCommand::SetAnnotationValue(n) => walk_expr(v, &n.value),
        DdlCommand::SetUsing(n) => walk_expr(v, &n.expr),
        DdlCommand::CreateIndex(n) => {
            walk_expr(v, &n.expr);
            if let Some(except) = &n.except {
                walk_expr(v, except);
            }
            walk_ddl_commands(v, &n.commands);
        }
        DdlCommand::AlterIndex(n) | DdlCommand::DropIndex(n) => {
            walk_expr(v, &n.expr);
            walk_ddl_commands(v, &n.commands);
        }
        DdlCommand::CreateAlias(n) => {
            if let Some(value) = &n.value {
                walk_expr(v, value);
            }
            walk_ddl_commands(v, &n.commands);
        }
        DdlCommand::CreateConcreteLink(n) | DdlCommand::CreateConcreteProperty(n) => {
            if let Some(target) = &n.target {
                match target {
                    crate::ddl::PointerTarget::Type(ty) => walk_type_expr(v, ty),
                    crate::ddl::PointerTarget::Computed(expr) => walk_expr(v, expr),
                }
            }
            walk_ddl_commands(v, &n.commands);
        }
        DdlCommand::CreateConcreteConstraint(n) => {
            for arg in &n.args {
                walk_expr(v, arg);
            }
            if let Some(on) = &n.on {
                walk_expr(v, on);
            }
            if let Some(except) = &n.except {
                walk_expr(v, except);
            }
            walk_ddl_commands(v, &n.commands);
        }
        DdlCommand::CreateRole(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateModule(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateScalarType(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateObjectType(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateAnnotation(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateLink(n) | DdlCommand::CreateProperty(n) => {
            walk_ddl_commands(v, &n.commands)
        }
        DdlCommand::CreateConstraint(n) => {
            if let Some(on) = &n.on {
                walk_expr(v, on);
            }
            walk_ddl_commands(v, &n.commands);
        }
        DdlCommand::CreateFunction(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateOperator(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateCast(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::CreateExtension(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::AlterRole(n)
        | DdlCommand::AlterMigration(n)
        | DdlCommand::AlterModule(n)
        | DdlCommand::AlterScalarType(n)
        | DdlCommand::AlterObjectType(n)
        | DdlCommand::AlterAlias(n)
        | DdlCommand::AlterAnnotation(n)
        | DdlCommand::AlterLink(n)
        | DdlCommand::AlterConcreteLink(n)
        | DdlCommand::AlterProperty(n)
        | DdlCommand::AlterConcreteProperty(n)
        | DdlCommand::AlterConstraint(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::AlterConcreteConstraint(n) | DdlCommand::DropConcreteConstraint(n) => {
            walk_ddl_commands(v, &n.commands)
        }
        DdlCommand::AlterFunction(n) | DdlCommand::DropFunction(n) => {
            walk_ddl_commands(v, &n.commands)
        }
        DdlCommand::AlterOperator(n) | DdlCommand::DropOperator(n) => {
            walk_ddl_commands(v, &n.commands)
        }
        DdlCommand::AlterCast(n) | DdlCommand::DropCast(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::DropDatabase(n)
        | DdlCommand::DropRole(n)
        | DdlCommand::DropMigration(n)
        | DdlCommand::DropModule(n)
        | DdlCommand::DropScalarType(n)
        | DdlCommand::DropObjectType(n)
        | DdlCommand::DropAlias(n)
        | DdlCommand::DropAnnotation(n)
        | DdlCommand::DropLink(n)
        | DdlCommand::DropConcreteLink(n)
        | DdlCommand::DropProperty(n)
        | DdlCommand::DropConcreteProperty(n)
        | DdlCommand::DropConstraint(n)
        | DdlCommand::DropExtension(n) => walk_ddl_commands(v, &n.commands),
        DdlCommand::SetPointerType(n) => {
            walk_type_expr(v, &n.ty);
            if let Some(expr) = &n.cast_expr {
                walk_expr(v, expr);
            }
        }
        DdlCommand::SetPointerCardinality(n) => {
            if let Some(expr) = &n.conv_expr {
                walk_expr(v, expr);
            }
        }
        DdlCommand::SetPointerOptionality(n) => {
            if let Some(expr) = &n.fill_expr {
                walk_expr(v, expr);
            }
        }
        DdlCommand::CreateDatabase(_)
        | DdlCommand::AbortMigration(_)
        | DdlCommand::PopulateMigration(_)
        | DdlCommand::CommitMigration(_)
        | DdlCommand::ResetField(_)
        | DdlCommand::DropAnnotationValue(_)
        | DdlCommand::Rename(_)
        | DdlCommand::AlterAddInherit(_)
        | DdlCommand::AlterDropInherit(_)
        | DdlCommand::OnTargetDelete(_)
        | DdlCommand::OnSourceDelete(_) => {}
    }
    v.ddl(VisitReason::Exit, command);
}

/// Walks an SDL declaration and its descendants.
pub fn walk_sdl_declaration<V: Visitor + ?Sized>(v: &mut V, decl: &SdlDeclaration) {
    v.sdl_declaration(VisitReason::Enter, decl);
    match decl {
        SdlDeclaration::Module(n) => {
            for nested in &n.declarations {
                walk_sdl_declaration(v, nested);
            }
        }
        SdlDeclaration::ScalarType(n) => walk_sdl_members(v, &n.members),
        SdlDeclaration::ObjectType(n) => walk_sdl_members(v, &n.members),
        SdlDeclaration::Alias(n) => walk_expr(v, &n.value),
        SdlDeclaration::Link(n) | SdlDeclaration::Property(n) => walk_sdl_members(v, &n.members),
        SdlDeclaration::Constraint(n) => {
            if let Some(on) = &n.on {
                walk_expr(v, on);
            }
            walk_sdl_members(v, &n.members);
        }
        SdlDeclaration::Annotation(_) | SdlDeclaration::ExtensionRequirement(_) => {}
        SdlDeclaration::Function(n) => walk_sdl_members(v, &n.members),
    }
    v.sdl_declaration(VisitReason::Exit, decl);
}

fn walk_ddl_commands<V: Visitor + ?Sized>(v: &mut V, commands: &[DdlCommand]) {
    for command in commands {
        walk_ddl(v, command);
    }
}

fn walk_sdl_members<V: Visitor + ?Sized>(v: &mut V, members: &[SdlMember]) {
    for member in members {
        match member {
            SdlMember::Pointer(n) => {
                if let Some(target) = &n.target {
                    walk_type_expr(v, target);
                }
                if let Some(computed) = &n.computed {
                    walk_expr(v, computed);
                }
                walk_sdl_members(v, &n.members);
            }
            SdlMember::Constraint(n) => {
                for arg in &n.args {
                    walk_expr(v, arg);
                }
                if let Some(on) = &n.on {
                    walk_expr(v, on);
                }
                if let Some(except) = &n.except {
                    walk_expr(v, except);
                }
                walk_sdl_members(v, &n.members);
            }
            SdlMember::Index(n) => {
                walk_expr(v, &n.expr);
                if let Some(except) = &n.except {
                    walk_expr(v, except);
                }
                walk_sdl_members(v, &n.members);
            }
            SdlMember::AnnotationValue(n) => walk_expr(v, &n.value),
            SdlMember::Field(n) => walk_expr(v, &n.value),
            SdlMember::OnTargetDelete(..) | SdlMember::OnSourceDelete(..) => {}
        }
    }
}

fn walk_aliases<V: Visitor + ?Sized>(v: &mut V, aliases: &[AliasDecl]) {
    for alias in aliases {
        if let AliasDecl::Expr { expr, .. } = alias {
            walk_expr(v, expr);
        }
    }
}

fn walk_sort_expr<V: Visitor + ?Sized>(v: &mut V, key: &SortExpr) {
    walk_expr(v, &key.path);
}

fn walk_grouping_element<V: Visitor + ?Sized>(v: &mut V, element: &GroupingElement) {
    match element {
        GroupingElement::Simple(expr) => walk_expr(v, expr),
        GroupingElement::Tuple(elements, _)
        | GroupingElement::Sets(elements, _)
        | GroupingElement::Cube(elements, _)
        | GroupingElement::Rollup(elements, _) => {
            for nested in elements {
                walk_grouping_element(v, nested);
            }
        }
        GroupingElement::Empty(_) => {}
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::expr::BinOp;
    use crate::expr::Constant;
    use crate::span::Span;

    #[derive(Default)]
    struct Counter {
        entered: usize,
        depth: usize,
        max_depth: usize,
    }

    impl Visitor for Counter {
        fn expr(&mut self, reason: VisitReason, _: &Expr) {
            match reason {
                VisitReason::Enter => {
                    self.entered += 1;
                    self.depth += 1;
                    self.max_depth = self.max_depth.max(self.depth);
                }
                VisitReason::Exit => self.depth -= 1,
            }
        }
    }

    #[test]
    fn enter_exit_pairs_balance() {
        let expr = Expr::BinOp(BinOp {
            left: Box::new(Expr::Constant(Constant::integer("1", Span::new(0, 1)))),
            op: "+".into(),
            right: Box::new(Expr::Constant(Constant::integer("2", Span::new(4, 1)))),
            span: Span::new(0, 5).into(),
        });

        let mut counter = Counter::default();
        walk_expr(&mut counter, &expr);
        assert_eq!(counter.entered, 3);
        assert_eq!(counter.depth, 0);
        assert_eq!(counter.max_depth, 2);
    }
}
