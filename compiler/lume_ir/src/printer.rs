//! Textual rendering of IR for diagnostics and logs.
//!
//! The output is meant for humans: shared subexpressions are printed once
//! per use, so printing a heavily shared graph is proportional to its
//! unfolded tree size.

use std::fmt::{self, Display, Formatter, Write};

use lume_stack::ensure_sufficient_stack;

use crate::{BinaryOp, Expr, ExprKind, Stmt, StmtKind, Type, VectorReduceOp};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| write_expr(self, f))
    }
}

fn write_expr(e: &Expr, f: &mut Formatter<'_>) -> fmt::Result {
    let Some(node) = e.node() else {
        return f.write_str("<undefined>");
    };
    match &node.kind {
        ExprKind::IntImm(v) if node.ty == Type::int(32) => write!(f, "{v}"),
        ExprKind::IntImm(v) => write!(f, "({}){v}", node.ty),
        ExprKind::UIntImm(v) if node.ty.is_bool() => {
            f.write_str(if *v == 0 { "false" } else { "true" })
        }
        ExprKind::UIntImm(v) => write!(f, "({}){v}", node.ty),
        ExprKind::FloatImm(v) if node.ty == Type::float(32) => write!(f, "{v:?}f"),
        ExprKind::FloatImm(v) => write!(f, "({}){v:?}", node.ty),
        ExprKind::StringImm(s) => write!(f, "{s:?}"),
        ExprKind::Broadcast { lanes, value } => write!(f, "x{lanes}({value})"),
        ExprKind::Cast(value) => write!(f, "({}){value}", node.ty),
        ExprKind::Reinterpret(value) => write!(f, "reinterpret<{}>({value})", node.ty),
        ExprKind::Variable { name, .. } => f.write_str(name),
        ExprKind::Binary {
            op: op @ (BinaryOp::Min | BinaryOp::Max),
            a,
            b,
        } => write!(f, "{}({a}, {b})", op.as_symbol()),
        ExprKind::Binary { op, a, b } => write!(f, "({a} {} {b})", op.as_symbol()),
        ExprKind::Not(value) => write!(f, "!{value}"),
        ExprKind::Select {
            condition,
            true_value,
            false_value,
        } => write!(f, "select({condition}, {true_value}, {false_value})"),
        ExprKind::Load {
            name,
            index,
            predicate,
            ..
        } => {
            write!(f, "{name}[{index}]")?;
            if predicate.defined() {
                write!(f, " if {predicate}")?;
            }
            Ok(())
        }
        ExprKind::Ramp {
            lanes,
            base,
            stride,
        } => write!(f, "ramp({base}, {stride}, {lanes})"),
        ExprKind::Call { name, args, .. } => {
            write!(f, "{name}(")?;
            write_list(f, args)?;
            f.write_char(')')
        }
        ExprKind::Let { name, value, body } => write!(f, "(let {name} = {value} in {body})"),
        ExprKind::Shuffle { indices, vectors } => {
            f.write_str("shuffle(")?;
            write_list(f, vectors)?;
            write!(f, "; {indices:?})")
        }
        ExprKind::VectorReduce { op, value } => {
            write!(f, "({})vector_reduce_{}({value})", node.ty, reduce_name(*op))
        }
    }
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn reduce_name(op: VectorReduceOp) -> &'static str {
    match op {
        VectorReduceOp::Add => "add",
        VectorReduceOp::SaturatingAdd => "saturating_add",
        VectorReduceOp::Mul => "mul",
        VectorReduceOp::Min => "min",
        VectorReduceOp::Max => "max",
        VectorReduceOp::And => "and",
        VectorReduceOp::Or => "or",
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        StmtPrinter { f, indent: 0 }.print(self)
    }
}

/// Line-oriented statement printer.
struct StmtPrinter<'a, 'b> {
    f: &'a mut Formatter<'b>,
    indent: usize,
}

impl StmtPrinter<'_, '_> {
    fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        for _ in 0..self.indent {
            self.f.write_str("  ")?;
        }
        self.f.write_fmt(args)?;
        self.f.write_char('\n')
    }

    fn nested(&mut self, body: &Stmt) -> fmt::Result {
        self.indent += 1;
        let result = self.print(body);
        self.indent -= 1;
        result
    }

    fn print(&mut self, s: &Stmt) -> fmt::Result {
        ensure_sufficient_stack(|| self.print_node(s))
    }

    fn print_node(&mut self, s: &Stmt) -> fmt::Result {
        let Some(kind) = s.kind() else {
            return self.line(format_args!("<undefined>"));
        };
        match kind {
            StmtKind::LetStmt { name, value, body } => {
                self.line(format_args!("let {name} = {value}"))?;
                self.print(body)
            }
            StmtKind::AssertStmt { condition, message } => {
                self.line(format_args!("assert({condition}, {message})"))
            }
            StmtKind::ProducerConsumer {
                name,
                is_producer,
                body,
            } => {
                let role = if *is_producer { "produce" } else { "consume" };
                self.line(format_args!("{role} {name} {{"))?;
                self.nested(body)?;
                self.line(format_args!("}}"))
            }
            StmtKind::For {
                name,
                for_type,
                device_api,
                min,
                extent,
                body,
            } => {
                self.line(format_args!(
                    "for<{for_type:?}, {device_api:?}> ({name}, {min}, {extent}) {{"
                ))?;
                self.nested(body)?;
                self.line(format_args!("}}"))
            }
            StmtKind::Acquire {
                semaphore,
                count,
                body,
            } => {
                self.line(format_args!("acquire ({semaphore}, {count}) {{"))?;
                self.nested(body)?;
                self.line(format_args!("}}"))
            }
            StmtKind::Store {
                name,
                predicate,
                value,
                index,
                ..
            } => {
                if predicate.defined() {
                    self.line(format_args!("predicate ({predicate}) {name}[{index}] = {value}"))
                } else {
                    self.line(format_args!("{name}[{index}] = {value}"))
                }
            }
            StmtKind::Provide {
                name, values, args, ..
            } => {
                let mut text = format!("{name}(");
                push_list(&mut text, args);
                text.push_str(") = {");
                push_list(&mut text, values);
                text.push('}');
                self.line(format_args!("{text}"))
            }
            StmtKind::Allocate {
                name,
                ty,
                memory_type,
                extents,
                body,
                ..
            } => {
                let mut text = format!("allocate {name}[{ty}");
                for extent in extents {
                    let _ = write!(text, " * {extent}");
                }
                self.line(format_args!("{text}] in {memory_type:?}"))?;
                self.print(body)
            }
            StmtKind::Free { name } => self.line(format_args!("free {name}")),
            StmtKind::Realize {
                name, bounds, body, ..
            } => {
                let mut text = format!("realize {name}(");
                for (i, range) in bounds.iter().enumerate() {
                    if i > 0 {
                        text.push_str(", ");
                    }
                    let _ = write!(text, "[{}, {}]", range.min, range.extent);
                }
                self.line(format_args!("{text}) {{"))?;
                self.nested(body)?;
                self.line(format_args!("}}"))
            }
            StmtKind::Block { first, rest } => {
                self.print(first)?;
                self.print(rest)
            }
            StmtKind::Fork { first, rest } => {
                self.line(format_args!("fork {{"))?;
                self.nested(first)?;
                self.line(format_args!("}} {{"))?;
                self.nested(rest)?;
                self.line(format_args!("}}"))
            }
            StmtKind::IfThenElse {
                condition,
                then_case,
                else_case,
            } => {
                self.line(format_args!("if ({condition}) {{"))?;
                self.nested(then_case)?;
                if else_case.defined() {
                    self.line(format_args!("}} else {{"))?;
                    self.nested(else_case)?;
                }
                self.line(format_args!("}}"))
            }
            StmtKind::Evaluate(value) => self.line(format_args!("{value}")),
            StmtKind::Atomic {
                producer_name,
                mutex_name,
                body,
            } => {
                if mutex_name.is_empty() {
                    self.line(format_args!("atomic ({producer_name}) {{"))?;
                } else {
                    self.line(format_args!("atomic ({producer_name}, {mutex_name}) {{"))?;
                }
                self.nested(body)?;
                self.line(format_args!("}}"))
            }
        }
    }
}

fn push_list(text: &mut String, items: &[Expr]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        let _ = write!(text, "{item}");
    }
}
