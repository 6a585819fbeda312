//! Expression evaluation.
//!
//! A deferred operand makes the whole expression deferred: the first
//! placeholder encountered is the result. Interpolated strings are the
//! exception; a deferred part renders as the configured placeholder text and
//! the placeholder is still recorded in the current frame.

use std::cmp::Ordering;

use stratus_foundation::{Error, PersistentVec, Result, Value};
use stratus_language::{BinaryOp, Expr, TemplatePart, UnaryOp};

use super::{Binding, Interpreter, Site};
use crate::structs::StructValue;

impl Interpreter {
    /// Evaluates an expression to a value.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, site: &Site) -> Result<Value> {
        match expr {
            Expr::Null(_) => Ok(Value::Null),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Int(n, _) => Ok(Value::Int(*n)),
            Expr::Float(n, _) => Ok(Value::Float(*n)),
            Expr::String(s, _) => Ok(Value::string(s.as_str())),
            Expr::Template(parts, _) => self.eval_template(parts, site),
            Expr::Identifier(..) | Expr::Member(..) | Expr::Index(..) => {
                let place = self.resolve_place(expr, site)?;
                self.place_value(place)
            }
            Expr::Array(items, _) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.eval_expr(item, site)?;
                    if value.is_deferred() {
                        return Ok(value);
                    }
                    values.push(value);
                }
                Ok(Value::from(values))
            }
            Expr::Object(entries, _) => {
                let mut fields = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    let value = self.eval_expr(item, site)?;
                    if value.is_deferred() {
                        return Ok(value);
                    }
                    fields.push((key.as_str(), value));
                }
                Ok(Value::object(fields))
            }
            Expr::Range(start, end, _) => {
                let start = self.eval_expr(start, site)?;
                if start.is_deferred() {
                    return Ok(start);
                }
                let end = self.eval_expr(end, site)?;
                if end.is_deferred() {
                    return Ok(end);
                }
                range(&start, &end)
            }
            Expr::Unary(op, operand, _) => {
                let value = self.eval_expr(operand, site)?;
                if value.is_deferred() {
                    return Ok(value);
                }
                unary(*op, &value)
            }
            Expr::Binary(BinaryOp::And, left, right, _) => {
                let left = self.eval_expr(left, site)?;
                if left.is_deferred() || !left.is_truthy() {
                    return Ok(if left.is_deferred() { left } else { Value::Bool(false) });
                }
                let right = self.eval_expr(right, site)?;
                Ok(if right.is_deferred() {
                    right
                } else {
                    Value::Bool(right.is_truthy())
                })
            }
            Expr::Binary(BinaryOp::Or, left, right, _) => {
                let left = self.eval_expr(left, site)?;
                if left.is_deferred() || left.is_truthy() {
                    return Ok(if left.is_deferred() { left } else { Value::Bool(true) });
                }
                let right = self.eval_expr(right, site)?;
                Ok(if right.is_deferred() {
                    right
                } else {
                    Value::Bool(right.is_truthy())
                })
            }
            Expr::Binary(op, left, right, _) => {
                let left = self.eval_expr(left, site)?;
                let right = self.eval_expr(right, site)?;
                if left.is_deferred() {
                    return Ok(left);
                }
                if right.is_deferred() {
                    return Ok(right);
                }
                binary(*op, &left, &right)
            }
            Expr::Conditional(cond, then, otherwise, _) => {
                let cond = self.eval_expr(cond, site)?;
                if cond.is_deferred() {
                    return Ok(cond);
                }
                if cond.is_truthy() {
                    self.eval_expr(then, site)
                } else {
                    self.eval_expr(otherwise, site)
                }
            }
            Expr::StructInit(name, fields, _) => self.eval_struct(name, fields, site),
        }
    }

    fn eval_template(&mut self, parts: &[TemplatePart], site: &Site) -> Result<Value> {
        let mut out = String::new();
        for part in parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Expr(expr) => {
                    let value = self.eval_expr(expr, site)?;
                    if let Some(deferred) = value.find_deferred() {
                        self.note_deferred(deferred);
                    }
                    out.push_str(&value.interpolate(&self.config.deferred_placeholder));
                }
            }
        }
        Ok(Value::string(out))
    }

    fn eval_struct(&mut self, name: &str, fields: &[(String, Expr)], site: &Site) -> Result<Value> {
        let def = match site.scope.lookup(name) {
            Some(Binding::Struct(def)) => def,
            Some(_) => return Err(Error::type_mismatch(format!("`{name}` is not a struct"))),
            None => return Err(Error::undefined_symbol(name)),
        };

        let mut given = Vec::with_capacity(fields.len());
        for (field, expr) in fields {
            given.push((field.clone(), self.eval_expr(expr, site)?));
        }

        let value = StructValue::build(&def, given, |field| {
            match def.fields.iter().find(|f| f.name == field) {
                Some(stratus_language::StructField {
                    default: Some(default),
                    ..
                }) => self.eval_expr(default, site).map(Some),
                _ => Ok(None),
            }
        })?
        .into_value();

        match value.find_deferred() {
            Some(deferred) => Ok(Value::Deferred(deferred.clone())),
            None => Ok(value),
        }
    }
}

fn range(start: &Value, end: &Value) -> Result<Value> {
    match (start, end) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Array((*a..*b).map(Value::Int).collect())),
        (a, b) => Err(Error::type_mismatch(format!(
            "range bounds must be integers, found {} and {}",
            a.value_type(),
            b.value_type()
        ))),
    }
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Negate, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::type_mismatch("integer overflow").with_value(value)),
        (UnaryOp::Negate, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Negate, other) => Err(Error::type_mismatch(format!(
            "cannot negate {}",
            other.value_type()
        ))
        .with_value(other)),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(equals(left, right))),
        BinaryOp::Ne => Ok(Value::Bool(!equals(left, right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(left, right).ok_or_else(|| mismatch(op, left, right))?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, left, right)
        }
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => {
            left.as_number() == right.as_number()
        }
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (a, b) => a.as_number()?.partial_cmp(&b.as_number()?),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(*b)
            .map(Value::Int)
            .ok_or_else(|| Error::type_mismatch("integer overflow")),
        (Value::String(_), other) | (other, Value::String(_))
            if !matches!(other, Value::Array(_) | Value::Object(_)) =>
        {
            Ok(Value::string(format!(
                "{}{}",
                left.interpolate("null"),
                right.interpolate("null")
            )))
        }
        (Value::Array(a), Value::Array(b)) => Ok(Value::Array(PersistentVec::concat(a, b))),
        (a, b) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            _ => Err(mismatch(BinaryOp::Add, a, b)),
        },
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let (a, b) = (*a, *b);
        if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0 {
            return Err(Error::type_mismatch("division by zero"));
        }
        let result = match op {
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Rem => a.checked_rem(b),
            // `checked_rem` is `None` only for `MIN / -1`, which overflows.
            _ => match a.checked_rem(b) {
                Some(0) | None => a.checked_div(b),
                #[allow(clippy::cast_precision_loss)]
                Some(_) => return Ok(Value::Float(a as f64 / b as f64)),
            },
        };
        return result
            .map(Value::Int)
            .ok_or_else(|| Error::type_mismatch("integer overflow"));
    }

    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(mismatch(op, left, right));
    };
    if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0.0 {
        return Err(Error::type_mismatch("division by zero"));
    }
    Ok(Value::Float(match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => a % b,
    }))
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::type_mismatch(format!(
        "cannot apply `{}` to {} and {}",
        op.symbol(),
        left.value_type(),
        right.value_type()
    ))
}
