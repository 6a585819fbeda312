//! `for` statements.
//!
//! Each iteration runs the body in its own scope. Resources and components
//! declared in the body are named with the iteration key appended
//! (`web["prod"]`, `web[0]`) and collected into an [`InstanceGroup`] bound
//! under the plain name in the scope enclosing the outermost loop.

use std::rc::Rc;
use std::sync::Arc;

use stratus_foundation::{Environment, Error, Result, Value};
use stratus_language::{ForStatement, Statement, pretty_expr};
use tracing::debug;

use super::{Binding, Instance, InstanceGroup, Interpreter, Site};
use crate::count::InstanceKey;
use crate::shared;

impl Interpreter {
    /// Runs a `for` statement.
    pub(crate) fn execute_for(&mut self, stmt: &ForStatement, site: &Site) -> Result<()> {
        let (iterable, _) = self.eval_in_frame("", &stmt.iterable, site)?;
        let items = iteration_items(&iterable)
            .map_err(|e| e.with_value(pretty_expr(&stmt.iterable)))?;
        let group_scope = site
            .group_scope
            .clone()
            .unwrap_or_else(|| site.scope.clone());

        let mut loop_vars = site.loop_vars.clone();
        loop_vars.push(stmt.item.clone());
        loop_vars.extend(stmt.index.iter().cloned());

        debug!(item = %stmt.item, iterations = items.len(), "running loop");
        for (position, (key, item)) in items.into_iter().enumerate() {
            let scope = site.scope.child();
            if let Some(index) = &stmt.index {
                scope.init(index.as_str(), Binding::Value(position_value(position)?))?;
            }
            scope.init(stmt.item.as_str(), Binding::Value(item))?;

            let iteration = Site {
                scope,
                prefix: site.prefix.clone(),
                suffix: format!("{}{key}", site.suffix),
                group_scope: Some(group_scope.clone()),
                component: site.component.clone(),
                loop_vars: loop_vars.clone(),
            };
            self.execute_block(&stmt.body, &iteration)?;
            self.collect_iteration(&stmt.body, &iteration, &group_scope)?;
        }
        Ok(())
    }

    /// Adds the instances one iteration declared to their groups.
    fn collect_iteration(
        &mut self,
        body: &[Statement],
        iteration: &Site,
        group_scope: &Environment<Binding>,
    ) -> Result<()> {
        for statement in body {
            let (Statement::Resource(_) | Statement::Component(_)) = statement else {
                continue;
            };
            let Some(name) = statement.name() else {
                continue;
            };
            // Counted declarations and deferred templates stay local to the
            // iteration.
            let instance = match iteration.scope.get(name) {
                Some(Binding::Resource(r)) => Instance::Resource(r),
                Some(Binding::Component(c)) => Instance::Component(c),
                _ => continue,
            };

            let base = format!("{}{name}", iteration.prefix);
            let group = match group_scope.get(name) {
                Some(Binding::Group(group)) => group,
                Some(_) => return Err(Error::declaration_exists(base)),
                None => {
                    let group = shared(InstanceGroup::new(base.as_str()));
                    group_scope.init(name, Binding::Group(Rc::clone(&group)))?;
                    group
                }
            };

            if let Instance::Resource(resource) = &instance {
                let schema = resource.borrow().schema().to_string();
                if let Some(schema) = self.schemas.get(&schema) {
                    schema.borrow_mut().add_to_group(&base, instance.name());
                }
            }
            group
                .borrow_mut()
                .instances
                .insert(iteration.suffix.clone(), instance);
        }
        Ok(())
    }
}

/// Keys and values a loop iterates: array items keyed by string value or
/// position, object keys keyed by themselves.
fn iteration_items(iterable: &Value) -> Result<Vec<(InstanceKey, Value)>> {
    match iterable {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let key = match item {
                    Value::String(s) => InstanceKey::Key(s.to_string()),
                    _ => InstanceKey::Index(position_index(position)?),
                };
                Ok((key, item.clone()))
            })
            .collect(),
        Value::Object(entries) => Ok(entries
            .keys()
            .map(|k| (InstanceKey::Key(k.to_string()), Value::String(Arc::clone(k))))
            .collect()),
        Value::Deferred(deferred) => Err(Error::type_mismatch(format!(
            "cannot iterate `{deferred}` before it is known"
        ))),
        other => Err(Error::type_mismatch(format!(
            "cannot iterate {}",
            other.value_type()
        ))),
    }
}

fn position_index(position: usize) -> Result<i64> {
    i64::try_from(position).map_err(|_| Error::internal("loop position overflow"))
}

fn position_value(position: usize) -> Result<Value> {
    position_index(position).map(Value::Int)
}
