//! Serializable snapshots of an evaluation.
//!
//! A [`Report`] is what a plan step hands to the next stage: every input,
//! output and instance with its known values, what is still deferred, and
//! the order to apply in. Values of `@sensitive` fields are replaced by
//! [`REDACTED`]. Reports encode to `MessagePack` with named fields.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use stratus_engine::{
    ComponentValue, DeferredResourceTemplate, Evaluation, FieldRecord, ResourceValue,
};
use stratus_foundation::{Error, ErrorKind, Result, Value};
use stratus_language::pretty_expr;

/// Text that replaces sensitive values.
pub const REDACTED: &str = "<sensitive>";

/// An input, output or var.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldEntry {
    /// Field name, qualified for outputs declared in loops.
    pub name: String,
    /// The value, `null` while deferred.
    pub value: Value,
    /// What the value waits on, as `resource.property`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred: Option<String>,
    /// Whether the value was redacted.
    pub sensitive: bool,
    /// `@description` text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resource instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceEntry {
    /// Qualified instance name.
    pub name: String,
    /// Schema type name.
    pub schema: String,
    /// Identifier of an adopted resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<String>,
    /// Property values in schema order.
    pub properties: IndexMap<String, Value>,
    /// Deferred properties and what they wait on.
    pub deferred: IndexMap<String, String>,
    /// Names this instance depends on.
    pub dependencies: Vec<String>,
    /// Providers from `@provider`.
    pub providers: Vec<String>,
    /// Key/value tags from `@tags`.
    pub tags: IndexMap<String, Value>,
    /// Bare labels from `@tags`.
    pub labels: Vec<String>,
}

/// A component instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentEntry {
    /// Qualified instance name.
    pub name: String,
    /// Component definition name.
    pub component_type: String,
    /// Inputs and outputs.
    pub properties: IndexMap<String, Value>,
    /// Deferred inputs/outputs and what they wait on.
    pub deferred: IndexMap<String, String>,
    /// Qualified names of the instances declared in the body.
    pub members: Vec<String>,
}

/// A counted declaration whose instances are created after apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    /// Base name of the declaration.
    pub name: String,
    /// Schema or component type.
    pub resource_type: String,
    /// The `@count` argument as written.
    pub count: String,
    /// The value the count waits on.
    pub blocked_on: String,
    /// Everything that must exist first.
    pub dependencies: Vec<String>,
}

/// A serializable snapshot of an [`Evaluation`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Program inputs.
    pub inputs: Vec<FieldEntry>,
    /// Top-level vars.
    pub vars: Vec<FieldEntry>,
    /// Program outputs.
    pub outputs: Vec<FieldEntry>,
    /// Resource instances, grouped by schema.
    pub resources: Vec<ResourceEntry>,
    /// Component instances.
    pub components: Vec<ComponentEntry>,
    /// Deferred templates.
    pub templates: Vec<TemplateEntry>,
    /// Instance names, dependencies first.
    pub apply_order: Vec<String>,
}

impl Report {
    /// Snapshots `evaluation`.
    ///
    /// # Errors
    /// Returns `Cycle` if the dependency graph cannot be ordered.
    pub fn from_evaluation(evaluation: &Evaluation) -> Result<Self> {
        Ok(Self {
            inputs: evaluation.inputs().map(field_entry).collect(),
            vars: evaluation.vars().map(field_entry).collect(),
            outputs: evaluation.outputs().map(field_entry).collect(),
            resources: evaluation
                .resources()
                .iter()
                .map(|r| resource_entry(&r.borrow()))
                .collect(),
            components: evaluation
                .components()
                .map(|(_, c)| component_entry(&c.borrow()))
                .collect(),
            templates: evaluation.templates().iter().map(template_entry).collect(),
            apply_order: evaluation.apply_order()?,
        })
    }

    /// Returns the resource entry named `name`.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Encodes the report as `MessagePack` with named fields.
    ///
    /// # Errors
    /// Returns `Serialization` if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }

    /// Writes the encoded report to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be written, or `Serialization` if
    /// encoding fails.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let io_error = |e: std::io::Error| {
            Error::new(ErrorKind::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };

        let bytes = self.to_bytes()?;
        let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
        writer.write_all(&bytes).map_err(io_error)?;
        writer.flush().map_err(io_error)
    }
}

fn field_entry(record: &FieldRecord) -> FieldEntry {
    FieldEntry {
        name: record.name.clone(),
        value: redact(&record.value, record.sensitive),
        deferred: record.deferred.as_ref().map(ToString::to_string),
        sensitive: record.sensitive,
        description: record.description.clone(),
    }
}

fn resource_entry(resource: &ResourceValue) -> ResourceEntry {
    let meta = resource.meta();
    ResourceEntry {
        name: resource.name().to_string(),
        schema: resource.schema().to_string(),
        existing: resource.existing().map(str::to_string),
        properties: resource
            .properties()
            .into_iter()
            .map(|(name, value)| {
                let value = redact(&value, meta.is_sensitive(&name));
                (name, value)
            })
            .collect(),
        deferred: deferred_map(meta.deferred_properties()),
        dependencies: meta.dependencies().map(str::to_string).collect(),
        providers: meta.providers().map(str::to_string).collect(),
        tags: meta
            .tags()
            .entries()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        labels: meta.tags().labels().map(str::to_string).collect(),
    }
}

fn component_entry(component: &ComponentValue) -> ComponentEntry {
    let meta = component.meta();
    ComponentEntry {
        name: component.name().to_string(),
        component_type: component.component_type().to_string(),
        properties: component
            .properties()
            .into_iter()
            .map(|(name, value)| {
                let value = redact(&value, meta.is_sensitive(&name));
                (name, value)
            })
            .collect(),
        deferred: deferred_map(meta.deferred_properties()),
        members: component.members().to_vec(),
    }
}

fn template_entry(template: &DeferredResourceTemplate) -> TemplateEntry {
    TemplateEntry {
        name: template.template_name.clone(),
        resource_type: template.resource_type.clone(),
        count: pretty_expr(&template.count_expression),
        blocked_on: template.blocked_on.to_string(),
        dependencies: template.dependencies.iter().cloned().collect(),
    }
}

fn deferred_map(
    deferred: &IndexMap<String, stratus_foundation::DeferredValue>,
) -> IndexMap<String, String> {
    deferred
        .iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect()
}

fn redact(value: &Value, sensitive: bool) -> Value {
    if sensitive && !value.is_null() {
        Value::from(REDACTED)
    } else {
        value.clone()
    }
}

// =============================================================================
// Plan text
// =============================================================================

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for resource in &self.resources {
            let marker = if resource.existing.is_some() { "=" } else { "+" };
            writeln!(f, "{marker} {} {}", resource.schema, resource.name)?;
            for (name, value) in &resource.properties {
                match resource.deferred.get(name) {
                    Some(waits_on) => {
                        writeln!(f, "    {name} = (known after apply: {waits_on})")?;
                    }
                    None => writeln!(f, "    {name} = {value}")?,
                }
            }
        }
        for template in &self.templates {
            writeln!(
                f,
                "~ {} {}[*] (count known after apply: {})",
                template.resource_type, template.name, template.blocked_on
            )?;
        }
        for output in &self.outputs {
            match &output.deferred {
                Some(waits_on) => {
                    writeln!(f, "output {} = (known after apply: {waits_on})", output.name)?;
                }
                None => writeln!(f, "output {} = {}", output.name, output.value)?,
            }
        }
        Ok(())
    }
}
