//! Resource graph evaluation for Stratus.
//!
//! This crate turns a validated [`Program`](stratus_language::Program) into
//! an [`Evaluation`]. It provides:
//! - [`SchemaValue`], [`ResourceValue`], [`ComponentValue`], [`StructValue`] - the value model
//! - [`ResourceRef`] - references to another declaration's properties
//! - [`DependencyTracker`] - in-progress marking, dependency edges, cycle detection
//! - [`CountDirective`] and [`DeferredResourceTemplate`] - `@count` expansion
//! - [`DecoratorRegistry`] - the built-in decorators and the [`Decorator`] contract
//! - [`Interpreter`] - the evaluator itself
//! - [`InputProvider`] - where program inputs come from

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::cell::RefCell;
use std::rc::Rc;

pub mod component;
pub mod config;
pub mod count;
pub mod decorator;
pub mod evaluation;
pub mod input;
pub mod interpreter;
pub mod record;
pub mod reference;
pub mod resource;
pub mod schema;
pub mod structs;
pub mod template;
pub mod tracker;

pub use component::ComponentValue;
pub use config::EngineConfig;
pub use count::{CountDirective, InstanceKey};
pub use decorator::{Decorator, DecoratorContext, DecoratorRegistry, Effect, Subject};
pub use evaluation::Evaluation;
pub use input::{InputProvider, NoInputs, StaticInputs};
pub use interpreter::{Binding, Interpreter, evaluate, evaluate_with_inputs};
pub use record::FieldRecord;
pub use reference::{RefSource, ResourceRef};
pub use resource::{InstanceMeta, ResourceValue, TagSet};
pub use schema::{PropertyDef, PropertyValidator, SchemaValue};
pub use structs::StructValue;
pub use template::DeferredResourceTemplate;
pub use tracker::{DependencyTracker, EdgeKind, VisitState};

/// Single-threaded shared ownership with interior mutability.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps `value` for shared mutable access.
#[must_use]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
