//! # Formtree Model
//!
//! Element tree types for form documents, identifier generation and the
//! JSON persistence format.

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod serializer;

pub use ast::{
    Condition, ConditionSet, ConditionalLogic, Element, ElementKind, ElementType, Form,
    FormStatus, LogicKind, LogicalOperator, SelectOption,
};
pub use error::{ModelError, ModelResult};
pub use id_generator::IdGenerator;
pub use serializer::{parse, serialize};
