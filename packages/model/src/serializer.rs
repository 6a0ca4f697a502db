//! JSON persistence boundary for forms
//!
//! Forms are stored as plain camelCase JSON records. Cloned and mutated trees
//! serialize exactly like parsed ones.

use crate::ast::{ElementType, Form};
use crate::error::{ModelError, ModelResult};

/// Parse a form document from JSON
pub fn parse(source: &str) -> ModelResult<Form> {
    let form: Form = serde_json::from_str(source)?;

    if form.root.element_type() != ElementType::Root {
        return Err(ModelError::invalid_root(form.root.element_type().as_str()));
    }

    Ok(form)
}

/// Serialize a form document to pretty-printed JSON
pub fn serialize(form: &Form) -> ModelResult<String> {
    Ok(serde_json::to_string_pretty(form)?)
}
