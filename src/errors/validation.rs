use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every rule a record failed, collected before anything touches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{entity} validation failed{}", list_fields(.fields))]
pub struct ValidationErrors {
    pub entity: &'static str,
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(entity: &'static str) -> Self {
        Self { entity, fields: Vec::new() }
    }

    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.fields.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// `Ok(())` when nothing was pushed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn list_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let listed = fields
        .iter()
        .map(|err| format!("{}: {}", err.field, err.message))
        .collect::<Vec<_>>()
        .join(", ");
    format!(": {}", listed)
}
