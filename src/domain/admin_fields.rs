//! Per-integration admin form configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminFieldError {
    #[error("admin field name must not be empty")]
    EmptyName,
    #[error("malformed admin field configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// How one field is shown on an integration's admin form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminField {
    pub label: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub readonly: bool,
}

fn default_visible() -> bool {
    true
}

impl AdminField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visible: true,
            readonly: false,
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Field name → display settings, stored as a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminFieldConfig(BTreeMap<String, AdminField>);

impl AdminFieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        field: AdminField,
    ) -> Result<Self, AdminFieldError> {
        self.set(name, field)?;
        Ok(self)
    }

    pub fn set(&mut self, name: impl Into<String>, field: AdminField) -> Result<(), AdminFieldError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AdminFieldError::EmptyName);
        }
        self.0.insert(name, field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AdminField> {
        self.0.get(name)
    }

    /// Field names shown on the form, in name order.
    pub fn visible_fields(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, f)| f.visible)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_readonly(&self, name: &str) -> bool {
        self.0.get(name).map(|f| f.readonly).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(name, field)| {
                    (
                        name.clone(),
                        serde_json::json!({
                            "label": field.label,
                            "visible": field.visible,
                            "readonly": field.readonly,
                        }),
                    )
                })
                .collect(),
        )
    }

    /// Reads a stored value; `null` is treated as an empty configuration.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AdminFieldError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: AdminFieldConfig = serde_json::from_value(value.clone())?;
        if config.0.keys().any(|name| name.trim().is_empty()) {
            return Err(AdminFieldError::EmptyName);
        }
        Ok(config)
    }
}
