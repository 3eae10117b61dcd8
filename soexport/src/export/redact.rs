//! Per-object redaction applied on the way out.
//!
//! - `namespaces` is always dropped.
//! - Objects of the sensitive type (`data-source` by default) have their
//!   credential values replaced with a fixed placeholder. Which fields are
//!   masked depends on `attributes.auth.type`; the field names stay in place
//!   so the importer can see which credentials need to be re-entered.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::RedactionConfig;
use crate::object::SavedObject;

#[derive(Debug, Clone)]
pub struct Redactor {
    sensitive_type: String,
    placeholder: String,
    credential_fields: BTreeMap<String, Vec<String>>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(&RedactionConfig::default())
    }
}

impl Redactor {
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            sensitive_type: config.sensitive_type.clone(),
            placeholder: config.placeholder.clone(),
            credential_fields: config.credential_fields.clone(),
        }
    }

    pub fn redact(&self, mut obj: SavedObject) -> SavedObject {
        obj.namespaces = None;
        if obj.object_type == self.sensitive_type {
            self.mask_credentials(&mut obj);
        }
        obj
    }

    fn mask_credentials(&self, obj: &mut SavedObject) {
        let Some(auth) = obj.attributes.get_mut("auth").and_then(Value::as_object_mut) else {
            return;
        };
        let Some(fields) = auth
            .get("type")
            .and_then(Value::as_str)
            .and_then(|auth_type| self.credential_fields.get(auth_type))
        else {
            return;
        };
        let Some(credentials) = auth.get_mut("credentials").and_then(Value::as_object_mut) else {
            return;
        };

        for field in fields {
            if let Some(value) = credentials.get_mut(field) {
                *value = Value::String(self.placeholder.clone());
            }
        }
    }
}
