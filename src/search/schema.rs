//! Collection schema definitions

use serde::{Deserialize, Serialize};

/// A collection schema as accepted by `POST /collections`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,

    pub fields: Vec<FieldSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sorting_field: Option<String>,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            default_sorting_field: None,
        }
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>) -> Self {
        self.default_sorting_field = Some(field.into());
        self
    }
}

/// A single field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub facet: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            facet: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, "string")
    }

    pub fn int32(name: impl Into<String>) -> Self {
        Self::new(name, "int32")
    }

    pub fn faceted(mut self) -> Self {
        self.facet = true;
        self
    }
}

/// Summary returned by `GET /collections/{name}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,

    #[serde(default)]
    pub num_documents: u64,
}
