//! Component schemas.
//!
//! A schema names a component kind and declares either a tag (presence-only)
//! or a set of fields with types and defaults. The schema is also where a
//! kind's neutral value comes from when a linked payload is reset.

use tether_foundation::{KeywordId, Type, Value};

/// Schema definition for a component kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentSchema {
    /// Component kind (e.g., `:target`, `:health`).
    pub name: KeywordId,
    /// Field definitions.
    pub fields: Vec<FieldSchema>,
    /// If true, this is a tag component (presence-only, no data).
    pub is_tag: bool,
}

impl ComponentSchema {
    /// Creates a data component schema with no fields yet.
    #[must_use]
    pub fn new(name: KeywordId) -> Self {
        Self {
            name,
            fields: Vec::new(),
            is_tag: false,
        }
    }

    /// Creates a tag component schema.
    #[must_use]
    pub fn tag(name: KeywordId) -> Self {
        Self {
            name,
            fields: Vec::new(),
            is_tag: true,
        }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: KeywordId) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The neutral value of this component kind.
    ///
    /// Tags are `true`; records hold every field at its declared default, or
    /// at its type's zero value when no default is declared.
    #[must_use]
    pub fn default_value(&self) -> Value {
        if self.is_tag {
            Value::Bool(true)
        } else {
            Value::record(
                self.fields
                    .iter()
                    .map(|f| (f.name, f.default_value())),
            )
        }
    }
}

/// Schema definition for a component field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name.
    pub name: KeywordId,
    /// Field type.
    pub ty: Type,
    /// Value used on reset; `None` means the type's zero value.
    pub default: Option<Value>,
    /// Whether writes must supply the field.
    pub required: bool,
}

impl FieldSchema {
    /// Creates a required field.
    #[must_use]
    pub fn required(name: KeywordId, ty: Type) -> Self {
        Self {
            name,
            ty,
            default: None,
            required: true,
        }
    }

    /// Creates an optional field with a default value.
    #[must_use]
    pub fn optional(name: KeywordId, ty: Type, default: Value) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
            required: false,
        }
    }

    /// The value this field takes in a default record.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.ty.zero_value())
    }
}
