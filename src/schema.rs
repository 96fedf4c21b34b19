//! Schema: named struct layouts plus the struct to decode from the start of a buffer.

use crate::{
    errors::SchemaError,
    field::{Attributes, FieldDecl},
    intrinsics::Intrinsics,
    validator,
};

/// A named record layout. Field order is byte layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub identifier: String,
    pub fields: Vec<FieldDecl>,
    pub attributes: Attributes,
}

impl Struct {
    pub fn new(identifier: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        Struct {
            identifier: identifier.into(),
            fields,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into());
        self
    }

    pub fn field(&self, identifier: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.identifier == identifier)
    }
}

/// Struct definitions in declaration order and the root struct's name.
///
/// Immutable once built; a single schema can back any number of decoders and
/// concurrent reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub structs: Vec<Struct>,
    pub root: String,
}

impl Schema {
    pub fn new(structs: Vec<Struct>, root: impl Into<String>) -> Self {
        Schema {
            structs,
            root: root.into(),
        }
    }

    /// Looks up a struct by identifier. The first declaration wins.
    pub fn get_struct(&self, identifier: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.identifier == identifier)
    }

    /// Checks the schema against `intrinsics`. See [validator::validate].
    pub fn validate(&self, intrinsics: &Intrinsics) -> Result<(), SchemaError> {
        validator::validate(self, intrinsics)
    }
}
