//! Definition of the fields that make up a [crate::schema::Struct].

use std::collections::BTreeSet;

use crate::data_type::PrimitiveDataType;

/// Free-form tags attached to structs and fields, e.g. `hide`.
pub type Attributes = BTreeSet<String>;

/// Prefix that marks a count name as an intrinsic rather than a field.
pub const INTRINSIC_PREFIX: char = '_';

/// A single named field in a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Unique within the struct; also the key in the decoded tree.
    pub identifier: String,
    /// Single value or array, and how the array is counted.
    pub kind: FieldKind,
    /// Primitive data type or the name of a struct.
    pub ty: FieldType,
    pub attributes: Attributes,
}

impl FieldDecl {
    pub fn single(identifier: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        FieldDecl {
            identifier: identifier.into(),
            kind: FieldKind::Single,
            ty: ty.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn array(
        identifier: impl Into<String>,
        ty: impl Into<FieldType>,
        count: ArrayCount,
    ) -> Self {
        FieldDecl {
            identifier: identifier.into(),
            kind: FieldKind::Array(count),
            ty: ty.into(),
            attributes: Attributes::new(),
        }
    }

    /// Adds an attribute tag.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into());
        self
    }

    /// True for a non-array field of an integer type, the only kind an array
    /// count may refer to.
    pub fn is_single_integer(&self) -> bool {
        matches!(
            (&self.kind, &self.ty),
            (FieldKind::Single, FieldType::Primitive(data_type)) if data_type.is_integer()
        )
    }
}

/// Distinguishes single fields from arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Single,
    Array(ArrayCount),
}

/// What a field holds: a primitive value or a nested struct, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Primitive(PrimitiveDataType),
    /// Resolved against the schema by name, so structs may refer to themselves.
    Struct(String),
}

impl From<PrimitiveDataType> for FieldType {
    fn from(value: PrimitiveDataType) -> Self {
        FieldType::Primitive(value)
    }
}

impl From<crate::data_type::IntType> for FieldType {
    fn from(value: crate::data_type::IntType) -> Self {
        FieldType::Primitive(value.into())
    }
}

/// Number of elements in an array field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayCount {
    /// Literal count; must be positive.
    Fixed(i64),
    /// Value of an earlier single integer field of the same struct.
    Field(String),
    /// Buffer-derived value from the [crate::intrinsics::Intrinsics] registry.
    Intrinsic(String),
}

impl ArrayCount {
    /// Classifies a bare count name: names starting with `_` are intrinsics,
    /// anything else refers to a field.
    pub fn reference(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.starts_with(INTRINSIC_PREFIX) {
            ArrayCount::Intrinsic(name)
        } else {
            ArrayCount::Field(name)
        }
    }
}
