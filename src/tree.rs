//! The decoded tree produced by [crate::decoder::Decoder::read].

use std::fmt;

use crate::{data_type::PrimitiveDataType, field::Attributes};

/// A decoded primitive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PrimitiveValue {
    Unsigned(u64),
    /// Two's-complement and normal-shape raw integers.
    Signed(i64),
    /// Floats, and normalized or scaled integers.
    Float(f64),
    String(String),
}

impl PrimitiveValue {
    /// Integer view used for array counts: floats are floored, strings have none.
    pub fn as_count(&self) -> Option<i128> {
        match self {
            PrimitiveValue::Unsigned(v) => Some(*v as i128),
            PrimitiveValue::Signed(v) => Some(*v as i128),
            PrimitiveValue::Float(v) if v.is_finite() => Some(v.floor() as i128),
            PrimitiveValue::Float(_) | PrimitiveValue::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PrimitiveValue::Unsigned(v) => Some(*v as f64),
            PrimitiveValue::Signed(v) => Some(*v as f64),
            PrimitiveValue::Float(v) => Some(*v),
            PrimitiveValue::String(_) => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Unsigned(v) => write!(f, "{v}"),
            PrimitiveValue::Signed(v) => write!(f, "{v}"),
            PrimitiveValue::Float(v) => write!(f, "{v}"),
            PrimitiveValue::String(s) => f.write_str(s),
        }
    }
}

/// One decoded struct instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructNode {
    pub type_name: String,
    pub children: Vec<FieldNode>,
    pub attributes: Attributes,
}

impl StructNode {
    /// Finds a direct child field by name.
    pub fn get(&self, name: &str) -> Option<&FieldNode> {
        self.children.iter().find(|c| c.name() == name)
    }
}

/// One decoded field, in one of the four field shapes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum FieldNode {
    SinglePrimitive {
        data_type: PrimitiveDataType,
        name: String,
        value: PrimitiveValue,
        attributes: Attributes,
    },
    ArrayPrimitive {
        data_type: PrimitiveDataType,
        name: String,
        values: Vec<PrimitiveValue>,
        attributes: Attributes,
    },
    SingleStruct {
        type_name: String,
        name: String,
        value: StructNode,
        attributes: Attributes,
    },
    ArrayStruct {
        type_name: String,
        name: String,
        values: Vec<StructNode>,
        attributes: Attributes,
    },
}

impl FieldNode {
    pub fn name(&self) -> &str {
        match self {
            FieldNode::SinglePrimitive { name, .. }
            | FieldNode::ArrayPrimitive { name, .. }
            | FieldNode::SingleStruct { name, .. }
            | FieldNode::ArrayStruct { name, .. } => name,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            FieldNode::SinglePrimitive { attributes, .. }
            | FieldNode::ArrayPrimitive { attributes, .. }
            | FieldNode::SingleStruct { attributes, .. }
            | FieldNode::ArrayStruct { attributes, .. } => attributes,
        }
    }

    /// Value of a single primitive field.
    pub fn value(&self) -> Option<&PrimitiveValue> {
        match self {
            FieldNode::SinglePrimitive { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Elements of a primitive array field.
    pub fn values(&self) -> Option<&[PrimitiveValue]> {
        match self {
            FieldNode::ArrayPrimitive { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Nested struct of a single struct field.
    pub fn node(&self) -> Option<&StructNode> {
        match self {
            FieldNode::SingleStruct { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Elements of a struct array field.
    pub fn nodes(&self) -> Option<&[StructNode]> {
        match self {
            FieldNode::ArrayStruct { values, .. } => Some(values),
            _ => None,
        }
    }
}
