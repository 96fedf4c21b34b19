//! JSON-deserializable schema description.
//!
//! These types describe the *shape* of the records to be decoded. They stand in
//! for a textual schema parser: build them from JSON (for example a schema file
//! shipped with your application) and convert them into a [crate::schema::Schema].
//!
//! Field types use the same keywords as the text printer: `uint10`, `nnorm16`,
//! `s12scale16`, `float`, `string(8)`, ... Capitalised names refer to structs.
//!
//! ```
//! let schema = bitview::schema::Schema::from_json(r#"{
//!     "root": "Main",
//!     "structs": [{
//!         "identifier": "Main",
//!         "fields": [
//!             { "identifier": "count", "kind": "uint32" },
//!             { "identifier": "values", "kind": "uint8", "count": "count" }
//!         ]
//!     }]
//! }"#).unwrap();
//! assert_eq!(schema.structs[0].fields.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data_type::PrimitiveDataType,
    errors::TypeKeywordError,
    field::{ArrayCount, Attributes, FieldDecl, FieldKind, FieldType},
    schema::{Schema, Struct},
};

/// Errors produced when turning a definition into a [Schema].
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("invalid schema json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("field '{struct_name}:{field}': {source}")]
    Type {
        struct_name: String,
        field: String,
        #[source]
        source: TypeKeywordError,
    },
}

/// Top-level schema definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    /// Structs in declaration order. Struct types must be declared before use.
    pub structs: Vec<StructDef>,
    /// Name of the struct decoded from the start of the buffer.
    pub root: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructDef {
    pub identifier: String,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    pub identifier: String,
    /// Primitive type keyword or struct name.
    pub kind: String,
    /// Present for arrays only.
    #[serde(default)]
    pub count: Option<CountDef>,
    /// Free-form tags such as `"hide"`.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Array count: a literal, a field name, or an intrinsic (`__SIZE__`, `__LEFT__`).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CountDef {
    Literal(i64),
    Name(String),
}

impl From<CountDef> for ArrayCount {
    fn from(value: CountDef) -> Self {
        match value {
            CountDef::Literal(count) => ArrayCount::Fixed(count),
            CountDef::Name(name) => ArrayCount::reference(name),
        }
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = DefinitionError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        let structs = value
            .structs
            .into_iter()
            .map(Struct::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema {
            structs,
            root: value.root,
        })
    }
}

impl TryFrom<StructDef> for Struct {
    type Error = DefinitionError;

    fn try_from(value: StructDef) -> Result<Self, Self::Error> {
        let mut fields = Vec::with_capacity(value.fields.len());

        for field in value.fields {
            let ty = if field.kind.starts_with(|c: char| c.is_ascii_uppercase()) {
                FieldType::Struct(field.kind)
            } else {
                let data_type = field.kind.parse::<PrimitiveDataType>().map_err(|source| {
                    DefinitionError::Type {
                        struct_name: value.identifier.clone(),
                        field: field.identifier.clone(),
                        source,
                    }
                })?;
                FieldType::Primitive(data_type)
            };

            fields.push(FieldDecl {
                identifier: field.identifier,
                kind: match field.count {
                    Some(count) => FieldKind::Array(count.into()),
                    None => FieldKind::Single,
                },
                ty,
                attributes: field.attributes.into_iter().collect(),
            });
        }

        Ok(Struct {
            identifier: value.identifier,
            fields,
            attributes: value.attributes.into_iter().collect::<Attributes>(),
        })
    }
}

impl Schema {
    /// Parses a [SchemaDef] from JSON. The result is not validated yet.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let def: SchemaDef = serde_json::from_str(json)?;
        def.try_into()
    }
}
