//! Error types for schema validation, bit reading and decoding.

use thiserror::Error;

/// Errors produced by [crate::validator::validate]. Every variant names the struct
/// (and field, where there is one) that holds the defect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two structs share an identifier.
    #[error("struct '{0}' already defined")]
    DuplicateStruct(String),
    /// Two fields of one struct share an identifier.
    #[error("identifier '{field}' already used in struct '{struct_name}'")]
    DuplicateField { struct_name: String, field: String },
    /// A struct-typed field names a struct that is not declared at this point.
    #[error("field type '{type_name}' of '{struct_name}:{field}' not found")]
    UnknownType {
        struct_name: String,
        field: String,
        type_name: String,
    },
    /// An array count names a field that does not precede it in the struct.
    #[error("field identifier '{count}' used as count of '{struct_name}:{field}' not found")]
    UnknownCountField {
        struct_name: String,
        field: String,
        count: String,
    },
    /// An array count names a field that is not a single primitive integer.
    #[error(
        "field identifier '{count}' used as count of '{struct_name}:{field}' must be a non-array integer field"
    )]
    CountFieldNotScalar {
        struct_name: String,
        field: String,
        count: String,
    },
    /// A literal array count is zero or negative.
    #[error("array count {count} of '{struct_name}:{field}' must be greater than 0")]
    InvalidArrayCount {
        struct_name: String,
        field: String,
        count: i64,
    },
    /// An array count names an intrinsic missing from the registry.
    #[error("unrecognised intrinsic '{name}' in '{struct_name}:{field}'")]
    UnknownIntrinsic {
        struct_name: String,
        field: String,
        name: String,
    },
    /// The root struct is not declared.
    #[error("root struct '{0}' not found")]
    UnknownRoot(String),
    /// Integer width outside 1..=64, or too narrow for its reading.
    #[error("bit width {bits} of '{struct_name}:{field}' is not valid for its type")]
    InvalidBitWidth {
        struct_name: String,
        field: String,
        bits: u32,
    },
    /// Scale exponent larger than 63.
    #[error("scale exponent {exponent} of '{struct_name}:{field}' is out of range")]
    InvalidScale {
        struct_name: String,
        field: String,
        exponent: u32,
    },
    /// Fixed string with zero capacity.
    #[error("fixed string '{struct_name}:{field}' must hold at least one byte")]
    InvalidStringCapacity { struct_name: String, field: String },
}

/// Errors produced when reading bits from a byte slice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Requested bit range is beyond the end of the data.
    #[error("{bits} bits at bit offset {bit_offset} exceed the buffer")]
    OutOfBounds { bit_offset: usize, bits: usize },
    /// The buffer ended before a string terminator was found.
    #[error("no string terminator after bit offset {bit_offset}")]
    MissingTerminator { bit_offset: usize },
}

/// Errors produced by [crate::decoder::Decoder::read]. No partial tree is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer was exhausted while reading a field.
    #[error("reading '{struct_name}:{field}': {source}")]
    Read {
        struct_name: String,
        field: String,
        #[source]
        source: ReadError,
    },
    /// An array count resolved to a negative value.
    #[error("array count {count} of '{struct_name}:{field}' is negative")]
    InvalidArrayCount {
        struct_name: String,
        field: String,
        count: i128,
    },
    /// An array count exceeded [crate::config::DecodeConfig::max_array_len].
    #[error("array count {count} of '{struct_name}:{field}' exceeds limit {max}")]
    ArrayTooLong {
        struct_name: String,
        field: String,
        count: i128,
        max: usize,
    },
    /// Struct nesting exceeded [crate::config::DecodeConfig::max_depth].
    #[error("struct '{struct_name}' nested deeper than {max_depth}")]
    RecursionLimit {
        struct_name: String,
        max_depth: usize,
    },
    /// Struct instances decoded in one read exceeded
    /// [crate::config::DecodeConfig::max_nodes].
    #[error("decoding '{struct_name}' would exceed {max_nodes} struct instances")]
    NodeLimit {
        struct_name: String,
        max_nodes: usize,
    },
    /// Count refers to a field with no decoded value (schema was not validated).
    #[error("count '{count}' of '{struct_name}:{field}' does not resolve to a decoded field")]
    UnresolvedCount {
        struct_name: String,
        field: String,
        count: String,
    },
    /// Count refers to an intrinsic missing from the registry (schema was not validated).
    #[error("intrinsic '{name}' used by '{struct_name}:{field}' is not registered")]
    UnknownIntrinsic {
        struct_name: String,
        field: String,
        name: String,
    },
    /// Integer width outside 1..=64 (schema was not validated).
    #[error("bit width {bits} of '{struct_name}:{field}' cannot be read")]
    InvalidBitWidth {
        struct_name: String,
        field: String,
        bits: u32,
    },
    /// Field type names an undeclared struct (schema was not validated).
    #[error("struct type '{0}' is not declared")]
    UnknownStruct(String),
    /// Root names an undeclared struct (schema was not validated).
    #[error("root struct '{0}' is not declared")]
    UnknownRoot(String),
}

/// A primitive type keyword that does not name any data type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown data type keyword '{0}'")]
pub struct TypeKeywordError(pub String);
