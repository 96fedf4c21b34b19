//! # bitview
//!
//! Schema-driven decoding of bit-packed binary data into a typed value tree.
//!
//! A [schema::Schema] is a list of structs; each struct is an ordered list of
//! fields holding primitives (arbitrary-width integers, floats, strings) or
//! other structs, singly or as arrays. Array lengths may be literals, earlier
//! integer fields, or buffer-derived intrinsics such as `__LEFT__`. Bits are
//! consumed least-significant first.
//!
//! ## Example
//!
//! ```
//! use bitview::data_type::IntType;
//! use bitview::decoder::Decoder;
//! use bitview::field::{ArrayCount, FieldDecl};
//! use bitview::intrinsics::Intrinsics;
//! use bitview::printer::TextPrinter;
//! use bitview::schema::{Schema, Struct};
//!
//! let schema = Schema::new(
//!     vec![Struct::new(
//!         "Main",
//!         vec![
//!             FieldDecl::single("count", IntType::unsigned(8)),
//!             FieldDecl::array("values", IntType::unsigned(8), ArrayCount::reference("count")),
//!         ],
//!     )],
//!     "Main",
//! );
//!
//! let decoder = Decoder::new(&schema, Intrinsics::builtin()).unwrap();
//! let tree = decoder.read(&[2, 10, 20]).unwrap();
//! assert_eq!(
//!     TextPrinter::new(&tree).print(),
//!     "Main {\n\tuint8 count = 2;\n\tuint8 values[2] = [\n\t\t10,\n\t\t20\n\t];\n};\n"
//! );
//! ```

pub mod bit_reader;
pub mod bits;
pub mod config;
pub mod data_type;
pub mod decoder;
pub mod errors;
pub mod field;
pub mod intrinsics;
pub mod printer;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod tree;
pub mod validator;
