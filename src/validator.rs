//! Static well-formedness checks, run before any buffer is read.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::{
    data_type::{IntScale, IntShape, PrimitiveDataType},
    errors::SchemaError,
    field::{ArrayCount, FieldDecl, FieldKind, FieldType, INTRINSIC_PREFIX},
    intrinsics::Intrinsics,
    schema::{Schema, Struct},
};

/// Fields of one struct seen so far, by identifier.
type FieldSymbols<'a> = HashMap<&'a str, &'a FieldDecl>;

/// Checks `schema` in a single pass and returns the first violation.
///
/// Structs are registered before their own fields are scanned, so a struct may
/// contain itself, but a struct type declared later in the schema is not
/// visible yet. An array count must be a positive literal, a registered
/// intrinsic, or an earlier single integer field of the same struct. Count
/// names starting with `_` are looked up as intrinsics, anything else as a
/// field, whichever [ArrayCount] variant holds the name.
pub fn validate(schema: &Schema, intrinsics: &Intrinsics) -> Result<(), SchemaError> {
    let mut structs: HashSet<&str> = HashSet::with_capacity(schema.structs.len());

    for s in &schema.structs {
        // Registered before its fields so it can contain itself.
        if !structs.insert(&s.identifier) {
            return Err(SchemaError::DuplicateStruct(s.identifier.clone()));
        }

        let mut symbols = FieldSymbols::new();
        for field in &s.fields {
            check_field(s, field, &symbols, &structs, intrinsics)?;
            symbols.insert(&field.identifier, field);
        }

        trace!(name = %s.identifier, fields = s.fields.len(), "struct validated");
    }

    if !structs.contains(schema.root.as_str()) {
        return Err(SchemaError::UnknownRoot(schema.root.clone()));
    }

    debug!(structs = schema.structs.len(), root = %schema.root, "schema validated");

    Ok(())
}

fn check_field(
    s: &Struct,
    field: &FieldDecl,
    symbols: &FieldSymbols<'_>,
    structs: &HashSet<&str>,
    intrinsics: &Intrinsics,
) -> Result<(), SchemaError> {
    let struct_name = || s.identifier.clone();
    let field_name = || field.identifier.clone();

    if symbols.contains_key(field.identifier.as_str()) {
        return Err(SchemaError::DuplicateField {
            struct_name: struct_name(),
            field: field_name(),
        });
    }

    if let FieldKind::Array(count) = &field.kind {
        match count {
            ArrayCount::Field(name) | ArrayCount::Intrinsic(name)
                if name.starts_with(INTRINSIC_PREFIX) =>
            {
                if !intrinsics.contains(name) {
                    return Err(SchemaError::UnknownIntrinsic {
                        struct_name: struct_name(),
                        field: field_name(),
                        name: name.clone(),
                    });
                }
            }
            ArrayCount::Field(name) | ArrayCount::Intrinsic(name) => {
                match symbols.get(name.as_str()) {
                    None => {
                        return Err(SchemaError::UnknownCountField {
                            struct_name: struct_name(),
                            field: field_name(),
                            count: name.clone(),
                        });
                    }
                    Some(referenced) if !referenced.is_single_integer() => {
                        return Err(SchemaError::CountFieldNotScalar {
                            struct_name: struct_name(),
                            field: field_name(),
                            count: name.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
            ArrayCount::Fixed(count) => {
                if *count <= 0 {
                    return Err(SchemaError::InvalidArrayCount {
                        struct_name: struct_name(),
                        field: field_name(),
                        count: *count,
                    });
                }
            }
        }
    }

    match &field.ty {
        FieldType::Struct(type_name) => {
            if !structs.contains(type_name.as_str()) {
                return Err(SchemaError::UnknownType {
                    struct_name: struct_name(),
                    field: field_name(),
                    type_name: type_name.clone(),
                });
            }
        }
        FieldType::Primitive(data_type) => check_data_type(s, field, data_type)?,
    }

    Ok(())
}

fn check_data_type(
    s: &Struct,
    field: &FieldDecl,
    data_type: &PrimitiveDataType,
) -> Result<(), SchemaError> {
    match data_type {
        PrimitiveDataType::Int(int) => {
            // A 1-bit signed reading has a signed maximum of zero.
            let min_width = match (int.shape, int.scale) {
                (IntShape::Unsigned, _) | (_, IntScale::Raw) => 1,
                _ => 2,
            };
            if int.bit_width < min_width || int.bit_width > 64 {
                return Err(SchemaError::InvalidBitWidth {
                    struct_name: s.identifier.clone(),
                    field: field.identifier.clone(),
                    bits: int.bit_width,
                });
            }
            if let IntScale::Scaled { exponent } = int.scale {
                if exponent > 63 {
                    return Err(SchemaError::InvalidScale {
                        struct_name: s.identifier.clone(),
                        field: field.identifier.clone(),
                        exponent,
                    });
                }
            }
        }
        PrimitiveDataType::FixedString { capacity: 0 } => {
            return Err(SchemaError::InvalidStringCapacity {
                struct_name: s.identifier.clone(),
                field: field.identifier.clone(),
            });
        }
        PrimitiveDataType::FixedString { .. }
        | PrimitiveDataType::Float(_)
        | PrimitiveDataType::VarString => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::{FloatWidth, IntType};

    fn u8_field(name: &str) -> FieldDecl {
        FieldDecl::single(name, IntType::unsigned(8))
    }

    fn struct_field(name: &str, ty: &str) -> FieldDecl {
        FieldDecl::single(name, FieldType::Struct(ty.to_string()))
    }

    fn u8_array(name: &str, count: ArrayCount) -> FieldDecl {
        FieldDecl::array(name, IntType::unsigned(8), count)
    }

    fn struct_array(name: &str, ty: &str, count: ArrayCount) -> FieldDecl {
        FieldDecl::array(name, FieldType::Struct(ty.to_string()), count)
    }

    fn main_only(fields: Vec<FieldDecl>) -> Schema {
        Schema::new(vec![Struct::new("Main", fields)], "Main")
    }

    fn valid_schema() -> Schema {
        Schema::new(
            vec![
                Struct::new("Foo", vec![u8_field("a"), u8_field("b")]),
                Struct::new(
                    "Main",
                    vec![
                        FieldDecl::single("count", IntType::unsigned(32)),
                        u8_array("values", ArrayCount::reference("count")),
                        struct_array("foos", "Foo", ArrayCount::Fixed(2)),
                        u8_array("rest", ArrayCount::reference("__LEFT__")),
                    ],
                ),
            ],
            "Main",
        )
    }

    fn check(schema: &Schema) -> Result<(), SchemaError> {
        validate(schema, &Intrinsics::builtin())
    }

    #[test]
    fn test_valid_schema_is_idempotent() {
        let schema = valid_schema();
        assert_eq!(check(&schema), Ok(()));
        assert_eq!(check(&schema), Ok(()));
    }

    #[test]
    fn test_duplicate_struct() {
        let mut schema = valid_schema();
        schema.structs.push(Struct::new("Foo", vec![]));
        assert_eq!(
            check(&schema),
            Err(SchemaError::DuplicateStruct("Foo".to_string()))
        );
    }

    #[test]
    fn test_duplicate_field() {
        let mut schema = valid_schema();
        schema.structs[0].fields.push(u8_field("a"));
        assert_eq!(
            check(&schema),
            Err(SchemaError::DuplicateField {
                struct_name: "Foo".to_string(),
                field: "a".to_string()
            })
        );
    }

    #[test]
    fn test_forward_reference_rejected() {
        let schema = Schema::new(
            vec![
                Struct::new("Main", vec![struct_field("later", "Later")]),
                Struct::new("Later", vec![u8_field("x")]),
            ],
            "Main",
        );
        assert_eq!(
            check(&schema),
            Err(SchemaError::UnknownType {
                struct_name: "Main".to_string(),
                field: "later".to_string(),
                type_name: "Later".to_string()
            })
        );
    }

    #[test]
    fn test_self_reference_allowed() {
        let schema = Schema::new(
            vec![Struct::new(
                "Node",
                vec![
                    u8_field("n"),
                    struct_array("children", "Node", ArrayCount::reference("n")),
                ],
            )],
            "Node",
        );
        assert_eq!(check(&schema), Ok(()));
    }

    #[test]
    fn test_count_field_must_precede() {
        let schema = Schema::new(
            vec![Struct::new(
                "Main",
                vec![
                    u8_array("values", ArrayCount::reference("count")),
                    u8_field("count"),
                ],
            )],
            "Main",
        );
        assert_eq!(
            check(&schema),
            Err(SchemaError::UnknownCountField {
                struct_name: "Main".to_string(),
                field: "values".to_string(),
                count: "count".to_string()
            })
        );
    }

    #[test]
    fn test_count_field_must_be_single_integer() {
        let not_scalar = [
            FieldDecl::array("count", IntType::unsigned(8), ArrayCount::Fixed(1)),
            struct_field("count", "Foo"),
            FieldDecl::single("count", PrimitiveDataType::Float(FloatWidth::F32)),
        ];

        for count_field in not_scalar {
            let mut schema = valid_schema();
            schema.structs[1].fields[0] = count_field;
            assert_eq!(
                check(&schema),
                Err(SchemaError::CountFieldNotScalar {
                    struct_name: "Main".to_string(),
                    field: "values".to_string(),
                    count: "count".to_string()
                })
            );
        }
    }

    #[test]
    fn test_count_field_in_other_struct_not_visible() {
        let schema = Schema::new(
            vec![
                Struct::new("Foo", vec![u8_field("n")]),
                Struct::new(
                    "Main",
                    vec![
                        struct_field("foo", "Foo"),
                        u8_array("values", ArrayCount::reference("n")),
                    ],
                ),
            ],
            "Main",
        );
        assert!(matches!(
            check(&schema),
            Err(SchemaError::UnknownCountField { .. })
        ));
    }

    #[test]
    fn test_non_positive_literal_count() {
        for count in [0, -3] {
            let mut schema = valid_schema();
            schema.structs[1].fields[2].kind = FieldKind::Array(ArrayCount::Fixed(count));
            assert_eq!(
                check(&schema),
                Err(SchemaError::InvalidArrayCount {
                    struct_name: "Main".to_string(),
                    field: "foos".to_string(),
                    count
                })
            );
        }
    }

    #[test]
    fn test_unknown_intrinsic() {
        let mut schema = valid_schema();
        schema.structs[1].fields[3].kind = FieldKind::Array(ArrayCount::reference("__NOPE__"));
        assert_eq!(
            check(&schema),
            Err(SchemaError::UnknownIntrinsic {
                struct_name: "Main".to_string(),
                field: "rest".to_string(),
                name: "__NOPE__".to_string()
            })
        );
    }

    #[test]
    fn test_intrinsic_checked_against_given_registry() {
        let schema = valid_schema();
        assert!(matches!(
            validate(&schema, &Intrinsics::empty()),
            Err(SchemaError::UnknownIntrinsic { .. })
        ));
    }

    #[test]
    fn test_count_kind_follows_name_prefix() {
        let size = main_only(vec![u8_array("all", ArrayCount::Field("__SIZE__".into()))]);
        assert_eq!(check(&size), Ok(()));

        let unknown = main_only(vec![u8_array("all", ArrayCount::Field("__NOPE__".into()))]);
        assert!(matches!(
            check(&unknown),
            Err(SchemaError::UnknownIntrinsic { .. })
        ));

        let by_field = main_only(vec![
            u8_field("n"),
            u8_array("v", ArrayCount::Intrinsic("n".into())),
        ]);
        assert_eq!(check(&by_field), Ok(()));

        let missing = main_only(vec![u8_array("v", ArrayCount::Intrinsic("n".into()))]);
        assert!(matches!(
            check(&missing),
            Err(SchemaError::UnknownCountField { .. })
        ));
    }

    #[test]
    fn test_unknown_root() {
        let mut schema = valid_schema();
        schema.root = "Missing".to_string();
        assert_eq!(
            check(&schema),
            Err(SchemaError::UnknownRoot("Missing".to_string()))
        );
    }

    #[test]
    fn test_bit_width_bounds() {
        let cases = [
            (IntType::unsigned(0), false),
            (IntType::unsigned(1), true),
            (IntType::signed(1), true),
            (IntType::unsigned(64), true),
            (IntType::unsigned(65), false),
            (IntType::new(IntShape::Signed, IntScale::Normalized, 1), false),
            (IntType::new(IntShape::Normal, IntScale::Scaled { exponent: 2 }, 1), false),
            (IntType::new(IntShape::Unsigned, IntScale::Normalized, 1), true),
        ];

        for (int, ok) in cases {
            let schema = main_only(vec![FieldDecl::single("x", int)]);
            let result = check(&schema);
            if ok {
                assert_eq!(result, Ok(()), "{int:?}");
            } else {
                assert_eq!(
                    result,
                    Err(SchemaError::InvalidBitWidth {
                        struct_name: "Main".to_string(),
                        field: "x".to_string(),
                        bits: int.bit_width
                    }),
                    "{int:?}"
                );
            }
        }
    }

    #[test]
    fn test_scale_exponent_bounds() {
        let int = IntType::new(IntShape::Unsigned, IntScale::Scaled { exponent: 64 }, 16);
        let schema = main_only(vec![FieldDecl::single("x", int)]);
        assert!(matches!(
            check(&schema),
            Err(SchemaError::InvalidScale { exponent: 64, .. })
        ));
    }

    #[test]
    fn test_empty_fixed_string() {
        let schema = Schema::new(
            vec![Struct::new(
                "Main",
                vec![FieldDecl::single("s", PrimitiveDataType::FixedString { capacity: 0 })],
            )],
            "Main",
        );
        assert!(matches!(check(&schema), Err(SchemaError::InvalidStringCapacity { .. })));
    }

    #[test]
    fn test_first_violation_wins() {
        let schema = Schema::new(
            vec![Struct::new(
                "Main",
                vec![
                    FieldDecl::array("a", IntType::unsigned(8), ArrayCount::Fixed(0)),
                    struct_field("b", "Missing"),
                ],
            )],
            "Nope",
        );
        assert!(matches!(check(&schema), Err(SchemaError::InvalidArrayCount { .. })));
    }
}
