//! Primitive data types a field can hold, and their textual keywords.

use std::{fmt, str::FromStr};

use crate::errors::TypeKeywordError;

/// How the raw bits of an integer are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IntShape {
    /// Two's complement.
    Signed,
    Unsigned,
    /// Unsigned reading minus `2^(W-1)`, centred on zero.
    Normal,
}

/// Whether an integer is reported as-is or mapped onto a float interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IntScale {
    Raw,
    /// `[0.0, 1.0]` for unsigned, `[-1.0, 1.0]` otherwise.
    Normalized,
    /// Normalized, then multiplied by `2^exponent`.
    Scaled { exponent: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IntType {
    pub shape: IntShape,
    pub scale: IntScale,
    pub bit_width: u32,
}

impl IntType {
    pub fn new(shape: IntShape, scale: IntScale, bit_width: u32) -> Self {
        IntType {
            shape,
            scale,
            bit_width,
        }
    }

    pub fn unsigned(bit_width: u32) -> Self {
        Self::new(IntShape::Unsigned, IntScale::Raw, bit_width)
    }

    pub fn signed(bit_width: u32) -> Self {
        Self::new(IntShape::Signed, IntScale::Raw, bit_width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn bits(self) -> usize {
        match self {
            FloatWidth::F32 => 32,
            FloatWidth::F64 => 64,
        }
    }
}

/// Data type of a primitive (non-struct) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PrimitiveDataType {
    /// Arbitrary-width integer, packed without byte alignment.
    Int(IntType),
    /// Little-endian IEEE 754, byte aligned.
    Float(FloatWidth),
    /// Up to `capacity` bytes, zero-terminated early or not at all.
    FixedString { capacity: usize },
    /// Zero-terminated, unbounded.
    VarString,
}

impl PrimitiveDataType {
    pub fn is_integer(&self) -> bool {
        matches!(self, PrimitiveDataType::Int(_))
    }
}

impl From<IntType> for PrimitiveDataType {
    fn from(value: IntType) -> Self {
        PrimitiveDataType::Int(value)
    }
}

impl fmt::Display for PrimitiveDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveDataType::Int(int) => {
                let prefix = match (int.shape, int.scale) {
                    (IntShape::Unsigned, _) => "u",
                    (IntShape::Normal, _) => "n",
                    (IntShape::Signed, IntScale::Scaled { .. }) => "s",
                    (IntShape::Signed, _) => "",
                };
                match int.scale {
                    IntScale::Raw => write!(f, "{prefix}int{}", int.bit_width),
                    IntScale::Normalized => write!(f, "{prefix}norm{}", int.bit_width),
                    IntScale::Scaled { exponent } => {
                        write!(f, "{prefix}{exponent}scale{}", int.bit_width)
                    }
                }
            }
            PrimitiveDataType::Float(FloatWidth::F32) => f.write_str("float"),
            PrimitiveDataType::Float(FloatWidth::F64) => f.write_str("double"),
            PrimitiveDataType::FixedString { capacity } => write!(f, "string({capacity})"),
            PrimitiveDataType::VarString => f.write_str("string"),
        }
    }
}

impl FromStr for PrimitiveDataType {
    type Err = TypeKeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TypeKeywordError(s.to_string());

        match s {
            "float" => return Ok(PrimitiveDataType::Float(FloatWidth::F32)),
            "double" => return Ok(PrimitiveDataType::Float(FloatWidth::F64)),
            "string" => return Ok(PrimitiveDataType::VarString),
            _ => {}
        }

        if let Some(inner) = s
            .strip_prefix("string(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let capacity = parse_number(inner).ok_or_else(err)?;
            return Ok(PrimitiveDataType::FixedString { capacity });
        }

        // "norm16" has no prefix, so the bare body is tried last.
        const PREFIXES: [(&str, IntShape); 4] = [
            ("u", IntShape::Unsigned),
            ("s", IntShape::Signed),
            ("n", IntShape::Normal),
            ("", IntShape::Signed),
        ];

        PREFIXES
            .iter()
            .find_map(|&(prefix, shape)| {
                let (scale, bit_width) = parse_int_body(s.strip_prefix(prefix)?)?;
                Some(PrimitiveDataType::Int(IntType::new(shape, scale, bit_width)))
            })
            .ok_or_else(err)
    }
}

fn parse_int_body(body: &str) -> Option<(IntScale, u32)> {
    if let Some(width) = body.strip_prefix("int") {
        return Some((IntScale::Raw, parse_number(width)?));
    }

    if let Some(width) = body.strip_prefix("norm") {
        return Some((IntScale::Normalized, parse_number(width)?));
    }

    let (exponent, width) = body.split_once("scale")?;
    Some((
        IntScale::Scaled {
            exponent: parse_number(exponent)?,
        },
        parse_number(width)?,
    ))
}

fn parse_number<T: FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> PrimitiveDataType {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_raw_ints() {
        assert_eq!(parse("uint10"), IntType::unsigned(10).into());
        assert_eq!(parse("int8"), IntType::signed(8).into());
        assert_eq!(parse("sint16"), IntType::signed(16).into());
        assert_eq!(
            parse("nint9"),
            IntType::new(IntShape::Normal, IntScale::Raw, 9).into()
        );
    }

    #[test]
    fn test_parse_normalized_and_scaled() {
        assert_eq!(
            parse("unorm7"),
            IntType::new(IntShape::Unsigned, IntScale::Normalized, 7).into()
        );
        assert_eq!(
            parse("norm16"),
            IntType::new(IntShape::Signed, IntScale::Normalized, 16).into()
        );
        assert_eq!(
            parse("nnorm16"),
            IntType::new(IntShape::Normal, IntScale::Normalized, 16).into()
        );
        assert_eq!(
            parse("s12scale16"),
            IntType::new(IntShape::Signed, IntScale::Scaled { exponent: 12 }, 16).into()
        );
        assert_eq!(
            parse("u6scale16"),
            IntType::new(IntShape::Unsigned, IntScale::Scaled { exponent: 6 }, 16).into()
        );
    }

    #[test]
    fn test_parse_floats_and_strings() {
        assert_eq!(parse("float"), PrimitiveDataType::Float(FloatWidth::F32));
        assert_eq!(parse("double"), PrimitiveDataType::Float(FloatWidth::F64));
        assert_eq!(parse("string"), PrimitiveDataType::VarString);
        assert_eq!(
            parse("string(8)"),
            PrimitiveDataType::FixedString { capacity: 8 }
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let rejected = [
            "", "u", "int", "uint-1", "string()", "string(x)", "Foo", "12scale", "norm",
        ];
        for keyword in rejected {
            assert_eq!(
                keyword.parse::<PrimitiveDataType>(),
                Err(TypeKeywordError(keyword.to_string())),
                "{keyword}"
            );
        }
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(parse("sint16").to_string(), "int16");
        assert_eq!(parse("uint32").to_string(), "uint32");
        assert_eq!(parse("nnorm16").to_string(), "nnorm16");
        assert_eq!(parse("s12scale16").to_string(), "s12scale16");
        assert_eq!(parse("12scale16").to_string(), "s12scale16");
        assert_eq!(parse("string(8)").to_string(), "string(8)");
        assert_eq!(parse("double").to_string(), "double");
    }

    #[test]
    fn test_display_parses_back() {
        let keywords = [
            "uint1", "int64", "nint9", "unorm7", "norm8", "n3scale12", "float", "string",
        ];
        for keyword in keywords {
            assert_eq!(
                parse(keyword).to_string().parse::<PrimitiveDataType>(),
                Ok(parse(keyword))
            );
        }
    }
}
