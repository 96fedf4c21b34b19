//! Decoding engine: walks a schema and a byte buffer in lock-step.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
    bit_reader::BitReader,
    bits::{sign_extend, signed_max, unsigned_max},
    config::DecodeConfig,
    data_type::{FloatWidth, IntScale, IntShape, IntType, PrimitiveDataType},
    errors::{DecodeError, ReadError, SchemaError},
    field::{ArrayCount, FieldDecl, FieldKind, FieldType, INTRINSIC_PREFIX},
    intrinsics::Intrinsics,
    schema::{Schema, Struct},
    tree::{FieldNode, PrimitiveValue, StructNode},
};

/// Decodes buffers against one schema.
///
/// The decoder only borrows the schema and keeps no state between calls, so a
/// single instance may serve concurrent [Decoder::read]s.
#[derive(Debug, Clone)]
pub struct Decoder<'s> {
    schema: &'s Schema,
    intrinsics: Intrinsics,
    config: DecodeConfig,
    structs: HashMap<&'s str, &'s Struct>,
    /// Lower bound on the buffer bits one instance of each struct needs.
    min_bits: HashMap<&'s str, usize>,
}

/// State owned by one [Decoder::read] call.
struct ReadContext<'s, 'd> {
    reader: BitReader<'d>,
    /// Floored values of single integer fields, by struct then field. Instances
    /// of the same struct type share a row.
    scalars: HashMap<&'s str, HashMap<&'s str, i128>>,
    depth: usize,
    /// Struct instances decoded so far.
    nodes: usize,
}

impl<'s> Decoder<'s> {
    /// Validates `schema` against `intrinsics` and builds a decoder for it.
    pub fn new(schema: &'s Schema, intrinsics: Intrinsics) -> Result<Self, SchemaError> {
        schema.validate(&intrinsics)?;

        Ok(Self::new_unchecked(schema, intrinsics))
    }

    /// Builds a decoder without validating. Reference errors the validator
    /// would have caught surface from [Decoder::read] instead.
    pub fn new_unchecked(schema: &'s Schema, intrinsics: Intrinsics) -> Self {
        let mut structs = HashMap::with_capacity(schema.structs.len());
        let mut min_bits = HashMap::with_capacity(schema.structs.len());
        for s in &schema.structs {
            if structs.contains_key(s.identifier.as_str()) {
                continue;
            }
            structs.insert(s.identifier.as_str(), s);
            let bits = min_struct_bits(s, &min_bits);
            min_bits.insert(s.identifier.as_str(), bits);
        }

        Decoder {
            schema,
            intrinsics,
            config: DecodeConfig::default(),
            structs,
            min_bits,
        }
    }

    pub fn with_config(mut self, config: DecodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decodes `data` from bit 0 as the schema's root struct.
    pub fn read(&self, data: &[u8]) -> Result<StructNode, DecodeError> {
        let root = self
            .structs
            .get(self.schema.root.as_str())
            .copied()
            .ok_or_else(|| DecodeError::UnknownRoot(self.schema.root.clone()))?;

        debug!(root = %root.identifier, len = data.len(), "decoding");

        let mut ctx = ReadContext {
            reader: BitReader::new(data),
            scalars: HashMap::new(),
            depth: 0,
            nodes: 0,
        };
        let node = self.read_struct(&mut ctx, root)?;

        debug!(
            root = %root.identifier,
            bits = ctx.reader.bit_pos(),
            remaining = ctx.reader.remaining_bits(),
            "decoded"
        );

        Ok(node)
    }

    fn read_struct(
        &self,
        ctx: &mut ReadContext<'s, '_>,
        s: &'s Struct,
    ) -> Result<StructNode, DecodeError> {
        if ctx.depth >= self.config.max_depth {
            return Err(DecodeError::RecursionLimit {
                struct_name: s.identifier.clone(),
                max_depth: self.config.max_depth,
            });
        }

        if ctx.nodes >= self.config.max_nodes {
            return Err(DecodeError::NodeLimit {
                struct_name: s.identifier.clone(),
                max_nodes: self.config.max_nodes,
            });
        }

        ctx.nodes += 1;
        ctx.depth += 1;
        let mut children = Vec::with_capacity(s.fields.len());
        for field in &s.fields {
            children.push(self.read_field(ctx, s, field)?);
        }
        ctx.depth -= 1;

        Ok(StructNode {
            type_name: s.identifier.clone(),
            children,
            attributes: s.attributes.clone(),
        })
    }

    fn read_field(
        &self,
        ctx: &mut ReadContext<'s, '_>,
        s: &'s Struct,
        field: &'s FieldDecl,
    ) -> Result<FieldNode, DecodeError> {
        let node = match (&field.kind, &field.ty) {
            (FieldKind::Single, FieldType::Primitive(data_type)) => {
                let start = ctx.reader.bit_pos();
                let value = self.read_primitive(ctx, s, field, data_type)?;

                trace!(
                    field = %field.identifier,
                    ty = %data_type,
                    start,
                    end = ctx.reader.bit_pos(),
                    %value,
                    "read field"
                );

                if data_type.is_integer() {
                    if let Some(count) = value.as_count() {
                        ctx.scalars
                            .entry(s.identifier.as_str())
                            .or_default()
                            .insert(field.identifier.as_str(), count);
                    }
                }

                FieldNode::SinglePrimitive {
                    data_type: *data_type,
                    name: field.identifier.clone(),
                    value,
                    attributes: field.attributes.clone(),
                }
            }
            (FieldKind::Array(count), FieldType::Primitive(data_type)) => {
                let count = self.resolve_count(ctx, s, field, count)?;

                // Every element takes at least this many bits, so an impossible
                // count fails here rather than after allocating.
                let needed = count.saturating_mul(min_element_bits(data_type));
                if needed > ctx.reader.remaining_bits() {
                    return Err(read_error(
                        s,
                        field,
                        ReadError::OutOfBounds {
                            bit_offset: ctx.reader.bit_pos(),
                            bits: needed,
                        },
                    ));
                }

                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(self.read_primitive(ctx, s, field, data_type)?);
                }

                trace!(field = %field.identifier, ty = %data_type, count, "read array");

                FieldNode::ArrayPrimitive {
                    data_type: *data_type,
                    name: field.identifier.clone(),
                    values,
                    attributes: field.attributes.clone(),
                }
            }
            (FieldKind::Single, FieldType::Struct(type_name)) => {
                let nested = self.lookup_struct(type_name)?;

                FieldNode::SingleStruct {
                    type_name: type_name.clone(),
                    name: field.identifier.clone(),
                    value: self.read_struct(ctx, nested)?,
                    attributes: field.attributes.clone(),
                }
            }
            (FieldKind::Array(count), FieldType::Struct(type_name)) => {
                let nested = self.lookup_struct(type_name)?;
                let count = self.resolve_count(ctx, s, field, count)?;

                if ctx.nodes.saturating_add(count) > self.config.max_nodes {
                    return Err(DecodeError::NodeLimit {
                        struct_name: nested.identifier.clone(),
                        max_nodes: self.config.max_nodes,
                    });
                }

                let element_bits = self.min_bits.get(type_name.as_str()).copied().unwrap_or(0);
                let needed = count.saturating_mul(element_bits);
                if needed > ctx.reader.remaining_bits() {
                    return Err(read_error(
                        s,
                        field,
                        ReadError::OutOfBounds {
                            bit_offset: ctx.reader.bit_pos(),
                            bits: needed,
                        },
                    ));
                }

                let mut values = Vec::new();
                for _ in 0..count {
                    values.push(self.read_struct(ctx, nested)?);
                }

                FieldNode::ArrayStruct {
                    type_name: type_name.clone(),
                    name: field.identifier.clone(),
                    values,
                    attributes: field.attributes.clone(),
                }
            }
        };

        Ok(node)
    }

    fn lookup_struct(&self, type_name: &str) -> Result<&'s Struct, DecodeError> {
        self.structs
            .get(type_name)
            .copied()
            .ok_or_else(|| DecodeError::UnknownStruct(type_name.to_string()))
    }

    fn resolve_count(
        &self,
        ctx: &ReadContext<'s, '_>,
        s: &Struct,
        field: &FieldDecl,
        count: &ArrayCount,
    ) -> Result<usize, DecodeError> {
        let count: i128 = match count {
            ArrayCount::Fixed(n) => *n as i128,
            ArrayCount::Field(name) | ArrayCount::Intrinsic(name)
                if name.starts_with(INTRINSIC_PREFIX) =>
            {
                self.intrinsics
                    .evaluate(name, ctx.reader.len(), ctx.reader.bit_pos())
                    .ok_or_else(|| DecodeError::UnknownIntrinsic {
                        struct_name: s.identifier.clone(),
                        field: field.identifier.clone(),
                        name: name.clone(),
                    })? as i128
            }
            ArrayCount::Field(name) | ArrayCount::Intrinsic(name) => ctx
                .scalars
                .get(s.identifier.as_str())
                .and_then(|row| row.get(name.as_str()))
                .copied()
                .ok_or_else(|| DecodeError::UnresolvedCount {
                    struct_name: s.identifier.clone(),
                    field: field.identifier.clone(),
                    count: name.clone(),
                })?,
        };

        if count < 0 {
            return Err(DecodeError::InvalidArrayCount {
                struct_name: s.identifier.clone(),
                field: field.identifier.clone(),
                count,
            });
        }

        if count > self.config.max_array_len as i128 {
            return Err(DecodeError::ArrayTooLong {
                struct_name: s.identifier.clone(),
                field: field.identifier.clone(),
                count,
                max: self.config.max_array_len,
            });
        }

        Ok(count as usize)
    }

    fn read_primitive(
        &self,
        ctx: &mut ReadContext<'s, '_>,
        s: &Struct,
        field: &FieldDecl,
        data_type: &PrimitiveDataType,
    ) -> Result<PrimitiveValue, DecodeError> {
        let reader = &mut ctx.reader;

        let value = match data_type {
            PrimitiveDataType::Int(int) => {
                if int.bit_width == 0 || int.bit_width > 64 {
                    return Err(DecodeError::InvalidBitWidth {
                        struct_name: s.identifier.clone(),
                        field: field.identifier.clone(),
                        bits: int.bit_width,
                    });
                }
                read_int(reader, int)
            }
            PrimitiveDataType::Float(width) => read_float(reader, *width),
            PrimitiveDataType::FixedString { capacity } => reader
                .read_bounded(*capacity)
                .map(|bytes| PrimitiveValue::String(ascii(bytes))),
            PrimitiveDataType::VarString => reader
                .read_until_zero()
                .map(|bytes| PrimitiveValue::String(ascii(bytes))),
        };

        value.map_err(|source| read_error(s, field, source))
    }
}

fn read_error(s: &Struct, field: &FieldDecl, source: ReadError) -> DecodeError {
    DecodeError::Read {
        struct_name: s.identifier.clone(),
        field: field.identifier.clone(),
        source,
    }
}

/// Reads a `bit_width`-wide integer at the cursor and applies its shape and scale.
fn read_int(reader: &mut BitReader<'_>, int: &IntType) -> Result<PrimitiveValue, ReadError> {
    let bits = int.bit_width as usize;
    let raw = reader.read_bits(bits)?;

    let signed = match int.shape {
        IntShape::Unsigned => None,
        IntShape::Signed => Some(sign_extend(raw, bits)),
        IntShape::Normal => Some((raw as i128 - (signed_max(bits) as i128 + 1)) as i64),
    };

    let ratio = || match signed {
        None => raw as f64 / unsigned_max(bits) as f64,
        // The negative extreme has one more step than the positive one.
        Some(v) => (v as f64 / signed_max(bits) as f64).max(-1.0),
    };

    Ok(match int.scale {
        IntScale::Raw => match signed {
            None => PrimitiveValue::Unsigned(raw),
            Some(v) => PrimitiveValue::Signed(v),
        },
        IntScale::Normalized => PrimitiveValue::Float(ratio()),
        IntScale::Scaled { exponent } => {
            PrimitiveValue::Float(ratio() * 2f64.powi(exponent as i32))
        }
    })
}

fn read_float(reader: &mut BitReader<'_>, width: FloatWidth) -> Result<PrimitiveValue, ReadError> {
    let value = match width {
        FloatWidth::F32 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(reader.read_bytes(4)?);
            f32::from_le_bytes(buf) as f64
        }
        FloatWidth::F64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(reader.read_bytes(8)?);
            f64::from_le_bytes(buf)
        }
    };

    Ok(PrimitiveValue::Float(value))
}

/// One char per byte.
fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Fewest buffer bits a value of `data_type` can occupy. A string may be a
/// lone terminator.
fn min_element_bits(data_type: &PrimitiveDataType) -> usize {
    match data_type {
        PrimitiveDataType::Int(int) => int.bit_width as usize,
        PrimitiveDataType::Float(width) => width.bits(),
        PrimitiveDataType::FixedString { .. } | PrimitiveDataType::VarString => 8,
    }
}

/// Fewest buffer bits one instance of `s` can occupy. Structs missing from
/// `known`, `s` itself included, count as zero, as do arrays with a dynamic
/// count.
fn min_struct_bits(s: &Struct, known: &HashMap<&str, usize>) -> usize {
    s.fields.iter().fold(0usize, |total, field| {
        let element = match &field.ty {
            FieldType::Primitive(data_type) => min_element_bits(data_type),
            FieldType::Struct(name) => known.get(name.as_str()).copied().unwrap_or(0),
        };
        let count = match &field.kind {
            FieldKind::Single => 1,
            FieldKind::Array(ArrayCount::Fixed(n)) => usize::try_from(*n).unwrap_or(0),
            FieldKind::Array(_) => 0,
        };

        total.saturating_add(element.saturating_mul(count))
    })
}
