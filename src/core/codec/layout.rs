//! Field descriptors and compiled layouts

use super::bits::{BitReader, BitWriter};
use super::value::{FieldSet, Value};
use super::{CodecError, LayoutError};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Interpretation of a field's bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    /// Unsigned integer
    Unsigned,
    /// Two's complement integer
    Signed,
    /// IEEE-754 float, 32 or 64 bits
    Float,
    /// Opaque bytes, whole bytes only
    Bytes,
    /// Closed enumeration stored as unsigned
    Enum,
    /// Bit-flag set stored as unsigned
    Flags,
}

impl FieldKind {
    fn valid_width(self, bits: usize) -> bool {
        match self {
            Self::Unsigned | Self::Signed | Self::Enum | Self::Flags => (1..=64).contains(&bits),
            Self::Float => bits == 32 || bits == 64,
            Self::Bytes => bits > 0 && bits % 8 == 0,
        }
    }

    fn value_name(self, bits: usize) -> &'static str {
        match self {
            Self::Unsigned | Self::Enum | Self::Flags => "unsigned",
            Self::Signed => "signed",
            Self::Float if bits == 32 => "f32",
            Self::Float => "f64",
            Self::Bytes => "bytes",
        }
    }
}

/// Which way a message or field travels
///
/// Outbound is host to receiver (commands), inbound is receiver to host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Host to receiver
    Outbound,
    /// Receiver to host
    Inbound,
    /// Present in both directions
    Both,
}

impl Direction {
    /// Whether a field with this direction takes part in `wire`
    pub fn includes(self, wire: Direction) -> bool {
        self == Direction::Both || self == wire
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => write!(f, "outbound"),
            Direction::Inbound => write!(f, "inbound"),
            Direction::Both => write!(f, "both"),
        }
    }
}

/// One named field of a message body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name, unique within its layout
    pub name: &'static str,
    /// Width on the wire
    pub bits: usize,
    /// How the bits are interpreted
    pub kind: FieldKind,
    /// Directions the field is present in
    pub direction: Direction,
}

impl FieldDef {
    /// Field present in both directions
    pub const fn new(name: &'static str, bits: usize, kind: FieldKind) -> Self {
        Self {
            name,
            bits,
            kind,
            direction: Direction::Both,
        }
    }

    /// Unsigned integer of any width
    pub const fn uint(name: &'static str, bits: usize) -> Self {
        Self::new(name, bits, FieldKind::Unsigned)
    }

    /// `u8`
    pub const fn u8(name: &'static str) -> Self {
        Self::uint(name, 8)
    }

    /// `u16`
    pub const fn u16(name: &'static str) -> Self {
        Self::uint(name, 16)
    }

    /// `u32`
    pub const fn u32(name: &'static str) -> Self {
        Self::uint(name, 32)
    }

    /// `i8`
    pub const fn i8(name: &'static str) -> Self {
        Self::new(name, 8, FieldKind::Signed)
    }

    /// `i16`
    pub const fn i16(name: &'static str) -> Self {
        Self::new(name, 16, FieldKind::Signed)
    }

    /// `f32`
    pub const fn f32(name: &'static str) -> Self {
        Self::new(name, 32, FieldKind::Float)
    }

    /// `f64`
    pub const fn f64(name: &'static str) -> Self {
        Self::new(name, 64, FieldKind::Float)
    }

    /// Opaque run of `len` bytes
    pub const fn bytes(name: &'static str, len: usize) -> Self {
        Self::new(name, len * 8, FieldKind::Bytes)
    }

    /// Closed enumeration of `bits` width
    pub const fn enumeration(name: &'static str, bits: usize) -> Self {
        Self::new(name, bits, FieldKind::Enum)
    }

    /// Flag set of `bits` width
    pub const fn flags(name: &'static str, bits: usize) -> Self {
        Self::new(name, bits, FieldKind::Flags)
    }

    /// Restrict the field to host-to-receiver messages
    pub const fn outbound_only(self) -> Self {
        Self {
            direction: Direction::Outbound,
            ..self
        }
    }
}

/// Trailing run of homogeneous sub-records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayLayout {
    /// Header field holding the number of records
    pub count_field: &'static str,
    /// Sub-record name
    pub item_name: &'static str,
    /// Sub-record fields
    pub item_fields: &'static [FieldDef],
    /// Sub-record length in bytes
    pub item_len: usize,
}

/// Static description of one message
///
/// Lengths are in bytes and include the type byte. For array messages they
/// cover the header only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Message name
    pub name: &'static str,
    /// Type id when sent by the host
    pub outbound_id: Option<u8>,
    /// Type id when sent by the receiver
    pub inbound_id: Option<u8>,
    /// Outbound length
    pub outbound_len: usize,
    /// Inbound length
    pub inbound_len: usize,
    /// Fields in wire order
    pub fields: &'static [FieldDef],
    /// Trailing sub-records
    pub array: Option<ArrayLayout>,
}

impl MessageDescriptor {
    /// Type id for a direction
    pub fn id(&self, direction: Direction) -> Option<u8> {
        match direction {
            Direction::Outbound => self.outbound_id,
            Direction::Inbound => self.inbound_id,
            Direction::Both => None,
        }
    }

    /// Declared length for a direction
    pub fn len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Outbound => self.outbound_len,
            Direction::Inbound => self.inbound_len,
            Direction::Both => 0,
        }
    }
}

#[derive(Debug, Clone)]
struct ItemLayout {
    count_field: &'static str,
    fields: Vec<FieldDef>,
    len: usize,
}

/// A message layout validated for one direction
#[derive(Debug, Clone)]
pub struct Layout {
    name: &'static str,
    id: u8,
    direction: Direction,
    fields: Vec<FieldDef>,
    len: usize,
    items: Option<ItemLayout>,
}

impl Layout {
    /// Validate `descriptor` for `direction` and compile it
    pub fn compile(descriptor: &MessageDescriptor, direction: Direction) -> Result<Self, LayoutError> {
        let message = descriptor.name;
        let id = descriptor
            .id(direction)
            .ok_or(LayoutError::MissingDirection { message, direction })?;

        let fields: Vec<FieldDef> = descriptor
            .fields
            .iter()
            .filter(|f| f.direction.includes(direction))
            .copied()
            .collect();
        let field_bits = validate_fields(message, &fields)?;

        let declared = descriptor.len(direction);
        let computed_bits = 8 + field_bits;
        if computed_bits != declared * 8 {
            return Err(LayoutError::LengthMismatch {
                message,
                direction,
                declared,
                computed_bits,
            });
        }

        let items = match &descriptor.array {
            Some(array) => Some(compile_items(message, array, &fields, direction)?),
            None => None,
        };

        Ok(Self {
            name: message,
            id,
            direction,
            fields,
            len: declared,
            items,
        })
    }

    /// Message name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type id
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Direction the layout was compiled for
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Fixed length in bytes, type byte included
    pub fn fixed_len(&self) -> usize {
        self.len
    }

    /// Sub-record length, for array messages
    pub fn item_len(&self) -> Option<usize> {
        self.items.as_ref().map(|items| items.len)
    }

    /// Fields in wire order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Decode a body (payload without the type byte)
    ///
    /// Bytes past a fixed layout are ignored. For array messages the bytes
    /// after the header must hold exactly as many records as the count
    /// field says.
    pub fn decode(&self, body: &[u8]) -> Result<FieldSet, CodecError> {
        let truncated = || CodecError::Truncated {
            message: self.name,
            expected: self.len,
            actual: body.len() + 1,
        };

        let header = self.len - 1;
        if body.len() < header {
            return Err(truncated());
        }

        let mut reader = BitReader::new(body);
        let mut fields = read_fields(&mut reader, &self.fields).ok_or_else(truncated)?;

        if let Some(items) = &self.items {
            let remainder = body.len() - header;
            if remainder % items.len != 0 {
                return Err(CodecError::ArrayMisaligned {
                    message: self.name,
                    remainder,
                    item_len: items.len,
                });
            }

            let actual = remainder / items.len;
            let declared: u64 = fields.get(items.count_field)?;
            if declared != actual as u64 {
                return Err(CodecError::ArrayCountMismatch {
                    message: self.name,
                    declared,
                    actual,
                });
            }

            let records = (0..actual)
                .map(|_| read_fields(&mut reader, &items.fields))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(truncated)?;
            fields = fields.with_items(records);
        }

        Ok(fields)
    }

    /// Encode a full payload (type byte first) from field values
    ///
    /// Only fields of this layout's direction are written; extra values in
    /// `fields` are ignored.
    pub fn encode(&self, fields: &FieldSet) -> Result<Vec<u8>, CodecError> {
        let records = fields.items();
        let item_len = self.items.as_ref().map_or(0, |items| items.len);
        let mut writer = BitWriter::with_capacity(self.len + records.len() * item_len);
        writer.write(u64::from(self.id), 8);
        write_fields(&mut writer, &self.fields, fields)?;

        if let Some(items) = &self.items {
            let declared: u64 = fields.get(items.count_field)?;
            if declared != records.len() as u64 {
                return Err(CodecError::ArrayCountMismatch {
                    message: self.name,
                    declared,
                    actual: records.len(),
                });
            }
            for record in records {
                write_fields(&mut writer, &items.fields, record)?;
            }
        }

        Ok(writer.into_bytes())
    }
}

fn validate_fields(message: &'static str, fields: &[FieldDef]) -> Result<usize, LayoutError> {
    let mut names = HashSet::with_capacity(fields.len());
    let mut bits = 0;
    for field in fields {
        if !field.kind.valid_width(field.bits) {
            return Err(LayoutError::InvalidWidth {
                message,
                field: field.name,
                bits: field.bits,
            });
        }
        if !names.insert(field.name) {
            return Err(LayoutError::DuplicateField {
                message,
                field: field.name,
            });
        }
        bits += field.bits;
    }
    Ok(bits)
}

fn compile_items(
    message: &'static str,
    array: &ArrayLayout,
    header: &[FieldDef],
    direction: Direction,
) -> Result<ItemLayout, LayoutError> {
    let counter = header
        .iter()
        .find(|f| f.name == array.count_field && f.kind == FieldKind::Unsigned);
    if counter.is_none() {
        return Err(LayoutError::MissingCountField {
            message,
            field: array.count_field,
        });
    }

    let fields: Vec<FieldDef> = array
        .item_fields
        .iter()
        .filter(|f| f.direction.includes(direction))
        .copied()
        .collect();
    let computed_bits = validate_fields(message, &fields)?;
    if computed_bits == 0 || computed_bits != array.item_len * 8 {
        return Err(LayoutError::ItemLengthMismatch {
            message,
            item: array.item_name,
            declared: array.item_len,
            computed_bits,
        });
    }

    Ok(ItemLayout {
        count_field: array.count_field,
        fields,
        len: array.item_len,
    })
}

fn read_fields(reader: &mut BitReader<'_>, defs: &[FieldDef]) -> Option<FieldSet> {
    let mut fields = FieldSet::new();
    for def in defs {
        fields.push(def.name, read_field(reader, def)?);
    }
    Some(fields)
}

fn read_field(reader: &mut BitReader<'_>, def: &FieldDef) -> Option<Value> {
    let value = match def.kind {
        FieldKind::Unsigned | FieldKind::Enum | FieldKind::Flags => Value::Unsigned(reader.read(def.bits)?),
        FieldKind::Signed => Value::Signed(reader.read_signed(def.bits)?),
        FieldKind::Float if def.bits == 32 => {
            let raw = u32::try_from(reader.read(32)?).ok()?;
            Value::F32(f32::from_bits(raw))
        }
        FieldKind::Float => Value::F64(f64::from_bits(reader.read(64)?)),
        FieldKind::Bytes => Value::Bytes(reader.read_bytes(def.bits / 8)?),
    };
    Some(value)
}

fn write_fields(writer: &mut BitWriter, defs: &[FieldDef], fields: &FieldSet) -> Result<(), CodecError> {
    for def in defs {
        let value = fields.value(def.name).ok_or(CodecError::MissingField(def.name))?;
        write_field(writer, def, value)?;
    }
    Ok(())
}

fn write_field(writer: &mut BitWriter, def: &FieldDef, value: &Value) -> Result<(), CodecError> {
    let out_of_range = |value: String| CodecError::OutOfRange {
        field: def.name,
        value,
        bits: def.bits,
    };

    match (def.kind, value) {
        (FieldKind::Unsigned | FieldKind::Enum | FieldKind::Flags, Value::Unsigned(v)) => {
            if def.bits < 64 && *v >> def.bits != 0 {
                return Err(out_of_range(v.to_string()));
            }
            writer.write(*v, def.bits);
        }
        (FieldKind::Signed, Value::Signed(v)) => {
            let half = 1i128 << (def.bits - 1);
            let wide = i128::from(*v);
            if wide < -half || wide >= half {
                return Err(out_of_range(v.to_string()));
            }
            writer.write(*v as u64, def.bits);
        }
        (FieldKind::Float, Value::F32(v)) if def.bits == 32 => writer.write(u64::from(v.to_bits()), 32),
        (FieldKind::Float, Value::F64(v)) if def.bits == 64 => writer.write(v.to_bits(), 64),
        (FieldKind::Bytes, Value::Bytes(data)) => {
            if data.len() * 8 != def.bits {
                return Err(out_of_range(format!("{} bytes", data.len())));
            }
            writer.write_bytes(data);
        }
        (kind, other) => {
            return Err(CodecError::TypeMismatch {
                field: def.name,
                expected: kind.value_name(def.bits),
                found: other.kind_name(),
            })
        }
    }
    Ok(())
}
