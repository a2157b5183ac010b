//! Declarative message codec
//!
//! Every message body is a fixed sequence of big-endian bit fields,
//! optionally followed by a run of homogeneous sub-records. A message is
//! described once as a [`MessageDescriptor`]; [`Layout::compile`] validates
//! the description eagerly and the compiled layout then decodes inbound
//! bodies into a [`FieldSet`] and encodes outbound ones from it.

pub mod bits;
mod layout;
mod value;

pub use bits::{BitReader, BitWriter};
pub use layout::{ArrayLayout, Direction, FieldDef, FieldKind, Layout, MessageDescriptor};
pub use value::{FieldSet, FromValue, Value, WireEnum, WireFlags};

use thiserror::Error;

/// Catalog integrity errors, found when a layout is compiled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Field width not representable for its kind
    #[error("{message}.{field}: invalid width of {bits} bits")]
    InvalidWidth {
        /// Message name
        message: &'static str,
        /// Field name
        field: &'static str,
        /// Declared width
        bits: usize,
    },

    /// Two fields share a name within one layout
    #[error("{message}: duplicate field {field}")]
    DuplicateField {
        /// Message name
        message: &'static str,
        /// Field name
        field: &'static str,
    },

    /// Declared length disagrees with the sum of the field widths
    #[error("{message} ({direction}): declared {declared} bytes, fields add up to {computed_bits} bits")]
    LengthMismatch {
        /// Message name
        message: &'static str,
        /// Direction being compiled
        direction: Direction,
        /// Declared length in bytes, type byte included
        declared: usize,
        /// Sum of the type byte and field widths in bits
        computed_bits: usize,
    },

    /// Array sub-record width is not whole bytes or disagrees with its declared length
    #[error("{message}: sub-record {item} declared {declared} bytes, fields add up to {computed_bits} bits")]
    ItemLengthMismatch {
        /// Message name
        message: &'static str,
        /// Sub-record name
        item: &'static str,
        /// Declared length in bytes
        declared: usize,
        /// Sum of the field widths in bits
        computed_bits: usize,
    },

    /// Array count field absent from the header or not an unsigned integer
    #[error("{message}: count field {field} missing from header or not unsigned")]
    MissingCountField {
        /// Message name
        message: &'static str,
        /// Count field name
        field: &'static str,
    },

    /// Message has no id for the requested direction
    #[error("{message} has no {direction} form")]
    MissingDirection {
        /// Message name
        message: &'static str,
        /// Requested direction
        direction: Direction,
    },

    /// Two messages claim the same type id in one direction
    #[error("Type id 0x{id:02X} ({direction}) claimed by both {first} and {second}")]
    DuplicateId {
        /// Type id
        id: u8,
        /// Direction of the clash
        direction: Direction,
        /// Message registered first
        first: &'static str,
        /// Message registered second
        second: &'static str,
    },
}

/// Decode and encode failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Payload shorter than the layout requires
    #[error("{message}: payload truncated, need {expected} bytes, got {actual}")]
    Truncated {
        /// Message name
        message: &'static str,
        /// Minimum payload length, type byte included
        expected: usize,
        /// Actual payload length, type byte included
        actual: usize,
    },

    /// No decoder registered for an inbound type id
    #[error("Unknown message type 0x{0:02X}")]
    UnknownMessageType(u8),

    /// Message has no outbound form
    #[error("{0} cannot be sent to the receiver")]
    NotEncodable(&'static str),

    /// A field required by the layout is absent
    #[error("Missing field {0}")]
    MissingField(&'static str),

    /// A field holds a value of the wrong kind
    #[error("Field {field}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Field name
        field: &'static str,
        /// Kind the layout needs
        expected: &'static str,
        /// Kind supplied
        found: &'static str,
    },

    /// A value does not fit its field
    #[error("Field {field}: value {value} does not fit in {bits} bits")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
        /// Field width
        bits: usize,
    },

    /// Raw value outside a closed enumeration
    #[error("Field {field}: {value} is not a valid {enumeration}")]
    UnknownEnumValue {
        /// Field name
        field: &'static str,
        /// Enumeration name
        enumeration: &'static str,
        /// Raw value
        value: u64,
    },

    /// Array count field disagrees with the number of sub-records present
    #[error("{message}: count field says {declared} records, payload holds {actual}")]
    ArrayCountMismatch {
        /// Message name
        message: &'static str,
        /// Count field value
        declared: u64,
        /// Records actually present
        actual: usize,
    },

    /// Bytes after the header are not a whole number of sub-records
    #[error("{message}: {remainder} trailing bytes are not a multiple of the {item_len}-byte record")]
    ArrayMisaligned {
        /// Message name
        message: &'static str,
        /// Bytes after the header
        remainder: usize,
        /// Sub-record length
        item_len: usize,
    },
}
