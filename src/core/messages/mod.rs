//! Typed receiver messages
//!
//! Each message is a plain struct implementing [`WireMessage`], tying it to
//! its [`MessageDescriptor`] in the [`catalog`]. [`Message`] is the closed
//! sum of all of them and is what the reassembler delivers.

pub mod catalog;
mod commands;
pub mod enums;
pub mod flags;
mod reports;

pub use catalog::CatalogEntry;
pub use commands::{
    ConfigureBasePosition, ConfigureBinaryMeasurementOutput, ConfigureBinaryRtcmOutput, ConfigureMessageType,
    ConfigurePositionUpdateRate, GetGlonassEphemeris, GetGpsEphemeris, GlonassEphemeris, GpsEphemeris,
    QueryBasePosition, QueryBinaryMeasurementOutputStatus, QueryBinaryRtcmOutputStatus, QueryPositionUpdateRate,
    QuerySoftwareCrc, QuerySoftwareVersion,
};
pub use enums::{
    BasePositionMode, BinaryUpdateRate, EnableSetting, GnssType, MessageType, NavigationState, PersistSetting,
    UpdateRate,
};
pub use flags::{
    ChannelStatusFlags, ExtendedChannelFlags, MeasurementIndicatorFlags, RawMeasurementFlags, SubframeFlags,
    SvStatusFlags,
};
pub use reports::{
    BeidouD1Subframe, BeidouD2Subframe, ExtendedRawMeasurement, ExtendedRawMeasurements, GlonassString, GpsSubframe,
    MeasurementTime, RawMeasurement, RawMeasurements, ReceiverNavigationStatus, ReceiverSoftwareCrc,
    ReceiverSoftwareVersion, SvChannelStatus, SvChannelStatuses,
};

use crate::core::codec::{CodecError, FieldSet, MessageDescriptor};
use serde::Serialize;

/// A message with a wire layout
pub trait WireMessage: Sized {
    /// Wire layout
    const DESCRIPTOR: &'static MessageDescriptor;

    /// Build from decoded fields
    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError>;

    /// Field values for encoding
    fn to_fields(&self) -> FieldSet;
}

/// A sub-record of an array message
pub trait WireRecord: Sized {
    /// Build from decoded fields
    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError>;

    /// Field values for encoding
    fn to_fields(&self) -> FieldSet;
}

fn decode_as<T>(fields: &FieldSet) -> Result<Message, CodecError>
where
    T: WireMessage + Into<Message>,
{
    T::from_fields(fields).map(Into::into)
}

macro_rules! messages {
    ($($variant:ident),+ $(,)?) => {
        /// Any message of the catalog
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "type")]
        #[allow(missing_docs)]
        pub enum Message {
            $($variant($variant),)+
        }

        impl Message {
            /// Wire layout of this message
            pub fn descriptor(&self) -> &'static MessageDescriptor {
                match self {
                    $(Message::$variant(_) => <$variant as WireMessage>::DESCRIPTOR,)+
                }
            }

            /// Field values for encoding
            pub fn to_fields(&self) -> FieldSet {
                match self {
                    $(Message::$variant(m) => m.to_fields(),)+
                }
            }
        }

        $(impl From<$variant> for Message {
            fn from(message: $variant) -> Self {
                Message::$variant(message)
            }
        })+

        /// Every message, in type id order of its primary direction
        pub static CATALOG: &[CatalogEntry] = &[
            $(CatalogEntry {
                descriptor: <$variant as WireMessage>::DESCRIPTOR,
                decode: decode_as::<$variant>,
            },)+
        ];
    };
}

messages! {
    QuerySoftwareVersion,
    QuerySoftwareCrc,
    ConfigureMessageType,
    ConfigurePositionUpdateRate,
    QueryPositionUpdateRate,
    ConfigureBinaryMeasurementOutput,
    QueryBinaryMeasurementOutputStatus,
    ConfigureBinaryRtcmOutput,
    QueryBinaryRtcmOutputStatus,
    ConfigureBasePosition,
    QueryBasePosition,
    GetGpsEphemeris,
    GpsEphemeris,
    GetGlonassEphemeris,
    GlonassEphemeris,
    ReceiverSoftwareVersion,
    ReceiverSoftwareCrc,
    MeasurementTime,
    RawMeasurements,
    SvChannelStatuses,
    ReceiverNavigationStatus,
    GpsSubframe,
    GlonassString,
    BeidouD1Subframe,
    BeidouD2Subframe,
    ExtendedRawMeasurements,
}

impl Message {
    /// Message name
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }
}
