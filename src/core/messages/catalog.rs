//! Wire layouts of every supported message
//!
//! Lengths include the type byte. Configuration commands carry a trailing
//! `persist` byte that the receiver leaves out when it reports the setting
//! back, so their outbound form is one byte longer than the inbound one.

use crate::core::codec::{ArrayLayout, CodecError, FieldDef, FieldSet, MessageDescriptor};

use super::Message;

const fn command(name: &'static str, id: u8, len: usize, fields: &'static [FieldDef]) -> MessageDescriptor {
    MessageDescriptor {
        name,
        outbound_id: Some(id),
        inbound_id: None,
        outbound_len: len,
        inbound_len: 0,
        fields,
        array: None,
    }
}

const fn report(name: &'static str, id: u8, len: usize, fields: &'static [FieldDef]) -> MessageDescriptor {
    MessageDescriptor {
        name,
        outbound_id: None,
        inbound_id: Some(id),
        outbound_len: 0,
        inbound_len: len,
        fields,
        array: None,
    }
}

const fn setting(
    name: &'static str,
    (outbound_id, outbound_len): (u8, usize),
    (inbound_id, inbound_len): (u8, usize),
    fields: &'static [FieldDef],
) -> MessageDescriptor {
    MessageDescriptor {
        name,
        outbound_id: Some(outbound_id),
        inbound_id: Some(inbound_id),
        outbound_len,
        inbound_len,
        fields,
        array: None,
    }
}

const fn array_report(
    name: &'static str,
    id: u8,
    header_len: usize,
    fields: &'static [FieldDef],
    array: ArrayLayout,
) -> MessageDescriptor {
    MessageDescriptor {
        array: Some(array),
        ..report(name, id, header_len, fields)
    }
}

const PERSIST: FieldDef = FieldDef::enumeration("persist", 8).outbound_only();

const fn enabled(name: &'static str) -> FieldDef {
    FieldDef::enumeration(name, 8)
}

/// Select NMEA, binary or no periodic output
pub const CONFIGURE_MESSAGE_TYPE: MessageDescriptor = command(
    "ConfigureMessageType",
    0x09,
    3,
    &[FieldDef::enumeration("message_type", 8), PERSIST],
);

/// Ask for the firmware version (answered by 0x80)
pub const QUERY_SOFTWARE_VERSION: MessageDescriptor =
    command("QuerySoftwareVersion", 0x02, 2, &[FieldDef::u8("software_type")]);

/// Ask for the firmware CRC (answered by 0x81)
pub const QUERY_SOFTWARE_CRC: MessageDescriptor =
    command("QuerySoftwareCrc", 0x03, 2, &[FieldDef::u8("software_type")]);

/// Ask for the position update rate (answered by 0x86)
pub const QUERY_POSITION_UPDATE_RATE: MessageDescriptor = command("QueryPositionUpdateRate", 0x10, 1, &[]);

/// Position update rate
pub const CONFIGURE_POSITION_UPDATE_RATE: MessageDescriptor = setting(
    "ConfigurePositionUpdateRate",
    (0x0E, 3),
    (0x86, 2),
    &[FieldDef::enumeration("update_rate", 8), PERSIST],
);

/// Ask which binary measurements are output (answered by 0x89)
pub const QUERY_BINARY_MEASUREMENT_OUTPUT_STATUS: MessageDescriptor =
    command("QueryBinaryMeasurementOutputStatus", 0x1F, 1, &[]);

/// Binary measurement output selection
pub const CONFIGURE_BINARY_MEASUREMENT_OUTPUT: MessageDescriptor = setting(
    "ConfigureBinaryMeasurementOutput",
    (0x1E, 9),
    (0x89, 8),
    &[
        FieldDef::enumeration("output_rate", 8),
        enabled("measurement_time"),
        enabled("raw_measurement"),
        enabled("sv_channel_status"),
        enabled("receiver_state"),
        FieldDef::flags("subframe", 8),
        enabled("extended_raw_measurement"),
        PERSIST,
    ],
);

/// Ask for the RTCM output configuration (answered by 0x8A)
pub const QUERY_BINARY_RTCM_OUTPUT_STATUS: MessageDescriptor = command("QueryBinaryRtcmOutputStatus", 0x21, 1, &[]);

/// RTCM MSM7 output selection
pub const CONFIGURE_BINARY_RTCM_OUTPUT: MessageDescriptor = setting(
    "ConfigureBinaryRtcmOutput",
    (0x20, 17),
    (0x8A, 16),
    &[
        enabled("rtcm_output"),
        FieldDef::enumeration("output_rate", 8),
        enabled("stationary_rtk"),
        enabled("gps_msm7"),
        enabled("glonass_msm7"),
        FieldDef::u8("reserved0"),
        enabled("sbas_msm7"),
        enabled("qzss_msm7"),
        enabled("beidou_msm7"),
        FieldDef::bytes("reserved", 6),
        PERSIST,
    ],
);

/// Ask for the base station position (answered by 0x8B)
pub const QUERY_BASE_POSITION: MessageDescriptor = command("QueryBasePosition", 0x23, 1, &[]);

/// Base station position and survey settings
pub const CONFIGURE_BASE_POSITION: MessageDescriptor = setting(
    "ConfigureBasePosition",
    (0x22, 31),
    (0x8B, 30),
    &[
        FieldDef::enumeration("mode", 8),
        FieldDef::u32("survey_length"),
        FieldDef::u32("standard_deviation"),
        FieldDef::f64("latitude"),
        FieldDef::f64("longitude"),
        FieldDef::f32("ellipsoidal_height"),
        PERSIST,
    ],
);

/// Ask for GPS ephemeris (0 = all satellites)
pub const GET_GPS_EPHEMERIS: MessageDescriptor =
    command("GetGpsEphemeris", 0x30, 2, &[FieldDef::u8("satellite_number")]);

/// GPS ephemeris, uploaded or reported
pub const GPS_EPHEMERIS: MessageDescriptor = setting(
    "GpsEphemeris",
    (0x41, 87),
    (0xB1, 87),
    &[
        FieldDef::u16("satellite_number"),
        FieldDef::bytes("subframe1", 28),
        FieldDef::bytes("subframe2", 28),
        FieldDef::bytes("subframe3", 28),
    ],
);

/// Ask for GLONASS ephemeris (0 = all satellites)
pub const GET_GLONASS_EPHEMERIS: MessageDescriptor =
    command("GetGlonassEphemeris", 0x58, 2, &[FieldDef::u8("satellite_number")]);

/// GLONASS ephemeris, uploaded or reported
pub const GLONASS_EPHEMERIS: MessageDescriptor = setting(
    "GlonassEphemeris",
    (0x5C, 43),
    (0x90, 43),
    &[
        FieldDef::u8("slot_number"),
        FieldDef::i8("k_number"),
        FieldDef::bytes("data0", 10),
        FieldDef::bytes("data1", 10),
        FieldDef::bytes("data2", 10),
        FieldDef::bytes("data3", 10),
    ],
);

/// Firmware version
pub const RECEIVER_SOFTWARE_VERSION: MessageDescriptor = report(
    "ReceiverSoftwareVersion",
    0x80,
    14,
    &[
        FieldDef::u8("software_type"),
        FieldDef::u32("kernel_version"),
        FieldDef::u32("odm_version"),
        FieldDef::u32("revision"),
    ],
);

/// Firmware CRC
pub const RECEIVER_SOFTWARE_CRC: MessageDescriptor = report(
    "ReceiverSoftwareCrc",
    0x81,
    4,
    &[FieldDef::u8("software_type"), FieldDef::u16("crc")],
);

/// Epoch of the following measurement messages
pub const MEASUREMENT_TIME: MessageDescriptor = report(
    "MeasurementTime",
    0xDC,
    10,
    &[
        FieldDef::u8("iod"),
        FieldDef::u16("receiver_wn"),
        FieldDef::u32("receiver_tow"),
        FieldDef::u16("measurement_period"),
    ],
);

/// Raw pseudorange, carrier and doppler per satellite
pub const RAW_MEASUREMENTS: MessageDescriptor = array_report(
    "RawMeasurements",
    0xDD,
    3,
    &[FieldDef::u8("iod"), FieldDef::u8("count")],
    ArrayLayout {
        count_field: "count",
        item_name: "RawMeasurement",
        item_fields: &[
            FieldDef::u8("svid"),
            FieldDef::u8("cn0"),
            FieldDef::f64("pseudo_range"),
            FieldDef::f64("accumulated_carrier_cycle"),
            FieldDef::f32("doppler_frequency"),
            FieldDef::flags("indicator", 8),
        ],
        item_len: 23,
    },
);

/// Tracking state per receiver channel
pub const SV_CHANNEL_STATUSES: MessageDescriptor = array_report(
    "SvChannelStatuses",
    0xDE,
    3,
    &[FieldDef::u8("iod"), FieldDef::u8("count")],
    ArrayLayout {
        count_field: "count",
        item_name: "SvChannelStatus",
        item_fields: &[
            FieldDef::u8("channel_id"),
            FieldDef::u8("svid"),
            FieldDef::flags("sv_status", 8),
            FieldDef::u8("ura"),
            FieldDef::i8("cn0"),
            FieldDef::i16("elevation"),
            FieldDef::i16("azimuth"),
            FieldDef::flags("channel_status", 8),
        ],
        item_len: 10,
    },
);

/// Navigation solution in ECEF
pub const RECEIVER_NAVIGATION_STATUS: MessageDescriptor = report(
    "ReceiverNavigationStatus",
    0xDF,
    81,
    &[
        FieldDef::u8("iod"),
        FieldDef::enumeration("navigation_state", 8),
        FieldDef::u16("week_number"),
        FieldDef::f64("time_of_week"),
        FieldDef::f64("ecef_x"),
        FieldDef::f64("ecef_y"),
        FieldDef::f64("ecef_z"),
        FieldDef::f32("ecef_vx"),
        FieldDef::f32("ecef_vy"),
        FieldDef::f32("ecef_vz"),
        FieldDef::f64("clock_bias"),
        FieldDef::f32("clock_drift"),
        FieldDef::f32("gdop"),
        FieldDef::f32("pdop"),
        FieldDef::f32("hdop"),
        FieldDef::f32("vdop"),
        FieldDef::f32("tdop"),
    ],
);

/// Raw GPS navigation subframe
pub const GPS_SUBFRAME: MessageDescriptor = report(
    "GpsSubframe",
    0xE0,
    33,
    &[FieldDef::u8("svid"), FieldDef::u8("sfid"), FieldDef::bytes("words", 30)],
);

/// Raw GLONASS navigation string
pub const GLONASS_STRING: MessageDescriptor = report(
    "GlonassString",
    0xE1,
    12,
    &[FieldDef::u8("svid"), FieldDef::u8("string_number"), FieldDef::bytes("words", 9)],
);

/// Raw BeiDou D1 subframe
pub const BEIDOU_D1_SUBFRAME: MessageDescriptor = report(
    "BeidouD1Subframe",
    0xE2,
    31,
    &[FieldDef::u8("svid"), FieldDef::u8("sfid"), FieldDef::bytes("words", 28)],
);

/// Raw BeiDou D2 subframe
pub const BEIDOU_D2_SUBFRAME: MessageDescriptor = report(
    "BeidouD2Subframe",
    0xE3,
    31,
    &[FieldDef::u8("svid"), FieldDef::u8("sfid"), FieldDef::bytes("words", 28)],
);

/// Multi-constellation raw measurements with signal type and quality
pub const EXTENDED_RAW_MEASUREMENTS: MessageDescriptor = array_report(
    "ExtendedRawMeasurements",
    0xE5,
    14,
    &[
        FieldDef::u8("version"),
        FieldDef::u8("iod"),
        FieldDef::u16("receiver_wn"),
        FieldDef::u32("tow"),
        FieldDef::u16("measurement_period"),
        FieldDef::flags("indicator", 8),
        FieldDef::bytes("reserved", 1),
        FieldDef::u8("count"),
    ],
    ArrayLayout {
        count_field: "count",
        item_name: "ExtendedRawMeasurement",
        item_fields: &[
            FieldDef::uint("signal_type", 4),
            FieldDef::enumeration("gnss_type", 4),
            FieldDef::u8("svid"),
            FieldDef::uint("frequency_id", 4),
            FieldDef::uint("lock_time_indicator", 4),
            FieldDef::u8("cn0"),
            FieldDef::f64("pseudorange"),
            FieldDef::f64("accumulated_carrier_cycle"),
            FieldDef::f32("doppler_frequency"),
            FieldDef::u8("pseudorange_std_dev"),
            FieldDef::u8("carrier_std_dev"),
            FieldDef::u8("doppler_std_dev"),
            FieldDef::flags("channel_indicator", 16),
            FieldDef::bytes("reserved", 2),
        ],
        item_len: 31,
    },
);

/// One catalog row: a descriptor and the typed decoder for its inbound form
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    /// Wire layout
    pub descriptor: &'static MessageDescriptor,
    /// Build the typed message from decoded fields
    pub decode: fn(&FieldSet) -> Result<Message, CodecError>,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.descriptor.name)
            .field("outbound_id", &self.descriptor.outbound_id)
            .field("inbound_id", &self.descriptor.inbound_id)
            .finish()
    }
}
