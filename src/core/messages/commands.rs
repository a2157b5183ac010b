//! Host-to-receiver commands and the settings the receiver reports back

use super::catalog;
use super::enums::{BasePositionMode, BinaryUpdateRate, EnableSetting, MessageType, PersistSetting, UpdateRate};
use super::flags::SubframeFlags;
use super::WireMessage;
use crate::core::codec::{CodecError, FieldSet, MessageDescriptor};
use serde::Serialize;

/// Query commands without a body
macro_rules! query {
    ($(#[$meta:meta])* $name:ident => $descriptor:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
        pub struct $name;

        impl WireMessage for $name {
            const DESCRIPTOR: &'static MessageDescriptor = &catalog::$descriptor;

            fn from_fields(_fields: &FieldSet) -> Result<Self, CodecError> {
                Ok(Self)
            }

            fn to_fields(&self) -> FieldSet {
                FieldSet::new()
            }
        }
    };
}

query!(
    /// Ask for the position update rate
    QueryPositionUpdateRate => QUERY_POSITION_UPDATE_RATE
);
query!(
    /// Ask which binary measurements are enabled
    QueryBinaryMeasurementOutputStatus => QUERY_BINARY_MEASUREMENT_OUTPUT_STATUS
);
query!(
    /// Ask for the RTCM output configuration
    QueryBinaryRtcmOutputStatus => QUERY_BINARY_RTCM_OUTPUT_STATUS
);
query!(
    /// Ask for the base station position
    QueryBasePosition => QUERY_BASE_POSITION
);

/// Select the periodic output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigureMessageType {
    /// Output format
    pub message_type: MessageType,
    /// Where the change is stored
    pub persist: PersistSetting,
}

impl WireMessage for ConfigureMessageType {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::CONFIGURE_MESSAGE_TYPE;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            message_type: fields.enumeration("message_type")?,
            persist: fields.enumeration_or("persist", PersistSetting::Sram)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with_enum("message_type", self.message_type)
            .with_enum("persist", self.persist)
    }
}

/// Ask for the firmware version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuerySoftwareVersion {
    /// 1 = system code
    pub software_type: u8,
}

impl Default for QuerySoftwareVersion {
    fn default() -> Self {
        Self { software_type: 1 }
    }
}

impl WireMessage for QuerySoftwareVersion {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::QUERY_SOFTWARE_VERSION;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            software_type: fields.get("software_type")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new().with("software_type", self.software_type)
    }
}

/// Ask for the firmware CRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuerySoftwareCrc {
    /// 1 = system code
    pub software_type: u8,
}

impl Default for QuerySoftwareCrc {
    fn default() -> Self {
        Self { software_type: 1 }
    }
}

impl WireMessage for QuerySoftwareCrc {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::QUERY_SOFTWARE_CRC;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            software_type: fields.get("software_type")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new().with("software_type", self.software_type)
    }
}

/// Position update rate, as set or as reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigurePositionUpdateRate {
    /// Rate
    pub update_rate: UpdateRate,
    /// Where the change is stored; reports always read back `Sram`
    pub persist: PersistSetting,
}

impl WireMessage for ConfigurePositionUpdateRate {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::CONFIGURE_POSITION_UPDATE_RATE;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            update_rate: fields.enumeration("update_rate")?,
            persist: fields.enumeration_or("persist", PersistSetting::Sram)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with_enum("update_rate", self.update_rate)
            .with_enum("persist", self.persist)
    }
}

/// Which binary measurement messages are output, and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigureBinaryMeasurementOutput {
    /// Output rate
    pub output_rate: BinaryUpdateRate,
    /// MeasurementTime (0xDC)
    pub measurement_time: EnableSetting,
    /// RawMeasurements (0xDD)
    pub raw_measurement: EnableSetting,
    /// SvChannelStatuses (0xDE)
    pub sv_channel_status: EnableSetting,
    /// ReceiverNavigationStatus (0xDF)
    pub receiver_state: EnableSetting,
    /// Navigation subframes per constellation (0xE0..0xE3)
    pub subframe: SubframeFlags,
    /// ExtendedRawMeasurements (0xE5)
    pub extended_raw_measurement: EnableSetting,
    /// Where the change is stored
    pub persist: PersistSetting,
}

impl WireMessage for ConfigureBinaryMeasurementOutput {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::CONFIGURE_BINARY_MEASUREMENT_OUTPUT;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            output_rate: fields.enumeration("output_rate")?,
            measurement_time: fields.enumeration("measurement_time")?,
            raw_measurement: fields.enumeration("raw_measurement")?,
            sv_channel_status: fields.enumeration("sv_channel_status")?,
            receiver_state: fields.enumeration("receiver_state")?,
            subframe: fields.flags("subframe")?,
            extended_raw_measurement: fields.enumeration("extended_raw_measurement")?,
            persist: fields.enumeration_or("persist", PersistSetting::Sram)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with_enum("output_rate", self.output_rate)
            .with_enum("measurement_time", self.measurement_time)
            .with_enum("raw_measurement", self.raw_measurement)
            .with_enum("sv_channel_status", self.sv_channel_status)
            .with_enum("receiver_state", self.receiver_state)
            .with_flags("subframe", self.subframe)
            .with_enum("extended_raw_measurement", self.extended_raw_measurement)
            .with_enum("persist", self.persist)
    }
}

/// RTCM MSM7 output selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigureBinaryRtcmOutput {
    /// Master switch
    pub rtcm_output: EnableSetting,
    /// Output rate
    pub output_rate: BinaryUpdateRate,
    /// Stationary RTK base message (1005)
    pub stationary_rtk: EnableSetting,
    /// GPS MSM7 (1077)
    pub gps_msm7: EnableSetting,
    /// GLONASS MSM7 (1087)
    pub glonass_msm7: EnableSetting,
    /// Reserved
    pub reserved0: u8,
    /// SBAS MSM7 (1107)
    pub sbas_msm7: EnableSetting,
    /// QZSS MSM7 (1117)
    pub qzss_msm7: EnableSetting,
    /// BeiDou MSM7 (1127)
    pub beidou_msm7: EnableSetting,
    /// Reserved
    pub reserved: [u8; 6],
    /// Where the change is stored
    pub persist: PersistSetting,
}

impl WireMessage for ConfigureBinaryRtcmOutput {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::CONFIGURE_BINARY_RTCM_OUTPUT;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            rtcm_output: fields.enumeration("rtcm_output")?,
            output_rate: fields.enumeration("output_rate")?,
            stationary_rtk: fields.enumeration("stationary_rtk")?,
            gps_msm7: fields.enumeration("gps_msm7")?,
            glonass_msm7: fields.enumeration("glonass_msm7")?,
            reserved0: fields.get("reserved0")?,
            sbas_msm7: fields.enumeration("sbas_msm7")?,
            qzss_msm7: fields.enumeration("qzss_msm7")?,
            beidou_msm7: fields.enumeration("beidou_msm7")?,
            reserved: fields.get("reserved")?,
            persist: fields.enumeration_or("persist", PersistSetting::Sram)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with_enum("rtcm_output", self.rtcm_output)
            .with_enum("output_rate", self.output_rate)
            .with_enum("stationary_rtk", self.stationary_rtk)
            .with_enum("gps_msm7", self.gps_msm7)
            .with_enum("glonass_msm7", self.glonass_msm7)
            .with("reserved0", self.reserved0)
            .with_enum("sbas_msm7", self.sbas_msm7)
            .with_enum("qzss_msm7", self.qzss_msm7)
            .with_enum("beidou_msm7", self.beidou_msm7)
            .with("reserved", self.reserved)
            .with_enum("persist", self.persist)
    }
}

/// Base station position and survey settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfigureBasePosition {
    /// Positioning mode
    pub mode: BasePositionMode,
    /// Survey length in seconds (survey mode)
    pub survey_length: u32,
    /// Standard deviation in metres (survey mode)
    pub standard_deviation: u32,
    /// Latitude in degrees (static mode)
    pub latitude: f64,
    /// Longitude in degrees (static mode)
    pub longitude: f64,
    /// Ellipsoidal height in metres (static mode)
    pub ellipsoidal_height: f32,
    /// Where the change is stored
    pub persist: PersistSetting,
}

impl WireMessage for ConfigureBasePosition {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::CONFIGURE_BASE_POSITION;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            mode: fields.enumeration("mode")?,
            survey_length: fields.get("survey_length")?,
            standard_deviation: fields.get("standard_deviation")?,
            latitude: fields.get("latitude")?,
            longitude: fields.get("longitude")?,
            ellipsoidal_height: fields.get("ellipsoidal_height")?,
            persist: fields.enumeration_or("persist", PersistSetting::Sram)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with_enum("mode", self.mode)
            .with("survey_length", self.survey_length)
            .with("standard_deviation", self.standard_deviation)
            .with("latitude", self.latitude)
            .with("longitude", self.longitude)
            .with("ellipsoidal_height", self.ellipsoidal_height)
            .with_enum("persist", self.persist)
    }
}

/// Ask for GPS ephemeris
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GetGpsEphemeris {
    /// PRN, 0 for all satellites
    pub satellite_number: u8,
}

impl WireMessage for GetGpsEphemeris {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::GET_GPS_EPHEMERIS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            satellite_number: fields.get("satellite_number")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new().with("satellite_number", self.satellite_number)
    }
}

/// GPS ephemeris subframes 1 to 3 of one satellite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpsEphemeris {
    /// PRN
    pub satellite_number: u16,
    /// Subframe 1 words
    pub subframe1: [u8; 28],
    /// Subframe 2 words
    pub subframe2: [u8; 28],
    /// Subframe 3 words
    pub subframe3: [u8; 28],
}

impl WireMessage for GpsEphemeris {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::GPS_EPHEMERIS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            satellite_number: fields.get("satellite_number")?,
            subframe1: fields.get("subframe1")?,
            subframe2: fields.get("subframe2")?,
            subframe3: fields.get("subframe3")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("satellite_number", self.satellite_number)
            .with("subframe1", self.subframe1)
            .with("subframe2", self.subframe2)
            .with("subframe3", self.subframe3)
    }
}

/// Ask for GLONASS ephemeris
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GetGlonassEphemeris {
    /// Slot number, 0 for all satellites
    pub satellite_number: u8,
}

impl WireMessage for GetGlonassEphemeris {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::GET_GLONASS_EPHEMERIS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            satellite_number: fields.get("satellite_number")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new().with("satellite_number", self.satellite_number)
    }
}

/// GLONASS ephemeris strings of one satellite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlonassEphemeris {
    /// Slot number
    pub slot_number: u8,
    /// Frequency channel number
    pub k_number: i8,
    /// String 1
    pub data0: [u8; 10],
    /// String 2
    pub data1: [u8; 10],
    /// String 3
    pub data2: [u8; 10],
    /// String 4
    pub data3: [u8; 10],
}

impl WireMessage for GlonassEphemeris {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::GLONASS_EPHEMERIS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            slot_number: fields.get("slot_number")?,
            k_number: fields.get("k_number")?,
            data0: fields.get("data0")?,
            data1: fields.get("data1")?,
            data2: fields.get("data2")?,
            data3: fields.get("data3")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("slot_number", self.slot_number)
            .with("k_number", self.k_number)
            .with("data0", self.data0)
            .with("data1", self.data1)
            .with("data2", self.data2)
            .with("data3", self.data3)
    }
}
