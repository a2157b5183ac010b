//! Receiver-to-host reports

use super::catalog;
use super::enums::{GnssType, NavigationState};
use super::flags::{
    ChannelStatusFlags, ExtendedChannelFlags, MeasurementIndicatorFlags, RawMeasurementFlags, SvStatusFlags,
};
use super::{WireMessage, WireRecord};
use crate::core::codec::{CodecError, FieldSet, MessageDescriptor};
use serde::Serialize;

fn records<T: WireRecord>(fields: &FieldSet) -> Result<Vec<T>, CodecError> {
    fields.items().iter().map(T::from_fields).collect()
}

fn with_records<T: WireRecord>(fields: FieldSet, records: &[T]) -> FieldSet {
    fields
        .with("count", records.len() as u64)
        .with_items(records.iter().map(T::to_fields).collect())
}

/// Firmware version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReceiverSoftwareVersion {
    /// 1 = system code
    pub software_type: u8,
    /// Kernel version, `0x00XXYYZZ` for X.Y.Z
    pub kernel_version: u32,
    /// ODM version, `0x00XXYYZZ` for X.Y.Z
    pub odm_version: u32,
    /// Revision, `0x00YYMMDD`
    pub revision: u32,
}

impl ReceiverSoftwareVersion {
    /// Render a `0x00XXYYZZ` version word as `X.Y.Z`
    pub fn dotted(word: u32) -> String {
        let [_, x, y, z] = word.to_be_bytes();
        format!("{}.{}.{}", x, y, z)
    }
}

impl WireMessage for ReceiverSoftwareVersion {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::RECEIVER_SOFTWARE_VERSION;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            software_type: fields.get("software_type")?,
            kernel_version: fields.get("kernel_version")?,
            odm_version: fields.get("odm_version")?,
            revision: fields.get("revision")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("software_type", self.software_type)
            .with("kernel_version", self.kernel_version)
            .with("odm_version", self.odm_version)
            .with("revision", self.revision)
    }
}

/// Firmware CRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReceiverSoftwareCrc {
    /// 1 = system code
    pub software_type: u8,
    /// CRC
    pub crc: u16,
}

impl WireMessage for ReceiverSoftwareCrc {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::RECEIVER_SOFTWARE_CRC;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            software_type: fields.get("software_type")?,
            crc: fields.get("crc")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("software_type", self.software_type)
            .with("crc", self.crc)
    }
}

/// Epoch of the measurement messages that share its `iod`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeasurementTime {
    /// Issue of data
    pub iod: u8,
    /// GPS week number
    pub receiver_wn: u16,
    /// Time of week in milliseconds
    pub receiver_tow: u32,
    /// Measurement period in milliseconds
    pub measurement_period: u16,
}

impl WireMessage for MeasurementTime {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::MEASUREMENT_TIME;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            iod: fields.get("iod")?,
            receiver_wn: fields.get("receiver_wn")?,
            receiver_tow: fields.get("receiver_tow")?,
            measurement_period: fields.get("measurement_period")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("iod", self.iod)
            .with("receiver_wn", self.receiver_wn)
            .with("receiver_tow", self.receiver_tow)
            .with("measurement_period", self.measurement_period)
    }
}

/// One satellite of a RawMeasurements message
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawMeasurement {
    /// Satellite PRN
    pub svid: u8,
    /// Carrier to noise density, dBHz
    pub cn0: u8,
    /// Pseudorange in metres
    pub pseudo_range: f64,
    /// Accumulated carrier phase in cycles
    pub accumulated_carrier_cycle: f64,
    /// Doppler in Hz
    pub doppler_frequency: f32,
    /// Availability of the values above
    pub indicator: RawMeasurementFlags,
}

impl WireRecord for RawMeasurement {
    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            svid: fields.get("svid")?,
            cn0: fields.get("cn0")?,
            pseudo_range: fields.get("pseudo_range")?,
            accumulated_carrier_cycle: fields.get("accumulated_carrier_cycle")?,
            doppler_frequency: fields.get("doppler_frequency")?,
            indicator: fields.flags("indicator")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("svid", self.svid)
            .with("cn0", self.cn0)
            .with("pseudo_range", self.pseudo_range)
            .with("accumulated_carrier_cycle", self.accumulated_carrier_cycle)
            .with("doppler_frequency", self.doppler_frequency)
            .with_flags("indicator", self.indicator)
    }
}

/// Raw measurements of every tracked satellite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawMeasurements {
    /// Issue of data
    pub iod: u8,
    /// One record per satellite
    pub measurements: Vec<RawMeasurement>,
}

impl WireMessage for RawMeasurements {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::RAW_MEASUREMENTS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            iod: fields.get("iod")?,
            measurements: records(fields)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        with_records(FieldSet::new().with("iod", self.iod), &self.measurements)
    }
}

/// One channel of a SvChannelStatuses message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SvChannelStatus {
    /// Receiver channel
    pub channel_id: u8,
    /// Satellite PRN
    pub svid: u8,
    /// Data received for the satellite
    pub sv_status: SvStatusFlags,
    /// User range accuracy index
    pub ura: u8,
    /// Carrier to noise density, dBHz
    pub cn0: i8,
    /// Elevation in degrees
    pub elevation: i16,
    /// Azimuth in degrees
    pub azimuth: i16,
    /// Tracking progress
    pub channel_status: ChannelStatusFlags,
}

impl WireRecord for SvChannelStatus {
    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            channel_id: fields.get("channel_id")?,
            svid: fields.get("svid")?,
            sv_status: fields.flags("sv_status")?,
            ura: fields.get("ura")?,
            cn0: fields.get("cn0")?,
            elevation: fields.get("elevation")?,
            azimuth: fields.get("azimuth")?,
            channel_status: fields.flags("channel_status")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("channel_id", self.channel_id)
            .with("svid", self.svid)
            .with_flags("sv_status", self.sv_status)
            .with("ura", self.ura)
            .with("cn0", self.cn0)
            .with("elevation", self.elevation)
            .with("azimuth", self.azimuth)
            .with_flags("channel_status", self.channel_status)
    }
}

/// Tracking state of every receiver channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SvChannelStatuses {
    /// Issue of data
    pub iod: u8,
    /// One record per channel
    pub channels: Vec<SvChannelStatus>,
}

impl WireMessage for SvChannelStatuses {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::SV_CHANNEL_STATUSES;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            iod: fields.get("iod")?,
            channels: records(fields)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        with_records(FieldSet::new().with("iod", self.iod), &self.channels)
    }
}

/// Navigation solution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReceiverNavigationStatus {
    /// Issue of data
    pub iod: u8,
    /// Fix state
    pub navigation_state: NavigationState,
    /// GPS week number
    pub week_number: u16,
    /// Time of week in seconds
    pub time_of_week: f64,
    /// ECEF X in metres
    pub ecef_x: f64,
    /// ECEF Y in metres
    pub ecef_y: f64,
    /// ECEF Z in metres
    pub ecef_z: f64,
    /// ECEF X velocity in m/s
    pub ecef_vx: f32,
    /// ECEF Y velocity in m/s
    pub ecef_vy: f32,
    /// ECEF Z velocity in m/s
    pub ecef_vz: f32,
    /// Clock bias in metres
    pub clock_bias: f64,
    /// Clock drift in m/s
    pub clock_drift: f32,
    /// Geometric DOP
    pub gdop: f32,
    /// Position DOP
    pub pdop: f32,
    /// Horizontal DOP
    pub hdop: f32,
    /// Vertical DOP
    pub vdop: f32,
    /// Time DOP
    pub tdop: f32,
}

impl WireMessage for ReceiverNavigationStatus {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::RECEIVER_NAVIGATION_STATUS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            iod: fields.get("iod")?,
            navigation_state: fields.enumeration("navigation_state")?,
            week_number: fields.get("week_number")?,
            time_of_week: fields.get("time_of_week")?,
            ecef_x: fields.get("ecef_x")?,
            ecef_y: fields.get("ecef_y")?,
            ecef_z: fields.get("ecef_z")?,
            ecef_vx: fields.get("ecef_vx")?,
            ecef_vy: fields.get("ecef_vy")?,
            ecef_vz: fields.get("ecef_vz")?,
            clock_bias: fields.get("clock_bias")?,
            clock_drift: fields.get("clock_drift")?,
            gdop: fields.get("gdop")?,
            pdop: fields.get("pdop")?,
            hdop: fields.get("hdop")?,
            vdop: fields.get("vdop")?,
            tdop: fields.get("tdop")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("iod", self.iod)
            .with_enum("navigation_state", self.navigation_state)
            .with("week_number", self.week_number)
            .with("time_of_week", self.time_of_week)
            .with("ecef_x", self.ecef_x)
            .with("ecef_y", self.ecef_y)
            .with("ecef_z", self.ecef_z)
            .with("ecef_vx", self.ecef_vx)
            .with("ecef_vy", self.ecef_vy)
            .with("ecef_vz", self.ecef_vz)
            .with("clock_bias", self.clock_bias)
            .with("clock_drift", self.clock_drift)
            .with("gdop", self.gdop)
            .with("pdop", self.pdop)
            .with("hdop", self.hdop)
            .with("vdop", self.vdop)
            .with("tdop", self.tdop)
    }
}

/// Navigation data pages: satellite, page number and the raw words
macro_rules! subframe {
    ($(#[$meta:meta])* $name:ident, $page:ident, $len:literal => $descriptor:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $name {
            /// Satellite id
            pub svid: u8,
            /// Page number
            pub $page: u8,
            /// Raw navigation words
            pub words: [u8; $len],
        }

        impl WireMessage for $name {
            const DESCRIPTOR: &'static MessageDescriptor = &catalog::$descriptor;

            fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
                Ok(Self {
                    svid: fields.get("svid")?,
                    $page: fields.get(stringify!($page))?,
                    words: fields.get("words")?,
                })
            }

            fn to_fields(&self) -> FieldSet {
                FieldSet::new()
                    .with("svid", self.svid)
                    .with(stringify!($page), self.$page)
                    .with("words", self.words)
            }
        }
    };
}

subframe!(
    /// GPS navigation subframe
    GpsSubframe, sfid, 30 => GPS_SUBFRAME
);
subframe!(
    /// GLONASS navigation string
    GlonassString, string_number, 9 => GLONASS_STRING
);
subframe!(
    /// BeiDou D1 navigation subframe
    BeidouD1Subframe, sfid, 28 => BEIDOU_D1_SUBFRAME
);
subframe!(
    /// BeiDou D2 navigation subframe
    BeidouD2Subframe, sfid, 28 => BEIDOU_D2_SUBFRAME
);

/// One signal of an ExtendedRawMeasurements message
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtendedRawMeasurement {
    /// Signal type within the constellation (4 bits)
    pub signal_type: u8,
    /// Constellation
    pub gnss_type: GnssType,
    /// Satellite id
    pub svid: u8,
    /// GLONASS frequency id (4 bits)
    pub frequency_id: u8,
    /// Lock time indicator (4 bits)
    pub lock_time_indicator: u8,
    /// Carrier to noise density, dBHz
    pub cn0: u8,
    /// Pseudorange in metres
    pub pseudorange: f64,
    /// Accumulated carrier phase in cycles
    pub accumulated_carrier_cycle: f64,
    /// Doppler in Hz
    pub doppler_frequency: f32,
    /// Pseudorange standard deviation index
    pub pseudorange_std_dev: u8,
    /// Carrier phase standard deviation index
    pub carrier_std_dev: u8,
    /// Doppler standard deviation index
    pub doppler_std_dev: u8,
    /// Availability of the values above
    pub channel_indicator: ExtendedChannelFlags,
    /// Reserved
    pub reserved: [u8; 2],
}

impl WireRecord for ExtendedRawMeasurement {
    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            signal_type: fields.get("signal_type")?,
            gnss_type: fields.enumeration("gnss_type")?,
            svid: fields.get("svid")?,
            frequency_id: fields.get("frequency_id")?,
            lock_time_indicator: fields.get("lock_time_indicator")?,
            cn0: fields.get("cn0")?,
            pseudorange: fields.get("pseudorange")?,
            accumulated_carrier_cycle: fields.get("accumulated_carrier_cycle")?,
            doppler_frequency: fields.get("doppler_frequency")?,
            pseudorange_std_dev: fields.get("pseudorange_std_dev")?,
            carrier_std_dev: fields.get("carrier_std_dev")?,
            doppler_std_dev: fields.get("doppler_std_dev")?,
            channel_indicator: fields.flags("channel_indicator")?,
            reserved: fields.get("reserved")?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        FieldSet::new()
            .with("signal_type", self.signal_type)
            .with_enum("gnss_type", self.gnss_type)
            .with("svid", self.svid)
            .with("frequency_id", self.frequency_id)
            .with("lock_time_indicator", self.lock_time_indicator)
            .with("cn0", self.cn0)
            .with("pseudorange", self.pseudorange)
            .with("accumulated_carrier_cycle", self.accumulated_carrier_cycle)
            .with("doppler_frequency", self.doppler_frequency)
            .with("pseudorange_std_dev", self.pseudorange_std_dev)
            .with("carrier_std_dev", self.carrier_std_dev)
            .with("doppler_std_dev", self.doppler_std_dev)
            .with_flags("channel_indicator", self.channel_indicator)
            .with("reserved", self.reserved)
    }
}

/// Multi-constellation raw measurements of one epoch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedRawMeasurements {
    /// Message version
    pub version: u8,
    /// Issue of data
    pub iod: u8,
    /// GPS week number
    pub receiver_wn: u16,
    /// Time of week in milliseconds
    pub tow: u32,
    /// Measurement period in milliseconds
    pub measurement_period: u16,
    /// Epoch indicator
    pub indicator: MeasurementIndicatorFlags,
    /// Reserved
    pub reserved: [u8; 1],
    /// One record per tracked signal
    pub measurements: Vec<ExtendedRawMeasurement>,
}

impl WireMessage for ExtendedRawMeasurements {
    const DESCRIPTOR: &'static MessageDescriptor = &catalog::EXTENDED_RAW_MEASUREMENTS;

    fn from_fields(fields: &FieldSet) -> Result<Self, CodecError> {
        Ok(Self {
            version: fields.get("version")?,
            iod: fields.get("iod")?,
            receiver_wn: fields.get("receiver_wn")?,
            tow: fields.get("tow")?,
            measurement_period: fields.get("measurement_period")?,
            indicator: fields.flags("indicator")?,
            reserved: fields.get("reserved")?,
            measurements: records(fields)?,
        })
    }

    fn to_fields(&self) -> FieldSet {
        let header = FieldSet::new()
            .with("version", self.version)
            .with("iod", self.iod)
            .with("receiver_wn", self.receiver_wn)
            .with("tow", self.tow)
            .with("measurement_period", self.measurement_period)
            .with_flags("indicator", self.indicator)
            .with("reserved", self.reserved);
        with_records(header, &self.measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_version() {
        assert_eq!(ReceiverSoftwareVersion::dotted(0x0001_0203), "1.2.3");
    }

    #[test]
    fn test_records_round_trip_through_fields() {
        let message = SvChannelStatuses {
            iod: 7,
            channels: vec![SvChannelStatus {
                channel_id: 1,
                svid: 9,
                sv_status: SvStatusFlags::ALMANAC | SvStatusFlags::HEALTHY,
                ura: 0,
                cn0: 41,
                elevation: -3,
                azimuth: 300,
                channel_status: ChannelStatusFlags::new(0x1F),
            }],
        };
        let fields = message.to_fields();
        assert_eq!(fields.get::<u8>("count").unwrap(), 1);
        assert_eq!(SvChannelStatuses::from_fields(&fields).unwrap(), message);
    }
}
