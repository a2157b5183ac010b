//! Closed enumerations carried in message fields
//!
//! A raw value outside an enumeration fails the decode of the whole message.

use crate::core::codec::WireEnum;
use serde::Serialize;

macro_rules! wire_enum {
    ($ty:ident) => {
        impl WireEnum for $ty {
            const NAME: &'static str = stringify!($ty);

            fn from_raw(raw: u64) -> Option<Self> {
                u8::try_from(raw).ok().and_then(Self::from_u8)
            }

            fn raw(self) -> u64 {
                u64::from(self as u8)
            }
        }
    };
}

/// Output format selected by ConfigureMessageType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum MessageType {
    /// No periodic output
    NoOutput = 0,
    /// NMEA sentences
    Nmea = 1,
    /// Binary messages
    Binary = 2,
}

impl MessageType {
    /// Get message type from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MessageType::NoOutput),
            1 => Some(MessageType::Nmea),
            2 => Some(MessageType::Binary),
            _ => None,
        }
    }
}

wire_enum!(MessageType);

/// Where a configuration change is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[repr(u8)]
pub enum PersistSetting {
    /// Until the next power cycle
    #[default]
    Sram = 0,
    /// SRAM and flash
    SramAndFlash = 1,
}

impl PersistSetting {
    /// Get persist setting from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PersistSetting::Sram),
            1 => Some(PersistSetting::SramAndFlash),
            _ => None,
        }
    }
}

wire_enum!(PersistSetting);

/// On/off switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[repr(u8)]
pub enum EnableSetting {
    /// Off
    #[default]
    Disable = 0,
    /// On
    Enable = 1,
}

impl EnableSetting {
    /// Get setting from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EnableSetting::Disable),
            1 => Some(EnableSetting::Enable),
            _ => None,
        }
    }

    /// Whether the setting is on
    pub fn is_enabled(self) -> bool {
        self == EnableSetting::Enable
    }
}

impl From<bool> for EnableSetting {
    fn from(enabled: bool) -> Self {
        if enabled {
            EnableSetting::Enable
        } else {
            EnableSetting::Disable
        }
    }
}

wire_enum!(EnableSetting);

/// Position update rate; the raw value is the rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum UpdateRate {
    /// 1 Hz
    Hz1 = 1,
    /// 2 Hz
    Hz2 = 2,
    /// 4 Hz
    Hz4 = 4,
    /// 5 Hz
    Hz5 = 5,
    /// 8 Hz
    Hz8 = 8,
    /// 10 Hz
    Hz10 = 10,
    /// 20 Hz
    Hz20 = 20,
    /// 25 Hz
    Hz25 = 25,
    /// 40 Hz
    Hz40 = 40,
    /// 50 Hz
    Hz50 = 50,
}

impl UpdateRate {
    /// Get update rate from its value in Hz
    pub fn from_u8(hz: u8) -> Option<Self> {
        match hz {
            1 => Some(UpdateRate::Hz1),
            2 => Some(UpdateRate::Hz2),
            4 => Some(UpdateRate::Hz4),
            5 => Some(UpdateRate::Hz5),
            8 => Some(UpdateRate::Hz8),
            10 => Some(UpdateRate::Hz10),
            20 => Some(UpdateRate::Hz20),
            25 => Some(UpdateRate::Hz25),
            40 => Some(UpdateRate::Hz40),
            50 => Some(UpdateRate::Hz50),
            _ => None,
        }
    }

    /// Rate in Hz
    pub fn hz(self) -> u8 {
        self as u8
    }
}

wire_enum!(UpdateRate);

/// Output rate of binary measurement and RTCM data
///
/// Raw values are an index, not the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum BinaryUpdateRate {
    /// 1 Hz
    Hz1 = 0,
    /// 2 Hz
    Hz2 = 1,
    /// 4 Hz
    Hz4 = 2,
    /// 5 Hz
    Hz5 = 3,
    /// 10 Hz
    Hz10 = 4,
    /// 20 Hz
    Hz20 = 5,
    /// 8 Hz
    Hz8 = 6,
}

impl BinaryUpdateRate {
    /// Get rate from its wire index
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BinaryUpdateRate::Hz1),
            1 => Some(BinaryUpdateRate::Hz2),
            2 => Some(BinaryUpdateRate::Hz4),
            3 => Some(BinaryUpdateRate::Hz5),
            4 => Some(BinaryUpdateRate::Hz10),
            5 => Some(BinaryUpdateRate::Hz20),
            6 => Some(BinaryUpdateRate::Hz8),
            _ => None,
        }
    }

    /// Rate in Hz
    pub fn hz(self) -> u8 {
        match self {
            BinaryUpdateRate::Hz1 => 1,
            BinaryUpdateRate::Hz2 => 2,
            BinaryUpdateRate::Hz4 => 4,
            BinaryUpdateRate::Hz5 => 5,
            BinaryUpdateRate::Hz8 => 8,
            BinaryUpdateRate::Hz10 => 10,
            BinaryUpdateRate::Hz20 => 20,
        }
    }
}

wire_enum!(BinaryUpdateRate);

/// Base station positioning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum BasePositionMode {
    /// Moving receiver
    Kinematic = 0,
    /// Self-survey, then static
    Survey = 1,
    /// Fixed, operator supplied position
    Static = 2,
}

impl BasePositionMode {
    /// Get mode from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(BasePositionMode::Kinematic),
            1 => Some(BasePositionMode::Survey),
            2 => Some(BasePositionMode::Static),
            _ => None,
        }
    }
}

wire_enum!(BasePositionMode);

/// Fix state reported in ReceiverNavigationStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum NavigationState {
    /// No fix
    NoFix = 0,
    /// Propagated from the last fix
    Prediction = 1,
    /// 2D fix
    Fix2D = 2,
    /// 3D fix
    Fix3D = 3,
    /// Differential fix
    Differential = 4,
}

impl NavigationState {
    /// Get state from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NavigationState::NoFix),
            1 => Some(NavigationState::Prediction),
            2 => Some(NavigationState::Fix2D),
            3 => Some(NavigationState::Fix3D),
            4 => Some(NavigationState::Differential),
            _ => None,
        }
    }

    /// Whether a position is available
    pub fn has_fix(self) -> bool {
        !matches!(self, NavigationState::NoFix)
    }
}

wire_enum!(NavigationState);

/// Satellite constellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum GnssType {
    /// GPS
    Gps = 0,
    /// SBAS
    Sbas = 1,
    /// GLONASS
    Glonass = 2,
    /// Galileo
    Galileo = 3,
    /// QZSS
    Qzss = 4,
    /// BeiDou
    Beidou = 5,
    /// IRNSS / NavIC
    Irnss = 6,
}

impl GnssType {
    /// Get constellation from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GnssType::Gps),
            1 => Some(GnssType::Sbas),
            2 => Some(GnssType::Glonass),
            3 => Some(GnssType::Galileo),
            4 => Some(GnssType::Qzss),
            5 => Some(GnssType::Beidou),
            6 => Some(GnssType::Irnss),
            _ => None,
        }
    }

    /// Get name of constellation
    pub fn name(&self) -> &'static str {
        match self {
            GnssType::Gps => "GPS",
            GnssType::Sbas => "SBAS",
            GnssType::Glonass => "GLONASS",
            GnssType::Galileo => "Galileo",
            GnssType::Qzss => "QZSS",
            GnssType::Beidou => "BeiDou",
            GnssType::Irnss => "IRNSS",
        }
    }
}

wire_enum!(GnssType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rate_is_hz() {
        assert_eq!(UpdateRate::from_raw(20), Some(UpdateRate::Hz20));
        assert_eq!(UpdateRate::Hz50.hz(), 50);
        assert_eq!(UpdateRate::from_u8(3), None);
    }

    #[test]
    fn test_binary_rate_is_index() {
        assert_eq!(BinaryUpdateRate::from_raw(6), Some(BinaryUpdateRate::Hz8));
        assert_eq!(BinaryUpdateRate::Hz8.hz(), 8);
        assert_eq!(BinaryUpdateRate::Hz10.raw(), 4);
        assert_eq!(BinaryUpdateRate::from_raw(7), None);
    }

    #[test]
    fn test_raw_outside_u8() {
        assert_eq!(GnssType::from_raw(0x100), None);
        assert_eq!(GnssType::from_raw(5), Some(GnssType::Beidou));
        assert_eq!(GnssType::Qzss.name(), "QZSS");
    }

    #[test]
    fn test_enable_setting() {
        assert!(EnableSetting::from(true).is_enabled());
        assert_eq!(EnableSetting::default(), EnableSetting::Disable);
        assert_eq!(PersistSetting::default().raw(), 0);
    }
}
