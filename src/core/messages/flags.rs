//! Bit-flag sets carried in message fields
//!
//! Flag fields are open: undefined bits are kept, never rejected.

use crate::core::codec::WireFlags;
use serde::Serialize;
use std::fmt;
use std::ops::BitOr;

macro_rules! wire_flags {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $($(#[$flag_meta:meta])* $flag:ident = $bit:expr, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            $($(#[$flag_meta])* pub const $flag: Self = Self($bit);)+

            const NAMED: &'static [(Self, &'static str)] = &[$((Self::$flag, $label)),+];

            /// Wrap a raw bit pattern
            pub const fn new(bits: $repr) -> Self {
                Self(bits)
            }

            /// No flags set
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Raw bit pattern
            pub const fn raw(self) -> $repr {
                self.0
            }

            /// Whether every bit of `other` is set
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Bits with no name
            pub const fn unknown(self) -> $repr {
                let mut known = 0;
                $(known |= $bit;)+
                self.0 & !known
            }

            /// Names of the set flags
            pub fn names(self) -> impl Iterator<Item = &'static str> {
                Self::NAMED
                    .iter()
                    .filter(move |(flag, _)| self.contains(*flag))
                    .map(|(_, label)| *label)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let names: Vec<_> = self.names().collect();
                if names.is_empty() {
                    write!(f, "-")?;
                } else {
                    write!(f, "{}", names.join("|"))?;
                }
                if self.unknown() != 0 {
                    write!(f, " (+0x{:X})", self.unknown())?;
                }
                Ok(())
            }
        }

        impl WireFlags for $name {
            fn from_bits(bits: u64) -> Self {
                Self(bits as $repr)
            }

            fn bits(self) -> u64 {
                u64::from(self.0)
            }
        }
    };
}

wire_flags! {
    /// Constellations whose navigation subframes are output
    SubframeFlags(u8) {
        /// GPS subframes
        GPS = 0b0001, "gps";
        /// GLONASS strings
        GLONASS = 0b0010, "glonass";
        /// Galileo pages
        GALILEO = 0b0100, "galileo";
        /// BeiDou subframes
        BEIDOU = 0b1000, "beidou";
    }
}

wire_flags! {
    /// Availability indicator of a raw measurement
    RawMeasurementFlags(u8) {
        /// Pseudorange valid
        PSEUDO_RANGE = 0b0_0001, "pseudo_range";
        /// Doppler valid
        DOPPLER = 0b0_0010, "doppler";
        /// Carrier phase valid
        CARRIER_PHASE = 0b0_0100, "carrier_phase";
        /// Cycle slip possible
        CYCLE_SLIP = 0b0_1000, "cycle_slip";
        /// Coherent integration time over 10 ms
        COHERENT_INTEGRATION = 0b1_0000, "coherent_integration";
    }
}

wire_flags! {
    /// Per-satellite data status
    SvStatusFlags(u8) {
        /// Almanac received
        ALMANAC = 0b001, "almanac";
        /// Ephemeris received
        EPHEMERIS = 0b010, "ephemeris";
        /// Satellite healthy
        HEALTHY = 0b100, "healthy";
    }
}

wire_flags! {
    /// Tracking progress of a receiver channel
    ChannelStatusFlags(u8) {
        /// Pull-in done
        PULL_IN = 0b00_0001, "pull_in";
        /// Bit synchronised
        BIT_SYNC = 0b00_0010, "bit_sync";
        /// Frame synchronised
        FRAME_SYNC = 0b00_0100, "frame_sync";
        /// Ephemeris received
        EPHEMERIS = 0b00_1000, "ephemeris";
        /// Used in normal fix
        NORMAL_FIX = 0b01_0000, "normal_fix";
        /// Used in differential fix
        DIFFERENTIAL_FIX = 0b10_0000, "differential_fix";
    }
}

wire_flags! {
    /// Channel indicator of an extended raw measurement
    ExtendedChannelFlags(u16) {
        /// Pseudorange valid
        PSEUDORANGE = 0b00_0001, "pseudorange";
        /// Doppler valid
        DOPPLER = 0b00_0010, "doppler";
        /// Carrier phase valid
        CARRIER_PHASE = 0b00_0100, "carrier_phase";
        /// Cycle slip possible
        CYCLE_SLIP = 0b00_1000, "cycle_slip";
        /// Coherent integration time over 10 ms
        COHERENT_INTEGRATION = 0b01_0000, "coherent_integration";
        /// Half-cycle ambiguity unresolved
        HALF_CYCLE_UNKNOWN = 0b10_0000, "half_cycle_unknown";
    }
}

wire_flags! {
    /// Epoch indicator of an extended raw measurement message
    MeasurementIndicatorFlags(u8) {
        /// Epoch triggered by geotagging
        GEOTAGGING = 0b001, "geotagging";
        /// Receiver clock stepped forward
        RECEIVER_INCREMENT = 0b010, "receiver_increment";
        /// Receiver clock stepped back
        RECEIVER_DECREMENT = 0b100, "receiver_decrement";
    }
}
