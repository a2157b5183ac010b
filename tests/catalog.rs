//! Decoding of captured receiver payloads
//!
//! Payloads are the message id plus body, as they sit between the length
//! field and the checksum of a frame.

use navspark_core::{
    ChannelStatusFlags, ExtendedChannelFlags, GnssType, Message, NavigationState, RawMeasurementFlags, Registry,
    SvStatusFlags,
};

const RAW_MEASUREMENTS: &str = concat!(
    "DD3D0F022B417442DB7655FA29C0E2E402215A00004420800007092941778CF0A9E70C43C0F972542EEB800044E3A000",
    "070A284175CA9691A9E92341047DB1E9A98000C531200007052B41749EBEEE178C6A40D371D480CF0000C3AE0000071A",
    "2E41750283E5ECD765C1046D73BDE6200045333000070C284177C1E01DA72EC140FF794CC9148000C50D800007112841",
    "77E7B0E8159AA8410C87990CFAA000C580D800070F274177939677032B0AC106BF2C49056000454FB00007042C4175BA",
    "4EB0682B4340FB25C7A3B6C000C4FE60000707264178487F72DFC581C0D089C8BF96000043A78000070D1D0000000000",
    "0000004105F9A2D60D4000C566000016082741786AD7A4712A50C0EF02442E09800044A2800007192341787EE48B0C9E",
    "2640E6AD042B858000C498200007421F417527EAE2167D104106D60A576B0000C553100007521E0000000000000000C0",
    "FE83495DA700004516C00006",
);

const SV_CHANNEL_STATUSES: &str = concat!(
    "DE3D10000207012B003E00101F0109070129001000721F020A070128002200271F030507002B003801381F041A07002E",
    "002E00BA1F050C070028000E00F81F0611070128000A009A1F070F070027000E00D11F08210700290042002E1F090407",
    "002C0026005B1F0C070700260009004D1F0D0D07001D000600241F0E08070027000A006B1F0F190700230006011B1F10",
    "4206051F002000151F115207051E0031014E1F",
);

const RECEIVER_NAVIGATION_STATUS: &str = concat!(
    "DF920306ED4107DBE7FD763B21C146C6042F62BFD84152F1B64B17F7CC41444679B87ADB123C8AAAD4BC1A6EF0BBC567",
    "D24116AD5E6D3F7C78428FD91E405D7C6B404B07FB3F7C51AD4040FBC23FB10630",
);

const GPS_SUBFRAME: &str = "E002058B0BB43F22B54F31CF4EFD81FD4D00A10C9879E70908D5C5F8ED03EBFFF4";
const GLONASS_STRING: &str = "E1520EB405A9C39417500482";
const BEIDOU_D1_SUBFRAME: &str = "E2CF01E240473758000DA0E100AC03878E315B53B412B2C0025B046007AB81";
const BEIDOU_D2_SUBFRAME: &str = "E3CB01E240473795A514C8CAEACFA500155555555555555555555555555555";

const EXTENDED_RAW_MEASUREMENTS: &str = concat!(
    "E5010D077C06AC408003E8000011000DE03241B333998962C9BA41B37F98FDADE00045794000000000400700000002E0",
    "3141B3223EEDEAFBD641B3B3B83AEBA00044F14000000000400700000006E03041B331EE4F2D2CD941B3E37747152000",
    "C3390000000000400700000004E03341B321A6729C9E8D41B3973F772B6000452EF000000000400700000005E03141B3",
    "2452846C890E41B3C4EF07A8E000447CC00000000040070000000CE02941B355D6AE0764C541B3F59AF1B5E000C47C00",
    "00000000C00700000014E02941B353251698940341B399D7199B600045406000000000800700000013E02C41B348024B",
    "63BFD041B415801AC76000C516D0000000004007000004C1E03041B43D6815865B8741B3D237DB1A2000443D00000000",
    "00400700000180C02D41B4266A74EBC09741B3CC0C4553A00044710000000000400700000181C02B41B419E0D3AB6BBA",
    "41B3CCACC2C42000446FC000000000400700000206E33141B315160223161C41B40A579761200044BAA0000000004007",
    "00000205E82D41B321D878415F3541B45E187C73A000C4E30000000000400700000214E92D41B30B5279C4940841B40F",
    "E810A16000449E4000000000400700000213EA2C41B33072528C680F41B4686E04CFE000C50F90000000004007000002",
    "15EB2F41B32A46FD31683941B3D08EE512E000458DA800000000400700000207EC2C41B345AB043961D641B3E5525810",
    "20004572B00000000080070000",
);

fn bytes(hex: &str) -> Vec<u8> {
    hex::decode(hex).unwrap()
}

fn f64_of(hex: &str) -> f64 {
    f64::from_be_bytes(bytes(hex).try_into().unwrap())
}

fn f32_of(hex: &str) -> f32 {
    f32::from_be_bytes(bytes(hex).try_into().unwrap())
}

fn decode(hex: &str) -> Message {
    Registry::global().unwrap().decode_payload(&bytes(hex)).unwrap()
}

/// The receiver side encoding of a decoded report reproduces the capture
fn assert_reencodes(hex: &str) {
    let registry = Registry::global().unwrap();
    let message = decode(hex);
    assert_eq!(registry.encode_inbound(&message).unwrap(), bytes(hex), "{}", message.name());
}

#[test]
fn test_raw_measurements() {
    let Message::RawMeasurements(message) = decode(RAW_MEASUREMENTS) else {
        panic!("wrong message type");
    };

    assert_eq!(message.iod, 0x3D);
    assert_eq!(message.measurements.len(), 0x0F);

    let first = &message.measurements[0];
    assert_eq!(first.svid, 0x02);
    assert_eq!(first.cn0, 0x2B);
    assert_eq!(first.pseudo_range, f64_of("417442DB7655FA29"));
    assert_eq!(first.accumulated_carrier_cycle, f64_of("C0E2E402215A0000"));
    assert_eq!(first.doppler_frequency, f32_of("44208000"));
    assert_eq!(first.indicator, RawMeasurementFlags::new(0x07));

    let untracked = &message.measurements[10];
    assert_eq!(untracked.svid, 0x0D);
    assert_eq!(untracked.pseudo_range, 0.0);
    assert_eq!(untracked.indicator, RawMeasurementFlags::new(0x16));
    assert!(!untracked.indicator.contains(RawMeasurementFlags::PSEUDO_RANGE));

    let last = &message.measurements[14];
    assert_eq!(last.svid, 0x52);
    assert_eq!(last.cn0, 0x1E);
    assert_eq!(last.accumulated_carrier_cycle, f64_of("C0FE83495DA70000"));
    assert_eq!(last.doppler_frequency, f32_of("4516C000"));
    assert_eq!(last.indicator, RawMeasurementFlags::new(0x06));

    let svids: Vec<u8> = message.measurements.iter().map(|m| m.svid).collect();
    assert_eq!(
        svids,
        vec![0x02, 0x09, 0x0A, 0x05, 0x1A, 0x0C, 0x11, 0x0F, 0x04, 0x07, 0x0D, 0x08, 0x19, 0x42, 0x52]
    );
}

#[test]
fn test_sv_channel_statuses() {
    let Message::SvChannelStatuses(message) = decode(SV_CHANNEL_STATUSES) else {
        panic!("wrong message type");
    };

    let expected: [(u8, u8, u8, u8, i8, i16, i16); 16] = [
        (0x00, 0x02, 0x07, 0x01, 0x2B, 0x003E, 0x0010),
        (0x01, 0x09, 0x07, 0x01, 0x29, 0x0010, 0x0072),
        (0x02, 0x0A, 0x07, 0x01, 0x28, 0x0022, 0x0027),
        (0x03, 0x05, 0x07, 0x00, 0x2B, 0x0038, 0x0138),
        (0x04, 0x1A, 0x07, 0x00, 0x2E, 0x002E, 0x00BA),
        (0x05, 0x0C, 0x07, 0x00, 0x28, 0x000E, 0x00F8),
        (0x06, 0x11, 0x07, 0x01, 0x28, 0x000A, 0x009A),
        (0x07, 0x0F, 0x07, 0x00, 0x27, 0x000E, 0x00D1),
        (0x08, 0x21, 0x07, 0x00, 0x29, 0x0042, 0x002E),
        (0x09, 0x04, 0x07, 0x00, 0x2C, 0x0026, 0x005B),
        (0x0C, 0x07, 0x07, 0x00, 0x26, 0x0009, 0x004D),
        (0x0D, 0x0D, 0x07, 0x00, 0x1D, 0x0006, 0x0024),
        (0x0E, 0x08, 0x07, 0x00, 0x27, 0x000A, 0x006B),
        (0x0F, 0x19, 0x07, 0x00, 0x23, 0x0006, 0x011B),
        (0x10, 0x42, 0x06, 0x05, 0x1F, 0x0020, 0x0015),
        (0x11, 0x52, 0x07, 0x05, 0x1E, 0x0031, 0x014E),
    ];

    assert_eq!(message.iod, 0x3D);
    assert_eq!(message.channels.len(), expected.len());
    for (channel, (channel_id, svid, sv_status, ura, cn0, elevation, azimuth)) in
        message.channels.iter().zip(expected)
    {
        assert_eq!(channel.channel_id, channel_id);
        assert_eq!(channel.svid, svid);
        assert_eq!(channel.sv_status, SvStatusFlags::new(sv_status));
        assert_eq!(channel.ura, ura);
        assert_eq!(channel.cn0, cn0);
        assert_eq!(channel.elevation, elevation);
        assert_eq!(channel.azimuth, azimuth);
        assert_eq!(channel.channel_status, ChannelStatusFlags::new(0x1F));
    }

    let glonass = &message.channels[14];
    assert!(glonass.sv_status.contains(SvStatusFlags::EPHEMERIS | SvStatusFlags::HEALTHY));
    assert!(!glonass.sv_status.contains(SvStatusFlags::ALMANAC));
}

#[test]
fn test_receiver_navigation_status() {
    let Message::ReceiverNavigationStatus(message) = decode(RECEIVER_NAVIGATION_STATUS) else {
        panic!("wrong message type");
    };

    assert_eq!(message.iod, 0x92);
    assert_eq!(message.navigation_state, NavigationState::Fix3D);
    assert!(message.navigation_state.has_fix());
    assert_eq!(message.week_number, 0x06ED);
    assert_eq!(message.time_of_week, f64_of("4107DBE7FD763B21"));
    assert_eq!(message.ecef_x, f64_of("C146C6042F62BFD8"));
    assert_eq!(message.ecef_y, f64_of("4152F1B64B17F7CC"));
    assert_eq!(message.ecef_z, f64_of("41444679B87ADB12"));
    assert_eq!(message.ecef_vx, f32_of("3C8AAAD4"));
    assert_eq!(message.ecef_vy, f32_of("BC1A6EF0"));
    assert_eq!(message.ecef_vz, f32_of("BBC567D2"));
    assert_eq!(message.clock_bias, f64_of("4116AD5E6D3F7C78"));
    assert_eq!(message.clock_drift, f32_of("428FD91E"));
    assert_eq!(message.gdop, f32_of("405D7C6B"));
    assert_eq!(message.pdop, f32_of("404B07FB"));
    assert_eq!(message.hdop, f32_of("3F7C51AD"));
    assert_eq!(message.vdop, f32_of("4040FBC2"));
    assert_eq!(message.tdop, f32_of("3FB10630"));
}

#[test]
fn test_navigation_subframes() {
    let Message::GpsSubframe(gps) = decode(GPS_SUBFRAME) else {
        panic!("wrong message type");
    };
    assert_eq!(gps.svid, 0x02);
    assert_eq!(gps.sfid, 0x05);
    assert_eq!(gps.words.to_vec(), bytes(&GPS_SUBFRAME[6..]));

    let Message::GlonassString(glonass) = decode(GLONASS_STRING) else {
        panic!("wrong message type");
    };
    assert_eq!(glonass.svid, 0x52);
    assert_eq!(glonass.string_number, 0x0E);
    assert_eq!(glonass.words, [0xB4, 0x05, 0xA9, 0xC3, 0x94, 0x17, 0x50, 0x04, 0x82]);

    let Message::BeidouD1Subframe(d1) = decode(BEIDOU_D1_SUBFRAME) else {
        panic!("wrong message type");
    };
    assert_eq!(d1.svid, 0xCF);
    assert_eq!(d1.sfid, 0x01);
    assert_eq!(d1.words.to_vec(), bytes(&BEIDOU_D1_SUBFRAME[6..]));

    let Message::BeidouD2Subframe(d2) = decode(BEIDOU_D2_SUBFRAME) else {
        panic!("wrong message type");
    };
    assert_eq!(d2.svid, 0xCB);
    assert_eq!(d2.sfid, 0x01);
    assert_eq!(d2.words[27], 0x55);
}

#[test]
fn test_extended_raw_measurements() {
    let Message::ExtendedRawMeasurements(message) = decode(EXTENDED_RAW_MEASUREMENTS) else {
        panic!("wrong message type");
    };

    assert_eq!(message.version, 0x01);
    assert_eq!(message.iod, 0x0D);
    assert_eq!(message.receiver_wn, 0x077C);
    assert_eq!(message.tow, 0x06AC_4080);
    assert_eq!(message.measurement_period, 0x03E8);
    assert_eq!(message.indicator.raw(), 0x00);
    assert_eq!(message.reserved, [0x00]);
    assert_eq!(message.measurements.len(), 0x11);

    let first = &message.measurements[0];
    assert_eq!(first.gnss_type, GnssType::Gps);
    assert_eq!(first.signal_type, 0);
    assert_eq!(first.svid, 0x0D);
    assert_eq!(first.frequency_id, 0x0E);
    assert_eq!(first.lock_time_indicator, 0);
    assert_eq!(first.cn0, 0x32);
    assert_eq!(first.pseudorange, f64_of("41B333998962C9BA"));
    assert_eq!(first.accumulated_carrier_cycle, f64_of("41B37F98FDADE000"));
    assert_eq!(first.doppler_frequency, f32_of("45794000"));
    assert_eq!(first.channel_indicator, ExtendedChannelFlags::new(0x4007));
    assert_eq!(first.reserved, [0, 0]);

    let qzss = &message.measurements[8];
    assert_eq!(qzss.gnss_type, GnssType::Qzss);
    assert_eq!(qzss.svid, 0xC1);

    let sbas = &message.measurements[9];
    assert_eq!(sbas.gnss_type, GnssType::Sbas);
    assert_eq!(sbas.svid, 0x80);
    assert_eq!(sbas.frequency_id, 0x0C);

    let glonass = &message.measurements[11];
    assert_eq!(glonass.gnss_type, GnssType::Glonass);
    assert_eq!(glonass.svid, 0x06);
    assert_eq!(glonass.lock_time_indicator, 0x3);
    assert_eq!(glonass.frequency_id, 0x0E);

    let last = &message.measurements[16];
    assert_eq!(last.gnss_type, GnssType::Glonass);
    assert_eq!(last.svid, 0x07);
    assert_eq!(last.lock_time_indicator, 0xC);
    assert_eq!(last.cn0, 0x2C);
    assert_eq!(last.doppler_frequency, f32_of("4572B000"));
    assert_eq!(last.channel_indicator, ExtendedChannelFlags::new(0x8007));
    assert!(last.channel_indicator.contains(ExtendedChannelFlags::CARRIER_PHASE));
}

#[test]
fn test_captures_reencode_exactly() {
    for capture in [
        "DC3D06ED0B0CBC4003E8",
        RAW_MEASUREMENTS,
        SV_CHANNEL_STATUSES,
        RECEIVER_NAVIGATION_STATUS,
        GPS_SUBFRAME,
        GLONASS_STRING,
        BEIDOU_D1_SUBFRAME,
        BEIDOU_D2_SUBFRAME,
        EXTENDED_RAW_MEASUREMENTS,
    ] {
        assert_reencodes(capture);
    }
}

#[test]
fn test_array_count_must_match_records() {
    let registry = Registry::global().unwrap();
    let mut payload = bytes(SV_CHANNEL_STATUSES);
    payload[2] = 0x0F;
    assert!(registry.decode_payload(&payload).is_err());

    // One record short of the declared count
    let payload = bytes(SV_CHANNEL_STATUSES);
    assert!(registry.decode_payload(&payload[..payload.len() - 10]).is_err());

    // Half a record left over
    assert!(registry.decode_payload(&payload[..payload.len() - 5]).is_err());
}

#[test]
fn test_truncated_report_is_an_error() {
    let registry = Registry::global().unwrap();
    let payload = bytes(RECEIVER_NAVIGATION_STATUS);
    assert!(registry.decode_payload(&payload[..40]).is_err());
}

#[test]
fn test_unknown_enum_value_is_an_error() {
    let registry = Registry::global().unwrap();
    let mut payload = bytes(RECEIVER_NAVIGATION_STATUS);
    payload[2] = 0x09;
    assert!(registry.decode_payload(&payload).is_err());
}
