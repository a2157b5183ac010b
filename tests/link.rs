//! Link behaviour against an emulated receiver on an in-memory duplex stream

use navspark_core::{
    encode_frame, Acknowledgement, ConfigurePositionUpdateRate, FrameDecoder, Link, LinkConfig, LinkError,
    MeasurementTime, Message, PersistSetting, QueryPositionUpdateRate, Registry, UpdateRate,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio_test::{assert_pending, assert_ready_ok};

const ACK: [u8; 8] = [0xA0, 0xA1, 0x00, 0x01, 0x83, 0x83, 0x0D, 0x0A];

fn measurement_time() -> Message {
    MeasurementTime {
        iod: 0x3D,
        receiver_wn: 0x06ED,
        receiver_tow: 0x0B0C_BC40,
        measurement_period: 0x03E8,
    }
    .into()
}

fn report_frame(message: &Message) -> Vec<u8> {
    let payload = Registry::global().unwrap().encode_inbound(message).unwrap();
    encode_frame(&payload).unwrap().to_vec()
}

/// Read from the receiver side until one complete command frame arrived
async fn read_command(receiver: &mut DuplexStream) -> Vec<u8> {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 64];
    loop {
        let n = receiver.read(&mut buf).await.unwrap();
        assert!(n > 0, "link closed before a command arrived");
        if let Some(frame) = decoder.push(&buf[..n]).into_iter().next() {
            return frame.payload().to_vec();
        }
    }
}

#[tokio::test]
async fn test_messages_are_delivered() {
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, mut messages) = Link::spawn(host, &LinkConfig::default()).unwrap();

    let mut bytes = vec![0x00, 0x55];
    bytes.extend_from_slice(&report_frame(&measurement_time()));
    bytes.extend_from_slice(&ACK);
    bytes.extend_from_slice(&report_frame(&measurement_time()));
    receiver.write_all(&bytes).await.unwrap();

    assert_eq!(messages.recv().await.unwrap(), measurement_time());
    assert_eq!(messages.recv().await.unwrap(), measurement_time());
    assert_eq!(link.stats().delivered, 2);
    assert_eq!(link.stats().acks, 1);
}

#[tokio::test]
async fn test_command_waits_for_ack() {
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, _messages) = Link::spawn(host, &LinkConfig::default()).unwrap();

    let command: Message = ConfigurePositionUpdateRate {
        update_rate: UpdateRate::Hz10,
        persist: PersistSetting::SramAndFlash,
    }
    .into();
    let mut pending = tokio_test::task::spawn(link.send_command(&command));
    assert_pending!(pending.poll());

    assert_eq!(read_command(&mut receiver).await, vec![0x0E, 10, 1]);
    assert_pending!(pending.poll());

    receiver.write_all(&encode_frame(&[0x83, 0x0E]).unwrap()).await.unwrap();
    for _ in 0..100 {
        if pending.is_woken() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let ack = assert_ready_ok!(pending.poll());
    assert_eq!(ack, Acknowledgement::Ack(Some(0x0E)));
}

#[tokio::test]
async fn test_nack_is_returned() {
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, _messages) = Link::spawn(host, &LinkConfig::default()).unwrap();

    let emulator = tokio::spawn(async move {
        let command = read_command(&mut receiver).await;
        receiver.write_all(&encode_frame(&[0x84, command[0]]).unwrap()).await.unwrap();
        receiver
    });

    let ack = link.send_command(&QueryPositionUpdateRate.into()).await.unwrap();
    assert_eq!(ack, Acknowledgement::Nack(Some(0x10)));
    assert!(!ack.is_ack());
    emulator.await.unwrap();
}

#[tokio::test]
async fn test_stale_ack_does_not_release_next_command() {
    let config = LinkConfig::default().with_ack_timeout(Duration::from_millis(100));
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, mut messages) = Link::spawn(host, &config).unwrap();

    // An ACK with nobody waiting, then a report so we know it was processed
    receiver.write_all(&ACK).await.unwrap();
    receiver.write_all(&report_frame(&measurement_time())).await.unwrap();
    messages.recv().await.unwrap();

    let result = link.send_command(&QueryPositionUpdateRate.into()).await;
    assert!(matches!(result, Err(LinkError::AckTimeout(_))));
}

#[tokio::test]
async fn test_ack_timeout() {
    let config = LinkConfig::default().with_ack_timeout(Duration::from_millis(50));
    let (host, _receiver) = tokio::io::duplex(1024);
    let (link, _messages) = Link::spawn(host, &config).unwrap();

    let result = link.send_command(&QueryPositionUpdateRate.into()).await;
    assert!(matches!(result, Err(LinkError::AckTimeout(d)) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn test_encode_failure_sends_nothing() {
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, _messages) = Link::spawn(host, &LinkConfig::default()).unwrap();

    let result = link.send_command(&measurement_time()).await;
    assert!(matches!(result, Err(LinkError::Codec(_))));

    let mut buf = [0u8; 8];
    let read = tokio::time::timeout(Duration::from_millis(50), receiver.read(&mut buf)).await;
    assert!(read.is_err(), "nothing should have been written");
}

#[tokio::test]
async fn test_closed_stream_ends_link() {
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, mut messages) = Link::spawn(host, &LinkConfig::default()).unwrap();
    let link = std::sync::Arc::new(link);

    let waiting = {
        let link = std::sync::Arc::clone(&link);
        tokio::spawn(async move { link.send_command(&QueryPositionUpdateRate.into()).await })
    };

    read_command(&mut receiver).await;
    drop(receiver);

    assert!(matches!(waiting.await.unwrap(), Err(LinkError::Closed)));
    assert!(messages.recv().await.is_none());
    assert!(link.is_closed());
}

#[tokio::test]
async fn test_pause_and_resume_reading() {
    let (host, mut receiver) = tokio::io::duplex(1024);
    let (link, mut messages) = Link::spawn(host, &LinkConfig::default()).unwrap();

    link.pause_reading();
    assert!(link.is_paused());
    receiver.write_all(&report_frame(&measurement_time())).await.unwrap();

    let early = tokio::time::timeout(Duration::from_millis(50), messages.recv()).await;
    assert!(early.is_err(), "no message while paused");
    assert_eq!(link.stats().frames, 0);

    link.resume_reading();
    assert_eq!(messages.recv().await.unwrap(), measurement_time());
}
