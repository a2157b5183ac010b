//! Type id to codec table
//!
//! Built once from the catalog, validated eagerly, immutable afterwards. A
//! catalog error (bad width, length mismatch, id clash) is fatal: no
//! registry is produced.

use crate::core::codec::{CodecError, Direction, FieldSet, Layout, LayoutError, MessageDescriptor};
use crate::core::messages::{CatalogEntry, Message, CATALOG};
use crate::core::protocol::{ACK_ID, NACK_ID};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

static GLOBAL: OnceCell<Registry> = OnceCell::new();

struct InboundCodec {
    layout: Layout,
    build: fn(&FieldSet) -> Result<Message, CodecError>,
}

/// Immutable message codec table
pub struct Registry {
    descriptors: Vec<&'static MessageDescriptor>,
    inbound: HashMap<u8, InboundCodec>,
    inbound_by_name: HashMap<&'static str, u8>,
    outbound: HashMap<&'static str, Layout>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("messages", &self.descriptors.len())
            .field("inbound", &self.inbound.len())
            .field("outbound", &self.outbound.len())
            .finish()
    }
}

impl Registry {
    /// Compile and validate every entry
    pub fn new(entries: &[CatalogEntry]) -> Result<Self, LayoutError> {
        let mut registry = Self {
            descriptors: Vec::with_capacity(entries.len()),
            inbound: HashMap::new(),
            inbound_by_name: HashMap::new(),
            outbound: HashMap::new(),
        };

        // Acknowledgements are handled by the reassembler itself
        let mut inbound_owner: HashMap<u8, &'static str> = HashMap::from([(ACK_ID, "Ack"), (NACK_ID, "Nack")]);
        let mut outbound_owner: HashMap<u8, &'static str> = HashMap::new();

        for entry in entries {
            let descriptor = entry.descriptor;

            if let Some(id) = descriptor.outbound_id {
                claim(&mut outbound_owner, id, Direction::Outbound, descriptor.name)?;
                let layout = Layout::compile(descriptor, Direction::Outbound)?;
                registry.outbound.insert(descriptor.name, layout);
            }

            if let Some(id) = descriptor.inbound_id {
                claim(&mut inbound_owner, id, Direction::Inbound, descriptor.name)?;
                let layout = Layout::compile(descriptor, Direction::Inbound)?;
                registry.inbound.insert(
                    id,
                    InboundCodec {
                        layout,
                        build: entry.decode,
                    },
                );
                registry.inbound_by_name.insert(descriptor.name, id);
            }

            registry.descriptors.push(descriptor);
        }

        tracing::debug!(
            messages = registry.descriptors.len(),
            inbound = registry.inbound.len(),
            outbound = registry.outbound.len(),
            "Message registry built"
        );
        Ok(registry)
    }

    /// The process-wide registry over the built-in catalog
    pub fn global() -> Result<&'static Registry, LayoutError> {
        GLOBAL.get_or_try_init(|| Registry::new(CATALOG))
    }

    /// Descriptors in catalog order
    pub fn descriptors(&self) -> &[&'static MessageDescriptor] {
        &self.descriptors
    }

    /// Whether an inbound type id has a decoder
    pub fn is_known(&self, type_id: u8) -> bool {
        self.inbound.contains_key(&type_id)
    }

    /// Compiled inbound layout for a type id
    pub fn inbound_layout(&self, type_id: u8) -> Option<&Layout> {
        self.inbound.get(&type_id).map(|codec| &codec.layout)
    }

    /// Compiled outbound layout for a message name
    pub fn outbound_layout(&self, name: &str) -> Option<&Layout> {
        self.outbound.get(name)
    }

    /// Decode a message body (payload without the type byte)
    pub fn decode(&self, type_id: u8, body: &[u8]) -> Result<Message, CodecError> {
        let codec = self
            .inbound
            .get(&type_id)
            .ok_or(CodecError::UnknownMessageType(type_id))?;
        let fields = codec.layout.decode(body)?;
        (codec.build)(&fields)
    }

    /// Decode a full payload (type byte first)
    pub fn decode_payload(&self, payload: &[u8]) -> Result<Message, CodecError> {
        match payload.split_first() {
            Some((&type_id, body)) => self.decode(type_id, body),
            None => Err(CodecError::Truncated {
                message: "payload",
                expected: 1,
                actual: 0,
            }),
        }
    }

    /// Encode a command into a payload (type byte first), ready for framing
    pub fn encode(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        let name = message.name();
        let layout = self.outbound_layout(name).ok_or(CodecError::NotEncodable(name))?;
        layout.encode(&message.to_fields())
    }

    /// Encode a message the way the receiver sends it
    ///
    /// Used to emulate a receiver, for example in tests and replays.
    pub fn encode_inbound(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        let name = message.name();
        let layout = self
            .inbound_by_name
            .get(name)
            .and_then(|id| self.inbound_layout(*id))
            .ok_or(CodecError::NotEncodable(name))?;
        layout.encode(&message.to_fields())
    }
}

fn claim(
    owners: &mut HashMap<u8, &'static str>,
    id: u8,
    direction: Direction,
    name: &'static str,
) -> Result<(), LayoutError> {
    if let Some(first) = owners.insert(id, name) {
        return Err(LayoutError::DuplicateId {
            id,
            direction,
            first,
            second: name,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::messages::{
        catalog, MeasurementTime, QueryPositionUpdateRate, ReceiverSoftwareCrc, WireMessage,
    };

    fn entry<T: WireMessage + Into<Message>>() -> CatalogEntry {
        CatalogEntry {
            descriptor: T::DESCRIPTOR,
            decode: |fields| T::from_fields(fields).map(Into::into),
        }
    }

    #[test]
    fn test_global_registry_builds() {
        let registry = Registry::global().unwrap();
        assert_eq!(registry.descriptors().len(), CATALOG.len());
        assert!(registry.is_known(0xDC));
        assert!(registry.is_known(0x86));
        assert!(!registry.is_known(ACK_ID));
        assert!(!registry.is_known(0x10));
        assert_eq!(registry.outbound_layout("ConfigurePositionUpdateRate").map(Layout::id), Some(0x0E));
        assert!(registry.outbound_layout("MeasurementTime").is_none());
        assert!(std::ptr::eq(registry, Registry::global().unwrap()));
    }

    #[test]
    fn test_every_descriptor_matches_declared_length() {
        for descriptor in CATALOG.iter().map(|e| e.descriptor) {
            for direction in [Direction::Outbound, Direction::Inbound] {
                if descriptor.id(direction).is_some() {
                    let layout = Layout::compile(descriptor, direction).unwrap();
                    assert_eq!(layout.fixed_len(), descriptor.len(direction), "{}", descriptor.name);
                }
            }
        }
    }

    #[test]
    fn test_duplicate_inbound_id_is_fatal() {
        let mut clash = entry::<ReceiverSoftwareCrc>();
        clash.descriptor = &catalog::MEASUREMENT_TIME;
        let result = Registry::new(&[entry::<MeasurementTime>(), clash]);
        assert!(matches!(
            result,
            Err(LayoutError::DuplicateId {
                id: 0xDC,
                direction: Direction::Inbound,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_unknown_type() {
        let registry = Registry::global().unwrap();
        assert_eq!(registry.decode(0x42, &[]), Err(CodecError::UnknownMessageType(0x42)));
        assert!(registry.decode_payload(&[]).is_err());
    }

    #[test]
    fn test_encode_query() {
        let registry = Registry::global().unwrap();
        let payload = registry.encode(&QueryPositionUpdateRate.into()).unwrap();
        assert_eq!(payload, vec![0x10]);
    }

    #[test]
    fn test_encode_report_is_rejected() {
        let registry = Registry::global().unwrap();
        let message: Message = MeasurementTime {
            iod: 1,
            receiver_wn: 2,
            receiver_tow: 3,
            measurement_period: 4,
        }
        .into();
        assert_eq!(
            registry.encode(&message),
            Err(CodecError::NotEncodable("MeasurementTime"))
        );
        assert_eq!(
            registry.encode_inbound(&message).unwrap(),
            vec![0xDC, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x04]
        );
    }
}
