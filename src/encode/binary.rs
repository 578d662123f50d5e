/*!
 * Binary-Form Encoder
 *
 * Emits the one-byte tag grammar: numbers as 8-byte big-endian floats,
 * strings length-prefixed by the smallest fitting size class, composites
 * as tag/children/close with identity tracked through the reference
 * table. Maps, buffers, and prototype-carrying objects have no binary
 * tags and are rejected as unrepresentable.
 */

use super::options::EncodeOptions;
use super::refs::EncodeRefs;
use super::{instance_route, InstanceRoute};
use crate::core::errors::{CodecError, FormatError, RegistryError};
use crate::core::limits::{ENCODE_BUFFER_INITIAL, LEN16_MAX, LEN32_MAX, LEN8_MAX};
use crate::core::types::NodeId;
use crate::core::CodecResult;
use crate::registry::ClassRegistry;
use crate::value::{Node, Value, ValueGraph};
use crate::wire::tags::BinaryTag;
use crate::wire::{ByteSink, WriterSink};
use bytes::{Bytes, BytesMut};

/// Encode a value into a freshly allocated byte vector
#[inline]
pub fn to_vec(
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
) -> CodecResult<Vec<u8>> {
    let mut sink = Vec::with_capacity(ENCODE_BUFFER_INITIAL);
    to_sink(graph, value, registry, options, &mut sink)?;
    Ok(sink)
}

/// Encode a value into `Bytes` for zero-copy sharing
#[inline]
pub fn to_bytes(
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
) -> CodecResult<Bytes> {
    let mut sink = BytesMut::with_capacity(ENCODE_BUFFER_INITIAL);
    to_sink(graph, value, registry, options, &mut sink)?;
    Ok(sink.freeze())
}

/// Encode a value through a buffered writer, flushing on completion
pub fn to_writer<W: std::io::Write>(
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
    writer: W,
) -> CodecResult<()> {
    let mut sink = WriterSink::new(writer);
    to_sink(graph, value, registry, options, &mut sink)?;
    sink.flush()
}

/// Encode a value into any byte sink
///
/// The root value is followed by the end tag; the matching decoder
/// requires it.
pub fn to_sink<S: ByteSink>(
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
    sink: &mut S,
) -> CodecResult<()> {
    let mut encoder = BinaryEncoder {
        graph,
        registry,
        options,
        refs: EncodeRefs::new(),
        sink,
    };
    encoder.encode_value(value)?;
    encoder.put_tag(BinaryTag::End)
}

struct BinaryEncoder<'a, S: ByteSink> {
    graph: &'a ValueGraph,
    registry: Option<&'a ClassRegistry>,
    options: &'a EncodeOptions,
    refs: EncodeRefs,
    sink: &'a mut S,
}

impl<S: ByteSink> BinaryEncoder<'_, S> {
    #[inline]
    fn put_tag(&mut self, tag: BinaryTag) -> CodecResult<()> {
        self.sink.put_u8(tag as u8)
    }

    fn encode_value(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Undefined => self.put_tag(BinaryTag::Undefined),
            Value::Null => self.put_tag(BinaryTag::Null),
            Value::Bool(false) => self.put_tag(BinaryTag::False),
            Value::Bool(true) => self.put_tag(BinaryTag::True),
            Value::Number(n) => {
                // NaN and the infinities ride the IEEE-754 bit pattern
                self.put_tag(BinaryTag::Number)?;
                self.sink.put_f64_be(*n)
            }
            Value::Text(s) => self.encode_string(s),
            Value::Bytes(_) => Err(FormatError::Unrepresentable {
                kind: "Buffer".into(),
            }
            .into()),
            Value::Node(id) => self.encode_node(*id),
        }
    }

    /// Length-prefixed string with automatic size-class escalation
    fn encode_string(&mut self, s: &str) -> CodecResult<()> {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return self.put_tag(BinaryTag::EmptyString);
        }
        let len = bytes.len();
        if len <= LEN8_MAX {
            self.put_tag(BinaryTag::StringLen8)?;
            self.sink.put_u8(len as u8)?;
        } else if len <= LEN16_MAX {
            self.put_tag(BinaryTag::StringLen16)?;
            self.sink.put_u16_be(len as u16)?;
        } else if (len as u64) <= LEN32_MAX {
            self.put_tag(BinaryTag::StringLen32)?;
            self.sink.put_u32_be(len as u32)?;
        } else {
            return Err(CodecError::LimitExceeded {
                length: len as u64,
                max: LEN32_MAX,
            });
        }
        self.sink.write_all(bytes)
    }

    fn encode_node(&mut self, id: NodeId) -> CodecResult<()> {
        if let Some(slot) = self.refs.lookup(id) {
            self.put_tag(BinaryTag::Reference)?;
            return self.sink.put_u32_be(slot);
        }
        let node = self.graph.expect(id)?;
        if self.refs.is_deferred(id) {
            return Err(match node {
                Node::Instance { class, .. } => FormatError::CyclicConstructor {
                    class: class.clone(),
                }
                .into(),
                _ => FormatError::CyclicPrototype.into(),
            });
        }
        match node {
            Node::Array(items) => {
                self.refs.assign(id);
                if items.is_empty() {
                    return self.put_tag(BinaryTag::EmptyArray);
                }
                self.put_tag(BinaryTag::Array)?;
                for item in items {
                    self.encode_value(item)?;
                }
                self.put_tag(BinaryTag::Close)
            }
            Node::Set(items) => {
                self.refs.assign(id);
                if items.is_empty() {
                    return self.put_tag(BinaryTag::EmptySet);
                }
                self.put_tag(BinaryTag::Set)?;
                for item in items {
                    self.encode_value(item)?;
                }
                self.put_tag(BinaryTag::Close)
            }
            Node::Map(_) => Err(FormatError::Unrepresentable { kind: "Map".into() }.into()),
            Node::Object { proto, entries } => {
                if self.options.preserve_prototypes && proto.is_some() {
                    return Err(FormatError::Unrepresentable {
                        kind: "Prototype-carrying object".into(),
                    }
                    .into());
                }
                self.refs.assign(id);
                if entries.is_empty() {
                    return self.put_tag(BinaryTag::EmptyObject);
                }
                self.put_tag(BinaryTag::Object)?;
                self.encode_entries(entries)?;
                self.put_tag(BinaryTag::Close)
            }
            Node::Instance { class, entries } => self.encode_instance(id, class, entries),
        }
    }

    fn encode_entries(&mut self, entries: &[(String, Value)]) -> CodecResult<()> {
        for (key, value) in entries {
            self.encode_string(key)?;
            self.encode_value(value)?;
        }
        Ok(())
    }

    fn encode_instance(
        &mut self,
        id: NodeId,
        class: &str,
        entries: &[(String, Value)],
    ) -> CodecResult<()> {
        match instance_route(class, self.registry, self.options)? {
            InstanceRoute::Plain => {
                self.refs.assign(id);
                if entries.is_empty() {
                    self.put_tag(BinaryTag::EmptyInstance)?;
                    return self.encode_string(class);
                }
                self.put_tag(BinaryTag::Instance)?;
                self.encode_string(class)?;
                self.encode_entries(entries)?;
                self.put_tag(BinaryTag::Close)
            }
            InstanceRoute::Constructed(spec) => {
                let Some(serializer) = spec.serializer() else {
                    return Err(RegistryError::NotSerializable(class.to_string()).into());
                };
                let serialized = serializer(self.graph, id)?;

                self.put_tag(BinaryTag::ConstructedInstance)?;
                self.encode_string(class)?;

                // The instance has no slot until its constructor arguments
                // are fully written; a self-reference inside them is fatal
                self.refs.begin_deferred(id);
                let written = self.encode_value(&serialized.args);
                self.refs.end_deferred(id);
                written?;

                self.refs.assign(id);
                self.encode_entries(&serialized.overrides)?;
                self.put_tag(BinaryTag::Close)
            }
        }
    }
}
