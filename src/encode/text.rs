/*!
 * Textual-Form Encoder
 *
 * Emits the printable character grammar: numerals as separator-terminated
 * decimal literals, strings as byte-length-prefixed spans, composites as
 * tag/open/children/close. Richer than the binary form: maps, buffers
 * (base64), prototype-carrying objects, and the 0/1 fast-path constants
 * exist only here.
 */

use super::options::EncodeOptions;
use super::refs::EncodeRefs;
use super::{instance_route, InstanceRoute};
use crate::core::errors::{FormatError, RegistryError};
use crate::core::types::NodeId;
use crate::core::CodecResult;
use crate::registry::ClassRegistry;
use crate::value::{Node, Value, ValueGraph};
use crate::wire::tags::text;
use crate::wire::{ByteSink, WriterSink};

/// Encode a value into a textual-form string
pub fn to_string(
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
) -> CodecResult<String> {
    let mut out = String::new();
    let mut encoder = TextEncoder {
        graph,
        registry,
        options,
        refs: EncodeRefs::new(),
        out: &mut out,
    };
    encoder.encode_value(value)?;
    Ok(out)
}

/// Encode a value through a buffered writer, flushing on completion
pub fn to_writer<W: std::io::Write>(
    graph: &ValueGraph,
    value: &Value,
    registry: Option<&ClassRegistry>,
    options: &EncodeOptions,
    writer: W,
) -> CodecResult<()> {
    let encoded = to_string(graph, value, registry, options)?;
    let mut sink = WriterSink::new(writer);
    sink.write_all(encoded.as_bytes())?;
    sink.flush()
}

struct TextEncoder<'a> {
    graph: &'a ValueGraph,
    registry: Option<&'a ClassRegistry>,
    options: &'a EncodeOptions,
    refs: EncodeRefs,
    out: &'a mut String,
}

impl TextEncoder<'_> {
    #[inline]
    fn put(&mut self, tag: char) {
        self.out.push(tag);
    }

    /// `<digits>;`
    fn put_numeral(&mut self, value: usize) {
        self.out.push_str(&value.to_string());
        self.put(text::SEPARATOR);
    }

    fn encode_value(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Undefined => {
                self.put(text::UNDEFINED);
                Ok(())
            }
            Value::Null => {
                self.put(text::NULL);
                Ok(())
            }
            Value::Bool(false) => {
                self.put(text::FALSE);
                Ok(())
            }
            Value::Bool(true) => {
                self.put(text::TRUE);
                Ok(())
            }
            Value::Number(n) => {
                self.encode_number(*n);
                Ok(())
            }
            Value::Text(s) => {
                self.encode_string(s);
                Ok(())
            }
            Value::Bytes(bytes) => {
                self.encode_buffer(bytes);
                Ok(())
            }
            Value::Node(id) => self.encode_node(*id),
        }
    }

    fn encode_number(&mut self, n: f64) {
        // 0 and 1 are disproportionately common; they get single-tag forms
        if n == 0.0 && n.is_sign_positive() {
            return self.put(text::ZERO);
        }
        if n == 1.0 {
            return self.put(text::ONE);
        }
        self.put(text::NUMBER);
        if n.is_nan() {
            self.out.push_str("NaN");
        } else if n.is_infinite() {
            self.out
                .push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
        } else {
            self.out.push_str(&n.to_string());
        }
        self.put(text::SEPARATOR);
    }

    /// `s<byte-len>;<payload>;` — the payload may contain the separator
    fn encode_string(&mut self, s: &str) {
        if s.is_empty() {
            return self.put(text::EMPTY_STRING);
        }
        self.put(text::STRING);
        self.put_numeral(s.len());
        self.out.push_str(s);
        self.put(text::SEPARATOR);
    }

    /// `b<char-len>;<base64>;`
    fn encode_buffer(&mut self, bytes: &[u8]) {
        let payload =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes);
        self.put(text::BUFFER);
        self.put_numeral(payload.len());
        self.out.push_str(&payload);
        self.put(text::SEPARATOR);
    }

    fn encode_node(&mut self, id: NodeId) -> CodecResult<()> {
        if let Some(slot) = self.refs.lookup(id) {
            self.put(text::REFERENCE);
            self.put_numeral(slot as usize);
            return Ok(());
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
                    self.put(text::EMPTY_ARRAY);
                    return Ok(());
                }
                self.put(text::ARRAY);
                self.put(text::OPEN);
                for item in items {
                    self.encode_value(item)?;
                }
                self.put(text::CLOSE);
                Ok(())
            }
            Node::Set(items) => {
                self.refs.assign(id);
                if items.is_empty() {
                    self.put(text::EMPTY_SET);
                    return Ok(());
                }
                self.put(text::SET);
                self.put(text::OPEN);
                for item in items {
                    self.encode_value(item)?;
                }
                self.put(text::CLOSE);
                Ok(())
            }
            Node::Map(pairs) => {
                self.refs.assign(id);
                if pairs.is_empty() {
                    self.put(text::EMPTY_MAP);
                    return Ok(());
                }
                self.put(text::MAP);
                self.put(text::OPEN);
                for (key, value) in pairs {
                    self.encode_value(key)?;
                    self.encode_value(value)?;
                }
                self.put(text::CLOSE);
                Ok(())
            }
            Node::Object { proto, entries } => {
                if self.options.preserve_prototypes {
                    if let Some(proto) = proto {
                        return self.encode_prototyped(id, proto, entries);
                    }
                }
                self.refs.assign(id);
                if entries.is_empty() {
                    self.put(text::EMPTY_OBJECT);
                    return Ok(());
                }
                self.put(text::OBJECT);
                self.put(text::OPEN);
                self.encode_entries(entries)?;
                self.put(text::CLOSE);
                Ok(())
            }
            Node::Instance { class, entries } => self.encode_instance(id, class, entries),
        }
    }

    /// `p{<prototype><entries>}` — the prototype must be fully written and
    /// slot-addressable before this object claims its own slot, so a
    /// shared prototype is emitted once and referenced by every later
    /// dependent
    fn encode_prototyped(
        &mut self,
        id: NodeId,
        proto: &Value,
        entries: &[(String, Value)],
    ) -> CodecResult<()> {
        self.put(text::PROTOTYPED_OBJECT);
        self.put(text::OPEN);

        self.refs.begin_deferred(id);
        let written = self.encode_value(proto);
        self.refs.end_deferred(id);
        written?;

        self.refs.assign(id);
        self.encode_entries(entries)?;
        self.put(text::CLOSE);
        Ok(())
    }

    fn encode_entries(&mut self, entries: &[(String, Value)]) -> CodecResult<()> {
        for (key, value) in entries {
            self.encode_string(key);
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
                    self.put(text::EMPTY_INSTANCE);
                    self.encode_string(class);
                    return Ok(());
                }
                self.put(text::INSTANCE);
                self.put(text::OPEN);
                self.encode_string(class);
                self.encode_entries(entries)?;
                self.put(text::CLOSE);
                Ok(())
            }
            InstanceRoute::Constructed(spec) => {
                let Some(serializer) = spec.serializer() else {
                    return Err(RegistryError::NotSerializable(class.to_string()).into());
                };
                let serialized = serializer(self.graph, id)?;

                self.put(text::CONSTRUCTED_INSTANCE);
                self.put(text::OPEN);
                self.encode_string(class);

                // No slot until the constructor arguments are written
                self.refs.begin_deferred(id);
                let written = self.encode_value(&serialized.args);
                self.refs.end_deferred(id);
                written?;

                self.refs.assign(id);
                self.encode_entries(&serialized.overrides)?;
                self.put(text::CLOSE);
                Ok(())
            }
        }
    }
}
