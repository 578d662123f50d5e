/*!
 * Binary-Form Decoder
 *
 * Mirrors the binary encoder tag for tag: one tag read per branch, each
 * branch consuming exactly the bytes its grammar defines, slots assigned
 * in the same order the encoder assigned them. The root value must be
 * followed by the end tag and nothing else.
 */

use super::options::DecodeOptions;
use super::slots::SlotTable;
use super::{
    apply_entry, construct_instance, constructed_route, create_plain_instance, plain_route,
    validate_context, ConstructRoute, Decoded,
};
use crate::core::errors::FormatError;
use crate::core::CodecResult;
use crate::registry::ClassRegistry;
use crate::value::{Node, Value, ValueGraph};
use crate::wire::tags::BinaryTag;
use crate::wire::{ByteSource, ReaderSource, SliceSource};

/// Decode a binary-form document from an in-memory slice
pub fn from_slice(
    bytes: &[u8],
    registry: Option<&ClassRegistry>,
    options: &DecodeOptions,
) -> CodecResult<Decoded> {
    let mut source = SliceSource::new(bytes);
    let decoded = from_source(&mut source, registry, options)?;
    if !source.is_exhausted() {
        return Err(FormatError::TrailingData {
            offset: source.offset(),
        }
        .into());
    }
    Ok(decoded)
}

/// Decode a binary-form document from a buffered reader
pub fn from_reader<R: std::io::Read>(
    reader: R,
    registry: Option<&ClassRegistry>,
    options: &DecodeOptions,
) -> CodecResult<Decoded> {
    let mut source = ReaderSource::new(reader);
    let decoded = from_source(&mut source, registry, options)?;
    if !source.is_exhausted()? {
        return Err(FormatError::TrailingData {
            offset: source.offset(),
        }
        .into());
    }
    Ok(decoded)
}

/// Decode a binary-form document from any byte source
pub fn from_source<S: ByteSource>(
    source: &mut S,
    registry: Option<&ClassRegistry>,
    options: &DecodeOptions,
) -> CodecResult<Decoded> {
    validate_context(options)?;
    let mut decoder = BinaryDecoder {
        source,
        registry,
        options,
        graph: ValueGraph::new(),
        slots: SlotTable::new(),
    };
    let root = decoder.decode_value()?;
    decoder.expect_end()?;
    Ok(Decoded {
        graph: decoder.graph,
        root,
    })
}

struct BinaryDecoder<'a, S: ByteSource> {
    source: &'a mut S,
    registry: Option<&'a ClassRegistry>,
    options: &'a DecodeOptions,
    graph: ValueGraph,
    slots: SlotTable,
}

impl<S: ByteSource> BinaryDecoder<'_, S> {
    fn read_tag(&mut self) -> CodecResult<BinaryTag> {
        let offset = self.source.offset();
        let byte = self.source.read_u8()?;
        BinaryTag::from_u8(byte)
            .ok_or_else(|| FormatError::UnknownTag { tag: byte, offset }.into())
    }

    fn decode_value(&mut self) -> CodecResult<Value> {
        let offset = self.source.offset();
        let tag = self.read_tag()?;
        self.decode_value_tagged(tag, offset)
    }

    fn decode_value_tagged(&mut self, tag: BinaryTag, offset: usize) -> CodecResult<Value> {
        match tag {
            BinaryTag::End | BinaryTag::Close => Err(FormatError::UnexpectedTag {
                expected: "a value tag".into(),
                found: format!("{tag:?}"),
                offset,
            }
            .into()),

            BinaryTag::Undefined => Ok(Value::Undefined),
            BinaryTag::Null => Ok(Value::Null),
            BinaryTag::False => Ok(Value::Bool(false)),
            BinaryTag::True => Ok(Value::Bool(true)),
            BinaryTag::Number => Ok(Value::Number(self.source.read_f64_be()?)),

            BinaryTag::EmptyString
            | BinaryTag::StringLen8
            | BinaryTag::StringLen16
            | BinaryTag::StringLen32 => Ok(Value::Text(self.decode_string_tagged(tag)?)),

            BinaryTag::EmptyArray => {
                let value = self.graph.array(vec![]);
                self.slots.assign(value.clone());
                Ok(value)
            }
            BinaryTag::Array => {
                let id = self.graph.alloc(Node::Array(vec![]));
                self.slots.assign(Value::Node(id));
                loop {
                    let child_offset = self.source.offset();
                    let child_tag = self.read_tag()?;
                    if child_tag == BinaryTag::Close {
                        break;
                    }
                    let child = self.decode_value_tagged(child_tag, child_offset)?;
                    self.graph.push_item(id, child)?;
                }
                Ok(Value::Node(id))
            }

            BinaryTag::EmptySet => {
                let value = self.graph.set(vec![]);
                self.slots.assign(value.clone());
                Ok(value)
            }
            BinaryTag::Set => {
                let id = self.graph.alloc(Node::Set(vec![]));
                self.slots.assign(Value::Node(id));
                loop {
                    let child_offset = self.source.offset();
                    let child_tag = self.read_tag()?;
                    if child_tag == BinaryTag::Close {
                        break;
                    }
                    let child = self.decode_value_tagged(child_tag, child_offset)?;
                    self.graph.push_item(id, child)?;
                }
                Ok(Value::Node(id))
            }

            BinaryTag::EmptyObject => {
                let value = self.graph.object(Vec::<(String, Value)>::new());
                self.slots.assign(value.clone());
                Ok(value)
            }
            BinaryTag::Object => {
                let id = self.graph.alloc(Node::empty_object());
                self.slots.assign(Value::Node(id));
                loop {
                    let Some(key) = self.decode_key_or_close()? else {
                        break;
                    };
                    let value = self.decode_value()?;
                    self.graph.insert_entry(id, key, value)?;
                }
                Ok(Value::Node(id))
            }

            BinaryTag::EmptyInstance => {
                let class = self.decode_class_name()?;
                let route = plain_route(&class, self.registry, self.options)?;
                let context = self.options.context.as_ref();
                let instance =
                    create_plain_instance(&mut self.graph, &class, &route, context)?;
                self.slots.assign(instance.clone());
                Ok(instance)
            }
            BinaryTag::Instance => {
                let class = self.decode_class_name()?;
                let route = plain_route(&class, self.registry, self.options)?;
                let context = self.options.context.as_ref();
                let instance =
                    create_plain_instance(&mut self.graph, &class, &route, context)?;
                self.slots.assign(instance.clone());
                loop {
                    let Some(key) = self.decode_key_or_close()? else {
                        break;
                    };
                    let value = self.decode_value()?;
                    apply_entry(&mut self.graph, &instance, &class, key, value)?;
                }
                Ok(instance)
            }

            BinaryTag::ConstructedInstance => {
                let class = self.decode_class_name()?;
                let route = constructed_route(&class, self.registry, self.options)?;

                // Arguments claim their own slots first; the instance's
                // slot assignment is deferred until construction
                let args_value = self.decode_value()?;
                let context = self.options.context.as_ref();
                let instance =
                    construct_instance(&mut self.graph, &class, &route, args_value, context)?;
                self.slots.assign(instance.clone());

                loop {
                    let Some(key) = self.decode_key_or_close()? else {
                        break;
                    };
                    let value = self.decode_value()?;
                    apply_entry(&mut self.graph, &instance, &class, key, value)?;
                }

                if let ConstructRoute::Spec(spec) = &route {
                    if let Some(finalizer) = spec.finalizer() {
                        finalizer(&mut self.graph, &instance, context, &class)?;
                    }
                }
                Ok(instance)
            }

            BinaryTag::Reference => {
                let slot = self.source.read_u32_be()?;
                self.slots.get(slot)
            }
        }
    }

    /// Read one string value whose tag was already consumed
    fn decode_string_tagged(&mut self, tag: BinaryTag) -> CodecResult<String> {
        let len = match tag {
            BinaryTag::EmptyString => return Ok(String::new()),
            BinaryTag::StringLen8 => self.source.read_u8()? as usize,
            BinaryTag::StringLen16 => self.source.read_u16_be()? as usize,
            BinaryTag::StringLen32 => self.source.read_u32_be()? as usize,
            other => {
                return Err(crate::core::errors::CodecError::Internal(format!(
                    "decode_string_tagged called with non-string tag {other:?}"
                )))
            }
        };
        let offset = self.source.offset();
        let payload = self.source.read_span(len)?;
        String::from_utf8(payload).map_err(|_| FormatError::BadUtf8 { offset }.into())
    }

    /// Keys and class names must decode as string-typed tags
    fn decode_class_name(&mut self) -> CodecResult<String> {
        let offset = self.source.offset();
        let tag = self.read_tag()?;
        if !tag.is_string() {
            return Err(FormatError::UnexpectedTag {
                expected: "a string class name".into(),
                found: format!("{tag:?}"),
                offset,
            }
            .into());
        }
        self.decode_string_tagged(tag)
    }

    /// `Some(key)` for a string key, `None` at the container's close tag
    fn decode_key_or_close(&mut self) -> CodecResult<Option<String>> {
        let offset = self.source.offset();
        let tag = self.read_tag()?;
        if tag == BinaryTag::Close {
            return Ok(None);
        }
        if !tag.is_string() {
            return Err(FormatError::UnexpectedTag {
                expected: "a string key or close tag".into(),
                found: format!("{tag:?}"),
                offset,
            }
            .into());
        }
        Ok(Some(self.decode_string_tagged(tag)?))
    }

    /// The end tag terminates every binary document
    fn expect_end(&mut self) -> CodecResult<()> {
        let offset = self.source.offset();
        let tag = self.read_tag()?;
        if tag != BinaryTag::End {
            return Err(FormatError::UnexpectedTag {
                expected: "the end tag".into(),
                found: format!("{tag:?}"),
                offset,
            }
            .into());
        }
        Ok(())
    }
}
