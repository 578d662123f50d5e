/*!
 * Textual-Form Decoder
 *
 * Mirrors the textual encoder: one tag character per branch, numerals
 * scanned with bounded lookahead for their separator, string payloads
 * taken by byte length rather than re-scanning for a terminator. The
 * textual-only tags (maps, buffers, prototyped objects, the unsupported
 * marker) decode here and nowhere else.
 */

use super::options::DecodeOptions;
use super::slots::SlotTable;
use super::{
    apply_entry, construct_instance, constructed_route, create_plain_instance, plain_route,
    validate_context, ConstructRoute, Decoded,
};
use crate::core::errors::FormatError;
use crate::core::limits::NUMERAL_LOOKAHEAD_MAX;
use crate::core::types::SlotId;
use crate::core::CodecResult;
use crate::registry::ClassRegistry;
use crate::value::{Node, Value, ValueGraph};
use crate::wire::tags::text;

/// Decode a textual-form document from a string
pub fn from_str(
    input: &str,
    registry: Option<&ClassRegistry>,
    options: &DecodeOptions,
) -> CodecResult<Decoded> {
    validate_context(options)?;
    let mut decoder = TextDecoder {
        scanner: TextScanner::new(input.as_bytes()),
        registry,
        options,
        graph: ValueGraph::new(),
        slots: SlotTable::new(),
    };
    let root = decoder.decode_value()?;
    if !decoder.scanner.is_exhausted() {
        return Err(FormatError::TrailingData {
            offset: decoder.scanner.offset(),
        }
        .into());
    }
    Ok(Decoded {
        graph: decoder.graph,
        root,
    })
}

// ============================================================================
// Scanner
// ============================================================================

/// Cursor over the input characters
///
/// Tags and numerals are ASCII, so the scanner walks bytes; string
/// payloads are sliced by byte length and re-validated as UTF-8.
struct TextScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TextScanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Consume one tag character
    fn next_tag(&mut self) -> CodecResult<char> {
        let offset = self.pos;
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(FormatError::Truncated { offset, needed: 1 })?;
        self.pos += 1;
        Ok(byte as char)
    }

    /// Consume exactly `len` payload bytes
    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.data.len() - self.pos < len {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: len - (self.data.len() - self.pos),
            }
            .into());
        }
        let span = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(span)
    }

    fn expect_separator(&mut self) -> CodecResult<()> {
        let offset = self.pos;
        let found = self.next_tag()?;
        if found != text::SEPARATOR {
            return Err(FormatError::UnexpectedTag {
                expected: "the separator".into(),
                found: format!("{found:?}"),
                offset,
            }
            .into());
        }
        Ok(())
    }

    fn expect_open(&mut self) -> CodecResult<()> {
        let offset = self.pos;
        let found = self.next_tag()?;
        if found != text::OPEN {
            return Err(FormatError::UnexpectedTag {
                expected: "the open tag".into(),
                found: format!("{found:?}"),
                offset,
            }
            .into());
        }
        Ok(())
    }

    /// Scan forward for the separator with bounded lookahead, returning
    /// the raw literal between the cursor and the separator
    fn literal_until_separator(&mut self) -> CodecResult<&'a str> {
        let start = self.pos;
        let cap = NUMERAL_LOOKAHEAD_MAX.min(self.data.len() - start);
        for scanned in 0..cap {
            if self.data[start + scanned] == text::SEPARATOR as u8 {
                self.pos = start + scanned + 1;
                // digits and number literals are pure ASCII
                return std::str::from_utf8(&self.data[start..start + scanned])
                    .map_err(|_| FormatError::BadUtf8 { offset: start }.into());
            }
        }
        if cap < NUMERAL_LOOKAHEAD_MAX {
            return Err(FormatError::Truncated {
                offset: self.data.len(),
                needed: 1,
            }
            .into());
        }
        Err(FormatError::SeparatorNotFound {
            offset: start,
            scanned: NUMERAL_LOOKAHEAD_MAX,
        }
        .into())
    }

    /// `<digits>;` as an unsigned length or slot id
    fn read_numeral(&mut self) -> CodecResult<u64> {
        let offset = self.pos;
        let literal = self.literal_until_separator()?;
        if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::BadNumeral {
                text: literal.to_string(),
                offset,
            }
            .into());
        }
        literal.parse::<u64>().map_err(|_| {
            FormatError::BadNumeral {
                text: literal.to_string(),
                offset,
            }
            .into()
        })
    }
}

// ============================================================================
// Decoder
// ============================================================================

struct TextDecoder<'a> {
    scanner: TextScanner<'a>,
    registry: Option<&'a ClassRegistry>,
    options: &'a DecodeOptions,
    graph: ValueGraph,
    slots: SlotTable,
}

impl TextDecoder<'_> {
    fn decode_value(&mut self) -> CodecResult<Value> {
        let offset = self.scanner.offset();
        let tag = self.scanner.next_tag()?;
        self.decode_value_tagged(tag, offset)
    }

    fn decode_value_tagged(&mut self, tag: char, offset: usize) -> CodecResult<Value> {
        match tag {
            text::UNDEFINED => Ok(Value::Undefined),
            text::NULL => Ok(Value::Null),
            text::FALSE => Ok(Value::Bool(false)),
            text::TRUE => Ok(Value::Bool(true)),
            text::ZERO => Ok(Value::Number(0.0)),
            text::ONE => Ok(Value::Number(1.0)),
            // tolerated on input, never emitted
            text::UNSUPPORTED => Ok(Value::Undefined),

            text::NUMBER => self.decode_number(),
            text::EMPTY_STRING => Ok(Value::Text(String::new())),
            text::STRING => Ok(Value::Text(self.decode_string_payload()?)),
            text::BUFFER => self.decode_buffer(),

            text::EMPTY_ARRAY => {
                let value = self.graph.array(vec![]);
                self.slots.assign(value.clone());
                Ok(value)
            }
            text::ARRAY => {
                self.scanner.expect_open()?;
                let id = self.graph.alloc(Node::Array(vec![]));
                self.slots.assign(Value::Node(id));
                loop {
                    let child_offset = self.scanner.offset();
                    let child_tag = self.scanner.next_tag()?;
                    if child_tag == text::CLOSE {
                        break;
                    }
                    let child = self.decode_value_tagged(child_tag, child_offset)?;
                    self.graph.push_item(id, child)?;
                }
                Ok(Value::Node(id))
            }

            text::EMPTY_SET => {
                let value = self.graph.set(vec![]);
                self.slots.assign(value.clone());
                Ok(value)
            }
            text::SET => {
                self.scanner.expect_open()?;
                let id = self.graph.alloc(Node::Set(vec![]));
                self.slots.assign(Value::Node(id));
                loop {
                    let child_offset = self.scanner.offset();
                    let child_tag = self.scanner.next_tag()?;
                    if child_tag == text::CLOSE {
                        break;
                    }
                    let child = self.decode_value_tagged(child_tag, child_offset)?;
                    self.graph.push_item(id, child)?;
                }
                Ok(Value::Node(id))
            }

            text::EMPTY_MAP => {
                let value = self.graph.map(vec![]);
                self.slots.assign(value.clone());
                Ok(value)
            }
            text::MAP => {
                self.scanner.expect_open()?;
                let id = self.graph.alloc(Node::Map(vec![]));
                self.slots.assign(Value::Node(id));
                loop {
                    let key_offset = self.scanner.offset();
                    let key_tag = self.scanner.next_tag()?;
                    if key_tag == text::CLOSE {
                        break;
                    }
                    // map keys are arbitrary values
                    let key = self.decode_value_tagged(key_tag, key_offset)?;
                    let value = self.decode_value()?;
                    self.graph.push_pair(id, key, value)?;
                }
                Ok(Value::Node(id))
            }

            text::EMPTY_OBJECT => {
                let value = self.graph.object(Vec::<(String, Value)>::new());
                self.slots.assign(value.clone());
                Ok(value)
            }
            text::OBJECT => {
                self.scanner.expect_open()?;
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

            text::PROTOTYPED_OBJECT => self.decode_prototyped(),

            text::EMPTY_INSTANCE => {
                let class = self.decode_class_name()?;
                let route = plain_route(&class, self.registry, self.options)?;
                let context = self.options.context.as_ref();
                let instance = create_plain_instance(&mut self.graph, &class, &route, context)?;
                self.slots.assign(instance.clone());
                Ok(instance)
            }
            text::INSTANCE => {
                self.scanner.expect_open()?;
                let class = self.decode_class_name()?;
                let route = plain_route(&class, self.registry, self.options)?;
                let context = self.options.context.as_ref();
                let instance = create_plain_instance(&mut self.graph, &class, &route, context)?;
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

            text::CONSTRUCTED_INSTANCE => {
                self.scanner.expect_open()?;
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

            text::REFERENCE => {
                let offset = self.scanner.offset();
                let slot = self.scanner.read_numeral()?;
                let slot = SlotId::try_from(slot).map_err(|_| FormatError::BadNumeral {
                    text: slot.to_string(),
                    offset,
                })?;
                self.slots.get(slot)
            }

            text::OBJECT_PROTOTYPE => Err(FormatError::UnexpectedTag {
                expected: "a value tag".into(),
                found: "the object-prototype constant outside prototype position".into(),
                offset,
            }
            .into()),
            text::CLOSE | text::OPEN | text::SEPARATOR => Err(FormatError::UnexpectedTag {
                expected: "a value tag".into(),
                found: format!("{tag:?}"),
                offset,
            }
            .into()),

            other => Err(FormatError::UnknownTextTag { tag: other, offset }.into()),
        }
    }

    fn decode_number(&mut self) -> CodecResult<Value> {
        let offset = self.scanner.offset();
        let literal = self.scanner.literal_until_separator()?;
        let number = match literal {
            "NaN" => f64::NAN,
            "Infinity" => f64::INFINITY,
            "-Infinity" => f64::NEG_INFINITY,
            _ => literal.parse::<f64>().map_err(|_| FormatError::BadNumeral {
                text: literal.to_string(),
                offset,
            })?,
        };
        Ok(Value::Number(number))
    }

    /// `<byte-len>;<payload>;` with the tag already consumed
    fn decode_string_payload(&mut self) -> CodecResult<String> {
        let len = self.scanner.read_numeral()? as usize;
        let offset = self.scanner.offset();
        let payload = self.scanner.take(len)?;
        let text = std::str::from_utf8(payload)
            .map_err(|_| FormatError::BadUtf8 { offset })?
            .to_string();
        self.scanner.expect_separator()?;
        Ok(text)
    }

    /// `<char-len>;<base64>;` with the tag already consumed
    fn decode_buffer(&mut self) -> CodecResult<Value> {
        let len = self.scanner.read_numeral()? as usize;
        let offset = self.scanner.offset();
        let payload = self.scanner.take(len)?;
        let bytes =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, payload)
                .map_err(|_| FormatError::BadBase64 { offset })?;
        self.scanner.expect_separator()?;
        Ok(Value::Bytes(bytes))
    }

    /// `p{<prototype><entries>}` — the prototype decodes (and claims its
    /// slot) before the dependent object is allocated
    fn decode_prototyped(&mut self) -> CodecResult<Value> {
        self.scanner.expect_open()?;
        let proto_offset = self.scanner.offset();
        let proto_tag = self.scanner.next_tag()?;
        let proto = if proto_tag == text::OBJECT_PROTOTYPE {
            None
        } else {
            let value = self.decode_value_tagged(proto_tag, proto_offset)?;
            if !value.is_node() && value != Value::Null {
                return Err(FormatError::UnexpectedTag {
                    expected: "a prototype object".into(),
                    found: format!("{proto_tag:?}"),
                    offset: proto_offset,
                }
                .into());
            }
            Some(value)
        };
        let id = self.graph.alloc(Node::Object {
            proto,
            entries: Vec::new(),
        });
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

    /// Keys and class names must decode as string-typed tags
    fn decode_class_name(&mut self) -> CodecResult<String> {
        let offset = self.scanner.offset();
        let tag = self.scanner.next_tag()?;
        match tag {
            text::EMPTY_STRING => Ok(String::new()),
            text::STRING => self.decode_string_payload(),
            other => Err(FormatError::UnexpectedTag {
                expected: "a string class name".into(),
                found: format!("{other:?}"),
                offset,
            }
            .into()),
        }
    }

    /// `Some(key)` for a string key, `None` at the container's close tag
    fn decode_key_or_close(&mut self) -> CodecResult<Option<String>> {
        let offset = self.scanner.offset();
        let tag = self.scanner.next_tag()?;
        match tag {
            text::CLOSE => Ok(None),
            text::EMPTY_STRING => Ok(Some(String::new())),
            text::STRING => Ok(Some(self.decode_string_payload()?)),
            other => Err(FormatError::UnexpectedTag {
                expected: "a string key or close tag".into(),
                found: format!("{other:?}"),
                offset,
            }
            .into()),
        }
    }
}
