//! Generic SOAP body parsing into a nested JSON-like tree.
//!
//! Response paths in the action catalog address this tree by key, e.g.
//! `["s:Envelope", "s:Body", "u:GetVolumeResponse", "CurrentVolume"]`.
//!
//! Shape rules:
//! - attributes are merged into the same map as child elements
//! - repeated child elements collapse into an array
//! - text-only elements become strings, empty elements become `""`
//! - mixed elements keep their text under a configurable key (default `_`)

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use super::soap::{SoapError, SoapResult};

/// An element under construction.
struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(e: &BytesStart) -> Self {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut fields = Map::new();
        for attr in e.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = html_escape::decode_html_entities(&raw).into_owned();
            insert_merged(&mut fields, key, Value::String(value));
        }
        Self {
            name,
            fields,
            text: String::new(),
        }
    }

    fn close(self, text_key: &str) -> (String, Value) {
        let blank = self.text.trim().is_empty();
        let value = if self.fields.is_empty() {
            if blank {
                Value::String(String::new())
            } else {
                Value::String(self.text)
            }
        } else {
            let mut fields = self.fields;
            if !blank {
                insert_merged(&mut fields, text_key.to_string(), Value::String(self.text));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }
}

/// Inserts `value` under `key`, turning repeated keys into arrays.
fn insert_merged(fields: &mut Map<String, Value>, key: String, value: Value) {
    match fields.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(key, value);
        }
    }
}

/// Parses an XML document into a tree rooted at `{root_name: ...}`.
///
/// # Errors
/// Returns `SoapError::Parse` for malformed XML or a document without a root
/// element.
pub fn parse_body(xml: &str, text_key: &str) -> SoapResult<Value> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        match event {
            Event::Start(ref e) => stack.push(Frame::open(e)),
            Event::Empty(ref e) => {
                let closed = Frame::open(e).close(text_key);
                attach(&mut stack, &mut root, closed)?;
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| SoapError::Parse("unbalanced end tag".into()))?;
                let closed = frame.close(text_key);
                attach(&mut stack, &mut root, closed)?;
            }
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    let decoded = t.decode().map_err(|e| SoapError::Parse(e.to_string()))?;
                    top.text.push_str(&decoded);
                }
            }
            Event::GeneralRef(ref r) => {
                if let Some(top) = stack.last_mut() {
                    let entity = format!("&{};", String::from_utf8_lossy(r));
                    top.text
                        .push_str(&html_escape::decode_html_entities(&entity));
                }
            }
            Event::CData(ref c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(SoapError::Parse("unexpected end of document".into()));
    }

    let (name, value) = root.ok_or_else(|| SoapError::Parse("document has no root".into()))?;
    let mut wrapper = Map::new();
    wrapper.insert(name, value);
    Ok(Value::Object(wrapper))
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    (name, value): (String, Value),
) -> SoapResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            insert_merged(&mut parent.fields, name, value);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some((name, value));
            Ok(())
        }
        None => Err(SoapError::Parse("multiple root elements".into())),
    }
}

/// Walks `path` through a parsed body.
#[must_use]
pub fn lookup_path<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(body, |node, key| node.get(*key))
}
