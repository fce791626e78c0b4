//! XML event parsing into the generic node arena.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Attribute, Document, NodeData, NodeId};
use crate::error::{Error, Result};

pub(super) fn parse_document(text: &str) -> Result<Document> {
    let mut reader = Reader::from_str(strip_bom(text));
    reader.config_mut().trim_text(true);

    let mut doc = Document {
        nodes: Vec::new(),
        root: None,
    };
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = element_node(&mut doc, &e, reader.buffer_position())?;
                attach(&mut doc, &stack, id, reader.buffer_position())?;
                stack.push(id);
            }
            Ok(Event::Empty(e)) => {
                let id = element_node(&mut doc, &e, reader.buffer_position())?;
                attach(&mut doc, &stack, id, reader.buffer_position())?;
            }
            Ok(Event::End(_)) => {
                if stack.pop().is_none() {
                    return Err(Error::MalformedMarkup {
                        position: reader.buffer_position(),
                        message: "unexpected closing tag".to_string(),
                    });
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(&parent) = stack.last() {
                    doc.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(&parent) = stack.last() {
                    doc.append_text(parent, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(&parent) = stack.last() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        doc.append_text(parent, &resolved);
                    }
                }
            }
            Ok(Event::Eof) => {
                if let Some(&open) = stack.last() {
                    let name = doc.name(open).unwrap_or("?").to_string();
                    return Err(Error::MalformedMarkup {
                        position: reader.buffer_position(),
                        message: format!("unexpected end of document, <{name}> is not closed"),
                    });
                }
                break;
            }
            // Declarations, comments, doctypes, processing instructions.
            Ok(_) => {}
            Err(e) => {
                return Err(Error::MalformedMarkup {
                    position: reader.error_position(),
                    message: e.to_string(),
                });
            }
        }
    }

    match doc.root {
        Some(_) => Ok(doc),
        None => Err(Error::MalformedMarkup {
            position: reader.buffer_position(),
            message: "no root element".to_string(),
        }),
    }
}

fn element_node(doc: &mut Document, e: &BytesStart<'_>, position: u64) -> Result<NodeId> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::MalformedMarkup {
            position,
            message: err.to_string(),
        })?;
        let value = attr.unescape_value().map_err(|err| Error::MalformedMarkup {
            position,
            message: err.to_string(),
        })?;
        attrs.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }
    Ok(doc.push(NodeData::Element { name, attrs }))
}

fn attach(doc: &mut Document, stack: &[NodeId], id: NodeId, position: u64) -> Result<()> {
    match stack.last() {
        Some(&parent) => doc.append_child(parent, id),
        None if doc.root.is_none() => doc.root = Some(id),
        None => {
            return Err(Error::MalformedMarkup {
                position,
                message: "multiple root elements".to_string(),
            });
        }
    }
    Ok(())
}

/// Strip UTF-8 BOM if present.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
