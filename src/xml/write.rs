//! Element tree serialization.

use super::Element;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io;

fn xml_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::other(err.to_string())
}

/// Serialize a tree to UTF-8 bytes, preceded by an XML declaration.
///
/// Text and tails are written as they are stored; call [`Element::indent`]
/// first for pretty output.
pub fn to_bytes(root: &Element) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::from_escaped("\n")))
        .map_err(xml_error)?;
    write_element(&mut writer, root)?;

    Ok(writer.into_inner())
}

/// Serialize a tree to a string.
pub fn to_string(root: &Element) -> io::Result<String> {
    let bytes = to_bytes(root)?;
    String::from_utf8(bytes).map_err(xml_error)
}

/// Split text so that no CDATA section contains `]]>`.
///
/// `a]]>b` becomes the sections `a]]` and `>b`.
fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let open = if i > 0 { ">" } else { "" };
            let close = if i < last { "]]" } else { "" };
            format!("{}{}{}", open, part, close)
        })
        .collect()
}

fn write_element<W: io::Write>(writer: &mut Writer<W>, element: &Element) -> io::Result<()> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children().is_empty() && element.text().is_none() {
        writer.write_event(Event::Empty(start)).map_err(xml_error)?;
    } else {
        writer.write_event(Event::Start(start)).map_err(xml_error)?;

        match element.text() {
            Some(text) if element.is_cdata() => {
                for section in cdata_sections(text) {
                    writer
                        .write_event(Event::CData(BytesCData::new(section)))
                        .map_err(xml_error)?;
                }
            }
            Some(text) => writer
                .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
                .map_err(xml_error)?,
            None => {}
        }

        for child in element.children() {
            write_element(writer, child)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(element.name())))
            .map_err(xml_error)?;
    }

    if let Some(tail) = element.tail() {
        writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(tail))))
            .map_err(xml_error)?;
    }

    Ok(())
}
