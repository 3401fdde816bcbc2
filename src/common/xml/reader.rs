/// Build an [`XmlNode`] tree from XML text.
///
/// This is a thin tree builder on top of quick-xml used by callers that hold part
/// text rather than an already-parsed tree. It keeps qualified names and namespace
/// declarations untouched so the tree can be written back verbatim.
use super::node::XmlNode;
use crate::common::error::{ConvertError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Elements whose whitespace-only text is significant.
const PRESERVE_TEXT: &[&str] = &["w:t", "w:delText", "w:instrText", "w:delInstrText"];

impl XmlNode {
    /// Parse XML text into a tree rooted at its document element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::XmlNode;
    ///
    /// let node = XmlNode::parse(r#"<w:r><w:t xml:space="preserve"> a &amp; b</w:t></w:r>"#).unwrap();
    /// assert_eq!(node.child("w:t").unwrap().text(), " a & b");
    /// ```
    pub fn parse(source: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlNode> = Vec::with_capacity(32);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(element_from_start(&e)?);
                },
                Ok(Event::Empty(e)) => {
                    let element = element_from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.elements.push(element),
                        None => return Ok(element),
                    }
                },
                Ok(Event::Text(t)) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = String::from_utf8_lossy(&t);
                        append_text(current, &unescape(&raw));
                    }
                },
                Ok(Event::CData(t)) => {
                    if let Some(current) = stack.last_mut() {
                        append_text(current, &String::from_utf8_lossy(&t));
                    }
                },
                Ok(Event::GeneralRef(r)) => {
                    if let Some(current) = stack.last_mut() {
                        let name = String::from_utf8_lossy(&r);
                        append_text(current, &resolve_entity(&name));
                    }
                },
                Ok(Event::End(_)) => {
                    let Some(mut element) = stack.pop() else {
                        return Err(ConvertError::Xml("unbalanced end tag".to_string()));
                    };
                    finish_text(&mut element);
                    match stack.last_mut() {
                        Some(parent) => parent.elements.push(element),
                        None => return Ok(element),
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ConvertError::Xml(format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                },
                _ => {}, // Declarations, comments, processing instructions
            }
        }

        match stack.first() {
            Some(open) => Err(ConvertError::Xml(format!("unclosed element <{}>", open.name))),
            None => Err(ConvertError::Xml("document has no root element".to_string())),
        }
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlNode> {
    let mut element = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = unescape(&String::from_utf8_lossy(&attr.value));
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn append_text(element: &mut XmlNode, text: &str) {
    element.text.get_or_insert_with(String::new).push_str(text);
}

fn finish_text(element: &mut XmlNode) {
    let keep = PRESERVE_TEXT.contains(&element.name.as_str())
        || element.attr("xml:space") == Some("preserve");
    if !keep
        && element
            .text
            .as_deref()
            .is_some_and(|t| t.chars().all(char::is_whitespace))
    {
        element.text = None;
    }
}

/// Resolve one entity or character reference name (without `&` and `;`).
fn resolve_entity(name: &str) -> String {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    match resolved {
        Some(c) => c.to_string(),
        None => format!("&{};", name),
    }
}

/// Replace entity and character references in raw XML text.
///
/// Unknown or malformed references are left unchanged.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find(';') {
            Some(end) if end > 0 && !after[..end].contains('&') => {
                out.push_str(&resolve_entity(&after[..end]));
                rest = &after[end + 1..];
            },
            _ => {
                out.push('&');
                rest = after;
            },
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <w:document xmlns:w="urn:w">
                <w:body>
                    <w:p><w:r><w:t>Hello</w:t></w:r></w:p>
                    <w:sectPr/>
                </w:body>
            </w:document>"#;
        let root = XmlNode::parse(xml).unwrap();
        assert_eq!(root.name, "w:document");
        assert_eq!(root.attr("xmlns:w"), Some("urn:w"));
        let body = root.child("w:body").unwrap();
        assert_eq!(body.elements.len(), 2);
        assert_eq!(body.text, None);
        let t = &body.elements[0].elements[0].elements[0];
        assert_eq!(t.text(), "Hello");
    }

    #[test]
    fn test_whitespace_preserved_in_text_runs() {
        let root = XmlNode::parse("<w:r><w:t> </w:t><w:tab>  </w:tab></w:r>").unwrap();
        assert_eq!(root.elements[0].text.as_deref(), Some(" "));
        assert_eq!(root.elements[1].text, None);
    }

    #[test]
    fn test_attribute_unescape() {
        let root = XmlNode::parse(r#"<w:tag w:val="{&quot;a&quot;:&#49;}"/>"#).unwrap();
        assert_eq!(root.attr("w:val"), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_unescape_malformed_left_alone() {
        assert_eq!(unescape("a & b"), "a & b");
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape("&#x41;&#66;"), "AB");
    }

    #[test]
    fn test_unreadable_input_is_error() {
        assert!(XmlNode::parse("not xml at all").is_err());
        assert!(XmlNode::parse("<w:p><w:r></w:p>").is_err());
        assert!(XmlNode::parse("<w:p>").is_err());
    }
}
