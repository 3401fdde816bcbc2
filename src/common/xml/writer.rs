/// Serialise an [`XmlNode`] tree back to XML text.
use super::escape::{escape_attr, escape_text};
use super::node::XmlNode;

/// XML declaration written in front of every package part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

impl XmlNode {
    /// Serialise this element and its subtree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::XmlNode;
    ///
    /// let node = XmlNode::new("w:t").with_attr("xml:space", "preserve").with_text("a < b");
    /// assert_eq!(node.to_xml_string(), r#"<w:t xml:space="preserve">a &lt; b</w:t>"#);
    /// ```
    pub fn to_xml_string(&self) -> String {
        let mut xml = String::with_capacity(256);
        self.write_to(&mut xml);
        xml
    }

    /// Serialise as a standalone part, prefixed with the XML declaration.
    pub fn to_part_string(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(XML_DECLARATION);
        self.write_to(&mut xml);
        xml
    }

    /// Append the serialised subtree to `xml`.
    pub fn write_to(&self, xml: &mut String) {
        xml.push('<');
        xml.push_str(&self.name);
        for (key, value) in &self.attributes {
            xml.push(' ');
            xml.push_str(key);
            xml.push_str("=\"");
            xml.push_str(&escape_attr(value));
            xml.push('"');
        }

        if self.elements.is_empty() && self.text.is_none() {
            xml.push_str("/>");
            return;
        }

        xml.push('>');
        if let Some(ref text) = self.text {
            xml.push_str(&escape_text(text));
        }
        for child in &self.elements {
            child.write_to(xml);
        }
        xml.push_str("</");
        xml.push_str(&self.name);
        xml.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_closing() {
        let node = XmlNode::new("w:b");
        assert_eq!(node.to_xml_string(), "<w:b/>");
    }

    #[test]
    fn test_write_then_parse_is_stable() {
        let source = r#"<w:p w:rsidR="00A1"><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t xml:space="preserve"> x &amp; "y" </w:t></w:r></w:p>"#;
        let node = XmlNode::parse(source).unwrap();
        let written = node.to_xml_string();
        assert_eq!(XmlNode::parse(&written).unwrap(), node);
    }

    #[test]
    fn test_part_string_has_declaration() {
        let xml = XmlNode::new("w:numbering").to_part_string();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.ends_with("<w:numbering/>"));
    }
}
