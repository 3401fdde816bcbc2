/// Named XML parts of one document package.
///
/// Reading and writing the package itself (zip container, relationships,
/// content types) belongs to the caller; this type only holds parsed parts.
use crate::common::error::Result;
use crate::common::xml::XmlNode;
use indexmap::IndexMap;

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
pub const NUMBERING_PART: &str = "word/numbering.xml";
pub const STYLES_PART: &str = "word/styles.xml";

/// Root element of the main document part.
pub const DOCUMENT_ROOT: &str = "w:document";

/// Parsed parts keyed by part name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentParts {
    parts: IndexMap<String, XmlNode>,
}

impl DocumentParts {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `(name, xml text)` pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::convert::{DOCUMENT_PART, DocumentParts};
    ///
    /// let parts = DocumentParts::from_xml_strings([(DOCUMENT_PART, "<w:document><w:body/></w:document>")])?;
    /// assert_eq!(parts.get(DOCUMENT_PART).map(|root| root.name.as_str()), Some("w:document"));
    /// # Ok::<(), longan::ConvertError>(())
    /// ```
    pub fn from_xml_strings<I, K, S>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
    {
        let mut parts = Self::new();
        for (name, source) in sources {
            let root = XmlNode::parse(source.as_ref())?;
            parts.insert(name, root);
        }
        Ok(parts)
    }

    /// Serialise every part with its XML declaration.
    pub fn to_xml_strings(&self) -> IndexMap<String, String> {
        self.parts
            .iter()
            .map(|(name, root)| (name.clone(), root.to_part_string()))
            .collect()
    }

    /// Add or replace a part.
    pub fn insert(&mut self, name: impl Into<String>, root: XmlNode) -> Option<XmlNode> {
        self.parts.insert(name.into(), root)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&XmlNode> {
        self.parts.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<XmlNode> {
        self.parts.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlNode)> {
        self.parts.iter().map(|(name, root)| (name.as_str(), root))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Extend<(String, XmlNode)> for DocumentParts {
    fn extend<T: IntoIterator<Item = (String, XmlNode)>>(&mut self, iter: T) {
        self.parts.extend(iter);
    }
}

impl FromIterator<(String, XmlNode)> for DocumentParts {
    fn from_iter<T: IntoIterator<Item = (String, XmlNode)>>(iter: T) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}
