/// Numbering part model.
///
/// Reads `w:numbering` into abstract definitions, instances and per-level
/// formatting, and writes it back in schema order. Children the model does not
/// interpret are kept verbatim in the slot they came from, so
/// that import → export → import yields the same definitions.
use super::indent::Indent;
use crate::common::error::{ConvertError, Result};
use crate::common::xml::{XmlAttrs, XmlNode};
use crate::translator::attr::{format_int, parse_int, parse_on_off};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root element of the numbering part.
pub const NUMBERING_ROOT: &str = "w:numbering";

/// Number format of a list level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelFormat {
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Bullet,
    /// Any other `w:numFmt` value; the raw value is kept alongside
    Custom,
}

impl LevelFormat {
    /// Parse a `w:numFmt` value.
    pub fn from_xml(s: &str) -> Self {
        match s {
            "decimal" => Self::Decimal,
            "lowerLetter" => Self::LowerLetter,
            "upperLetter" => Self::UpperLetter,
            "lowerRoman" => Self::LowerRoman,
            "upperRoman" => Self::UpperRoman,
            "bullet" => Self::Bullet,
            _ => Self::Custom,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::LowerLetter => "lowerLetter",
            Self::UpperLetter => "upperLetter",
            Self::LowerRoman => "lowerRoman",
            Self::UpperRoman => "upperRoman",
            Self::Bullet => "bullet",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for LevelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formatting of one list level (`w:lvl`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub level: u8,
    pub start: Option<i64>,
    pub format: Option<LevelFormat>,
    /// Raw `w:numFmt` value when `format` is [`LevelFormat::Custom`]
    pub format_value: Option<String>,
    /// `w:numFmt/@w:format`, e.g. `001, 002, 003`
    pub format_pattern: Option<String>,
    pub restart: Option<i64>,
    pub paragraph_style: Option<String>,
    pub is_legal: Option<bool>,
    pub suffix: Option<String>,
    /// `w:lvlText`, e.g. `%1.%2.`
    pub label_template: Option<String>,
    pub justification: Option<String>,
    pub indent: Option<Indent>,
    /// `w:lvlPicBulletId` and `w:legacy`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before_justification: Vec<XmlNode>,
    /// `w:pPr` children other than `w:ind`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paragraph_extra: Vec<XmlNode>,
    pub run_properties: Option<XmlNode>,
    /// Unrecognised children, written after `w:rPr`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<XmlNode>,
    /// Attributes besides `w:ilvl`
    #[serde(default, skip_serializing_if = "XmlAttrs::is_empty")]
    pub attributes: XmlAttrs,
}

impl LevelDefinition {
    /// Format used for labels; a level without `w:numFmt` counts in decimal.
    #[inline]
    pub fn effective_format(&self) -> LevelFormat {
        self.format.unwrap_or(LevelFormat::Decimal)
    }

    /// First number of the level. A missing `w:start` means 0.
    #[inline]
    pub fn effective_start(&self) -> i64 {
        self.start.unwrap_or(0)
    }

    /// Parse a `w:lvl` element. Returns `None` without a usable `w:ilvl`.
    pub fn from_xml(node: &XmlNode) -> Option<Self> {
        let level = node.attr("w:ilvl").and_then(parse_int)?;
        let level = u8::try_from(level).ok()?;
        let mut def = LevelDefinition {
            level,
            attributes: without(&node.attributes, "w:ilvl"),
            ..Self::default()
        };

        for child in &node.elements {
            let val = child.attr("w:val");
            match child.name.as_str() {
                "w:start" => def.start = val.and_then(parse_int),
                "w:numFmt" => {
                    let raw = val.unwrap_or("decimal");
                    let format = LevelFormat::from_xml(raw);
                    if format == LevelFormat::Custom && raw != "custom" {
                        def.format_value = Some(raw.to_string());
                    }
                    def.format = Some(format);
                    def.format_pattern = child.attr("w:format").map(str::to_string);
                },
                "w:lvlRestart" => def.restart = val.and_then(parse_int),
                "w:pStyle" => def.paragraph_style = val.map(str::to_string),
                "w:isLgl" => def.is_legal = Some(val.and_then(parse_on_off).unwrap_or(true)),
                "w:suff" => def.suffix = val.map(str::to_string),
                "w:lvlText" => def.label_template = Some(val.unwrap_or("").to_string()),
                "w:lvlJc" => def.justification = val.map(str::to_string),
                "w:lvlPicBulletId" | "w:legacy" => def.before_justification.push(child.clone()),
                "w:pPr" => {
                    for p in &child.elements {
                        if p.name == "w:ind" {
                            def.indent = Some(Indent::from_xml(p));
                        } else {
                            def.paragraph_extra.push(p.clone());
                        }
                    }
                },
                "w:rPr" => def.run_properties = Some(child.clone()),
                _ => def.extra.push(child.clone()),
            }
        }
        Some(def)
    }

    /// Write the level back as `w:lvl`.
    pub fn to_xml(&self) -> XmlNode {
        let mut node = XmlNode::new("w:lvl").with_attr("w:ilvl", format_int(self.level as i64));
        node.attributes
            .extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let Some(start) = self.start {
            node.elements.push(val_node("w:start", &format_int(start)));
        }
        if let Some(format) = self.format {
            let raw = self.format_value.as_deref().unwrap_or(format.as_str());
            let mut fmt = val_node("w:numFmt", raw);
            if let Some(pattern) = &self.format_pattern {
                fmt.attributes.insert("w:format".to_string(), pattern.clone());
            }
            node.elements.push(fmt);
        }
        if let Some(restart) = self.restart {
            node.elements.push(val_node("w:lvlRestart", &format_int(restart)));
        }
        if let Some(style) = &self.paragraph_style {
            node.elements.push(val_node("w:pStyle", style));
        }
        match self.is_legal {
            Some(true) => node.elements.push(XmlNode::new("w:isLgl")),
            Some(false) => node.elements.push(val_node("w:isLgl", "0")),
            None => {},
        }
        if let Some(suffix) = &self.suffix {
            node.elements.push(val_node("w:suff", suffix));
        }
        if let Some(template) = &self.label_template {
            node.elements.push(val_node("w:lvlText", template));
        }
        node.elements.extend(self.before_justification.iter().cloned());
        if let Some(jc) = &self.justification {
            node.elements.push(val_node("w:lvlJc", jc));
        }
        if self.indent.is_some() || !self.paragraph_extra.is_empty() {
            let mut ppr = XmlNode::new("w:pPr");
            ppr.elements.extend(self.paragraph_extra.iter().cloned());
            if let Some(indent) = &self.indent {
                ppr.elements.push(indent.to_xml());
            }
            node.elements.push(ppr);
        }
        if let Some(rpr) = &self.run_properties {
            node.elements.push(rpr.clone());
        }
        node.elements.extend(self.extra.iter().cloned());
        node
    }
}

/// A reusable multi-level list definition (`w:abstractNum`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractNumberingDefinition {
    pub abstract_id: i64,
    pub nsid: Option<String>,
    pub multi_level_type: Option<String>,
    /// `w:tmpl`; definitions sharing it are variants of one list template
    pub template_id: Option<String>,
    pub name: Option<String>,
    pub style_link: Option<String>,
    pub num_style_link: Option<String>,
    pub levels: BTreeMap<u8, LevelDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<XmlNode>,
    #[serde(default, skip_serializing_if = "XmlAttrs::is_empty")]
    pub attributes: XmlAttrs,
}

impl AbstractNumberingDefinition {
    #[inline]
    pub fn has_levels(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn from_xml(node: &XmlNode) -> Option<Self> {
        let abstract_id = node.attr("w:abstractNumId").and_then(parse_int)?;
        let mut def = Self {
            abstract_id,
            attributes: without(&node.attributes, "w:abstractNumId"),
            ..Self::default()
        };
        for child in &node.elements {
            let val = || child.attr("w:val").map(str::to_string);
            match child.name.as_str() {
                "w:nsid" => def.nsid = val(),
                "w:multiLevelType" => def.multi_level_type = val(),
                "w:tmpl" => def.template_id = val(),
                "w:name" => def.name = val(),
                "w:styleLink" => def.style_link = val(),
                "w:numStyleLink" => def.num_style_link = val(),
                "w:lvl" => match LevelDefinition::from_xml(child) {
                    Some(level) => {
                        def.levels.insert(level.level, level);
                    },
                    None => {
                        log::warn!("abstractNum {abstract_id}: skipping w:lvl without a valid w:ilvl");
                        def.extra.push(child.clone());
                    },
                },
                _ => def.extra.push(child.clone()),
            }
        }
        Some(def)
    }

    pub fn to_xml(&self) -> XmlNode {
        let mut node =
            XmlNode::new("w:abstractNum").with_attr("w:abstractNumId", format_int(self.abstract_id));
        node.attributes
            .extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        for (name, value) in [
            ("w:nsid", &self.nsid),
            ("w:multiLevelType", &self.multi_level_type),
            ("w:tmpl", &self.template_id),
            ("w:name", &self.name),
            ("w:styleLink", &self.style_link),
            ("w:numStyleLink", &self.num_style_link),
        ] {
            if let Some(v) = value {
                node.elements.push(val_node(name, v));
            }
        }
        node.elements
            .extend(self.levels.values().map(LevelDefinition::to_xml));
        node.elements.extend(self.extra.iter().cloned());
        node
    }
}

/// Instance-level replacement of one level (`w:lvlOverride`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOverride {
    pub start_override: Option<i64>,
    pub level: Option<LevelDefinition>,
}

/// A list instance (`w:num`) that paragraphs reference through `w:numId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberingInstance {
    pub num_id: i64,
    pub abstract_id: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<u8, LevelOverride>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<XmlNode>,
    #[serde(default, skip_serializing_if = "XmlAttrs::is_empty")]
    pub attributes: XmlAttrs,
}

impl NumberingInstance {
    pub fn from_xml(node: &XmlNode) -> Option<Self> {
        let num_id = node.attr("w:numId").and_then(parse_int)?;
        let abstract_id = node.child_val("w:abstractNumId").and_then(parse_int)?;
        let mut instance = Self {
            num_id,
            abstract_id,
            attributes: without(&node.attributes, "w:numId"),
            ..Self::default()
        };
        for child in &node.elements {
            match child.name.as_str() {
                "w:abstractNumId" => {},
                "w:lvlOverride" => {
                    let Some(level) = child
                        .attr("w:ilvl")
                        .and_then(parse_int)
                        .and_then(|l| u8::try_from(l).ok())
                    else {
                        instance.extra.push(child.clone());
                        continue;
                    };
                    let entry = LevelOverride {
                        start_override: child.child_val("w:startOverride").and_then(parse_int),
                        level: child.child("w:lvl").and_then(LevelDefinition::from_xml),
                    };
                    instance.overrides.insert(level, entry);
                },
                _ => instance.extra.push(child.clone()),
            }
        }
        Some(instance)
    }

    pub fn to_xml(&self) -> XmlNode {
        let mut node = XmlNode::new("w:num").with_attr("w:numId", format_int(self.num_id));
        node.attributes
            .extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        node.elements
            .push(val_node("w:abstractNumId", &format_int(self.abstract_id)));
        for (level, entry) in &self.overrides {
            let mut element =
                XmlNode::new("w:lvlOverride").with_attr("w:ilvl", format_int(*level as i64));
            if let Some(start) = entry.start_override {
                element
                    .elements
                    .push(val_node("w:startOverride", &format_int(start)));
            }
            if let Some(def) = &entry.level {
                element.elements.push(def.to_xml());
            }
            node.elements.push(element);
        }
        node.elements.extend(self.extra.iter().cloned());
        node
    }
}

/// Parsed numbering part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberingDefinitions {
    /// Root attributes, namespace declarations included
    #[serde(default, skip_serializing_if = "XmlAttrs::is_empty")]
    pub attributes: XmlAttrs,
    /// `w:numPicBullet` entries, which precede the definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub picture_bullets: Vec<XmlNode>,
    /// Abstract definitions in document order
    pub abstracts: Vec<AbstractNumberingDefinition>,
    pub instances: Vec<NumberingInstance>,
    /// Everything after the instances, e.g. `w:numIdMacAtCleanup`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trailing: Vec<XmlNode>,
}

impl NumberingDefinitions {
    /// Read a `w:numbering` root element.
    pub fn from_xml(root: &XmlNode) -> Result<Self> {
        if root.name != NUMBERING_ROOT {
            return Err(ConvertError::UnexpectedRoot {
                part: "numbering".to_string(),
                expected: NUMBERING_ROOT.to_string(),
                got: root.name.clone(),
            });
        }

        let mut defs = Self {
            attributes: root.attributes.clone(),
            ..Self::default()
        };
        for child in &root.elements {
            match child.name.as_str() {
                "w:numPicBullet" => defs.picture_bullets.push(child.clone()),
                "w:abstractNum" => match AbstractNumberingDefinition::from_xml(child) {
                    Some(def) => defs.abstracts.push(def),
                    None => {
                        log::warn!("w:abstractNum without a valid w:abstractNumId kept verbatim");
                        defs.trailing.push(child.clone());
                    },
                },
                "w:num" => match NumberingInstance::from_xml(child) {
                    Some(instance) => defs.instances.push(instance),
                    None => {
                        log::warn!("w:num without valid ids kept verbatim");
                        defs.trailing.push(child.clone());
                    },
                },
                _ => defs.trailing.push(child.clone()),
            }
        }
        log::debug!(
            "numbering part: {} abstract definitions, {} instances",
            defs.abstracts.len(),
            defs.instances.len()
        );
        Ok(defs)
    }

    /// Write the part back in schema order.
    pub fn to_xml(&self) -> XmlNode {
        let mut root = XmlNode::new(NUMBERING_ROOT);
        root.attributes = self.attributes.clone();
        root.elements.extend(self.picture_bullets.iter().cloned());
        root.elements
            .extend(self.abstracts.iter().map(AbstractNumberingDefinition::to_xml));
        root.elements
            .extend(self.instances.iter().map(NumberingInstance::to_xml));
        root.elements.extend(self.trailing.iter().cloned());
        root
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.abstracts.is_empty() && self.instances.is_empty() && self.picture_bullets.is_empty()
    }

    pub fn abstract_by_id(&self, abstract_id: i64) -> Option<&AbstractNumberingDefinition> {
        self.abstracts.iter().find(|a| a.abstract_id == abstract_id)
    }

    pub fn instance(&self, num_id: i64) -> Option<&NumberingInstance> {
        self.instances.iter().find(|n| n.num_id == num_id)
    }
}

fn val_node(name: &str, value: &str) -> XmlNode {
    XmlNode::new(name).with_attr("w:val", value)
}

fn without(attrs: &XmlAttrs, key: &str) -> XmlAttrs {
    attrs
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
