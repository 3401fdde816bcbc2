/// Configuration for a translation engine instance.
///
/// The configuration is read-only while a conversion runs; sessions borrow it.
///
/// # Examples
///
/// ```rust
/// use longan::{EngineConfig, Limits};
///
/// // Create with defaults
/// let config = EngineConfig::default();
///
/// // Or customize
/// let config = EngineConfig::new()
///     .with_list_labels(false)
///     .with_supported_choice("wpc")
///     .with_limits(Limits { max_depth: 32, ..Limits::default() });
/// ```
use crate::common::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};

/// Resource-exhaustion guards applied per element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    /// Longest attribute value (in bytes) an element may carry before it is rejected
    pub max_attribute_len: usize,
    /// Longest JSON payload accepted from a structured-content tag
    pub max_tag_payload_len: usize,
    /// Deepest element nesting the translators will descend into
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_attribute_len: 65_536,
            max_tag_payload_len: 16_384,
            max_depth: 96,
        }
    }
}

/// Engine-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Per-element resource guards
    pub limits: Limits,
    /// Namespace prefixes an `mc:Choice` may require and still be selected
    pub supported_choice_requires: Vec<String>,
    /// Whether imported list paragraphs get a rendered label
    pub compute_list_labels: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            supported_choice_requires: vec![
                "w14".to_string(),
                "w15".to_string(),
                "wps".to_string(),
                "wpg".to_string(),
            ],
            compute_list_labels: true,
        }
    }
}

impl EngineConfig {
    /// Create a new `EngineConfig` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON, defaulting every missing field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use longan::EngineConfig;
    ///
    /// let config = EngineConfig::from_json(r#"{"limits":{"maxDepth":12}}"#).unwrap();
    /// assert_eq!(config.limits.max_depth, 12);
    /// assert!(config.compute_list_labels);
    /// ```
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the resource guards.
    #[inline]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Accept one more `mc:Choice` requirement prefix.
    #[inline]
    pub fn with_supported_choice(mut self, prefix: &str) -> Self {
        if !self.supports_choice(prefix) {
            self.supported_choice_requires.push(prefix.to_string());
        }
        self
    }

    /// Set whether list labels are rendered during import.
    #[inline]
    pub fn with_list_labels(mut self, enabled: bool) -> Self {
        self.compute_list_labels = enabled;
        self
    }

    /// Check whether a `Requires` prefix is supported.
    #[inline]
    pub fn supports_choice(&self, prefix: &str) -> bool {
        self.supported_choice_requires.iter().any(|p| p == prefix)
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_depth == 0 {
            return Err(ConvertError::InvalidConfig(
                "limits.maxDepth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::new()
            .with_list_labels(false)
            .with_supported_choice("wpc")
            .with_supported_choice("wpc");

        assert!(!config.compute_list_labels);
        assert!(config.supports_choice("wpc"));
        assert_eq!(
            config
                .supported_choice_requires
                .iter()
                .filter(|p| *p == "wpc")
                .count(),
            1
        );
    }

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert!(config.compute_list_labels);
        assert!(config.supports_choice("wps"));
        assert!(!config.supports_choice("v"));
        assert_eq!(config.limits.max_depth, 96);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"computeListLabels":false}"#).unwrap();
        assert!(!config.compute_list_labels);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_from_json_rejects_zero_depth() {
        let err = EngineConfig::from_json(r#"{"limits":{"maxDepth":0}}"#).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(ConvertError::Json(_))
        ));
    }
}
