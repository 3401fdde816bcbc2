/// Per-conversion state.
///
/// A session is created for one document conversion and dropped with it. Nothing
/// here is shared between conversions, so two documents converted on two threads
/// each get their own caches.
use crate::common::EngineConfig;
use crate::numbering::{ListCounters, NumberingCache, NumberingDefinitions, Resolution};
use crate::styles::StyleSheet;
use indexmap::IndexSet;

/// Fonts referenced while translating, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSet {
    names: IndexSet<String>,
}

impl FontSet {
    /// Record a font name; blank names are ignored.
    pub fn record(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

/// State of one import (XML → internal) conversion.
#[derive(Debug)]
pub struct ImportSession<'a> {
    pub config: &'a EngineConfig,
    pub numbering: NumberingDefinitions,
    pub styles: StyleSheet,
    pub numbering_cache: NumberingCache,
    pub counters: ListCounters,
    pub fonts: FontSet,
    depth: usize,
}

impl<'a> ImportSession<'a> {
    /// Session with no numbering or styles.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            numbering: NumberingDefinitions::default(),
            styles: StyleSheet::default(),
            numbering_cache: NumberingCache::default(),
            counters: ListCounters::default(),
            fonts: FontSet::default(),
            depth: 0,
        }
    }

    /// Builder: use these numbering definitions.
    pub fn with_numbering(mut self, numbering: NumberingDefinitions) -> Self {
        self.numbering = numbering;
        self
    }

    /// Builder: use this style sheet.
    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }

    /// Resolve a list reference against this session's numbering.
    pub fn resolve_numbering(&mut self, num_id: i64, level: u8) -> Resolution {
        self.numbering_cache.resolve(&self.numbering, num_id, level)
    }

    /// Current element nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one nesting level deeper, or return `None` once the depth guard trips.
    pub fn descend<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if self.depth >= self.config.limits.max_depth {
            return None;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }
}

/// State of one export (internal → XML) conversion.
#[derive(Debug)]
pub struct ExportContext<'a> {
    pub config: &'a EngineConfig,
    pub fonts: FontSet,
    depth: usize,
    removed: bool,
}

impl<'a> ExportContext<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            fonts: FontSet::default(),
            depth: 0,
            removed: false,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether output is currently written inside a `w:del` or `w:moveFrom`.
    #[inline]
    pub fn in_removal(&self) -> bool {
        self.removed
    }

    /// Run `f` with output marked as removed text.
    pub fn removing<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer = std::mem::replace(&mut self.removed, true);
        let result = f(self);
        self.removed = outer;
        result
    }

    /// Run `f` one nesting level deeper, or return `None` once the depth guard trips.
    pub fn descend<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if self.depth >= self.config.limits.max_depth {
            return None;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Limits;

    #[test]
    fn test_font_set_dedup_keeps_order() {
        let mut fonts = FontSet::default();
        fonts.record("Calibri");
        fonts.record("  ");
        fonts.record("Cambria");
        fonts.record("Calibri");
        assert_eq!(fonts.into_vec(), vec!["Calibri", "Cambria"]);
    }

    #[test]
    fn test_descend_stops_at_limit() {
        let config = EngineConfig::new().with_limits(Limits {
            max_depth: 2,
            ..Limits::default()
        });
        let mut session = ImportSession::new(&config);
        let reached = session.descend(|s| s.descend(|s| s.descend(|_| ()).is_some()));
        assert_eq!(reached, Some(Some(false)));
        assert_eq!(session.depth(), 0);
    }
}
