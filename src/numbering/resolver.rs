/// Numbering resolution.
///
/// Maps a `(numId, ilvl)` reference to the level definition that governs it.
/// The abstract definition an instance points at is used whenever it has
/// levels, even if another definition sharing its `w:tmpl` appears earlier in
/// the part. Only a level-less definition falls back to the first leveled
/// definition with the same template id. Everything else resolves to
/// [`Resolution::NotAList`]; resolution never fails hard.
use super::definitions::{AbstractNumberingDefinition, LevelDefinition, NumberingDefinitions};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Why a reference does not produce list formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotAList {
    /// `numId` 0 explicitly removes numbering
    Removed,
    UnknownInstance,
    UnknownAbstract,
    /// Neither the direct definition nor any template sibling has levels
    NoLevels,
    /// The definition exists but lacks the requested level
    MissingLevel,
}

/// Effective level table of one numbering instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    pub num_id: i64,
    /// Abstract definition actually used
    pub abstract_id: i64,
    /// Whether the template fallback picked `abstract_id`
    pub via_template: bool,
    pub levels: Rc<BTreeMap<u8, LevelDefinition>>,
}

/// A successfully resolved list level.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLevel {
    pub table: Rc<LevelTable>,
    pub definition: LevelDefinition,
}

impl ResolvedLevel {
    #[inline]
    pub fn num_id(&self) -> i64 {
        self.table.num_id
    }

    #[inline]
    pub fn abstract_id(&self) -> i64 {
        self.table.abstract_id
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.definition.level
    }
}

/// Outcome of a numbering lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    List(ResolvedLevel),
    NotAList(NotAList),
}

impl Resolution {
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, Resolution::List(_))
    }

    pub fn into_level(self) -> Option<ResolvedLevel> {
        match self {
            Resolution::List(level) => Some(level),
            Resolution::NotAList(_) => None,
        }
    }
}

/// Pick the abstract definition that governs `abstract_id`.
///
/// Returns the definition and whether the template fallback chose it.
pub fn choose_abstract(
    defs: &NumberingDefinitions,
    abstract_id: i64,
) -> Result<(&AbstractNumberingDefinition, bool), NotAList> {
    let direct = defs
        .abstract_by_id(abstract_id)
        .ok_or(NotAList::UnknownAbstract)?;
    if direct.has_levels() {
        return Ok((direct, false));
    }

    let template = direct.template_id.as_deref().ok_or(NotAList::NoLevels)?;
    defs.abstracts
        .iter()
        .find(|a| a.has_levels() && a.template_id.as_deref() == Some(template))
        .map(|a| (a, true))
        .ok_or(NotAList::NoLevels)
}

/// Per-session memo of resolved level tables.
#[derive(Debug, Default)]
pub struct NumberingCache {
    /// Level map of each chosen abstract definition, built once
    abstract_levels: HashMap<i64, Rc<BTreeMap<u8, LevelDefinition>>>,
    /// Effective table of each instance, overrides applied
    instances: HashMap<i64, Result<Rc<LevelTable>, NotAList>>,
}

impl NumberingCache {
    /// Resolve `(num_id, level)` against `defs`.
    pub fn resolve(&mut self, defs: &NumberingDefinitions, num_id: i64, level: u8) -> Resolution {
        let table = match self.level_table(defs, num_id) {
            Ok(table) => table,
            Err(reason) => return Resolution::NotAList(reason),
        };
        match table.levels.get(&level) {
            Some(definition) => Resolution::List(ResolvedLevel {
                definition: definition.clone(),
                table: Rc::clone(&table),
            }),
            None => {
                log::warn!("numId {num_id} (abstractNum {}) has no level {level}", table.abstract_id);
                Resolution::NotAList(NotAList::MissingLevel)
            },
        }
    }

    /// Effective level table of an instance.
    pub fn level_table(
        &mut self,
        defs: &NumberingDefinitions,
        num_id: i64,
    ) -> Result<Rc<LevelTable>, NotAList> {
        if num_id == 0 {
            return Err(NotAList::Removed);
        }
        if let Some(cached) = self.instances.get(&num_id) {
            return cached.clone();
        }
        let table = self.build_table(defs, num_id);
        self.instances.insert(num_id, table.clone());
        table
    }

    fn build_table(
        &mut self,
        defs: &NumberingDefinitions,
        num_id: i64,
    ) -> Result<Rc<LevelTable>, NotAList> {
        let Some(instance) = defs.instance(num_id) else {
            log::warn!("paragraph references unknown numId {num_id}");
            return Err(NotAList::UnknownInstance);
        };
        let (chosen, via_template) = match choose_abstract(defs, instance.abstract_id) {
            Ok(found) => found,
            Err(reason) => {
                log::warn!(
                    "numId {num_id} references abstractNum {} which resolves to no levels ({reason:?})",
                    instance.abstract_id
                );
                return Err(reason);
            },
        };
        if via_template {
            log::debug!(
                "numId {num_id}: abstractNum {} has no levels, using template sibling {}",
                instance.abstract_id,
                chosen.abstract_id
            );
        }

        let base = Rc::clone(
            self.abstract_levels
                .entry(chosen.abstract_id)
                .or_insert_with(|| Rc::new(chosen.levels.clone())),
        );

        let levels = if instance.overrides.is_empty() {
            base
        } else {
            let mut levels = (*base).clone();
            for (&level, entry) in &instance.overrides {
                if let Some(replacement) = &entry.level {
                    let mut replacement = replacement.clone();
                    replacement.level = level;
                    levels.insert(level, replacement);
                }
                if let Some(start) = entry.start_override {
                    if let Some(def) = levels.get_mut(&level) {
                        def.start = Some(start);
                    }
                }
            }
            Rc::new(levels)
        };

        Ok(Rc::new(LevelTable {
            num_id,
            abstract_id: chosen.abstract_id,
            via_template,
            levels,
        }))
    }
}
