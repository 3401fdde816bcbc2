/// List label rendering and counters.
///
/// A level's `w:lvlText` template holds `%1`..`%9` placeholders. Placeholder
/// `%N` is replaced by the running number of level N-1, shown as
/// `start + index - 1` in that level's own number format.
use super::definitions::{LevelDefinition, LevelFormat};
use std::collections::{BTreeMap, HashMap};

/// Largest number rendered as letters or roman numerals; `w:start` allows no more.
pub const MAX_WORD_NUMBER: i64 = 32_767;

/// Number shown for the `index`-th item of a level starting at `start`.
#[inline]
pub fn shown_number(start: i64, index: i64) -> i64 {
    start.saturating_add(index).saturating_sub(1)
}

/// Render a single number in `format`.
///
/// Letter and roman formats fall back to decimal above [`MAX_WORD_NUMBER`].
pub fn format_number(format: LevelFormat, n: i64) -> String {
    let spelled = matches!(
        format,
        LevelFormat::LowerRoman | LevelFormat::UpperRoman | LevelFormat::LowerLetter | LevelFormat::UpperLetter
    );
    if spelled && n > MAX_WORD_NUMBER {
        log::warn!("list number {n} too large for {format}; rendered as decimal");
        return itoa::Buffer::new().format(n).to_string();
    }
    match format {
        LevelFormat::Decimal | LevelFormat::Custom => itoa::Buffer::new().format(n).to_string(),
        LevelFormat::LowerRoman => to_roman(n).to_lowercase(),
        LevelFormat::UpperRoman => to_roman(n),
        LevelFormat::LowerLetter => to_letters(n, b'a'),
        LevelFormat::UpperLetter => to_letters(n, b'A'),
        LevelFormat::Bullet => String::new(),
    }
}

/// Substitute every `%N` in `template` using one format for all levels.
///
/// `indices[N-1]` is the 1-based position of the paragraph within level N-1.
/// Bullet templates are returned verbatim.
///
/// ```rust
/// use longan::numbering::{LevelFormat, format_label};
///
/// assert_eq!(format_label(LevelFormat::Decimal, "%1.", 1, &[3]), "3.");
/// assert_eq!(format_label(LevelFormat::UpperRoman, "%1)", 1, &[4]), "IV)");
/// ```
pub fn format_label(format: LevelFormat, template: &str, start: i64, indices: &[i64]) -> String {
    if format == LevelFormat::Bullet {
        return template.to_string();
    }
    substitute(template, |level| {
        indices
            .get(level)
            .map(|&index| format_number(format, shown_number(start, index)))
    })
}

/// Label of `level`, formatting each referenced level with its own definition.
pub fn render_level_label(
    levels: &BTreeMap<u8, LevelDefinition>,
    level: u8,
    indices: &[i64],
) -> Option<String> {
    let current = levels.get(&level)?;
    if current.effective_format() == LevelFormat::Bullet {
        return Some(current.label_template.clone().unwrap_or_default());
    }
    let fallback;
    let template = match &current.label_template {
        Some(template) => template.as_str(),
        None => {
            fallback = format!("%{}.", level + 1);
            fallback.as_str()
        },
    };
    let legal = current.is_legal == Some(true);

    Some(substitute(template, |referenced| {
        let index = *indices.get(referenced)?;
        let def = u8::try_from(referenced).ok().and_then(|l| levels.get(&l));
        let start = def.map_or(1, LevelDefinition::effective_start);
        let shown = shown_number(start, index);
        match def {
            Some(_) if legal => Some(format_number(LevelFormat::Decimal, shown)),
            Some(def) => Some(format_level_number(def, shown)),
            None => Some(format_number(LevelFormat::Decimal, shown)),
        }
    }))
}

/// Number text for one level, including custom formats.
pub fn format_level_number(def: &LevelDefinition, n: i64) -> String {
    let format = def.effective_format();
    if format != LevelFormat::Custom {
        return format_number(format, n);
    }
    if let Some(width) = def.format_pattern.as_deref().and_then(pattern_width) {
        return format!("{n:0width$}");
    }
    match def.format_value.as_deref() {
        Some("decimalZero") => format!("{n:02}"),
        Some("none") => String::new(),
        Some("ordinal") => ordinal(n),
        Some(other) => {
            log::debug!("number format {other} rendered as decimal");
            format_number(LevelFormat::Decimal, n)
        },
        None => format_number(LevelFormat::Decimal, n),
    }
}

/// Zero-padding width of a `w:format` pattern like `001, 002, 003, ...`.
fn pattern_width(pattern: &str) -> Option<usize> {
    let first = pattern.split(',').next()?.trim();
    (!first.is_empty() && first.bytes().all(|b| b.is_ascii_digit())).then_some(first.len())
}

fn substitute(template: &str, mut number: impl FnMut(usize) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)).filter(|d| *d >= 1) {
                chars.next();
                out.push_str(&number(digit as usize - 1).unwrap_or_default());
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn to_roman(mut n: i64) -> String {
    if n <= 0 {
        return itoa::Buffer::new().format(n).to_string();
    }
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// a..z, then aa..zz, then aaa..: the letter repeats instead of carrying.
fn to_letters(n: i64, base: u8) -> String {
    if n <= 0 {
        return itoa::Buffer::new().format(n).to_string();
    }
    let letter = (base + ((n - 1) % 26) as u8) as char;
    let repeat = ((n - 1) / 26 + 1) as usize;
    std::iter::repeat_n(letter, repeat).collect()
}

fn ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Running counters per `(numId, level)` for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCounters {
    counters: HashMap<(i64, u8), i64>,
}

impl ListCounters {
    /// Advance `level` of list `num_id` and return the indices of levels
    /// `0..=level` for label rendering.
    ///
    /// Deeper levels restart unless their `w:lvlRestart` says otherwise, and
    /// skipped shallower levels count as 1.
    pub fn advance(
        &mut self,
        num_id: i64,
        level: u8,
        levels: &BTreeMap<u8, LevelDefinition>,
    ) -> Vec<i64> {
        self.counters.retain(|&(id, deeper), _| {
            if id != num_id || deeper <= level {
                return true;
            }
            let threshold = levels
                .get(&deeper)
                .and_then(|d| d.restart)
                .unwrap_or(deeper as i64);
            threshold == 0 || (level as i64) >= threshold
        });

        for shallower in 0..level {
            self.counters.entry((num_id, shallower)).or_insert(1);
        }
        *self.counters.entry((num_id, level)).or_insert(0) += 1;

        (0..=level).map(|l| self.current(num_id, l)).collect()
    }

    /// Current counter, 0 when the level has not been used.
    #[inline]
    pub fn current(&self, num_id: i64, level: u8) -> i64 {
        self.counters.get(&(num_id, level)).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(level: u8, format: LevelFormat, template: &str) -> LevelDefinition {
        LevelDefinition {
            level,
            start: Some(1),
            format: Some(format),
            label_template: Some(template.to_string()),
            ..LevelDefinition::default()
        }
    }

    #[test]
    fn test_format_label_examples() {
        assert_eq!(format_label(LevelFormat::Decimal, "%1.", 1, &[3]), "3.");
        assert_eq!(format_label(LevelFormat::UpperRoman, "%1)", 1, &[4]), "IV)");
        assert_eq!(format_label(LevelFormat::LowerLetter, "(%1)", 1, &[28]), "(bb)");
        assert_eq!(format_label(LevelFormat::Bullet, "\u{f0b7}", 1, &[2]), "\u{f0b7}");
        assert_eq!(format_label(LevelFormat::Decimal, "%1.%2", 5, &[1]), "5.");
    }

    #[test]
    fn test_each_level_uses_its_own_format() {
        let levels: BTreeMap<u8, LevelDefinition> = [
            (0, level(0, LevelFormat::UpperRoman, "%1.")),
            (1, level(1, LevelFormat::LowerLetter, "%1.%2)")),
        ]
        .into_iter()
        .collect();
        assert_eq!(render_level_label(&levels, 1, &[2, 3]).as_deref(), Some("II.c)"));
    }

    #[test]
    fn test_legal_numbering_is_decimal() {
        let mut second = level(1, LevelFormat::LowerRoman, "%1.%2");
        second.is_legal = Some(true);
        let levels: BTreeMap<u8, LevelDefinition> =
            [(0, level(0, LevelFormat::UpperRoman, "%1")), (1, second)]
                .into_iter()
                .collect();
        assert_eq!(render_level_label(&levels, 1, &[3, 2]).as_deref(), Some("3.2"));
    }

    #[test]
    fn test_custom_formats() {
        let mut def = level(0, LevelFormat::Custom, "%1");
        def.format_pattern = Some("001, 002, 003, ...".to_string());
        assert_eq!(format_level_number(&def, 7), "007");

        def.format_pattern = None;
        def.format_value = Some("decimalZero".to_string());
        assert_eq!(format_level_number(&def, 7), "07");
        def.format_value = Some("none".to_string());
        assert_eq!(format_level_number(&def, 7), "");
        def.format_value = Some("ordinal".to_string());
        assert_eq!(format_level_number(&def, 12), "12th");
        assert_eq!(format_level_number(&def, 22), "22nd");
    }

    #[test]
    fn test_huge_start_values_stay_bounded() {
        let mut decimal = level(0, LevelFormat::Decimal, "%1.");
        decimal.start = Some(i64::MAX);
        let levels: BTreeMap<u8, LevelDefinition> = [(0, decimal)].into_iter().collect();
        assert_eq!(
            render_level_label(&levels, 0, &[2]),
            Some(format!("{}.", i64::MAX))
        );

        let mut letters = level(0, LevelFormat::LowerLetter, "%1");
        letters.start = Some(260_000_000);
        let levels: BTreeMap<u8, LevelDefinition> = [(0, letters)].into_iter().collect();
        assert_eq!(render_level_label(&levels, 0, &[1]).as_deref(), Some("260000000"));

        assert_eq!(format_number(LevelFormat::UpperRoman, 1_000_000_000), "1000000000");
        assert_eq!(format_number(LevelFormat::UpperRoman, MAX_WORD_NUMBER).len(), 40);
        assert_eq!(format_label(LevelFormat::Decimal, "%1", i64::MIN, &[0]), i64::MIN.to_string());
    }

    #[test]
    fn test_counters_restart_deeper_levels() {
        let levels: BTreeMap<u8, LevelDefinition> = [
            (0, level(0, LevelFormat::Decimal, "%1.")),
            (1, level(1, LevelFormat::Decimal, "%1.%2.")),
        ]
        .into_iter()
        .collect();
        let mut counters = ListCounters::default();
        assert_eq!(counters.advance(1, 0, &levels), vec![1]);
        assert_eq!(counters.advance(1, 1, &levels), vec![1, 1]);
        assert_eq!(counters.advance(1, 1, &levels), vec![1, 2]);
        assert_eq!(counters.advance(1, 0, &levels), vec![2]);
        assert_eq!(counters.advance(1, 1, &levels), vec![2, 1]);
    }

    #[test]
    fn test_counters_skip_and_never_restart() {
        let mut deep = level(2, LevelFormat::Decimal, "%1.%2.%3");
        deep.restart = Some(0);
        let levels: BTreeMap<u8, LevelDefinition> = [(2, deep)].into_iter().collect();
        let mut counters = ListCounters::default();
        assert_eq!(counters.advance(3, 2, &levels), vec![1, 1, 1]);
        assert_eq!(counters.advance(3, 0, &levels), vec![2]);
        assert_eq!(counters.advance(3, 2, &levels), vec![2, 1, 2]);
    }
}
