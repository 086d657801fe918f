//! Groups tokenized configuration lines into named sections.

use std::{
    collections::{BTreeMap, HashSet},
    str::FromStr,
    sync::Arc,
};

use tracing::{debug, trace};

use crate::{
    lexer::{is_blank, Lexer},
    ConfigParseError,
};

const DATA_LEXER: Lexer = Lexer::new().discard_comments(true);

/// One block of rows between two section boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    pub(crate) name: String,
    pub(crate) slot_number: Option<i32>,
    pub(crate) rows: Vec<Vec<String>>,
    pub(crate) name_values: BTreeMap<String, String>,
    pub(crate) name_vectors: BTreeMap<String, Vec<String>>,
}

impl ConfigSection {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Section keyword, or the full header line for slot sections.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot number, set only for sections produced by [`parse_with_slots`].
    pub fn slot_number(&self) -> Option<i32> {
        self.slot_number
    }

    /// Every data row in file order, each as its list of tokens.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows with exactly two tokens, keyed by the first. Later rows overwrite earlier ones.
    pub fn name_values(&self) -> &BTreeMap<String, String> {
        &self.name_values
    }

    /// Rows with three or more tokens, keyed by the first. Later rows overwrite earlier
    /// ones; use [`ConfigSection::rows`] to see every occurrence.
    pub fn name_vectors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.name_vectors
    }

    /// Value of a two-token row.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.name_values.get(name).map(String::as_str)
    }

    /// Values of a row with three or more tokens.
    pub fn vector(&self, name: &str) -> Option<&[String]> {
        self.name_vectors.get(name).map(Vec::as_slice)
    }

    /// Parses the value of a two-token row.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigParseError::InvalidValue`] if the stored text does not parse as `T`.
    pub fn parse_value<T>(&self, name: &str) -> Result<Option<T>, ConfigParseError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.value(name)
            .map(|raw| parse_token(name, raw))
            .transpose()
    }

    /// Parses every value of a row with three or more tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigParseError::InvalidValue`] for the first token that does not parse as `T`.
    pub fn parse_vector<T>(&self, name: &str) -> Result<Option<Vec<T>>, ConfigParseError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.vector(name)
            .map(|raw| raw.iter().map(|token| parse_token(name, token)).collect())
            .transpose()
    }

    fn push_row(&mut self, tokens: Vec<String>) {
        match tokens.len() {
            2 => {
                self.name_values
                    .insert(tokens[0].clone(), tokens[1].clone());
            }
            n if n > 2 => {
                self.name_vectors
                    .insert(tokens[0].clone(), tokens[1..].to_vec());
            }
            _ => {}
        }
        self.rows.push(tokens);
    }
}

fn parse_token<T>(name: &str, raw: &str) -> Result<T, ConfigParseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigParseError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Header line of a slot section found by [`find_slot_sections`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSection {
    /// The header line with trailing whitespace removed.
    pub full_line: String,
    /// The slot prefix that introduced the section.
    pub name: String,
    /// Integer read from the second token of the header.
    pub slot_number: i32,
}

/// Output of a parse call.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub(crate) awaited_section_names: Vec<String>,
    pub(crate) sections: BTreeMap<String, Arc<ConfigSection>>,
    pub(crate) sections_by_slot: BTreeMap<i32, Arc<ConfigSection>>,
    pub(crate) found_section_names: Vec<String>,
}

impl ParseResult {
    fn new(awaited_section_names: Vec<String>) -> Self {
        Self {
            awaited_section_names,
            ..Default::default()
        }
    }

    /// Section names the parse was asked to look for.
    pub fn awaited_section_names(&self) -> &[String] {
        &self.awaited_section_names
    }

    /// Committed sections keyed by name.
    pub fn sections(&self) -> &BTreeMap<String, Arc<ConfigSection>> {
        &self.sections
    }

    /// Slot sections keyed by slot number. Each entry is the same allocation as the
    /// corresponding entry of [`ParseResult::sections`].
    pub fn sections_by_slot(&self) -> &BTreeMap<i32, Arc<ConfigSection>> {
        &self.sections_by_slot
    }

    /// One entry per boundary line encountered, in file order. May contain duplicates.
    pub fn found_section_names(&self) -> &[String] {
        &self.found_section_names
    }

    /// Looks up a section by name.
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.get(name).map(AsRef::as_ref)
    }

    /// Looks up a slot section by slot number.
    pub fn slot(&self, slot_number: i32) -> Option<&ConfigSection> {
        self.sections_by_slot.get(&slot_number).map(AsRef::as_ref)
    }

    fn commit(&mut self, section: ConfigSection) {
        if section.name.is_empty() {
            return;
        }
        self.sections
            .insert(section.name.clone(), Arc::new(section));
    }
}

/// Strips trailing column separators, drops decoration lines and returns the
/// trimmed line along with its tokens. `None` means the line carries no data.
fn significant_tokens(raw: &str) -> Option<(&str, Vec<String>)> {
    let line = raw.trim_end_matches(is_blank);
    if line.starts_with('#') || line.starts_with("----") || line.starts_with("====") {
        return None;
    }
    let tokens: Vec<String> = DATA_LEXER
        .tokenize(line)
        .iter()
        .map(|token| token.trim_matches(is_blank).to_string())
        .collect();
    match tokens.first() {
        Some(first) if !first.is_empty() => Some((line, tokens)),
        _ => None,
    }
}

/// Splits `lines` into sections introduced by the `awaited_section_names`.
///
/// A line is a boundary when its first token matches one of the names, or, with
/// `section_may_contain_spaces`, when the whole line (trailing whitespace removed)
/// matches. Rows seen before the first boundary are dropped.
pub fn parse<L, N>(
    lines: &[L],
    awaited_section_names: &[N],
    section_may_contain_spaces: bool,
) -> ParseResult
where
    L: AsRef<str>,
    N: AsRef<str>,
{
    let awaited: Vec<String> = awaited_section_names
        .iter()
        .map(|name| name.as_ref().to_string())
        .collect();
    let lookup: HashSet<&str> = awaited.iter().map(String::as_str).collect();
    let mut result = ParseResult::new(awaited.clone());
    let mut current = ConfigSection::default();

    for raw in lines {
        let Some((line, tokens)) = significant_tokens(raw.as_ref()) else {
            continue;
        };
        let key = if section_may_contain_spaces {
            line
        } else {
            tokens[0].as_str()
        };
        if lookup.contains(key) {
            trace!(section = key, "section boundary");
            let next = ConfigSection::named(key);
            result.found_section_names.push(key.to_string());
            result.commit(std::mem::replace(&mut current, next));
            continue;
        }
        current.push_row(tokens);
    }
    result.commit(current);
    result
}

/// First pass of [`parse_with_slots`]: finds every header line whose first token
/// is `slot_prefix` and which has at least two tokens.
///
/// # Errors
///
/// Returns [`ConfigParseError::InvalidSlotNumber`] if a header's second token is
/// not an integer.
pub fn find_slot_sections<L>(
    lines: &[L],
    slot_prefix: &str,
) -> Result<Vec<SlotSection>, ConfigParseError>
where
    L: AsRef<str>,
{
    let mut found = Vec::new();
    for (idx, raw) in lines.iter().enumerate() {
        let Some((line, tokens)) = significant_tokens(raw.as_ref()) else {
            continue;
        };
        if tokens.len() < 2 || tokens[0] != slot_prefix {
            continue;
        }
        let slot_number =
            tokens[1]
                .parse::<i32>()
                .map_err(|_| ConfigParseError::InvalidSlotNumber {
                    line_number: idx + 1,
                    line: line.to_string(),
                    token: tokens[1].clone(),
                })?;
        found.push(SlotSection {
            full_line: line.to_string(),
            name: slot_prefix.to_string(),
            slot_number,
        });
    }
    Ok(found)
}

/// Parses a file whose sections are introduced by repeated `<slot_prefix> <slot> ...`
/// header lines. Each header becomes a section named by its full line and is also
/// reachable through [`ParseResult::sections_by_slot`].
///
/// # Errors
///
/// Returns [`ConfigParseError::InvalidSlotNumber`] if a header's slot is not an integer.
pub fn parse_with_slots<L>(lines: &[L], slot_prefix: &str) -> Result<ParseResult, ConfigParseError>
where
    L: AsRef<str>,
{
    let slots = find_slot_sections(lines, slot_prefix)?;
    let header_lines: Vec<&str> = slots.iter().map(|s| s.full_line.as_str()).collect();
    let mut result = parse(lines, &header_lines, true);

    for slot in &slots {
        if let Some(section) = result.sections.get_mut(&slot.full_line) {
            Arc::make_mut(section).slot_number = Some(slot.slot_number);
        }
    }
    for slot in &slots {
        if let Some(section) = result.sections.get(&slot.full_line) {
            result
                .sections_by_slot
                .insert(slot.slot_number, Arc::clone(section));
        }
    }
    debug!(
        prefix = slot_prefix,
        slots = result.sections_by_slot.len(),
        "parsed slot sections"
    );
    Ok(result)
}
